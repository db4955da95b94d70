use crate::arena::Slot;
use crate::arena::SlotArena;
use crate::error::Error;

/// Tracks which pool slots of a [`SlotArena`] are free.
///
/// Free slots live in two disjoint pools: the never-touched tail of the pool,
/// consumed by a monotonic cursor, and a LIFO recycling list of released
/// slots threaded through the records' own next links. The recycling list is
/// always drained before the cursor advances.
#[derive(Clone, Debug)]
pub(crate) struct FreeList {
    capacity: usize,
    next_unused: usize,
    recycling_head: Option<Slot>,
    recycling: usize,
}

impl FreeList {
    pub(crate) fn new(capacity: usize) -> Self {
        FreeList {
            capacity,
            next_unused: 0,
            recycling_head: None,
            recycling: 0,
        }
    }

    /// Returns every slot to the unused pool.
    pub(crate) fn reset(&mut self) {
        *self = FreeList::new(self.capacity);
    }

    /// Number of never-allocated slots left.
    #[inline(always)]
    pub(crate) fn unused(&self) -> usize {
        self.capacity - self.next_unused
    }

    /// Number of released slots waiting for reuse.
    #[inline(always)]
    pub(crate) fn recycling(&self) -> usize {
        self.recycling
    }

    /// Hands out a free slot whose next link is cleared.
    ///
    /// Key and datum bytes of a recycled slot still hold whatever the
    /// previous occupant wrote.
    pub(crate) fn acquire(&mut self, arena: &mut SlotArena) -> Result<Slot, Error> {
        if let Some(slot) = self.recycling_head {
            self.recycling_head = arena.next(slot);
            self.recycling -= 1;
            arena.set_next(slot, None);
            return Ok(slot);
        }

        if self.next_unused < self.capacity {
            let slot = Slot::new(self.next_unused);
            self.next_unused += 1;
            debug_assert_eq!(arena.next(slot), None);
            return Ok(slot);
        }

        Err(Error::AtCapacity {
            capacity: self.capacity,
        })
    }

    /// Pushes `slot` onto the recycling list.
    ///
    /// The caller must already have unlinked `slot` from its chain.
    pub(crate) fn release(&mut self, arena: &mut SlotArena, slot: Slot) {
        arena.set_next(slot, self.recycling_head);
        self.recycling_head = Some(slot);
        self.recycling += 1;
    }
}
