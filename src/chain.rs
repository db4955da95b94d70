//! Per-bucket singly linked chains threaded through the arena's records.

use crate::arena::Slot;
use crate::arena::SlotArena;

/// Walks a chain from its head, yielding each record's slot.
pub(crate) struct Chain<'a> {
    arena: &'a SlotArena,
    cursor: Option<Slot>,
}

impl<'a> Chain<'a> {
    #[inline(always)]
    pub(crate) fn new(arena: &'a SlotArena, bucket: usize) -> Self {
        Chain {
            arena,
            cursor: arena.bucket_head(bucket),
        }
    }
}

impl Iterator for Chain<'_> {
    type Item = Slot;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        self.cursor = self.arena.next(slot);
        Some(slot)
    }
}

/// Splices `slot` in front of the bucket's current head.
///
/// Returns `true` if the bucket already held a record, i.e. the new record
/// is a collision.
#[inline(always)]
pub(crate) fn push_front(arena: &mut SlotArena, bucket: usize, slot: Slot) -> bool {
    let head = arena.bucket_head(bucket);
    arena.set_next(slot, head);
    arena.set_bucket_head(bucket, Some(slot));
    head.is_some()
}

/// Where an unlinked record was found.
pub(crate) struct Unlinked {
    pub(crate) slot: Slot,
    /// The record shared its bucket with at least one other record.
    pub(crate) was_collision: bool,
}

/// Finds the first record in the bucket satisfying `eq` and splices it out.
///
/// The unlinked record's own next link is left as is; the caller hands the
/// slot to the allocator, which overwrites it.
pub(crate) fn unlink(
    arena: &mut SlotArena,
    bucket: usize,
    eq: impl Fn(&[u8]) -> bool,
) -> Option<Unlinked> {
    let mut prev: Option<Slot> = None;
    let mut cursor = arena.bucket_head(bucket);

    while let Some(slot) = cursor {
        let next = arena.next(slot);
        if eq(arena.key(slot)) {
            match prev {
                None => arena.set_bucket_head(bucket, next),
                Some(prev) => arena.set_next(prev, next),
            }
            return Some(Unlinked {
                slot,
                was_collision: prev.is_some() || next.is_some(),
            });
        }
        prev = Some(slot);
        cursor = next;
    }

    None
}
