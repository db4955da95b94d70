use alloc::vec::Vec;

use crate::error::Error;
use crate::layout::ArenaLayout;
use crate::layout::LINK_SIZE;

/// Index of a record in the arena's element pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Slot(usize);

impl Slot {
    #[inline(always)]
    pub(crate) fn new(index: usize) -> Self {
        Slot(index)
    }
}

/// Encodes a link as `0` for "none" and `slot + 1` otherwise, so a zeroed
/// arena has every bucket and every next link empty.
#[inline(always)]
fn encode(link: Option<Slot>) -> u64 {
    match link {
        Some(slot) => slot.0 as u64 + 1,
        None => 0,
    }
}

#[inline(always)]
fn decode(raw: u64) -> Option<Slot> {
    raw.checked_sub(1).map(|index| Slot(index as usize))
}

/// A single zero-initialized allocation holding the bucket head array
/// followed by the record pool.
///
/// All accesses are bounds checked slices into the backing buffer; links
/// between records are pool indices rather than addresses, so relocating the
/// arena never requires pointer fixups.
#[derive(Clone)]
pub(crate) struct SlotArena {
    layout: ArenaLayout,
    bytes: Vec<u8>,
}

impl SlotArena {
    /// Allocates a zeroed arena, reporting allocator failure instead of
    /// aborting.
    pub(crate) fn new(layout: ArenaLayout) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(layout.size)
            .map_err(|_| Error::Allocation { bytes: layout.size })?;
        bytes.resize(layout.size, 0);
        Ok(SlotArena { layout, bytes })
    }

    #[inline(always)]
    pub(crate) fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    #[inline(always)]
    pub(crate) fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Zero-fills the whole arena, emptying every bucket and link.
    pub(crate) fn zero(&mut self) {
        self.bytes.fill(0);
    }

    #[inline(always)]
    fn read_link(&self, offset: usize) -> Option<Slot> {
        let mut raw = [0u8; LINK_SIZE];
        raw.copy_from_slice(&self.bytes[offset..offset + LINK_SIZE]);
        decode(u64::from_le_bytes(raw))
    }

    #[inline(always)]
    fn write_link(&mut self, offset: usize, link: Option<Slot>) {
        self.bytes[offset..offset + LINK_SIZE].copy_from_slice(&encode(link).to_le_bytes());
    }

    #[inline(always)]
    pub(crate) fn bucket_head(&self, bucket: usize) -> Option<Slot> {
        self.read_link(self.layout.bucket_offset(bucket))
    }

    #[inline(always)]
    pub(crate) fn set_bucket_head(&mut self, bucket: usize, head: Option<Slot>) {
        self.write_link(self.layout.bucket_offset(bucket), head);
    }

    #[inline(always)]
    pub(crate) fn next(&self, slot: Slot) -> Option<Slot> {
        self.read_link(self.layout.record_offset(slot.0) + self.layout.record.next_offset)
    }

    #[inline(always)]
    pub(crate) fn set_next(&mut self, slot: Slot, next: Option<Slot>) {
        self.write_link(
            self.layout.record_offset(slot.0) + self.layout.record.next_offset,
            next,
        );
    }

    #[inline(always)]
    pub(crate) fn key(&self, slot: Slot) -> &[u8] {
        let start = self.layout.record_offset(slot.0);
        &self.bytes[start..start + self.layout.record.key_size]
    }

    #[inline(always)]
    pub(crate) fn datum(&self, slot: Slot) -> &[u8] {
        let start = self.layout.record_offset(slot.0) + self.layout.record.datum_offset;
        &self.bytes[start..start + self.layout.record.datum_size]
    }

    #[inline(always)]
    pub(crate) fn write_key(&mut self, slot: Slot, key: &[u8]) {
        let start = self.layout.record_offset(slot.0);
        self.bytes[start..start + self.layout.record.key_size].copy_from_slice(key);
    }

    #[inline(always)]
    pub(crate) fn write_datum(&mut self, slot: Slot, datum: &[u8]) {
        let start = self.layout.record_offset(slot.0) + self.layout.record.datum_offset;
        self.bytes[start..start + self.layout.record.datum_size].copy_from_slice(datum);
    }
}
