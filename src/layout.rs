use crate::error::Error;

/// Alignment of the datum and next-link fields inside a record.
const FIELD_ALIGN: usize = 8;

/// Size in bytes of an encoded link (bucket head or record next pointer).
pub(crate) const LINK_SIZE: usize = core::mem::size_of::<u64>();

#[inline(always)]
fn align_up(value: usize) -> Option<usize> {
    value
        .checked_add(FIELD_ALIGN - 1)
        .map(|v| v / FIELD_ALIGN * FIELD_ALIGN)
}

/// Byte layout of a single record: `[key][pad][datum][pad][next link]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RecordLayout {
    pub(crate) key_size: usize,
    pub(crate) datum_size: usize,
    pub(crate) datum_offset: usize,
    pub(crate) next_offset: usize,
    pub(crate) size: usize,
}

impl RecordLayout {
    pub(crate) fn new(key_size: usize, datum_size: usize) -> Result<Self, Error> {
        if key_size == 0 {
            return Err(Error::ZeroKeySize);
        }

        let overflow = Error::RecordSize {
            key_size,
            datum_size,
        };
        let datum_offset = align_up(key_size).ok_or(overflow.clone())?;
        let next_offset = align_up(datum_size)
            .and_then(|d| datum_offset.checked_add(d))
            .ok_or(overflow.clone())?;
        let size = next_offset.checked_add(LINK_SIZE).ok_or(overflow)?;

        Ok(RecordLayout {
            key_size,
            datum_size,
            datum_offset,
            next_offset,
            size,
        })
    }
}

/// Largest arena a single `Vec<u8>` can hold.
const MAX_ARENA_BYTES: usize = isize::MAX as usize;

/// Byte layout of a whole arena: the bucket head array followed by the
/// record pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ArenaLayout {
    pub(crate) record: RecordLayout,
    pub(crate) bucket_count: usize,
    pub(crate) capacity: usize,
    pub(crate) pool_offset: usize,
    pub(crate) size: usize,
}

impl ArenaLayout {
    /// Lays out an arena for `capacity` records.
    ///
    /// The bucket array holds `capacity / 2` heads, so each bucket is backed
    /// by two records of pool space on average. Callers clamp `capacity` to
    /// the table minimum before calling this.
    ///
    /// Fails if the arena would exceed `isize::MAX` bytes, the most a single
    /// allocation may hold.
    pub(crate) fn new(record: RecordLayout, capacity: usize) -> Result<Self, Error> {
        debug_assert!(capacity >= 2);
        let bucket_count = (capacity / 2).max(1);

        let overflow = Error::CapacityOverflow { capacity };
        let pool_offset = bucket_count.checked_mul(LINK_SIZE).ok_or(overflow.clone())?;
        let pool_size = capacity.checked_mul(record.size).ok_or(overflow.clone())?;
        let size = pool_offset
            .checked_add(pool_size)
            .filter(|size| *size <= MAX_ARENA_BYTES)
            .ok_or(overflow)?;

        Ok(ArenaLayout {
            record,
            bucket_count,
            capacity,
            pool_offset,
            size,
        })
    }

    #[inline(always)]
    pub(crate) fn bucket_offset(&self, bucket: usize) -> usize {
        debug_assert!(bucket < self.bucket_count);
        bucket * LINK_SIZE
    }

    #[inline(always)]
    pub(crate) fn record_offset(&self, slot: usize) -> usize {
        debug_assert!(slot < self.capacity);
        self.pool_offset + slot * self.record.size
    }
}
