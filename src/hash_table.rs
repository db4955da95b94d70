//! The arena-backed, separately chained hash table shared by
//! [`HashSet`](crate::HashSet) and [`HashMap`](crate::HashMap).
//!
//! Keys and data are fixed-size byte records. Every record lives in a single
//! [`SlotArena`] allocation laid out as a bucket head array followed by the
//! record pool; chains and the recycling list are threaded through the
//! records as pool indices.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::allocator::FreeList;
use crate::arena::Slot;
use crate::arena::SlotArena;
use crate::builder::DuplicatePolicy;
use crate::builder::GrowthPolicy;
use crate::builder::MIN_CAPACITY;
use crate::builder::TableConfig;
use crate::chain;
use crate::chain::Chain;
use crate::error::Error;
use crate::layout::ArenaLayout;
use crate::layout::RecordLayout;
use crate::ops::KeyOps;

/// Outcome of a successful [`HashTable::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// The key was new and a record was added.
    Inserted,
    /// The key was present and its datum was overwritten in place.
    Updated,
    /// The key was present and the table kept the original datum.
    Rejected,
}

/// Low-level hash table statistics.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct TableStats {
    /// Number of live records
    pub populated: usize,
    /// Element capacity of the arena
    pub capacity: usize,
    /// Number of buckets
    pub bucket_count: usize,
    /// Number of buckets holding at least one record
    pub occupied_buckets: usize,
    /// Live records that share their bucket with another record
    pub collisions: usize,
    /// Never-allocated pool slots
    pub unused: usize,
    /// Released pool slots awaiting reuse
    pub recycling: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Average chain length over occupied buckets
    pub mean_chain: f64,
    /// Size in bytes of one record
    pub record_size: usize,
    /// Total bytes in the arena
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl TableStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Buckets: {}/{} occupied, longest chain {}, mean chain {:.2}",
            self.occupied_buckets, self.bucket_count, self.longest_chain, self.mean_chain
        );
        println!("Collisions: {}", self.collisions);
        println!(
            "Free slots: {} unused, {} recycling",
            self.unused, self.recycling
        );
        println!(
            "Arena: {} bytes ({} bytes per record)",
            self.total_bytes, self.record_size
        );
    }
}

/// A separately chained hash table over fixed-size byte records.
///
/// `HashTable<O>` stores `key_size`-byte keys, each with a `datum_size`-byte
/// datum, and hashes and compares keys with the caller's [`KeyOps`]. Bytes
/// are copied in on insert and copied out on lookup.
///
/// The table has `capacity` record slots and `capacity / 2` buckets. New
/// records are spliced at the head of their bucket's chain, so a chain lists
/// its records newest first.
///
/// ## Example
///
/// ```rust
/// use arena_hash::HashTable;
/// use arena_hash::Insertion;
/// use arena_hash::ops::FnOps;
///
/// fn hash(key: &[u8]) -> u64 {
///     u64::from(key[0]) * 31 + u64::from(key[1])
/// }
///
/// fn equals(a: &[u8], b: &[u8]) -> bool {
///     a == b
/// }
///
/// let mut table = HashTable::with_capacity(2, 4, FnOps::new(hash, equals), 8).unwrap();
/// assert_eq!(
///     table.insert(b"id", &42u32.to_le_bytes()).unwrap(),
///     Insertion::Inserted
/// );
///
/// let mut out = [0u8; 4];
/// assert!(table.retrieve(b"id", &mut out).unwrap());
/// assert_eq!(u32::from_le_bytes(out), 42);
/// ```
#[derive(Clone)]
pub struct HashTable<O> {
    ops: O,
    duplicates: DuplicatePolicy,
    growth: GrowthPolicy,

    arena: SlotArena,
    free: FreeList,

    populated: usize,
    collisions: usize,
}

impl<O> Debug for HashTable<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let chains = (0..self.bucket_count())
            .map(|bucket| Chain::new(&self.arena, bucket).count())
            .collect::<Vec<_>>();

        f.debug_struct("HashTable")
            .field("key_size", &self.key_size())
            .field("datum_size", &self.datum_size())
            .field("populated", &self.populated)
            .field("capacity", &self.capacity())
            .field("collisions", &self.collisions)
            .field("unused", &self.free.unused())
            .field("recycling", &self.free.recycling())
            .field("duplicates", &self.duplicates)
            .field("growth", &self.growth)
            .field("chains", &chains)
            .finish()
    }
}

impl<O> HashTable<O> {
    #[inline(always)]
    fn record(&self) -> &RecordLayout {
        &self.arena.layout().record
    }

    /// Size in bytes of every key.
    pub fn key_size(&self) -> usize {
        self.record().key_size
    }

    /// Size in bytes of every datum; zero for key-only tables.
    pub fn datum_size(&self) -> usize {
        self.record().datum_size
    }

    /// Returns the number of records in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of records the table can hold before it must grow.
    pub fn capacity(&self) -> usize {
        self.arena.layout().capacity
    }

    /// Returns the number of buckets, `capacity / 2` rounded down and at
    /// least one.
    pub fn bucket_count(&self) -> usize {
        self.arena.layout().bucket_count
    }

    /// Returns the number of live records that share their bucket with at
    /// least one other record.
    ///
    /// This is a gauge of the current state, `len - occupied buckets`, not a
    /// running total: removing a record from a crowded bucket lowers it.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Returns the number of pool slots that have never held a record since
    /// the last resize or clear.
    pub fn unused(&self) -> usize {
        self.free.unused()
    }

    /// Returns the number of released pool slots waiting to be reused.
    pub fn recycling(&self) -> usize {
        self.free.recycling()
    }

    /// Returns the size in bytes of the arena backing the table.
    pub fn allocated_bytes(&self) -> usize {
        self.arena.size_bytes()
    }

    /// Returns the duplicate-key policy of this table.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Returns the full-table policy of this table.
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    pub(crate) fn set_duplicate_policy(&mut self, duplicates: DuplicatePolicy) {
        self.duplicates = duplicates;
    }

    /// Returns the key callbacks.
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Returns an iterator over every `(key, datum)` pair.
    ///
    /// Pairs are yielded bucket by bucket, each chain newest first. The
    /// order changes whenever the table is resized.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            next_bucket: 0,
            chain: None,
            remaining: self.populated,
        }
    }

    /// Removes every record while keeping the arena and its capacity.
    ///
    /// The arena is zero-filled in place, which empties every bucket and
    /// link at once.
    pub fn clear(&mut self) {
        self.arena.zero();
        self.free.reset();
        self.populated = 0;
        self.collisions = 0;
    }

    #[inline(always)]
    fn check_key(&self, key: &[u8]) -> Result<(), Error> {
        if key.len() != self.key_size() {
            return Err(Error::KeyLength {
                expected: self.key_size(),
                actual: key.len(),
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn check_datum(&self, datum: &[u8]) -> Result<(), Error> {
        if datum.len() != self.datum_size() {
            return Err(Error::DatumLength {
                expected: self.datum_size(),
                actual: datum.len(),
            });
        }
        Ok(())
    }

    /// Takes a free slot, fills it and splices it at the head of `bucket`.
    ///
    /// The caller guarantees the key is absent and the table is not full.
    fn link_new(&mut self, bucket: usize, key: &[u8], datum: &[u8]) -> Result<(), Error> {
        let slot = self.free.acquire(&mut self.arena)?;
        self.arena.write_key(slot, key);
        self.arena.write_datum(slot, datum);
        if chain::push_front(&mut self.arena, bucket, slot) {
            self.collisions += 1;
        }
        self.populated += 1;
        Ok(())
    }
}

impl<O: KeyOps> HashTable<O> {
    pub(crate) fn from_config(config: TableConfig, ops: O) -> Result<Self, Error> {
        let record = RecordLayout::new(config.key_size, config.datum_size)?;
        let capacity = config.capacity.max(MIN_CAPACITY);
        let layout = ArenaLayout::new(record, capacity)?;

        Ok(HashTable {
            ops,
            duplicates: config.duplicates,
            growth: config.growth,
            arena: SlotArena::new(layout)?,
            free: FreeList::new(capacity),
            populated: 0,
            collisions: 0,
        })
    }

    /// Creates a table for `key_size`-byte keys and `datum_size`-byte data
    /// with room for `capacity` records, overwriting duplicates and doubling
    /// when full.
    ///
    /// Use [`TableBuilder`](crate::TableBuilder) to pick other policies.
    pub fn with_capacity(
        key_size: usize,
        datum_size: usize,
        ops: O,
        capacity: usize,
    ) -> Result<Self, Error> {
        Self::from_config(
            TableConfig {
                key_size,
                datum_size,
                capacity,
                duplicates: DuplicatePolicy::default(),
                growth: GrowthPolicy::default(),
            },
            ops,
        )
    }

    #[inline(always)]
    fn bucket_index(&self, key: &[u8]) -> usize {
        (self.ops.hash(key) % self.bucket_count() as u64) as usize
    }

    #[inline]
    fn find_in(&self, bucket: usize, key: &[u8]) -> Option<Slot> {
        Chain::new(&self.arena, bucket).find(|&slot| self.ops.equals(key, self.arena.key(slot)))
    }

    /// Returns the stored datum for `key`. The key length is not checked.
    #[inline]
    pub(crate) fn find_datum(&self, key: &[u8]) -> Option<&[u8]> {
        debug_assert_eq!(key.len(), self.key_size());
        self.find_in(self.bucket_index(key), key)
            .map(|slot| self.arena.datum(slot))
    }

    /// Returns `true` if the table holds a key equal to `key`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyLength`] if `key` is not `key_size` bytes.
    pub fn contains(&self, key: &[u8]) -> Result<bool, Error> {
        self.check_key(key)?;
        Ok(self.find_datum(key).is_some())
    }

    /// Copies the datum stored for `key` into `out`.
    ///
    /// Returns `false` and leaves `out` untouched if the key is absent.
    ///
    /// # Errors
    ///
    /// [`Error::KeyLength`] or [`Error::DatumLength`] if `key` or `out` do
    /// not match the configured sizes.
    pub fn retrieve(&self, key: &[u8], out: &mut [u8]) -> Result<bool, Error> {
        self.check_key(key)?;
        self.check_datum(out)?;
        match self.find_datum(key) {
            Some(datum) => {
                out.copy_from_slice(datum);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns a copy of the datum stored for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyLength`] if `key` is not `key_size` bytes.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        self.check_key(key)?;
        Ok(self.find_datum(key).map(<[u8]>::to_vec))
    }

    /// Inserts `key` with `datum`.
    ///
    /// If an equal key is present the table's [`DuplicatePolicy`] decides
    /// between overwriting the datum ([`Insertion::Updated`]) and keeping it
    /// ([`Insertion::Rejected`]); neither changes any counter. A new key is
    /// spliced at the head of its bucket's chain. If every slot is taken the
    /// table first doubles its capacity, or fails under
    /// [`GrowthPolicy::Fixed`].
    ///
    /// # Errors
    ///
    /// - [`Error::KeyLength`] / [`Error::DatumLength`] for mis-sized input.
    /// - [`Error::AtCapacity`] when a fixed-size table is full. The table is
    ///   left unchanged.
    /// - [`Error::CapacityOverflow`] or [`Error::Allocation`] if the doubled
    ///   arena cannot be allocated.
    pub fn insert(&mut self, key: &[u8], datum: &[u8]) -> Result<Insertion, Error> {
        self.check_key(key)?;
        self.check_datum(datum)?;
        self.insert_record(key, datum)
    }

    /// [`insert`](Self::insert) without the length checks.
    pub(crate) fn insert_record(&mut self, key: &[u8], datum: &[u8]) -> Result<Insertion, Error> {
        debug_assert_eq!(key.len(), self.key_size());
        debug_assert_eq!(datum.len(), self.datum_size());

        let bucket = self.bucket_index(key);
        if let Some(slot) = self.find_in(bucket, key) {
            return match self.duplicates {
                DuplicatePolicy::Overwrite => {
                    self.arena.write_datum(slot, datum);
                    Ok(Insertion::Updated)
                }
                DuplicatePolicy::Reject => {
                    tracing::trace!(bucket, "rejected duplicate key");
                    Ok(Insertion::Rejected)
                }
            };
        }

        if self.populated < self.capacity() {
            self.link_new(bucket, key, datum)?;
            return Ok(Insertion::Inserted);
        }

        match self.growth {
            GrowthPolicy::Fixed => Err(Error::AtCapacity {
                capacity: self.capacity(),
            }),
            GrowthPolicy::Double => {
                self.grow()?;
                let bucket = self.bucket_index(key);
                self.link_new(bucket, key, datum)?;
                Ok(Insertion::Inserted)
            }
        }
    }

    /// Removes the record for `key`.
    ///
    /// Returns `false`, changing nothing, if the key is absent. The freed
    /// slot goes to the front of the recycling list and is the next one
    /// handed out.
    ///
    /// # Errors
    ///
    /// [`Error::KeyLength`] if `key` is not `key_size` bytes.
    pub fn remove(&mut self, key: &[u8]) -> Result<bool, Error> {
        self.check_key(key)?;
        Ok(self.remove_record(key))
    }

    /// [`remove`](Self::remove) without the length check.
    pub(crate) fn remove_record(&mut self, key: &[u8]) -> bool {
        debug_assert_eq!(key.len(), self.key_size());

        let bucket = self.bucket_index(key);
        let ops = &self.ops;
        let Some(unlinked) =
            chain::unlink(&mut self.arena, bucket, |stored| ops.equals(key, stored))
        else {
            return false;
        };

        self.free.release(&mut self.arena, unlinked.slot);
        self.populated -= 1;
        if unlinked.was_collision {
            self.collisions -= 1;
        }
        true
    }

    /// Removes the record for `key` and returns a copy of its datum.
    ///
    /// # Errors
    ///
    /// [`Error::KeyLength`] if `key` is not `key_size` bytes.
    pub fn take(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        self.check_key(key)?;
        let Some(datum) = self.find_datum(key).map(<[u8]>::to_vec) else {
            return Ok(None);
        };
        self.remove_record(key);
        Ok(Some(datum))
    }

    /// Rebuilds the table with room for `new_capacity` records.
    ///
    /// A fresh arena is allocated and every live record is linked into it
    /// through the same path as `insert`, so chains, counters and the free
    /// lists all start over. `new_capacity` is clamped to at least 2.
    ///
    /// Shrinking below [`len`](Self::len) keeps the first `new_capacity`
    /// records in bucket order and discards the rest; callers that cannot
    /// lose data must not shrink below `len`.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityOverflow`] if the arena would exceed `isize::MAX`
    /// bytes, or [`Error::Allocation`] if the allocator fails. Either way the
    /// table is left unchanged.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), Error> {
        let new_capacity = new_capacity.max(MIN_CAPACITY);
        let layout = ArenaLayout::new(*self.record(), new_capacity)?;

        let old_capacity = self.capacity();
        let live = self.populated;
        let old = core::mem::replace(&mut self.arena, SlotArena::new(layout)?);
        self.free = FreeList::new(new_capacity);
        self.populated = 0;
        self.collisions = 0;

        let mut dropped = 0usize;
        for old_bucket in 0..old.layout().bucket_count {
            for slot in Chain::new(&old, old_bucket) {
                if self.populated == new_capacity {
                    dropped += 1;
                    continue;
                }
                let key = old.key(slot);
                let bucket = self.bucket_index(key);
                self.link_new(bucket, key, old.datum(slot))?;
            }
        }

        tracing::debug!(old_capacity, new_capacity, live, "resized table");
        if dropped > 0 {
            tracing::warn!(
                dropped,
                new_capacity,
                "shrinking resize discarded records that no longer fit"
            );
        }

        Ok(())
    }

    #[cold]
    fn grow(&mut self) -> Result<(), Error> {
        self.resize(self.capacity().saturating_mul(2))
    }

    /// Makes room for at least `additional` more records, doubling the
    /// capacity as many times as needed. Does nothing if they already fit.
    ///
    /// # Errors
    ///
    /// Fails like [`resize`](Self::resize) with the doubled capacity, which
    /// saturates at `usize::MAX`.
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self.populated.saturating_add(additional);
        if required <= self.capacity() {
            return Ok(());
        }

        let mut capacity = self.capacity();
        while capacity < required {
            capacity = capacity.saturating_mul(2);
        }
        self.resize(capacity)
    }

    /// Shrinks the capacity to the number of records, never below 2.
    ///
    /// No records are lost. The next insert of a new key grows the table
    /// again.
    ///
    /// # Errors
    ///
    /// Only fails if a resize fails; see [`resize`](Self::resize).
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        let target = self.populated.max(MIN_CAPACITY);
        if target < self.capacity() {
            self.resize(target)?;
        }
        Ok(())
    }

    /// Returns detailed utilization statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> TableStats {
        let mut occupied_buckets = 0;
        let mut longest_chain = 0;
        for bucket in 0..self.bucket_count() {
            let length = Chain::new(&self.arena, bucket).count();
            if length > 0 {
                occupied_buckets += 1;
            }
            longest_chain = longest_chain.max(length);
        }

        TableStats {
            populated: self.populated,
            capacity: self.capacity(),
            bucket_count: self.bucket_count(),
            occupied_buckets,
            collisions: self.collisions,
            unused: self.free.unused(),
            recycling: self.free.recycling(),
            longest_chain,
            load_factor: self.populated as f64 / self.capacity() as f64,
            mean_chain: if occupied_buckets == 0 {
                0.0
            } else {
                self.populated as f64 / occupied_buckets as f64
            },
            record_size: self.record().size,
            total_bytes: self.arena.size_bytes(),
        }
    }

    /// Counts buckets by chain length: entry `n` is the number of buckets
    /// whose chain holds exactly `n` records.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_length_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];
        for bucket in 0..self.bucket_count() {
            let length = Chain::new(&self.arena, bucket).count();
            if length >= hist.len() {
                hist.resize(length + 1, 0);
            }
            hist[length] += 1;
        }
        hist
    }

    /// Prints the chain length histogram as a horizontal bar chart.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        let hist = self.chain_length_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!(
            "chain histogram ({} records, {} buckets):",
            self.populated,
            self.bucket_count()
        );
        for (length, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", length, "█".repeat(width), count);
        }
    }
}

/// An iterator over the `(key, datum)` pairs of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a> {
    arena: &'a SlotArena,
    next_bucket: usize,
    chain: Option<Chain<'a>>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((self.arena.key(slot), self.arena.datum(slot)));
            }
            if self.remaining == 0 || self.next_bucket >= self.arena.layout().bucket_count {
                return None;
            }
            self.chain = Some(Chain::new(self.arena, self.next_bucket));
            self.next_bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a, O> IntoIterator for &'a HashTable<O> {
    type IntoIter = Iter<'a>;
    type Item = (&'a [u8], &'a [u8]);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
