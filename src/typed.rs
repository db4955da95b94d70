//! Typed maps and sets over [`bytemuck::Pod`] keys and values.
//!
//! Key and datum sizes come from `size_of::<K>()` and `size_of::<V>()`, so
//! the byte-length errors of the untyped API cannot occur here. Values are
//! read back with an unaligned copy; the arena makes no alignment promises
//! beyond eight bytes.

use core::fmt::Debug;
use core::marker::PhantomData;
use core::mem::size_of;

use bytemuck::Pod;

use crate::builder::DEFAULT_CAPACITY;
use crate::builder::DuplicatePolicy;
use crate::builder::GrowthPolicy;
use crate::builder::TableConfig;
use crate::error::Error;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::hash_table::Insertion;
use crate::ops::KeyOps;

/// A map from `K` to `V`, both plain-old-data types.
///
/// Keys are hashed and compared as bytes by `O`, which makes
/// [`BytewiseOps`](crate::BytewiseOps) the natural choice for padding-free
/// keys.
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use arena_hash::PodMap;
///
/// let mut scores = PodMap::<u32, f32, _>::bytewise(16).unwrap();
/// scores.insert(&7, &0.5).unwrap();
/// scores.insert(&9, &1.5).unwrap();
///
/// assert_eq!(scores.get(&7), Some(0.5));
/// assert_eq!(scores.take(&9), Some(1.5));
/// assert_eq!(scores.len(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct PodMap<K, V, O> {
    table: HashTable<O>,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K: Pod + Debug, V: Pod + Debug, O> Debug for PodMap<K, V, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl<K: Pod, V: Pod> PodMap<K, V, crate::ops::BytewiseOps<crate::ops::DefaultHashBuilder>> {
    /// Creates a map that hashes and compares the key bytes.
    pub fn bytewise(capacity: usize) -> Result<Self, Error> {
        Self::with_ops(crate::ops::BytewiseOps::new(), capacity)
    }
}

impl<K: Pod, V: Pod, O: KeyOps> PodMap<K, V, O> {
    /// Creates a map that hashes and compares key bytes with `ops`.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroKeySize`] if `K` is zero-sized.
    pub fn with_ops(ops: O, capacity: usize) -> Result<Self, Error> {
        Ok(PodMap {
            table: HashTable::with_capacity(size_of::<K>(), size_of::<V>(), ops, capacity)?,
            _marker: PhantomData,
        })
    }

    /// Wraps a byte table whose key and datum sizes match `K` and `V`.
    pub fn from_table(table: HashTable<O>) -> Result<Self, Error> {
        if table.key_size() != size_of::<K>() {
            return Err(Error::KeyLength {
                expected: table.key_size(),
                actual: size_of::<K>(),
            });
        }
        if table.datum_size() != size_of::<V>() {
            return Err(Error::DatumLength {
                expected: table.datum_size(),
                actual: size_of::<V>(),
            });
        }
        Ok(PodMap {
            table,
            _marker: PhantomData,
        })
    }

    /// Inserts `value` under `key`.
    ///
    /// # Errors
    ///
    /// Only growth failures; see [`HashTable::insert`].
    pub fn insert(&mut self, key: &K, value: &V) -> Result<Insertion, Error> {
        self.table
            .insert_record(bytemuck::bytes_of(key), bytemuck::bytes_of(value))
    }

    /// Returns `true` if the map holds `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.table.find_datum(bytemuck::bytes_of(key)).is_some()
    }

    /// Returns a copy of the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.table
            .find_datum(bytemuck::bytes_of(key))
            .map(bytemuck::pod_read_unaligned)
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.table.remove_record(bytemuck::bytes_of(key))
    }

    /// Removes `key` and returns its value.
    pub fn take(&mut self, key: &K) -> Option<V> {
        let value = self.get(key)?;
        self.remove(key);
        Some(value)
    }

    /// Makes room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.reserve(additional)
    }

    /// Shrinks the capacity to the number of entries.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        self.table.shrink_to_fit()
    }
}

impl<K: Pod, V: Pod, O> PodMap<K, V, O> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over copies of every `(key, value)` pair.
    pub fn iter(&self) -> PodIter<'_, K, V> {
        PodIter {
            inner: self.table.iter(),
            _marker: PhantomData,
        }
    }

    /// Returns the underlying byte table.
    pub fn as_table(&self) -> &HashTable<O> {
        &self.table
    }
}

/// An iterator over the entries of a [`PodMap`], yielding copies.
pub struct PodIter<'a, K, V> {
    inner: hash_table::Iter<'a>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K: Pod, V: Pod> Iterator for PodIter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, datum)| {
            (
                bytemuck::pod_read_unaligned(key),
                bytemuck::pod_read_unaligned(datum),
            )
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Pod, V: Pod> ExactSizeIterator for PodIter<'_, K, V> {}

/// A set of plain-old-data keys.
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use arena_hash::PodSet;
///
/// let mut seen = PodSet::<[u8; 4], _>::bytewise(8).unwrap();
/// assert!(seen.insert(&[10, 0, 0, 1]).unwrap());
/// assert!(!seen.insert(&[10, 0, 0, 1]).unwrap());
/// assert!(seen.contains(&[10, 0, 0, 1]));
/// # }
/// ```
#[derive(Clone)]
pub struct PodSet<K, O> {
    table: HashTable<O>,
    _marker: PhantomData<fn(K)>,
}

impl<K: Pod + Debug, O> Debug for PodSet<K, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl<K: Pod> PodSet<K, crate::ops::BytewiseOps<crate::ops::DefaultHashBuilder>> {
    /// Creates a set that hashes and compares the key bytes.
    pub fn bytewise(capacity: usize) -> Result<Self, Error> {
        Self::with_ops(crate::ops::BytewiseOps::new(), capacity)
    }
}

impl<K: Pod, O: KeyOps> PodSet<K, O> {
    /// Creates a set that hashes and compares key bytes with `ops`.
    pub fn with_ops(ops: O, capacity: usize) -> Result<Self, Error> {
        let table = HashTable::from_config(
            TableConfig {
                key_size: size_of::<K>(),
                datum_size: 0,
                capacity,
                duplicates: DuplicatePolicy::Reject,
                growth: GrowthPolicy::Double,
            },
            ops,
        )?;
        Ok(PodSet {
            table,
            _marker: PhantomData,
        })
    }

    /// Creates a set with the default capacity.
    pub fn new(ops: O) -> Result<Self, Error> {
        Self::with_ops(ops, DEFAULT_CAPACITY)
    }

    /// Adds `key`, returning `false` if it was already present.
    pub fn insert(&mut self, key: &K) -> Result<bool, Error> {
        Ok(self.table.insert_record(bytemuck::bytes_of(key), &[])? == Insertion::Inserted)
    }

    /// Returns `true` if the set holds `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.table.find_datum(bytemuck::bytes_of(key)).is_some()
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.table.remove_record(bytemuck::bytes_of(key))
    }
}

impl<K: Pod, O> PodSet<K, O> {
    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Removes every key, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over copies of the keys.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = K> + '_ {
        self.table
            .iter()
            .map(|(key, _)| bytemuck::pod_read_unaligned(key))
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use core::hash::Hasher;

    use bytemuck::Zeroable;
    use siphasher::sip::SipHasher;
    use test_log::test;

    use super::*;
    use crate::ops::FnOps;

    fn sip(key: &[u8]) -> u64 {
        let mut hasher = SipHasher::new();
        hasher.write(key);
        hasher.finish()
    }

    fn same_bytes(a: &[u8], b: &[u8]) -> bool {
        a == b
    }

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    struct Sample {
        id: u32,
        level: i32,
        value: f64,
    }

    #[test]
    fn map_round_trips_structs() {
        let mut map = PodMap::<u64, Sample, _>::with_ops(FnOps::new(sip, same_bytes), 4).unwrap();
        for k in 0..50u64 {
            let sample = Sample {
                id: k as u32,
                level: -(k as i32),
                value: k as f64 * 1.25,
            };
            assert_eq!(map.insert(&k, &sample).unwrap(), Insertion::Inserted);
        }
        assert_eq!(map.len(), 50);
        assert_eq!(
            map.get(&17),
            Some(Sample {
                id: 17,
                level: -17,
                value: 21.25
            })
        );
        assert!(map.contains(&49));
        assert!(!map.contains(&50));

        assert!(map.remove(&17));
        assert!(!map.remove(&17));
        assert_eq!(map.get(&17), None);

        let collected = map.iter().collect::<BTreeMap<_, _>>();
        assert_eq!(collected.len(), 49);
        assert_eq!(collected[&3].id, 3);
    }

    #[test]
    fn map_updates_existing_keys() {
        let mut map = PodMap::<u16, u16, _>::with_ops(FnOps::new(sip, same_bytes), 8).unwrap();
        map.insert(&1, &10).unwrap();
        assert_eq!(map.insert(&1, &11).unwrap(), Insertion::Updated);
        assert_eq!(map.take(&1), Some(11));
        assert!(map.is_empty());
    }

    #[test]
    fn zero_sized_keys_are_rejected() {
        let err = PodMap::<(), u8, _>::with_ops(FnOps::new(sip, same_bytes), 8).err();
        assert_eq!(err, Some(Error::ZeroKeySize));
    }

    #[test]
    fn from_table_checks_sizes() {
        let table = HashTable::with_capacity(4, 8, FnOps::new(sip, same_bytes), 8).unwrap();
        assert!(PodMap::<u32, u64, _>::from_table(table.clone()).is_ok());
        assert_eq!(
            PodMap::<u64, u64, _>::from_table(table.clone()).err(),
            Some(Error::KeyLength {
                expected: 4,
                actual: 8
            })
        );
        assert_eq!(
            PodMap::<u32, u32, _>::from_table(table).err(),
            Some(Error::DatumLength {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn set_rejects_duplicates() {
        let mut set = PodSet::<u32, _>::new(FnOps::new(sip, same_bytes)).unwrap();
        assert!(set.insert(&5).unwrap());
        assert!(!set.insert(&5).unwrap());
        assert!(set.insert(&6).unwrap());
        assert!(set.contains(&5));
        assert!(set.remove(&5));
        assert!(!set.contains(&5));

        let keys = set.iter().collect::<Vec<_>>();
        assert_eq!(keys, [6]);

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    #[cfg(any(feature = "foldhash", feature = "std"))]
    fn bytewise_constructors() {
        let mut map = PodMap::<[u8; 3], u8, _>::bytewise(2).unwrap();
        map.insert(b"abc", &1).unwrap();
        map.insert(b"abd", &2).unwrap();
        map.insert(b"abe", &3).unwrap();
        assert_eq!(map.get(b"abd"), Some(2));
        assert_eq!(map.capacity(), 4);

        let mut set = PodSet::<u64, _>::bytewise(2).unwrap();
        for k in 0..10 {
            set.insert(&k).unwrap();
        }
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn debug_format() {
        let mut map = PodMap::<u8, u8, _>::with_ops(FnOps::new(sip, same_bytes), 2).unwrap();
        map.insert(&1, &2).unwrap();
        assert_eq!(alloc::format!("{map:?}"), "{1: 2}");
    }
}
