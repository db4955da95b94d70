use alloc::vec::Vec;
use core::fmt::Debug;

use crate::builder::DEFAULT_CAPACITY;
use crate::error::Error;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::hash_table::Insertion;
use crate::ops::EqualsFn;
use crate::ops::FnOps;
use crate::ops::HashFn;
use crate::ops::KeyOps;

/// A map from fixed-size byte keys to fixed-size byte data.
///
/// `HashMap<O>` is a thin facade over [`HashTable`]. By default inserting an
/// existing key overwrites its datum; build the table with
/// [`DuplicatePolicy::Reject`](crate::DuplicatePolicy::Reject) and convert it
/// with [`From`] to keep the first datum instead.
///
/// # Examples
///
/// ```rust
/// use arena_hash::HashMap;
/// use arena_hash::Insertion;
///
/// fn hash(key: &[u8]) -> u64 {
///     u32::from_le_bytes([key[0], key[1], key[2], key[3]]) as u64
/// }
///
/// fn equals(a: &[u8], b: &[u8]) -> bool {
///     a == b
/// }
///
/// let mut map = HashMap::with_capacity(4, 8, hash, equals, 32).unwrap();
/// let key = 17u32.to_le_bytes();
///
/// assert_eq!(map.insert(&key, &1.5f64.to_le_bytes()).unwrap(), Insertion::Inserted);
/// assert_eq!(map.insert(&key, &2.5f64.to_le_bytes()).unwrap(), Insertion::Updated);
///
/// let mut out = [0u8; 8];
/// assert!(map.retrieve(&key, &mut out).unwrap());
/// assert_eq!(f64::from_le_bytes(out), 2.5);
/// ```
#[derive(Clone)]
pub struct HashMap<O> {
    table: HashTable<O>,
}

impl<O> Debug for HashMap<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<O> From<HashTable<O>> for HashMap<O> {
    fn from(table: HashTable<O>) -> Self {
        HashMap { table }
    }
}

impl HashMap<FnOps> {
    /// Creates a map with the default capacity.
    pub fn new(
        key_size: usize,
        datum_size: usize,
        hash: HashFn,
        equals: EqualsFn,
    ) -> Result<Self, Error> {
        Self::with_capacity(key_size, datum_size, hash, equals, DEFAULT_CAPACITY)
    }

    /// Creates a map with room for `capacity` entries before it grows.
    pub fn with_capacity(
        key_size: usize,
        datum_size: usize,
        hash: HashFn,
        equals: EqualsFn,
        capacity: usize,
    ) -> Result<Self, Error> {
        Self::with_ops(key_size, datum_size, FnOps::new(hash, equals), capacity)
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl HashMap<crate::ops::BytewiseOps<crate::ops::DefaultHashBuilder>> {
    /// Creates a map that hashes and compares the raw key bytes.
    pub fn bytewise(key_size: usize, datum_size: usize, capacity: usize) -> Result<Self, Error> {
        Self::with_ops(
            key_size,
            datum_size,
            crate::ops::BytewiseOps::new(),
            capacity,
        )
    }
}

impl<O: KeyOps> HashMap<O> {
    /// Creates a map that hashes and compares keys with `ops`.
    pub fn with_ops(
        key_size: usize,
        datum_size: usize,
        ops: O,
        capacity: usize,
    ) -> Result<Self, Error> {
        Ok(HashMap {
            table: HashTable::with_capacity(key_size, datum_size, ops, capacity)?,
        })
    }

    /// Inserts `datum` under `key`. See [`HashTable::insert`].
    pub fn insert(&mut self, key: &[u8], datum: &[u8]) -> Result<Insertion, Error> {
        self.table.insert(key, datum)
    }

    /// Returns `true` if the map holds `key`.
    pub fn contains(&self, key: &[u8]) -> Result<bool, Error> {
        self.table.contains(key)
    }

    /// Copies the datum for `key` into `out`, returning whether it was found.
    pub fn retrieve(&self, key: &[u8], out: &mut [u8]) -> Result<bool, Error> {
        self.table.retrieve(key, out)
    }

    /// Returns a copy of the datum for `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        self.table.get(key)
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &[u8]) -> Result<bool, Error> {
        self.table.remove(key)
    }

    /// Removes `key` and returns its datum.
    pub fn take(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        self.table.take(key)
    }

    /// Rebuilds the map with room for `new_capacity` entries.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), Error> {
        self.table.resize(new_capacity)
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

impl<O> HashMap<O> {
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

    /// Returns the number of entries sharing a bucket with another entry.
    pub fn collisions(&self) -> usize {
        self.table.collisions()
    }

    /// Removes every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over `(key, datum)` pairs.
    pub fn iter(&self) -> hash_table::Iter<'_> {
        self.table.iter()
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the data.
    pub fn values(&self) -> Values<'_> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// Returns the underlying table, for its counters and statistics.
    pub fn as_table(&self) -> &HashTable<O> {
        &self.table
    }

    /// Unwraps the underlying table.
    pub fn into_table(self) -> HashTable<O> {
        self.table
    }
}

impl<'a, O> IntoIterator for &'a HashMap<O> {
    type IntoIter = hash_table::Iter<'a>;
    type Item = (&'a [u8], &'a [u8]);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a> {
    inner: hash_table::Iter<'a>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}

/// An iterator over the data of a [`HashMap`].
pub struct Values<'a> {
    inner: hash_table::Iter<'a>,
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, datum)| datum)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use core::hash::Hasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;
    use test_log::test;

    use super::*;
    use crate::builder::DuplicatePolicy;
    use crate::builder::TableBuilder;

    /// A sensor reading packed as `u32 id, i8 level, f64 value`.
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Reading {
        id: u32,
        level: i8,
        value: f64,
    }

    impl Reading {
        const SIZE: usize = 13;

        fn for_key(key: u64) -> Self {
            Reading {
                id: key as u32 * 3,
                level: (key % 100) as i8 - 50,
                value: key as f64 / 4.0,
            }
        }

        fn to_bytes(self) -> [u8; Self::SIZE] {
            let mut out = [0u8; Self::SIZE];
            out[..4].copy_from_slice(&self.id.to_le_bytes());
            out[4] = self.level as u8;
            out[5..].copy_from_slice(&self.value.to_le_bytes());
            out
        }

        fn from_bytes(bytes: &[u8]) -> Self {
            Reading {
                id: u32::from_le_bytes(bytes[..4].try_into().unwrap()),
                level: bytes[4] as i8,
                value: f64::from_le_bytes(bytes[5..].try_into().unwrap()),
            }
        }
    }

    fn sip(key: &[u8]) -> u64 {
        let mut hasher = SipHasher::new_with_keys(7, 11);
        hasher.write(key);
        hasher.finish()
    }

    fn identity(key: &[u8]) -> u64 {
        u64::from_le_bytes(key.try_into().unwrap())
    }

    fn same_bytes(a: &[u8], b: &[u8]) -> bool {
        a == b
    }

    fn readings_map(hash: HashFn) -> HashMap<FnOps> {
        HashMap::with_capacity(8, Reading::SIZE, hash, same_bytes, 32).unwrap()
    }

    fn lookup<O: KeyOps>(map: &HashMap<O>, key: u64) -> Option<Reading> {
        let mut out = [0u8; Reading::SIZE];
        map.retrieve(&key.to_le_bytes(), &mut out)
            .unwrap()
            .then(|| Reading::from_bytes(&out))
    }

    #[test]
    fn test_new() {
        let map = HashMap::new(8, 4, sip, same_bytes).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), DEFAULT_CAPACITY);
        assert_eq!(map.as_table().datum_size(), 4);
    }

    #[test]
    fn test_first_wave_then_colliding_wave() {
        // Identity hashing over 16 buckets: keys k and k + 16 share a bucket.
        let mut map = readings_map(identity);
        for key in 0..16u64 {
            map.insert(&key.to_le_bytes(), &Reading::for_key(key).to_bytes())
                .unwrap();
        }
        assert_eq!(map.collisions(), 0);

        for key in 16..28u64 {
            map.insert(&key.to_le_bytes(), &Reading::for_key(key).to_bytes())
                .unwrap();
        }
        assert_eq!(map.len(), 28);
        assert_eq!(map.collisions(), 12);
        assert_eq!(map.capacity(), 32);

        for key in 0..28u64 {
            assert_eq!(lookup(&map, key), Some(Reading::for_key(key)));
        }
        assert_eq!(lookup(&map, 28), None);

        for key in (0..28u64).step_by(2) {
            assert!(map.remove(&key.to_le_bytes()).unwrap());
        }
        assert_eq!(map.len(), 14);
        // Odd keys 1..=11 still share a bucket with 17..=27; 13 and 15 are alone.
        assert_eq!(map.collisions(), 6);
        assert_eq!(map.as_table().recycling(), 14);
        for key in 0..28u64 {
            let expected = (key % 2 == 1).then(|| Reading::for_key(key));
            assert_eq!(lookup(&map, key), expected);
        }
    }

    #[test]
    fn test_overwrite_updates_in_place() {
        let mut map = readings_map(sip);
        let key = 5u64.to_le_bytes();
        map.insert(&key, &Reading::for_key(1).to_bytes()).unwrap();
        assert_eq!(
            map.insert(&key, &Reading::for_key(2).to_bytes()).unwrap(),
            Insertion::Updated
        );
        assert_eq!(map.len(), 1);
        assert_eq!(lookup(&map, 5), Some(Reading::for_key(2)));
    }

    #[test]
    fn test_reject_policy_via_builder() {
        let table = TableBuilder::new(8)
            .datum_size(Reading::SIZE)
            .duplicates(DuplicatePolicy::Reject)
            .hash_fn(sip)
            .equals_fn(same_bytes)
            .build()
            .unwrap();
        let mut map = HashMap::from(table);
        let key = 5u64.to_le_bytes();
        map.insert(&key, &Reading::for_key(1).to_bytes()).unwrap();
        assert_eq!(
            map.insert(&key, &Reading::for_key(2).to_bytes()).unwrap(),
            Insertion::Rejected
        );
        assert_eq!(lookup(&map, 5), Some(Reading::for_key(1)));
    }

    #[test]
    fn test_get_and_take() {
        let mut map = readings_map(sip);
        let key = 9u64.to_le_bytes();
        assert_eq!(map.get(&key).unwrap(), None);
        map.insert(&key, &Reading::for_key(9).to_bytes()).unwrap();

        assert_eq!(
            map.get(&key).unwrap(),
            Some(Reading::for_key(9).to_bytes().to_vec())
        );
        assert_eq!(
            map.take(&key).unwrap(),
            Some(Reading::for_key(9).to_bytes().to_vec())
        );
        assert!(!map.contains(&key).unwrap());
        assert_eq!(map.take(&key).unwrap(), None);
    }

    #[test]
    fn test_keys_values_iter() {
        let mut map = HashMap::with_capacity(1, 1, |k| k[0] as u64, same_bytes, 8).unwrap();
        for k in 0..5u8 {
            map.insert(&[k], &[k * 10]).unwrap();
        }

        let pairs = map
            .iter()
            .map(|(k, v)| (k[0], v[0]))
            .collect::<BTreeMap<_, _>>();
        assert_eq!(
            pairs,
            (0..5u8).map(|k| (k, k * 10)).collect::<BTreeMap<_, _>>()
        );

        let mut keys = map.keys().map(|k| k[0]).collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, [0, 1, 2, 3, 4]);

        let mut values = map.values().map(|v| v[0]).collect::<Vec<_>>();
        values.sort();
        assert_eq!(values, [0, 10, 20, 30, 40]);
        assert_eq!(map.keys().len(), 5);
        assert_eq!((&map).into_iter().count(), 5);
    }

    #[test]
    fn test_clear_and_shrink() {
        let mut map = readings_map(sip);
        for key in 0..20u64 {
            map.insert(&key.to_le_bytes(), &Reading::for_key(key).to_bytes())
                .unwrap();
        }
        map.shrink_to_fit().unwrap();
        assert_eq!(map.capacity(), 20);
        map.reserve(1).unwrap();
        assert_eq!(map.capacity(), 40);
        map.resize(20).unwrap();
        assert_eq!(map.len(), 20);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.collisions(), 0);
        assert_eq!(map.capacity(), 20);
        assert_eq!(lookup(&map, 3), None);
    }

    #[test]
    fn test_debug_format() {
        let mut map = HashMap::with_capacity(1, 1, |k| k[0] as u64, same_bytes, 4).unwrap();
        map.insert(&[1], &[2]).unwrap();
        assert_eq!(alloc::format!("{map:?}"), "{[1]: [2]}");
    }

    #[test]
    #[cfg(any(feature = "foldhash", feature = "std"))]
    fn test_bytewise() {
        let mut map = HashMap::bytewise(4, 4, 2).unwrap();
        for i in 0..64u32 {
            map.insert(&i.to_le_bytes(), &(i * i).to_le_bytes()).unwrap();
        }
        for i in 0..64u32 {
            assert_eq!(
                map.get(&i.to_le_bytes()).unwrap(),
                Some((i * i).to_le_bytes().to_vec())
            );
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_random_against_btreemap() {
        let mut rng = SmallRng::seed_from_u64(0xdecaf);
        let mut map = readings_map(sip);
        let mut model = BTreeMap::new();

        for _ in 0..5000 {
            let key = rng.random_range(0..256u64);
            match rng.random_range(0..4u32) {
                0 | 1 => {
                    let reading = Reading::for_key(rng.random_range(0..1000));
                    let expected = if model.insert(key, reading).is_some() {
                        Insertion::Updated
                    } else {
                        Insertion::Inserted
                    };
                    assert_eq!(
                        map.insert(&key.to_le_bytes(), &reading.to_bytes()).unwrap(),
                        expected
                    );
                }
                2 => {
                    let expected = model.remove(&key).map(|r| r.to_bytes().to_vec());
                    assert_eq!(map.take(&key.to_le_bytes()).unwrap(), expected);
                }
                _ => {
                    assert_eq!(lookup(&map, key), model.get(&key).copied());
                }
            }
            assert_eq!(map.len(), model.len());
        }
    }
}
