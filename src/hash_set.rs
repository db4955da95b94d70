use core::fmt::Debug;

use crate::builder::DEFAULT_CAPACITY;
use crate::builder::DuplicatePolicy;
use crate::builder::GrowthPolicy;
use crate::builder::TableConfig;
use crate::error::Error;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::hash_table::Insertion;
use crate::ops::EqualsFn;
use crate::ops::FnOps;
use crate::ops::HashFn;
use crate::ops::KeyOps;

/// A set of fixed-size byte keys.
///
/// `HashSet<O>` is a [`HashTable`] whose records carry no datum. Inserting a
/// key that is already present leaves the set unchanged and reports `false`.
///
/// # Examples
///
/// ```rust
/// use arena_hash::HashSet;
///
/// fn hash(key: &[u8]) -> u64 {
///     u16::from_le_bytes([key[0], key[1]]) as u64
/// }
///
/// fn equals(a: &[u8], b: &[u8]) -> bool {
///     a == b
/// }
///
/// let mut ports = HashSet::new(2, hash, equals).unwrap();
/// assert!(ports.insert(&443u16.to_le_bytes()).unwrap());
/// assert!(!ports.insert(&443u16.to_le_bytes()).unwrap());
/// assert!(ports.contains(&443u16.to_le_bytes()).unwrap());
/// assert_eq!(ports.len(), 1);
/// ```
#[derive(Clone)]
pub struct HashSet<O> {
    table: HashTable<O>,
}

impl<O> Debug for HashSet<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl HashSet<FnOps> {
    /// Creates a set of `key_size`-byte keys with the default capacity.
    pub fn new(key_size: usize, hash: HashFn, equals: EqualsFn) -> Result<Self, Error> {
        Self::with_capacity(key_size, hash, equals, DEFAULT_CAPACITY)
    }

    /// Creates a set of `key_size`-byte keys with room for `capacity` keys
    /// before it grows.
    pub fn with_capacity(
        key_size: usize,
        hash: HashFn,
        equals: EqualsFn,
        capacity: usize,
    ) -> Result<Self, Error> {
        Self::with_ops(key_size, FnOps::new(hash, equals), capacity)
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl HashSet<crate::ops::BytewiseOps<crate::ops::DefaultHashBuilder>> {
    /// Creates a set that hashes and compares the raw key bytes.
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use arena_hash::HashSet;
    ///
    /// let mut seen = HashSet::bytewise(16, 64).unwrap();
    /// assert!(seen.insert(&[0xab; 16]).unwrap());
    /// assert!(seen.contains(&[0xab; 16]).unwrap());
    /// # }
    /// ```
    pub fn bytewise(key_size: usize, capacity: usize) -> Result<Self, Error> {
        Self::with_ops(key_size, crate::ops::BytewiseOps::new(), capacity)
    }
}

impl<O: KeyOps> HashSet<O> {
    /// Creates a set that hashes and compares keys with `ops`.
    pub fn with_ops(key_size: usize, ops: O, capacity: usize) -> Result<Self, Error> {
        let table = HashTable::from_config(
            TableConfig {
                key_size,
                datum_size: 0,
                capacity,
                duplicates: DuplicatePolicy::Reject,
                growth: GrowthPolicy::Double,
            },
            ops,
        )?;
        Ok(HashSet { table })
    }

    /// Wraps a key-only table, for example one built with a fixed growth
    /// policy by [`TableBuilder`](crate::TableBuilder).
    ///
    /// The table's duplicate policy is switched to
    /// [`DuplicatePolicy::Reject`].
    ///
    /// # Errors
    ///
    /// [`Error::DatumLength`] if the table stores a datum.
    pub fn from_table(mut table: HashTable<O>) -> Result<Self, Error> {
        if table.datum_size() != 0 {
            return Err(Error::DatumLength {
                expected: 0,
                actual: table.datum_size(),
            });
        }
        table.set_duplicate_policy(DuplicatePolicy::Reject);
        Ok(HashSet { table })
    }

    /// Adds `key` to the set.
    ///
    /// Returns `true` if the key was new and `false` if an equal key was
    /// already present; in that case nothing changes.
    ///
    /// # Errors
    ///
    /// See [`HashTable::insert`].
    pub fn insert(&mut self, key: &[u8]) -> Result<bool, Error> {
        Ok(self.table.insert(key, &[])? == Insertion::Inserted)
    }

    /// Returns `true` if the set contains a key equal to `key`.
    pub fn contains(&self, key: &[u8]) -> Result<bool, Error> {
        self.table.contains(key)
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &[u8]) -> Result<bool, Error> {
        self.table.remove(key)
    }

    /// Rebuilds the set with room for `new_capacity` keys.
    ///
    /// See [`HashTable::resize`] for what happens below [`len`](Self::len).
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), Error> {
        self.table.resize(new_capacity)
    }

    /// Makes room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.reserve(additional)
    }

    /// Shrinks the capacity to the number of keys.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        self.table.shrink_to_fit()
    }
}

impl<O> HashSet<O> {
    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of keys the set can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the size in bytes of every key.
    pub fn key_size(&self) -> usize {
        self.table.key_size()
    }

    /// Returns the number of keys sharing a bucket with another key.
    pub fn collisions(&self) -> usize {
        self.table.collisions()
    }

    /// Removes every key, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the keys.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
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

/// An iterator over the keys of a [`HashSet`].
pub struct Iter<'a> {
    inner: hash_table::Iter<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a, O> IntoIterator for &'a HashSet<O> {
    type IntoIter = Iter<'a>;
    type Item = &'a [u8];

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
