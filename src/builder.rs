use crate::error::Callback;
use crate::error::Error;
use crate::hash_table::HashTable;
use crate::ops::EqualsFn;
use crate::ops::FnOps;
use crate::ops::HashFn;
use crate::ops::KeyOps;

/// Element capacity used when none is requested.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Smallest element capacity a table will accept; smaller requests are
/// clamped up to it.
pub const MIN_CAPACITY: usize = 2;

/// What `insert` does when the key is already present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Overwrite the stored datum in place.
    #[default]
    Overwrite,
    /// Keep the stored datum and report the insert as rejected.
    Reject,
}

/// What `insert` does when a new key arrives and every slot is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Double the element capacity and then insert.
    #[default]
    Double,
    /// Fail with [`Error::AtCapacity`] and leave the table unchanged.
    Fixed,
}

/// Table configuration collected by [`TableBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TableConfig {
    pub(crate) key_size: usize,
    pub(crate) datum_size: usize,
    pub(crate) capacity: usize,
    pub(crate) duplicates: DuplicatePolicy,
    pub(crate) growth: GrowthPolicy,
}

/// Configures and builds a [`HashTable`].
///
/// # Examples
///
/// ```rust
/// use arena_hash::DuplicatePolicy;
/// use arena_hash::GrowthPolicy;
/// use arena_hash::TableBuilder;
///
/// fn hash(key: &[u8]) -> u64 {
///     u32::from_le_bytes([key[0], key[1], key[2], key[3]]) as u64
/// }
///
/// fn equals(a: &[u8], b: &[u8]) -> bool {
///     a == b
/// }
///
/// let mut table = TableBuilder::new(4)
///     .datum_size(8)
///     .capacity(16)
///     .duplicates(DuplicatePolicy::Reject)
///     .growth(GrowthPolicy::Fixed)
///     .hash_fn(hash)
///     .equals_fn(equals)
///     .build()
///     .unwrap();
///
/// table.insert(&7u32.to_le_bytes(), &1u64.to_le_bytes()).unwrap();
/// assert!(table.contains(&7u32.to_le_bytes()).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct TableBuilder {
    config: TableConfig,
    hash: Option<HashFn>,
    equals: Option<EqualsFn>,
}

impl TableBuilder {
    /// Starts a configuration for `key_size`-byte keys with no datum.
    pub fn new(key_size: usize) -> Self {
        TableBuilder {
            config: TableConfig {
                key_size,
                datum_size: 0,
                capacity: DEFAULT_CAPACITY,
                duplicates: DuplicatePolicy::default(),
                growth: GrowthPolicy::default(),
            },
            hash: None,
            equals: None,
        }
    }

    /// Sets the size in bytes of the datum stored with each key.
    pub fn datum_size(mut self, datum_size: usize) -> Self {
        self.config.datum_size = datum_size;
        self
    }

    /// Sets the initial element capacity. Values below [`MIN_CAPACITY`] are
    /// clamped.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the duplicate-key policy.
    pub fn duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.config.duplicates = duplicates;
        self
    }

    /// Sets the full-table policy.
    pub fn growth(mut self, growth: GrowthPolicy) -> Self {
        self.config.growth = growth;
        self
    }

    /// Sets the key hash function used by [`build`](Self::build).
    pub fn hash_fn(mut self, hash: HashFn) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Sets the key equality function used by [`build`](Self::build).
    pub fn equals_fn(mut self, equals: EqualsFn) -> Self {
        self.equals = Some(equals);
        self
    }

    /// Builds a table from the configured function pointers.
    ///
    /// Fails with [`Error::Unconfigured`] if either callback is missing.
    pub fn build(self) -> Result<HashTable<FnOps>, Error> {
        let hash = self.hash.ok_or(Error::Unconfigured(Callback::Hash))?;
        let equals = self.equals.ok_or(Error::Unconfigured(Callback::Equals))?;
        HashTable::from_config(self.config, FnOps::new(hash, equals))
    }

    /// Builds a table that uses `ops` for hashing and equality, ignoring any
    /// configured function pointers.
    pub fn build_with<O: KeyOps>(self, ops: O) -> Result<HashTable<O>, Error> {
        HashTable::from_config(self.config, ops)
    }

    /// Builds a table that hashes raw key bytes with the default hasher and
    /// compares keys byte-for-byte.
    #[cfg(any(feature = "foldhash", feature = "std"))]
    pub fn build_bytewise(
        self,
    ) -> Result<HashTable<crate::ops::BytewiseOps<crate::ops::DefaultHashBuilder>>, Error> {
        HashTable::from_config(self.config, crate::ops::BytewiseOps::new())
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> TableConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_byte(key: &[u8]) -> u64 {
        key[0] as u64
    }

    fn same_bytes(a: &[u8], b: &[u8]) -> bool {
        a == b
    }

    #[test]
    fn missing_callbacks_fail_at_build_time() {
        let err = TableBuilder::new(4).equals_fn(same_bytes).build().err();
        assert_eq!(err, Some(Error::Unconfigured(Callback::Hash)));

        let err = TableBuilder::new(4).hash_fn(first_byte).build().err();
        assert_eq!(err, Some(Error::Unconfigured(Callback::Equals)));

        let err = TableBuilder::new(4).build().err();
        assert_eq!(err, Some(Error::Unconfigured(Callback::Hash)));
    }

    #[test]
    fn defaults() {
        let builder = TableBuilder::new(4);
        let config = builder.config();
        assert_eq!(config.datum_size, 0);
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.duplicates, DuplicatePolicy::Overwrite);
        assert_eq!(config.growth, GrowthPolicy::Double);
    }

    #[test]
    fn capacity_is_clamped_to_minimum() {
        let table = TableBuilder::new(1)
            .capacity(0)
            .hash_fn(first_byte)
            .equals_fn(same_bytes)
            .build()
            .unwrap();
        assert_eq!(table.capacity(), MIN_CAPACITY);
        assert_eq!(table.bucket_count(), 1);
    }

    #[test]
    fn zero_key_size_is_rejected() {
        let err = TableBuilder::new(0)
            .hash_fn(first_byte)
            .equals_fn(same_bytes)
            .build()
            .err();
        assert_eq!(err, Some(Error::ZeroKeySize));
    }

    #[test]
    fn build_with_accepts_closures() {
        let table = TableBuilder::new(2)
            .datum_size(3)
            .capacity(8)
            .build_with((|k: &[u8]| k[1] as u64, |a: &[u8], b: &[u8]| a == b))
            .unwrap();
        assert_eq!(table.key_size(), 2);
        assert_eq!(table.datum_size(), 3);
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.bucket_count(), 4);
    }
}
