use core::hash::BuildHasher;

/// Signature of a key hash callback.
pub type HashFn = fn(&[u8]) -> u64;

/// Signature of a key equality callback.
pub type EqualsFn = fn(&[u8], &[u8]) -> bool;

/// Caller-supplied hashing and equality over raw key bytes.
///
/// Both functions must be pure and total over the key domain, and
/// `equals(a, b)` must imply `hash(a) == hash(b)`. Breaking that contract
/// does not corrupt a table, but lookups may miss keys that are present.
pub trait KeyOps {
    /// Hashes a key.
    fn hash(&self, key: &[u8]) -> u64;

    /// Compares a query key against a stored key.
    fn equals(&self, query: &[u8], stored: &[u8]) -> bool;
}

/// Key callbacks given as plain function pointers.
#[derive(Clone, Copy, Debug)]
pub struct FnOps {
    hash: HashFn,
    equals: EqualsFn,
}

impl FnOps {
    /// Pairs a hash function with an equality function.
    pub fn new(hash: HashFn, equals: EqualsFn) -> Self {
        FnOps { hash, equals }
    }
}

impl KeyOps for FnOps {
    #[inline(always)]
    fn hash(&self, key: &[u8]) -> u64 {
        (self.hash)(key)
    }

    #[inline(always)]
    fn equals(&self, query: &[u8], stored: &[u8]) -> bool {
        (self.equals)(query, stored)
    }
}

impl<H, E> KeyOps for (H, E)
where
    H: Fn(&[u8]) -> u64,
    E: Fn(&[u8], &[u8]) -> bool,
{
    #[inline(always)]
    fn hash(&self, key: &[u8]) -> u64 {
        (self.0)(key)
    }

    #[inline(always)]
    fn equals(&self, query: &[u8], stored: &[u8]) -> bool {
        (self.1)(query, stored)
    }
}

/// Hashes the raw key bytes with a [`BuildHasher`] and compares keys
/// byte-for-byte.
///
/// This is the right choice whenever two keys are equal exactly when their
/// bytes are, which holds for integers, byte arrays and padding-free structs
/// of those.
#[derive(Clone, Debug, Default)]
pub struct BytewiseOps<S> {
    hash_builder: S,
}

impl<S> BytewiseOps<S> {
    /// Uses `hash_builder` to hash key bytes.
    pub fn with_hasher(hash_builder: S) -> Self {
        BytewiseOps { hash_builder }
    }
}

impl<S: BuildHasher> KeyOps for BytewiseOps<S> {
    #[inline(always)]
    fn hash(&self, key: &[u8]) -> u64 {
        self.hash_builder.hash_one(key)
    }

    #[inline(always)]
    fn equals(&self, query: &[u8], stored: &[u8]) -> bool {
        query == stored
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`BytewiseOps`] when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`BytewiseOps`] when none is given.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl BytewiseOps<DefaultHashBuilder> {
    /// Bytewise key callbacks with a freshly seeded default hasher.
    pub fn new() -> Self {
        BytewiseOps::with_hasher(DefaultHashBuilder::default())
    }
}
