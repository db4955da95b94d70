//! Error types for the `arena-hash` crate

use core::fmt;

/// The caller-supplied callback a table was built without.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Callback {
    /// The key hash function.
    Hash,
    /// The key equality function.
    Equals,
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Hash => f.write_str("hash"),
            Callback::Equals => f.write_str("equals"),
        }
    }
}

/// Errors applicable to constructing and operating on a table.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A table was built without one of its key callbacks.
    ///
    /// Tables never fall back to a placeholder hash or equality function;
    /// a missing callback is reported when the table is built rather than
    /// on its first lookup.
    #[error("no {0} function was configured for the table")]
    Unconfigured(Callback),

    /// Keys must occupy at least one byte.
    #[error("key size must be non-zero")]
    ZeroKeySize,

    /// The table is full and was configured not to grow.
    ///
    /// The caller must `resize` the table before inserting another key.
    #[error("table is at capacity ({capacity} records) and does not grow")]
    AtCapacity {
        /// The element capacity of the table.
        capacity: usize,
    },

    /// A key slice did not match the table's configured key size.
    #[error("key is {actual} bytes but the table stores {expected}-byte keys")]
    KeyLength {
        /// The configured key size.
        expected: usize,
        /// The length of the slice that was passed in.
        actual: usize,
    },

    /// A datum slice or output buffer did not match the table's configured
    /// datum size.
    #[error("datum is {actual} bytes but the table stores {expected}-byte data")]
    DatumLength {
        /// The configured datum size.
        expected: usize,
        /// The length of the slice that was passed in.
        actual: usize,
    },

    /// A single record of the configured key and datum sizes does not fit
    /// in `usize` once padded and linked.
    #[error("a {key_size}-byte key with a {datum_size}-byte datum overflows the address space")]
    RecordSize {
        /// The configured key size.
        key_size: usize,
        /// The configured datum size.
        datum_size: usize,
    },

    /// The arena for the requested capacity is larger than `isize::MAX`
    /// bytes.
    ///
    /// Growth that cannot even represent the next capacity reports
    /// `usize::MAX`.
    #[error("an arena for {capacity} records overflows the address space")]
    CapacityOverflow {
        /// The requested element capacity, saturated at `usize::MAX`.
        capacity: usize,
    },

    /// The allocator could not provide the arena.
    #[error("failed to allocate a {bytes}-byte arena")]
    Allocation {
        /// The arena size in bytes.
        bytes: usize,
    },
}
