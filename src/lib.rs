#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod allocator;
mod arena;
mod builder;
mod chain;
mod layout;

pub mod error;

/// A map facade over the byte table.
///
/// This module provides a `HashMap` that wraps the `HashTable` and stores a
/// fixed-size datum with every key.
pub mod hash_map;

pub mod hash_table;

/// A set facade over the byte table.
///
/// This module provides a `HashSet` that wraps a key-only `HashTable` and
/// rejects duplicate keys.
pub mod hash_set;

/// Key hashing and equality callbacks.
pub mod ops;

#[cfg(feature = "pod")]
pub mod typed;

pub use builder::DEFAULT_CAPACITY;
pub use builder::DuplicatePolicy;
pub use builder::GrowthPolicy;
pub use builder::MIN_CAPACITY;
pub use builder::TableBuilder;
pub use error::Callback;
pub use error::Error;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
#[cfg(feature = "stats")]
pub use hash_table::TableStats;
pub use hash_table::HashTable;
pub use hash_table::Insertion;
pub use ops::BytewiseOps;
#[cfg(any(feature = "foldhash", feature = "std"))]
pub use ops::DefaultHashBuilder;
pub use ops::FnOps;
pub use ops::KeyOps;
#[cfg(feature = "pod")]
pub use typed::PodMap;
#[cfg(feature = "pod")]
pub use typed::PodSet;
