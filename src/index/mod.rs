//! Hash Indexes - key → index dictionaries for serialize-side vocabularies
//!
//! - StringIndex: deduplicating string dictionary, optionally with a fixed entry
//! - QualifiedNameIndex: element/attribute names bucketed by key
//!
//! Both chain collisions per bucket and keep the full hash of each entry so
//! a resize relinks entries without hashing keys again.

pub mod qname_index;
pub mod string_index;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use qname_index::{Bucket, QualifiedNameIndex};
pub use string_index::StringIndex;

/// Largest bucket array a hash index grows to
pub const MAXIMUM_BUCKETS: usize = 1 << 20;

/// Load factor at which the bucket array doubles
pub const LOAD_FACTOR: f32 = 0.75;

/// Outcome of an obtain-or-insert lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obtained {
    /// Key was already present at this index
    Found(usize),
    /// Key was new and has been assigned this index
    Inserted(usize),
}

impl Obtained {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Obtained::Found(i) | Obtained::Inserted(i) => i,
        }
    }

    #[inline]
    pub fn is_inserted(self) -> bool {
        matches!(self, Obtained::Inserted(_))
    }
}

/// Hash a key and spread it across the low bits
#[inline]
pub(crate) fn key_hash(key: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let h = hasher.finish();
    mix((h ^ (h >> 32)) as u32)
}

/// Avalanche mix so that masking by `capacity - 1` uses every input bit
#[inline]
pub(crate) fn mix(h: u32) -> u32 {
    let mut h = h;
    h = h.wrapping_add(!(h << 9));
    h ^= h >> 14;
    h = h.wrapping_add(h << 4);
    h ^= h >> 10;
    h
}

/// Bucket for `hash` in a table of `len` buckets (`len` is a power of two)
#[inline]
pub(crate) fn bucket_for(hash: u32, len: usize) -> usize {
    hash as usize & (len - 1)
}

/// Power-of-two bucket count for a requested capacity, at most `MAXIMUM_BUCKETS`
#[inline]
pub(crate) fn bucket_count(capacity: usize) -> usize {
    capacity.clamp(1, MAXIMUM_BUCKETS).next_power_of_two()
}

#[inline]
pub(crate) fn threshold_for(buckets: usize) -> usize {
    if buckets >= MAXIMUM_BUCKETS {
        usize::MAX
    } else {
        (buckets as f32 * LOAD_FACTOR) as usize
    }
}

/// String equality with a pointer-identity fast path
#[inline]
pub(crate) fn same_str(a: &str, b: &str) -> bool {
    (a.as_ptr() == b.as_ptr() && a.len() == b.len()) || a == b
}
