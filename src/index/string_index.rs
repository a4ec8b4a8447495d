//! String Index
//!
//! Deduplicating string → index dictionary for the serialize side of a
//! vocabulary. Indices are dense and assigned in first-seen order, starting
//! after the read-only parent when the index is layered.
//!
//! Memory layout:
//! - `entries`: dynamic entries in insertion order (position = index - read_only_len)
//! - `buckets`: head entry of each hash chain
//! - each entry keeps its full hash and the next entry in its chain

use std::sync::Arc;

use tracing::{trace, warn};

use super::{bucket_count, bucket_for, key_hash, threshold_for, Obtained, MAXIMUM_BUCKETS};
use crate::error::{FastInfosetError, Result};

#[derive(Debug, Clone)]
struct Entry {
    key: Arc<str>,
    hash: u32,
    next: Option<u32>,
}

/// Hash dictionary assigning dense indices to strings
#[derive(Debug, Clone)]
pub struct StringIndex {
    name: &'static str,
    entries: Vec<Entry>,
    buckets: Vec<Option<u32>>,
    threshold: usize,
    parent: Option<Arc<StringIndex>>,
    read_only_len: usize,
    /// Reserved key held at index 0 while the index has no parent
    fixed: Option<Arc<str>>,
    maximum_entries: usize,
    total_characters: usize,
}

impl StringIndex {
    /// Create an empty index with `capacity` buckets (rounded to a power of two)
    pub fn new(name: &'static str, capacity: usize, maximum_entries: usize) -> Self {
        let capacity = bucket_count(capacity);
        StringIndex {
            name,
            entries: Vec::new(),
            buckets: vec![None; capacity],
            threshold: threshold_for(capacity),
            parent: None,
            read_only_len: 0,
            fixed: None,
            maximum_entries,
            total_characters: 0,
        }
    }

    /// Create an index whose index 0 is permanently reserved for `fixed`
    pub fn with_fixed_entry(
        name: &'static str,
        fixed: &str,
        capacity: usize,
        maximum_entries: usize,
    ) -> Self {
        let mut index = Self::new(name, capacity, maximum_entries.max(1));
        let fixed: Arc<str> = Arc::from(fixed);
        index.link(Arc::clone(&fixed), key_hash(&fixed));
        index.fixed = Some(fixed);
        index
    }

    /// Return the index of `key`, inserting it when absent
    pub fn obtain_index(&mut self, key: &str) -> Result<Obtained> {
        let hash = key_hash(key);
        if let Some(index) = self.parent.as_ref().and_then(|p| p.find(key, hash)) {
            return Ok(Obtained::Found(index));
        }
        if let Some(position) = self.find_local(key, hash) {
            return Ok(Obtained::Found(self.read_only_len + position));
        }
        self.insert(Arc::from(key), hash).map(Obtained::Inserted)
    }

    /// Insert `key` without checking whether it is already present
    pub fn add(&mut self, key: &str) -> Result<usize> {
        self.insert(Arc::from(key), key_hash(key))
    }

    /// Look up `key` without inserting
    pub fn get(&self, key: &str) -> Option<usize> {
        self.find(key, key_hash(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn find(&self, key: &str, hash: u32) -> Option<usize> {
        if let Some(index) = self.parent.as_ref().and_then(|p| p.find(key, hash)) {
            return Some(index);
        }
        self.find_local(key, hash)
            .map(|position| self.read_only_len + position)
    }

    fn find_local(&self, key: &str, hash: u32) -> Option<usize> {
        let mut cursor = self.buckets[bucket_for(hash, self.buckets.len())];
        while let Some(position) = cursor {
            let entry = &self.entries[position as usize];
            if entry.hash == hash && &*entry.key == key {
                return Some(position as usize);
            }
            cursor = entry.next;
        }
        None
    }

    fn insert(&mut self, key: Arc<str>, hash: u32) -> Result<usize> {
        if self.len() >= self.maximum_entries {
            warn!(table = self.name, limit = self.maximum_entries, "string index capacity exhausted");
            return Err(FastInfosetError::AllocationLimitExceeded {
                table: self.name,
                limit: self.maximum_entries,
            });
        }
        if self.entries.len() >= u32::MAX as usize {
            return Err(FastInfosetError::AllocationLimitExceeded {
                table: self.name,
                limit: u32::MAX as usize,
            });
        }
        let position = self.link(key, hash);
        Ok(self.read_only_len + position)
    }

    /// Push an entry at the head of its chain, growing the bucket array when loaded
    fn link(&mut self, key: Arc<str>, hash: u32) -> usize {
        let position = self.entries.len();
        let bucket = bucket_for(hash, self.buckets.len());
        self.total_characters += key.chars().count();
        self.entries.push(Entry {
            key,
            hash,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = Some(position as u32);

        if self.entries.len() > self.threshold {
            self.resize(self.buckets.len() * 2);
        }
        position
    }

    fn resize(&mut self, new_len: usize) {
        let new_len = new_len.min(MAXIMUM_BUCKETS);
        if new_len <= self.buckets.len() {
            self.threshold = usize::MAX;
            return;
        }
        trace!(table = self.name, buckets = new_len, "resizing string index");
        self.buckets.clear();
        self.buckets.resize(new_len, None);
        self.threshold = threshold_for(new_len);
        self.relink();
    }

    /// Rebuild every chain from the stored hashes
    fn relink(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = None);
        let len = self.buckets.len();
        for position in 0..self.entries.len() {
            let bucket = bucket_for(self.entries[position].hash, len);
            self.entries[position].next = self.buckets[bucket];
            self.buckets[bucket] = Some(position as u32);
        }
    }

    /// Install `parent` as the read-only base of this index
    ///
    /// The fixed entry, if held locally, is detached: the parent carries it.
    /// Without `clear`, dynamic entries are kept and renumbered after the parent.
    /// A kept key that the parent also holds resolves to the parent's index,
    /// but its slot stays counted in `len()` so numbering matches a parse-side
    /// array layered the same way.
    pub fn set_read_only(&mut self, parent: Arc<StringIndex>, clear: bool) {
        let holds_fixed = self.parent.is_none() && self.fixed.is_some();
        self.read_only_len = parent.len();
        self.parent = Some(parent);

        if clear {
            self.clear();
        } else if holds_fixed && !self.entries.is_empty() {
            let removed = self.entries.remove(0);
            self.total_characters -= removed.key.chars().count();
            self.relink();
        }
    }

    /// Drop the read-only parent; the next state is the unlayered empty index
    pub fn remove_read_only(&mut self) {
        self.parent = None;
        self.read_only_len = 0;
        self.clear();
    }

    /// Reset to the read-only boundary, restoring the fixed entry when unlayered
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.total_characters = 0;
        if self.parent.is_none() {
            if let Some(fixed) = self.fixed.clone() {
                let hash = key_hash(&fixed);
                self.link(fixed, hash);
            }
        }
    }

    /// Total entries, including the read-only base
    #[inline]
    pub fn len(&self) -> usize {
        self.read_only_len + self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn read_only_len(&self) -> usize {
        self.read_only_len
    }

    pub fn has_read_only(&self) -> bool {
        self.parent.is_some()
    }

    /// The reserved key, if this index was built with one
    pub fn fixed_entry(&self) -> Option<&str> {
        self.fixed.as_deref()
    }

    /// Characters held by the dynamic region
    pub fn total_character_count(&self) -> usize {
        self.total_characters
    }

    pub fn maximum_entries(&self) -> usize {
        self.maximum_entries
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Iterate over `(key, index)` pairs in index order, read-only base first
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&str, usize)> + '_> {
        let local = self
            .entries
            .iter()
            .enumerate()
            .map(move |(position, e)| (&*e.key, self.read_only_len + position));
        match &self.parent {
            Some(parent) => Box::new(parent.iter().chain(local)),
            None => Box::new(local),
        }
    }
}
