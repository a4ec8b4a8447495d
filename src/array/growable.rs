//! Growable Array with Read-Only Prefix
//!
//! Append-only storage for the parse-side vocabulary tables. Index `i` is
//! stable once assigned. An array can be layered over an immutable parent
//! snapshot: the parent's entries form the read-only prefix
//! `0..read_only_len` and new entries are numbered after it.
//!
//! Capacity grows by `cap * 3 / 2 + 1` and never beyond the configured
//! maximum; appending at the maximum is an error, never a truncation.

use std::sync::Arc;

use tracing::warn;

use super::MAXIMUM_INITIAL_RESERVATION;
use crate::error::{FastInfosetError, Result};

/// Append-only array bounded by a maximum capacity
#[derive(Debug, Clone)]
pub struct GrowableArray<T> {
    /// Table name used in diagnostics
    name: &'static str,
    /// Entries after the read-only prefix
    items: Vec<T>,
    /// Logical capacity, counting the read-only prefix
    capacity: usize,
    maximum_capacity: usize,
    parent: Option<Arc<GrowableArray<T>>>,
    read_only_len: usize,
    /// Entry seeded at index 0 while the array has no parent
    fixed: Option<T>,
}

impl<T: Clone> GrowableArray<T> {
    /// Create an empty array
    pub fn new(name: &'static str, initial_capacity: usize, maximum_capacity: usize) -> Self {
        let capacity = initial_capacity.min(maximum_capacity);
        GrowableArray {
            name,
            items: Vec::with_capacity(capacity.min(MAXIMUM_INITIAL_RESERVATION)),
            capacity,
            maximum_capacity,
            parent: None,
            read_only_len: 0,
            fixed: None,
        }
    }

    /// Create an array whose index 0 is permanently reserved for `fixed`
    pub fn with_fixed_entry(
        name: &'static str,
        fixed: T,
        initial_capacity: usize,
        maximum_capacity: usize,
    ) -> Self {
        let mut array = Self::new(name, initial_capacity.max(1), maximum_capacity.max(1));
        array.items.push(fixed.clone());
        array.fixed = Some(fixed);
        array
    }

    /// Append a value, returning its index
    pub fn append(&mut self, value: T) -> Result<usize> {
        if self.len() >= self.capacity {
            self.grow()?;
        }
        self.items.push(value);
        Ok(self.len() - 1)
    }

    fn grow(&mut self) -> Result<()> {
        if self.capacity >= self.maximum_capacity {
            warn!(table = self.name, limit = self.maximum_capacity, "array capacity exhausted");
            return Err(FastInfosetError::AllocationLimitExceeded {
                table: self.name,
                limit: self.maximum_capacity,
            });
        }

        let grown = self
            .capacity
            .saturating_mul(3)
            / 2
            + 1;
        let new_capacity = grown.max(self.len() + 1).min(self.maximum_capacity);
        let wanted = new_capacity.saturating_sub(self.read_only_len);
        self.items.reserve_exact(wanted.saturating_sub(self.items.len()));
        self.capacity = new_capacity;
        Ok(())
    }

    /// Get the value at index `i`, looking into the parent for the read-only prefix
    pub fn get(&self, i: usize) -> Option<&T> {
        if i < self.read_only_len {
            self.parent.as_ref().and_then(|p| p.get(i))
        } else {
            self.items.get(i - self.read_only_len)
        }
    }

    /// Install `parent` as the read-only prefix
    ///
    /// Without `clear`, existing dynamic entries are kept and renumbered
    /// after the parent. A fixed entry held locally is dropped because the
    /// parent already carries it at index 0.
    pub fn set_read_only(&mut self, parent: Arc<GrowableArray<T>>, clear: bool) {
        let holds_fixed = self.parent.is_none() && self.fixed.is_some();
        self.read_only_len = parent.len();
        self.parent = Some(parent);

        if clear {
            self.items.clear();
        } else if holds_fixed && !self.items.is_empty() {
            self.items.remove(0);
        }

        self.capacity = (self.read_only_len + self.items.capacity())
            .max(self.len())
            .min(self.maximum_capacity.max(self.len()));
    }

    /// Drop the read-only parent and reset to the unlayered state
    pub fn remove_read_only(&mut self) {
        self.parent = None;
        self.read_only_len = 0;
        self.clear();
    }

    /// Truncate to the read-only boundary (restoring the fixed entry when unlayered)
    pub fn clear(&mut self) {
        self.items.clear();
        if self.parent.is_none() {
            if let Some(fixed) = &self.fixed {
                self.items.push(fixed.clone());
            }
        }
    }

    /// Iterate over every entry, read-only prefix first
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl<T> GrowableArray<T> {
    /// Total number of entries, including the read-only prefix
    #[inline]
    pub fn len(&self) -> usize {
        self.read_only_len + self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries owned by the parent
    #[inline]
    pub fn read_only_len(&self) -> usize {
        self.read_only_len
    }

    /// Entries appended after the read-only prefix
    pub fn dynamic_items(&self) -> &[T] {
        &self.items
    }

    pub fn has_read_only(&self) -> bool {
        self.parent.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn maximum_capacity(&self) -> usize {
        self.maximum_capacity
    }

    /// Change the maximum capacity; current capacity is clamped to it
    pub fn set_maximum_capacity(&mut self, maximum_capacity: usize) {
        self.maximum_capacity = maximum_capacity;
        self.capacity = self.capacity.min(maximum_capacity);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_initial_capacity() {
        let mut array = GrowableArray::new("test", usize::MAX / 4, usize::MAX);
        assert_eq!(array.append(1u8).unwrap(), 0);
        assert_eq!(array.append(2u8).unwrap(), 1);
        assert_eq!(array.get(1), Some(&2));
    }

    #[test]
    fn test_append_assigns_dense_indices() {
        let mut array = GrowableArray::new("test", 2, 100);
        assert_eq!(array.append("a").unwrap(), 0);
        assert_eq!(array.append("b").unwrap(), 1);
        assert_eq!(array.append("c").unwrap(), 2);
        assert_eq!(array.len(), 3);
        assert_eq!(array.get(1), Some(&"b"));
        assert_eq!(array.get(3), None);
    }

    #[test]
    fn test_growth_factor() {
        let mut array = GrowableArray::new("test", 10, 1000);
        for i in 0..10 {
            array.append(i).unwrap();
        }
        assert_eq!(array.capacity(), 10);
        array.append(10).unwrap();
        assert_eq!(array.capacity(), 16);
    }

    #[test]
    fn test_growth_capped_at_maximum() {
        let mut array = GrowableArray::new("test", 2, 4);
        for i in 0..4 {
            array.append(i).unwrap();
        }
        assert_eq!(array.capacity(), 4);
        let err = array.append(4).unwrap_err();
        assert!(matches!(
            err,
            FastInfosetError::AllocationLimitExceeded { table: "test", limit: 4 }
        ));
        // Nothing was truncated or overwritten
        assert_eq!(array.len(), 4);
        assert_eq!(array.get(3), Some(&3));
    }

    #[test]
    fn test_zero_initial_capacity() {
        let mut array = GrowableArray::new("test", 0, 10);
        assert_eq!(array.append(7).unwrap(), 0);
        assert_eq!(array.capacity(), 1);
    }

    #[test]
    fn test_layered_get_and_len() {
        let mut parent = GrowableArray::new("test", 4, 100);
        parent.append("x").unwrap();
        parent.append("y").unwrap();
        let parent = Arc::new(parent);

        let mut child = GrowableArray::new("test", 4, 100);
        child.set_read_only(Arc::clone(&parent), true);
        assert_eq!(child.read_only_len(), 2);
        assert_eq!(child.append("z").unwrap(), 2);
        assert_eq!(child.get(0), Some(&"x"));
        assert_eq!(child.get(2), Some(&"z"));
        assert_eq!(child.len(), 3);

        child.clear();
        assert_eq!(child.len(), 2);
        child.clear();
        assert_eq!(child.len(), 2);
    }

    #[test]
    fn test_layering_without_clear_keeps_dynamic_entries() {
        let mut parent = GrowableArray::new("test", 4, 100);
        parent.append(1).unwrap();
        let mut child = GrowableArray::new("test", 4, 100);
        child.append(10).unwrap();
        child.set_read_only(Arc::new(parent), false);
        assert_eq!(child.len(), 2);
        assert_eq!(child.get(1), Some(&10));
    }

    #[test]
    fn test_fixed_entry_lifecycle() {
        let mut array = GrowableArray::with_fixed_entry("prefix", "xml", 4, 100);
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(0), Some(&"xml"));
        array.append("p").unwrap();
        array.clear();
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(0), Some(&"xml"));

        let mut parent = GrowableArray::with_fixed_entry("prefix", "xml", 4, 100);
        parent.append("a").unwrap();
        let parent = Arc::new(parent);

        // The fixed entry is carried by the parent, not counted twice
        array.set_read_only(Arc::clone(&parent), false);
        assert_eq!(array.len(), 2);
        array.clear();
        assert_eq!(array.len(), 2);
        assert_eq!(array.append("b").unwrap(), 2);

        array.remove_read_only();
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(0), Some(&"xml"));
    }

    #[test]
    fn test_iter_spans_layers() {
        let mut parent = GrowableArray::new("test", 4, 100);
        parent.append('a').unwrap();
        let mut child = GrowableArray::new("test", 4, 100);
        child.set_read_only(Arc::new(parent), true);
        child.append('b').unwrap();
        let all: Vec<char> = child.iter().copied().collect();
        assert_eq!(all, vec!['a', 'b']);
    }
}
