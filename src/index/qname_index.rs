//! Qualified Name Index
//!
//! Element and attribute names for the serialize side of a vocabulary.
//! Names are bucketed by local name (or by the composite `prefix:local`
//! literal); names sharing a key but differing in prefix or namespace live
//! in the same bucket and are told apart by a scan.
//!
//! Name indices come from a per-table counter, independent of bucket
//! position. A layered index looks in its read-only parent's buckets first
//! and falls back to its own dynamic buckets.

use std::sync::Arc;

use tracing::{trace, warn};

use super::{bucket_count, bucket_for, key_hash, threshold_for, Obtained, MAXIMUM_BUCKETS};
use crate::config::NameKeyMode;
use crate::error::{FastInfosetError, Result};
use crate::vocab::QualifiedName;

/// Names sharing one key
#[derive(Debug, Clone)]
pub struct Bucket {
    key: Arc<str>,
    hash: u32,
    names: Vec<QualifiedName>,
    next: Option<u32>,
}

impl Bucket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn names(&self) -> &[QualifiedName] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Find the name with this prefix and namespace
    pub fn find(&self, prefix: &str, namespace_name: &str) -> Option<&QualifiedName> {
        self.names
            .iter()
            .find(|name| name.matches(prefix, namespace_name))
    }

    pub fn add_qualified_name(&mut self, name: QualifiedName) {
        self.names.push(name);
    }
}

/// Hash index of qualified names
#[derive(Debug, Clone)]
pub struct QualifiedNameIndex {
    name: &'static str,
    buckets: Vec<Bucket>,
    table: Vec<Option<u32>>,
    threshold: usize,
    key_mode: NameKeyMode,
    next_index: usize,
    parent: Option<Arc<QualifiedNameIndex>>,
    read_only_len: usize,
    maximum_names: usize,
}

impl QualifiedNameIndex {
    pub fn new(
        name: &'static str,
        capacity: usize,
        maximum_names: usize,
        key_mode: NameKeyMode,
    ) -> Self {
        let capacity = bucket_count(capacity);
        QualifiedNameIndex {
            name,
            buckets: Vec::new(),
            table: vec![None; capacity],
            threshold: threshold_for(capacity),
            key_mode,
            next_index: 0,
            parent: None,
            read_only_len: 0,
            maximum_names,
        }
    }

    pub fn key_mode(&self) -> NameKeyMode {
        self.key_mode
    }

    /// Bucket key of `name` under this index's key mode
    pub fn key_of<'a>(&self, name: &'a QualifiedName) -> &'a Arc<str> {
        match self.key_mode {
            NameKeyMode::LocalName => &name.local_name,
            NameKeyMode::QualifiedName => &name.qname,
        }
    }

    /// Return the dynamic bucket for `key`, creating it when absent
    pub fn obtain_entry(&mut self, key: &str) -> &mut Bucket {
        let hash = key_hash(key);
        let position = match self.find_local(key, hash) {
            Some(position) => position,
            None => self.link(Arc::from(key), hash),
        };
        &mut self.buckets[position]
    }

    /// The dynamic bucket for `key`, if one exists
    pub fn bucket(&self, key: &str) -> Option<&Bucket> {
        self.find_local(key, key_hash(key))
            .map(|position| &self.buckets[position])
    }

    /// Find a name across layers, read-only parent first
    pub fn find(&self, key: &str, prefix: &str, namespace_name: &str) -> Option<&QualifiedName> {
        self.find_hashed(key, key_hash(key), prefix, namespace_name)
    }

    fn find_hashed(
        &self,
        key: &str,
        hash: u32,
        prefix: &str,
        namespace_name: &str,
    ) -> Option<&QualifiedName> {
        if let Some(found) = self
            .parent
            .as_ref()
            .and_then(|p| p.find_hashed(key, hash, prefix, namespace_name))
        {
            return Some(found);
        }
        self.find_local(key, hash)
            .and_then(|position| self.buckets[position].find(prefix, namespace_name))
    }

    /// Take the next name index
    pub fn next_index(&mut self) -> Result<usize> {
        if self.next_index >= self.maximum_names {
            warn!(table = self.name, limit = self.maximum_names, "qualified name index exhausted");
            return Err(FastInfosetError::AllocationLimitExceeded {
                table: self.name,
                limit: self.maximum_names,
            });
        }
        let index = self.next_index;
        self.next_index += 1;
        Ok(index)
    }

    /// Assign the next index to `name` and file it under its key
    pub fn add_qualified_name(&mut self, mut name: QualifiedName) -> Result<usize> {
        let index = self.next_index()?;
        name.index = index;
        let key = Arc::clone(self.key_of(&name));
        self.obtain_entry(&key).add_qualified_name(name);
        Ok(index)
    }

    /// Return the index of `name`, adding it to the dynamic tier when absent
    pub fn obtain(&mut self, name: QualifiedName) -> Result<Obtained> {
        let key = Arc::clone(self.key_of(&name));
        let hash = key_hash(&key);
        if let Some(existing) = self.find_hashed(&key, hash, &name.prefix, &name.namespace_name) {
            return Ok(Obtained::Found(existing.index));
        }
        self.add_qualified_name(name).map(Obtained::Inserted)
    }

    fn find_local(&self, key: &str, hash: u32) -> Option<usize> {
        let mut cursor = self.table[bucket_for(hash, self.table.len())];
        while let Some(position) = cursor {
            let bucket = &self.buckets[position as usize];
            if bucket.hash == hash && &*bucket.key == key {
                return Some(position as usize);
            }
            cursor = bucket.next;
        }
        None
    }

    fn link(&mut self, key: Arc<str>, hash: u32) -> usize {
        let position = self.buckets.len();
        let slot = bucket_for(hash, self.table.len());
        self.buckets.push(Bucket {
            key,
            hash,
            names: Vec::with_capacity(4),
            next: self.table[slot],
        });
        self.table[slot] = Some(position as u32);

        if self.buckets.len() > self.threshold {
            self.resize(self.table.len() * 2);
        }
        position
    }

    fn resize(&mut self, new_len: usize) {
        let new_len = new_len.min(MAXIMUM_BUCKETS);
        if new_len <= self.table.len() {
            self.threshold = usize::MAX;
            return;
        }
        trace!(table = self.name, buckets = new_len, "resizing qualified name index");
        self.table.clear();
        self.table.resize(new_len, None);
        self.threshold = threshold_for(new_len);
        for position in 0..self.buckets.len() {
            let slot = bucket_for(self.buckets[position].hash, new_len);
            self.buckets[position].next = self.table[slot];
            self.table[slot] = Some(position as u32);
        }
    }

    /// Install `parent` as the read-only tier
    ///
    /// Without `clear`, dynamic names are kept and renumbered after the parent.
    pub fn set_read_only(&mut self, parent: Arc<QualifiedNameIndex>, clear: bool) {
        let offset = parent.len();
        let local = self.next_index - self.read_only_len;
        self.read_only_len = offset;
        self.parent = Some(parent);

        if clear {
            self.clear();
        } else {
            for bucket in &mut self.buckets {
                for name in &mut bucket.names {
                    name.index = name.index - (self.next_index - local) + offset;
                }
            }
            self.next_index = offset + local;
        }
    }

    pub fn remove_read_only(&mut self) {
        self.parent = None;
        self.read_only_len = 0;
        self.clear();
    }

    /// Drop dynamic names; the counter restarts at the read-only boundary
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.table.iter_mut().for_each(|slot| *slot = None);
        self.next_index = self.read_only_len;
    }

    /// Number of names, including the read-only tier
    #[inline]
    pub fn len(&self) -> usize {
        self.next_index
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    #[inline]
    pub fn read_only_len(&self) -> usize {
        self.read_only_len
    }

    pub fn has_read_only(&self) -> bool {
        self.parent.is_some()
    }

    pub fn maximum_names(&self) -> usize {
        self.maximum_names
    }

    /// Every name in index order, read-only tier first
    pub fn names(&self) -> Vec<&QualifiedName> {
        let mut names: Vec<&QualifiedName> = self
            .parent
            .as_ref()
            .map(|p| p.names())
            .unwrap_or_default();
        let mut local: Vec<&QualifiedName> = self
            .buckets
            .iter()
            .flat_map(|b| b.names.iter())
            .collect();
        local.sort_by_key(|name| name.index);
        names.extend(local);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> QualifiedNameIndex {
        QualifiedNameIndex::new("element-name", 16, usize::MAX, NameKeyMode::LocalName)
    }

    #[test]
    fn test_same_local_name_different_namespace() {
        let mut names = index();
        let a = names.obtain(QualifiedName::new("", "urn:a", "item")).unwrap();
        let b = names.obtain(QualifiedName::new("", "urn:b", "item")).unwrap();
        assert_eq!(a, Obtained::Inserted(0));
        assert_eq!(b, Obtained::Inserted(1));

        let bucket = names.bucket("item").unwrap();
        assert_eq!(bucket.len(), 2);
        assert_eq!(names.find("item", "", "urn:a").unwrap().index, 0);
        assert_eq!(names.find("item", "", "urn:b").unwrap().index, 1);

        assert_eq!(
            names.obtain(QualifiedName::new("", "urn:b", "item")).unwrap(),
            Obtained::Found(1)
        );
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_index_independent_of_bucket() {
        let mut names = index();
        names.obtain(QualifiedName::new("", "", "a")).unwrap();
        names.obtain(QualifiedName::new("", "", "b")).unwrap();
        let c = names.obtain(QualifiedName::new("p", "urn:p", "a")).unwrap();
        assert_eq!(c, Obtained::Inserted(2));
        assert_eq!(names.bucket("a").unwrap().len(), 2);
    }

    #[test]
    fn test_obtain_entry_creates_bucket() {
        let mut names = index();
        assert!(names.bucket("x").is_none());
        assert!(names.obtain_entry("x").is_empty());
        assert!(names.bucket("x").is_some());
        assert_eq!(names.len(), 0);
    }

    #[test]
    fn test_qualified_name_key_mode() {
        let mut names =
            QualifiedNameIndex::new("element-name", 16, usize::MAX, NameKeyMode::QualifiedName);
        names.obtain(QualifiedName::new("p", "urn:p", "a")).unwrap();
        names.obtain(QualifiedName::new("", "", "a")).unwrap();
        assert_eq!(names.bucket("p:a").unwrap().len(), 1);
        assert_eq!(names.bucket("a").unwrap().len(), 1);
    }

    #[test]
    fn test_two_tier_lookup() {
        let mut parent = index();
        parent.obtain(QualifiedName::new("", "urn:a", "item")).unwrap();
        let parent = Arc::new(parent);

        let mut child = index();
        child.set_read_only(Arc::clone(&parent), true);
        assert_eq!(
            child.obtain(QualifiedName::new("", "urn:a", "item")).unwrap(),
            Obtained::Found(0)
        );
        // Same local name, new namespace goes into the dynamic tier
        assert_eq!(
            child.obtain(QualifiedName::new("", "urn:b", "item")).unwrap(),
            Obtained::Inserted(1)
        );
        assert_eq!(parent.len(), 1);
        assert_eq!(child.len(), 2);

        child.clear();
        assert_eq!(child.len(), 1);
        assert!(child.find("item", "", "urn:b").is_none());
    }

    #[test]
    fn test_layering_without_clear_renumbers() {
        let mut parent = index();
        parent.obtain(QualifiedName::new("", "", "p0")).unwrap();
        parent.obtain(QualifiedName::new("", "", "p1")).unwrap();

        let mut child = index();
        child.obtain(QualifiedName::new("", "", "c0")).unwrap();
        child.set_read_only(Arc::new(parent), false);
        assert_eq!(child.len(), 3);
        assert_eq!(child.find("c0", "", "").unwrap().index, 2);
        let order: Vec<&str> = child.names().iter().map(|n| &*n.local_name).collect();
        assert_eq!(order, vec!["p0", "p1", "c0"]);
    }

    #[test]
    fn test_maximum_names() {
        let mut names = QualifiedNameIndex::new("attribute-name", 16, 1, NameKeyMode::LocalName);
        names.obtain(QualifiedName::new("", "", "a")).unwrap();
        assert!(matches!(
            names.obtain(QualifiedName::new("", "", "b")),
            Err(FastInfosetError::AllocationLimitExceeded { limit: 1, .. })
        ));
    }

    #[test]
    fn test_many_buckets_resize() {
        let mut names = index();
        for i in 0..200 {
            names.obtain(QualifiedName::new("", "", &format!("n{i}"))).unwrap();
        }
        for i in 0..200 {
            assert_eq!(names.find(&format!("n{i}"), "", "").unwrap().index, i);
        }
    }
}
