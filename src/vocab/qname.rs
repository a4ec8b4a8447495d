//! Qualified Names
//!
//! A (prefix, namespace name, local name) triple together with the indices
//! it was assigned in a vocabulary. Attribute names additionally carry an
//! id and a small hash used to detect duplicate attributes on an element.

use std::fmt;
use std::sync::Arc;

use memchr::memchr;

use crate::error::{FastInfosetError, Result};
use crate::index::same_str;

/// Bucket count of the duplicate attribute verifier
pub const ATTRIBUTE_MAP_SIZE: usize = 256;

/// Element or attribute name with its vocabulary indices
#[derive(Debug, Clone)]
pub struct QualifiedName {
    pub prefix: Arc<str>,
    pub namespace_name: Arc<str>,
    pub local_name: Arc<str>,
    /// `prefix:local`, or just `local` without a prefix
    pub qname: Arc<str>,
    /// Index in the element-name or attribute-name table
    pub index: usize,
    pub prefix_index: Option<usize>,
    pub namespace_name_index: Option<usize>,
    pub local_name_index: Option<usize>,
    /// Identity of an attribute name across namespace and local name
    pub attribute_id: u64,
    /// Bucket of this attribute name in the duplicate verifier
    pub attribute_hash: usize,
}

impl QualifiedName {
    /// Create a name with no indices assigned yet
    pub fn new(prefix: &str, namespace_name: &str, local_name: &str) -> Self {
        let qname: Arc<str> = if prefix.is_empty() {
            Arc::from(local_name)
        } else {
            Arc::from(format!("{prefix}:{local_name}"))
        };
        QualifiedName {
            prefix: Arc::from(prefix),
            namespace_name: Arc::from(namespace_name),
            local_name: Arc::from(local_name),
            qname,
            index: 0,
            prefix_index: None,
            namespace_name_index: None,
            local_name_index: None,
            attribute_id: 0,
            attribute_hash: 0,
        }
    }

    /// Create a name from a composite `prefix:local` literal
    pub fn from_composite(namespace_name: &str, qname: &str) -> Self {
        let (prefix, local_name) = split_qname(qname);
        Self::new(prefix.unwrap_or(""), namespace_name, local_name)
    }

    /// Attach the string table indices of the three components
    pub fn with_indices(
        mut self,
        prefix_index: Option<usize>,
        namespace_name_index: Option<usize>,
        local_name_index: usize,
    ) -> Self {
        self.prefix_index = prefix_index;
        self.namespace_name_index = namespace_name_index;
        self.local_name_index = Some(local_name_index);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Derive the attribute id and verifier hash from the component indices
    pub fn create_attribute_values(&mut self, size: usize) {
        let local = self.local_name_index.unwrap_or(0) as u64;
        let namespace = self.namespace_name_index.map_or(0, |i| i as u64 + 1);
        self.attribute_id = local | (namespace << 32);
        self.attribute_hash = (local as usize) % size.max(1);
    }

    /// Match on prefix and namespace, with an identity fast path
    #[inline]
    pub fn matches(&self, prefix: &str, namespace_name: &str) -> bool {
        same_str(&self.namespace_name, namespace_name) && same_str(&self.prefix, prefix)
    }

    pub fn has_prefix(&self) -> bool {
        !self.prefix.is_empty()
    }

    pub fn has_namespace(&self) -> bool {
        !self.namespace_name.is_empty()
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.prefix, &other.namespace_name)
            && same_str(&self.local_name, &other.local_name)
    }
}

impl Eq for QualifiedName {}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_name.is_empty() {
            write!(f, "{}", self.qname)
        } else {
            write!(f, "{{{}}}{}", self.namespace_name, self.qname)
        }
    }
}

/// Split a composite name into prefix and local name at the colon
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match memchr(b':', name.as_bytes()) {
        Some(colon) => (Some(&name[..colon]), &name[colon + 1..]),
        None => (None, name),
    }
}

#[derive(Debug, Clone, Default)]
struct VerifierBucket {
    iteration: u32,
    ids: Vec<u64>,
}

/// Detects the same attribute name occurring twice on one element
///
/// Buckets are invalidated by bumping an iteration counter, so moving to the
/// next element costs nothing proportional to the map size.
#[derive(Debug, Clone)]
pub struct DuplicateAttributeVerifier {
    iteration: u32,
    buckets: Vec<VerifierBucket>,
}

impl DuplicateAttributeVerifier {
    pub fn new() -> Self {
        DuplicateAttributeVerifier {
            iteration: 1,
            buckets: vec![VerifierBucket::default(); ATTRIBUTE_MAP_SIZE],
        }
    }

    /// Record an attribute name, failing if it was already seen on this element
    pub fn check(&mut self, name: &QualifiedName) -> Result<()> {
        let bucket = &mut self.buckets[name.attribute_hash % ATTRIBUTE_MAP_SIZE];
        if bucket.iteration != self.iteration {
            bucket.iteration = self.iteration;
            bucket.ids.clear();
        } else if bucket.ids.contains(&name.attribute_id) {
            return Err(FastInfosetError::DuplicateAttribute(name.to_string()));
        }
        bucket.ids.push(name.attribute_id);
        Ok(())
    }

    /// Start checking the attributes of the next element
    pub fn reset(&mut self) {
        self.iteration = self.iteration.wrapping_add(1);
        if self.iteration == 0 {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.iteration = 1;
        for bucket in &mut self.buckets {
            bucket.iteration = 0;
            bucket.ids.clear();
        }
    }
}

impl Default for DuplicateAttributeVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(ns_index: Option<usize>, local_index: usize) -> QualifiedName {
        let mut name = QualifiedName::new("", "urn:x", "a").with_indices(None, ns_index, local_index);
        name.create_attribute_values(ATTRIBUTE_MAP_SIZE);
        name
    }

    #[test]
    fn test_composite_name() {
        let name = QualifiedName::new("svg", "http://www.w3.org/2000/svg", "rect");
        assert_eq!(&*name.qname, "svg:rect");
        assert!(name.has_prefix());
        let plain = QualifiedName::new("", "", "rect");
        assert_eq!(&*plain.qname, "rect");
        assert_eq!(plain.to_string(), "rect");
        assert_eq!(name.to_string(), "{http://www.w3.org/2000/svg}svg:rect");
    }

    #[test]
    fn test_from_composite() {
        let name = QualifiedName::from_composite("urn:a", "p:local");
        assert_eq!(&*name.prefix, "p");
        assert_eq!(&*name.local_name, "local");
        let name = QualifiedName::from_composite("", "local");
        assert_eq!(&*name.prefix, "");
        assert_eq!(&*name.local_name, "local");
    }

    #[test]
    fn test_equality_ignores_indices() {
        let a = QualifiedName::new("p", "urn:a", "x").with_index(3);
        let b = QualifiedName::new("p", "urn:a", "x").with_index(7);
        let c = QualifiedName::new("p", "urn:b", "x");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.matches("p", "urn:a"));
        assert!(!a.matches("", "urn:a"));
    }

    #[test]
    fn test_attribute_values() {
        let a = attribute(None, 5);
        let b = attribute(Some(0), 5);
        assert_eq!(a.attribute_hash, 5);
        assert_ne!(a.attribute_id, b.attribute_id);
    }

    #[test]
    fn test_duplicate_attribute_detection() {
        let mut verifier = DuplicateAttributeVerifier::new();
        let a = attribute(None, 1);
        let b = attribute(Some(2), 1);
        verifier.check(&a).unwrap();
        verifier.check(&b).unwrap();
        assert!(matches!(
            verifier.check(&a),
            Err(FastInfosetError::DuplicateAttribute(_))
        ));

        // Next element starts fresh
        verifier.reset();
        verifier.check(&a).unwrap();
    }

    #[test]
    fn test_verifier_iteration_wrap() {
        let mut verifier = DuplicateAttributeVerifier::new();
        let a = attribute(None, 9);
        verifier.check(&a).unwrap();
        verifier.iteration = u32::MAX;
        verifier.reset();
        verifier.check(&a).unwrap();
    }
}
