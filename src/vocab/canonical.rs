//! Canonical Vocabulary Description
//!
//! An externally supplied, order-significant list of distinct strings and
//! names per table. Order determines index assignment, so both vocabulary
//! shapes import it in the same table order and entry order.

use indexmap::IndexSet;

use super::{QualifiedName, TableKind};

/// A name as listed in a canonical vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    pub prefix: String,
    pub namespace_name: String,
    pub local_name: String,
}

impl CanonicalName {
    pub fn new(prefix: &str, namespace_name: &str, local_name: &str) -> Self {
        CanonicalName {
            prefix: prefix.to_string(),
            namespace_name: namespace_name.to_string(),
            local_name: local_name.to_string(),
        }
    }
}

impl From<&QualifiedName> for CanonicalName {
    fn from(name: &QualifiedName) -> Self {
        CanonicalName::new(&name.prefix, &name.namespace_name, &name.local_name)
    }
}

/// Insertion-ordered sets for each of the twelve tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalVocabulary {
    pub restricted_alphabets: IndexSet<String>,
    pub encoding_algorithms: IndexSet<String>,
    pub prefixes: IndexSet<String>,
    pub namespace_names: IndexSet<String>,
    pub local_names: IndexSet<String>,
    pub other_ncnames: IndexSet<String>,
    pub other_uris: IndexSet<String>,
    pub attribute_values: IndexSet<String>,
    pub other_strings: IndexSet<String>,
    pub character_content_chunks: IndexSet<String>,
    pub elements: IndexSet<CanonicalName>,
    pub attributes: IndexSet<CanonicalName>,
}

impl CanonicalVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The string set for `kind`; `None` for the two name tables
    pub fn strings(&self, kind: TableKind) -> Option<&IndexSet<String>> {
        Some(match kind {
            TableKind::RestrictedAlphabet => &self.restricted_alphabets,
            TableKind::EncodingAlgorithm => &self.encoding_algorithms,
            TableKind::Prefix => &self.prefixes,
            TableKind::NamespaceName => &self.namespace_names,
            TableKind::LocalName => &self.local_names,
            TableKind::OtherNcName => &self.other_ncnames,
            TableKind::OtherUri => &self.other_uris,
            TableKind::AttributeValue => &self.attribute_values,
            TableKind::OtherString => &self.other_strings,
            TableKind::CharacterContentChunk => &self.character_content_chunks,
            TableKind::ElementName | TableKind::AttributeName => return None,
        })
    }

    fn strings_mut(&mut self, kind: TableKind) -> Option<&mut IndexSet<String>> {
        Some(match kind {
            TableKind::RestrictedAlphabet => &mut self.restricted_alphabets,
            TableKind::EncodingAlgorithm => &mut self.encoding_algorithms,
            TableKind::Prefix => &mut self.prefixes,
            TableKind::NamespaceName => &mut self.namespace_names,
            TableKind::LocalName => &mut self.local_names,
            TableKind::OtherNcName => &mut self.other_ncnames,
            TableKind::OtherUri => &mut self.other_uris,
            TableKind::AttributeValue => &mut self.attribute_values,
            TableKind::OtherString => &mut self.other_strings,
            TableKind::CharacterContentChunk => &mut self.character_content_chunks,
            TableKind::ElementName | TableKind::AttributeName => return None,
        })
    }

    /// The name set for `kind`; `None` for string tables
    pub fn names(&self, kind: TableKind) -> Option<&IndexSet<CanonicalName>> {
        match kind {
            TableKind::ElementName => Some(&self.elements),
            TableKind::AttributeName => Some(&self.attributes),
            _ => None,
        }
    }

    /// Append a string to a string table; returns false if already listed
    /// or if `kind` is a name table
    pub fn insert(&mut self, kind: TableKind, value: &str) -> bool {
        self.strings_mut(kind)
            .map(|set| set.insert(value.to_string()))
            .unwrap_or(false)
    }

    pub fn insert_element(&mut self, prefix: &str, namespace_name: &str, local_name: &str) -> bool {
        self.elements
            .insert(CanonicalName::new(prefix, namespace_name, local_name))
    }

    pub fn insert_attribute(&mut self, prefix: &str, namespace_name: &str, local_name: &str) -> bool {
        self.attributes
            .insert(CanonicalName::new(prefix, namespace_name, local_name))
    }

    pub fn is_empty(&self) -> bool {
        TableKind::ALL.into_iter().all(|kind| match kind {
            TableKind::ElementName => self.elements.is_empty(),
            TableKind::AttributeName => self.attributes.is_empty(),
            _ => self.strings(kind).map_or(true, |s| s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_dedups() {
        let mut canonical = CanonicalVocabulary::new();
        assert!(canonical.insert(TableKind::LocalName, "b"));
        assert!(canonical.insert(TableKind::LocalName, "a"));
        assert!(!canonical.insert(TableKind::LocalName, "b"));
        let order: Vec<&str> = canonical
            .strings(TableKind::LocalName)
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_name_tables_are_separate() {
        let mut canonical = CanonicalVocabulary::new();
        assert!(canonical.is_empty());
        assert!(!canonical.insert(TableKind::ElementName, "x"));
        assert!(canonical.insert_element("", "urn:a", "x"));
        assert!(!canonical.insert_element("", "urn:a", "x"));
        assert!(canonical.insert_attribute("", "", "id"));
        assert_eq!(canonical.names(TableKind::ElementName).unwrap().len(), 1);
        assert!(canonical.strings(TableKind::AttributeName).is_none());
        assert!(!canonical.is_empty());
    }
}
