//! Serialize-Side Vocabulary
//!
//! Key → index dictionaries consulted by an encoder: when a string or name
//! is already indexed the encoder writes the index, otherwise it writes the
//! literal and the vocabulary assigns the next index.

use std::sync::Arc;

use tracing::debug;

use super::canonical::{CanonicalName, CanonicalVocabulary};
use super::ns;
use super::table::{SerializerTable, SharedSerializerTable};
use super::{QualifiedName, TableKind, ATTRIBUTE_MAP_SIZE};
use crate::algorithm::ENCODING_ALGORITHM_APPLICATION_START;
use crate::config::VocabularyConfig;
use crate::error::{FastInfosetError, Result};
use crate::index::{Obtained, QualifiedNameIndex, StringIndex};

/// Mutable per-session serialize-side vocabulary
#[derive(Debug, Clone)]
pub struct SerializerVocabulary {
    pub restricted_alphabet: StringIndex,
    pub encoding_algorithm: StringIndex,
    pub prefix: StringIndex,
    pub namespace_name: StringIndex,
    pub local_name: StringIndex,
    pub other_ncname: StringIndex,
    pub other_uri: StringIndex,
    pub attribute_value: StringIndex,
    pub other_string: StringIndex,
    pub character_content_chunk: StringIndex,
    pub element_name: QualifiedNameIndex,
    pub attribute_name: QualifiedNameIndex,
    config: VocabularyConfig,
    has_initial_vocabulary: bool,
    referenced_uri: Option<String>,
}

/// Frozen serialize-side vocabulary shared as a read-only base
#[derive(Debug, Clone)]
pub struct ReadOnlySerializerVocabulary {
    restricted_alphabet: Arc<StringIndex>,
    encoding_algorithm: Arc<StringIndex>,
    prefix: Arc<StringIndex>,
    namespace_name: Arc<StringIndex>,
    local_name: Arc<StringIndex>,
    other_ncname: Arc<StringIndex>,
    other_uri: Arc<StringIndex>,
    attribute_value: Arc<StringIndex>,
    other_string: Arc<StringIndex>,
    character_content_chunk: Arc<StringIndex>,
    element_name: Arc<QualifiedNameIndex>,
    attribute_name: Arc<QualifiedNameIndex>,
}

impl ReadOnlySerializerVocabulary {
    /// Shared handle on the table of `kind`
    pub fn table(&self, kind: TableKind) -> SharedSerializerTable {
        use SharedSerializerTable::{Names, Strings};
        match kind {
            TableKind::RestrictedAlphabet => Strings(Arc::clone(&self.restricted_alphabet)),
            TableKind::EncodingAlgorithm => Strings(Arc::clone(&self.encoding_algorithm)),
            TableKind::Prefix => Strings(Arc::clone(&self.prefix)),
            TableKind::NamespaceName => Strings(Arc::clone(&self.namespace_name)),
            TableKind::LocalName => Strings(Arc::clone(&self.local_name)),
            TableKind::OtherNcName => Strings(Arc::clone(&self.other_ncname)),
            TableKind::OtherUri => Strings(Arc::clone(&self.other_uri)),
            TableKind::AttributeValue => Strings(Arc::clone(&self.attribute_value)),
            TableKind::OtherString => Strings(Arc::clone(&self.other_string)),
            TableKind::CharacterContentChunk => Strings(Arc::clone(&self.character_content_chunk)),
            TableKind::ElementName => Names(Arc::clone(&self.element_name)),
            TableKind::AttributeName => Names(Arc::clone(&self.attribute_name)),
        }
    }

    pub fn table_len(&self, kind: TableKind) -> usize {
        self.table(kind).len()
    }

    /// Index of `key` in a string table, without inserting
    pub fn get(&self, kind: TableKind, key: &str) -> Option<usize> {
        match self.table(kind) {
            SharedSerializerTable::Strings(table) => table.get(key),
            SharedSerializerTable::Names(_) => None,
        }
    }
}

impl SerializerVocabulary {
    pub fn new(config: VocabularyConfig) -> Self {
        let buckets = config.hash_capacity();
        let identifying = config.identifying_max_items;
        let content = config.non_identifying_max_items;
        let key_mode = config.name_key_mode;
        let strings = |kind: TableKind, max: usize| StringIndex::new(kind.name(), buckets, max);
        let names = |kind: TableKind| {
            QualifiedNameIndex::new(kind.name(), buckets, identifying, key_mode)
        };

        SerializerVocabulary {
            restricted_alphabet: strings(TableKind::RestrictedAlphabet, identifying),
            encoding_algorithm: strings(TableKind::EncodingAlgorithm, identifying),
            prefix: StringIndex::with_fixed_entry(
                TableKind::Prefix.name(),
                ns::XML_PREFIX,
                buckets,
                identifying,
            ),
            namespace_name: StringIndex::with_fixed_entry(
                TableKind::NamespaceName.name(),
                ns::XML_NAMESPACE,
                buckets,
                identifying,
            ),
            local_name: strings(TableKind::LocalName, identifying),
            other_ncname: strings(TableKind::OtherNcName, identifying),
            other_uri: strings(TableKind::OtherUri, identifying),
            attribute_value: strings(TableKind::AttributeValue, content),
            other_string: strings(TableKind::OtherString, content),
            character_content_chunk: strings(TableKind::CharacterContentChunk, content),
            element_name: names(TableKind::ElementName),
            attribute_name: names(TableKind::AttributeName),
            config,
            has_initial_vocabulary: false,
            referenced_uri: None,
        }
    }

    /// Build a vocabulary holding exactly the entries of `canonical`
    pub fn from_canonical(canonical: &CanonicalVocabulary, config: VocabularyConfig) -> Result<Self> {
        let mut vocabulary = Self::new(config);
        vocabulary.import_canonical(canonical)?;
        Ok(vocabulary)
    }

    pub fn config(&self) -> &VocabularyConfig {
        &self.config
    }

    /// Mutable view of the table of `kind`
    pub fn table_mut(&mut self, kind: TableKind) -> SerializerTable<'_> {
        use SerializerTable::{Names, Strings};
        match kind {
            TableKind::RestrictedAlphabet => Strings(&mut self.restricted_alphabet),
            TableKind::EncodingAlgorithm => Strings(&mut self.encoding_algorithm),
            TableKind::Prefix => Strings(&mut self.prefix),
            TableKind::NamespaceName => Strings(&mut self.namespace_name),
            TableKind::LocalName => Strings(&mut self.local_name),
            TableKind::OtherNcName => Strings(&mut self.other_ncname),
            TableKind::OtherUri => Strings(&mut self.other_uri),
            TableKind::AttributeValue => Strings(&mut self.attribute_value),
            TableKind::OtherString => Strings(&mut self.other_string),
            TableKind::CharacterContentChunk => Strings(&mut self.character_content_chunk),
            TableKind::ElementName => Names(&mut self.element_name),
            TableKind::AttributeName => Names(&mut self.attribute_name),
        }
    }

    fn string_index(&self, kind: TableKind) -> Option<&StringIndex> {
        Some(match kind {
            TableKind::RestrictedAlphabet => &self.restricted_alphabet,
            TableKind::EncodingAlgorithm => &self.encoding_algorithm,
            TableKind::Prefix => &self.prefix,
            TableKind::NamespaceName => &self.namespace_name,
            TableKind::LocalName => &self.local_name,
            TableKind::OtherNcName => &self.other_ncname,
            TableKind::OtherUri => &self.other_uri,
            TableKind::AttributeValue => &self.attribute_value,
            TableKind::OtherString => &self.other_string,
            TableKind::CharacterContentChunk => &self.character_content_chunk,
            TableKind::ElementName | TableKind::AttributeName => return None,
        })
    }

    fn string_index_mut(&mut self, kind: TableKind) -> Result<&mut StringIndex> {
        match self.table_mut(kind) {
            SerializerTable::Strings(table) => Ok(table),
            SerializerTable::Names(_) => Err(FastInfosetError::IllegalVocabularyOperation(
                format!("{kind} holds qualified names, not strings"),
            )),
        }
    }

    fn name_index_mut(&mut self, kind: TableKind) -> Result<&mut QualifiedNameIndex> {
        match self.table_mut(kind) {
            SerializerTable::Names(table) => Ok(table),
            SerializerTable::Strings(_) => Err(FastInfosetError::IllegalVocabularyOperation(
                format!("{kind} holds strings, not qualified names"),
            )),
        }
    }

    /// Obtain the index of `key` in a string table, assigning one when new
    pub fn obtain_index(&mut self, kind: TableKind, key: &str) -> Result<Obtained> {
        self.string_index_mut(kind)?.obtain_index(key)
    }

    /// Look up `key` in a string table without inserting
    pub fn get(&self, kind: TableKind, key: &str) -> Option<usize> {
        self.string_index(kind).and_then(|table| table.get(key))
    }

    /// Obtain the index of an element or attribute name
    ///
    /// A new name first registers its components: the namespace when it is
    /// non-empty, the prefix when both prefix and namespace are non-empty,
    /// and always the local name.
    pub fn obtain_qualified_name(
        &mut self,
        kind: TableKind,
        prefix: &str,
        namespace_name: &str,
        local_name: &str,
    ) -> Result<Obtained> {
        let names = self.name_index_mut(kind)?;
        let probe = QualifiedName::new(prefix, namespace_name, local_name);
        let key = Arc::clone(names.key_of(&probe));
        if let Some(existing) = names.find(&key, prefix, namespace_name) {
            return Ok(Obtained::Found(existing.index));
        }

        let name = self.register_components(kind, probe)?;
        self.name_index_mut(kind)?
            .add_qualified_name(name)
            .map(Obtained::Inserted)
    }

    fn register_components(&mut self, kind: TableKind, name: QualifiedName) -> Result<QualifiedName> {
        let mut namespace_index = None;
        let mut prefix_index = None;
        if name.has_namespace() {
            namespace_index = Some(self.namespace_name.obtain_index(&name.namespace_name)?.index());
            if name.has_prefix() {
                prefix_index = Some(self.prefix.obtain_index(&name.prefix)?.index());
            }
        }
        let local_index = self.local_name.obtain_index(&name.local_name)?.index();

        let mut name = name.with_indices(prefix_index, namespace_index, local_index);
        if kind == TableKind::AttributeName {
            name.create_attribute_values(ATTRIBUTE_MAP_SIZE);
        }
        Ok(name)
    }

    /// Find an already indexed element or attribute name
    pub fn find_qualified_name(
        &self,
        kind: TableKind,
        prefix: &str,
        namespace_name: &str,
        local_name: &str,
    ) -> Option<&QualifiedName> {
        let names = match kind {
            TableKind::ElementName => &self.element_name,
            TableKind::AttributeName => &self.attribute_name,
            _ => return None,
        };
        let probe = QualifiedName::new(prefix, namespace_name, local_name);
        names.find(names.key_of(&probe), prefix, namespace_name)
    }

    /// Index of an application encoding algorithm URI, offset past the built-ins
    pub fn encoding_algorithm_index(&mut self, uri: &str) -> Result<usize> {
        let index = self.encoding_algorithm.obtain_index(uri)?.index();
        Ok(index + ENCODING_ALGORITHM_APPLICATION_START)
    }

    /// Index of a restricted alphabet, built-in alphabets first
    pub fn restricted_alphabet_index(&mut self, alphabet: &str) -> Result<usize> {
        match alphabet {
            ns::NUMERIC_ALPHABET => Ok(0),
            ns::DATE_TIME_ALPHABET => Ok(1),
            _ => {
                let index = self.restricted_alphabet.obtain_index(alphabet)?.index();
                Ok(index + ns::RESTRICTED_ALPHABET_APPLICATION_START)
            }
        }
    }

    /// Whether an attribute value of `len` characters should be indexed
    pub fn is_attribute_value_indexable(&self, len: usize) -> bool {
        let limits = &self.config.indexing;
        len >= limits.min_attribute_value_size
            && len < limits.max_attribute_value_size
            && self
                .attribute_value
                .total_character_count()
                .saturating_add(len)
                < limits.attribute_value_memory_limit
    }

    /// Whether a character content chunk of `len` characters should be indexed
    pub fn is_character_content_indexable(&self, len: usize) -> bool {
        let limits = &self.config.indexing;
        len >= limits.min_character_content_size
            && len < limits.max_character_content_size
            && self
                .character_content_chunk
                .total_character_count()
                .saturating_add(len)
                < limits.character_content_memory_limit
    }

    /// Layer every table over a private initial vocabulary
    pub fn set_initial_vocabulary(
        &mut self,
        parent: &ReadOnlySerializerVocabulary,
        clear: bool,
    ) -> Result<()> {
        self.layer(parent, clear)?;
        self.has_initial_vocabulary = true;
        self.referenced_uri = None;
        Ok(())
    }

    /// Layer every table over an external vocabulary identified by `uri`
    ///
    /// Applying the same URI again leaves the vocabulary untouched.
    pub fn set_referenced_vocabulary(
        &mut self,
        uri: &str,
        parent: &ReadOnlySerializerVocabulary,
        clear: bool,
    ) -> Result<()> {
        if self.referenced_uri.as_deref() == Some(uri) {
            return Ok(());
        }
        self.layer(parent, clear)?;
        self.has_initial_vocabulary = true;
        self.referenced_uri = Some(uri.to_string());
        Ok(())
    }

    fn layer(&mut self, parent: &ReadOnlySerializerVocabulary, clear: bool) -> Result<()> {
        for kind in TableKind::ALL {
            self.table_mut(kind).set_read_only(parent.table(kind), clear)?;
        }
        debug!(
            clear,
            local_names = self.local_name.read_only_len(),
            elements = self.element_name.read_only_len(),
            "layered serializer vocabulary"
        );
        Ok(())
    }

    /// Reset every table to its read-only boundary
    pub fn clear(&mut self) {
        for kind in TableKind::ALL {
            self.table_mut(kind).clear();
        }
    }

    pub fn has_initial_vocabulary(&self) -> bool {
        self.has_initial_vocabulary
    }

    pub fn referenced_vocabulary_uri(&self) -> Option<&str> {
        self.referenced_uri.as_deref()
    }

    pub fn table_len(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::ElementName => self.element_name.len(),
            TableKind::AttributeName => self.attribute_name.len(),
            _ => self.string_index(kind).map_or(0, StringIndex::len),
        }
    }

    /// Add every entry of `canonical` in table order, then entry order
    pub fn import_canonical(&mut self, canonical: &CanonicalVocabulary) -> Result<()> {
        for kind in TableKind::ALL {
            if let Some(strings) = canonical.strings(kind) {
                let table = self.string_index_mut(kind)?;
                for value in strings.iter().filter(|s| !s.is_empty()) {
                    table.obtain_index(value)?;
                }
            }
        }
        for kind in [TableKind::ElementName, TableKind::AttributeName] {
            if let Some(names) = canonical.names(kind) {
                for name in names {
                    self.import_name(kind, name)?;
                }
            }
        }
        Ok(())
    }

    fn import_name(&mut self, kind: TableKind, name: &CanonicalName) -> Result<()> {
        self.obtain_qualified_name(kind, &name.prefix, &name.namespace_name, &name.local_name)
            .map(|_| ())
    }

    /// Describe every entry, read-only base included, as a canonical vocabulary
    pub fn to_canonical(&self) -> CanonicalVocabulary {
        let mut canonical = CanonicalVocabulary::new();
        for kind in TableKind::ALL {
            if let Some(table) = self.string_index(kind) {
                for (value, _) in table.iter() {
                    canonical.insert(kind, value);
                }
            }
        }
        for name in self.element_name.names() {
            canonical.elements.insert(CanonicalName::from(name));
        }
        for name in self.attribute_name.names() {
            canonical.attributes.insert(CanonicalName::from(name));
        }
        canonical
    }

    /// Freeze and wrap for sharing between sessions
    pub fn share(self) -> Arc<ReadOnlySerializerVocabulary> {
        Arc::new(self.into_read_only())
    }

    /// Freeze into a snapshot that other vocabularies can layer over
    pub fn into_read_only(self) -> ReadOnlySerializerVocabulary {
        ReadOnlySerializerVocabulary {
            restricted_alphabet: Arc::new(self.restricted_alphabet),
            encoding_algorithm: Arc::new(self.encoding_algorithm),
            prefix: Arc::new(self.prefix),
            namespace_name: Arc::new(self.namespace_name),
            local_name: Arc::new(self.local_name),
            other_ncname: Arc::new(self.other_ncname),
            other_uri: Arc::new(self.other_uri),
            attribute_value: Arc::new(self.attribute_value),
            other_string: Arc::new(self.other_string),
            character_content_chunk: Arc::new(self.character_content_chunk),
            element_name: Arc::new(self.element_name),
            attribute_name: Arc::new(self.attribute_name),
        }
    }
}

impl Default for SerializerVocabulary {
    fn default() -> Self {
        Self::new(VocabularyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexingLimits;

    #[test]
    fn test_fixed_entries() {
        let mut vocabulary = SerializerVocabulary::default();
        assert_eq!(vocabulary.get(TableKind::Prefix, "xml"), Some(0));
        assert_eq!(vocabulary.get(TableKind::NamespaceName, ns::XML_NAMESPACE), Some(0));
        assert_eq!(
            vocabulary.obtain_index(TableKind::Prefix, "p").unwrap(),
            Obtained::Inserted(1)
        );
        vocabulary.clear();
        assert_eq!(vocabulary.table_len(TableKind::Prefix), 1);
        assert_eq!(vocabulary.table_len(TableKind::LocalName), 0);
    }

    #[test]
    fn test_oversized_hash_capacity() {
        let config = VocabularyConfig {
            initial_hash_capacity: usize::MAX,
            ..VocabularyConfig::default()
        };
        let mut vocabulary = SerializerVocabulary::new(config);
        assert_eq!(
            vocabulary.obtain_index(TableKind::LocalName, "a").unwrap(),
            Obtained::Inserted(0)
        );
        assert_eq!(
            vocabulary
                .obtain_qualified_name(TableKind::ElementName, "", "", "a")
                .unwrap(),
            Obtained::Inserted(0)
        );
    }

    #[test]
    fn test_string_and_name_tables_are_distinct() {
        let mut vocabulary = SerializerVocabulary::default();
        assert!(matches!(
            vocabulary.obtain_index(TableKind::ElementName, "x"),
            Err(FastInfosetError::IllegalVocabularyOperation(_))
        ));
        assert!(matches!(
            vocabulary.obtain_qualified_name(TableKind::LocalName, "", "", "x"),
            Err(FastInfosetError::IllegalVocabularyOperation(_))
        ));
    }

    #[test]
    fn test_qualified_name_registers_components() {
        let mut vocabulary = SerializerVocabulary::default();
        let first = vocabulary
            .obtain_qualified_name(TableKind::ElementName, "s", "urn:s", "item")
            .unwrap();
        assert_eq!(first, Obtained::Inserted(0));
        assert_eq!(vocabulary.get(TableKind::NamespaceName, "urn:s"), Some(1));
        assert_eq!(vocabulary.get(TableKind::Prefix, "s"), Some(1));
        assert_eq!(vocabulary.get(TableKind::LocalName, "item"), Some(0));

        let name = vocabulary
            .find_qualified_name(TableKind::ElementName, "s", "urn:s", "item")
            .unwrap();
        assert_eq!(name.prefix_index, Some(1));
        assert_eq!(name.namespace_name_index, Some(1));
        assert_eq!(name.local_name_index, Some(0));

        // Prefix without namespace is not registered
        vocabulary
            .obtain_qualified_name(TableKind::AttributeName, "q", "", "id")
            .unwrap();
        assert_eq!(vocabulary.get(TableKind::Prefix, "q"), None);

        let again = vocabulary
            .obtain_qualified_name(TableKind::ElementName, "s", "urn:s", "item")
            .unwrap();
        assert_eq!(again, Obtained::Found(0));
    }

    #[test]
    fn test_names_sharing_local_name() {
        let mut vocabulary = SerializerVocabulary::default();
        let a = vocabulary
            .obtain_qualified_name(TableKind::ElementName, "", "urn:a", "item")
            .unwrap();
        let b = vocabulary
            .obtain_qualified_name(TableKind::ElementName, "", "urn:b", "item")
            .unwrap();
        assert_ne!(a.index(), b.index());
        assert_eq!(
            vocabulary
                .find_qualified_name(TableKind::ElementName, "", "urn:b", "item")
                .unwrap()
                .index,
            b.index()
        );
        assert_eq!(vocabulary.get(TableKind::LocalName, "item"), Some(0));
    }

    #[test]
    fn test_attribute_names_carry_verifier_values() {
        let mut vocabulary = SerializerVocabulary::default();
        vocabulary.obtain_index(TableKind::LocalName, "pad").unwrap();
        vocabulary
            .obtain_qualified_name(TableKind::AttributeName, "", "", "id")
            .unwrap();
        let name = vocabulary
            .find_qualified_name(TableKind::AttributeName, "", "", "id")
            .unwrap();
        assert_eq!(name.attribute_hash, 1);
    }

    #[test]
    fn test_algorithm_and_alphabet_offsets() {
        let mut vocabulary = SerializerVocabulary::default();
        assert_eq!(vocabulary.encoding_algorithm_index("urn:alg").unwrap(), 32);
        assert_eq!(vocabulary.encoding_algorithm_index("urn:alg2").unwrap(), 33);
        assert_eq!(vocabulary.encoding_algorithm_index("urn:alg").unwrap(), 32);
        assert_eq!(vocabulary.restricted_alphabet_index(ns::NUMERIC_ALPHABET).unwrap(), 0);
        assert_eq!(vocabulary.restricted_alphabet_index(ns::DATE_TIME_ALPHABET).unwrap(), 1);
        assert_eq!(vocabulary.restricted_alphabet_index("abc").unwrap(), 16);
    }

    #[test]
    fn test_indexing_limits() {
        let config = VocabularyConfig::default().with_indexing(IndexingLimits {
            min_attribute_value_size: 1,
            max_attribute_value_size: 8,
            attribute_value_memory_limit: 10,
            ..IndexingLimits::default()
        });
        let mut vocabulary = SerializerVocabulary::new(config);
        assert!(!vocabulary.is_attribute_value_indexable(0));
        assert!(vocabulary.is_attribute_value_indexable(7));
        assert!(!vocabulary.is_attribute_value_indexable(8));
        vocabulary
            .obtain_index(TableKind::AttributeValue, "1234567")
            .unwrap();
        assert!(!vocabulary.is_attribute_value_indexable(3));
        assert!(vocabulary.is_attribute_value_indexable(2));
        assert!(vocabulary.is_character_content_indexable(31));
        assert!(!vocabulary.is_character_content_indexable(32));
    }

    #[test]
    fn test_initial_vocabulary_layering() {
        let mut base = SerializerVocabulary::default();
        base.obtain_index(TableKind::LocalName, "shared").unwrap();
        base.obtain_index(TableKind::Prefix, "p").unwrap();
        base.obtain_qualified_name(TableKind::ElementName, "", "", "root")
            .unwrap();
        let base = base.into_read_only();

        let mut session = SerializerVocabulary::default();
        session.obtain_index(TableKind::LocalName, "stale").unwrap();
        session.set_initial_vocabulary(&base, true).unwrap();
        assert!(session.has_initial_vocabulary());

        // Base entries keep their indices, fixed entry not doubled
        assert_eq!(session.get(TableKind::LocalName, "shared"), Some(0));
        assert_eq!(session.get(TableKind::LocalName, "stale"), None);
        assert_eq!(session.table_len(TableKind::Prefix), 2);
        assert_eq!(
            session.obtain_index(TableKind::Prefix, "q").unwrap(),
            Obtained::Inserted(2)
        );
        assert_eq!(
            session
                .obtain_qualified_name(TableKind::ElementName, "", "", "root")
                .unwrap(),
            Obtained::Found(0)
        );
        assert_eq!(
            session
                .obtain_qualified_name(TableKind::ElementName, "", "", "child")
                .unwrap(),
            Obtained::Inserted(1)
        );

        session.clear();
        for kind in TableKind::ALL {
            assert_eq!(session.table_len(kind), base.table_len(kind), "{kind}");
        }
        session.clear();
        assert_eq!(session.table_len(TableKind::LocalName), 2);
    }

    #[test]
    fn test_referenced_vocabulary_is_idempotent() {
        let mut base = SerializerVocabulary::default();
        base.obtain_index(TableKind::OtherUri, "urn:x").unwrap();
        let base = base.into_read_only();

        let mut session = SerializerVocabulary::default();
        session
            .set_referenced_vocabulary("urn:vocab", &base, true)
            .unwrap();
        session.obtain_index(TableKind::OtherUri, "urn:y").unwrap();

        // Same URI again does not clear the dynamic region
        session
            .set_referenced_vocabulary("urn:vocab", &base, true)
            .unwrap();
        assert_eq!(session.get(TableKind::OtherUri, "urn:y"), Some(1));
        assert_eq!(session.referenced_vocabulary_uri(), Some("urn:vocab"));
    }

    #[test]
    fn test_canonical_import_and_export() {
        let mut canonical = CanonicalVocabulary::new();
        canonical.insert(TableKind::LocalName, "b");
        canonical.insert(TableKind::LocalName, "");
        canonical.insert(TableKind::LocalName, "a");
        canonical.insert(TableKind::Prefix, "xml");
        canonical.insert_element("p", "urn:p", "a");
        canonical.insert_attribute("", "", "c");

        let vocabulary =
            SerializerVocabulary::from_canonical(&canonical, VocabularyConfig::default()).unwrap();
        assert_eq!(vocabulary.get(TableKind::LocalName, "b"), Some(0));
        assert_eq!(vocabulary.get(TableKind::LocalName, "a"), Some(1));
        assert_eq!(vocabulary.get(TableKind::LocalName, "c"), Some(2));
        assert_eq!(vocabulary.get(TableKind::Prefix, "xml"), Some(0));
        assert_eq!(vocabulary.get(TableKind::Prefix, "p"), Some(1));

        let exported = vocabulary.to_canonical();
        let locals: Vec<&str> = exported.local_names.iter().map(String::as_str).collect();
        assert_eq!(locals, vec!["b", "a", "c"]);
        assert_eq!(exported.elements.len(), 1);
    }
}
