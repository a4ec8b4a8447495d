//! Parse-Side Vocabulary
//!
//! Index → value arrays consulted by a decoder. Every literal the decoder
//! reads is appended, so index `i` resolves to the i-th distinct value the
//! encoder added to the matching table.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::canonical::{CanonicalName, CanonicalVocabulary};
use super::ns;
use super::table::{ParserTable, SharedParserTable};
use super::{QualifiedName, TableKind, ATTRIBUTE_MAP_SIZE};
use crate::algorithm::ENCODING_ALGORITHM_APPLICATION_START;
use crate::array::{ContiguousCharStore, GrowableArray, StringArray};
use crate::config::VocabularyConfig;
use crate::error::{FastInfosetError, Result};

/// Element-name and attribute-name tables of a parse vocabulary
pub type QualifiedNameArray = GrowableArray<QualifiedName>;

/// Mutable per-session parse-side vocabulary
#[derive(Debug, Clone)]
pub struct ParserVocabulary {
    pub restricted_alphabet: StringArray,
    pub encoding_algorithm: StringArray,
    pub prefix: StringArray,
    pub namespace_name: StringArray,
    pub local_name: StringArray,
    pub other_ncname: StringArray,
    pub other_uri: StringArray,
    pub attribute_value: StringArray,
    pub other_string: StringArray,
    pub character_content_chunk: ContiguousCharStore,
    pub element_name: QualifiedNameArray,
    pub attribute_name: QualifiedNameArray,
    config: VocabularyConfig,
    has_initial_vocabulary: bool,
    referenced_uri: Option<String>,
}

/// Frozen parse-side vocabulary shared as a read-only base
#[derive(Debug, Clone)]
pub struct ReadOnlyParserVocabulary {
    restricted_alphabet: Arc<StringArray>,
    encoding_algorithm: Arc<StringArray>,
    prefix: Arc<StringArray>,
    namespace_name: Arc<StringArray>,
    local_name: Arc<StringArray>,
    other_ncname: Arc<StringArray>,
    other_uri: Arc<StringArray>,
    attribute_value: Arc<StringArray>,
    other_string: Arc<StringArray>,
    character_content_chunk: Arc<ContiguousCharStore>,
    element_name: Arc<QualifiedNameArray>,
    attribute_name: Arc<QualifiedNameArray>,
}

impl ReadOnlyParserVocabulary {
    /// Shared handle on the table of `kind`
    pub fn table(&self, kind: TableKind) -> SharedParserTable {
        use SharedParserTable::{Chunks, Names, Strings};
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
            TableKind::CharacterContentChunk => Chunks(Arc::clone(&self.character_content_chunk)),
            TableKind::ElementName => Names(Arc::clone(&self.element_name)),
            TableKind::AttributeName => Names(Arc::clone(&self.attribute_name)),
        }
    }

    pub fn table_len(&self, kind: TableKind) -> usize {
        self.table(kind).len()
    }
}

impl ParserVocabulary {
    pub fn new(config: VocabularyConfig) -> Self {
        let initial = config.initial_array_capacity;
        let identifying = config.identifying_max_items;
        let content = config.non_identifying_max_items;
        let strings = |kind: TableKind, max: usize| StringArray::new(kind.name(), initial, max);
        let names = |kind: TableKind| QualifiedNameArray::new(kind.name(), initial, identifying);

        ParserVocabulary {
            restricted_alphabet: strings(TableKind::RestrictedAlphabet, identifying),
            encoding_algorithm: strings(TableKind::EncodingAlgorithm, identifying),
            prefix: StringArray::with_fixed_entry(
                TableKind::Prefix.name(),
                Arc::from(ns::XML_PREFIX),
                initial,
                identifying,
            ),
            namespace_name: StringArray::with_fixed_entry(
                TableKind::NamespaceName.name(),
                Arc::from(ns::XML_NAMESPACE),
                initial,
                identifying,
            ),
            local_name: strings(TableKind::LocalName, identifying),
            other_ncname: strings(TableKind::OtherNcName, identifying),
            other_uri: strings(TableKind::OtherUri, identifying),
            attribute_value: strings(TableKind::AttributeValue, content),
            other_string: strings(TableKind::OtherString, content),
            character_content_chunk: ContiguousCharStore::new(
                TableKind::CharacterContentChunk.name(),
                initial,
                content,
                config.non_identifying_max_characters,
            ),
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
    pub fn table_mut(&mut self, kind: TableKind) -> ParserTable<'_> {
        use ParserTable::{Chunks, Names, Strings};
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
            TableKind::CharacterContentChunk => Chunks(&mut self.character_content_chunk),
            TableKind::ElementName => Names(&mut self.element_name),
            TableKind::AttributeName => Names(&mut self.attribute_name),
        }
    }

    fn string_array(&self, kind: TableKind) -> Option<&StringArray> {
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
            TableKind::CharacterContentChunk
            | TableKind::ElementName
            | TableKind::AttributeName => return None,
        })
    }

    /// Append a literal to a string table, returning its index
    pub fn add_string(&mut self, kind: TableKind, value: &str) -> Result<usize> {
        match self.table_mut(kind) {
            ParserTable::Strings(table) => table.append(Arc::from(value)),
            ParserTable::Chunks(chunks) => chunks.append(value),
            ParserTable::Names(_) => Err(FastInfosetError::IllegalVocabularyOperation(
                format!("{kind} holds qualified names, not strings"),
            )),
        }
    }

    /// Resolve a string table index
    pub fn get_string(&self, kind: TableKind, index: usize) -> Option<&str> {
        match kind {
            TableKind::CharacterContentChunk => self.character_content_chunk.get(index),
            _ => self
                .string_array(kind)
                .and_then(|table| table.get(index))
                .map(|s| &**s),
        }
    }

    /// Strings of a table in index order, read-only prefix first
    pub fn strings(&self, kind: TableKind) -> Box<dyn Iterator<Item = &str> + '_> {
        match kind {
            TableKind::CharacterContentChunk => Box::new(self.character_content_chunk.iter()),
            _ => match self.string_array(kind) {
                Some(table) => Box::new(table.iter().map(|s| &**s)),
                None => Box::new(std::iter::empty()),
            },
        }
    }

    /// Append an element name; its index is the current table length
    pub fn add_element_name(&mut self, name: QualifiedName) -> Result<usize> {
        let index = self.element_name.len();
        self.element_name.append(name.with_index(index))
    }

    /// Append an attribute name, deriving its duplicate-verifier values
    pub fn add_attribute_name(&mut self, name: QualifiedName) -> Result<usize> {
        let index = self.attribute_name.len();
        let mut name = name.with_index(index);
        name.create_attribute_values(ATTRIBUTE_MAP_SIZE);
        self.attribute_name.append(name)
    }

    pub fn element_name(&self, index: usize) -> Option<&QualifiedName> {
        self.element_name.get(index)
    }

    pub fn attribute_name(&self, index: usize) -> Option<&QualifiedName> {
        self.attribute_name.get(index)
    }

    /// Resolve a restricted alphabet index, built-in alphabets first
    pub fn restricted_alphabet(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(ns::NUMERIC_ALPHABET),
            1 => Some(ns::DATE_TIME_ALPHABET),
            i if i >= ns::RESTRICTED_ALPHABET_APPLICATION_START => self
                .restricted_alphabet
                .get(i - ns::RESTRICTED_ALPHABET_APPLICATION_START)
                .map(|s| &**s),
            _ => None,
        }
    }

    /// URI of an application encoding algorithm index
    pub fn encoding_algorithm_uri(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(ENCODING_ALGORITHM_APPLICATION_START)
            .and_then(|i| self.encoding_algorithm.get(i))
            .map(|s| &**s)
    }

    /// Layer every table over a private initial vocabulary
    pub fn set_initial_vocabulary(
        &mut self,
        parent: &ReadOnlyParserVocabulary,
        clear: bool,
    ) -> Result<()> {
        self.layer(parent, clear)?;
        self.has_initial_vocabulary = true;
        self.referenced_uri = None;
        Ok(())
    }

    /// Layer every table over an external vocabulary identified by `uri`
    pub fn set_referenced_vocabulary(
        &mut self,
        uri: &str,
        parent: &ReadOnlyParserVocabulary,
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

    fn layer(&mut self, parent: &ReadOnlyParserVocabulary, clear: bool) -> Result<()> {
        for kind in TableKind::ALL {
            self.table_mut(kind).set_read_only(parent.table(kind), clear)?;
        }
        debug!(
            clear,
            local_names = self.local_name.read_only_len(),
            elements = self.element_name.read_only_len(),
            "layered parser vocabulary"
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
            TableKind::CharacterContentChunk => self.character_content_chunk.len(),
            TableKind::ElementName => self.element_name.len(),
            TableKind::AttributeName => self.attribute_name.len(),
            _ => self.string_array(kind).map_or(0, GrowableArray::len),
        }
    }

    /// Add every entry of `canonical` in the same order a serialize-side
    /// import uses, so both shapes assign identical indices
    pub fn import_canonical(&mut self, canonical: &CanonicalVocabulary) -> Result<()> {
        let mut seen: Vec<HashMap<String, usize>> = TableKind::ALL
            .into_iter()
            .map(|kind| self.seed_index(kind))
            .collect();

        for kind in TableKind::ALL {
            if let Some(strings) = canonical.strings(kind) {
                for value in strings.iter().filter(|s| !s.is_empty()) {
                    self.intern(&mut seen, kind, value)?;
                }
            }
        }

        for kind in [TableKind::ElementName, TableKind::AttributeName] {
            let Some(names) = canonical.names(kind) else {
                continue;
            };
            let mut present: HashSet<CanonicalName> = self
                .names(kind)
                .map(CanonicalName::from)
                .collect();
            for name in names {
                if present.contains(name) {
                    continue;
                }
                let resolved = self.register_components(&mut seen, name)?;
                match kind {
                    TableKind::ElementName => self.add_element_name(resolved)?,
                    _ => self.add_attribute_name(resolved)?,
                };
                present.insert(name.clone());
            }
        }
        Ok(())
    }

    /// Value → index of its first occurrence in the table of `kind`
    fn seed_index(&self, kind: TableKind) -> HashMap<String, usize> {
        let mut index = HashMap::new();
        for (i, value) in self.strings(kind).enumerate() {
            // A decoded stream may repeat a literal; the first index wins
            index.entry(value.to_string()).or_insert(i);
        }
        index
    }

    fn intern(
        &mut self,
        seen: &mut [HashMap<String, usize>],
        kind: TableKind,
        value: &str,
    ) -> Result<usize> {
        let slot = kind as usize;
        if let Some(&index) = seen[slot].get(value) {
            return Ok(index);
        }
        let index = self.add_string(kind, value)?;
        seen[slot].insert(value.to_string(), index);
        Ok(index)
    }

    fn register_components(
        &mut self,
        seen: &mut [HashMap<String, usize>],
        name: &CanonicalName,
    ) -> Result<QualifiedName> {
        let mut namespace_index = None;
        let mut prefix_index = None;
        if !name.namespace_name.is_empty() {
            namespace_index = Some(self.intern(seen, TableKind::NamespaceName, &name.namespace_name)?);
            if !name.prefix.is_empty() {
                prefix_index = Some(self.intern(seen, TableKind::Prefix, &name.prefix)?);
            }
        }
        let local_index = self.intern(seen, TableKind::LocalName, &name.local_name)?;

        Ok(QualifiedName::new(&name.prefix, &name.namespace_name, &name.local_name)
            .with_indices(prefix_index, namespace_index, local_index))
    }

    fn names(&self, kind: TableKind) -> Box<dyn Iterator<Item = &QualifiedName> + '_> {
        match kind {
            TableKind::ElementName => Box::new(self.element_name.iter()),
            TableKind::AttributeName => Box::new(self.attribute_name.iter()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Describe every entry, read-only base included, as a canonical vocabulary
    pub fn to_canonical(&self) -> CanonicalVocabulary {
        let mut canonical = CanonicalVocabulary::new();
        for kind in TableKind::ALL {
            for value in self.strings(kind) {
                canonical.insert(kind, value);
            }
        }
        canonical.elements.extend(self.element_name.iter().map(CanonicalName::from));
        canonical.attributes.extend(self.attribute_name.iter().map(CanonicalName::from));
        canonical
    }

    /// Freeze and wrap for sharing between sessions
    pub fn share(self) -> Arc<ReadOnlyParserVocabulary> {
        Arc::new(self.into_read_only())
    }

    /// Freeze into a snapshot that other vocabularies can layer over
    pub fn into_read_only(self) -> ReadOnlyParserVocabulary {
        ReadOnlyParserVocabulary {
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

impl Default for ParserVocabulary {
    fn default() -> Self {
        Self::new(VocabularyConfig::default())
    }
}
