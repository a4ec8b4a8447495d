//! Vocabulary Module - the twelve dictionaries shared by encoder and decoder
//!
//! Two shapes of the same vocabulary:
//! - SerializerVocabulary: key → index hash indexes (encoding side)
//! - ParserVocabulary: index → value arrays (decoding side)
//!
//! Both can be frozen into a read-only snapshot and used as the base of
//! many per-session vocabularies. Importing a canonical vocabulary into
//! either shape yields the same index assignment.

pub mod canonical;
pub mod parser;
pub mod qname;
pub mod serializer;
pub mod table;

use std::fmt;

pub use canonical::{CanonicalName, CanonicalVocabulary};
pub use parser::{ParserVocabulary, QualifiedNameArray, ReadOnlyParserVocabulary};
pub use qname::{split_qname, DuplicateAttributeVerifier, QualifiedName, ATTRIBUTE_MAP_SIZE};
pub use serializer::{ReadOnlySerializerVocabulary, SerializerVocabulary};
pub use table::{ParserTable, SerializerTable, SharedParserTable, SharedSerializerTable};

/// Fixed entries and built-in tables defined by the format
pub mod ns {
    /// Fixed entry 0 of the prefix table
    pub const XML_PREFIX: &str = "xml";
    /// Fixed entry 0 of the namespace-name table
    pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
    /// Built-in restricted alphabet 0
    pub const NUMERIC_ALPHABET: &str = "0123456789-+.E ";
    /// Built-in restricted alphabet 1
    pub const DATE_TIME_ALPHABET: &str = "0123456789-:TZ ";
    /// First restricted alphabet index backed by the vocabulary table
    pub const RESTRICTED_ALPHABET_APPLICATION_START: usize = 16;
}

/// The twelve vocabulary tables, in format order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    RestrictedAlphabet,
    EncodingAlgorithm,
    Prefix,
    NamespaceName,
    LocalName,
    OtherNcName,
    OtherUri,
    AttributeValue,
    OtherString,
    CharacterContentChunk,
    ElementName,
    AttributeName,
}

impl TableKind {
    pub const ALL: [TableKind; 12] = [
        TableKind::RestrictedAlphabet,
        TableKind::EncodingAlgorithm,
        TableKind::Prefix,
        TableKind::NamespaceName,
        TableKind::LocalName,
        TableKind::OtherNcName,
        TableKind::OtherUri,
        TableKind::AttributeValue,
        TableKind::OtherString,
        TableKind::CharacterContentChunk,
        TableKind::ElementName,
        TableKind::AttributeName,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            TableKind::RestrictedAlphabet => "restricted-alphabet",
            TableKind::EncodingAlgorithm => "encoding-algorithm",
            TableKind::Prefix => "prefix",
            TableKind::NamespaceName => "namespace-name",
            TableKind::LocalName => "local-name",
            TableKind::OtherNcName => "other-ncname",
            TableKind::OtherUri => "other-uri",
            TableKind::AttributeValue => "attribute-value",
            TableKind::OtherString => "other-string",
            TableKind::CharacterContentChunk => "character-content-chunk",
            TableKind::ElementName => "element-name",
            TableKind::AttributeName => "attribute-name",
        }
    }

    /// Parse a table name; `_` is accepted in place of `-`
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.replace('_', "-");
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
    }

    /// Element-name and attribute-name hold qualified names, the rest strings
    pub const fn is_name_table(self) -> bool {
        matches!(self, TableKind::ElementName | TableKind::AttributeName)
    }

    /// Identifying tables hold names; the others hold content
    pub const fn is_identifying(self) -> bool {
        !matches!(
            self,
            TableKind::AttributeValue | TableKind::OtherString | TableKind::CharacterContentChunk
        )
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
