//! Table Variants
//!
//! Per-kind access to vocabulary tables as a closed set of shapes. Layering
//! pairs a mutable table with a shared parent of the same shape; any other
//! pairing is rejected.

use std::sync::Arc;

use crate::array::{ContiguousCharStore, StringArray};
use crate::error::{FastInfosetError, Result};
use crate::index::{QualifiedNameIndex, StringIndex};
use crate::vocab::parser::QualifiedNameArray;

/// Mutable view of one serialize-side table
#[derive(Debug)]
pub enum SerializerTable<'a> {
    Strings(&'a mut StringIndex),
    Names(&'a mut QualifiedNameIndex),
}

/// Read-only serialize-side table usable as a layering parent
#[derive(Debug, Clone)]
pub enum SharedSerializerTable {
    Strings(Arc<StringIndex>),
    Names(Arc<QualifiedNameIndex>),
}

impl SharedSerializerTable {
    pub fn shape(&self) -> &'static str {
        match self {
            SharedSerializerTable::Strings(_) => "string index",
            SharedSerializerTable::Names(_) => "qualified name index",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SharedSerializerTable::Strings(t) => t.len(),
            SharedSerializerTable::Names(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SerializerTable<'_> {
    pub fn shape(&self) -> &'static str {
        match self {
            SerializerTable::Strings(_) => "string index",
            SerializerTable::Names(_) => "qualified name index",
        }
    }

    /// Layer this table over `parent`
    pub fn set_read_only(self, parent: SharedSerializerTable, clear: bool) -> Result<()> {
        match (self, parent) {
            (SerializerTable::Strings(table), SharedSerializerTable::Strings(parent)) => {
                table.set_read_only(parent, clear);
                Ok(())
            }
            (SerializerTable::Names(table), SharedSerializerTable::Names(parent)) => {
                table.set_read_only(parent, clear);
                Ok(())
            }
            (table, parent) => Err(FastInfosetError::IllegalVocabularyOperation(format!(
                "cannot layer a {} over a {}",
                table.shape(),
                parent.shape()
            ))),
        }
    }

    pub fn clear(self) {
        match self {
            SerializerTable::Strings(t) => t.clear(),
            SerializerTable::Names(t) => t.clear(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SerializerTable::Strings(t) => t.len(),
            SerializerTable::Names(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_only_len(&self) -> usize {
        match self {
            SerializerTable::Strings(t) => t.read_only_len(),
            SerializerTable::Names(t) => t.read_only_len(),
        }
    }
}

/// Mutable view of one parse-side table
#[derive(Debug)]
pub enum ParserTable<'a> {
    Strings(&'a mut StringArray),
    Chunks(&'a mut ContiguousCharStore),
    Names(&'a mut QualifiedNameArray),
}

/// Read-only parse-side table usable as a layering parent
#[derive(Debug, Clone)]
pub enum SharedParserTable {
    Strings(Arc<StringArray>),
    Chunks(Arc<ContiguousCharStore>),
    Names(Arc<QualifiedNameArray>),
}

impl SharedParserTable {
    pub fn shape(&self) -> &'static str {
        match self {
            SharedParserTable::Strings(_) => "string array",
            SharedParserTable::Chunks(_) => "character store",
            SharedParserTable::Names(_) => "qualified name array",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SharedParserTable::Strings(t) => t.len(),
            SharedParserTable::Chunks(t) => t.len(),
            SharedParserTable::Names(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ParserTable<'_> {
    pub fn shape(&self) -> &'static str {
        match self {
            ParserTable::Strings(_) => "string array",
            ParserTable::Chunks(_) => "character store",
            ParserTable::Names(_) => "qualified name array",
        }
    }

    /// Layer this table over `parent`
    pub fn set_read_only(self, parent: SharedParserTable, clear: bool) -> Result<()> {
        match (self, parent) {
            (ParserTable::Strings(table), SharedParserTable::Strings(parent)) => {
                table.set_read_only(parent, clear);
                Ok(())
            }
            (ParserTable::Chunks(table), SharedParserTable::Chunks(parent)) => {
                table.set_read_only(parent, clear);
                Ok(())
            }
            (ParserTable::Names(table), SharedParserTable::Names(parent)) => {
                table.set_read_only(parent, clear);
                Ok(())
            }
            (table, parent) => Err(FastInfosetError::IllegalVocabularyOperation(format!(
                "cannot layer a {} over a {}",
                table.shape(),
                parent.shape()
            ))),
        }
    }

    pub fn clear(self) {
        match self {
            ParserTable::Strings(t) => t.clear(),
            ParserTable::Chunks(t) => t.clear(),
            ParserTable::Names(t) => t.clear(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ParserTable::Strings(t) => t.len(),
            ParserTable::Chunks(t) => t.len(),
            ParserTable::Names(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_only_len(&self) -> usize {
        match self {
            ParserTable::Strings(t) => t.read_only_len(),
            ParserTable::Chunks(t) => t.read_only_len(),
            ParserTable::Names(t) => t.read_only_len(),
        }
    }
}
