//! Error types for vocabulary and encoding algorithm operations

use std::io;

/// Errors raised by vocabulary tables and encoding algorithms
#[derive(Debug, thiserror::Error)]
pub enum FastInfosetError {
    /// A table or array reached its configured maximum capacity
    #[error("Maximum capacity of {limit} exceeded for {table}")]
    AllocationLimitExceeded { table: &'static str, limit: usize },

    /// Reserved built-in index, or an application index without a registered algorithm
    #[error("Unknown encoding algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Payload violates the structural rules of an algorithm
    #[error("Malformed algorithm data: {0}")]
    MalformedAlgorithmData(String),

    /// Mismatched table kinds passed to a layering call
    #[error("Illegal vocabulary operation: {0}")]
    IllegalVocabularyOperation(String),

    /// The same attribute name occurs twice on one element
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FastInfosetError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        FastInfosetError::MalformedAlgorithmData(msg.into())
    }

    pub(crate) fn unknown_algorithm(msg: impl Into<String>) -> Self {
        FastInfosetError::UnknownAlgorithm(msg.into())
    }

    /// Short atom-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            FastInfosetError::AllocationLimitExceeded { .. } => "allocation_limit_exceeded",
            FastInfosetError::UnknownAlgorithm(_) => "unknown_algorithm",
            FastInfosetError::MalformedAlgorithmData(_) => "malformed_algorithm_data",
            FastInfosetError::IllegalVocabularyOperation(_) => "illegal_vocabulary_operation",
            FastInfosetError::DuplicateAttribute(_) => "duplicate_attribute",
            FastInfosetError::Io(_) => "io",
        }
    }
}

/// Result type for vocabulary and algorithm operations
pub type Result<T> = std::result::Result<T, FastInfosetError>;
