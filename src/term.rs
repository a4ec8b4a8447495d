//! Elixir Term Conversion Utilities
//!
//! Converts vocabulary results, qualified names and errors to Elixir terms,
//! and decodes the configuration map accepted by the constructors.

use rustler::types::map::MapIterator;
use rustler::{Atom, Encoder, Env, NewBinary, NifResult, Term};
use tracing::warn;

use crate::config::{NameKeyMode, VocabularyConfig};
use crate::error::FastInfosetError;
use crate::index::Obtained;
use crate::vocab::{QualifiedName, TableKind};

rustler::atoms! {
    ok,
    error,
    found,
    inserted,
    local_name,
    qualified_name,
    unknown_table,
    mutex_poisoned,
    allocation_limit_exceeded,
    unknown_algorithm,
    malformed_algorithm_data,
    illegal_vocabulary_operation,
    duplicate_attribute,
    io,
}

/// `{:found, index}` or `{:inserted, index}`
pub fn obtained_to_term<'a>(env: Env<'a>, obtained: Obtained) -> Term<'a> {
    match obtained {
        Obtained::Found(i) => (found(), i).encode(env),
        Obtained::Inserted(i) => (inserted(), i).encode(env),
    }
}

/// `{prefix, namespace_name, local_name}` as binaries
pub fn qualified_name_to_term<'a>(env: Env<'a>, name: &QualifiedName) -> Term<'a> {
    (
        str_to_binary(env, &name.prefix),
        str_to_binary(env, &name.namespace_name),
        str_to_binary(env, &name.local_name),
    )
        .encode(env)
}

/// `{:error, {kind, message}}`
pub fn error_to_term<'a>(env: Env<'a>, err: &FastInfosetError) -> Term<'a> {
    let kind = match err {
        FastInfosetError::AllocationLimitExceeded { .. } => allocation_limit_exceeded(),
        FastInfosetError::UnknownAlgorithm(_) => unknown_algorithm(),
        FastInfosetError::MalformedAlgorithmData(_) => malformed_algorithm_data(),
        FastInfosetError::IllegalVocabularyOperation(_) => illegal_vocabulary_operation(),
        FastInfosetError::DuplicateAttribute(_) => duplicate_attribute(),
        FastInfosetError::Io(_) => io(),
    };
    (error(), (kind, err.to_string())).encode(env)
}

/// `{:error, reason}` for failures outside the library, such as a poisoned lock
pub fn reason_to_term<'a>(env: Env<'a>, reason: &str) -> Term<'a> {
    let atom = match reason {
        "mutex_poisoned" => mutex_poisoned(),
        _ => unknown_table(),
    };
    (error(), atom).encode(env)
}

/// Table kind from its name; `local_name` and `local-name` both resolve
pub fn table_kind(name: &str) -> Result<TableKind, &'static str> {
    TableKind::from_name(name).ok_or("unknown_table")
}

/// Build a `VocabularyConfig` from an Elixir map, starting from the
/// environment defaults. Nil values keep the default.
pub fn decode_config(term: Term) -> NifResult<VocabularyConfig> {
    let mut config = VocabularyConfig::from_env();
    let entries = MapIterator::new(term).ok_or(rustler::Error::BadArg)?;

    for (key, value) in entries {
        let key = key.atom_to_string()?;
        if key == "name_key_mode" {
            let mode: Atom = value.decode()?;
            config.name_key_mode = if mode == local_name() {
                NameKeyMode::LocalName
            } else if mode == qualified_name() {
                NameKeyMode::QualifiedName
            } else {
                return Err(rustler::Error::BadArg);
            };
            continue;
        }

        let Some(n) = value.decode::<Option<usize>>()? else {
            continue;
        };
        let limits = &mut config.indexing;
        match key.as_str() {
            "initial_array_capacity" => config.initial_array_capacity = n,
            "initial_hash_capacity" => config.initial_hash_capacity = n,
            "identifying_max_items" => config.identifying_max_items = n,
            "non_identifying_max_items" => config.non_identifying_max_items = n,
            "non_identifying_max_characters" => config.non_identifying_max_characters = n,
            "min_attribute_value_size" => limits.min_attribute_value_size = n,
            "max_attribute_value_size" => limits.max_attribute_value_size = n,
            "attribute_value_memory_limit" => limits.attribute_value_memory_limit = n,
            "min_character_content_size" => limits.min_character_content_size = n,
            "max_character_content_size" => limits.max_character_content_size = n,
            "character_content_memory_limit" => limits.character_content_memory_limit = n,
            other => warn!(key = other, "ignoring unknown vocabulary option"),
        }
    }
    Ok(config)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    bytes_to_binary(env, s.as_bytes())
}

#[inline]
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_kind_names() {
        assert_eq!(table_kind("local_name"), Ok(TableKind::LocalName));
        assert_eq!(table_kind("character-content-chunk"), Ok(TableKind::CharacterContentChunk));
        assert_eq!(table_kind("nope"), Err("unknown_table"));
    }
}
