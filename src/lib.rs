//! FastInfoset - vocabulary tables and encoding algorithms for binary XML
//!
//! Layers:
//! - array: index → value storage for the parse side
//! - index: key → index hash dictionaries for the serialize side
//! - vocab: the twelve vocabulary tables in both shapes, with layering
//! - algorithm: built-in and application encoding algorithms
//! - attributes: per-element attribute values with lazy conversion
//!
//! The NIFs below expose vocabularies as resources and the built-in
//! algorithms as octet/text conversions.

use rustler::{Binary, Encoder, Env, NifResult, Term};

pub mod algorithm;
pub mod array;
pub mod attributes;
pub mod config;
pub mod error;
pub mod index;
mod resource;
mod term;
pub mod vocab;

pub use algorithm::{AlgorithmDatum, AlgorithmRegistry, AlgorithmValue, BuiltInAlgorithm, EncodingAlgorithm};
pub use attributes::AttributesHolder;
pub use config::{IndexingLimits, NameKeyMode, VocabularyConfig};
pub use error::{FastInfosetError, Result};
pub use index::Obtained;
pub use vocab::{CanonicalVocabulary, ParserVocabulary, QualifiedName, SerializerVocabulary, TableKind};

use resource::{
    ParserVocabularyRef, ParserVocabularyResource, SerializerVocabularyRef,
    SerializerVocabularyResource,
};
use term::{
    bytes_to_binary, decode_config, error_to_term, obtained_to_term, qualified_name_to_term,
    reason_to_term, str_to_binary, table_kind,
};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Encode a locked-call result, mapping both failure layers to `{:error, _}`
fn reply<'a, T>(
    env: Env<'a>,
    result: std::result::Result<Result<T>, &'static str>,
    on_ok: impl FnOnce(T) -> Term<'a>,
) -> Term<'a> {
    match result {
        Ok(Ok(value)) => on_ok(value),
        Ok(Err(e)) => error_to_term(env, &e),
        Err(reason) => reason_to_term(env, reason),
    }
}

fn nil<'a>(env: Env<'a>) -> Term<'a> {
    rustler::types::atom::nil().encode(env)
}

// ============================================================================
// Serializer Vocabulary
// ============================================================================

/// Create a serializer vocabulary from a config map (`%{}` for defaults)
#[rustler::nif]
fn serializer_new<'a>(config: Term<'a>) -> NifResult<SerializerVocabularyRef> {
    let config = decode_config(config)?;
    Ok(SerializerVocabularyRef::new(SerializerVocabularyResource::new(config)))
}

/// Index of `key` in a string table, assigning the next index if new
/// Returns `{:found, i}`, `{:inserted, i}` or `{:error, reason}`
#[rustler::nif]
fn serializer_obtain_index<'a>(
    env: Env<'a>,
    vocab: SerializerVocabularyRef,
    table: &str,
    key: &str,
) -> Term<'a> {
    let kind = match table_kind(table) {
        Ok(kind) => kind,
        Err(reason) => return reason_to_term(env, reason),
    };
    reply(env, vocab.with(|v| v.obtain_index(kind, key)), |obtained| {
        obtained_to_term(env, obtained)
    })
}

/// Index of a qualified name in the element-name or attribute-name table
#[rustler::nif]
fn serializer_obtain_name<'a>(
    env: Env<'a>,
    vocab: SerializerVocabularyRef,
    table: &str,
    prefix: &str,
    namespace_name: &str,
    local_name: &str,
) -> Term<'a> {
    let kind = match table_kind(table) {
        Ok(kind) => kind,
        Err(reason) => return reason_to_term(env, reason),
    };
    let result = vocab.with(|v| v.obtain_qualified_name(kind, prefix, namespace_name, local_name));
    reply(env, result, |obtained| obtained_to_term(env, obtained))
}

/// Index of `key` without inserting, or nil
#[rustler::nif]
fn serializer_get<'a>(env: Env<'a>, vocab: SerializerVocabularyRef, table: &str, key: &str) -> Term<'a> {
    let kind = match table_kind(table) {
        Ok(kind) => kind,
        Err(reason) => return reason_to_term(env, reason),
    };
    match vocab.with(|v| v.get(kind, key)) {
        Ok(Some(index)) => index.encode(env),
        Ok(None) => nil(env),
        Err(reason) => reason_to_term(env, reason),
    }
}

#[rustler::nif]
fn serializer_table_len<'a>(env: Env<'a>, vocab: SerializerVocabularyRef, table: &str) -> Term<'a> {
    let result = table_kind(table).and_then(|kind| vocab.with(|v| v.table_len(kind)));
    match result {
        Ok(len) => len.encode(env),
        Err(reason) => reason_to_term(env, reason),
    }
}

/// Drop every dynamic entry, keeping fixed and layered ones
#[rustler::nif]
fn serializer_clear<'a>(env: Env<'a>, vocab: SerializerVocabularyRef) -> Term<'a> {
    match vocab.with(|v| v.clear()) {
        Ok(()) => term::ok().encode(env),
        Err(reason) => reason_to_term(env, reason),
    }
}

// ============================================================================
// Parser Vocabulary
// ============================================================================

/// Create a parser vocabulary from a config map (`%{}` for defaults)
#[rustler::nif]
fn parser_new<'a>(config: Term<'a>) -> NifResult<ParserVocabularyRef> {
    let config = decode_config(config)?;
    Ok(ParserVocabularyRef::new(ParserVocabularyResource::new(config)))
}

/// Append a string, returning `{:ok, index}`
#[rustler::nif]
fn parser_add_string<'a>(env: Env<'a>, vocab: ParserVocabularyRef, table: &str, value: &str) -> Term<'a> {
    let kind = match table_kind(table) {
        Ok(kind) => kind,
        Err(reason) => return reason_to_term(env, reason),
    };
    reply(env, vocab.with(|v| v.add_string(kind, value)), |index| {
        (term::ok(), index).encode(env)
    })
}

#[rustler::nif]
fn parser_get_string<'a>(env: Env<'a>, vocab: ParserVocabularyRef, table: &str, index: usize) -> Term<'a> {
    let kind = match table_kind(table) {
        Ok(kind) => kind,
        Err(reason) => return reason_to_term(env, reason),
    };
    let result = vocab.with(|v| v.get_string(kind, index).map(|s| str_to_binary(env, s)));
    match result {
        Ok(Some(term)) => term,
        Ok(None) => nil(env),
        Err(reason) => reason_to_term(env, reason),
    }
}

/// Append a qualified name, returning `{:ok, index}`
#[rustler::nif]
fn parser_add_name<'a>(
    env: Env<'a>,
    vocab: ParserVocabularyRef,
    table: &str,
    prefix: &str,
    namespace_name: &str,
    local_name: &str,
) -> Term<'a> {
    let kind = match table_kind(table) {
        Ok(kind) => kind,
        Err(reason) => return reason_to_term(env, reason),
    };
    let name = QualifiedName::new(prefix, namespace_name, local_name);
    let result = vocab.with(|v| match kind {
        TableKind::ElementName => v.add_element_name(name),
        TableKind::AttributeName => v.add_attribute_name(name),
        other => Err(FastInfosetError::IllegalVocabularyOperation(format!(
            "{other} holds strings, not qualified names"
        ))),
    });
    reply(env, result, |index| (term::ok(), index).encode(env))
}

/// `{prefix, namespace_name, local_name}` at `index`, or nil
#[rustler::nif]
fn parser_get_name<'a>(env: Env<'a>, vocab: ParserVocabularyRef, table: &str, index: usize) -> Term<'a> {
    let kind = match table_kind(table) {
        Ok(kind) => kind,
        Err(reason) => return reason_to_term(env, reason),
    };
    let result = vocab.with(|v| {
        let name = match kind {
            TableKind::ElementName => v.element_name(index),
            TableKind::AttributeName => v.attribute_name(index),
            _ => None,
        };
        name.map(|n| qualified_name_to_term(env, n))
    });
    match result {
        Ok(Some(term)) => term,
        Ok(None) => nil(env),
        Err(reason) => reason_to_term(env, reason),
    }
}

#[rustler::nif]
fn parser_table_len<'a>(env: Env<'a>, vocab: ParserVocabularyRef, table: &str) -> Term<'a> {
    let result = table_kind(table).and_then(|kind| vocab.with(|v| v.table_len(kind)));
    match result {
        Ok(len) => len.encode(env),
        Err(reason) => reason_to_term(env, reason),
    }
}

#[rustler::nif]
fn parser_clear<'a>(env: Env<'a>, vocab: ParserVocabularyRef) -> Term<'a> {
    match vocab.with(|v| v.clear()) {
        Ok(()) => term::ok().encode(env),
        Err(reason) => reason_to_term(env, reason),
    }
}

// ============================================================================
// Encoding Algorithms
// ============================================================================

/// Lexical form of an encoded payload: `{:ok, text}` or `{:error, reason}`
#[rustler::nif]
fn algorithm_to_text<'a>(env: Env<'a>, index: usize, octets: Binary<'a>) -> Term<'a> {
    let registry = AlgorithmRegistry::new();
    let datum = AlgorithmDatum::new(index, None, octets.as_slice().to_vec());
    match datum.to_text(&registry) {
        Ok(text) => (term::ok(), str_to_binary(env, &text)).encode(env),
        Err(e) => error_to_term(env, &e),
    }
}

/// Encoded payload of a lexical value: `{:ok, octets}` or `{:error, reason}`
#[rustler::nif]
fn algorithm_from_text<'a>(env: Env<'a>, index: usize, text: &str) -> Term<'a> {
    let registry = AlgorithmRegistry::new();
    let encoded = registry.resolve(index, None).and_then(|resolved| {
        let algorithm = resolved.algorithm();
        let value = algorithm.convert_from_text(text)?;
        algorithm.encode_to_vec(&value)
    });
    match encoded {
        Ok(octets) => (term::ok(), bytes_to_binary(env, &octets)).encode(env),
        Err(e) => error_to_term(env, &e),
    }
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.FastInfoset.Native");
