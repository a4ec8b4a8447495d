//! ResourceArc Wrappers
//!
//! Vocabularies held across NIF calls. Each resource owns one vocabulary
//! behind a mutex; every call locks it for the duration of one operation.

use std::sync::Mutex;

use rustler::ResourceArc;

use crate::config::VocabularyConfig;
use crate::vocab::{ParserVocabulary, SerializerVocabulary};

/// Serialize-side vocabulary owned by the BEAM
pub struct SerializerVocabularyResource {
    pub inner: Mutex<SerializerVocabulary>,
}

impl SerializerVocabularyResource {
    pub fn new(config: VocabularyConfig) -> Self {
        SerializerVocabularyResource {
            inner: Mutex::new(SerializerVocabulary::new(config)),
        }
    }

    /// Run `f` against the locked vocabulary
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous call panicked while holding the lock.
    pub fn with<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut SerializerVocabulary) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for SerializerVocabularyResource {}

impl Default for SerializerVocabularyResource {
    fn default() -> Self {
        Self::new(VocabularyConfig::default())
    }
}

pub type SerializerVocabularyRef = ResourceArc<SerializerVocabularyResource>;

/// Parse-side vocabulary owned by the BEAM
pub struct ParserVocabularyResource {
    pub inner: Mutex<ParserVocabulary>,
}

impl ParserVocabularyResource {
    pub fn new(config: VocabularyConfig) -> Self {
        ParserVocabularyResource {
            inner: Mutex::new(ParserVocabulary::new(config)),
        }
    }

    /// Run `f` against the locked vocabulary
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous call panicked while holding the lock.
    pub fn with<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut ParserVocabulary) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for ParserVocabularyResource {}

impl Default for ParserVocabularyResource {
    fn default() -> Self {
        Self::new(VocabularyConfig::default())
    }
}

pub type ParserVocabularyRef = ResourceArc<ParserVocabularyResource>;
