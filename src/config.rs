//! Vocabulary Configuration
//!
//! Capacity limits and hash sizing are carried by an explicit value handed
//! to every vocabulary and table constructor. `from_env()` is offered for
//! hosts that want to read the limits once at startup.

use tracing::warn;

/// Default initial capacity of growable arrays
pub const DEFAULT_ARRAY_CAPACITY: usize = 10;

/// Default initial bucket count of hash indexes (always a power of two)
pub const DEFAULT_HASH_CAPACITY: usize = 16;

/// Environment variable names read by [`VocabularyConfig::from_env`]
pub mod env {
    pub const IDENTIFYING_MAX_ITEMS: &str = "FASTINFOSET_IDENTIFYING_MAX_ITEMS";
    pub const NON_IDENTIFYING_MAX_ITEMS: &str = "FASTINFOSET_NON_IDENTIFYING_MAX_ITEMS";
    pub const NON_IDENTIFYING_MAX_CHARACTERS: &str = "FASTINFOSET_NON_IDENTIFYING_MAX_CHARACTERS";
    pub const ATTRIBUTE_VALUE_SIZE_LIMIT: &str = "FASTINFOSET_ATTRIBUTE_VALUE_SIZE_LIMIT";
    pub const CHARACTER_CONTENT_SIZE_LIMIT: &str = "FASTINFOSET_CHARACTER_CONTENT_SIZE_LIMIT";
}

/// How element and attribute name buckets are keyed on the serialize side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameKeyMode {
    /// Bucket by local name; namespaces are told apart inside the bucket
    #[default]
    LocalName,
    /// Bucket by the composite `prefix:local` literal
    QualifiedName,
}

/// Rules deciding whether a serializer indexes a value at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingLimits {
    /// Attribute values shorter than this are not indexed
    pub min_attribute_value_size: usize,
    /// Attribute values of this length or longer are not indexed
    pub max_attribute_value_size: usize,
    /// Total characters the attribute value table may hold
    pub attribute_value_memory_limit: usize,
    /// Character chunks shorter than this are not indexed
    pub min_character_content_size: usize,
    /// Character chunks of this length or longer are not indexed
    pub max_character_content_size: usize,
    /// Total characters the character content table may hold
    pub character_content_memory_limit: usize,
}

impl Default for IndexingLimits {
    fn default() -> Self {
        IndexingLimits {
            min_attribute_value_size: 0,
            max_attribute_value_size: 32,
            attribute_value_memory_limit: usize::MAX,
            min_character_content_size: 0,
            max_character_content_size: 32,
            character_content_memory_limit: usize::MAX,
        }
    }
}

/// Configuration shared by both vocabulary shapes
///
/// Identifying tables hold names (prefixes, namespaces, local names, other
/// NCNames and URIs, element and attribute names, alphabets and algorithm
/// URIs). Non-identifying tables hold attribute values, other strings and
/// character content chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyConfig {
    pub initial_array_capacity: usize,
    pub initial_hash_capacity: usize,
    pub identifying_max_items: usize,
    pub non_identifying_max_items: usize,
    pub non_identifying_max_characters: usize,
    pub name_key_mode: NameKeyMode,
    pub indexing: IndexingLimits,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        VocabularyConfig {
            initial_array_capacity: DEFAULT_ARRAY_CAPACITY,
            initial_hash_capacity: DEFAULT_HASH_CAPACITY,
            identifying_max_items: usize::MAX,
            non_identifying_max_items: usize::MAX,
            non_identifying_max_characters: usize::MAX,
            name_key_mode: NameKeyMode::default(),
            indexing: IndexingLimits::default(),
        }
    }
}

impl VocabularyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read limits from `FASTINFOSET_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = VocabularyConfig::default();
        let read = |key: &str, current: usize| -> usize {
            match lookup(key) {
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(v) if v > 0 => v,
                    _ => {
                        warn!(key, value = %raw, "ignoring invalid vocabulary limit");
                        current
                    }
                },
                None => current,
            }
        };

        config.identifying_max_items = read(env::IDENTIFYING_MAX_ITEMS, config.identifying_max_items);
        config.non_identifying_max_items =
            read(env::NON_IDENTIFYING_MAX_ITEMS, config.non_identifying_max_items);
        config.non_identifying_max_characters =
            read(env::NON_IDENTIFYING_MAX_CHARACTERS, config.non_identifying_max_characters);
        config.indexing.max_attribute_value_size =
            read(env::ATTRIBUTE_VALUE_SIZE_LIMIT, config.indexing.max_attribute_value_size);
        config.indexing.max_character_content_size =
            read(env::CHARACTER_CONTENT_SIZE_LIMIT, config.indexing.max_character_content_size);
        config
    }

    pub fn with_identifying_max_items(mut self, max: usize) -> Self {
        self.identifying_max_items = max;
        self
    }

    pub fn with_non_identifying_max_items(mut self, max: usize) -> Self {
        self.non_identifying_max_items = max;
        self
    }

    pub fn with_non_identifying_max_characters(mut self, max: usize) -> Self {
        self.non_identifying_max_characters = max;
        self
    }

    pub fn with_name_key_mode(mut self, mode: NameKeyMode) -> Self {
        self.name_key_mode = mode;
        self
    }

    pub fn with_indexing(mut self, indexing: IndexingLimits) -> Self {
        self.indexing = indexing;
        self
    }

    /// Bucket count rounded up to a power of two, capped at the index maximum
    pub(crate) fn hash_capacity(&self) -> usize {
        crate::index::bucket_count(self.initial_hash_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = VocabularyConfig::default();
        assert_eq!(config.initial_array_capacity, 10);
        assert_eq!(config.hash_capacity(), 16);
        assert_eq!(config.identifying_max_items, usize::MAX);
        assert_eq!(config.name_key_mode, NameKeyMode::LocalName);
        assert_eq!(config.indexing.max_attribute_value_size, 32);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (env::IDENTIFYING_MAX_ITEMS, "100"),
            (env::NON_IDENTIFYING_MAX_CHARACTERS, " 4096 "),
            (env::NON_IDENTIFYING_MAX_ITEMS, "not-a-number"),
            (env::ATTRIBUTE_VALUE_SIZE_LIMIT, "0"),
        ]
        .into_iter()
        .collect();

        let config = VocabularyConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.identifying_max_items, 100);
        assert_eq!(config.non_identifying_max_characters, 4096);
        // Invalid and zero values fall back to defaults
        assert_eq!(config.non_identifying_max_items, usize::MAX);
        assert_eq!(config.indexing.max_attribute_value_size, 32);
    }

    #[test]
    fn test_hash_capacity_rounding() {
        let mut config = VocabularyConfig::default();
        config.initial_hash_capacity = 20;
        assert_eq!(config.hash_capacity(), 32);
        config.initial_hash_capacity = 0;
        assert_eq!(config.hash_capacity(), 1);
        config.initial_hash_capacity = usize::MAX;
        assert_eq!(config.hash_capacity(), crate::index::MAXIMUM_BUCKETS);
    }

    #[test]
    fn test_builders() {
        let config = VocabularyConfig::new()
            .with_identifying_max_items(5)
            .with_name_key_mode(NameKeyMode::QualifiedName);
        assert_eq!(config.identifying_max_items, 5);
        assert_eq!(config.name_key_mode, NameKeyMode::QualifiedName);
    }
}
