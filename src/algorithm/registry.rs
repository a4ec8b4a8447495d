//! Application encoding algorithm registry and index resolution

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{
    BuiltInAlgorithm, EncodingAlgorithm, CDATA, ENCODING_ALGORITHM_APPLICATION_START,
    MAXIMUM_ALGORITHM_INDEX, RESERVED_START,
};
use crate::error::{FastInfosetError, Result};
use crate::vocab::ParserVocabulary;

/// The algorithm an index and URI resolved to
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    BuiltIn(BuiltInAlgorithm),
    Application(&'a dyn EncodingAlgorithm),
}

impl Resolved<'_> {
    pub fn algorithm(&self) -> &dyn EncodingAlgorithm {
        match self {
            Resolved::BuiltIn(algorithm) => algorithm,
            Resolved::Application(algorithm) => *algorithm,
        }
    }

    pub fn built_in(&self) -> Option<BuiltInAlgorithm> {
        match self {
            Resolved::BuiltIn(algorithm) => Some(*algorithm),
            Resolved::Application(_) => None,
        }
    }
}

/// URI → application algorithm
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    algorithms: HashMap<String, Arc<dyn EncodingAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an algorithm, returning any algorithm previously under `uri`
    pub fn register(
        &mut self,
        uri: &str,
        algorithm: Arc<dyn EncodingAlgorithm>,
    ) -> Option<Arc<dyn EncodingAlgorithm>> {
        debug!(uri, "registering encoding algorithm");
        self.algorithms.insert(uri.to_string(), algorithm)
    }

    pub fn unregister(&mut self, uri: &str) -> Option<Arc<dyn EncodingAlgorithm>> {
        self.algorithms.remove(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&Arc<dyn EncodingAlgorithm>> {
        self.algorithms.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.algorithms.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> + '_ {
        self.algorithms.keys().map(String::as_str)
    }

    /// Resolve an algorithm index, with the URI for application indices
    pub fn resolve(&self, index: usize, uri: Option<&str>) -> Result<Resolved<'_>> {
        if let Some(algorithm) = BuiltInAlgorithm::from_index(index) {
            return Ok(Resolved::BuiltIn(algorithm));
        }
        match index {
            CDATA => Err(FastInfosetError::unknown_algorithm(
                "CDATA algorithm cannot be decoded",
            )),
            i if (RESERVED_START..ENCODING_ALGORITHM_APPLICATION_START).contains(&i) => Err(
                FastInfosetError::unknown_algorithm(format!("algorithm index {i} is reserved")),
            ),
            i if i > MAXIMUM_ALGORITHM_INDEX => Err(FastInfosetError::unknown_algorithm(
                format!("algorithm index {i} is out of range"),
            )),
            i => {
                let uri = uri.ok_or_else(|| {
                    FastInfosetError::unknown_algorithm(format!(
                        "no URI for application algorithm index {i}"
                    ))
                })?;
                self.algorithms
                    .get(uri)
                    .map(|algorithm| Resolved::Application(algorithm.as_ref()))
                    .ok_or_else(|| {
                        FastInfosetError::unknown_algorithm(format!(
                            "no algorithm registered for {uri}"
                        ))
                    })
            }
        }
    }

    /// Resolve an index, taking application URIs from the vocabulary's
    /// encoding-algorithm table
    pub fn resolve_in(&self, index: usize, vocabulary: &ParserVocabulary) -> Result<Resolved<'_>> {
        self.resolve(index, vocabulary.encoding_algorithm_uri(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{AlgorithmValue, BOOLEAN};
    use crate::vocab::TableKind;
    use std::io::{Read, Write};

    /// Octets reversed; text is the octets as decimal
    #[derive(Debug)]
    struct Reversed;

    impl EncodingAlgorithm for Reversed {
        fn decode_from_bytes(&self, octets: &[u8]) -> Result<AlgorithmValue> {
            Ok(AlgorithmValue::Bytes(octets.iter().rev().copied().collect()))
        }

        fn decode_from_reader(&self, reader: &mut dyn Read) -> Result<AlgorithmValue> {
            let mut octets = Vec::new();
            reader.read_to_end(&mut octets)?;
            self.decode_from_bytes(&octets)
        }

        fn encode_to_writer(&self, value: &AlgorithmValue, writer: &mut dyn Write) -> Result<()> {
            match value {
                AlgorithmValue::Bytes(octets) => {
                    let reversed: Vec<u8> = octets.iter().rev().copied().collect();
                    Ok(writer.write_all(&reversed)?)
                }
                other => Err(FastInfosetError::malformed(other.kind())),
            }
        }

        fn convert_from_text(&self, text: &str) -> Result<AlgorithmValue> {
            text.split_ascii_whitespace()
                .map(|w| w.parse::<u8>().map_err(|e| FastInfosetError::malformed(e.to_string())))
                .collect::<Result<Vec<u8>>>()
                .map(AlgorithmValue::Bytes)
        }

        fn convert_to_text(&self, value: &AlgorithmValue, out: &mut String) -> Result<()> {
            if let AlgorithmValue::Bytes(octets) = value {
                let words: Vec<String> = octets.iter().map(u8::to_string).collect();
                out.push_str(&words.join(" "));
            }
            Ok(())
        }
    }

    #[test]
    fn test_built_in_indices() {
        let registry = AlgorithmRegistry::new();
        let resolved = registry.resolve(BOOLEAN, None).unwrap();
        assert_eq!(resolved.built_in(), Some(BuiltInAlgorithm::Boolean));
        for index in 0..9 {
            assert!(registry.resolve(index, None).is_ok());
        }
    }

    #[test]
    fn test_rejected_indices() {
        let registry = AlgorithmRegistry::new();
        for index in [9, 10, 20, 31, 256, 1000] {
            assert!(
                matches!(
                    registry.resolve(index, Some("urn:x")),
                    Err(FastInfosetError::UnknownAlgorithm(_))
                ),
                "index {index}"
            );
        }
        assert!(registry.resolve(32, None).is_err());
        assert!(registry.resolve(32, Some("urn:missing")).is_err());
    }

    #[test]
    fn test_application_algorithm() {
        let mut registry = AlgorithmRegistry::new();
        assert!(registry.register("urn:reversed", Arc::new(Reversed)).is_none());
        assert!(registry.contains("urn:reversed"));
        assert_eq!(registry.uris().collect::<Vec<_>>(), vec!["urn:reversed"]);

        let resolved = registry.resolve(40, Some("urn:reversed")).unwrap();
        assert!(resolved.built_in().is_none());
        assert_eq!(resolved.algorithm().octets_to_text(&[1, 2, 3]).unwrap(), "3 2 1");
        assert!(registry.resolve(255, Some("urn:reversed")).is_ok());

        registry.unregister("urn:reversed");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_through_vocabulary() {
        let mut registry = AlgorithmRegistry::new();
        registry.register("urn:reversed", Arc::new(Reversed));
        let mut vocabulary = ParserVocabulary::default();
        vocabulary
            .add_string(TableKind::EncodingAlgorithm, "urn:reversed")
            .unwrap();

        let resolved = registry.resolve_in(32, &vocabulary).unwrap();
        let value = resolved.algorithm().convert_from_text("7 8").unwrap();
        assert_eq!(resolved.algorithm().encode_to_vec(&value).unwrap(), vec![8, 7]);
        assert!(registry.resolve_in(33, &vocabulary).is_err());
        assert!(registry.resolve_in(2, &vocabulary).is_ok());
    }
}
