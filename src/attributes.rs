//! Decoded Element Attributes
//!
//! Holds the attributes of one element as a decoder produces them: a
//! qualified name plus either a literal value or an encoded datum still in
//! algorithm form. Encoded values are converted to text on first access and
//! cached; a failed conversion reads as absent.

use std::cell::OnceCell;
use std::sync::Arc;

use tracing::debug;

use crate::algorithm::{AlgorithmDatum, AlgorithmRegistry};
use crate::error::Result;
use crate::vocab::{split_qname, DuplicateAttributeVerifier, QualifiedName};

#[derive(Debug, Clone)]
enum AttributeValue {
    Literal(String),
    Encoded {
        datum: AlgorithmDatum,
        text: OnceCell<Option<String>>,
    },
}

/// One attribute of an element
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualifiedName,
    value: AttributeValue,
}

impl Attribute {
    /// The encoded datum, if this attribute was not given as a literal
    pub fn datum(&self) -> Option<&AlgorithmDatum> {
        match &self.value {
            AttributeValue::Literal(_) => None,
            AttributeValue::Encoded { datum, .. } => Some(datum),
        }
    }

    pub fn is_encoded(&self) -> bool {
        self.datum().is_some()
    }
}

/// Ordered attributes of the current element
#[derive(Debug, Clone, Default)]
pub struct AttributesHolder {
    attributes: Vec<Attribute>,
    registry: Arc<AlgorithmRegistry>,
}

impl AttributesHolder {
    /// Holder that can convert the built-in algorithms only
    pub fn new() -> Self {
        Self::default()
    }

    /// Holder that also converts the application algorithms in `registry`
    pub fn with_registry(registry: Arc<AlgorithmRegistry>) -> Self {
        AttributesHolder {
            attributes: Vec::with_capacity(8),
            registry,
        }
    }

    pub fn add_literal(&mut self, name: QualifiedName, value: &str) {
        self.attributes.push(Attribute {
            name,
            value: AttributeValue::Literal(value.to_string()),
        });
    }

    pub fn add_encoded(&mut self, name: QualifiedName, datum: AlgorithmDatum) {
        self.attributes.push(Attribute {
            name,
            value: AttributeValue::Encoded {
                datum,
                text: OnceCell::new(),
            },
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Attribute> {
        self.attributes.get(i)
    }

    pub fn name(&self, i: usize) -> Option<&QualifiedName> {
        self.attributes.get(i).map(|a| &a.name)
    }

    pub fn qname(&self, i: usize) -> Option<&str> {
        self.name(i).map(|n| &*n.qname)
    }

    pub fn local_name(&self, i: usize) -> Option<&str> {
        self.name(i).map(|n| &*n.local_name)
    }

    pub fn prefix(&self, i: usize) -> Option<&str> {
        self.name(i).map(|n| &*n.prefix)
    }

    pub fn namespace_name(&self, i: usize) -> Option<&str> {
        self.name(i).map(|n| &*n.namespace_name)
    }

    /// Value of attribute `i`, converting an encoded datum on first access
    pub fn value(&self, i: usize) -> Option<&str> {
        match &self.attributes.get(i)?.value {
            AttributeValue::Literal(value) => Some(value.as_str()),
            AttributeValue::Encoded { datum, text } => text
                .get_or_init(|| match datum.to_text(&self.registry) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        debug!(index = datum.index, error = %e, "attribute value conversion failed");
                        None
                    }
                })
                .as_deref(),
        }
    }

    pub fn datum(&self, i: usize) -> Option<&AlgorithmDatum> {
        self.attributes.get(i).and_then(Attribute::datum)
    }

    pub fn algorithm_index(&self, i: usize) -> Option<usize> {
        self.datum(i).map(|d| d.index)
    }

    pub fn algorithm_uri(&self, i: usize) -> Option<&str> {
        self.datum(i).and_then(|d| d.uri.as_deref())
    }

    /// Position of the attribute with composite name `qname`
    pub fn index_of_qname(&self, qname: &str) -> Option<usize> {
        let (prefix, local) = split_qname(qname);
        let prefix = prefix.unwrap_or("");
        self.attributes
            .iter()
            .position(|a| &*a.name.local_name == local && &*a.name.prefix == prefix)
    }

    /// Position of the attribute with this namespace and local name
    pub fn index_of(&self, namespace_name: &str, local_name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| {
            &*a.name.local_name == local_name && &*a.name.namespace_name == namespace_name
        })
    }

    pub fn value_of_qname(&self, qname: &str) -> Option<&str> {
        self.index_of_qname(qname).and_then(|i| self.value(i))
    }

    pub fn value_of(&self, namespace_name: &str, local_name: &str) -> Option<&str> {
        self.index_of(namespace_name, local_name)
            .and_then(|i| self.value(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, Option<&str>)> + '_ {
        (0..self.len()).map(move |i| (&self.attributes[i].name, self.value(i)))
    }

    /// Fail if two attributes share a name, using the verifier's attribute ids
    pub fn verify_unique(&self, verifier: &mut DuplicateAttributeVerifier) -> Result<()> {
        verifier.reset();
        for attribute in &self.attributes {
            verifier.check(&attribute.name)?;
        }
        Ok(())
    }

    /// Drop all attributes, keeping the allocation for the next element
    pub fn clear(&mut self) {
        self.attributes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{AlgorithmValue, EncodingAlgorithm, BOOLEAN, CDATA, SHORT};
    use crate::error::FastInfosetError;
    use crate::vocab::ATTRIBUTE_MAP_SIZE;
    use std::io::{Read, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn name(prefix: &str, ns: &str, local: &str, local_index: usize) -> QualifiedName {
        let mut name = QualifiedName::new(prefix, ns, local).with_indices(None, None, local_index);
        name.create_attribute_values(ATTRIBUTE_MAP_SIZE);
        name
    }

    #[test]
    fn test_literal_and_encoded_values() {
        let mut holder = AttributesHolder::new();
        holder.add_literal(name("", "", "id", 0), "a1");
        holder.add_encoded(
            name("", "", "flags", 1),
            AlgorithmDatum::new(BOOLEAN, None, vec![0x1A]),
        );
        assert_eq!(holder.len(), 2);
        assert_eq!(holder.value(0), Some("a1"));
        assert_eq!(holder.value(1), Some("true false true"));
        assert_eq!(holder.algorithm_index(1), Some(BOOLEAN));
        assert_eq!(holder.algorithm_index(0), None);
        assert!(holder.get(1).unwrap().is_encoded());
        assert_eq!(holder.value(2), None);
    }

    #[test]
    fn test_failed_conversion_reads_as_absent() {
        let mut holder = AttributesHolder::new();
        holder.add_encoded(
            name("", "", "n", 0),
            AlgorithmDatum::new(SHORT, None, vec![0x00]),
        );
        holder.add_encoded(
            name("", "", "c", 1),
            AlgorithmDatum::new(CDATA, None, b"x".to_vec()),
        );
        assert_eq!(holder.value(0), None);
        assert_eq!(holder.value(1), None);
        assert_eq!(holder.local_name(0), Some("n"));
    }

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl EncodingAlgorithm for Counting {
        fn decode_from_bytes(&self, octets: &[u8]) -> Result<AlgorithmValue> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AlgorithmValue::Bytes(octets.to_vec()))
        }

        fn decode_from_reader(&self, reader: &mut dyn Read) -> Result<AlgorithmValue> {
            let mut octets = Vec::new();
            reader.read_to_end(&mut octets)?;
            self.decode_from_bytes(&octets)
        }

        fn encode_to_writer(&self, _value: &AlgorithmValue, _writer: &mut dyn Write) -> Result<()> {
            Ok(())
        }

        fn convert_from_text(&self, text: &str) -> Result<AlgorithmValue> {
            Ok(AlgorithmValue::Bytes(text.as_bytes().to_vec()))
        }

        fn convert_to_text(&self, value: &AlgorithmValue, out: &mut String) -> Result<()> {
            if let AlgorithmValue::Bytes(octets) = value {
                out.push_str(&String::from_utf8_lossy(octets));
            }
            Ok(())
        }
    }

    #[test]
    fn test_conversion_happens_once() {
        let counting = Arc::new(Counting::default());
        let mut registry = AlgorithmRegistry::new();
        registry.register("urn:count", counting.clone());

        let mut holder = AttributesHolder::with_registry(Arc::new(registry));
        holder.add_encoded(
            name("", "", "v", 0),
            AlgorithmDatum::new(40, Some("urn:count"), b"abc".to_vec()),
        );
        assert_eq!(holder.value(0), Some("abc"));
        assert_eq!(holder.value(0), Some("abc"));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(holder.algorithm_uri(0), Some("urn:count"));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut holder = AttributesHolder::new();
        holder.add_literal(name("xlink", "http://www.w3.org/1999/xlink", "href", 0), "#a");
        holder.add_literal(name("", "", "href", 0), "#b");
        assert_eq!(holder.index_of_qname("xlink:href"), Some(0));
        assert_eq!(holder.index_of_qname("href"), Some(1));
        assert_eq!(holder.value_of("http://www.w3.org/1999/xlink", "href"), Some("#a"));
        assert_eq!(holder.value_of("", "href"), Some("#b"));
        assert_eq!(holder.value_of_qname("missing"), None);
        assert_eq!(holder.qname(0), Some("xlink:href"));
        assert_eq!(holder.prefix(0), Some("xlink"));
        assert_eq!(holder.namespace_name(1), Some(""));

        let pairs: Vec<(&str, Option<&str>)> =
            holder.iter().map(|(n, v)| (&*n.qname, v)).collect();
        assert_eq!(pairs, vec![("xlink:href", Some("#a")), ("href", Some("#b"))]);

        holder.clear();
        assert!(holder.is_empty());
    }

    #[test]
    fn test_verify_unique() {
        let mut verifier = DuplicateAttributeVerifier::new();
        let mut holder = AttributesHolder::new();
        holder.add_literal(name("", "", "a", 0), "1");
        holder.add_literal(name("", "", "b", 1), "2");
        holder.verify_unique(&mut verifier).unwrap();

        holder.add_literal(name("", "", "a", 0), "3");
        assert!(matches!(
            holder.verify_unique(&mut verifier),
            Err(FastInfosetError::DuplicateAttribute(_))
        ));
    }
}
