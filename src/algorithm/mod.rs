//! Encoding Algorithms - typed values carried as octets
//!
//! Built-in algorithms occupy indices 0..=9 (CDATA at 9 is reserved and
//! never decoded). Indices 10..=31 are reserved by the format. Application
//! algorithms are identified by URI and take indices from 32 up to 255.
//!
//! Every algorithm converts between four forms: raw octets, an incremental
//! reader, a typed `AlgorithmValue`, and whitespace separated text.

mod boolean;
mod builtin;
mod numeric;
mod octets;
pub mod registry;
mod uuids;

use std::io::{self, Read, Write};

use uuid::Uuid;

use crate::error::{FastInfosetError, Result};

pub use builtin::BuiltInAlgorithm;
pub use registry::{AlgorithmRegistry, Resolved};

pub const HEXADECIMAL: usize = 0;
pub const BASE64: usize = 1;
pub const SHORT: usize = 2;
pub const INT: usize = 3;
pub const LONG: usize = 4;
pub const BOOLEAN: usize = 5;
pub const FLOAT: usize = 6;
pub const DOUBLE: usize = 7;
pub const UUID: usize = 8;
pub const CDATA: usize = 9;

/// First index of the reserved range following the built-ins
pub const RESERVED_START: usize = 10;
/// First index available to application algorithms
pub const ENCODING_ALGORITHM_APPLICATION_START: usize = 32;
/// Largest encodable algorithm index
pub const MAXIMUM_ALGORITHM_INDEX: usize = 255;

/// A decoded list of primitive values
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmValue {
    Bytes(Vec<u8>),
    Shorts(Vec<i16>),
    Ints(Vec<i32>),
    Longs(Vec<i64>),
    Booleans(Vec<bool>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    Uuids(Vec<Uuid>),
}

impl AlgorithmValue {
    /// Number of primitive values (octets for `Bytes`)
    pub fn len(&self) -> usize {
        match self {
            AlgorithmValue::Bytes(v) => v.len(),
            AlgorithmValue::Shorts(v) => v.len(),
            AlgorithmValue::Ints(v) => v.len(),
            AlgorithmValue::Longs(v) => v.len(),
            AlgorithmValue::Booleans(v) => v.len(),
            AlgorithmValue::Floats(v) => v.len(),
            AlgorithmValue::Doubles(v) => v.len(),
            AlgorithmValue::Uuids(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AlgorithmValue::Bytes(_) => "bytes",
            AlgorithmValue::Shorts(_) => "shorts",
            AlgorithmValue::Ints(_) => "ints",
            AlgorithmValue::Longs(_) => "longs",
            AlgorithmValue::Booleans(_) => "booleans",
            AlgorithmValue::Floats(_) => "floats",
            AlgorithmValue::Doubles(_) => "doubles",
            AlgorithmValue::Uuids(_) => "uuids",
        }
    }
}

/// Stateless converter between octets, typed values and text
pub trait EncodingAlgorithm: Send + Sync + std::fmt::Debug {
    /// Decode a complete payload
    fn decode_from_bytes(&self, octets: &[u8]) -> Result<AlgorithmValue>;

    /// Decode from a stream of unknown length, reading until end of stream
    fn decode_from_reader(&self, reader: &mut dyn Read) -> Result<AlgorithmValue>;

    fn encode_to_writer(&self, value: &AlgorithmValue, writer: &mut dyn Write) -> Result<()>;

    fn convert_from_text(&self, text: &str) -> Result<AlgorithmValue>;

    /// Append the text form of `value` to `out`
    fn convert_to_text(&self, value: &AlgorithmValue, out: &mut String) -> Result<()>;

    fn encode_to_vec(&self, value: &AlgorithmValue) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_to_writer(value, &mut buf)?;
        Ok(buf)
    }

    /// Encode into `buf` starting at `offset`, returning the octets written
    fn encode_into(&self, value: &AlgorithmValue, buf: &mut [u8], offset: usize) -> Result<usize> {
        let encoded = self.encode_to_vec(value)?;
        let end = offset
            .checked_add(encoded.len())
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| {
                FastInfosetError::malformed(format!(
                    "{} octets do not fit at offset {offset} of a {} octet buffer",
                    encoded.len(),
                    buf.len()
                ))
            })?;
        buf[offset..end].copy_from_slice(&encoded);
        Ok(encoded.len())
    }

    /// Text form of an encoded payload
    fn octets_to_text(&self, octets: &[u8]) -> Result<String> {
        let value = self.decode_from_bytes(octets)?;
        let mut text = String::new();
        self.convert_to_text(&value, &mut text)?;
        Ok(text)
    }
}

/// Encoded value as read from a document, before conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmDatum {
    pub index: usize,
    /// Identifies the algorithm when `index` is an application index
    pub uri: Option<String>,
    pub octets: Vec<u8>,
}

impl AlgorithmDatum {
    pub fn new(index: usize, uri: Option<&str>, octets: Vec<u8>) -> Self {
        AlgorithmDatum {
            index,
            uri: uri.map(str::to_string),
            octets,
        }
    }

    pub fn decode(&self, registry: &AlgorithmRegistry) -> Result<AlgorithmValue> {
        registry
            .resolve(self.index, self.uri.as_deref())?
            .algorithm()
            .decode_from_bytes(&self.octets)
    }

    pub fn to_text(&self, registry: &AlgorithmRegistry) -> Result<String> {
        registry
            .resolve(self.index, self.uri.as_deref())?
            .algorithm()
            .octets_to_text(&self.octets)
    }
}

fn mismatch(expected: &str, value: &AlgorithmValue) -> FastInfosetError {
    FastInfosetError::malformed(format!("expected {expected}, got {}", value.kind()))
}

/// Fill `buf` from `reader`
///
/// Returns false on a clean end of stream before the first octet; a stream
/// ending part way through `buf` is an `UnexpectedEof` error.
fn read_element(reader: &mut dyn Read, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("stream ended after {filled} of {} octets", buf.len()),
                )
                .into())
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Append `items` to `out` separated by single spaces
fn join_into<T, F>(out: &mut String, items: &[T], mut write: F)
where
    F: FnMut(&mut String, &T),
{
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write(out, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_len_and_kind() {
        let value = AlgorithmValue::Shorts(vec![1, 2, 3]);
        assert_eq!(value.len(), 3);
        assert_eq!(value.kind(), "shorts");
        assert!(AlgorithmValue::Bytes(Vec::new()).is_empty());
    }

    #[test]
    fn test_read_element_partial() {
        let mut reader: &[u8] = &[1, 2, 3];
        let mut buf = [0u8; 2];
        assert!(read_element(&mut reader, &mut buf).unwrap());
        assert_eq!(buf, [1, 2]);
        let err = read_element(&mut reader, &mut buf).unwrap_err();
        match err {
            FastInfosetError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error {other:?}"),
        }
        let mut empty: &[u8] = &[];
        assert!(!read_element(&mut empty, &mut buf).unwrap());
    }

    #[test]
    fn test_encode_into_offset() {
        let registry = AlgorithmRegistry::new();
        let resolved = registry.resolve(SHORT, None).unwrap();
        let algorithm = resolved.algorithm();
        let value = AlgorithmValue::Shorts(vec![10, -1]);
        let mut buf = [0u8; 6];
        assert_eq!(algorithm.encode_into(&value, &mut buf, 1).unwrap(), 4);
        assert_eq!(buf, [0x00, 0x00, 0x0A, 0xFF, 0xFF, 0x00]);
        assert!(matches!(
            algorithm.encode_into(&value, &mut buf, 3),
            Err(FastInfosetError::MalformedAlgorithmData(_))
        ));
    }

    #[test]
    fn test_datum_to_text() {
        let registry = AlgorithmRegistry::new();
        let datum = AlgorithmDatum::new(SHORT, None, vec![0x00, 0x0A, 0xFF, 0xFF]);
        assert_eq!(datum.to_text(&registry).unwrap(), "10 -1");
        let datum = AlgorithmDatum::new(CDATA, None, b"x".to_vec());
        assert!(matches!(
            datum.decode(&registry),
            Err(FastInfosetError::UnknownAlgorithm(_))
        ));
    }
}
