//! The nine decodable built-in algorithms

use std::fmt;
use std::io::{Read, Write};

use super::octets::TextForm;
use super::{boolean, numeric, octets, uuids};
use super::{mismatch, AlgorithmValue, EncodingAlgorithm};
use super::{BASE64, BOOLEAN, DOUBLE, FLOAT, HEXADECIMAL, INT, LONG, SHORT, UUID};
use crate::error::{FastInfosetError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInAlgorithm {
    Hexadecimal,
    Base64,
    Short,
    Int,
    Long,
    Boolean,
    Float,
    Double,
    Uuid,
}

impl BuiltInAlgorithm {
    pub const ALL: [BuiltInAlgorithm; 9] = [
        BuiltInAlgorithm::Hexadecimal,
        BuiltInAlgorithm::Base64,
        BuiltInAlgorithm::Short,
        BuiltInAlgorithm::Int,
        BuiltInAlgorithm::Long,
        BuiltInAlgorithm::Boolean,
        BuiltInAlgorithm::Float,
        BuiltInAlgorithm::Double,
        BuiltInAlgorithm::Uuid,
    ];

    /// The algorithm at a built-in index; `None` for CDATA and beyond
    pub fn from_index(index: usize) -> Option<Self> {
        BuiltInAlgorithm::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            BuiltInAlgorithm::Hexadecimal => HEXADECIMAL,
            BuiltInAlgorithm::Base64 => BASE64,
            BuiltInAlgorithm::Short => SHORT,
            BuiltInAlgorithm::Int => INT,
            BuiltInAlgorithm::Long => LONG,
            BuiltInAlgorithm::Boolean => BOOLEAN,
            BuiltInAlgorithm::Float => FLOAT,
            BuiltInAlgorithm::Double => DOUBLE,
            BuiltInAlgorithm::Uuid => UUID,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltInAlgorithm::Hexadecimal => "hexadecimal",
            BuiltInAlgorithm::Base64 => "base64",
            BuiltInAlgorithm::Short => "short",
            BuiltInAlgorithm::Int => "int",
            BuiltInAlgorithm::Long => "long",
            BuiltInAlgorithm::Boolean => "boolean",
            BuiltInAlgorithm::Float => "float",
            BuiltInAlgorithm::Double => "double",
            BuiltInAlgorithm::Uuid => "uuid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BuiltInAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == name)
    }

    /// Octets per value for the fixed-width algorithms
    pub fn element_size(self) -> Option<usize> {
        match self {
            BuiltInAlgorithm::Short => Some(2),
            BuiltInAlgorithm::Int | BuiltInAlgorithm::Float => Some(4),
            BuiltInAlgorithm::Long | BuiltInAlgorithm::Double => Some(8),
            BuiltInAlgorithm::Uuid => Some(uuids::SIZE),
            BuiltInAlgorithm::Hexadecimal | BuiltInAlgorithm::Base64 => Some(1),
            BuiltInAlgorithm::Boolean => None,
        }
    }

    /// Number of values in a payload of `octet_length` octets
    ///
    /// `first_octet` is only consulted by BOOLEAN, whose count depends on
    /// the unused-bit nibble.
    pub fn primitive_length_from_octet_length(
        self,
        octet_length: usize,
        first_octet: u8,
    ) -> Result<usize> {
        match self {
            BuiltInAlgorithm::Hexadecimal | BuiltInAlgorithm::Base64 => Ok(octet_length),
            BuiltInAlgorithm::Short => numeric::primitive_length::<i16>(octet_length),
            BuiltInAlgorithm::Int => numeric::primitive_length::<i32>(octet_length),
            BuiltInAlgorithm::Long => numeric::primitive_length::<i64>(octet_length),
            BuiltInAlgorithm::Float => numeric::primitive_length::<f32>(octet_length),
            BuiltInAlgorithm::Double => numeric::primitive_length::<f64>(octet_length),
            BuiltInAlgorithm::Boolean => boolean::primitive_length(octet_length, first_octet),
            BuiltInAlgorithm::Uuid => {
                if octet_length % uuids::SIZE != 0 {
                    return Err(FastInfosetError::malformed(format!(
                        "{octet_length} octets is not a multiple of the uuid size"
                    )));
                }
                Ok(octet_length / uuids::SIZE)
            }
        }
    }

    /// Octets needed to encode `primitive_length` values
    pub fn octet_length_from_primitive_length(self, primitive_length: usize) -> usize {
        match self.element_size() {
            Some(size) => primitive_length * size,
            None => boolean::octet_length(primitive_length),
        }
    }

    /// Encode `value` into `buf` at `offset`, returning the octets written
    pub fn encode_to_bytes(self, value: &AlgorithmValue, buf: &mut [u8], offset: usize) -> Result<usize> {
        let needed = self.octet_length_from_primitive_length(value.len());
        let end = offset
            .checked_add(needed)
            .filter(|end| *end <= buf.len())
            .ok_or_else(|| {
                FastInfosetError::malformed(format!(
                    "{needed} octets do not fit at offset {offset} of a {} octet buffer",
                    buf.len()
                ))
            })?;
        let mut target = &mut buf[offset..end];
        self.encode_to_writer(value, &mut target)?;
        Ok(needed)
    }
}

impl fmt::Display for BuiltInAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl EncodingAlgorithm for BuiltInAlgorithm {
    fn decode_from_bytes(&self, octets: &[u8]) -> Result<AlgorithmValue> {
        Ok(match self {
            BuiltInAlgorithm::Hexadecimal | BuiltInAlgorithm::Base64 => {
                AlgorithmValue::Bytes(octets.to_vec())
            }
            BuiltInAlgorithm::Short => AlgorithmValue::Shorts(numeric::decode(octets)?),
            BuiltInAlgorithm::Int => AlgorithmValue::Ints(numeric::decode(octets)?),
            BuiltInAlgorithm::Long => AlgorithmValue::Longs(numeric::decode(octets)?),
            BuiltInAlgorithm::Boolean => AlgorithmValue::Booleans(boolean::decode(octets)?),
            BuiltInAlgorithm::Float => AlgorithmValue::Floats(numeric::decode(octets)?),
            BuiltInAlgorithm::Double => AlgorithmValue::Doubles(numeric::decode(octets)?),
            BuiltInAlgorithm::Uuid => AlgorithmValue::Uuids(uuids::decode(octets)?),
        })
    }

    fn decode_from_reader(&self, reader: &mut dyn Read) -> Result<AlgorithmValue> {
        Ok(match self {
            BuiltInAlgorithm::Hexadecimal | BuiltInAlgorithm::Base64 => {
                AlgorithmValue::Bytes(octets::decode_from_reader(reader)?)
            }
            BuiltInAlgorithm::Short => AlgorithmValue::Shorts(numeric::decode_from_reader(reader)?),
            BuiltInAlgorithm::Int => AlgorithmValue::Ints(numeric::decode_from_reader(reader)?),
            BuiltInAlgorithm::Long => AlgorithmValue::Longs(numeric::decode_from_reader(reader)?),
            BuiltInAlgorithm::Boolean => {
                AlgorithmValue::Booleans(boolean::decode_from_reader(reader)?)
            }
            BuiltInAlgorithm::Float => AlgorithmValue::Floats(numeric::decode_from_reader(reader)?),
            BuiltInAlgorithm::Double => {
                AlgorithmValue::Doubles(numeric::decode_from_reader(reader)?)
            }
            BuiltInAlgorithm::Uuid => AlgorithmValue::Uuids(uuids::decode_from_reader(reader)?),
        })
    }

    fn encode_to_writer(&self, value: &AlgorithmValue, writer: &mut dyn Write) -> Result<()> {
        match (self, value) {
            (BuiltInAlgorithm::Hexadecimal | BuiltInAlgorithm::Base64, _) => {
                octets::encode_to_writer(value, writer)
            }
            (BuiltInAlgorithm::Boolean, _) => boolean::encode_to_writer(value, writer),
            (BuiltInAlgorithm::Short, AlgorithmValue::Shorts(v)) => numeric::encode_to_writer(v, writer),
            (BuiltInAlgorithm::Int, AlgorithmValue::Ints(v)) => numeric::encode_to_writer(v, writer),
            (BuiltInAlgorithm::Long, AlgorithmValue::Longs(v)) => numeric::encode_to_writer(v, writer),
            (BuiltInAlgorithm::Float, AlgorithmValue::Floats(v)) => numeric::encode_to_writer(v, writer),
            (BuiltInAlgorithm::Double, AlgorithmValue::Doubles(v)) => {
                numeric::encode_to_writer(v, writer)
            }
            (BuiltInAlgorithm::Uuid, AlgorithmValue::Uuids(v)) => uuids::encode_to_writer(v, writer),
            (algorithm, other) => Err(mismatch(algorithm.value_kind(), other)),
        }
    }

    fn convert_from_text(&self, text: &str) -> Result<AlgorithmValue> {
        Ok(match self {
            BuiltInAlgorithm::Hexadecimal => {
                AlgorithmValue::Bytes(octets::from_text(TextForm::Hex, text)?)
            }
            BuiltInAlgorithm::Base64 => {
                AlgorithmValue::Bytes(octets::from_text(TextForm::Base64, text)?)
            }
            BuiltInAlgorithm::Short => AlgorithmValue::Shorts(numeric::from_text(text)?),
            BuiltInAlgorithm::Int => AlgorithmValue::Ints(numeric::from_text(text)?),
            BuiltInAlgorithm::Long => AlgorithmValue::Longs(numeric::from_text(text)?),
            BuiltInAlgorithm::Boolean => AlgorithmValue::Booleans(boolean::from_text(text)?),
            BuiltInAlgorithm::Float => AlgorithmValue::Floats(numeric::from_text(text)?),
            BuiltInAlgorithm::Double => AlgorithmValue::Doubles(numeric::from_text(text)?),
            BuiltInAlgorithm::Uuid => AlgorithmValue::Uuids(uuids::from_text(text)?),
        })
    }

    fn convert_to_text(&self, value: &AlgorithmValue, out: &mut String) -> Result<()> {
        match (self, value) {
            (BuiltInAlgorithm::Hexadecimal, _) => octets::to_text(TextForm::Hex, value, out),
            (BuiltInAlgorithm::Base64, _) => octets::to_text(TextForm::Base64, value, out),
            (BuiltInAlgorithm::Boolean, _) => boolean::to_text(value, out),
            (BuiltInAlgorithm::Short, AlgorithmValue::Shorts(v)) => numeric::to_text(v, out),
            (BuiltInAlgorithm::Int, AlgorithmValue::Ints(v)) => numeric::to_text(v, out),
            (BuiltInAlgorithm::Long, AlgorithmValue::Longs(v)) => numeric::to_text(v, out),
            (BuiltInAlgorithm::Float, AlgorithmValue::Floats(v)) => numeric::to_text(v, out),
            (BuiltInAlgorithm::Double, AlgorithmValue::Doubles(v)) => numeric::to_text(v, out),
            (BuiltInAlgorithm::Uuid, AlgorithmValue::Uuids(v)) => uuids::to_text(v, out),
            (algorithm, other) => Err(mismatch(algorithm.value_kind(), other)),
        }
    }
}

impl BuiltInAlgorithm {
    /// Name of the `AlgorithmValue` variant this algorithm produces
    fn value_kind(self) -> &'static str {
        match self {
            BuiltInAlgorithm::Hexadecimal | BuiltInAlgorithm::Base64 => "bytes",
            BuiltInAlgorithm::Short => "shorts",
            BuiltInAlgorithm::Int => "ints",
            BuiltInAlgorithm::Long => "longs",
            BuiltInAlgorithm::Boolean => "booleans",
            BuiltInAlgorithm::Float => "floats",
            BuiltInAlgorithm::Double => "doubles",
            BuiltInAlgorithm::Uuid => "uuids",
        }
    }
}
