//! SHORT, INT, LONG, FLOAT and DOUBLE encoding algorithms
//!
//! Fixed-width big-endian values packed back to back. A payload whose
//! length is not a multiple of the width is malformed.

use std::fmt::Write as _;
use std::io::{Read, Write};

use super::{join_into, read_element};
use crate::error::{FastInfosetError, Result};

/// A primitive with a fixed big-endian width and a text form
pub(crate) trait FixedWidth: Copy + Sized {
    const SIZE: usize;
    const NAME: &'static str;

    fn from_be_slice(octets: &[u8]) -> Self;
    fn write_be(self, out: &mut Vec<u8>);
    fn parse_word(word: &str) -> Option<Self>;
    fn write_text(self, out: &mut String);
}

macro_rules! integer_width {
    ($ty:ty, $name:literal) => {
        impl FixedWidth for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
            const NAME: &'static str = $name;

            fn from_be_slice(octets: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(octets);
                <$ty>::from_be_bytes(raw)
            }

            fn write_be(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }

            fn parse_word(word: &str) -> Option<Self> {
                word.parse().ok()
            }

            fn write_text(self, out: &mut String) {
                let _ = write!(out, "{self}");
            }
        }
    };
}

macro_rules! float_width {
    ($ty:ty, $name:literal) => {
        impl FixedWidth for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
            const NAME: &'static str = $name;

            fn from_be_slice(octets: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(octets);
                <$ty>::from_be_bytes(raw)
            }

            fn write_be(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }

            fn parse_word(word: &str) -> Option<Self> {
                match word {
                    "INF" => Some(<$ty>::INFINITY),
                    "-INF" => Some(<$ty>::NEG_INFINITY),
                    "NaN" => Some(<$ty>::NAN),
                    _ => word.parse().ok().filter(|v: &$ty| v.is_finite()),
                }
            }

            fn write_text(self, out: &mut String) {
                if self.is_nan() {
                    out.push_str("NaN");
                } else if self == <$ty>::INFINITY {
                    out.push_str("INF");
                } else if self == <$ty>::NEG_INFINITY {
                    out.push_str("-INF");
                } else {
                    let _ = write!(out, "{self:?}");
                }
            }
        }
    };
}

integer_width!(i16, "short");
integer_width!(i32, "int");
integer_width!(i64, "long");
float_width!(f32, "float");
float_width!(f64, "double");

/// Values held by `octet_length` octets
pub(crate) fn primitive_length<T: FixedWidth>(octet_length: usize) -> Result<usize> {
    if octet_length % T::SIZE != 0 {
        return Err(FastInfosetError::malformed(format!(
            "{octet_length} octets is not a multiple of the {} size {}",
            T::NAME,
            T::SIZE
        )));
    }
    Ok(octet_length / T::SIZE)
}

pub(crate) fn decode<T: FixedWidth>(octets: &[u8]) -> Result<Vec<T>> {
    primitive_length::<T>(octets.len())?;
    Ok(octets.chunks_exact(T::SIZE).map(T::from_be_slice).collect())
}

pub(crate) fn decode_from_reader<T: FixedWidth>(reader: &mut dyn Read) -> Result<Vec<T>> {
    let mut values = Vec::new();
    let mut element = [0u8; 8];
    let element = &mut element[..T::SIZE];
    while read_element(reader, element)? {
        values.push(T::from_be_slice(element));
    }
    Ok(values)
}

pub(crate) fn encode<T: FixedWidth>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * T::SIZE);
    for value in values {
        value.write_be(&mut out);
    }
    out
}

pub(crate) fn encode_to_writer<T: FixedWidth>(values: &[T], writer: &mut dyn Write) -> Result<()> {
    Ok(writer.write_all(&encode(values))?)
}

pub(crate) fn from_text<T: FixedWidth>(text: &str) -> Result<Vec<T>> {
    text.split_ascii_whitespace()
        .map(|word| {
            T::parse_word(word).ok_or_else(|| {
                FastInfosetError::malformed(format!("'{word}' is not a valid {}", T::NAME))
            })
        })
        .collect()
}

pub(crate) fn to_text<T: FixedWidth>(values: &[T], out: &mut String) -> Result<()> {
    join_into(out, values, |out, v| v.write_text(out));
    Ok(())
}
