//! BOOLEAN encoding algorithm
//!
//! One bit per value, most significant first. The high nibble of the first
//! octet holds the number of unused bits at the end of the last octet, and
//! the values start at bit 4 of that same octet.

use std::io::{Read, Write};

use super::{join_into, mismatch, AlgorithmValue};
use crate::error::{FastInfosetError, Result};

const BIT_TABLE: [u8; 8] = [128, 64, 32, 16, 8, 4, 2, 1];

/// Octets needed for `count` booleans
pub(crate) fn octet_length(count: usize) -> usize {
    if count < 5 {
        1
    } else {
        1 + (count - 4).div_ceil(8)
    }
}

/// Booleans held by a payload of `octet_length` octets starting with `first`
pub(crate) fn primitive_length(octet_length: usize, first: u8) -> Result<usize> {
    let unused = usize::from(first >> 4);
    check_unused(octet_length, unused)?;
    Ok(octet_length * 8 - 4 - unused)
}

fn check_unused(octet_length: usize, unused: usize) -> Result<()> {
    match octet_length {
        0 => Err(FastInfosetError::malformed("boolean data is empty")),
        1 if unused > 4 => Err(FastInfosetError::malformed(format!(
            "{unused} unused bits in a single boolean octet"
        ))),
        _ if unused > 7 => Err(FastInfosetError::malformed(format!(
            "{unused} unused bits in boolean data"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn decode(octets: &[u8]) -> Result<Vec<bool>> {
    let first = octets
        .first()
        .copied()
        .ok_or_else(|| FastInfosetError::malformed("boolean data is empty"))?;
    let count = primitive_length(octets.len(), first)?;
    Ok((4..4 + count)
        .map(|bit| octets[bit / 8] & BIT_TABLE[bit % 8] != 0)
        .collect())
}

pub(crate) fn decode_from_reader(reader: &mut dyn Read) -> Result<Vec<bool>> {
    let mut octets = Vec::new();
    reader.read_to_end(&mut octets)?;
    if octets.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "boolean stream ended before the first octet",
        )
        .into());
    }
    decode(&octets)
}

pub(crate) fn encode(values: &[bool]) -> Vec<u8> {
    let len = octet_length(values.len());
    let mut octets = vec![0u8; len];
    let unused = len * 8 - 4 - values.len();
    octets[0] = (unused as u8) << 4;
    for (i, _) in values.iter().enumerate().filter(|(_, v)| **v) {
        let bit = i + 4;
        octets[bit / 8] |= BIT_TABLE[bit % 8];
    }
    octets
}

pub(crate) fn encode_to_writer(value: &AlgorithmValue, writer: &mut dyn Write) -> Result<()> {
    match value {
        AlgorithmValue::Booleans(values) => Ok(writer.write_all(&encode(values))?),
        other => Err(mismatch("booleans", other)),
    }
}

pub(crate) fn from_text(text: &str) -> Result<Vec<bool>> {
    text.split_ascii_whitespace()
        .map(|word| match word {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(FastInfosetError::malformed(format!(
                "'{word}' is not a boolean"
            ))),
        })
        .collect()
}

pub(crate) fn to_text(value: &AlgorithmValue, out: &mut String) -> Result<()> {
    match value {
        AlgorithmValue::Booleans(values) => {
            join_into(out, values, |out, v| {
                out.push_str(if *v { "true" } else { "false" })
            });
            Ok(())
        }
        other => Err(mismatch("booleans", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_values() {
        let octets = encode(&[true, false, true]);
        assert_eq!(octets, vec![0x1A]);
        assert_eq!(decode(&octets).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_four_values_fill_one_octet() {
        let octets = encode(&[true, true, true, true]);
        assert_eq!(octets.len(), 1);
        assert_eq!(octets[0] >> 4, 0);
        assert_eq!(octets[0], 0x0F);
    }

    #[test]
    fn test_multi_octet() {
        let values: Vec<bool> = (0..13).map(|i| i % 3 == 0).collect();
        let octets = encode(&values);
        assert_eq!(octets.len(), octet_length(13));
        assert_eq!(octets.len(), 3);
        assert_eq!(octets[0] >> 4, 7);
        assert_eq!(decode(&octets).unwrap(), values);
        assert_eq!(primitive_length(octets.len(), octets[0]).unwrap(), 13);
    }

    #[test]
    fn test_empty_list() {
        let octets = encode(&[]);
        assert_eq!(octets, vec![0x40]);
        assert!(decode(&octets).unwrap().is_empty());
    }

    #[test]
    fn test_octet_lengths() {
        assert_eq!(octet_length(0), 1);
        assert_eq!(octet_length(4), 1);
        assert_eq!(octet_length(5), 2);
        assert_eq!(octet_length(12), 2);
        assert_eq!(octet_length(13), 3);
    }

    #[test]
    fn test_invalid_unused_bits() {
        assert!(matches!(
            decode(&[0x50]),
            Err(FastInfosetError::MalformedAlgorithmData(_))
        ));
        assert!(matches!(
            decode(&[0x80, 0x00]),
            Err(FastInfosetError::MalformedAlgorithmData(_))
        ));
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_reader() {
        let mut reader: &[u8] = &[0x1A];
        assert_eq!(
            decode_from_reader(&mut reader).unwrap(),
            vec![true, false, true]
        );
        let mut empty: &[u8] = &[];
        assert!(matches!(
            decode_from_reader(&mut empty),
            Err(FastInfosetError::Io(_))
        ));
    }

    #[test]
    fn test_text() {
        let values = from_text(" true\tfalse\n1 ").unwrap();
        assert_eq!(values, vec![true, false, true]);
        let mut out = String::new();
        to_text(&AlgorithmValue::Booleans(values), &mut out).unwrap();
        assert_eq!(out, "true false true");
        assert!(from_text("yes").is_err());
    }
}
