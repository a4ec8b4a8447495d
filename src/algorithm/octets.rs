//! HEXADECIMAL and BASE64 encoding algorithms
//!
//! Both carry raw octets unchanged; they differ only in the text form.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::{mismatch, AlgorithmValue};
use crate::error::{FastInfosetError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextForm {
    Hex,
    Base64,
}

pub(crate) fn decode_from_reader(reader: &mut dyn Read) -> Result<Vec<u8>> {
    let mut octets = Vec::new();
    reader.read_to_end(&mut octets)?;
    Ok(octets)
}

pub(crate) fn encode_to_writer(value: &AlgorithmValue, writer: &mut dyn Write) -> Result<()> {
    match value {
        AlgorithmValue::Bytes(octets) => Ok(writer.write_all(octets)?),
        other => Err(mismatch("bytes", other)),
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

pub(crate) fn from_text(form: TextForm, text: &str) -> Result<Vec<u8>> {
    let compact = strip_whitespace(text);
    match form {
        TextForm::Hex => hex::decode(&compact)
            .map_err(|e| FastInfosetError::malformed(format!("invalid hexadecimal text: {e}"))),
        TextForm::Base64 => STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| FastInfosetError::malformed(format!("invalid base64 text: {e}"))),
    }
}

pub(crate) fn to_text(form: TextForm, value: &AlgorithmValue, out: &mut String) -> Result<()> {
    let AlgorithmValue::Bytes(octets) = value else {
        return Err(mismatch("bytes", value));
    };
    match form {
        TextForm::Hex => out.push_str(&hex::encode_upper(octets)),
        TextForm::Base64 => STANDARD.encode_string(octets, out),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_text() {
        assert_eq!(from_text(TextForm::Hex, "0A 1F").unwrap(), vec![0x0A, 0x1F]);
        assert_eq!(from_text(TextForm::Hex, "0a\n1f").unwrap(), vec![0x0A, 0x1F]);
        let mut out = String::new();
        to_text(TextForm::Hex, &AlgorithmValue::Bytes(vec![0x0A, 0x1F]), &mut out).unwrap();
        assert_eq!(out, "0A1F");
        assert!(matches!(
            from_text(TextForm::Hex, "0A1"),
            Err(FastInfosetError::MalformedAlgorithmData(_))
        ));
    }

    #[test]
    fn test_base64_text() {
        assert_eq!(from_text(TextForm::Base64, "aGVs\nbG8=").unwrap(), b"hello");
        let mut out = String::new();
        to_text(TextForm::Base64, &AlgorithmValue::Bytes(b"hello".to_vec()), &mut out).unwrap();
        assert_eq!(out, "aGVsbG8=");
        assert!(from_text(TextForm::Base64, "***").is_err());
    }

    #[test]
    fn test_reader_and_writer() {
        let mut reader: &[u8] = &[1, 2, 3];
        let octets = decode_from_reader(&mut reader).unwrap();
        let mut out = Vec::new();
        encode_to_writer(&AlgorithmValue::Bytes(octets), &mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
        assert!(encode_to_writer(&AlgorithmValue::Ints(vec![1]), &mut out).is_err());
    }
}
