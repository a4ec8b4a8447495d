//! UUID encoding algorithm
//!
//! Sixteen octets per UUID: the most significant 64 bits then the least
//! significant 64 bits, both big-endian. Text is the hyphenated form.

use std::fmt::Write as _;
use std::io::{Read, Write};

use memchr::memchr_iter;
use uuid::Uuid;

use super::{join_into, read_element};
use crate::error::{FastInfosetError, Result};

pub(crate) const SIZE: usize = 16;

pub(crate) fn decode(octets: &[u8]) -> Result<Vec<Uuid>> {
    if octets.len() % SIZE != 0 {
        return Err(FastInfosetError::malformed(format!(
            "{} octets is not a multiple of the uuid size {SIZE}",
            octets.len()
        )));
    }
    Ok(octets.chunks_exact(SIZE).map(from_octets).collect())
}

fn from_octets(octets: &[u8]) -> Uuid {
    let mut msb = [0u8; 8];
    let mut lsb = [0u8; 8];
    msb.copy_from_slice(&octets[..8]);
    lsb.copy_from_slice(&octets[8..SIZE]);
    Uuid::from_u64_pair(u64::from_be_bytes(msb), u64::from_be_bytes(lsb))
}

pub(crate) fn decode_from_reader(reader: &mut dyn Read) -> Result<Vec<Uuid>> {
    let mut values = Vec::new();
    let mut element = [0u8; SIZE];
    while read_element(reader, &mut element)? {
        values.push(from_octets(&element));
    }
    Ok(values)
}

pub(crate) fn encode(values: &[Uuid]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * SIZE);
    for value in values {
        let (msb, lsb) = value.as_u64_pair();
        out.extend_from_slice(&msb.to_be_bytes());
        out.extend_from_slice(&lsb.to_be_bytes());
    }
    out
}

pub(crate) fn encode_to_writer(values: &[Uuid], writer: &mut dyn Write) -> Result<()> {
    Ok(writer.write_all(&encode(values))?)
}

/// Parse one hyphenated UUID
///
/// Each of the five groups is read as hexadecimal and masked to its field
/// width, so short groups are accepted.
pub(crate) fn parse_word(word: &str) -> Result<Uuid> {
    let hyphens = memchr_iter(b'-', word.as_bytes()).count();
    if hyphens != 4 {
        return Err(FastInfosetError::malformed(format!(
            "'{word}' does not have five hyphen separated groups"
        )));
    }

    let mut groups = [0u64; 5];
    for (slot, group) in groups.iter_mut().zip(word.split('-')) {
        *slot = u64::from_str_radix(group, 16).map_err(|e| {
            FastInfosetError::malformed(format!("invalid uuid group '{group}' in '{word}': {e}"))
        })?;
    }

    let msb = (groups[0] & 0xFFFF_FFFF) << 32 | (groups[1] & 0xFFFF) << 16 | (groups[2] & 0xFFFF);
    let lsb = (groups[3] & 0xFFFF) << 48 | (groups[4] & 0xFFFF_FFFF_FFFF);
    Ok(Uuid::from_u64_pair(msb, lsb))
}

pub(crate) fn from_text(text: &str) -> Result<Vec<Uuid>> {
    text.split_ascii_whitespace().map(parse_word).collect()
}

pub(crate) fn to_text(values: &[Uuid], out: &mut String) -> Result<()> {
    join_into(out, values, |out, v| {
        let _ = write!(out, "{}", v.hyphenated());
    });
    Ok(())
}
