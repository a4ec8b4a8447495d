//! Contiguous Character Store
//!
//! Character content chunks are the highest-volume table of a parse-side
//! vocabulary. Instead of one allocation per entry, every chunk is copied
//! into a single backing buffer and recorded as an (offset, length) span.

use std::sync::Arc;

use tracing::warn;

use super::MAXIMUM_INITIAL_RESERVATION;
use crate::error::{FastInfosetError, Result};

/// Location of one chunk in the backing buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharSpan {
    /// Byte offset into the buffer
    pub offset: u32,
    /// Length in bytes
    pub len: u32,
}

impl CharSpan {
    #[inline]
    pub const fn new(offset: u32, len: u32) -> Self {
        CharSpan { offset, len }
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.offset as usize + self.len as usize
    }

    #[inline]
    fn slice<'a>(&self, buffer: &'a str) -> &'a str {
        buffer.get(self.offset as usize..self.end()).unwrap_or("")
    }
}

/// Packed store of character strings with a read-only prefix
#[derive(Debug, Clone)]
pub struct ContiguousCharStore {
    name: &'static str,
    buffer: String,
    spans: Vec<CharSpan>,
    /// Characters (not bytes) held by the dynamic region
    characters: usize,
    maximum_entries: usize,
    maximum_characters: usize,
    parent: Option<Arc<ContiguousCharStore>>,
    read_only_len: usize,
    read_only_characters: usize,
}

impl ContiguousCharStore {
    pub fn new(
        name: &'static str,
        initial_capacity: usize,
        maximum_entries: usize,
        maximum_characters: usize,
    ) -> Self {
        let reserved = initial_capacity
            .min(maximum_entries)
            .min(MAXIMUM_INITIAL_RESERVATION);
        ContiguousCharStore {
            name,
            buffer: String::with_capacity(reserved.saturating_mul(16)),
            spans: Vec::with_capacity(reserved),
            characters: 0,
            maximum_entries,
            maximum_characters,
            parent: None,
            read_only_len: 0,
            read_only_characters: 0,
        }
    }

    /// Copy `text` into the buffer and return its index
    pub fn append(&mut self, text: &str) -> Result<usize> {
        if self.len() >= self.maximum_entries {
            warn!(table = self.name, limit = self.maximum_entries, "character store entries exhausted");
            return Err(FastInfosetError::AllocationLimitExceeded {
                table: self.name,
                limit: self.maximum_entries,
            });
        }

        let count = text.chars().count();
        if self.total_characters().saturating_add(count) > self.maximum_characters {
            warn!(
                table = self.name,
                limit = self.maximum_characters,
                "character store characters exhausted"
            );
            return Err(FastInfosetError::AllocationLimitExceeded {
                table: self.name,
                limit: self.maximum_characters,
            });
        }

        let offset = self.buffer.len();
        if offset + text.len() > u32::MAX as usize {
            return Err(FastInfosetError::AllocationLimitExceeded {
                table: self.name,
                limit: u32::MAX as usize,
            });
        }

        if self.spans.len() == self.spans.capacity() {
            let additional = self.spans.capacity() / 2 + 1;
            self.spans.reserve_exact(additional);
        }

        self.buffer.push_str(text);
        self.spans
            .push(CharSpan::new(offset as u32, text.len() as u32));
        self.characters += count;
        Ok(self.len() - 1)
    }

    /// Get the chunk at index `i`
    pub fn get(&self, i: usize) -> Option<&str> {
        if i < self.read_only_len {
            return self.parent.as_ref().and_then(|p| p.get(i));
        }
        self.spans
            .get(i - self.read_only_len)
            .map(|span| span.slice(&self.buffer))
    }

    /// Span of a dynamic entry, if `i` is past the read-only prefix
    pub fn span(&self, i: usize) -> Option<CharSpan> {
        i.checked_sub(self.read_only_len)
            .and_then(|local| self.spans.get(local).copied())
    }

    pub fn set_read_only(&mut self, parent: Arc<ContiguousCharStore>, clear: bool) {
        self.read_only_len = parent.len();
        self.read_only_characters = parent.total_characters();
        self.parent = Some(parent);
        if clear {
            self.clear();
        }
    }

    pub fn remove_read_only(&mut self) {
        self.parent = None;
        self.read_only_len = 0;
        self.read_only_characters = 0;
        self.clear();
    }

    /// Truncate to the read-only boundary, keeping the allocations
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.spans.clear();
        self.characters = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.read_only_len + self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn read_only_len(&self) -> usize {
        self.read_only_len
    }

    /// Characters held by the parent and the dynamic region together
    pub fn total_characters(&self) -> usize {
        self.read_only_characters + self.characters
    }

    /// Bytes held by the dynamic region's buffer
    pub fn bytes_used(&self) -> usize {
        self.buffer.len()
    }

    pub fn maximum_entries(&self) -> usize {
        self.maximum_entries
    }

    pub fn maximum_characters(&self) -> usize {
        self.maximum_characters
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}
