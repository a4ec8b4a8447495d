//! Value Arrays - index → value storage for parse-side vocabularies
//!
//! - GrowableArray: bounded append-only array with a read-only prefix
//! - ContiguousCharStore: many strings packed into one buffer

pub mod chars;
pub mod growable;

use std::sync::Arc;

pub use chars::{CharSpan, ContiguousCharStore};
pub use growable::GrowableArray;

/// Most entries reserved up front; later growth is on demand
pub(crate) const MAXIMUM_INITIAL_RESERVATION: usize = 1 << 16;

/// Array of shared strings, used for most parse-side string tables
pub type StringArray = GrowableArray<Arc<str>>;
