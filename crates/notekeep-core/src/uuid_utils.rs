//! Note identifier generation.
//!
//! Note ids are UUIDv7 values rendered as hyphenated strings. UUIDv7 embeds a
//! millisecond Unix timestamp in its first 48 bits, so ids created later sort
//! after earlier ones. Ids are treated as opaque strings everywhere else: the
//! API matches them by exact string comparison and never parses them.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a fresh note id.
pub fn new_note_id() -> String {
    new_v7().as_hyphenated().to_string()
}
