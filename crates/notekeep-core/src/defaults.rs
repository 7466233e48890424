//! Centralized default constants for notekeep.
//!
//! Crates reference these constants instead of defining their own magic
//! values. Place new constants in the matching section.

// =============================================================================
// SERVER
// =============================================================================

/// Default bind address.
pub const HOST: &str = "0.0.0.0";

/// Default listen port when neither the CLI nor `PORT` supplies one.
pub const PORT: u16 = 5000;

/// Plaintext body served at `/`.
pub const LIVENESS_MESSAGE: &str = "notekeep server running";

/// Maximum accepted request body (notes are plain text).
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// STORAGE
// =============================================================================

/// Default data directory holding the token map and per-user collections.
pub const DATA_DIR: &str = "data";

/// Default token map location, relative to the data directory.
pub const TOKENS_FILE: &str = "tokens.json";

/// File name of a user's collection inside `<data_dir>/<username>/`.
pub const NOTES_FILE: &str = "notes.json";

// =============================================================================
// TOKENS
// =============================================================================

/// Random bytes per bearer token (hex-encoded to twice this length).
pub const TOKEN_BYTES: usize = 24;

// =============================================================================
// NOTES
// =============================================================================

/// Title assigned when a note is created without a usable title.
pub const UNTITLED_NOTE: &str = "Untitled Note";

// =============================================================================
// USERNAMES
// =============================================================================

pub const USERNAME_MIN_LEN: usize = 4;

pub const USERNAME_MAX_LEN: usize = 16;

/// Compared against the lowercased username.
pub const RESERVED_USERNAMES: &[&str] = &["admin", "root", "system", "null"];
