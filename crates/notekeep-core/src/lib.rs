//! # notekeep-core
//!
//! Core types, traits, and abstractions for notekeep.
//!
//! This crate provides the data model, the username policy, the error type,
//! and the store traits that the storage and API crates depend on.

pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;
pub mod username;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use username::{Username, UsernameError};
pub use uuid_utils::{new_note_id, new_v7};
