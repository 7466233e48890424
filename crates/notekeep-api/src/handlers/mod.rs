//! HTTP handlers for notekeep-api.

pub mod notes;
pub mod status;
