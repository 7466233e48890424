//! Username format policy.
//!
//! Usernames double as directory names under the data directory, so every
//! `Username` value in the system has passed [`Username::parse`]. The rules:
//!
//! 1. starts with an ASCII letter, then only letters, digits, or `_`
//! 2. between [`USERNAME_MIN_LEN`] and [`USERNAME_MAX_LEN`] characters
//! 3. no consecutive underscores
//! 4. not one of [`RESERVED_USERNAMES`] (case-insensitive)

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{RESERVED_USERNAMES, USERNAME_MAX_LEN, USERNAME_MIN_LEN};

static USERNAME_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("username pattern is valid"));

/// Reasons a username is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username must start with a letter and contain only letters, digits, or underscores")]
    Charset,

    #[error("username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters")]
    Length,

    #[error("username cannot contain consecutive underscores")]
    ConsecutiveUnderscores,

    #[error("this username is reserved")]
    Reserved,
}

/// A username that satisfies the format policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate `raw` against the policy. Checks run in policy order so the
    /// operator sees the first rule that failed.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        if !USERNAME_CHARSET.is_match(raw) {
            return Err(UsernameError::Charset);
        }
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&raw.len()) {
            return Err(UsernameError::Length);
        }
        if raw.contains("__") {
            return Err(UsernameError::ConsecutiveUnderscores);
        }
        let lowered = raw.to_ascii_lowercase();
        if RESERVED_USERNAMES.contains(&lowered.as_str()) {
            return Err(UsernameError::Reserved);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl Deref for Username {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
