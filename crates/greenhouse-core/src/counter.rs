//! Counter naming rules.
//!
//! A counter is a named, persisted, non-negative integer that only moves
//! forward, one step per successful increment. This module owns the name
//! type; the increment protocol lives with the storage backends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GreenhouseError, Result};

/// Sentinel counter used when the caller does not name one.
pub const DEFAULT_COUNTER: &str = "global";

/// Longest accepted counter name, in bytes.
pub const MAX_COUNTER_NAME_LEN: usize = 128;

/// Validated counter name.
///
/// Non-empty, at most [`MAX_COUNTER_NAME_LEN`] bytes, ASCII alphanumerics
/// plus `-`, `_`, `.` and `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CounterName(String);

impl CounterName {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(GreenhouseError::BadRequest("counter name must not be empty".into()));
        }
        if raw.len() > MAX_COUNTER_NAME_LEN {
            return Err(GreenhouseError::BadRequest(format!(
                "counter name exceeds {MAX_COUNTER_NAME_LEN} bytes"
            )));
        }
        if let Some(c) = raw.chars().find(|c| !is_name_char(*c)) {
            return Err(GreenhouseError::BadRequest(format!(
                "counter name contains invalid character {c:?}"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

impl Default for CounterName {
    fn default() -> Self {
        Self(DEFAULT_COUNTER.to_string())
    }
}

impl fmt::Display for CounterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CounterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CounterName {
    type Error = GreenhouseError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<CounterName> for String {
    fn from(name: CounterName) -> Self {
        name.0
    }
}
