//! Wall clock helper. All timestamps are UTC epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time in milliseconds since the Unix epoch.
///
/// A clock set before 1970 reads as 0.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
