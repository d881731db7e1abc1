// src/utils/time.rs
//! Wall-clock timestamp helpers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds since the Unix epoch.
pub fn current_timestamp_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

/// Milliseconds since the Unix epoch.
pub fn current_timestamp_millis() -> u64 {
    current_timestamp_micros() / 1000
}
