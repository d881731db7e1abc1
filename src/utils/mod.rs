// src/utils/mod.rs
//! Shared utilities.

pub mod time;

pub use time::{current_timestamp_micros, current_timestamp_millis};
