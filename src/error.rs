// src/error.rs
//! Unified error handling for ppg-core.
//!
//! None of these errors are process-fatal. Stage-local degradations (missing
//! dicrotic notch, degenerate intervals) are absorbed at the stage boundary
//! and surface as absent outputs for the frame; `PpgError` carries caller
//! errors and the validator's rejection diagnostics.

use thiserror::Error;

/// Error taxonomy for the PPG processing pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PpgError {
    /// A stage received fewer inputs than its minimum.
    #[error("{stage}: insufficient samples (required {required}, available {available})")]
    InsufficientSamples {
        /// Stage that reported the shortfall.
        stage: &'static str,
        /// Minimum input count the stage needs.
        required: usize,
        /// Inputs actually available this frame.
        available: usize,
    },

    /// The validator rejected a raw estimate; last-valid vitals were reused.
    #[error("out-of-range estimate rejected: {field} = {value}")]
    OutOfRangeEstimate {
        /// Name of the offending vital.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Ingested sample violated the monotonic-timestamp contract.
    #[error("non-monotonic timestamp: received {received_us}us after {previous_us}us")]
    NonMonotonicTimestamp {
        /// Timestamp of the previously accepted sample.
        previous_us: u64,
        /// Timestamp of the offending sample.
        received_us: u64,
    },

    /// Invalid or unloadable configuration.
    #[error("configuration error in `{field}`: {reason}")]
    Configuration {
        /// Configuration field or source at fault.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Export record serialization failed.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Underlying serializer message.
        reason: String,
    },
}

impl PpgError {
    /// Shorthand for a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for PPG operations.
pub type PpgResult<T> = Result<T, PpgError>;
