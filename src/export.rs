// src/export.rs
//! Export record handed to the persistence collaborator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PpgError, PpgResult};

/// One record per completed measurement session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Full gained red-channel trace.
    pub raw_signal: Vec<f64>,
    /// The same trace after filtering.
    pub filtered_signal: Vec<f64>,
    /// Peak indices into `filtered_signal`.
    pub peak_locations: Vec<usize>,
    /// Sampling rate the session ran at, Hz.
    pub sampling_rate: f64,
    /// Session-level signal quality metrics.
    pub signal_quality_metrics: BTreeMap<String, f64>,
    /// Free-form capture environment description, if the caller supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environmental_conditions: Option<BTreeMap<String, serde_json::Value>>,
    /// Record creation time, milliseconds since the Unix epoch.
    pub created_at_ms: u64,
}

impl MeasurementRecord {
    /// Attach environment metadata.
    pub fn with_environment(mut self, env: BTreeMap<String, serde_json::Value>) -> Self {
        self.environmental_conditions = Some(env);
        self
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> PpgResult<String> {
        serde_json::to_string(self).map_err(|e| PpgError::Serialization {
            reason: e.to_string(),
        })
    }
}
