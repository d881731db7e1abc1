// src/processing/filter.rs
//! Exponential moving-average smoothing with optional linear detrending.

use crate::config::FilterProfile;

/// Low-pass smoothing and detrending stage.
///
/// The algorithm is profile-agnostic: capture-device classes differ only in
/// the [`FilterProfile`] they supply.
#[derive(Debug, Clone)]
pub struct SignalFilter {
    alpha: f64,
    detrend: bool,
}

impl SignalFilter {
    /// Build a filter from a profile.
    pub fn new(profile: FilterProfile) -> Self {
        Self {
            alpha: profile.alpha,
            detrend: profile.detrend,
        }
    }

    /// Build a filter from already-resolved tunables.
    pub fn from_tuning(alpha: f64, detrend: bool) -> Self {
        Self { alpha, detrend }
    }

    /// Smooth the signal. Output length always equals input length, and the
    /// first output sample equals the first input sample.
    ///
    /// `out[i] = alpha * in[i] + (1 - alpha) * out[i-1]`. When detrending is
    /// enabled, the line through the first and last smoothed values is
    /// subtracted afterwards.
    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        if samples.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(samples.len());
        out.push(samples[0]);
        for &x in &samples[1..] {
            let prev = *out.last().unwrap_or(&x);
            out.push(self.alpha * x + (1.0 - self.alpha) * prev);
        }

        if self.detrend && out.len() > 1 {
            let first = out[0];
            let last = out[out.len() - 1];
            let span = (out.len() - 1) as f64;
            for (i, value) in out.iter_mut().enumerate() {
                let trend = first + (i as f64 / span) * (last - first);
                *value -= trend;
            }
        }

        out
    }
}
