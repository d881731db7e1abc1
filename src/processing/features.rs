// src/processing/features.rs
//! Pulse-wave morphology feature extraction.
//!
//! Operates on one pulse cycle of the filtered waveform: locates the systolic
//! peak and the dicrotic notch, then derives the augmentation, reflection,
//! stiffness and elasticity indices together with a confidence score.

use crate::config::{
    FeatureRanges, CONFIDENCE_WEIGHT_AUGMENTATION, CONFIDENCE_WEIGHT_REFLECTION,
    CONFIDENCE_WEIGHT_STIFFNESS,
};
use crate::processing::scoring::range_score;

/// The dicrotic notch: first local minimum strictly after the systolic peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DicroticNotch {
    /// Index within the pulse cycle.
    pub index: usize,
    /// Amplitude at the notch.
    pub amplitude: f64,
}

/// Morphological indices for one pulse cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseFeatures {
    /// Wave-reflection amplitude ratio, `(peak - notch) / peak`.
    pub augmentation_index: f64,
    /// Timing-normalized reflection metric, `time_to_notch_ms / peak`.
    pub reflection_index: f64,
    /// Arterial stiffness proxy, `pulse_interval_ms / time_to_notch_ms`.
    pub stiffness_index: f64,
    /// Mean systole-to-notch area per millisecond.
    pub elasticity_coefficient: f64,
    /// Confidence in [0, 1] from range-scoring the indices above.
    pub confidence: f64,
    /// Peak-to-notch delay in milliseconds; doubles as the session's
    /// transit-time surrogate.
    pub time_to_notch_ms: f64,
}

/// Per-cycle morphology extractor.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    sampling_rate_hz: f64,
    ranges: FeatureRanges,
}

impl FeatureExtractor {
    /// Build an extractor for the given sampling rate and normal ranges.
    pub fn new(sampling_rate_hz: f64, ranges: FeatureRanges) -> Self {
        Self {
            sampling_rate_hz,
            ranges,
        }
    }

    /// Extract features from one pulse cycle of filtered samples.
    ///
    /// Returns `None` when the cycle is too short, no dicrotic notch exists
    /// before the cycle ends, or the math would degenerate (zero peak or
    /// zero notch delay). No partial feature sets are produced.
    pub fn extract(&self, cycle: &[f64]) -> Option<PulseFeatures> {
        if cycle.len() < 3 {
            return None;
        }

        let (peak_index, peak) = cycle
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        let notch = find_dicrotic_notch(cycle, peak_index)?;

        let time_to_notch_ms =
            (notch.index - peak_index) as f64 * 1000.0 / self.sampling_rate_hz;
        if time_to_notch_ms == 0.0 || peak == 0.0 {
            return None;
        }

        let augmentation_index = (peak - notch.amplitude) / peak;
        let reflection_index = time_to_notch_ms / peak;
        let pulse_interval_ms = cycle.len() as f64 * 1000.0 / self.sampling_rate_hz;
        let stiffness_index = pulse_interval_ms / time_to_notch_ms;
        let systole_area: f64 = cycle[peak_index..=notch.index].iter().sum();
        let elasticity_coefficient = systole_area / time_to_notch_ms;

        let values = [
            augmentation_index,
            reflection_index,
            stiffness_index,
            elasticity_coefficient,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        // Individual scores are clamped, but keep the sum guarded as well so
        // the published range survives any future weight change.
        let confidence = (CONFIDENCE_WEIGHT_AUGMENTATION
            * range_score(
                augmentation_index,
                self.ranges.augmentation.0,
                self.ranges.augmentation.1,
            )
            + CONFIDENCE_WEIGHT_REFLECTION
                * range_score(
                    reflection_index,
                    self.ranges.reflection.0,
                    self.ranges.reflection.1,
                )
            + CONFIDENCE_WEIGHT_STIFFNESS
                * range_score(
                    stiffness_index,
                    self.ranges.stiffness.0,
                    self.ranges.stiffness.1,
                ))
        .clamp(0.0, 1.0);

        Some(PulseFeatures {
            augmentation_index,
            reflection_index,
            stiffness_index,
            elasticity_coefficient,
            confidence,
            time_to_notch_ms,
        })
    }
}

/// First index strictly after `peak_index` that is lower than both
/// neighbors. Reaching the cycle end without one is a defined outcome, not a
/// fault.
fn find_dicrotic_notch(cycle: &[f64], peak_index: usize) -> Option<DicroticNotch> {
    for i in peak_index + 1..cycle.len().saturating_sub(1) {
        if cycle[i] < cycle[i - 1] && cycle[i] < cycle[i + 1] {
            return Some(DicroticNotch {
                index: i,
                amplitude: cycle[i],
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(30.0, FeatureRanges::default())
    }

    // Systolic peak at index 2, dicrotic notch at index 4.
    const CYCLE: [f64; 8] = [0.2, 0.6, 1.0, 0.7, 0.5, 0.65, 0.4, 0.25];

    #[test]
    fn test_extracts_expected_indices() {
        let features = extractor().extract(&CYCLE).unwrap();

        // notch amplitude 0.5, peak 1.0
        assert!((features.augmentation_index - 0.5).abs() < 1e-12);

        // 2 samples at 30 Hz = 66.67 ms
        let ttn = 2.0 * 1000.0 / 30.0;
        assert!((features.time_to_notch_ms - ttn).abs() < 1e-9);
        assert!((features.reflection_index - ttn / 1.0).abs() < 1e-9);

        let interval = 8.0 * 1000.0 / 30.0;
        assert!((features.stiffness_index - interval / ttn).abs() < 1e-9);

        // samples 1.0 + 0.7 + 0.5 over ttn
        assert!((features.elasticity_coefficient - 2.2 / ttn).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_in_unit_interval() {
        let features = extractor().extract(&CYCLE).unwrap();
        assert!(features.confidence >= 0.0 && features.confidence <= 1.0);
    }

    #[test]
    fn test_confidence_bounded_for_degenerate_ranges() {
        // Negative normal ranges (rejected by config validation, but this
        // constructor takes them unchecked) must not break the bound.
        let ranges = FeatureRanges {
            augmentation: (-2.0, -1.0),
            reflection: (-10.0, -5.0),
            stiffness: (-4.0, -2.0),
        };
        let features = FeatureExtractor::new(30.0, ranges).extract(&CYCLE).unwrap();
        assert!(
            (0.0..=1.0).contains(&features.confidence),
            "confidence {} escaped the unit interval",
            features.confidence
        );
    }

    #[test]
    fn test_idempotent() {
        let e = extractor();
        assert_eq!(e.extract(&CYCLE), e.extract(&CYCLE));
    }

    #[test]
    fn test_no_notch_is_absent() {
        // Monotone falloff after the peak: no local minimum before the end.
        let cycle = [0.1, 1.0, 0.8, 0.6, 0.4, 0.2];
        assert_eq!(extractor().extract(&cycle), None);
    }

    #[test]
    fn test_short_cycle_is_absent() {
        assert_eq!(extractor().extract(&[1.0, 0.5]), None);
    }

    #[test]
    fn test_zero_peak_is_absent() {
        // Peak amplitude exactly zero would divide by zero.
        let cycle = [-0.5, 0.0, -0.3, -0.1, -0.4, -0.2];
        assert_eq!(extractor().extract(&cycle), None);
    }

    #[test]
    fn test_notch_is_first_local_minimum() {
        // Two local minima after the peak; the earlier one wins.
        let cycle = [0.0, 1.0, 0.4, 0.6, 0.2, 0.5, 0.1, 0.3];
        let notch = find_dicrotic_notch(&cycle, 1).unwrap();
        assert_eq!(notch.index, 2);
        assert_eq!(notch.amplitude, 0.4);
    }
}
