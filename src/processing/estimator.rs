// src/processing/estimator.rs
//! Fusion of peak intervals, channel amplitudes, transit times, morphology
//! and spectrum into one raw vitals estimate per frame.

use crate::config::{CalibrationConfig, HrvConfig, SPECTRAL_BPM_TOLERANCE};
use crate::processing::features::PulseFeatures;
use crate::processing::hrv::{compute_hrv, mean, HrvMetrics};
use crate::processing::scoring::range_score;
use crate::processing::spectrum::{dominant_bin, SpectrumBin};

/// Pulsatile (AC) and baseline (DC) amplitude of one color channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelAmplitude {
    /// Peak-to-trough amplitude of the pulsatile component.
    pub pulsatile: f64,
    /// Baseline intensity.
    pub dc: f64,
}

/// Inputs to one estimation pass. Every field degrades independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatorInput<'a> {
    /// Beat-to-beat intervals, ms, oldest first.
    pub peak_intervals_ms: &'a [f64],
    /// Red channel amplitude, if measurable this frame.
    pub red: Option<ChannelAmplitude>,
    /// Infrared channel amplitude, if the device supplies one.
    pub ir: Option<ChannelAmplitude>,
    /// Pulse-transit-time surrogates, ms.
    pub pulse_transit_times_ms: &'a [f64],
    /// Morphology of the most recent complete pulse cycle.
    pub features: Option<PulseFeatures>,
    /// Magnitude spectrum of the current analysis window.
    pub spectrum: &'a [SpectrumBin],
}

/// Raw (unvalidated) vitals estimate. `None` fields mean the corresponding
/// sub-estimate had insufficient data this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVitalsEstimate {
    /// Heart rate from mean peak interval.
    pub bpm: Option<f64>,
    /// Oxygen saturation, percent.
    pub spo2: Option<f64>,
    /// Systolic pressure, mmHg.
    pub systolic: Option<f64>,
    /// Diastolic pressure, mmHg.
    pub diastolic: Option<f64>,
    /// HRV metrics over the interval history.
    pub hrv: Option<HrvMetrics>,
    /// Overall confidence in [0, 1].
    pub confidence: f64,
}

/// Raw vitals estimator.
#[derive(Debug, Clone)]
pub struct VitalsEstimator {
    calibration: CalibrationConfig,
    hrv_config: HrvConfig,
    interval_cv_threshold: f64,
}

impl VitalsEstimator {
    /// Build an estimator from calibration and HRV tuning.
    pub fn new(
        calibration: CalibrationConfig,
        hrv_config: HrvConfig,
        interval_cv_threshold: f64,
    ) -> Self {
        Self {
            calibration,
            hrv_config,
            interval_cv_threshold,
        }
    }

    /// Produce a raw estimate. Sub-estimates with insufficient data come back
    /// `None` rather than extrapolated.
    pub fn estimate(&self, input: EstimatorInput<'_>) -> RawVitalsEstimate {
        let bpm = estimate_bpm(input.peak_intervals_ms);
        let spo2 = self.estimate_spo2(input.red, input.ir);
        let (systolic, diastolic) =
            self.estimate_pressure(input.pulse_transit_times_ms, input.features);
        let hrv = compute_hrv(
            input.peak_intervals_ms,
            input.spectrum,
            &self.hrv_config,
            self.interval_cv_threshold,
        );
        let confidence = self.confidence(bpm, input.features, input.spectrum);

        RawVitalsEstimate {
            bpm,
            spo2,
            systolic,
            diastolic,
            hrv,
            confidence,
        }
    }

    /// Ratio-of-ratios SpO2 through the configured linear curve. Needs both
    /// channels with non-zero DC.
    fn estimate_spo2(
        &self,
        red: Option<ChannelAmplitude>,
        ir: Option<ChannelAmplitude>,
    ) -> Option<f64> {
        let red = red?;
        let ir = ir?;
        if red.dc == 0.0 || ir.dc == 0.0 || ir.pulsatile == 0.0 {
            return None;
        }
        let ratio = (red.pulsatile / red.dc) / (ir.pulsatile / ir.dc);
        if !ratio.is_finite() {
            return None;
        }
        let curve = self.calibration.spo2;
        Some((curve.offset - curve.slope * ratio).clamp(0.0, 100.0))
    }

    /// PTT/morphology pressure regression. Needs at least one transit time.
    fn estimate_pressure(
        &self,
        transit_times_ms: &[f64],
        features: Option<PulseFeatures>,
    ) -> (Option<f64>, Option<f64>) {
        if transit_times_ms.is_empty() {
            return (None, None);
        }
        let ptt = mean(transit_times_ms);
        let stiffness = features.map(|f| f.stiffness_index).unwrap_or(0.0);
        let bp = self.calibration.blood_pressure;
        let systolic =
            bp.systolic_intercept + bp.systolic_ptt_slope * ptt + bp.systolic_stiffness_slope * stiffness;
        let diastolic = bp.diastolic_intercept
            + bp.diastolic_ptt_slope * ptt
            + bp.diastolic_stiffness_slope * stiffness;
        (Some(systolic), Some(diastolic))
    }

    /// Blend morphology confidence with spectral agreement: the dominant
    /// non-DC bin should sit near the interval-derived heart rate.
    fn confidence(
        &self,
        bpm: Option<f64>,
        features: Option<PulseFeatures>,
        spectrum: &[SpectrumBin],
    ) -> f64 {
        let morphology = features.map(|f| f.confidence).unwrap_or(0.0);
        let agreement = match (bpm, dominant_bin(spectrum)) {
            (Some(bpm), Some(dominant)) if bpm > 0.0 => {
                let spectral_bpm = dominant.frequency * 60.0;
                range_score(
                    spectral_bpm,
                    bpm * (1.0 - SPECTRAL_BPM_TOLERANCE),
                    bpm * (1.0 + SPECTRAL_BPM_TOLERANCE),
                )
            }
            _ => 0.5,
        };
        (0.6 * morphology + 0.4 * agreement).clamp(0.0, 1.0)
    }
}

/// `60000 / mean(intervals)`; undefined below two intervals.
fn estimate_bpm(intervals_ms: &[f64]) -> Option<f64> {
    if intervals_ms.len() < 2 {
        return None;
    }
    let mean_interval = mean(intervals_ms);
    (mean_interval > 0.0).then(|| 60_000.0 / mean_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BloodPressureCalibration, Spo2Calibration};

    fn estimator() -> VitalsEstimator {
        let mut calibration = CalibrationConfig::default();
        calibration.spo2 = Spo2Calibration {
            offset: 104.0,
            slope: 17.0,
        };
        calibration.blood_pressure = BloodPressureCalibration {
            systolic_intercept: 150.0,
            systolic_ptt_slope: -0.1,
            systolic_stiffness_slope: 1.0,
            diastolic_intercept: 95.0,
            diastolic_ptt_slope: -0.05,
            diastolic_stiffness_slope: 0.5,
        };
        VitalsEstimator::new(calibration, HrvConfig::default(), 0.2)
    }

    #[test]
    fn test_bpm_from_intervals() {
        let input = EstimatorInput {
            peak_intervals_ms: &[800.0, 800.0, 800.0],
            ..Default::default()
        };
        let estimate = estimator().estimate(input);
        assert!((estimate.bpm.unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_bpm_needs_two_intervals() {
        let input = EstimatorInput {
            peak_intervals_ms: &[800.0],
            ..Default::default()
        };
        assert!(estimator().estimate(input).bpm.is_none());
    }

    #[test]
    fn test_spo2_ratio_of_ratios() {
        let input = EstimatorInput {
            red: Some(ChannelAmplitude { pulsatile: 2.0, dc: 100.0 }),
            ir: Some(ChannelAmplitude { pulsatile: 2.5, dc: 125.0 }),
            ..Default::default()
        };
        // R = (2/100) / (2.5/125) = 1.0 -> 104 - 17 = 87
        let estimate = estimator().estimate(input);
        assert!((estimate.spo2.unwrap() - 87.0).abs() < 1e-9);
    }

    #[test]
    fn test_spo2_missing_ir_degrades() {
        let input = EstimatorInput {
            red: Some(ChannelAmplitude { pulsatile: 2.0, dc: 100.0 }),
            ..Default::default()
        };
        assert!(estimator().estimate(input).spo2.is_none());
    }

    #[test]
    fn test_spo2_clamped() {
        let mut calibration = CalibrationConfig::default();
        calibration.spo2 = Spo2Calibration { offset: 120.0, slope: 0.0 };
        let est = VitalsEstimator::new(calibration, HrvConfig::default(), 0.2);
        let estimate = est.estimate(EstimatorInput {
            red: Some(ChannelAmplitude { pulsatile: 1.0, dc: 10.0 }),
            ir: Some(ChannelAmplitude { pulsatile: 1.0, dc: 10.0 }),
            ..Default::default()
        });
        assert_eq!(estimate.spo2.unwrap(), 100.0);
    }

    #[test]
    fn test_pressure_regression() {
        let input = EstimatorInput {
            pulse_transit_times_ms: &[100.0, 100.0],
            ..Default::default()
        };
        let estimate = estimator().estimate(input);
        // 150 - 0.1*100 = 140; 95 - 0.05*100 = 90
        assert!((estimate.systolic.unwrap() - 140.0).abs() < 1e-9);
        assert!((estimate.diastolic.unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_needs_transit_times() {
        let estimate = estimator().estimate(EstimatorInput::default());
        assert!(estimate.systolic.is_none());
        assert!(estimate.diastolic.is_none());
    }

    #[test]
    fn test_confidence_bounds() {
        let estimate = estimator().estimate(EstimatorInput::default());
        assert!(estimate.confidence >= 0.0 && estimate.confidence <= 1.0);
    }
}
