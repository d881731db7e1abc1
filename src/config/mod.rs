// src/config/mod.rs
//! Runtime configuration for the PPG pipeline.
//!
//! Everything here is runtime-tunable: filter profiles, peak detection
//! tuning, sensitivity multipliers, and calibration coefficients. Nothing in
//! the processing algorithms is keyed to a device class; callers select or
//! load a profile instead.

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};

use crate::error::{PpgError, PpgResult};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sampling (camera frame) rate in Hz.
    #[serde(default = "defaults::sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Smoothing/detrending profile for the signal filter.
    #[serde(default)]
    pub filter_profile: FilterProfile,

    /// Peak detector half-window in samples.
    #[serde(default = "defaults::peak_window_radius")]
    pub peak_window_radius: usize,

    /// Peak detector amplitude threshold.
    #[serde(default = "defaults::peak_threshold")]
    pub peak_threshold: f64,

    /// Analysis window length in seconds.
    #[serde(default = "defaults::window_seconds")]
    pub window_seconds: f64,

    /// Per-stage sensitivity multipliers.
    #[serde(default)]
    pub sensitivity: SensitivityConfig,

    /// Device calibration coefficients.
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// HRV analysis tuning.
    #[serde(default)]
    pub hrv: HrvConfig,

    /// Physiologically-normal intervals for morphology confidence scoring.
    #[serde(default)]
    pub feature_ranges: FeatureRanges,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: defaults::sample_rate_hz(),
            filter_profile: FilterProfile::default(),
            peak_window_radius: defaults::peak_window_radius(),
            peak_threshold: defaults::peak_threshold(),
            window_seconds: defaults::window_seconds(),
            sensitivity: SensitivityConfig::default(),
            calibration: CalibrationConfig::default(),
            hrv: HrvConfig::default(),
            feature_ranges: FeatureRanges::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate field invariants. Called by the loader and by `Session::new`.
    pub fn validate(&self) -> PpgResult<()> {
        if !(self.sample_rate_hz > 0.0) {
            return Err(PpgError::config("sample_rate_hz", "must be positive"));
        }
        if !(self.filter_profile.alpha > 0.0 && self.filter_profile.alpha < 1.0) {
            return Err(PpgError::config("filter_profile.alpha", "must be in (0, 1)"));
        }
        if self.peak_window_radius == 0 {
            return Err(PpgError::config("peak_window_radius", "must be at least 1"));
        }
        if !(self.window_seconds > 0.0) {
            return Err(PpgError::config("window_seconds", "must be positive"));
        }
        self.sensitivity.validate()?;
        self.hrv.validate()?;
        self.feature_ranges.validate()?;
        Ok(())
    }

    /// Resolve tunables after applying the sensitivity multipliers.
    pub fn effective_tuning(&self) -> EffectiveTuning {
        let s = &self.sensitivity;
        EffectiveTuning {
            // Stronger noise reduction lowers alpha, smoothing harder.
            filter_alpha: (self.filter_profile.alpha / s.noise_reduction)
                .clamp(MIN_FILTER_ALPHA, MAX_FILTER_ALPHA),
            detrend: self.filter_profile.detrend,
            peak_window_radius: self.peak_window_radius,
            peak_threshold: self.peak_threshold * s.peak_detection,
            beat_amplitude_floor: DEFAULT_BEAT_AMPLITUDE_FLOOR * s.heartbeat_threshold,
            window_samples: ((self.window_seconds * s.response_time * self.sample_rate_hz)
                .ceil() as usize)
                .max(MIN_WINDOW_SAMPLES),
            channel_gain: s.brightness * s.red_intensity * s.signal_amplification,
            interval_cv_threshold: self.hrv.interval_cv_threshold * s.signal_stability,
        }
    }

    /// Serialize this configuration as a TOML document.
    pub fn to_toml(&self) -> PpgResult<String> {
        toml::to_string_pretty(self).map_err(|e| PpgError::Serialization {
            reason: e.to_string(),
        })
    }
}

/// Smoothing/detrending profile for [`crate::processing::SignalFilter`].
///
/// Profiles are plain data; new capture-device classes get new profile values
/// without touching the filtering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterProfile {
    /// EMA smoothing factor in (0, 1). Lower is smoother.
    pub alpha: f64,
    /// Remove the first-to-last linear trend after smoothing.
    pub detrend: bool,
}

impl FilterProfile {
    /// Profile tuned for rear phone cameras (strong smoothing, detrended to
    /// cancel exposure drift).
    pub fn mobile_camera() -> Self {
        Self {
            alpha: 0.3,
            detrend: true,
        }
    }

    /// Profile tuned for webcams (lighter smoothing, no detrend).
    pub fn webcam() -> Self {
        Self {
            alpha: 0.5,
            detrend: false,
        }
    }
}

impl Default for FilterProfile {
    fn default() -> Self {
        Self::mobile_camera()
    }
}

/// Per-stage sensitivity multipliers, all defaulting to 1.0.
///
/// Each field scales one tunable parameter of the corresponding stage:
/// `brightness`, `red_intensity` and `signal_amplification` multiply the raw
/// red-channel gain; `noise_reduction` divides the EMA alpha (more smoothing);
/// `peak_detection` scales the peak threshold; `heartbeat_threshold` scales
/// the minimum amplitude for a peak to count as a beat; `response_time`
/// scales the analysis window length; `signal_stability` scales the HRV
/// interval-irregularity threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Overall scene brightness compensation.
    #[serde(default = "defaults::unity")]
    pub brightness: f64,
    /// Red channel gain.
    #[serde(default = "defaults::unity")]
    pub red_intensity: f64,
    /// Post-capture amplification.
    #[serde(default = "defaults::unity")]
    pub signal_amplification: f64,
    /// Smoothing strength.
    #[serde(default = "defaults::unity")]
    pub noise_reduction: f64,
    /// Peak threshold scaling.
    #[serde(default = "defaults::unity")]
    pub peak_detection: f64,
    /// Beat amplitude floor scaling.
    #[serde(default = "defaults::unity")]
    pub heartbeat_threshold: f64,
    /// Analysis window scaling.
    #[serde(default = "defaults::unity")]
    pub response_time: f64,
    /// Irregularity tolerance scaling.
    #[serde(default = "defaults::unity")]
    pub signal_stability: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            red_intensity: 1.0,
            signal_amplification: 1.0,
            noise_reduction: 1.0,
            peak_detection: 1.0,
            heartbeat_threshold: 1.0,
            response_time: 1.0,
            signal_stability: 1.0,
        }
    }
}

impl SensitivityConfig {
    fn validate(&self) -> PpgResult<()> {
        let fields = [
            ("sensitivity.brightness", self.brightness),
            ("sensitivity.red_intensity", self.red_intensity),
            ("sensitivity.signal_amplification", self.signal_amplification),
            ("sensitivity.noise_reduction", self.noise_reduction),
            ("sensitivity.peak_detection", self.peak_detection),
            ("sensitivity.heartbeat_threshold", self.heartbeat_threshold),
            ("sensitivity.response_time", self.response_time),
            ("sensitivity.signal_stability", self.signal_stability),
        ];
        for (name, value) in fields {
            if !(value > 0.0) || !value.is_finite() {
                return Err(PpgError::config(name, "must be a positive finite multiplier"));
            }
        }
        Ok(())
    }
}

/// Device calibration coefficients.
///
/// The defaults are uncalibrated placeholders: SpO2 emits the curve offset
/// and blood pressure emits the nominal intercepts until a device-specific
/// calibration is supplied. These coefficients come from calibration data,
/// never from this crate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// SpO2 ratio-of-ratios curve.
    #[serde(default)]
    pub spo2: Spo2Calibration,
    /// PTT/morphology blood-pressure regression.
    #[serde(default)]
    pub blood_pressure: BloodPressureCalibration,
}

/// Linear SpO2 calibration curve: `spo2 = offset - slope * R`, where `R` is
/// the red/infrared ratio-of-ratios.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Spo2Calibration {
    /// Curve offset, percent.
    pub offset: f64,
    /// Curve slope, percent per unit ratio.
    pub slope: f64,
}

impl Default for Spo2Calibration {
    fn default() -> Self {
        // Placeholder: flat curve. Supply per-device coefficients.
        Self {
            offset: 100.0,
            slope: 0.0,
        }
    }
}

/// Linear regression from pulse transit time and stiffness morphology to
/// pressure: `p = intercept + ptt_slope * mean_ptt_ms + stiffness_slope * SI`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BloodPressureCalibration {
    /// Systolic intercept, mmHg.
    pub systolic_intercept: f64,
    /// Systolic PTT coefficient, mmHg/ms.
    pub systolic_ptt_slope: f64,
    /// Systolic stiffness coefficient.
    pub systolic_stiffness_slope: f64,
    /// Diastolic intercept, mmHg.
    pub diastolic_intercept: f64,
    /// Diastolic PTT coefficient, mmHg/ms.
    pub diastolic_ptt_slope: f64,
    /// Diastolic stiffness coefficient.
    pub diastolic_stiffness_slope: f64,
}

impl Default for BloodPressureCalibration {
    fn default() -> Self {
        // Placeholder: nominal 120/80 until calibrated.
        Self {
            systolic_intercept: 120.0,
            systolic_ptt_slope: 0.0,
            systolic_stiffness_slope: 0.0,
            diastolic_intercept: 80.0,
            diastolic_ptt_slope: 0.0,
            diastolic_stiffness_slope: 0.0,
        }
    }
}

/// HRV analysis tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HrvConfig {
    /// Minimum peak intervals before HRV metrics are produced.
    pub min_intervals: usize,
    /// RMSSD above which rhythm is considered irregular, ms.
    pub rmssd_irregular_ms: f64,
    /// SDNN above which rhythm is considered irregular, ms.
    pub sdnn_irregular_ms: f64,
    /// Interval coefficient-of-variation threshold for arrhythmia flagging.
    pub interval_cv_threshold: f64,
}

impl Default for HrvConfig {
    fn default() -> Self {
        Self {
            min_intervals: 5,
            rmssd_irregular_ms: 120.0,
            sdnn_irregular_ms: 150.0,
            interval_cv_threshold: 0.2,
        }
    }
}

impl HrvConfig {
    fn validate(&self) -> PpgResult<()> {
        if self.min_intervals < 2 {
            return Err(PpgError::config("hrv.min_intervals", "must be at least 2"));
        }
        let fields = [
            ("hrv.rmssd_irregular_ms", self.rmssd_irregular_ms),
            ("hrv.sdnn_irregular_ms", self.sdnn_irregular_ms),
            ("hrv.interval_cv_threshold", self.interval_cv_threshold),
        ];
        for (name, value) in fields {
            if !(value > 0.0) || !value.is_finite() {
                return Err(PpgError::config(name, "must be positive and finite"));
            }
        }
        Ok(())
    }
}

/// Physiologically-normal intervals used for morphology confidence scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureRanges {
    /// Normal augmentation index interval.
    pub augmentation: (f64, f64),
    /// Normal reflection index interval.
    pub reflection: (f64, f64),
    /// Normal stiffness index interval.
    pub stiffness: (f64, f64),
}

impl Default for FeatureRanges {
    fn default() -> Self {
        Self {
            augmentation: (0.05, 0.6),
            reflection: (30.0, 400.0),
            stiffness: (2.0, 12.0),
        }
    }
}

impl FeatureRanges {
    // Range scoring divides by the bounds, so both must be positive and
    // ordered.
    fn validate(&self) -> PpgResult<()> {
        let fields = [
            ("feature_ranges.augmentation", self.augmentation),
            ("feature_ranges.reflection", self.reflection),
            ("feature_ranges.stiffness", self.stiffness),
        ];
        for (name, (min, max)) in fields {
            if !min.is_finite() || !max.is_finite() || !(min > 0.0) || !(max > min) {
                return Err(PpgError::config(
                    name,
                    "bounds must be finite with 0 < min < max",
                ));
            }
        }
        Ok(())
    }
}

/// Stage tunables after sensitivity scaling. Produced by
/// [`PipelineConfig::effective_tuning`], consumed by the session.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveTuning {
    /// EMA alpha after noise-reduction scaling.
    pub filter_alpha: f64,
    /// Detrend flag from the active profile.
    pub detrend: bool,
    /// Peak detector half-window.
    pub peak_window_radius: usize,
    /// Peak threshold after scaling.
    pub peak_threshold: f64,
    /// Minimum peak amplitude counted as a heartbeat.
    pub beat_amplitude_floor: f64,
    /// Analysis window length in samples.
    pub window_samples: usize,
    /// Red-channel gain applied on ingestion.
    pub channel_gain: f64,
    /// HRV irregularity threshold after scaling.
    pub interval_cv_threshold: f64,
}

mod defaults {
    use super::constants::*;

    pub fn sample_rate_hz() -> f64 {
        DEFAULT_SAMPLE_RATE_HZ
    }
    pub fn peak_window_radius() -> usize {
        DEFAULT_PEAK_WINDOW_RADIUS
    }
    pub fn peak_threshold() -> f64 {
        DEFAULT_PEAK_THRESHOLD
    }
    pub fn window_seconds() -> f64 {
        DEFAULT_WINDOW_SECONDS
    }
    pub fn unity() -> f64 {
        1.0
    }
}
