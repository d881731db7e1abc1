// src/config/constants.rs
//! Tuning constants and physiological bounds.

/// Default camera frame / sampling rate in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 30.0;

/// Default analysis window length in seconds.
pub const DEFAULT_WINDOW_SECONDS: f64 = 8.0;

/// Minimum samples a frame needs before the pipeline runs at all.
pub const MIN_WINDOW_SAMPLES: usize = 32;

/// EMA alpha clamp after sensitivity scaling.
pub const MIN_FILTER_ALPHA: f64 = 0.01;
/// EMA alpha clamp after sensitivity scaling.
pub const MAX_FILTER_ALPHA: f64 = 0.99;

/// Default peak detector half-window in samples (~0.43s at 30 Hz, below the
/// shortest physiological beat-to-beat interval at 200 bpm).
pub const DEFAULT_PEAK_WINDOW_RADIUS: usize = 6;

/// Default peak amplitude threshold on the filtered signal.
pub const DEFAULT_PEAK_THRESHOLD: f64 = 0.0;

/// Default minimum peak amplitude for a peak to count as a heartbeat.
pub const DEFAULT_BEAT_AMPLITUDE_FLOOR: f64 = 0.01;

// Validator acceptance bounds.
/// Accepted heart-rate range, bpm.
pub const BPM_RANGE: (f64, f64) = (40.0, 200.0);
/// Accepted systolic range, mmHg.
pub const SYSTOLIC_RANGE: (f64, f64) = (80.0, 200.0);
/// Accepted diastolic range, mmHg.
pub const DIASTOLIC_RANGE: (f64, f64) = (40.0, 130.0);

/// Fallback vitals emitted while the validator has never accepted: bpm.
pub const FALLBACK_BPM: f64 = 0.0;
/// Fallback systolic, mmHg.
pub const FALLBACK_SYSTOLIC: f64 = 120.0;
/// Fallback diastolic, mmHg.
pub const FALLBACK_DIASTOLIC: f64 = 80.0;

/// HRV low-frequency band, Hz.
pub const LF_BAND_HZ: (f64, f64) = (0.04, 0.15);
/// HRV high-frequency band, Hz.
pub const HF_BAND_HZ: (f64, f64) = (0.15, 0.4);

/// pNN50 successive-difference threshold, milliseconds.
pub const PNN50_THRESHOLD_MS: f64 = 50.0;

// Confidence weights for the morphological feature scores. Must sum to 1.
/// Weight of the augmentation-index range score.
pub const CONFIDENCE_WEIGHT_AUGMENTATION: f64 = 0.4;
/// Weight of the reflection-index range score.
pub const CONFIDENCE_WEIGHT_REFLECTION: f64 = 0.3;
/// Weight of the stiffness-index range score.
pub const CONFIDENCE_WEIGHT_STIFFNESS: f64 = 0.3;

/// Relative tolerance when cross-checking interval-derived bpm against the
/// dominant spectral bin.
pub const SPECTRAL_BPM_TOLERANCE: f64 = 0.15;
