// src/processing/hrv.rs
//! Heart-rate-variability metrics over the accumulated peak-interval history.

use serde::{Deserialize, Serialize};

use crate::config::{HrvConfig, HF_BAND_HZ, LF_BAND_HZ, PNN50_THRESHOLD_MS};
use crate::processing::spectrum::{band_power, SpectrumBin};

/// Rhythm classification from the threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrhythmiaKind {
    /// Regular rhythm.
    None,
    /// Elevated beat-to-beat variability without gross irregularity.
    SinusIrregularity,
    /// High variability combined with interval irregularity beyond the
    /// configured coefficient of variation.
    SuspectedFibrillation,
}

/// Time- and frequency-domain HRV metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HrvMetrics {
    /// Standard deviation of intervals, ms.
    pub sdnn: f64,
    /// Root mean square of successive differences, ms.
    pub rmssd: f64,
    /// Fraction of successive differences exceeding 50 ms, in [0, 1].
    pub pnn50: f64,
    /// Low/high frequency band power ratio, when a spectrum was available.
    pub lf_hf_ratio: Option<f64>,
    /// Whether the threshold rule flagged the rhythm.
    pub has_arrhythmia: bool,
    /// Rhythm classification.
    pub kind: ArrhythmiaKind,
}

/// Compute HRV metrics from peak intervals in milliseconds.
///
/// Returns `None` when fewer than `config.min_intervals` intervals have
/// accumulated; no extrapolation from thin data. `cv_threshold` is the
/// already-sensitivity-scaled irregularity bound.
///
/// The LF/HF ratio takes its band powers from the supplied spectrum. When
/// that spectrum comes from the optical analysis window, 0.04 to 0.15 Hz
/// content is mostly baseline drift rather than interval variability, so the
/// ratio is a coarse indicator there; pass a spectrum of a resampled interval
/// series for a faithful one.
pub fn compute_hrv(
    intervals_ms: &[f64],
    spectrum: &[SpectrumBin],
    config: &HrvConfig,
    cv_threshold: f64,
) -> Option<HrvMetrics> {
    if intervals_ms.len() < config.min_intervals.max(2) {
        return None;
    }

    let mean = mean(intervals_ms);
    if mean <= 0.0 {
        return None;
    }

    let sdnn = std_dev(intervals_ms, mean);

    let diffs: Vec<f64> = intervals_ms.windows(2).map(|w| w[1] - w[0]).collect();
    let rmssd = (diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt();
    let pnn50 = diffs
        .iter()
        .filter(|d| d.abs() > PNN50_THRESHOLD_MS)
        .count() as f64
        / diffs.len() as f64;

    let lf_hf_ratio = if spectrum.is_empty() {
        None
    } else {
        let lf = band_power(spectrum, LF_BAND_HZ.0, LF_BAND_HZ.1);
        let hf = band_power(spectrum, HF_BAND_HZ.0, HF_BAND_HZ.1);
        (hf > 0.0).then(|| lf / hf)
    };

    let cv = sdnn / mean;
    let kind = if cv > cv_threshold && rmssd > config.rmssd_irregular_ms {
        ArrhythmiaKind::SuspectedFibrillation
    } else if sdnn > config.sdnn_irregular_ms {
        ArrhythmiaKind::SinusIrregularity
    } else {
        ArrhythmiaKind::None
    };

    Some(HrvMetrics {
        sdnn,
        rmssd,
        pnn50,
        lf_hf_ratio,
        has_arrhythmia: kind != ArrhythmiaKind::None,
        kind,
    })
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
