// src/processing/spectrum.rs
//! Frequency-domain analysis of the filtered PPG waveform.
//!
//! Used to cross-validate the peak-interval heart rate against the dominant
//! spectral component and to supply band powers for HRV frequency metrics.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// One bin of a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    /// Bin center frequency in Hz.
    pub frequency: f64,
    /// Spectral magnitude.
    pub magnitude: f64,
}

/// Real-input FFT analyzer with Hann windowing and power-of-two zero-padding.
pub struct FrequencyAnalyzer {
    planner: FftPlanner<f64>,
}

impl FrequencyAnalyzer {
    /// Create an analyzer. FFT plans are cached internally per length.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Transform a signal into its magnitude spectrum.
    ///
    /// The input is Hann-windowed, zero-padded to the next power of two `N`,
    /// and transformed; the result is the `N/2` non-redundant bins in
    /// ascending frequency, with `bin[k].frequency = k * fs / N`. Inputs of
    /// fewer than two samples yield an empty spectrum.
    pub fn transform(&mut self, signal: &[f64], sampling_rate_hz: f64) -> Vec<SpectrumBin> {
        if signal.len() < 2 || !(sampling_rate_hz > 0.0) {
            return Vec::new();
        }

        let n = signal.len().next_power_of_two();
        let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(n);

        let window_span = (signal.len() - 1) as f64;
        for (i, &x) in signal.iter().enumerate() {
            let hann = 0.5 * (1.0 - (2.0 * PI * i as f64 / window_span).cos());
            buffer.push(Complex::new(x * hann, 0.0));
        }
        buffer.resize(n, Complex::new(0.0, 0.0));

        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let bin_width = sampling_rate_hz / n as f64;
        buffer[..n / 2]
            .iter()
            .enumerate()
            .map(|(k, c)| SpectrumBin {
                frequency: k as f64 * bin_width,
                magnitude: c.norm(),
            })
            .collect()
    }
}

impl Default for FrequencyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// The strongest non-DC bin of a spectrum, if any.
pub fn dominant_bin(spectrum: &[SpectrumBin]) -> Option<SpectrumBin> {
    spectrum
        .iter()
        .skip(1)
        .copied()
        .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
}

/// Total squared magnitude within `[low_hz, high_hz)`.
pub fn band_power(spectrum: &[SpectrumBin], low_hz: f64, high_hz: f64) -> f64 {
    spectrum
        .iter()
        .filter(|bin| bin.frequency >= low_hz && bin.frequency < high_hz)
        .map(|bin| bin.magnitude * bin.magnitude)
        .sum()
}
