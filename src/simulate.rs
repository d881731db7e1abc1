// src/simulate.rs
//! Synthetic PPG waveform generation for demos and tests.
//!
//! Produces a deterministic pulse waveform at the configured heart rate,
//! with a dicrotic lobe, slow baseline drift, and seeded noise.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::session::RawSample;

/// Synthetic waveform parameters.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    /// Sampling rate, Hz.
    pub sample_rate_hz: f64,
    /// Simulated heart rate, bpm.
    pub heart_rate_bpm: f64,
    /// Pulse amplitude.
    pub amplitude: f64,
    /// Baseline intensity level.
    pub baseline: f64,
    /// Noise amplitude relative to the pulse amplitude.
    pub noise_level: f64,
    /// Baseline drift amplitude.
    pub drift_amplitude: f64,
    /// Emit an infrared channel alongside red.
    pub with_ir: bool,
    /// RNG seed for reproducible streams.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 30.0,
            heart_rate_bpm: 72.0,
            amplitude: 1.0,
            baseline: 128.0,
            noise_level: 0.02,
            drift_amplitude: 0.5,
            with_ir: false,
            seed: 0x5eed,
        }
    }
}

/// Deterministic PPG sample generator.
pub struct SyntheticPpg {
    config: SyntheticConfig,
    rng: StdRng,
    sample_index: u64,
}

impl SyntheticPpg {
    /// Build a generator; identical configs yield identical streams.
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            sample_index: 0,
        }
    }

    /// Produce the next sample. Timestamps advance by one sample period.
    pub fn next_sample(&mut self) -> RawSample {
        let c = &self.config;
        let t = self.sample_index as f64 / c.sample_rate_hz;
        let beat_hz = c.heart_rate_bpm / 60.0;

        let drift = c.drift_amplitude * (2.0 * PI * 0.05 * t).sin();
        let noise = c.noise_level * c.amplitude * (self.rng.gen::<f64>() * 2.0 - 1.0);

        let pulse = c.amplitude * pulse_shape((beat_hz * t).fract());
        let red = c.baseline + pulse + drift + noise;
        let ir = c.with_ir.then(|| {
            let ir_noise = c.noise_level * c.amplitude * (self.rng.gen::<f64>() * 2.0 - 1.0);
            c.baseline * 1.2 + 0.8 * pulse + drift + ir_noise
        });

        self.sample_index += 1;
        RawSample {
            timestamp_us: (self.sample_index * 1_000_000) / c.sample_rate_hz as u64,
            red,
            ir,
            ambient: None,
        }
    }

    /// Generate `count` consecutive samples.
    pub fn take_samples(&mut self, count: usize) -> Vec<RawSample> {
        (0..count).map(|_| self.next_sample()).collect()
    }
}

/// One cardiac cycle over phase `u` in [0, 1): a systolic lobe followed by a
/// smaller dicrotic lobe, leaving a notch between them.
fn pulse_shape(u: f64) -> f64 {
    let systolic = (-((u - 0.25) / 0.09).powi(2)).exp();
    let dicrotic = 0.45 * (-((u - 0.47) / 0.08).powi(2)).exp();
    systolic + dicrotic
}
