// src/session/mod.rs
//! Measurement sessions.
//!
//! A [`Session`] exclusively owns every piece of cross-frame state: the
//! sample ring, the peak-interval history, and the validator's hysteresis
//! block. Sessions are created at measurement start and dropped at
//! measurement end, so no state can leak between measurements.

pub mod buffer;
#[cfg(feature = "runtime")]
pub mod runner;

pub use buffer::SampleRing;
#[cfg(feature = "runtime")]
pub use runner::SessionRunner;

use tracing::{debug, trace};

use crate::config::{EffectiveTuning, PipelineConfig, MIN_WINDOW_SAMPLES};
use crate::error::{PpgError, PpgResult};
use crate::export::MeasurementRecord;
use crate::processing::{
    ChannelAmplitude, EstimatorInput, FeatureExtractor, FrequencyAnalyzer, Peak, PeakDetector,
    SignalFilter, ValidatedVitals, VitalsEstimator, VitalsValidator,
};
use crate::utils::time::current_timestamp_millis;

/// Upper bound on retained beat history (~4 minutes at rest).
const HISTORY_CAP: usize = 240;

/// One timestamped multi-channel intensity reading from the capture side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Monotonic timestamp in microseconds. Strictly increasing per stream.
    pub timestamp_us: u64,
    /// Red channel intensity.
    pub red: f64,
    /// Infrared channel intensity, when the device provides one.
    pub ir: Option<f64>,
    /// Ambient light level, when available.
    pub ambient: Option<f64>,
}

/// How a frame was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Not enough buffered data; no estimate was attempted.
    Skipped,
    /// An estimate was produced and rejected by the validator.
    Rejected,
    /// An estimate was produced and accepted.
    Accepted,
}

/// Per-frame result handed to the consumer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Vitals to display; always satisfies `systolic > diastolic`.
    pub vitals: ValidatedVitals,
    /// Frame resolution.
    pub status: FrameStatus,
}

/// An active measurement session.
pub struct Session {
    tuning: EffectiveTuning,
    sample_rate_hz: f64,
    filter: SignalFilter,
    detector: PeakDetector,
    analyzer: FrequencyAnalyzer,
    extractor: FeatureExtractor,
    estimator: VitalsEstimator,
    validator: VitalsValidator,
    window: SampleRing,
    raw_trace: Vec<f64>,
    intervals_ms: Vec<f64>,
    transit_times_ms: Vec<f64>,
    last_beat_timestamp_us: Option<u64>,
    last_timestamp_us: Option<u64>,
    frames_processed: u64,
    frames_accepted: u64,
}

impl Session {
    /// Start a session from a validated configuration.
    pub fn new(config: &PipelineConfig) -> PpgResult<Self> {
        config.validate()?;
        let tuning = config.effective_tuning();
        debug!(
            window_samples = tuning.window_samples,
            peak_threshold = tuning.peak_threshold,
            "session started"
        );
        Ok(Self {
            tuning,
            sample_rate_hz: config.sample_rate_hz,
            filter: SignalFilter::from_tuning(tuning.filter_alpha, tuning.detrend),
            detector: PeakDetector::new(tuning.peak_window_radius, tuning.peak_threshold),
            analyzer: FrequencyAnalyzer::new(),
            extractor: FeatureExtractor::new(config.sample_rate_hz, config.feature_ranges),
            estimator: VitalsEstimator::new(
                config.calibration,
                config.hrv,
                tuning.interval_cv_threshold,
            ),
            validator: VitalsValidator::new(),
            window: SampleRing::new(tuning.window_samples),
            raw_trace: Vec::new(),
            intervals_ms: Vec::new(),
            transit_times_ms: Vec::new(),
            last_beat_timestamp_us: None,
            last_timestamp_us: None,
            frames_processed: 0,
            frames_accepted: 0,
        })
    }

    /// Ingest one frame's sample. Timestamps must be strictly increasing;
    /// violations are a caller error.
    pub fn push(&mut self, sample: RawSample) -> PpgResult<()> {
        if let Some(previous) = self.last_timestamp_us {
            if sample.timestamp_us <= previous {
                return Err(PpgError::NonMonotonicTimestamp {
                    previous_us: previous,
                    received_us: sample.timestamp_us,
                });
            }
        }
        self.last_timestamp_us = Some(sample.timestamp_us);

        let gained = RawSample {
            red: sample.red * self.tuning.channel_gain,
            ..sample
        };
        self.raw_trace.push(gained.red);
        self.window.push(gained);
        Ok(())
    }

    /// Run the full pipeline over the current analysis window.
    ///
    /// Every stage-local shortfall degrades to missing data for this frame;
    /// the method itself never fails.
    pub fn process_frame(&mut self) -> FrameOutcome {
        self.frames_processed += 1;

        let min_samples = MIN_WINDOW_SAMPLES.max(2 * self.tuning.peak_window_radius + 1);
        if self.window.len() < min_samples {
            trace!(
                available = self.window.len(),
                required = min_samples,
                "frame skipped: insufficient samples"
            );
            return FrameOutcome {
                vitals: self.validator.last_valid(),
                status: FrameStatus::Skipped,
            };
        }

        let red: Vec<f64> = self.window.iter().map(|s| s.red).collect();
        let filtered = self.filter.apply(&red);

        let beats = self.detect_beats(&filtered);
        self.record_beats(&beats);

        let features = self.extract_latest_cycle(&filtered, &beats);
        if let Some(features) = features {
            self.transit_times_ms.push(features.time_to_notch_ms);
            truncate_front(&mut self.transit_times_ms, HISTORY_CAP);
        }

        let spectrum = self.analyzer.transform(&filtered, self.sample_rate_hz);
        let (red_amplitude, ir_amplitude) = self.channel_amplitudes(&filtered);

        let estimate = self.estimator.estimate(EstimatorInput {
            peak_intervals_ms: &self.intervals_ms,
            red: red_amplitude,
            ir: ir_amplitude,
            pulse_transit_times_ms: &self.transit_times_ms,
            features,
            spectrum: &spectrum,
        });

        let outcome = self.validator.validate(&estimate);
        let status = if outcome.accepted {
            self.frames_accepted += 1;
            FrameStatus::Accepted
        } else {
            FrameStatus::Rejected
        };
        trace!(?status, bpm = outcome.vitals.bpm, "frame processed");

        FrameOutcome {
            vitals: outcome.vitals,
            status,
        }
    }

    /// Ingest a sample and immediately process the frame.
    pub fn push_and_process(&mut self, sample: RawSample) -> PpgResult<FrameOutcome> {
        self.push(sample)?;
        Ok(self.process_frame())
    }

    /// Latest validated vitals (pull accessor).
    pub fn latest_vitals(&self) -> ValidatedVitals {
        self.validator.last_valid()
    }

    /// Beat intervals accumulated so far, ms.
    pub fn peak_intervals_ms(&self) -> &[f64] {
        &self.intervals_ms
    }

    /// Finalize the session into an export record and drop all buffers.
    pub fn finish(mut self) -> MeasurementRecord {
        let filtered = self.filter.apply(&self.raw_trace);
        let peak_locations = self.detector.detect(&filtered);
        let spectrum = self.analyzer.transform(&filtered, self.sample_rate_hz);

        let mut metrics = std::collections::BTreeMap::new();
        let total_power: f64 = spectrum.iter().map(|b| b.magnitude * b.magnitude).sum();
        if total_power > 0.0 {
            let cardiac = crate::processing::spectrum::band_power(&spectrum, 0.7, 3.5);
            metrics.insert("inband_power_ratio".to_string(), cardiac / total_power);
        }
        if self.intervals_ms.len() >= 2 {
            let mean = crate::processing::hrv::mean(&self.intervals_ms);
            let sdnn = crate::processing::hrv::std_dev(&self.intervals_ms, mean);
            if mean > 0.0 {
                metrics.insert("peak_interval_cv".to_string(), sdnn / mean);
            }
        }
        if self.frames_processed > 0 {
            metrics.insert(
                "frame_accept_ratio".to_string(),
                self.frames_accepted as f64 / self.frames_processed as f64,
            );
        }

        debug!(
            samples = self.raw_trace.len(),
            peaks = peak_locations.len(),
            "session finished"
        );

        MeasurementRecord {
            raw_signal: self.raw_trace,
            filtered_signal: filtered,
            peak_locations,
            sampling_rate: self.sample_rate_hz,
            signal_quality_metrics: metrics,
            environmental_conditions: None,
            created_at_ms: current_timestamp_millis(),
        }
    }

    /// Detect peaks that qualify as heartbeats: above the amplitude floor,
    /// with window positions resolved to sample timestamps.
    fn detect_beats(&self, filtered: &[f64]) -> Vec<Peak> {
        self.detector
            .detect(filtered)
            .into_iter()
            .filter(|&i| filtered[i] >= self.tuning.beat_amplitude_floor)
            .filter_map(|index| {
                self.window.get(index).map(|sample| Peak {
                    index,
                    timestamp_us: sample.timestamp_us,
                    amplitude: filtered[index],
                })
            })
            .collect()
    }

    /// Fold newly detected beats into the interval history. A beat is new
    /// when its timestamp clears the previous beat by more than the detector
    /// half-window, which absorbs re-detections of the same beat at a
    /// slightly shifted index as the window slides.
    fn record_beats(&mut self, beats: &[Peak]) {
        let min_separation_us =
            (self.tuning.peak_window_radius as f64 * 1e6 / self.sample_rate_hz) as u64;
        for beat in beats {
            let ts = beat.timestamp_us;
            match self.last_beat_timestamp_us {
                None => self.last_beat_timestamp_us = Some(ts),
                Some(previous) if ts > previous + min_separation_us => {
                    self.intervals_ms.push((ts - previous) as f64 / 1000.0);
                    truncate_front(&mut self.intervals_ms, HISTORY_CAP);
                    self.last_beat_timestamp_us = Some(ts);
                }
                Some(_) => {}
            }
        }
    }

    /// The most recent complete pulse cycle: the filtered segment between
    /// the last two beats in the window.
    fn extract_latest_cycle(
        &self,
        filtered: &[f64],
        beats: &[Peak],
    ) -> Option<crate::processing::PulseFeatures> {
        if beats.len() < 2 {
            return None;
        }
        let start = beats[beats.len() - 2].index;
        let end = beats[beats.len() - 1].index;
        self.extractor.extract(&filtered[start..=end])
    }

    /// Pulsatile/DC amplitudes per channel over the current window. The IR
    /// amplitude is only produced when every sample in the window carried an
    /// IR reading.
    fn channel_amplitudes(
        &self,
        filtered: &[f64],
    ) -> (Option<ChannelAmplitude>, Option<ChannelAmplitude>) {
        let red_dc = crate::processing::hrv::mean(
            &self.window.iter().map(|s| s.red).collect::<Vec<f64>>(),
        );
        let red = peak_to_trough(filtered).map(|pulsatile| ChannelAmplitude {
            pulsatile,
            dc: red_dc,
        });

        let ir_values: Vec<f64> = self.window.iter().filter_map(|s| s.ir).collect();
        let ir = if ir_values.len() == self.window.len() {
            peak_to_trough(&ir_values).map(|pulsatile| ChannelAmplitude {
                pulsatile,
                dc: crate::processing::hrv::mean(&ir_values),
            })
        } else {
            None
        };

        (red, ir)
    }
}

fn peak_to_trough(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let max = values.iter().fold(f64::NEG_INFINITY, |m, &x| m.max(x));
    let min = values.iter().fold(f64::INFINITY, |m, &x| m.min(x));
    Some(max - min)
}

fn truncate_front(values: &mut Vec<f64>, cap: usize) {
    if values.len() > cap {
        let excess = values.len() - cap;
        values.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn session() -> Session {
        Session::new(&PipelineConfig::default()).unwrap()
    }

    fn sample(t: u64, red: f64) -> RawSample {
        RawSample {
            timestamp_us: t,
            red,
            ir: None,
            ambient: None,
        }
    }

    #[test]
    fn test_rejects_non_monotonic_timestamps() {
        let mut s = session();
        s.push(sample(1_000, 0.5)).unwrap();
        let err = s.push(sample(1_000, 0.6)).unwrap_err();
        assert!(matches!(err, PpgError::NonMonotonicTimestamp { .. }));
    }

    #[test]
    fn test_underfilled_window_skips() {
        let mut s = session();
        s.push(sample(1_000, 0.5)).unwrap();
        let outcome = s.process_frame();
        assert_eq!(outcome.status, FrameStatus::Skipped);
        assert_eq!(outcome.vitals, ValidatedVitals::fallback());
    }

    #[test]
    fn test_channel_gain_applied() {
        let mut config = PipelineConfig::default();
        config.sensitivity.signal_amplification = 2.0;
        let mut s = Session::new(&config).unwrap();
        s.push(sample(1_000, 0.5)).unwrap();
        assert_eq!(s.raw_trace, vec![1.0]);
    }

    #[test]
    fn test_fresh_session_has_no_carryover() {
        let mut s = session();
        for i in 0..100u64 {
            let t = i as f64 / 30.0;
            s.push(sample(1 + i * 33_333, (2.0 * std::f64::consts::PI * 1.2 * t).sin()))
                .unwrap();
            s.process_frame();
        }
        drop(s);

        let fresh = session();
        assert!(fresh.peak_intervals_ms().is_empty());
        assert_eq!(fresh.latest_vitals(), ValidatedVitals::fallback());
    }

    #[test]
    fn test_history_stays_bounded() {
        let mut values: Vec<f64> = (0..300).map(|i| i as f64).collect();
        truncate_front(&mut values, 240);
        assert_eq!(values.len(), 240);
        assert_eq!(values[0], 60.0);
    }
}
