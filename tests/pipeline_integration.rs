//! End-to-end pipeline tests over synthetic signals.

use std::f64::consts::PI;

use ppg_core::config::{FilterProfile, PipelineConfig};
use ppg_core::processing::{PeakDetector, SignalFilter};
use ppg_core::session::{FrameStatus, Session};
use ppg_core::simulate::{SyntheticConfig, SyntheticPpg};

#[test]
fn known_signal_peaks() {
    let detector = PeakDetector::new(1, 0.0);
    let peaks = detector.detect(&[0.0, 1.0, 5.0, 3.0, 1.0, 4.0, 2.0]);
    assert_eq!(peaks, vec![2, 5]);
}

#[test]
fn sinusoid_five_cycles_yields_five_evenly_spaced_peaks() {
    // 1 Hz sinusoid sampled at 30 Hz for 5 seconds.
    let signal: Vec<f64> = (0..150).map(|i| (2.0 * PI * i as f64 / 30.0).sin()).collect();

    let filter = SignalFilter::new(FilterProfile::webcam());
    let filtered = filter.apply(&signal);

    let detector = PeakDetector::new(8, 0.1);
    let peaks = detector.detect(&filtered);

    assert_eq!(peaks.len(), 5, "expected one peak per cycle, got {peaks:?}");
    for pair in peaks.windows(2) {
        let spacing = (pair[1] - pair[0]) as i64;
        assert!(
            (spacing - 30).abs() <= 1,
            "peak spacing {spacing} not within one sample of the period"
        );
    }
}

#[test]
fn session_converges_on_synthetic_heart_rate() {
    let config = PipelineConfig::default();
    let mut session = Session::new(&config).unwrap();
    let mut source = SyntheticPpg::new(SyntheticConfig::default());

    let mut accepted = 0usize;
    for _ in 0..300 {
        let outcome = session.push_and_process(source.next_sample()).unwrap();
        if outcome.status == FrameStatus::Accepted {
            accepted += 1;
        }
    }

    assert!(accepted > 0, "no frame was ever accepted");
    let vitals = session.latest_vitals();
    assert!(
        (60.0..=85.0).contains(&vitals.bpm),
        "bpm {} far from the simulated 72",
        vitals.bpm
    );
    assert!(vitals.systolic > vitals.diastolic);
}

#[test]
fn session_with_ir_channel_still_converges() {
    let mut synth = SyntheticConfig::default();
    synth.with_ir = true;

    let mut session = Session::new(&PipelineConfig::default()).unwrap();
    let mut source = SyntheticPpg::new(synth);
    for _ in 0..300 {
        session.push_and_process(source.next_sample()).unwrap();
    }

    assert!(!session.peak_intervals_ms().is_empty());
    let mean_interval: f64 = session.peak_intervals_ms().iter().sum::<f64>()
        / session.peak_intervals_ms().len() as f64;
    // 72 bpm is an 833 ms beat; allow quantization to the 33 ms frame grid.
    assert!(
        (750.0..=920.0).contains(&mean_interval),
        "mean interval {mean_interval} ms"
    );
}

#[test]
fn export_record_covers_whole_session() {
    let mut session = Session::new(&PipelineConfig::default()).unwrap();
    let mut source = SyntheticPpg::new(SyntheticConfig::default());
    for _ in 0..240 {
        session.push_and_process(source.next_sample()).unwrap();
    }

    let record = session.finish();
    assert_eq!(record.raw_signal.len(), 240);
    assert_eq!(record.filtered_signal.len(), 240);
    assert!(!record.peak_locations.is_empty());
    assert_eq!(record.sampling_rate, 30.0);
    assert!(record.signal_quality_metrics.contains_key("inband_power_ratio"));
    assert!(record.signal_quality_metrics.contains_key("peak_interval_cv"));

    // Peaks index into the filtered trace.
    for &index in &record.peak_locations {
        assert!(index < record.filtered_signal.len());
    }

    let json = record.to_json().unwrap();
    assert!(json.contains("\"sampling_rate\""));
}

#[test]
fn noisy_garbage_never_produces_invalid_vitals() {
    let mut session = Session::new(&PipelineConfig::default()).unwrap();

    // White noise: no plausible cardiac structure.
    let mut state = 0x1234_5678u64;
    for i in 0..200u64 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let noise = (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5;
        let outcome = session
            .push_and_process(ppg_core::session::RawSample {
                timestamp_us: (i + 1) * 33_333,
                red: 128.0 + noise * 20.0,
                ir: None,
                ambient: None,
            })
            .unwrap();
        assert!(outcome.vitals.systolic > outcome.vitals.diastolic);
    }
}
