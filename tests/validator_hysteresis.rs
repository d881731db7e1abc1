//! Hysteresis validation behavior across frame sequences.

use ppg_core::processing::{RawVitalsEstimate, ValidatedVitals, VitalsValidator};
use ppg_core::PpgError;

fn estimate(bpm: f64, systolic: f64, diastolic: f64) -> RawVitalsEstimate {
    RawVitalsEstimate {
        bpm: Some(bpm),
        spo2: None,
        systolic: Some(systolic),
        diastolic: Some(diastolic),
        hrv: None,
        confidence: 1.0,
    }
}

#[test]
fn plausible_estimate_accepted_from_empty() {
    // bpm 75, 150/95 against bounds [40,200] / [80,200] / [40,130]
    let mut validator = VitalsValidator::new();
    let outcome = validator.validate(&estimate(75.0, 150.0, 95.0));

    assert!(outcome.accepted);
    assert_eq!(outcome.vitals.bpm, 75.0);
    assert_eq!(outcome.vitals.systolic, 150.0);
    assert_eq!(outcome.vitals.diastolic, 95.0);
    assert_eq!(validator.last_valid(), outcome.vitals);
}

#[test]
fn out_of_range_bpm_reuses_previous_vitals() {
    let mut validator = VitalsValidator::new();
    validator.validate(&estimate(75.0, 150.0, 95.0));

    let outcome = validator.validate(&estimate(210.0, 150.0, 95.0));
    assert!(!outcome.accepted);
    assert_eq!(outcome.vitals.bpm, 75.0);
    assert!(matches!(
        outcome.rejection,
        Some(PpgError::OutOfRangeEstimate { field: "bpm", .. })
    ));

    // State must be unchanged: a later good estimate still gets accepted.
    let next = validator.validate(&estimate(80.0, 140.0, 90.0));
    assert!(next.accepted);
    assert_eq!(next.vitals.bpm, 80.0);
}

#[test]
fn inverted_pressure_rejected_despite_individual_bounds() {
    // systolic 100 and diastolic 110 are each in range, but inverted.
    let mut validator = VitalsValidator::new();
    let outcome = validator.validate(&estimate(75.0, 100.0, 110.0));
    assert!(!outcome.accepted);
}

#[test]
fn empty_state_falls_back_to_documented_defaults() {
    let mut validator = VitalsValidator::new();
    let outcome = validator.validate(&estimate(300.0, 150.0, 95.0));

    assert!(!outcome.accepted);
    assert_eq!(outcome.vitals.bpm, 0.0);
    assert_eq!(outcome.vitals.systolic, 120.0);
    assert_eq!(outcome.vitals.diastolic, 80.0);
}

#[test]
fn every_emitted_value_keeps_pressure_ordering() {
    let mut validator = VitalsValidator::new();
    let sequence = [
        estimate(75.0, 150.0, 95.0),
        estimate(39.0, 150.0, 95.0),
        estimate(75.0, 210.0, 95.0),
        estimate(75.0, 150.0, 135.0),
        estimate(75.0, 90.0, 95.0),
        estimate(62.0, 118.0, 76.0),
    ];
    for raw in &sequence {
        let outcome = validator.validate(raw);
        assert!(outcome.vitals.systolic > outcome.vitals.diastolic);
        let bpm = outcome.vitals.bpm;
        assert!((40.0..=200.0).contains(&bpm) || bpm == ValidatedVitals::fallback().bpm);
    }
}

#[test]
fn fresh_validator_has_no_state_from_other_sessions() {
    let mut first = VitalsValidator::new();
    first.validate(&estimate(75.0, 150.0, 95.0));

    let second = VitalsValidator::new();
    assert_eq!(second.last_valid(), ValidatedVitals::fallback());
}
