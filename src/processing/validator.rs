// src/processing/validator.rs
//! Hysteresis validation of raw vitals estimates.
//!
//! A stateful gate with states `Empty` (nothing accepted yet) and `Valid`.
//! Accepted estimates become the new last-valid vitals; rejected ones re-emit
//! the stored values so a single noisy frame can never produce an impossible
//! or discontinuous reading. The state block is owned by one session and
//! never shared across sessions.

use tracing::debug;

use crate::config::{
    BPM_RANGE, DIASTOLIC_RANGE, FALLBACK_BPM, FALLBACK_DIASTOLIC, FALLBACK_SYSTOLIC,
    SYSTOLIC_RANGE,
};
use crate::error::PpgError;
use crate::processing::estimator::RawVitalsEstimate;

/// Vitals that passed validation. Invariant: `systolic > diastolic` in every
/// emitted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedVitals {
    /// Heart rate, bpm.
    pub bpm: f64,
    /// Systolic pressure, mmHg.
    pub systolic: f64,
    /// Diastolic pressure, mmHg.
    pub diastolic: f64,
}

impl ValidatedVitals {
    /// Documented defaults emitted while nothing has been accepted.
    pub fn fallback() -> Self {
        Self {
            bpm: FALLBACK_BPM,
            systolic: FALLBACK_SYSTOLIC,
            diastolic: FALLBACK_DIASTOLIC,
        }
    }
}

/// Outcome of validating one frame's estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// The vitals to display: the candidate if accepted, otherwise the
    /// stored last-valid values (or the fallback while `Empty`).
    pub vitals: ValidatedVitals,
    /// Whether the candidate was accepted.
    pub accepted: bool,
    /// Why the candidate was rejected, when it was.
    pub rejection: Option<PpgError>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Empty,
    Valid(ValidatedVitals),
}

/// Hysteresis gate owning the last-known-good vitals.
#[derive(Debug, Clone)]
pub struct VitalsValidator {
    state: State,
}

impl VitalsValidator {
    /// New validator in the `Empty` state.
    pub fn new() -> Self {
        Self { state: State::Empty }
    }

    /// Validate one raw estimate.
    ///
    /// Acceptance requires bpm in [40, 200], systolic in [80, 200],
    /// diastolic in [40, 130], and systolic strictly above diastolic. Any
    /// missing sub-estimate fails the candidate. State mutates only on
    /// acceptance.
    pub fn validate(&mut self, estimate: &RawVitalsEstimate) -> ValidationOutcome {
        match self.candidate(estimate) {
            Ok(vitals) => {
                self.state = State::Valid(vitals);
                ValidationOutcome {
                    vitals,
                    accepted: true,
                    rejection: None,
                }
            }
            Err(error) => {
                debug!(%error, "vitals estimate rejected, keeping last valid");
                ValidationOutcome {
                    vitals: self.last_valid(),
                    accepted: false,
                    rejection: Some(error),
                }
            }
        }
    }

    /// The vitals currently on display: last accepted, or the fallback.
    pub fn last_valid(&self) -> ValidatedVitals {
        match self.state {
            State::Empty => ValidatedVitals::fallback(),
            State::Valid(vitals) => vitals,
        }
    }

    fn candidate(&self, estimate: &RawVitalsEstimate) -> Result<ValidatedVitals, PpgError> {
        let fields = [estimate.bpm, estimate.systolic, estimate.diastolic];
        let (Some(bpm), Some(systolic), Some(diastolic)) =
            (estimate.bpm, estimate.systolic, estimate.diastolic)
        else {
            return Err(PpgError::InsufficientSamples {
                stage: "validator",
                required: 3,
                available: fields.iter().flatten().count(),
            });
        };

        if !(BPM_RANGE.0..=BPM_RANGE.1).contains(&bpm) {
            return Err(PpgError::OutOfRangeEstimate {
                field: "bpm",
                value: bpm,
            });
        }
        if !(SYSTOLIC_RANGE.0..=SYSTOLIC_RANGE.1).contains(&systolic) {
            return Err(PpgError::OutOfRangeEstimate {
                field: "systolic",
                value: systolic,
            });
        }
        if !(DIASTOLIC_RANGE.0..=DIASTOLIC_RANGE.1).contains(&diastolic) {
            return Err(PpgError::OutOfRangeEstimate {
                field: "diastolic",
                value: diastolic,
            });
        }
        if systolic <= diastolic {
            return Err(PpgError::OutOfRangeEstimate {
                field: "pulse_pressure",
                value: systolic - diastolic,
            });
        }

        Ok(ValidatedVitals {
            bpm,
            systolic,
            diastolic,
        })
    }
}

impl Default for VitalsValidator {
    fn default() -> Self {
        Self::new()
    }
}
