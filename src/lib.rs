//! PPG-Core: real-time photoplethysmography processing for camera-based
//! vitals estimation.
//!
//! The crate turns a stream of per-frame color-intensity samples into
//! validated cardiovascular vitals (heart rate, SpO2, blood pressure, HRV
//! classification). It features:
//!
//! - Exponential smoothing and detrending tuned per capture-device profile
//! - Windowed heartbeat detection and pulse-wave morphology extraction
//! - FFT cross-validation of the interval-derived heart rate
//! - Hysteresis validation so noisy frames never produce impossible readings
//! - A frame-cadence session runner that sheds overrunning frames
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ppg_core::config::PipelineConfig;
//! use ppg_core::session::Session;
//! use ppg_core::simulate::{SyntheticConfig, SyntheticPpg};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let mut session = Session::new(&config)?;
//!     let mut source = SyntheticPpg::new(SyntheticConfig::default());
//!
//!     for _ in 0..300 {
//!         let outcome = session.push_and_process(source.next_sample())?;
//!         println!("{:?} {:?}", outcome.status, outcome.vitals);
//!     }
//!
//!     let record = session.finish();
//!     println!("{}", record.to_json()?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod export;
pub mod processing;
pub mod session;
pub mod simulate;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{FilterProfile, PipelineConfig, SensitivityConfig};
pub use error::{PpgError, PpgResult};
pub use export::MeasurementRecord;
pub use processing::{
    PulseFeatures, RawVitalsEstimate, SignalFilter, SpectrumBin, ValidatedVitals,
    VitalsValidator,
};
pub use session::{FrameOutcome, FrameStatus, RawSample, Session};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "ppg-core");
    }
}
