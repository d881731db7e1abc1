// src/processing/mod.rs
//! Signal processing pipeline for PPG data.

pub mod estimator;
pub mod features;
pub mod filter;
pub mod hrv;
pub mod peaks;
pub mod scoring;
pub mod spectrum;
pub mod validator;

pub use estimator::*;
pub use features::*;
pub use filter::*;
pub use hrv::*;
pub use peaks::*;
pub use scoring::range_score;
pub use spectrum::*;
pub use validator::*;
