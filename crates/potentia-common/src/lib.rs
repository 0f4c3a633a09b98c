//! potentia-common — Shared errors, configuration, and feature-vector types
//! used across all Potentia crates.

pub mod config;
pub mod error;
pub mod features;

pub use config::Config;
pub use error::{ApiError, PotencyError, Result};
pub use features::FeatureVector;
