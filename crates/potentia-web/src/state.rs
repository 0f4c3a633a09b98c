//! Shared application state for the web server.

use std::sync::Arc;

use potentia_common::config::Config;
use potentia_common::error::Result;
use potentia_model::GradientBoostingModel;
use potentia_molecules::{DescriptorPipeline, NameResolver};

/// Shared state injected into every handler. The model is loaded once
/// here and read-only afterwards; everything else is stateless.
pub struct AppState {
    pub config: Config,
    pub model: GradientBoostingModel,
    pub pipeline: DescriptorPipeline,
    pub resolver: NameResolver,
}

impl AppState {
    /// Build the full state. A missing or malformed model artifact fails
    /// here, before the listener binds.
    pub fn new(config: Config) -> Result<Self> {
        let model = GradientBoostingModel::load(&config.model_path)?;
        let pipeline = DescriptorPipeline::new(&config.padel);
        let resolver = NameResolver::new(&config.pubchem)?;
        Ok(Self {
            config,
            model,
            pipeline,
            resolver,
        })
    }
}

pub type SharedState = Arc<AppState>;
