//! Shared application state.

use docforge_core::{DocForgeConfig, Result};
use docforge_runtime::Processor;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: DocForgeConfig,
    pub processor: Processor,
}

impl AppState {
    pub fn new(config: DocForgeConfig) -> Result<Self> {
        let processor = Processor::new(&config)?;
        Ok(Self { config, processor })
    }
}
