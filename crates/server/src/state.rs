use std::sync::Arc;

use raas_core::{AddonService, Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    service: Arc<AddonService>,
}

impl AppState {
    pub fn new(service: Arc<AddonService>) -> Self {
        Self { service }
    }

    pub fn config(&self) -> &Config {
        self.service.config()
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(self.config())
    }

    pub fn service(&self) -> &AddonService {
        self.service.as_ref()
    }
}
