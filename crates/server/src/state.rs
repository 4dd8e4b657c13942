use std::sync::Arc;
use hwpdf_core::{Config, ConversionService, LaneStatus};

/// Reports the backend lane's current status.
pub type LaneStatusFn = Arc<dyn Fn() -> LaneStatus + Send + Sync>;

/// Shared application state
pub struct AppState {
    config: Config,
    service: Arc<ConversionService>,
    lane_status: Option<LaneStatusFn>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<ConversionService>) -> Self {
        Self {
            config,
            service,
            lane_status: None,
        }
    }

    /// Exposes the backend lane on the health endpoint and metrics.
    pub fn with_lane_status(mut self, lane_status: LaneStatusFn) -> Self {
        self.lane_status = Some(lane_status);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &ConversionService {
        self.service.as_ref()
    }

    pub fn lane_status(&self) -> Option<LaneStatus> {
        self.lane_status.as_ref().map(|status| status())
    }
}
