pub mod artifacts;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod document;
pub mod lane;
pub mod metrics;
pub mod orchestrator;
pub mod service;
pub mod testing;

pub use artifacts::{cleanup, ArtifactStore, CleanupGuard, CleanupReport};
pub use backend::{
    BackendAdapter, BackendConfig, BackendError, CommandEngine, LaneBackend, OpenOptions,
    PdfBackend, RenderEngine,
};
pub use bridge::{create_bridge, BridgeConfig, BridgeError, DisabledBridge, FormatBridge, JavaBridge};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
    StorageConfig,
};
pub use document::{pdf_download_name, SourceFormat};
pub use lane::{ExecutionLane, LaneConfig, LaneError, LaneStatus};
pub use orchestrator::{
    ConversionOutcome, ConversionRequest, FailureCause, Orchestrator, Strategy,
};
pub use service::{ConversionService, ConvertError, ConvertedDocument};
