//! Format bridge adapter.
//!
//! When the rendering engine rejects an HWP document under both extensions,
//! the document is re-encoded to HWPX by an independent toolchain running
//! out-of-process, and the engine gets one more attempt on the result.
//!
//! The shipped bridge is [`JavaBridge`], which launches the `hwp2hwpx`
//! converter from its installation directory. [`DisabledBridge`] is used when
//! bridging is turned off in configuration.
//!
//! # Example
//!
//! ```ignore
//! use hwpdf_core::bridge::{BridgeConfig, FormatBridge, JavaBridge};
//!
//! let bridge = JavaBridge::new(BridgeConfig::default());
//! bridge.validate().await?;
//! bridge.bridge(Path::new("/tmp/in.hwp"), Path::new("/tmp/out.hwpx")).await?;
//! ```

mod config;
mod disabled;
mod error;
mod java;
mod traits;

pub use config::BridgeConfig;
pub use disabled::DisabledBridge;
pub use error::BridgeError;
pub use java::JavaBridge;
pub use traits::FormatBridge;

use std::sync::Arc;

/// Builds the bridge selected by configuration.
pub fn create_bridge(config: &BridgeConfig) -> Arc<dyn FormatBridge> {
    if config.enabled {
        Arc::new(JavaBridge::new(config.clone()))
    } else {
        Arc::new(DisabledBridge)
    }
}
