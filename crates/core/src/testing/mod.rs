//! Testing utilities and test doubles.
//!
//! Nothing here touches a real office suite or JVM, so orchestration, lane
//! and HTTP tests run anywhere.
//!
//! # Example
//!
//! ```rust,ignore
//! use hwpdf_core::testing::{BackendOutcome, MockBridge, ScriptedBackend};
//!
//! let backend = ScriptedBackend::new();
//! let bridge = MockBridge::new();
//! backend.set_format_outcome(SourceFormat::Hwp, BackendOutcome::Fail).await;
//!
//! let orchestrator = Orchestrator::new(Arc::new(backend.clone()), Arc::new(bridge.clone()), store);
//! ```

mod mock_backend;
mod mock_bridge;
mod scripted_engine;

pub use mock_backend::{BackendOutcome, RecordedConversion, ScriptedBackend};
pub use mock_bridge::{BridgeOutcome, MockBridge, RecordedBridge};
pub use scripted_engine::{EngineCall, EngineScript, ScriptedEngine};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Minimal bytes recognised as a PDF.
    pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

    /// Leading bytes of an HWP 5.x compound file.
    pub const HWP_BYTES: &[u8] = b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1HWP Document File";

    /// Leading bytes of an HWPX (zip) package.
    pub const HWPX_BYTES: &[u8] = b"PK\x03\x04mimetypeapplication/hwp+zip";

    /// Write a document into `dir` and return its path.
    pub fn write_document(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).expect("failed to write fixture");
        path
    }

    /// Names of every file left in `dir`, sorted.
    pub fn remaining_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}
