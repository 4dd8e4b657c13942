//! Backend conversion adapter.
//!
//! This module drives the native document engine that renders HWP/HWPX
//! documents to PDF. The engine is modelled by the [`RenderEngine`] trait and
//! wrapped by [`BackendAdapter`], which owns the acquire/open/save/close/
//! release sequence and turns every failure into `false`.
//!
//! The adapter is never called directly by request handlers. It is moved into
//! an [`ExecutionLane`](crate::lane::ExecutionLane) and reached through
//! [`LaneBackend`], the [`PdfBackend`] implementation the orchestrator uses.
//!
//! # Example
//!
//! ```ignore
//! use hwpdf_core::backend::{BackendAdapter, BackendConfig, CommandEngine, LaneBackend};
//! use hwpdf_core::lane::ExecutionLane;
//!
//! let adapter = BackendAdapter::new(CommandEngine::new(BackendConfig::default()));
//! let lane = Arc::new(ExecutionLane::spawn("backend", adapter, 64)?);
//! let backend = LaneBackend::new(lane);
//!
//! let ok = backend.convert(Path::new("/tmp/in.hwp"), Path::new("/tmp/out.pdf")).await;
//! ```

mod adapter;
mod command;
mod config;
mod error;
mod lane_backend;
mod traits;
mod types;

pub use adapter::BackendAdapter;
pub use command::CommandEngine;
pub use config::BackendConfig;
pub use error::BackendError;
pub use lane_backend::LaneBackend;
pub use traits::{PdfBackend, RenderEngine};
pub use types::OpenOptions;
