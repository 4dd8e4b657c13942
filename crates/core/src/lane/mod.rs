//! Serialized execution lane.
//!
//! The native document engine corrupts its state when two conversions touch
//! it at the same time. Instead of guarding it with a lock, the engine is
//! moved onto a single dedicated worker thread and only ever reached through
//! jobs submitted to that thread:
//!
//! - Jobs run strictly one at a time, in submission order (FIFO).
//! - A job whose caller went away before it started is skipped.
//! - A job that started always runs to completion.
//!
//! # Example
//!
//! ```ignore
//! use hwpdf_core::lane::ExecutionLane;
//!
//! let lane = ExecutionLane::spawn("backend", adapter, 64)?;
//! let ok = lane.submit(move |adapter| adapter.convert(&input, &output)).await?;
//! lane.shutdown().await;
//! ```

mod config;
mod error;
mod types;
mod worker;

pub use config::LaneConfig;
pub use error::LaneError;
pub use types::LaneStatus;
pub use worker::ExecutionLane;
