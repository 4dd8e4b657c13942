//! Conversion orchestrator.
//!
//! Given one stored upload, the orchestrator tries an ordered, bounded list
//! of strategies until one produces a PDF that actually exists on disk:
//! - **Direct**: convert the upload as-is
//! - **Sibling**: convert `<requestId>.<other ext>` if it exists
//! - **Bridge** (HWP only): re-encode to HWPX out-of-process and convert that
//!
//! The sequence is an explicit state machine ([`State`], [`transition`])
//! with no I/O of its own; [`Orchestrator`] performs the actions.

mod machine;
mod runner;
mod types;

pub use machine::{transition, Action, BridgeStatus, Effect, Observation, State, Transition};
pub use runner::Orchestrator;
pub use types::{ConversionOutcome, ConversionRequest, FailureCause, Strategy};
