//! The fallback state machine.
//!
//! ```text
//! Direct --ok--> Done(direct)
//!   |
//!   fail
//!   v
//! ProbeSibling --present--> RetrySibling --ok--> Done(sibling)
//!   |                          |
//!   absent                     fail
//!   v                          v
//! [HWP]  Bridge --produced--> RetryBridged --ok--> Done(bridged)
//!          |                     |
//!          failed/unavailable    fail (discard bridged)
//!          v                     v
//!        Done(failed)          Done(failed)
//!
//! [HWPX] no bridge step: Done(failed)
//! ```
//!
//! [`transition`] is pure. The driver performs each state's [`Action`],
//! feeds back an [`Observation`] and applies the returned [`Effect`]s.

use std::path::PathBuf;

use super::types::{ConversionOutcome, ConversionRequest, FailureCause, Strategy};
use crate::document::SourceFormat;

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Convert the upload as-is.
    Direct,
    /// Check whether the other-extension sibling exists.
    ProbeSibling { sibling: PathBuf },
    /// Convert the sibling.
    RetrySibling { sibling: PathBuf },
    /// Re-encode the upload through the format bridge.
    Bridge { attempts: u32 },
    /// Convert the bridged artifact.
    RetryBridged { bridged: PathBuf, attempts: u32 },
    /// Terminal.
    Done(ConversionOutcome),
}

impl State {
    /// What the driver has to do next; `None` once terminal.
    pub fn action(&self, request: &ConversionRequest) -> Option<Action> {
        match self {
            State::Direct => Some(Action::Convert {
                input: request.input_path.clone(),
            }),
            State::ProbeSibling { sibling } => Some(Action::Probe {
                path: sibling.clone(),
            }),
            State::RetrySibling { sibling } => Some(Action::Convert {
                input: sibling.clone(),
            }),
            State::Bridge { .. } => Some(Action::Bridge {
                input: request.input_path.clone(),
            }),
            State::RetryBridged { bridged, .. } => Some(Action::Convert {
                input: bridged.clone(),
            }),
            State::Done(_) => None,
        }
    }

    /// Backend invocations made before entering this state.
    pub fn attempts(&self) -> u32 {
        match self {
            State::Direct => 0,
            State::ProbeSibling { .. } | State::RetrySibling { .. } => 1,
            State::Bridge { attempts } | State::RetryBridged { attempts, .. } => *attempts,
            State::Done(outcome) => outcome.attempts,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Done(_))
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            State::Direct => "direct",
            State::ProbeSibling { .. } => "probe_sibling",
            State::RetrySibling { .. } => "retry_sibling",
            State::Bridge { .. } => "bridge",
            State::RetryBridged { .. } => "retry_bridged",
            State::Done(outcome) if outcome.succeeded => "succeeded",
            State::Done(_) => "failed",
        }
    }
}

/// Work the driver performs for a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run the backend on `input`, writing the request's output.
    Convert { input: PathBuf },
    /// Check whether `path` exists.
    Probe { path: PathBuf },
    /// Bridge `input` into a freshly named HWPX artifact.
    Bridge { input: PathBuf },
}

/// Result of a bridge call as the machine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatus {
    /// The bridged artifact exists.
    Produced,
    /// The bridge ran and failed.
    Failed,
    /// The bridge is not installed or could not be launched.
    Unavailable,
}

/// What happened when the driver performed an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The backend reported success and the output file is on disk.
    Converted { verified: bool },
    /// Whether the probed path exists.
    Probed { present: bool },
    /// The bridge finished; `output` is the path it was asked to write.
    Bridged { output: PathBuf, status: BridgeStatus },
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Delete a disposable artifact now.
    Discard(PathBuf),
}

/// Output of [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: State,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: State) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with_discard(next: State, path: PathBuf) -> Self {
        Self {
            next,
            effects: vec![Effect::Discard(path)],
        }
    }
}

/// Advances the machine by one step.
///
/// Terminal states absorb every observation. An observation that does not
/// answer the current state's action ends the run as failed.
pub fn transition(request: &ConversionRequest, state: State, observation: Observation) -> Transition {
    match (state, observation) {
        (State::Direct, Observation::Converted { verified: true }) => {
            Transition::to(State::Done(ConversionOutcome::succeeded(
                request,
                request.input_path.clone(),
                Strategy::Direct,
                1,
                Vec::new(),
            )))
        }
        (State::Direct, Observation::Converted { verified: false }) => {
            Transition::to(State::ProbeSibling {
                sibling: request.sibling_path(),
            })
        }

        (State::ProbeSibling { sibling }, Observation::Probed { present: true }) => {
            Transition::to(State::RetrySibling { sibling })
        }
        (State::ProbeSibling { .. }, Observation::Probed { present: false }) => {
            Transition::to(after_sibling(request, 1))
        }

        (State::RetrySibling { sibling }, Observation::Converted { verified: true }) => {
            Transition::to(State::Done(ConversionOutcome::succeeded(
                request,
                sibling,
                Strategy::Sibling,
                2,
                Vec::new(),
            )))
        }
        (State::RetrySibling { .. }, Observation::Converted { verified: false }) => {
            Transition::to(after_sibling(request, 2))
        }

        (State::Bridge { attempts }, Observation::Bridged { output, status }) => match status {
            BridgeStatus::Produced => Transition::to(State::RetryBridged {
                bridged: output,
                attempts,
            }),
            BridgeStatus::Failed => Transition::with_discard(
                State::Done(ConversionOutcome::failed(
                    request,
                    FailureCause::Exhausted,
                    attempts,
                )),
                output,
            ),
            BridgeStatus::Unavailable => Transition::with_discard(
                State::Done(ConversionOutcome::failed(
                    request,
                    FailureCause::BridgeUnavailable,
                    attempts,
                )),
                output,
            ),
        },

        (State::RetryBridged { bridged, attempts }, Observation::Converted { verified: true }) => {
            Transition::to(State::Done(ConversionOutcome::succeeded(
                request,
                bridged.clone(),
                Strategy::Bridged,
                attempts + 1,
                vec![bridged],
            )))
        }
        (State::RetryBridged { bridged, attempts }, Observation::Converted { verified: false }) => {
            Transition::with_discard(
                State::Done(ConversionOutcome::failed(
                    request,
                    FailureCause::Exhausted,
                    attempts + 1,
                )),
                bridged,
            )
        }

        (done @ State::Done(_), _) => Transition::to(done),

        (state, _) => Transition::to(State::Done(ConversionOutcome::failed(
            request,
            FailureCause::Exhausted,
            state.attempts(),
        ))),
    }
}

/// Bridging is defined only for binary HWP uploads.
fn after_sibling(request: &ConversionRequest, attempts: u32) -> State {
    match request.original_format {
        SourceFormat::Hwp => State::Bridge { attempts },
        SourceFormat::Hwpx => State::Done(ConversionOutcome::failed(
            request,
            FailureCause::Exhausted,
            attempts,
        )),
    }
}
