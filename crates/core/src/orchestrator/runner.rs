//! Drives the fallback machine against real collaborators.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::machine::{transition, Action, BridgeStatus, Effect, Observation, State, Transition};
use super::types::{ConversionOutcome, ConversionRequest, FailureCause};
use crate::artifacts::{cleanup, ArtifactStore, CleanupGuard};
use crate::backend::PdfBackend;
use crate::bridge::FormatBridge;
use crate::document::SourceFormat;
use crate::metrics::{
    BRIDGE_INVOCATIONS, CONVERSIONS_TOTAL, CONVERSION_ATTEMPTS, CONVERSION_DURATION,
};

/// Runs one request through direct conversion, sibling retry and bridging.
///
/// Backend calls go through the [`PdfBackend`], which in production submits
/// them to the execution lane. Bridge calls run on the caller's task,
/// outside the lane.
pub struct Orchestrator {
    backend: Arc<dyn PdfBackend>,
    bridge: Arc<dyn FormatBridge>,
    store: ArtifactStore,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn PdfBackend>,
        bridge: Arc<dyn FormatBridge>,
        store: ArtifactStore,
    ) -> Self {
        Self {
            backend,
            bridge,
            store,
        }
    }

    /// Runs the request to a terminal outcome. Never fails: every backend and
    /// bridge error ends up in the outcome.
    ///
    /// Bridged artifacts are deleted if the returned future is dropped before
    /// completion; once it completes they are listed in the outcome.
    pub async fn run(&self, request: &ConversionRequest) -> ConversionOutcome {
        let mut guard = CleanupGuard::default();
        let outcome = self.run_guarded(request, &mut guard).await;
        guard.disarm();
        outcome
    }

    /// Like [`Orchestrator::run`], but every bridged path is pushed onto
    /// `guard` before the bridge is started.
    pub async fn run_guarded(
        &self,
        request: &ConversionRequest,
        guard: &mut CleanupGuard,
    ) -> ConversionOutcome {
        let start = Instant::now();
        let mut state = State::Direct;

        let outcome = loop {
            let Some(action) = state.action(request) else {
                match state {
                    State::Done(outcome) => break outcome,
                    other => {
                        break ConversionOutcome::failed(
                            request,
                            FailureCause::Exhausted,
                            other.attempts(),
                        )
                    }
                }
            };

            let observation = self.perform(request, action, guard).await;
            let from = state.name();
            let Transition { next, effects } = transition(request, state, observation);
            debug!(
                request_id = %request.request_id,
                from,
                to = next.name(),
                "Conversion state transition"
            );

            for effect in effects {
                self.apply(effect).await;
            }
            state = next;
        };

        self.record(request, &outcome, start);
        outcome
    }

    async fn perform(
        &self,
        request: &ConversionRequest,
        action: Action,
        guard: &mut CleanupGuard,
    ) -> Observation {
        match action {
            Action::Convert { input } => self.convert(request, &input).await,
            Action::Probe { path } => {
                let present = exists(&path).await;
                if present {
                    warn!(
                        request_id = %request.request_id,
                        sibling = %path.display(),
                        "Direct conversion failed, retrying with sibling extension"
                    );
                }
                Observation::Probed { present }
            }
            Action::Bridge { input } => self.bridge(request, &input, guard).await,
        }
    }

    /// Runs one backend attempt and trusts the file system over the
    /// backend's answer.
    async fn convert(&self, request: &ConversionRequest, input: &Path) -> Observation {
        let output = &request.output_path;
        if let Err(e) = tokio::fs::remove_file(output).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(
                    request_id = %request.request_id,
                    output = %output.display(),
                    "Failed to remove stale output: {}", e
                );
            }
        }

        let reported = self.backend.convert(input, output).await;
        let present = exists(output).await;
        if reported && !present {
            warn!(
                request_id = %request.request_id,
                backend = self.backend.name(),
                input = %input.display(),
                "Backend reported success but wrote no output"
            );
        }

        Observation::Converted {
            verified: reported && present,
        }
    }

    async fn bridge(
        &self,
        request: &ConversionRequest,
        input: &Path,
        guard: &mut CleanupGuard,
    ) -> Observation {
        let output = self.store.intermediate_path(SourceFormat::Hwpx);
        guard.push(output.clone());
        warn!(
            request_id = %request.request_id,
            bridge = self.bridge.name(),
            output = %output.display(),
            "Conversion failed under both extensions, bridging to HWPX"
        );

        let status = match self.bridge.bridge(input, &output).await {
            Ok(()) if exists(&output).await => {
                BRIDGE_INVOCATIONS.with_label_values(&["success"]).inc();
                info!(request_id = %request.request_id, "Bridged document to HWPX");
                BridgeStatus::Produced
            }
            Ok(()) => {
                BRIDGE_INVOCATIONS.with_label_values(&["failure"]).inc();
                warn!(
                    request_id = %request.request_id,
                    output = %output.display(),
                    "Bridge reported success but wrote no output"
                );
                BridgeStatus::Failed
            }
            Err(e) if e.is_configuration() => {
                BRIDGE_INVOCATIONS.with_label_values(&["misconfigured"]).inc();
                error!(
                    request_id = %request.request_id,
                    bridge = self.bridge.name(),
                    "Format bridge is not usable, check the installation: {}", e
                );
                BridgeStatus::Unavailable
            }
            Err(e) => {
                BRIDGE_INVOCATIONS.with_label_values(&["failure"]).inc();
                warn!(
                    request_id = %request.request_id,
                    bridge = self.bridge.name(),
                    "Format bridge failed: {}", e
                );
                BridgeStatus::Failed
            }
        };

        Observation::Bridged { output, status }
    }

    async fn apply(&self, effect: Effect) {
        match effect {
            Effect::Discard(path) => {
                cleanup([&path]).await;
            }
        }
    }

    fn record(&self, request: &ConversionRequest, outcome: &ConversionOutcome, start: Instant) {
        let result = if outcome.succeeded { "success" } else { "failed" };
        let elapsed = start.elapsed();

        CONVERSIONS_TOTAL
            .with_label_values(&[result, outcome.strategy_label()])
            .inc();
        CONVERSION_DURATION
            .with_label_values(&[result])
            .observe(elapsed.as_secs_f64());
        CONVERSION_ATTEMPTS.observe(outcome.attempts as f64);

        if outcome.succeeded {
            info!(
                request_id = %request.request_id,
                strategy = outcome.strategy_label(),
                attempts = outcome.attempts,
                input = %outcome.final_input_path.display(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Conversion succeeded"
            );
        } else {
            error!(
                request_id = %request.request_id,
                format = %request.original_format,
                attempts = outcome.attempts,
                cause = ?outcome.failure,
                elapsed_ms = elapsed.as_millis() as u64,
                "Conversion failed"
            );
        }
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
