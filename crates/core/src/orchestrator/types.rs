//! Types for the conversion orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::document::SourceFormat;

/// One uploaded document to convert.
///
/// Immutable: fallback steps change the candidate path the machine works on,
/// never the request itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Unique per upload; every artifact name is derived from it.
    pub request_id: String,
    /// The stored upload, `<request_id>.<ext>`.
    pub input_path: PathBuf,
    /// Where the PDF must end up, `<request_id>.pdf`.
    pub output_path: PathBuf,
    /// Format of the upload as named by the client.
    pub original_format: SourceFormat,
}

impl ConversionRequest {
    pub fn new(
        request_id: impl Into<String>,
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        original_format: SourceFormat,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            original_format,
        }
    }

    /// The same request-scoped base name under the other format's extension.
    pub fn sibling_path(&self) -> PathBuf {
        self.input_path
            .with_extension(self.original_format.sibling().extension())
    }

    /// Every artifact path derived from the request id: input, sibling and
    /// output.
    pub fn owned_paths(&self) -> Vec<PathBuf> {
        vec![
            self.input_path.clone(),
            self.sibling_path(),
            self.output_path.clone(),
        ]
    }
}

/// Which step produced a verified PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// The upload converted as-is.
    Direct,
    /// The upload's sibling under the other extension converted.
    Sibling,
    /// The bridged HWPX re-encoding converted.
    Bridged,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Sibling => "sibling",
            Self::Bridged => "bridged",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// Every applicable step ran and none produced a PDF.
    Exhausted,
    /// The bridge was needed but is not installed or could not start.
    BridgeUnavailable,
}

/// Terminal result of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub succeeded: bool,
    /// The candidate that converted, or the original input on failure.
    pub final_input_path: PathBuf,
    /// Verified PDF, present only on success.
    pub produced_output_path: Option<PathBuf>,
    /// Step that succeeded.
    pub strategy: Option<Strategy>,
    /// Backend invocations made.
    pub attempts: u32,
    /// Intermediate artifacts still on disk that belong to the request.
    pub intermediates: Vec<PathBuf>,
    pub failure: Option<FailureCause>,
}

impl ConversionOutcome {
    pub fn succeeded(
        request: &ConversionRequest,
        final_input_path: PathBuf,
        strategy: Strategy,
        attempts: u32,
        intermediates: Vec<PathBuf>,
    ) -> Self {
        Self {
            succeeded: true,
            final_input_path,
            produced_output_path: Some(request.output_path.clone()),
            strategy: Some(strategy),
            attempts,
            intermediates,
            failure: None,
        }
    }

    pub fn failed(request: &ConversionRequest, cause: FailureCause, attempts: u32) -> Self {
        Self {
            succeeded: false,
            final_input_path: request.input_path.clone(),
            produced_output_path: None,
            strategy: None,
            attempts,
            intermediates: Vec::new(),
            failure: Some(cause),
        }
    }

    /// Label used for metrics.
    pub fn strategy_label(&self) -> &'static str {
        self.strategy.map(|s| s.as_str()).unwrap_or("none")
    }
}
