//! Errors returned to the request layer.

use thiserror::Error;

/// Why an upload could not be converted.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Missing filename or an extension other than `.hwp`/`.hwpx`.
    #[error("Unsupported file type '{filename}': expected .hwp or .hwpx")]
    InvalidInput { filename: String },

    /// The upload could not be written to temporary storage.
    #[error("Failed to store upload: {0}")]
    StorageFailure(#[from] std::io::Error),

    /// Every strategy ran and none produced a PDF.
    #[error("Conversion failed for request {request_id}")]
    ConversionFailure { request_id: String },

    /// The bridge was needed but is not installed. Looks like a conversion
    /// failure to the caller.
    #[error("Conversion failed for request {request_id}")]
    BridgeConfiguration { request_id: String },
}

impl ConvertError {
    /// Stable code exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::StorageFailure(_) => "storage_failure",
            Self::ConversionFailure { .. } | Self::BridgeConfiguration { .. } => {
                "conversion_failure"
            }
        }
    }

    /// Whether the caller sent something unusable, as opposed to a server-side
    /// failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
