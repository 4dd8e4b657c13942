//! JSON error responses.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hwpdf_core::ConvertError;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The conversion service rejected or failed the upload.
    Convert(ConvertError),
    /// The multipart body was malformed or had no usable file.
    BadRequest(String),
    /// The upload exceeded `server.max_upload_bytes`.
    PayloadTooLarge,
    /// The converted PDF could not be read back.
    Internal(String),
}

impl ApiError {
    /// Maps a multipart parsing error, keeping axum's size-limit status.
    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(err.body_text())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Convert(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Convert(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Convert(e) => e.kind(),
            Self::BadRequest(_) => "invalid_input",
            Self::PayloadTooLarge => "payload_too_large",
            Self::Internal(_) => "storage_failure",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Convert(ConvertError::StorageFailure(_)) => {
                "Failed to store upload".to_string()
            }
            Self::Convert(e) => e.to_string(),
            Self::BadRequest(message) => message.clone(),
            Self::PayloadTooLarge => "Upload exceeds the size limit".to_string(),
            Self::Internal(_) => "Failed to read converted document".to_string(),
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        Self::Convert(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            warn!(kind = self.kind(), "Rejected conversion request: {}", self.message());
        } else if let Self::Internal(reason) = &self {
            warn!("Failed to serve converted document: {}", reason);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.message(),
                kind: self.kind(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_configuration_hidden_from_caller() {
        let conversion = ApiError::from(ConvertError::ConversionFailure {
            request_id: "r".to_string(),
        });
        let bridge = ApiError::from(ConvertError::BridgeConfiguration {
            request_id: "r".to_string(),
        });
        assert_eq!(conversion.status(), bridge.status());
        assert_eq!(conversion.kind(), bridge.kind());
        assert_eq!(conversion.message(), bridge.message());
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = ApiError::from(ConvertError::InvalidInput {
            filename: "report.txt".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_storage_failure_message_hides_io_detail() {
        let err = ApiError::from(ConvertError::StorageFailure(std::io::Error::new(
            std::io::ErrorKind::Other,
            "/var/tmp/hwpdf: no space left",
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to store upload");
    }
}
