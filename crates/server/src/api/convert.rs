//! Document conversion handler.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures::Stream;
use hwpdf_core::{CleanupGuard, SourceFormat};
use tokio_util::io::ReaderStream;
use tracing::info;

use super::error::ApiError;
use crate::metrics::UPLOAD_SIZE_BYTES;
use crate::state::AppState;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

/// POST /api/v1/convert/hwp-to-pdf
///
/// Converts an uploaded `.hwp`/`.hwpx` document and streams the PDF back.
/// Every temporary file of the request is deleted once the body has been
/// sent or the client has gone away.
pub async fn hwp_to_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let (filename, data) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => {
                let filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(ApiError::from_multipart)?;
                break (filename, data);
            }
            Ok(Some(_)) => continue,
            Ok(None) => {
                return Err(ApiError::BadRequest(format!(
                    "Missing multipart field '{}'",
                    FILE_FIELD
                )))
            }
            Err(e) => return Err(ApiError::from_multipart(e)),
        }
    };

    let filename = filename.unwrap_or_default();
    if let Some(format) = SourceFormat::from_filename(&filename) {
        UPLOAD_SIZE_BYTES
            .with_label_values(&[format.extension()])
            .observe(data.len() as f64);
    }

    let doc = state.service().convert_upload(&filename, &data).await?;
    drop(data);

    let file = match tokio::fs::File::open(&doc.pdf_path).await {
        Ok(file) => file,
        Err(e) => {
            doc.cleanup.run().await;
            return Err(ApiError::Internal(e.to_string()));
        }
    };

    info!(
        request_id = %doc.request_id,
        strategy = %doc.strategy,
        size = doc.size_bytes,
        "Streaming converted document"
    );

    let body = Body::from_stream(CleanupOnDrop {
        inner: ReaderStream::new(file),
        _guard: doc.cleanup,
    });

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(doc.size_bytes));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&doc.download_name),
    );
    if let Ok(value) = HeaderValue::from_str(&doc.request_id) {
        headers.insert("x-request-id", value);
    }
    headers.insert(
        "x-conversion-strategy",
        HeaderValue::from_static(doc.strategy.as_str()),
    );

    Ok(response)
}

/// Builds `attachment; filename="..."; filename*=UTF-8''...`.
///
/// The plain `filename` is an ASCII fallback; clients that understand
/// RFC 5987 use the percent-encoded UTF-8 name.
pub fn content_disposition(download_name: &str) -> HeaderValue {
    let fallback: String = download_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(download_name)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Body stream that keeps the request's artifacts alive until it is dropped.
struct CleanupOnDrop<S> {
    inner: S,
    _guard: CleanupGuard,
}

impl<S: Stream + Unpin> Stream for CleanupOnDrop<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
