//! End-to-end tests with mocked external dependencies.
//!
//! These tests run the full server stack in-process. Conversions go through
//! a real execution lane with a scripted engine, and the HWP to HWPX bridge
//! is mocked.

mod common;

use axum::http::StatusCode;
use hwpdf_core::testing::{BridgeOutcome, EngineScript};
use hwpdf_core::SourceFormat;

use common::{fixtures, TestConfig, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", "ok");
    assert_eq!(response.body["lane"]["name"], "backend");
    assert_eq!(response.body["lane"]["running"], true);
    assert_eq!(response.body["lane"]["capacity"], 8);
}

#[tokio::test]
async fn test_health_degraded_after_lane_shutdown() {
    let fixture = TestFixture::new().await;
    fixture.lane.shutdown().await;

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", "degraded");
    assert_eq!(response.body["lane"]["running"], false);
}

#[tokio::test]
async fn test_config_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["server"]["max_upload_bytes"], 1024 * 1024);
    assert_eq!(
        response.body["storage"]["temp_dir"],
        fixture.temp_path().to_string_lossy().as_ref()
    );
    assert_eq!(response.body["backend"]["program"], "soffice");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/documents").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

// =============================================================================
// Conversion
// =============================================================================

#[tokio::test]
async fn test_convert_hwp_streams_pdf() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "report.hwp", fixtures::HWP_BYTES)
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.bytes, fixtures::PDF_BYTES);
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert_eq!(
        response.header("content-length"),
        Some(fixtures::PDF_BYTES.len().to_string().as_str())
    );
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf")
    );
    assert_eq!(response.header("x-conversion-strategy"), Some("direct"));
    assert!(response.header("x-request-id").is_some());

    assert_eq!(fixture.engine.save_count(), 1);
    assert_eq!(fixture.bridge.call_count().await, 0);
    assert!(fixture.wait_for_empty_store().await, "left: {:?}", fixture.artifacts());
}

#[tokio::test]
async fn test_convert_hwpx_at_root_path() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .convert("/convert/hwp-to-pdf", "Plan.HWPX", fixtures::HWPX_BYTES)
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.bytes, fixtures::PDF_BYTES);
    assert!(response
        .header("content-disposition")
        .is_some_and(|v| v.contains("filename=\"Plan.pdf\"")));
    assert!(fixture.wait_for_empty_store().await);
}

#[tokio::test]
async fn test_convert_hwp_via_bridge() {
    let fixture = TestFixture::new().await;
    fixture
        .engine
        .script_format(SourceFormat::Hwp, EngineScript::Fail);

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "legacy.hwp", fixtures::HWP_BYTES)
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.bytes, fixtures::PDF_BYTES);
    assert_eq!(response.header("x-conversion-strategy"), Some("bridged"));

    // Direct and the post-bridge retry; the sibling never existed
    assert_eq!(fixture.engine.save_count(), 2);
    let calls = fixture.bridge.recorded_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].output.extension().and_then(|e| e.to_str()),
        Some("hwpx")
    );
    assert!(fixture.wait_for_empty_store().await, "left: {:?}", fixture.artifacts());
}

#[tokio::test]
async fn test_hwpx_failure_never_bridges() {
    let fixture = TestFixture::new().await;
    fixture
        .engine
        .script_format(SourceFormat::Hwpx, EngineScript::Fail);

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "doc.hwpx", fixtures::HWPX_BYTES)
        .await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_json_path!(response.body, "kind", "conversion_failure");
    assert_eq!(fixture.bridge.call_count().await, 0);
    assert_eq!(fixture.engine.save_count(), 1);
    assert!(fixture.artifacts().is_empty());
}

// =============================================================================
// Rejections and failures
// =============================================================================

#[tokio::test]
async fn test_unsupported_extension_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "report.txt", b"plain text")
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_json_path!(response.body, "kind", "invalid_input");
    assert!(response.body["error"]
        .as_str()
        .is_some_and(|e| e.contains("report.txt")));
    assert_eq!(fixture.engine.save_count(), 0);
    assert!(fixture.artifacts().is_empty());
}

#[tokio::test]
async fn test_missing_file_field_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .upload(
            "/api/v1/convert/hwp-to-pdf",
            "document",
            "report.hwp",
            fixtures::HWP_BYTES,
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_json_path!(response.body, "kind", "invalid_input");
    assert!(fixture.artifacts().is_empty());
}

#[tokio::test]
async fn test_exhausted_fallbacks_return_500() {
    let fixture = TestFixture::new().await;
    fixture.engine.set_default(EngineScript::Fail);

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "broken.hwp", fixtures::HWP_BYTES)
        .await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_json_path!(response.body, "kind", "conversion_failure");
    assert_eq!(fixture.bridge.call_count().await, 1);
    assert_eq!(fixture.engine.save_count(), 2);
    assert!(fixture.artifacts().is_empty(), "left: {:?}", fixture.artifacts());
}

#[tokio::test]
async fn test_misconfigured_bridge_returns_500() {
    let fixture = TestFixture::new().await;
    fixture.engine.set_default(EngineScript::Fail);
    fixture.bridge.set_outcome(BridgeOutcome::Misconfigured).await;

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "broken.hwp", fixtures::HWP_BYTES)
        .await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_json_path!(response.body, "kind", "conversion_failure");
    assert_eq!(fixture.engine.save_count(), 1);
    assert!(fixture.artifacts().is_empty());
}

#[tokio::test]
async fn test_claimed_success_without_pdf_returns_500() {
    let fixture = TestFixture::new().await;
    fixture
        .engine
        .set_default(EngineScript::ReportSuccessWithoutOutput);

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "ghost.hwpx", fixtures::HWPX_BYTES)
        .await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_json_path!(response.body, "kind", "conversion_failure");
    assert!(fixture.artifacts().is_empty());
}

#[tokio::test]
async fn test_engine_panic_returns_500_and_lane_survives() {
    let fixture = TestFixture::new().await;
    fixture.engine.set_default(EngineScript::Panic);

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "crash.hwpx", fixtures::HWPX_BYTES)
        .await;
    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);

    fixture.engine.set_default(EngineScript::Succeed);
    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "fine.hwpx", fixtures::HWPX_BYTES)
        .await;
    assert_status!(response, StatusCode::OK);

    let health = fixture.get("/api/v1/health").await;
    assert_eq!(health.body["lane"]["total_panicked"], 1);
    assert_eq!(health.body["lane"]["running"], true);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let fixture = TestFixture::with_config(TestConfig::with_upload_limit(256)).await;
    let payload = vec![0u8; 4096];

    let response = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "big.hwp", &payload)
        .await;

    assert_status!(response, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(fixture.engine.save_count(), 0);
    assert!(fixture.artifacts().is_empty());
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    let _ = fixture
        .convert("/api/v1/convert/hwp-to-pdf", "m.hwp", fixtures::HWP_BYTES)
        .await;

    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);

    let text = String::from_utf8_lossy(&response.bytes);
    assert!(text.contains("hwpdf_conversions_total"));
    assert!(text.contains("hwpdf_http_requests_total"));
    assert!(text.contains("hwpdf_lane_running"));
}
