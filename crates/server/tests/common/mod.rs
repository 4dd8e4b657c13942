//! Common test utilities for E2E testing with mocks.
//!
//! The fixture builds an in-process router around a real execution lane.
//! The lane owns a scripted engine instead of an office suite and the bridge
//! is a mock, so no external tools are needed.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use hwpdf_core::{
    testing::{MockBridge, ScriptedEngine},
    ArtifactStore, BackendAdapter, Config, ConversionService, ExecutionLane, LaneBackend,
    ServerConfig, StorageConfig,
};

/// Re-export fixtures for test convenience
pub use hwpdf_core::testing::fixtures;

const BOUNDARY: &str = "hwpdf-test-boundary";

/// Test fixture for E2E testing with a scripted engine behind a real lane.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Engine owned by the lane - script conversion results
    pub engine: ScriptedEngine,
    /// Mock bridge - control HWP to HWPX results
    pub bridge: MockBridge,
    /// Lane the engine runs on
    pub lane: Arc<ExecutionLane<BackendAdapter<ScriptedEngine>>>,
    /// Temporary directory used as the artifact store
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a new test fixture with default limits.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom limits.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                max_upload_bytes: test_config.max_upload_bytes,
            },
            storage: StorageConfig {
                temp_dir: temp_dir.path().to_path_buf(),
            },
            ..Default::default()
        };

        let engine = ScriptedEngine::new();
        let bridge = MockBridge::new();
        let lane = Arc::new(
            ExecutionLane::spawn("backend", BackendAdapter::new(engine.clone()), 8)
                .expect("Failed to spawn lane"),
        );

        let service = Arc::new(ConversionService::new(
            ArtifactStore::new(temp_dir.path()),
            Arc::new(LaneBackend::new(Arc::clone(&lane))),
            Arc::new(bridge.clone()),
        ));

        let lane_for_status = Arc::clone(&lane);
        let state = Arc::new(
            hwpdf_server::state::AppState::new(config, service)
                .with_lane_status(Arc::new(move || lane_for_status.status())),
        );

        let router = hwpdf_server::api::create_router(state);

        Self {
            router,
            engine,
            bridge,
            lane,
            temp_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Files currently in the artifact store.
    pub fn artifacts(&self) -> Vec<String> {
        fixtures::remaining_files(self.temp_dir.path())
    }

    /// Polls until the artifact store is empty or the attempts run out.
    pub async fn wait_for_empty_store(&self) -> bool {
        for _ in 0..100 {
            if self.artifacts().is_empty() {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        false
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Upload `bytes` as a multipart file part named `field`.
    pub async fn upload(
        &self,
        path: &str,
        field: &str,
        filename: &str,
        bytes: &[u8],
    ) -> TestResponse {
        let body = multipart_body(field, filename, bytes);
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Upload a document as the `file` field.
    pub async fn convert(&self, path: &str, filename: &str, bytes: &[u8]) -> TestResponse {
        self.upload(path, "file", filename, bytes).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Build a single-part multipart body.
fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Upload limit applied to the convert route
    pub max_upload_bytes: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 1024 * 1024,
        }
    }
}

impl TestConfig {
    /// Create config with a custom upload limit.
    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        Self { max_upload_bytes }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            String::from_utf8_lossy(&$response.bytes)
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
