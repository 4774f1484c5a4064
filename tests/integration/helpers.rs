//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use docstore_api::{AppState, build_router};
use docstore_core::config::{AppConfig, StorageConfig};
use docstore_service::testing::Fixture;

const BOUNDARY: &str = "docstore-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Stores behind the router, with fault switches.
    pub fixture: Fixture,
}

impl TestApp {
    /// Create a new test application with default storage limits.
    pub async fn new() -> Self {
        Self::with_storage(StorageConfig::default()).await
    }

    /// Create a test application with custom storage settings.
    pub async fn with_storage(storage: StorageConfig) -> Self {
        let fixture = Fixture::with_config(storage).await;
        let config = AppConfig {
            storage: fixture.service.config().clone(),
            ..AppConfig::default()
        };
        let router = build_router(AppState::new(config, fixture.service.clone()));
        Self { router, fixture }
    }

    /// Make a bodiless HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `content` as the multipart `file` field.
    pub async fn upload(&self, filename: &str, content_type: &str, content: &[u8]) -> TestResponse {
        self.upload_to("/api/upload", "file", filename, content_type, content)
            .await
    }

    /// Upload to an arbitrary path and field name.
    pub async fn upload_to(
        &self,
        path: &str,
        field: &str,
        filename: &str,
        content_type: &str,
        content: &[u8],
    ) -> TestResponse {
        let mut body = Vec::with_capacity(content.len() + 256);
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Bytes,
    /// Parsed JSON body, `Null` if not JSON
    pub body: Value,
}

impl TestResponse {
    /// Stable error code of an error response.
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// `len` bytes that start like a PDF.
pub fn pdf(len: usize) -> Vec<u8> {
    docstore_service::testing::pdf_bytes(len).to_vec()
}
