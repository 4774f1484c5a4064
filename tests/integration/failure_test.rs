//! Integration tests for storage and registry failures over HTTP.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, pdf};

#[tokio::test]
async fn test_blob_delete_failure_keeps_record() {
    let app = TestApp::new().await;
    app.upload("report.pdf", "application/pdf", &pdf(100)).await;
    app.fixture.blobs.fail_deletes(true);

    let response = app.request("DELETE", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), Some("STORAGE_DELETE_ERROR"));

    let response = app.request("GET", "/api/documents").await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);
    let response = app.request("GET", "/api/documents/1/download").await;
    assert_eq!(response.status, StatusCode::OK);

    app.fixture.blobs.fail_deletes(false);
    let response = app.request("DELETE", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.fixture.blob_names().await.is_empty());
}

#[tokio::test]
async fn test_registry_failure_rolls_back_blob() {
    let app = TestApp::new().await;
    app.fixture.registry.fail_creates(true);

    let response = app.upload("report.pdf", "application/pdf", &pdf(100)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), Some("PERSISTENCE_ERROR"));
    assert!(app.fixture.blob_names().await.is_empty());

    app.fixture.registry.fail_creates(false);
    assert_eq!(app.request("GET", "/api/documents").await.body, json!([]));
}

#[tokio::test]
async fn test_blob_write_failure_creates_no_record() {
    let app = TestApp::new().await;
    app.fixture.blobs.fail_puts(true);

    let response = app.upload("report.pdf", "application/pdf", &pdf(100)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), Some("STORAGE_WRITE_ERROR"));
    assert_eq!(app.request("GET", "/api/documents").await.body, json!([]));
}

#[tokio::test]
async fn test_record_delete_failure_surfaces_persistence_error() {
    let app = TestApp::new().await;
    app.upload("report.pdf", "application/pdf", &pdf(100)).await;
    app.fixture.registry.fail_deletes(true);

    let response = app.request("DELETE", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), Some("PERSISTENCE_ERROR"));

    // Blob is gone, record remains: reported as drift, and retry finishes.
    let response = app.request("GET", "/api/documents/1/download").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    app.fixture.registry.fail_deletes(false);
    let response = app.request("DELETE", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::OK);
}
