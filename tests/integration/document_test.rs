//! Integration tests for the document lifecycle over HTTP.

mod helpers;

use axum::http::{StatusCode, header};
use serde_json::json;

use docstore_core::config::StorageConfig;
use helpers::{TestApp, pdf};

#[tokio::test]
async fn test_upload_list_download_delete_scenario() {
    let app = TestApp::new().await;
    let source = pdf(1000);

    let response = app.upload("report.pdf", "application/pdf", &source).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["id"], 1);
    assert_eq!(response.body["message"], "Uploaded successfully");

    let response = app.request("GET", "/api/documents").await;
    assert_eq!(response.status, StatusCode::OK);
    let listed = response.body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], 1);
    assert_eq!(listed[0]["original_filename"], "report.pdf");
    assert_eq!(listed[0]["size_bytes"], 1000);
    assert!(listed[0].get("stored_name").is_none());

    let response = app.request("GET", "/api/documents/1/download").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.bytes[..], &source[..]);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(response.headers[header::CONTENT_LENGTH], "1000");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.pdf\""
    );

    let response = app.request("DELETE", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "deleted": true }));

    let response = app.request("GET", "/api/documents").await;
    assert_eq!(response.body, json!([]));

    let response = app.request("GET", "/api/documents/1/download").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), Some("NOT_FOUND"));

    let response = app.request("DELETE", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.fixture.blob_names().await.is_empty());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = TestApp::new().await;
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        let response = app.upload(name, "application/pdf", &pdf(10)).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app.request("GET", "/api/documents").await;
    let names: Vec<_> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["original_filename"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["c.pdf", "b.pdf", "a.pdf"]);
}

#[tokio::test]
async fn test_same_name_uploads_are_distinct() {
    let app = TestApp::new().await;
    let first = app.upload("report.pdf", "application/pdf", b"%PDF-first").await;
    let second = app.upload("report.pdf", "application/pdf", b"%PDF-second").await;
    assert_ne!(first.body["id"], second.body["id"]);

    let response = app.request("GET", "/api/documents/1/download").await;
    assert_eq!(&response.bytes[..], b"%PDF-first");
    let response = app.request("GET", "/api/documents/2/download").await;
    assert_eq!(&response.bytes[..], b"%PDF-second");
    assert_eq!(app.fixture.blob_names().await.len(), 2);
}

#[tokio::test]
async fn test_non_pdf_rejected_without_side_effects() {
    let app = TestApp::new().await;

    let response = app.upload("notes.txt", "text/plain", b"hello").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));

    assert!(app.fixture.blob_names().await.is_empty());
    assert_eq!(app.request("GET", "/api/documents").await.body, json!([]));
}

#[tokio::test]
async fn test_oversize_rejected_before_persisting() {
    let app = TestApp::with_storage(StorageConfig {
        max_upload_size_bytes: 1024,
        ..StorageConfig::default()
    })
    .await;

    // Fits in the multipart allowance but not the upload limit. Writes
    // are switched off so any call into the blob store turns into a 500.
    app.fixture.blobs.fail_puts(true);
    let response = app.upload("big.pdf", "application/pdf", &pdf(2048)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
    assert!(app.fixture.blob_names().await.is_empty());
    assert_eq!(app.request("GET", "/api/documents").await.body, json!([]));

    app.fixture.blobs.fail_puts(false);
    let response = app.upload("ok.pdf", "application/pdf", &pdf(1024)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_file_field_rejected() {
    let app = TestApp::new().await;
    let response = app
        .upload_to("/api/upload", "attachment", "report.pdf", "application/pdf", &pdf(10))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "No file uploaded");
}

#[tokio::test]
async fn test_documents_alias_accepts_uploads() {
    let app = TestApp::new().await;
    let response = app
        .upload_to("/api/documents", "file", "report.pdf", "application/pdf", &pdf(10))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["original_filename"], "report.pdf");
    assert_eq!(response.body["size_bytes"], 10);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = TestApp::new().await;

    for (method, path) in [
        ("GET", "/api/documents/42"),
        ("GET", "/api/documents/42/download"),
        ("DELETE", "/api/documents/42"),
    ] {
        let response = app.request(method, path).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method} {path}");
    }

    let response = app.request("GET", "/api/documents/abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_missing_blob_is_reported_as_conflict() {
    let app = TestApp::new().await;
    app.upload("report.pdf", "application/pdf", &pdf(10)).await;
    for name in app.fixture.blob_names().await {
        tokio::fs::remove_file(app.fixture.dir.path().join(name))
            .await
            .unwrap();
    }

    let response = app.request("GET", "/api/documents/1/download").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), Some("INCONSISTENT_STATE"));

    // The record can still be cleaned up.
    let response = app.request("DELETE", "/api/documents/1").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_ascii_filename_download_header() {
    let app = TestApp::new().await;
    app.upload("résumé.pdf", "application/pdf", &pdf(10)).await;

    let response = app.request("GET", "/api/documents/1/download").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"r_sum_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
    );
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], true);
    assert_eq!(response.body["storage"], true);
}
