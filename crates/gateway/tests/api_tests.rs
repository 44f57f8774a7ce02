//! Router tests driven through `tower::ServiceExt::oneshot`
//!
//! Each test builds the full router over an in-memory store, a mock model
//! and a mock Drive source.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use paperlens_common::{
    config::AppConfig,
    db::{models::Paper, MemoryPaperStore, PaperStore},
    errors::{AppError, Result},
    llm::{MetadataModel, MockModel},
    record::ExtractedRecord,
    sources::{DocumentSource, MockDocumentSource, GOOGLE_DRIVE},
};
use paperlens_gateway::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "paperlens-test-boundary";

const EXTRACTED_JSON: &str = r#"{
  "doi": "10.1109/JSEN.2021.001",
  "title": "Multi-Sensor Fusion for Indoor Localization",
  "author": ["Ada Lovelace", "Alan Turing"],
  "publicationTitle": "IEEE Sensors Journal",
  "publicationDate": "2021-03-01",
  "url": "",
  "keywords": "sensor fusion; localization",
  "abstract": "We fuse IMU and UWB measurements.",
  "publisher": "IEEE",
  "fieldOfStudy": "Robotics",
  "isDataFusionPaper": true,
  "dataFusionClassificationReason": "Combines heterogeneous sensors"
}"#;

struct TestApp {
    router: Router,
    model: Arc<MockModel>,
    store: Arc<MemoryPaperStore>,
}

fn test_app(model: MockModel) -> TestApp {
    let source: Arc<dyn DocumentSource> = Arc::new(
        MockDocumentSource::named(GOOGLE_DRIVE)
            .with_file("drive-a", b"%PDF-1.4 a".to_vec())
            .with_file("drive-b", b"%PDF-1.4 b".to_vec()),
    );
    test_app_with_source(model, Some(source))
}

fn test_app_with_source(model: MockModel, source: Option<Arc<dyn DocumentSource>>) -> TestApp {
    test_app_with_config(AppConfig::for_tests(), model, source)
}

fn test_app_with_config(
    config: AppConfig,
    model: MockModel,
    source: Option<Arc<dyn DocumentSource>>,
) -> TestApp {
    let model = Arc::new(model);
    let store = Arc::new(MemoryPaperStore::new());
    let state = AppState::new(
        Arc::new(config),
        model.clone() as Arc<dyn MetadataModel>,
        store.clone() as Arc<dyn PaperStore>,
        source,
    );

    TestApp {
        router: create_router(state),
        model,
        store,
    }
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"paper.pdf\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/extract")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let (status, body) = send(&app.router, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app.router, empty_request("GET", "/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"]["backend"], "memory");
    assert_eq!(body["checks"]["drive"], true);
}

/// Store whose backend is unreachable
struct UnreachableStore;

#[async_trait]
impl PaperStore for UnreachableStore {
    async fn create(&self, _record: ExtractedRecord) -> Result<Paper> {
        Err(self.down())
    }

    async fn list(&self) -> Result<Vec<Paper>> {
        Err(self.down())
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<bool> {
        Err(self.down())
    }

    async fn ping(&self) -> Result<()> {
        Err(self.down())
    }

    fn backend_name(&self) -> &'static str {
        "unreachable"
    }
}

impl UnreachableStore {
    fn down(&self) -> AppError {
        AppError::DatabaseConnection {
            message: "connection refused".to_string(),
        }
    }
}

#[tokio::test]
async fn test_ready_reports_store_down() {
    let state = AppState::new(
        Arc::new(AppConfig::for_tests()),
        Arc::new(MockModel::new(EXTRACTED_JSON)),
        Arc::new(UnreachableStore),
        None,
    );
    let router = create_router(state);

    let (status, body) = send(&router, empty_request("GET", "/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["checks"]["store"]["status"], "down");
    assert_eq!(body["checks"]["store"]["backend"], "unreachable");
    assert!(body["checks"]["store"]["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));

    // Liveness does not depend on the store
    let (status, _) = send(&router, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Extraction
// ============================================================================

#[tokio::test]
async fn test_extract_upload_returns_record() {
    let app = test_app(MockModel::new(format!("```json\n{}\n```", EXTRACTED_JSON)));

    let (status, body) = send(&app.router, multipart_request("pdf", b"%PDF-1.4 test")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let extracted = &body["extracted"];
    assert_eq!(extracted["title"], "Multi-Sensor Fusion for Indoor Localization");
    assert_eq!(extracted["author"], "Ada Lovelace; Alan Turing");
    assert_eq!(extracted["isDataFusionPaper"], true);
    assert_eq!(extracted["url"], "");
    assert_eq!(app.model.calls(), 1);

    // Extraction never persists
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_extract_without_doi_succeeds() {
    let app = test_app(MockModel::new(r#"{"title":"Preprint","isDataFusionPaper":"false"}"#));

    let (status, body) = send(&app.router, multipart_request("pdf", b"%PDF-1.4")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted"]["doi"], "");
    assert_eq!(body["extracted"]["title"], "Preprint");
    assert_eq!(body["extracted"]["isDataFusionPaper"], false);
}

#[tokio::test]
async fn test_extract_missing_pdf_field() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let (status, body) = send(&app.router, multipart_request("document", b"%PDF-1.4")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No PDF file provided");
    assert_eq!(body["code"], "MISSING_FIELD");
    assert_eq!(app.model.calls(), 0);
}

#[tokio::test]
async fn test_extract_empty_pdf_makes_no_model_call() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let (status, _) = send(&app.router, multipart_request("pdf", b"")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.model.calls(), 0);
}

#[tokio::test]
async fn test_extract_without_body() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let (status, body) = send(&app.router, empty_request("POST", "/api/extract")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No PDF file provided");
}

#[tokio::test]
async fn test_extract_unparseable_reply_returns_raw() {
    let reply = "Sorry, I cannot read this document.";
    let app = test_app(MockModel::new(reply));

    let (status, body) = send(&app.router, multipart_request("pdf", b"%PDF-1.4")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "PARSE_ERROR");
    assert_eq!(body["raw"], reply);
}

#[tokio::test]
async fn test_extract_model_failure_is_bad_gateway() {
    let app = test_app(MockModel::failing("quota exhausted"));

    let (status, body) = send(&app.router, multipart_request("pdf", b"%PDF-1.4")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert!(body.get("raw").is_none());
}

#[tokio::test]
async fn test_extract_upload_over_limit_is_payload_too_large() {
    let mut config = AppConfig::for_tests();
    config.server.max_upload_bytes = 1024;
    let app = test_app_with_config(config, MockModel::new(EXTRACTED_JSON), None);

    let (status, body) = send(&app.router, multipart_request("pdf", &[b'x'; 4096])).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.model.calls(), 0);

    // Under the limit still goes through
    let (status, _) = send(&app.router, multipart_request("pdf", b"%PDF-1.4")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_extract_remote_file() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = json_request(
        "POST",
        "/api/extract",
        json!({ "fileId": "drive-a", "source": "google-drive" }),
    );
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["extracted"]["publisher"], "IEEE");
}

#[tokio::test]
async fn test_extract_remote_file_validation() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = json_request("POST", "/api/extract", json!({ "fileId": "" }));
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let request = json_request(
        "POST",
        "/api/extract",
        json!({ "fileId": "drive-a", "source": "dropbox" }),
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.model.calls(), 0);
}

#[tokio::test]
async fn test_extract_remote_file_without_drive_source() {
    let app = test_app_with_source(MockModel::new(EXTRACTED_JSON), None);

    let request = json_request("POST", "/api/extract", json!({ "fileId": "drive-a" }));
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
}

// ============================================================================
// Papers
// ============================================================================

#[tokio::test]
async fn test_create_then_list_newest_first() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    for title in ["First", "Second"] {
        let request = json_request(
            "POST",
            "/api/papers/create",
            json!({ "title": title, "isDataFusionPaper": true }),
        );
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["paper"]["title"], title);
        assert_eq!(body["paper"]["doi"], "");
        assert!(body["paper"]["id"].is_string());
        assert!(body["paper"]["createdAt"].is_string());
    }

    let (status, body) = send(&app.router, empty_request("GET", "/api/papers")).await;
    assert_eq!(status, StatusCode::OK);
    let papers = body["papers"].as_array().unwrap();
    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0]["title"], "Second");
    assert_eq!(papers[1]["title"], "First");
}

#[tokio::test]
async fn test_create_ignores_client_identity_fields() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));
    let client_id = "00000000-0000-0000-0000-000000000001";

    let request = json_request(
        "POST",
        "/api/papers/create",
        json!({
            "id": client_id,
            "_id": "abc",
            "createdAt": "1999-01-01T00:00:00Z",
            "title": "Reviewed",
            "rating": 5
        }),
    );
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["paper"]["id"], client_id);
    assert!(!body["paper"]["createdAt"].as_str().unwrap().starts_with("1999"));
    assert!(body["paper"].get("rating").is_none());
}

#[tokio::test]
async fn test_create_allows_duplicates() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    for _ in 0..2 {
        let request = json_request("POST", "/api/papers/create", json!({ "doi": "10.1/dup" }));
        let (status, _) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(app.store.len().await, 2);
}

#[tokio::test]
async fn test_create_rejects_non_object() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let (status, _) = send(&app.router, json_request("POST", "/api/papers/create", json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/papers/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");

    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = json_request("POST", "/api/papers/create", json!({ "title": "Doomed" }));
    let (_, body) = send(&app.router, request).await;
    let id = body["paper"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/papers/{}", id);
    let (status, body) = send(&app.router, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "deleted": true }));

    let (status, body) = send(&app.router, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "deleted": false }));

    let (_, body) = send(&app.router, empty_request("GET", "/api/papers")).await;
    assert!(body["papers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_malformed_id() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let (status, body) = send(&app.router, empty_request("DELETE", "/api/papers/not-a-uuid")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn test_export_csv() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = json_request(
        "POST",
        "/api/papers/create",
        json!({ "title": "He said \"hi\"", "isDataFusionPaper": true }),
    );
    send(&app.router, request).await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/papers/export"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"papers_export.csv\""
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("DOI,Title,Author,"));
    assert!(lines[1].contains(r#""He said ""hi""""#));
    assert!(lines[1].contains(r#""TRUE""#));
}

// ============================================================================
// Drive webhook
// ============================================================================

#[tokio::test]
async fn test_webhook_verification() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let (status, body) = send(
        &app.router,
        empty_request(
            "GET",
            "/api/webhooks/google-drive?challenge=abc123&verification_token=test-token",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "challenge": "abc123" }));

    let (status, body) = send(
        &app.router,
        empty_request(
            "GET",
            "/api/webhooks/google-drive?challenge=abc123&verification_token=wrong",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("Invalid verification token"));

    let (status, _) = send(
        &app.router,
        empty_request("GET", "/api/webhooks/google-drive?challenge=abc123"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_webhook_sync() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/google-drive")
        .header("x-goog-resource-state", "sync")
        .header("x-goog-channel-id", "channel-1")
        .body(Body::from(json!({ "changed": ["drive-a"] }).to_string()))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Sync received" }));
    assert_eq!(app.model.calls(), 0);
}

#[tokio::test]
async fn test_webhook_without_changes() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = json_request("POST", "/api/webhooks/google-drive", json!({ "changed": [] }));
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No files to process" }));

    let (status, body) = send(&app.router, empty_request("POST", "/api/webhooks/google-drive")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No files to process");
}

#[tokio::test]
async fn test_webhook_fans_out_and_isolates_failures() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/google-drive")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-goog-resource-state", "change")
        .header("x-goog-channel-id", "unregistered-channel")
        .body(Body::from(
            json!({ "changed": ["drive-a", "missing", "drive-b"] }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Webhook processed successfully");
    assert_eq!(body["processedFiles"], 3);
    assert_eq!(body["succeededFiles"], 2);
    assert_eq!(app.model.calls(), 2);

    // Webhook extractions are not saved
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_webhook_invalid_body() {
    let app = test_app(MockModel::new(EXTRACTED_JSON));

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/google-drive")
        .body(Body::from("changed=drive-a"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");
}
