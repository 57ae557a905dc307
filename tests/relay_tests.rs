//! Relay route tests
//! Drives the router in-process with stand-in analyzer and bucket.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use voice_color_api::{
    ai::VoiceAnalyzer,
    config::Config,
    errors::{AppError, Result},
    models::{AudioClip, UploadResponse},
    routes::create_router,
    state::AppState,
    storage::{join_public_url, ObjectStore},
};

const BOUNDARY: &str = "voice-color-test-boundary";
const PUBLIC_BASE: &str = "https://pub.test.r2.dev";

// ============================================================================
// Test Environment Setup
// ============================================================================

/// Analyzer that answers from a canned reply and remembers what it received
struct StubAnalyzer {
    reply: std::result::Result<String, (StatusCode, String)>,
    received: Mutex<Vec<AudioClip>>,
}

impl StubAnalyzer {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            received: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: StatusCode, body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, body.to_string())),
            received: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl VoiceAnalyzer for StubAnalyzer {
    async fn analyze(&self, clip: AudioClip) -> Result<String> {
        self.received.lock().unwrap().push(clip);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, body)) => Err(AppError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// In-memory bucket
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<Vec<(String, Vec<u8>, String)>>,
    fail: bool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::Storage("bucket unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(PUBLIC_BASE, key)
    }
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "MAX_UPLOAD_SIZE_MB" => Some("1".to_string()),
        _ => None,
    })
    .unwrap()
}

fn app(analyzer: Option<Arc<dyn VoiceAnalyzer>>, store: Option<Arc<dyn ObjectStore>>) -> Router {
    create_router(AppState::new(test_config(), analyzer, store))
}

/// One-part multipart body
fn multipart_body(field: &str, file_name: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================================
// ANALYZE
// ============================================================================

#[tokio::test]
async fn test_analyze_passes_model_text_through() {
    let analyzer = StubAnalyzer::ok(r#"{"summary":"s","parameters":[]}"#);
    let app = app(Some(analyzer.clone()), None);

    let body = multipart_body("audio", "recording.webm", Some("audio/webm"), b"voice");
    let response = app.oneshot(multipart_request("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(body_text(response).await, r#"{"summary":"s","parameters":[]}"#);

    let received = analyzer.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].bytes, b"voice");
    assert_eq!(received[0].mime_type.as_deref(), Some("audio/webm"));
}

#[tokio::test]
async fn test_analyze_part_without_content_type() {
    let analyzer = StubAnalyzer::ok("{}");
    let app = app(Some(analyzer.clone()), None);

    let body = multipart_body("audio", "blob", None, b"voice");
    let response = app.oneshot(multipart_request("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let received = analyzer.received.lock().unwrap();
    assert_eq!(received[0].mime_type_or_default(), "audio/webm");
}

#[tokio::test]
async fn test_analyze_missing_audio_field() {
    let analyzer = StubAnalyzer::ok("{}");
    let app = app(Some(analyzer.clone()), None);

    let body = multipart_body("voice", "recording.webm", Some("audio/webm"), b"voice");
    let response = app.oneshot(multipart_request("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "No audio file provided");
    assert!(analyzer.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_without_api_key() {
    let app = app(None, None);

    let body = multipart_body("audio", "recording.webm", Some("audio/webm"), b"voice");
    let response = app.oneshot(multipart_request("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_text(response).await,
        "Server Configuration Error: API Key missing"
    );
}

#[tokio::test]
async fn test_analyze_missing_field_checked_before_key() {
    let app = app(None, None);

    let body = multipart_body("image", "x.png", Some("image/png"), b"png");
    let response = app.oneshot(multipart_request("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_propagates_upstream_status() {
    let analyzer = StubAnalyzer::failing(StatusCode::TOO_MANY_REQUESTS, "quota exceeded");
    let app = app(Some(analyzer), None);

    let body = multipart_body("audio", "recording.webm", Some("audio/webm"), b"voice");
    let response = app.oneshot(multipart_request("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_text(response).await, "Gemini API Error: quota exceeded");
}

#[tokio::test]
async fn test_analyze_rejects_oversized_body() {
    let analyzer = StubAnalyzer::ok("{}");
    let app = app(Some(analyzer.clone()), None);

    let big = vec![0u8; 2 * 1024 * 1024];
    let body = multipart_body("audio", "recording.webm", Some("audio/webm"), &big);
    let response = app.oneshot(multipart_request("/analyze", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(analyzer.received.lock().unwrap().is_empty());
}

// ============================================================================
// UPLOAD
// ============================================================================

#[tokio::test]
async fn test_upload_stores_png_and_returns_url() {
    let store = Arc::new(MemoryStore::default());
    let app = app(None, Some(store.clone()));

    let body = multipart_body("image", "snapshot.png", Some("image/png"), b"\x89PNG");
    let response = app.oneshot(multipart_request("/upload", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let uploaded: UploadResponse = serde_json::from_str(&body_text(response).await).unwrap();

    let objects = store.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    let (key, bytes, content_type) = &objects[0];
    assert!(key.ends_with(".png"));
    assert!(uuid::Uuid::parse_str(key.trim_end_matches(".png")).is_ok());
    assert_eq!(bytes, b"\x89PNG");
    assert_eq!(content_type, "image/png");
    assert_eq!(uploaded.url, format!("{}/{}", PUBLIC_BASE, key));
}

#[tokio::test]
async fn test_upload_root_alias() {
    let store = Arc::new(MemoryStore::default());
    let app = app(None, Some(store.clone()));

    let body = multipart_body("image", "snapshot.png", Some("image/png"), b"png");
    let response = app.oneshot(multipart_request("/", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.objects.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_keys_are_unique() {
    let store = Arc::new(MemoryStore::default());
    let app = app(None, Some(store.clone()));

    for _ in 0..2 {
        let body = multipart_body("image", "snapshot.png", Some("image/png"), b"png");
        let response = app
            .clone()
            .oneshot(multipart_request("/upload", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let objects = store.objects.lock().unwrap();
    assert_ne!(objects[0].0, objects[1].0);
}

#[tokio::test]
async fn test_upload_missing_image_field() {
    let store = Arc::new(MemoryStore::default());
    let app = app(None, Some(store.clone()));

    let body = multipart_body("audio", "recording.webm", Some("audio/webm"), b"voice");
    let response = app.oneshot(multipart_request("/upload", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "No image provided");
    assert!(store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_storage_failure() {
    let store = Arc::new(MemoryStore {
        fail: true,
        ..Default::default()
    });
    let app = app(None, Some(store));

    let body = multipart_body("image", "snapshot.png", Some("image/png"), b"png");
    let response = app.oneshot(multipart_request("/upload", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal Server Error");
}

#[tokio::test]
async fn test_upload_without_bucket() {
    let app = app(None, None);

    let body = multipart_body("image", "snapshot.png", Some("image/png"), b"png");
    let response = app.oneshot(multipart_request("/upload", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// CORS, ROUTING, HEALTH
// ============================================================================

#[tokio::test]
async fn test_cors_preflight() {
    let app = app(None, None);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze")
        .header(header::ORIGIN, "https://quiz.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));

    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"));
}

#[tokio::test]
async fn test_simple_post_carries_allow_origin() {
    let app = app(None, None);

    let body = multipart_body("image", "snapshot.png", Some("image/png"), b"png");
    let mut request = multipart_request("/upload", body);
    request
        .headers_mut()
        .insert(header::ORIGIN, "https://quiz.example.com".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_get_on_relay_route_is_405() {
    let app = app(None, None);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/analyze")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_method_checks_follow_the_router() {
    // OPTIONS without a preflight method is not answered by the CORS layer.
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze")
        .header(header::ORIGIN, "https://quiz.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app(None, None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    // Unknown paths are 404 for every method.
    let request = Request::builder()
        .method(Method::GET)
        .uri("/unknown")
        .body(Body::empty())
        .unwrap();
    let response = app(None, None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let app = app(None, None);

    let body = multipart_body("audio", "recording.webm", None, b"voice");
    let response = app.oneshot(multipart_request("/nope", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Not Found");
}

#[tokio::test]
async fn test_health_reports_bindings() {
    let app = app(Some(StubAnalyzer::ok("{}")), None);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["analyzer"], "configured");
    assert_eq!(health["storage"], "missing");
}

#[tokio::test]
async fn test_liveness() {
    let app = app(None, None);

    let request = Request::builder()
        .uri("/liveness")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(body_text(response).await, r#"{"alive":true}"#);
}
