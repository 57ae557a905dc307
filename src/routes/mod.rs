pub mod analyze;
pub mod health;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method},
    routing::post,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    errors::{AppError, Result},
    state::AppState,
};

/// Creates the relay router
///
/// `/` is kept as an alias of `/upload` for older clients.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/analyze", post(analyze::analyze_voice))
        .route("/upload", post(upload::upload_snapshot))
        .route("/", post(upload::upload_snapshot))
        .merge(health::routes())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .with_state(state)
}

/// Open CORS policy: any origin, `POST` and preflight only.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}

/// A file part pulled out of a multipart form
#[derive(Debug)]
pub struct FormFile {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Read the first part named `name`, skipping every other part.
pub async fn take_form_file(multipart: &mut Multipart, name: &str) -> Result<Option<FormFile>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        return Ok(Some(FormFile {
            bytes: bytes.to_vec(),
            content_type,
        }));
    }

    Ok(None)
}
