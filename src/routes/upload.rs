use axum::{
    extract::{Multipart, State},
    Json,
};

use super::take_form_file;
use crate::{
    errors::{AppError, Result},
    models::UploadResponse,
    state::AppState,
    storage::snapshot_key,
};

const SNAPSHOT_CONTENT_TYPE: &str = "image/png";

/// POST /upload - store a result snapshot and return its public URL
pub async fn upload_snapshot(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let image = take_form_file(&mut multipart, "image")
        .await?
        .ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;

    let store = state
        .store
        .as_ref()
        .ok_or_else(|| AppError::Configuration("Snapshot bucket not configured".to_string()))?;

    let key = snapshot_key();
    store
        .put_object(&key, image.bytes, SNAPSHOT_CONTENT_TYPE)
        .await?;

    let url = store.public_url(&key);
    tracing::info!(key = %key, "Stored share snapshot");

    Ok(Json(UploadResponse { url }))
}
