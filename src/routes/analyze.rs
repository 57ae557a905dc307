use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::take_form_file;
use crate::{
    errors::{AppError, Result},
    models::AudioClip,
    state::AppState,
};

/// POST /analyze - relay a voice recording to the model
///
/// The model's JSON text is returned verbatim; its shape is the client's
/// concern.
pub async fn analyze_voice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let audio = take_form_file(&mut multipart, "audio")
        .await?
        .ok_or_else(|| AppError::BadRequest("No audio file provided".to_string()))?;

    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or_else(|| AppError::Configuration("API Key missing".to_string()))?;

    tracing::info!(
        audio_bytes = audio.bytes.len(),
        mime_type = ?audio.content_type,
        "Analyzing voice recording"
    );

    let clip = AudioClip::new(audio.bytes, audio.content_type);
    let text = analyzer.analyze(clip).await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], text).into_response())
}
