use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::payload::{encode_audio_base64, strip_code_fence};
use super::prompt;
use super::VoiceAnalyzer;
use crate::config::GeminiConfig;
use crate::errors::{AppError, Result};
use crate::models::AudioClip;

/// Gemini `generateContent` client for voice analysis
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    model: String,
    api_base: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, api_base: String, temperature: f32) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            temperature,
        }
    }

    /// Build a client when the API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        config.api_key.as_ref().map(|key| {
            Self::new(
                key.clone(),
                config.model.clone(),
                config.api_base.clone(),
                config.temperature,
            )
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request(&self, clip: &AudioClip) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline(clip.mime_type_or_default(), encode_audio_base64(&clip.bytes)),
                    Part::text(prompt::analysis_request()),
                ],
            }],
            system_instruction: Content {
                parts: vec![Part::text(prompt::system_instruction())],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: self.temperature,
                response_schema: prompt::response_schema(),
            },
        }
    }
}

#[async_trait]
impl VoiceAnalyzer for GeminiClient {
    #[instrument(skip(self, clip), fields(model = %self.model, audio_bytes = clip.bytes.len()))]
    async fn analyze(&self, clip: AudioClip) -> Result<String> {
        let request_body = self.build_request(&clip);

        debug!(mime_type = %clip.mime_type_or_default(), "Calling Gemini generateContent");

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to call Gemini API");
                AppError::Internal(format!("Internal Analysis Error: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, %status, "Failed to read Gemini response body");
            AppError::Internal(format!("Internal Analysis Error: {}", e))
        })?;

        if !status.is_success() {
            return Err(AppError::Upstream {
                status: StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::Internal(format!("Internal Analysis Error: {}", e))
        })?;

        let text = parsed
            .first_text()
            .ok_or_else(|| AppError::Internal("Gemini API returned no text".to_string()))?;

        let cleaned = strip_code_fence(text).to_string();

        info!(response_len = cleaned.len(), "Gemini analysis completed");

        Ok(cleaned)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Part {
    fn inline(mime_type: &str, data: String) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
            text: None,
        }
    }

    fn text(text: String) -> Self {
        Self {
            inline_data: None,
            text: Some(text),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    temperature: f32,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }
}
