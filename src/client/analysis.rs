use reqwest::{multipart, Client, StatusCode};
use std::fmt;
use url::Url;

use crate::models::{AnalysisResult, AudioClip, UploadResponse};

/// The one message shown for any analysis failure.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "音声の解析に失敗しました。もう一度お試しください。";

/// Why an analysis or snapshot request failed
///
/// The variants only matter for logs; the UI shows `user_message()` for all.
#[derive(Debug)]
pub enum AnalysisError {
    MissingBackendUrl,
    Transport(String),
    Status { status: StatusCode, body: String },
    Decode(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MissingBackendUrl => write!(f, "Backend URL is not defined"),
            AnalysisError::Transport(msg) => write!(f, "Request failed: {}", msg),
            AnalysisError::Status { status, body } => {
                write!(f, "Analysis failed: {} {}", status, body)
            }
            AnalysisError::Decode(msg) => write!(f, "Unexpected response body: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl AnalysisError {
    pub fn user_message(&self) -> &'static str {
        ANALYSIS_FAILED_MESSAGE
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::Transport(err.to_string())
    }
}

/// HTTP client for the relay's `/analyze` and `/upload` routes
#[derive(Clone)]
pub struct AnalysisClient {
    http_client: Client,
    backend_url: Option<Url>,
}

impl AnalysisClient {
    /// `backend_url` is the relay base; `None` makes every call fail with
    /// `MissingBackendUrl`, mirroring an unset deployment variable.
    pub fn new(backend_url: Option<Url>) -> Self {
        Self {
            http_client: Client::new(),
            backend_url,
        }
    }

    fn endpoint(&self, route: &str) -> Result<Url, AnalysisError> {
        let base = self
            .backend_url
            .as_ref()
            .ok_or(AnalysisError::MissingBackendUrl)?;
        let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), route);
        Url::parse(&joined).map_err(|e| AnalysisError::Transport(e.to_string()))
    }

    /// Upload a recording and decode the relay's answer.
    ///
    /// One request, no retry. The decoded result is checked against the
    /// schema and violations are logged, but a non-conforming result is
    /// still returned.
    pub async fn analyze(&self, clip: AudioClip) -> Result<AnalysisResult, AnalysisError> {
        let url = self.endpoint("analyze")?;

        let file_name = format!("recording.{}", clip.file_extension());
        let mime_type = clip.mime_type_or_default().to_string();
        let part = multipart::Part::bytes(clip.bytes)
            .file_name(file_name)
            .mime_str(&mime_type)?;
        let form = multipart::Form::new().part("audio", part);

        tracing::debug!(url = %url, "Uploading recording for analysis");

        let response = self.http_client.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Analysis failed: {} {}", status, body);
            return Err(AnalysisError::Status { status, body });
        }

        let body = response.text().await?;
        let result: AnalysisResult =
            serde_json::from_str(&body).map_err(|e| AnalysisError::Decode(e.to_string()))?;

        if let Err(violations) = result.validate() {
            for violation in &violations {
                tracing::warn!("Analysis result violates schema: {}", violation);
            }
        }

        Ok(result)
    }

    /// Upload a rendered PNG snapshot and return its public URL.
    pub async fn upload_snapshot(&self, png: Vec<u8>) -> Result<Url, AnalysisError> {
        let url = self.endpoint("upload")?;

        let part = multipart::Part::bytes(png)
            .file_name("snapshot.png")
            .mime_str("image/png")?;
        let form = multipart::Form::new().part("image", part);

        let response = self.http_client.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Snapshot upload failed: {} {}", status, body);
            return Err(AnalysisError::Status { status, body });
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        Url::parse(&uploaded.url).map_err(|e| AnalysisError::Decode(e.to_string()))
    }
}
