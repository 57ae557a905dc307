use serde::{Deserialize, Serialize};

/// Response body of the snapshot image relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// An uploaded audio recording as received from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// Browser recording mime type, e.g. `audio/webm;codecs=opus`.
    pub mime_type: Option<String>,
}

/// Mime type assumed when a clip arrives without one.
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_AUDIO_MIME)
    }

    /// File extension matching the mime type, ignoring codec parameters.
    pub fn file_extension(&self) -> &'static str {
        let essence = self
            .mime_type_or_default()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        match essence {
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/mpeg" => "mp3",
            "audio/mp4" | "audio/x-m4a" => "m4a",
            "audio/ogg" => "ogg",
            "audio/flac" => "flac",
            _ => "webm",
        }
    }
}
