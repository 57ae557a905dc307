pub mod gemini;
pub mod payload;
pub mod prompt;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::AudioClip;

pub use gemini::GeminiClient;

/// Backend that turns a voice recording into the model's JSON text.
///
/// Implementations return the model output as-is (minus code fences); the
/// relay does not check it against the result schema.
#[async_trait]
pub trait VoiceAnalyzer: Send + Sync {
    async fn analyze(&self, clip: AudioClip) -> Result<String>;
}
