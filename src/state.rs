use std::sync::Arc;

use crate::{ai::VoiceAnalyzer, config::Config, storage::ObjectStore};

/// Application state shared across all handlers
///
/// Handlers are stateless; the clients held here are cheap to clone and
/// carry no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no Gemini API key is configured.
    pub analyzer: Option<Arc<dyn VoiceAnalyzer>>,
    /// `None` when R2 credentials are missing.
    pub store: Option<Arc<dyn ObjectStore>>,
}

impl AppState {
    pub fn new(
        config: Config,
        analyzer: Option<Arc<dyn VoiceAnalyzer>>,
        store: Option<Arc<dyn ObjectStore>>,
    ) -> Self {
        Self {
            config,
            analyzer,
            store,
        }
    }
}
