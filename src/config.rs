use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_R2_PUBLIC_BASE_URL: &str = "https://pub-3eac0df6bfdf43f4b4dc8268bd515932.r2.dev";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub cloudflare: CloudflareConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Only the server ever sees this key; it is never sent to clients.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareConfig {
    pub account_id: Option<String>,
    pub r2_endpoint: Option<String>,
    pub r2_access_key_id: Option<String>,
    pub r2_secret_access_key: Option<String>,
    pub r2_bucket_snapshots: String,
    pub r2_public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceConfig {
    pub max_upload_size_mb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        // Empty values count as unset so a blank `GEMINI_API_KEY=` still reads as missing.
        let opt = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            server: ServerConfig {
                host: var("HOST", "0.0.0.0"),
                port: var("PORT", "8787")
                    .parse()
                    .context("Failed to parse PORT")?,
            },
            gemini: GeminiConfig {
                api_key: opt("GEMINI_API_KEY"),
                model: var("GEMINI_MODEL", "gemini-2.5-flash"),
                api_base: var("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
                temperature: var("GEMINI_TEMPERATURE", "0.5")
                    .parse()
                    .context("Failed to parse GEMINI_TEMPERATURE")?,
            },
            cloudflare: CloudflareConfig {
                account_id: opt("CLOUDFLARE_ACCOUNT_ID"),
                r2_endpoint: opt("CLOUDFLARE_R2_ENDPOINT"),
                r2_access_key_id: opt("CLOUDFLARE_R2_ACCESS_KEY_ID"),
                r2_secret_access_key: opt("CLOUDFLARE_R2_SECRET_ACCESS_KEY"),
                r2_bucket_snapshots: var("R2_BUCKET", "voice-color-snapshots"),
                r2_public_base_url: var("R2_PUBLIC_BASE_URL", DEFAULT_R2_PUBLIC_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            performance: PerformanceConfig {
                max_upload_size_mb: var("MAX_UPLOAD_SIZE_MB", "25")
                    .parse()
                    .context("Failed to parse MAX_UPLOAD_SIZE_MB")?,
            },
        };

        if config.performance.max_upload_size_mb == 0 {
            anyhow::bail!("MAX_UPLOAD_SIZE_MB must be greater than zero");
        }

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.performance.max_upload_size_mb * 1024 * 1024
    }

    /// True when all three R2 credentials are present.
    pub fn has_r2_credentials(&self) -> bool {
        self.cloudflare.account_id.is_some()
            && self.cloudflare.r2_access_key_id.is_some()
            && self.cloudflare.r2_secret_access_key.is_some()
    }
}
