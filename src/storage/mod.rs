pub mod r2;

use async_trait::async_trait;

use crate::errors::Result;

pub use r2::R2Client;

/// Write-only object store holding share snapshots
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` with the given content type.
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Public URL under which `key` is served once stored.
    fn public_url(&self, key: &str) -> String;
}

/// Random object key for a PNG snapshot.
pub fn snapshot_key() -> String {
    format!("{}.png", uuid::Uuid::new_v4())
}

/// Join a public base URL and an object key with exactly one slash.
pub fn join_public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
