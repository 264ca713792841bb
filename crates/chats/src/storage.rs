//! Blob storage seam for attachment bytes.
//!
//! The chat core only records metadata; actual byte persistence goes through
//! [`BlobStore`] so the storage medium stays swappable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

/// Narrow interface to wherever attachment bytes live.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under `name` and return a locator for later retrieval.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Size in bytes of a previously saved blob.
    async fn size(&self, locator: &str) -> Result<i64>;
}

/// Filesystem-backed blob store writing under a single root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create upload directory {}", self.root.display()))?;

        let path = self.root.join(name);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write blob {}", path.display()))?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn size(&self, locator: &str) -> Result<i64> {
        let metadata = fs::metadata(locator)
            .await
            .with_context(|| format!("failed to stat blob {locator}"))?;
        Ok(metadata.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_then_size_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(temp_dir.path().join("uploads"));

        let locator = store.save("greeting.txt", b"hello there").await.unwrap();
        assert!(locator.ends_with("greeting.txt"));
        assert_eq!(store.size(&locator).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn size_of_missing_blob_errors() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(temp_dir.path());

        let missing = temp_dir.path().join("nope.bin");
        assert!(store.size(&missing.to_string_lossy()).await.is_err());
    }
}
