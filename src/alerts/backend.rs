//! Alert persistence backends

use super::PriceAlert;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Where the alert set is checkpointed
///
/// `save` always receives the whole set; backends overwrite, never append.
#[async_trait]
pub trait AlertBackend: Send + Sync {
    async fn load(&self) -> Result<Vec<PriceAlert>>;
    async fn save(&self, alerts: &[PriceAlert]) -> Result<()>;
}

/// JSON array on disk
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }
}

#[async_trait]
impl AlertBackend for JsonFileBackend {
    /// A file that does not parse is moved aside and the set starts empty
    async fn load(&self) -> Result<Vec<PriceAlert>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(alerts) => Ok(alerts),
                Err(e) => {
                    let aside = self.corrupt_path();
                    tracing::warn!(
                        path = %self.path.display(),
                        moved_to = %aside.display(),
                        error = %e,
                        "Alert file is corrupt, starting empty"
                    );
                    tokio::fs::rename(&self.path, &aside).await?;
                    Ok(Vec::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No alert file yet, starting empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, alerts: &[PriceAlert]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(alerts)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// In-process backend for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryBackend {
    alerts: Mutex<Vec<PriceAlert>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alerts(alerts: Vec<PriceAlert>) -> Self {
        Self {
            alerts: Mutex::new(alerts),
        }
    }
}

#[async_trait]
impl AlertBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<PriceAlert>> {
        Ok(self.alerts.lock().await.clone())
    }

    async fn save(&self, alerts: &[PriceAlert]) -> Result<()> {
        *self.alerts.lock().await = alerts.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Direction;
    use alloy::primitives::Address;
    use tempfile::tempdir;

    fn alert(user_id: i64, symbol: &str) -> PriceAlert {
        PriceAlert {
            user_id,
            token_symbol: symbol.to_string(),
            threshold: 0.5,
            direction: Direction::Below,
            chain_id: 8453,
            token_address: Address::repeat_byte(0x0d),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("alerts.json"));
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_uses_camel_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("alerts.json");
        let backend = JsonFileBackend::new(&path);

        backend.save(&[alert(7, "DEGEN")]).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["userId"], 7);
        assert_eq!(raw[0]["tokenSymbol"], "DEGEN");
        assert_eq!(raw[0]["direction"], "below");
        assert_eq!(raw[0]["chainId"], 8453);
        assert!(raw[0].get("tokenAddress").is_some());
    }

    #[tokio::test]
    async fn test_truncated_file_is_moved_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(&path, "[\n  {\n    \"userId\": 7,\n    \"tokenSymbol\": \"DEG").unwrap();

        let backend = JsonFileBackend::new(&path);
        assert!(backend.load().await.unwrap().is_empty());
        assert!(!path.exists());
        assert!(dir.path().join("alerts.json.corrupt").exists());

        // Next save starts a fresh file
        backend.save(&[alert(7, "DEGEN")]).await.unwrap();
        assert_eq!(backend.load().await.unwrap().len(), 1);
    }
}
