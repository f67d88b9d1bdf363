//! File-backed configuration channel.
//!
//! One pretty-printed JSON file per key. Writes go to a temporary file that is
//! renamed over the target, so readers never observe half-written documents.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::channel::types::{ChannelResult, ConfigurationReadChannel, ConfigurationWriteChannel};

#[derive(Debug, Clone)]
pub struct FileChannel {
    directory: PathBuf,
}

impl FileChannel {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File holding the document for a key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.directory.join(format!("{}.json", name))
    }

    /// Blocking read, for use from non-async contexts such as watcher callbacks.
    pub fn read_path(path: &Path) -> ChannelResult<Option<Value>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ConfigurationReadChannel for FileChannel {
    async fn get(&self, key: &str) -> ChannelResult<Option<Value>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ConfigurationWriteChannel for FileChannel {
    async fn publish(&self, key: &str, value: &Value) -> ChannelResult<()> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        let content = serde_json::to_string_pretty(value)?;

        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, path = ?path, "Wrote configuration file");
        Ok(())
    }
}
