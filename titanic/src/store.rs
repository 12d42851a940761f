//! The on-disk layout: one `.req` and optionally one `.rep` file per UUID,
//! under a single store directory created lazily on first use.

use std::path::{Path, PathBuf};

use titanic_core::message::Message;
use titanic_core::wire;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn request_path(&self, uuid: &str) -> PathBuf {
        self.dir.join(format!("{uuid}.req"))
    }

    #[must_use]
    pub fn reply_path(&self, uuid: &str) -> PathBuf {
        self.dir.join(format!("{uuid}.rep"))
    }

    #[must_use]
    pub fn queue_path(&self) -> PathBuf {
        self.dir.join("queue")
    }

    /// Idempotent directory creation; safe to call before every write.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub async fn save_message(&self, path: &Path, msg: &Message) -> Result<()> {
        let bytes = wire::encode(msg);
        tokio::fs::write(path, &bytes).await?;
        Ok(())
    }

    pub async fn load_message(&self, path: &Path) -> Result<Message> {
        let bytes = tokio::fs::read(path).await?;
        wire::decode(&bytes).map_err(Error::from)
    }

    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    /// Delete `path` if present. Never errors on a missing file.
    pub async fn delete(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
