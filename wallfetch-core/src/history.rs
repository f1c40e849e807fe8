//! History / current-wallpaper store seam.
//!
//! The pipeline only needs two operations: append on a successful install,
//! and the currently installed wallpaper for the consecutive-repeat check.

use std::path::PathBuf;

use async_trait::async_trait;
use wallfetch_model::Wallpaper;

use crate::error::{Result, WallpaperError};

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Records a successfully installed wallpaper. Ownership of the
    /// descriptor effectively transfers to the store.
    async fn append(&self, wallpaper: &Wallpaper) -> Result<()>;

    /// The most recently installed wallpaper, if any.
    async fn current(&self) -> Result<Option<Wallpaper>>;

    /// Everything ever installed, oldest first.
    async fn all(&self) -> Result<Vec<Wallpaper>>;
}

/// JSON-file-backed history, newest entry last. Writes land at a temp path
/// and are renamed into place so readers never observe a partial file.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_entries(&self) -> Result<Vec<Wallpaper>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_entries(&self, entries: &[Wallpaper]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| WallpaperError::History(format!("failed to persist history: {err}")))
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn append(&self, wallpaper: &Wallpaper) -> Result<()> {
        let mut entries = self.read_entries().await?;
        entries.push(wallpaper.clone());
        self.write_entries(&entries).await
    }

    async fn current(&self) -> Result<Option<Wallpaper>> {
        Ok(self.read_entries().await?.pop())
    }

    async fn all(&self) -> Result<Vec<Wallpaper>> {
        self.read_entries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallfetch_model::WallpaperUrls;

    fn wallpaper(id: &str) -> Wallpaper {
        Wallpaper {
            id: id.to_string(),
            urls: WallpaperUrls::uniform(format!("file:///tmp/{id}.jpg")),
            source: "test".into(),
            author: "Unknown".into(),
            tags: vec![],
            width: 0,
            height: 0,
        }
    }

    #[tokio::test]
    async fn append_then_current_returns_last_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        assert!(store.current().await.unwrap().is_none());

        store.append(&wallpaper("first")).await.unwrap();
        store.append(&wallpaper("second")).await.unwrap();

        let current = store.current().await.unwrap().unwrap();
        assert_eq!(current.id, "second");

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "first");
    }
}
