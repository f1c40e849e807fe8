//! Content-addressed image cache.
//!
//! One file per wallpaper id, no separate manifest: existence of
//! `<root>/<encoded-id>.jpg` is membership. Ids may contain path separators
//! (the local provider uses absolute paths as ids), so the file name is the
//! percent-encoded id, which keeps the id -> name mapping injective and
//! filesystem safe.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{Result, WallpaperError};

/// File-backed store of previously validated wallpaper images, keyed by id.
#[derive(Clone, Debug)]
pub struct ImageCache {
    root: PathBuf,
}

/// Per-file result of a [`ImageCache::reconcile`] sweep.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// File names removed from the cache directory.
    pub removed: Vec<String>,
    /// File names that could not be removed, with the reason. These are
    /// warnings only; they never fail the sweep.
    pub failed: Vec<(String, std::io::Error)>,
}

/// Deterministic, injective file name for a wallpaper id.
pub fn file_name_for_id(id: &str) -> String {
    format!("{}.jpg", urlencoding::encode(id))
}

impl ImageCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical on-disk location for an id, whether or not it exists yet.
    pub fn entry_path(&self, id: &str) -> PathBuf {
        self.root.join(file_name_for_id(id))
    }

    /// Creates the cache directory (and parents) if absent. Idempotent.
    pub async fn ensure_ready(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            WallpaperError::StorageUnavailable {
                path: self.root.clone(),
                source: err,
            }
        })
    }

    /// Returns the cached path for `id`, or `None` if there is no entry.
    /// A pure existence check; never an error.
    pub async fn lookup(&self, id: &str) -> Option<PathBuf> {
        let path = self.entry_path(id);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Some(path)
        } else {
            None
        }
    }

    /// Copies `source` into the cache under `id` and returns the entry path.
    ///
    /// A no-op when `source` already is the entry path. Overwrites silently
    /// otherwise: content for a given id is immutable per source contract, so
    /// last-write-wins is safe.
    pub async fn put(&self, id: &str, source: &Path) -> Result<PathBuf> {
        self.ensure_ready().await?;
        let destination = self.entry_path(id);

        if source == destination {
            return Ok(destination);
        }

        tokio::fs::copy(source, &destination).await.map_err(|err| {
            WallpaperError::CopyFailed {
                from: source.to_path_buf(),
                source: err,
            }
        })?;

        debug!(id, path = %destination.display(), "cached wallpaper image");
        Ok(destination)
    }

    /// Deletes every cached file whose id is not in `valid_ids`.
    ///
    /// Deletions fan out independently; a failure to delete one file is
    /// reported in the returned [`ReconcileReport`] and logged, but never
    /// aborts the sweep or escalates. No-op if the cache directory does not
    /// exist. This is the sole mechanism bounding cache growth: validity is
    /// owner-declared (e.g. ids referenced by favorites, bookmarks, history).
    pub async fn reconcile(&self, valid_ids: &HashSet<String>) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(err) => return Err(err.into()),
        };

        let valid_names: HashSet<String> =
            valid_ids.iter().map(|id| file_name_for_id(id)).collect();

        let mut stale = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !valid_names.contains(&name) {
                stale.push((name, entry.path()));
            }
        }

        let deletions = stale.into_iter().map(|(name, path)| async move {
            let outcome = tokio::fs::remove_file(&path).await;
            (name, outcome)
        });

        for (name, outcome) in join_all(deletions).await {
            match outcome {
                Ok(()) => report.removed.push(name),
                Err(err) => {
                    warn!(file = %name, error = %err, "failed to delete stale cache file");
                    report.failed.push((name, err));
                }
            }
        }

        debug!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            "cache reconciliation finished"
        );
        Ok(report)
    }
}
