//! Acquisition pipeline: retry / validate / publish state machine.
//!
//! One invocation turns a [`FetchQuery`] into exactly one validated,
//! installed wallpaper, or fails after [`MAX_ATTEMPTS`] candidates. Attempts
//! are strictly sequential; invocations are serialized by an internal
//! single-flight guard so a manual fetch cannot race a scheduled one on the
//! canonical path.

pub mod attempt;

use std::any::type_name_of_val;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rand::seq::IndexedRandom;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use wallfetch_model::{FetchQuery, Wallpaper};

use crate::cache::{ImageCache, file_name_for_id};
use crate::download::Downloader;
use crate::error::{Result, WallpaperError};
use crate::history::HistoryStore;
use crate::probe::ResolutionProbe;
use crate::setter::WallpaperSetter;
use crate::sources::SourceRegistry;

use attempt::{AttemptOutcome, AttemptStep};
pub use attempt::{MAX_ATTEMPTS, RESOLUTION_MARGIN, RejectReason, validate};

/// Pool selector for [`AcquisitionPipeline::install_random`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomMode {
    Favorites,
    History,
    Bookmarks,
    /// Union of all pools.
    All,
}

impl RandomMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RandomMode::Favorites => "favorites",
            RandomMode::History => "history",
            RandomMode::Bookmarks => "bookmarks",
            RandomMode::All => "all",
        }
    }
}

/// Caller-supplied candidate pools for random selection. The pipeline does
/// not own favorites/bookmarks persistence; it only selects from what it is
/// handed.
#[derive(Debug, Clone, Default)]
pub struct CandidatePools {
    pub favorites: Vec<Wallpaper>,
    pub history: Vec<Wallpaper>,
    pub bookmarks: Vec<Wallpaper>,
}

impl CandidatePools {
    fn select(&self, mode: RandomMode) -> Vec<Wallpaper> {
        let pools: Vec<&[Wallpaper]> = match mode {
            RandomMode::Favorites => vec![&self.favorites],
            RandomMode::History => vec![&self.history],
            RandomMode::Bookmarks => vec![&self.bookmarks],
            RandomMode::All => vec![&self.favorites, &self.history, &self.bookmarks],
        };
        dedup_by_id(pools.into_iter().flatten())
    }
}

/// First occurrence wins; order preserved.
fn dedup_by_id<'a>(candidates: impl Iterator<Item = &'a Wallpaper>) -> Vec<Wallpaper> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.id.clone()) {
            unique.push(candidate.clone());
        }
    }
    unique
}

pub struct AcquisitionPipeline {
    sources: SourceRegistry,
    cache: ImageCache,
    downloader: Arc<dyn Downloader>,
    probe: Arc<dyn ResolutionProbe>,
    setter: Arc<dyn WallpaperSetter>,
    history: Arc<dyn HistoryStore>,
    /// Single well-known location of "the currently installed image".
    canonical_path: PathBuf,
    /// Serializes whole invocations; attempts within one invocation are
    /// already sequential.
    flight: Mutex<()>,
}

impl fmt::Debug for AcquisitionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquisitionPipeline")
            .field("sources", &self.sources)
            .field("cache_root", &self.cache.root())
            .field("downloader", &type_name_of_val(self.downloader.as_ref()))
            .field("probe", &type_name_of_val(self.probe.as_ref()))
            .field("setter", &type_name_of_val(self.setter.as_ref()))
            .field("history", &type_name_of_val(self.history.as_ref()))
            .field("canonical_path", &self.canonical_path)
            .finish()
    }
}

impl AcquisitionPipeline {
    pub fn new(
        sources: SourceRegistry,
        cache: ImageCache,
        downloader: Arc<dyn Downloader>,
        probe: Arc<dyn ResolutionProbe>,
        setter: Arc<dyn WallpaperSetter>,
        history: Arc<dyn HistoryStore>,
        canonical_path: PathBuf,
    ) -> Self {
        Self {
            sources,
            cache,
            downloader,
            probe,
            setter,
            history,
            canonical_path,
            flight: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Main entry point: resolve candidates until one passes validation,
    /// publish it, cache it, set it, record it.
    ///
    /// Fails with [`WallpaperError::NoSuitableWallpaper`] once
    /// [`MAX_ATTEMPTS`] candidates have been consumed; per-attempt failures
    /// are retry triggers, not errors to the caller.
    pub async fn acquire_and_install(&self, query: &FetchQuery) -> Result<Wallpaper> {
        let _flight = self.flight.lock().await;

        let provider = self.sources.get(&query.source).ok_or_else(|| {
            WallpaperError::Provider(format!("unknown source {:?}", query.source))
        })?;

        // Avoid re-setting an unchanged background.
        let current_id = match self.history.current().await {
            Ok(current) => current.map(|w| w.id),
            Err(err) => {
                warn!(error = %err, "could not read current wallpaper; dedup check disabled");
                None
            }
        };

        // Detection faults are demoted to "no constraint": we then accept the
        // first structurally decodable candidate.
        let display = match self.probe.probe().await {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(error = %err, "display resolution detection failed; accepting first image");
                None
            }
        };
        if let Some(resolution) = display {
            debug!(%resolution, "display resolution detected");
        }

        for attempt in 1..=MAX_ATTEMPTS {
            debug!(attempt, max = MAX_ATTEMPTS, "searching for suitable wallpaper");

            match self
                .run_attempt(provider.as_ref(), query, current_id.as_deref(), display)
                .await
            {
                AttemptOutcome::Installed(wallpaper) => {
                    info!(
                        id = %wallpaper.id,
                        width = wallpaper.width,
                        height = wallpaper.height,
                        source = %wallpaper.source,
                        "found suitable wallpaper"
                    );
                    self.finish_install(&wallpaper).await?;
                    return Ok(wallpaper);
                }
                AttemptOutcome::SameAsCurrent => {
                    debug!(attempt, "candidate matches current wallpaper; retrying");
                }
                AttemptOutcome::Rejected { id, reason } => {
                    info!(%id, %reason, "candidate rejected; retrying");
                }
                AttemptOutcome::Failed(err) => {
                    warn!(attempt, error = %err, "attempt failed; retrying");
                }
            }
        }

        Err(WallpaperError::NoSuitableWallpaper {
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Walks one candidate through the attempt state machine.
    async fn run_attempt(
        &self,
        provider: &dyn crate::sources::SourceProvider,
        query: &FetchQuery,
        current_id: Option<&str>,
        display: Option<wallfetch_model::DisplayResolution>,
    ) -> AttemptOutcome {
        let mut step = AttemptStep::Resolve;

        loop {
            step = match step {
                AttemptStep::Resolve => match provider.resolve(query).await {
                    Ok(candidate) => {
                        if current_id == Some(candidate.id.as_str()) {
                            return AttemptOutcome::SameAsCurrent;
                        }
                        AttemptStep::Fetch { candidate }
                    }
                    Err(err) => return AttemptOutcome::Failed(err),
                },

                AttemptStep::Fetch { candidate } => {
                    match self.fetch_to_temp(&candidate).await {
                        Ok(temp) => AttemptStep::Measure { candidate, temp },
                        Err(err) => return AttemptOutcome::Failed(err),
                    }
                }

                AttemptStep::Measure {
                    mut candidate,
                    temp,
                } => match image::image_dimensions(&temp) {
                    Ok((width, height)) => {
                        // Provider metadata is never trusted for validation.
                        candidate.width = width;
                        candidate.height = height;
                        AttemptStep::Validate { candidate, temp }
                    }
                    Err(err) => {
                        let failure = WallpaperError::DimensionParse {
                            path: temp.clone(),
                            source: err,
                        };
                        discard_temp(&temp).await;
                        return AttemptOutcome::Failed(failure);
                    }
                },

                AttemptStep::Validate { candidate, temp } => {
                    match validate(candidate.width, candidate.height, display) {
                        Ok(()) => AttemptStep::Publish { candidate, temp },
                        Err(reason) => {
                            discard_temp(&temp).await;
                            return AttemptOutcome::Rejected {
                                id: candidate.id,
                                reason,
                            };
                        }
                    }
                }

                AttemptStep::Publish { candidate, temp } => {
                    // Atomic rename: no half-written file is ever visible at
                    // the canonical path. The data root may not exist yet on
                    // a first run.
                    if let Err(err) = self.ensure_canonical_parent().await {
                        discard_temp(&temp).await;
                        return AttemptOutcome::Failed(err);
                    }
                    if let Err(err) = tokio::fs::rename(&temp, &self.canonical_path).await {
                        discard_temp(&temp).await;
                        return AttemptOutcome::Failed(err.into());
                    }
                    match self.cache.put(&candidate.id, &self.canonical_path).await {
                        Ok(_) => return AttemptOutcome::Installed(candidate),
                        Err(err) => return AttemptOutcome::Failed(err),
                    }
                }
            };
        }
    }

    /// Materializes the candidate's bytes at a fresh temp path: cache hit,
    /// local copy, or network download.
    async fn fetch_to_temp(&self, candidate: &Wallpaper) -> Result<PathBuf> {
        let temp = temp_path(&candidate.id);

        if let Some(cached) = self.cache.lookup(&candidate.id).await {
            debug!(id = %candidate.id, "cache hit");
            if let Err(err) = tokio::fs::copy(&cached, &temp).await {
                discard_temp(&temp).await;
                return Err(err.into());
            }
            return Ok(temp);
        }

        let locator = candidate
            .urls
            .best()
            .ok_or_else(|| WallpaperError::MissingUrl(candidate.id.clone()))?;

        if let Err(err) = self.materialize_locator(locator, &temp).await {
            discard_temp(&temp).await;
            return Err(err);
        }
        Ok(temp)
    }

    /// Creates the directory holding the canonical path, if any. Idempotent.
    async fn ensure_canonical_parent(&self) -> Result<()> {
        if let Some(parent) = self.canonical_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Copies `file://` locators, downloads everything else.
    async fn materialize_locator(&self, locator: &str, dest: &Path) -> Result<()> {
        match Url::parse(locator) {
            Ok(url) if url.scheme() == "file" => {
                let local = url.to_file_path().map_err(|()| {
                    WallpaperError::Provider(format!("invalid file URL {locator:?}"))
                })?;
                tokio::fs::copy(&local, dest).await?;
                Ok(())
            }
            Ok(_) => self.downloader.download(locator, dest).await,
            Err(err) => Err(WallpaperError::Provider(format!(
                "unusable locator {locator:?}: {err}"
            ))),
        }
    }

    /// Post-success side effects, performed once per invocation.
    async fn finish_install(&self, wallpaper: &Wallpaper) -> Result<()> {
        // Prefer the cache path: it changes per image, which helps desktop
        // environments notice the switch. Canonical path is the fallback.
        let path = self
            .cache
            .lookup(&wallpaper.id)
            .await
            .unwrap_or_else(|| self.canonical_path.clone());

        info!(path = %path.display(), "setting wallpaper");
        self.setter.apply(&path).await?;
        self.history.append(wallpaper).await?;
        Ok(())
    }

    /// "Set this exact known wallpaper": no retry loop, no validation.
    ///
    /// Looks `id` up in `pool` (error if absent, with no side effects), uses
    /// the cache or downloads the best locator, mirrors the image to the
    /// canonical path, sets it and records history.
    pub async fn install_from_known(
        &self,
        id: &str,
        pool: &[Wallpaper],
        pool_name: &str,
    ) -> Result<()> {
        let _flight = self.flight.lock().await;

        let wallpaper = pool
            .iter()
            .find(|candidate| candidate.id == id)
            .cloned()
            .ok_or_else(|| WallpaperError::NotInPool {
                id: id.to_string(),
                pool: pool_name.to_string(),
            })?;

        let set_path = match self.cache.lookup(id).await {
            Some(cached) => {
                debug!(%id, "cache hit");
                cached
            }
            None => {
                let locator = wallpaper
                    .urls
                    .best()
                    .ok_or_else(|| WallpaperError::MissingUrl(id.to_string()))?;

                let temp = temp_path(id);
                if let Err(err) = self.materialize_locator(locator, &temp).await {
                    discard_temp(&temp).await;
                    return Err(err);
                }

                let cached = self.cache.put(id, &temp).await?;
                if temp != cached {
                    discard_temp(&temp).await;
                }
                cached
            }
        };

        // Keep current.jpg in sync for consumers that only know the
        // canonical path.
        self.ensure_canonical_parent().await?;
        tokio::fs::copy(&set_path, &self.canonical_path).await?;

        info!(%id, pool = %pool_name, path = %set_path.display(), "setting wallpaper");
        self.setter.apply(&set_path).await?;
        self.history.append(&wallpaper).await?;
        Ok(())
    }

    /// Picks a random, de-duplicated candidate from the selected pools and
    /// delegates to [`Self::install_from_known`]. Empty pools are a logged
    /// no-op, matching the interactive "nothing to pick from" flow.
    pub async fn install_random(&self, pools: &CandidatePools, mode: RandomMode) -> Result<()> {
        let pool = pools.select(mode);

        let Some(chosen) = pool.choose(&mut rand::rng()).cloned() else {
            info!(mode = %mode.as_str(), "no wallpapers available for random selection");
            return Ok(());
        };

        self.install_from_known(&chosen.id, &pool, mode.as_str())
            .await
    }
}

/// Private per-attempt temp location: unique via timestamp + id so concurrent
/// processes cannot collide, and disjoint from cache and canonical paths.
fn temp_path(id: &str) -> PathBuf {
    let stamp = Utc::now().timestamp_millis();
    std::env::temp_dir().join(format!("wallfetch-{stamp}-{}", file_name_for_id(id)))
}

/// Best-effort cleanup; failures are warnings so they never mask the
/// attempt's primary outcome.
async fn discard_temp(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await
        && err.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %err, "failed to delete temp file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallfetch_model::WallpaperUrls;

    fn wallpaper(id: &str) -> Wallpaper {
        Wallpaper {
            id: id.to_string(),
            urls: WallpaperUrls::default(),
            source: "test".into(),
            author: "Unknown".into(),
            tags: vec![],
            width: 0,
            height: 0,
        }
    }

    #[test]
    fn pools_union_dedups_by_id_keeping_first() {
        let pools = CandidatePools {
            favorites: vec![wallpaper("a"), wallpaper("b")],
            history: vec![wallpaper("b"), wallpaper("c")],
            bookmarks: vec![wallpaper("a")],
        };

        let union = pools.select(RandomMode::All);
        let ids: Vec<&str> = union.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let history_only = pools.select(RandomMode::History);
        let ids: Vec<&str> = history_only.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn temp_paths_stay_out_of_data_dirs() {
        let path = temp_path("some/id");
        assert!(path.starts_with(std::env::temp_dir()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("wallfetch-"));
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains('/'));
    }
}
