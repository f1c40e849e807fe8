//! Local directory provider: picks a random image file from a folder.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use tracing::warn;
use url::Url;
use wallfetch_model::{FetchQuery, Wallpaper, WallpaperUrls};

use crate::error::{Result, WallpaperError};
use crate::sources::SourceProvider;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Serves wallpapers from a local folder. The query text is the folder path;
/// the absolute file path doubles as the wallpaper id.
#[derive(Debug, Default, Clone)]
pub struct LocalSource;

impl LocalSource {
    pub const NAME: &'static str = "local";

    pub fn new() -> Self {
        Self
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Best-effort dimension probe. Header parse failures are demoted to an
/// explicit 0x0 "unknown" with a warning; the pipeline re-measures after
/// fetching anyway.
fn probe_dimensions(path: &Path) -> (u32, u32) {
    match image::image_dimensions(path) {
        Ok((width, height)) => (width, height),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read image dimensions");
            (0, 0)
        }
    }
}

#[async_trait]
impl SourceProvider for LocalSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(&self, query: &FetchQuery) -> Result<Wallpaper> {
        let folder = PathBuf::from(query.query.trim());
        if folder.as_os_str().is_empty() {
            return Err(WallpaperError::Provider(
                "local source requires a folder path as the query".into(),
            ));
        }

        // Absolute paths double as stable ids and valid file URLs.
        let folder = tokio::fs::canonicalize(&folder).await.map_err(|err| {
            WallpaperError::Provider(format!("cannot resolve folder {}: {err}", folder.display()))
        })?;

        let mut entries = tokio::fs::read_dir(&folder).await.map_err(|err| {
            WallpaperError::Provider(format!("cannot read folder {}: {err}", folder.display()))
        })?;

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_image_file(&path) {
                images.push(path);
            }
        }

        let chosen = images.choose(&mut rand::rng()).cloned().ok_or_else(|| {
            WallpaperError::Provider(format!("no images found in {}", folder.display()))
        })?;

        let (width, height) = probe_dimensions(&chosen);

        let locator = Url::from_file_path(&chosen)
            .map_err(|_| {
                WallpaperError::Provider(format!(
                    "cannot build file URL for {}",
                    chosen.display()
                ))
            })?
            .to_string();

        let tag = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| Self::NAME.to_string());

        Ok(Wallpaper {
            id: chosen.to_string_lossy().into_owned(),
            urls: WallpaperUrls::uniform(locator),
            source: Self::NAME.to_string(),
            author: "Unknown".to_string(),
            tags: vec![tag],
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_a_random_image_from_the_folder() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.PNG", "notes.txt"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let query = FetchQuery::new("local", dir.path().to_string_lossy());
        let wallpaper = LocalSource::new().resolve(&query).await.unwrap();

        assert!(wallpaper.id.ends_with("a.jpg") || wallpaper.id.ends_with("b.PNG"));
        assert_eq!(wallpaper.source, "local");
        assert_eq!(wallpaper.author, "Unknown");
        let best = wallpaper.urls.best().unwrap();
        assert!(best.starts_with("file://"), "got {best}");
        // Unreadable headers degrade to the unknown sentinel, not an error.
        assert_eq!((wallpaper.width, wallpaper.height), (0, 0));
    }

    #[tokio::test]
    async fn empty_folder_is_a_provider_error() {
        let dir = tempfile::tempdir().unwrap();
        let query = FetchQuery::new("local", dir.path().to_string_lossy());
        let err = LocalSource::new().resolve(&query).await.unwrap_err();
        assert!(matches!(err, WallpaperError::Provider(_)));
    }

    #[tokio::test]
    async fn missing_query_is_a_provider_error() {
        let query = FetchQuery::new("local", "");
        let err = LocalSource::new().resolve(&query).await.unwrap_err();
        assert!(matches!(err, WallpaperError::Provider(_)));
    }
}
