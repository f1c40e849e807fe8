//! System wallpaper setter seam.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, WallpaperError};

#[async_trait]
pub trait WallpaperSetter: Send + Sync {
    /// Installs the image at `path` as the active desktop background.
    /// Platform-specific; failures are surfaced as-is.
    async fn apply(&self, path: &Path) -> Result<()>;
}

/// GNOME backend via `gsettings`, the stable CLI for dconf-backed settings.
#[derive(Debug, Default, Clone)]
pub struct GsettingsSetter;

impl GsettingsSetter {
    pub fn new() -> Self {
        Self
    }

    async fn gsettings_set(key: &str, value: &str) -> Result<std::process::ExitStatus> {
        tokio::process::Command::new("gsettings")
            .args(["set", "org.gnome.desktop.background", key, value])
            .status()
            .await
            .map_err(|err| WallpaperError::Setter(format!("failed to run gsettings: {err}")))
    }
}

#[async_trait]
impl WallpaperSetter for GsettingsSetter {
    async fn apply(&self, path: &Path) -> Result<()> {
        let uri = format!("file://{}", path.display());
        debug!(%uri, "setting GNOME wallpaper");

        let status = Self::gsettings_set("picture-uri", &uri).await?;
        if !status.success() {
            return Err(WallpaperError::Setter(format!(
                "gsettings exited with {status} for picture-uri"
            )));
        }

        // Best-effort: the dark variant exists on GNOME 42+.
        let _ = Self::gsettings_set("picture-uri-dark", &uri).await;

        Ok(())
    }
}
