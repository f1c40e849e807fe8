use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WallpaperError {
    #[error("cache storage unavailable at {path:?}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy {from:?} into cache: {source}")]
    CopyFailed {
        from: PathBuf,
        source: std::io::Error,
    },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not read image dimensions from {path:?}: {source}")]
    DimensionParse {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Unexpected probe fault. Probe implementations return this for real
    /// failures (e.g. a display server call erroring out); "resolution
    /// unknown" is `Ok(None)`, not an error. The pipeline demotes this to
    /// "no display constraint" with a warning.
    #[error("display resolution detection failed: {0}")]
    ResolutionDetection(String),

    #[error("wallpaper {id} not found in {pool}")]
    NotInPool { id: String, pool: String },

    #[error("wallpaper {0} has no usable URL and is not cached")]
    MissingUrl(String),

    #[error("no suitable wallpaper found after {attempts} attempts")]
    NoSuitableWallpaper { attempts: u32 },

    #[error("failed to set wallpaper: {0}")]
    Setter(String),

    #[error("history store error: {0}")]
    History(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WallpaperError>;
