//! Core data model definitions shared across wallfetch crates.
#![allow(missing_docs)]

pub mod query;
pub mod resolution;
pub mod wallpaper;

// Intentionally curated re-exports for downstream consumers.
pub use query::FetchQuery;
pub use resolution::DisplayResolution;
pub use wallpaper::{Wallpaper, WallpaperUrls};
