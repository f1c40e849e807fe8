/// Canonical wallpaper descriptor.
///
/// `width`/`height` are authoritative only once the pipeline has measured the
/// actual bytes; provider-reported values are advisory and may be zero.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wallpaper {
    /// Unique within a provider's namespace; used as the cache and dedup key.
    pub id: String,
    pub urls: WallpaperUrls,
    /// Name of the provider that produced this descriptor.
    pub source: String,
    pub author: String,
    pub tags: Vec<String>,
    pub width: u32,
    pub height: u32,
}

/// Size-class locators for a wallpaper.
///
/// At least one of `full`/`regular` is expected to resolve to retrievable
/// bytes. Locators are either HTTP(S) URLs or `file://` references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallpaperUrls {
    pub raw: Option<String>,
    pub full: Option<String>,
    pub regular: Option<String>,
    pub small: Option<String>,
}

impl WallpaperUrls {
    /// All size classes pointing at the same locator (local files).
    pub fn uniform(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        Self {
            raw: Some(locator.clone()),
            full: Some(locator.clone()),
            regular: Some(locator.clone()),
            small: Some(locator),
        }
    }

    /// Best locator for a full-screen background: prefer the largest size
    /// class that is present.
    pub fn best(&self) -> Option<&str> {
        self.full
            .as_deref()
            .or(self.regular.as_deref())
            .or(self.raw.as_deref())
            .or(self.small.as_deref())
    }
}
