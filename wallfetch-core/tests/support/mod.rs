//! Stub collaborators for pipeline integration tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;
use wallfetch_core::{
    AcquisitionPipeline, Downloader, HistoryStore, ImageCache, Result, SourceProvider,
    SourceRegistry, WallpaperError, WallpaperSetter,
};
use wallfetch_core::probe::ResolutionProbe;
use wallfetch_model::{DisplayResolution, FetchQuery, Wallpaper, WallpaperUrls};

pub const STUB_SOURCE: &str = "stub";

/// Writes a real, decodable JPEG with the given dimensions.
pub fn write_image(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::new(width, height);
    img.save(path).expect("failed to write test image");
}

/// A wallpaper whose only locator points at a local file.
pub fn file_wallpaper(id: &str, path: &Path) -> Wallpaper {
    let locator = Url::from_file_path(path).unwrap().to_string();
    Wallpaper {
        id: id.to_string(),
        urls: WallpaperUrls::uniform(locator),
        source: STUB_SOURCE.to_string(),
        author: "Unknown".to_string(),
        tags: vec![],
        width: 0,
        height: 0,
    }
}

/// A wallpaper with no locators at all (only usable via a cache hit).
pub fn urlless_wallpaper(id: &str) -> Wallpaper {
    Wallpaper {
        id: id.to_string(),
        urls: WallpaperUrls::default(),
        source: STUB_SOURCE.to_string(),
        author: "Unknown".to_string(),
        tags: vec![],
        width: 0,
        height: 0,
    }
}

/// Provider that serves a scripted sequence of candidates.
#[derive(Debug)]
pub struct QueueSource {
    queue: Mutex<VecDeque<Wallpaper>>,
}

impl QueueSource {
    pub fn new(candidates: impl IntoIterator<Item = Wallpaper>) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(candidates.into_iter().collect()),
        })
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[async_trait]
impl SourceProvider for QueueSource {
    fn name(&self) -> &str {
        STUB_SOURCE
    }

    async fn resolve(&self, _query: &FetchQuery) -> Result<Wallpaper> {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| WallpaperError::Provider("stub queue exhausted".into()))
    }
}

/// Downloader that must never be reached (all test locators are `file://`
/// or cache hits).
#[derive(Debug, Default)]
pub struct NoDownloader;

#[async_trait]
impl Downloader for NoDownloader {
    async fn download(&self, url: &str, _dest: &Path) -> Result<()> {
        Err(WallpaperError::Provider(format!(
            "unexpected download of {url}"
        )))
    }
}

/// Probe returning a scripted result, including simulated faults.
#[derive(Debug)]
pub struct ScriptedProbe(pub Result<Option<DisplayResolution>>);

#[async_trait]
impl ResolutionProbe for ScriptedProbe {
    async fn probe(&self) -> Result<Option<DisplayResolution>> {
        match &self.0 {
            Ok(resolution) => Ok(*resolution),
            Err(_) => Err(WallpaperError::ResolutionDetection("scripted fault".into())),
        }
    }
}

/// Records every path it is asked to apply.
#[derive(Debug, Default)]
pub struct RecordingSetter {
    pub applied: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl WallpaperSetter for RecordingSetter {
    async fn apply(&self, path: &Path) -> Result<()> {
        self.applied.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// In-memory history store, optionally seeded with a current wallpaper.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    pub entries: Mutex<Vec<Wallpaper>>,
}

impl MemoryHistory {
    pub fn seeded(current: Wallpaper) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(vec![current]),
        })
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append(&self, wallpaper: &Wallpaper) -> Result<()> {
        self.entries.lock().unwrap().push(wallpaper.clone());
        Ok(())
    }

    async fn current(&self) -> Result<Option<Wallpaper>> {
        Ok(self.entries.lock().unwrap().last().cloned())
    }

    async fn all(&self) -> Result<Vec<Wallpaper>> {
        Ok(self.entries.lock().unwrap().clone())
    }
}

/// Everything a pipeline test needs to inspect afterwards.
#[derive(Debug)]
pub struct Harness {
    pub pipeline: AcquisitionPipeline,
    pub source: Arc<QueueSource>,
    pub setter: Arc<RecordingSetter>,
    pub history: Arc<MemoryHistory>,
    pub canonical: PathBuf,
    pub cache_root: PathBuf,
}

pub fn harness(
    data_dir: &Path,
    candidates: Vec<Wallpaper>,
    probe: ScriptedProbe,
    history: Arc<MemoryHistory>,
) -> Harness {
    let source = QueueSource::new(candidates);
    let setter = Arc::new(RecordingSetter::default());
    let cache_root = data_dir.join("cache");
    let canonical = data_dir.join("current.jpg");

    let mut sources = SourceRegistry::new();
    sources.register(source.clone());

    let pipeline = AcquisitionPipeline::new(
        sources,
        ImageCache::new(cache_root.clone()),
        Arc::new(NoDownloader),
        Arc::new(probe),
        setter.clone(),
        history.clone(),
        canonical.clone(),
    );

    Harness {
        pipeline,
        source,
        setter,
        history,
        canonical,
        cache_root,
    }
}
