//! # wallfetch-core
//!
//! Wallpaper acquisition and caching pipeline.
//!
//! The centerpiece is [`AcquisitionPipeline`]: a bounded-retry state machine
//! that resolves candidates from a pluggable source, fetches their bytes
//! (cache-first), measures the true pixel dimensions, validates them against
//! the display, atomically publishes the winner to the canonical path and
//! records it in history. Alongside it sits [`ImageCache`], a
//! content-addressed file store reconciled against an owner-declared valid
//! set.
//!
//! Collaborators (providers, downloader, resolution probe, wallpaper setter,
//! history store) are trait seams; production implementations live next to
//! each trait.

pub mod cache;
pub mod download;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod probe;
pub mod setter;
pub mod sources;

pub use cache::{ImageCache, ReconcileReport, file_name_for_id};
pub use download::{Downloader, HttpDownloader};
pub use error::{Result, WallpaperError};
pub use history::{HistoryStore, JsonHistoryStore};
pub use pipeline::{
    AcquisitionPipeline, CandidatePools, MAX_ATTEMPTS, RESOLUTION_MARGIN, RandomMode,
    RejectReason,
};
pub use probe::{FixedResolution, ResolutionProbe, UnknownResolution};
pub use setter::{GsettingsSetter, WallpaperSetter};
pub use sources::{LocalSource, SourceProvider, SourceRegistry};
