//! Source provider seam.
//!
//! Providers turn a [`FetchQuery`] into one candidate [`Wallpaper`] per call.
//! Candidate dimensions are advisory only; the pipeline measures the real
//! ones after fetching the bytes.

pub mod local;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use wallfetch_model::{FetchQuery, Wallpaper};

use crate::error::Result;

pub use local::LocalSource;

/// A pluggable wallpaper source (remote search API, curated feed, local
/// directory scan, ...).
#[async_trait]
pub trait SourceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Yields one candidate for the query. Must return a structurally valid
    /// descriptor with at least one usable locator.
    async fn resolve(&self, query: &FetchQuery) -> Result<Wallpaper>;
}

/// Name -> provider lookup used by the pipeline to dispatch a query.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    providers: HashMap<String, Arc<dyn SourceProvider>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn SourceProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
