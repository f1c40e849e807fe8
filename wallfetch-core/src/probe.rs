//! Resolution probe seam.
//!
//! Probes report the display's pixel dimensions when they can. "Unknown" is
//! `Ok(None)`, never an error; errors are reserved for unexpected faults and
//! are demoted to "no constraint" by the pipeline.

use async_trait::async_trait;
use wallfetch_model::DisplayResolution;

use crate::error::Result;

#[async_trait]
pub trait ResolutionProbe: Send + Sync {
    async fn probe(&self) -> Result<Option<DisplayResolution>>;
}

/// Probe that always reports an unknown resolution. With it, the pipeline
/// accepts the first structurally decodable candidate.
#[derive(Debug, Default, Clone)]
pub struct UnknownResolution;

#[async_trait]
impl ResolutionProbe for UnknownResolution {
    async fn probe(&self) -> Result<Option<DisplayResolution>> {
        Ok(None)
    }
}

/// Probe with a caller-supplied resolution, e.g. from a CLI flag.
#[derive(Debug, Clone, Copy)]
pub struct FixedResolution(pub DisplayResolution);

#[async_trait]
impl ResolutionProbe for FixedResolution {
    async fn probe(&self) -> Result<Option<DisplayResolution>> {
        Ok(Some(self.0))
    }
}
