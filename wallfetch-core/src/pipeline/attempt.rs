//! Per-attempt state machine vocabulary and the pure validation decision.
//!
//! The I/O driver in the parent module walks [`AttemptStep`]s; the accept /
//! reject decision itself is a pure function so it can be tested without any
//! filesystem or network.

use std::fmt;
use std::path::PathBuf;

use wallfetch_model::{DisplayResolution, Wallpaper};

use crate::error::WallpaperError;

/// Bound on candidates examined per invocation.
pub const MAX_ATTEMPTS: u32 = 10;

/// A candidate must be at least this fraction of the display's width and
/// height in each dimension.
pub const RESOLUTION_MARGIN: f64 = 0.5;

/// The stages one attempt moves through. Each step carries the data the next
/// stage needs; terminal outcomes are expressed as [`AttemptOutcome`].
#[derive(Debug)]
pub(crate) enum AttemptStep {
    Resolve,
    Fetch { candidate: Wallpaper },
    Measure { candidate: Wallpaper, temp: PathBuf },
    Validate { candidate: Wallpaper, temp: PathBuf },
    Publish { candidate: Wallpaper, temp: PathBuf },
}

/// How one attempt ended. Everything but `Installed` sends the driver around
/// the retry loop.
#[derive(Debug)]
pub(crate) enum AttemptOutcome {
    /// Candidate validated, published to the canonical path and cached.
    Installed(Wallpaper),
    /// Candidate id matches the currently installed wallpaper.
    SameAsCurrent,
    /// Structurally fine, but failed the display constraints.
    Rejected { id: String, reason: RejectReason },
    /// Provider / transport / parse / storage error.
    Failed(WallpaperError),
}

/// Expected control-flow outcome of validation, not a true error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `width < height`; only landscape images are accepted when a display
    /// resolution is known.
    Portrait { width: u32, height: u32 },
    /// Below the resolution margin in at least one dimension.
    TooSmall { width: u32, height: u32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Portrait { width, height } => {
                write!(f, "portrait image ({width}x{height})")
            }
            RejectReason::TooSmall { width, height } => {
                write!(f, "image too small ({width}x{height})")
            }
        }
    }
}

/// Validates measured dimensions against the display constraints.
///
/// With no known resolution every structurally decodable candidate is
/// accepted. Otherwise the candidate must be landscape and meet
/// [`RESOLUTION_MARGIN`] of the display in both dimensions.
pub fn validate(
    width: u32,
    height: u32,
    display: Option<DisplayResolution>,
) -> Result<(), RejectReason> {
    let Some(display) = display else {
        return Ok(());
    };

    if width < height {
        return Err(RejectReason::Portrait { width, height });
    }

    let min_width = f64::from(display.width) * RESOLUTION_MARGIN;
    let min_height = f64::from(display.height) * RESOLUTION_MARGIN;
    if f64::from(width) < min_width || f64::from(height) < min_height {
        return Err(RejectReason::TooSmall { width, height });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: DisplayResolution = DisplayResolution::new(1920, 1080);

    #[test]
    fn unknown_resolution_accepts_anything() {
        assert_eq!(validate(10, 10, None), Ok(()));
        assert_eq!(validate(1, 10_000, None), Ok(()));
    }

    #[test]
    fn portrait_is_rejected_before_the_size_check() {
        assert_eq!(
            validate(500, 1000, Some(FULL_HD)),
            Err(RejectReason::Portrait {
                width: 500,
                height: 1000
            })
        );
    }

    #[test]
    fn margin_requires_half_the_display_in_each_dimension() {
        // 1920x1080 at margin 0.5 => minimum accepted size 960x540.
        assert_eq!(validate(960, 540, Some(FULL_HD)), Ok(()));
        assert_eq!(validate(1920, 1080, Some(FULL_HD)), Ok(()));

        // 1000x500 is landscape but misses the height bound (500 < 540).
        assert_eq!(
            validate(1000, 500, Some(FULL_HD)),
            Err(RejectReason::TooSmall {
                width: 1000,
                height: 500
            })
        );
        assert_eq!(
            validate(900, 900, Some(FULL_HD)),
            Err(RejectReason::TooSmall {
                width: 900,
                height: 900
            })
        );
    }
}
