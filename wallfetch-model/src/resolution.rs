use std::fmt;
use std::str::FromStr;

/// Display pixel dimensions as reported by a resolution probe.
///
/// The pipeline treats absence of a resolution as "accept the first
/// structurally valid candidate".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayResolution {
    pub width: u32,
    pub height: u32,
}

impl DisplayResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for DisplayResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses the conventional `WIDTHxHEIGHT` form, e.g. `1920x1080`.
impl FromStr for DisplayResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid width {w:?}: {err}"))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid height {h:?}: {err}"))?;
        if width == 0 || height == 0 {
            return Err(format!("resolution dimensions must be non-zero: {s:?}"));
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_width_by_height() {
        assert_eq!(
            "1920x1080".parse::<DisplayResolution>().unwrap(),
            DisplayResolution::new(1920, 1080)
        );
        assert_eq!(
            "2560X1440".parse::<DisplayResolution>().unwrap(),
            DisplayResolution::new(2560, 1440)
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("1920".parse::<DisplayResolution>().is_err());
        assert!("0x1080".parse::<DisplayResolution>().is_err());
        assert!("axb".parse::<DisplayResolution>().is_err());
    }
}
