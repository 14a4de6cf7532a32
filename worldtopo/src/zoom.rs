#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid zoom range {min}..={max}")]
pub struct InvalidZoom {
    pub min: u8,
    pub max: u8,
}

/// Zoom levels a layer can be displayed at, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct ZoomRange {
    min: u8,
    max: u8,
}

impl ZoomRange {
    /// Google-like hosts do not go past 22.
    pub const MAX: u8 = 22;

    pub fn new(min: u8, max: u8) -> Result<Self, InvalidZoom> {
        if min > max || max > Self::MAX {
            Err(InvalidZoom { min, max })
        } else {
            Ok(Self { min, max })
        }
    }

    pub(crate) const fn fixed(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn contains(&self, zoom: u8) -> bool {
        (self.min..=self.max).contains(&zoom)
    }
}
