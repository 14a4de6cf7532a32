use std::time::Duration;

use crate::ZoomRange;

/// Customizes how a layer is offered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct LayerOptions {
    /// Name shown in the host's map type selector. Provider's own name is used if not set.
    pub name: Option<String>,

    /// Zoom levels the layer is offered at. Levels the provider serves are used if not set.
    pub zoom_range: Option<ZoomRange>,
}

impl LayerOptions {
    pub(crate) fn name_or(&self, default: &str) -> String {
        self.name.clone().unwrap_or_else(|| default.to_owned())
    }

    pub(crate) fn zoom_range_or(&self, default: ZoomRange) -> ZoomRange {
        self.zoom_range.unwrap_or(default)
    }
}

/// Controls how often the IGN France token is renewed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct TokenOptions {
    /// Period of the activity check. Token is released when no tile was requested during a
    /// whole period.
    pub tick_interval: Duration,

    /// Number of active periods after which the token is renewed.
    pub renewal_period: u32,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            renewal_period: 9,
        }
    }
}
