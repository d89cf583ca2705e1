use serde::{Deserialize, Serialize};

use crate::filter::FilterState;
use crate::viewport::{Flight, FocusZoom};

/// Highest discrete zoom level a focus may request.
pub const MAX_ZOOM: u8 = 22;

/// Explicit start-up state and timing for the engine.
///
/// Every field has a default, so a partial JSON document only overrides what
/// it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_category_visibility: FilterState,
    pub flight: Flight,
    pub region_padding_px: u32,
    /// Quiet period after the last filter change before the camera refits.
    pub filter_debounce_s: f64,
    /// Fallback delay before opening the selected marker's overlay when the
    /// renderer does not report animation completion. Must exceed the flight.
    pub overlay_open_delay_s: f64,
    pub focus_zoom: FocusZoom,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_category_visibility: FilterState::default(),
            flight: Flight::default(),
            region_padding_px: 50,
            filter_debounce_s: 0.1,
            overlay_open_delay_s: 1.5,
            focus_zoom: FocusZoom::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    InvalidDuration { field: &'static str, value: f64 },
    OverlayBeforeFlightEnds { delay_s: f64, flight_s: f64 },
    ZoomOutOfRange { field: &'static str, zoom: u8 },
    CoastalZoomTighterThanUrban { coastal: u8, urban: u8 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::InvalidDuration { field, value } => {
                write!(f, "{field} must be a finite, non-negative duration (got {value})")
            }
            ConfigError::OverlayBeforeFlightEnds { delay_s, flight_s } => write!(
                f,
                "overlay_open_delay_s ({delay_s}) must be greater than the flight duration ({flight_s})"
            ),
            ConfigError::ZoomOutOfRange { field, zoom } => {
                write!(f, "{field} zoom {zoom} exceeds max zoom {MAX_ZOOM}")
            }
            ConfigError::CoastalZoomTighterThanUrban { coastal, urban } => write!(
                f,
                "coastal zoom ({coastal}) must not be tighter than urban zoom ({urban})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<EngineConfig>(raw)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_duration("flight.duration_s", self.flight.duration_s)?;
        check_duration("filter_debounce_s", self.filter_debounce_s)?;
        check_duration("overlay_open_delay_s", self.overlay_open_delay_s)?;
        if self.overlay_open_delay_s <= self.flight.duration_s {
            return Err(ConfigError::OverlayBeforeFlightEnds {
                delay_s: self.overlay_open_delay_s,
                flight_s: self.flight.duration_s,
            });
        }

        let zoom = self.focus_zoom;
        if zoom.coastal > MAX_ZOOM {
            return Err(ConfigError::ZoomOutOfRange {
                field: "focus_zoom.coastal",
                zoom: zoom.coastal,
            });
        }
        if zoom.urban > MAX_ZOOM {
            return Err(ConfigError::ZoomOutOfRange {
                field: "focus_zoom.urban",
                zoom: zoom.urban,
            });
        }
        if zoom.coastal > zoom.urban {
            return Err(ConfigError::CoastalZoomTighterThanUrban {
                coastal: zoom.coastal,
                urban: zoom.urban,
            });
        }
        Ok(())
    }
}

fn check_duration(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}
