//! Reading placeholder attributes at runtime.

use std::fmt;

use crate::markup::attr;
use crate::runtime::geometry::DeclaredZoom;
use crate::runtime::host::Element;

/// Initialization state stored in `data-leaflet-init`.
///
/// A placeholder goes `unset → pending → done | error` and never leaves
/// `done` or `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Pending,
    Done,
    Error,
}

impl InitState {
    /// Attribute value for this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Reads the state of an element. Unknown values count as unset.
    #[must_use]
    pub fn of(element: &dyn Element) -> Option<Self> {
        match element.attribute(attr::INIT).as_deref() {
            Some("pending") => Some(Self::Pending),
            Some("done") => Some(Self::Done),
            Some("error") => Some(Self::Error),
            _ => None,
        }
    }

    /// Writes this state onto an element.
    pub fn mark(self, element: &dyn Element) {
        element.set_attribute(attr::INIT, self.as_str());
    }
}

impl fmt::Display for InitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map settings read back from a placeholder's data attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderData {
    /// Image URL, never empty.
    pub image: String,
    /// Declared vertical coordinate, unresolved.
    pub lat: Option<f64>,
    /// Declared horizontal coordinate, unresolved.
    pub long: Option<f64>,
    pub zoom: DeclaredZoom,
    /// Pixel multiplier; 1 when missing or not positive.
    pub scale: f64,
    pub unit: Option<String>,
}

impl PlaceholderData {
    /// Reads the placeholder attributes of `element`.
    ///
    /// Returns `None` when the element declares no image.
    #[must_use]
    pub fn read(element: &dyn Element) -> Option<Self> {
        let image = element
            .attribute(attr::IMAGE)
            .filter(|s| !s.trim().is_empty())?;
        let number = |name: &str| parse_number(element.attribute(name).as_deref());

        Some(Self {
            image,
            lat: number(attr::LAT),
            long: number(attr::LONG),
            zoom: DeclaredZoom {
                min: number(attr::MIN_ZOOM),
                max: number(attr::MAX_ZOOM),
                default: number(attr::DEFAULT_ZOOM),
            },
            scale: parse_scale(element.attribute(attr::SCALE).as_deref()),
            unit: element.attribute(attr::UNIT).filter(|u| !u.is_empty()),
        })
    }
}

/// Parses a finite number; empty or malformed input is unset.
#[must_use]
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parses a scale factor, defaulting to 1 for anything not positive.
#[must_use]
pub fn parse_scale(value: Option<&str>) -> f64 {
    parse_number(value).filter(|v| *v > 0.0).unwrap_or(1.0)
}
