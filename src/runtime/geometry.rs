//! Image-space geometry: coordinates, bounds and zoom levels.
//!
//! Maps are laid out on a flat plane in image pixels (scaled), with points
//! written row-major as `(lat, long)` = `(y, x)`.

/// A point on the map plane, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Natural pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Axis-aligned rectangle from `south_west` to `north_east`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Bounds covering an image of `dimensions` multiplied by `scale`:
    /// `(0, 0)` to `(height * scale, width * scale)`.
    #[must_use]
    pub fn from_image(dimensions: Dimensions, scale: f64) -> Self {
        Self {
            south_west: LatLng::new(0.0, 0.0),
            north_east: LatLng::new(
                f64::from(dimensions.height) * scale,
                f64::from(dimensions.width) * scale,
            ),
        }
    }

    /// Scaled image height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    /// Scaled image width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            self.south_west.lat + self.height() / 2.0,
            self.south_west.lng + self.width() / 2.0,
        )
    }
}

/// Resolves a declared coordinate against one image dimension.
///
/// The encoding is chosen by magnitude:
/// - `|v| <= 1`: fraction of the dimension
/// - `1 < |v| <= 100`: percentage of the dimension
/// - otherwise: absolute pixels
///
/// `1` is therefore the whole dimension, never one pixel.
#[must_use]
pub fn resolve_coordinate(value: f64, dimension: f64) -> f64 {
    let magnitude = value.abs();
    if magnitude <= 1.0 {
        value * dimension
    } else if magnitude <= 100.0 {
        value / 100.0 * dimension
    } else {
        value
    }
}

/// Picks the initial view center.
///
/// Each axis uses its declared coordinate when present and finite after
/// resolution, otherwise the image center on that axis.
#[must_use]
pub fn resolve_center(lat: Option<f64>, long: Option<f64>, bounds: &Bounds) -> LatLng {
    let fallback = bounds.center();
    let axis = |declared: Option<f64>, dimension: f64, default: f64| {
        declared
            .map(|v| resolve_coordinate(v, dimension))
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    };
    LatLng::new(
        axis(lat, bounds.height(), fallback.lat),
        axis(long, bounds.width(), fallback.lng),
    )
}

/// Zoom levels as declared on the placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeclaredZoom {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default: Option<f64>,
}

/// Zoom levels translated into the library's zoom scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPlan {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Zoom for the initial view; the base zoom when none was declared.
    pub initial: f64,
}

impl ZoomPlan {
    /// Translates declared zoom levels into offsets from `base_zoom`.
    ///
    /// Declared values are relative: the first defined of default, min, max
    /// is the anchor and lands on `base_zoom`, the zoom the library chose
    /// when fitting the image. Every other level keeps its distance from
    /// the anchor.
    #[must_use]
    pub fn resolve(declared: DeclaredZoom, base_zoom: f64) -> Self {
        let reference = declared
            .default
            .or(declared.min)
            .or(declared.max)
            .unwrap_or(base_zoom);
        let adjust = |value: Option<f64>| value.map(|v| base_zoom + (v - reference));

        Self {
            min: adjust(declared.min),
            max: adjust(declared.max),
            initial: adjust(declared.default).unwrap_or(base_zoom),
        }
    }
}
