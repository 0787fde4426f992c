//! Host abstraction for the map initializer.
//!
//! The initializer never touches a browser directly. A host (a wasm
//! binding, a headless test document) implements these traits and the
//! initializer drives them. All methods except the `async` ones are
//! expected to be fast synchronous DOM operations.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SetupError;
use crate::runtime::geometry::{Bounds, Dimensions, LatLng};

/// A document element.
///
/// Identity is the `Arc` allocation: two handles are the same element when
/// they point at the same allocation.
pub trait Element: Send + Sync {
    /// Reads an attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Writes an attribute.
    fn set_attribute(&self, name: &str, value: &str);

    /// Whether the element is still attached to the document.
    fn is_connected(&self) -> bool;
}

/// Shared handle to a document element.
pub type ElementRef = Arc<dyn Element>;

/// The two loader tags of the mapping library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `<script data-leaflet="js">`
    Script,
    /// `<link rel="stylesheet" data-leaflet="css">`
    Stylesheet,
}

impl AssetKind {
    /// Value of the tag's `data-leaflet` marker attribute.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Stylesheet => "css",
        }
    }
}

/// A loader tag inserted into the document head.
#[async_trait]
pub trait AssetTag: Send + Sync {
    /// Resolves once the tag fires its load event, or fails on its error
    /// event. May be awaited by any number of callers.
    async fn loaded(&self) -> Result<(), SetupError>;
}

/// Deferred release work, run by the host before a page transition.
pub type CleanupAction = Box<dyn FnOnce() + Send>;

/// The page hosting placeholders: window and document together.
#[async_trait]
pub trait Page: Send + Sync {
    /// All elements carrying the placeholder class, in document order.
    fn placeholders(&self) -> Vec<ElementRef>;

    /// The mapping library global, if the library is already present.
    fn library(&self) -> Option<Arc<dyn MapLibrary>>;

    /// An existing loader tag of the given kind.
    fn find_asset(&self, kind: AssetKind) -> Option<Arc<dyn AssetTag>>;

    /// Inserts a loader tag of the given kind into the document head.
    fn inject_asset(&self, kind: AssetKind, url: &str) -> Arc<dyn AssetTag>;

    /// Decodes an image off-document and reports its natural size.
    async fn image_dimensions(&self, url: &str) -> Result<Dimensions, SetupError>;

    /// Registers work to run before the next page transition.
    ///
    /// The default implementation is for hosts without a cleanup facility:
    /// the action is dropped and never runs.
    fn register_cleanup(&self, action: CleanupAction) {
        drop(action);
    }
}

/// The mapping library.
pub trait MapLibrary: Send + Sync {
    /// Constructs a map bound to `container` on a flat, non-geographic
    /// coordinate plane.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Construction`] if the library rejects the
    /// container.
    fn create_map(&self, container: &ElementRef) -> Result<Box<dyn LiveMap>, SetupError>;
}

/// A live map instance.
pub trait LiveMap: Send + Sync {
    /// Stretches an image across `bounds`.
    fn add_image_overlay(&mut self, url: &str, bounds: Bounds);

    /// Fits the view to `bounds`, choosing a zoom level.
    fn fit_bounds(&mut self, bounds: Bounds);

    /// Prevents panning outside `bounds`.
    fn set_max_bounds(&mut self, bounds: Bounds);

    /// Current zoom level.
    fn zoom(&self) -> f64;

    fn set_min_zoom(&mut self, zoom: f64);

    fn set_max_zoom(&mut self, zoom: f64);

    fn set_view(&mut self, center: LatLng, zoom: f64);

    /// Destroys the map, detaching its listeners and layers.
    fn remove(&mut self);
}

impl fmt::Debug for dyn LiveMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveMap")
            .field("zoom", &self.zoom())
            .finish_non_exhaustive()
    }
}
