//! In-page map initializer.
//!
//! Activates the placeholders emitted by the transform: for each one it
//! loads the image's natural size and the shared mapping library, lays the
//! image out on a flat plane, resolves the declared center and zoom
//! levels, and attaches a live map. Discovery is idempotent and is re-run
//! after every client-side navigation.
//!
//! Each placeholder is set up by its own task. Tasks are never joined by
//! the initializer; a failure is logged, written onto the placeholder as
//! `data-leaflet-init="error"`, and goes no further. There are no
//! timeouts: a load that never settles leaves its placeholder `pending`.

pub mod geometry;
pub mod host;
pub mod loader;
pub mod placeholder;
pub mod registry;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::schema::LibrarySource;
use crate::error::SetupError;
use crate::observability::metrics;

pub use geometry::{Bounds, DeclaredZoom, Dimensions, LatLng, ZoomPlan};
pub use host::{
    AssetKind, AssetTag, CleanupAction, Element, ElementRef, LiveMap, MapLibrary, Page,
};
pub use loader::LibraryLoader;
pub use placeholder::{InitState, PlaceholderData};
pub use registry::{InstanceRegistry, InstanceToken};

/// How a placeholder's setup ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// A live map is attached and recorded.
    Ready,
    /// The placeholder left the document while loading; nothing was built.
    Abandoned,
}

/// State shared by every setup task of one page.
struct Shared {
    page: Arc<dyn Page>,
    loader: LibraryLoader,
    registry: Arc<InstanceRegistry>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let released = self.registry.release_all();
        if released > 0 {
            tracing::debug!(released, "initializer dropped, removed live maps");
        }
    }
}

/// Discovers and activates map placeholders on a page.
///
/// Create one per page lifetime; the library load is memoized inside it.
/// Once the last clone and every setup task are gone, all maps it built
/// are removed.
#[derive(Clone)]
pub struct MapInitializer {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for MapInitializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapInitializer")
            .field("loader", &self.shared.loader)
            .field("registry", &self.shared.registry)
            .finish_non_exhaustive()
    }
}

impl MapInitializer {
    #[must_use]
    pub fn new(page: Arc<dyn Page>, library: LibrarySource) -> Self {
        Self {
            shared: Arc::new(Shared {
                page,
                loader: LibraryLoader::new(library),
                registry: Arc::new(InstanceRegistry::new()),
            }),
        }
    }

    /// Live map instances of this page.
    #[must_use]
    pub fn registry(&self) -> &InstanceRegistry {
        &self.shared.registry
    }

    /// Scans the page and starts setup for every eligible placeholder.
    ///
    /// Placeholders without an image are skipped with a warning. Those that
    /// already carry an init state, or already have a live map, are left
    /// alone. Eligible placeholders are marked `pending` before this
    /// returns, so a second call made immediately after starts nothing.
    ///
    /// Must be called within a Tokio runtime. The returned handles may be
    /// dropped; setup continues regardless.
    pub fn discover(&self) -> Vec<JoinHandle<()>> {
        let mut started = Vec::new();

        for element in self.shared.page.placeholders() {
            let Some(data) = PlaceholderData::read(element.as_ref()) else {
                tracing::warn!("map placeholder has no image path, skipping");
                metrics::record_map("skipped");
                continue;
            };

            if InitState::of(element.as_ref()).is_some() || self.shared.registry.contains(&element)
            {
                continue;
            }

            InitState::Pending.mark(element.as_ref());
            let shared = Arc::clone(&self.shared);
            started.push(tokio::spawn(async move {
                run_setup(&shared, element, data).await;
            }));
        }

        if !started.is_empty() {
            tracing::debug!(count = started.len(), "started map setup");
        }
        started
    }

    /// Re-runs discovery after a client-side page transition.
    pub fn on_navigation(&self) -> Vec<JoinHandle<()>> {
        tracing::trace!("navigation event, rescanning for map placeholders");
        self.discover()
    }
}

async fn run_setup(shared: &Arc<Shared>, element: ElementRef, data: PlaceholderData) {
    match setup(shared, &element, &data).await {
        Ok(SetupOutcome::Ready) => metrics::record_map("done"),
        Ok(SetupOutcome::Abandoned) => {
            tracing::debug!(image = %data.image, "placeholder detached during setup");
            metrics::record_map("abandoned");
        }
        Err(e) => {
            tracing::error!(image = %data.image, error = %e, "failed to initialise map");
            InitState::Error.mark(element.as_ref());
            metrics::record_map("error");
        }
    }
}

/// Builds the map for one placeholder.
///
/// # Errors
///
/// Returns the image, library, or construction failure. Nothing is
/// recorded in the registry on failure.
async fn setup(
    shared: &Arc<Shared>,
    element: &ElementRef,
    data: &PlaceholderData,
) -> Result<SetupOutcome, SetupError> {
    let (dimensions, library) = futures::try_join!(
        shared.page.image_dimensions(&data.image),
        shared.loader.ensure(&shared.page),
    )?;

    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(SetupError::ImageDimensions {
            url: data.image.clone(),
        });
    }

    if !element.is_connected() {
        return Ok(SetupOutcome::Abandoned);
    }

    let bounds = Bounds::from_image(dimensions, data.scale);

    let mut map = library.create_map(element)?;
    map.add_image_overlay(&data.image, bounds);
    map.fit_bounds(bounds);
    map.set_max_bounds(bounds);

    let center = geometry::resolve_center(data.lat, data.long, &bounds);
    let zoom = ZoomPlan::resolve(data.zoom, map.zoom());
    if let Some(min) = zoom.min {
        map.set_min_zoom(min);
    }
    if let Some(max) = zoom.max {
        map.set_max_zoom(max);
    }
    map.set_view(center, zoom.initial);

    let token = shared.registry.insert(element, map);
    InitState::Done.mark(element.as_ref());

    let registry = Arc::downgrade(&shared.registry);
    shared.page.register_cleanup(Box::new(move || {
        if let Some(registry) = registry.upgrade() {
            registry.release(token);
        }
    }));

    Ok(SetupOutcome::Ready)
}
