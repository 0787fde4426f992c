//! Shared integration-test harness: an in-memory page for driving the map
//! initializer, and helpers for invoking the `leaflet-embed` binary.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::process::Output;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use leaflet_embed::directive::{DirectiveOptions, MapDirective};
use leaflet_embed::error::SetupError;
use leaflet_embed::markup::Placeholder;
use leaflet_embed::runtime::{
    AssetKind, AssetTag, Bounds, CleanupAction, Dimensions, Element, ElementRef, LatLng, LiveMap,
    MapLibrary, Page,
};

// ============================================================================
// Binary helpers
// ============================================================================

/// Runs the binary with `args` and waits for it to exit.
#[allow(clippy::missing_panics_doc)]
pub fn run_cli(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_leaflet-embed"))
        .args(args)
        .env_remove("LEAFLET_EMBED_CONFIG")
        .env_remove("LEAFLET_EMBED_ASSET_ROOT")
        .env_remove("LEAFLET_EMBED_DEFAULT_HEIGHT")
        .env_remove("LEAFLET_EMBED_LOG_LEVEL")
        .output()
        .expect("failed to run leaflet-embed")
}

// ============================================================================
// Elements
// ============================================================================

/// An element backed by an attribute map.
#[derive(Debug)]
pub struct FakeElement {
    attributes: Mutex<BTreeMap<String, String>>,
    connected: AtomicBool,
}

impl FakeElement {
    /// An attached element with the given attributes.
    pub fn new(attributes: &[(&str, &str)]) -> Arc<Self> {
        let map = attributes
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Arc::new(Self {
            attributes: Mutex::new(map),
            connected: AtomicBool::new(true),
        })
    }

    /// The element a browser would build from a rendered placeholder.
    pub fn from_placeholder(placeholder: &Placeholder) -> Arc<Self> {
        let pairs: Vec<(&str, &str)> = placeholder
            .attributes()
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        Self::new(&pairs)
    }

    /// Parses `yaml` as a directive and builds its placeholder element.
    pub fn from_directive(yaml: &str) -> Arc<Self> {
        let directive = MapDirective::parse(yaml, &DirectiveOptions::default())
            .expect("directive should parse");
        Self::from_placeholder(&Placeholder::from_directive(&directive))
    }

    pub fn detach(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl Element for FakeElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.lock().unwrap().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Asset tags
// ============================================================================

/// A loader tag that settles when the test says so.
#[derive(Debug)]
pub struct FakeTag {
    state: watch::Sender<Option<Result<(), SetupError>>>,
}

impl FakeTag {
    pub fn pending() -> Arc<Self> {
        let (state, _) = watch::channel(None);
        Arc::new(Self { state })
    }

    pub fn settle(&self, result: Result<(), SetupError>) {
        self.state.send_replace(Some(result));
    }
}

#[async_trait]
impl AssetTag for FakeTag {
    async fn loaded(&self) -> Result<(), SetupError> {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(Option::is_some)
            .await
            .expect("tag sender dropped");
        settled.clone().expect("settled state")
    }
}

/// How an injected library script behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptBehavior {
    /// Registers the library and fires its load event.
    Succeed,
    /// Fires its error event.
    Fail,
    /// Fires its load event without registering the library.
    LoadWithoutLibrary,
    /// Never settles on its own.
    Manual,
}

// ============================================================================
// Map library
// ============================================================================

/// Everything a fake map was asked to do.
#[derive(Debug, Default, Clone)]
pub struct MapLog {
    pub overlay: Option<(String, Bounds)>,
    pub fitted: Option<Bounds>,
    pub max_bounds: Option<Bounds>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub view: Option<(LatLng, f64)>,
    pub removed: bool,
}

struct FakeMap {
    log: Arc<Mutex<MapLog>>,
    base_zoom: f64,
    zoom: f64,
}

impl LiveMap for FakeMap {
    fn add_image_overlay(&mut self, url: &str, bounds: Bounds) {
        self.log.lock().unwrap().overlay = Some((url.to_string(), bounds));
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.zoom = self.base_zoom;
        self.log.lock().unwrap().fitted = Some(bounds);
    }

    fn set_max_bounds(&mut self, bounds: Bounds) {
        self.log.lock().unwrap().max_bounds = Some(bounds);
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_min_zoom(&mut self, zoom: f64) {
        self.log.lock().unwrap().min_zoom = Some(zoom);
    }

    fn set_max_zoom(&mut self, zoom: f64) {
        self.log.lock().unwrap().max_zoom = Some(zoom);
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.zoom = zoom;
        self.log.lock().unwrap().view = Some((center, zoom));
    }

    fn remove(&mut self) {
        self.log.lock().unwrap().removed = true;
    }
}

/// A mapping library that records every map it builds.
pub struct FakeLibrary {
    base_zoom: f64,
    maps: Mutex<Vec<Arc<Mutex<MapLog>>>>,
}

impl FakeLibrary {
    /// A library whose `fit_bounds` lands on `base_zoom`.
    pub fn new(base_zoom: f64) -> Arc<Self> {
        Arc::new(Self {
            base_zoom,
            maps: Mutex::new(Vec::new()),
        })
    }

    pub fn created(&self) -> usize {
        self.maps.lock().unwrap().len()
    }

    /// Snapshot of the `index`-th map built.
    pub fn map(&self, index: usize) -> MapLog {
        self.maps.lock().unwrap()[index].lock().unwrap().clone()
    }
}

impl MapLibrary for FakeLibrary {
    fn create_map(&self, _container: &ElementRef) -> Result<Box<dyn LiveMap>, SetupError> {
        let log = Arc::new(Mutex::new(MapLog::default()));
        self.maps.lock().unwrap().push(Arc::clone(&log));
        Ok(Box::new(FakeMap {
            log,
            base_zoom: self.base_zoom,
            zoom: 0.0,
        }))
    }
}

// ============================================================================
// Page
// ============================================================================

enum ImageBehavior {
    Ready(Dimensions),
    Gated(Dimensions, watch::Receiver<bool>),
    Broken,
}

/// An in-memory page.
///
/// Images are unknown until registered with [`FakePage::image`] or
/// [`FakePage::gated_image`]; an unknown image fails to load.
pub struct FakePage {
    elements: Mutex<Vec<Arc<FakeElement>>>,
    library: Arc<FakeLibrary>,
    registered: AtomicBool,
    script_behavior: ScriptBehavior,
    tags: Mutex<HashMap<AssetKind, Arc<FakeTag>>>,
    injected: Mutex<Vec<(AssetKind, String)>>,
    images: Mutex<HashMap<String, ImageBehavior>>,
    image_requests: AtomicUsize,
    cleanups: Mutex<Vec<CleanupAction>>,
}

impl FakePage {
    pub fn new(library: Arc<FakeLibrary>, script_behavior: ScriptBehavior) -> Arc<Self> {
        Arc::new(Self {
            elements: Mutex::new(Vec::new()),
            library,
            registered: AtomicBool::new(false),
            script_behavior,
            tags: Mutex::new(HashMap::new()),
            injected: Mutex::new(Vec::new()),
            images: Mutex::new(HashMap::new()),
            image_requests: AtomicUsize::new(0),
            cleanups: Mutex::new(Vec::new()),
        })
    }

    /// Adds an element to the document.
    pub fn add(&self, element: &Arc<FakeElement>) {
        self.elements.lock().unwrap().push(Arc::clone(element));
    }

    /// Removes every element, as a page transition would.
    pub fn clear(&self) {
        for element in self.elements.lock().unwrap().drain(..) {
            element.detach();
        }
    }

    pub fn image(&self, url: &str, width: u32, height: u32) {
        self.images.lock().unwrap().insert(
            url.to_string(),
            ImageBehavior::Ready(Dimensions { width, height }),
        );
    }

    /// Registers an image whose load completes when the returned sender
    /// sends `true`.
    pub fn gated_image(&self, url: &str, width: u32, height: u32) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        self.images.lock().unwrap().insert(
            url.to_string(),
            ImageBehavior::Gated(Dimensions { width, height }, rx),
        );
        tx
    }

    pub fn broken_image(&self, url: &str) {
        self.images
            .lock()
            .unwrap()
            .insert(url.to_string(), ImageBehavior::Broken);
    }

    /// Puts a loader tag in the document before any setup runs.
    pub fn preinstall(&self, kind: AssetKind) -> Arc<FakeTag> {
        let tag = FakeTag::pending();
        self.tags.lock().unwrap().insert(kind, Arc::clone(&tag));
        tag
    }

    /// Makes the library global visible.
    pub fn register_library(&self) {
        self.registered.store(true, Ordering::SeqCst);
    }

    pub fn injected(&self) -> Vec<(AssetKind, String)> {
        self.injected.lock().unwrap().clone()
    }

    pub fn injected_count(&self, kind: AssetKind) -> usize {
        self.injected
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn image_requests(&self) -> usize {
        self.image_requests.load(Ordering::SeqCst)
    }

    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.lock().unwrap().len()
    }

    /// Runs and discards every registered cleanup action.
    pub fn run_cleanups(&self) {
        let actions: Vec<CleanupAction> = self.cleanups.lock().unwrap().drain(..).collect();
        for action in actions {
            action();
        }
    }
}

#[async_trait]
impl Page for FakePage {
    fn placeholders(&self) -> Vec<ElementRef> {
        self.elements
            .lock()
            .unwrap()
            .iter()
            .map(|e| Arc::clone(e) as ElementRef)
            .collect()
    }

    fn library(&self) -> Option<Arc<dyn MapLibrary>> {
        self.registered
            .load(Ordering::SeqCst)
            .then(|| Arc::clone(&self.library) as Arc<dyn MapLibrary>)
    }

    fn find_asset(&self, kind: AssetKind) -> Option<Arc<dyn AssetTag>> {
        self.tags
            .lock()
            .unwrap()
            .get(&kind)
            .map(|t| Arc::clone(t) as Arc<dyn AssetTag>)
    }

    fn inject_asset(&self, kind: AssetKind, url: &str) -> Arc<dyn AssetTag> {
        self.injected.lock().unwrap().push((kind, url.to_string()));
        let tag = FakeTag::pending();
        self.tags.lock().unwrap().insert(kind, Arc::clone(&tag));

        match (kind, self.script_behavior) {
            (AssetKind::Stylesheet, _) => tag.settle(Ok(())),
            (AssetKind::Script, ScriptBehavior::Succeed) => {
                self.register_library();
                tag.settle(Ok(()));
            }
            (AssetKind::Script, ScriptBehavior::LoadWithoutLibrary) => tag.settle(Ok(())),
            (AssetKind::Script, ScriptBehavior::Fail) => tag.settle(Err(SetupError::LibraryLoad {
                url: url.to_string(),
            })),
            (AssetKind::Script, ScriptBehavior::Manual) => {}
        }
        tag
    }

    async fn image_dimensions(&self, url: &str) -> Result<Dimensions, SetupError> {
        self.image_requests.fetch_add(1, Ordering::SeqCst);
        let (dimensions, gate) = {
            let images = self.images.lock().unwrap();
            match images.get(url) {
                Some(ImageBehavior::Ready(d)) => (*d, None),
                Some(ImageBehavior::Gated(d, rx)) => (*d, Some(rx.clone())),
                Some(ImageBehavior::Broken) | None => {
                    return Err(SetupError::ImageLoad {
                        url: url.to_string(),
                    });
                }
            }
        };
        if let Some(mut gate) = gate {
            gate.wait_for(|open| *open).await.expect("gate dropped");
        }
        Ok(dimensions)
    }

    fn register_cleanup(&self, action: CleanupAction) {
        self.cleanups.lock().unwrap().push(action);
    }
}

/// Awaits every setup task started by a discovery pass.
pub async fn settle(handles: Vec<tokio::task::JoinHandle<()>>) {
    for handle in handles {
        handle.await.expect("setup task panicked");
    }
}
