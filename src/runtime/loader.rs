//! Shared mapping-library loader.
//!
//! The library script and stylesheet are fetched at most once per page.
//! The first caller starts the load and stores it as a shared future;
//! every later caller, concurrent or not, awaits that same future. A load
//! that fails stays failed: all waiters see the error and no second fetch
//! is attempted.

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::config::schema::LibrarySource;
use crate::error::SetupError;
use crate::runtime::host::{AssetKind, MapLibrary, Page};

type LibraryResult = Result<Arc<dyn MapLibrary>, SetupError>;
type PendingLoad = Shared<BoxFuture<'static, LibraryResult>>;

/// Load progress. `Loaded` is observed through [`Page::library`], so only
/// the pending future needs to be stored.
enum LoadState {
    Unloaded,
    Loading(PendingLoad),
}

/// Memoized loader for the mapping library.
pub struct LibraryLoader {
    source: LibrarySource,
    state: Mutex<LoadState>,
}

impl std::fmt::Debug for LibraryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loading = matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            LoadState::Loading(_)
        );
        f.debug_struct("LibraryLoader")
            .field("source", &self.source)
            .field("loading", &loading)
            .finish()
    }
}

impl LibraryLoader {
    #[must_use]
    pub const fn new(source: LibrarySource) -> Self {
        Self {
            source,
            state: Mutex::new(LoadState::Unloaded),
        }
    }

    /// Returns the library, loading it first if needed.
    ///
    /// # Errors
    ///
    /// Returns the shared load failure if the script failed to load or did
    /// not register the library.
    pub async fn ensure(&self, page: &Arc<dyn Page>) -> LibraryResult {
        if let Some(library) = page.library() {
            return Ok(library);
        }

        let pending = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &*state {
                LoadState::Loading(pending) => pending.clone(),
                LoadState::Unloaded => {
                    self.ensure_stylesheet(page.as_ref());
                    let pending = load_script(Arc::clone(page), self.source.script_url.clone())
                        .boxed()
                        .shared();
                    *state = LoadState::Loading(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn ensure_stylesheet(&self, page: &dyn Page) {
        if page.find_asset(AssetKind::Stylesheet).is_some() {
            return;
        }
        tracing::debug!(url = %self.source.stylesheet_url, "injecting map library stylesheet");
        // Stylesheet load events are not awaited; a missing stylesheet only
        // degrades styling.
        let _ = page.inject_asset(AssetKind::Stylesheet, &self.source.stylesheet_url);
    }
}

async fn load_script(page: Arc<dyn Page>, url: String) -> LibraryResult {
    let tag = if let Some(existing) = page.find_asset(AssetKind::Script) {
        tracing::debug!("map library script already present, waiting for it");
        existing
    } else {
        tracing::debug!(url = %url, "injecting map library script");
        page.inject_asset(AssetKind::Script, &url)
    };

    if let Err(e) = tag.loaded().await {
        tracing::error!(url = %url, error = %e, "map library failed to load");
        return Err(e);
    }

    page.library().ok_or(SetupError::LibraryMissing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::geometry::Dimensions;
    use crate::runtime::host::{AssetTag, ElementRef, LiveMap};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct NoMaps;

    impl MapLibrary for NoMaps {
        fn create_map(&self, _container: &ElementRef) -> Result<Box<dyn LiveMap>, SetupError> {
            Err(SetupError::Construction("unused".to_string()))
        }
    }

    struct Settled(Result<(), SetupError>);

    #[async_trait]
    impl AssetTag for Settled {
        async fn loaded(&self) -> Result<(), SetupError> {
            tokio::task::yield_now().await;
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct CountingPage {
        fail: bool,
        registered: AtomicBool,
        scripts: AtomicUsize,
        stylesheets: AtomicUsize,
    }

    #[async_trait]
    impl Page for CountingPage {
        fn placeholders(&self) -> Vec<ElementRef> {
            Vec::new()
        }

        fn library(&self) -> Option<Arc<dyn MapLibrary>> {
            self.registered
                .load(Ordering::SeqCst)
                .then(|| Arc::new(NoMaps) as Arc<dyn MapLibrary>)
        }

        fn find_asset(&self, _kind: AssetKind) -> Option<Arc<dyn AssetTag>> {
            None
        }

        fn inject_asset(&self, kind: AssetKind, url: &str) -> Arc<dyn AssetTag> {
            match kind {
                AssetKind::Stylesheet => {
                    self.stylesheets.fetch_add(1, Ordering::SeqCst);
                    Arc::new(Settled(Ok(())))
                }
                AssetKind::Script if self.fail => {
                    self.scripts.fetch_add(1, Ordering::SeqCst);
                    Arc::new(Settled(Err(SetupError::LibraryLoad {
                        url: url.to_string(),
                    })))
                }
                AssetKind::Script => {
                    self.scripts.fetch_add(1, Ordering::SeqCst);
                    self.registered.store(true, Ordering::SeqCst);
                    Arc::new(Settled(Ok(())))
                }
            }
        }

        async fn image_dimensions(&self, _url: &str) -> Result<Dimensions, SetupError> {
            Ok(Dimensions {
                width: 1,
                height: 1,
            })
        }
    }

    #[test]
    fn test_concurrent_loads_share_one_fetch() {
        let counting = Arc::new(CountingPage::default());
        let page: Arc<dyn Page> = counting.clone();
        let loader = LibraryLoader::new(LibrarySource::default());

        let (a, b) = tokio_test::block_on(async {
            futures::join!(loader.ensure(&page), loader.ensure(&page))
        });
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(counting.scripts.load(Ordering::SeqCst), 1);
        assert_eq!(counting.stylesheets.load(Ordering::SeqCst), 1);

        assert!(tokio_test::block_on(loader.ensure(&page)).is_ok());
        assert_eq!(counting.scripts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_stays_failed() {
        let counting = Arc::new(CountingPage {
            fail: true,
            ..CountingPage::default()
        });
        let page: Arc<dyn Page> = counting.clone();
        let loader = LibraryLoader::new(LibrarySource::default());

        let first = tokio_test::block_on(loader.ensure(&page));
        let second = tokio_test::block_on(loader.ensure(&page));
        assert!(matches!(first, Err(SetupError::LibraryLoad { .. })));
        assert_eq!(first.err(), second.err());
        assert_eq!(counting.scripts.load(Ordering::SeqCst), 1);
    }
}
