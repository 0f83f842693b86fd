//! Theme-adaptive image recoloring.
//!
//! Images marked for recoloring are redrawn as a two-color gradient of their
//! own luminosity, matching the active theme:
//!
//! ```text
//!  data-theme-src ──► cache? ──hit──────────────────────────► handle
//!                        │
//!                       miss
//!                        ▼
//!                 ImageSource::load ──► RecolorStrategy::render ──► BlobStore ──► cache
//! ```
//!
//! The recolorer follows a [`ThemeStore`]: every theme change re-runs all
//! managed images. Results are memoized per (source, theme) for the life of
//! the recolorer.

pub mod cache;
pub mod effects;
pub mod ramp;
pub mod source;
pub mod strategy;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::theme::{Theme, ThemeStore};
pub use cache::{BlobStore, ImageHandle, RecolorCache};
pub use source::{ImageSource, PixelAccess, SiteImageSource};
pub use strategy::{select_strategy, ApproximateFilter, PixelRemap, RecolorStrategy, Rendered};

/// Error while producing a recolored image
#[derive(Debug, Clone)]
pub struct RecolorError {
    pub message: String,
    pub phase: &'static str,
}

impl std::fmt::Display for RecolorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for RecolorError {}

/// Visual state of a managed image, mirrored onto its wrapper's class list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Loading,
    Loaded,
    Error,
}

impl ImageState {
    pub fn css_class(self) -> &'static str {
        match self {
            ImageState::Loading => "loading",
            ImageState::Loaded => "loaded",
            ImageState::Error => "error",
        }
    }
}

/// What the `<img>` should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Recolored bytes behind a blob handle
    Handle(ImageHandle),
    /// Original source under a CSS filter
    Filtered { src: String, filter: &'static str },
}

impl Presentation {
    pub fn uri(&self) -> &str {
        match self {
            Presentation::Handle(handle) => handle.uri(),
            Presentation::Filtered { src, .. } => src,
        }
    }

    pub fn filter(&self) -> Option<&'static str> {
        match self {
            Presentation::Handle(_) => None,
            Presentation::Filtered { filter, .. } => Some(*filter),
        }
    }
}

/// An image the recolorer keeps in sync with the theme
#[derive(Debug, Clone)]
pub struct ManagedImage {
    pub src: String,
    /// Alt text, copied to the wrapper for the error placeholder
    pub alt: String,
    pub state: ImageState,
    /// Cleared when the image fails to render for the current theme
    pub display: Option<Presentation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(usize);

pub struct Recolorer {
    store: Rc<ThemeStore>,
    source: Box<dyn ImageSource>,
    strategy: Box<dyn RecolorStrategy>,
    cache: RecolorCache,
    blobs: BlobStore,
    images: Vec<ManagedImage>,
    /// A theme change arrived while the recolorer was borrowed
    pending_refresh: Rc<Cell<bool>>,
}

impl Recolorer {
    /// Build a recolorer; the source's pixel access decides the strategy here, once.
    pub fn new(store: Rc<ThemeStore>, source: Box<dyn ImageSource>) -> Self {
        let access = source.pixel_access();
        let strategy = select_strategy(access);
        if access == PixelAccess::Denied {
            log::warn!("Pixel access denied, recoloring with {} fallback", strategy.name());
        }
        Self {
            store,
            source,
            strategy,
            cache: RecolorCache::new(),
            blobs: BlobStore::new(),
            images: Vec::new(),
            pending_refresh: Rc::new(Cell::new(false)),
        }
    }

    /// Replace the strategy chosen by the capability check.
    pub fn with_strategy(mut self, strategy: Box<dyn RecolorStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Share the recolorer and re-run it on every theme change.
    ///
    /// A change that lands while the recolorer is borrowed is deferred to the
    /// next [`Recolorer::process`] or [`Recolorer::refresh_all`]. The listener
    /// unsubscribes itself once the recolorer is dropped.
    pub fn attach(self) -> Rc<RefCell<Self>> {
        let store = self.store.clone();
        let pending = self.pending_refresh.clone();
        let shared = Rc::new(RefCell::new(self));
        let weak = Rc::downgrade(&shared);

        store.subscribe(move |theme| {
            let Some(recolorer) = weak.upgrade() else {
                return false;
            };
            let borrowed = recolorer.try_borrow_mut();
            match borrowed {
                Ok(mut recolorer) => {
                    log::info!("Theme changed to {}, refreshing images", theme);
                    recolorer.refresh_all();
                }
                Err(_) => {
                    log::debug!("Recolorer busy during theme change to {}, deferring", theme);
                    pending.set(true);
                }
            };
            true
        });

        shared
    }

    pub fn refresh_pending(&self) -> bool {
        self.pending_refresh.get()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Start managing an `<img data-theme-src=...>`. Call [`Recolorer::process`]
    /// or [`Recolorer::refresh_all`] to render it.
    pub fn manage(&mut self, src: impl Into<String>, alt: Option<&str>) -> ImageId {
        self.images.push(ManagedImage {
            src: src.into(),
            alt: alt.filter(|a| !a.is_empty()).unwrap_or("Unknown Image").to_string(),
            state: ImageState::Loading,
            display: None,
        });
        ImageId(self.images.len() - 1)
    }

    pub fn image(&self, id: ImageId) -> Option<&ManagedImage> {
        self.images.get(id.0)
    }

    pub fn images(&self) -> &[ManagedImage] {
        &self.images
    }

    pub fn cache(&self) -> &RecolorCache {
        &self.cache
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Produce the display for `src` under `theme`, from cache when possible.
    pub fn recolor(&mut self, src: &str, theme: Theme) -> Result<Presentation, RecolorError> {
        if let Some(handle) = self.cache.get(src, theme) {
            return Ok(Presentation::Handle(handle));
        }

        let decoded = self.source.load(src)?;
        log::debug!("Recoloring {} for {} theme via {}", src, theme, self.strategy.name());

        match self.strategy.render(decoded, theme)? {
            Rendered::Encoded { bytes, mime } => {
                let handle = self.blobs.register(bytes, mime);
                Ok(Presentation::Handle(self.cache.insert(src, theme, handle)))
            }
            Rendered::Filtered(filter) => Ok(Presentation::Filtered {
                src: src.to_string(),
                filter,
            }),
        }
    }

    /// Render one managed image for the current theme. A deferred theme
    /// change re-renders every image first.
    pub fn process(&mut self, id: ImageId) -> Option<ImageState> {
        if self.pending_refresh.replace(false) {
            self.render_all();
            return self.images.get(id.0).map(|image| image.state);
        }
        self.render(id)
    }

    fn render(&mut self, id: ImageId) -> Option<ImageState> {
        let theme = self.store.get();
        let src = self.images.get(id.0)?.src.clone();

        if !self.cache.contains(&src, theme) {
            self.images[id.0].state = ImageState::Loading;
        }

        let state = match self.recolor(&src, theme) {
            Ok(display) => {
                self.images[id.0].display = Some(display);
                ImageState::Loaded
            }
            Err(e) => {
                log::error!("Failed to load theme image {}: {}", src, e);
                self.images[id.0].display = None;
                ImageState::Error
            }
        };
        self.images[id.0].state = state;
        Some(state)
    }

    /// Re-render every managed image for the current theme.
    pub fn refresh_all(&mut self) {
        self.pending_refresh.set(false);
        self.render_all();
    }

    fn render_all(&mut self) {
        log::debug!(
            "Refreshing {} theme images (cache hit rate {:.0}%)",
            self.images.len(),
            self.cache.hit_rate() * 100.0
        );
        for i in 0..self.images.len() {
            self.render(ImageId(i));
        }
    }
}
