//! Theme store: dark/light mode with persistence and change notification.
//!
//! The store is the single owner of the active theme:
//! - `get()` reads the current mode
//! - `set()` / `toggle()` persist through a [`ThemeBackend`], update the
//!   [`RootSignal`] synchronously, then notify listeners
//! - `on_change()` registers a listener; `subscribe()` registers one that can
//!   ask to be dropped (the image recolorer subscribes here)
//!
//! Everything runs on the UI thread; the store is shared as `Rc<ThemeStore>`.

pub mod cookie;
pub mod palette;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ThemeConfig;
pub use cookie::CookieJar;
pub use palette::{Rgb, ThemePalette};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self) -> &'static ThemePalette {
        ThemePalette::for_theme(self)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme: {:?}", other)),
        }
    }
}

/// Where the chosen theme survives between visits.
pub trait ThemeBackend {
    fn load(&self) -> Option<Theme>;
    fn store(&mut self, theme: Theme);
}

/// Attribute + class signal on the document root that CSS keys off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSignal {
    /// `data-theme` attribute value
    pub data_theme: Option<Theme>,
    /// `theme-dark` / `theme-light` class
    pub class: Option<&'static str>,
}

impl RootSignal {
    pub fn apply(&mut self, theme: Theme) {
        self.data_theme = Some(theme);
        self.class = Some(match theme {
            Theme::Dark => "theme-dark",
            Theme::Light => "theme-light",
        });
    }
}

/// Returns `false` to unsubscribe
type Listener = Box<dyn Fn(Theme) -> bool>;

/// Injectable theme state: get / set / on_change.
pub struct ThemeStore {
    current: Cell<Theme>,
    backend: RefCell<Box<dyn ThemeBackend>>,
    root: RefCell<RootSignal>,
    listeners: RefCell<Vec<Listener>>,
}

impl ThemeStore {
    /// Restore the saved theme, or persist and apply `config.default` on a
    /// first visit. The root signal is set before this returns, so the host
    /// can paint with the right theme immediately.
    pub fn new(backend: Box<dyn ThemeBackend>, config: &ThemeConfig) -> Self {
        let saved = backend.load();
        let store = Self {
            current: Cell::new(saved.unwrap_or(config.default)),
            backend: RefCell::new(backend),
            root: RefCell::new(RootSignal::default()),
            listeners: RefCell::new(Vec::new()),
        };

        if saved.is_none() {
            store.backend.borrow_mut().store(config.default);
        }
        store.root.borrow_mut().apply(store.current.get());
        store
    }

    /// Cookie-backed store seeded from a `Cookie` header.
    pub fn from_cookie_header(header: &str, config: &ThemeConfig) -> Self {
        Self::new(Box::new(CookieJar::new(config).with_header(header)), config)
    }

    pub fn get(&self) -> Theme {
        self.current.get()
    }

    pub fn root(&self) -> RootSignal {
        self.root.borrow().clone()
    }

    /// Persist and apply `theme`. Listeners run even if the theme is unchanged.
    ///
    /// Listeners must not register listeners or set the theme from inside the callback.
    pub fn set(&self, theme: Theme) {
        self.current.set(theme);
        self.backend.borrow_mut().store(theme);
        self.root.borrow_mut().apply(theme);
        log::debug!("Theme set to {}", theme);

        self.listeners.borrow_mut().retain(|listener| listener(theme));
    }

    /// Flip dark ↔ light and return the new theme.
    pub fn toggle(&self) -> Theme {
        let target = self.get().toggled();
        self.set(target);
        target
    }

    pub fn on_change(&self, listener: impl Fn(Theme) + 'static) {
        self.subscribe(move |theme| {
            listener(theme);
            true
        });
    }

    /// Like [`ThemeStore::on_change`], but the listener is dropped once it returns `false`.
    pub fn subscribe(&self, listener: impl Fn(Theme) -> bool + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}
