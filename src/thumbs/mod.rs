//! Resource thumbnail cache.
//!
//! Build side (`cache-thumbnails`): Extract → Resolve → Download → Manifest
//!
//! ```text
//!  blogs/*.html ──► a.resource-card[href] ──► YouTube id │ Wikipedia summary │ Microlink
//!                                                   │
//!                                                   ▼
//!                      cache_dir/<md5>.<ext> + manifest.json + resource-cache-data.js
//! ```
//!
//! Page side: [`preview`] matches a card's `href` against the generated
//! mapping and produces the thumbnail markup. Nothing here is fatal per URL:
//! failures are recorded in the manifest and the run moves on.

pub mod builder;
pub mod extract;
pub mod fetch;
pub mod manifest;
pub mod preview;
pub mod resolve;

pub use builder::{BuildSummary, CacheBuilder};
pub use fetch::{HttpFetcher, RemoteFetch};
pub use manifest::{hash_url, Manifest, ManifestEntry, PreviewEntry, PreviewMap};
pub use preview::{find_thumbnail, Thumbnail};

/// Error during a cache build step
#[derive(Debug, Clone)]
pub struct BuildError {
    pub message: String,
    pub phase: &'static str,
}

impl BuildError {
    pub fn new(phase: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase,
        }
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for BuildError {}
