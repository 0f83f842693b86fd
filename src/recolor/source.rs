//! Image sources for the recolorer.
//!
//! A source turns a `data-theme-src` reference into a decoded image and
//! reports, once, whether raw pixels may be read back (a host embedding
//! cross-origin images would answer `Denied`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;

use super::RecolorError;

/// Whether decoded pixels can be read back for remapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelAccess {
    Granted,
    Denied,
}

pub trait ImageSource {
    /// Fetch and decode `src`.
    fn load(&self, src: &str) -> Result<DynamicImage, RecolorError>;

    /// Capability check, consulted once when the recolorer is built.
    fn pixel_access(&self) -> PixelAccess {
        PixelAccess::Granted
    }
}

/// Decode raw bytes, sniffing the format.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, RecolorError> {
    image::load_from_memory(bytes).map_err(|e| RecolorError {
        message: format!("Failed to decode image: {}", e),
        phase: "decode",
    })
}

/// Site-rooted source: relative references resolve against `root` on disk,
/// `http(s)://` references are fetched.
pub struct SiteImageSource {
    root: PathBuf,
    timeout: Duration,
}

impl SiteImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_local(&self, src: &str) -> Result<Vec<u8>, RecolorError> {
        let path = self.root.join(src.trim_start_matches('/'));
        std::fs::read(&path).map_err(|e| RecolorError {
            message: format!("Failed to read {}: {}", path.display(), e),
            phase: "read",
        })
    }

    fn fetch_remote(&self, src: &str) -> Result<Vec<u8>, RecolorError> {
        let err = |message: String| RecolorError { message, phase: "read" };

        let resp = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| err(format!("Client error: {}", e)))?
            .get(src)
            .send()
            .map_err(|e| err(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(err(format!("HTTP {} for {}", resp.status().as_u16(), src)));
        }

        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| err(format!("Failed to read body: {}", e)))
    }
}

impl ImageSource for SiteImageSource {
    fn load(&self, src: &str) -> Result<DynamicImage, RecolorError> {
        let bytes = if src.starts_with("http://") || src.starts_with("https://") {
            self.fetch_remote(src)?
        } else {
            self.read_local(src)?
        };
        decode(&bytes)
    }
}
