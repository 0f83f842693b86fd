//! Recolor cache and the in-memory blob registry behind image handles.
//!
//! A handle behaves like a `blob:` object URL: it names encoded bytes held
//! in memory until revoked. The cache maps (source, theme) to the handle of
//! the processed image and never evicts.

use std::collections::HashMap;
use std::rc::Rc;

use crate::theme::Theme;

/// Revocable reference to encoded image bytes.
///
/// Equality is identity: two handles are equal only if they name the same blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    id: u64,
    uri: Rc<str>,
}

impl ImageHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Object-URL style URI, e.g. `blob:bitbybit/3`
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

struct Blob {
    bytes: Rc<[u8]>,
    mime: &'static str,
}

/// Registry of live blobs.
#[derive(Default)]
pub struct BlobStore {
    blobs: HashMap<u64, Blob>,
    next_id: u64,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and hand back a fresh handle.
    pub fn register(&mut self, bytes: Vec<u8>, mime: &'static str) -> ImageHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.blobs.insert(id, Blob { bytes: bytes.into(), mime });
        ImageHandle {
            id,
            uri: format!("blob:bitbybit/{}", id).into(),
        }
    }

    pub fn bytes(&self, handle: &ImageHandle) -> Option<Rc<[u8]>> {
        self.blobs.get(&handle.id).map(|b| b.bytes.clone())
    }

    pub fn mime(&self, handle: &ImageHandle) -> Option<&'static str> {
        self.blobs.get(&handle.id).map(|b| b.mime)
    }

    /// Release the bytes. Returns false if the handle was already revoked.
    pub fn revoke(&mut self, handle: &ImageHandle) -> bool {
        self.blobs.remove(&handle.id).is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// Memoized recolor results keyed by (source, theme).
#[derive(Debug, Default)]
pub struct RecolorCache {
    entries: HashMap<(String, Theme), ImageHandle>,
    hits: u64,
    misses: u64,
}

impl RecolorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, src: &str, theme: Theme) -> Option<ImageHandle> {
        match self.entries.get(&(src.to_string(), theme)) {
            Some(handle) => {
                self.hits += 1;
                log::debug!("Recolor cache HIT: {}|{}", src, theme);
                Some(handle.clone())
            }
            None => {
                self.misses += 1;
                log::debug!("Recolor cache MISS: {}|{}", src, theme);
                None
            }
        }
    }

    /// Store a result. An existing entry for the key wins and is returned,
    /// keeping at most one handle per key.
    pub fn insert(&mut self, src: &str, theme: Theme, handle: ImageHandle) -> ImageHandle {
        self.entries
            .entry((src.to_string(), theme))
            .or_insert(handle)
            .clone()
    }

    pub fn contains(&self, src: &str, theme: Theme) -> bool {
        self.entries.contains_key(&(src.to_string(), theme))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Share of lookups answered from the cache, logged on each refresh.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_revocable() {
        let mut blobs = BlobStore::new();
        let a = blobs.register(vec![1, 2, 3], "image/png");
        let b = blobs.register(vec![1, 2, 3], "image/png");
        assert_ne!(a, b);
        assert_ne!(a.uri(), b.uri());
        assert!(a.uri().starts_with("blob:"));
        assert_eq!(blobs.bytes(&a).as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(blobs.mime(&a), Some("image/png"));

        assert!(blobs.revoke(&a));
        assert!(!blobs.revoke(&a));
        assert!(blobs.bytes(&a).is_none());
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn first_insert_wins() {
        let mut blobs = BlobStore::new();
        let mut cache = RecolorCache::new();
        let first = blobs.register(vec![0], "image/png");
        let second = blobs.register(vec![1], "image/png");

        assert_eq!(cache.insert("a.png", Theme::Dark, first.clone()), first);
        assert_eq!(cache.insert("a.png", Theme::Dark, second), first);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_separate_themes() {
        let mut blobs = BlobStore::new();
        let mut cache = RecolorCache::new();
        cache.insert("a.png", Theme::Dark, blobs.register(vec![0], "image/png"));

        assert!(cache.get("a.png", Theme::Light).is_none());
        assert!(cache.get("a.png", Theme::Dark).is_some());
        assert!(cache.contains("a.png", Theme::Dark));
        assert!(!cache.contains("b.png", Theme::Dark));
        assert!((cache.hit_rate() - 0.5).abs() < 1e-9);
    }
}
