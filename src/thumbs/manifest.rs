//! Durable thumbnail manifest and the in-page mapping generated from it.
//!
//! `manifest.json` keeps every attempt, successful or not:
//!
//! ```json
//! { "<md5(url)>": { "url": "...", "filename": "<md5>.jpg", "imageUrl": "...",
//!                   "isYouTube": false, "cached": true, "cachedAt": "..." } }
//! ```
//!
//! Pages only see cached entries, rewritten with a site-relative `path` and
//! wrapped in `const RESOURCE_CACHE = {...};` so they load from `file://` too.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use super::BuildError;

const SCRIPT_PREFIX: &str = "const RESOURCE_CACHE = ";

/// Lowercase hex MD5 of the URL; the manifest key and file stem.
pub fn hash_url(url: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "isYouTube", default, skip_serializing_if = "Option::is_none")]
    pub is_youtube: Option<bool>,
    pub cached: bool,
    /// Hand-set flag: show the thumbnail with the color-inversion treatment
    #[serde(default, skip_serializing_if = "is_false")]
    pub invert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted_at: Option<DateTime<Utc>>,
}

impl ManifestEntry {
    pub fn cached(url: &str, filename: String, image_url: String, is_youtube: bool, at: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            filename: Some(filename),
            image_url: Some(image_url),
            is_youtube: Some(is_youtube),
            cached: true,
            invert: false,
            cached_at: Some(at),
            error: None,
            attempted_at: None,
        }
    }

    pub fn failed(url: &str, error: String, at: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            filename: None,
            image_url: None,
            is_youtube: None,
            cached: false,
            invert: false,
            cached_at: None,
            error: Some(error),
            attempted_at: Some(at),
        }
    }
}

/// Entry as the page sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
    pub url: String,
    pub filename: String,
    pub path: String,
    #[serde(rename = "isYouTube", default)]
    pub is_youtube: bool,
    pub cached: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub invert: bool,
}

pub type PreviewMap = BTreeMap<String, PreviewEntry>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Read `path`; a missing file is an empty manifest.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BuildError::new("manifest", format!("Failed to read {}: {}", path.display(), e)))?;
        let manifest: Self = serde_json::from_str(&raw)
            .map_err(|e| BuildError::new("manifest", format!("Invalid manifest {}: {}", path.display(), e)))?;
        log::info!("Loaded existing manifest with {} entries", manifest.len());
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::new("manifest", format!("Failed to serialize manifest: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| BuildError::new("manifest", format!("Failed to write {}: {}", path.display(), e)))
    }

    pub fn get(&self, hash: &str) -> Option<&ManifestEntry> {
        self.entries.get(hash)
    }

    /// Record an attempt for `url`. A hand-set `invert` flag survives re-caching.
    pub fn record(&mut self, mut entry: ManifestEntry) {
        let hash = hash_url(&entry.url);
        if let Some(prev) = self.entries.get(&hash) {
            entry.invert |= prev.invert;
        }
        self.entries.insert(hash, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cached_count(&self) -> usize {
        self.entries.values().filter(|e| e.cached).count()
    }

    /// Cached entries with `path = <public_prefix>/<filename>`.
    pub fn preview_map(&self, public_prefix: &str) -> PreviewMap {
        let prefix = public_prefix.trim_end_matches('/');
        self.entries
            .iter()
            .filter(|(_, e)| e.cached)
            .filter_map(|(hash, e)| {
                let filename = e.filename.clone()?;
                Some((
                    hash.clone(),
                    PreviewEntry {
                        url: e.url.clone(),
                        path: format!("{}/{}", prefix, filename),
                        filename,
                        is_youtube: e.is_youtube.unwrap_or(false),
                        cached: true,
                        invert: e.invert,
                    },
                ))
            })
            .collect()
    }
}

/// The generated `resource-cache-data.js` contents.
pub fn render_script(map: &PreviewMap, generated_at: DateTime<Utc>) -> Result<String, BuildError> {
    let json = serde_json::to_string_pretty(map)
        .map_err(|e| BuildError::new("manifest", format!("Failed to serialize preview map: {}", e)))?;
    Ok(format!(
        "/**\n * Resource Cache Data\n * Auto-generated by: cache-thumbnails\n * Generated at: {}\n *\n * Cached thumbnail manifest exposed as a global so pages opened from\n * file:// can read it without a fetch.\n */\n\n{}{};\n",
        generated_at.to_rfc3339(),
        SCRIPT_PREFIX,
        json
    ))
}

/// Recover the mapping from a generated script. `None` if the script has no mapping.
pub fn parse_script(script: &str) -> Option<PreviewMap> {
    let start = script.find(SCRIPT_PREFIX)? + SCRIPT_PREFIX.len();
    let body = script[start..].trim_end().strip_suffix(';')?;
    serde_json::from_str(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 17, 9, 30, 0).unwrap()
    }

    #[test]
    fn hash_is_md5_hex() {
        assert_eq!(hash_url(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hash_url("https://example.com").len(), 32);
    }

    #[test]
    fn entries_serialize_with_page_field_names() {
        let ok = ManifestEntry::cached("https://a.dev", "x.png".into(), "https://a.dev/x.png".into(), true, at());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["isYouTube"], true);
        assert_eq!(json["imageUrl"], "https://a.dev/x.png");
        assert_eq!(json["cachedAt"], "2026-01-17T09:30:00Z");
        assert!(json.get("error").is_none());
        assert!(json.get("invert").is_none());

        let failed = ManifestEntry::failed("https://b.dev", "HTTP 404".into(), at());
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["cached"], false);
        assert_eq!(json["error"], "HTTP 404");
        assert!(json.get("filename").is_none());
        assert!(json.get("isYouTube").is_none());
    }

    #[test]
    fn preview_map_keeps_cached_only() {
        let mut manifest = Manifest::default();
        manifest.record(ManifestEntry::cached("https://a.dev", "a.jpg".into(), "i".into(), false, at()));
        manifest.record(ManifestEntry::failed("https://b.dev", "boom".into(), at()));

        let map = manifest.preview_map("assets/images/resource-cache/");
        assert_eq!(map.len(), 1);
        let entry = &map[&hash_url("https://a.dev")];
        assert_eq!(entry.path, "assets/images/resource-cache/a.jpg");
        assert!(entry.cached);
        assert!(!entry.is_youtube);
        assert_eq!(manifest.cached_count(), 1);
    }

    #[test]
    fn invert_flag_survives_recaching() {
        let mut manifest = Manifest::default();
        let mut entry = ManifestEntry::cached("https://a.dev", "a.jpg".into(), "i".into(), false, at());
        entry.invert = true;
        manifest.record(entry);
        manifest.record(ManifestEntry::cached("https://a.dev", "a.png".into(), "j".into(), false, at()));

        assert!(manifest.get(&hash_url("https://a.dev")).unwrap().invert);
        assert!(manifest.preview_map("p").values().all(|e| e.invert));
    }

    #[test]
    fn manifest_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        assert!(Manifest::load(&path).unwrap().is_empty());

        let mut manifest = Manifest::default();
        manifest.record(ManifestEntry::failed("https://b.dev", "Timeout".into(), at()));
        manifest.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), manifest);

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Manifest::load(&path).unwrap_err().phase, "manifest");
    }

    #[test]
    fn script_embeds_mapping() {
        let mut manifest = Manifest::default();
        manifest.record(ManifestEntry::cached("https://youtu.be/abc", "h.jpg".into(), "i".into(), true, at()));
        let map = manifest.preview_map("assets/images/resource-cache");

        let script = render_script(&map, at()).unwrap();
        assert!(script.contains("Generated at: 2026-01-17T09:30:00+00:00"));
        assert!(script.contains("const RESOURCE_CACHE = {"));
        assert!(script.contains("\"isYouTube\": true"));
        assert_eq!(parse_script(&script), Some(map));
        assert_eq!(parse_script("console.log(1);"), None);
    }
}
