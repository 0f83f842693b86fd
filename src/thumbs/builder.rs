use std::path::Path;

use chrono::Utc;

use super::extract::resource_urls;
use super::fetch::RemoteFetch;
use super::manifest::{hash_url, render_script, Manifest, ManifestEntry};
use super::resolve::{image_extension, resolve};
use super::BuildError;
use crate::config::ThumbnailConfig;

/// What happened to a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlOutcome {
    Skipped,
    Cached,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Cached entries in the manifest after the run
    pub cached_total: usize,
}

pub struct CacheBuilder<'a> {
    config: &'a ThumbnailConfig,
    fetch: &'a dyn RemoteFetch,
    manifest: Manifest,
}

impl<'a> CacheBuilder<'a> {
    /// Ensure the cache directory exists and load any previous manifest.
    pub fn open(config: &'a ThumbnailConfig, fetch: &'a dyn RemoteFetch) -> Result<Self, BuildError> {
        if !config.cache_dir.exists() {
            std::fs::create_dir_all(&config.cache_dir).map_err(|e| {
                BuildError::new("setup", format!("Failed to create {}: {}", config.cache_dir.display(), e))
            })?;
            log::info!("Created cache directory: {}", config.cache_dir.display());
        }
        let manifest = Manifest::load(&config.manifest_path())?;
        Ok(Self {
            config,
            fetch,
            manifest,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Full run: every resource URL, then manifest and page script.
    pub fn run(&mut self) -> Result<BuildSummary, BuildError> {
        let urls = resource_urls(&self.config.blogs_dir)?;
        let mut summary = BuildSummary {
            found: urls.len(),
            ..Default::default()
        };

        let delay = self.config.request_delay();
        for url in &urls {
            match self.process_url(url) {
                UrlOutcome::Skipped => summary.skipped += 1,
                UrlOutcome::Cached => summary.downloaded += 1,
                UrlOutcome::Failed => summary.failed += 1,
            }
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }

        self.write_outputs()?;
        summary.cached_total = self.manifest.cached_count();
        Ok(summary)
    }

    /// Cache one URL. Failures land in the manifest, never in the return value.
    pub fn process_url(&mut self, url: &str) -> UrlOutcome {
        let hash = hash_url(url);

        if let Some(filename) = self.manifest.get(&hash).filter(|e| e.cached).and_then(|e| e.filename.as_ref()) {
            if self.config.cache_dir.join(filename).exists() {
                log::debug!("Skipped (cached): {}", url);
                return UrlOutcome::Skipped;
            }
        }

        match self.cache(url, &hash) {
            Ok(entry) => {
                log::info!("Cached: {} ({})", entry.filename.as_deref().unwrap_or_default(), url);
                self.manifest.record(entry);
                UrlOutcome::Cached
            }
            Err(e) => {
                log::warn!("Failed: {} - {}", url, e.message);
                self.manifest.record(ManifestEntry::failed(url, e.message, Utc::now()));
                UrlOutcome::Failed
            }
        }
    }

    fn cache(&self, url: &str, hash: &str) -> Result<ManifestEntry, BuildError> {
        let resolved = resolve(url, self.fetch)?;
        let filename = format!("{}.{}", hash, image_extension(&resolved.image_url));
        let dest = self.config.cache_dir.join(&filename);

        if let Err(e) = self.fetch.download(&resolved.image_url, &dest) {
            remove_partial(&dest);
            return Err(e);
        }
        log::debug!("Downloaded {} via {}", filename, resolved.provider.as_str());

        Ok(ManifestEntry::cached(
            url,
            filename,
            resolved.image_url.clone(),
            resolved.is_youtube(),
            Utc::now(),
        ))
    }

    /// Write `manifest.json` and the page script.
    pub fn write_outputs(&self) -> Result<(), BuildError> {
        self.manifest.save(&self.config.manifest_path())?;

        let map = self.manifest.preview_map(&self.config.public_prefix);
        let script = render_script(&map, Utc::now())?;
        let path = &self.config.script_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| BuildError::new("script", format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, script)
            .map_err(|e| BuildError::new("script", format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Generated {} with {} entries", path.display(), map.len());
        Ok(())
    }
}

fn remove_partial(dest: &Path) {
    if dest.exists() {
        if let Err(e) = std::fs::remove_file(dest) {
            log::warn!("Could not remove partial file {}: {}", dest.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbs::manifest::parse_script;
    use serde_json::json;
    use std::cell::Cell;
    use std::path::PathBuf;

    /// Offline stand-in: Microlink points at `<url>/og.png`; downloads of
    /// URLs containing "broken" leave half a file behind and fail.
    struct FakeRemote {
        downloads: Cell<usize>,
    }

    impl FakeRemote {
        fn new() -> Self {
            Self { downloads: Cell::new(0) }
        }
    }

    impl RemoteFetch for FakeRemote {
        fn get_json(&self, url: &str) -> Result<serde_json::Value, BuildError> {
            if url.contains("offline") {
                return Err(BuildError::new("fetch", "Request failed: offline"));
            }
            Ok(json!({"status": "success", "data": {"image": {"url": format!("{}/og.png", url)}}}))
        }

        fn download(&self, url: &str, dest: &Path) -> Result<u64, BuildError> {
            self.downloads.set(self.downloads.get() + 1);
            std::fs::write(dest, b"partial").unwrap();
            if url.contains("broken") {
                return Err(BuildError::new("fetch", "HTTP 404"));
            }
            Ok(7)
        }
    }

    fn site(cards: &[&str]) -> (tempfile::TempDir, ThumbnailConfig) {
        let dir = tempfile::tempdir().unwrap();
        let blogs = dir.path().join("blogs");
        std::fs::create_dir(&blogs).unwrap();
        let html: String = cards
            .iter()
            .map(|href| format!(r#"<a class="resource-card" href="{}">r</a>"#, href))
            .collect();
        std::fs::write(blogs.join("post.html"), html).unwrap();

        let config = ThumbnailConfig {
            blogs_dir: blogs,
            cache_dir: dir.path().join("cache"),
            script_path: dir.path().join("js/resource-cache-data.js"),
            request_delay_ms: 0,
            ..Default::default()
        };
        (dir, config)
    }

    #[test]
    fn run_caches_and_records_failures() {
        let (_dir, config) = site(&["https://youtu.be/abc", "https://broken.dev", "https://offline.dev"]);
        let remote = FakeRemote::new();
        let mut builder = CacheBuilder::open(&config, &remote).unwrap();
        let summary = builder.run().unwrap();

        assert_eq!(
            summary,
            BuildSummary {
                found: 3,
                downloaded: 1,
                skipped: 0,
                failed: 2,
                cached_total: 1,
            }
        );

        let yt = builder.manifest().get(&hash_url("https://youtu.be/abc")).unwrap();
        assert!(yt.cached);
        assert_eq!(yt.is_youtube, Some(true));
        let filename = format!("{}.jpg", hash_url("https://youtu.be/abc"));
        assert_eq!(yt.filename.as_deref(), Some(filename.as_str()));
        assert!(config.cache_dir.join(&filename).exists());

        let broken = builder.manifest().get(&hash_url("https://broken.dev")).unwrap();
        assert!(!broken.cached);
        assert_eq!(broken.error.as_deref(), Some("HTTP 404"));
        assert!(broken.attempted_at.is_some());
        let partial = config.cache_dir.join(format!("{}.png", hash_url("https://broken.dev")));
        assert!(!partial.exists());
    }

    #[test]
    fn outputs_only_expose_cached_entries() {
        let (_dir, config) = site(&["https://youtu.be/abc", "https://broken.dev"]);
        let remote = FakeRemote::new();
        CacheBuilder::open(&config, &remote).unwrap().run().unwrap();

        let manifest = Manifest::load(&config.manifest_path()).unwrap();
        assert_eq!(manifest.len(), 2);

        let script = std::fs::read_to_string(&config.script_path).unwrap();
        let map = parse_script(&script).unwrap();
        assert_eq!(map.len(), 1);
        let entry = map.values().next().unwrap();
        assert_eq!(entry.url, "https://youtu.be/abc");
        assert!(entry.path.starts_with("assets/images/resource-cache/"));
    }

    #[test]
    fn second_run_skips_cached_files() {
        let (_dir, config) = site(&["https://a.dev", "https://broken.dev"]);
        let remote = FakeRemote::new();
        CacheBuilder::open(&config, &remote).unwrap().run().unwrap();
        assert_eq!(remote.downloads.get(), 2);

        let mut again = CacheBuilder::open(&config, &remote).unwrap();
        let summary = again.run().unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        // Only the failure is retried
        assert_eq!(remote.downloads.get(), 3);
    }

    #[test]
    fn missing_file_is_refetched() {
        let (_dir, config) = site(&["https://a.dev"]);
        let remote = FakeRemote::new();
        let mut builder = CacheBuilder::open(&config, &remote).unwrap();
        assert_eq!(builder.process_url("https://a.dev"), UrlOutcome::Cached);

        let filename: PathBuf = config.cache_dir.join(format!("{}.png", hash_url("https://a.dev")));
        std::fs::remove_file(&filename).unwrap();
        assert_eq!(builder.process_url("https://a.dev"), UrlOutcome::Cached);
        assert_eq!(builder.process_url("https://a.dev"), UrlOutcome::Skipped);
    }
}
