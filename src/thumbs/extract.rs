use std::collections::HashSet;
use std::path::{Path, PathBuf};

use scraper::{Html, Selector};

use super::BuildError;

/// Resource cards on post pages
const CARD_SELECTOR: &str = "a.resource-card[href]";

/// `href`s of every resource card in `html`, in document order.
pub fn card_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(CARD_SELECTOR) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

/// `*.html` files directly inside `dir`, sorted by name.
pub fn post_files(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| BuildError::new("extract", format!("Failed to read {}: {}", dir.display(), e)))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

/// Unique resource URLs across all posts, first occurrence wins the ordering.
pub fn resource_urls(blogs_dir: &Path) -> Result<Vec<String>, BuildError> {
    let files = post_files(blogs_dir)?;
    log::info!("Found {} HTML files", files.len());

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for file in &files {
        let html = match std::fs::read_to_string(file) {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Skipping {}: {}", file.display(), e);
                continue;
            }
        };
        for href in card_links(&html) {
            if seen.insert(href.clone()) {
                urls.push(href);
            }
        }
    }

    log::info!("Found {} unique resource URLs", urls.len());
    Ok(urls)
}
