//! Page-side lookup of cached thumbnails for resource cards.

use super::manifest::{PreviewEntry, PreviewMap};
use crate::config::PreviewConfig;

const YOUTUBE_ICON: &str = r#"<svg class="youtube-icon" viewBox="0 0 24 24"><path d="M10 15l5.19-3L10 9v6zm11.56-7.83c.13.47.22 1.1.28 1.9.07 1.25.07 3.3.07 3.3s0 2.05-.07 3.3c-.06.8-.15 1.43-.28 1.9-.3.94-1.07 1.6-2.02 1.9-1.5.37-7.54.4-7.54.4s-6.04-.03-7.54-.4c-.95-.3-1.72-.96-2.02-1.9-.13-.47-.22-1.1-.28-1.9-.07-1.25-.07-3.3-.07-3.3s0-2.05.07-3.3c.06-.8.15-1.43.28-1.9.3-.94 1.07-1.6 2.02-1.9C6.46 6.03 12 6 12 6s5.54.03 7.04.4c.95.3 1.72.96 2.02 1.9z"/></svg>"#;

/// A card's thumbnail, ready to insert as the card's first child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub src: String,
    pub invert: bool,
    pub video: bool,
}

/// Cached entry whose `url` equals the card's `href`, with `src` rooted at `config.base`.
pub fn find_thumbnail(map: &PreviewMap, href: &str, config: &PreviewConfig) -> Option<Thumbnail> {
    let entry: &PreviewEntry = map
        .values()
        .find(|e| e.url == href && e.cached && !e.path.is_empty())?;
    Some(Thumbnail {
        src: format!("{}{}", config.base, entry.path),
        invert: entry.invert,
        video: entry.is_youtube,
    })
}

impl Thumbnail {
    pub fn img_class(&self) -> &'static str {
        if self.invert {
            "resource-thumb invert"
        } else {
            "resource-thumb"
        }
    }

    /// Container markup; the card itself gets `has-thumbnail` once the image loads.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<div class="resource-thumb-container"><img class="{}" alt="Resource Thumbnail" loading="lazy" src="{}">"#,
            self.img_class(),
            escape_attr(&self.src)
        );
        if self.video {
            html.push_str(r#"<div class="youtube-indicator">"#);
            html.push_str(YOUTUBE_ICON);
            html.push_str("</div>");
        }
        html.push_str("</div>");
        html
    }
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
