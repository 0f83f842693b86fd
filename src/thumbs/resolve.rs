//! Turning a resource page URL into a thumbnail image URL.
//!
//! Priority chain, first match wins:
//! 1. YouTube watch / short links: the video's `maxresdefault.jpg`, no request
//! 2. Wikipedia articles: REST summary thumbnail, then original image, then the
//!    Wikipedia logo
//! 3. Anything else: Microlink preview image, then its logo

use serde::Deserialize;
use url::Url;

use super::fetch::RemoteFetch;
use super::BuildError;

pub const WIKIPEDIA_LOGO: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/8/80/Wikipedia-logo-v2.svg/200px-Wikipedia-logo-v2.svg.png";

const MICROLINK_API: &str = "https://api.microlink.io/";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Wikipedia,
    Microlink,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::YouTube => "YouTube",
            Provider::Wikipedia => "Wikipedia",
            Provider::Microlink => "Microlink",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub image_url: String,
    pub provider: Provider,
}

impl ResolvedImage {
    pub fn is_youtube(&self) -> bool {
        self.provider == Provider::YouTube
    }
}

/// Video id from `watch?v=<id>` or `youtu.be/<id>`.
pub fn youtube_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let id = match parsed.query_pairs().find(|(k, _)| k == "v") {
        Some((_, v)) => v.into_owned(),
        None if parsed.host_str() == Some("youtu.be") => parsed.path_segments()?.next()?.to_string(),
        None => return None,
    };
    (!id.is_empty()).then_some(id)
}

pub fn youtube_thumbnail(id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", id)
}

/// `(title, lang)` for `https://<lang>.wikipedia.org/wiki/<title>`.
/// The title stays percent-encoded as in the link; `lang` defaults to `en`.
pub fn wikipedia_article(url: &str) -> Option<(String, String)> {
    const MARKER: &str = "wikipedia.org/wiki/";
    let start = url.find(MARKER)? + MARKER.len();
    let title: String = url[start..].chars().take_while(|&c| c != '#' && c != '?').collect();
    if title.is_empty() {
        return None;
    }

    let lang = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .and_then(|host| {
            let label = host.strip_suffix(".wikipedia.org")?.split('.').next()?.to_string();
            label.chars().all(|c| c.is_ascii_lowercase()).then_some(label)
        })
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "en".to_string());

    Some((title, lang))
}

pub fn wikipedia_summary_url(title: &str, lang: &str) -> Result<String, BuildError> {
    let raw = format!(
        "https://{}.wikipedia.org/api/rest_v1/page/summary/{}",
        lang,
        title.replace('/', "%2F")
    );
    Url::parse(&raw)
        .map(String::from)
        .map_err(|e| BuildError::new("resolve", format!("Invalid Wikipedia URL: {}", e)))
}

pub fn microlink_url(url: &str) -> Result<String, BuildError> {
    Url::parse_with_params(MICROLINK_API, &[("url", url)])
        .map(String::from)
        .map_err(|e| BuildError::new("resolve", format!("Invalid Microlink URL: {}", e)))
}

#[derive(Deserialize)]
struct WikiSummary {
    thumbnail: Option<WikiImage>,
    originalimage: Option<WikiImage>,
}

#[derive(Deserialize)]
struct WikiImage {
    source: Option<String>,
}

/// Thumbnail, then original image, then the Wikipedia logo.
pub fn wikipedia_image(summary: serde_json::Value) -> Result<String, BuildError> {
    let summary: WikiSummary = serde_json::from_value(summary)
        .map_err(|e| BuildError::new("resolve", format!("Unexpected Wikipedia response: {}", e)))?;
    Ok([summary.thumbnail, summary.originalimage]
        .into_iter()
        .flatten()
        .find_map(|img| img.source)
        .unwrap_or_else(|| WIKIPEDIA_LOGO.to_string()))
}

#[derive(Deserialize)]
struct MicrolinkResponse {
    status: String,
    message: Option<String>,
    data: Option<MicrolinkData>,
}

#[derive(Deserialize)]
struct MicrolinkData {
    image: Option<MicrolinkAsset>,
    logo: Option<MicrolinkAsset>,
}

#[derive(Deserialize)]
struct MicrolinkAsset {
    url: Option<String>,
}

/// Preview image, then logo. Errors carry the API's message when it fails.
pub fn microlink_image(response: serde_json::Value) -> Result<String, BuildError> {
    let response: MicrolinkResponse = serde_json::from_value(response)
        .map_err(|e| BuildError::new("resolve", format!("Unexpected Microlink response: {}", e)))?;

    if response.status != "success" {
        return Err(BuildError::new(
            "resolve",
            response.message.unwrap_or_else(|| "API error".to_string()),
        ));
    }

    response
        .data
        .and_then(|d| [d.image, d.logo].into_iter().flatten().find_map(|a| a.url))
        .ok_or_else(|| BuildError::new("resolve", "No image found"))
}

/// First image extension mentioned anywhere in the URL, else `jpg`.
pub fn image_extension(image_url: &str) -> &'static str {
    let lower = image_url.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .filter_map(|ext| lower.find(&format!(".{}", ext)).map(|pos| (pos, *ext)))
        .min_by_key(|(pos, ext)| (*pos, std::cmp::Reverse(ext.len())))
        .map(|(_, ext)| ext)
        .unwrap_or("jpg")
}

/// Walk the provider chain for `url`.
pub fn resolve(url: &str, fetch: &dyn RemoteFetch) -> Result<ResolvedImage, BuildError> {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        if let Some(id) = youtube_id(url) {
            return Ok(ResolvedImage {
                image_url: youtube_thumbnail(&id),
                provider: Provider::YouTube,
            });
        }
    }

    if url.contains("wikipedia.org") {
        let (title, lang) =
            wikipedia_article(url).ok_or_else(|| BuildError::new("resolve", "Invalid Wikipedia URL"))?;
        log::debug!("Fetching from Wikipedia API: {}", url);
        let summary = fetch.get_json(&wikipedia_summary_url(&title, &lang)?)?;
        return Ok(ResolvedImage {
            image_url: wikipedia_image(summary)?,
            provider: Provider::Wikipedia,
        });
    }

    log::debug!("Fetching from Microlink: {}", url);
    let response = fetch.get_json(&microlink_url(url)?)?;
    Ok(ResolvedImage {
        image_url: microlink_image(response)?,
        provider: Provider::Microlink,
    })
}
