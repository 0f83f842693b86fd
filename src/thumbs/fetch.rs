use std::fs::File;
use std::path::Path;

use url::Url;

use super::BuildError;
use crate::config::ThumbnailConfig;

/// Network access needed by the cache builder.
pub trait RemoteFetch {
    /// GET `url` and parse the body as JSON.
    fn get_json(&self, url: &str) -> Result<serde_json::Value, BuildError>;
    /// GET `url` and write the body to `dest`. Returns bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, BuildError>;
}

/// Blocking HTTP client
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &ThumbnailConfig) -> Result<Self, BuildError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| BuildError::new("fetch", format!("Client error: {}", e)))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, BuildError> {
        let parsed = Url::parse(url).map_err(|e| BuildError::new("fetch", format!("Invalid URL: {}", e)))?;

        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .map_err(|e| BuildError::new("fetch", format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(BuildError::new("fetch", format!("HTTP {}", status)));
        }
        Ok(response)
    }
}

impl RemoteFetch for HttpFetcher {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, BuildError> {
        let body = self
            .get(url)?
            .text()
            .map_err(|e| BuildError::new("fetch", format!("Failed to read body: {}", e)))?;
        serde_json::from_str(&body).map_err(|e| BuildError::new("fetch", format!("Invalid JSON from {}: {}", url, e)))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64, BuildError> {
        let mut response = self.get(url)?;
        let mut file = File::create(dest)
            .map_err(|e| BuildError::new("download", format!("Failed to create {}: {}", dest.display(), e)))?;
        response
            .copy_to(&mut file)
            .map_err(|e| BuildError::new("download", format!("Failed to read body: {}", e)))
    }
}
