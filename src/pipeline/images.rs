//! Phase 2: resolve per-slide image queries into public URLs.
//!
//! Lookups never fail the deck. Any problem (no key, timeout, non-2xx,
//! undecodable body, zero hits) becomes `None` and the slide renders
//! without a picture.

use crate::outline::Slide;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const PEXELS_SEARCH: &str = "https://api.pexels.com/v1/search";

/// Maps a short free-text query to an image URL.
#[async_trait]
pub trait ImageFinder: Send + Sync {
    async fn find(&self, query: &str) -> Option<String>;
}

/// Finder used when lookups are disabled.
pub struct NoImages;

#[async_trait]
impl ImageFinder for NoImages {
    async fn find(&self, _query: &str) -> Option<String> {
        None
    }
}

/// Pexels photo search; returns the first landscape hit.
pub struct PexelsImageFinder {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    #[serde(default)]
    src: PhotoSources,
}

#[derive(Default, Deserialize)]
struct PhotoSources {
    large: Option<String>,
    original: Option<String>,
}

impl PexelsImageFinder {
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Option<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| warn!("Image search client unavailable: {}", e))
            .ok()?;
        Some(Self {
            http,
            api_key: api_key.into(),
            endpoint: PEXELS_SEARCH.to_string(),
        })
    }

    /// Build from `PEXELS_API_KEY`; `None` when the key is unset or blank.
    pub fn from_env(timeout_secs: u64) -> Option<Self> {
        let key = std::env::var("PEXELS_API_KEY").ok()?;
        if key.trim().is_empty() {
            return None;
        }
        Self::new(key.trim(), timeout_secs)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn search(&self, query: &str) -> Result<Option<String>, String> {
        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    "timed out".to_string()
                } else {
                    e.to_string()
                }
            })?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        first_photo_url(&body).map_err(|e| format!("undecodable response: {e}"))
    }
}

/// The first photo's `large` rendition, else its `original`.
fn first_photo_url(body: &str) -> Result<Option<String>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .photos
        .into_iter()
        .next()
        .and_then(|p| p.src.large.or(p.src.original)))
}

#[async_trait]
impl ImageFinder for PexelsImageFinder {
    async fn find(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        match self.search(query).await {
            Ok(Some(url)) => {
                debug!("Image for '{}': {}", query, url);
                Some(url)
            }
            Ok(None) => {
                debug!("No image found for '{}'", query);
                None
            }
            Err(reason) => {
                warn!("Image lookup for '{}' failed: {}", query, reason);
                None
            }
        }
    }
}

/// Look up every slide's image query, at most `concurrency` at a time.
///
/// The result is index-aligned with `slides` regardless of completion
/// order. Table slides and slides without a query get `None` without a
/// lookup.
pub async fn resolve_images(
    slides: &[Slide],
    finder: &dyn ImageFinder,
    concurrency: usize,
) -> Vec<Option<String>> {
    stream::iter(slides.iter().map(|slide| async move {
        match slide.image_query() {
            Some(query) => finder.find(query).await,
            None => None,
        }
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await
}
