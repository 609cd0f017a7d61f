//! Configuration types for deck generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`],
//! built via its [`GenerationConfigBuilder`]. Positional constants live in
//! [`LayoutConfig`] so a different slide master can be targeted without
//! touching the planner.

use crate::error::DeckError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Subtitle written under the topic on the title slide.
pub const DEFAULT_SUBTITLE: &str = "AI-Generated Presentation";

/// Configuration for one generation.
///
/// # Example
/// ```rust
/// use edgequake_slides::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .slide_count(6)
///     .theme("dark")
///     .fetch_images(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Content slides to research (title slide not included). Range 1–30. Default: 8.
    pub slide_count: usize,

    /// Theme name, resolved through the registry. Default: `"corporate"`.
    pub theme: String,

    /// Optional image placed on the title slide.
    pub hero_image_url: Option<String>,

    /// Look up an image per bullet slide. Default: true.
    pub fetch_images: bool,

    /// Image lookups in flight at once. Default: 4.
    ///
    /// Results are reassembled in slide order regardless of completion order.
    pub image_concurrency: usize,

    /// Per-lookup timeout for the image search. Default: 5.
    pub image_timeout_secs: u64,

    /// LLM model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for research. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens for the outline completion. Default: 8000.
    pub max_tokens: usize,

    /// Retries when the provider rate-limits. Default: 3.
    pub max_retries: u32,

    /// Fixed delay between rate-limit retries in milliseconds. Default: 2000.
    pub retry_backoff_ms: u64,

    /// Custom research system prompt. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Title-slide subtitle. Default: [`DEFAULT_SUBTITLE`].
    pub subtitle: String,

    /// Make the deck readable by anyone with the link. Default: true.
    pub share: bool,

    /// Authorised-user credentials file. Default: `token.json`.
    pub token_file: PathBuf,

    /// Positions, sizes and font sizes.
    pub layout: LayoutConfig,

    /// Optional progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            slide_count: 8,
            theme: "corporate".to_string(),
            hero_image_url: None,
            fetch_images: true,
            image_concurrency: 4,
            image_timeout_secs: 5,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 8000,
            max_retries: 3,
            retry_backoff_ms: 2000,
            system_prompt: None,
            subtitle: DEFAULT_SUBTITLE.to_string(),
            share: true,
            token_file: PathBuf::from("token.json"),
            layout: LayoutConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("slide_count", &self.slide_count)
            .field("theme", &self.theme)
            .field("hero_image_url", &self.hero_image_url)
            .field("fetch_images", &self.fetch_images)
            .field("image_concurrency", &self.image_concurrency)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("share", &self.share)
            .field("token_file", &self.token_file)
            .finish()
    }
}

impl GenerationConfig {
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    /// Content slides to research, 1–30; `build()` rejects anything else.
    pub fn slide_count(mut self, n: usize) -> Self {
        self.config.slide_count = n;
        self
    }

    pub fn theme(mut self, name: impl Into<String>) -> Self {
        self.config.theme = name.into();
        self
    }

    pub fn hero_image_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.hero_image_url = if url.trim().is_empty() {
            None
        } else {
            Some(url.trim().to_string())
        };
        self
    }

    pub fn fetch_images(mut self, v: bool) -> Self {
        self.config.fetch_images = v;
        self
    }

    pub fn image_concurrency(mut self, n: usize) -> Self {
        self.config.image_concurrency = n.max(1);
        self
    }

    pub fn image_timeout_secs(mut self, secs: u64) -> Self {
        self.config.image_timeout_secs = secs;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.config.subtitle = subtitle.into();
        self
    }

    pub fn share(mut self, v: bool) -> Self {
        self.config.share = v;
        self
    }

    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.token_file = path.into();
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, DeckError> {
        let c = &self.config;
        if c.slide_count == 0 || c.slide_count > 30 {
            return Err(DeckError::InvalidConfig(format!(
                "slide count must be 1–30, got {}",
                c.slide_count
            )));
        }
        if let Some(ref url) = c.hero_image_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DeckError::InvalidConfig(format!(
                    "hero image must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if c.subtitle.trim().is_empty() {
            return Err(DeckError::InvalidConfig("subtitle must not be empty".into()));
        }
        c.layout.validate()?;
        Ok(self.config)
    }
}

/// Layout constants in EMU (positions, sizes) and points (fonts).
///
/// The defaults target the stock 16:9 Google Slides page. When the fetched
/// presentation reports its own page size, that size wins over
/// `slide_width` / `slide_height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub slide_width: f64,
    pub slide_height: f64,

    /// Per-slide image box, flush to the right edge.
    pub image_width: f64,
    pub image_height: f64,
    pub image_top: f64,

    /// Title-slide image box, centred horizontally.
    pub hero_width: f64,
    pub hero_height: f64,
    /// Top edge of the hero image as a fraction of page height.
    pub hero_top_ratio: f64,

    /// Table box below the slide title.
    pub table_left: f64,
    pub table_top: f64,
    pub table_row_height: f64,

    pub deck_title_pt: f64,
    pub slide_title_pt: f64,
    pub body_pt: f64,
    pub subtitle_pt: f64,
    pub table_header_pt: f64,
    pub table_body_pt: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slide_width: 9_144_000.0,
            slide_height: 5_143_500.0,
            image_width: 4_000_000.0,
            image_height: 3_000_000.0,
            image_top: 1_300_000.0,
            hero_width: 3_000_000.0,
            hero_height: 1_700_000.0,
            hero_top_ratio: 0.42,
            table_left: 457_200.0,
            table_top: 1_250_000.0,
            table_row_height: 370_000.0,
            deck_title_pt: 36.0,
            slide_title_pt: 24.0,
            body_pt: 16.0,
            subtitle_pt: 18.0,
            table_header_pt: 13.0,
            table_body_pt: 11.0,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<(), DeckError> {
        let boxes = [
            ("slide_width", self.slide_width),
            ("slide_height", self.slide_height),
            ("image_width", self.image_width),
            ("image_height", self.image_height),
            ("hero_width", self.hero_width),
            ("hero_height", self.hero_height),
            ("table_row_height", self.table_row_height),
        ];
        for (name, v) in boxes {
            if !(v.is_finite() && v > 0.0) {
                return Err(DeckError::InvalidConfig(format!(
                    "layout.{name} must be positive, got {v}"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.hero_top_ratio) {
            return Err(DeckError::InvalidConfig(format!(
                "layout.hero_top_ratio must be in [0, 1), got {}",
                self.hero_top_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let c = GenerationConfig::builder().build().unwrap();
        assert_eq!(c.slide_count, 8);
        assert_eq!(c.theme, "corporate");
        assert!(c.fetch_images);
        assert!(c.share);
        assert_eq!(c.subtitle, DEFAULT_SUBTITLE);
    }

    #[test]
    fn slide_count_out_of_range_is_rejected() {
        for n in [0, 31, 99] {
            let err = GenerationConfig::builder().slide_count(n).build().unwrap_err();
            assert!(matches!(err, DeckError::InvalidConfig(ref m) if m.contains("1–30")), "{n}");
        }
        let c = GenerationConfig::builder().slide_count(30).build().unwrap();
        assert_eq!(c.slide_count, 30);
        let c = GenerationConfig::builder().slide_count(1).build().unwrap();
        assert_eq!(c.slide_count, 1);
    }

    #[test]
    fn blank_hero_url_means_none() {
        let c = GenerationConfig::builder().hero_image_url("  ").build().unwrap();
        assert!(c.hero_image_url.is_none());
    }

    #[test]
    fn non_http_hero_url_rejected() {
        let err = GenerationConfig::builder()
            .hero_image_url("file:///etc/passwd")
            .build()
            .unwrap_err();
        assert!(matches!(err, DeckError::InvalidConfig(_)));
    }

    #[test]
    fn bad_layout_rejected() {
        let layout = LayoutConfig {
            image_width: 0.0,
            ..LayoutConfig::default()
        };
        let err = GenerationConfig::builder().layout(layout).build().unwrap_err();
        assert!(err.to_string().contains("image_width"));
    }

    #[test]
    fn partial_layout_json_keeps_defaults() {
        let layout: LayoutConfig = serde_json::from_str(r#"{"body_pt": 14}"#).unwrap();
        assert_eq!(layout.body_pt, 14.0);
        assert_eq!(layout.slide_width, 9_144_000.0);
    }
}
