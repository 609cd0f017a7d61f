//! Phase 1: turn a topic into an [`Outline`].
//!
//! [`OutlineSource`] is the collaborator seam; [`LlmOutlineSource`] is the
//! production implementation on top of `edgequake-llm`. [`research`] wraps
//! any source with the one retry policy the pipeline has: a rate-limited
//! call is retried after a fixed delay, everything else fails at once.

use crate::config::GenerationConfig;
use crate::error::{DeckError, ResearchError, SlideError};
use crate::outline::Outline;
use crate::progress::Phase;
use crate::prompts::{outline_prompt, DEFAULT_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Model used when a provider is named but no model is.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// An outline plus the entries that had to be dropped while parsing it.
#[derive(Debug, Clone)]
pub struct ResearchedOutline {
    pub outline: Outline,
    pub rejected: Vec<SlideError>,
    /// Rate-limit retries spent getting it.
    pub retries: u32,
}

impl From<Outline> for ResearchedOutline {
    fn from(outline: Outline) -> Self {
        Self {
            outline,
            rejected: Vec::new(),
            retries: 0,
        }
    }
}

/// Produces an outline for a topic.
#[async_trait]
pub trait OutlineSource: Send + Sync {
    /// Research `topic` into exactly `slide_count` slides.
    async fn outline(
        &self,
        topic: &str,
        slide_count: usize,
    ) -> Result<ResearchedOutline, ResearchError>;
}

/// Run `source`, retrying only on rate limiting.
///
/// Waits `retry_backoff_ms` between attempts (or the provider's
/// `retry-after` hint when that is longer), at most `max_retries` times.
pub async fn research(
    source: &dyn OutlineSource,
    topic: &str,
    config: &GenerationConfig,
) -> Result<ResearchedOutline, DeckError> {
    let start = Instant::now();
    info!("Researching '{}' ({} slides)", topic, config.slide_count);
    if let Some(ref cb) = config.progress_callback {
        cb.on_phase_start(Phase::Research);
    }

    let mut attempt = 0u32;
    let result = loop {
        match source.outline(topic, config.slide_count).await {
            Ok(mut researched) => {
                researched.retries = attempt;
                break Ok(researched);
            }
            Err(ResearchError::RateLimited { retry_after_secs })
                if attempt < config.max_retries =>
            {
                attempt += 1;
                let hinted = retry_after_secs.unwrap_or(0).saturating_mul(1000);
                let backoff = config.retry_backoff_ms.max(hinted);
                warn!(
                    "Rate limited while researching '{}': retry {}/{} after {}ms",
                    topic, attempt, config.max_retries, backoff
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_research_retry(attempt, config.max_retries, backoff);
                }
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(ResearchError::RateLimited { .. }) => {
                break Err(DeckError::ResearchFailed {
                    topic: topic.to_string(),
                    reason: format!(
                        "still rate limited after {} retries",
                        config.max_retries
                    ),
                });
            }
            Err(e) => {
                break Err(DeckError::ResearchFailed {
                    topic: topic.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    };

    let researched = result?;
    for err in &researched.rejected {
        warn!("Dropping slide: {}", err);
        if let Some(ref cb) = config.progress_callback {
            let index = match err {
                SlideError::Malformed { index, .. } | SlideError::MissingPage { index, .. } => {
                    *index
                }
            };
            cb.on_slide_skipped(index, &err.to_string());
        }
    }

    let elapsed = start.elapsed().as_millis() as u64;
    info!(
        "Research complete: {} slides planned for '{}' in {}ms",
        researched.outline.slides.len(),
        researched.outline.topic,
        elapsed
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_phase_complete(Phase::Research, elapsed);
    }
    Ok(researched)
}

// ── LLM-backed source ────────────────────────────────────────────────────

/// [`OutlineSource`] that asks an LLM for the outline JSON.
pub struct LlmOutlineSource {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    temperature: f32,
    max_tokens: usize,
}

impl LlmOutlineSource {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Resolve the provider from `config` and the environment.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, DeckError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

#[async_trait]
impl OutlineSource for LlmOutlineSource {
    async fn outline(
        &self,
        topic: &str,
        slide_count: usize,
    ) -> Result<ResearchedOutline, ResearchError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(outline_prompt(topic, slide_count)),
        ];
        let options = build_options(self.temperature, self.max_tokens);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))?;
        debug!(
            "Outline completion: {} input tokens, {} output tokens, {} bytes",
            response.prompt_tokens,
            response.completion_tokens,
            response.content.len()
        );

        let (outline, rejected) = Outline::from_json(&response.content, topic, Some(slide_count))?;
        Ok(ResearchedOutline {
            outline,
            rejected,
            retries: 0,
        })
    }
}

static RE_RETRY_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)retry[ _-]?after\D{0,12}(\d+)").expect("static regex")
});

/// Map a provider error message onto the research taxonomy.
///
/// Providers surface throttling differently (HTTP 429, OpenAI's
/// "Rate limit reached", Gemini's RESOURCE_EXHAUSTED), so the message is
/// the only common ground.
pub fn classify_provider_error(message: &str) -> ResearchError {
    let lower = message.to_ascii_lowercase();
    let throttled = [
        "429",
        "rate limit",
        "ratelimit",
        "rate_limit",
        "too many requests",
        "resource_exhausted",
        "resource exhausted",
    ]
    .iter()
    .any(|needle| lower.contains(needle));
    if throttled {
        let retry_after_secs = RE_RETRY_AFTER
            .captures(message)
            .and_then(|c| c[1].parse().ok());
        return ResearchError::RateLimited { retry_after_secs };
    }
    ResearchError::Provider(message.to_string())
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`)
/// 2. **Named provider + model** (`config.provider_name`)
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`)
/// 4. **OpenAI key present** (`OPENAI_API_KEY`)
/// 5. **Full auto-detection** (`ProviderFactory::from_env`)
pub fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn LLMProvider>, DeckError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DeckError::ResearchFailed {
            topic: String::new(),
            reason: format!(
                "no LLM provider could be auto-detected from the environment. \
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, or pass --provider. ({e})"
            ),
        })?;
    Ok(llm_provider)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DeckError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DeckError::ResearchFailed {
            topic: String::new(),
            reason: format!("LLM provider '{provider_name}' is not configured: {e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_rate_limits() {
        for msg in [
            "API error: 429 Too Many Requests",
            "Rate limit reached for gpt-4.1-mini in organization org-x",
            "RESOURCE_EXHAUSTED: Quota exceeded",
            "rate_limit_exceeded",
        ] {
            assert!(
                matches!(classify_provider_error(msg), ResearchError::RateLimited { .. }),
                "{msg}"
            );
        }
    }

    #[test]
    fn parses_retry_after_hint() {
        match classify_provider_error("429: rate limited, Retry-After: 7") {
            ResearchError::RateLimited { retry_after_secs } => {
                assert_eq!(retry_after_secs, Some(7))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn other_errors_are_provider_errors() {
        assert!(matches!(
            classify_provider_error("Authentication error: invalid api key"),
            ResearchError::Provider(_)
        ));
    }

    #[test]
    fn options_follow_config() {
        let config = GenerationConfig::builder()
            .temperature(0.3)
            .max_tokens(1234)
            .build()
            .unwrap();
        let opts = build_options(config.temperature, config.max_tokens);
        assert_eq!(opts.temperature, Some(0.3));
        assert_eq!(opts.max_tokens, Some(1234));
    }

    struct Scripted {
        failures: std::sync::Mutex<Vec<ResearchError>>,
        calls: std::sync::atomic::AtomicU32,
    }

    impl Scripted {
        fn new(failures: Vec<ResearchError>) -> Self {
            Self {
                failures: std::sync::Mutex::new(failures),
                calls: Default::default(),
            }
        }
    }

    #[async_trait]
    impl OutlineSource for Scripted {
        async fn outline(
            &self,
            topic: &str,
            _n: usize,
        ) -> Result<ResearchedOutline, ResearchError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if let Some(err) = self.failures.lock().unwrap().pop() {
                return Err(err);
            }
            let raw =
                format!(r#"{{"topic":"{topic}","slides":[{{"title":"A","bullets":["x"]}}]}}"#);
            let (outline, rejected) = Outline::from_json(&raw, topic, None)?;
            Ok(ResearchedOutline {
                outline,
                rejected,
                retries: 0,
            })
        }
    }

    fn fast_config(max_retries: u32) -> GenerationConfig {
        GenerationConfig::builder()
            .slide_count(1)
            .max_retries(max_retries)
            .retry_backoff_ms(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn retries_rate_limits_then_succeeds() {
        let source = Scripted::new(vec![
            ResearchError::RateLimited { retry_after_secs: None },
            ResearchError::RateLimited { retry_after_secs: None },
        ]);
        let researched = research(&source, "Tides", &fast_config(3)).await.unwrap();
        assert_eq!(researched.retries, 2);
        assert_eq!(researched.outline.slides.len(), 1);
        assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let source = Scripted::new(vec![
            ResearchError::RateLimited { retry_after_secs: None },
            ResearchError::RateLimited { retry_after_secs: None },
            ResearchError::RateLimited { retry_after_secs: None },
        ]);
        let err = research(&source, "Tides", &fast_config(2)).await.unwrap_err();
        assert!(matches!(err, DeckError::ResearchFailed { .. }));
        assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_other_errors() {
        let source = Scripted::new(vec![ResearchError::InvalidResponse("not json".into())]);
        let err = research(&source, "Tides", &fast_config(3)).await.unwrap_err();
        assert!(err.to_string().contains("not json"));
        assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
