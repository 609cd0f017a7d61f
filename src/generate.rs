//! Caller-facing entry points.
//!
//! [`generate`] runs the whole pipeline with the production collaborators:
//! an LLM outline source, Pexels image search and the Google Slides
//! backend. [`generate_with`] takes the collaborators as trait objects so
//! tests and embedders can swap any of them. [`render`] skips research and
//! builds a deck from an outline the caller already has.
//!
//! Google credentials are only resolved once research has succeeded, so a
//! failed outline never touches the presentation service.

use crate::backend::google::GoogleSlidesBackend;
use crate::backend::DocumentBackend;
use crate::config::GenerationConfig;
use crate::error::{DeckError, RenderStage, SlideError};
use crate::outline::Outline;
use crate::output::{GenerationOutput, GenerationStats};
use crate::pipeline::compile::DocumentCompiler;
use crate::pipeline::images::{resolve_images, ImageFinder, NoImages, PexelsImageFinder};
use crate::pipeline::research::{research, LlmOutlineSource, OutlineSource, ResearchedOutline};
use crate::progress::Phase;
use crate::theme::ThemeRegistry;
use std::time::Instant;
use tracing::{info, warn};

/// The three external services a generation talks to.
pub struct Collaborators<'a> {
    pub outline_source: &'a dyn OutlineSource,
    pub image_finder: &'a dyn ImageFinder,
    pub backend: &'a dyn DocumentBackend,
}

/// Generate a deck about `topic` and return its link.
///
/// # Errors
/// * [`DeckError::ResearchFailed`] when no usable outline could be produced
/// * [`DeckError::RenderingFailed`] when authentication or any Google API
///   call failed
/// * [`DeckError::InvalidConfig`] for a blank topic
pub async fn generate(
    topic: &str,
    config: &GenerationConfig,
) -> Result<GenerationOutput, DeckError> {
    let start = Instant::now();
    let topic = validate_topic(topic)?;

    let source = LlmOutlineSource::from_config(config).map_err(|e| with_topic(e, topic))?;
    let (researched, research_ms) = timed_research(&source, topic, config).await?;

    let backend = connect_backend(config).await?;
    let finder = default_image_finder(config);
    finish(researched, research_ms, &backend, finder.as_ref(), config, start).await
}

/// [`generate`] with caller-supplied collaborators.
pub async fn generate_with(
    topic: &str,
    collaborators: &Collaborators<'_>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, DeckError> {
    let start = Instant::now();
    let topic = validate_topic(topic)?;
    let (researched, research_ms) =
        timed_research(collaborators.outline_source, topic, config).await?;
    finish(
        researched,
        research_ms,
        collaborators.backend,
        collaborators.image_finder,
        config,
        start,
    )
    .await
}

/// Research only: the outline a generation would render.
pub async fn research_outline(
    topic: &str,
    config: &GenerationConfig,
) -> Result<ResearchedOutline, DeckError> {
    let topic = validate_topic(topic)?;
    let source = LlmOutlineSource::from_config(config).map_err(|e| with_topic(e, topic))?;
    research(&source, topic, config).await
}

/// Build a deck from an existing outline with the production backend.
pub async fn render(
    outline: Outline,
    config: &GenerationConfig,
) -> Result<GenerationOutput, DeckError> {
    let start = Instant::now();
    validate_outline(&outline)?;
    let backend = connect_backend(config).await?;
    let finder = default_image_finder(config);
    finish(outline.into(), 0, &backend, finder.as_ref(), config, start).await
}

/// Build a deck from an existing outline with caller-supplied services.
pub async fn render_with(
    outline: Outline,
    backend: &dyn DocumentBackend,
    image_finder: &dyn ImageFinder,
    config: &GenerationConfig,
) -> Result<GenerationOutput, DeckError> {
    let start = Instant::now();
    validate_outline(&outline)?;
    finish(outline.into(), 0, backend, image_finder, config, start).await
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    topic: &str,
    config: &GenerationConfig,
) -> Result<GenerationOutput, DeckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DeckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(topic, config))
}

// ── Internals ────────────────────────────────────────────────────────────

async fn finish(
    researched: ResearchedOutline,
    research_duration_ms: u64,
    backend: &dyn DocumentBackend,
    finder: &dyn ImageFinder,
    config: &GenerationConfig,
    start: Instant,
) -> Result<GenerationOutput, DeckError> {
    let ResearchedOutline {
        outline,
        rejected,
        retries,
    } = researched;

    let image_start = Instant::now();
    let image_urls = lookup_images(&outline, finder, config).await;
    let image_duration_ms = image_start.elapsed().as_millis() as u64;

    let render_start = Instant::now();
    let themes = ThemeRegistry::builtin();
    let rendered = DocumentCompiler::new(backend, &themes, config)
        .compile(&outline, &image_urls)
        .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let mut skipped: Vec<SlideError> = rejected;
    skipped.extend(rendered.skipped_slides);

    let stats = GenerationStats {
        slide_count: outline.slides.len() - skipped.iter().filter(|e| is_missing_page(e)).count(),
        table_slides: rendered.table_slides,
        images_placed: rendered.images_placed,
        skipped_slides: skipped.len(),
        requests_submitted: rendered.requests_submitted,
        research_retries: retries,
        research_duration_ms,
        image_duration_ms,
        render_duration_ms,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Deck ready: {} ({} slides, {} images, {}ms)",
        rendered.url, stats.slide_count, stats.images_placed, stats.total_duration_ms
    );

    Ok(GenerationOutput {
        url: rendered.url,
        presentation_id: rendered.presentation_id,
        outline,
        skipped,
        stats,
    })
}

async fn timed_research(
    source: &dyn OutlineSource,
    topic: &str,
    config: &GenerationConfig,
) -> Result<(ResearchedOutline, u64), DeckError> {
    let start = Instant::now();
    let researched = research(source, topic, config).await?;
    Ok((researched, start.elapsed().as_millis() as u64))
}

async fn lookup_images(
    outline: &Outline,
    finder: &dyn ImageFinder,
    config: &GenerationConfig,
) -> Vec<Option<String>> {
    if !config.fetch_images {
        return vec![None; outline.slides.len()];
    }
    let start = Instant::now();
    if let Some(ref cb) = config.progress_callback {
        cb.on_phase_start(Phase::Images);
    }
    let urls = resolve_images(&outline.slides, finder, config.image_concurrency).await;
    let found = urls.iter().filter(|u| u.is_some()).count();
    let elapsed = start.elapsed().as_millis() as u64;
    info!(
        "Resolved {}/{} slide images in {}ms",
        found,
        outline.slides.iter().filter(|s| s.image_query().is_some()).count(),
        elapsed
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_phase_complete(Phase::Images, elapsed);
    }
    urls
}

async fn connect_backend(config: &GenerationConfig) -> Result<GoogleSlidesBackend, DeckError> {
    GoogleSlidesBackend::connect(&config.token_file)
        .await
        .map_err(|e| DeckError::rendering(RenderStage::Auth, e))
}

fn default_image_finder(config: &GenerationConfig) -> Box<dyn ImageFinder> {
    if !config.fetch_images {
        return Box::new(NoImages);
    }
    match PexelsImageFinder::from_env(config.image_timeout_secs) {
        Some(finder) => Box::new(finder),
        None => {
            warn!("PEXELS_API_KEY not set; slides will have no images");
            Box::new(NoImages)
        }
    }
}

fn validate_topic(topic: &str) -> Result<&str, DeckError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(DeckError::InvalidConfig("topic must not be empty".to_string()));
    }
    Ok(topic)
}

fn validate_outline(outline: &Outline) -> Result<(), DeckError> {
    if outline.topic.trim().is_empty() {
        return Err(DeckError::InvalidConfig("outline topic must not be empty".to_string()));
    }
    if outline.slides.is_empty() {
        return Err(DeckError::InvalidConfig("outline has no slides".to_string()));
    }
    Ok(())
}

fn is_missing_page(err: &SlideError) -> bool {
    matches!(err, SlideError::MissingPage { .. })
}

/// Provider resolution happens before a topic is known to the error.
fn with_topic(err: DeckError, topic: &str) -> DeckError {
    match err {
        DeckError::ResearchFailed { reason, .. } => DeckError::ResearchFailed {
            topic: topic.to_string(),
            reason,
        },
        other => other,
    }
}
