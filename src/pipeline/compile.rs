//! Phase 3: compile an outline into a live presentation.
//!
//! ## Backend protocol
//!
//! ```text
//! create(topic) ─▶ delete default slide
//!               ─▶ batch: createSlide × (N + 1)
//!               ─▶ get   (placeholder ids now exist)
//!               ─▶ batch: background → delete → resize → text → table → image
//!               ─▶ grant anyone/reader
//! ```
//!
//! The content batch is the only one whose order matters beyond creation.
//! Each category is accumulated across all slides and then concatenated, so
//! every body resize precedes every image and every placeholder deletion
//! precedes every table on the same page.
//!
//! Any backend failure aborts with [`DeckError::RenderingFailed`]; nothing
//! is retried or rolled back. A slide whose page cannot be found in the
//! fetched presentation is skipped and reported.

use super::layout::{
    plan_slide, plan_title_slide, BatchPlan, PageGeometry, Placeholders, SlideContext, TitleSlide,
};
use crate::backend::model::Presentation;
use crate::backend::requests::{PredefinedLayout, Request};
use crate::backend::{DocumentBackend, Permission};
use crate::config::GenerationConfig;
use crate::error::{DeckError, RenderStage, SlideError};
use crate::outline::Outline;
use crate::progress::Phase;
use crate::theme::ThemeRegistry;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Object id of the opening slide.
pub const TITLE_SLIDE_ID: &str = "slide_0";

/// Object id of the content slide at 1-based `index`.
pub fn slide_object_id(index: usize) -> String {
    format!("slide_{index}")
}

/// What a finished render produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub presentation_id: String,
    pub url: String,
    /// Operations in the content batch.
    pub requests_submitted: usize,
    /// Images placed, hero included.
    pub images_placed: usize,
    pub table_slides: usize,
    pub skipped_slides: Vec<SlideError>,
    pub shared: bool,
}

/// The content batch for one deck, before submission.
#[derive(Debug, Default)]
pub struct PlannedDeck {
    pub batch: BatchPlan,
    pub skipped: Vec<SlideError>,
    /// Table slides actually planned; skipped pages are not counted.
    pub table_slides: usize,
}

/// Drives a [`DocumentBackend`] through one deck.
pub struct DocumentCompiler<'a> {
    backend: &'a dyn DocumentBackend,
    themes: &'a ThemeRegistry,
    config: &'a GenerationConfig,
}

impl<'a> DocumentCompiler<'a> {
    pub fn new(
        backend: &'a dyn DocumentBackend,
        themes: &'a ThemeRegistry,
        config: &'a GenerationConfig,
    ) -> Self {
        Self {
            backend,
            themes,
            config,
        }
    }

    /// Build the deck for `outline`.
    ///
    /// `image_urls` is index-aligned with `outline.slides`; a short slice
    /// means "no image" for the remainder.
    pub async fn compile(
        &self,
        outline: &Outline,
        image_urls: &[Option<String>],
    ) -> Result<RenderOutput, DeckError> {
        let start = Instant::now();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(Phase::Render);
        }

        // ── 1. Empty presentation ────────────────────────────────────────
        let created = self
            .backend
            .create_presentation(&outline.topic)
            .await
            .map_err(|e| DeckError::rendering(RenderStage::Create, e))?;
        let presentation_id = created.presentation_id.clone();
        info!("Created presentation {}", presentation_id);

        let defaults: Vec<Request> = created
            .slides
            .iter()
            .map(|p| Request::delete_object(&p.object_id))
            .collect();
        if !defaults.is_empty() {
            self.backend
                .batch_update(&presentation_id, &defaults)
                .await
                .map_err(|e| DeckError::rendering(RenderStage::Create, e))?;
            debug!("Removed {} default slide(s)", defaults.len());
        }

        // ── 2. Slide skeleton ────────────────────────────────────────────
        let skeleton = skeleton_requests(outline.slides.len());
        self.backend
            .batch_update(&presentation_id, &skeleton)
            .await
            .map_err(|e| DeckError::rendering(RenderStage::CreateSlides, e))?;
        debug!("Created {} slides", skeleton.len());

        // ── 3. Placeholder discovery ─────────────────────────────────────
        let fetched = self
            .backend
            .get_presentation(&presentation_id)
            .await
            .map_err(|e| DeckError::rendering(RenderStage::Fetch, e))?;

        // ── 4–7. Plan ────────────────────────────────────────────────────
        let PlannedDeck {
            batch,
            skipped: skipped_slides,
            table_slides,
        } = self.plan(outline, image_urls, &fetched);
        let images_placed = batch.image.len();
        let requests = batch.into_requests();
        let requests_submitted = requests.len();

        // ── 8–9. Content batch ───────────────────────────────────────────
        if !requests.is_empty() {
            self.backend
                .batch_update(&presentation_id, &requests)
                .await
                .map_err(|e| DeckError::rendering(RenderStage::BatchUpdate, e))?;
        }
        info!(
            "Submitted {} operations ({} images) to {}",
            requests_submitted, images_placed, presentation_id
        );

        // ── 10. Share ────────────────────────────────────────────────────
        if self.config.share {
            self.backend
                .grant_permission(&presentation_id, &Permission::anyone_reader())
                .await
                .map_err(|e| DeckError::rendering(RenderStage::Share, e))?;
            debug!("Shared {} with anyone holding the link", presentation_id);
        }

        // ── 11. Link ─────────────────────────────────────────────────────
        let url = self.backend.viewer_url(&presentation_id);
        let elapsed = start.elapsed().as_millis() as u64;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_complete(Phase::Render, elapsed);
        }

        Ok(RenderOutput {
            presentation_id,
            url,
            requests_submitted,
            images_placed,
            table_slides,
            skipped_slides,
            shared: self.config.share,
        })
    }

    /// Plan every slide against the fetched structure. Pure.
    ///
    /// Pages missing from `presentation` get no operations at all, not
    /// even a background fill; the backend rejects a whole batch that
    /// names an unknown object.
    pub fn plan(
        &self,
        outline: &Outline,
        image_urls: &[Option<String>],
        presentation: &Presentation,
    ) -> PlannedDeck {
        let theme = match self.themes.lookup(&self.config.theme) {
            Some(theme) => theme,
            None => {
                warn!(
                    "Unknown theme '{}', using the default theme",
                    self.config.theme
                );
                self.themes.resolve(&self.config.theme)
            }
        };
        let layout = &self.config.layout;
        let page = PageGeometry::resolve(presentation.page_size.as_ref(), layout);
        let total = outline.slides.len();
        let mut deck = PlannedDeck::default();

        match presentation.slide(TITLE_SLIDE_ID) {
            Some(title_page) => {
                if let Some(background) = theme.background_color {
                    deck.batch
                        .background
                        .push(Request::fill_page(TITLE_SLIDE_ID, background));
                }
                let placeholders = Placeholders::from_page(title_page);
                deck.batch.absorb(plan_title_slide(
                    &TitleSlide {
                        topic: &outline.topic,
                        subtitle: &self.config.subtitle,
                        page_id: TITLE_SLIDE_ID,
                        placeholders: &placeholders,
                        hero_image_url: self.config.hero_image_url.as_deref(),
                    },
                    page,
                    theme,
                    layout,
                ));
            }
            None => warn!("Title slide missing from the fetched presentation"),
        }

        for (i, slide) in outline.slides.iter().enumerate() {
            let index = i + 1;
            let page_id = slide_object_id(index);

            let Some(fetched) = presentation.slide(&page_id) else {
                let err = SlideError::MissingPage {
                    index,
                    page_id: page_id.clone(),
                };
                warn!("Skipping slide: {}", err);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_slide_skipped(index, &err.to_string());
                }
                deck.skipped.push(err);
                continue;
            };

            if let Some(background) = theme.background_color {
                deck.batch
                    .background
                    .push(Request::fill_page(&page_id, background));
            }
            let placeholders = Placeholders::from_page(fetched);
            let ctx = SlideContext {
                index,
                page_id: &page_id,
                placeholders: &placeholders,
                image_url: image_urls.get(i).and_then(|u| u.as_deref()),
                page,
            };
            let slide_plan = plan_slide(slide, &ctx, theme, layout);
            debug!(
                "Slide {}/{} '{}': {} operations",
                index,
                total,
                slide.title,
                slide_plan.len()
            );
            deck.batch.absorb(slide_plan);
            if slide.is_table() {
                deck.table_slides += 1;
            }

            if let Some(ref cb) = self.config.progress_callback {
                cb.on_slide_planned(index, total, &slide.title);
            }
        }

        deck
    }
}

/// One title slide followed by `count` title-and-body slides.
pub fn skeleton_requests(count: usize) -> Vec<Request> {
    std::iter::once(Request::create_slide(TITLE_SLIDE_ID, PredefinedLayout::Title))
        .chain((1..=count).map(|i| {
            Request::create_slide(slide_object_id(i), PredefinedLayout::TitleAndBody)
        }))
        .collect()
}
