//! # edgequake-slides
//!
//! Turn a one-line topic into a themed Google Slides deck.
//!
//! An LLM researches the topic into a structured outline (titles, bullets,
//! speaker notes, image hints, the occasional table). The outline is then
//! compiled into one ordered batch of Slides API edits: text, styles,
//! tables, images and background fills, positioned so body text and
//! pictures never overlap.
//!
//! ## Pipeline Overview
//!
//! ```text
//! topic
//!  │
//!  ├─ 1. Research  LLM → JSON outline (retried on rate limits only)
//!  ├─ 2. Images    Pexels lookups, concurrent, reassembled in slide order
//!  ├─ 3. Skeleton  create presentation + N+1 slides, fetch placeholder ids
//!  ├─ 4. Layout    per-slide plans merged into
//!  │               background → delete → resize → text → table → image
//!  ├─ 5. Submit    one batchUpdate
//!  └─ 6. Share     anyone-with-link reader, return the editor URL
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_slides::{generate, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY,
//!     // Google credentials from GOOGLE_ACCESS_TOKEN or token.json.
//!     let config = GenerationConfig::builder()
//!         .theme("dark")
//!         .slide_count(6)
//!         .build()?;
//!     let output = generate("The history of the printing press", &config).await?;
//!     println!("{}", output.url);
//!     eprintln!("{} slides, {} images", output.stats.slide_count, output.stats.images_placed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `deckgen` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-slides = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod generate;
pub mod outline;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod theme;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::DocumentBackend;
pub use config::{GenerationConfig, GenerationConfigBuilder, LayoutConfig};
pub use error::{BackendError, DeckError, RenderStage, ResearchError, SlideError};
pub use generate::{
    generate, generate_sync, generate_with, render, render_with, research_outline, Collaborators,
};
pub use outline::{Outline, Slide, SlideContent, Table};
pub use output::{GenerationOutput, GenerationStats};
pub use pipeline::images::ImageFinder;
pub use pipeline::research::{OutlineSource, ResearchedOutline};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, Phase, ProgressCallback};
pub use theme::{Theme, ThemeRegistry};
