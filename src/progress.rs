//! Progress-callback trait for generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to follow a
//! generation as it moves through its phases.
//!
//! # Example
//!
//! ```rust
//! use edgequake_slides::{GenerationConfig, GenerationProgressCallback, Phase};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl GenerationProgressCallback for Printer {
//!     fn on_phase_complete(&self, phase: Phase, elapsed_ms: u64) {
//!         eprintln!("{phase} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Coarse stages of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Asking the LLM for the outline.
    Research,
    /// Resolving per-slide image queries.
    Images,
    /// Building the presentation through the document backend.
    Render,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Research => "research",
            Phase::Images => "image lookup",
            Phase::Render => "rendering",
        })
    }
}

/// Called by the pipeline as a generation progresses.
///
/// All methods default to no-ops. Implementations must be `Send + Sync`;
/// image lookups run concurrently, although events are only emitted from
/// the driving task.
pub trait GenerationProgressCallback: Send + Sync {
    fn on_phase_start(&self, phase: Phase) {
        let _ = phase;
    }

    fn on_phase_complete(&self, phase: Phase, elapsed_ms: u64) {
        let _ = (phase, elapsed_ms);
    }

    /// The outline source was rate-limited; sleeping `backoff_ms` before
    /// attempt `attempt` of `max_retries`.
    fn on_research_retry(&self, attempt: u32, max_retries: u32, backoff_ms: u64) {
        let _ = (attempt, max_retries, backoff_ms);
    }

    /// A content slide's operations were planned.
    ///
    /// # Arguments
    /// * `index`: 1-based slide number
    /// * `total`: content slides in the outline
    fn on_slide_planned(&self, index: usize, total: usize, title: &str) {
        let _ = (index, total, title);
    }

    /// A slide was dropped; the rest of the deck continues.
    fn on_slide_skipped(&self, index: usize, error: &str) {
        let _ = (index, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
