//! Error types for the edgequake-slides library.
//!
//! Two levels of failure, mirroring how a generation actually breaks:
//!
//! * [`DeckError`]: fatal, the generation cannot produce a deck
//!   (research failed, a Google API call failed, bad configuration).
//!   Returned as `Err(DeckError)` from [`crate::generate`] and friends.
//!
//! * [`SlideError`]: non-fatal, one outline entry could not be turned
//!   into a slide. The entry is skipped, logged and reported through the
//!   progress callback; every other slide is still built.
//!
//! The collaborator errors ([`ResearchError`], [`BackendError`]) are what
//! the outline source and the document backend return. The pipeline folds
//! them into a [`DeckError`] tagged with the phase that failed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-slides library.
#[derive(Debug, Error)]
pub enum DeckError {
    // ── Phase 1: research ─────────────────────────────────────────────────
    /// The outline source could not produce a usable outline.
    ///
    /// Transport errors, non-JSON responses, schema mismatches and exhausted
    /// rate-limit retries all end up here. No document has been created yet.
    #[error("Research failed for '{topic}': {reason}")]
    ResearchFailed { topic: String, reason: String },

    // ── Phase 2: rendering ────────────────────────────────────────────────
    /// A document-backend call failed. The remote presentation, if one was
    /// already created, is left as-is.
    #[error("Rendering failed during {stage}: {reason}")]
    RenderingFailed { stage: RenderStage, reason: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// An outline file could not be read or written.
    #[error("Failed to access outline file '{path}': {source}")]
    OutlineIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeckError {
    /// Wrap a backend failure with the stage it happened in.
    pub fn rendering(stage: RenderStage, err: BackendError) -> Self {
        DeckError::RenderingFailed {
            stage,
            reason: err.to_string(),
        }
    }

    /// Which phase failed, for user-facing reports.
    pub fn phase(&self) -> &'static str {
        match self {
            DeckError::ResearchFailed { .. } => "research",
            DeckError::RenderingFailed { .. } => "rendering",
            DeckError::OutlineIo { .. } | DeckError::InvalidConfig(_) => "setup",
            DeckError::Internal(_) => "internal",
        }
    }
}

/// The document-backend step a [`DeckError::RenderingFailed`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RenderStage {
    /// Acquiring an access token.
    Auth,
    /// Creating the empty presentation (and removing its default slide).
    Create,
    /// Creating the title slide and one slide per outline entry.
    CreateSlides,
    /// Re-reading the presentation to discover placeholder ids.
    Fetch,
    /// Submitting the content batch.
    BatchUpdate,
    /// Granting link-reader permission.
    Share,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RenderStage::Auth => "authentication",
            RenderStage::Create => "presentation creation",
            RenderStage::CreateSlides => "slide creation",
            RenderStage::Fetch => "presentation fetch",
            RenderStage::BatchUpdate => "content batch update",
            RenderStage::Share => "sharing",
        };
        f.write_str(s)
    }
}

/// A non-fatal error for a single outline entry.
///
/// The slide is skipped; the rest of the deck is unaffected.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum SlideError {
    /// The entry mixes content modes or has a table whose rows do not fit
    /// its header.
    #[error("Slide {index} ('{title}') is malformed: {reason}")]
    Malformed {
        index: usize,
        title: String,
        reason: String,
    },

    /// The backend did not report the page created for this entry.
    #[error("Slide {index}: page '{page_id}' missing from the fetched presentation")]
    MissingPage { index: usize, page_id: String },
}

/// Errors returned by an [`crate::pipeline::research::OutlineSource`].
#[derive(Debug, Clone, Error)]
pub enum ResearchError {
    /// The provider throttled us; the only condition that is retried.
    #[error("Rate limited by the LLM provider")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Transport, auth or other provider-side failure.
    #[error("LLM provider error: {0}")]
    Provider(String),

    /// The completion was not a JSON outline of the expected shape.
    #[error("Invalid outline response: {0}")]
    InvalidResponse(String),

    /// The model returned fewer slides than were asked for.
    #[error("Expected {expected} slides, the model returned {actual}")]
    SlideCountMismatch { expected: usize, actual: usize },
}

/// Errors returned by a [`crate::backend::DocumentBackend`].
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// No usable credentials, or the token refresh was rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never got a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}
