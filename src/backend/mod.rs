//! The remote presentation service.
//!
//! [`DocumentBackend`] is the seam between the compiler and the network:
//! the compiler only ever speaks in typed [`requests::Request`]s and reads
//! typed [`model::Presentation`]s, so tests drive it with an in-memory
//! backend and production uses [`google::GoogleSlidesBackend`].
//!
//! ```text
//! create ──▶ batch_update(createSlide…) ──▶ get ──▶ batch_update(content) ──▶ grant
//! ```

pub mod auth;
pub mod google;
pub mod model;
pub mod requests;

use crate::error::BackendError;
use async_trait::async_trait;
use model::Presentation;
use requests::Request;
use serde::{Deserialize, Serialize};

/// Operations the compiler needs from a presentation service.
///
/// Every object id that appears in submitted requests is chosen by the
/// caller; the backend only generates ids for placeholders, which is why
/// [`DocumentBackend::get_presentation`] must be called after slides exist.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Create an empty presentation. The service adds one default slide.
    async fn create_presentation(&self, title: &str) -> Result<Presentation, BackendError>;

    /// Apply `requests` in order. Either all apply or the call fails.
    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[Request],
    ) -> Result<(), BackendError>;

    /// Read the full presentation structure.
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, BackendError>;

    /// Grant `permission` on the presentation file.
    async fn grant_permission(
        &self,
        presentation_id: &str,
        permission: &Permission,
    ) -> Result<(), BackendError>;

    /// Canonical viewer URL for a presentation id.
    fn viewer_url(&self, presentation_id: &str) -> String {
        viewer_url(presentation_id)
    }
}

/// Google Slides editor link for a presentation id.
pub fn viewer_url(presentation_id: &str) -> String {
    format!("https://docs.google.com/presentation/d/{presentation_id}/edit")
}

/// A Drive permission grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub role: String,
    #[serde(rename = "type")]
    pub scope: String,
}

impl Permission {
    /// Anyone holding the link may view.
    pub fn anyone_reader() -> Self {
        Self {
            role: "reader".to_string(),
            scope: "anyone".to_string(),
        }
    }
}
