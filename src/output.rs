//! Result types returned by [`crate::generate`] and friends.

use crate::error::SlideError;
use crate::outline::Outline;
use serde::{Deserialize, Serialize};

/// A finished deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// Editor link for the presentation.
    pub url: String,
    pub presentation_id: String,
    /// The outline the deck was built from, after draft cleanup.
    pub outline: Outline,
    /// Outline entries that were dropped, with the reason.
    pub skipped: Vec<SlideError>,
    pub stats: GenerationStats,
}

/// Counters and timings for one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Content slides rendered (title slide excluded).
    pub slide_count: usize,
    pub table_slides: usize,
    pub images_placed: usize,
    pub skipped_slides: usize,
    /// Operations in the content batch.
    pub requests_submitted: usize,
    pub research_retries: u32,
    pub research_duration_ms: u64,
    pub image_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_flat() {
        let stats = GenerationStats {
            slide_count: 8,
            images_placed: 5,
            ..Default::default()
        };
        let v = serde_json::to_value(&stats).unwrap();
        assert_eq!(v["slide_count"], 8);
        assert_eq!(v["images_placed"], 5);
        assert_eq!(v["research_retries"], 0);
    }
}
