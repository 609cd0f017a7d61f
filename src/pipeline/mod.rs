//! Pipeline stages for topic-to-deck generation.
//!
//! ## Data Flow
//!
//! ```text
//! research ──▶ images ──▶ layout ──▶ compile
//!  (LLM)      (Pexels)    (pure)    (Slides API)
//! ```
//!
//! 1. [`research`]: ask the outline source for a typed outline; the only
//!    stage that retries, and only on rate limiting
//! 2. [`images`]: resolve each slide's image query, concurrently, back
//!    into slide order
//! 3. [`layout`]: turn one slide plus its placeholder ids into edit
//!    operations grouped by batch category
//! 4. [`compile`]: drive the document backend: skeleton, fetch, one
//!    ordered content batch, share

pub mod compile;
pub mod images;
pub mod layout;
pub mod research;
