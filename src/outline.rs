//! The researched outline: topic plus ordered slides.
//!
//! A slide is either a bullet slide (bullets, optional image query) or a
//! table slide; [`SlideContent`] makes the two modes exclusive, so the
//! compiler never sees a table slide carrying bullets.
//!
//! Model output arrives as an [`OutlineDraft`], a loose mirror of the JSON
//! the prompt asks for. Converting a draft is lenient where the intent is
//! clear (blank strings mean "absent", object-shaped rows are flattened)
//! and strict where it is not: a slide that still mixes modes becomes a
//! [`SlideError::Malformed`] and is dropped on its own.

use crate::error::{DeckError, ResearchError, SlideError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// A researched presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub topic: String,
    pub slides: Vec<Slide>,
}

impl Outline {
    pub fn table_slide_count(&self) -> usize {
        self.slides.iter().filter(|s| s.is_table()).count()
    }

    /// Parse an outline JSON document (model output or a saved file).
    ///
    /// Malformed slides are returned alongside the outline instead of
    /// failing the whole parse. `expected` enforces the slide count.
    pub fn from_json(
        raw: &str,
        fallback_topic: &str,
        expected: Option<usize>,
    ) -> Result<(Outline, Vec<SlideError>), ResearchError> {
        let cleaned = extract_json_object(raw);
        let draft: OutlineDraft = serde_json::from_str(cleaned).map_err(|e| {
            ResearchError::InvalidResponse(format!("{e}; response starts with: {}", snippet(raw)))
        })?;
        draft.into_outline(fallback_topic, expected)
    }

    /// Load a previously saved outline, skipping malformed slides.
    pub fn from_file(path: &Path) -> Result<Outline, DeckError> {
        let raw = std::fs::read_to_string(path).map_err(|e| DeckError::OutlineIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        let (outline, rejected) = Outline::from_json(&raw, "", None).map_err(|e| {
            DeckError::InvalidConfig(format!("outline file '{}': {e}", path.display()))
        })?;
        for err in &rejected {
            warn!("{}", err);
        }
        Ok(outline)
    }
}

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SlideDraft", into = "SlideDraft")]
pub struct Slide {
    pub title: String,
    pub notes: Option<String>,
    pub content: SlideContent,
}

/// The two mutually exclusive ways a slide carries content.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideContent {
    Bullets {
        bullets: Vec<String>,
        image_query: Option<String>,
    },
    Table(Table),
}

impl Slide {
    /// A bullet slide without notes or image.
    pub fn bullets(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            notes: None,
            content: SlideContent::Bullets {
                bullets,
                image_query: None,
            },
        }
    }

    pub fn table(title: impl Into<String>, table: Table) -> Self {
        Self {
            title: title.into(),
            notes: None,
            content: SlideContent::Table(table),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = non_blank(Some(notes.into()));
        self
    }

    /// Attach an image query. Ignored on table slides.
    pub fn with_image_query(mut self, query: impl Into<String>) -> Self {
        if let SlideContent::Bullets { image_query, .. } = &mut self.content {
            *image_query = non_blank(Some(query.into()));
        }
        self
    }

    pub fn is_table(&self) -> bool {
        matches!(self.content, SlideContent::Table(_))
    }

    pub fn image_query(&self) -> Option<&str> {
        match &self.content {
            SlideContent::Bullets { image_query, .. } => image_query.as_deref(),
            SlideContent::Table(_) => None,
        }
    }
}

/// Tabular slide content. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, padding short rows with empty cells.
    ///
    /// Fails when there are no headers or a row is wider than the header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, String> {
        if headers.is_empty() {
            return Err("table has no headers".to_string());
        }
        let width = headers.len();
        let mut padded = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(format!(
                    "table row {} has {} cells but only {} headers",
                    i + 1,
                    row.len(),
                    width
                ));
            }
            row.resize(width, String::new());
            padded.push(row);
        }
        Ok(Self {
            headers,
            rows: padded,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows in the rendered table, header row included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

// ── Draft (wire) shape ───────────────────────────────────────────────────

/// Outline exactly as the model writes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineDraft {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub slides: Vec<SlideDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDraft {
    #[serde(default)]
    pub headers: Vec<Value>,
    #[serde(default)]
    pub rows: Vec<Value>,
}

impl OutlineDraft {
    /// Validate and convert, collecting per-slide rejections.
    pub fn into_outline(
        self,
        fallback_topic: &str,
        expected: Option<usize>,
    ) -> Result<(Outline, Vec<SlideError>), ResearchError> {
        let mut drafts = self.slides;
        if let Some(expected) = expected {
            if drafts.len() < expected {
                return Err(ResearchError::SlideCountMismatch {
                    expected,
                    actual: drafts.len(),
                });
            }
            if drafts.len() > expected {
                warn!(
                    "Model returned {} slides, keeping the first {}",
                    drafts.len(),
                    expected
                );
                drafts.truncate(expected);
            }
        }
        if drafts.is_empty() {
            return Err(ResearchError::InvalidResponse("outline has no slides".into()));
        }

        let mut slides = Vec::with_capacity(drafts.len());
        let mut rejected = Vec::new();
        for (i, draft) in drafts.into_iter().enumerate() {
            match draft.into_slide(i + 1) {
                Ok(slide) => slides.push(slide),
                Err(e) => rejected.push(e),
            }
        }
        if slides.is_empty() {
            return Err(ResearchError::InvalidResponse(format!(
                "all {} slides were malformed",
                rejected.len()
            )));
        }

        let topic = match self.topic.trim() {
            "" => fallback_topic.trim().to_string(),
            t => t.to_string(),
        };
        Ok((Outline { topic, slides }, rejected))
    }
}

impl SlideDraft {
    /// Convert one draft; `index` is the 1-based slide number for errors.
    pub fn into_slide(self, index: usize) -> Result<Slide, SlideError> {
        let title = self.title.trim().to_string();
        Slide::try_from(self).map_err(|reason| SlideError::Malformed {
            index,
            title,
            reason,
        })
    }
}

impl TryFrom<SlideDraft> for Slide {
    type Error = String;

    fn try_from(d: SlideDraft) -> Result<Self, Self::Error> {
        let title = d.title.trim().to_string();
        if title.is_empty() {
            return Err("slide has no title".to_string());
        }

        let bullets: Vec<String> = d
            .bullets
            .iter()
            .map(cell_text)
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        let image_query = non_blank(d.image_query);
        let notes = non_blank(d.notes);

        let table = match d.table {
            Some(t) if !(t.headers.is_empty() && t.rows.is_empty()) => Some(t.into_table()?),
            _ => None,
        };

        let content = match table {
            Some(table) => {
                if !bullets.is_empty() {
                    return Err("table slide also carries bullets".to_string());
                }
                if image_query.is_some() {
                    return Err("table slide also carries an image query".to_string());
                }
                SlideContent::Table(table)
            }
            None => SlideContent::Bullets {
                bullets,
                image_query,
            },
        };

        Ok(Slide {
            title,
            notes,
            content,
        })
    }
}

impl From<Slide> for SlideDraft {
    fn from(s: Slide) -> Self {
        let (bullets, image_query, table) = match s.content {
            SlideContent::Bullets {
                bullets,
                image_query,
            } => (bullets.into_iter().map(Value::String).collect(), image_query, None),
            SlideContent::Table(t) => (
                Vec::new(),
                None,
                Some(TableDraft {
                    headers: t.headers.into_iter().map(Value::String).collect(),
                    rows: t
                        .rows
                        .into_iter()
                        .map(|r| Value::Array(r.into_iter().map(Value::String).collect()))
                        .collect(),
                }),
            ),
        };
        SlideDraft {
            title: s.title,
            bullets,
            notes: s.notes,
            image_query,
            table,
        }
    }
}

impl TableDraft {
    fn into_table(self) -> Result<Table, String> {
        let headers = self.headers.iter().map(cell_text).collect();
        let rows = self.rows.iter().map(normalise_row).collect();
        Table::new(headers, rows)
    }
}

/// Flatten one row value into cells, keeping column order.
///
/// Arrays map cell-for-cell, objects contribute their values in document
/// order, anything else becomes a single-cell row.
pub fn normalise_row(row: &Value) -> Vec<String> {
    match row {
        Value::Array(cells) => cells.iter().map(cell_text).collect(),
        Value::Object(map) => map.values().map(cell_text).collect(),
        scalar => vec![cell_text(scalar)],
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => v.to_string(),
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ── Response cleanup ─────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\n(.*?)\n?```\s*$").expect("static regex")
});

/// Strip code fences and surrounding prose, leaving the outermost object.
pub fn extract_json_object(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = RE_OUTER_FENCES
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);
    match (inner.find('{'), inner.rfind('}')) {
        (Some(start), Some(end)) if start < end => &inner[start..=end],
        _ => inner.trim(),
    }
}

fn snippet(raw: &str) -> String {
    let s: String = raw.trim().chars().take(120).collect();
    if raw.trim().chars().count() > 120 {
        format!("{s}…")
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(v: Value) -> SlideDraft {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn bullet_slide_from_draft() {
        let s = draft(json!({
            "title": "Introduction",
            "bullets": ["One", "  ", "Two"],
            "notes": "Say hello.",
            "image_query": "sunrise",
            "table": null
        }))
        .into_slide(1)
        .unwrap();
        assert_eq!(
            s.content,
            SlideContent::Bullets {
                bullets: vec!["One".into(), "Two".into()],
                image_query: Some("sunrise".into()),
            }
        );
        assert_eq!(s.notes.as_deref(), Some("Say hello."));
    }

    #[test]
    fn blank_image_query_on_table_slide_is_absent() {
        let s = draft(json!({
            "title": "Comparison",
            "bullets": [],
            "notes": "",
            "image_query": "",
            "table": {"headers": ["A", "B"], "rows": [["1", "2"]]}
        }))
        .into_slide(2)
        .unwrap();
        assert!(s.is_table());
        assert!(s.notes.is_none());
        assert!(s.image_query().is_none());
    }

    #[test]
    fn table_with_bullets_is_malformed() {
        let err = draft(json!({
            "title": "Mixed",
            "bullets": ["oops"],
            "table": {"headers": ["A"], "rows": [["1"]]}
        }))
        .into_slide(3)
        .unwrap_err();
        match err {
            SlideError::Malformed { index, title, reason } => {
                assert_eq!(index, 3);
                assert_eq!(title, "Mixed");
                assert!(reason.contains("bullets"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn table_with_image_query_is_malformed() {
        let err = draft(json!({
            "title": "Mixed",
            "image_query": "chart",
            "table": {"headers": ["A"], "rows": []}
        }))
        .into_slide(1)
        .unwrap_err();
        assert!(err.to_string().contains("image query"));
    }

    #[test]
    fn empty_table_object_means_no_table() {
        let s = draft(json!({"title": "T", "bullets": ["x"], "table": {"headers": [], "rows": []}}))
            .into_slide(1)
            .unwrap();
        assert!(!s.is_table());
    }

    #[test]
    fn rows_are_normalised_without_reordering() {
        let s = draft(json!({
            "title": "Metrics",
            "table": {
                "headers": ["Name", "Speed", "Cost"],
                "rows": [
                    {"name": "A", "speed": 3, "cost": "low"},
                    ["B", "5"],
                    "C only",
                    [true, null, 1.5]
                ]
            }
        }))
        .into_slide(1)
        .unwrap();
        let SlideContent::Table(t) = s.content else {
            panic!("expected table");
        };
        assert_eq!(t.rows()[0], ["A", "3", "low"]);
        assert_eq!(t.rows()[1], ["B", "5", ""]);
        assert_eq!(t.rows()[2], ["C only", "", ""]);
        assert_eq!(t.rows()[3], ["true", "", "1.5"]);
        assert_eq!(t.row_count(), 5);
        assert_eq!(t.column_count(), 3);
    }

    #[test]
    fn row_wider_than_header_is_rejected() {
        let err = Table::new(vec!["A".into()], vec![vec!["1".into(), "2".into()]]).unwrap_err();
        assert!(err.contains("2 cells"));
    }

    #[test]
    fn missing_title_is_malformed() {
        assert!(draft(json!({"title": " ", "bullets": ["x"]})).into_slide(1).is_err());
    }

    #[test]
    fn strips_fences_and_prose() {
        assert_eq!(extract_json_object("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json_object("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
        assert_eq!(
            extract_json_object("Here is your outline:\n{\"a\": {\"b\": 2}}\nEnjoy!"),
            "{\"a\": {\"b\": 2}}"
        );
    }

    #[test]
    fn from_json_collects_rejections() {
        let raw = json!({
            "topic": "Tigers",
            "slides": [
                {"title": "Intro", "bullets": ["a"]},
                {"title": "Bad", "bullets": ["b"], "table": {"headers": ["x"], "rows": [["1"]]}},
                {"title": "End", "bullets": ["c"]}
            ]
        })
        .to_string();
        let (outline, rejected) = Outline::from_json(&raw, "ignored", Some(3)).unwrap();
        assert_eq!(outline.topic, "Tigers");
        assert_eq!(outline.slides.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0], SlideError::Malformed { index: 2, .. }));
    }

    #[test]
    fn all_malformed_is_an_invalid_response() {
        let raw = r#"{"topic": "T", "slides": [{"title": ""}, {"title": "  "}]}"#;
        let err = Outline::from_json(raw, "T", None).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidResponse(_)));
    }

    #[test]
    fn from_json_enforces_slide_count() {
        let raw = r#"{"topic": "T", "slides": [{"title": "A", "bullets": ["x"]}]}"#;
        let err = Outline::from_json(raw, "T", Some(2)).unwrap_err();
        assert!(matches!(
            err,
            ResearchError::SlideCountMismatch { expected: 2, actual: 1 }
        ));

        let raw = r#"{"topic": "T", "slides": [{"title": "A"}, {"title": "B"}, {"title": "C"}]}"#;
        let (outline, _) = Outline::from_json(raw, "T", Some(2)).unwrap();
        assert_eq!(outline.slides.len(), 2);
    }

    #[test]
    fn from_json_uses_fallback_topic() {
        let raw = r#"{"slides": [{"title": "A", "bullets": ["x"]}]}"#;
        let (outline, _) = Outline::from_json(raw, " Climate Change ", None).unwrap();
        assert_eq!(outline.topic, "Climate Change");
    }

    #[test]
    fn non_json_is_invalid_response() {
        let err = Outline::from_json("I cannot help with that.", "T", None).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidResponse(_)));
    }

    #[test]
    fn outline_serialises_to_flat_shape() {
        let table = Table::new(vec!["A".into(), "B".into()], vec![vec!["1".into(), "2".into()]])
            .unwrap();
        let outline = Outline {
            topic: "T".into(),
            slides: vec![
                Slide::bullets("Intro", vec!["x".into()]).with_image_query("cats"),
                Slide::table("Data", table).with_notes("n"),
            ],
        };
        let v = serde_json::to_value(&outline).unwrap();
        assert_eq!(v["slides"][0]["image_query"], "cats");
        assert_eq!(v["slides"][1]["table"]["rows"], json!([["1", "2"]]));
        assert_eq!(v["slides"][1]["bullets"], json!([]));

        let back: Outline = serde_json::from_value(v).unwrap();
        assert_eq!(back, outline);
    }
}
