//! Prompts for outline research.
//!
//! Every prompt lives here so the outline contract the model sees and the
//! draft shape [`crate::outline::OutlineDraft`] parses can be read side by
//! side. Callers can override the system prompt via
//! [`crate::config::GenerationConfig::system_prompt`].

/// Default system prompt for the research call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a research assistant that writes comprehensive, \
detailed slide content for presentations. You always answer with a single JSON object and \
nothing else: no markdown fences, no commentary.";

/// Example object embedded in the user prompt. Mirrors `OutlineDraft`.
const OUTLINE_SHAPE: &str = r#"{
  "topic": "Main Topic Title",
  "slides": [
    {
      "title": "Introduction",
      "bullets": [
        "Detailed bullet point of 15-25 words explaining the concept thoroughly",
        "Another comprehensive point with specific examples and context",
        "A third point with statistics, facts, or real-world applications"
      ],
      "notes": "Two or three sentences of speaker notes with background for the presenter",
      "image_query": "short image search phrase",
      "table": null
    },
    {
      "title": "Comparison / Pros & Cons / Key Metrics",
      "bullets": [],
      "notes": "Two or three sentences explaining the table and its key takeaways",
      "image_query": "",
      "table": {
        "headers": ["Column 1", "Column 2", "Column 3"],
        "rows": [
          ["Row 1 col 1", "Row 1 col 2", "Row 1 col 3"],
          ["Row 2 col 1", "Row 2 col 2", "Row 2 col 3"]
        ]
      }
    }
  ]
}"#;

/// Build the user prompt asking for `slide_count` slides about `topic`.
pub fn outline_prompt(topic: &str, slide_count: usize) -> String {
    format!(
        "Research the topic '{topic}' in depth and return a JSON object with exactly this \
structure:\n\n{OUTLINE_SHAPE}\n\n\
RULES:\n\
- Produce EXACTLY {slide_count} slides, no more and no fewer\n\
- {table_rule}\n\
- Every bullet is 15-25 words: specific examples, statistics, facts or applications\n\
- Speaker notes are 2-3 full sentences of extra context\n\
- Table slides have an empty bullets array and an empty image_query\n\
- Every table row has exactly as many cells as the table has headers\n\
- Non-table slides have 4-5 detailed bullets and a concrete image_query\n\
- Return ONLY valid JSON",
        table_rule = table_rule(slide_count),
    )
}

fn table_rule(slide_count: usize) -> String {
    match slide_count {
        0..=2 => "Table slides are optional".to_string(),
        3..=5 => format!("Include exactly 1 table slide within those {slide_count} slides"),
        _ => format!("Include 1-2 table slides within those {slide_count} slides"),
    }
}
