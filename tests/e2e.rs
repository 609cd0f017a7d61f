//! End-to-end tests for edgequake-slides.
//!
//! These make live LLM calls and, for the full generation, create a real
//! Google Slides presentation. They are gated behind `E2E_ENABLED` so they
//! do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! The generation test also needs Google credentials, either
//! `GOOGLE_ACCESS_TOKEN` or a `token.json` in the crate root.

use edgequake_slides::{generate, research_outline, GenerationConfig, ThemeRegistry};
use std::path::PathBuf;

macro_rules! e2e_skip_unless {
    ($($var:literal),*) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        $(
            if std::env::var($var).map(|v| v.is_empty()).unwrap_or(true) {
                println!("SKIP: {} not set", $var);
                return;
            }
        )*
    }};
}

fn token_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("token.json")
}

#[tokio::test]
async fn test_research_outline_live() {
    e2e_skip_unless!("OPENAI_API_KEY");

    let config = GenerationConfig::builder()
        .slide_count(4)
        .provider_name("openai")
        .model("gpt-4.1-mini")
        .build()
        .expect("config must build");

    let researched = research_outline("The water cycle", &config)
        .await
        .expect("research must succeed");

    let outline = researched.outline;
    assert!(!outline.topic.trim().is_empty());
    assert!(
        !outline.slides.is_empty() && outline.slides.len() <= 4,
        "got {} slides",
        outline.slides.len()
    );
    for slide in &outline.slides {
        assert!(!slide.title.trim().is_empty());
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&outline).expect("outline serialises")
    );
}

#[tokio::test]
async fn test_generate_deck_live() {
    e2e_skip_unless!("OPENAI_API_KEY");
    if std::env::var("GOOGLE_ACCESS_TOKEN").is_err() && !token_file().exists() {
        println!("SKIP: no GOOGLE_ACCESS_TOKEN and no token.json");
        return;
    }

    let config = GenerationConfig::builder()
        .slide_count(3)
        .theme("minimal")
        .token_file(token_file())
        .share(false)
        .build()
        .expect("config must build");

    let output = generate("Photosynthesis", &config)
        .await
        .expect("generation must succeed");

    assert!(output
        .url
        .starts_with("https://docs.google.com/presentation/d/"));
    assert!(output.stats.slide_count <= output.outline.slides.len());
    assert_eq!(output.stats.skipped_slides, output.skipped.len());
    println!("{}", output.url);
}

#[test]
fn test_builtin_themes_listed() {
    let names: Vec<_> = ThemeRegistry::builtin().names().collect();
    assert_eq!(names, vec!["default", "minimal", "dark", "corporate"]);
}
