//! CLI binary for edgequake-slides.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints the deck link.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_slides::{
    generate, render, research_outline, DeckError, GenerationConfig, GenerationOutput,
    GenerationProgressCallback, Outline, Phase, ProgressCallback, ThemeRegistry,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One spinner that follows the current phase and leaves a log line behind
/// for each finished phase. Also remembers how far the run got, so a
/// failure can say what was already done.
struct CliProgressCallback {
    bar: ProgressBar,
    research_ms: AtomicU64,
    planned: AtomicUsize,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            research_ms: AtomicU64::new(0),
            planned: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// What was done before a failure, one line per fact.
    fn partial_report(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let research_ms = self.research_ms.load(Ordering::SeqCst);
        if research_ms > 0 {
            lines.push(format!("research finished in {:.1}s", research_ms as f64 / 1000.0));
        }
        let planned = self.planned.load(Ordering::SeqCst);
        if planned > 0 {
            lines.push(format!("{planned} slides planned"));
        }
        let skipped = self.skipped.load(Ordering::SeqCst);
        if skipped > 0 {
            lines.push(format!("{skipped} slides skipped"));
        }
        lines
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_phase_start(&self, phase: Phase) {
        let (prefix, msg) = match phase {
            Phase::Research => ("Researching", "asking the model for an outline…"),
            Phase::Images => ("Images", "searching for slide pictures…"),
            Phase::Render => ("Rendering", "building the presentation…"),
        };
        self.bar.set_prefix(prefix);
        self.bar.set_message(msg);
        self.bar.reset_elapsed();
    }

    fn on_phase_complete(&self, phase: Phase, elapsed_ms: u64) {
        if phase == Phase::Research {
            self.research_ms.store(elapsed_ms.max(1), Ordering::SeqCst);
        }
        self.bar.println(format!(
            "  {} {:<14} {}",
            green("✓"),
            phase.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_research_retry(&self, attempt: u32, max_retries: u32, backoff_ms: u64) {
        self.bar.println(format!(
            "  {} rate limited, retry {attempt}/{max_retries} in {:.1}s",
            yellow("⚠"),
            backoff_ms as f64 / 1000.0
        ));
    }

    fn on_slide_planned(&self, index: usize, total: usize, title: &str) {
        self.planned.fetch_add(1, Ordering::SeqCst);
        self.bar.set_message(format!("slide {index}/{total}  {}", dim(title)));
    }

    fn on_slide_skipped(&self, index: usize, error: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} slide {:>2}  {}", red("✗"), index, red(&msg)));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Eight-slide deck, corporate theme
  deckgen "The history of the printing press"

  # Dark theme, five slides, hero image on the title slide
  deckgen "Coral reefs" --theme dark --slides 5 --hero-image https://example.com/reef.jpg

  # Inspect the outline without touching Google
  deckgen "Quantum computing" --outline-only > outline.json

  # Render an edited outline
  deckgen --outline outline.json

  # Machine-readable result
  deckgen "Rust ownership" --json

THEMES:
  default, minimal, dark, corporate (unknown names fall back to default)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PEXELS_API_KEY          Pexels key for per-slide images (absent: no images)
  GOOGLE_ACCESS_TOKEN     OAuth access token; skips the token file

SETUP:
  1. Set an LLM key:       export OPENAI_API_KEY=sk-...
  2. Google credentials:   an authorised-user token.json with the
                           presentations and drive scopes
  3. Generate:             deckgen "Your topic"
"#;

/// Generate Google Slides decks from a topic using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "deckgen",
    version,
    about = "Generate Google Slides decks from a topic using LLMs",
    long_about = "Research a topic with an LLM and build a themed Google Slides presentation \
from the outline: titles, bullets, speaker notes, tables and images. Supports OpenAI, \
Anthropic, Google Gemini, Azure OpenAI, and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Presentation topic.
    #[arg(required_unless_present_any = ["outline", "list_themes"])]
    topic: Option<String>,

    /// Colour theme: default, minimal, dark, corporate.
    #[arg(long, env = "DECKGEN_THEME", default_value = "corporate")]
    theme: String,

    /// Number of content slides (1–30).
    #[arg(long, env = "DECKGEN_SLIDES", default_value_t = 8,
          value_parser = clap::value_parser!(u32).range(1..=30))]
    slides: u32,

    /// Image URL placed on the title slide.
    #[arg(long, env = "DECKGEN_HERO_IMAGE")]
    hero_image: Option<String>,

    /// Subtitle on the title slide.
    #[arg(long, env = "DECKGEN_SUBTITLE")]
    subtitle: Option<String>,

    /// Skip per-slide image search.
    #[arg(long, env = "DECKGEN_NO_IMAGES")]
    no_images: bool,

    /// Do not make the deck readable by anyone with the link.
    #[arg(long, env = "DECKGEN_NO_SHARE")]
    no_share: bool,

    /// Print the researched outline as JSON and stop.
    #[arg(long, conflicts_with = "outline")]
    outline_only: bool,

    /// Render this outline JSON file instead of researching.
    #[arg(long, env = "DECKGEN_OUTLINE")]
    outline: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "DECKGEN_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DECKGEN_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Retries when the LLM provider rate-limits.
    #[arg(long, env = "DECKGEN_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Google authorised-user credentials file.
    #[arg(long, env = "DECKGEN_TOKEN_FILE", default_value = "token.json")]
    token_file: PathBuf,

    /// Output structured JSON (GenerationOutput) instead of the link.
    #[arg(long, env = "DECKGEN_JSON")]
    json: bool,

    /// List the available themes and exit.
    #[arg(long)]
    list_themes: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECKGEN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DECKGEN_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs unless -v asks for everything.
    let show_progress = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List themes ──────────────────────────────────────────────────────
    if cli.list_themes {
        for name in ThemeRegistry::builtin().names() {
            println!("{name}");
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress && !cli.outline_only {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn GenerationProgressCallback>),
    )
    .await?;

    // ── Outline only ─────────────────────────────────────────────────────
    if cli.outline_only {
        let topic = cli.topic.as_deref().unwrap_or_default();
        let researched = research_outline(topic, &config)
            .await
            .context("Research failed")?;
        let json = serde_json::to_string_pretty(&researched.outline)
            .context("Failed to serialise outline")?;
        println!("{json}");
        return Ok(());
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let result = match cli.outline {
        Some(ref path) => {
            let mut outline = Outline::from_file(path).context("Failed to load outline")?;
            if let Some(ref topic) = cli.topic {
                outline.topic = topic.clone();
            }
            render(outline, &config).await
        }
        None => generate(cli.topic.as_deref().unwrap_or_default(), &config).await,
    };

    if let Some(ref cb) = progress {
        cb.finish();
    }

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            report_failure(&err, progress.as_deref());
            std::process::exit(1);
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        println!("{}", output.url);
        if !cli.quiet {
            print_summary(&output);
        }
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .theme(cli.theme.as_str())
        .slide_count(cli.slides as usize)
        .fetch_images(!cli.no_images)
        .share(!cli.no_share)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .token_file(cli.token_file.clone());

    if let Some(ref url) = cli.hero_image {
        builder = builder.hero_image_url(url.as_str());
    }
    if let Some(ref subtitle) = cli.subtitle {
        builder = builder.subtitle(subtitle.as_str());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.as_str());
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &GenerationOutput) {
    let s = &output.stats;
    eprintln!(
        "{} {}  {} slides  {} tables  {} images  {}",
        if s.skipped_slides == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        bold(&output.outline.topic),
        s.slide_count,
        s.table_slides,
        s.images_placed,
        dim(&format!("{:.1}s", s.total_duration_ms as f64 / 1000.0)),
    );
    if s.research_retries > 0 {
        eprintln!("   {}", dim(&format!("{} rate-limit retries", s.research_retries)));
    }
    for skipped in &output.skipped {
        eprintln!("   {} {}", red("✗"), skipped);
    }
}

fn report_failure(err: &DeckError, progress: Option<&CliProgressCallback>) {
    eprintln!("{} {} failed: {}", red("✘"), bold(err.phase()), err);
    if let Some(cb) = progress {
        for line in cb.partial_report() {
            eprintln!("   {}", dim(&line));
        }
    }
}
