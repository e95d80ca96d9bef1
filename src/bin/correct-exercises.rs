//! CLI binary for exercise-corrector.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CorrectionConfig` / `DocumentOptions`, runs one correction, and prints or
//! exports the result.

use anyhow::{Context, Result};
use clap::Parser;
use exercise_corrector::config::{
    API_KEY_ENV, BASE_URL_ENV, DEFAULT_FONT_DIR, MODEL_ENV, PDFIUM_LIB_ENV,
};
use exercise_corrector::pipeline::input::load_images;
use exercise_corrector::{
    CorrectionClient, CorrectionConfig, CorrectionProgressCallback, CorrectionRequest,
    CorrectionSession, DocumentOptions, ExportFormat, FontSet, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the single provider request is in flight.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading images…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl CorrectionProgressCallback for CliProgressCallback {
    fn on_request_start(&self, image_count: usize, model: &str) {
        self.bar.set_prefix("Correcting");
        self.bar.set_message(format!(
            "{image_count} image(s) → {}",
            dim(model)
        ));
    }

    fn on_request_complete(&self, exercise_count: usize, duration_ms: u64) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} exercise(s) corrected  {}",
            green("✔"),
            bold(&exercise_count.to_string()),
            dim(&format!("{:.1}s", duration_ms as f64 / 1000.0)),
        );
    }

    fn on_request_error(&self, error: &str) {
        self.bar.finish_and_clear();
        // Keep the spinner line tidy; the full error is printed by main.
        let first = error.lines().next().unwrap_or(error);
        eprintln!("{} {}", red("✘"), red(first));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Correct one photo and print the Markdown
  correct-exercises homework.jpg

  # Several pages of the same sheet, answers in French
  correct-exercises page1.png page2.png -l French

  # Raw JSON on stdout
  correct-exercises --view json sheet.webp > corrections.json

  # Write corrections.md, corrections.json and corrections.pdf
  correct-exercises sheet.jpg -o out/

  # Markdown only, with tutoring preferences
  correct-exercises sheet.jpg -o out/ --format md -p "Explain each step for a 12 year old"

SUPPORTED IMAGES:
  png, jpg, jpeg, webp, gif (other extensions are sniffed from content)

ENVIRONMENT VARIABLES:
  OPENROUTER_KEY          API key for the correction provider (required)
  OPENROUTER_BASE_URL     Override the OpenAI-compatible endpoint
  CORRECTOR_MODEL         Override the model ID
  CORRECTOR_FONT_DIR      Directory with DejaVuSans{,-Bold,-Oblique}.ttf
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory) for PDF export
  RUST_LOG                tracing filter, e.g. exercise_corrector=debug

PDF EXPORT:
  Needs the pdfium shared library and the DejaVu fonts. When either is
  missing the PDF is skipped with a warning; Markdown and JSON are still
  written.
"#;

/// Correct photographed exercises with a vision language model.
#[derive(Parser, Debug)]
#[command(
    name = "correct-exercises",
    version,
    about = "Correct photographed exercises with a vision language model",
    long_about = "Send one or more photos of an exercise sheet to a multimodal model in a single \
request and get back every exercise with its given data and a step-by-step answer to each \
question, as Markdown, JSON, or PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Exercise images, in order.
    #[arg(required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// Language for the corrections (default: the exercises' own language).
    #[arg(short, long, env = "CORRECTOR_LANGUAGE")]
    language: Option<String>,

    /// Free-text tutoring preferences appended to the instructions.
    #[arg(short, long)]
    preferences: Option<String>,

    /// What to print on stdout. Defaults to `formatted` unless --output-dir is set.
    #[arg(long, value_enum)]
    view: Option<ViewArg>,

    /// Write exports into this directory.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Exports to write with --output-dir.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "md,json,pdf")]
    format: Vec<FormatArg>,

    /// Provider API key.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI-compatible base URL.
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Model ID.
    #[arg(long, env = MODEL_ENV)]
    model: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "CORRECTOR_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Sampling temperature (0.0–2.0). Provider default when unset.
    #[arg(long)]
    temperature: Option<f32>,

    /// Max output tokens. Provider default when unset.
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Directory holding the DejaVu Sans fonts used by the PDF export.
    #[arg(long, env = "CORRECTOR_FONT_DIR", default_value = DEFAULT_FONT_DIR)]
    font_dir: PathBuf,

    /// pdfium library (file or directory).
    #[arg(long, env = PDFIUM_LIB_ENV)]
    pdfium_lib: Option<PathBuf>,

    /// Disable the spinner.
    #[arg(long, env = "CORRECTOR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the requested view.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ViewArg {
    /// Markdown.
    Formatted,
    /// Pretty-printed raw JSON.
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Md,
    Json,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Md => ExportFormat::Markdown,
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives the feedback that matters; keep INFO logs out of its way.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    // ── Build config ─────────────────────────────────────────────────────
    // Validate before the spinner starts so a config error leaves a clean line.
    let mut config = build_config(&cli)?;

    let progress_cb: Option<Arc<CliProgressCallback>> =
        show_progress.then(CliProgressCallback::new);
    config.progress_callback = progress_cb.clone().map(|cb| cb as ProgressCallback);

    let client = CorrectionClient::new(config)
        .inspect_err(|_| abandon(&progress_cb))
        .context("Invalid configuration")?;

    // ── Load images ──────────────────────────────────────────────────────
    let images = load_images(&cli.images)
        .await
        .inspect_err(|_| abandon(&progress_cb))
        .context("Failed to read exercise images")?;

    let mut request = CorrectionRequest::new(images);
    if let Some(ref language) = cli.language {
        request = request.output_language(language);
    }
    if let Some(ref prefs) = cli.preferences {
        request = request.user_preferences(prefs);
    }

    // ── Run correction ───────────────────────────────────────────────────
    let mut session = CorrectionSession::new(client);
    let correction = session
        .correct(&request)
        .await
        .context("Error generating corrections")?;

    if correction.result.exercises.is_empty() && !cli.quiet {
        eprintln!("{} no exercises were recognised in the images", yellow("⚠"));
    }

    // ── Print view ───────────────────────────────────────────────────────
    let view = cli
        .view
        .or(cli.output_dir.is_none().then_some(ViewArg::Formatted));
    if let Some(view) = view {
        let text = match view {
            ViewArg::Formatted => session.markdown()?.to_string(),
            ViewArg::Json => session.raw_json()?,
        };
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        if !text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // ── Exports ──────────────────────────────────────────────────────────
    if let Some(ref dir) = cli.output_dir {
        let formats: Vec<ExportFormat> = cli.format.iter().copied().map(Into::into).collect();
        let options = DocumentOptions {
            fonts: FontSet::dejavu_in(&cli.font_dir),
            pdfium_library: cli.pdfium_lib.clone(),
        };

        let report = session
            .export(dir, &formats, &options)
            .with_context(|| format!("Failed to write exports to {}", dir.display()))?;

        if let Some(ref e) = report.document_error {
            eprintln!("{} PDF generation error: {}", yellow("⚠"), e);
        }
        if !cli.quiet {
            for path in &report.written {
                eprintln!("  {} {}", green("✓"), bold(&path.display().to_string()));
            }
        }
    }

    Ok(())
}

/// Clear the spinner when bailing out before the request is sent.
fn abandon(progress: &Option<Arc<CliProgressCallback>>) {
    if let Some(cb) = progress {
        cb.bar.finish_and_clear();
    }
}

/// Map CLI args to a validated `CorrectionConfig` (without progress callback).
fn build_config(cli: &Cli) -> Result<CorrectionConfig> {
    let mut builder = CorrectionConfig::builder()
        .api_key(cli.api_key.clone().unwrap_or_default())
        .api_timeout_secs(cli.timeout);

    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }

    builder.build().context("Invalid configuration")
}
