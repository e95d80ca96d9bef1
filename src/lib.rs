//! # exercise-corrector
//!
//! Correct photographed or scanned exercises with a multimodal language model
//! and present the result as Markdown, raw JSON, or a paginated PDF.
//!
//! ## How it works
//!
//! All images of one submission go to the model in a **single** chat
//! completion request, together with a system prompt that asks it to identify
//! every exercise, copy its given data, and answer each question step by step.
//! The request carries a strict JSON schema (`response_format`), so the reply
//! is a structured [`CorrectionResult`] rather than free text.
//!
//! ```text
//! images
//!  │
//!  ├─ 1. Input    read files, resolve MIME types
//!  ├─ 2. Encode   base64 data URLs, order preserved
//!  ├─ 3. Prompt   system prompt (+ language, + preferences)
//!  ├─ 4. Model    one POST /chat/completions with a strict schema
//!  ├─ 5. Parse    validate → CorrectionResult
//!  └─ 6. Format   Markdown │ JSON │ PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exercise_corrector::{format_as_markdown, CorrectionClient, CorrectionRequest, ImageInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENROUTER_KEY (and optionally OPENROUTER_BASE_URL, CORRECTOR_MODEL)
//!     let client = CorrectionClient::from_env()?;
//!
//!     let image = ImageInput::new(std::fs::read("homework.jpg")?, "image/jpeg");
//!     let request = CorrectionRequest::new(vec![image]).output_language("French");
//!
//!     let result = client.correct_exercises(&request).await?;
//!     println!("{}", format_as_markdown(&result));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `correct-exercises` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! exercise-corrector = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDF export
//!
//! [`format_as_document`] needs the pdfium shared library and a TrueType font
//! family with regular, bold and oblique faces (DejaVu Sans by default). Both
//! are located through [`DocumentOptions`]. When either is missing only the
//! PDF export fails; Markdown and JSON keep working.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod correct;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CorrectionConfig, CorrectionConfigBuilder, DocumentOptions, FontSet};
pub use correct::CorrectionClient;
pub use error::CorrectionError;
pub use format::{format_as_document, format_as_markdown, layout_document};
pub use output::{CorrectionRequest, CorrectionResult, Exercise, ImageInput, Question};
pub use progress::{CorrectionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{Correction, CorrectionSession, ExportFormat, ExportReport};
