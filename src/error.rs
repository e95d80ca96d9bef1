//! Error type for the exercise-corrector library.
//!
//! Every fallible operation returns [`CorrectionError`]. The variants follow
//! the stage that failed so a caller can decide what to show the user:
//!
//! * **Setup**: [`CorrectionError::Configuration`] and
//!   [`CorrectionError::InvalidArgument`] are raised before any network
//!   activity.
//! * **Provider**: [`CorrectionError::Transport`] and
//!   [`CorrectionError::MalformedResponse`] mean no result was produced; the
//!   user has to re-run the correction.
//! * **Export**: [`CorrectionError::DocumentRender`] only affects the PDF
//!   export. The Markdown and JSON views of the same result stay available.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the exercise-corrector library.
#[derive(Debug, Error)]
pub enum CorrectionError {
    // ── Setup errors ──────────────────────────────────────────────────────
    /// A required setting (the provider credential) is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller violated a precondition, e.g. passed no images.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// An image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    ImageNotFound { path: PathBuf },

    /// Process does not have read permission on the image file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file is readable but its image type could not be determined.
    #[error("Unsupported image '{path}': expected png, jpg, jpeg, webp or gif")]
    UnsupportedImage { path: PathBuf },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The HTTP call failed, timed out, or returned a non-2xx status.
    #[error("{}", transport_message(*status, detail))]
    Transport { status: Option<u16>, detail: String },

    /// The provider answered, but not with the declared correction shape.
    #[error("Malformed response from provider: {detail}")]
    MalformedResponse { detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// The PDF export could not be produced (missing font, pdfium binding…).
    #[error("Document rendering failed: {detail}")]
    DocumentRender { detail: String },

    /// Could not create or write an export file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CorrectionError {
    /// HTTP status of a [`CorrectionError::Transport`] failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            CorrectionError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn transport_message(status: Option<u16>, detail: &str) -> String {
    match status {
        Some(401) | Some(403) => format!(
            "Provider rejected the credential (HTTP {}): {detail}\nCheck OPENROUTER_KEY.",
            status.unwrap_or_default()
        ),
        Some(code) => format!("Provider returned HTTP {code}: {detail}"),
        None => format!("Request to provider failed: {detail}"),
    }
}
