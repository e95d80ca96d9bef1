//! Caller-side session state: the last correction and its exports.
//!
//! A presentation adapter (the CLI, or any UI) keeps one
//! [`CorrectionSession`] per user. Each successful
//! [`CorrectionSession::correct`] replaces the held result entirely; the
//! Markdown, raw-JSON and PDF views are always derived from that one value.
//! A failed correction leaves the previous result untouched, so a user who
//! hits a transient error still has the last good export.

use crate::config::DocumentOptions;
use crate::correct::CorrectionClient;
use crate::error::CorrectionError;
use crate::format::{format_as_document, format_as_markdown};
use crate::output::{CorrectionRequest, CorrectionResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Export file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Json,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::Markdown,
        ExportFormat::Json,
        ExportFormat::Pdf,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "corrections.md",
            ExportFormat::Json => "corrections.json",
            ExportFormat::Pdf => "corrections.pdf",
        }
    }
}

/// What [`CorrectionSession::export`] managed to write.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    /// Set when the PDF was requested but could not be rendered.
    pub document_error: Option<CorrectionError>,
}

/// The last correction plus its pre-rendered Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub result: CorrectionResult,
    pub markdown: String,
}

impl Correction {
    pub fn new(result: CorrectionResult) -> Self {
        let markdown = format_as_markdown(&result);
        Self { result, markdown }
    }
}

/// One user's correction state.
#[derive(Debug)]
pub struct CorrectionSession {
    client: CorrectionClient,
    last: Option<Correction>,
}

impl CorrectionSession {
    pub fn new(client: CorrectionClient) -> Self {
        Self { client, last: None }
    }

    /// Run a correction and, on success, replace the held result.
    pub async fn correct(
        &mut self,
        request: &CorrectionRequest,
    ) -> Result<&Correction, CorrectionError> {
        let result = self.client.correct_exercises(request).await?;
        Ok(self.last.insert(Correction::new(result)))
    }

    /// Hold an already-obtained result (e.g. reloaded from a JSON export).
    pub fn replace(&mut self, result: CorrectionResult) -> &Correction {
        self.last.insert(Correction::new(result))
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&Correction> {
        self.last.as_ref()
    }

    fn require(&self) -> Result<&Correction, CorrectionError> {
        self.last.as_ref().ok_or_else(|| {
            CorrectionError::InvalidArgument("no correction result in this session yet".into())
        })
    }

    /// The formatted Markdown view.
    pub fn markdown(&self) -> Result<&str, CorrectionError> {
        Ok(&self.require()?.markdown)
    }

    /// The raw JSON view (pretty-printed).
    pub fn raw_json(&self) -> Result<String, CorrectionError> {
        serde_json::to_string_pretty(&self.require()?.result)
            .map_err(|e| CorrectionError::Internal(format!("serialising result: {e}")))
    }

    /// The PDF view.
    pub fn document(&self, options: &DocumentOptions) -> Result<Vec<u8>, CorrectionError> {
        format_as_document(&self.require()?.result, options)
    }

    /// Write the requested exports into `dir`.
    ///
    /// Markdown and JSON are written before the PDF is attempted. A PDF
    /// rendering failure is returned in [`ExportReport::document_error`]
    /// rather than as `Err`, so the text exports are never lost to it.
    pub fn export(
        &self,
        dir: &Path,
        formats: &[ExportFormat],
        options: &DocumentOptions,
    ) -> Result<ExportReport, CorrectionError> {
        self.require()?;
        std::fs::create_dir_all(dir)
            .map_err(|e| CorrectionError::OutputWriteFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let mut report = ExportReport::default();
        for format in [ExportFormat::Markdown, ExportFormat::Json] {
            if !formats.contains(&format) {
                continue;
            }
            let contents = match format {
                ExportFormat::Markdown => self.markdown()?.as_bytes().to_vec(),
                _ => self.raw_json()?.into_bytes(),
            };
            let path = dir.join(format.file_name());
            write_atomic(&path, &contents)?;
            report.written.push(path);
        }

        if formats.contains(&ExportFormat::Pdf) {
            match self.document(options) {
                Ok(bytes) => {
                    let path = dir.join(ExportFormat::Pdf.file_name());
                    write_atomic(&path, &bytes)?;
                    report.written.push(path);
                }
                Err(e) => {
                    warn!("PDF export skipped: {}", e);
                    report.document_error = Some(e);
                }
            }
        }

        info!("Exported {} file(s) to {}", report.written.len(), dir.display());
        Ok(report)
    }
}

/// Write through a temp file in the same directory, then rename over `path`,
/// so a reader never sees a half-written export.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CorrectionError> {
    let fail = |source| CorrectionError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(fail)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(fail)?;
    tmp.write_all(contents).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
