//! Configuration types for exercise correction and document export.
//!
//! [`CorrectionConfig`] carries everything the client needs to reach the
//! provider, including the credential. It is built once (from flags, from the
//! environment, or in tests from a fake key) and injected into
//! [`crate::CorrectionClient::new`]; nothing in the library reads the
//! credential from process state on its own.
//!
//! [`DocumentOptions`] is separate because PDF export never touches the
//! network and can be configured (or fail) independently.

use crate::error::CorrectionError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default OpenAI-compatible API root; `/chat/completions` is appended.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default multimodal model.
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "OPENROUTER_KEY";

/// Optional override of [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "OPENROUTER_BASE_URL";

/// Optional override of [`DEFAULT_MODEL`].
pub const MODEL_ENV: &str = "CORRECTOR_MODEL";

/// Configuration for a [`crate::CorrectionClient`].
///
/// Built via [`CorrectionConfig::builder()`] or [`CorrectionConfig::from_env()`].
///
/// # Example
/// ```rust
/// use exercise_corrector::CorrectionConfig;
///
/// let config = CorrectionConfig::builder()
///     .api_key("sk-or-v1-test")
///     .model("google/gemini-3-flash-preview")
///     .api_timeout_secs(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.api_timeout_secs, 90);
/// ```
#[derive(Clone)]
pub struct CorrectionConfig {
    /// Bearer credential sent with every request. Never logged.
    pub api_key: String,

    /// API root, e.g. `https://openrouter.ai/api/v1`. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Upper bound on the whole provider call in seconds. Default: 120.
    ///
    /// Corrections of several dense pages routinely take 30–60 s; 120 s leaves
    /// headroom while still failing a hung connection in bounded time.
    pub api_timeout_secs: u64,

    /// Sampling temperature. Sent only when set.
    pub temperature: Option<f32>,

    /// Maximum completion tokens. Sent only when set.
    pub max_tokens: Option<usize>,

    /// Receives request start/complete/error events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_timeout_secs: 120,
            temperature: None,
            max_tokens: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CorrectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn CorrectionProgressCallback>"),
            )
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.trim().is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl CorrectionConfig {
    /// Create a new builder for `CorrectionConfig`.
    pub fn builder() -> CorrectionConfigBuilder {
        CorrectionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a configuration from the process environment.
    ///
    /// Reads [`API_KEY_ENV`] (required) and the optional [`BASE_URL_ENV`] and
    /// [`MODEL_ENV`] overrides. Call this once at startup.
    pub fn from_env() -> Result<Self, CorrectionError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CorrectionConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CorrectionError> {
        let mut builder = Self::builder();
        if let Some(key) = lookup(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            builder = builder.base_url(url);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            builder = builder.model(model);
        }
        builder.build()
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Check the invariants the client relies on.
    pub fn validate(&self) -> Result<(), CorrectionError> {
        if self.api_key.trim().is_empty() {
            return Err(CorrectionError::Configuration(format!(
                "no API key configured.\nSet {API_KEY_ENV} or pass --api-key."
            )));
        }
        if self.model.trim().is_empty() {
            return Err(CorrectionError::Configuration(
                "model identifier must not be empty".into(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CorrectionError::Configuration(format!(
                "base URL must be http(s), got '{}'",
                self.base_url
            )));
        }
        if self.api_timeout_secs == 0 {
            return Err(CorrectionError::Configuration(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CorrectionConfig`].
pub struct CorrectionConfigBuilder {
    config: CorrectionConfig,
}

impl fmt::Debug for CorrectionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl CorrectionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CorrectionConfig, CorrectionError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Document export ──────────────────────────────────────────────────────

/// Directory holding the DejaVu fonts on most Linux distributions.
pub const DEFAULT_FONT_DIR: &str = "/usr/share/fonts/truetype/dejavu";

/// Environment variable pointing at an existing pdfium shared library.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_LIB_PATH";

/// The three TrueType faces used by the PDF export.
///
/// They must cover the script of the output language; DejaVu Sans covers
/// Latin, Greek, Cyrillic, Arabic and Hebrew among others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSet {
    pub regular: PathBuf,
    pub bold: PathBuf,
    pub oblique: PathBuf,
}

impl FontSet {
    /// DejaVu Sans faces inside `dir`.
    pub fn dejavu_in(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            regular: dir.join("DejaVuSans.ttf"),
            bold: dir.join("DejaVuSans-Bold.ttf"),
            oblique: dir.join("DejaVuSans-Oblique.ttf"),
        }
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::dejavu_in(DEFAULT_FONT_DIR)
    }
}

/// Options for [`crate::format::format_as_document`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Fonts for the four text treatments.
    pub fonts: FontSet,

    /// Explicit pdfium library (file or directory). When `None`, the library
    /// is looked up next to the executable, then in the system paths.
    pub pdfium_library: Option<PathBuf>,
}

impl DocumentOptions {
    /// Defaults, honouring [`PDFIUM_LIB_ENV`] when set.
    pub fn from_env() -> Self {
        Self {
            fonts: FontSet::default(),
            pdfium_library: std::env::var_os(PDFIUM_LIB_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}
