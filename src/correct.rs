//! Correction entry points.
//!
//! [`CorrectionClient`] owns the validated configuration and one pooled
//! `reqwest::Client`. Each call to [`CorrectionClient::correct_exercises`] is
//! independent: build body → one POST → parse. There is no retry; a failed
//! call produces no result and the caller re-invokes if it wants to.

use crate::config::CorrectionConfig;
use crate::error::CorrectionError;
use crate::output::{CorrectionRequest, CorrectionResult, ImageInput};
use crate::pipeline::{input, llm, parse};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Client for the correction provider.
///
/// Construction fails with [`CorrectionError::Configuration`] when the
/// credential is missing, so no request is ever sent without one.
#[derive(Debug, Clone)]
pub struct CorrectionClient {
    config: CorrectionConfig,
    http: reqwest::Client,
}

impl CorrectionClient {
    /// Validate `config` and build the HTTP client with its timeout.
    pub fn new(config: CorrectionConfig) -> Result<Self, CorrectionError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| CorrectionError::Internal(format!("building HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Build a client from [`CorrectionConfig::from_env`].
    pub fn from_env() -> Result<Self, CorrectionError> {
        Self::new(CorrectionConfig::from_env()?)
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Send the images for correction and return the structured result.
    ///
    /// # Errors
    /// - [`CorrectionError::InvalidArgument`]: `request.images` is empty
    ///   (checked before any network activity)
    /// - [`CorrectionError::Transport`]: network failure, timeout or non-2xx
    /// - [`CorrectionError::MalformedResponse`]: the content is not JSON of
    ///   the declared shape
    pub async fn correct_exercises(
        &self,
        request: &CorrectionRequest,
    ) -> Result<CorrectionResult, CorrectionError> {
        if request.images.is_empty() {
            return Err(CorrectionError::InvalidArgument(
                "at least one exercise image is required".into(),
            ));
        }

        let start = Instant::now();
        let image_count = request.images.len();
        info!(
            "Requesting correction of {} image(s) from {}",
            image_count, self.config.model
        );
        debug!(
            "language={:?} preferences={}",
            request.language(),
            request.preferences().is_some()
        );

        let outcome = self.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let cb = self.config.progress_callback.as_ref();
        match &outcome {
            Ok(result) => {
                info!(
                    "Correction complete: {} exercise(s), {} question(s), {}ms",
                    result.exercises.len(),
                    result.question_count(),
                    duration_ms
                );
                if let Some(cb) = cb {
                    cb.on_request_complete(result.exercises.len(), duration_ms);
                }
            }
            Err(e) => {
                warn!("Correction failed after {}ms: {}", duration_ms, e);
                if let Some(cb) = cb {
                    cb.on_request_error(&e.to_string());
                }
            }
        }

        outcome
    }

    async fn run(&self, request: &CorrectionRequest) -> Result<CorrectionResult, CorrectionError> {
        let body = llm::build_request_body(request, &self.config)?;
        if let Some(cb) = &self.config.progress_callback {
            cb.on_request_start(request.images.len(), &self.config.model);
        }
        let completion = llm::send(&self.http, &self.config, &body).await?;
        debug!(
            "{} input tokens, {} output tokens",
            completion.input_tokens, completion.output_tokens
        );
        parse::parse_correction(&completion.content)
    }

    /// Convenience over [`CorrectionClient::correct_exercises`] taking the
    /// three inputs separately.
    pub async fn correct_images(
        &self,
        images: Vec<ImageInput>,
        output_language: Option<&str>,
        user_preferences: Option<&str>,
    ) -> Result<CorrectionResult, CorrectionError> {
        let request = CorrectionRequest {
            images,
            output_language: output_language.map(str::to_string),
            user_preferences: user_preferences.map(str::to_string),
        };
        self.correct_exercises(&request).await
    }

    /// Load image files (order kept) and correct them.
    pub async fn correct_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        output_language: Option<&str>,
        user_preferences: Option<&str>,
    ) -> Result<CorrectionResult, CorrectionError> {
        let images = input::load_images(paths).await?;
        self.correct_images(images, output_language, user_preferences)
            .await
    }

    /// Blocking wrapper around [`CorrectionClient::correct_exercises`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn correct_exercises_sync(
        &self,
        request: &CorrectionRequest,
    ) -> Result<CorrectionResult, CorrectionError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| CorrectionError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.correct_exercises(request))
    }
}
