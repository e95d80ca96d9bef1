//! Progress-callback trait for correction requests.
//!
//! Inject an [`Arc<dyn CorrectionProgressCallback>`] via
//! [`crate::config::CorrectionConfigBuilder::progress_callback`] to be told
//! when a correction request starts and how it ends. The CLI uses this to
//! drive its spinner; a UI adapter can forward the events anywhere else.
//!
//! # Example
//!
//! ```rust
//! use exercise_corrector::{CorrectionConfig, CorrectionProgressCallback};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! impl CorrectionProgressCallback for Logger {
//!     fn on_request_complete(&self, exercise_count: usize, duration_ms: u64) {
//!         eprintln!("{exercise_count} exercises corrected in {duration_ms}ms");
//!     }
//! }
//!
//! let config = CorrectionConfig::builder()
//!     .api_key("sk-or-test")
//!     .progress_callback(Arc::new(Logger) as Arc<dyn CorrectionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by [`crate::CorrectionClient`] around each provider request.
///
/// All methods default to no-ops so implementations only override what they
/// care about. Implementations must be `Send + Sync` because the client is
/// shared across tasks.
pub trait CorrectionProgressCallback: Send + Sync {
    /// Called once the request body is built, just before it is sent.
    ///
    /// # Arguments
    /// * `image_count`: number of images attached to the request
    /// * `model`: model identifier the request targets
    fn on_request_start(&self, image_count: usize, model: &str) {
        let _ = (image_count, model);
    }

    /// Called when a well-formed result was parsed.
    ///
    /// # Arguments
    /// * `exercise_count`: number of exercises in the result
    /// * `duration_ms`: wall-clock time of the request, parsing included
    fn on_request_complete(&self, exercise_count: usize, duration_ms: u64) {
        let _ = (exercise_count, duration_ms);
    }

    /// Called when the request failed or the response was rejected.
    fn on_request_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl CorrectionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CorrectionConfig`].
pub type ProgressCallback = Arc<dyn CorrectionProgressCallback>;
