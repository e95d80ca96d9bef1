//! Response content → [`CorrectionResult`].
//!
//! The content string of the first choice must be a JSON document matching
//! the declared schema. Two cosmetic wrappers that some providers add despite
//! structured-output mode are removed first:
//!
//! 1. A leading byte-order mark and surrounding whitespace
//! 2. An outer ```` ```json ```` (or bare ```` ``` ````) fence
//!
//! Nothing inside the JSON is touched. Anything that then fails to
//! deserialise (invalid JSON, missing field, unknown field) is a
//! [`CorrectionError::MalformedResponse`]; a partially-populated result is
//! never returned.

use crate::error::CorrectionError;
use crate::output::CorrectionResult;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?[ \t]*\r?\n(.*?)\r?\n?```$").unwrap());

/// Strip the BOM, surrounding whitespace and an outer code fence.
pub fn clean_content(content: &str) -> &str {
    let trimmed = content.trim_start_matches('\u{FEFF}').trim();
    match RE_OUTER_FENCES.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse the model's content string into a validated result.
pub fn parse_correction(content: &str) -> Result<CorrectionResult, CorrectionError> {
    let cleaned = clean_content(content);
    if cleaned.is_empty() {
        return Err(CorrectionError::MalformedResponse {
            detail: "message content is empty".into(),
        });
    }
    serde_json::from_str(cleaned).map_err(|e| CorrectionError::MalformedResponse {
        detail: format!("content does not match the correction schema: {e}"),
    })
}
