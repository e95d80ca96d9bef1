//! Request and result types.
//!
//! [`CorrectionResult`] mirrors the JSON schema declared to the provider
//! (see [`crate::pipeline::schema`]). Unknown fields are rejected and every
//! field is required, so a value that deserialises is a value the renderers
//! can trust.

use serde::{Deserialize, Serialize};

/// One image to correct: raw bytes plus declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    /// e.g. `image/png`. Passed through to the data URL as-is.
    pub mime_type: String,
}

impl ImageInput {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Everything one correction call needs besides the client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionRequest {
    /// Sent in this order; never reordered or deduplicated.
    pub images: Vec<ImageInput>,
    /// `None` or blank: answer in the language of the exercise.
    pub output_language: Option<String>,
    /// Free-text instruction appended to the system prompt.
    pub user_preferences: Option<String>,
}

impl CorrectionRequest {
    pub fn new(images: Vec<ImageInput>) -> Self {
        Self {
            images,
            ..Default::default()
        }
    }

    pub fn output_language(mut self, language: impl Into<String>) -> Self {
        self.output_language = Some(language.into());
        self
    }

    pub fn user_preferences(mut self, prefs: impl Into<String>) -> Self {
        self.user_preferences = Some(prefs.into());
        self
    }

    /// The language directive value, if one was actually given.
    pub fn language(&self) -> Option<&str> {
        non_blank(self.output_language.as_deref())
    }

    /// The preferences clause value, if one was actually given.
    pub fn preferences(&self) -> Option<&str> {
        non_blank(self.user_preferences.as_deref())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// The structured correction returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrectionResult {
    pub exercises: Vec<Exercise>,
}

/// One logical problem set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exercise {
    /// May be empty; renderers still emit a heading.
    pub exercise_name: String,
    /// May be a sentinel; see [`Exercise::visible_given_data`].
    pub given_data: String,
    pub questions: Vec<Question>,
}

/// A question with its corrected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub question: String,
    pub answer: String,
}

/// Given-data values meaning "no given data", compared case-insensitively.
pub const GIVEN_DATA_SENTINELS: [&str; 4] = ["none", "n/a", "-", ""];

impl Exercise {
    /// Trimmed given data, or `None` when it is blank or a sentinel.
    pub fn visible_given_data(&self) -> Option<&str> {
        let trimmed = self.given_data.trim();
        let lowered = trimmed.to_lowercase();
        if GIVEN_DATA_SENTINELS.contains(&lowered.as_str()) {
            None
        } else {
            Some(trimmed)
        }
    }
}

impl CorrectionResult {
    /// Total questions across all exercises.
    pub fn question_count(&self) -> usize {
        self.exercises.iter().map(|e| e.questions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}
