//! Pipeline stages for one correction request.
//!
//! Each submodule implements one transformation step, so each is testable on
//! its own and only [`llm`] touches the network.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm ──────────▶ parse
//! (files)   (data URL) (POST + schema) (validate → CorrectionResult)
//! ```
//!
//! 1. [`input`] : read image files and resolve their MIME types
//! 2. [`encode`]: base64 data URLs, order preserved
//! 3. [`schema`]: the strict `response_format` declaration
//! 4. [`llm`]   : request body, the single HTTP call, completion envelope
//! 5. [`parse`] : strip cosmetic wrappers and deserialise strictly

pub mod encode;
pub mod input;
pub mod llm;
pub mod parse;
pub mod schema;
