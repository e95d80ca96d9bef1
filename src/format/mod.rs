//! Presentation formatters for a [`crate::CorrectionResult`].
//!
//! Both renderers are functions of the result alone, with no network access:
//!
//! ```text
//!                    ┌─▶ markdown::format_as_markdown ──▶ String
//! CorrectionResult ──┤
//!                    └─▶ layout::layout_document ──▶ pdf::paint ──▶ PDF bytes
//! ```
//!
//! They share the given-data suppression rule
//! ([`crate::Exercise::visible_given_data`]) and per-exercise question
//! numbering. The PDF path needs fonts and the pdfium library; when those are
//! missing only that path fails.

pub mod layout;
pub mod markdown;
pub mod pdf;

pub use layout::layout_document;
pub use markdown::format_as_markdown;
pub use pdf::format_as_document;
