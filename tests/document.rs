//! PDF export tests that need a real pdfium library and the DejaVu fonts.
//!
//! They skip (and pass) when either is missing, so they are safe in CI.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test document -- --nocapture

use exercise_corrector::{
    format_as_document, layout_document, CorrectionResult, DocumentOptions, Exercise, Question,
};
use pdfium_render::prelude::*;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Return `DocumentOptions` when fonts and pdfium are usable, else skip the test.
macro_rules! skip_unless_renderable {
    () => {{
        let options = DocumentOptions::from_env();
        let fonts = &options.fonts;
        if ![&fonts.regular, &fonts.bold, &fonts.oblique]
            .iter()
            .all(|p| p.exists())
        {
            println!("SKIP — DejaVu fonts not found in {}", fonts.regular.display());
            return;
        }
        if bind(&options).is_none() {
            println!("SKIP — pdfium not available; set PDFIUM_LIB_PATH");
            return;
        }
        options
    }};
}

fn bind(options: &DocumentOptions) -> Option<Pdfium> {
    let bindings = match options.pdfium_library.as_deref() {
        Some(p) if p.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(p))
        }
        Some(p) => Pdfium::bind_to_library(p),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    };
    bindings.ok().map(Pdfium::new)
}

fn exercise(n: usize, given: &str, questions: usize) -> Exercise {
    Exercise {
        exercise_name: format!("Exercise {n}"),
        given_data: given.to_string(),
        questions: (1..=questions)
            .map(|q| Question {
                question: format!("Question {q} of exercise {n}?"),
                answer: format!(
                    "Step 1: read the data. Step 2: apply the formula. Step 3: the result is {}.",
                    n * q
                ),
            })
            .collect(),
    }
}

fn page_text(pdfium: &Pdfium, bytes: &[u8]) -> Vec<String> {
    let document = pdfium.load_pdf_from_byte_slice(bytes, None).unwrap();
    document
        .pages()
        .iter()
        .map(|page| page.text().map(|t| t.all()).unwrap_or_default())
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn empty_result_is_one_blank_page() {
    let options = skip_unless_renderable!();

    let bytes = format_as_document(&CorrectionResult::default(), &options).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let pdfium = bind(&options).unwrap();
    let pages = page_text(&pdfium, &bytes);
    assert_eq!(pages.len(), 1);
    assert!(pages[0].trim().is_empty());
}

#[test]
fn text_and_numbering_survive_rendering() {
    let options = skip_unless_renderable!();
    let result = CorrectionResult {
        exercises: vec![exercise(1, "a = 3, b = 4", 2), exercise(2, "N/A", 1)],
    };

    let bytes = format_as_document(&result, &options).unwrap();
    let pdfium = bind(&options).unwrap();
    let text = page_text(&pdfium, &bytes).join("\n");

    assert!(text.contains("Exercise 1"));
    assert!(text.contains("a = 3, b = 4"));
    assert!(text.contains("1. Question 1 of exercise 1?"));
    assert!(text.contains("2. Question 2 of exercise 1?"));
    assert!(text.contains("1. Question 1 of exercise 2?"));
    assert!(!text.contains("N/A"));
}

#[test]
fn long_result_paginates_like_the_layout() {
    let options = skip_unless_renderable!();
    let result = CorrectionResult {
        exercises: (1..=12).map(|n| exercise(n, "x = 1", 4)).collect(),
    };

    let expected_pages = layout_document(&result).pages.len();
    assert!(expected_pages > 1);

    let bytes = format_as_document(&result, &options).unwrap();
    let pdfium = bind(&options).unwrap();
    assert_eq!(page_text(&pdfium, &bytes).len(), expected_pages);
}

#[test]
fn non_latin_text_is_embedded() {
    let options = skip_unless_renderable!();
    let result = CorrectionResult {
        exercises: vec![Exercise {
            exercise_name: "Упражнение 1".into(),
            given_data: "α = 30°".into(),
            questions: vec![Question {
                question: "Найдите sin α".into(),
                answer: "sin α = ½".into(),
            }],
        }],
    };

    let bytes = format_as_document(&result, &options).unwrap();
    let pdfium = bind(&options).unwrap();
    let text = page_text(&pdfium, &bytes).join("\n");
    assert!(text.contains("Упражнение 1"));
    assert!(text.contains("α = 30°"));
}
