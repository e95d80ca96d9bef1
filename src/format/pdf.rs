//! PDF painting via pdfium.
//!
//! ## Why TrueType CID fonts?
//!
//! The output language is whatever the user asked for (or whatever the
//! exercise was written in), so the built-in PDF base-14 fonts, which only
//! cover Latin-1, are not enough. The three faces of a [`FontSet`] are
//! embedded as CID fonts, which lets pdfium map any code point the font has a
//! glyph for.
//!
//! Fonts are read before pdfium is bound so a missing font is reported by
//! path rather than as an opaque pdfium error. Every failure here is a
//! [`CorrectionError::DocumentRender`]; it never affects the Markdown export.

use crate::config::{DocumentOptions, FontSet};
use crate::error::CorrectionError;
use crate::format::layout::{layout_document, DocumentLayout, FontFace, LayoutItem};
use crate::output::CorrectionResult;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Render `result` as a paginated A4 PDF.
///
/// # Errors
/// [`CorrectionError::DocumentRender`] when a font cannot be read, pdfium
/// cannot be bound, or pdfium fails while building the document.
pub fn format_as_document(
    result: &CorrectionResult,
    options: &DocumentOptions,
) -> Result<Vec<u8>, CorrectionError> {
    let layout = layout_document(result);
    let fonts = FontBytes::read(&options.fonts)?;
    let pdfium = bind_pdfium(options.pdfium_library.as_deref())?;
    let bytes = paint(&pdfium, &layout, &fonts)?;
    info!(
        "Rendered PDF: {} page(s), {} bytes",
        layout.pages.len(),
        bytes.len()
    );
    Ok(bytes)
}

struct FontBytes {
    regular: Vec<u8>,
    bold: Vec<u8>,
    oblique: Vec<u8>,
}

impl FontBytes {
    fn read(fonts: &FontSet) -> Result<Self, CorrectionError> {
        Ok(Self {
            regular: read_font(&fonts.regular)?,
            bold: read_font(&fonts.bold)?,
            oblique: read_font(&fonts.oblique)?,
        })
    }
}

fn read_font(path: &Path) -> Result<Vec<u8>, CorrectionError> {
    std::fs::read(path).map_err(|e| CorrectionError::DocumentRender {
        detail: format!(
            "cannot load font '{}': {e}\nInstall DejaVu fonts or pass --font-dir.",
            path.display()
        ),
    })
}

fn render_err(context: &str) -> impl Fn(PdfiumError) -> CorrectionError + '_ {
    move |e| CorrectionError::DocumentRender {
        detail: format!("{context}: {e:?}"),
    }
}

/// Bind to an explicit library (file or directory), else `./`, else the system one.
fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, CorrectionError> {
    let bindings = match explicit {
        Some(path) if path.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
        }
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| CorrectionError::DocumentRender {
        detail: format!(
            "cannot bind to the pdfium library: {e:?}\nSet PDFIUM_LIB_PATH=/path/to/libpdfium."
        ),
    })?;
    debug!("Bound pdfium");
    Ok(Pdfium::new(bindings))
}

fn paint(pdfium: &Pdfium, layout: &DocumentLayout, fonts: &FontBytes) -> Result<Vec<u8>, CorrectionError> {
    let mut document = pdfium
        .create_new_pdf()
        .map_err(render_err("creating document"))?;

    let regular = document
        .fonts_mut()
        .load_true_type_from_bytes(&fonts.regular, true)
        .map_err(render_err("embedding regular font"))?;
    let bold = document
        .fonts_mut()
        .load_true_type_from_bytes(&fonts.bold, true)
        .map_err(render_err("embedding bold font"))?;
    let oblique = document
        .fonts_mut()
        .load_true_type_from_bytes(&fonts.oblique, true)
        .map_err(render_err("embedding oblique font"))?;

    let rule_colour = PdfColor::new(200, 200, 200, 255);

    for (index, page_layout) in layout.pages.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(render_err("adding page"))?;

        for item in &page_layout.items {
            match item {
                LayoutItem::Text(line) => {
                    if line.text.is_empty() {
                        continue;
                    }
                    let font = match line.style.face() {
                        FontFace::Regular => regular,
                        FontFace::Bold => bold,
                        FontFace::Oblique => oblique,
                    };
                    page.objects_mut()
                        .create_text_object(
                            PdfPoints::new(line.x),
                            PdfPoints::new(line.baseline),
                            &line.text,
                            font,
                            PdfPoints::new(line.style.font_size()),
                        )
                        .map_err(render_err("placing text"))?;
                }
                LayoutItem::Rule(rule) => {
                    page.objects_mut()
                        .create_path_object_line(
                            PdfPoints::new(rule.x1),
                            PdfPoints::new(rule.y),
                            PdfPoints::new(rule.x2),
                            PdfPoints::new(rule.y),
                            rule_colour,
                            PdfPoints::new(0.75),
                        )
                        .map_err(render_err("drawing separator"))?;
                }
            }
        }
        debug!("Painted page {} ({} items)", index + 1, page_layout.items.len());
    }

    document.save_to_bytes().map_err(render_err("saving document"))
}
