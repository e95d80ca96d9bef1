//! Page layout for the PDF export.
//!
//! Layout is computed here, without touching pdfium, as a list of pages
//! holding positioned text lines and rules. [`crate::format::pdf`] only paints
//! what this module decided, so wrapping and pagination are unit-testable on
//! machines without the native library.
//!
//! All measurements are PDF points (1/72 in). Positions are in PDF user
//! space: `x` from the left edge, `y` from the **bottom** edge.

use crate::output::CorrectionResult;
use unicode_width::UnicodeWidthChar;

const MM: f32 = 72.0 / 25.4;

/// A4 portrait.
pub const PAGE_WIDTH: f32 = 210.0 * MM;
pub const PAGE_HEIGHT: f32 = 297.0 * MM;

/// Left, right and top margin.
pub const MARGIN: f32 = 10.0 * MM;
/// Content never extends into the bottom 20 mm.
pub const BOTTOM_MARGIN: f32 = 20.0 * MM;

/// Printable line width.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Which face a text run is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

/// The four text treatments of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    ExerciseName,
    GivenData,
    Question,
    Answer,
}

impl TextStyle {
    pub fn face(self) -> FontFace {
        match self {
            TextStyle::ExerciseName | TextStyle::Question => FontFace::Bold,
            TextStyle::GivenData => FontFace::Oblique,
            TextStyle::Answer => FontFace::Regular,
        }
    }

    pub fn font_size(self) -> f32 {
        match self {
            TextStyle::ExerciseName => 14.0,
            TextStyle::Question => 12.0,
            TextStyle::GivenData | TextStyle::Answer => 11.0,
        }
    }

    fn line_height(self) -> f32 {
        match self {
            TextStyle::ExerciseName => 10.0 * MM,
            TextStyle::GivenData | TextStyle::Question => 8.0 * MM,
            TextStyle::Answer => 7.0 * MM,
        }
    }

    fn gap_after(self) -> f32 {
        match self {
            TextStyle::ExerciseName | TextStyle::GivenData => 3.0 * MM,
            TextStyle::Question => 2.0 * MM,
            TextStyle::Answer => 5.0 * MM,
        }
    }

    /// Average advance of a narrow glyph as a fraction of the font size.
    ///
    /// Slightly above DejaVu Sans' real average so estimated lines never
    /// overflow the margin.
    fn advance(self) -> f32 {
        match self.face() {
            FontFace::Bold => 0.66,
            FontFace::Regular | FontFace::Oblique => 0.6,
        }
    }
}

/// One line of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub style: TextStyle,
    pub x: f32,
    /// Baseline, measured from the bottom of the page.
    pub baseline: f32,
}

/// A horizontal separator.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    Text(TextLine),
    Rule(Rule),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub items: Vec<LayoutItem>,
}

impl PageLayout {
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.items.iter().filter_map(|item| match item {
            LayoutItem::Text(line) => Some(line),
            LayoutItem::Rule(_) => None,
        })
    }
}

/// The whole document; always at least one page.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// Every text line in reading order.
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(PageLayout::text_lines)
    }
}

/// Lay out `result` onto A4 pages.
///
/// Same order and given-data suppression as the Markdown renderer. Questions
/// are prefixed `<n>. ` with numbering restarting per exercise, and a light
/// rule closes every exercise. An empty result yields one blank page.
pub fn layout_document(result: &CorrectionResult) -> DocumentLayout {
    let mut cursor = Cursor::new();

    for exercise in &result.exercises {
        cursor.paragraph(&exercise.exercise_name, TextStyle::ExerciseName);

        if let Some(given) = exercise.visible_given_data() {
            cursor.paragraph(given, TextStyle::GivenData);
        }

        for (i, q) in exercise.questions.iter().enumerate() {
            cursor.paragraph(&format!("{}. {}", i + 1, q.question), TextStyle::Question);
            cursor.paragraph(&q.answer, TextStyle::Answer);
        }

        cursor.separator();
    }

    cursor.finish()
}

/// Top-down placement state.
struct Cursor {
    pages: Vec<PageLayout>,
    /// Distance from the top edge to the next free line.
    top: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            top: MARGIN,
        }
    }

    fn current(&mut self) -> &mut PageLayout {
        // `pages` starts non-empty and only grows.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.top = MARGIN;
    }

    fn ensure_room(&mut self, height: f32) {
        let page_has_content = !self.current().items.is_empty();
        if page_has_content && self.top + height > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.new_page();
        }
    }

    /// Wrap `text` to the content width and place each line, then the style's gap.
    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let height = style.line_height();
        for line in wrap_text(text, style) {
            self.ensure_room(height);
            let baseline = PAGE_HEIGHT - (self.top + height / 2.0 + style.font_size() * 0.35);
            self.current().items.push(LayoutItem::Text(TextLine {
                text: line,
                style,
                x: MARGIN,
                baseline,
            }));
            self.top += height;
        }
        self.top += style.gap_after();
    }

    fn separator(&mut self) {
        self.top += 5.0 * MM;
        if self.top > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.new_page();
        }
        let y = PAGE_HEIGHT - self.top;
        self.current().items.push(LayoutItem::Rule(Rule {
            x1: MARGIN,
            x2: PAGE_WIDTH - MARGIN,
            y,
        }));
        self.top += 8.0 * MM;
    }

    fn finish(self) -> DocumentLayout {
        DocumentLayout { pages: self.pages }
    }
}

/// Estimated rendered width of `text` in points.
pub fn text_width(text: &str, style: TextStyle) -> f32 {
    let columns: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    columns as f32 * style.font_size() * style.advance()
}

/// Columns a tab expands to.
const TAB_WIDTH: usize = 4;

/// Split `text` into lines no wider than [`CONTENT_WIDTH`].
///
/// Explicit newlines always break. Leading indentation and runs of spaces
/// between words are kept (tabs expand to [`TAB_WIDTH`] spaces), so aligned
/// working reads the same as in the Markdown export. Lines break only at
/// whitespace, dropping the run at the break; a single word wider than the
/// line is split between characters. An empty paragraph still occupies one
/// (empty) line, so an empty exercise name leaves a gap.
pub fn wrap_text(text: &str, style: TextStyle) -> Vec<String> {
    let tab = " ".repeat(TAB_WIDTH);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let expanded = raw.trim_end_matches('\r').replace('\t', &tab);
        let paragraph = expanded.trim_end();
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut line = String::new();
        let mut pending = String::new();
        for (is_space, token) in whitespace_runs(paragraph) {
            if is_space {
                pending.push_str(token);
                continue;
            }

            let candidate = format!("{line}{pending}{token}");
            if text_width(&candidate, style) <= CONTENT_WIDTH {
                line = candidate;
                pending.clear();
                continue;
            }

            // Indentation stays with the first word of the paragraph.
            let prefix = if line.is_empty() {
                std::mem::take(&mut pending)
            } else {
                lines.push(std::mem::take(&mut line));
                pending.clear();
                String::new()
            };

            line = format!("{prefix}{token}");
            if text_width(&line, style) <= CONTENT_WIDTH {
                continue;
            }

            line = prefix;
            for ch in token.chars() {
                let mut next = line.clone();
                next.push(ch);
                if !line.trim().is_empty() && text_width(&next, style) > CONTENT_WIDTH {
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                } else {
                    line = next;
                }
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Alternating runs of whitespace and non-whitespace, tagged `true` for whitespace.
fn whitespace_runs(text: &str) -> impl Iterator<Item = (bool, &str)> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() != is_space)
            .map_or(rest.len(), |(i, _)| i);
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some((is_space, run))
    })
}
