//! Printable documents: exam papers, syllabi and date sheets.
//!
//! Builders turn records into logical [`layout::Unit`]s, the layout engine
//! positions them on one continuous 800 px surface, the paginator slices that
//! surface into A4 bands and [`pdf`] writes one page per band.

pub mod date_sheet;
pub mod exam;
pub mod fonts;
pub mod layout;
pub mod output;
pub mod paginate;
pub mod pdf;
pub mod script;
pub mod syllabus;
pub mod word;

use std::path::Path;

use thiserror::Error;

use fonts::FontSet;
use layout::{Align, Cell, Paragraph, Rgb, Row, TextStyle, Unit};
use output::SavedDocument;
use paginate::PageGeometry;
use script::{Direction, Vocabulary};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("right-to-left text needs a TrueType font with Arabic script coverage (set EXAMDESK_FONT)")]
    FontUnavailable,
    #[error("invalid page geometry: {0}")]
    Geometry(String),
    #[error("font could not be parsed: {0}")]
    Font(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bundle documents: {0}")]
    Bundle(String),
}

impl RenderError {
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::FontUnavailable => "font_unavailable",
            RenderError::Geometry(_) | RenderError::Font(_) | RenderError::Bundle(_) => {
                "render_failed"
            }
            RenderError::Io { .. } => "io_failed",
        }
    }
}

/// Presentation metadata shared by every document.
#[derive(Debug, Clone)]
pub struct Letterhead {
    pub school_name: String,
}

impl Letterhead {
    pub fn new(school_name: impl Into<String>) -> Self {
        Self {
            school_name: school_name.into(),
        }
    }
}

/// Strip drawn under every band.
#[derive(Debug, Clone)]
pub struct Footer {
    pub left: String,
    pub right: String,
    pub vocabulary: &'static Vocabulary,
    pub direction: Direction,
}

impl Footer {
    pub fn page_numbers(vocabulary: &'static Vocabulary, direction: Direction) -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            vocabulary,
            direction,
        }
    }

    fn row(&self, page: usize, pages: usize) -> Row {
        let style = TextStyle::new(10.0).color(Rgb::GRAY);
        let cell = |text: &str, align: Align| {
            Cell::new(
                Paragraph::new(text, style)
                    .direction(self.direction)
                    .align(align),
            )
        };
        Row::new(vec![
            cell(&self.left, Align::Start),
            cell(&self.vocabulary.page_of(page, pages), Align::Center),
            cell(&self.right, Align::End),
        ])
        .direction(self.direction)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub file_name: String,
    pub units: Vec<Unit>,
    pub footer: Footer,
}

impl Document {
    pub fn has_rtl_text(&self) -> bool {
        self.units
            .iter()
            .flat_map(|u| u.texts())
            .any(crate::translit::is_rtl_text)
    }
}

#[derive(Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

pub fn render_pdf(
    doc: &Document,
    fonts: &FontSet,
    geometry: &PageGeometry,
) -> Result<Rendered, RenderError> {
    geometry.validate()?;
    if fonts.truetype().is_none() && doc.has_rtl_text() {
        return Err(RenderError::FontUnavailable);
    }
    let width = geometry.content_width();
    let band = geometry.band_height();
    let laid: Vec<_> = doc
        .units
        .iter()
        .map(|u| layout::layout_unit(u, width, fonts))
        .collect();
    let surface = paginate::compose(&laid, band);
    let pages = paginate::paginate(surface, band);
    let total = pages.len();

    let footer_top = band + 12.0;
    let page_items: Vec<_> = pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| {
            let mut items = page.items;
            let strip = layout::layout_row(&doc.footer.row(i + 1, total), 0.0, width, fonts);
            items.extend(strip.items.iter().map(|it| it.offset(0.0, footer_top)));
            items
        })
        .collect();

    let bytes = pdf::write_pdf(&page_items, geometry, fonts, &doc.title);
    tracing::debug!(title = %doc.title, pages = total, "document rendered");
    Ok(Rendered {
        bytes,
        pages: total,
    })
}

/// Renders and saves under `dir`; nothing is written when rendering fails.
pub fn render_to_dir(
    doc: &Document,
    fonts: &FontSet,
    geometry: &PageGeometry,
    dir: &Path,
) -> Result<SavedDocument, RenderError> {
    let rendered = render_pdf(doc, fonts, geometry)?;
    output::save(dir, &doc.file_name, &rendered.bytes, rendered.pages)
}

/// Centered school name with a rule under it.
pub(crate) fn school_header(unit: &mut Unit, letterhead: &Letterhead, color: Rgb, size: f32) {
    unit.paragraph(
        Paragraph::new(letterhead.school_name.as_str(), TextStyle::new(size).bold().color(color))
            .align(Align::Center),
    );
}

/// Two signature lines side by side.
pub(crate) fn signature_row(left: &str, right: &str) -> Row {
    let style = TextStyle::new(14.0).bold();
    Row::new(vec![
        Cell::new(Paragraph::new(left, style).align(Align::Center))
            .rule_above()
            .weight(2.0),
        Cell::new(Paragraph::new("", style)).weight(1.0),
        Cell::new(Paragraph::new(right, style).align(Align::Center))
            .rule_above()
            .weight(2.0),
    ])
}

/// Dashed "Note:" box.
pub(crate) fn note_box(note: &str) -> Row {
    Row::new(vec![Cell::stack(vec![
        Paragraph::new("Note:", TextStyle::new(14.0).bold().color(Rgb::SLATE)),
        Paragraph::new(note, TextStyle::new(14.0).italic().color(Rgb::SLATE)),
    ])])
    .padding(15.0)
    .border(Rgb::GRAY)
    .fill(Rgb::NOTE_FILL)
    .dashed()
}
