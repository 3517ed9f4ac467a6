//! PDF rendering of the laid-out report

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use super::layout::{self, DocumentLayout, Element, PageLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::{ExportContext, ReportExporter};
use crate::services::Aggregator;
use crate::types::{DailyReport, LogbookError, Result};

const LAYER_NAME: &str = "Layer 1";
const RULE_THICKNESS_PT: f32 = 0.5;

/// A4 PDF exporter
#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    /// TTF/OTF font with Japanese glyphs
    font_path: Option<PathBuf>,
}

impl PdfExporter {
    pub fn new(font_path: Option<PathBuf>) -> Self {
        Self { font_path }
    }

    fn load_font(&self, doc: &PdfDocumentReference) -> Result<IndirectFontRef> {
        match &self.font_path {
            Some(path) => load_external_font(doc, path),
            None => {
                tracing::warn!(
                    "no pdf_font_path configured; using builtin Helvetica, Japanese text will not render"
                );
                doc.add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| LogbookError::Export(format!("PDF font error: {e}")))
            }
        }
    }

    /// Turn a finished page model into PDF bytes
    pub fn render_layout(&self, document: &DocumentLayout) -> Result<Vec<u8>> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            document.title.as_str(),
            Mm(PAGE_WIDTH_MM as f32),
            Mm(PAGE_HEIGHT_MM as f32),
            LAYER_NAME,
        );
        let font = self.load_font(&doc)?;

        for (index, page) in document.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (p, l) = doc.add_page(
                    Mm(PAGE_WIDTH_MM as f32),
                    Mm(PAGE_HEIGHT_MM as f32),
                    LAYER_NAME,
                );
                doc.get_page(p).get_layer(l)
            };
            draw_page(&layer, page, &font);
        }

        doc.save_to_bytes()
            .map_err(|e| LogbookError::Export(format!("PDF write error: {e}")))
    }
}

fn load_external_font(doc: &PdfDocumentReference, path: &Path) -> Result<IndirectFontRef> {
    let file = File::open(path).map_err(|e| {
        LogbookError::Export(format!("cannot open font {}: {e}", path.display()))
    })?;
    doc.add_external_font(BufReader::new(file))
        .map_err(|e| LogbookError::Export(format!("invalid font {}: {e}", path.display())))
}

fn greyscale(level: f32) -> Color {
    Color::Greyscale(Greyscale::new(level, None))
}

/// Layout y runs down from the top edge, PDF y runs up from the bottom
fn pdf_y(y: f64) -> Mm {
    Mm((PAGE_HEIGHT_MM - y) as f32)
}

fn draw_page(layer: &PdfLayerReference, page: &PageLayout, font: &IndirectFontRef) {
    layer.set_outline_thickness(RULE_THICKNESS_PT);

    for element in &page.elements {
        match element {
            Element::Text {
                x,
                y,
                size,
                tone,
                text,
            } => {
                layer.set_fill_color(greyscale(tone.level()));
                layer.use_text(text.as_str(), *size, Mm(*x as f32), pdf_y(*y), font);
            }
            Element::Rule { x1, x2, y, tone } => {
                layer.set_outline_color(greyscale(tone.level()));
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x1 as f32), pdf_y(*y)), false),
                        (Point::new(Mm(*x2 as f32), pdf_y(*y)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}

impl ReportExporter for PdfExporter {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn file_name(&self, ctx: &ExportContext<'_>) -> String {
        ctx.labels.pdf_file_name(ctx.period)
    }

    fn render(&self, reports: &[DailyReport], ctx: &ExportContext<'_>) -> Result<Vec<u8>> {
        let stats = Aggregator::summarize(reports, ctx.policy)?;
        let document = layout::layout(reports, &stats, ctx)?;
        tracing::debug!(
            pages = document.pages.len(),
            rows = reports.len(),
            "rendering PDF"
        );
        self.render_layout(&document)
    }
}
