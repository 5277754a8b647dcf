//! Insight report assembly.
//!
//! Lays out the fixed report template (title, KPIs, executive summary,
//! chart) on A4 pages and writes the PDF.

use crate::error::{ReportError, Result};
use crate::kpi::kpi_rows;
use crate::pdf::{text_width, wrap_text, Font, PdfWriter, MM};
use crate::types::{ChartArtifact, Insight, KpiSummary};
use chrono::{DateTime, Local};
use image::RgbImage;
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "Automated Insight Report";

const MARGIN: f64 = 10.0 * MM;
const BOTTOM_MARGIN: f64 = 20.0 * MM;
const CHART_WIDTH: f64 = 190.0 * MM;

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
}

/// Top-down layout cursor that breaks to a new page when content would run
/// past the bottom margin.
struct Layout {
    pdf: PdfWriter,
    page: usize,
    y: f64,
}

impl Layout {
    fn new(mut pdf: PdfWriter) -> Self {
        let page = pdf.add_page();
        Self {
            pdf,
            page,
            y: MARGIN,
        }
    }

    fn content_width(&self) -> f64 {
        self.pdf.page_size().0 - 2.0 * MARGIN
    }

    fn ensure_room(&mut self, h: f64) {
        let limit = self.pdf.page_size().1 - BOTTOM_MARGIN;
        if self.y + h > limit && self.y > MARGIN {
            self.page = self.pdf.add_page();
            self.y = MARGIN;
        }
    }

    fn gap(&mut self, h: f64) {
        self.y += h;
    }

    /// One line of text in a cell of height `h`, text vertically centred.
    fn cell(&mut self, h: f64, font: Font, size: f64, text: &str, align: Align) {
        self.ensure_room(h);
        let x = match align {
            Align::Left => MARGIN,
            Align::Center => {
                let w = text_width(text, font, size);
                MARGIN + ((self.content_width() - w) / 2.0).max(0.0)
            }
        };
        let baseline = self.y + h / 2.0 + size * 0.35;
        self.pdf.text(self.page, x, baseline, font, size, text);
        self.y += h;
    }

    fn paragraph(&mut self, line_h: f64, font: Font, size: f64, text: &str) {
        for line in wrap_text(text, font, size, self.content_width()) {
            self.cell(line_h, font, size, &line, Align::Left);
        }
    }

    fn image(&mut self, img: &RgbImage, w: f64) -> std::io::Result<()> {
        let h = w * img.height() as f64 / img.width().max(1) as f64;
        self.ensure_room(h);
        let handle = self.pdf.add_image(img)?;
        self.pdf.image(self.page, handle, MARGIN, self.y, w, h);
        self.y += h;
        Ok(())
    }
}

/// Build the report PDF and write it to `out_path`, replacing any existing
/// file. A missing or unreadable chart is skipped.
pub fn assemble(
    kpis: &KpiSummary,
    insight: &Insight,
    chart: Option<&ChartArtifact>,
    out_path: &Path,
) -> Result<PathBuf> {
    tracing::info!("Creating PDF report");
    let chart_img = chart.and_then(load_chart);
    let bytes = build_document(kpis, insight, chart_img.as_ref(), Local::now())?;
    std::fs::write(out_path, bytes).map_err(|e| {
        ReportError::Assembly(format!("failed to write {}: {}", out_path.display(), e))
    })?;
    tracing::info!("PDF saved to {}", out_path.display());
    Ok(out_path.to_path_buf())
}

fn load_chart(chart: &ChartArtifact) -> Option<RgbImage> {
    match image::open(&chart.path).map(|img| img.to_rgb8()) {
        Ok(img) if img.dimensions() == (chart.width, chart.height) => Some(img),
        Ok(img) => {
            let (w, h) = img.dimensions();
            tracing::warn!(
                "Chart {} is {}x{}, expected {}x{}; omitting it from the report",
                chart.path.display(),
                w,
                h,
                chart.width,
                chart.height
            );
            None
        }
        Err(e) => {
            tracing::warn!(
                "Chart {} unavailable, omitting it from the report: {}",
                chart.path.display(),
                e
            );
            None
        }
    }
}

/// Lay out the report and return the PDF bytes.
pub fn build_document(
    kpis: &KpiSummary,
    insight: &Insight,
    chart: Option<&RgbImage>,
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>> {
    let mut doc = Layout::new(PdfWriter::a4(REPORT_TITLE));

    doc.cell(15.0 * MM, Font::Bold, 20.0, REPORT_TITLE, Align::Center);
    doc.gap(5.0 * MM);
    let stamp = format!(
        "Generated: {}",
        generated_at.format("%B %d, %Y at %I:%M %p")
    );
    doc.cell(8.0 * MM, Font::Italic, 10.0, &stamp, Align::Center);
    doc.gap(10.0 * MM);

    doc.cell(10.0 * MM, Font::Bold, 14.0, "Key Performance Indicators", Align::Left);
    doc.gap(2.0 * MM);
    for row in kpi_rows(kpis) {
        let line = format!("{}: {}", row.metric, row.value);
        doc.cell(8.0 * MM, Font::Regular, 11.0, &line, Align::Left);
    }
    doc.gap(10.0 * MM);

    doc.cell(10.0 * MM, Font::Bold, 14.0, "Executive Summary", Align::Left);
    doc.gap(2.0 * MM);
    doc.paragraph(6.0 * MM, Font::Regular, 11.0, &insight.text);
    doc.gap(10.0 * MM);

    doc.cell(10.0 * MM, Font::Bold, 14.0, "Performance Visualization", Align::Left);
    doc.gap(5.0 * MM);
    if let Some(img) = chart {
        doc.image(img, CHART_WIDTH)
            .map_err(|e| ReportError::Assembly(format!("failed to embed chart: {}", e)))?;
    }

    let creation = generated_at.format("D:%Y%m%d%H%M%S").to_string();
    Ok(doc.pdf.to_bytes(&creation))
}
