//! Minimal PDF 1.4 writer.
//!
//! Supports what the insight report needs: several pages, the three built-in
//! Helvetica faces, and RGB images embedded as Flate-compressed XObjects.
//! Coordinates passed in are measured from the top-left corner of the page
//! in points; the writer flips them to PDF's bottom-left origin.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use std::io::{self, Write};

pub const MM: f64 = 72.0 / 25.4;
pub const A4_WIDTH: f64 = 210.0 * MM;
pub const A4_HEIGHT: f64 = 297.0 * MM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
        }
    }
}

/// Approximate Helvetica advance width of `c`, in units of the font size.
fn char_width(c: char) -> f64 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' => 0.22,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'I' | 'f' | 't' | '/' | '(' | ')' | '[' | ']' => 0.28,
        'r' | '-' => 0.33,
        '"' | '*' => 0.36,
        'm' | 'M' => 0.83,
        'w' => 0.72,
        'W' => 0.94,
        '%' => 0.89,
        '@' => 1.0,
        'A'..='Z' => 0.67,
        '0'..='9' | '$' | '#' | '?' => 0.56,
        'a'..='z' => 0.52,
        _ => 0.56,
    }
}

/// Estimated rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let base: f64 = text.chars().map(char_width).sum::<f64>() * size;
    match font {
        Font::Bold => base * 1.06,
        _ => base,
    }
}

/// Greedy word wrap against a width in points. Always returns at least one
/// line. Words longer than the width are hard-broken across lines.
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            for piece in break_word(word, font, size, max_width) {
                if current.is_empty() {
                    current = piece;
                    continue;
                }
                let candidate = format!("{} {}", current, piece);
                if text_width(&candidate, font, size) <= max_width {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, piece));
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// Split `word` into chunks no wider than `max_width`, one char minimum each.
fn break_word(word: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    if text_width(word, font, size) <= max_width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1 && text_width(&current, font, size) > max_width {
            current.pop();
            pieces.push(std::mem::replace(&mut current, c.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Encode text as a PDF literal string body in WinAnsi, escaping delimiters
/// and writing non-ASCII bytes as octal escapes. Characters outside WinAnsi
/// are transliterated where there is an obvious ASCII form, else `?`.
pub fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' | '\r' | '\t' => out.push(' '),
            ' '..='~' => out.push(c),
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{2032}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' => out.push_str("\\225"),
            '\u{20ac}' => out.push_str("\\200"),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

struct EmbeddedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[derive(Default)]
struct Page {
    content: String,
}

pub struct PdfWriter {
    title: String,
    width: f64,
    height: f64,
    pages: Vec<Page>,
    images: Vec<EmbeddedImage>,
}

impl PdfWriter {
    pub fn new(title: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn a4(title: impl Into<String>) -> Self {
        Self::new(title, A4_WIDTH, A4_HEIGHT)
    }

    pub fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Start a new page and return its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Place text with its baseline at `baseline` (top-origin).
    pub fn text(&mut self, page: usize, x: f64, baseline: f64, font: Font, size: f64, text: &str) {
        let y = self.height - baseline;
        let op = format!(
            "BT /{} {:.2} Tf {:.2} {:.2} Td ({}) Tj ET\n",
            font.resource(),
            size,
            x,
            y,
            encode_text(text)
        );
        self.pages[page].content.push_str(&op);
    }

    /// Compress and register an image; returns a handle for [`Self::image`].
    pub fn add_image(&mut self, img: &RgbImage) -> io::Result<usize> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(img.as_raw())?;
        let data = encoder.finish()?;
        self.images.push(EmbeddedImage {
            width: img.width(),
            height: img.height(),
            data,
        });
        Ok(self.images.len() - 1)
    }

    /// Draw a registered image with its top-left corner at `(x, top)`.
    pub fn image(&mut self, page: usize, image: usize, x: f64, top: f64, w: f64, h: f64) {
        let y = self.height - top - h;
        let op = format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q\n",
            w, h, x, y, image
        );
        self.pages[page].content.push_str(&op);
    }

    /// Serialize the document. A document with no pages gets one blank page.
    pub fn to_bytes(&self, creation_date: &str) -> Vec<u8> {
        let blank = [Page::default()];
        let pages: &[Page] = if self.pages.is_empty() { &blank } else { &self.pages };

        // Object layout: 1 catalog, 2 page tree, 3..=5 fonts, 6 info,
        // then images, then a (page, content) pair per page.
        let font_base = 3;
        let info_id = 6;
        let image_base = 7;
        let page_base = image_base + self.images.len();
        let page_id = |i: usize| page_base + i * 2;
        let total_objects = page_base + pages.len() * 2 - 1;

        let mut pdf: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::with_capacity(total_objects);
        pdf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        offsets.push(pdf.len());
        pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        offsets.push(pdf.len());
        let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_id(i))).collect();
        pdf.extend_from_slice(
            format!(
                "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
                kids.join(" "),
                pages.len()
            )
            .as_bytes(),
        );

        for (i, font) in Font::ALL.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj\n",
                    font_base + i,
                    font.base_font()
                )
                .as_bytes(),
            );
        }

        offsets.push(pdf.len());
        pdf.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Title ({}) /Producer (insight_report) /CreationDate ({}) >>\nendobj\n",
                info_id,
                encode_text(&self.title),
                creation_date
            )
            .as_bytes(),
        );

        for (i, img) in self.images.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
                    image_base + i,
                    img.width,
                    img.height,
                    img.data.len()
                )
                .as_bytes(),
            );
            pdf.extend_from_slice(&img.data);
            pdf.extend_from_slice(b"\nendstream\nendobj\n");
        }

        let fonts: String = Font::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| format!("/{} {} 0 R", f.resource(), font_base + i))
            .collect::<Vec<_>>()
            .join(" ");
        let xobjects: String = (0..self.images.len())
            .map(|i| format!("/Im{} {} 0 R", i, image_base + i))
            .collect::<Vec<_>>()
            .join(" ");

        for (i, page) in pages.iter().enumerate() {
            let id = page_id(i);
            offsets.push(pdf.len());
            pdf.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources << /Font << {} >> /XObject << {} >> >> >>\nendobj\n",
                    id,
                    self.width,
                    self.height,
                    id + 1,
                    fonts,
                    xobjects
                )
                .as_bytes(),
            );

            offsets.push(pdf.len());
            pdf.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                    id + 1,
                    page.content.len(),
                    page.content
                )
                .as_bytes(),
            );
        }

        let xref_start = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for pos in &offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", pos).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                info_id,
                xref_start
            )
            .as_bytes(),
        );
        pdf
    }
}
