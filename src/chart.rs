//! Clicks-over-time line chart.
//!
//! Renders a fixed 10x5 inch chart at 150 DPI into a PNG. Text is drawn with
//! the bitmap glyphs in [`crate::glyphs`], so no system fonts are needed.

use crate::error::{ReportError, Result};
use crate::glyphs::{draw_text, draw_text_centered, text_height, text_width};
use crate::types::{ChartArtifact, Record};
use crate::util::format_number;
use chrono::{Duration, NaiveDate};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::Path;

pub const DPI: u32 = 150;
pub const WIDTH: u32 = 10 * DPI;
pub const HEIGHT: u32 = 5 * DPI;

pub const TITLE: &str = "Campaign Performance: Clicks Over Time";

const MARGIN_LEFT: u32 = 150;
const MARGIN_RIGHT: u32 = 50;
const MARGIN_TOP: u32 = 90;
const MARGIN_BOTTOM: u32 = 120;

const Y_TICKS: usize = 5;
const MAX_X_TICKS: i64 = 8;
const MARKER_RADIUS: i32 = 5;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([222, 222, 222]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const SERIES: Rgb<u8> = Rgb([0x25, 0x63, 0xeb]);

/// Data-space to pixel-space mapping for the plot area.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn px(&self, x: f64) -> f32 {
        let t = (x - self.x_min) / (self.x_max - self.x_min);
        self.left + (self.right - self.left) * t as f32
    }

    fn py(&self, y: f64) -> f32 {
        let t = (y - self.y_min) / (self.y_max - self.y_min);
        self.bottom - (self.bottom - self.top) * t as f32
    }
}

/// Render the clicks series to a PNG at `out_path`, overwriting any
/// existing file.
pub fn render(data: &[Record], out_path: &Path) -> Result<ChartArtifact> {
    tracing::info!("Creating visualization ({} points)", data.len());
    let img = draw(data)?;
    img.save_with_format(out_path, ImageFormat::Png)
        .map_err(|e| ReportError::Render(format!("failed to write {}: {}", out_path.display(), e)))?;
    tracing::info!("Chart saved to {}", out_path.display());
    Ok(ChartArtifact {
        path: out_path.to_path_buf(),
        width: WIDTH,
        height: HEIGHT,
    })
}

/// Draw the chart into an in-memory image.
pub fn draw(data: &[Record]) -> Result<RgbImage> {
    if let Some((i, r)) = data.iter().enumerate().find(|(_, r)| !r.clicks.is_finite()) {
        return Err(ReportError::Render(format!(
            "row {} ({}) has a non-finite click value",
            i + 1,
            r.date
        )));
    }

    let origin = data.iter().map(|r| r.date).min();
    let xs: Vec<f64> = match origin {
        Some(o) => data.iter().map(|r| (r.date - o).num_days() as f64).collect(),
        None => Vec::new(),
    };
    let ys: Vec<f64> = data.iter().map(|r| r.clicks).collect();

    let frame = frame_for(&xs, &ys);
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    draw_y_grid(&mut img, &frame);
    if let Some(o) = origin {
        draw_x_grid(&mut img, &frame, o);
    }
    draw_hollow_rect_mut(
        &mut img,
        Rect::at(frame.left as i32, frame.top as i32).of_size(
            (frame.right - frame.left) as u32 + 1,
            (frame.bottom - frame.top) as u32 + 1,
        ),
        AXIS,
    );

    let points: Vec<(f32, f32)> = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (frame.px(*x), frame.py(*y)))
        .collect();
    for pair in points.windows(2) {
        draw_thick_segment(&mut img, pair[0], pair[1]);
    }
    for (x, y) in &points {
        draw_filled_circle_mut(&mut img, (x.round() as i32, y.round() as i32), MARKER_RADIUS, SERIES);
    }

    draw_labels(&mut img, &frame);
    Ok(img)
}

fn frame_for(xs: &[f64], ys: &[f64]) -> Frame {
    let (mut x_min, mut x_max) = min_max(xs).unwrap_or((0.0, 1.0));
    if x_max - x_min < f64::EPSILON {
        // Single date: centre it.
        x_min -= 1.0;
        x_max += 1.0;
    }

    let (lo, hi) = min_max(ys).unwrap_or((0.0, 0.0));
    let y_min = lo.min(0.0);
    let mut y_max = hi.max(0.0) * 1.1;
    if y_max - y_min < f64::EPSILON {
        y_max = y_min + 1.0;
    }

    Frame {
        left: MARGIN_LEFT as f32,
        top: MARGIN_TOP as f32,
        right: (WIDTH - MARGIN_RIGHT) as f32,
        bottom: (HEIGHT - MARGIN_BOTTOM) as f32,
        x_min,
        x_max,
        y_min,
        y_max,
    }
}

fn min_max(v: &[f64]) -> Option<(f64, f64)> {
    let first = *v.first()?;
    Some(v.iter().fold((first, first), |(lo, hi), x| (lo.min(*x), hi.max(*x))))
}

fn draw_y_grid(img: &mut RgbImage, frame: &Frame) {
    let step = (frame.y_max - frame.y_min) / Y_TICKS as f64;
    let decimals = if step < 1.0 { 1 } else { 0 };
    for i in 0..=Y_TICKS {
        let v = frame.y_min + step * i as f64;
        let y = frame.py(v);
        draw_line_segment_mut(img, (frame.left, y), (frame.right, y), GRID);
        let label = format_number(v, decimals);
        let x = frame.left as i32 - 12 - text_width(&label, 2) as i32;
        draw_text(img, x, y as i32 - text_height(2) as i32 / 2, &label, 2, TEXT);
    }
}

fn draw_x_grid(img: &mut RgbImage, frame: &Frame, origin: NaiveDate) {
    let span = frame.x_max - frame.x_min;
    let days = span.round() as i64;
    let step = ((days + MAX_X_TICKS - 1) / MAX_X_TICKS).max(1);
    let mut day = frame.x_min.ceil() as i64;
    while day as f64 <= frame.x_max {
        let x = frame.px(day as f64);
        draw_line_segment_mut(img, (x, frame.top), (x, frame.bottom), GRID);
        let label = (origin + Duration::days(day)).format("%m/%d").to_string();
        draw_text_centered(img, x as i32, frame.bottom as i32 + 14, &label, 2, TEXT);
        day += step;
    }
}

fn draw_labels(img: &mut RgbImage, frame: &Frame) {
    draw_text_centered(img, WIDTH as i32 / 2, 30, TITLE, 3, TEXT);

    let x_mid = ((frame.left + frame.right) / 2.0) as i32;
    draw_text_centered(img, x_mid, HEIGHT as i32 - 50, "Date", 2, TEXT);

    // Y-axis label, one letter per line.
    let label = "Clicks";
    let line = text_height(2) as i32 + 6;
    let y_mid = ((frame.top + frame.bottom) / 2.0) as i32;
    let y0 = y_mid - line * label.len() as i32 / 2;
    for (i, c) in label.chars().enumerate() {
        draw_text(img, 30, y0 + i as i32 * line, &c.to_string(), 2, TEXT);
    }
}

/// 2 px line drawn as three offset hairlines.
fn draw_thick_segment(img: &mut RgbImage, a: (f32, f32), b: (f32, f32)) {
    for (dx, dy) in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)] {
        draw_line_segment_mut(img, (a.0 + dx, a.1 + dy), (b.0 + dx, b.1 + dy), SERIES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rec(day: u32, clicks: f64) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            clicks,
            impressions: 100.0,
            ad_spend: 5.0,
            revenue: 15.0,
        }
    }

    #[test]
    fn test_fixed_resolution() {
        let data: Vec<Record> = (1..=14).map(|d| rec(d, d as f64 * 3.0)).collect();
        let img = draw(&data).unwrap();
        assert_eq!(img.dimensions(), (1500, 750));
    }

    #[test]
    fn test_series_colour_is_drawn() {
        let data = vec![rec(1, 10.0), rec(2, 20.0), rec(3, 15.0)];
        let img = draw(&data).unwrap();
        assert!(img.pixels().any(|p| *p == SERIES));
    }

    #[test]
    fn test_empty_and_single_row_do_not_fail() {
        let empty = draw(&[]).unwrap();
        assert!(!empty.pixels().any(|p| *p == SERIES));

        let single = draw(&[rec(5, 42.0)]).unwrap();
        assert!(single.pixels().any(|p| *p == SERIES));
    }

    #[test]
    fn test_all_zero_clicks_and_same_dates() {
        let data = vec![rec(3, 0.0), rec(3, 0.0), rec(3, 0.0)];
        assert!(draw(&data).is_ok());
    }

    #[test]
    fn test_unsorted_dates_render() {
        let data = vec![rec(9, 3.0), rec(1, 8.0), rec(4, 5.0)];
        assert!(draw(&data).is_ok());
    }

    #[test]
    fn test_non_finite_clicks_is_render_error() {
        let data = vec![rec(1, 1.0), rec(2, f64::NAN)];
        assert!(matches!(draw(&data), Err(ReportError::Render(_))));
    }

    #[test]
    fn test_deterministic_output() {
        let data: Vec<Record> = (1..=10).map(|d| rec(d, (d * d) as f64)).collect();
        assert_eq!(draw(&data).unwrap(), draw(&data).unwrap());
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let artifact = render(&[rec(1, 1.0), rec(2, 2.0)], &path).unwrap();
        assert_eq!(artifact.path, path);
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), WIDTH);
    }

    #[test]
    fn test_render_to_missing_dir_is_render_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("chart.png");
        assert!(matches!(render(&[], &path), Err(ReportError::Render(_))));
    }
}
