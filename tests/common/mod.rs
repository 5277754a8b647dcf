#![allow(dead_code)]

use insight_report::{InsightGenerator, Pipeline, ReportConfig};
use std::path::{Path, PathBuf};

pub const HEADER: &str = "date,clicks,impressions,ad_spend,revenue";

/// Write `rows` under the standard header to `dir/name` and return the path.
pub fn write_csv(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from(HEADER);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    std::fs::write(&path, body).expect("write csv fixture");
    path
}

/// 14 days: clicks 10 for the first week and 20 for the second,
/// impressions 100, spend 5 and revenue 15 every day.
pub fn two_week_rows() -> Vec<String> {
    (1..=14)
        .map(|d| {
            let clicks = if d <= 7 { 10 } else { 20 };
            format!("2024-01-{:02},{},100,5,15", d, clicks)
        })
        .collect()
}

pub fn offline_pipeline(out_dir: &Path) -> Pipeline {
    Pipeline::with_generator(ReportConfig::new(out_dir), InsightGenerator::offline())
}

pub fn sample_csv() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample_data.csv")
}

pub fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w == needle.as_bytes())
}
