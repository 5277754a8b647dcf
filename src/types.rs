use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tabled::Tabled;

/// One CSV row as read from disk, before any cleaning. Every cell is kept as
/// text so missing or odd values can be handled by the loader itself.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub date: Option<String>,
    pub clicks: Option<String>,
    pub impressions: Option<String>,
    pub ad_spend: Option<String>,
    pub revenue: Option<String>,
}

/// A cleaned row. Numeric fields default to 0 when the source cell was empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub clicks: f64,
    pub impressions: f64,
    pub ad_spend: f64,
    pub revenue: f64,
}

/// Records in source row order. The pipeline never re-sorts this.
pub type Dataset = Vec<Record>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KpiSummary {
    pub ctr: f64,
    pub roi: f64,
    pub total_clicks: u64,
    pub total_impressions: u64,
    pub total_spend: f64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Which link of the fallback chain produced the insight text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum InsightSource {
    Provider(String),
    Fallback,
}

impl fmt::Display for InsightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightSource::Provider(name) => write!(f, "{}", name),
            InsightSource::Fallback => f.write_str("rule-based"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub text: String,
    pub source: InsightSource,
    pub trend: Trend,
}

/// Written next to the PDF as `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats<'a> {
    pub kpis: &'a KpiSummary,
    pub trend: Trend,
    pub insight_source: &'a InsightSource,
    pub rows: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
