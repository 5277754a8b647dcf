//! Advertising campaign insight reports.
//!
//! Loads a campaign CSV, computes headline KPIs, renders a clicks-over-time
//! chart, writes a short narrative (remote providers with a rule-based
//! fallback) and assembles everything into a PDF.
//!
//! ```ignore
//! use insight_report::{Pipeline, ReportConfig};
//!
//! let pipeline = Pipeline::new(ReportConfig::from_env());
//! let pdf = pipeline.run("data/sample_data.csv".as_ref())?;
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod glyphs;
pub mod insight;
pub mod kpi;
pub mod loader;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod types;
pub mod util;

pub use config::{InsightConfig, ReportConfig};
pub use error::{ReportError, Result};
pub use insight::InsightGenerator;
pub use pipeline::{Pipeline, ReportOutcome};
pub use providers::{ProviderError, TextProvider};
pub use types::{ChartArtifact, Dataset, Insight, InsightSource, KpiSummary, Record, Trend};
