//! End-to-end report pipeline.
//!
//! load → KPIs → chart → insight → PDF, strictly in that order. Loader,
//! chart and assembly failures abort the run; the insight stage cannot fail.

use crate::chart;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::insight::InsightGenerator;
use crate::kpi;
use crate::loader;
use crate::output::write_json;
use crate::report;
use crate::types::{Insight, KpiSummary, Record, SummaryStats, Trend};
use std::path::{Path, PathBuf};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub report_path: PathBuf,
    pub chart_path: PathBuf,
    pub summary_path: PathBuf,
    pub kpis: KpiSummary,
    pub trend: Trend,
    pub insight: Insight,
    pub rows: usize,
}

pub struct Pipeline {
    config: ReportConfig,
    insights: InsightGenerator,
}

impl Pipeline {
    /// Pipeline whose insight chain is built from `config.insight`.
    pub fn new(config: ReportConfig) -> Self {
        let insights = InsightGenerator::from_config(&config.insight);
        Self { config, insights }
    }

    /// Pipeline with an explicit insight chain.
    pub fn with_generator(config: ReportConfig, insights: InsightGenerator) -> Self {
        Self { config, insights }
    }

    /// Run on the CSV at `source` and return the report location.
    pub fn run(&self, source: &Path) -> Result<PathBuf> {
        self.run_detailed(source).map(|o| o.report_path)
    }

    pub fn run_detailed(&self, source: &Path) -> Result<ReportOutcome> {
        self.ensure_output_dir()?;
        let data = loader::load(source).map_err(log_fatal)?;
        self.run_dataset(&data)
    }

    /// Stages after loading, for callers that already hold a dataset.
    pub fn run_dataset(&self, data: &[Record]) -> Result<ReportOutcome> {
        self.ensure_output_dir()?;

        let kpis = kpi::compute(data);
        let chart = chart::render(data, &self.config.chart_path()).map_err(log_fatal)?;
        let insight = self.insights.generate(&kpis, data);
        let report_path =
            report::assemble(&kpis, &insight, Some(&chart), &self.config.report_path())
                .map_err(log_fatal)?;

        let summary_path = self.config.summary_path();
        let summary = SummaryStats {
            kpis: &kpis,
            trend: insight.trend,
            insight_source: &insight.source,
            rows: data.len(),
        };
        write_json(&summary_path, &summary).map_err(log_fatal)?;

        tracing::info!(
            "Report generated successfully (insight source: {}), output saved to {}",
            insight.source,
            self.config.output_dir.display()
        );
        Ok(ReportOutcome {
            report_path,
            chart_path: chart.path,
            summary_path,
            kpis,
            trend: insight.trend,
            insight,
            rows: data.len(),
        })
    }

    fn ensure_output_dir(&self) -> Result<()> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir)
            .map_err(|e| ReportError::io(dir, e))
            .map_err(log_fatal)
    }
}

fn log_fatal(err: ReportError) -> ReportError {
    tracing::error!("Error generating report: {}", err);
    err
}
