mod common;

use common::{contains, offline_pipeline, sample_csv, two_week_rows, write_csv};
use insight_report::insight::IMPROVING_RECOMMENDATION;
use insight_report::providers::ProviderResult;
use insight_report::{
    InsightGenerator, InsightSource, Pipeline, ProviderError, ReportConfig, ReportError,
    TextProvider, Trend,
};
use tempfile::tempdir;

struct DownProvider;

impl TextProvider for DownProvider {
    fn name(&self) -> &str {
        "down"
    }

    fn try_generate(&self, _prompt: &str) -> ProviderResult<String> {
        Err(ProviderError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

struct CannedProvider(&'static str);

impl TextProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    fn try_generate(&self, _prompt: &str) -> ProviderResult<String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn two_week_scenario_end_to_end() {
    let dir = tempdir().unwrap();
    let csv = write_csv(dir.path(), "campaign.csv", &two_week_rows());
    let out = dir.path().join("output");

    let outcome = offline_pipeline(&out).run_detailed(&csv).unwrap();

    assert_eq!(outcome.rows, 14);
    assert_eq!(outcome.kpis.total_clicks, 210);
    assert_eq!(outcome.kpis.total_impressions, 1400);
    assert_eq!(outcome.kpis.ctr, 15.0);
    assert_eq!(outcome.kpis.total_spend, 70.0);
    assert_eq!(outcome.kpis.total_revenue, 210.0);
    assert_eq!(outcome.kpis.roi, 300.0);
    assert_eq!(outcome.trend, Trend::Improving);
    assert_eq!(outcome.insight.source, InsightSource::Fallback);
    assert!(outcome.insight.text.contains("strong"));
    assert!(outcome.insight.text.contains(IMPROVING_RECOMMENDATION));

    assert_eq!(outcome.report_path, out.join("Insight_Report.pdf"));
    let pdf = std::fs::read(&outcome.report_path).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(contains(&pdf, "(Total Clicks: 210) Tj"));
    assert!(contains(&pdf, "/Subtype /Image /Width 1500 /Height 750"));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.summary_path).unwrap()).unwrap();
    assert_eq!(summary["kpis"]["total_clicks"], 210);
    assert_eq!(summary["trend"], "improving");
    assert_eq!(summary["insight_source"]["kind"], "fallback");
}

#[test]
fn run_returns_report_path() {
    let dir = tempdir().unwrap();
    let csv = write_csv(dir.path(), "campaign.csv", &two_week_rows());
    let out = dir.path().join("out");
    let path = offline_pipeline(&out).run(&csv).unwrap();
    assert_eq!(path, out.join("Insight_Report.pdf"));
    assert!(path.is_file());
}

#[test]
fn empty_dataset_still_produces_report() {
    let dir = tempdir().unwrap();
    let csv = write_csv(dir.path(), "empty.csv", &[]);
    let outcome = offline_pipeline(&dir.path().join("out"))
        .run_detailed(&csv)
        .unwrap();
    assert_eq!(outcome.kpis.total_clicks, 0);
    assert_eq!(outcome.kpis.ctr, 0.0);
    assert_eq!(outcome.kpis.roi, 0.0);
    assert_eq!(outcome.trend, Trend::Declining);
    assert!(!outcome.insight.text.is_empty());
    assert!(outcome.chart_path.is_file());
    assert!(outcome.report_path.is_file());
}

#[test]
fn rerun_overwrites_artifacts() {
    let dir = tempdir().unwrap();
    let csv = write_csv(dir.path(), "campaign.csv", &two_week_rows());
    let out = dir.path().join("out");
    let pipeline = offline_pipeline(&out);

    pipeline.run(&csv).unwrap();
    let first_chart = std::fs::read(out.join("chart.png")).unwrap();
    pipeline.run(&csv).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Insight_Report.pdf", "chart.png", "summary.json"]);
    assert_eq!(std::fs::read(out.join("chart.png")).unwrap(), first_chart);
}

#[test]
fn failing_primary_provider_does_not_block_secondary() {
    let dir = tempdir().unwrap();
    let csv = write_csv(dir.path(), "campaign.csv", &two_week_rows());
    let generator = InsightGenerator::new(vec![
        Box::new(DownProvider),
        Box::new(CannedProvider("Clicks doubled in week two. Scale the budget.")),
    ]);
    let pipeline = Pipeline::with_generator(ReportConfig::new(dir.path().join("out")), generator);

    let outcome = pipeline.run_detailed(&csv).unwrap();
    assert_eq!(outcome.insight.source, InsightSource::Provider("canned".to_string()));
    let pdf = std::fs::read(&outcome.report_path).unwrap();
    assert!(contains(&pdf, "(Clicks doubled in week two. Scale the budget.) Tj"));
}

#[test]
fn all_providers_down_falls_back() {
    let dir = tempdir().unwrap();
    let csv = write_csv(dir.path(), "campaign.csv", &two_week_rows());
    let generator = InsightGenerator::new(vec![Box::new(DownProvider), Box::new(DownProvider)]);
    let pipeline = Pipeline::with_generator(ReportConfig::new(dir.path().join("out")), generator);

    let outcome = pipeline.run_detailed(&csv).unwrap();
    assert_eq!(outcome.insight.source, InsightSource::Fallback);
    assert!(outcome.insight.text.contains("strong"));
}

#[test]
fn bad_date_aborts_without_report() {
    let dir = tempdir().unwrap();
    let mut rows = two_week_rows();
    rows[3] = "someday,10,100,5,15".to_string();
    let csv = write_csv(dir.path(), "bad.csv", &rows);
    let out = dir.path().join("out");

    let err = offline_pipeline(&out).run(&csv).unwrap_err();
    assert!(matches!(err, ReportError::DataFormat(_)));
    assert!(err.to_string().contains("row 4"));
    assert!(!out.join("Insight_Report.pdf").exists());
}

#[test]
fn missing_columns_abort() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.csv");
    std::fs::write(&path, "date,clicks\n2024-01-01,5\n").unwrap();
    let err = offline_pipeline(&dir.path().join("out")).run(&path).unwrap_err();
    assert!(matches!(err, ReportError::DataFormat(_)));
}

#[test]
fn bundled_sample_data_runs() {
    let dir = tempdir().unwrap();
    let outcome = offline_pipeline(dir.path()).run_detailed(&sample_csv()).unwrap();
    assert_eq!(outcome.rows, 30);
    assert!(outcome.kpis.total_clicks > 0);
    assert!(outcome.kpis.ctr > 0.0);
    assert_eq!(outcome.trend, Trend::Improving);
}
