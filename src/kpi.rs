use crate::types::{KpiSummary, KpiRow, Record, Trend};
use crate::util::{average, format_currency, format_int, format_percent, round2};

/// Size of the "first week" / "last week" windows used for the trend.
pub const TREND_WINDOW: usize = 7;

/// Reduce the dataset to the six headline KPIs.
pub fn compute(data: &[Record]) -> KpiSummary {
    let total_clicks: f64 = data.iter().map(|r| r.clicks).sum();
    let total_impressions: f64 = data.iter().map(|r| r.impressions).sum();
    let total_spend: f64 = data.iter().map(|r| r.ad_spend).sum();
    let total_revenue: f64 = data.iter().map(|r| r.revenue).sum();

    let ctr = if total_impressions > 0.0 {
        total_clicks / total_impressions * 100.0
    } else {
        0.0
    };
    let roi = if total_spend > 0.0 {
        total_revenue / total_spend * 100.0
    } else {
        0.0
    };

    let kpis = KpiSummary {
        ctr: round2(ctr),
        roi: round2(roi),
        total_clicks: total_clicks.trunc() as u64,
        total_impressions: total_impressions.trunc() as u64,
        total_spend: round2(total_spend),
        total_revenue: round2(total_revenue),
    };
    tracing::info!(
        "KPIs computed: CTR {} | ROI {}",
        format_percent(kpis.ctr),
        format_percent(kpis.roi)
    );
    kpis
}

/// Mean clicks over the first and last `min(TREND_WINDOW, len)` rows.
///
/// On datasets shorter than two windows the slices overlap.
pub fn window_means(data: &[Record]) -> (f64, f64) {
    let w = TREND_WINDOW.min(data.len());
    let clicks: Vec<f64> = data.iter().map(|r| r.clicks).collect();
    let first = average(&clicks[..w]);
    let last = average(&clicks[clicks.len() - w..]);
    (first, last)
}

pub fn trend(data: &[Record]) -> Trend {
    let (first, last) = window_means(data);
    if last > first {
        Trend::Improving
    } else {
        Trend::Declining
    }
}

/// Labelled rows for console previews, in report order.
pub fn kpi_rows(kpis: &KpiSummary) -> Vec<KpiRow> {
    let row = |metric: &str, value: String| KpiRow {
        metric: metric.to_string(),
        value,
    };
    vec![
        row("Click-Through Rate (CTR)", format_percent(kpis.ctr)),
        row("Return on Investment (ROI)", format_percent(kpis.roi)),
        row("Total Clicks", format_int(kpis.total_clicks)),
        row("Total Impressions", format_int(kpis.total_impressions)),
        row("Total Ad Spend", format_currency(kpis.total_spend)),
        row("Total Revenue", format_currency(kpis.total_revenue)),
    ]
}
