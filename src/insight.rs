//! Narrative insight generation.
//!
//! The generator walks an ordered list of [`TextProvider`]s and returns the
//! first non-empty answer. When every provider is missing or fails, a
//! rule-based summary built from the KPIs is used instead, so
//! [`InsightGenerator::generate`] always produces text.

use crate::config::InsightConfig;
use crate::kpi;
use crate::providers::{GeminiProvider, OpenAiProvider, TextProvider};
use crate::types::{Insight, InsightSource, KpiSummary, Record, Trend};
use crate::util::{format_currency, format_int, format_ratio};

pub const IMPROVING_RECOMMENDATION: &str =
    "Continue scaling investment to capitalize on positive momentum.";
pub const DECLINING_RECOMMENDATION: &str =
    "Consider optimizing targeting and creative to improve engagement.";

/// ROI (in percent) above which performance is called "strong".
pub const STRONG_ROI_THRESHOLD: f64 = 200.0;

pub struct InsightGenerator {
    providers: Vec<Box<dyn TextProvider>>,
}

impl InsightGenerator {
    /// Chain with the given providers, tried in order before the rule-based
    /// fallback.
    pub fn new(providers: Vec<Box<dyn TextProvider>>) -> Self {
        Self { providers }
    }

    /// Chain with no remote providers.
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    /// OpenAI first, then Gemini, each only when its key is configured.
    pub fn from_config(config: &InsightConfig) -> Self {
        let params = config.generation_params();
        let mut providers: Vec<Box<dyn TextProvider>> = Vec::new();

        if let Some(key) = &config.openai_api_key {
            match OpenAiProvider::new(
                key.as_str(),
                config.openai_base_url.as_str(),
                config.openai_model.as_str(),
                params.clone(),
            ) {
                Ok(p) => providers.push(Box::new(p)),
                Err(e) => tracing::warn!("OpenAI provider unavailable: {}", e),
            }
        }
        if let Some(key) = &config.google_api_key {
            match GeminiProvider::new(
                key.as_str(),
                config.gemini_base_url.as_str(),
                config.gemini_model.as_str(),
                params,
            ) {
                Ok(p) => providers.push(Box::new(p)),
                Err(e) => tracing::warn!("Gemini provider unavailable: {}", e),
            }
        }
        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn generate(&self, kpis: &KpiSummary, data: &[Record]) -> Insight {
        tracing::info!("Generating insights");
        let trend = kpi::trend(data);
        let prompt = build_prompt(kpis, trend);

        for provider in &self.providers {
            match provider.try_generate(&prompt) {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!("AI insights generated ({})", provider.name());
                    return Insight {
                        text: text.trim().to_string(),
                        source: InsightSource::Provider(provider.name().to_string()),
                        trend,
                    };
                }
                Ok(_) => tracing::warn!("{} returned an empty response", provider.name()),
                Err(e) => tracing::warn!("{} failed: {}", provider.name(), e),
            }
        }

        if self.providers.is_empty() {
            tracing::info!("Using rule-based insights (no API key found)");
        } else {
            tracing::info!("Using rule-based insights (all providers failed)");
        }
        Insight {
            text: fallback_text(kpis, trend),
            source: InsightSource::Fallback,
            trend,
        }
    }
}

pub fn build_prompt(kpis: &KpiSummary, trend: Trend) -> String {
    format!(
        "Analyze this advertising campaign performance data and provide a concise 3-4 sentence executive summary:\n\
         \n\
         - CTR (Click-Through Rate): {ctr}%\n\
         - ROI (Return on Investment): {roi}%\n\
         - Total Clicks: {clicks}\n\
         - Total Impressions: {impressions}\n\
         - Total Ad Spend: {spend}\n\
         - Total Revenue: {revenue}\n\
         - Trend: {trend}\n\
         \n\
         Provide actionable insights focusing on performance and recommendations.",
        ctr = format_ratio(kpis.ctr),
        roi = format_ratio(kpis.roi),
        clicks = format_int(kpis.total_clicks),
        impressions = format_int(kpis.total_impressions),
        spend = format_currency(kpis.total_spend),
        revenue = format_currency(kpis.total_revenue),
        trend = trend,
    )
}

/// Rule-based summary used when no provider answers.
pub fn fallback_text(kpis: &KpiSummary, trend: Trend) -> String {
    let strength = if kpis.roi > STRONG_ROI_THRESHOLD {
        "strong"
    } else {
        "moderate"
    };
    let recommendation = match trend {
        Trend::Improving => IMPROVING_RECOMMENDATION,
        Trend::Declining => DECLINING_RECOMMENDATION,
    };
    format!(
        "The campaign achieved a CTR of {}% and an ROI of {}%, indicating {} performance. \
         With {} total clicks from {} impressions, the engagement trend is {} week over week. \
         Total revenue of {} was generated from {} in ad spend. {}",
        format_ratio(kpis.ctr),
        format_ratio(kpis.roi),
        strength,
        format_int(kpis.total_clicks),
        format_int(kpis.total_impressions),
        trend,
        format_currency(kpis.total_revenue),
        format_currency(kpis.total_spend),
        recommendation,
    )
}
