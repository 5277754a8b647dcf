use crate::providers::GenerationParams;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_SAMPLE_CSV: &str = "data/sample_data.csv";
pub const CHART_FILE: &str = "chart.png";
pub const REPORT_FILE: &str = "Insight_Report.pdf";
pub const SUMMARY_FILE: &str = "summary.json";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_MODEL: &str = "gpt-4o";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

pub const MAX_OUTPUT_TOKENS: u32 = 200;
pub const TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Read an env var, treating unset and blank values alike.
fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Settings for the insight fallback chain. A provider without a key is
/// simply left out of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub google_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            openai_model: OPENAI_MODEL.to_string(),
            google_api_key: None,
            gemini_base_url: GEMINI_BASE_URL.to_string(),
            gemini_model: GEMINI_MODEL.to_string(),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl InsightConfig {
    /// Build from `OPENAI_API_KEY`, `GOOGLE_API_KEY` and the optional
    /// `OPENAI_MODEL`, `GEMINI_MODEL`, `INSIGHT_TIMEOUT_SECS` overrides.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = env_non_empty("INSIGHT_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        Self {
            openai_api_key: env_non_empty("OPENAI_API_KEY"),
            openai_model: env_non_empty("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            google_api_key: env_non_empty("GOOGLE_API_KEY"),
            gemini_model: env_non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            timeout,
            ..Self::default()
        }
    }

    /// No remote providers; always uses the rule-based summary.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_google_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
        }
    }
}

/// Where the pipeline writes its artifacts, plus the insight settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub insight: InsightConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            insight: InsightConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            insight: InsightConfig::default(),
        }
    }

    /// `REPORT_OUTPUT_DIR` plus [`InsightConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            output_dir: env_non_empty("REPORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            insight: InsightConfig::from_env(),
        }
    }

    pub fn with_insight(mut self, insight: InsightConfig) -> Self {
        self.insight = insight;
        self
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(CHART_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE)
    }
}
