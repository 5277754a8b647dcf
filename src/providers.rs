//! Remote text-generation providers.
//!
//! Each provider turns a prompt into narrative text with one blocking HTTP
//! call. Failures are reported as [`ProviderError`] and never abort the
//! pipeline; the insight generator simply moves on to the next link.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const SYSTEM_PROMPT: &str = "You are an expert advertising analyst.";

/// Errors from a single provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("failed to connect: {0}")]
    Connection(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("provider returned no text")]
    EmptyResponse,
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// One link of the insight fallback chain.
pub trait TextProvider {
    /// Short name used in logs and in the report summary.
    fn name(&self) -> &str;

    /// Generate text for `prompt`. Must not return whitespace-only text
    /// as `Ok`.
    fn try_generate(&self, prompt: &str) -> ProviderResult<String>;
}

/// Generation settings shared by both providers.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

fn build_client(timeout: Duration) -> ProviderResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

fn map_send_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout.as_secs())
    } else {
        ProviderError::Connection(e.to_string())
    }
}

fn check_status(response: reqwest::blocking::Response) -> ProviderResult<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 429 {
        return Err(ProviderError::RateLimited);
    }
    let body = response.text().unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

fn non_empty(text: String) -> ProviderResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ProviderError::EmptyResponse)
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Primary provider: OpenAI chat completions API.
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    model: String,
    params: GenerationParams,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        params: GenerationParams,
    ) -> ProviderResult<Self> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            client: build_client(params.timeout)?,
            params,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        }
    }
}

/// Pull the first choice's message text out of a chat completion body.
pub fn parse_openai_response(body: &str) -> ProviderResult<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".to_string()))?;
    non_empty(content)
}

impl TextProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn try_generate(&self, prompt: &str) -> ProviderResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        tracing::debug!("Sending request to OpenAI: {} ({})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| map_send_error(e, self.params.timeout))?;
        let body = check_status(response)?
            .text()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parse_openai_response(&body)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Secondary provider: Google Gemini generateContent API.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    params: GenerationParams,
    client: Client,
}

impl GeminiProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        params: GenerationParams,
    ) -> ProviderResult<Self> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            client: build_client(params.timeout)?,
            params,
        })
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.params.max_tokens,
                temperature: self.params.temperature,
            },
        }
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

/// Concatenate the text parts of the first candidate.
pub fn parse_gemini_response(body: &str) -> ProviderResult<String> {
    let parsed: GeminiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    let content = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| ProviderError::InvalidResponse("no candidates in response".to_string()))?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    non_empty(text)
}

impl TextProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn try_generate(&self, prompt: &str) -> ProviderResult<String> {
        let url = self.endpoint();
        tracing::debug!("Sending request to Gemini: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| map_send_error(e, self.params.timeout))?;
        let body = check_status(response)?
            .text()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parse_gemini_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            max_tokens: 200,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_parse_openai_response() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  Strong quarter.  "}}]}"#;
        assert_eq!(parse_openai_response(body).unwrap(), "Strong quarter.");
    }

    #[test]
    fn test_parse_openai_response_errors() {
        assert!(matches!(
            parse_openai_response(r#"{"choices":[]}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_openai_response(r#"{"choices":[{"message":{"content":"   "}}]}"#),
            Err(ProviderError::EmptyResponse)
        ));
        assert!(matches!(
            parse_openai_response("<html>bad gateway</html>"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_gemini_response_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Clicks rose. "},{"text":"Keep going."}],"role":"model"}}]}"#;
        assert_eq!(
            parse_gemini_response(body).unwrap(),
            "Clicks rose. Keep going."
        );
    }

    #[test]
    fn test_parse_gemini_response_blocked() {
        // Safety-blocked responses come back with a candidate but no content.
        let body = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert!(matches!(
            parse_gemini_response(body),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(parse_gemini_response(r#"{}"#).is_err());
    }

    #[test]
    fn test_openai_request_body() {
        let provider = OpenAiProvider::new("sk-test", "https://api.openai.com", "gpt-4o", params()).unwrap();
        let json = serde_json::to_value(provider.request_body("hello")).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(json["messages"][1]["content"], "hello");
        let temperature = json["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_gemini_request_body() {
        let provider = GeminiProvider::new(
            "key",
            "https://generativelanguage.googleapis.com",
            "gemini-2.0-flash-exp",
            params(),
        )
        .unwrap();
        let json = serde_json::to_value(provider.request_body("hello")).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 200);
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_gemini_endpoint_strips_models_prefix() {
        let provider = GeminiProvider::new(
            "key",
            "https://generativelanguage.googleapis.com/",
            "models/gemini-2.0-flash-exp",
            params(),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
        assert_eq!(provider.name(), "Gemini");
    }

    #[test]
    fn test_unreachable_endpoint_is_error() {
        // Port 9 on localhost is not expected to serve HTTP.
        let provider = OpenAiProvider::new("sk-test", "http://127.0.0.1:9", "gpt-4o", params()).unwrap();
        assert!(provider.try_generate("hello").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: invalid api key");
        assert_eq!(
            ProviderError::Timeout(30).to_string(),
            "request timed out after 30 seconds"
        );
    }
}
