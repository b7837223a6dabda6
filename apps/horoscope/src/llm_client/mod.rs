/// LLM Client: the single point of entry for all text-generation API calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation endpoint directly.
/// All model interactions MUST go through this module.
///
/// The HTTP hop sits behind the `Transport` trait so retry and parsing can be
/// exercised without a network.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const TEMPERATURE: f32 = 0.9;

/// Harm categories sent with `BLOCK_NONE`; horoscope copy trips them easily.
const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Why a single generation attempt failed. Every variant is recoverable:
/// callers retry within the policy bound, then fall back.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited (status 429)")]
    RateLimited,

    #[error("Response blocked: {reason}")]
    Blocked { reason: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No JSON object found in response")]
    NoJsonObject,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Status and body of a raw HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The HTTP hop to the generation endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<RawResponse, LlmError>;
}

/// `reqwest`-backed transport used in production.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<RawResponse, LlmError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(RawResponse { status, body })
    }
}

/// Bounded, fixed-delay retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Result<String, LlmError> {
        let Some(candidate) = self.candidates.first() else {
            return Err(match self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone())
            {
                Some(reason) => LlmError::Blocked { reason },
                None => LlmError::EmptyContent,
            });
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if !text.trim().is_empty() {
            return Ok(text);
        }
        match candidate.finish_reason.as_deref() {
            Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                Err(LlmError::Blocked {
                    reason: reason.to_string(),
                })
            }
            _ => Err(LlmError::EmptyContent),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single generation client. Wraps the `generateContent` API with retry
/// and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn Transport>,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, retry: RetryPolicy) -> Result<Self, LlmError> {
        Ok(Self::with_transport(
            Arc::new(HttpTransport::new()?),
            api_key,
            model,
            retry,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        api_key: String,
        model: String,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            api_key,
            model,
            retry,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE_URL}/{}:generateContent", self.model)
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "safetySettings": HARM_CATEGORIES
                .iter()
                .map(|category| json!({ "category": category, "threshold": "BLOCK_NONE" }))
                .collect::<Vec<_>>(),
            "generationConfig": { "temperature": TEMPERATURE },
        })
    }

    /// One request, no retry. Returns the generated text or the reason the
    /// attempt failed.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .transport
            .post_json(&self.endpoint(), &self.api_key, &Self::request_body(prompt))
            .await?;

        if response.status == 429 {
            return Err(LlmError::RateLimited);
        }

        if !(200..300).contains(&response.status) {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&response.body)
                .map(|e| e.error.message)
                .unwrap_or(response.body);
            return Err(LlmError::Api {
                status: response.status,
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&response.body)?;
        parsed.text()
    }

    /// Calls the model and deserializes the first JSON object found in its
    /// text. HTTP failures, rate limiting, empty or blocked responses and
    /// unparseable JSON all count as failed attempts; after
    /// `retry.max_attempts` the last failure is returned.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, LlmError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let started = tokio::time::Instant::now();
            let outcome = match self.call(prompt).await {
                Ok(text) => parse_json_response::<T>(&text),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => {
                    debug!(
                        "LLM call succeeded on attempt {} in {}ms",
                        attempt,
                        started.elapsed().as_millis()
                    );
                    return Ok(value);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!("LLM call failed after {} attempts: {}", attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "LLM call attempt {}/{} failed ({}), retrying after {}ms...",
                        attempt,
                        max_attempts,
                        e,
                        self.retry.backoff.as_millis()
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Extracts the first top-level JSON object in `text` and deserializes it.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let span = extract_json_object(text).ok_or(LlmError::NoJsonObject)?;
    Ok(serde_json::from_str(span)?)
}

/// Returns the first balanced `{...}` span in `text`, skipping surrounding
/// prose and code fences. Braces inside JSON strings are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
pub mod testing {
    //! Scripted transport for tests.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order; once the script runs out the last
    /// response repeats.
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<RawResponse>>,
        last: Mutex<Option<RawResponse>>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn new(script: Vec<RawResponse>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(
            &self,
            _url: &str,
            _api_key: &str,
            body: &Value,
        ) -> Result<RawResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(prompt) = body["contents"][0]["parts"][0]["text"].as_str() {
                self.prompts.lock().unwrap().push(prompt.to_string());
            }
            let next = self.script.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(response) = next {
                *last = Some(response);
            }
            Ok(last.clone().unwrap_or(RawResponse {
                status: 500,
                body: "empty script".to_string(),
            }))
        }
    }

    /// A 200 response whose single candidate carries `text`.
    pub fn ok_text(text: &str) -> RawResponse {
        RawResponse {
            status: 200,
            body: json!({
                "candidates": [{
                    "content": { "parts": [{ "text": text }] },
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn client(transport: Arc<ScriptedTransport>, backoff: Duration) -> LlmClient {
        LlmClient::with_transport(
            transport,
            "test-key".to_string(),
            "test-model".to_string(),
            RetryPolicy {
                max_attempts: 3,
                backoff,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::testing::{client, ok_text, status, ScriptedTransport};
    use super::*;

    #[test]
    fn test_extract_json_discards_leading_prose() {
        let input = "Here is the JSON:\n{\"Bélier\":{\"amour\":\"x\"}} Bonne journée !";
        assert_eq!(
            extract_json_object(input),
            Some("{\"Bélier\":{\"amour\":\"x\"}}")
        );
    }

    #[test]
    fn test_extract_json_inside_code_fence() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json_object(input), Some("{\"key\": \"value\"}"));
    }

    #[test]
    fn test_extract_json_ignores_braces_in_strings() {
        let input = r#"{"a": "brace } inside", "b": {"c": "\"{"}} trailing }"#;
        assert_eq!(
            extract_json_object(input),
            Some(r#"{"a": "brace } inside", "b": {"c": "\"{"}}"#)
        );
    }

    #[test]
    fn test_extract_json_unbalanced_or_absent() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{\"a\": 1"), None);
    }

    #[test]
    fn test_parse_json_response_reports_missing_object() {
        let result = parse_json_response::<Value>("Désolé, je ne peux pas.");
        assert!(matches!(result, Err(LlmError::NoJsonObject)));
    }

    #[test]
    fn test_request_body_carries_prompt_and_safety_settings() {
        let body = LlmClient::request_body("bonjour");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "bonjour");
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[tokio::test]
    async fn test_call_classifies_rate_limit() {
        let transport = ScriptedTransport::new(vec![status(429, "slow down")]);
        let llm = client(transport, Duration::ZERO);
        assert!(matches!(llm.call("p").await, Err(LlmError::RateLimited)));
    }

    #[tokio::test]
    async fn test_call_extracts_api_error_message() {
        let transport = ScriptedTransport::new(vec![status(
            400,
            r#"{"error": {"code": 400, "message": "API key not valid"}}"#,
        )]);
        let llm = client(transport, Duration::ZERO);
        match llm.call("p").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_keeps_raw_body_for_non_json_errors() {
        let transport = ScriptedTransport::new(vec![status(503, "upstream overloaded")]);
        let llm = client(transport, Duration::ZERO);
        match llm.call("p").await {
            Err(LlmError::Api { message, .. }) => assert_eq!(message, "upstream overloaded"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_empty_candidates() {
        let transport = ScriptedTransport::new(vec![status(200, r#"{"candidates": []}"#)]);
        let llm = client(transport, Duration::ZERO);
        assert!(matches!(llm.call("p").await, Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_call_blocked_prompt() {
        let transport = ScriptedTransport::new(vec![status(
            200,
            r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#,
        )]);
        let llm = client(transport, Duration::ZERO);
        match llm.call("p").await {
            Err(LlmError::Blocked { reason }) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected Blocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_joins_text_parts() {
        let transport = ScriptedTransport::new(vec![status(
            200,
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]}"#,
        )]);
        let llm = client(transport, Duration::ZERO);
        assert_eq!(llm.call("p").await.unwrap(), "{\"a\":1}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_json_gives_up_after_three_rate_limits() {
        let transport = ScriptedTransport::new(vec![status(429, ""); 3]);
        let llm = client(transport.clone(), Duration::from_secs(10));

        let started = tokio::time::Instant::now();
        let result = llm.call_json::<Value>("p").await;

        assert!(matches!(result, Err(LlmError::RateLimited)));
        assert_eq!(transport.calls(), 3);
        // Two waits between three attempts, none after the last.
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_json_retries_malformed_json() {
        let transport = ScriptedTransport::new(vec![
            ok_text("Voici : {\"a\": oops}"),
            ok_text("```json\n{\"a\": 1}\n```"),
        ]);
        let llm = client(transport.clone(), Duration::from_secs(5));

        let value: HashMap<String, u32> = llm.call_json("p").await.unwrap();

        assert_eq!(value["a"], 1);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_json_recovers_after_server_error() {
        let transport = ScriptedTransport::new(vec![
            status(500, "boom"),
            ok_text("{\"ok\": true}"),
        ]);
        let llm = client(transport.clone(), Duration::from_secs(5));

        let value: Value = llm.call_json("p").await.unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(transport.calls(), 2);
    }
}
