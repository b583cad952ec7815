//! Structured-output client for an OpenAI-compatible chat completions API.
//!
//! Enrichers depend on the [`TextGenerator`] trait, not on the HTTP client,
//! so tests substitute scripted generators. [`OpenRouterGenerator`] is the
//! production implementation: it asks for a JSON object constrained by a
//! schema and hands back the parsed object, or `None` when the service
//! answered without one. Provider errors reported inside a successful
//! response are surfaced as [`CamaraError::Generation`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use camara_shared::{CamaraError, GenerativeConfig, Result, resolve_api_key};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Parsed structured output: the top-level JSON object.
pub type StructuredObject = serde_json::Map<String, Value>;

const USER_AGENT: &str = concat!("camara/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Request model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A request for one JSON object matching `schema`.
#[derive(Debug, Clone)]
pub struct GenerateObjectRequest {
    pub messages: Vec<ChatMessage>,
    /// Name reported to the service alongside the schema.
    pub schema_name: String,
    pub schema: Value,
    /// Sampling temperature. `None` leaves the service default.
    pub temperature: Option<f32>,
}

// ---------------------------------------------------------------------------
// Generator seam
// ---------------------------------------------------------------------------

/// Produces schema-constrained JSON objects from chat prompts.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// `Ok(None)` means the call succeeded but yielded no usable object.
    async fn generate_object(
        &self,
        request: &GenerateObjectRequest,
    ) -> Result<Option<StructuredObject>>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaSpec<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaSpec<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
    /// Upstream provider failure, sent with a 200 status.
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// OpenRouter client
// ---------------------------------------------------------------------------

/// Chat completions client for OpenRouter or any compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenRouterGenerator {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CamaraError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build from the `[generative]` config section, reading the API key
    /// from the configured environment variable.
    pub fn from_config(config: &GenerativeConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;
        Self::new(&config.base_url, api_key, &config.model, config.timeout_secs)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    #[instrument(skip_all, fields(model = %self.model, schema = %request.schema_name))]
    async fn generate_object(
        &self,
        request: &GenerateObjectRequest,
    ) -> Result<Option<StructuredObject>> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaSpec {
                    name: &request.schema_name,
                    strict: true,
                    schema: &request.schema,
                },
            },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CamaraError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CamaraError::Generation(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CamaraError::Generation(format!("invalid completion payload: {e}")))?;

        if let Some(error) = &completion.error {
            return Err(CamaraError::Generation(format!(
                "provider error: {}",
                error_message(error)
            )));
        }

        info!(
            latency_ms = started.elapsed().as_millis() as u64,
            served_by = completion.model.as_deref().unwrap_or("unknown"),
            "generation complete"
        );

        let Some(choice) = completion.choices.into_iter().next() else {
            return Ok(None);
        };
        if choice.finish_reason.as_deref() == Some("error") || choice.error.is_some() {
            let detail = choice
                .error
                .as_ref()
                .map(error_message)
                .unwrap_or_else(|| "completion finished with an error".to_string());
            return Err(CamaraError::Generation(format!("provider error: {detail}")));
        }

        Ok(choice.message.content.as_deref().and_then(parse_object))
    }
}

/// Parse completion text into a JSON object, tolerating a Markdown code
/// fence around it. Anything that is not an object yields `None`.
fn parse_object(content: &str) -> Option<StructuredObject> {
    let trimmed = strip_code_fence(content.trim());
    if trimmed.is_empty() {
        debug!("completion content empty");
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            warn!(kind = json_kind(&other), "completion is not a JSON object");
            None
        }
        Err(e) => {
            warn!(error = %e, "completion is not valid JSON");
            None
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// The `message` of an error object, or the raw JSON when it has none.
fn error_message(error: &Value) -> String {
    match error.get("message").and_then(Value::as_str) {
        Some(message) => match error.get("code") {
            Some(code) => format!("{message} (code {code})"),
            None => message.to_string(),
        },
        None => error.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerateObjectRequest {
        GenerateObjectRequest {
            messages: vec![
                ChatMessage::system("Você é um especialista."),
                ChatMessage::user("Explique."),
            ],
            schema_name: "explanation".into(),
            schema: serde_json::json!({
                "type": "object",
                "properties": { "explanation": { "type": "string" } },
                "required": ["explanation"]
            }),
            temperature: Some(0.3),
        }
    }

    fn completion(content: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "id": "gen-1",
            "model": "openai/gpt-4o-mini",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    async fn generator_for(server: &MockServer) -> OpenRouterGenerator {
        OpenRouterGenerator::new(&format!("{}/api/v1/", server.uri()), "test-key", "openai/gpt-4o-mini", 5)
            .expect("build generator")
    }

    #[test]
    fn parse_object_variants() {
        let obj = parse_object(r#"{"explanation": "ok"}"#).unwrap();
        assert_eq!(obj["explanation"], "ok");

        let fenced = parse_object("```json\n{\"explanation\": \"fenced\"}\n```").unwrap();
        assert_eq!(fenced["explanation"], "fenced");

        assert!(parse_object("").is_none());
        assert!(parse_object("[1, 2]").is_none());
        assert!(parse_object("not json").is_none());
    }

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let json = serde_json::to_value(ChatMessage::system("x")).unwrap();
        assert_eq!(json["role"], "system");
    }

    #[tokio::test]
    async fn sends_schema_and_returns_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "openai/gpt-4o-mini",
                "temperature": 0.3,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "explanation", "strict": true }
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(Some(r#"{"explanation": "Texto simples."}"#))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let generator = generator_for(&server).await;
        let obj = generator.generate_object(&request()).await.unwrap().unwrap();
        assert_eq!(obj["explanation"], "Texto simples.");
    }

    #[tokio::test]
    async fn missing_content_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(None)))
            .mount(&server)
            .await;

        let generator = generator_for(&server).await;
        assert!(generator.generate_object(&request()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_choices_yield_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&server)
            .await;

        let generator = generator_for(&server).await;
        assert!(generator.generate_object(&request()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let generator = generator_for(&server).await;
        let err = generator.generate_object(&request()).await.unwrap_err();
        match err {
            CamaraError::Generation(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("rate limited"));
            }
            other => panic!("expected generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_body_with_ok_status_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": { "code": 502, "message": "Provider returned error" }
            })))
            .mount(&server)
            .await;

        let generator = generator_for(&server).await;
        let err = generator.generate_object(&request()).await.unwrap_err();
        match err {
            CamaraError::Generation(msg) => {
                assert!(msg.contains("Provider returned error"));
                assert!(msg.contains("502"));
            }
            other => panic!("expected generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn errored_choice_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "index": 0,
                    "finish_reason": "error",
                    "message": { "role": "assistant", "content": "" },
                    "error": { "code": 500, "message": "upstream timeout" }
                }]
            })))
            .mount(&server)
            .await;

        let generator = generator_for(&server).await;
        let err = generator.generate_object(&request()).await.unwrap_err();
        match err {
            CamaraError::Generation(msg) => assert!(msg.contains("upstream timeout")),
            other => panic!("expected generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn errored_choice_without_detail_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "index": 0, "finish_reason": "error" }]
            })))
            .mount(&server)
            .await;

        let generator = generator_for(&server).await;
        let err = generator.generate_object(&request()).await.unwrap_err();
        assert!(matches!(err, CamaraError::Generation(_)));
    }

    #[test]
    fn from_config_requires_key() {
        let config = GenerativeConfig {
            api_key_env: "CAMARA_TEST_MISSING_GENERATIVE_KEY_98765".into(),
            ..Default::default()
        };
        let err = OpenRouterGenerator::from_config(&config).unwrap_err();
        assert!(matches!(err, CamaraError::Config { .. }));
    }
}
