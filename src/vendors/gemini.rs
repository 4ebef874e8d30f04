//! Google Gemini integration (API key based).

use super::TextModel;
use crate::config::ModelSettings;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest upstream error body kept in [`BotError::Api`]; it ends up in
/// user-facing text
pub const MAX_ERROR_CHARS: usize = 200;

/// Client for `models/{model}:generateContent`
pub struct GeminiClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: Client,
}

/// Token counts reported in `usageMetadata`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeminiUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, settings: &ModelSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Resolve the key from the environment and build the client
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let api_key = settings.resolve_api_key()?;
        Self::new(api_key, settings)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Single-turn request body
    pub fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        })
    }

    /// Join the text parts of the first candidate
    pub fn extract_text(response: &Value) -> Result<String> {
        let parts = response["candidates"]
            .as_array()
            .and_then(|candidates| candidates.first())
            .and_then(|c| c["content"]["parts"].as_array())
            .ok_or(BotError::EmptyResponse)?;

        let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if text.trim().is_empty() {
            return Err(BotError::EmptyResponse);
        }
        Ok(text)
    }

    pub fn extract_usage(response: &Value) -> Option<GeminiUsage> {
        let usage = response["usageMetadata"].as_object()?;
        Some(GeminiUsage {
            input_tokens: usage
                .get("promptTokenCount")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            output_tokens: usage
                .get("candidatesTokenCount")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        })
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "generateContent");

        let resp = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "generateContent failed");
            return Err(BotError::Api {
                status: status.as_u16(),
                message: truncate_chars(body.trim(), MAX_ERROR_CHARS),
            });
        }

        let body: Value = resp.json().await?;
        if let Some(usage) = Self::extract_usage(&body) {
            crate::metrics::record_tokens(&self.model, usage.input_tokens, usage.output_tokens);
        }
        Self::extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::time::Duration;

    fn client(base_url: &str) -> GeminiClient {
        client_with(base_url, DEFAULT_MODEL, "AIzaTest")
    }

    fn client_with(base_url: &str, model: &str, key: &str) -> GeminiClient {
        let settings = ModelSettings {
            model: model.to_string(),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            ..ModelSettings::default()
        };
        GeminiClient::new(SecretString::from(key.to_string()), &settings).unwrap()
    }

    /// Serve `app` on an ephemeral local port and return its base URL
    async fn serve_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Answers like generateContent, but only for the key "AIzaTest"
    async fn generate_content(headers: HeaderMap, Json(body): Json<Value>) -> Response {
        let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
        if key != Some("AIzaTest") {
            let error = json!({ "error": { "code": 401, "message": "API key not valid" } });
            return (StatusCode::UNAUTHORIZED, Json(error)).into_response();
        }

        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("");
        Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": format!("echo: {}", prompt) }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 7 }
        }))
        .into_response()
    }

    fn gemini_stub() -> Router {
        Router::new().route("/models/{*rest}", post(generate_content))
    }

    #[test]
    fn test_endpoint() {
        let c = client("https://example.test/v1beta/");
        assert_eq!(
            c.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(c.name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_request_body() {
        let body = GeminiClient::request_body("hello bear");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello bear");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "from the forest" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 5 }
        });
        assert_eq!(
            GeminiClient::extract_text(&response).unwrap(),
            "Hello from the forest"
        );
        assert_eq!(
            GeminiClient::extract_usage(&response),
            Some(GeminiUsage { input_tokens: 12, output_tokens: 5 })
        );
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        let err = GeminiClient::extract_text(&json!({ "promptFeedback": {} })).unwrap_err();
        assert!(matches!(err, BotError::EmptyResponse));

        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(GeminiClient::extract_text(&blank).is_err());
    }

    #[test]
    fn test_extract_usage_absent() {
        assert_eq!(GeminiClient::extract_usage(&json!({})), None);
    }

    #[tokio::test]
    async fn test_generate_against_local_backend() {
        let base = serve_stub(gemini_stub()).await;
        let c = client_with(&base, "stub-model", "AIzaTest");

        assert_eq!(c.generate("hello bear").await.unwrap(), "echo: hello bear");

        let prom = crate::metrics::prometheus();
        let counted = |direction: &str, value: &str| {
            prom.lines().any(|line| {
                line.starts_with("ecobear_tokens_total")
                    && line.contains(r#"model="stub-model""#)
                    && line.contains(&format!(r#"direction="{}""#, direction))
                    && line.ends_with(value)
            })
        };
        assert!(counted("input", " 12"), "{}", prom);
        assert!(counted("output", " 7"), "{}", prom);
    }

    #[tokio::test]
    async fn test_wrong_key_is_api_error() {
        let base = serve_stub(gemini_stub()).await;
        let c = client_with(&base, DEFAULT_MODEL, "not-the-key");

        match c.generate("hi").await {
            Err(BotError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("API key not valid"));
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_short_body() {
        let body = format!("backend down {}", "x".repeat(500));
        let app = Router::new().route(
            "/models/{*rest}",
            post(move || {
                let body = body.clone();
                async move { (StatusCode::SERVICE_UNAVAILABLE, body) }
            }),
        );
        let base = serve_stub(app).await;

        match client(&base).generate("hi").await {
            Err(BotError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert!(message.starts_with("backend down"));
                assert_eq!(message.chars().count(), MAX_ERROR_CHARS + 1);
                assert!(message.ends_with('…'));
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("森林森林", 2), "森林…");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        // Nothing listens on port 9 of localhost
        let c = client("http://127.0.0.1:9");
        let err = c.generate("hi").await.unwrap_err();
        assert!(matches!(err, BotError::Http(_)));
    }
}
