//! Ollama `/api/generate` over HTTP.

use super::{Transport, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Non-streaming generation against a running Ollama server.
pub struct OllamaHttpTransport {
    http: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaHttpTransport {
    /// Create a transport for `model` served at `base_url`.
    pub fn new(base_url: String, model: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent("lawease/generate")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(%error, "Falling back to default reqwest client");
                Client::new()
            });
        Self {
            http,
            base_url,
            model,
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Transport for OllamaHttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
        let payload = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                TransportError::Unreachable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|error| {
            TransportError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn transport(server: &MockServer) -> OllamaHttpTransport {
        OllamaHttpTransport::new(
            server.base_url(),
            "qwen2.5:1.5b".into(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn sends_non_streaming_request_and_returns_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate").json_body(json!({
                    "model": "qwen2.5:1.5b",
                    "prompt": "What is bail?",
                    "stream": false
                }));
                then.status(200).json_body(json!({
                    "response": "Bail is conditional release.",
                    "done": true
                }));
            })
            .await;

        let text = transport(&server)
            .generate("What is bail?")
            .await
            .expect("generation");

        mock.assert();
        assert_eq!(text, "Bail is conditional release.");
    }

    #[tokio::test]
    async fn error_status_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("model not loaded");
            })
            .await;

        let error = transport(&server)
            .generate("prompt")
            .await
            .expect_err("error status");

        assert!(
            matches!(&error, TransportError::Rejected(message) if message.contains("500")),
            "unexpected error: {error}"
        );
    }

    #[tokio::test]
    async fn missing_response_field_reads_as_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({ "done": true }));
            })
            .await;

        let text = transport(&server).generate("prompt").await.expect("ok");
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        let transport = OllamaHttpTransport::new(
            "http://127.0.0.1:9".into(),
            "qwen2.5:1.5b".into(),
            Duration::from_secs(2),
        );
        let error = transport.generate("prompt").await.expect_err("unreachable");
        assert!(matches!(error, TransportError::Unreachable(_)));
    }
}
