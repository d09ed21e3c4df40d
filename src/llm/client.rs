//! Async completion client for the planning oracle
//!
//! Speaks the OpenAI-compatible chat-completion format (OpenRouter, DeepSeek,
//! etc). One client is built per batch and reused for every trial; each
//! request is bounded by the configured timeout and never retried.

use crate::core::config::OracleConfig;
use crate::core::error::{PlannerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anything that can turn a system + user prompt pair into raw text
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send one completion request and return the raw reply text
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// HTTP oracle client
pub struct OracleClient {
    client: Client,
    api_key: String,
    config: OracleConfig,
}

impl OracleClient {
    /// Build a client from configuration
    ///
    /// Fails with [`PlannerError::MissingCredential`] when no API key is set.
    pub fn new(config: OracleConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(PlannerError::MissingCredential)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, system: &str, user: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
        }
    }
}

#[async_trait]
impl Oracle for OracleClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = self.build_request(system, user);

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlannerError::Oracle(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let completion: ChatResponse = response.json().await?;
        first_message_content(completion)
    }
}

/// `choices[0].message.content`; a null content reads as empty text
fn first_message_content(completion: ChatResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| PlannerError::Oracle("Empty response".into()))
}

// OpenAI-compatible chat-completion format
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config_with_key(key: Option<&str>) -> OracleConfig {
        OracleConfig {
            api_key: key.map(str::to_string),
            ..OracleConfig::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = OracleClient::new(config_with_key(Some("test-key"))).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.model(), crate::core::config::DEFAULT_MODEL);
    }

    #[test]
    fn test_missing_key() {
        let result = OracleClient::new(config_with_key(None));
        assert!(matches!(result, Err(PlannerError::MissingCredential)));

        let result = OracleClient::new(config_with_key(Some("  ")));
        assert!(matches!(result, Err(PlannerError::MissingCredential)));
    }

    #[test]
    fn test_request_body_shape() {
        let client = OracleClient::new(config_with_key(Some("k"))).unwrap();
        let body = serde_json::to_value(client.build_request("sys", "usr")).unwrap();

        assert_eq!(body["model"], "deepseek/deepseek-chat");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["max_tokens"], 2048);
        assert!(body.get("top_p").is_some());
        assert!(body.get("frequency_penalty").is_some());
        assert!(body.get("presence_penalty").is_some());
    }

    #[test]
    fn test_response_content_extraction() {
        let completion: ChatResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "[]"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_message_content(completion).unwrap(), "[]");

        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(first_message_content(null_content).unwrap(), "");

        let no_choices: ChatResponse = serde_json::from_str(r#"{"error": "x"}"#).unwrap();
        assert!(first_message_content(no_choices).is_err());
    }

    /// True once the headers and a `Content-Length` body have arrived
    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    /// Serve exactly one canned HTTP response; returns the endpoint URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/v1/chat/completions", addr)
    }

    fn client_for(api_url: String) -> OracleClient {
        OracleClient::new(OracleConfig {
            api_url,
            ..config_with_key(Some("test-key"))
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": "[{\"action\": \"stop\"}]"}}]}"#,
        )
        .await;

        let reply = client_for(url).complete("sys", "usr").await.unwrap();
        assert_eq!(reply, r#"[{"action": "stop"}]"#);
    }

    #[tokio::test]
    async fn test_error_status_carries_status_and_body() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error", "upstream exploded").await;

        match client_for(url).complete("sys", "usr").await {
            Err(PlannerError::Oracle(msg)) => {
                assert!(msg.contains("500"), "missing status in {:?}", msg);
                assert!(msg.contains("upstream exploded"), "missing body in {:?}", msg);
            }
            other => panic!("expected oracle error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_an_error() {
        let url = serve_once("HTTP/1.1 200 OK", "this is not json").await;

        let result = client_for(url).complete("sys", "usr").await;
        assert!(matches!(result, Err(PlannerError::Http(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client_for(format!("http://{}/v1/chat/completions", addr))
            .complete("sys", "usr")
            .await;
        assert!(matches!(result, Err(PlannerError::Http(_))));
    }
}
