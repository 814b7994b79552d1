//! HTTP client for an OpenAI-compatible chat-completions API.

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use maitred_core::config::LlmConfig;
use maitred_core::types::ChatMessage;

use crate::error::LlmError;

/// Client for chat-completion calls, single-shot and streaming.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a client with an explicit key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build a client from config, reading the key from `OPENAI_API_KEY`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
        Ok(Self::new(api_key, config.model.clone()).with_api_base(config.api_base.clone()))
    }

    /// Override the API base URL (for compatible providers or test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// Single-shot completion: send the messages, return the reply text.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f64>,
    ) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: wire_messages(messages),
            temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Request(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.and_then(|m| m.content))
            .ok_or(LlmError::NoContent)
    }

    /// Streaming completion: returns a channel of reply fragments in
    /// arrival order. The channel closes when the upstream stream ends;
    /// a mid-stream failure is delivered as a final `Err` item.
    pub async fn stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String, LlmError>>, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: wire_messages(messages),
            temperature: None,
            stream: true,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(LlmError::Stream(e.to_string()))).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // SSE frames are newline-delimited `data: <json>` lines.
                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if data == "[DONE]" {
                        return;
                    }
                    if let Some(content) = parse_delta(data) {
                        if tx.send(Ok(content)).await.is_err() {
                            // Receiver gone: client disconnected.
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

/// Extract the delta text from one streamed chunk, ignoring frames that
/// carry none (role announcements, finish markers).
fn parse_delta(data: &str) -> Option<String> {
    let chunk: StreamChunk = serde_json::from_str(data).ok()?;
    let content = chunk.choices.into_iter().next()?.delta?.content?;
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

fn wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage<'_>> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.text,
        })
        .collect()
}

async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Request shaping ----

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = ChatClient::new("k", "gpt-4o-mini");
        assert_eq!(
            client.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );

        let client = client.with_api_base("http://localhost:9999/v1/");
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![
            ChatMessage::system("You are helpful."),
            ChatMessage::user("hello"),
        ];
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: wire_messages(&messages),
            temperature: Some(0.1),
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["temperature"], 0.1);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_temperature_omitted_when_none() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: vec![],
            temperature: None,
            stream: true,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("temperature"));
    }

    // ---- Delta parsing ----

    #[test]
    fn test_parse_delta_with_content() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_delta(data).unwrap(), "Hel");
    }

    #[test]
    fn test_parse_delta_role_only_frame() {
        let data = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert!(parse_delta(data).is_none());
    }

    #[test]
    fn test_parse_delta_finish_frame() {
        let data = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        assert!(parse_delta(data).is_none());
    }

    #[test]
    fn test_parse_delta_empty_content_skipped() {
        let data = r#"{"choices":[{"delta":{"content":""}}]}"#;
        assert!(parse_delta(data).is_none());
    }

    #[test]
    fn test_parse_delta_garbage() {
        assert!(parse_delta("not json").is_none());
    }

    // ---- Response parsing ----

    #[test]
    fn test_response_content_extraction() {
        let json = r#"{"choices":[{"message":{"content":"Ciao!"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.and_then(|m| m.content));
        assert_eq!(content.as_deref(), Some("Ciao!"));
    }

    #[test]
    fn test_error_body_parsing() {
        let json = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "Invalid API key");
    }
}
