//! Outbound chat-completion calls.
//!
//! The rest of the crate only sees [`CompletionClient::complete`]; the
//! OpenAI-compatible wire format stays in this module.

use crate::error::{InferenceError, InferenceResult};
use crate::models::settings::InferenceSettings;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use zeroize::Zeroizing;

/// What the user sends alongside the system prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    Text(String),
    TextWithImage { text: String, image_data_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub content: UserContent,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Narrow capability over a hosted model: prompt in, free-form text out.
pub trait CompletionClient {
    fn complete(&self, request: &CompletionRequest) -> InferenceResult<String>;
}

/// Blocking client for `/v1/chat/completions`-style endpoints.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: Zeroizing<String>,
}

impl OpenAiClient {
    pub fn new(settings: &InferenceSettings, api_key: &str) -> InferenceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Transport(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: Zeroizing::new(api_key.to_string()),
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> InferenceResult<String> {
        tracing::debug!(model = %request.model, endpoint = %self.endpoint, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.as_str())
            .json(&ChatRequest::from(request))
            .send()
            .map_err(|err| InferenceError::Transport(format!("request failed: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "failed to read error body".to_string());
            tracing::warn!(status = status.as_u16(), "completion request rejected");
            return Err(map_http_error(status, &body));
        }

        let payload: Value = response
            .json()
            .map_err(|err| InferenceError::Transport(format!("invalid response body: {}", err)))?;
        extract_content(&payload).ok_or(InferenceError::EmptyResponse)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

impl<'a> From<&'a CompletionRequest> for ChatRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        let user = match &request.content {
            UserContent::Text(text) => MessageContent::Text(text),
            UserContent::TextWithImage {
                text,
                image_data_url,
            } => MessageContent::Parts(vec![
                ContentPart::Text { text },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_data_url,
                    },
                },
            ]),
        };
        Self {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(&request.system_prompt),
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn extract_content(payload: &Value) -> Option<String> {
    let content = payload
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

fn map_http_error(status: StatusCode, body: &str) -> InferenceError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => InferenceError::Quota(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InferenceError::Auth(message),
        _ => InferenceError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn text_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".into(),
            system_prompt: "You detect phishing.".into(),
            content: UserContent::Text("Your account is locked".into()),
            max_tokens: 200,
            temperature: 0.5,
        }
    }

    /// Serve one canned HTTP response and hand back the request body.
    fn serve_once(status_line: &'static str, body: String) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
            String::from_utf8(request_body).unwrap()
        });
        (endpoint, handle)
    }

    fn settings_for(endpoint: String) -> InferenceSettings {
        InferenceSettings {
            endpoint,
            timeout_secs: 5,
            ..InferenceSettings::default()
        }
    }

    #[test]
    fn test_text_request_shape() {
        let request = text_request();
        let body = serde_json::to_value(ChatRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "You detect phishing."},
                    {"role": "user", "content": "Your account is locked"}
                ],
                "max_tokens": 200,
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn test_image_request_uses_content_parts() {
        let request = CompletionRequest {
            content: UserContent::TextWithImage {
                text: "Check this screenshot".into(),
                image_data_url: "data:image/png;base64,AAAA".into(),
            },
            ..text_request()
        };
        let body = serde_json::to_value(ChatRequest::from(&request)).unwrap();
        let parts = &body["messages"][1]["content"];
        assert_eq!(parts[0], json!({"type": "text", "text": "Check this screenshot"}));
        assert_eq!(
            parts[1],
            json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}})
        );
    }

    #[test]
    fn test_extract_content_trims() {
        let payload = json!({"choices": [{"message": {"content": "  Probability: 80%\n"}}]});
        assert_eq!(extract_content(&payload).as_deref(), Some("Probability: 80%"));
        assert!(extract_content(&json!({"choices": []})).is_none());
        assert!(extract_content(&json!({"choices": [{"message": {"content": "  "}}]})).is_none());
    }

    #[test]
    fn test_http_error_mapping() {
        let body = r#"{"error": {"message": "You exceeded your current quota"}}"#;
        match map_http_error(StatusCode::TOO_MANY_REQUESTS, body) {
            InferenceError::Quota(msg) => assert_eq!(msg, "You exceeded your current quota"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            map_http_error(StatusCode::UNAUTHORIZED, "nope"),
            InferenceError::Auth(_)
        ));
        assert!(matches!(
            map_http_error(StatusCode::BAD_GATEWAY, "upstream"),
            InferenceError::Api { status: 502, .. }
        ));
    }

    #[test]
    fn test_complete_against_local_endpoint() {
        let reply = json!({"choices": [{"message": {"role": "assistant", "content": "Probability: 90%\nExplanation: urgent link"}}]});
        let (endpoint, server) = serve_once("200 OK", reply.to_string());

        let client = OpenAiClient::new(&settings_for(endpoint), "sk-test-123").unwrap();
        let text = client.complete(&text_request()).unwrap();
        assert!(text.starts_with("Probability: 90%"));

        let sent: Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(sent["model"], "gpt-4o-mini");
        assert_eq!(sent["messages"][1]["content"], "Your account is locked");
    }

    #[test]
    fn test_complete_maps_quota_error() {
        let reply = json!({"error": {"message": "quota"}});
        let (endpoint, server) = serve_once("429 Too Many Requests", reply.to_string());

        let client = OpenAiClient::new(&settings_for(endpoint), "sk-test-123").unwrap();
        let err = client.complete(&text_request()).unwrap_err();
        assert!(matches!(err, InferenceError::Quota(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        drop(listener);

        let client = OpenAiClient::new(&settings_for(endpoint), "sk-test-123").unwrap();
        let err = client.complete(&text_request()).unwrap_err();
        assert!(matches!(err, InferenceError::Transport(_)));
    }
}
