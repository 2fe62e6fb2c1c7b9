use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use tracing::debug;

use super::CompletionSettings;
use crate::state::ChatMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize, Debug, PartialEq)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize, Debug)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send the whole conversation, prefixed by the system prompt, and return
    /// the first choice's text.
    pub async fn chat(&self, settings: &CompletionSettings, history: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = build_request(settings, history);
        debug!(model = %request.model, messages = request.messages.len(), "sending chat completion");

        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error {}: {}", status, text));
        }

        let openai_response: OpenAIResponse = response.json().await?;
        openai_response.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("OpenAI response contained no message content"))
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gpt-4o-mini".to_string(),
            "gpt-4o".to_string(),
            "gpt-4-turbo".to_string(),
            "gpt-3.5-turbo".to_string(),
        ]
    }
}

fn build_request(settings: &CompletionSettings, history: &[ChatMessage]) -> OpenAIRequest {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(OpenAIMessage {
        role: "system".to_string(),
        content: settings.system_prompt.clone(),
    });
    messages.extend(history.iter().map(|msg| OpenAIMessage {
        role: msg.role.as_str().to_string(),
        content: msg.content.clone(),
    }));

    OpenAIRequest {
        model: settings.model.clone(),
        messages,
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response and hand back the raw request.
    async fn serve_once(status: &str, body: &str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    /// Client that never routes through a proxy picked up from the environment.
    fn local_client(base_url: &str) -> OpenAIClient {
        OpenAIClient {
            client: Client::builder().no_proxy().build().unwrap(),
            api_key: "sk-test".to_string(),
            base_url: base_url.to_string(),
        }
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    #[test]
    fn test_request_puts_system_prompt_first() {
        let settings = CompletionSettings::default();
        let history = vec![
            ChatMessage::user("this is bad"),
            ChatMessage::assistant("This presents an opportunity for improvement."),
            ChatMessage::user("we're late"),
        ];

        let request = build_request(&settings, &history);
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 500);
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, settings.system_prompt);
        assert_eq!(request.messages[3], OpenAIMessage {
            role: "user".to_string(),
            content: "we're late".to_string(),
        });
    }

    #[test]
    fn test_request_json_shape() {
        let request = build_request(&CompletionSettings::default(), &[ChatMessage::user("hi")]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"- Align\n- Synergize"}}]}"#;
        let (base_url, server) = serve_once("200 OK", body).await;

        let client = local_client(&base_url);
        let reply = client
            .chat(&CompletionSettings::default(), &[ChatMessage::user("work together")])
            .await
            .unwrap();
        assert_eq!(reply, "- Align\n- Synergize");

        let raw_request = server.await.unwrap();
        assert!(raw_request.starts_with("POST /chat/completions"));
        assert!(raw_request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(raw_request.contains(r#""content":"work together""#));
    }

    #[tokio::test]
    async fn test_chat_error_status() {
        let (base_url, server) = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#).await;

        let client = local_client(&base_url);
        let err = client
            .chat(&CompletionSettings::default(), &[ChatMessage::user("hello")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_chat_without_choices_is_error() {
        let (base_url, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;

        let client = local_client(&base_url);
        let result = client
            .chat(&CompletionSettings::default(), &[ChatMessage::user("hello")])
            .await;
        assert!(result.is_err());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = local_client(&format!("http://{}", addr));
        let result = client
            .chat(&CompletionSettings::default(), &[ChatMessage::user("hello")])
            .await;
        assert_eq!(super::super::reply_or_fallback(result), super::super::FALLBACK_REPLY);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAIClient::with_base_url("k", "http://localhost:8080/v1/");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
