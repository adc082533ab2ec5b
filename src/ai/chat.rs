use crate::error::{Result, TrendingError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Client for an OpenAI-compatible chat completion endpoint
pub struct ChatClient {
    api_key: String,
    endpoint: String,
    client: Client,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatClient {
    /// Create a new chat client for `base_url` (e.g. `https://api.deepseek.com/v1`)
    pub fn new(api_key: String, base_url: &str, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Send a single-turn prompt and return the reply text
    pub async fn complete(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TrendingError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TrendingError::summarizer(format!("malformed completion: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TrendingError::summarizer("No choices in completion response"))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client =
            ChatClient::new("sk-test".to_string(), "https://api.deepseek.com/v1/", "deepseek-chat".to_string())
                .unwrap();

        assert_eq!(client.endpoint, "https://api.deepseek.com/v1/chat/completions");
        assert_eq!(client.max_tokens, 500);
        assert_eq!(client.model, "deepseek-chat");
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "deepseek-chat",
                "max_tokens": 500,
                "messages": [{ "role": "user", "content": "hello" }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"- point"}}]}"#)
            .create_async()
            .await;

        let client =
            ChatClient::new("sk-test".to_string(), &server.url(), "deepseek-chat".to_string()).unwrap();
        let reply = client.complete("hello".to_string()).await.unwrap();

        assert_eq!(reply, "- point");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        let client =
            ChatClient::new("sk-bad".to_string(), &server.url(), "deepseek-chat".to_string()).unwrap();
        let err = client.complete("hello".to_string()).await.unwrap_err();

        assert!(matches!(err, TrendingError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"unexpected":true}"#)
            .create_async()
            .await;

        let client =
            ChatClient::new("sk-test".to_string(), &server.url(), "deepseek-chat".to_string()).unwrap();
        let err = client.complete("hello".to_string()).await.unwrap_err();

        assert!(matches!(err, TrendingError::Summarizer(_)));
    }
}
