use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const SYSTEM_PROMPT: &str = "You are the crafting engine of a word alchemy game. \
Given two words, answer with the single noun that combining them creates. \
Reply with that one lowercase word and nothing else.";

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("word generator is not configured")]
    NotConfigured,
    #[error("word generator request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("word generator returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("word generator returned no word")]
    EmptyResponse,
}

/// Invents the result of combining two words nobody has combined before.
#[async_trait]
pub trait WordGenerator: Send + Sync {
    /// Returns the raw answer; callers normalize it.
    async fn combine(&self, a: &str, b: &str) -> Result<String, GeneratorError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat-completions client (OpenAI compatible).
pub struct OpenAiWordGenerator {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl OpenAiWordGenerator {
    pub fn new(url: String, model: String, api_key: String) -> Result<Self, GeneratorError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            model,
            api_key,
        })
    }

    fn first_word(response: ChatResponse) -> Result<String, GeneratorError> {
        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GeneratorError::EmptyResponse)
    }
}

#[async_trait]
impl WordGenerator for OpenAiWordGenerator {
    async fn combine(&self, a: &str, b: &str) -> Result<String, GeneratorError> {
        if self.api_key.is_empty() {
            return Err(GeneratorError::NotConfigured);
        }

        let prompt = format!("{a} + {b}");
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 8,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeneratorError::Status(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let word = Self::first_word(body)?;
        tracing::debug!(a, b, word = %word, "Generated combination");
        Ok(word)
    }
}
