use crate::config::ClientConfig;
use crate::error::ExtractError;
use crate::retry::{CallError, RetryPolicy};
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str =
    "You are a financial data extraction expert. Always return valid JSON only.";

/// Thin wrapper over one chat-completion endpoint. Owns the retry policy;
/// `complete` returns either one full response body or a transport error.
#[derive(Clone)]
pub struct CompletionClient {
    config: ClientConfig,
    retry: RetryPolicy,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl CompletionClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            retry: RetryPolicy::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send the prompt, retrying per policy. Rate limiting and transport
    /// failures are retried; a success returns the raw message text exactly
    /// as the service produced it (fence stripping happens downstream).
    pub async fn complete(&self, prompt: &str) -> Result<String, ExtractError> {
        self.retry
            .run("chat completion", || self.send_once(prompt))
            .await
    }

    async fn send_once(&self, prompt: &str) -> Result<String, CallError> {
        let request = ChatRequest {
            model: self.config.provider.model(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: self
                .config
                .provider
                .supports_json_mode()
                .then_some(ResponseFormat {
                    format: "json_object",
                }),
        };

        let response = self
            .client
            .post(self.config.provider.endpoint())
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CallError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallError::Status { status, body });
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CallError::NoChoices)
    }
}
