//! OpenAI chat completions client.

use super::GradingProvider;
use crate::config::{DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL};
use crate::error::ProviderError;
use crate::http::{create_client_with_timeout, COMPLETION_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Grader backed by the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiGrader {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiGrader {
    pub fn new(api_key: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(COMPLETION_TIMEOUT)?,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Override the API base, e.g. "https://api.openai.com/v1".
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl GradingProvider for OpenAiGrader {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(format!("Invalid completion response: {}", e)))?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse("Completion response contained no choices".to_string())
        })?;

        choice.message.content.ok_or_else(|| {
            ProviderError::MalformedResponse("Completion choice has no message content".to_string())
        })
    }
}

/// Build an error from a non-success response, preferring the API's own message.
fn api_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .map(|msg| format!("Error code: {} - {}", status, msg))
        .unwrap_or_else(|| format!("Error code: {} - {}", status, body.trim()));

    ProviderError::Api { status, message }
}
