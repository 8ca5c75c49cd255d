use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::error::{Result, AppError};
use crate::feedback::Analysis;

const SYSTEM_PROMPT: &str = "You are a helpful assistant analyzing patient feedback. \
Give each of the following a score from 1 (very bad) to 10 (excellent): doctor, nurse, hospital. \
If not mentioned and not indirectly referenced, set its value to \"N/A\" (string, not number). \
Explain why you gave those scores in a 'Notes Analysis'. \
Respond ONLY in JSON format like this:\n\
{ \"doctor\": <number or 'N/A'>, \"nurse\": <number or 'N/A'>, \"hospital\": <number or 'N/A'>, \"notes\": \"...\" }";

/// Scores a feedback message for doctor, nurse and hospital.
#[async_trait]
pub trait FeedbackAnalyzer: Send + Sync {
    async fn analyze(&self, message: &str) -> Result<Analysis>;
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<Message<'a>>,
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
    content: Option<String>,
}

/// Chat-completions client for the OpenAI API (or any compatible endpoint).
pub struct OpenAiAnalyzer {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiAnalyzer {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn complete(&self, message: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: 0.0,
            messages: vec![
                Message { role: "system", content: SYSTEM_PROMPT },
                Message { role: "user", content: message },
            ],
        };

        let res = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(AppError::Analysis(format!(
                "model API returned {}: {}",
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let json: ChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::Analysis(format!("Invalid response format from LLM: {}", e)))?;

        json.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Analysis("Invalid response format from LLM".to_string()))
    }
}

#[async_trait]
impl FeedbackAnalyzer for OpenAiAnalyzer {
    async fn analyze(&self, message: &str) -> Result<Analysis> {
        let reply = self.complete(message).await?;
        debug!(reply_len = reply.len(), "model reply received");
        parse_analysis(&reply)
    }
}

/// Parses the model's reply into an [`Analysis`], rejecting any shape mismatch.
pub fn parse_analysis(reply: &str) -> Result<Analysis> {
    let text = strip_code_fence(reply.trim());
    serde_json::from_str(text)
        .map_err(|e| AppError::Analysis(format!("unexpected analysis shape: {}", e)))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text;
    };
    // Drop the info string, e.g. ```json
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}
