use crate::domain::error::DomainError;
use crate::domain::ports::commentary::CommentaryProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenAiCommentary {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiCommentary {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
        }
    }
}

#[async_trait::async_trait]
impl CommentaryProvider for OpenAiCommentary {
    fn name(&self) -> &str {
        "openai"
    }

    async fn assist(
        &self,
        prompt: &str,
        vars: &serde_json::Value,
    ) -> Result<String, DomainError> {
        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: self.model.clone(),
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: prompt.to_string(),
                    },
                    ChatMessage {
                        role: "user",
                        content: vars.to_string(),
                    },
                ],
                temperature: 0.3,
            })
            .send()
            .await
            .map_err(|e| DomainError::Transient(format!("OpenAI request failed: {e}")))?;

        let status = resp.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(DomainError::Transient(format!("OpenAI returned {status}")));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::CommentaryUnavailable(format!(
                "OpenAI {status}: {body}"
            )));
        }

        let result: ChatResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::CommentaryUnavailable(format!("Parse error: {e}")))?;
        result
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| DomainError::CommentaryUnavailable("Empty completion".into()))
    }
}
