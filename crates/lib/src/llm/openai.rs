//! OpenAI chat completions client (api.openai.com by default).
//!
//! One-shot, non-streaming: a single user message with fixed model and
//! sampling parameters. `generate_reply` never fails; failures turn into
//! fixed fallback texts so the caller always has something to send.

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 300;

/// Sent when the API answered but the completion text came back empty.
pub const EMPTY_REPLY_FALLBACK: &str = "Perdón, no entendí. Te paso con un humano.";

/// Sent when the request itself failed (transport error or non-success status).
pub const ERROR_REPLY_FALLBACK: &str =
    "Perdón, hubo un error procesando tu pregunta. Te aviso en breve.";

#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("openai request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("openai api error: {0}")]
    Api(String),
}

/// Client for the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// POST /v1/chat/completions — single user message, fixed model and sampling.
    pub async fn chat(&self, prompt: &str) -> Result<ChatResponse, OpenAiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OpenAiError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        Ok(data)
    }

    /// Reply text for a prompt. Always returns a non-empty string: the trimmed
    /// first completion on success, a fallback otherwise.
    pub async fn generate_reply(&self, prompt: &str) -> String {
        match self.chat(prompt).await {
            Ok(res) => {
                let text = res.content().trim();
                if text.is_empty() {
                    log::warn!("openai returned an empty completion");
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                log::error!("openai error: {}", e);
                ERROR_REPLY_FALLBACK.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Text content of the first choice, if any.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_empty_without_choices() {
        let res: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).expect("parse");
        assert_eq!(res.content(), "");
    }

    #[test]
    fn content_reads_first_choice() {
        let res: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "¡Hola!"}}]}"#,
        )
        .expect("parse");
        assert_eq!(res.content(), "¡Hola!");
    }
}
