//! Groq chat-completions backend.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::GenerateError;
use crate::llm::CompletionApi;

const COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "llama-3.1-8b-instant";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// OpenAI-compatible completion client for Groq.
pub struct GroqCompletions {
    client: reqwest::Client,
}

impl GroqCompletions {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GroqCompletions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Request body for one completion. High temperature and repetition
/// penalties keep short replies from converging on the same phrasing;
/// max_tokens keeps them chat-sized.
fn completion_payload(system: &str, user: &str) -> serde_json::Value {
    serde_json::json!({
        "model": MODEL,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user },
        ],
        "temperature": 1.05,
        "top_p": 0.95,
        "presence_penalty": 0.6,
        "frequency_penalty": 0.4,
        "max_tokens": 40,
    })
}

#[async_trait]
impl CompletionApi for GroqCompletions {
    async fn complete(
        &self,
        key: &SecretString,
        system: &str,
        user: &str,
    ) -> Result<String, GenerateError> {
        let response = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(key.expose_secret())
            .json(&completion_payload(system, user))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| GenerateError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerateError::Status(response.status().as_u16()));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerateError::InvalidResponse("no choices returned".to_string()))
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_pins_model_and_sampling() {
        let payload = completion_payload("be brief", "hello");
        assert_eq!(payload["model"], MODEL);
        assert_eq!(payload["max_tokens"], 40);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][0]["content"], "be brief");
        assert_eq!(payload["messages"][1]["role"], "user");
        assert_eq!(payload["messages"][1]["content"], "hello");
    }

    #[test]
    fn parses_completion_response() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hey"}, "finish_reason": "stop"}
            ],
            "usage": {"total_tokens": 12}
        }"#;
        let body: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.choices[0].message.content, "hey");
    }
}
