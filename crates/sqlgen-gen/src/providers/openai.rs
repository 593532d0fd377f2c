//! OpenAI chat completions oracle
//!
//! Sends the conversation to the chat completions endpoint and returns the
//! first choice. Structured replies use the `json_schema` response format.

use crate::config::SqlGenConfig;
use crate::oracle::{GenerationOracle, Message, OracleStatus, ResponseFormat};
use sqlgen_core::{Result, SqlGenError};
use std::time::Duration;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Oracle backed by an OpenAI-compatible chat completions API
pub struct OpenAiOracle {
    api_key: String,
    api_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiOracle {
    /// Create a new OpenAiOracle from config
    pub fn from_config(config: &SqlGenConfig) -> Result<Self> {
        let api_key = config
            .api_key("openai")
            .ok_or_else(|| {
                SqlGenError::Oracle(
                    "OpenAI API key not configured. Set SQLGEN_OPENAI_API_KEY or add to .sqlgen/config.toml".to_string(),
                )
            })?
            .to_string();

        Ok(Self {
            api_key,
            api_url: config
                .api_url("openai")
                .unwrap_or(DEFAULT_OPENAI_URL)
                .to_string(),
            model: config.model("openai").unwrap_or(DEFAULT_MODEL).to_string(),
            temperature: config.generation.temperature,
        })
    }

    fn payload(&self, conversation: &[Message], format: &ResponseFormat) -> serde_json::Value {
        build_payload(&self.model, self.temperature, conversation, format)
    }

    fn post_json_with_retry(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .post(&self.api_url)
                .header("Authorization", &format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .send_json(payload);

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        SqlGenError::Oracle(format!("Failed to parse OpenAI response: {}", e))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        tracing::warn!(attempt = attempt + 1, error = %e, "OpenAI request failed, retrying");
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(SqlGenError::Oracle(format!(
                        "OpenAI API request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(SqlGenError::Oracle(
            "OpenAI API request failed after retries".to_string(),
        ))
    }
}

/// Build the chat completions request body
pub fn build_payload(
    model: &str,
    temperature: Option<f32>,
    conversation: &[Message],
    format: &ResponseFormat,
) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "model": model,
        "messages": conversation,
    });

    if let Some(t) = temperature {
        payload["temperature"] = serde_json::json!(t);
    }

    if let ResponseFormat::Json { name, schema } = format {
        payload["response_format"] = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": name,
                "schema": schema,
                "strict": true
            }
        });
    }

    payload
}

/// Extract the reply text from a chat completions response
pub fn parse_completion(response: &serde_json::Value) -> Result<String> {
    let choice = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| {
            SqlGenError::Oracle(format!(
                "Unexpected OpenAI response format: {}",
                serde_json::to_string_pretty(response).unwrap_or_default()
            ))
        })?;

    let message = choice.get("message");
    if let Some(refusal) = message
        .and_then(|m| m.get("refusal"))
        .and_then(|r| r.as_str())
    {
        return Err(SqlGenError::Oracle(format!("OpenAI refused: {}", refusal)));
    }

    message
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| SqlGenError::Oracle("No message content in OpenAI response".to_string()))
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

impl GenerationOracle for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    fn health_check(&self) -> Result<OracleStatus> {
        if self.api_key.is_empty() {
            return Ok(OracleStatus::NoApiKey);
        }
        Ok(OracleStatus::Available)
    }

    fn complete(&self, conversation: &[Message], format: &ResponseFormat) -> Result<String> {
        let payload = self.payload(conversation, format);
        tracing::debug!(
            model = %self.model,
            messages = conversation.len(),
            "sending chat completion request"
        );
        let response = self.post_json_with_retry(&payload)?;
        parse_completion(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion() {
        let json = serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"request\": \"x\"}", "refusal": null},
                    "finish_reason": "stop"
                }
            ]
        });
        assert_eq!(parse_completion(&json).unwrap(), "{\"request\": \"x\"}");
    }

    #[test]
    fn test_parse_completion_invalid() {
        assert!(parse_completion(&serde_json::json!({"error": "bad"})).is_err());
        let refused = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null, "refusal": "no"}}]
        });
        assert!(parse_completion(&refused).is_err());
    }

    #[test]
    fn test_payload_with_schema() {
        let format = ResponseFormat::Json {
            name: "exercise".to_string(),
            schema: serde_json::json!({"type": "object"}),
        };
        let payload = build_payload(
            "gpt-test",
            Some(0.2),
            &[Message::system("s"), Message::user("u")],
            &format,
        );
        assert_eq!(payload["model"], "gpt-test");
        assert_eq!(payload["messages"][1]["role"], "user");
        assert_eq!(payload["response_format"]["type"], "json_schema");
        assert_eq!(payload["response_format"]["json_schema"]["name"], "exercise");
        assert!(payload["temperature"].is_number());
    }

    #[test]
    fn test_text_payload_has_no_response_format() {
        let payload = build_payload("m", None, &[Message::user("u")], &ResponseFormat::Text);
        assert!(payload.get("response_format").is_none());
        assert!(payload.get("temperature").is_none());
    }

    #[test]
    fn test_missing_api_key() {
        assert!(OpenAiOracle::from_config(&SqlGenConfig::default()).is_err());
    }
}
