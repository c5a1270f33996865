//! Optional English-rewrite front end (spec.md §4.6): POSTs source text to
//! an external chat-completion endpoint and parses its reply as rewritten,
//! canonical-form Vyra source. Entirely optional — the core pipeline never
//! calls into this module unless `--ai` is passed, and building without
//! the `ai` feature drops the dependency on `ureq`/`serde_json` entirely,
//! the way the teacher's `largo` binary gates its own registry/network
//! code behind a `cli` feature.

use std::env;
use std::time::Duration;

use serde_json::{json, Value as Json};

use crate::error::VyraError;

/// Configuration for the rewrite request, read from environment variables
/// per spec.md §6. `VYRA_AI_PROVIDER` only ever has one defined value
/// today (`openai_compatible`); it exists so a future provider can be
/// added without an incompatible env-var rename.
pub struct AiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub provider: String,
    pub timeout: Duration,
}

impl AiConfig {
    pub fn from_env() -> Result<Self, VyraError> {
        let endpoint = env::var("VYRA_AI_ENDPOINT")
            .map_err(|_| ai_error("VYRA_AI_ENDPOINT is not set"))?;
        let model = env::var("VYRA_AI_MODEL").map_err(|_| ai_error("VYRA_AI_MODEL is not set"))?;
        let api_key = env::var("VYRA_AI_API_KEY").ok();
        let provider = env::var("VYRA_AI_PROVIDER").unwrap_or_else(|_| "openai_compatible".to_string());
        let timeout_secs: u64 = env::var("VYRA_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        Ok(AiConfig { endpoint, model, api_key, provider, timeout: Duration::from_secs(timeout_secs) })
    }
}

const SYSTEM_PROMPT: &str = "Rewrite the given text into canonical Vyra sentences. \
Preserve meaning exactly. Reply with only the rewritten source, no commentary.";

/// Sends `source` to the configured endpoint and returns the rewritten
/// text. Any failure (missing configuration, network, auth, timeout, or
/// a malformed reply) is reported as `VyraError::AiRewrite` per spec.md
/// §4.6 — the caller halts before parsing rather than falling back to the
/// original text.
pub fn rewrite(source: &str) -> Result<String, VyraError> {
    let config = AiConfig::from_env()?;
    if config.provider != "openai_compatible" {
        return Err(ai_error(&format!("unsupported provider: {}", config.provider)));
    }

    let body = json!({
        "model": config.model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": source },
        ],
    });

    let mut request = ureq::post(&config.endpoint)
        .set("Content-Type", "application/json")
        .timeout(config.timeout);
    if let Some(key) = &config.api_key {
        request = request.set("Authorization", &format!("Bearer {}", key));
    }

    let response = request.send_json(body).map_err(|e| match e {
        ureq::Error::Status(code, response) => {
            let detail = response.into_string().unwrap_or_default();
            ai_error(&format!("endpoint returned {}: {}", code, detail))
        }
        e => ai_error(&format!("request failed: {}", e)),
    })?;

    let payload: Json = response.into_json().map_err(|e| ai_error(&format!("invalid JSON reply: {}", e)))?;
    extract_content(&payload)
}

fn extract_content(payload: &Json) -> Result<String, VyraError> {
    payload
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ai_error("reply had no choices[0].message.content"))
}

fn ai_error(message: &str) -> VyraError {
    VyraError::AiRewrite { message: message.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_content_from_a_well_formed_reply() {
        let payload = json!({
            "choices": [
                { "message": { "content": "Display 1." } }
            ]
        });
        assert_eq!(extract_content(&payload).unwrap(), "Display 1.");
    }

    #[test]
    fn missing_choices_is_an_ai_rewrite_error() {
        let payload = json!({});
        assert!(matches!(extract_content(&payload), Err(VyraError::AiRewrite { .. })));
    }
}
