//! LLM API client for rewrite generation
//!
//! Sync HTTP via ureq — no async runtime needed. Supports OpenAI-compatible
//! endpoints (including self-hosted proxies via a base-URL override) and the
//! Anthropic messages API. BYOK: keys come from environment variables.

use super::{GenError, GenResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackend {
    #[default]
    OpenAi,
    Anthropic,
}

impl LlmBackend {
    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::OpenAi => "gpt-4o-mini",
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub model: Option<String>,
    /// Override for OpenAI-compatible proxies (chat-completions URL).
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Fixed sampling seed for OpenAI-compatible backends; keeps generation
    /// deterministic for fixed inputs where the provider honors it.
    pub seed: Option<u64>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            base_url: None,
            max_tokens: 300,
            temperature: 0.2,
            seed: Some(42),
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    fn api_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_api_url())
    }
}

/// Unified rewrite-model client.
pub struct LlmClient {
    config: LlmConfig,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl LlmClient {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            config,
            api_key: api_key.into(),
            agent: make_agent(timeout),
        }
    }

    pub fn from_env(config: LlmConfig) -> GenResult<Self> {
        let env_key = config.backend.env_key();
        let api_key = env::var(env_key).map_err(|_| GenError::MissingApiKey {
            env_var: env_key.to_string(),
        })?;
        Ok(Self::new(config, api_key))
    }

    pub fn backend(&self) -> LlmBackend {
        self.config.backend
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    /// Send a single user prompt and return the model's text reply.
    pub fn complete(&self, prompt: &str) -> GenResult<String> {
        match self.config.backend {
            LlmBackend::OpenAi => self.complete_openai(prompt),
            LlmBackend::Anthropic => self.complete_anthropic(prompt),
        }
    }

    fn complete_openai(&self, prompt: &str) -> GenResult<String> {
        let body = OpenAiRequest {
            model: self.config.model().to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            seed: self.config.seed,
        };

        let response = self
            .agent
            .post(self.config.api_url())
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| GenError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(GenError::Api { status, message });
        }

        let resp: OpenAiResponse = response
            .into_body()
            .read_json()
            .map_err(|e| GenError::Parse(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenError::Parse("no response choices".to_string()))
    }

    fn complete_anthropic(&self, prompt: &str) -> GenResult<String> {
        let body = AnthropicRequest {
            model: self.config.model().to_string(),
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: Some(self.config.temperature),
        };

        let response = self
            .agent
            .post(self.config.api_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .send_json(&body)
            .map_err(|e| GenError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(GenError::Api { status, message });
        }

        let resp: AnthropicResponse = response
            .into_body()
            .read_json()
            .map_err(|e| GenError::Parse(e.to_string()))?;

        resp.content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text)
            .ok_or_else(|| GenError::Parse("no text content in response".to_string()))
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        assert_eq!(LlmBackend::OpenAi.default_model(), "gpt-4o-mini");
        assert_eq!(LlmBackend::OpenAi.env_key(), "OPENAI_API_KEY");
    }

    #[test]
    fn test_config_model_override() {
        let config = LlmConfig::default();
        assert_eq!(config.model(), "gpt-4o-mini");

        let config = LlmConfig {
            model: Some("custom-model".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), "custom-model");
    }

    #[test]
    fn test_base_url_override() {
        let config = LlmConfig {
            base_url: Some("https://proxy.example/v1/chat/completions".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://proxy.example/v1/chat/completions");
    }
}
