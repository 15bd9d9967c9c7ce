use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::AiConfig;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;
const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const CLAUDE_API_VERSION: &str = "2023-06-01";
const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("suppstack/0.1")
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

/// One outbound text-completion vendor. The schedule and conflict paths never
/// depend on these calls succeeding; callers fall back to canned text.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Whether the vendor has enough configuration (API key) to be called.
    fn configured(&self) -> bool;
    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

pub struct ClaudeProvider {
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl ClaudeProvider {
    pub fn new(api_key: Option<String>, model: &str, timeout_secs: u64) -> Self {
        let model = if model.trim().is_empty() {
            DEFAULT_CLAUDE_MODEL.to_string()
        } else {
            model.to_string()
        };
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("ANTHROPIC_API_KEY is not set"))?;

        let mut body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": temperature,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(system) = system {
            body["system"] = Value::String(system.to_string());
        }

        let response = HTTP_CLIENT
            .post(CLAUDE_API_URL)
            .timeout(self.timeout)
            .header("x-api-key", api_key)
            .header("anthropic-version", CLAUDE_API_VERSION)
            .json(&body)
            .send()
            .await
            .context("failed POST to Claude messages API")?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .context("invalid JSON from Claude messages API")?;
        if !status.is_success() {
            return Err(anyhow!("Claude API returned {status}: {payload}"));
        }

        payload["content"][0]["text"]
            .as_str()
            .map(|text| text.to_string())
            .ok_or_else(|| anyhow!("Claude reply carries no text content"))
    }
}

pub struct DeepSeekProvider {
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl DeepSeekProvider {
    pub fn new(api_key: Option<String>, base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let model = if model.trim().is_empty() {
            DEFAULT_DEEPSEEK_MODEL.to_string()
        } else {
            model.to_string()
        };
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }
}

#[async_trait]
impl AiProvider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some() && !self.base_url.is_empty()
    }

    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("DEEPSEEK_API_KEY is not set"))?;

        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));
        let body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = HTTP_CLIENT
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed POST to {url}"))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .with_context(|| format!("invalid JSON from {url}"))?;
        if !status.is_success() {
            return Err(anyhow!("DeepSeek API returned {status}: {payload}"));
        }

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|text| text.to_string())
            .ok_or_else(|| anyhow!("DeepSeek reply carries no message content"))
    }
}

/// Build the configured vendor. API keys come from the environment
/// (`ANTHROPIC_API_KEY` / `DEEPSEEK_API_KEY`), never from config files.
pub fn provider_from_config(config: &AiConfig) -> Box<dyn AiProvider> {
    match config.provider.trim().to_ascii_lowercase().as_str() {
        "deepseek" => Box::new(DeepSeekProvider::new(
            std::env::var("DEEPSEEK_API_KEY").ok(),
            &config.base_url,
            &config.model,
            config.timeout_secs,
        )),
        _ => Box::new(ClaudeProvider::new(
            std::env::var("ANTHROPIC_API_KEY").ok(),
            &config.model,
            config.timeout_secs,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_report_configuration_state() {
        let unconfigured = ClaudeProvider::new(None, "", 10);
        assert!(!unconfigured.configured());
        let configured = ClaudeProvider::new(Some("key".to_string()), "", 10);
        assert!(configured.configured());

        let blank_key = DeepSeekProvider::new(Some("  ".to_string()), "https://api.deepseek.com", "", 10);
        assert!(!blank_key.configured());
        let ready = DeepSeekProvider::new(Some("key".to_string()), "https://api.deepseek.com/", "", 10);
        assert!(ready.configured());
    }
}
