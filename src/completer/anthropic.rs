use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completer, Completion, TokenUsage};
use crate::consts::DEFAULT_MODEL;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Environment variable the API key is read from.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const SYSTEM_PROMPT: &str = "You are a member of an investment research crew. \
Answer in plain prose, stay within your role, and say so when the source material \
does not contain the information you need.";

/// A completer that calls the Anthropic Messages API.
pub struct AnthropicCompleter {
    model: String,
    api_key: Option<String>,
    api_url: String,
    client: reqwest::Client,
}

impl AnthropicCompleter {
    pub fn new(model: Option<String>, api_key: Option<String>) -> Self {
        Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: api_key.filter(|k| !k.is_empty()),
            api_url: API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env(model: Option<String>) -> Self {
        Self::new(model, std::env::var(API_KEY_ENV).ok())
    }

    /// Point at a different messages endpoint (tests, proxies).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Completer for AnthropicCompleter {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no Anthropic credentials found. Set {API_KEY_ENV}."))?;

        let messages = [Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }];
        let body = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: &messages,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Anthropic API error ({}): {}", status, text);
        }

        let api_resp: ApiResponse = resp.json().await?;
        let text = collect_text(&api_resp.content);

        if text.is_empty() {
            bail!("Anthropic API returned empty response");
        }

        let usage = api_resp.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        });
        if let Some(u) = usage {
            debug!(input = u.input_tokens, output = u.output_tokens, "tokens");
        }

        Ok(Completion { text, usage })
    }
}

/// Join the text blocks of a response, skipping anything that isn't text.
fn collect_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| {
            if block.content_type == "text" {
                block.text.as_deref()
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}
