// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{ClientOptions, LlmProvider, PromptPair, StreamDelta};
use crate::error::Result;

pub const DEFAULT_MODEL: &str = "gpt-5";
pub const CREDENTIAL_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Reasoning model families only accept the default temperature.
const FIXED_TEMPERATURE_PREFIXES: &[&str] = &["gpt-5", "o1", "o3", "o4"];

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_completion_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            client: options.http_client(),
            base_url: options.base_url_or(DEFAULT_BASE_URL),
            model: options.model,
            api_key: options.api_key,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }

    fn request_temperature(&self) -> Option<f32> {
        let fixed = FIXED_TEMPERATURE_PREFIXES
            .iter()
            .any(|prefix| self.model.starts_with(prefix));
        (!fixed).then_some(self.temperature)
    }

    fn parse_chunk(data: &str) -> StreamDelta {
        let Ok(chunk) = serde_json::from_str::<ChatChunk>(data) else {
            return StreamDelta::default();
        };

        let mut delta = StreamDelta::default();
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                delta.text.get_or_insert_with(String::new).push_str(&content);
            }
            delta.done |= choice.finish_reason.is_some();
        }
        delta
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        prompt: &PromptPair,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    Message {
                        role: "system",
                        content: &prompt.system,
                    },
                    Message {
                        role: "user",
                        content: &prompt.human,
                    },
                ],
                temperature: self.request_temperature(),
                max_completion_tokens: self.max_tokens,
                stream: true,
            });

        let response = super::send(self.name(), request, &cancel).await?;
        super::read_sse(self.name(), response, &token_tx, &cancel, Self::parse_chunk).await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
