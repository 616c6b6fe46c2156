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

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const CREDENTIAL_VAR: &str = "ANTHROPIC_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<ContentDelta>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ContentDelta {
    text: Option<String>,
}

impl AnthropicProvider {
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

    fn parse_event(data: &str) -> StreamDelta {
        let Ok(event) = serde_json::from_str::<StreamEvent>(data) else {
            return StreamDelta::default();
        };

        match event.event_type.as_str() {
            "content_block_delta" => StreamDelta {
                text: event.delta.and_then(|d| d.text),
                ..StreamDelta::default()
            },
            "message_stop" => StreamDelta {
                done: true,
                ..StreamDelta::default()
            },
            // overloaded_error, rate_limit_error, ...
            "error" => StreamDelta {
                error: Some(match event.error {
                    Some(e) => format!("{}: {}", e.error_type, e.message),
                    None => "stream reported an error".into(),
                }),
                ..StreamDelta::default()
            },
            _ => StreamDelta::default(),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(
        &self,
        prompt: &PromptPair,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String> {
        let url = format!("{}/messages", self.base_url);

        let request = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest {
                model: &self.model,
                system: &prompt.system,
                messages: vec![Message {
                    role: "user",
                    content: &prompt.human,
                }],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                stream: true,
            });

        let response = super::send(self.name(), request, &cancel).await?;
        super::read_sse(self.name(), response, &token_tx, &cancel, Self::parse_event).await
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
