// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{ClientOptions, LlmProvider, PromptPair, StreamDelta};
use crate::error::Result;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const CREDENTIAL_VAR: &str = "GOOGLE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GoogleProvider {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            client: options.http_client(),
            base_url: options.base_url_or(DEFAULT_BASE_URL),
            // Accept both "gemini-2.5-flash" and "models/gemini-2.5-flash"
            model: options.model.trim_start_matches("models/").to_string(),
            api_key: options.api_key,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }

    fn parse_chunk(data: &str) -> StreamDelta {
        let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
            return StreamDelta::default();
        };

        let mut delta = StreamDelta::default();
        for candidate in chunk.candidates {
            let texts = candidate
                .content
                .into_iter()
                .flat_map(|c| c.parts)
                .filter_map(|p| p.text);
            for text in texts {
                delta.text.get_or_insert_with(String::new).push_str(&text);
            }
            delta.done |= candidate.finish_reason.is_some();
        }
        delta
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    async fn complete(
        &self,
        prompt: &PromptPair,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );

        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GenerateRequest {
                system_instruction: Content {
                    role: None,
                    parts: vec![Part {
                        text: &prompt.system,
                    }],
                },
                contents: vec![Content {
                    role: Some("user"),
                    parts: vec![Part {
                        text: &prompt.human,
                    }],
                }],
                generation_config: GenerationConfig {
                    temperature: self.temperature,
                    max_output_tokens: self.max_tokens,
                },
            });

        let response = super::send(self.name(), request, &cancel).await?;
        super::read_sse(self.name(), response, &token_tx, &cancel, Self::parse_chunk).await
    }

    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
