// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub mod anthropic;
pub mod google;
pub mod openai;

use crate::config::{Provider, Settings};
use crate::error::{Error, Result};

/// Rendered system and human prompts for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub human: String,
}

/// A model client bound to one provider, model and temperature.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Submit the prompts and return the raw text reply.
    ///
    /// Text deltas are forwarded on `token_tx` as they arrive. No retries.
    async fn complete(
        &self,
        prompt: &PromptPair,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String>;

    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

/// Everything a backend needs to talk to its API.
#[derive(Debug)]
pub struct ClientOptions {
    pub model: String,
    pub temperature: f32,
    pub api_key: SecretString,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl ClientOptions {
    fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_default()
    }
}

// ─── Registry ───

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescription {
    pub name: &'static str,
    pub default_model: &'static str,
    pub credential_var: &'static str,
    pub requires_credential: bool,
}

pub fn default_model(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => openai::DEFAULT_MODEL,
        Provider::Anthropic => anthropic::DEFAULT_MODEL,
        Provider::Google => google::DEFAULT_MODEL,
    }
}

pub fn credential_var(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => openai::CREDENTIAL_VAR,
        Provider::Anthropic => anthropic::CREDENTIAL_VAR,
        Provider::Google => google::CREDENTIAL_VAR,
    }
}

/// Reads the process environment on every call.
pub fn has_credential(provider: Provider) -> bool {
    credential(provider).is_some()
}

fn credential(provider: Provider) -> Option<SecretString> {
    std::env::var(credential_var(provider))
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

pub fn describe(provider: Provider) -> ProviderDescription {
    ProviderDescription {
        name: provider.as_str(),
        default_model: default_model(provider),
        credential_var: credential_var(provider),
        requires_credential: true,
    }
}

/// Source of model clients for the generation pipeline.
pub trait ClientFactory {
    /// `model: None` selects the provider's default model.
    fn build(
        &self,
        provider: Provider,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<Box<dyn LlmProvider>>;
}

/// Builds real HTTP clients, reading credentials from the environment.
pub struct Registry {
    settings: Settings,
}

impl Registry {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

impl ClientFactory for Registry {
    fn build(
        &self,
        provider: Provider,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<Box<dyn LlmProvider>> {
        let api_key = credential(provider).ok_or_else(|| Error::CredentialMissing {
            provider: provider.to_string(),
            var: credential_var(provider).to_string(),
        })?;

        let options = ClientOptions {
            model: model.unwrap_or(default_model(provider)).to_string(),
            temperature,
            api_key,
            base_url: self.settings.base_url(provider).map(str::to_string),
            timeout: Duration::from_secs(self.settings.timeout_secs),
            max_tokens: self.settings.max_tokens,
        };

        debug!(%provider, model = %options.model, temperature, "building model client");

        Ok(match provider {
            Provider::OpenAI => Box::new(openai::OpenAiProvider::new(options)),
            Provider::Anthropic => Box::new(anthropic::AnthropicProvider::new(options)),
            Provider::Google => Box::new(google::GoogleProvider::new(options)),
        })
    }
}

// ─── Shared transport ───

/// One parsed server-sent event payload.
#[derive(Debug, Default)]
pub(crate) struct StreamDelta {
    pub text: Option<String>,
    pub done: bool,
    /// Failure reported inside a stream that started with 2xx
    pub error: Option<String>,
}

pub(crate) fn request_error(provider: &str, e: reqwest::Error) -> Error {
    Error::Provider {
        provider: provider.into(),
        message: if e.is_timeout() {
            "request timed out".into()
        } else {
            e.to_string()
        },
    }
}

/// Send a request, racing it against cancellation.
pub(crate) async fn send(
    provider: &str,
    request: reqwest::RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Response> {
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        response = request.send() => response.map_err(|e| request_error(provider, e))?,
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Provider {
            provider: provider.into(),
            message: format!("HTTP {status}: {body}"),
        });
    }

    Ok(response)
}

/// Drain an SSE body, handing each `data:` payload to `on_data`.
///
/// Chunks from `bytes_stream()` are not aligned to newlines or to UTF-8
/// character boundaries, so bytes are buffered and only complete lines are
/// decoded.
pub(crate) async fn read_sse<F>(
    provider: &str,
    response: Response,
    token_tx: &mpsc::Sender<String>,
    cancel: &CancellationToken,
    mut on_data: F,
) -> Result<String>
where
    F: FnMut(&str) -> StreamDelta,
{
    let mut stream = response.bytes_stream();
    let mut full_response = String::new();
    let mut line_buffer: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::Cancelled);
            }
            chunk = stream.next() => {
                let Some(chunk) = chunk else { break };
                let chunk = chunk.map_err(|e| request_error(provider, e))?;

                line_buffer.extend_from_slice(&chunk);

                while let Some(newline_pos) = line_buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = line_buffer.drain(..=newline_pos).collect();
                    let done =
                        handle_line(provider, &line, token_tx, &mut on_data, &mut full_response)
                            .await?;
                    if done {
                        return Ok(full_response.trim().to_string());
                    }
                }
            }
        }
    }

    // Final line without a trailing newline
    if !line_buffer.is_empty() {
        handle_line(provider, &line_buffer, token_tx, &mut on_data, &mut full_response).await?;
    }

    Ok(full_response.trim().to_string())
}

/// Process one complete SSE line. Returns `true` once the stream is done.
async fn handle_line<F>(
    provider: &str,
    line: &[u8],
    token_tx: &mpsc::Sender<String>,
    on_data: &mut F,
    full_response: &mut String,
) -> Result<bool>
where
    F: FnMut(&str) -> StreamDelta,
{
    let line = String::from_utf8_lossy(line);
    let line = line.trim();

    // "event:" lines and keep-alives carry no payload
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(false);
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return Ok(false);
    }

    let delta = on_data(data);
    if let Some(message) = delta.error {
        return Err(Error::Provider {
            provider: provider.into(),
            message,
        });
    }
    if let Some(text) = delta.text {
        let _ = token_tx.send(text.clone()).await;
        full_response.push_str(&text);
    }
    Ok(delta.done)
}
