// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use commitmint::config::Provider;
use commitmint::domain::CandidateSet;
use commitmint::error::Result;
use commitmint::services::llm::{ClientFactory, LlmProvider, PromptPair};
use commitmint::services::parser::ResponseParser;

/// One entry of the `options` array as a model would send it.
#[allow(dead_code)]
pub fn option(
    commit_type: &str,
    scope: Option<&str>,
    subject: &str,
    body: Option<&str>,
    confidence: f64,
) -> Value {
    json!({
        "type": commit_type,
        "scope": scope,
        "subject": subject,
        "body": body,
        "confidence": confidence,
    })
}

/// A full model reply wrapping the given options.
#[allow(dead_code)]
pub fn reply(options: &[Value]) -> String {
    json!({ "options": options }).to_string()
}

/// Build a validated set the same way the pipeline does.
#[allow(dead_code)]
pub fn candidate_set(options: &[Value]) -> CandidateSet {
    ResponseParser::parse(&reply(options)).expect("test reply should validate")
}

/// Model client returning a canned reply, streamed as a single token.
#[allow(dead_code)]
pub struct ScriptedProvider {
    pub reply: String,
    pub model: String,
    pub prompts: Arc<Mutex<Vec<PromptPair>>>,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        prompt: &PromptPair,
        token_tx: mpsc::Sender<String>,
        _cancel: CancellationToken,
    ) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let _ = token_tx.send(self.reply.clone()).await;
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// What a [`RecordingFactory`] was asked to build.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub provider: Provider,
    pub model: Option<String>,
    pub temperature: f32,
}

/// Factory handing out [`ScriptedProvider`]s and remembering every request.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingFactory {
    pub reply: String,
    pub builds: Arc<Mutex<Vec<BuildRequest>>>,
    pub prompts: Arc<Mutex<Vec<PromptPair>>>,
}

#[allow(dead_code)]
impl RecordingFactory {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Self::default()
        }
    }

    pub fn builds(&self) -> Vec<BuildRequest> {
        self.builds.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<PromptPair> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ClientFactory for RecordingFactory {
    fn build(
        &self,
        provider: Provider,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<Box<dyn LlmProvider>> {
        self.builds.lock().unwrap().push(BuildRequest {
            provider,
            model: model.map(str::to_string),
            temperature,
        });
        Ok(Box::new(ScriptedProvider {
            reply: self.reply.clone(),
            model: model.unwrap_or("default").to_string(),
            prompts: Arc::clone(&self.prompts),
        }))
    }
}

impl ClientFactory for &RecordingFactory {
    fn build(
        &self,
        provider: Provider,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<Box<dyn LlmProvider>> {
        (**self).build(provider, model, temperature)
    }
}
