// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::borrow::Cow;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{Provider, Settings, validate_temperature};
use crate::domain::{CandidateSet, DiffSummary, MAX_CANDIDATES};
use crate::error::{Error, Result};
use crate::services::llm::{self, ClientFactory, PromptPair};
use crate::services::parser::{self, ResponseParser};
use crate::services::templates::{self, TemplateName, TemplateStore};

/// Character budget for the diff embedded in the prompt.
pub const MAX_DIFF_CHARS: usize = 3_500;

/// Appended to a diff cut at [`MAX_DIFF_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n...(truncated)";

/// `{file_list}` value when the summary has no files.
pub const NO_FILES: &str = "No files parsed";

/// Per-invocation values that win over stored settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Provider, model and temperature a request will actually use.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub provider: Provider,
    /// `None` selects the provider's default model
    pub model: Option<String>,
    pub temperature: f32,
}

impl ResolvedModel {
    /// Explicit override, else stored setting, else built-in default.
    ///
    /// A stored model only applies while the stored provider is in effect;
    /// overriding the provider alone falls back to that provider's default.
    pub fn resolve(settings: &Settings, overrides: &Overrides) -> Result<Self> {
        let provider = overrides.provider.unwrap_or(settings.provider);

        let model = match &overrides.model {
            Some(model) => Some(model.clone()),
            None if provider == settings.provider => settings.model.clone(),
            None => None,
        }
        .filter(|m| !m.trim().is_empty());

        let temperature = overrides.temperature.unwrap_or(settings.temperature);
        validate_temperature(temperature)?;

        Ok(Self {
            provider,
            model,
            temperature,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| llm::default_model(self.provider))
    }
}

/// Keep the first [`MAX_DIFF_CHARS`] characters and mark the cut.
pub fn truncate_diff(diff: &str) -> Cow<'_, str> {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &diff[..cut])),
        None => Cow::Borrowed(diff),
    }
}

fn file_list(summary: &DiffSummary) -> String {
    if summary.files().is_empty() {
        return NO_FILES.to_string();
    }

    summary
        .files()
        .iter()
        .map(|f| format!("- {}: +{} -{}", f.path(), f.additions(), f.deletions()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns a diff into a [`CandidateSet`]: render prompts, call one model,
/// validate its answer.
pub struct Generator<'a, F> {
    settings: &'a Settings,
    templates: TemplateStore,
    factory: F,
}

impl<'a, F: ClientFactory> Generator<'a, F> {
    pub fn new(settings: &'a Settings, templates: TemplateStore, factory: F) -> Self {
        Self {
            settings,
            templates,
            factory,
        }
    }

    pub fn render_prompts(&self, raw_diff: &str, summary: &DiffSummary) -> Result<PromptPair> {
        let num_options = usize::from(self.settings.num_options).min(MAX_CANDIDATES);

        let vars = [
            ("format_instructions", parser::format_instructions()),
            ("num_options", num_options.to_string()),
            ("num_files", summary.files().len().to_string()),
            ("additions", summary.total_additions().to_string()),
            ("deletions", summary.total_deletions().to_string()),
            ("file_list", file_list(summary)),
            ("diff_content", truncate_diff(raw_diff).into_owned()),
        ];

        let system = self.templates.load(TemplateName::System)?;
        let human = self.templates.load(TemplateName::Human)?;

        Ok(PromptPair {
            system: templates::render(TemplateName::System.file_name(), &system, &vars)?,
            human: templates::render(TemplateName::Human.file_name(), &human, &vars)?,
        })
    }

    /// Run the whole pipeline once. Never returns an empty set.
    pub async fn generate(
        &self,
        raw_diff: &str,
        summary: &DiffSummary,
        overrides: &Overrides,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<CandidateSet> {
        let resolved = ResolvedModel::resolve(self.settings, overrides)?;
        let prompt = self.render_prompts(raw_diff, summary)?;
        debug!(
            system_chars = prompt.system.len(),
            human_chars = prompt.human.len(),
            "prompts rendered"
        );

        let client = self.factory.build(
            resolved.provider,
            resolved.model.as_deref(),
            resolved.temperature,
        )?;

        let raw = client.complete(&prompt, token_tx, cancel).await?;
        debug!(provider = client.name(), raw_len = raw.len(), "model replied");

        if raw.trim().is_empty() {
            return Err(Error::Generation(format!(
                "{} returned an empty response",
                client.name()
            )));
        }

        ResponseParser::parse(&raw).inspect_err(|e| {
            warn!(error = %e, "model response failed validation");
        })
    }
}
