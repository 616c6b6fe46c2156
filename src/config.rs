// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::services::llm;

const CONFIG_FILE_NAME: &str = ".mintrc";

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum Provider {
    #[default]
    OpenAI,
    Anthropic,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Self::OpenAI, Self::Anthropic, Self::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                Error::Config(format!(
                    "invalid provider '{s}'. Valid options: {}",
                    Self::ALL.map(|p| p.as_str()).join(", ")
                ))
            })
    }
}

/// Persisted user preferences, read from `~/.mintrc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: Provider,

    /// Model override; `None` means the provider's default model
    #[serde(default)]
    pub model: Option<String>,

    /// Generation temperature (0.0-1.0, default 0.25)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Commit without the confirmation prompt
    #[serde(default)]
    pub auto_commit: bool,

    /// Number of options to ask the model for (1-10, default 5)
    #[serde(default = "default_num_options")]
    pub num_options: u8,

    /// Present candidates highest confidence first instead of model order
    #[serde(default)]
    pub sort_by_confidence: bool,

    /// Request timeout in seconds (default 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens the model may generate, reasoning included (default 4096)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Directory holding system_prompt.txt and human_prompt.txt overrides
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,

    #[serde(default)]
    pub openai_base_url: Option<String>,

    #[serde(default)]
    pub anthropic_base_url: Option<String>,

    #[serde(default)]
    pub google_base_url: Option<String>,
}

fn default_temperature() -> f32 {
    0.25
}
fn default_num_options() -> u8 {
    5
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_max_tokens() -> u32 {
    4096
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            temperature: default_temperature(),
            auto_commit: false,
            num_options: default_num_options(),
            sort_by_confidence: false,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            prompts_dir: None,
            openai_base_url: None,
            anthropic_base_url: None,
            google_base_url: None,
        }
    }
}

impl Settings {
    /// Load with priority: ENV (`MINT_*`) > `~/.mintrc` > defaults.
    ///
    /// Never fails: unreadable, malformed or out-of-range data falls back to
    /// the defaults.
    pub fn load() -> Self {
        Self::load_from(Self::config_path().as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> Self {
        Self::or_defaults(Self::extract(path, true))
    }

    /// The file alone, without environment overrides. Used before saving so
    /// that `MINT_*` values never leak into the file.
    pub fn load_file(path: Option<&Path>) -> Self {
        Self::or_defaults(Self::extract(path, false))
    }

    /// Like [`Settings::load_file`] but reports why a file is rejected.
    pub fn check_file(path: &Path) -> Result<Self> {
        Self::extract(Some(path), false)
    }

    fn or_defaults(result: Result<Self>) -> Self {
        result.unwrap_or_else(|e| {
            warn!(error = %e, "ignoring settings file, using defaults");
            Self::default()
        })
    }

    fn extract(path: Option<&Path>, with_env: bool) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(path) = path.filter(|p| p.exists()) {
            let content = fs::read_to_string(path)?;
            // A file holding only comments parses as null; treat it as absent
            let document: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
            if !document.is_null() {
                figment = figment.merge(Yaml::string(&content));
            }
            debug!(path = %path.display(), "settings file read");
        }

        if with_env {
            // MINT_PROVIDER, MINT_TEMPERATURE, ...
            figment = figment.merge(Env::prefixed("MINT_"));
        }

        let mut settings: Settings = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    pub fn config_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILE_NAME))
    }

    /// The configured model, or the provider's default when none is set.
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| llm::default_model(self.provider).to_string())
    }

    pub fn base_url(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAI => self.openai_base_url.as_deref(),
            Provider::Anthropic => self.anthropic_base_url.as_deref(),
            Provider::Google => self.google_base_url.as_deref(),
        }
    }

    fn normalize(&mut self) {
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            self.model = None;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_temperature(self.temperature)?;

        if !(1..=10).contains(&self.num_options) {
            return Err(Error::Config(format!(
                "num_options must be 1–10, got {}",
                self.num_options
            )));
        }

        if !(1..=3600).contains(&self.timeout_secs) {
            return Err(Error::Config(format!(
                "timeout_secs must be 1–3600, got {}",
                self.timeout_secs
            )));
        }

        if !(64..=32_000).contains(&self.max_tokens) {
            return Err(Error::Config(format!(
                "max_tokens must be 64–32000, got {}",
                self.max_tokens
            )));
        }

        for provider in Provider::ALL {
            if let Some(raw) = self.base_url(provider) {
                let parsed = url::Url::parse(raw).map_err(|e| {
                    Error::Config(format!("{provider}_base_url '{raw}' is not a URL: {e}"))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(Error::Config(format!(
                        "{provider}_base_url must start with http:// or https://, got '{raw}'"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Write the whole settings file, replacing any previous one.
    pub fn save(&self) -> Result<PathBuf> {
        let Some(path) = Self::config_path() else {
            return Err(Error::Config("Cannot determine home directory".into()));
        };
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        // Write to a sibling first, then rename over the target
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, self.to_document()?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&temp_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms)?;
        }

        fs::rename(&temp_path, path)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Create a settings file holding the defaults.
    pub fn create_default() -> Result<PathBuf> {
        Settings::default().save()
    }

    fn to_document(&self) -> Result<String> {
        Ok(format!(
            r#"# CommitMint Configuration
# This file configures default behavior for mint

# LLM Provider (openai, anthropic, google)
provider: {provider}

# Model name (leave null to use provider default)
model: {model}

# Temperature for generation (0.0 = deterministic, 1.0 = creative)
temperature: {temperature}

# Auto-commit without confirmation prompt
auto_commit: {auto_commit}

# Number of commit message options to generate (1-10)
num_options: {num_options}

# Show the most confident suggestion first
sort_by_confidence: {sort_by_confidence}

# Request timeout in seconds
timeout_secs: {timeout_secs}

# Maximum tokens the model may generate
max_tokens: {max_tokens}

# Directory with system_prompt.txt / human_prompt.txt overrides
prompts_dir: {prompts_dir}

# API base URL overrides (null = official endpoint)
openai_base_url: {openai_base_url}
anthropic_base_url: {anthropic_base_url}
google_base_url: {google_base_url}
"#,
            provider = self.provider,
            model = yaml_scalar(&self.model)?,
            temperature = yaml_scalar(&self.temperature)?,
            auto_commit = self.auto_commit,
            num_options = self.num_options,
            sort_by_confidence = self.sort_by_confidence,
            timeout_secs = self.timeout_secs,
            max_tokens = self.max_tokens,
            prompts_dir = yaml_scalar(&self.prompts_dir)?,
            openai_base_url = yaml_scalar(&self.openai_base_url)?,
            anthropic_base_url = yaml_scalar(&self.anthropic_base_url)?,
            google_base_url = yaml_scalar(&self.google_base_url)?,
        ))
    }
}

pub fn validate_temperature(temperature: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&temperature) {
        return Err(Error::Config(format!(
            "temperature must be 0.0–1.0, got {temperature}"
        )));
    }
    Ok(())
}

fn yaml_scalar<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .map_err(|e| Error::Config(e.to_string()))
}
