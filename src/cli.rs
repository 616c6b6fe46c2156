// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;

use crate::config::Provider;

#[derive(Parser, Debug)]
#[command(name = "mint")]
#[command(version)]
#[command(
    about = "CommitMint - the freshest AI-powered git commit message generator",
    long_about = None
)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Suggest commit messages for the current changes
    Generate(GenerateArgs),
    /// List available LLM providers and their API key status
    Providers,
    /// Create a .env file for API keys in the current directory
    Setup,
    /// Show or change the settings in ~/.mintrc
    Config(ConfigArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct GenerateArgs {
    /// Use unstaged changes instead of staged
    #[arg(short, long)]
    pub unstaged: bool,

    /// Commit the selected message without the confirmation prompt
    #[arg(short, long)]
    pub commit: bool,

    /// LLM provider to use
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (uses provider default if not specified)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Generation temperature (0.0 - 1.0)
    #[arg(short, long = "temp", value_parser = parse_temperature)]
    pub temperature: Option<f32>,

    /// Show the most confident suggestion first
    #[arg(long)]
    pub sort: bool,

    /// Show the prompt sent to the LLM
    #[arg(long)]
    pub show_prompt: bool,

    /// Print the suggestions only, don't commit
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct ConfigArgs {
    /// Create a default config file
    #[arg(long)]
    pub init: bool,

    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Open config file in editor
    #[arg(long)]
    pub edit: bool,

    /// Set default provider
    #[arg(long, value_enum, value_name = "PROVIDER")]
    pub set_provider: Option<Provider>,

    /// Set default model
    #[arg(long, value_name = "MODEL")]
    pub set_model: Option<String>,

    /// Go back to the provider's default model
    #[arg(long, conflicts_with = "set_model")]
    pub unset_model: bool,

    /// Set default temperature
    #[arg(long = "set-temp", value_name = "TEMP", value_parser = parse_temperature)]
    pub set_temperature: Option<f32>,

    /// Set number of options to generate
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=10))]
    pub set_options: Option<u8>,

    /// Set whether to commit without confirmation
    #[arg(long, value_name = "BOOL")]
    pub set_auto_commit: Option<bool>,
}

impl ConfigArgs {
    pub fn has_updates(&self) -> bool {
        self.set_provider.is_some()
            || self.set_model.is_some()
            || self.unset_model
            || self.set_temperature.is_some()
            || self.set_options.is_some()
            || self.set_auto_commit.is_some()
    }
}

fn parse_temperature(s: &str) -> std::result::Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("temperature must be between 0.0 and 1.0, got {value}"));
    }
    Ok(value)
}
