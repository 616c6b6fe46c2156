// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::fs;
use std::io::IsTerminal;
use std::time::Duration;

use console::style;
use dialoguer::{Confirm, Editor, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Commands, ConfigArgs, GenerateArgs};
use crate::config::{Provider, Settings};
use crate::domain::{CandidateSet, CommitCandidate, DiffSummary};
use crate::error::{Error, Result};
use crate::services::{
    generator::{Generator, Overrides, ResolvedModel},
    git::{DiffTarget, GitService},
    llm::{self, Registry},
    summarizer::DiffSummarizer,
    templates::TemplateStore,
};

const ENV_FILE: &str = ".env";

pub struct App {
    cli: Cli,
    settings: Settings,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let settings = Settings::load();
        debug!(
            provider = %settings.provider,
            model = %settings.effective_model(),
            temperature = settings.temperature,
            num_options = settings.num_options,
            "settings loaded"
        );
        Self {
            cli,
            settings,
            cancel_token: CancellationToken::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        match &self.cli.command {
            Some(Commands::Generate(args)) => self.generate(args).await,
            Some(Commands::Providers) => {
                Self::list_providers();
                Ok(())
            }
            Some(Commands::Setup) => Self::setup(),
            Some(Commands::Config(args)) => self.configure(args),
            Some(Commands::Completions { shell }) => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(*shell, &mut cmd, "mint", &mut std::io::stdout());
                Ok(())
            }
            None => {
                <Cli as clap::CommandFactory>::command().print_help()?;
                Ok(())
            }
        }
    }

    // ─── Generate ───

    async fn generate(&self, args: &GenerateArgs) -> Result<()> {
        let overrides = Overrides {
            provider: args.provider,
            model: args.model.clone(),
            temperature: args.temperature,
        };
        let resolved = ResolvedModel::resolve(&self.settings, &overrides)?;

        // Fail before touching git when the key is missing
        if !llm::has_credential(resolved.provider) {
            let var = llm::credential_var(resolved.provider);
            self.print_warning(&format!("Set your API key in {ENV_FILE} or the environment:"));
            eprintln!("  {var}=your-api-key-here");
            return Err(Error::CredentialMissing {
                provider: resolved.provider.to_string(),
                var: var.to_string(),
            });
        }

        let target = if args.unstaged {
            DiffTarget::Unstaged
        } else {
            DiffTarget::Staged
        };

        self.print_status(match target {
            DiffTarget::Staged => "Reading staged changes...",
            DiffTarget::Unstaged => "Reading unstaged changes...",
        });

        let git = GitService::discover()?;
        let diff = git.diff(target)?;
        if diff.trim().is_empty() {
            return Err(match target {
                DiffTarget::Staged => Error::NoStagedChanges,
                DiffTarget::Unstaged => Error::NoUnstagedChanges,
            });
        }

        let summary = DiffSummarizer::summarize(&diff, &git.stats(target));
        self.print_info(&format!(
            "{} (+{} -{})",
            summary.description(),
            summary.total_additions(),
            summary.total_deletions()
        ));

        let generator = Generator::new(
            &self.settings,
            TemplateStore::from_settings(&self.settings),
            Registry::new(&self.settings),
        );

        if args.show_prompt {
            let prompt = generator.render_prompts(&diff, &summary)?;
            eprintln!("{}", style("--- SYSTEM PROMPT ---").dim());
            eprintln!("{}", prompt.system);
            eprintln!("{}", style("--- HUMAN PROMPT ---").dim());
            eprintln!("{}", prompt.human);
            eprintln!("{}", style("--- END PROMPT ---").dim());
        }

        if self.cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        self.print_status(&format!(
            "Using {} with model: {}",
            resolved.provider,
            resolved.model_name()
        ));

        let mut candidates = self
            .request_candidates(&generator, &diff, &summary, &overrides)
            .await?;

        if args.sort || self.settings.sort_by_confidence {
            candidates = candidates.sorted_by_confidence();
        }

        Self::print_candidates(&candidates);

        if args.dry_run {
            for candidate in &candidates {
                println!("{}\n", candidate.format(true));
            }
            return Ok(());
        }

        let auto_commit = args.commit || self.settings.auto_commit;
        let is_interactive = std::io::stdout().is_terminal() && std::io::stdin().is_terminal();

        if !is_interactive {
            let message = candidates.first().format(true);
            if auto_commit {
                git.commit(&message)?;
                eprintln!("{} Committed!", style("✓").green().bold());
            } else {
                self.print_warning("Not a terminal, printing the first suggestion.");
                println!("{message}");
            }
            return Ok(());
        }

        let chosen = Self::select_candidate(&candidates)?;
        let mut message = chosen.format(true);

        eprintln!("\n{}", style("Selected commit message:").bold());
        eprintln!("{}\n", style(&message).green());

        let edit = Confirm::new()
            .with_prompt("Edit the message?")
            .default(false)
            .interact()?;

        if edit && let Some(edited) = Editor::new().edit(&message)? {
            let edited = edited.trim();
            if edited.is_empty() {
                return Err(Error::Cancelled);
            }
            message = edited.to_string();
        }

        let commit = auto_commit
            || Confirm::new()
                .with_prompt("Create commit with this message?")
                .default(true)
                .interact()?;

        if commit {
            git.commit(&message)?;
            eprintln!("{} Committed!", style("✓").green().bold());
        } else {
            self.print_info("Not committed. Use the message with:");
            println!("git commit -m {}", shell_quote(&message));
        }

        Ok(())
    }

    /// Call the model behind a spinner that counts streamed characters.
    async fn request_candidates(
        &self,
        generator: &Generator<'_, Registry>,
        diff: &str,
        summary: &DiffSummary,
        overrides: &Overrides,
    ) -> Result<CandidateSet> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        spinner.set_message("Generating commit messages...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let (tx, mut rx) = mpsc::channel::<String>(64);
        let progress = spinner.clone();
        let cancel = self.cancel_token.clone();
        let drain = tokio::spawn(async move {
            let mut received = 0usize;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    token = rx.recv() => match token {
                        Some(t) => {
                            received += t.chars().count();
                            progress.set_message(format!(
                                "Generating commit messages... {received} chars"
                            ));
                        }
                        None => break,
                    }
                }
            }
        });

        let result = generator
            .generate(diff, summary, overrides, tx, self.cancel_token.clone())
            .await;

        let _ = drain.await;
        spinner.finish_and_clear();
        result
    }

    fn print_candidates(candidates: &CandidateSet) {
        eprintln!("\n{}", style("Suggested commit messages").bold().underlined());
        for (i, candidate) in candidates.iter().enumerate() {
            eprintln!(
                "  {} {} {}",
                style(format!("{}.", i + 1)).dim(),
                style(candidate.format(false)).green(),
                style(format!("({:.0}%)", candidate.confidence() * 100.0)).dim()
            );
        }
        eprintln!();
    }

    fn select_candidate(candidates: &CandidateSet) -> Result<&CommitCandidate> {
        let mut items: Vec<String> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{}] {}", i + 1, c.format(false)))
            .collect();
        items.push("Quit".into());

        let selection = Select::new()
            .with_prompt("Pick a commit message")
            .items(&items)
            .default(0)
            .interact_opt()?;

        selection
            .and_then(|i| candidates.get(i))
            .ok_or(Error::Cancelled)
    }

    // ─── Providers ───

    fn list_providers() {
        eprintln!("{}", style("Available providers").bold().underlined());
        for provider in Provider::ALL {
            let info = llm::describe(provider);
            let status = if llm::has_credential(provider) {
                style("set").green()
            } else {
                style("missing").red().bold()
            };
            println!(
                "  {:<10} {:<20} {:<18} {}",
                info.name, info.default_model, info.credential_var, status
            );
        }
    }

    // ─── Setup ───

    fn setup() -> Result<()> {
        let path = std::env::current_dir()?.join(ENV_FILE);

        if path.exists()
            && !Confirm::new()
                .with_prompt(format!("{ENV_FILE} already exists. Overwrite?"))
                .default(false)
                .interact()?
        {
            eprintln!("{}", style("Setup cancelled.").yellow());
            return Ok(());
        }

        fs::write(&path, env_scaffold())?;

        eprintln!("{} Created {ENV_FILE} file", style("✓").green().bold());
        eprintln!(
            "{} Uncomment the key for your provider and fill it in",
            style("→").cyan()
        );
        eprintln!("   {}", style(path.display()).dim());
        Ok(())
    }

    // ─── Config ───

    fn configure(&self, args: &ConfigArgs) -> Result<()> {
        let path = Settings::config_path()
            .ok_or_else(|| Error::Config("Cannot determine home directory".into()))?;

        if args.init {
            if path.exists()
                && !Confirm::new()
                    .with_prompt(format!("{} already exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()?
            {
                return Err(Error::Cancelled);
            }
            let path = Settings::create_default()?;
            eprintln!(
                "{} Created config: {}",
                style("✓").green().bold(),
                path.display()
            );
            return Ok(());
        }

        if args.edit {
            if !path.exists() {
                Settings::create_default()?;
            }
            let current = fs::read_to_string(&path)?;
            let Some(edited) = Editor::new().extension(".yaml").edit(&current)? else {
                self.print_info("Config unchanged.");
                return Ok(());
            };
            fs::write(&path, &edited)?;
            match Settings::check_file(&path) {
                Ok(_) => eprintln!("{} Config saved", style("✓").green().bold()),
                Err(e) => {
                    self.print_warning(&format!("{e}"));
                    self.print_warning("Defaults will be used until the file is fixed.");
                }
            }
            return Ok(());
        }

        if args.has_updates() {
            let mut settings = Settings::load_file(Some(&path));
            if let Some(provider) = args.set_provider {
                settings.provider = provider;
            }
            if let Some(model) = &args.set_model {
                settings.model = Some(model.clone());
            }
            if args.unset_model {
                settings.model = None;
            }
            if let Some(temperature) = args.set_temperature {
                settings.temperature = temperature;
            }
            if let Some(num_options) = args.set_options {
                settings.num_options = num_options;
            }
            if let Some(auto_commit) = args.set_auto_commit {
                settings.auto_commit = auto_commit;
            }
            settings.save_to(&path)?;
            eprintln!("{} Configuration updated", style("✓").green().bold());
            Self::show_settings(&settings);
            return Ok(());
        }

        if args.show {
            Self::show_settings(&self.settings);
            return Ok(());
        }

        eprintln!("Usage: mint config [--init|--show|--edit|--set-provider P|...]");
        eprintln!("Run {} for all options.", style("mint config --help").yellow());
        Ok(())
    }

    fn show_settings(settings: &Settings) {
        let unset = || "(unset)".to_string();
        println!("Provider:           {}", settings.provider);
        println!(
            "Model:              {}",
            settings
                .model
                .clone()
                .unwrap_or_else(|| format!("{} (default)", settings.effective_model()))
        );
        println!("Temperature:        {}", settings.temperature);
        println!("Auto commit:        {}", settings.auto_commit);
        println!("Options:            {}", settings.num_options);
        println!("Sort by confidence: {}", settings.sort_by_confidence);
        println!("Timeout:            {}s", settings.timeout_secs);
        println!("Max tokens:         {}", settings.max_tokens);
        println!(
            "Prompts dir:        {}",
            settings
                .prompts_dir
                .as_ref()
                .map_or_else(unset, |p| p.display().to_string())
        );
        for provider in Provider::ALL {
            if let Some(url) = settings.base_url(provider) {
                println!("{:<20}{url}", format!("{provider} URL:"));
            }
        }
    }

    fn print_status(&self, msg: &str) {
        eprintln!("{} {}", style("→").cyan(), msg);
    }

    fn print_info(&self, msg: &str) {
        eprintln!("{} {}", style("info:").cyan(), msg);
    }

    fn print_warning(&self, msg: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), msg);
    }
}

fn env_scaffold() -> String {
    let mut content = String::from(
        "# CommitMint API Keys\n# Uncomment and add the key for the provider you want to use\n",
    );
    for provider in Provider::ALL {
        let info = llm::describe(provider);
        content.push_str(&format!(
            "\n# {}\n# {}=your-{}-api-key-here\n",
            info.name, info.credential_var, info.name
        ));
    }
    content
}

fn shell_quote(message: &str) -> String {
    format!("'{}'", message.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_lists_every_credential_commented_out() {
        let scaffold = env_scaffold();
        for provider in Provider::ALL {
            let var = llm::credential_var(provider);
            assert!(scaffold.contains(&format!("# {var}=")), "{var} missing");
        }
        assert!(
            scaffold
                .lines()
                .all(|l| l.is_empty() || l.starts_with('#'))
        );
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("fix: don't panic"), r"'fix: don'\''t panic'");
    }
}
