// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("No staged changes found")]
    #[diagnostic(
        code(commitmint::git::no_staged),
        help("Stage files with: git add <files>, or pass --unstaged")
    )]
    NoStagedChanges,

    #[error("No unstaged changes found")]
    #[diagnostic(code(commitmint::git::no_unstaged))]
    NoUnstagedChanges,

    #[error("Not a git repository")]
    #[diagnostic(
        code(commitmint::git::not_repo),
        help("Run this command inside a git repository")
    )]
    NotAGitRepo,

    #[error("Merge in progress")]
    #[diagnostic(
        code(commitmint::git::merge),
        help("Complete or abort the merge: git merge --abort")
    )]
    MergeInProgress,

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("{var} is not set")]
    #[diagnostic(
        code(commitmint::provider::credential_missing),
        help("Add {var}=your-api-key-here to .env or your shell environment (provider: {provider})")
    )]
    CredentialMissing { provider: String, var: String },

    #[error("Prompt template '{name}' not found at {}", path.display())]
    #[diagnostic(
        code(commitmint::template::not_found),
        help("Check the prompts_dir setting or reinstall mint")
    )]
    TemplateNotFound { name: String, path: PathBuf },

    #[error("Prompt template '{template}' uses unknown placeholder '{{{placeholder}}}'")]
    #[diagnostic(code(commitmint::template::render))]
    TemplateRender { template: String, placeholder: String },

    #[error("Provider '{provider}' error: {message}")]
    #[diagnostic(code(commitmint::provider::error))]
    Provider { provider: String, message: String },

    #[error("Model response rejected: {0}")]
    #[diagnostic(
        code(commitmint::generation::parse),
        help("Try again, or lower the temperature with --temp")
    )]
    Parse(#[from] ParseError),

    #[error("Commit message generation failed: {0}")]
    #[diagnostic(code(commitmint::generation::failed))]
    Generation(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(commitmint::config::error))]
    Config(String),

    #[error("Git error: {0}")]
    #[diagnostic(code(commitmint::git::error))]
    Git(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

impl Error {
    /// True for every way a generation request can end without a usable
    /// candidate set.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Parse(_) | Self::Generation(_)
        )
    }
}

/// Reasons a model response fails the candidate schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    #[error("response has no \"options\" array")]
    MissingOptions,

    #[error("response contains no options")]
    Empty,

    #[error("option {index}: field '{field}' {problem}")]
    Field {
        index: usize,
        field: &'static str,
        problem: String,
    },

    #[error("option {index}: unknown type '{value}'")]
    UnknownType { index: usize, value: String },

    #[error("option {index}: confidence {value} is outside 0.0-1.0")]
    Confidence { index: usize, value: f64 },

    #[error("option {index}: subject is {len} characters, limit is {max}")]
    SubjectTooLong { index: usize, len: usize, max: usize },
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Dialog(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
