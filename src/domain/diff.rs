// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

/// Description used when the diff is empty.
pub const NO_CHANGES: &str = "No changes were detected.";

/// One file from `git diff --stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeStat {
    path: String,
    additions: usize,
    deletions: usize,
    summary: String,
}

impl FileChangeStat {
    pub(crate) fn new(path: String, additions: usize, deletions: usize) -> Self {
        let summary = format!("{additions} additions, {deletions} deletions");
        Self {
            path,
            additions,
            deletions,
            summary,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn additions(&self) -> usize {
        self.additions
    }

    pub fn deletions(&self) -> usize {
        self.deletions
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// Approximate per-file picture of a diff, used only to brief the model.
///
/// Totals are always derived from `files`, never tracked separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    files: Vec<FileChangeStat>,
    total_additions: usize,
    total_deletions: usize,
    description: String,
}

impl DiffSummary {
    pub fn empty() -> Self {
        Self {
            files: Vec::new(),
            total_additions: 0,
            total_deletions: 0,
            description: NO_CHANGES.to_string(),
        }
    }

    pub(crate) fn from_files(files: Vec<FileChangeStat>) -> Self {
        let total_additions = files.iter().map(|f| f.additions).sum();
        let total_deletions = files.iter().map(|f| f.deletions).sum();
        let description = format!("{} files changed.", files.len());
        Self {
            files,
            total_additions,
            total_deletions,
            description,
        }
    }

    pub fn files(&self) -> &[FileChangeStat] {
        &self.files
    }

    pub fn total_additions(&self) -> usize {
        self.total_additions
    }

    pub fn total_deletions(&self) -> usize {
        self.total_deletions
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
