// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use tracing::{debug, warn};

use crate::domain::{DiffSummary, FileChangeStat};
use crate::error::Result;

/// Something that can produce `git diff --stat` lines on demand.
pub trait StatSource {
    fn stat_lines(&self) -> Result<Vec<String>>;
}

impl StatSource for Vec<String> {
    fn stat_lines(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}

impl StatSource for [&str] {
    fn stat_lines(&self) -> Result<Vec<String>> {
        Ok(self.iter().map(|s| s.to_string()).collect())
    }
}

pub struct DiffSummarizer;

impl DiffSummarizer {
    /// Build a summary of `raw_diff` from the stat lines `stats` provides.
    ///
    /// Best effort: an empty diff short-circuits without asking for stats,
    /// and a failing stat source yields an empty file list instead of an
    /// error.
    pub fn summarize(raw_diff: &str, stats: &(impl StatSource + ?Sized)) -> DiffSummary {
        if raw_diff.is_empty() {
            return DiffSummary::empty();
        }

        let lines = match stats.stat_lines() {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "diff stat unavailable, summarizing without file list");
                Vec::new()
            }
        };

        let files: Vec<FileChangeStat> = lines
            .iter()
            .filter_map(|line| Self::parse_stat_line(line))
            .collect();

        debug!(files = files.len(), "diff summarized");
        DiffSummary::from_files(files)
    }

    /// Parse `path | 12 +++++-----`. Lines without a separator yield `None`.
    ///
    /// Only whitespace-separated runs made purely of `+`/`-` count as
    /// markers, so the change count and binary lines (`Bin 0 -> 12 bytes`)
    /// contribute nothing.
    pub fn parse_stat_line(line: &str) -> Option<FileChangeStat> {
        let (path, markers) = line.split_once('|')?;
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        let (additions, deletions) = markers
            .split_whitespace()
            .filter(|token| token.chars().all(|c| c == '+' || c == '-'))
            .flat_map(str::chars)
            .fold((0, 0), |(add, del), c| match c {
                '+' => (add + 1, del),
                _ => (add, del + 1),
            });

        Some(FileChangeStat::new(path.to_string(), additions, deletions))
    }
}
