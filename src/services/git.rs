// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};
use crate::services::summarizer::StatSource;

/// Which side of the index a diff is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTarget {
    Staged,
    Unstaged,
}

pub struct GitService {
    repo: gix::Repository,
    work_dir: PathBuf,
}

impl GitService {
    pub fn discover() -> Result<Self> {
        Self::discover_at(".")
    }

    pub fn discover_at(path: impl AsRef<Path>) -> Result<Self> {
        let repo = gix::discover(path.as_ref()).map_err(|_| Error::NotAGitRepo)?;

        let work_dir = repo
            .workdir()
            .ok_or_else(|| Error::Git("Bare repository not supported".into()))?
            .to_path_buf();

        Ok(Self { repo, work_dir })
    }

    pub fn check_state(&self) -> Result<()> {
        if matches!(self.repo.state(), Some(gix::state::InProgress::Merge)) {
            return Err(Error::MergeInProgress);
        }
        Ok(())
    }

    /// Full unified diff of the requested side. Empty means no changes.
    pub fn diff(&self, target: DiffTarget) -> Result<String> {
        self.check_state()?;
        let diff = self.run_diff(target, &[])?;
        debug!(?target, bytes = diff.len(), "diff read");
        Ok(diff)
    }

    /// Bind this repository to one diff side as a [`StatSource`].
    pub fn stats(&self, target: DiffTarget) -> GitStats<'_> {
        GitStats { git: self, target }
    }

    fn run_diff(&self, target: DiffTarget, extra: &[&str]) -> Result<String> {
        // --no-ext-diff: don't use external diff tools
        let mut args = vec!["diff", "--no-ext-diff", "--no-color"];
        if target == DiffTarget::Staged {
            args.push("--cached");
        }
        args.extend_from_slice(extra);

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.work_dir)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        let output = Command::new("git")
            .args(["commit", "-m", message])
            .current_dir(&self.work_dir)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(stderr.trim().to_string()));
        }

        Ok(())
    }
}

pub struct GitStats<'a> {
    git: &'a GitService,
    target: DiffTarget,
}

impl StatSource for GitStats<'_> {
    fn stat_lines(&self) -> Result<Vec<String>> {
        // Wide enough that git never elides long paths with "..."
        let stat = self.git.run_diff(self.target, &["--stat=1000"])?;
        Ok(stat.lines().map(str::to_string).collect())
    }
}
