// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use super::CommitType;

/// Upper bound on the number of candidates a set may hold.
pub const MAX_CANDIDATES: usize = 5;

/// Longest subject line accepted from the model, in characters.
pub const MAX_SUBJECT_CHARS: usize = 100;

/// A single model-generated commit message suggestion.
///
/// Only the response parser builds these, after every field has been
/// validated.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitCandidate {
    commit_type: CommitType,
    scope: Option<String>,
    subject: String,
    body: Option<String>,
    confidence: f64,
}

impl CommitCandidate {
    pub(crate) fn new(
        commit_type: CommitType,
        scope: Option<String>,
        subject: String,
        body: Option<String>,
        confidence: f64,
    ) -> Self {
        Self {
            commit_type,
            scope,
            subject,
            body,
            confidence,
        }
    }

    pub fn commit_type(&self) -> CommitType {
        self.commit_type
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Render as a conventional commit message.
    ///
    /// `type(scope): subject`, or `type: subject` without a scope. With
    /// `include_body` and a body present, a blank line and the body follow.
    pub fn format(&self, include_body: bool) -> String {
        let mut message = match &self.scope {
            Some(scope) => format!("{}({}): {}", self.commit_type, scope, self.subject),
            None => format!("{}: {}", self.commit_type, self.subject),
        };

        if include_body && let Some(body) = &self.body {
            message.push_str("\n\n");
            message.push_str(body);
        }

        message
    }
}

/// Ordered, non-empty list of at most [`MAX_CANDIDATES`] suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<CommitCandidate>,
}

impl CandidateSet {
    /// Returns `None` for an empty list; truncates anything past the bound.
    pub(crate) fn new(mut candidates: Vec<CommitCandidate>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        candidates.truncate(MAX_CANDIDATES);
        Some(Self { candidates })
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommitCandidate> {
        self.candidates.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CommitCandidate> {
        self.candidates.get(index)
    }

    pub fn first(&self) -> &CommitCandidate {
        &self.candidates[0]
    }

    /// Stable sort, highest confidence first. Ties keep the model's order.
    pub fn sorted_by_confidence(mut self) -> Self {
        self.candidates
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        self
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a CommitCandidate;
    type IntoIter = std::slice::Iter<'a, CommitCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
