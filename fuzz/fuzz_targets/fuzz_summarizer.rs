// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

#![no_main]

use commitmint::services::summarizer::DiffSummarizer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let summary = DiffSummarizer::summarize(text, &lines);

        let additions: usize = summary.files().iter().map(|f| f.additions()).sum();
        let deletions: usize = summary.files().iter().map(|f| f.deletions()).sum();
        assert_eq!(summary.total_additions(), additions);
        assert_eq!(summary.total_deletions(), deletions);
    }
});
