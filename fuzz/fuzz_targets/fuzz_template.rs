// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use commitmint::services::generator::{MAX_DIFF_CHARS, truncate_diff};
use commitmint::services::templates;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = templates::render("fuzz", text, &[("diff_content", text.to_string())]);

        let truncated = truncate_diff(text);
        assert!(truncated.chars().count() <= MAX_DIFF_CHARS + 16);
    }
});
