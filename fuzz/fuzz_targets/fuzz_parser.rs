// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

#![no_main]

use commitmint::domain::MAX_CANDIDATES;
use commitmint::services::parser::ResponseParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data)
        && let Ok(set) = ResponseParser::parse(raw)
    {
        assert!((1..=MAX_CANDIDATES).contains(&set.len()));
        for candidate in &set {
            assert!((0.0..=1.0).contains(&candidate.confidence()));
        }
    }
});
