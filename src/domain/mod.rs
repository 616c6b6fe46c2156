// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

mod candidate;
mod commit;
mod diff;

pub use candidate::*;
pub use commit::*;
pub use diff::*;
