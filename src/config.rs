// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Ledger configuration.

/// Tunable business limits, injected into [`Ledger::new`](crate::Ledger::new).
///
/// Amounts are currency minor units.
#[derive(Debug, Clone, Copy)]
pub struct LedgerConfig {
    /// Smallest accepted top-up amount.
    pub topup_min: i64,
    /// Largest accepted top-up amount.
    pub topup_max: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            topup_min: 50_000,
            topup_max: 10_000_000,
        }
    }
}
