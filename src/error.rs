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

//! Error types for ledger operations.
//!
//! Services return structured error kinds, never formatted strings, so
//! boundary adapters can map them to protocol-specific responses. Store-level
//! errors propagate unchanged through the service layer.

use thiserror::Error;

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An id or secondary key (card number, email, API key, user id) is absent.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated on create (one card per user,
    /// unique email, unique card number, unique top-up reference).
    #[error("conflicting record already exists")]
    Conflict,

    /// A debit would drive a balance negative.
    #[error("insufficient balance")]
    InsufficientFunds,

    /// The caller's API key does not match the merchant recorded on the
    /// resource being modified.
    #[error("api key does not match the owning merchant")]
    Unauthorized,

    /// An entity-specific business rule was violated.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// A compensating rollback itself failed after a multi-step operation
    /// broke down. Carries both the original failure and the rollback
    /// failure; the ledger may hold a partial effect.
    #[error("rollback failed ({rollback}) while handling: {cause}; ledger may be inconsistent")]
    Inconsistent {
        cause: Box<LedgerError>,
        rollback: Box<LedgerError>,
    },
}

impl LedgerError {
    /// Wraps an original failure together with the error that aborted its
    /// compensating rollback.
    pub fn inconsistent(cause: LedgerError, rollback: LedgerError) -> Self {
        LedgerError::Inconsistent {
            cause: Box::new(cause),
            rollback: Box::new(rollback),
        }
    }
}
