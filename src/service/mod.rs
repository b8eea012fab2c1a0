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

//! Domain services orchestrating the entity stores.
//!
//! Each service holds `Arc` handles to the stores it needs, injected through
//! its constructor; nothing here is global state. Operations that touch more
//! than one record follow the same shape everywhere: read, validate, mutate
//! the balance inside the store's locked section, persist the movement
//! record, and compensate with the inverse mutation when a later step fails.
//!
//! The two-balance operations (transfer, merchant transaction) commit their
//! debit and credit in two independent locked sections. A concurrent reader
//! can observe the debit before the credit lands; the stores expose no
//! multi-key transaction primitive and the services do not fake one.

mod balance;
mod card;
mod merchant;
mod topup;
mod transaction;
mod transfer;
mod user;
mod withdrawal;

pub use balance::{BalanceService, CreateBalance};
pub use card::{CardService, CreateCard, UpdateCard};
pub use merchant::{CreateMerchant, MerchantService, UpdateMerchant};
pub use topup::{CreateTopUp, TopUpService, UpdateTopUp};
pub use transaction::{CreateTransaction, TransactionService, UpdateTransaction};
pub use transfer::{CreateTransfer, TransferService, UpdateTransfer};
pub use user::{CreateUser, UserService};
pub use withdrawal::{CreateWithdrawal, UpdateWithdrawal, WithdrawalService};

use crate::base::BalanceId;
use crate::error::LedgerError;
use crate::model::Balance;
use crate::store::Store;

/// Applies the inverse of an already-committed balance mutation after a later
/// step of a multi-step operation failed.
///
/// On success the original failure is returned unchanged. A failed
/// compensation is the one place where silence is unacceptable: it is logged
/// with an explicit marker and surfaced as [`LedgerError::Inconsistent`]
/// carrying both errors.
pub(crate) fn undo_or_flag(
    balances: &Store<Balance>,
    id: BalanceId,
    inverse_delta: i64,
    cause: LedgerError,
) -> LedgerError {
    match balances.try_update(id, |balance| balance.apply(inverse_delta)) {
        Ok(_) => cause,
        Err(rollback) => {
            tracing::error!(
                balance = %id,
                %cause,
                %rollback,
                "ledger may be inconsistent: compensating rollback failed"
            );
            LedgerError::inconsistent(cause, rollback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{CardId, UserId};

    fn store_with_balance(total: i64) -> (Store<Balance>, BalanceId) {
        let store: Store<Balance> = Store::new();
        let balance = store.create(|id| Balance {
            id,
            card_id: CardId(1),
            user_id: UserId(1),
            total,
            withdraw_amount: 0,
            withdraw_time: None,
        });
        (store, balance.id)
    }

    #[test]
    fn successful_compensation_returns_the_original_cause() {
        let (store, id) = store_with_balance(100);
        let error = undo_or_flag(&store, id, 40, LedgerError::Conflict);
        assert_eq!(error, LedgerError::Conflict);
        assert_eq!(store.read(id).unwrap().total, 140);
    }

    #[test]
    fn compensation_against_deleted_balance_flags_inconsistency() {
        let (store, id) = store_with_balance(100);
        store.delete(id).unwrap();
        let error = undo_or_flag(&store, id, 40, LedgerError::Conflict);
        assert_eq!(
            error,
            LedgerError::inconsistent(LedgerError::Conflict, LedgerError::NotFound)
        );
    }

    #[test]
    fn uncoverable_inverse_debit_flags_inconsistency() {
        let (store, id) = store_with_balance(10);
        let error = undo_or_flag(&store, id, -40, LedgerError::Conflict);
        assert_eq!(
            error,
            LedgerError::inconsistent(LedgerError::Conflict, LedgerError::InsufficientFunds)
        );
        // The failed rollback must not half-apply.
        assert_eq!(store.read(id).unwrap().total, 10);
    }
}
