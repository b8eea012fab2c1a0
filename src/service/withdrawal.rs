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

//! Withdrawal operations.
//!
//! Creating a withdrawal debits the balance and stamps the balance record's
//! last-withdrawal fields in the same locked step. Amending one restores the
//! prior withdrawal's effect first and re-validates the new amount against
//! the restored total.

use crate::base::{UserId, WithdrawalId};
use crate::error::LedgerError;
use crate::model::{Balance, Withdrawal};
use crate::service::undo_or_flag;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;

/// Input for creating a withdrawal.
#[derive(Debug, Clone)]
pub struct CreateWithdrawal {
    pub user_id: UserId,
    pub amount: i64,
}

/// Input for amending a withdrawal.
#[derive(Debug, Clone)]
pub struct UpdateWithdrawal {
    pub amount: i64,
}

/// Withdrawal orchestration over the withdrawal and balance stores.
#[derive(Debug, Clone)]
pub struct WithdrawalService {
    withdrawals: Arc<Store<Withdrawal>>,
    balances: Arc<Store<Balance>>,
}

impl WithdrawalService {
    pub fn new(withdrawals: Arc<Store<Withdrawal>>, balances: Arc<Store<Balance>>) -> Self {
        Self {
            withdrawals,
            balances,
        }
    }

    /// Creates a withdrawal, debiting the user's balance.
    ///
    /// The sufficiency check and the debit commit together inside the
    /// balance store's locked section, so concurrent withdrawals against one
    /// balance serialize and can never jointly overdraw it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if the user has no balance.
    /// - [`LedgerError::InsufficientFunds`] if the amount exceeds the total.
    pub fn create(&self, req: CreateWithdrawal) -> Result<Withdrawal, LedgerError> {
        let balance = self.balances.find(|b| b.user_id == req.user_id)?;
        let now = Utc::now();
        self.balances.try_update(balance.id, |b| {
            b.debit(req.amount)?;
            b.withdraw_amount = req.amount;
            b.withdraw_time = Some(now);
            Ok(())
        })?;

        Ok(self.withdrawals.create(|id| Withdrawal {
            id,
            user_id: req.user_id,
            amount: req.amount,
            created_at: now,
        }))
    }

    /// Amends a withdrawal's amount.
    ///
    /// The old amount is credited back and the new amount re-debited in one
    /// locked step, so the sufficiency check runs against the restored
    /// balance, not the already-debited one.
    pub fn update(&self, id: WithdrawalId, req: UpdateWithdrawal) -> Result<Withdrawal, LedgerError> {
        let existing = self.withdrawals.read(id)?;
        let balance = self.balances.find(|b| b.user_id == existing.user_id)?;
        let now = Utc::now();
        self.balances.try_update(balance.id, |b| {
            b.credit(existing.amount)?;
            b.debit(req.amount)?;
            b.withdraw_amount = req.amount;
            b.withdraw_time = Some(now);
            Ok(())
        })?;

        let record = self.withdrawals.update(id, |w| w.amount = req.amount);
        match record {
            Ok(withdrawal) => Ok(withdrawal),
            Err(cause) => Err(undo_or_flag(
                &self.balances,
                balance.id,
                req.amount - existing.amount,
                cause,
            )),
        }
    }

    pub fn find_all(&self) -> Result<Vec<Withdrawal>, LedgerError> {
        self.withdrawals.read_all()
    }

    pub fn find_by_id(&self, id: WithdrawalId) -> Result<Withdrawal, LedgerError> {
        self.withdrawals.read(id)
    }

    pub fn find_by_user_id(&self, user_id: UserId) -> Vec<Withdrawal> {
        self.withdrawals
            .filter(|withdrawal| withdrawal.user_id == user_id)
    }

    /// Purges the record without reversing the balance effect.
    pub fn delete(&self, id: WithdrawalId) -> Result<Withdrawal, LedgerError> {
        self.withdrawals.delete(id)
    }
}
