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

//! Top-up operations.
//!
//! A top-up posts as a debit against the user's balance: the amount moves
//! out of the wallet toward the funding channel named by the method, and the
//! movement record documents it. Amending a top-up re-derives the balance
//! adjustment from the difference between the old and new amount rather than
//! overwriting the field.

use crate::base::{TopUpId, UserId};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::model::{Balance, TopUp};
use crate::service::undo_or_flag;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;

/// Input for creating a top-up.
#[derive(Debug, Clone)]
pub struct CreateTopUp {
    pub user_id: UserId,
    /// Caller-supplied reference number; unique across all top-ups.
    pub topup_no: String,
    pub amount: i64,
    /// Raw method name; must parse to a recognized [`PaymentMethod`]
    /// (`bank_transfer`, `virtual_account`, `retail_outlet`, `e_wallet`).
    ///
    /// [`PaymentMethod`]: crate::model::PaymentMethod
    pub method: String,
}

/// Input for amending a top-up.
#[derive(Debug, Clone)]
pub struct UpdateTopUp {
    pub amount: i64,
    pub method: String,
}

/// Top-up orchestration over the top-up and balance stores.
#[derive(Debug, Clone)]
pub struct TopUpService {
    topups: Arc<Store<TopUp>>,
    balances: Arc<Store<Balance>>,
    config: LedgerConfig,
}

impl TopUpService {
    pub fn new(
        topups: Arc<Store<TopUp>>,
        balances: Arc<Store<Balance>>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            topups,
            balances,
            config,
        }
    }

    fn validate_amount(&self, amount: i64) -> Result<(), LedgerError> {
        if amount < self.config.topup_min {
            return Err(LedgerError::Validation("top-up amount below minimum"));
        }
        if amount > self.config.topup_max {
            return Err(LedgerError::Validation("top-up amount above maximum"));
        }
        Ok(())
    }

    /// Creates a top-up, debiting the user's balance.
    ///
    /// The debit commits first; if the movement record is then rejected
    /// (duplicate reference number), a compensating credit restores the
    /// balance before the error is surfaced.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] for an out-of-range amount or an
    ///   unrecognized method.
    /// - [`LedgerError::NotFound`] if the user has no balance.
    /// - [`LedgerError::InsufficientFunds`] if the debit would go negative.
    /// - [`LedgerError::Conflict`] for a duplicate reference number.
    pub fn create(&self, req: CreateTopUp) -> Result<TopUp, LedgerError> {
        let method = req.method.parse()?;
        self.validate_amount(req.amount)?;

        let balance = self.balances.find(|b| b.user_id == req.user_id)?;
        self.balances
            .try_update(balance.id, |b| b.debit(req.amount))?;

        let record = self.topups.try_create(
            |topup| topup.topup_no == req.topup_no,
            |id| TopUp {
                id,
                user_id: req.user_id,
                topup_no: req.topup_no.clone(),
                amount: req.amount,
                method,
                created_at: Utc::now(),
            },
        );
        match record {
            Ok(topup) => Ok(topup),
            Err(cause) => Err(undo_or_flag(&self.balances, balance.id, req.amount, cause)),
        }
    }

    /// Amends a top-up's amount and method.
    ///
    /// The balance is adjusted by the old/new difference in one locked step:
    /// the old debit is credited back, then the new amount is re-debited with
    /// a fresh sufficiency check against the restored total.
    pub fn update(&self, id: TopUpId, req: UpdateTopUp) -> Result<TopUp, LedgerError> {
        let method = req.method.parse()?;
        self.validate_amount(req.amount)?;

        let existing = self.topups.read(id)?;
        let balance = self.balances.find(|b| b.user_id == existing.user_id)?;
        self.balances.try_update(balance.id, |b| {
            b.credit(existing.amount)?;
            b.debit(req.amount)
        })?;

        let record = self.topups.update(id, |topup| {
            topup.amount = req.amount;
            topup.method = method;
        });
        match record {
            Ok(topup) => Ok(topup),
            Err(cause) => Err(undo_or_flag(
                &self.balances,
                balance.id,
                req.amount - existing.amount,
                cause,
            )),
        }
    }

    pub fn find_all(&self) -> Result<Vec<TopUp>, LedgerError> {
        self.topups.read_all()
    }

    pub fn find_by_id(&self, id: TopUpId) -> Result<TopUp, LedgerError> {
        self.topups.read(id)
    }

    pub fn find_by_user_id(&self, user_id: UserId) -> Vec<TopUp> {
        self.topups.filter(|topup| topup.user_id == user_id)
    }

    /// Purges the record. The balance effect of the top-up is deliberately
    /// not reversed; deletion is an audit-trail removal, not a refund.
    pub fn delete(&self, id: TopUpId) -> Result<TopUp, LedgerError> {
        self.topups.delete(id)
    }
}
