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

//! Peer transfers between two balances.
//!
//! The debit and the credit commit in two independent locked sections, in
//! that order. A failure on the receiver side triggers a compensating credit
//! of the sender. Between the two commits a concurrent reader can observe
//! the debited sender and the not-yet-credited receiver.

use crate::base::{TransferId, UserId};
use crate::error::LedgerError;
use crate::model::{Balance, Transfer};
use crate::service::undo_or_flag;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;

/// Input for creating a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransfer {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub amount: i64,
}

/// Input for amending a transfer.
#[derive(Debug, Clone)]
pub struct UpdateTransfer {
    pub amount: i64,
}

/// Transfer orchestration over the transfer and balance stores.
#[derive(Debug, Clone)]
pub struct TransferService {
    transfers: Arc<Store<Transfer>>,
    balances: Arc<Store<Balance>>,
}

impl TransferService {
    pub fn new(transfers: Arc<Store<Transfer>>, balances: Arc<Store<Balance>>) -> Self {
        Self {
            transfers,
            balances,
        }
    }

    /// Transfers funds between two users' balances.
    ///
    /// Both balances are resolved before any mutation, so a missing receiver
    /// leaves the sender untouched. The sender-side sufficiency check is
    /// re-run at commit time inside the balance store's locked section.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] if sender and receiver are the same.
    /// - [`LedgerError::NotFound`] if either balance is absent.
    /// - [`LedgerError::InsufficientFunds`] if the sender cannot cover the
    ///   amount; nothing is committed in that case.
    pub fn create(&self, req: CreateTransfer) -> Result<Transfer, LedgerError> {
        if req.sender_id == req.receiver_id {
            return Err(LedgerError::Validation("sender and receiver must differ"));
        }
        let sender = self.balances.find(|b| b.user_id == req.sender_id)?;
        let receiver = self.balances.find(|b| b.user_id == req.receiver_id)?;
        if sender.total < req.amount {
            return Err(LedgerError::InsufficientFunds);
        }

        self.balances.try_update(sender.id, |b| b.debit(req.amount))?;
        if let Err(cause) = self
            .balances
            .try_update(receiver.id, |b| b.credit(req.amount))
        {
            return Err(undo_or_flag(&self.balances, sender.id, req.amount, cause));
        }

        Ok(self.transfers.create(|id| Transfer {
            id,
            sender_id: req.sender_id,
            receiver_id: req.receiver_id,
            amount: req.amount,
            created_at: Utc::now(),
        }))
    }

    /// Amends a transfer's amount.
    ///
    /// Each side is adjusted by the old/new difference in its own locked
    /// step: the sender gets the old amount back and is re-debited the new
    /// one; the receiver is debited the old amount (which fails if those
    /// funds were already spent) and credited the new one. Failures reverse
    /// whatever committed, in reverse order.
    pub fn update(&self, id: TransferId, req: UpdateTransfer) -> Result<Transfer, LedgerError> {
        let existing = self.transfers.read(id)?;
        let sender = self.balances.find(|b| b.user_id == existing.sender_id)?;
        let receiver = self.balances.find(|b| b.user_id == existing.receiver_id)?;

        self.balances.try_update(sender.id, |b| {
            b.credit(existing.amount)?;
            b.debit(req.amount)
        })?;
        if let Err(cause) = self.balances.try_update(receiver.id, |b| {
            b.debit(existing.amount)?;
            b.credit(req.amount)
        }) {
            return Err(undo_or_flag(
                &self.balances,
                sender.id,
                req.amount - existing.amount,
                cause,
            ));
        }

        let record = self.transfers.update(id, |t| t.amount = req.amount);
        match record {
            Ok(transfer) => Ok(transfer),
            Err(cause) => {
                let cause = undo_or_flag(
                    &self.balances,
                    receiver.id,
                    existing.amount - req.amount,
                    cause,
                );
                Err(undo_or_flag(
                    &self.balances,
                    sender.id,
                    req.amount - existing.amount,
                    cause,
                ))
            }
        }
    }

    pub fn find_all(&self) -> Result<Vec<Transfer>, LedgerError> {
        self.transfers.read_all()
    }

    pub fn find_by_id(&self, id: TransferId) -> Result<Transfer, LedgerError> {
        self.transfers.read(id)
    }

    /// All transfers where the user is sender or receiver.
    pub fn find_by_user_id(&self, user_id: UserId) -> Vec<Transfer> {
        self.transfers
            .filter(|transfer| transfer.sender_id == user_id || transfer.receiver_id == user_id)
    }

    /// Purges the record without reversing either balance effect.
    pub fn delete(&self, id: TransferId) -> Result<Transfer, LedgerError> {
        self.transfers.delete(id)
    }
}
