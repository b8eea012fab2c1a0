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

//! Balance ("saldo") management.
//!
//! Balances are opened here with an explicit total; every later adjustment
//! goes through the movement services so that a record documents the change.

use crate::base::{BalanceId, CardId, UserId};
use crate::error::LedgerError;
use crate::model::{Balance, Card};
use crate::store::Store;
use std::sync::Arc;

/// Input for opening a balance against a card.
#[derive(Debug, Clone)]
pub struct CreateBalance {
    pub card_id: CardId,
    /// Opening total, currency minor units.
    pub total: i64,
}

/// CRUD over the balance store. One balance per card.
#[derive(Debug, Clone)]
pub struct BalanceService {
    balances: Arc<Store<Balance>>,
    cards: Arc<Store<Card>>,
}

impl BalanceService {
    pub fn new(balances: Arc<Store<Balance>>, cards: Arc<Store<Card>>) -> Self {
        Self { balances, cards }
    }

    /// Opens a balance for an existing card.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if the card does not exist.
    /// - [`LedgerError::Conflict`] if the card already has a balance.
    /// - [`LedgerError::Validation`] if the opening total is negative.
    pub fn create(&self, req: CreateBalance) -> Result<Balance, LedgerError> {
        if req.total < 0 {
            return Err(LedgerError::Validation("opening total must not be negative"));
        }
        let card = self.cards.read(req.card_id)?;
        self.balances.try_create(
            |balance| balance.card_id == req.card_id,
            |id| Balance {
                id,
                card_id: card.id,
                user_id: card.user_id,
                total: req.total,
                withdraw_amount: 0,
                withdraw_time: None,
            },
        )
    }

    pub fn find_all(&self) -> Result<Vec<Balance>, LedgerError> {
        self.balances.read_all()
    }

    pub fn find_by_id(&self, id: BalanceId) -> Result<Balance, LedgerError> {
        self.balances.read(id)
    }

    pub fn find_by_user_id(&self, user_id: UserId) -> Result<Balance, LedgerError> {
        self.balances.find(|balance| balance.user_id == user_id)
    }

    pub fn find_by_card_id(&self, card_id: CardId) -> Result<Balance, LedgerError> {
        self.balances.find(|balance| balance.card_id == card_id)
    }

    /// Replaces the total outright, bypassing the movement services. Meant
    /// for administrative corrections; the new total still must not be
    /// negative.
    pub fn update(&self, id: BalanceId, total: i64) -> Result<Balance, LedgerError> {
        self.balances.try_update(id, |balance| {
            if total < 0 {
                return Err(LedgerError::Validation("total must not be negative"));
            }
            balance.total = total;
            Ok(())
        })
    }

    pub fn delete(&self, id: BalanceId) -> Result<Balance, LedgerError> {
        self.balances.delete(id)
    }
}
