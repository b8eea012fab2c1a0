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

//! Card issuance and lookup.

use crate::base::{CardId, UserId};
use crate::error::LedgerError;
use crate::model::Card;
use crate::model::User;
use crate::store::Store;
use chrono::NaiveDate;
use std::sync::Arc;

/// Input for issuing a card.
#[derive(Debug, Clone)]
pub struct CreateCard {
    pub user_id: UserId,
    pub card_number: String,
    pub card_type: String,
    pub expire_date: NaiveDate,
    pub provider: String,
}

/// Input for amending a card's descriptive fields.
#[derive(Debug, Clone)]
pub struct UpdateCard {
    pub card_type: String,
    pub expire_date: NaiveDate,
    pub provider: String,
}

/// CRUD over the card store. One card per user, unique card numbers.
#[derive(Debug, Clone)]
pub struct CardService {
    cards: Arc<Store<Card>>,
    users: Arc<Store<User>>,
}

impl CardService {
    pub fn new(cards: Arc<Store<Card>>, users: Arc<Store<User>>) -> Self {
        Self { cards, users }
    }

    /// Issues a card to an existing user.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if the user does not exist.
    /// - [`LedgerError::Conflict`] if the user already holds a card or the
    ///   card number is taken.
    pub fn create(&self, req: CreateCard) -> Result<Card, LedgerError> {
        self.users.read(req.user_id)?;
        self.cards.try_create(
            |card| card.user_id == req.user_id || card.card_number == req.card_number,
            |id| Card {
                id,
                user_id: req.user_id,
                card_number: req.card_number.clone(),
                card_type: req.card_type.clone(),
                expire_date: req.expire_date,
                provider: req.provider.clone(),
            },
        )
    }

    pub fn find_all(&self) -> Result<Vec<Card>, LedgerError> {
        self.cards.read_all()
    }

    pub fn find_by_id(&self, id: CardId) -> Result<Card, LedgerError> {
        self.cards.read(id)
    }

    pub fn find_by_user_id(&self, user_id: UserId) -> Result<Card, LedgerError> {
        self.cards.find(|card| card.user_id == user_id)
    }

    pub fn find_by_number(&self, card_number: &str) -> Result<Card, LedgerError> {
        self.cards.find(|card| card.card_number == card_number)
    }

    /// Replaces the card's descriptive fields. Owner and number are fixed at
    /// issuance.
    pub fn update(&self, id: CardId, req: UpdateCard) -> Result<Card, LedgerError> {
        self.cards.update(id, |card| {
            card.card_type = req.card_type.clone();
            card.expire_date = req.expire_date;
            card.provider = req.provider.clone();
        })
    }

    /// Removes the card record. The balance tied to it is left dangling; no
    /// cascading deletes.
    pub fn delete(&self, id: CardId) -> Result<Card, LedgerError> {
        self.cards.delete(id)
    }
}
