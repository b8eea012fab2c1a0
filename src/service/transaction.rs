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

//! Merchant transactions.
//!
//! A transaction debits the paying card's balance and credits the balance
//! behind the merchant owner's own card, resolved through the
//! owner → card → balance chain. The settlement side is resolved only after
//! the payer debit committed; any miss on that chain rolls the debit back.

use crate::base::{MerchantId, TransactionId};
use crate::error::LedgerError;
use crate::model::{Balance, Card, Merchant, Transaction};
use crate::service::undo_or_flag;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;

/// Input for charging a card.
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub card_number: String,
    pub amount: i64,
    pub payment_method: String,
}

/// Input for amending a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransaction {
    pub amount: i64,
    pub payment_method: String,
}

/// Merchant-transaction orchestration over four stores.
#[derive(Debug, Clone)]
pub struct TransactionService {
    transactions: Arc<Store<Transaction>>,
    merchants: Arc<Store<Merchant>>,
    cards: Arc<Store<Card>>,
    balances: Arc<Store<Balance>>,
}

impl TransactionService {
    pub fn new(
        transactions: Arc<Store<Transaction>>,
        merchants: Arc<Store<Merchant>>,
        cards: Arc<Store<Card>>,
        balances: Arc<Store<Balance>>,
    ) -> Self {
        Self {
            transactions,
            merchants,
            cards,
            balances,
        }
    }

    /// The balance credited on settlement: the merchant owner's card's
    /// balance.
    fn settlement_balance(&self, merchant: &Merchant) -> Result<Balance, LedgerError> {
        let card = self.cards.find(|c| c.user_id == merchant.user_id)?;
        self.balances.find(|b| b.card_id == card.id)
    }

    /// Charges a card on behalf of the merchant holding `api_key`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] for an unknown API key, card number,
    ///   payer balance, or settlement chain; if the payer was already
    ///   debited, the debit is compensated before the error surfaces.
    /// - [`LedgerError::InsufficientFunds`] if the payer cannot cover the
    ///   amount.
    /// - [`LedgerError::Validation`] for an unrecognized payment method.
    pub fn create(&self, api_key: &str, req: CreateTransaction) -> Result<Transaction, LedgerError> {
        let method = req.payment_method.parse()?;
        let merchant = self.merchants.find(|m| m.api_key == api_key)?;
        let card = self.cards.find(|c| c.card_number == req.card_number)?;
        let payer = self.balances.find(|b| b.card_id == card.id)?;

        self.balances.try_update(payer.id, |b| b.debit(req.amount))?;

        let settlement = match self.settlement_balance(&merchant) {
            Ok(balance) => balance,
            Err(cause) => {
                return Err(undo_or_flag(&self.balances, payer.id, req.amount, cause));
            }
        };
        if let Err(cause) = self
            .balances
            .try_update(settlement.id, |b| b.credit(req.amount))
        {
            return Err(undo_or_flag(&self.balances, payer.id, req.amount, cause));
        }

        Ok(self.transactions.create(|id| Transaction {
            id,
            card_id: card.id,
            merchant_id: merchant.id,
            amount: req.amount,
            payment_method: method,
            created_at: Utc::now(),
        }))
    }

    /// Amends a transaction's amount and method.
    ///
    /// The caller's API key must resolve to the merchant recorded on the
    /// original transaction. The old charge is undone and the new one
    /// applied on each balance in one locked step per side: the payer gets
    /// the old amount back and is re-debited the new one; the settlement
    /// balance is debited the old amount and credited the new one.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] if the API key belongs to a different
    /// merchant than the one on the transaction.
    pub fn update(
        &self,
        api_key: &str,
        id: TransactionId,
        req: UpdateTransaction,
    ) -> Result<Transaction, LedgerError> {
        let method = req.payment_method.parse()?;
        let existing = self.transactions.read(id)?;
        let merchant = self.merchants.find(|m| m.api_key == api_key)?;
        if existing.merchant_id != merchant.id {
            return Err(LedgerError::Unauthorized);
        }

        let payer = self.balances.find(|b| b.card_id == existing.card_id)?;
        let settlement = self.settlement_balance(&merchant)?;

        self.balances.try_update(payer.id, |b| {
            b.credit(existing.amount)?;
            b.debit(req.amount)
        })?;
        if let Err(cause) = self.balances.try_update(settlement.id, |b| {
            b.debit(existing.amount)?;
            b.credit(req.amount)
        }) {
            return Err(undo_or_flag(
                &self.balances,
                payer.id,
                req.amount - existing.amount,
                cause,
            ));
        }

        let record = self.transactions.update(id, |t| {
            t.amount = req.amount;
            t.payment_method = method;
        });
        match record {
            Ok(transaction) => Ok(transaction),
            Err(cause) => {
                let cause = undo_or_flag(
                    &self.balances,
                    settlement.id,
                    existing.amount - req.amount,
                    cause,
                );
                Err(undo_or_flag(
                    &self.balances,
                    payer.id,
                    req.amount - existing.amount,
                    cause,
                ))
            }
        }
    }

    pub fn find_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        self.transactions.read_all()
    }

    pub fn find_by_id(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.transactions.read(id)
    }

    pub fn find_by_merchant_id(&self, merchant_id: MerchantId) -> Vec<Transaction> {
        self.transactions
            .filter(|transaction| transaction.merchant_id == merchant_id)
    }

    /// Purges the record without reversing either balance effect.
    pub fn delete(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.transactions.delete(id)
    }
}
