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

//! Entity records held by the stores.
//!
//! Amounts are `i64` currency minor units throughout. Movement records
//! (top-up, withdrawal, transfer, merchant transaction) document balance
//! changes; deleting one is a record purge, not a financial reversal.

use crate::base::{
    BalanceId, CardId, MerchantId, TopUpId, TransactionId, TransferId, UserId, WithdrawalId,
};
use crate::error::LedgerError;
use crate::store::Record;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered wallet user. Emails are unique across the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// A payment card. Each user holds at most one card, and card numbers are
/// unique across the card store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub user_id: UserId,
    pub card_number: String,
    pub card_type: String,
    pub expire_date: NaiveDate,
    pub provider: String,
}

impl Record for Card {
    type Id = CardId;

    fn id(&self) -> CardId {
        self.id
    }
}

/// Operational status of a merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantStatus {
    Active,
    Inactive,
}

/// A merchant able to charge wallet cards. The API key is generated at
/// registration and authorizes transaction operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    pub api_key: String,
    pub user_id: UserId,
    pub status: MerchantStatus,
}

impl Record for Merchant {
    type Id = MerchantId;

    fn id(&self) -> MerchantId {
        self.id
    }
}

/// A balance ("saldo") record, owned by exactly one card.
///
/// `withdraw_amount` and `withdraw_time` track the most recent withdrawal
/// against this balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub id: BalanceId,
    pub card_id: CardId,
    pub user_id: UserId,
    pub total: i64,
    pub withdraw_amount: i64,
    pub withdraw_time: Option<DateTime<Utc>>,
}

impl Balance {
    /// Increases the total, rejecting a credit that would overflow it.
    pub fn credit(&mut self, amount: i64) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::Validation("amount must be positive"));
        }
        self.total = self
            .total
            .checked_add(amount)
            .ok_or(LedgerError::Validation("amount overflows the balance total"))?;
        self.assert_invariants();
        Ok(())
    }

    /// Decreases the total, rejecting any debit that would go negative.
    pub fn debit(&mut self, amount: i64) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::Validation("amount must be positive"));
        }
        if self.total < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        self.total -= amount;
        self.assert_invariants();
        Ok(())
    }

    /// Applies a signed delta; used by compensating rollbacks where the
    /// inverse of an earlier mutation may point either way. A zero delta is
    /// a no-op.
    pub fn apply(&mut self, delta: i64) -> Result<(), LedgerError> {
        match delta {
            0 => Ok(()),
            d if d > 0 => self.credit(d),
            d => self.debit(-d),
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.total >= 0,
            "Invariant violated: balance {} went negative: {}",
            self.id,
            self.total
        );
    }
}

impl Record for Balance {
    type Id = BalanceId;

    fn id(&self) -> BalanceId {
        self.id
    }
}

/// Recognized funding channels for top-ups and merchant payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    VirtualAccount,
    RetailOutlet,
    Ewallet,
}

impl FromStr for PaymentMethod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(Self::BankTransfer),
            "virtual_account" => Ok(Self::VirtualAccount),
            "retail_outlet" => Ok(Self::RetailOutlet),
            "e_wallet" => Ok(Self::Ewallet),
            _ => Err(LedgerError::Validation("unrecognized payment method")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BankTransfer => "bank_transfer",
            Self::VirtualAccount => "virtual_account",
            Self::RetailOutlet => "retail_outlet",
            Self::Ewallet => "e_wallet",
        };
        write!(f, "{s}")
    }
}

/// A top-up movement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUp {
    pub id: TopUpId,
    pub user_id: UserId,
    /// Caller-supplied reference number, unique across the top-up store.
    pub topup_no: String,
    pub amount: i64,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Record for TopUp {
    type Id = TopUpId;

    fn id(&self) -> TopUpId {
        self.id
    }
}

/// A withdrawal movement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub user_id: UserId,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Record for Withdrawal {
    type Id = WithdrawalId;

    fn id(&self) -> WithdrawalId {
        self.id
    }
}

/// A peer transfer movement record: debit the sender's balance, credit the
/// receiver's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Record for Transfer {
    type Id = TransferId;

    fn id(&self) -> TransferId {
        self.id
    }
}

/// A merchant transaction movement record: debit the paying card's balance,
/// credit the balance behind the merchant owner's card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub card_id: CardId,
    pub merchant_id: MerchantId,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Record for Transaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }
}
