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

//! # Wallet Ledger
//!
//! An in-memory ledger for a digital-wallet platform. It tracks per-card
//! balances ("saldo") and records the movements that change them: top-ups,
//! withdrawals, peer transfers, and merchant transactions.
//!
//! ## Core Components
//!
//! - [`Store`]: a lock-guarded keyed collection, one per entity type
//! - [`Ledger`]: bootstrap wiring that owns the stores and exposes the
//!   domain services
//! - Domain services ([`service`]): multi-step operations that read a
//!   balance, validate it, mutate it, persist a movement record, and roll
//!   back on partial failure
//! - [`LedgerError`]: structured error kinds for every failure path
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use wallet_ledger_rs::{Ledger, LedgerConfig};
//! use wallet_ledger_rs::service::{CreateBalance, CreateCard, CreateUser, CreateWithdrawal};
//!
//! let ledger = Ledger::new(LedgerConfig::default());
//!
//! let user = ledger.users.create(CreateUser {
//!     name: "Alice".into(),
//!     email: "alice@example.com".into(),
//! }).unwrap();
//! let card = ledger.cards.create(CreateCard {
//!     user_id: user.id,
//!     card_number: "4111-0000-0000-0001".into(),
//!     card_type: "debit".into(),
//!     expire_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
//!     provider: "visa".into(),
//! }).unwrap();
//! ledger.balances.create(CreateBalance { card_id: card.id, total: 250_000 }).unwrap();
//!
//! ledger.withdrawals.create(CreateWithdrawal { user_id: user.id, amount: 100_000 }).unwrap();
//! let balance = ledger.balances.find_by_user_id(user.id).unwrap();
//! assert_eq!(balance.total, 150_000);
//! ```
//!
//! ## Thread Safety
//!
//! Each store is guarded by its own read/write lock, so operations on one
//! store are linearized while unrelated entities proceed in parallel.
//! Operations spanning two balances (transfers, merchant transactions) are
//! not linearized as a unit; see [`service`] for what a concurrent reader
//! may observe.

pub mod base;
pub mod config;
pub mod error;
mod ledger;
pub mod model;
pub mod service;
pub mod store;

pub use base::{
    BalanceId, CardId, MerchantId, TopUpId, TransactionId, TransferId, UserId, WithdrawalId,
};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use model::{
    Balance, Card, Merchant, MerchantStatus, PaymentMethod, TopUp, Transaction, Transfer, User,
    Withdrawal,
};
pub use store::{Record, Store};
