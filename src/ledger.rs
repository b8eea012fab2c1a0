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

//! Ledger bootstrap wiring.
//!
//! [`Ledger`] constructs one store per entity type and injects shared
//! handles into the services. Every test can build a fresh, isolated ledger;
//! there is no package-level state.

use crate::config::LedgerConfig;
use crate::model::{Balance, Card, Merchant, TopUp, Transaction, Transfer, User, Withdrawal};
use crate::service::{
    BalanceService, CardService, MerchantService, TopUpService, TransactionService,
    TransferService, UserService, WithdrawalService,
};
use crate::store::Store;
use std::sync::Arc;

/// The assembled wallet ledger: one service per entity, all sharing the
/// underlying stores.
///
/// Cloning a `Ledger` clones the service handles, not the data; clones
/// operate on the same stores, which is how concurrent callers share it.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub users: UserService,
    pub cards: CardService,
    pub merchants: MerchantService,
    pub balances: BalanceService,
    pub topups: TopUpService,
    pub withdrawals: WithdrawalService,
    pub transfers: TransferService,
    pub transactions: TransactionService,
}

impl Ledger {
    /// Builds an empty ledger with the given business limits.
    pub fn new(config: LedgerConfig) -> Self {
        let users: Arc<Store<User>> = Arc::new(Store::new());
        let cards: Arc<Store<Card>> = Arc::new(Store::new());
        let merchants: Arc<Store<Merchant>> = Arc::new(Store::new());
        let balances: Arc<Store<Balance>> = Arc::new(Store::new());
        let topups: Arc<Store<TopUp>> = Arc::new(Store::new());
        let withdrawals: Arc<Store<Withdrawal>> = Arc::new(Store::new());
        let transfers: Arc<Store<Transfer>> = Arc::new(Store::new());
        let transactions: Arc<Store<Transaction>> = Arc::new(Store::new());

        Self {
            users: UserService::new(Arc::clone(&users)),
            cards: CardService::new(Arc::clone(&cards), Arc::clone(&users)),
            merchants: MerchantService::new(Arc::clone(&merchants), Arc::clone(&users)),
            balances: BalanceService::new(Arc::clone(&balances), Arc::clone(&cards)),
            topups: TopUpService::new(Arc::clone(&topups), Arc::clone(&balances), config),
            withdrawals: WithdrawalService::new(
                Arc::clone(&withdrawals),
                Arc::clone(&balances),
            ),
            transfers: TransferService::new(Arc::clone(&transfers), Arc::clone(&balances)),
            transactions: TransactionService::new(
                Arc::clone(&transactions),
                Arc::clone(&merchants),
                Arc::clone(&cards),
                Arc::clone(&balances),
            ),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
