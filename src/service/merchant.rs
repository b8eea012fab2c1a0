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

//! Merchant registration and API-key lookup.

use crate::base::{MerchantId, UserId};
use crate::error::LedgerError;
use crate::model::{Merchant, MerchantStatus, User};
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Input for registering a merchant.
#[derive(Debug, Clone)]
pub struct CreateMerchant {
    pub name: String,
    /// The wallet user who owns this merchant and receives its settlements.
    pub user_id: UserId,
}

/// Input for amending a merchant.
#[derive(Debug, Clone)]
pub struct UpdateMerchant {
    pub name: String,
    pub status: MerchantStatus,
}

/// CRUD over the merchant store. API keys are generated at registration and
/// unique by construction.
#[derive(Debug, Clone)]
pub struct MerchantService {
    merchants: Arc<Store<Merchant>>,
    users: Arc<Store<User>>,
}

impl MerchantService {
    pub fn new(merchants: Arc<Store<Merchant>>, users: Arc<Store<User>>) -> Self {
        Self { merchants, users }
    }

    /// Registers a merchant owned by an existing user and issues its API key.
    pub fn create(&self, req: CreateMerchant) -> Result<Merchant, LedgerError> {
        self.users.read(req.user_id)?;
        let api_key = Uuid::new_v4().simple().to_string();
        Ok(self.merchants.create(|id| Merchant {
            id,
            name: req.name.clone(),
            api_key: api_key.clone(),
            user_id: req.user_id,
            status: MerchantStatus::Active,
        }))
    }

    pub fn find_all(&self) -> Result<Vec<Merchant>, LedgerError> {
        self.merchants.read_all()
    }

    pub fn find_by_id(&self, id: MerchantId) -> Result<Merchant, LedgerError> {
        self.merchants.read(id)
    }

    pub fn find_by_api_key(&self, api_key: &str) -> Result<Merchant, LedgerError> {
        self.merchants.find(|merchant| merchant.api_key == api_key)
    }

    pub fn update(&self, id: MerchantId, req: UpdateMerchant) -> Result<Merchant, LedgerError> {
        self.merchants.update(id, |merchant| {
            merchant.name = req.name.clone();
            merchant.status = req.status;
        })
    }

    pub fn delete(&self, id: MerchantId) -> Result<Merchant, LedgerError> {
        self.merchants.delete(id)
    }
}
