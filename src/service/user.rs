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

//! User registration and lookup.

use crate::base::UserId;
use crate::error::LedgerError;
use crate::model::User;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;

/// Input for registering a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

/// CRUD over the user store. Emails are unique.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<Store<User>>,
}

impl UserService {
    pub fn new(users: Arc<Store<User>>) -> Self {
        Self { users }
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Conflict`] if the email is already registered.
    pub fn create(&self, req: CreateUser) -> Result<User, LedgerError> {
        self.users.try_create(
            |user| user.email == req.email,
            |id| User {
                id,
                name: req.name.clone(),
                email: req.email.clone(),
                created_at: Utc::now(),
            },
        )
    }

    pub fn find_all(&self) -> Result<Vec<User>, LedgerError> {
        self.users.read_all()
    }

    pub fn find_by_id(&self, id: UserId) -> Result<User, LedgerError> {
        self.users.read(id)
    }

    pub fn find_by_email(&self, email: &str) -> Result<User, LedgerError> {
        self.users.find(|user| user.email == email)
    }

    /// Removes the user record. Cards and balances referencing it are left
    /// in place; there are no cascading deletes.
    pub fn delete(&self, id: UserId) -> Result<User, LedgerError> {
        self.users.delete(id)
    }
}
