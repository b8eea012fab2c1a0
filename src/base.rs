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

//! Core identifier types, one newtype per entity.
//!
//! Every store assigns its own identifiers starting at 1, so a raw `u32`
//! would make it far too easy to hand a `TopUpId` to a balance lookup.
//! The newtypes keep those id spaces apart at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Conversion contract between a store-assigned counter and an id newtype.
pub trait EntityId: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display {
    fn from_raw(raw: u32) -> Self;
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl EntityId for $name {
            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id! {
    /// Unique identifier for a wallet user.
    UserId
}

entity_id! {
    /// Unique identifier for a payment card.
    CardId
}

entity_id! {
    /// Unique identifier for a registered merchant.
    MerchantId
}

entity_id! {
    /// Unique identifier for a balance ("saldo") record.
    BalanceId
}

entity_id! {
    /// Unique identifier for a top-up movement record.
    TopUpId
}

entity_id! {
    /// Unique identifier for a withdrawal movement record.
    WithdrawalId
}

entity_id! {
    /// Unique identifier for a peer transfer movement record.
    TransferId
}

entity_id! {
    /// Unique identifier for a merchant transaction movement record.
    TransactionId
}
