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

//! Lock-guarded in-memory entity store.
//!
//! One [`Store`] exists per entity type, each behind its own
//! [`parking_lot::RwLock`]. Read operations share the read lock; every
//! mutating operation holds the write lock for the full read-modify-write
//! sequence, so single-store operations are linearized by that lock.
//!
//! A store method never acquires another store's lock. Cross-entity
//! coordination (debit one balance, credit another, persist a movement
//! record) happens in the service layer, which keeps the lock graph
//! cycle-free.

use crate::base::EntityId;
use crate::error::LedgerError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A record that can live in a [`Store`]: it owns a typed id that the store
/// assigns at creation.
pub trait Record: Clone {
    type Id: EntityId;

    fn id(&self) -> Self::Id;
}

#[derive(Debug)]
struct StoreData<T: Record> {
    records: BTreeMap<T::Id, T>,
    /// Next id to assign. Monotonic; deletes never recycle ids.
    next_id: u32,
}

/// Thread-safe keyed collection for one entity type.
///
/// Identifiers start at 1 and increase monotonically. All reads return
/// clones; callers never hold a reference into the store, so no lock
/// outlives a method call.
#[derive(Debug)]
pub struct Store<T: Record> {
    inner: RwLock<StoreData<T>>,
}

impl<T: Record> Store<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreData {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Returns all records in id order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the collection is empty.
    /// Callers may treat that as an empty result rather than a hard error.
    pub fn read_all(&self) -> Result<Vec<T>, LedgerError> {
        let data = self.inner.read();
        if data.records.is_empty() {
            return Err(LedgerError::NotFound);
        }
        Ok(data.records.values().cloned().collect())
    }

    /// Looks up a record by id.
    pub fn read(&self, id: T::Id) -> Result<T, LedgerError> {
        self.inner
            .read()
            .records
            .get(&id)
            .cloned()
            .ok_or(LedgerError::NotFound)
    }

    /// Returns the first record matching `predicate`, scanning in id order
    /// under the read lock. Used for secondary-key lookups (card number,
    /// email, API key, user id).
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Result<T, LedgerError> {
        self.inner
            .read()
            .records
            .values()
            .find(|record| predicate(record))
            .cloned()
            .ok_or(LedgerError::NotFound)
    }

    /// Returns every record matching `predicate`; may be empty.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.inner
            .read()
            .records
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    /// Assigns the next id, inserts the record built by `build`, and returns
    /// a clone of it.
    pub fn create(&self, build: impl FnOnce(T::Id) -> T) -> T {
        let mut data = self.inner.write();
        let id = T::Id::from_raw(data.next_id);
        data.next_id += 1;
        let record = build(id);
        data.records.insert(id, record.clone());
        record
    }

    /// Like [`create`](Store::create), but first checks a uniqueness
    /// constraint against the existing records. The check and the insert run
    /// under one write-lock acquisition, so two racing creates cannot both
    /// pass the check.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Conflict`] if any existing record matches
    /// `conflict`.
    pub fn try_create(
        &self,
        conflict: impl Fn(&T) -> bool,
        build: impl FnOnce(T::Id) -> T,
    ) -> Result<T, LedgerError> {
        let mut data = self.inner.write();
        if data.records.values().any(|record| conflict(record)) {
            return Err(LedgerError::Conflict);
        }
        let id = T::Id::from_raw(data.next_id);
        data.next_id += 1;
        let record = build(id);
        data.records.insert(id, record.clone());
        Ok(record)
    }

    /// Applies an infallible mutation to the record under the write lock and
    /// returns the updated record. The id is preserved regardless of what
    /// `apply` does to other fields.
    pub fn update(&self, id: T::Id, apply: impl FnOnce(&mut T)) -> Result<T, LedgerError> {
        self.try_update(id, |record| {
            apply(record);
            Ok(())
        })
    }

    /// Applies a fallible read-validate-mutate step atomically.
    ///
    /// The mutation is staged on a copy of the record; only when `apply`
    /// returns `Ok` is the copy written back. A failing `apply` therefore
    /// leaves the stored record untouched, which is what makes a sufficiency
    /// check safe against concurrent debits: validation and mutation commit
    /// together, inside one write-lock hold.
    pub fn try_update(
        &self,
        id: T::Id,
        apply: impl FnOnce(&mut T) -> Result<(), LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut data = self.inner.write();
        let record = data.records.get(&id).ok_or(LedgerError::NotFound)?;
        let mut staged = record.clone();
        apply(&mut staged)?;
        data.records.insert(id, staged.clone());
        Ok(staged)
    }

    /// Removes a record, returning it. The id is never reassigned.
    pub fn delete(&self, id: T::Id) -> Result<T, LedgerError> {
        self.inner
            .write()
            .records
            .remove(&id)
            .ok_or(LedgerError::NotFound)
    }
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::UserId;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Probe {
        id: UserId,
        tag: &'static str,
    }

    impl Record for Probe {
        type Id = UserId;

        fn id(&self) -> UserId {
            self.id
        }
    }

    #[test]
    fn ids_start_at_one_and_increment() {
        let store: Store<Probe> = Store::new();
        let first = store.create(|id| Probe { id, tag: "a" });
        let second = store.create(|id| Probe { id, tag: "b" });
        assert_eq!(first.id, UserId(1));
        assert_eq!(second.id, UserId(2));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let store: Store<Probe> = Store::new();
        let first = store.create(|id| Probe { id, tag: "a" });
        store.delete(first.id).unwrap();
        let second = store.create(|id| Probe { id, tag: "b" });
        assert_eq!(second.id, UserId(2));
    }

    #[test]
    fn read_all_on_empty_store_is_not_found() {
        let store: Store<Probe> = Store::new();
        assert_eq!(store.read_all(), Err(LedgerError::NotFound));
    }

    #[test]
    fn try_create_rejects_conflicting_record() {
        let store: Store<Probe> = Store::new();
        store
            .try_create(|p| p.tag == "a", |id| Probe { id, tag: "a" })
            .unwrap();
        let result = store.try_create(|p| p.tag == "a", |id| Probe { id, tag: "a" });
        assert_eq!(result, Err(LedgerError::Conflict));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_try_update_leaves_record_untouched() {
        let store: Store<Probe> = Store::new();
        let probe = store.create(|id| Probe { id, tag: "a" });
        let result = store.try_update(probe.id, |p| {
            p.tag = "mutated";
            Err(LedgerError::InsufficientFunds)
        });
        assert_eq!(result, Err(LedgerError::InsufficientFunds));
        assert_eq!(store.read(probe.id).unwrap().tag, "a");
    }

    #[test]
    fn store_is_debug_formattable() {
        let store: Store<Probe> = Store::new();
        store.create(|id| Probe { id, tag: "a" });
        let dump = format!("{store:?}");
        assert!(dump.contains("UserId(1)"));
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let store: Store<Probe> = Store::new();
        let result = store.update(UserId(9), |p| p.tag = "x");
        assert_eq!(result, Err(LedgerError::NotFound));
    }
}
