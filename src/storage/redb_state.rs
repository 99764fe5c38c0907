// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded world state backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `world_state`: key (`documentNo`) → canonical JSON bytes
//!
//! Every mutating invocation runs inside one redb write transaction. redb
//! serializes writers, and a transaction that is aborted or dropped commits
//! nothing. Read-only invocations use a read transaction and never wait on
//! a writer.

use std::collections::VecDeque;
use std::ops::Bound;
use std::path::Path;

use redb::{Database, ReadableDatabase, ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};

use super::world_state::{
    ensure_key, StateEntry, StateError, StateIter, StateResult, StateStore, StateTransaction, WorldState,
};

// =============================================================================
// Table Definitions
// =============================================================================

/// The whole key namespace of the ledger: key → stored value bytes.
const WORLD_STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("world_state");

/// Entries fetched per page by a range cursor.
const SCAN_PAGE_SIZE: usize = 64;

// =============================================================================
// RedbWorldState
// =============================================================================

/// Persistent world state.
pub struct RedbWorldState {
    db: Database,
}

impl RedbWorldState {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so later transactions never race on creation
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WORLD_STATE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl StateStore for RedbWorldState {
    fn begin(&self) -> StateResult<Box<dyn StateTransaction + '_>> {
        let txn = self.db.begin_write()?;
        Ok(Box::new(RedbTransaction { txn }))
    }

    fn begin_read(&self) -> StateResult<Box<dyn WorldState + '_>> {
        let txn = self.db.begin_read()?;
        Ok(Box::new(RedbReadView { txn }))
    }

    fn backend(&self) -> &'static str {
        "redb"
    }
}

// =============================================================================
// Transaction
// =============================================================================

struct RedbTransaction {
    txn: WriteTransaction,
}

impl WorldState for RedbTransaction {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let table = self.txn.open_table(WORLD_STATE)?;
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> StateResult<()> {
        ensure_key(key)?;
        let mut table = self.txn.open_table(WORLD_STATE)?;
        table.insert(key, value)?;
        Ok(())
    }

    fn delete_state(&mut self, key: &str) -> StateResult<()> {
        let mut table = self.txn.open_table(WORLD_STATE)?;
        table.remove(key)?;
        Ok(())
    }

    fn get_state_by_range(&self, start_key: &str, end_key: &str) -> StateResult<StateIter<'_>> {
        Ok(Box::new(RangeCursor::new(
            TxnRef::Write(&self.txn),
            start_key,
            end_key,
        )))
    }
}

impl StateTransaction for RedbTransaction {
    fn commit(self: Box<Self>) -> StateResult<()> {
        let RedbTransaction { txn } = *self;
        txn.commit()?;
        Ok(())
    }

    fn abort(self: Box<Self>) -> StateResult<()> {
        let RedbTransaction { txn } = *self;
        txn.abort()?;
        Ok(())
    }
}

// =============================================================================
// Read View
// =============================================================================

struct RedbReadView {
    txn: ReadTransaction,
}

impl WorldState for RedbReadView {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let table = self.txn.open_table(WORLD_STATE)?;
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn put_state(&mut self, _key: &str, _value: &[u8]) -> StateResult<()> {
        Err(StateError::ReadOnly)
    }

    fn delete_state(&mut self, _key: &str) -> StateResult<()> {
        Err(StateError::ReadOnly)
    }

    fn get_state_by_range(&self, start_key: &str, end_key: &str) -> StateResult<StateIter<'_>> {
        Ok(Box::new(RangeCursor::new(
            TxnRef::Read(&self.txn),
            start_key,
            end_key,
        )))
    }
}

// =============================================================================
// Range Cursor
// =============================================================================

/// Paged forward cursor.
///
/// The table and its redb iterator are opened only while a page is fetched,
/// so no store iterator outlives a `next()` call regardless of how the
/// consumer stops.
struct RangeCursor<'t> {
    txn: TxnRef<'t>,
    lower: Bound<String>,
    upper: Option<String>,
    buffer: VecDeque<StateEntry>,
    exhausted: bool,
}

#[derive(Clone, Copy)]
enum TxnRef<'t> {
    Write(&'t WriteTransaction),
    Read(&'t ReadTransaction),
}

impl<'t> RangeCursor<'t> {
    fn new(txn: TxnRef<'t>, start_key: &str, end_key: &str) -> Self {
        let lower = if start_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start_key.to_string())
        };
        let upper = (!end_key.is_empty()).then(|| end_key.to_string());
        let inverted = !start_key.is_empty() && !end_key.is_empty() && start_key >= end_key;

        Self {
            txn,
            lower,
            upper,
            buffer: VecDeque::with_capacity(SCAN_PAGE_SIZE),
            exhausted: inverted,
        }
    }

    fn fetch_page(&mut self) -> StateResult<()> {
        match self.txn {
            TxnRef::Write(txn) => {
                let table = txn.open_table(WORLD_STATE)?;
                self.fill_page(&table)?;
            }
            TxnRef::Read(txn) => {
                let table = txn.open_table(WORLD_STATE)?;
                self.fill_page(&table)?;
            }
        }

        if self.buffer.len() < SCAN_PAGE_SIZE {
            self.exhausted = true;
        }
        if let Some((last, _)) = self.buffer.back() {
            self.lower = Bound::Excluded(last.clone());
        }
        Ok(())
    }

    fn fill_page<T>(&mut self, table: &T) -> StateResult<()>
    where
        T: ReadableTable<&'static str, &'static [u8]>,
    {
        let lower = match &self.lower {
            Bound::Included(key) => Bound::Included(key.as_str()),
            Bound::Excluded(key) => Bound::Excluded(key.as_str()),
            Bound::Unbounded => Bound::Unbounded,
        };
        let upper = match &self.upper {
            Some(key) => Bound::Excluded(key.as_str()),
            None => Bound::Unbounded,
        };

        for entry in table.range::<&str>((lower, upper))?.take(SCAN_PAGE_SIZE) {
            let (key, value) = entry?;
            self.buffer
                .push_back((key.value().to_string(), value.value().to_vec()));
        }
        Ok(())
    }
}

impl Iterator for RangeCursor<'_> {
    type Item = StateResult<StateEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::world_state::assert_store_contract;

    fn temp_state() -> (RedbWorldState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = RedbWorldState::open(&dir.path().join("world_state.redb")).unwrap();
        (state, dir)
    }

    #[test]
    fn satisfies_store_contract() {
        let (state, _dir) = temp_state();
        assert_store_contract(&state);
    }

    #[test]
    fn scan_crosses_page_boundaries() {
        let (state, _dir) = temp_state();
        let total = SCAN_PAGE_SIZE * 2 + 5;

        let mut txn = state.begin().unwrap();
        for i in 0..total {
            txn.put_state(&format!("{i:04}"), b"{}").unwrap();
        }
        txn.commit().unwrap();

        let txn = state.begin().unwrap();
        let keys: Vec<String> = txn
            .get_state_by_range("", "")
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(keys.len(), total);
        assert_eq!(keys.first().map(String::as_str), Some("0000"));
        assert_eq!(keys.last(), Some(&format!("{:04}", total - 1)));
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn early_termination_releases_table() {
        let (state, _dir) = temp_state();
        let mut txn = state.begin().unwrap();
        for key in ["671", "672", "673"] {
            txn.put_state(key, b"{}").unwrap();
        }

        let first = txn.get_state_by_range("", "").unwrap().next();
        assert_eq!(first.unwrap().unwrap().0, "671");

        // A write after an abandoned scan must not hit an open table.
        txn.put_state("674", b"{}").unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn read_view_is_not_blocked_by_an_open_writer() {
        let (state, _dir) = temp_state();
        let mut txn = state.begin().unwrap();
        txn.put_state("671", b"{}").unwrap();
        txn.commit().unwrap();

        let mut writer = state.begin().unwrap();
        writer.put_state("672", b"{}").unwrap();

        let view = state.begin_read().unwrap();
        assert_eq!(view.get_state("671").unwrap(), Some(b"{}".to_vec()));
        assert_eq!(view.get_state("672").unwrap(), None);
        assert_eq!(view.get_state_by_range("", "").unwrap().count(), 1);
        drop(view);

        writer.commit().unwrap();
    }

    #[test]
    fn committed_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world_state.redb");
        {
            let state = RedbWorldState::open(&path).unwrap();
            let mut txn = state.begin().unwrap();
            txn.put_state("671", br#"{"documentNo":"671"}"#).unwrap();
            txn.commit().unwrap();
        }

        let state = RedbWorldState::open(&path).unwrap();
        let txn = state.begin().unwrap();
        assert_eq!(
            txn.get_state("671").unwrap(),
            Some(br#"{"documentNo":"671"}"#.to_vec())
        );
        assert_eq!(state.backend(), "redb");
    }
}
