// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process world state.
//!
//! Used when no `DATA_DIR` is configured and by tests. A transaction holds
//! the write lock for its whole lifetime and records its changes in an
//! overlay over the committed map; commit applies the overlay, abort drops
//! it. Read views share the lock with each other.

use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};
use std::iter::Peekable;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::world_state::{
    ensure_key, StateError, StateIter, StateResult, StateStore, StateTransaction, WorldState,
};

type Entries = BTreeMap<String, Vec<u8>>;

/// Uncommitted changes; `None` marks a delete.
type Overlay = BTreeMap<String, Option<Vec<u8>>>;

type KeyRange<'k> = (Bound<&'k str>, Bound<&'k str>);

/// World state kept in memory.
#[derive(Debug, Default)]
pub struct MemoryWorldState {
    entries: RwLock<Entries>,
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryWorldState {
    fn begin(&self) -> StateResult<Box<dyn StateTransaction + '_>> {
        let committed = self.entries.write().map_err(|_| StateError::Poisoned)?;
        Ok(Box::new(MemoryTransaction {
            committed,
            pending: Overlay::new(),
        }))
    }

    fn begin_read(&self) -> StateResult<Box<dyn WorldState + '_>> {
        let committed = self.entries.read().map_err(|_| StateError::Poisoned)?;
        Ok(Box::new(MemoryReadView { committed }))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// `None` when the bounds select nothing. `BTreeMap::range` panics on
/// inverted bounds.
fn key_range<'k>(start_key: &'k str, end_key: &'k str) -> Option<KeyRange<'k>> {
    if !start_key.is_empty() && !end_key.is_empty() && start_key >= end_key {
        return None;
    }

    let lower = if start_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start_key)
    };
    let upper = if end_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end_key)
    };
    Some((lower, upper))
}

struct MemoryTransaction<'a> {
    committed: RwLockWriteGuard<'a, Entries>,
    pending: Overlay,
}

impl WorldState for MemoryTransaction<'_> {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        match self.pending.get(key) {
            Some(change) => Ok(change.clone()),
            None => Ok(self.committed.get(key).cloned()),
        }
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> StateResult<()> {
        ensure_key(key)?;
        self.pending.insert(key.to_string(), Some(value.to_vec()));
        Ok(())
    }

    fn delete_state(&mut self, key: &str) -> StateResult<()> {
        self.pending.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(&self, start_key: &str, end_key: &str) -> StateResult<StateIter<'_>> {
        let Some(range) = key_range(start_key, end_key) else {
            return Ok(Box::new(std::iter::empty()));
        };

        Ok(Box::new(OverlayRange {
            committed: self.committed.range::<str, _>(range).peekable(),
            pending: self.pending.range::<str, _>(range).peekable(),
        }))
    }
}

impl StateTransaction for MemoryTransaction<'_> {
    fn commit(self: Box<Self>) -> StateResult<()> {
        let MemoryTransaction {
            mut committed,
            pending,
        } = *self;
        for (key, change) in pending {
            match change {
                Some(value) => {
                    committed.insert(key, value);
                }
                None => {
                    committed.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn abort(self: Box<Self>) -> StateResult<()> {
        Ok(())
    }
}

/// Committed entries merged with a transaction's overlay, in key order.
struct OverlayRange<'t> {
    committed: Peekable<btree_map::Range<'t, String, Vec<u8>>>,
    pending: Peekable<btree_map::Range<'t, String, Option<Vec<u8>>>>,
}

impl Iterator for OverlayRange<'_> {
    type Item = StateResult<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let order = match (self.committed.peek(), self.pending.peek()) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((committed, _)), Some((pending, _))) => committed.cmp(pending),
            };

            let (key, value) = match order {
                Ordering::Less => {
                    let (key, value) = self.committed.next()?;
                    (key, Some(value))
                }
                Ordering::Greater => {
                    let (key, change) = self.pending.next()?;
                    (key, change.as_ref())
                }
                Ordering::Equal => {
                    self.committed.next();
                    let (key, change) = self.pending.next()?;
                    (key, change.as_ref())
                }
            };

            if let Some(value) = value {
                return Some(Ok((key.clone(), value.clone())));
            }
        }
    }
}

struct MemoryReadView<'a> {
    committed: RwLockReadGuard<'a, Entries>,
}

impl WorldState for MemoryReadView<'_> {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(self.committed.get(key).cloned())
    }

    fn put_state(&mut self, _key: &str, _value: &[u8]) -> StateResult<()> {
        Err(StateError::ReadOnly)
    }

    fn delete_state(&mut self, _key: &str) -> StateResult<()> {
        Err(StateError::ReadOnly)
    }

    fn get_state_by_range(&self, start_key: &str, end_key: &str) -> StateResult<StateIter<'_>> {
        let Some(range) = key_range(start_key, end_key) else {
            return Ok(Box::new(std::iter::empty()));
        };

        let iter = self
            .committed
            .range::<str, _>(range)
            .map(|(key, value)| Ok((key.clone(), value.clone())));
        Ok(Box::new(iter))
    }
}
