// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! World state accessor contract.
//!
//! The lifecycle manager talks to the ledger's key-value snapshot through
//! [`WorldState`]. One [`StateTransaction`] is opened per invocation; it
//! reads its own writes and commits all-or-nothing.

/// Error type for world state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("world state lock poisoned")]
    Poisoned,

    #[error("world state keys must not be empty")]
    EmptyKey,

    #[error("write attempted through a read-only world state view")]
    ReadOnly,
}

pub type StateResult<T> = Result<T, StateError>;

/// A `(key, value)` pair returned by a range scan.
pub type StateEntry = (String, Vec<u8>);

/// Forward-only cursor over a key range.
pub type StateIter<'a> = Box<dyn Iterator<Item = StateResult<StateEntry>> + 'a>;

/// Key-value operations available within one invocation.
pub trait WorldState {
    /// Value stored under `key`, or `None` if absent.
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put_state(&mut self, key: &str, value: &[u8]) -> StateResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete_state(&mut self, key: &str) -> StateResult<()>;

    /// Ascending scan over `[start_key, end_key)`.
    ///
    /// An empty `start_key` or `end_key` leaves that side unbounded, so
    /// `("", "")` visits the whole namespace.
    fn get_state_by_range(&self, start_key: &str, end_key: &str) -> StateResult<StateIter<'_>>;
}

/// A world state view whose writes become visible only on commit.
pub trait StateTransaction: WorldState {
    fn commit(self: Box<Self>) -> StateResult<()>;

    fn abort(self: Box<Self>) -> StateResult<()>;
}

/// A store able to open world state transactions.
pub trait StateStore: Send + Sync {
    fn begin(&self) -> StateResult<Box<dyn StateTransaction + '_>>;

    /// Snapshot of the committed state. Writes fail with
    /// [`StateError::ReadOnly`]; dropping the view releases it.
    fn begin_read(&self) -> StateResult<Box<dyn WorldState + '_>>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

pub(crate) fn ensure_key(key: &str) -> StateResult<()> {
    if key.is_empty() {
        return Err(StateError::EmptyKey);
    }
    Ok(())
}

/// Behaviour every backend must share. Called from each backend's tests.
#[cfg(test)]
pub(crate) fn assert_store_contract(store: &dyn StateStore) {
    // Writes are visible inside the transaction and after commit.
    let mut txn = store.begin().unwrap();
    assert_eq!(txn.get_state("b").unwrap(), None);
    txn.put_state("b", b"2").unwrap();
    txn.put_state("a", b"1").unwrap();
    txn.put_state("c", b"3").unwrap();
    assert_eq!(txn.get_state("b").unwrap(), Some(b"2".to_vec()));
    txn.commit().unwrap();

    // Aborted writes are discarded.
    let mut txn = store.begin().unwrap();
    txn.put_state("d", b"4").unwrap();
    txn.delete_state("a").unwrap();
    txn.abort().unwrap();

    let txn = store.begin().unwrap();
    assert_eq!(txn.get_state("a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(txn.get_state("d").unwrap(), None);

    // Full scan is ordered by key.
    let keys: Vec<String> = txn
        .get_state_by_range("", "")
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();
    assert_eq!(keys, vec!["a", "b", "c"]);

    // Bounded scan is start-inclusive, end-exclusive.
    let keys: Vec<String> = txn
        .get_state_by_range("b", "c")
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();
    assert_eq!(keys, vec!["b"]);

    // Inverted bounds yield nothing rather than failing.
    assert_eq!(txn.get_state_by_range("c", "a").unwrap().count(), 0);
    txn.abort().unwrap();

    // Deletes commit; deleting an absent key is fine.
    let mut txn = store.begin().unwrap();
    txn.delete_state("b").unwrap();
    txn.delete_state("missing").unwrap();
    assert!(matches!(txn.put_state("", b"x"), Err(StateError::EmptyKey)));
    txn.commit().unwrap();

    let txn = store.begin().unwrap();
    assert_eq!(txn.get_state("b").unwrap(), None);
    assert_eq!(txn.get_state_by_range("", "").unwrap().count(), 2);
    txn.abort().unwrap();

    // Read views see committed state and refuse writes.
    let mut view = store.begin_read().unwrap();
    assert_eq!(view.get_state("a").unwrap(), Some(b"1".to_vec()));
    let keys: Vec<String> = view
        .get_state_by_range("", "")
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();
    assert_eq!(keys, vec!["a", "c"]);
    assert!(matches!(view.put_state("z", b"9"), Err(StateError::ReadOnly)));
    assert!(matches!(view.delete_state("a"), Err(StateError::ReadOnly)));
    drop(view);

    // Pending writes and deletes merge into scans inside the transaction.
    let mut txn = store.begin().unwrap();
    txn.put_state("c", b"30").unwrap();
    txn.put_state("bb", b"22").unwrap();
    txn.delete_state("a").unwrap();
    txn.put_state("e", b"5").unwrap();
    txn.delete_state("e").unwrap();
    txn.put_state("d", b"4").unwrap();
    let entries: Vec<StateEntry> = txn
        .get_state_by_range("", "")
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(
        entries,
        vec![
            ("bb".to_string(), b"22".to_vec()),
            ("c".to_string(), b"30".to_vec()),
            ("d".to_string(), b"4".to_vec()),
        ]
    );
    let keys: Vec<String> = txn
        .get_state_by_range("b", "d")
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();
    assert_eq!(keys, vec!["bb", "c"]);
    txn.commit().unwrap();

    let view = store.begin_read().unwrap();
    assert_eq!(view.get_state("a").unwrap(), None);
    assert_eq!(view.get_state("c").unwrap(), Some(b"30".to_vec()));
    assert_eq!(view.get_state("e").unwrap(), None);
    assert_eq!(view.get_state_by_range("", "").unwrap().count(), 3);
}
