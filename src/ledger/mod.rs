// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Asset Ledger
//!
//! The deterministic asset lifecycle manager.
//!
//! [`AssetLedger`] owns the transaction boundary: each call opens one world
//! state transaction, runs a single [`AssetContract`] operation against it
//! and commits on success. Any error aborts the transaction, so a failed
//! invocation never leaves a partial write behind. Read-only operations run
//! through [`AssetLedger::query`] against a snapshot and never hold the
//! writer.
//!
//! ```rust,ignore
//! let ledger = AssetLedger::in_memory();
//! let ctx = InvocationContext::system().with_identity(token);
//! let json = ledger.create_asset(&ctx, "671", details)?;
//! ```

pub mod asset;
pub mod context;
pub mod contract;
pub mod error;

use std::sync::Arc;

use tracing::warn;

pub use asset::{Asset, AssetDetails, AssetEntry, AssetPage, ASSET_DOC_TYPE};
pub use context::InvocationContext;
pub use contract::{AssetContract, AssetScan, MAX_PAGE_SIZE};
pub use error::{LedgerError, LedgerResult};

use crate::storage::{MemoryWorldState, StateStore, WorldState};

/// Transactional entry point to the lifecycle operations.
#[derive(Clone)]
pub struct AssetLedger {
    store: Arc<dyn StateStore>,
}

impl AssetLedger {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Ledger over a fresh in-memory world state.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryWorldState::new()))
    }

    /// Name of the world state backend.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Run `operation` as one atomic invocation.
    pub fn invoke<T, F>(&self, ctx: &InvocationContext, operation: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut AssetContract<'_>) -> LedgerResult<T>,
    {
        let mut txn = self.store.begin()?;
        let result = {
            let state: &mut dyn WorldState = txn.as_mut();
            let mut contract = AssetContract::new(ctx, state);
            operation(&mut contract)
        };

        match result {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                warn!(tx_id = %ctx.tx_id(), error = %err, "Invocation aborted");
                if let Err(abort_err) = txn.abort() {
                    warn!(tx_id = %ctx.tx_id(), error = %abort_err, "Failed to abort transaction");
                }
                Err(err)
            }
        }
    }

    /// Run a read-only `operation` against a snapshot of committed state.
    pub fn query<T, F>(&self, ctx: &InvocationContext, operation: F) -> LedgerResult<T>
    where
        F: FnOnce(&AssetContract<'_>) -> LedgerResult<T>,
    {
        let mut view = self.store.begin_read()?;
        let contract = AssetContract::new(ctx, view.as_mut());
        operation(&contract)
    }

    pub fn init_ledger(&self, ctx: &InvocationContext) -> LedgerResult<usize> {
        self.invoke(ctx, |c| c.init_ledger())
    }

    pub fn create_asset(
        &self,
        ctx: &InvocationContext,
        document_no: &str,
        details: AssetDetails,
    ) -> LedgerResult<String> {
        self.invoke(ctx, |c| c.create_asset(document_no, details))
    }

    pub fn read_asset(&self, ctx: &InvocationContext, document_no: &str) -> LedgerResult<String> {
        self.query(ctx, |c| c.read_asset(document_no))
    }

    pub fn update_asset(
        &self,
        ctx: &InvocationContext,
        document_no: &str,
        details: AssetDetails,
    ) -> LedgerResult<()> {
        self.invoke(ctx, |c| c.update_asset(document_no, details))
    }

    pub fn delete_asset(&self, ctx: &InvocationContext, document_no: &str) -> LedgerResult<()> {
        self.invoke(ctx, |c| c.delete_asset(document_no))
    }

    pub fn asset_exists(&self, ctx: &InvocationContext, document_no: &str) -> LedgerResult<bool> {
        self.query(ctx, |c| c.asset_exists(document_no))
    }

    pub fn transfer_asset(
        &self,
        ctx: &InvocationContext,
        document_no: &str,
        new_owner: &str,
    ) -> LedgerResult<String> {
        self.invoke(ctx, |c| c.transfer_asset(document_no, new_owner))
    }

    /// All records as a JSON array string.
    pub fn get_all_assets(&self, ctx: &InvocationContext) -> LedgerResult<String> {
        self.query(ctx, |c| c.get_all_assets_json())
    }

    pub fn get_assets_page(
        &self,
        ctx: &InvocationContext,
        start_after: Option<&str>,
        limit: usize,
    ) -> LedgerResult<AssetPage> {
        self.query(ctx, |c| c.get_assets_page(start_after, limit))
    }

    /// True when the world state holds no live records.
    pub fn is_empty(&self, ctx: &InvocationContext) -> LedgerResult<bool> {
        self.query(ctx, |c| Ok(c.get_all_assets()?.next().is_none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RedbWorldState;

    const USER1: &str = "x509::/C=US/O=Org1/OU=client/CN=User1::/C=US/CN=ca.org1.example.com";

    fn ctx() -> InvocationContext {
        InvocationContext::system().with_identity(USER1)
    }

    fn details() -> AssetDetails {
        AssetDetails {
            document_name: "Site survey".into(),
            document_type: "pdf".into(),
            document_size: "88 KB".into(),
            document_link: "https://example.org/survey".into(),
        }
    }

    #[test]
    fn failed_invocation_commits_nothing() {
        let ledger = AssetLedger::in_memory();
        let ctx = ctx();

        let result: LedgerResult<()> = ledger.invoke(&ctx, |c| {
            c.create_asset("100", details())?;
            assert!(c.asset_exists("100")?);
            Err(LedgerError::InvalidArgument("forced".into()))
        });
        assert!(result.is_err());
        assert!(!ledger.asset_exists(&ctx, "100").unwrap());
    }

    #[test]
    fn create_then_exists_then_conflict() {
        let ledger = AssetLedger::in_memory();
        let ctx = ctx();
        assert!(ledger.is_empty(&ctx).unwrap());

        ledger.create_asset(&ctx, "100", details()).unwrap();
        assert!(ledger.asset_exists(&ctx, "100").unwrap());
        assert!(!ledger.is_empty(&ctx).unwrap());

        let err = ledger.create_asset(&ctx, "100", details()).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyExists(_)));
    }

    #[test]
    fn queries_run_beside_an_open_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbWorldState::open(&dir.path().join("world_state.redb")).unwrap();
        let ledger = AssetLedger::new(Arc::new(store));
        let ctx = ctx();
        ledger.create_asset(&ctx, "100", details()).unwrap();

        let reader = ledger.clone();
        let result = ledger.invoke(&ctx, |c| {
            c.delete_asset("100")?;
            // A snapshot taken mid-invocation still sees the committed asset.
            assert!(reader.asset_exists(&ctx, "100")?);
            Ok(())
        });
        assert!(result.is_ok());
        assert!(!ledger.asset_exists(&ctx, "100").unwrap());
    }

    #[test]
    fn redb_backed_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbWorldState::open(&dir.path().join("world_state.redb")).unwrap();
        let ledger = AssetLedger::new(Arc::new(store));
        let ctx = ctx();
        assert_eq!(ledger.backend(), "redb");

        assert_eq!(ledger.init_ledger(&ctx).unwrap(), 2);
        ledger.create_asset(&ctx, "100", details()).unwrap();
        ledger.transfer_asset(&ctx, "100", "Org2").unwrap();
        ledger.update_asset(&ctx, "100", details()).unwrap();

        let stored: Asset = serde_json::from_str(&ledger.read_asset(&ctx, "100").unwrap()).unwrap();
        assert_eq!(stored.owned_by.as_deref(), Some("Org2"));

        ledger.delete_asset(&ctx, "671").unwrap();
        let all: Vec<serde_json::Value> =
            serde_json::from_str(&ledger.get_all_assets(&ctx).unwrap()).unwrap();
        assert_eq!(all.len(), 2);

        let page = ledger.get_assets_page(&ctx, Some("100"), 10).unwrap();
        assert_eq!(page.records.len(), 1);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn aborted_redb_invocation_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbWorldState::open(&dir.path().join("world_state.redb")).unwrap();
        let ledger = AssetLedger::new(Arc::new(store));
        let ctx = ctx();
        ledger.init_ledger(&ctx).unwrap();
        let before = ledger.get_all_assets(&ctx).unwrap();

        let err = ledger.delete_asset(&ctx, "999").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert_eq!(ledger.get_all_assets(&ctx).unwrap(), before);
    }
}
