// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Asset lifecycle operations.
//!
//! Per key the only legal transitions are:
//!
//! ```text
//! ABSENT  --create-->          PRESENT
//! PRESENT --update/transfer--> PRESENT
//! PRESENT --delete-->          ABSENT
//! ```
//!
//! An [`AssetContract`] operates on the world state of a single invocation.
//! Committing or aborting that invocation is the caller's job (see
//! [`super::AssetLedger::invoke`]).

use tracing::{debug, info, warn};

use super::asset::{seed_assets, Asset, AssetDetails, AssetEntry, AssetPage};
use super::context::InvocationContext;
use super::error::{LedgerError, LedgerResult};
use crate::canonical;
use crate::storage::{StateIter, WorldState};

/// Upper bound on a single page of `get_assets_page`.
pub const MAX_PAGE_SIZE: usize = 500;

/// Lifecycle operations bound to one invocation.
pub struct AssetContract<'a> {
    ctx: &'a InvocationContext,
    state: &'a mut dyn WorldState,
}

impl<'a> AssetContract<'a> {
    pub fn new(ctx: &'a InvocationContext, state: &'a mut dyn WorldState) -> Self {
        Self { ctx, state }
    }

    /// Seed the ledger with the fixed example records.
    ///
    /// Writes directly, without resolving a caller, and overwrites any
    /// existing value under the seed keys.
    pub fn init_ledger(&mut self) -> LedgerResult<usize> {
        let stamp = self.ctx.modification_time(None);
        let seeds = seed_assets(&stamp);
        for asset in &seeds {
            self.write_asset(asset)?;
        }
        info!(tx_id = %self.ctx.tx_id(), seeded = seeds.len(), "Ledger initialized");
        Ok(seeds.len())
    }

    /// Issue a new asset owned by the caller. Returns its canonical JSON.
    pub fn create_asset(&mut self, document_no: &str, details: AssetDetails) -> LedgerResult<String> {
        require_non_empty("documentNo", document_no)?;

        if self.asset_exists(document_no)? {
            return Err(LedgerError::AlreadyExists(document_no.to_string()));
        }

        let owner = self.ctx.caller_id()?;

        let asset = Asset {
            last_modification: Some(self.ctx.modification_time(None)),
            owned_by: Some(owner),
            ..Asset::from_details(document_no, details)
        };
        self.write_asset(&asset)
    }

    /// Stored JSON text of an asset.
    pub fn read_asset(&self, document_no: &str) -> LedgerResult<String> {
        match self.state.get_state(document_no)? {
            Some(bytes) if !bytes.is_empty() => {
                debug!(document_no = %document_no, "Asset read");
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Err(LedgerError::NotFound(document_no.to_string())),
        }
    }

    /// Replace the descriptive fields of an existing asset.
    ///
    /// Ownership and the namespace tag are carried forward from the stored
    /// record; only a transfer changes the owner.
    pub fn update_asset(&mut self, document_no: &str, details: AssetDetails) -> LedgerResult<()> {
        let stored = self.load_asset(document_no)?;

        let asset = Asset {
            last_modification: Some(
                self.ctx
                    .modification_time(stored.last_modification.as_deref()),
            ),
            owned_by: stored.owned_by,
            doc_type: stored.doc_type,
            ..Asset::from_details(document_no, details)
        };
        self.write_asset(&asset)?;
        Ok(())
    }

    /// Remove an asset from the world state.
    pub fn delete_asset(&mut self, document_no: &str) -> LedgerResult<()> {
        if !self.asset_exists(document_no)? {
            return Err(LedgerError::NotFound(document_no.to_string()));
        }

        self.state.delete_state(document_no)?;
        info!(tx_id = %self.ctx.tx_id(), document_no = %document_no, "Asset deleted");
        Ok(())
    }

    /// True when the key holds a non-empty value.
    pub fn asset_exists(&self, document_no: &str) -> LedgerResult<bool> {
        Ok(self
            .state
            .get_state(document_no)?
            .is_some_and(|bytes| !bytes.is_empty()))
    }

    /// Hand an asset to a new owner. Returns its canonical JSON.
    pub fn transfer_asset(&mut self, document_no: &str, new_owner: &str) -> LedgerResult<String> {
        require_non_empty("newOwner", new_owner)?;

        let mut asset = self.load_asset(document_no)?;
        asset.document_no = document_no.to_string();
        let previous_owner = asset.owned_by.replace(new_owner.to_string());
        asset.last_modification = Some(
            self.ctx
                .modification_time(asset.last_modification.as_deref()),
        );

        let json = self.write_asset(&asset)?;
        info!(
            tx_id = %self.ctx.tx_id(),
            document_no = %document_no,
            from = previous_owner.as_deref().unwrap_or(""),
            to = %new_owner,
            "Asset transferred"
        );
        Ok(json)
    }

    /// Lazy scan over every record in the namespace.
    pub fn get_all_assets(&self) -> LedgerResult<AssetScan<'_>> {
        let inner = self.state.get_state_by_range("", "")?;
        Ok(AssetScan { inner })
    }

    /// Every record as a JSON array, built entry by entry.
    pub fn get_all_assets_json(&self) -> LedgerResult<String> {
        let mut json = String::from("[");
        let mut count = 0usize;
        for entry in self.get_all_assets()? {
            if count > 0 {
                json.push(',');
            }
            json.push_str(&canonical::encode_to_string(&entry?)?);
            count += 1;
        }
        json.push(']');

        debug!(records = count, "Listed all assets");
        Ok(json)
    }

    /// Up to `limit` records with keys strictly after `start_after`.
    pub fn get_assets_page(&self, start_after: Option<&str>, limit: usize) -> LedgerResult<AssetPage> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let start = start_after.unwrap_or("");

        let mut records = Vec::with_capacity(limit);
        let mut last_key = None;
        let scan = AssetScan {
            inner: self.state.get_state_by_range(start, "")?,
        };
        for item in scan.with_keys() {
            let (key, entry) = item?;
            if start_after == Some(key.as_str()) {
                continue;
            }
            records.push(entry);
            last_key = Some(key);
            if records.len() >= limit {
                break;
            }
        }

        let next_cursor = if records.len() >= limit { last_key } else { None };
        Ok(AssetPage {
            records,
            next_cursor,
        })
    }

    fn load_asset(&self, document_no: &str) -> LedgerResult<Asset> {
        let text = self.read_asset(document_no)?;
        serde_json::from_str(&text).map_err(|e| LedgerError::MalformedRecord {
            document_no: document_no.to_string(),
            reason: e.to_string(),
        })
    }

    fn write_asset(&mut self, asset: &Asset) -> LedgerResult<String> {
        let json = canonical::encode_to_string(asset)?;
        self.state.put_state(&asset.document_no, json.as_bytes())?;
        info!(
            tx_id = %self.ctx.tx_id(),
            document_no = %asset.document_no,
            state_digest = %canonical::state_digest(json.as_bytes()),
            "Asset written"
        );
        Ok(json)
    }
}

fn require_non_empty(field: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Single-pass, forward-only traversal of the world state.
///
/// Empty values are skipped. Values that are not valid assets are yielded
/// as [`AssetEntry::Raw`]. Dropping the scan releases the underlying cursor.
pub struct AssetScan<'s> {
    inner: StateIter<'s>,
}

impl<'s> AssetScan<'s> {
    /// Yield each entry together with its world state key.
    pub fn with_keys(mut self) -> impl Iterator<Item = LedgerResult<(String, AssetEntry)>> + 's {
        std::iter::from_fn(move || self.next_keyed())
    }

    fn next_keyed(&mut self) -> Option<LedgerResult<(String, AssetEntry)>> {
        loop {
            match self.inner.next()? {
                Ok((_, value)) if value.is_empty() => continue,
                Ok((key, value)) => {
                    let entry = AssetEntry::from_stored(&value);
                    if entry.is_raw() {
                        warn!(key = %key, "Stored value is not a valid asset, returning raw text");
                    }
                    return Some(Ok((key, entry)));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

impl Iterator for AssetScan<'_> {
    type Item = LedgerResult<AssetEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_keyed().map(|item| item.map(|(_, entry)| entry))
    }
}
