// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the invocation API. Ledger records
//! themselves ([`crate::ledger::Asset`], [`crate::ledger::AssetEntry`]) are
//! returned as canonical JSON text and are documented from their own types.
//!
//! Request bodies reject unknown fields.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::ledger::AssetDetails;

/// Request to create a new asset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateAssetRequest {
    /// Unique document number, used as the world state key.
    pub document_no: String,
    pub document_name: String,
    pub document_type: String,
    pub document_size: String,
    pub document_link: String,
}

impl CreateAssetRequest {
    /// Split into the key and the descriptive fields.
    pub fn into_parts(self) -> (String, AssetDetails) {
        (
            self.document_no,
            AssetDetails {
                document_name: self.document_name,
                document_type: self.document_type,
                document_size: self.document_size,
                document_link: self.document_link,
            },
        )
    }
}

/// Request to hand an asset to a new owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransferAssetRequest {
    pub new_owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct InitLedgerResponse {
    /// Number of seed records written.
    pub seeded: usize,
}

/// Query parameters for paged listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Maximum records to return (1-500, default 50).
    pub limit: Option<usize>,
    /// `nextCursor` of the previous page.
    pub cursor: Option<String>,
}
