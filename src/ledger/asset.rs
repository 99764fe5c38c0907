// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Asset records as stored in the world state.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discriminator written on seed records.
pub const ASSET_DOC_TYPE: &str = "asset";

/// A shared document tracked by the ledger.
///
/// The stored form is the canonical JSON encoding of this struct. Absent
/// optional fields are omitted, never written as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Asset {
    /// Unique document number; also the world state key.
    pub document_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// Human-readable size, e.g. `"1268 KB"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_link: Option<String>,
    /// RFC 3339 UTC timestamp of the last committed change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modification: Option<String>,
    /// Owner identifier (client common name or transfer target).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    /// Namespace discriminator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl Asset {
    /// Build a record from its key and descriptive fields.
    pub fn from_details(document_no: impl Into<String>, details: AssetDetails) -> Self {
        Self {
            document_no: document_no.into(),
            document_name: Some(details.document_name),
            document_type: Some(details.document_type),
            document_size: Some(details.document_size),
            document_link: Some(details.document_link),
            last_modification: None,
            owned_by: None,
            doc_type: None,
        }
    }
}

/// Descriptive metadata supplied by callers on create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssetDetails {
    pub document_name: String,
    pub document_type: String,
    pub document_size: String,
    pub document_link: String,
}

/// One entry of a world state scan.
///
/// Values that do not parse as an [`Asset`] are surfaced as their raw text
/// instead of being dropped.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum AssetEntry {
    Parsed(Asset),
    Raw(String),
}

impl AssetEntry {
    /// Interpret stored bytes.
    ///
    /// Anything that does not deserialize as an [`Asset`] becomes
    /// [`AssetEntry::Raw`] holding the stored text, and serializes as a JSON
    /// string. That includes well-formed JSON of another shape, such as a
    /// record written under a different `docType`; callers that need its
    /// structure must parse the raw text themselves.
    pub fn from_stored(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        match serde_json::from_str::<Asset>(&text) {
            Ok(asset) => AssetEntry::Parsed(asset),
            Err(_) => AssetEntry::Raw(text.into_owned()),
        }
    }

    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            AssetEntry::Parsed(asset) => Some(asset),
            AssetEntry::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, AssetEntry::Raw(_))
    }
}

/// A page of scan results.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    pub records: Vec<AssetEntry>,
    /// Key of the last record returned, present when more may follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Records loaded by `InitLedger`.
pub fn seed_assets(last_modification: &str) -> Vec<Asset> {
    let seed = |document_no: &str, size: &str, owner: &str, link: &str| Asset {
        document_no: document_no.to_string(),
        document_name: None,
        document_type: None,
        document_size: Some(size.to_string()),
        document_link: Some(link.to_string()),
        last_modification: Some(last_modification.to_string()),
        owned_by: Some(owner.to_string()),
        doc_type: Some(ASSET_DOC_TYPE.to_string()),
    };

    vec![
        seed("671", "1268 KB", "User1", "https://www.google.com"),
        seed("672", "512 KB", "User2", "https://www.facebook.com"),
    ]
}
