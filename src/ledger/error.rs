// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger operation errors.

use crate::auth::identity::IdentityError;
use crate::canonical::CanonicalError;
use crate::storage::StateError;

/// Failure of a lifecycle operation.
///
/// Any error aborts the invocation's transaction; nothing is committed.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("The asset {0} already exists")]
    AlreadyExists(String),

    #[error("The asset {0} does not exist")]
    NotFound(String),

    #[error("invalid caller identity: {0}")]
    IdentityFormat(#[from] IdentityError),

    #[error("encoding error: {0}")]
    Encoding(#[from] CanonicalError),

    /// A stored value could not be read back as an asset.
    #[error("stored record {document_no} is not a valid asset: {reason}")]
    MalformedRecord { document_no: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Propagated unchanged from the world state; never retried here.
    #[error("world state error: {0}")]
    State(#[from] StateError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::AlreadyExists(_) => "already_exists",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::IdentityFormat(_) => "identity_format",
            LedgerError::Encoding(_) | LedgerError::MalformedRecord { .. } => "encoding_error",
            LedgerError::InvalidArgument(_) => "invalid_argument",
            LedgerError::State(_) => "world_state_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_asset() {
        assert_eq!(
            LedgerError::AlreadyExists("671".into()).to_string(),
            "The asset 671 already exists"
        );
        assert_eq!(
            LedgerError::NotFound("999".into()).to_string(),
            "The asset 999 does not exist"
        );
    }

    #[test]
    fn error_codes() {
        assert_eq!(
            LedgerError::from(IdentityError::MissingCommonName).error_code(),
            "identity_format"
        );
        assert_eq!(
            LedgerError::MalformedRecord {
                document_no: "671".into(),
                reason: "bad".into()
            }
            .error_code(),
            "encoding_error"
        );
        assert_eq!(
            LedgerError::from(StateError::Poisoned).error_code(),
            "world_state_error"
        );
    }
}
