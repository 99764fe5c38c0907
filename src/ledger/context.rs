// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped invocation context.
//!
//! Everything an operation needs to know about its caller travels in the
//! context instead of ambient globals. The timestamp is fixed once per
//! invocation so every write in that invocation carries the same value.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::auth::identity::{resolve_caller_id, IdentityError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    tx_id: String,
    timestamp: DateTime<Utc>,
    identity: Option<String>,
}

impl InvocationContext {
    pub fn new(tx_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
            identity: None,
        }
    }

    /// Context for work started by the node itself (bootstrap, seeding).
    pub fn system() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), Utc::now())
    }

    /// Attach the caller's identity token.
    pub fn with_identity(mut self, token: impl Into<String>) -> Self {
        self.identity = Some(token.into());
        self
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Owner identifier of the caller.
    pub fn caller_id(&self) -> Result<String, IdentityError> {
        let token = self.identity.as_deref().ok_or(IdentityError::Missing)?;
        resolve_caller_id(token)
    }

    /// `lastModification` value for a write in this invocation.
    ///
    /// Strictly later than `previous` when `previous` is a parseable
    /// timestamp, bumping by one millisecond if the clock has not advanced.
    pub fn modification_time(&self, previous: Option<&str>) -> String {
        let now = self.timestamp;
        let previous = previous
            .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
            .map(|p| p.with_timezone(&Utc));

        let stamp = match previous {
            Some(prev) if now.timestamp_millis() <= prev.timestamp_millis() => {
                DateTime::from_timestamp_millis(prev.timestamp_millis() + 1).unwrap_or(now)
            }
            _ => now,
        };
        format_timestamp(stamp)
    }
}

/// RFC 3339, UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
