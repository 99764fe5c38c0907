// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Asset Ledger Server - Deterministic Shared Document Ledger
//!
//! This crate manages the lifecycle of document assets stored in a
//! transactional key-value world state. Every record is written as canonical
//! JSON so independent replicas executing the same invocation produce
//! byte-identical state.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Client identity extraction and resolution
//! - `canonical` - Deterministic JSON encoding
//! - `ledger` - Asset lifecycle operations and the transaction boundary
//! - `storage` - World state backends (in-memory and redb)

pub mod api;
pub mod auth;
pub mod canonical;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod state;
pub mod storage;
