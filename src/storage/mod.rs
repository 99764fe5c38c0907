// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # World State Storage
//!
//! This module provides the key-value world state the asset ledger runs
//! against. The lifecycle manager only depends on the [`WorldState`]
//! contract; the backend is chosen at startup.
//!
//! ## Backends
//!
//! - [`RedbWorldState`] - persistent, one redb write transaction per invocation
//! - [`MemoryWorldState`] - in-process, for development and tests
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   world_state.redb
//!     world_state: documentNo → canonical JSON bytes
//! ```

pub mod memory;
pub mod redb_state;
pub mod world_state;

pub use memory::MemoryWorldState;
pub use redb_state::RedbWorldState;
pub use world_state::{
    StateEntry, StateError, StateIter, StateResult, StateStore, StateTransaction, WorldState,
};

/// File name of the redb database inside the data directory.
pub const WORLD_STATE_FILE: &str = "world_state.redb";
