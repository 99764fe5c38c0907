// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::ledger::AssetLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: AssetLedger,
}

impl AppState {
    pub fn new(ledger: AssetLedger) -> Self {
        Self { ledger }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AssetLedger::in_memory())
    }
}
