// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `world_state.redb` | unset (in-memory state) |
//! | `SEED_LEDGER` | Seed example assets at startup when the ledger is empty | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use crate::storage::WORLD_STATE_FILE;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the world state directory.
///
/// When unset the node keeps its world state in memory and loses it on exit.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const SEED_LEDGER_ENV: &str = "SEED_LEDGER";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Header carrying the gateway-authenticated client identity token.
pub const IDENTITY_HEADER: &str = "x-client-identity";

/// Header carrying the request id, reused as the invocation's transaction id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub seed_ledger: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup(PORT_ENV)
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        let seed_ledger = lookup(SEED_LEDGER_ENV)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            host,
            port,
            data_dir,
            seed_ledger,
            log_format,
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Path of the redb file, if a data directory is configured.
    pub fn world_state_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(WORLD_STATE_FILE))
    }
}
