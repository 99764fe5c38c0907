// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Identity
//!
//! The node sits behind a gateway that authenticates clients with X.509
//! certificates and forwards the result as an identity token in the
//! `X-Client-Identity` header:
//!
//! ```text
//! x509::/C=US/O=Org1/OU=client/CN=User1::/C=US/CN=ca.org1.example.com
//! ```
//!
//! - [`extractor::Invocation`] turns request headers into an
//!   [`InvocationContext`](crate::ledger::InvocationContext)
//! - [`identity::resolve_caller_id`] reduces a token to the subject's
//!   common name, which becomes the asset owner
//!
//! Tokens are only parsed when an operation needs the caller, so reads work
//! without an identity header.

pub mod extractor;
pub mod identity;

pub use extractor::Invocation;
pub use identity::{resolve_caller_id, ClientIdentity, DistinguishedName, IdentityError};
