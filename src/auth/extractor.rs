// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the per-request invocation context.
//!
//! ```rust,ignore
//! async fn my_handler(Invocation(ctx): Invocation) -> impl IntoResponse {
//!     // ctx carries the tx id, the request timestamp and the raw identity
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use uuid::Uuid;

use crate::config::{IDENTITY_HEADER, REQUEST_ID_HEADER};
use crate::error::ApiError;
use crate::ledger::InvocationContext;

/// Extractor for the invocation context of a request.
///
/// The transaction id is the `x-request-id` header when present, otherwise a
/// fresh UUID. The identity token is taken verbatim from `X-Client-Identity`
/// and validated later by the operation that needs it.
pub struct Invocation(pub InvocationContext);

impl<S> FromRequestParts<S> for Invocation
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tx_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut ctx = InvocationContext::new(tx_id, Utc::now());

        if let Some(value) = parts.headers.get(IDENTITY_HEADER) {
            let token = value.to_str().map_err(|_| {
                ApiError::unauthorized("X-Client-Identity header is not valid ASCII")
            })?;
            ctx = ctx.with_identity(token);
        }

        Ok(Invocation(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request, StatusCode};

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn uses_request_id_and_identity() {
        let mut parts = parts_with(&[
            ("x-request-id", "req-42"),
            ("X-Client-Identity", "x509::/CN=User1::/CN=ca"),
        ]);
        let Invocation(ctx) = Invocation::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(ctx.tx_id(), "req-42");
        assert_eq!(ctx.identity(), Some("x509::/CN=User1::/CN=ca"));
        assert_eq!(ctx.caller_id().unwrap(), "User1");
    }

    #[tokio::test]
    async fn generates_tx_id_without_headers() {
        let mut parts = parts_with(&[]);
        let Invocation(ctx) = Invocation::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(Uuid::parse_str(ctx.tx_id()).is_ok());
        assert_eq!(ctx.identity(), None);
        assert!(ctx.caller_id().is_err());
    }

    #[tokio::test]
    async fn rejects_non_ascii_identity() {
        let mut parts = parts_with(&[]);
        parts.headers.insert(
            IDENTITY_HEADER,
            HeaderValue::from_bytes(b"x509::/CN=\xffUser::/CN=ca").unwrap(),
        );
        let err = Invocation::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
