// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ledger::LedgerError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "identity_format", message)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::AlreadyExists(_) => StatusCode::CONFLICT,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::IdentityFormat(_) => StatusCode::UNAUTHORIZED,
            LedgerError::Encoding(_) | LedgerError::MalformedRecord { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            LedgerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            LedgerError::State(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}
