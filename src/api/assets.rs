// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Asset lifecycle endpoints.
//!
//! Every handler runs exactly one ledger invocation. Record bodies are
//! returned as the canonical JSON text produced by the ledger, so two nodes
//! answering the same request return identical bytes.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    auth::Invocation,
    canonical,
    error::ApiError,
    ledger::{Asset, AssetDetails, AssetEntry, AssetPage, LedgerError},
    models::{
        CreateAssetRequest, ExistsResponse, InitLedgerResponse, PageQuery, TransferAssetRequest,
    },
    state::AppState,
};

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Pre-encoded JSON response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalJson(pub String);

impl IntoResponse for CanonicalJson {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            self.0,
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/v1/assets",
    request_body = CreateAssetRequest,
    params(
        ("X-Client-Identity" = String, Header, description = "Client identity token of the creator")
    ),
    tag = "Assets",
    responses(
        (status = 201, body = Asset),
        (status = 401, description = "Missing or malformed identity"),
        (status = 409, description = "Asset already exists")
    )
)]
pub async fn create_asset(
    Invocation(ctx): Invocation,
    State(state): State<AppState>,
    Json(request): Json<CreateAssetRequest>,
) -> Result<(StatusCode, CanonicalJson), ApiError> {
    let (document_no, details) = request.into_parts();
    let json = state.ledger.create_asset(&ctx, &document_no, details)?;
    Ok((StatusCode::CREATED, CanonicalJson(json)))
}

#[utoipa::path(
    get,
    path = "/v1/assets/{document_no}",
    params(
        ("document_no" = String, Path, description = "Document number of the asset")
    ),
    tag = "Assets",
    responses(
        (status = 200, body = Asset),
        (status = 404, description = "Asset does not exist")
    )
)]
pub async fn read_asset(
    Invocation(ctx): Invocation,
    Path(document_no): Path<String>,
    State(state): State<AppState>,
) -> Result<CanonicalJson, ApiError> {
    let json = state.ledger.read_asset(&ctx, &document_no)?;
    Ok(CanonicalJson(json))
}

#[utoipa::path(
    put,
    path = "/v1/assets/{document_no}",
    request_body = AssetDetails,
    params(
        ("document_no" = String, Path, description = "Document number of the asset")
    ),
    tag = "Assets",
    responses(
        (status = 204),
        (status = 404, description = "Asset does not exist")
    )
)]
pub async fn update_asset(
    Invocation(ctx): Invocation,
    Path(document_no): Path<String>,
    State(state): State<AppState>,
    Json(details): Json<AssetDetails>,
) -> Result<StatusCode, ApiError> {
    state.ledger.update_asset(&ctx, &document_no, details)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/assets/{document_no}",
    params(
        ("document_no" = String, Path, description = "Document number of the asset")
    ),
    tag = "Assets",
    responses(
        (status = 204),
        (status = 404, description = "Asset does not exist")
    )
)]
pub async fn delete_asset(
    Invocation(ctx): Invocation,
    Path(document_no): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.ledger.delete_asset(&ctx, &document_no)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/assets/{document_no}/exists",
    params(
        ("document_no" = String, Path, description = "Document number of the asset")
    ),
    tag = "Assets",
    responses((status = 200, body = ExistsResponse))
)]
pub async fn asset_exists(
    Invocation(ctx): Invocation,
    Path(document_no): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let exists = state.ledger.asset_exists(&ctx, &document_no)?;
    Ok(Json(ExistsResponse { exists }))
}

#[utoipa::path(
    post,
    path = "/v1/assets/{document_no}/transfer",
    request_body = TransferAssetRequest,
    params(
        ("document_no" = String, Path, description = "Document number of the asset")
    ),
    tag = "Assets",
    responses(
        (status = 200, body = Asset),
        (status = 400, description = "Empty new owner"),
        (status = 404, description = "Asset does not exist")
    )
)]
pub async fn transfer_asset(
    Invocation(ctx): Invocation,
    Path(document_no): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<TransferAssetRequest>,
) -> Result<CanonicalJson, ApiError> {
    let json = state
        .ledger
        .transfer_asset(&ctx, &document_no, &request.new_owner)?;
    Ok(CanonicalJson(json))
}

#[utoipa::path(
    get,
    path = "/v1/assets",
    tag = "Assets",
    responses((status = 200, body = [AssetEntry]))
)]
pub async fn get_all_assets(
    Invocation(ctx): Invocation,
    State(state): State<AppState>,
) -> Result<CanonicalJson, ApiError> {
    let json = state.ledger.get_all_assets(&ctx)?;
    Ok(CanonicalJson(json))
}

#[utoipa::path(
    get,
    path = "/v1/asset-pages",
    params(PageQuery),
    tag = "Assets",
    responses(
        (status = 200, body = AssetPage),
        (status = 400, description = "Invalid limit")
    )
)]
pub async fn get_assets_page(
    Invocation(ctx): Invocation,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<CanonicalJson, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit == 0 {
        return Err(ApiError::bad_request("limit must be at least 1"));
    }
    let page = state
        .ledger
        .get_assets_page(&ctx, query.cursor.as_deref(), limit)?;
    let json = canonical::encode_to_string(&page).map_err(LedgerError::from)?;
    Ok(CanonicalJson(json))
}

#[utoipa::path(
    post,
    path = "/v1/ledger/init",
    tag = "Ledger",
    responses((status = 200, body = InitLedgerResponse))
)]
pub async fn init_ledger(
    Invocation(ctx): Invocation,
    State(state): State<AppState>,
) -> Result<Json<InitLedgerResponse>, ApiError> {
    let seeded = state.ledger.init_ledger(&ctx)?;
    Ok(Json(InitLedgerResponse { seeded }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InvocationContext;
    use serde_json::Value;

    const USER1: &str = "x509::/C=US/O=Org1/OU=client/CN=User1::/C=US/CN=ca.org1.example.com";

    fn invocation() -> Invocation {
        Invocation(InvocationContext::system().with_identity(USER1))
    }

    fn anonymous() -> Invocation {
        Invocation(InvocationContext::system())
    }

    async fn seed(state: &AppState) {
        let Json(init) = init_ledger(anonymous(), State(state.clone()))
            .await
            .expect("ledger seeding succeeds");
        assert_eq!(init.seeded, 2);
    }

    fn create_request(document_no: &str) -> CreateAssetRequest {
        CreateAssetRequest {
            document_no: document_no.into(),
            document_name: "Lease".into(),
            document_type: "pdf".into(),
            document_size: "20 KB".into(),
            document_link: "https://example.org/lease".into(),
        }
    }

    #[tokio::test]
    async fn create_asset_success() {
        let state = AppState::default();

        let (status, CanonicalJson(body)) = create_asset(
            invocation(),
            State(state.clone()),
            Json(create_request("900")),
        )
        .await
        .expect("asset creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        let asset: Asset = serde_json::from_str(&body).unwrap();
        assert_eq!(asset.document_no, "900");
        assert_eq!(asset.owned_by.as_deref(), Some("User1"));

        let CanonicalJson(read) = read_asset(anonymous(), Path("900".into()), State(state))
            .await
            .unwrap();
        assert_eq!(read, body);
    }

    #[tokio::test]
    async fn create_asset_conflict_and_missing_identity() {
        let state = AppState::default();
        create_asset(invocation(), State(state.clone()), Json(create_request("900")))
            .await
            .unwrap();

        let err = create_asset(invocation(), State(state.clone()), Json(create_request("900")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = create_asset(anonymous(), State(state), Json(create_request("901")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "identity_format");
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let err = read_asset(anonymous(), Path("404".into()), State(AppState::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_delete_and_exists() {
        let state = AppState::default();
        create_asset(invocation(), State(state.clone()), Json(create_request("900")))
            .await
            .unwrap();

        let details = AssetDetails {
            document_name: "Lease v2".into(),
            ..AssetDetails::default()
        };
        let status = update_asset(
            invocation(),
            Path("900".into()),
            State(state.clone()),
            Json(details),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(exists) = asset_exists(anonymous(), Path("900".into()), State(state.clone()))
            .await
            .unwrap();
        assert!(exists.exists);

        let status = delete_asset(anonymous(), Path("900".into()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(exists) = asset_exists(anonymous(), Path("900".into()), State(state.clone()))
            .await
            .unwrap();
        assert!(!exists.exists);

        let err = delete_asset(anonymous(), Path("900".into()), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn init_then_transfer_then_list() {
        let state = AppState::default();
        seed(&state).await;

        let CanonicalJson(body) = transfer_asset(
            anonymous(),
            Path("671".into()),
            State(state.clone()),
            Json(TransferAssetRequest {
                new_owner: "User3".into(),
            }),
        )
        .await
        .unwrap();
        let asset: Asset = serde_json::from_str(&body).unwrap();
        assert_eq!(asset.owned_by.as_deref(), Some("User3"));

        let CanonicalJson(all) = get_all_assets(anonymous(), State(state)).await.unwrap();
        let all: Vec<Value> = serde_json::from_str(&all).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0]["ownedBy"], "User3");
        assert_eq!(all[1]["ownedBy"], "User2");
    }

    #[tokio::test]
    async fn transfer_to_empty_owner_is_bad_request() {
        let state = AppState::default();
        seed(&state).await;

        let err = transfer_asset(
            anonymous(),
            Path("671".into()),
            State(state),
            Json(TransferAssetRequest {
                new_owner: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pages_follow_the_cursor() {
        let state = AppState::default();
        seed(&state).await;

        let query = PageQuery {
            limit: Some(1),
            cursor: None,
        };
        let CanonicalJson(first) =
            get_assets_page(anonymous(), State(state.clone()), Query(query))
                .await
                .unwrap();
        let first: Value = serde_json::from_str(&first).unwrap();
        assert_eq!(first["records"][0]["documentNo"], "671");
        assert_eq!(first["nextCursor"], "671");

        let query = PageQuery {
            limit: Some(10),
            cursor: Some("671".into()),
        };
        let CanonicalJson(second) = get_assets_page(anonymous(), State(state.clone()), Query(query))
            .await
            .unwrap();
        let second: Value = serde_json::from_str(&second).unwrap();
        assert_eq!(second["records"].as_array().unwrap().len(), 1);
        assert_eq!(second["records"][0]["documentNo"], "672");
        assert!(second.get("nextCursor").is_none());

        let query = PageQuery {
            limit: Some(0),
            cursor: None,
        };
        let err = get_assets_page(anonymous(), State(state), Query(query))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn canonical_json_sets_content_type() {
        let response = CanonicalJson("[]".into()).into_response();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
