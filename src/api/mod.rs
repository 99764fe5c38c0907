// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ledger::{Asset, AssetDetails, AssetEntry, AssetPage},
    models::{CreateAssetRequest, ExistsResponse, InitLedgerResponse, TransferAssetRequest},
    state::AppState,
};

pub mod assets;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/assets",
            get(assets::get_all_assets).post(assets::create_asset),
        )
        .route("/asset-pages", get(assets::get_assets_page))
        .route(
            "/assets/{document_no}",
            get(assets::read_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/assets/{document_no}/exists", get(assets::asset_exists))
        .route(
            "/assets/{document_no}/transfer",
            post(assets::transfer_asset),
        )
        .route("/ledger/init", post(assets::init_ledger))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        assets::create_asset,
        assets::read_asset,
        assets::update_asset,
        assets::delete_asset,
        assets::asset_exists,
        assets::transfer_asset,
        assets::get_all_assets,
        assets::get_assets_page,
        assets::init_ledger,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Asset,
            AssetDetails,
            AssetEntry,
            AssetPage,
            CreateAssetRequest,
            TransferAssetRequest,
            ExistsResponse,
            InitLedgerResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Assets", description = "Asset lifecycle operations"),
        (name = "Ledger", description = "Ledger bootstrap"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
