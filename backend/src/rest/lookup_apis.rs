//! Handlers for the read-mostly lookup catalogs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::info;

use crate::rest::AppState;
use crate::storage::repositories::LookupKind;
use shared::CreateLookupRequest;

async fn list(state: AppState, kind: LookupKind, route: &str) -> Response {
    info!("GET /api/master/{}", route);

    match state.lookup_service.list(kind).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create(
    state: AppState,
    kind: LookupKind,
    route: &str,
    request: CreateLookupRequest,
) -> Response {
    info!("POST /api/master/{} - request: {:?}", route, request);

    match state.lookup_service.create(kind, request).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    list(state, LookupKind::Account, "account").await
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateLookupRequest>,
) -> impl IntoResponse {
    create(state, LookupKind::Account, "account", request).await
}

pub async fn list_cost_centers(State(state): State<AppState>) -> impl IntoResponse {
    list(state, LookupKind::CostCenter, "cost-center").await
}

pub async fn create_cost_center(
    State(state): State<AppState>,
    Json(request): Json<CreateLookupRequest>,
) -> impl IntoResponse {
    create(state, LookupKind::CostCenter, "cost-center", request).await
}

pub async fn list_fund_centers(State(state): State<AppState>) -> impl IntoResponse {
    list(state, LookupKind::FundCenter, "fund-center").await
}

pub async fn create_fund_center(
    State(state): State<AppState>,
    Json(request): Json<CreateLookupRequest>,
) -> impl IntoResponse {
    create(state, LookupKind::FundCenter, "fund-center", request).await
}

pub async fn list_wbs(State(state): State<AppState>) -> impl IntoResponse {
    list(state, LookupKind::Wbs, "wbs").await
}

pub async fn create_wbs(
    State(state): State<AppState>,
    Json(request): Json<CreateLookupRequest>,
) -> impl IntoResponse {
    create(state, LookupKind::Wbs, "wbs", request).await
}
