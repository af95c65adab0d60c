//! Handlers for the master-code/code catalog.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use crate::rest::AppState;
use shared::{
    CreateCodeRequest, CreateMasterCodeRequest, UpdateCodeRequest, UpdateMasterCodeRequest,
};

pub async fn list_master_codes(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/code/master");

    match state.code_service.list_master_codes().await {
        Ok(masters) => (StatusCode::OK, Json(masters)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_master_code(
    State(state): State<AppState>,
    Json(request): Json<CreateMasterCodeRequest>,
) -> impl IntoResponse {
    info!("POST /api/code/master - request: {:?}", request);

    match state.code_service.create_master_code(request).await {
        Ok(master) => (StatusCode::CREATED, Json(master)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_master_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<UpdateMasterCodeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/code/master/{} - request: {:?}", code, request);

    match state.code_service.update_master_code(&code, request).await {
        Ok(master) => (StatusCode::OK, Json(master)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_master_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/code/master/{}", code);

    match state.code_service.delete_master_code(&code).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CodeListQuery {
    #[serde(rename = "masterCode")]
    pub master_code: Option<String>,
}

pub async fn list_codes(
    State(state): State<AppState>,
    Query(query): Query<CodeListQuery>,
) -> impl IntoResponse {
    info!("GET /api/code - query: {:?}", query);

    let Some(master_code) = query.master_code.filter(|m| !m.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "masterCode parameter is required" })),
        )
            .into_response();
    };

    match state.code_service.list_codes(&master_code).await {
        Ok(codes) => (StatusCode::OK, Json(codes)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_code(
    State(state): State<AppState>,
    Json(request): Json<CreateCodeRequest>,
) -> impl IntoResponse {
    info!("POST /api/code - request: {:?}", request);

    match state.code_service.create_code(request).await {
        Ok(code) => (StatusCode::CREATED, Json(code)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<UpdateCodeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/code/{} - request: {:?}", code, request);

    match state.code_service.update_code(&code, request).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/code/{}", code);

    match state.code_service.delete_code(&code).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
