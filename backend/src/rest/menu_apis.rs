//! Handlers for the navigation menu.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use crate::rest::AppState;
use shared::{CreateMenuRequest, UpdateMenuRequest};

pub async fn list_menus(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/menu");

    match state.menu_service.list_menus().await {
        Ok(menus) => (StatusCode::OK, Json(menus)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuTreeQuery {
    #[serde(rename = "type")]
    pub menu_type: Option<String>,
    #[serde(rename = "activeOnly")]
    pub active_only: Option<bool>,
}

pub async fn menu_tree(
    State(state): State<AppState>,
    Query(query): Query<MenuTreeQuery>,
) -> impl IntoResponse {
    info!("GET /api/menu/tree - query: {:?}", query);

    let result = state
        .menu_service
        .menu_tree(query.menu_type.as_deref(), query.active_only.unwrap_or(false))
        .await;

    match result {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_menu(
    State(state): State<AppState>,
    Json(request): Json<CreateMenuRequest>,
) -> impl IntoResponse {
    info!("POST /api/menu - request: {:?}", request);

    match state.menu_service.create_menu(request).await {
        Ok(menu) => (StatusCode::CREATED, Json(menu)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMenuRequest>,
) -> impl IntoResponse {
    info!("PUT /api/menu/{} - request: {:?}", id, request);

    match state.menu_service.update_menu(&id, request).await {
        Ok(menu) => (StatusCode::OK, Json(menu)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/menu/{}", id);

    match state.menu_service.delete_menu(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
