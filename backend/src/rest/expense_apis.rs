//! Handlers for expense details and settlement documents.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use crate::rest::AppState;
use crate::storage::repositories::DetailFilter;
use shared::{
    CreateDetailRequest, DeleteDetailsRequest, SaveGroupRequest, SubmitGroupsRequest,
    UpdateDetailRequest,
};

#[derive(Debug, Deserialize)]
pub struct DetailListQuery {
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
}

pub async fn list_details(
    State(state): State<AppState>,
    Query(query): Query<DetailListQuery>,
) -> impl IntoResponse {
    info!("GET /api/expense/detail - query: {:?}", query);

    // An absent or literal "null" group id selects the unassigned pool
    let filter = match query.group_id.as_deref() {
        None | Some("null") | Some("") => DetailFilter::Unassigned,
        Some(group_id) => DetailFilter::Group(group_id.to_string()),
    };

    match state.expense_service.list_details(&filter).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_detail(
    State(state): State<AppState>,
    Json(request): Json<CreateDetailRequest>,
) -> impl IntoResponse {
    info!("POST /api/expense/detail - request: {:?}", request);

    match state.expense_service.create_detail(request).await {
        Ok(detail) => (StatusCode::CREATED, Json(detail)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDetailRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/expense/detail/{} - request: {:?}", id, request);

    match state.expense_service.update_detail(&id, request).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expense/detail/{}", id);

    match state.expense_service.delete_detail(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_details(
    State(state): State<AppState>,
    Json(request): Json<DeleteDetailsRequest>,
) -> impl IntoResponse {
    info!("POST /api/expense/detail/delete - {} ids", request.ids.len());

    match state.expense_service.delete_details(request).await {
        Ok(response) => {
            let status = if response.applied {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn list_groups(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/expense/group");

    match state.expense_service.list_groups().await {
        Ok(groups) => (StatusCode::OK, Json(groups)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/expense/group/{}", id);

    match state.expense_service.get_group(&id).await {
        Ok(group) => (StatusCode::OK, Json(group)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<SaveGroupRequest>,
) -> impl IntoResponse {
    info!("POST /api/expense/group - request: {:?}", request);

    match state.expense_service.create_group(request).await {
        Ok(group) => (StatusCode::CREATED, Json(group)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SaveGroupRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expense/group/{} - request: {:?}", id, request);

    match state.expense_service.update_group(&id, request).await {
        Ok(group) => (StatusCode::OK, Json(group)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn submit_groups(
    State(state): State<AppState>,
    Json(request): Json<SubmitGroupsRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/expense/group/submit - {} groups, posting date {}",
        request.group_ids.len(),
        request.posting_date
    );

    match state.expense_service.submit_groups(request).await {
        Ok(response) => {
            let status = if response.applied {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
