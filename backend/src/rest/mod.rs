//! JSON REST surface over the domain services.

pub mod code_apis;
pub mod expense_apis;
pub mod lookup_apis;
pub mod menu_apis;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use tracing::error;

use crate::config::Settings;
use crate::domain::errors::DomainError;
use crate::domain::{CodeService, ExpenseService, LookupService, MenuService};
use crate::storage::DbConnection;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub code_service: CodeService,
    pub menu_service: MenuService,
    pub expense_service: ExpenseService,
    pub lookup_service: LookupService,
}

impl AppState {
    pub fn new(db: DbConnection, settings: &Settings) -> Self {
        Self {
            code_service: CodeService::new(db.clone()),
            menu_service: MenuService::new(db.clone()),
            expense_service: ExpenseService::new(db.clone(), settings.employee.clone()),
            lookup_service: LookupService::new(db),
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = match &self {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::InvalidReference(_) | DomainError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::Internal(_) | DomainError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Unexpected failures are logged and hidden behind a generic message
        let message = match &self {
            DomainError::Internal(msg) => {
                error!("internal error: {}", msg);
                "internal server error".to_string()
            }
            DomainError::Database(err) => {
                error!("database error: {}", err);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// The API route table; the binary nests this under `/api`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/code/master",
            get(code_apis::list_master_codes).post(code_apis::create_master_code),
        )
        .route(
            "/code/master/:code",
            put(code_apis::update_master_code).delete(code_apis::delete_master_code),
        )
        .route("/code", get(code_apis::list_codes).post(code_apis::create_code))
        .route(
            "/code/:code",
            put(code_apis::update_code).delete(code_apis::delete_code),
        )
        .route("/menu", get(menu_apis::list_menus).post(menu_apis::create_menu))
        .route("/menu/tree", get(menu_apis::menu_tree))
        .route(
            "/menu/:id",
            put(menu_apis::update_menu).delete(menu_apis::delete_menu),
        )
        .route(
            "/expense/detail",
            get(expense_apis::list_details).post(expense_apis::create_detail),
        )
        .route("/expense/detail/delete", post(expense_apis::delete_details))
        .route(
            "/expense/detail/:id",
            patch(expense_apis::update_detail).delete(expense_apis::delete_detail),
        )
        .route(
            "/expense/group",
            get(expense_apis::list_groups).post(expense_apis::create_group),
        )
        .route("/expense/group/submit", post(expense_apis::submit_groups))
        .route(
            "/expense/group/:id",
            get(expense_apis::get_group).put(expense_apis::update_group),
        )
        .route(
            "/master/account",
            get(lookup_apis::list_accounts).post(lookup_apis::create_account),
        )
        .route(
            "/master/cost-center",
            get(lookup_apis::list_cost_centers).post(lookup_apis::create_cost_center),
        )
        .route(
            "/master/fund-center",
            get(lookup_apis::list_fund_centers).post(lookup_apis::create_fund_center),
        )
        .route(
            "/master/wbs",
            get(lookup_apis::list_wbs).post(lookup_apis::create_wbs),
        )
        .with_state(state)
}
