use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{extract::State, response::Response, routing::get, Router};

/// Procurement overview
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = crate::ApiResponse<crate::services::dashboard::DashboardSummary>)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Result<Response, ApiError> {
    let summary = state
        .services
        .dashboard
        .summary()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summary))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}
