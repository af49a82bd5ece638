use super::common::{
    created_response, map_service_error, message_response, parse_json, parse_query,
    reject_status_field, require, success_response, validate_input, PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::{Priority, RequisitionAction, RequisitionStatus},
    services::requisitions::{NewRequisition, RequisitionChanges, RequisitionFilter},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRequisitionRequest {
    #[validate(required, length(min = 1, max = 255))]
    pub item: Option<String>,
    #[validate(required, range(min = 1))]
    pub quantity: Option<i32>,
    #[serde(alias = "requestedBy")]
    #[validate(required, length(min = 1, max = 255))]
    pub requested_by: Option<String>,
    #[validate(required)]
    pub date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub estimated_cost: Option<Decimal>,
    pub description: Option<String>,
    /// Optional; new requisitions are always Pending
    pub status: Option<RequisitionStatus>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRequisitionRequest {
    #[validate(length(min = 1, max = 255))]
    pub item: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    #[serde(alias = "requestedBy")]
    #[validate(length(min = 1, max = 255))]
    pub requested_by: Option<String>,
    pub date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub estimated_cost: Option<Decimal>,
    pub description: Option<String>,
    /// Rejected; use the approve / reject endpoints
    #[schema(value_type = Option<String>)]
    pub status: Option<serde_json::Value>,
}

/// List requisitions
#[utoipa::path(
    get,
    path = "/api/v1/requisitions",
    params(PaginationParams, RequisitionFilter),
    responses(
        (status = 200, description = "Requisitions listed", body = crate::ApiResponse<crate::PaginatedResponse<crate::models::requisition::Model>>),
        (status = 422, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn list_requisitions(
    State(state): State<AppState>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
    filter: Result<Query<RequisitionFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let page = state.page(&parse_query(pagination)?);
    let filter = parse_query(filter)?;
    let requisitions = state
        .services
        .requisitions
        .list(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(requisitions))
}

/// Create a requisition
#[utoipa::path(
    post,
    path = "/api/v1/requisitions",
    request_body = CreateRequisitionRequest,
    responses(
        (status = 201, description = "Requisition created", body = crate::ApiResponse<crate::models::requisition::Model>),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn create_requisition(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequisitionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;
    if matches!(payload.status, Some(status) if status != RequisitionStatus::Pending) {
        return Err(crate::errors::ServiceError::field(
            "status",
            "New requisitions start as Pending",
        )
        .into());
    }

    let input = NewRequisition {
        item: require(payload.item, "item")?,
        quantity: require(payload.quantity, "quantity")?,
        requested_by: require(payload.requested_by, "requested_by")?,
        date: require(payload.date, "date")?,
        priority: payload.priority.unwrap_or_default(),
        estimated_cost: payload.estimated_cost,
        description: payload.description,
    };

    let requisition = state
        .services
        .requisitions
        .create(input)
        .await
        .map_err(map_service_error)?;

    info!(requisition_id = requisition.id, "Requisition created");
    Ok(created_response(requisition))
}

/// Get a requisition with its purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/requisitions/{id}",
    params(("id" = i32, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition fetched", body = crate::ApiResponse<crate::services::requisitions::RequisitionDetail>),
        (status = 404, description = "Requisition not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn get_requisition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let detail = state
        .services
        .requisitions
        .detail(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Update a requisition
#[utoipa::path(
    put,
    path = "/api/v1/requisitions/{id}",
    params(("id" = i32, Path, description = "Requisition ID")),
    request_body = UpdateRequisitionRequest,
    responses(
        (status = 200, description = "Requisition updated", body = crate::ApiResponse<crate::models::requisition::Model>),
        (status = 404, description = "Requisition not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn update_requisition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateRequisitionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;
    reject_status_field(&payload.status)?;

    let changes = RequisitionChanges {
        item: payload.item,
        quantity: payload.quantity,
        requested_by: payload.requested_by,
        date: payload.date,
        priority: payload.priority,
        estimated_cost: payload.estimated_cost,
        description: payload.description,
    };
    let requisition = state
        .services
        .requisitions
        .update(id, changes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(requisition))
}

/// Delete a requisition
#[utoipa::path(
    delete,
    path = "/api/v1/requisitions/{id}",
    params(("id" = i32, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Requisition not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Requisition has purchase orders", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn delete_requisition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .requisitions
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Requisition deleted successfully"))
}

async fn transition(state: AppState, id: i32, action: RequisitionAction) -> Result<Response, ApiError> {
    let requisition = state
        .services
        .requisitions
        .transition(id, action)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(requisition))
}

/// Approve a pending requisition
#[utoipa::path(
    post,
    path = "/api/v1/requisitions/{id}/approve",
    params(("id" = i32, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition approved", body = crate::ApiResponse<crate::models::requisition::Model>),
        (status = 404, description = "Requisition not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Requisition is not pending", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn approve_requisition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, RequisitionAction::Approve).await
}

/// Reject a pending requisition
#[utoipa::path(
    post,
    path = "/api/v1/requisitions/{id}/reject",
    params(("id" = i32, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition rejected", body = crate::ApiResponse<crate::models::requisition::Model>),
        (status = 404, description = "Requisition not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Requisition is not pending", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn reject_requisition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, RequisitionAction::Reject).await
}

pub fn requisition_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requisitions).post(create_requisition))
        .route(
            "/:id",
            get(get_requisition)
                .put(update_requisition)
                .delete(delete_requisition),
        )
        .route("/:id/approve", post(approve_requisition).patch(approve_requisition))
        .route("/:id/reject", post(reject_requisition).patch(reject_requisition))
}
