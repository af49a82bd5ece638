use super::common::{
    created_response, map_service_error, message_response, parse_json, parse_query,
    reject_status_field, require, success_response, validate_input, PaginationParams,
};
use crate::{
    commands::purchase_orders::CreatePurchaseOrderCommand,
    errors::ApiError,
    handlers::AppState,
    models::{PurchaseOrderAction, PurchaseOrderStatus},
    services::purchase_orders::{PurchaseOrderChanges, PurchaseOrderFilter},
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

// Request DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    #[validate(required)]
    pub requisition_id: Option<i32>,
    #[validate(required)]
    pub vendor_id: Option<i32>,
    #[validate(required, custom = "crate::models::validate_non_negative")]
    pub total_amount: Option<Decimal>,
    /// Draft or Pending Approval (default)
    pub status: Option<PurchaseOrderStatus>,
    #[validate(required)]
    pub order_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    pub requisition_id: Option<i32>,
    pub vendor_id: Option<i32>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub total_amount: Option<Decimal>,
    pub order_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Rejected; use the transition endpoints
    #[schema(value_type = Option<String>)]
    pub status: Option<serde_json::Value>,
}

// Handler functions

/// List purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(PaginationParams, PurchaseOrderFilter),
    responses(
        (status = 200, description = "Purchase orders listed", body = crate::ApiResponse<crate::PaginatedResponse<crate::models::purchase_order::Model>>),
        (status = 422, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
    filter: Result<Query<PurchaseOrderFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let page = state.page(&parse_query(pagination)?);
    let orders = state
        .services
        .purchase_orders
        .list(parse_query(filter)?, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

/// Create a purchase order against an approved requisition
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created", body = crate::ApiResponse<crate::models::purchase_order::Model>),
        (status = 409, description = "Order number collision", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    payload: Result<Json<CreatePurchaseOrderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;

    let command = CreatePurchaseOrderCommand {
        requisition_id: require(payload.requisition_id, "requisition_id")?,
        vendor_id: require(payload.vendor_id, "vendor_id")?,
        total_amount: require(payload.total_amount, "total_amount")?,
        status: payload.status.unwrap_or_default(),
        order_date: require(payload.order_date, "order_date")?,
        expected_delivery_date: payload.expected_delivery_date,
        notes: payload.notes,
    };

    let order = state
        .services
        .purchase_orders
        .create(command)
        .await
        .map_err(map_service_error)?;

    info!(order_number = %order.order_number, "Purchase order created");
    Ok(created_response(order))
}

/// Get a purchase order with its requisition, vendor, receipts and invoices
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order fetched", body = crate::ApiResponse<crate::services::purchase_orders::PurchaseOrderDetail>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let detail = state
        .services
        .purchase_orders
        .detail(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Update a purchase order
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i32, Path, description = "Purchase order ID")),
    request_body = UpdatePurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order updated", body = crate::ApiResponse<crate::models::purchase_order::Model>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Purchase order is completed or cancelled", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdatePurchaseOrderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;
    reject_status_field(&payload.status)?;

    let changes = PurchaseOrderChanges {
        requisition_id: payload.requisition_id,
        vendor_id: payload.vendor_id,
        total_amount: payload.total_amount,
        order_date: payload.order_date,
        expected_delivery_date: payload.expected_delivery_date,
        notes: payload.notes,
    };
    let order = state
        .services
        .purchase_orders
        .update(id, changes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// Delete a purchase order
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Purchase order has receipts or invoices", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .purchase_orders
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Purchase order deleted successfully"))
}

async fn transition(
    state: AppState,
    id: i32,
    action: PurchaseOrderAction,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .purchase_orders
        .transition(id, action)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// Submit a draft purchase order for approval
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/submit",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order submitted", body = crate::ApiResponse<crate::models::purchase_order::Model>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn submit_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, PurchaseOrderAction::Submit).await
}

/// Approve a purchase order pending approval
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/approve",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order approved", body = crate::ApiResponse<crate::models::purchase_order::Model>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn approve_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, PurchaseOrderAction::Approve).await
}

/// Issue an approved purchase order to the vendor
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/issue",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order issued", body = crate::ApiResponse<crate::models::purchase_order::Model>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn issue_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, PurchaseOrderAction::Issue).await
}

/// Mark an issued purchase order as completed
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/complete",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order completed", body = crate::ApiResponse<crate::models::purchase_order::Model>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn complete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, PurchaseOrderAction::Complete).await
}

/// Cancel a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/cancel",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order cancelled", body = crate::ApiResponse<crate::models::purchase_order::Model>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, PurchaseOrderAction::Cancel).await
}

pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route(
            "/:id",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
        .route("/:id/submit", post(submit_purchase_order).patch(submit_purchase_order))
        .route("/:id/approve", post(approve_purchase_order).patch(approve_purchase_order))
        .route("/:id/issue", post(issue_purchase_order).patch(issue_purchase_order))
        .route("/:id/complete", post(complete_purchase_order).patch(complete_purchase_order))
        .route("/:id/cancel", post(cancel_purchase_order).patch(cancel_purchase_order))
}
