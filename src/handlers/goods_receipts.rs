use super::common::{
    created_response, map_service_error, message_response, parse_json, parse_query, require,
    success_response, validate_input, PaginationParams,
};
use crate::{
    commands::goods_receipts::CreateGoodsReceiptCommand,
    errors::ApiError,
    handlers::AppState,
    models::GoodsCondition,
    services::goods_receipts::{GoodsReceiptChanges, GoodsReceiptFilter},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    response::Response,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGoodsReceiptRequest {
    #[validate(required)]
    pub purchase_order_id: Option<i32>,
    #[validate(required)]
    pub received_date: Option<NaiveDate>,
    #[validate(required, range(min = 1))]
    pub quantity_received: Option<i32>,
    #[validate(required, length(min = 1, max = 255))]
    pub item: Option<String>,
    pub condition: Option<GoodsCondition>,
    #[validate(length(max = 255))]
    pub received_by: Option<String>,
    #[validate(length(max = 255))]
    pub warehouse_location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateGoodsReceiptRequest {
    pub purchase_order_id: Option<i32>,
    pub received_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub quantity_received: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub item: Option<String>,
    pub condition: Option<GoodsCondition>,
    #[validate(length(max = 255))]
    pub received_by: Option<String>,
    #[validate(length(max = 255))]
    pub warehouse_location: Option<String>,
    pub notes: Option<String>,
}

/// List goods receipts
#[utoipa::path(
    get,
    path = "/api/v1/goods-receipts",
    params(PaginationParams, GoodsReceiptFilter),
    responses(
        (status = 200, description = "Goods receipts listed", body = crate::ApiResponse<crate::PaginatedResponse<crate::models::goods_receipt::Model>>),
        (status = 422, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn list_goods_receipts(
    State(state): State<AppState>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
    filter: Result<Query<GoodsReceiptFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let page = state.page(&parse_query(pagination)?);
    let receipts = state
        .services
        .goods_receipts
        .list(parse_query(filter)?, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(receipts))
}

/// Record goods received against an issued purchase order
#[utoipa::path(
    post,
    path = "/api/v1/goods-receipts",
    request_body = CreateGoodsReceiptRequest,
    responses(
        (status = 201, description = "Goods receipt recorded", body = crate::ApiResponse<crate::models::goods_receipt::Model>),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn create_goods_receipt(
    State(state): State<AppState>,
    payload: Result<Json<CreateGoodsReceiptRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;

    let command = CreateGoodsReceiptCommand {
        purchase_order_id: require(payload.purchase_order_id, "purchase_order_id")?,
        received_date: require(payload.received_date, "received_date")?,
        quantity_received: require(payload.quantity_received, "quantity_received")?,
        item: require(payload.item, "item")?,
        condition: payload.condition.unwrap_or_default(),
        received_by: payload.received_by,
        warehouse_location: payload.warehouse_location,
        notes: payload.notes,
    };
    let receipt = state
        .services
        .goods_receipts
        .create(command)
        .await
        .map_err(map_service_error)?;

    info!(receipt_number = %receipt.receipt_number, "Goods receipt created");
    Ok(created_response(receipt))
}

/// Get a goods receipt with its purchase order
#[utoipa::path(
    get,
    path = "/api/v1/goods-receipts/{id}",
    params(("id" = i32, Path, description = "Goods receipt ID")),
    responses(
        (status = 200, description = "Goods receipt fetched", body = crate::ApiResponse<crate::services::goods_receipts::GoodsReceiptDetail>),
        (status = 404, description = "Goods receipt not found", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn get_goods_receipt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let detail = state
        .services
        .goods_receipts
        .detail(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Update a goods receipt
#[utoipa::path(
    put,
    path = "/api/v1/goods-receipts/{id}",
    params(("id" = i32, Path, description = "Goods receipt ID")),
    request_body = UpdateGoodsReceiptRequest,
    responses(
        (status = 200, description = "Goods receipt updated", body = crate::ApiResponse<crate::models::goods_receipt::Model>),
        (status = 404, description = "Goods receipt not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn update_goods_receipt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateGoodsReceiptRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;

    let changes = GoodsReceiptChanges {
        purchase_order_id: payload.purchase_order_id,
        received_date: payload.received_date,
        quantity_received: payload.quantity_received,
        item: payload.item,
        condition: payload.condition,
        received_by: payload.received_by,
        warehouse_location: payload.warehouse_location,
        notes: payload.notes,
    };
    let receipt = state
        .services
        .goods_receipts
        .update(id, changes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(receipt))
}

/// Delete a goods receipt
#[utoipa::path(
    delete,
    path = "/api/v1/goods-receipts/{id}",
    params(("id" = i32, Path, description = "Goods receipt ID")),
    responses(
        (status = 200, description = "Goods receipt deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Goods receipt not found", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn delete_goods_receipt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .goods_receipts
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Goods receipt deleted successfully"))
}

pub fn goods_receipt_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goods_receipts).post(create_goods_receipt))
        .route(
            "/:id",
            get(get_goods_receipt)
                .put(update_goods_receipt)
                .delete(delete_goods_receipt),
        )
}
