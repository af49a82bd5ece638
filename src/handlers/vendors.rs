use super::common::{
    created_response, map_service_error, message_response, parse_json, parse_query, require,
    success_response, validate_input, PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::vendors::{NewVendor, VendorChanges, VendorFilter},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    response::Response,
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(required, length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = 255))]
    pub contact: Option<String>,
    #[validate(required, email, length(max = 255))]
    pub email: Option<String>,
    #[validate(required, length(min = 1, max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    #[validate(custom = "crate::models::validate_rating")]
    pub rating: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub contact: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    #[validate(custom = "crate::models::validate_rating")]
    pub rating: Option<Decimal>,
}

/// Out-of-range ratings are clamped rather than rejected.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RateVendorRequest {
    #[validate(required)]
    pub rating: Option<Decimal>,
}

/// List vendors
#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    params(PaginationParams, VendorFilter),
    responses(
        (status = 200, description = "Vendors listed", body = crate::ApiResponse<crate::PaginatedResponse<crate::models::vendor::Model>>),
        (status = 422, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
    filter: Result<Query<VendorFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let page = state.page(&parse_query(pagination)?);
    let vendors = state
        .services
        .vendors
        .list(parse_query(filter)?, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendors))
}

/// Create a vendor
#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = crate::ApiResponse<crate::models::vendor::Model>),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    payload: Result<Json<CreateVendorRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;

    let input = NewVendor {
        name: require(payload.name, "name")?,
        contact: require(payload.contact, "contact")?,
        email: require(payload.email, "email")?,
        phone: require(payload.phone, "phone")?,
        address: payload.address,
        is_active: payload.is_active.unwrap_or(true),
        rating: payload.rating.unwrap_or(Decimal::ZERO),
    };
    let vendor = state
        .services
        .vendors
        .create(input)
        .await
        .map_err(map_service_error)?;

    info!(vendor_id = vendor.id, "Vendor created");
    Ok(created_response(vendor))
}

/// Get a vendor with its purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor fetched", body = crate::ApiResponse<crate::services::vendors::VendorDetail>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let detail = state
        .services
        .vendors
        .detail(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Update a vendor
#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}",
    params(("id" = i32, Path, description = "Vendor ID")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated", body = crate::ApiResponse<crate::models::vendor::Model>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateVendorRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;

    let changes = VendorChanges {
        name: payload.name,
        contact: payload.contact,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        is_active: payload.is_active,
        rating: payload.rating,
    };
    let vendor = state
        .services
        .vendors
        .update(id, changes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

/// Delete a vendor
#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{id}",
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Vendor has purchase orders", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .vendors
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Vendor deleted successfully"))
}

/// Activate a vendor
#[utoipa::path(
    post,
    path = "/api/v1/vendors/{id}/activate",
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor activated", body = crate::ApiResponse<crate::models::vendor::Model>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn activate_vendor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let vendor = state
        .services
        .vendors
        .set_active(id, true)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

/// Deactivate a vendor
#[utoipa::path(
    post,
    path = "/api/v1/vendors/{id}/deactivate",
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deactivated", body = crate::ApiResponse<crate::models::vendor::Model>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn deactivate_vendor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let vendor = state
        .services
        .vendors
        .set_active(id, false)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

/// Set a vendor's rating, clamped to 0-5
#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}/rating",
    params(("id" = i32, Path, description = "Vendor ID")),
    request_body = RateVendorRequest,
    responses(
        (status = 200, description = "Rating stored", body = crate::ApiResponse<crate::models::vendor::Model>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn rate_vendor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<RateVendorRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;
    let vendor = state
        .services
        .vendors
        .set_rating(id, require(payload.rating, "rating")?)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendors).post(create_vendor))
        .route(
            "/:id",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
        .route("/:id/activate", post(activate_vendor).patch(activate_vendor))
        .route("/:id/deactivate", post(deactivate_vendor).patch(deactivate_vendor))
        .route("/:id/rating", put(rate_vendor))
}
