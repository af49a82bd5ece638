use super::common::{
    created_response, map_service_error, message_response, parse_json, parse_query,
    reject_status_field, require, success_response, validate_input, PaginationParams,
};
use crate::{
    commands::invoices::{CreateInvoiceCommand, PaymentDetails},
    errors::{ApiError, FieldErrors},
    handlers::AppState,
    models::{InvoiceAction, InvoiceStatus, PaymentMethod},
    services::invoices::{InvoiceChanges, InvoiceFilter},
};
use axum::{
    body::Bytes,
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
pub struct CreateInvoiceRequest {
    #[validate(required)]
    pub purchase_order_id: Option<i32>,
    /// Generated when omitted
    #[validate(length(min = 1, max = 50))]
    pub invoice_number: Option<String>,
    #[validate(required, custom = "crate::models::validate_non_negative")]
    pub amount: Option<Decimal>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub tax_amount: Option<Decimal>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub discount_amount: Option<Decimal>,
    /// Draft or Pending (default)
    pub status: Option<InvoiceStatus>,
    #[validate(required)]
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(max = 100))]
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceRequest {
    pub purchase_order_id: Option<i32>,
    #[validate(length(min = 1, max = 50))]
    pub invoice_number: Option<String>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub amount: Option<Decimal>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub tax_amount: Option<Decimal>,
    #[validate(custom = "crate::models::validate_non_negative")]
    pub discount_amount: Option<Decimal>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(max = 100))]
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    /// Rejected; use the transition endpoints
    #[schema(value_type = Option<String>)]
    pub status: Option<serde_json::Value>,
}

/// Optional body for the pay action
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PayInvoiceRequest {
    /// Defaults to today
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(max = 100))]
    pub reference_number: Option<String>,
}

/// List invoices
#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    params(PaginationParams, InvoiceFilter),
    responses(
        (status = 200, description = "Invoices listed", body = crate::ApiResponse<crate::PaginatedResponse<crate::services::invoices::InvoiceView>>),
        (status = 422, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
    filter: Result<Query<InvoiceFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let page = state.page(&parse_query(pagination)?);
    let invoices = state
        .services
        .invoices
        .list(parse_query(filter)?, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(invoices))
}

/// Create an invoice against an issued purchase order
#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = crate::ApiResponse<crate::services::invoices::InvoiceView>),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    payload: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;

    let command = CreateInvoiceCommand {
        purchase_order_id: require(payload.purchase_order_id, "purchase_order_id")?,
        invoice_number: payload.invoice_number,
        amount: require(payload.amount, "amount")?,
        tax_amount: payload.tax_amount.unwrap_or(Decimal::ZERO),
        discount_amount: payload.discount_amount.unwrap_or(Decimal::ZERO),
        status: payload.status.unwrap_or_default(),
        invoice_date: require(payload.invoice_date, "invoice_date")?,
        due_date: payload.due_date,
        payment_method: payload.payment_method,
        reference_number: payload.reference_number,
        notes: payload.notes,
    };
    let invoice = state
        .services
        .invoices
        .create(command)
        .await
        .map_err(map_service_error)?;

    info!(invoice_number = %invoice.invoice.invoice_number, "Invoice created");
    Ok(created_response(invoice))
}

/// Get an invoice with its purchase order
#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice fetched", body = crate::ApiResponse<crate::services::invoices::InvoiceDetail>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let detail = state
        .services
        .invoices
        .detail(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Update an invoice
#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = crate::ApiResponse<crate::services::invoices::InvoiceView>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice is paid or cancelled", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateInvoiceRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = parse_json(payload)?;
    validate_input(&payload)?;
    reject_status_field(&payload.status)?;

    let changes = InvoiceChanges {
        purchase_order_id: payload.purchase_order_id,
        invoice_number: payload.invoice_number,
        amount: payload.amount,
        tax_amount: payload.tax_amount,
        discount_amount: payload.discount_amount,
        invoice_date: payload.invoice_date,
        due_date: payload.due_date,
        payment_method: payload.payment_method,
        reference_number: payload.reference_number,
        notes: payload.notes,
    };
    let invoice = state
        .services
        .invoices
        .update(id, changes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(invoice))
}

/// Delete an invoice
#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice has been paid", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .invoices
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Invoice deleted successfully"))
}

async fn transition(
    state: AppState,
    id: i32,
    action: InvoiceAction,
    payment: PaymentDetails,
) -> Result<Response, ApiError> {
    let invoice = state
        .services
        .invoices
        .transition(id, action, payment)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(invoice))
}

/// Submit a draft invoice
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/submit",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice submitted", body = crate::ApiResponse<crate::services::invoices::InvoiceView>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn submit_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, InvoiceAction::Submit, PaymentDetails::default()).await
}

/// Record payment of an invoice
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/pay",
    params(("id" = i32, Path, description = "Invoice ID")),
    request_body(content = PayInvoiceRequest, description = "Optional payment details"),
    responses(
        (status = 200, description = "Invoice paid", body = crate::ApiResponse<crate::services::invoices::InvoiceView>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn pay_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: PayInvoiceRequest = if body.iter().all(u8::is_ascii_whitespace) {
        PayInvoiceRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.insert("body".to_string(), vec![e.to_string()]);
            ApiError::ValidationError(errors)
        })?
    };
    validate_input(&request)?;

    let payment = PaymentDetails {
        paid_date: request.paid_date,
        payment_method: request.payment_method,
        reference_number: request.reference_number,
    };
    transition(state, id, InvoiceAction::Pay, payment).await
}

/// Cancel an unpaid invoice
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/cancel",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice cancelled", body = crate::ApiResponse<crate::services::invoices::InvoiceView>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    transition(state, id, InvoiceAction::Cancel, PaymentDetails::default()).await
}

pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/:id/submit", post(submit_invoice).patch(submit_invoice))
        .route("/:id/pay", post(pay_invoice).patch(pay_invoice))
        .route("/:id/cancel", post(cancel_invoice).patch(cancel_invoice))
}
