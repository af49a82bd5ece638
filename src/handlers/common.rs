use crate::{
    errors::{ApiError, FieldErrors, ServiceError},
    services::PageRequest,
    ApiResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Envelope with a message and no payload, used for deletes
pub fn message_response(message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiResponse::<()>::message(message.into()))).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input.validate().map_err(ApiError::from)
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

fn single_field(field: &str, message: impl Into<String>) -> ApiError {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    ApiError::ValidationError(errors)
}

/// Unwraps a JSON body, reporting malformed input under the `body` key.
pub fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| single_field("body", rejection.body_text()))
}

/// Unwraps query parameters, reporting bad filters under the `query` key.
pub fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| single_field("query", rejection.body_text()))
}

/// Reads a field that `#[validate(required)]` has already checked.
pub fn require<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| single_field(field, format!("The {} field is required", field)))
}

/// Status only changes through the transition endpoints.
pub fn reject_status_field(status: &Option<serde_json::Value>) -> Result<(), ApiError> {
    match status {
        Some(_) => Err(single_field(
            "status",
            "status cannot be changed directly; use the transition endpoints",
        )),
        None => Ok(()),
    }
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Items per page
    #[serde(alias = "limit")]
    pub per_page: Option<u64>,
}

impl PaginationParams {
    /// Applies the configured default and ceiling.
    pub fn resolve(&self, default_limit: u64, max_limit: u64) -> PageRequest {
        let limit = self
            .per_page
            .unwrap_or(default_limit)
            .clamp(1, max_limit.max(1));
        PageRequest::new(self.page.unwrap_or(1), limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let params = PaginationParams::default();
        assert_eq!(params.resolve(20, 100), PageRequest { page: 1, limit: 20 });

        let params = PaginationParams {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(params.resolve(20, 100), PageRequest { page: 1, limit: 100 });
    }

    #[test]
    fn missing_required_value_is_a_field_error() {
        match require::<i32>(None, "vendor_id") {
            Err(ApiError::ValidationError(errors)) => {
                assert_eq!(errors["vendor_id"], vec!["The vendor_id field is required"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(require(Some(3), "vendor_id").unwrap(), 3);
    }

    #[test]
    fn status_field_is_rejected() {
        assert!(reject_status_field(&None).is_ok());
        assert!(reject_status_field(&Some(serde_json::json!("Approved"))).is_err());
    }
}
