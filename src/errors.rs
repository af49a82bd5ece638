use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{error::DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::error;
use utoipa::ToSchema;

/// Field name to the list of messages describing what is wrong with it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Unprocessable Entity",
    "message": "The given data was invalid",
    "errors": { "quantity": ["quantity must be at least 1"] },
    "request_id": "3f1c2a8e-8a0c-4d6b-9a43-2f1f0f3c9b11",
    "timestamp": "2024-06-01T10:30:00+00:00"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Field-keyed validation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    /// Request identifier for support and debugging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

fn error_response(status: StatusCode, message: String, errors: Option<FieldErrors>) -> Response {
    let body = ErrorResponse {
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message,
        errors,
        request_id: current_request_id(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    (status, Json(body)).into_response()
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("The given data was invalid")]
    ValidationError(FieldErrors),

    #[error("Cannot {action} {entity} with status '{status}'")]
    InvalidTransition {
        entity: &'static str,
        status: String,
        action: String,
    },

    #[error("{0}")]
    Conflict(String),
}

impl ServiceError {
    /// Single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ServiceError::ValidationError(errors)
    }

    pub fn not_found(entity: &str, id: i32) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Maps constraint violations and lock contention onto client errors;
    /// everything else stays a database error.
    pub fn from_write(err: DbErr, conflict_message: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_))
            | Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                ServiceError::Conflict(conflict_message.into())
            }
            _ if crate::middleware_helpers::retry::is_lock_contention(&err) => {
                ServiceError::Conflict(
                    "The database is busy with another write; please retry".to_string(),
                )
            }
            _ => ServiceError::DatabaseError(err),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidTransition { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Database failures return a generic message; the detail only goes to the log.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(field_errors(&err))
    }
}

impl From<crate::models::TransitionError> for ServiceError {
    fn from(err: crate::models::TransitionError) -> Self {
        ServiceError::InvalidTransition {
            entity: err.entity,
            status: err.status,
            action: err.action,
        }
    }
}

/// Flattens validator output into the field-keyed map returned to clients
pub fn field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs.iter().map(|e| describe(field, e)).collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn describe(field: &str, err: &validator::ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    let param = |name: &str| {
        err.params.get(name).map(|v| match v.as_f64() {
            Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
            Some(n) => n.to_string(),
            None => v.to_string(),
        })
    };
    match err.code.as_ref() {
        "required" => format!("The {} field is required", field),
        "email" => format!("{} must be a valid email address", field),
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => {
                format!("{} must be between {} and {} characters", field, min, max)
            }
            (Some(min), None) if min == "1" => format!("The {} field is required", field),
            (Some(min), None) => format!("{} must be at least {} characters", field, min),
            (None, Some(max)) => format!("{} may not be greater than {} characters", field, max),
            _ => format!("{} has an invalid length", field),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{} must be between {} and {}", field, min, max),
            (Some(min), None) => format!("{} must be at least {}", field, min),
            (None, Some(max)) => format!("{} may not be greater than {}", field, max),
            _ => format!("{} is out of range", field),
        },
        code => format!("{} is invalid ({})", field, code),
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        match self {
            ServiceError::ValidationError(errors) => {
                error_response(status, "The given data was invalid".to_string(), Some(errors))
            }
            other => error_response(status, other.response_message(), None),
        }
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error")]
    ValidationError(FieldErrors),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(service_error) => service_error.into_response(),
            ApiError::ValidationError(errors) => error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "The given data was invalid".to_string(),
                Some(errors),
            ),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(field_errors(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    #[derive(Validate)]
    struct SampleInput {
        #[validate(length(min = 1, max = 5))]
        item: String,
        #[validate(range(min = 1))]
        quantity: i32,
        #[validate(email)]
        email: String,
    }

    async fn body_of(response: Response) -> ErrorResponse {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::not_found("Vendor", 9).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let payload = body_of(response).await;
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.message, "Vendor 9 not found");
    }

    #[tokio::test]
    async fn validation_error_renders_field_map() {
        let input = SampleInput {
            item: String::new(),
            quantity: 0,
            email: "nope".into(),
        };
        let err: ServiceError = input.validate().unwrap_err().into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let payload = body_of(response).await;
        let errors = payload.errors.expect("field errors");
        assert!(errors.contains_key("item"));
        assert_eq!(errors["quantity"], vec!["quantity must be at least 1"]);
        assert_eq!(errors["email"], vec!["email must be a valid email address"]);
    }

    #[tokio::test]
    async fn database_errors_do_not_leak_detail() {
        let response =
            ServiceError::DatabaseError(DbErr::Custom("no such table: secrets".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let payload = body_of(response).await;
        assert_eq!(payload.message, "Database error");
        assert!(payload.errors.is_none());
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::field("vendor_id", "missing").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::InvalidTransition {
                entity: "purchase order",
                status: "Draft".into(),
                action: "issue".into(),
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn transition_message_names_status_and_action() {
        let err = ServiceError::InvalidTransition {
            entity: "purchase order",
            status: "Draft".into(),
            action: "issue".into(),
        };
        assert_eq!(
            err.response_message(),
            "Cannot issue purchase order with status 'Draft'"
        );
    }

    #[tokio::test]
    async fn api_validation_error_renders_field_map() {
        let mut errors = FieldErrors::new();
        errors.insert("body".into(), vec!["expected value".into()]);
        let response = ApiError::ValidationError(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let payload = body_of(response).await;
        assert_eq!(payload.message, "The given data was invalid");
        assert_eq!(payload.errors.unwrap()["body"], vec!["expected value"]);
    }

    #[test]
    fn non_constraint_write_errors_stay_database_errors() {
        let err = ServiceError::from_write(DbErr::Custom("disk full".into()), "duplicate");
        assert!(matches!(err, ServiceError::DatabaseError(_)));
    }
}
