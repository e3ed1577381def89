//! OpenAPI schemas for domain types.
//!
//! The domain error stays free of `utoipa`; these mirrors describe its wire
//! shape for the generated document.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The email or username is already in use.
    #[schema(rename = "conflict")]
    Conflict,
    /// The database is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message. Internal errors always read `Internal server error`.
    #[schema(example = "heart_rate must be a number")]
    message: String,
    /// Matches the `trace-id` response header.
    #[schema(example = "6f1c2a8e-8d4b-4a57-9c1e-3b2f0d9a7e11")]
    trace_id: Option<String>,
    /// Offending `field` and a machine-readable `code`, for validation failures.
    details: Option<serde_json::Value>,
}
