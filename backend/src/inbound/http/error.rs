//! HTTP mapping for domain errors.
//!
//! Every failure leaves as the JSON error envelope with a status derived from
//! its code. Internal errors are logged in full and redacted for clients.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let trace_id = self.trace_id();
        match self.code() {
            ErrorCode::ServiceUnavailable => {
                warn!(message = self.message(), trace_id = ?trace_id, "dependency unavailable");
            }
            ErrorCode::InternalError => {
                error!(message = self.message(), details = ?self.details(), trace_id = ?trace_id, "internal error");
            }
            _ => {}
        }

        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = trace_id {
            response.insert_header((TRACE_ID_HEADER, id.to_string()));
        }
        response.json(self.redacted())
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("")
    }
}
