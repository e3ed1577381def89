//! Request tracing middleware.
//!
//! Every request runs inside a fresh [`TraceId`] scope. The identifier is
//! echoed in the `trace-id` response header, picked up by domain errors built
//! during the request, and attached to a single `request completed` event.

use std::time::Instant;

use actix_web::Error;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use tracing::{info, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Scope the request under a new [`TraceId`] and log its outcome.
///
/// Install with [`actix_web::middleware::from_fn`].
///
/// # Examples
/// ```
/// use actix_web::{App, middleware::from_fn};
/// use backend::trace_requests;
///
/// let app = App::new().wrap(from_fn(trace_requests));
/// ```
pub async fn trace_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let trace_id = TraceId::generate();
    let method = req.method().clone();
    let path = req.path().to_owned();
    let started = Instant::now();

    let mut res = TraceId::scope(trace_id, next.call(req)).await?;

    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        res.headers_mut()
            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    } else {
        warn!(%trace_id, "trace id is not a valid header value");
    }
    info!(
        %trace_id,
        %method,
        path,
        status = res.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis(),
        "request completed"
    );
    Ok(res)
}
