//! Trailing-slash redirect middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::filter::path::FilterPath;
use crate::observability::metrics;

/// Redirect requests for the bare mount path (`/ctx/app`) to `/ctx/app/`
/// before any handler runs.
pub async fn redirect_middleware(
    State(filter): State<Arc<FilterPath>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let uri = request.uri();
    let target = filter.check_if_redirect_required(uri.path(), uri.query().unwrap_or(""));

    match target {
        Some(location) => {
            tracing::debug!(from = %uri.path(), to = %location, "Redirecting to filter home");
            metrics::record_redirect();
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        None => next.run(request).await,
    }
}
