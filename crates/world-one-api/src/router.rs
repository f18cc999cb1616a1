//! Axum router construction for the era API.
//!
//! Every request gets an `x-request-id` (generated when the client sent
//! none) that is recorded on the request span and echoed in the response.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::backend::EraBackend;
use crate::handlers;
use crate::state::AppState;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the complete Axum router for the era API.
///
/// The router includes:
/// - `GET /api/v1/eras` -- list eras
/// - `GET /api/v1/eras/current` -- current era
/// - `POST /api/v1/eras/rollover` -- close the current era and open a new one
pub fn build_router<B: EraBackend>(state: Arc<AppState<B>>) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id
        )
    });

    Router::new()
        .route("/api/v1/eras", get(handlers::list_eras::<B>))
        .route("/api/v1/eras/current", get(handlers::current_era::<B>))
        .route("/api/v1/eras/rollover", post(handlers::rollover::<B>))
        // Outermost last: the id is set before the span opens.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
