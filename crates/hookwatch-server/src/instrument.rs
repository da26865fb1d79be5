//! HTTP server instrumentation.
//!
//! [`track_http`] records every request served by the router it wraps as an
//! "HTTP request" observation. The handler label is the matched route
//! template (`/repos/:owner`), never the raw path, so label cardinality stays
//! bounded by the number of routes.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};

use hookwatch_core::Provider;

/// Handler label for requests that matched no route.
pub const UNMATCHED: &str = "unmatched";

/// Wrap every route of `router` with [`track_http`].
pub fn instrument(router: Router, provider: Arc<Provider>) -> Router {
    router.layer(middleware::from_fn_with_state(provider, track_http))
}

pub async fn track_http(State(provider): State<Arc<Provider>>, req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let handler = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED.to_owned());

    let start = Instant::now();
    let resp = next.run(req).await;
    let elapsed = start.elapsed();

    let status = resp.status().as_u16();
    if let Err(e) = provider.record_http_request(&handler, &method, status, elapsed) {
        tracing::warn!(%method, %handler, status, error = %e, "http request metric dropped");
    }
    resp
}
