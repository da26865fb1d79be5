//! Axum router wiring for the exposition server.
//!
//! `/` renders the index; every registered handler is mounted at its path.
//! Routes are bounded by [`READ_TIMEOUT`] except self-bounded ones (the
//! exposition handler applies its own render timeout).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, response::Html, routing::get, Router};
use tower_http::timeout::TimeoutLayer;

use crate::{ops, server::Handler};

/// Upper bound for receiving a request and producing its response.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_router(handlers: &[Handler]) -> Router {
    let mut seen = HashSet::new();
    let mounted: Vec<&Handler> = handlers
        .iter()
        .filter(|h| {
            let ok = h.path != "/" && h.path.starts_with('/') && seen.insert(h.path.as_str());
            if !ok {
                tracing::error!(path = %h.path, "handler path rejected");
            }
            ok
        })
        .collect();

    let links: Vec<(&str, &str)> = mounted
        .iter()
        .map(|h| (h.path.as_str(), h.description.as_str()))
        .collect();
    let index: Arc<str> = ops::index_page("hookwatch", &links).into();

    let mut router = Router::new().route(
        "/",
        get(move || {
            let page = Arc::clone(&index);
            async move { Html(page.to_string()) }
        }),
    );
    for h in mounted.iter().filter(|h| !h.self_bounded) {
        router = router.route(&h.path, h.route.clone());
    }

    // route_layer only wraps the routes mounted so far.
    router = router.route_layer(TimeoutLayer::with_status_code(
        StatusCode::SERVICE_UNAVAILABLE,
        READ_TIMEOUT,
    ));
    for h in mounted.iter().filter(|h| h.self_bounded) {
        router = router.route(&h.path, h.route.clone());
    }
    router
}
