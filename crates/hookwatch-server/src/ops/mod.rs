//! Operational HTTP endpoints.
//!
//! - `/`         : index page linking every registered handler
//! - `/metrics`  : Prometheus text format (OpenMetrics on request)
//! - `/debug/..` : diagnostic handlers, see [`debug`]

pub mod debug;

use std::fmt::Write;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::task::JoinError;

use hookwatch_core::{Format, Provider, METRICS_PATH};

use crate::server::Handler;

/// Upper bound on rendering one scrape.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Exposition handler registration for `provider`.
pub fn metrics_handler(provider: Arc<Provider>) -> Handler {
    Handler::new(
        METRICS_PATH,
        "Prometheus metrics",
        get(move |headers: HeaderMap| metrics(Arc::clone(&provider), headers)),
    )
    .self_bounded()
}

pub async fn metrics(provider: Arc<Provider>, headers: HeaderMap) -> Response {
    let format = Format::negotiate(
        headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok()),
    );

    render_response(format, tokio::task::spawn_blocking(move || provider.render(format))).await
}

/// Await `render` for at most [`RENDER_TIMEOUT`] and wrap the body for `format`.
pub async fn render_response<F>(format: Format, render: F) -> Response
where
    F: Future<Output = Result<String, JoinError>>,
{
    match tokio::time::timeout(RENDER_TIMEOUT, render).await {
        Ok(Ok(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, format.content_type())],
            body,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "metrics render task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "render failed").into_response()
        }
        Err(_) => {
            tracing::warn!(timeout = ?RENDER_TIMEOUT, "metrics render timed out");
            (StatusCode::SERVICE_UNAVAILABLE, "render timed out").into_response()
        }
    }
}

/// HTML index with one link per `(path, description)`.
pub fn index_page(title: &str, links: &[(&str, &str)]) -> String {
    let title = escape_html(title);
    let mut out = String::new();
    let _ = writeln!(out, "<html>");
    let _ = writeln!(out, "<head><title>{title}</title></head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<h1>{title}</h1>");
    let _ = writeln!(out, "<ul>");
    for (path, description) in links {
        let _ = writeln!(
            out,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(path),
            escape_html(description)
        );
    }
    let _ = writeln!(out, "</ul>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
