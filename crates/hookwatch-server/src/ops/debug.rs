//! Diagnostic handlers under `/debug/pprof/`.
//!
//! There is no in-process profiler; each endpoint answers with a plain-text
//! introspection report built from the tokio runtime and `/proc/self/status`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::server::Handler;

const PROFILES: &[(&str, &str)] = &[
    ("/debug/pprof/cmdline", "Process command line"),
    ("/debug/pprof/symbol", "Symbol lookup"),
    ("/debug/pprof/goroutine", "Runtime task dump"),
    ("/debug/pprof/heap", "Memory snapshot"),
    ("/debug/pprof/threadcreate", "Thread creation"),
    ("/debug/pprof/block", "Blocking profile"),
];

/// Every diagnostic handler, index first.
pub fn handlers() -> Vec<Handler> {
    vec![
        Handler::new("/debug/pprof/", "Profiling index", get(index)),
        Handler::new(PROFILES[0].0, PROFILES[0].1, get(cmdline)),
        Handler::new(PROFILES[1].0, PROFILES[1].1, get(symbol)),
        Handler::new(PROFILES[2].0, PROFILES[2].1, get(tasks)),
        Handler::new(PROFILES[3].0, PROFILES[3].1, get(heap)),
        Handler::new(PROFILES[4].0, PROFILES[4].1, get(threadcreate)),
        Handler::new(PROFILES[5].0, PROFILES[5].1, get(block)),
    ]
}

fn text(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

async fn index() -> Response {
    let body: String = PROFILES
        .iter()
        .map(|(path, description)| format!("{path}\t{description}\n"))
        .collect();
    text(body)
}

async fn cmdline() -> Response {
    text(std::env::args().collect::<Vec<_>>().join("\0"))
}

async fn symbol() -> Response {
    text("num_symbols: 0\n".to_string())
}

async fn tasks() -> Response {
    let metrics = tokio::runtime::Handle::current().metrics();
    text(format!(
        "workers: {}\nalive_tasks: {}\n",
        metrics.num_workers(),
        metrics.num_alive_tasks(),
    ))
}

async fn heap() -> Response {
    text(proc_status(&["VmPeak", "VmSize", "VmHWM", "VmRSS", "VmData"]).await)
}

async fn threadcreate() -> Response {
    text(proc_status(&["Threads"]).await)
}

async fn block() -> Response {
    text(proc_status(&["voluntary_ctxt_switches", "nonvoluntary_ctxt_switches"]).await)
}

/// Selected `key: value` lines of `/proc/self/status`.
async fn proc_status(fields: &[&str]) -> String {
    match tokio::fs::read_to_string("/proc/self/status").await {
        Ok(status) => status
            .lines()
            .filter(|line| {
                line.split_once(':')
                    .map(|(k, _)| fields.contains(&k))
                    .unwrap_or(false)
            })
            .map(|line| format!("{line}\n"))
            .collect(),
        Err(e) => format!("unavailable on this platform: {e}\n"),
    }
}
