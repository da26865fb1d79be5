//! Metrics provider: the single recording surface of the service.
//!
//! Every instrumented event category maps to exactly one family. The
//! families are registered once in [`Provider::new`]; callers only see typed
//! recording methods and read-only views, never the raw families.
//!
//! Label values are used verbatim. The provider does no cardinality
//! limiting, so callers must never pass unbounded input (raw user paths,
//! request ids) as a label value.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::metrics::{CounterVec, Format, HistogramVec, Opts, Registry, DEFAULT_BUCKETS};

/// Namespace prefixed to every family name.
pub const NAMESPACE: &str = "hookwatch";

/// Path the exposition handler is served on.
pub const METRICS_PATH: &str = "/metrics";

pub struct Provider {
    registry: Arc<Registry>,
    http_requests: Arc<HistogramVec>,
    webhook_requests: Arc<CounterVec>,
    cron_tasks: Arc<HistogramVec>,
    cron_errors: Arc<CounterVec>,
    github_requests: Arc<HistogramVec>,
    github_cache_hits: Arc<CounterVec>,
    github_cache_miss: Arc<CounterVec>,
}

impl Provider {
    /// Register all families on `registry`.
    ///
    /// Fails if any family name is already taken, e.g. when a second provider
    /// is built against the same registry.
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let http_requests = registry.register_histogram(
            Opts::new("requests", "Duration of HTTP requests served, in seconds.")
                .namespace(NAMESPACE)
                .subsystem("requests")
                .labels(&["method", "handler", "status"]),
            DEFAULT_BUCKETS,
        )?;
        let webhook_requests = registry.register_counter(
            Opts::new("webhook_requests", "Number of webhook events received.")
                .namespace(NAMESPACE)
                .subsystem("requests")
                .labels(&["type"]),
        )?;
        let cron_tasks = registry.register_histogram(
            Opts::new("tasks", "Duration of cron task runs, in seconds.")
                .namespace(NAMESPACE)
                .subsystem("cron")
                .labels(&["name"]),
            DEFAULT_BUCKETS,
        )?;
        let cron_errors = registry.register_counter(
            Opts::new("errors", "Number of failed cron task runs.")
                .namespace(NAMESPACE)
                .subsystem("cron")
                .labels(&["name"]),
        )?;
        let github_requests = registry.register_histogram(
            Opts::new("requests", "Duration of GitHub API requests, in seconds.")
                .namespace(NAMESPACE)
                .subsystem("github")
                .labels(&["method", "handler", "status"]),
            DEFAULT_BUCKETS,
        )?;
        let github_cache_hits = registry.register_counter(
            Opts::new("cache_hits", "Number of GitHub API responses served from cache.")
                .namespace(NAMESPACE)
                .subsystem("github")
                .labels(&["method", "handler"]),
        )?;
        let github_cache_miss = registry.register_counter(
            Opts::new("cache_miss", "Number of GitHub API responses not served from cache.")
                .namespace(NAMESPACE)
                .subsystem("github")
                .labels(&["method", "handler"]),
        )?;

        tracing::info!(families = 7, "metrics provider registered");

        Ok(Self {
            registry,
            http_requests,
            webhook_requests,
            cron_tasks,
            cron_errors,
            github_requests,
            github_cache_hits,
            github_cache_miss,
        })
    }

    /// Record one served HTTP request.
    pub fn record_http_request(
        &self,
        handler: &str,
        method: &str,
        status: u16,
        elapsed: Duration,
    ) -> Result<()> {
        let status = status.to_string();
        self.http_requests
            .observe(&[method, handler, status.as_str()], elapsed.as_secs_f64())
    }

    /// Record one received webhook event.
    pub fn record_webhook(&self, event_type: &str) -> Result<()> {
        self.webhook_requests.inc(&[event_type])
    }

    /// Record one outbound GitHub API request that produced a response.
    pub fn record_github_request(
        &self,
        handler: &str,
        method: &str,
        status: u16,
        elapsed: Duration,
    ) -> Result<()> {
        let status = status.to_string();
        self.github_requests
            .observe(&[method, handler, status.as_str()], elapsed.as_secs_f64())
    }

    pub fn record_github_cache_hit(&self, method: &str, handler: &str) -> Result<()> {
        self.github_cache_hits.inc(&[method, handler])
    }

    pub fn record_github_cache_miss(&self, method: &str, handler: &str) -> Result<()> {
        self.github_cache_miss.inc(&[method, handler])
    }

    /// Record the duration of one cron task run.
    pub fn record_cron_duration(&self, name: &str, elapsed: Duration) -> Result<()> {
        self.cron_tasks.observe(&[name], elapsed.as_secs_f64())
    }

    pub fn record_cron_error(&self, name: &str) -> Result<()> {
        self.cron_errors.inc(&[name])
    }

    /// Render every family registered on the backing registry.
    pub fn render(&self, format: Format) -> String {
        self.registry.render(format)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn http_requests(&self) -> &HistogramVec {
        &self.http_requests
    }

    pub fn webhook_requests(&self) -> &CounterVec {
        &self.webhook_requests
    }

    pub fn cron_tasks(&self) -> &HistogramVec {
        &self.cron_tasks
    }

    pub fn cron_errors(&self) -> &CounterVec {
        &self.cron_errors
    }

    pub fn github_requests(&self) -> &HistogramVec {
        &self.github_requests
    }

    pub fn github_cache_hits(&self) -> &CounterVec {
        &self.github_cache_hits
    }

    pub fn github_cache_miss(&self) -> &CounterVec {
        &self.github_cache_miss
    }
}
