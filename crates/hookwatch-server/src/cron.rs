//! Scheduled task instrumentation.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use hookwatch_core::Provider;

/// Run one cron task, recording its duration and, on `Err`, a cron error.
///
/// The task's result is returned unchanged.
pub async fn run_task<F, T, E>(provider: &Provider, name: &str, task: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let start = Instant::now();
    let result = task.await;
    let elapsed = start.elapsed();

    if let Err(e) = provider.record_cron_duration(name, elapsed) {
        tracing::warn!(task = %name, error = %e, "cron duration metric dropped");
    }
    if let Err(err) = &result {
        tracing::warn!(task = %name, error = %err, ?elapsed, "cron task failed");
        if let Err(e) = provider.record_cron_error(name) {
            tracing::warn!(task = %name, error = %e, "cron error metric dropped");
        }
    }
    result
}
