//! Provider recording behaviour.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hookwatch_core::{Format, Provider, Registry};

fn provider() -> Provider {
    Provider::new(Arc::new(Registry::new())).expect("provider must register")
}

#[test]
fn unseen_histogram_tuple_is_empty() {
    let p = provider();
    let snap = p.http_requests().snapshot(&["GET", "never", "200"]).unwrap();
    assert_eq!(snap.count, 0);
    assert_eq!(snap.sum, 0.0);
    assert!(snap.buckets.iter().all(|(_, c)| *c == 0));
}

#[test]
fn http_request_observation() {
    let p = provider();
    p.record_http_request("handler", "method", 200, Duration::from_secs_f64(1.0))
        .unwrap();

    let snap = p.http_requests().snapshot(&["method", "handler", "200"]).unwrap();
    assert_eq!(snap.count, 1);
    assert!((snap.sum - 1.0).abs() < 0.001);
}

#[test]
fn webhook_counter_starts_at_zero() {
    let p = provider();
    assert_eq!(p.webhook_requests().value(&["test"]).unwrap(), 0);
    p.record_webhook("test").unwrap();
    assert_eq!(p.webhook_requests().value(&["test"]).unwrap(), 1);
}

#[test]
fn concurrent_cache_hits_are_not_lost() {
    let p = provider();
    let threads = 100;
    let per_thread = 10;

    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                for _ in 0..per_thread {
                    p.record_github_cache_hit("GET", "/repos").unwrap();
                }
            });
        }
    });

    assert_eq!(
        p.github_cache_hits().value(&["GET", "/repos"]).unwrap(),
        threads * per_thread
    );
    assert_eq!(p.github_cache_miss().value(&["GET", "/repos"]).unwrap(), 0);
}

#[test]
fn concurrent_first_use_creates_one_instance() {
    let p = provider();
    thread::scope(|s| {
        for _ in 0..64 {
            s.spawn(|| {
                p.record_cron_duration("sync", Duration::from_millis(5)).unwrap();
            });
        }
    });

    let snap = p.cron_tasks().snapshot(&["sync"]).unwrap();
    assert_eq!(snap.count, 64);
    assert!((snap.sum - 0.32).abs() < 1e-9);
    assert_eq!(p.render(Format::Text).matches("hookwatch_cron_tasks_count{").count(), 1);
}

#[test]
fn repeated_observations_accumulate() {
    let p = provider();
    let elapsed = Duration::from_millis(250);
    p.record_github_request("/repos", "GET", 200, elapsed).unwrap();
    p.record_github_request("/repos", "GET", 200, elapsed).unwrap();

    let snap = p.github_requests().snapshot(&["GET", "/repos", "200"]).unwrap();
    assert_eq!(snap.count, 2);
    assert!((snap.sum - 0.5).abs() < 1e-9);
}

#[test]
fn cron_errors_are_counted_per_task() {
    let p = provider();
    p.record_cron_error("sync").unwrap();
    p.record_cron_error("sync").unwrap();
    p.record_cron_error("cleanup").unwrap();
    assert_eq!(p.cron_errors().value(&["sync"]).unwrap(), 2);
    assert_eq!(p.cron_errors().value(&["cleanup"]).unwrap(), 1);
}

#[test]
fn empty_label_value_is_reported() {
    let p = provider();
    let err = p.record_webhook("").unwrap_err();
    assert_eq!(err.kind().as_str(), "LABEL_MISMATCH");
    assert_eq!(p.webhook_requests().value(&["x"]).unwrap(), 0);
}

#[test]
fn second_provider_on_same_registry_fails() {
    let registry = Arc::new(Registry::new());
    let _first = Provider::new(Arc::clone(&registry)).unwrap();
    let err = Provider::new(registry).err().expect("must collide");
    assert_eq!(err.kind().as_str(), "ALREADY_REGISTERED");
}

#[test]
fn isolated_registries_do_not_share_state() {
    let a = provider();
    let b = provider();
    a.record_webhook("push").unwrap();
    assert_eq!(a.webhook_requests().value(&["push"]).unwrap(), 1);
    assert_eq!(b.webhook_requests().value(&["push"]).unwrap(), 0);
}

#[test]
fn family_names_are_fixed() {
    let p = provider();
    assert_eq!(
        p.registry().family_names(),
        vec![
            "hookwatch_cron_errors",
            "hookwatch_cron_tasks",
            "hookwatch_github_cache_hits",
            "hookwatch_github_cache_miss",
            "hookwatch_github_requests",
            "hookwatch_requests_requests",
            "hookwatch_requests_webhook_requests",
        ]
    );
}

#[test]
fn render_contains_recorded_families() {
    let p = provider();
    p.record_webhook("push").unwrap();
    p.record_github_cache_miss("GET", "/user").unwrap();

    let text = p.render(Format::Text);
    assert!(text.contains("# TYPE hookwatch_requests_webhook_requests counter"));
    assert!(text.contains("hookwatch_requests_webhook_requests{type=\"push\"} 1"));
    assert!(text.contains("hookwatch_github_cache_miss{method=\"GET\",handler=\"/user\"} 1"));
    assert!(text.contains("# TYPE hookwatch_github_requests histogram"));
}
