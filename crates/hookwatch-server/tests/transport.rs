#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};

use hookwatch_core::{Provider, Registry};
use hookwatch_server::transport::{InstrumentedTransport, Transport, TransportError, CACHE_HEADER};

enum Outcome {
    Respond { status: u16, cache: Option<&'static str> },
    FailWithoutResponse,
    FailWithResponse { status: u16 },
}

struct Scripted {
    outcome: Outcome,
    seen: Mutex<Vec<(Method, String, Bytes)>>,
}

impl Scripted {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        }
    }
}

fn response(status: u16, cache: Option<&str>) -> Response<Bytes> {
    let mut b = Response::builder().status(status);
    if let Some(v) = cache {
        b = b.header(CACHE_HEADER, v);
    }
    b.body(Bytes::from_static(b"{}")).unwrap()
}

#[async_trait]
impl Transport for Scripted {
    async fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        self.seen.lock().unwrap().push((
            req.method().clone(),
            req.uri().to_string(),
            req.body().clone(),
        ));
        match &self.outcome {
            Outcome::Respond { status, cache } => Ok(response(*status, *cache)),
            Outcome::FailWithoutResponse => Err(TransportError::new("connection refused")),
            Outcome::FailWithResponse { status } => {
                Err(TransportError::new("rate limited").with_response(response(*status, None)))
            }
        }
    }
}

fn setup(outcome: Outcome) -> (Arc<Provider>, InstrumentedTransport<Arc<Scripted>>, Arc<Scripted>) {
    let provider = Arc::new(Provider::new(Arc::new(Registry::new())).unwrap());
    let inner = Arc::new(Scripted::new(outcome));
    let transport = InstrumentedTransport::new(Arc::clone(&inner), Arc::clone(&provider));
    (provider, transport, inner)
}

fn get(path: &str) -> Request<Bytes> {
    Request::builder()
        .method(Method::GET)
        .uri(format!("https://api.github.com{path}?page=2"))
        .body(Bytes::new())
        .unwrap()
}

#[tokio::test]
async fn records_duration_status_and_miss() {
    let (provider, transport, _) = setup(Outcome::Respond { status: 200, cache: None });

    let resp = transport.round_trip(get("/repos/acme/app")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let snap = provider
        .github_requests()
        .snapshot(&["GET", "/repos/acme/app", "200"])
        .unwrap();
    assert_eq!(snap.count, 1);
    assert_eq!(provider.github_cache_miss().value(&["GET", "/repos/acme/app"]).unwrap(), 1);
    assert_eq!(provider.github_cache_hits().value(&["GET", "/repos/acme/app"]).unwrap(), 0);
}

#[tokio::test]
async fn cache_sentinel_counts_a_hit() {
    let (provider, transport, _) = setup(Outcome::Respond { status: 200, cache: Some("1") });

    transport.round_trip(get("/user")).await.unwrap();

    assert_eq!(provider.github_cache_hits().value(&["GET", "/user"]).unwrap(), 1);
    assert_eq!(provider.github_cache_miss().value(&["GET", "/user"]).unwrap(), 0);
}

#[tokio::test]
async fn other_sentinel_values_count_a_miss() {
    let (provider, transport, _) = setup(Outcome::Respond { status: 200, cache: Some("0") });

    transport.round_trip(get("/user")).await.unwrap();

    assert_eq!(provider.github_cache_hits().value(&["GET", "/user"]).unwrap(), 0);
    assert_eq!(provider.github_cache_miss().value(&["GET", "/user"]).unwrap(), 1);
}

#[tokio::test]
async fn non_success_status_is_still_recorded() {
    let (provider, transport, _) = setup(Outcome::Respond { status: 404, cache: Some("1") });

    let resp = transport.round_trip(get("/repos/acme/gone")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let snap = provider
        .github_requests()
        .snapshot(&["GET", "/repos/acme/gone", "404"])
        .unwrap();
    assert_eq!(snap.count, 1);
    assert_eq!(provider.github_cache_hits().value(&["GET", "/repos/acme/gone"]).unwrap(), 1);
}

#[tokio::test]
async fn failure_without_response_records_nothing() {
    let (provider, transport, _) = setup(Outcome::FailWithoutResponse);

    let err = transport.round_trip(get("/user")).await.unwrap_err();
    assert_eq!(err.to_string(), "connection refused");
    assert!(err.response().is_none());

    let text = provider.render(hookwatch_core::Format::Text);
    assert!(!text.contains("hookwatch_github_requests_count"));
    assert!(!text.contains("hookwatch_github_cache_miss{"));
    assert!(!text.contains("hookwatch_github_cache_hits{"));
}

#[tokio::test]
async fn failure_with_response_is_recorded_and_returned() {
    let (provider, transport, _) = setup(Outcome::FailWithResponse { status: 403 });

    let err = transport.round_trip(get("/user")).await.unwrap_err();
    assert_eq!(err.to_string(), "rate limited");
    assert_eq!(err.response().unwrap().status(), StatusCode::FORBIDDEN);

    let snap = provider.github_requests().snapshot(&["GET", "/user", "403"]).unwrap();
    assert_eq!(snap.count, 1);
    assert_eq!(provider.github_cache_miss().value(&["GET", "/user"]).unwrap(), 1);
}

#[tokio::test]
async fn request_is_forwarded_unchanged() {
    let (_, transport, inner) = setup(Outcome::Respond { status: 201, cache: None });

    let req = Request::builder()
        .method(Method::POST)
        .uri("https://api.github.com/repos/acme/app/issues")
        .body(Bytes::from_static(b"{\"title\":\"x\"}"))
        .unwrap();
    transport.round_trip(req).await.unwrap();

    let seen = inner.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, Method::POST);
    assert_eq!(seen[0].1, "https://api.github.com/repos/acme/app/issues");
    assert_eq!(seen[0].2, Bytes::from_static(b"{\"title\":\"x\"}"));
}
