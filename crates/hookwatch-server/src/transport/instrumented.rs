use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

use hookwatch_core::Provider;

use super::{Transport, TransportError};

/// `X-From-Cache`: set to `1` by the caching layer when a response was served from cache.
pub const CACHE_HEADER: &str = "x-from-cache";

/// Records every round trip of the wrapped transport as a GitHub request.
///
/// Metrics are recorded whenever a response exists, including a response
/// carried by a [`TransportError`]. Calls that fail without a response record
/// nothing. Errors are always returned to the caller unchanged.
pub struct InstrumentedTransport<T> {
    inner: T,
    provider: Arc<Provider>,
}

impl<T: Transport> InstrumentedTransport<T> {
    pub fn new(inner: T, provider: Arc<Provider>) -> Self {
        Self { inner, provider }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn record(&self, method: &str, handler: &str, resp: &Response<Bytes>, elapsed: Duration) {
        let status = resp.status().as_u16();
        if let Err(e) = self
            .provider
            .record_github_request(handler, method, status, elapsed)
        {
            tracing::warn!(%method, %handler, status, error = %e, "github request metric dropped");
        }

        let outcome = if from_cache(resp) {
            self.provider.record_github_cache_hit(method, handler)
        } else {
            self.provider.record_github_cache_miss(method, handler)
        };
        if let Err(e) = outcome {
            tracing::warn!(%method, %handler, error = %e, "github cache metric dropped");
        }
    }
}

fn from_cache(resp: &Response<Bytes>) -> bool {
    resp.headers()
        .get(CACHE_HEADER)
        .map(|v| v.as_bytes() == b"1")
        .unwrap_or(false)
}

#[async_trait]
impl<T: Transport> Transport for InstrumentedTransport<T> {
    async fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let method = req.method().as_str().to_owned();
        let handler = req.uri().path().to_owned();

        let start = Instant::now();
        let result = self.inner.round_trip(req).await;
        let elapsed = start.elapsed();

        // A response that arrives together with an error is still recorded;
        // only the response-less failure is skipped.
        let resp = match &result {
            Ok(resp) => Some(resp),
            Err(e) => e.response(),
        };
        if let Some(resp) = resp {
            self.record(&method, &handler, resp, elapsed);
        }

        result
    }
}
