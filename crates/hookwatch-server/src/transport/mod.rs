//! Outbound HTTP transports.
//!
//! A [`Transport`] executes one request and returns its response. The
//! [`InstrumentedTransport`] decorator records duration, status and cache
//! outcome of every call into the [`Provider`](hookwatch_core::Provider)
//! without changing the request or response.

mod instrumented;
mod client;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use thiserror::Error;

pub use client::ReqwestTransport;
pub use instrumented::{InstrumentedTransport, CACHE_HEADER};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a round trip.
///
/// Some failures still come with a response (a rate-limit rejection, a body
/// that could not be read); it is kept so decorators and callers can inspect it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    response: Option<Box<Response<Bytes>>>,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_response(mut self, response: Response<Bytes>) -> Self {
        self.response = Some(Box::new(response));
        self
    }

    /// Response received alongside the failure, if any.
    pub fn response(&self) -> Option<&Response<Bytes>> {
        self.response.as_deref()
    }
}

/// Executes outbound requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Bytes>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        (**self).round_trip(req).await
    }
}
