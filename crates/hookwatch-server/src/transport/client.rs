use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

use super::{Transport, TransportError};

/// [`Transport`] over a `reqwest::Client`; the response body is read in full.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let req = reqwest::Request::try_from(req)
            .map_err(|e| TransportError::new(format!("invalid request: {e}")).with_source(e))?;

        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| TransportError::new(format!("request failed: {e}")).with_source(e))?;

        let mut builder = Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(resp.headers().clone());
        }

        match resp.bytes().await {
            Ok(body) => builder
                .body(body)
                .map_err(|e| TransportError::new(format!("invalid response: {e}")).with_source(e)),
            Err(e) => {
                // The head was received: hand it back with the error.
                let head = builder
                    .body(Bytes::new())
                    .map_err(|e| TransportError::new(format!("invalid response: {e}")).with_source(e))?;
                Err(TransportError::new(format!("read body failed: {e}"))
                    .with_source(e)
                    .with_response(head))
            }
        }
    }
}
