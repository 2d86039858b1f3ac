//! Delivery of encoded span batches to the collector endpoint.

use crate::model::span::CoreSpan;
use crate::Error;
use bytes::Bytes;
use http::{header::CONTENT_TYPE, Method, Request, Response, Uri};
use std::fmt::Debug;

/// Errors produced by [`HttpClient`] implementations.
pub type HttpError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A minimal interface necessary for posting span batches over HTTP.
///
/// The collector treats the transport as a black box: implementations own
/// connection handling, timeouts and TLS. The default implementation is
/// [`reqwest::blocking::Client`] behind the `reqwest-blocking-client`
/// feature.
pub trait HttpClient: Debug + Send + Sync {
    /// Send the request and return the response, or an error when the
    /// request could not be completed.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>, HttpError>;
}

/// Turn a response into an error when the status is not a success.
pub(crate) trait ResponseExt: Sized {
    fn error_for_status(self) -> Result<Self, HttpError>;
}

impl<T> ResponseExt for Response<T> {
    fn error_for_status(self) -> Result<Self, HttpError> {
        if self.status().is_success() {
            Ok(self)
        } else {
            Err(format!("request failed with status {}", self.status()).into())
        }
    }
}

#[derive(Debug)]
pub(crate) enum Uploader {
    Http(JsonV1Client),
}

impl Uploader {
    pub(crate) fn new(client: Box<dyn HttpClient>, collector_endpoint: Uri) -> Self {
        Uploader::Http(JsonV1Client {
            client,
            collector_endpoint,
        })
    }

    /// Serialize the batch as a JSON array and POST it.
    pub(crate) fn upload(&self, spans: Vec<CoreSpan>) -> Result<(), Error> {
        match self {
            Uploader::Http(client) => client.upload(spans),
        }
    }
}

#[derive(Debug)]
pub(crate) struct JsonV1Client {
    client: Box<dyn HttpClient>,
    collector_endpoint: Uri,
}

impl JsonV1Client {
    fn upload(&self, spans: Vec<CoreSpan>) -> Result<(), Error> {
        let body = serde_json::to_vec(&spans)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.collector_endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)?;
        self.client
            .send(request)
            .and_then(ResponseExt::error_for_status)
            .map_err(|err| Error::Transport(err.to_string()))?;
        tracing::debug!(uri = %self.collector_endpoint, "delivered span batch");
        Ok(())
    }
}

#[cfg(feature = "reqwest-blocking-client")]
mod reqwest_blocking {
    use super::{Bytes, HttpClient, HttpError, Request, Response};

    impl HttpClient for reqwest::blocking::Client {
        fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>, HttpError> {
            let request = request.try_into()?;
            let mut response = self.execute(request)?;
            let headers = std::mem::take(response.headers_mut());
            let mut http_response = Response::builder()
                .status(response.status())
                .body(response.bytes()?)?;
            *http_response.headers_mut() = headers;

            Ok(http_response)
        }
    }
}
