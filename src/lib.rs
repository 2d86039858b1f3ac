//! # Zipkin Span Recorder
//!
//! Records finished spans in the Zipkin v1 JSON model and delivers them to
//! a Zipkin-compatible collector endpoint in batches. See the
//! [Zipkin Docs](https://zipkin.io/) for details and deployment
//! information.
//!
//! The crate begins where a tracing frontend ends: a completed, generic
//! [`RawSpan`] is handed to a [`SpanRecorder`], translated into the
//! backend's annotation-based representation, and buffered by a
//! [`Collector`] that posts JSON batches over HTTP. Sampling decisions,
//! propagation headers and the application-facing tracer API are out of
//! scope.
//!
//! ## Quickstart
//!
//! First make sure you have a running version of the collector you want to
//! send data to:
//!
//! ```shell
//! $ docker run -d -p 9411:9411 openzipkin/zipkin
//! ```
//!
//! Then build a collector and a recorder and start recording spans:
//!
//! ```no_run
//! use std::time::{Duration, SystemTime};
//! use zipkin_recorder::{
//!     HttpCollector, JsonRecorder, RawSpan, SpanContext, SpanRecorder, TraceId,
//! };
//!
//! fn main() -> Result<(), zipkin_recorder::Error> {
//!     let collector = HttpCollector::builder()
//!         .with_collector_endpoint("http://localhost:9411/api/v1/spans")
//!         .with_batch_size(10)
//!         .build()?;
//!     let recorder = JsonRecorder::builder()
//!         .with_service_name("checkout")
//!         .with_host_port("127.0.0.1:8080")
//!         .build(collector)?;
//!
//!     let span = RawSpan::new(
//!         "GET /cart",
//!         SpanContext::new(TraceId::from(42), 7),
//!         SystemTime::now(),
//!         Duration::from_millis(12),
//!     )
//!     .with_tag("span.kind", "server");
//!     recorder.record_span(span);
//!     Ok(())
//! }
//! ```
//!
//! ## Delivery model
//!
//! Delivery is best effort by design: a batch that fails to post is logged
//! and dropped, and producers are never blocked or retried against. The
//! traced application's availability must not depend on the tracing
//! backend's.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]

pub mod collector;
mod env;
pub mod materializer;
pub mod model;
mod recorder;
mod span;
mod uploader;

pub use collector::{
    Collector, HttpCollector, HttpCollectorBuilder, InMemoryCollector, NoopCollector,
};
pub use model::span::CoreSpan;
pub use recorder::{JsonRecorder, JsonRecorderBuilder, SpanRecorder};
pub use span::{
    LogField, LogRecord, RawSpan, SpanContext, TraceId, Value, PEER_HOSTNAME, PEER_PORT,
    PEER_SERVICE, SPAN_KIND,
};
pub use uploader::{HttpClient, HttpError};

/// Errors surfaced by this crate.
///
/// Only construction-time problems and local buffering failures reach
/// callers; transport failures during a threshold-triggered flush are
/// logged and swallowed.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No HTTP client is configured. Enable the `reqwest-blocking-client`
    /// feature or provide one with
    /// [`with_http_client`](HttpCollectorBuilder::with_http_client).
    #[error("http client must be set, enable the reqwest-blocking-client feature or provide one")]
    NoHttpClient,

    /// The collector endpoint is not a valid URI.
    #[error("invalid collector uri")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// Building the HTTP request failed.
    #[error("http request failed with {0}")]
    RequestFailed(#[from] http::Error),

    /// A span batch could not be serialized.
    #[error("failed to serialize spans: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The local `host:port` could not be resolved at construction time.
    #[error("cannot resolve endpoint from {0:?}")]
    UnresolvableEndpoint(String),

    /// The collector endpoint could not be reached or rejected the batch.
    #[error("span delivery failed: {0}")]
    Transport(String),

    /// Other errors.
    #[error("{0}")]
    Other(String),
}
