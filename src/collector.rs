//! Span collectors: the contract boundary behind the recorder, plus the
//! batching HTTP implementation and two trivial ones used in tests.

use crate::env;
use crate::model::span::CoreSpan;
use crate::uploader::{HttpClient, Uploader};
use crate::Error;
use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex};

/// Receives translated spans from a recorder.
///
/// The batching [`HttpCollector`] is the production implementation;
/// [`NoopCollector`] and [`InMemoryCollector`] satisfy the same contract
/// for benchmarks and tests.
pub trait Collector: fmt::Debug + Send + Sync {
    /// Accept one span.
    ///
    /// Implementations must be safe to call concurrently and must never
    /// block on network I/O beyond the call that happens to trigger a
    /// flush.
    fn collect(&self, span: CoreSpan) -> Result<(), Error>;
}

/// Buffers spans and posts them to a collector endpoint as JSON batches.
///
/// Appending is done under a lock; when the buffer reaches the batch-size
/// threshold it is swapped for an empty one and the lock released, so
/// concurrent producers never wait on the network. The caller whose append
/// crossed the threshold performs the delivery. Delivery is fire and
/// forget: a failed batch is logged and dropped, and no error reaches the
/// producers.
#[derive(Debug)]
pub struct HttpCollector {
    uploader: Uploader,
    batch_size: usize,
    buffer: Mutex<Vec<CoreSpan>>,
}

impl HttpCollector {
    /// Start building an [`HttpCollector`].
    pub fn builder() -> HttpCollectorBuilder {
        HttpCollectorBuilder::default()
    }

    /// Deliver whatever is buffered without waiting for the threshold.
    ///
    /// Unlike threshold-triggered flushes this reports the delivery
    /// outcome, so shutdown paths can drain and observe failures.
    pub fn flush(&self) -> Result<(), Error> {
        let batch = {
            let mut buffer = self
                .buffer
                .lock()
                .map_err(|_| Error::Other("span buffer mutex poisoned".into()))?;
            mem::replace(&mut *buffer, Vec::with_capacity(self.batch_size))
        };
        if batch.is_empty() {
            return Ok(());
        }
        self.uploader.upload(batch)
    }
}

impl Collector for HttpCollector {
    fn collect(&self, span: CoreSpan) -> Result<(), Error> {
        let batch = {
            let mut buffer = self
                .buffer
                .lock()
                .map_err(|_| Error::Other("span buffer mutex poisoned".into()))?;
            buffer.push(span);
            if buffer.len() < self.batch_size {
                return Ok(());
            }
            mem::replace(&mut *buffer, Vec::with_capacity(self.batch_size))
        };

        match self.uploader.upload(batch) {
            Ok(()) => Ok(()),
            // The producer already succeeded at buffering; a delivery
            // failure is the transport's problem, not the caller's.
            Err(Error::Transport(err)) => {
                tracing::warn!(error = %err, "failed to deliver span batch, dropping it");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Builder for [`HttpCollector`].
///
/// Defaults come from the `ZIPKIN_COLLECTOR_ENDPOINT`,
/// `ZIPKIN_COLLECTOR_BATCH_SIZE` and `ZIPKIN_COLLECTOR_TIMEOUT`
/// environment variables where set.
#[derive(Debug)]
pub struct HttpCollectorBuilder {
    collector_endpoint: String,
    batch_size: usize,
    client: Option<Box<dyn HttpClient>>,
}

impl Default for HttpCollectorBuilder {
    fn default() -> Self {
        HttpCollectorBuilder {
            collector_endpoint: env::get_endpoint(),
            batch_size: env::get_batch_size(),
            #[cfg(feature = "reqwest-blocking-client")]
            client: reqwest::blocking::Client::builder()
                .timeout(env::get_timeout())
                .build()
                .ok()
                .map(|client| Box::new(client) as Box<dyn HttpClient>),
            #[cfg(not(feature = "reqwest-blocking-client"))]
            client: None,
        }
    }
}

impl HttpCollectorBuilder {
    /// Assign the collector endpoint spans are posted to.
    pub fn with_collector_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.collector_endpoint = endpoint.into();
        self
    }

    /// Assign the number of buffered spans that triggers a flush.
    /// A threshold of 1 delivers every span eagerly.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Assign the client used to post batches.
    pub fn with_http_client<T: HttpClient + 'static>(mut self, client: T) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// Build the collector, failing fast on a malformed endpoint URL or a
    /// missing HTTP client.
    pub fn build(self) -> Result<HttpCollector, Error> {
        let client = self.client.ok_or(Error::NoHttpClient)?;
        let collector_endpoint = self.collector_endpoint.parse()?;
        let batch_size = self.batch_size.max(1);
        Ok(HttpCollector {
            uploader: Uploader::new(client, collector_endpoint),
            batch_size,
            buffer: Mutex::new(Vec::with_capacity(batch_size)),
        })
    }
}

/// A collector that discards every span.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCollector;

impl Collector for NoopCollector {
    fn collect(&self, _span: CoreSpan) -> Result<(), Error> {
        Ok(())
    }
}

/// A collector that stores spans in memory, for tests and debugging.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCollector {
    spans: Arc<Mutex<Vec<CoreSpan>>>,
}

impl InMemoryCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        InMemoryCollector::default()
    }

    /// The spans collected so far.
    pub fn collected_spans(&self) -> Vec<CoreSpan> {
        self.spans
            .lock()
            .map(|spans| spans.clone())
            .unwrap_or_default()
    }

    /// Drop every collected span.
    pub fn reset(&self) {
        if let Ok(mut spans) = self.spans.lock() {
            spans.clear();
        }
    }
}

impl Collector for InMemoryCollector {
    fn collect(&self, span: CoreSpan) -> Result<(), Error> {
        self.spans
            .lock()
            .map_err(|_| Error::Other("span buffer mutex poisoned".into()))?
            .push(span);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::{encode_id, encode_trace_id};
    use bytes::Bytes;
    use http::{Request, Response};
    use std::thread;

    #[derive(Clone, Debug, Default)]
    struct MockClient {
        requests: Arc<Mutex<Vec<(String, String, Vec<u8>)>>>,
        fail: bool,
    }

    impl MockClient {
        fn failing() -> Self {
            MockClient {
                fail: true,
                ..MockClient::default()
            }
        }

        fn bodies(&self) -> Vec<serde_json::Value> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, body)| serde_json::from_slice(body).unwrap())
                .collect()
        }
    }

    impl HttpClient for MockClient {
        fn send(
            &self,
            request: Request<Vec<u8>>,
        ) -> Result<Response<Bytes>, crate::uploader::HttpError> {
            let content_type = request
                .headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            self.requests.lock().unwrap().push((
                request.uri().to_string(),
                content_type,
                request.into_body(),
            ));
            if self.fail {
                return Err("connection refused".into());
            }
            Ok(Response::builder().status(202).body(Bytes::new())?)
        }
    }

    fn collector(client: MockClient, batch_size: usize) -> HttpCollector {
        HttpCollector::builder()
            .with_collector_endpoint("http://localhost:9411/api/v1/spans")
            .with_batch_size(batch_size)
            .with_http_client(client)
            .build()
            .unwrap()
    }

    fn span(id: u64) -> CoreSpan {
        CoreSpan::builder()
            .name("method")
            .trace_id(encode_trace_id(17051370458307041793, None))
            .id(encode_id(id))
            .build()
    }

    #[test]
    fn malformed_endpoint_fails_at_construction() {
        let result = HttpCollector::builder()
            .with_collector_endpoint("not a uri")
            .with_http_client(MockClient::default())
            .build();
        assert!(matches!(result, Err(Error::InvalidUri(_))));
    }

    #[test]
    fn batches_flush_at_the_threshold() {
        let client = MockClient::default();
        let collector = collector(client.clone(), 3);

        for id in 0..7 {
            collector.collect(span(id)).unwrap();
        }

        let bodies = client.bodies();
        assert_eq!(bodies.len(), 2);
        for body in &bodies {
            assert_eq!(body.as_array().unwrap().len(), 3);
        }

        // The remainder stays buffered until an explicit drain.
        collector.flush().unwrap();
        let bodies = client.bodies();
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[2].as_array().unwrap().len(), 1);

        // Nothing buffered, nothing sent.
        collector.flush().unwrap();
        assert_eq!(client.bodies().len(), 3);
    }

    #[test]
    fn batches_are_posted_as_json() {
        let client = MockClient::default();
        let collector = collector(client.clone(), 1);
        collector.collect(span(456)).unwrap();

        let requests = client.requests.lock().unwrap();
        let (uri, content_type, _) = &requests[0];
        assert_eq!(uri, "http://localhost:9411/api/v1/spans");
        assert_eq!(content_type, "application/json");
        drop(requests);

        let body = &client.bodies()[0];
        let sent = &body.as_array().unwrap()[0];
        assert_eq!(sent["name"], "method");
        assert_eq!(sent["traceId"], "eca2a316fcfb1a01");
        assert_eq!(sent["id"], "00000000000001c8");
        assert!(sent.get("parentId").is_none());
    }

    #[test]
    fn high_trace_ids_survive_to_the_wire() {
        let client = MockClient::default();
        let collector = collector(client.clone(), 1);
        let span = CoreSpan::builder()
            .name("method")
            .trace_id(encode_trace_id(
                17051370458307041793,
                Some(12313211111111111111),
            ))
            .id(encode_id(456))
            .build();
        collector.collect(span).unwrap();

        let body = &client.bodies()[0];
        let sent = &body.as_array().unwrap()[0];
        assert_eq!(sent["traceId"], "aae15044722bb1c7eca2a316fcfb1a01");
        assert_eq!(sent["traceId"].as_str().unwrap().len(), 32);
        assert!(sent.get("parentId").is_none());
    }

    #[test]
    fn transport_failures_do_not_reach_producers() {
        let client = MockClient::failing();
        let collector = collector(client.clone(), 1);

        collector.collect(span(1)).unwrap();
        collector.collect(span(2)).unwrap();

        // Both batches were attempted, which means the buffer was cleared
        // after the first failure rather than retried.
        assert_eq!(client.requests.lock().unwrap().len(), 2);
        assert!(matches!(
            collector.flush(),
            Ok(()) // nothing left buffered
        ));
    }

    #[test]
    fn explicit_flush_reports_transport_failures() {
        let client = MockClient::failing();
        let collector = collector(client.clone(), 10);
        collector.collect(span(1)).unwrap();
        assert!(matches!(collector.flush(), Err(Error::Transport(_))));
    }

    #[test]
    fn concurrent_producers_lose_no_spans() {
        let client = MockClient::default();
        let collector = Arc::new(collector(client.clone(), 10));

        let mut handles = Vec::new();
        for worker in 0..4u64 {
            let collector = Arc::clone(&collector);
            handles.push(thread::spawn(move || {
                for i in 0..25u64 {
                    collector.collect(span(worker * 100 + i)).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let bodies = client.bodies();
        assert_eq!(bodies.len(), 10);
        let delivered: usize = bodies
            .iter()
            .map(|body| body.as_array().unwrap().len())
            .sum();
        assert_eq!(delivered, 100);
        for body in &bodies {
            assert_eq!(body.as_array().unwrap().len(), 10);
        }
    }
}
