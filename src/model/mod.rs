//! Translation of generic spans into the Zipkin v1 wire model.
//!
//! The translator decides which annotations a span carries from its
//! reserved `span.kind` tag, stamps them with the recorder's local
//! endpoint, and turns every remaining tag into a binary annotation.

use crate::materializer::Materializer;
use crate::span::{RawSpan, Value, PEER_HOSTNAME, PEER_PORT, PEER_SERVICE, SPAN_KIND};
use std::time::{Duration, SystemTime};

/// Timestamped and key/value annotations plus the v1 event vocabulary.
pub mod annotation;
/// The network identity stamped onto annotations.
pub mod endpoint;
/// Fixed-width hex encoding of span and trace identifiers.
pub mod id;
/// The span wire type.
pub mod span;

use annotation::{
    Annotation, BinaryAnnotation, CLIENT_RECV, CLIENT_SEND, LOCAL_COMPONENT, SERVER_ADDR,
    SERVER_RECV, SERVER_SEND,
};
use endpoint::Endpoint;
use id::{encode_id, encode_trace_id};
use span::CoreSpan;

/// The recognized values of the reserved `span.kind` tag.
///
/// Any other value, or no tag at all, marks the span as in-process work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Client,
    Server,
    Resource,
}

impl Kind {
    fn parse(value: &Value) -> Option<Kind> {
        match value {
            Value::String(kind) => match kind.as_str() {
                "client" => Some(Kind::Client),
                "server" => Some(Kind::Server),
                "resource" => Some(Kind::Resource),
                _ => None,
            },
            _ => None,
        }
    }
}

fn micros_since_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_micros() as u64
}

fn annotate(annotations: &mut Vec<Annotation>, timestamp: u64, value: &str, endpoint: &Endpoint) {
    annotations.push(
        Annotation::builder()
            .timestamp(timestamp)
            .value(value)
            .endpoint(endpoint.clone())
            .build(),
    );
}

fn annotate_binary(
    annotations: &mut Vec<BinaryAnnotation>,
    key: impl Into<String>,
    value: impl Into<String>,
    endpoint: &Endpoint,
) {
    annotations.push(
        BinaryAnnotation::builder()
            .key(key)
            .value(value)
            .endpoint(endpoint.clone())
            .build(),
    );
}

/// Resolve the remote endpoint of a `resource` span from its peer tags,
/// falling back to the local service name and address where tags are
/// absent. Returns the remote service name together with the resolved
/// endpoint, or `None` when resolution fails.
fn resolve_remote_endpoint(span: &RawSpan, local_endpoint: &Endpoint) -> (String, Option<Endpoint>) {
    let service_name = match span.tags.get(PEER_SERVICE) {
        Some(service) => service.to_string(),
        None => local_endpoint.service_name.clone(),
    };
    let host = match span.tags.get(PEER_HOSTNAME) {
        Some(Value::String(host)) => Some(host.clone()),
        _ => local_endpoint.host(),
    };
    let port = match span.tags.get(PEER_PORT) {
        Some(Value::I64(port)) => *port as u16,
        _ => local_endpoint.port,
    };

    let Some(host) = host else {
        return (service_name, None);
    };
    // IPv6 literals need brackets to survive host:port splitting.
    let host_port = if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    let remote = Endpoint::resolve(&host_port, service_name.clone());
    (service_name, remote)
}

/// Translate a finished span into its wire representation.
///
/// Returns `None` for unsampled spans; this is the pipeline's single
/// admission gate. Translation never fails: a peer endpoint that cannot be
/// resolved or a log record that cannot be materialized is logged and
/// skipped while the span itself is still emitted.
pub(crate) fn into_core_span(
    local_endpoint: &Endpoint,
    default_debug: bool,
    materializer: Materializer,
    mut span: RawSpan,
) -> Option<CoreSpan> {
    if !span.context.sampled {
        return None;
    }

    let start = micros_since_epoch(span.start);
    let duration = span.duration.as_micros() as u64;
    // Timing fields are only reported by the process that measured them;
    // a measured zero rounds up to one microsecond.
    let (timestamp, owned_duration) = if span.context.owner {
        (Some(start), Some(duration.max(1)))
    } else {
        (None, None)
    };

    let mut annotations = Vec::new();
    let mut binary_annotations = Vec::new();

    match span.tags.remove(SPAN_KIND).as_ref().and_then(Kind::parse) {
        Some(Kind::Client) => {
            annotate(&mut annotations, start, CLIENT_SEND, local_endpoint);
            annotate(&mut annotations, start + duration, CLIENT_RECV, local_endpoint);
        }
        Some(Kind::Server) => {
            annotate(&mut annotations, start, SERVER_RECV, local_endpoint);
            annotate(&mut annotations, start + duration, SERVER_SEND, local_endpoint);
        }
        Some(Kind::Resource) => {
            match resolve_remote_endpoint(&span, local_endpoint) {
                (service_name, Some(remote)) => {
                    annotate_binary(&mut binary_annotations, SERVER_ADDR, service_name, &remote);
                }
                (service_name, None) => {
                    tracing::warn!(
                        service_name = %service_name,
                        "failed to resolve remote endpoint, omitting server address annotation"
                    );
                }
            }
            annotate(&mut annotations, start, CLIENT_SEND, local_endpoint);
            annotate(&mut annotations, start + duration, CLIENT_RECV, local_endpoint);
        }
        None => {
            annotate_binary(
                &mut binary_annotations,
                LOCAL_COMPONENT,
                local_endpoint.service_name.clone(),
                local_endpoint,
            );
        }
    }

    for (key, value) in &span.tags {
        annotate_binary(
            &mut binary_annotations,
            key.clone(),
            value.to_string(),
            local_endpoint,
        );
    }

    for log in &span.logs {
        match materializer(&log.fields) {
            Ok(rendered) => annotate(
                &mut annotations,
                micros_since_epoch(log.timestamp),
                &String::from_utf8_lossy(&rendered),
                local_endpoint,
            ),
            Err(err) => {
                tracing::warn!(error = %err, "failed to materialize log fields, skipping record");
            }
        }
    }

    Some(CoreSpan {
        name: span.operation_name,
        trace_id: encode_trace_id(span.context.trace_id.low, span.context.trace_id.high),
        id: encode_id(span.context.span_id),
        parent_id: span.context.parent_span_id.map(encode_id),
        debug: default_debug || span.context.debug,
        timestamp,
        duration: owned_duration,
        annotations,
        binary_annotations,
    })
}
