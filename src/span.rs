//! Generic, protocol-agnostic representation of a finished span.
//!
//! This is the input side of the recorder: a tracing frontend hands a
//! [`RawSpan`] to [`SpanRecorder::record_span`](crate::SpanRecorder::record_span)
//! once the span completes, and the recorder translates it into the wire
//! model in [`model`](crate::model).

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, SystemTime};

/// Reserved tag key that selects how a span is annotated. See
/// [`model`](crate::model) for the recognized values.
pub const SPAN_KIND: &str = "span.kind";

/// Tag key naming the remote service of a `resource` span.
pub const PEER_SERVICE: &str = "peer.service";

/// Tag key naming the remote host of a `resource` span.
pub const PEER_HOSTNAME: &str = "peer.hostname";

/// Tag key naming the remote port of a `resource` span.
pub const PEER_PORT: &str = "peer.port";

/// A trace identifier, either 64-bit (`high` absent) or 128-bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceId {
    /// The low 64 bits of the identifier.
    pub low: u64,
    /// The high 64 bits, present only for 128-bit identifiers.
    pub high: Option<u64>,
}

impl From<u64> for TraceId {
    fn from(low: u64) -> Self {
        TraceId { low, high: None }
    }
}

/// Identifiers and flags linking a span into its trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanContext {
    /// Identifier shared by every span of the trace.
    pub trace_id: TraceId,
    /// Identifier of this span.
    pub span_id: u64,
    /// Identifier of the parent span, absent for a root span.
    pub parent_span_id: Option<u64>,
    /// Whether the span was sampled. Unsampled spans are dropped at
    /// translation time.
    pub sampled: bool,
    /// Whether the span carries the debug flag.
    pub debug: bool,
    /// Whether this process measured the span's timing itself, as opposed
    /// to relaying timing recorded elsewhere.
    pub owner: bool,
}

impl SpanContext {
    /// Create a context for a span that is sampled and owned by this
    /// process, with no parent and no debug flag.
    pub fn new(trace_id: TraceId, span_id: u64) -> Self {
        SpanContext {
            trace_id,
            span_id,
            parent_span_id: None,
            sampled: true,
            debug: false,
            owner: true,
        }
    }

    /// Set the parent span identifier.
    pub fn with_parent(mut self, parent_span_id: u64) -> Self {
        self.parent_span_id = Some(parent_span_id);
        self
    }
}

/// A tag or log-field value.
///
/// The closed set of variants keeps stringification explicit per type:
/// booleans render as the literals `true`/`false`, numbers use their
/// standard formatting, and bytes are rendered as lossy UTF-8.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean values.
    Bool(bool),
    /// Signed integer values.
    I64(i64),
    /// Floating point values.
    F64(f64),
    /// String values.
    String(String),
    /// Opaque byte values.
    Bytes(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "{}", String::from_utf8_lossy(v)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// One field of a [`LogRecord`].
#[derive(Clone, Debug, PartialEq)]
pub struct LogField {
    /// Field name.
    pub key: String,
    /// Field value.
    pub value: Value,
}

impl LogField {
    /// Create a log field.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        LogField {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A timestamped set of log fields attached to a span.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    /// When the record was emitted.
    pub timestamp: SystemTime,
    /// The record's fields, rendered by the recorder's materializer.
    pub fields: Vec<LogField>,
}

impl LogRecord {
    /// Create a log record.
    pub fn new(timestamp: SystemTime, fields: Vec<LogField>) -> Self {
        LogRecord { timestamp, fields }
    }
}

/// A finished span as produced by a tracing frontend.
#[derive(Clone, Debug)]
pub struct RawSpan {
    /// The operation the span measured.
    pub operation_name: String,
    /// Identifiers and flags linking the span into its trace.
    pub context: SpanContext,
    /// When the operation started.
    pub start: SystemTime,
    /// How long the operation took.
    pub duration: Duration,
    /// Key/value attributes. The [`SPAN_KIND`] key is reserved.
    pub tags: HashMap<String, Value>,
    /// Timestamped log records.
    pub logs: Vec<LogRecord>,
}

impl RawSpan {
    /// Create a span with no tags and no logs.
    pub fn new(
        operation_name: impl Into<String>,
        context: SpanContext,
        start: SystemTime,
        duration: Duration,
    ) -> Self {
        RawSpan {
            operation_name: operation_name.into(),
            context,
            start,
            duration,
            tags: HashMap::new(),
            logs: Vec::new(),
        }
    }

    /// Attach a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Attach a log record.
    pub fn with_log(mut self, log: LogRecord) -> Self {
        self.logs.push(log);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_values_render_as_literals() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }

    #[test]
    fn numeric_and_byte_values_render() {
        assert_eq!(Value::I64(-42).to_string(), "-42");
        assert_eq!(Value::F64(0.5).to_string(), "0.5");
        assert_eq!(Value::Bytes(b"abc".to_vec()).to_string(), "abc");
    }

    #[test]
    fn context_defaults_to_sampled_root() {
        let cx = SpanContext::new(TraceId::from(1), 2);
        assert!(cx.sampled);
        assert!(cx.owner);
        assert_eq!(cx.parent_span_id, None);
        assert_eq!(cx.with_parent(7).parent_span_id, Some(7));
    }
}
