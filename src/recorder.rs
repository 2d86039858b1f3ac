//! The recorder: wires span translation to a collector.

use crate::collector::Collector;
use crate::materializer::{materialize_with_logfmt, Materializer};
use crate::model::endpoint::Endpoint;
use crate::model::into_core_span;
use crate::span::RawSpan;
use crate::Error;
use std::fmt;

/// Default service identifier when none is configured.
const DEFAULT_SERVICE_NAME: &str = "unknown";

/// Host:port used when the application has no network address of its own.
const DEFAULT_HOST_PORT: &str = "0.0.0.0:0";

/// Receives finished spans from a tracing frontend.
///
/// This is the single upstream entry point: surrounding code calls
/// [`record_span`](SpanRecorder::record_span) once per completed span.
pub trait SpanRecorder: fmt::Debug + Send + Sync {
    /// Record a finished span. Must never block on or propagate backend
    /// failures into the caller.
    fn record_span(&self, span: RawSpan);
}

/// Translates spans into the Zipkin v1 JSON model and hands them to a
/// [`Collector`].
///
/// The local endpoint is resolved once at construction and stamped onto
/// every annotation the recorder emits.
#[derive(Debug)]
pub struct JsonRecorder {
    collector: Box<dyn Collector>,
    debug: bool,
    local_endpoint: Endpoint,
    materializer: Materializer,
}

impl JsonRecorder {
    /// Start building a [`JsonRecorder`].
    pub fn builder() -> JsonRecorderBuilder {
        JsonRecorderBuilder::default()
    }
}

impl SpanRecorder for JsonRecorder {
    fn record_span(&self, span: RawSpan) {
        let Some(core_span) =
            into_core_span(&self.local_endpoint, self.debug, self.materializer, span)
        else {
            return;
        };
        if let Err(err) = self.collector.collect(core_span) {
            tracing::debug!(error = %err, "collector rejected span");
        }
    }
}

/// Builder for [`JsonRecorder`].
#[derive(Debug)]
pub struct JsonRecorderBuilder {
    service_name: String,
    host_port: String,
    debug: bool,
    materializer: Materializer,
}

impl Default for JsonRecorderBuilder {
    fn default() -> Self {
        JsonRecorderBuilder {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            host_port: DEFAULT_HOST_PORT.to_string(),
            debug: false,
            materializer: materialize_with_logfmt,
        }
    }
}

impl JsonRecorderBuilder {
    /// Assign the service name under which spans are reported.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Assign the application's own `host:port`. Use a port of `0` when no
    /// port applies, and `"0.0.0.0:0"` when no network address applies.
    pub fn with_host_port(mut self, host_port: impl Into<String>) -> Self {
        self.host_port = host_port.into();
        self
    }

    /// Force the debug flag on every recorded span.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Assign the renderer applied to span log fields.
    pub fn with_materializer(mut self, materializer: Materializer) -> Self {
        self.materializer = materializer;
        self
    }

    /// Build a recorder backed by `collector`, resolving the local
    /// endpoint once. Fails when the configured `host:port` cannot be
    /// resolved.
    pub fn build<C: Collector + 'static>(self, collector: C) -> Result<JsonRecorder, Error> {
        let local_endpoint = Endpoint::resolve(&self.host_port, self.service_name)
            .ok_or(Error::UnresolvableEndpoint(self.host_port))?;
        Ok(JsonRecorder {
            collector: Box::new(collector),
            debug: self.debug,
            local_endpoint,
            materializer: self.materializer,
        })
    }
}
