use crate::model::annotation::{Annotation, BinaryAnnotation};
use serde::Serialize;
use typed_builder::TypedBuilder;

/// The wire representation of one span, serialized into the JSON array a
/// collector POSTs to the backend.
///
/// `parentId`, `timestamp` and `duration` are omitted from the JSON body
/// when absent, never serialized as null. Timestamp and duration are only
/// present when the originating process owned the span's timing.
#[derive(TypedBuilder, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreSpan {
    /// Operation name.
    #[builder(setter(into))]
    pub name: String,
    /// Hex-encoded trace identifier, 16 or 32 characters.
    #[builder(setter(into))]
    pub trace_id: String,
    /// Hex-encoded span identifier, 16 characters.
    #[builder(setter(into))]
    pub id: String,
    /// Hex-encoded parent span identifier, absent for a root span.
    #[builder(setter(strip_option, into), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Debug flag.
    #[builder(default)]
    pub debug: bool,
    /// Start time in microseconds since the UNIX epoch, absent when the
    /// timing was measured by another process.
    #[builder(setter(strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Duration in microseconds, at least 1, absent when the timing was
    /// measured by another process.
    #[builder(setter(strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Timestamped protocol events.
    #[builder(default)]
    pub annotations: Vec<Annotation>,
    /// Key/value attributes.
    #[builder(default)]
    pub binary_annotations: Vec<BinaryAnnotation>,
}
