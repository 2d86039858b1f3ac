use crate::model::endpoint::Endpoint;
use serde::Serialize;
use typed_builder::TypedBuilder;

/// Client-send annotation value.
pub const CLIENT_SEND: &str = "cs";
/// Client-receive annotation value.
pub const CLIENT_RECV: &str = "cr";
/// Server-receive annotation value.
pub const SERVER_RECV: &str = "sr";
/// Server-send annotation value.
pub const SERVER_SEND: &str = "ss";
/// Server-address binary annotation key, naming the remote side of a call.
pub const SERVER_ADDR: &str = "sa";
/// Local-component binary annotation key, marking in-process work.
pub const LOCAL_COMPONENT: &str = "lc";

/// A timestamped protocol event on a span, e.g. [`CLIENT_SEND`].
#[derive(TypedBuilder, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Microseconds since the UNIX epoch.
    pub timestamp: u64,
    /// The event, one of the fixed protocol vocabulary values.
    #[builder(setter(into))]
    pub value: String,
    /// The endpoint that observed the event.
    pub endpoint: Endpoint,
}

/// A key/value attribute on a span, not tied to an instant.
#[derive(TypedBuilder, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryAnnotation {
    /// Attribute key.
    #[builder(setter(into))]
    pub key: String,
    /// Stringified attribute value.
    #[builder(setter(into))]
    pub value: String,
    /// The endpoint the attribute is associated with.
    pub endpoint: Endpoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::builder().service_name("orders").port(8080).build()
    }

    #[test]
    fn annotation_serializes_with_endpoint() {
        let annotation = Annotation::builder()
            .timestamp(1_502_787_600_000_000)
            .value(CLIENT_SEND)
            .endpoint(endpoint())
            .build();
        assert_eq!(
            serde_json::to_string(&annotation).unwrap(),
            r#"{"timestamp":1502787600000000,"value":"cs","endpoint":{"serviceName":"orders","port":8080}}"#
        );
    }

    #[test]
    fn binary_annotation_serializes_with_endpoint() {
        let annotation = BinaryAnnotation::builder()
            .key("http.status_code")
            .value("200")
            .endpoint(endpoint())
            .build();
        assert_eq!(
            serde_json::to_string(&annotation).unwrap(),
            r#"{"key":"http.status_code","value":"200","endpoint":{"serviceName":"orders","port":8080}}"#
        );
    }
}
