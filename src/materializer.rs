//! Renderers that turn a span's log fields into annotation values.
//!
//! The recorder is configured with one [`Materializer`] and applies it to
//! every log record; the rendered bytes become a timestamped annotation.

use crate::span::LogField;
use crate::Error;
use std::collections::BTreeMap;

/// Renders log fields into the bytes stored in an annotation value.
pub type Materializer = fn(&[LogField]) -> Result<Vec<u8>, Error>;

/// The log field whose value the strict materializer keeps.
const EVENT_FIELD: &str = "event";

/// Render fields as logfmt, `key=value` pairs separated by spaces.
///
/// Values containing spaces or quotes, and empty values, are quoted.
pub fn materialize_with_logfmt(fields: &[LogField]) -> Result<Vec<u8>, Error> {
    let mut rendered = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            rendered.push(' ');
        }
        rendered.push_str(&field.key);
        rendered.push('=');
        let value = field.value.to_string();
        if value.is_empty() || value.contains(' ') || value.contains('"') {
            rendered.push('"');
            rendered.push_str(&value.replace('\\', "\\\\").replace('"', "\\\""));
            rendered.push('"');
        } else {
            rendered.push_str(&value);
        }
    }
    Ok(rendered.into_bytes())
}

/// Render fields as one JSON object of stringified values.
pub fn materialize_with_json(fields: &[LogField]) -> Result<Vec<u8>, Error> {
    let object: BTreeMap<&str, String> = fields
        .iter()
        .map(|field| (field.key.as_str(), field.value.to_string()))
        .collect();
    Ok(serde_json::to_vec(&object)?)
}

/// Keep only the `event` field's value and discard everything else.
///
/// A record without an `event` field is an error; the recorder logs it and
/// skips the record.
pub fn strict_materializer(fields: &[LogField]) -> Result<Vec<u8>, Error> {
    fields
        .iter()
        .find(|field| field.key == EVENT_FIELD)
        .map(|field| field.value.to_string().into_bytes())
        .ok_or_else(|| Error::Other("log record has no event field".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logfmt_joins_pairs_with_spaces() {
        let fields = vec![
            LogField::new("event", "retry"),
            LogField::new("attempt", 3i64),
            LogField::new("final", false),
        ];
        let rendered = materialize_with_logfmt(&fields).unwrap();
        assert_eq!(rendered, b"event=retry attempt=3 final=false");
    }

    #[test]
    fn logfmt_quotes_values_with_spaces_and_quotes() {
        let fields = vec![
            LogField::new("message", "connection \"reset\" by peer"),
            LogField::new("empty", ""),
        ];
        let rendered = String::from_utf8(materialize_with_logfmt(&fields).unwrap()).unwrap();
        assert_eq!(
            rendered,
            r#"message="connection \"reset\" by peer" empty="""#
        );
    }

    #[test]
    fn json_renders_an_object_of_strings() {
        let fields = vec![
            LogField::new("event", "retry"),
            LogField::new("attempt", 3i64),
        ];
        let rendered = materialize_with_json(&fields).unwrap();
        assert_eq!(rendered, br#"{"attempt":"3","event":"retry"}"#);
    }

    #[test]
    fn strict_keeps_only_the_event_field() {
        let fields = vec![
            LogField::new("attempt", 3i64),
            LogField::new("event", "retry"),
        ];
        assert_eq!(strict_materializer(&fields).unwrap(), b"retry");
    }

    #[test]
    fn strict_rejects_records_without_an_event() {
        let fields = vec![LogField::new("attempt", 3i64)];
        assert!(strict_materializer(&fields).is_err());
    }
}
