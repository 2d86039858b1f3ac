use std::env;
use std::time::Duration;

/// Default collector endpoint.
const DEFAULT_COLLECTOR_ENDPOINT: &str = "http://127.0.0.1:9411/api/v1/spans";

/// HTTP endpoint spans are posted to, e.g. "http://localhost:9411/api/v1/spans".
const ENV_ENDPOINT: &str = "ZIPKIN_COLLECTOR_ENDPOINT";

/// Maximum time the default client will wait for one batch delivery, in ms.
const ENV_TIMEOUT: &str = "ZIPKIN_COLLECTOR_TIMEOUT";

/// Default delivery timeout in milliseconds.
const DEFAULT_COLLECTOR_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Number of buffered spans that triggers a flush.
const ENV_BATCH_SIZE: &str = "ZIPKIN_COLLECTOR_BATCH_SIZE";

/// Default flush threshold.
const DEFAULT_BATCH_SIZE: usize = 100;

pub(crate) fn get_endpoint() -> String {
    match env::var(ENV_ENDPOINT).ok().filter(|var| !var.is_empty()) {
        Some(endpoint) => endpoint,
        None => DEFAULT_COLLECTOR_ENDPOINT.to_string(),
    }
}

pub(crate) fn get_timeout() -> Duration {
    match env::var(ENV_TIMEOUT).ok().filter(|var| !var.is_empty()) {
        Some(timeout) => match timeout.parse() {
            Ok(timeout) => Duration::from_millis(timeout),
            Err(err) => {
                tracing::warn!(%err, "{ENV_TIMEOUT} malformed, defaulting to 10000");
                DEFAULT_COLLECTOR_TIMEOUT
            }
        },
        None => DEFAULT_COLLECTOR_TIMEOUT,
    }
}

pub(crate) fn get_batch_size() -> usize {
    match env::var(ENV_BATCH_SIZE).ok().filter(|var| !var.is_empty()) {
        Some(batch_size) => match batch_size.parse() {
            Ok(batch_size) if batch_size > 0 => batch_size,
            _ => {
                tracing::warn!("{ENV_BATCH_SIZE} malformed, defaulting to {DEFAULT_BATCH_SIZE}");
                DEFAULT_BATCH_SIZE
            }
        },
        None => DEFAULT_BATCH_SIZE,
    }
}
