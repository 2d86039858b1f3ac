use serde::Serialize;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use typed_builder::TypedBuilder;

/// The network identity stamped onto annotations: a service name plus the
/// address and port the service is reachable at.
#[derive(TypedBuilder, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Service the endpoint belongs to.
    #[builder(setter(into))]
    pub service_name: String,
    /// Port, `0` when not applicable.
    #[builder(default)]
    pub port: u16,
    /// IPv4 address, when the host resolved to one.
    #[builder(setter(strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    /// IPv6 address, when the host resolved to one.
    #[builder(setter(strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
}

impl Endpoint {
    /// Resolve a `host:port` string into an endpoint for `service_name`.
    ///
    /// The host may resolve to an IPv4 address, an IPv6 address, or both.
    /// Returns `None` when the input cannot be parsed or resolved at all;
    /// callers treat that as "omit the endpoint enrichment", not as fatal.
    pub fn resolve(host_port: &str, service_name: impl Into<String>) -> Option<Endpoint> {
        let addrs = host_port.to_socket_addrs().ok()?;

        let mut ipv4 = None;
        let mut ipv6 = None;
        let mut port = 0;
        let mut resolved = false;
        for addr in addrs {
            resolved = true;
            port = addr.port();
            match addr {
                SocketAddr::V4(v4) => {
                    ipv4.get_or_insert(*v4.ip());
                }
                SocketAddr::V6(v6) => {
                    ipv6.get_or_insert(*v6.ip());
                }
            }
        }
        if !resolved {
            return None;
        }

        Some(Endpoint {
            service_name: service_name.into(),
            port,
            ipv4,
            ipv6,
        })
    }

    /// The endpoint's address as a bare host string, preferring IPv4.
    pub(crate) fn host(&self) -> Option<String> {
        match (self.ipv4, self.ipv6) {
            (Some(v4), _) => Some(v4.to_string()),
            (None, Some(v6)) => Some(v6.to_string()),
            (None, None) => None,
        }
    }
}
