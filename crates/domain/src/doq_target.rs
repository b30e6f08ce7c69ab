use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// Default DoQ port (RFC 9250).
pub const DEFAULT_DOQ_PORT: u16 = 853;

/// Represents an upstream server address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

/// A DoQ server: where to dial and which name to present during the TLS handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DoqTarget {
    pub addr: UpstreamAddr,
    pub server_name: Arc<str>,
}

impl DoqTarget {
    /// Replaces the SNI name, keeping the dial address.
    pub fn with_server_name(mut self, server_name: &str) -> Self {
        self.server_name = server_name.into();
        self
    }
}

impl fmt::Display for DoqTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)
    }
}

fn parse_host_port(s: &str) -> Option<(&str, Option<u16>)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        if rest.is_empty() {
            return Some((host, None));
        }
        let port = rest.strip_prefix(':')?.parse::<u16>().ok()?;
        Some((host, Some(port)))
    } else {
        match s.rsplit_once(':') {
            Some((host, port_str)) if !host.contains(':') => {
                let port = port_str.parse::<u16>().ok()?;
                Some((host, Some(port)))
            }
            Some(_) => None,
            None => Some((s, None)),
        }
    }
}

impl FromStr for DoqTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("doq://")
            .or_else(|| s.strip_prefix("quic://"))
            .unwrap_or(s)
            .trim_end_matches('/');

        if rest.is_empty() {
            return Err(format!("Invalid DoQ address '{}': empty host", s));
        }

        if let Ok(addr) = rest.parse::<SocketAddr>() {
            return Ok(DoqTarget {
                addr: UpstreamAddr::Resolved(addr),
                server_name: addr.ip().to_string().into(),
            });
        }

        if let Ok(ip) = rest.trim_matches(|c| c == '[' || c == ']').parse::<std::net::IpAddr>() {
            return Ok(DoqTarget {
                addr: UpstreamAddr::Resolved(SocketAddr::new(ip, DEFAULT_DOQ_PORT)),
                server_name: ip.to_string().into(),
            });
        }

        let (host, port) = parse_host_port(rest).ok_or_else(|| {
            format!(
                "Invalid DoQ format '{}'. Expected 'doq://HOST:PORT' or 'HOST:PORT'",
                s
            )
        })?;
        if host.is_empty() {
            return Err(format!("Invalid DoQ address '{}': empty host", s));
        }

        Ok(DoqTarget {
            addr: UpstreamAddr::Unresolved {
                hostname: host.into(),
                port: port.unwrap_or(DEFAULT_DOQ_PORT),
            },
            server_name: host.into(),
        })
    }
}
