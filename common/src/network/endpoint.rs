//! # Endpoint Model
//!
//! A probed service instance is identified by a `(host, port)` pair.
//!
//! This module turns one raw line of the target list into an [`Endpoint`].
//! Accepted forms:
//! * **Bare host**: `example.com`, `10.0.0.1`, `::1`.
//! * **Host and port**: `example.com:8080`, `[::1]:11434`.
//! * **URL**: `http://example.com:8080/api/tags` (scheme, credentials and path are dropped).
//!
//! Parsing is pure: no DNS lookups happen here.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use crate::error::ParseError;

/// Standard port of the model-serving API.
pub const DEFAULT_PORT: u16 = 11434;

/// A canonical `(host, port)` pair.
///
/// The host is stored lower-cased so that two spellings of the same name
/// compare equal. Ordering is lexicographic by host, then numeric by port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Builds an endpoint from already-validated parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    /// Normalizes one raw input line, substituting `default_port` when none is given.
    pub fn parse(line: &str, default_port: u16) -> Result<Self, ParseError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }

        let authority = strip_to_authority(trimmed);
        let (host, port) = split_host_port(authority)?;

        if host.is_empty() {
            return Err(ParseError::EmptyHost);
        }
        if !is_valid_host(host) {
            return Err(ParseError::InvalidHost(host.to_string()));
        }

        let port = match port {
            Some(raw) if !raw.is_empty() => parse_port(raw)?,
            _ => default_port,
        };

        Ok(Self::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL of the HTTP service behind this endpoint, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{self}")
    }

    fn is_ipv6_literal(&self) -> bool {
        self.host.contains(':')
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ipv6_literal() {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = ParseError;

    /// Parses with [`DEFAULT_PORT`] as the fallback port.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, DEFAULT_PORT)
    }
}

/// Drops the scheme, any credentials, and everything from the first path,
/// query or fragment delimiter onwards.
fn strip_to_authority(s: &str) -> &str {
    let without_scheme = match s.find("://") {
        Some(idx) => &s[idx + 3..],
        None => s,
    };

    let end = without_scheme
        .find(['/', '?', '#'])
        .unwrap_or(without_scheme.len());
    let authority = &without_scheme[..end];

    match authority.rfind('@') {
        Some(idx) => &authority[idx + 1..],
        None => authority,
    }
}

/// Splits an authority into its host and optional raw port.
fn split_host_port(authority: &str) -> Result<(&str, Option<&str>), ParseError> {
    if let Some(rest) = authority.strip_prefix('[') {
        let Some((host, after)) = rest.split_once(']') else {
            return Err(ParseError::UnterminatedBracket(authority.to_string()));
        };
        return match after {
            "" => Ok((host, None)),
            _ => match after.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(ParseError::InvalidPort(after.to_string())),
            },
        };
    }

    // More than one colon without brackets can only be a bare IPv6 address.
    if authority.matches(':').count() > 1 {
        return Ok((authority, None));
    }

    match authority.split_once(':') {
        Some((host, port)) => Ok((host, Some(port))),
        None => Ok((authority, None)),
    }
}

fn parse_port(raw: &str) -> Result<u16, ParseError> {
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(ParseError::InvalidPort(raw.to_string())),
        Ok(port) => Ok(port),
    }
}

fn is_valid_host(host: &str) -> bool {
    if host.contains(':') {
        return host.parse::<Ipv6Addr>().is_ok();
    }
    host.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
