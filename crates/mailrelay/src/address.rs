//! Relay server addresses.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Well-known mail service names accepted in place of a numeric port.
const SERVICE_PORTS: &[(&str, u16)] = &[
    ("smtp", 25),
    ("submission", 587),
    ("submissions", 465),
    ("smtps", 465),
];

/// Reasons a `host:port` string cannot be split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// No `:` separator, or nothing after a bracketed host.
    #[error("missing port in address {0:?}")]
    MissingPort(String),

    /// An unbracketed host contains a colon.
    #[error("too many colons in address {0:?}")]
    TooManyColons(String),

    /// `[` without a matching `]`.
    #[error("missing ']' in address {0:?}")]
    MissingBracket(String),

    /// A bracket where none is allowed.
    #[error("unexpected bracket in address {0:?}")]
    UnexpectedBracket(String),

    /// Nothing before the separator.
    #[error("empty host in address {0:?}")]
    EmptyHost(String),

    /// Nothing after the separator.
    #[error("empty port in address {0:?}")]
    EmptyPort(String),

    /// Numeric port outside 0..=65535.
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    /// Symbolic port that is not a known mail service.
    #[error("unknown service {0:?}")]
    UnknownService(String),
}

/// A relay server host and port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    host: String,
    port: u16,
    /// False when the port was written as a service name or zero-padded.
    decimal_port: bool,
}

impl ServerAddress {
    /// Creates an address from parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            decimal_port: true,
        }
    }

    /// Parses `host:port`.
    ///
    /// IPv6 hosts must be bracketed (`[::1]:587`). The port is either a
    /// number or one of `smtp`, `submission`, `submissions`, `smtps`.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] describing the first problem found.
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let (host, port) = split_host_port(address)?;
        if host.is_empty() {
            return Err(AddressError::EmptyHost(address.to_string()));
        }
        if port.is_empty() {
            return Err(AddressError::EmptyPort(address.to_string()));
        }
        let number = resolve_port(port)?;
        Ok(Self {
            host: host.to_string(),
            port: number,
            decimal_port: port == number.to_string(),
        })
    }

    /// Returns the host, without IPv6 brackets.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns true if the port was written in its plain decimal form.
    ///
    /// `relay:25` is; `relay:smtp` and `relay:025` are not.
    #[must_use]
    pub const fn has_decimal_port(&self) -> bool {
        self.decimal_port
    }
}

impl FromStr for ServerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

fn split_host_port(address: &str) -> Result<(&str, &str), AddressError> {
    let err = |make: fn(String) -> AddressError| make(address.to_string());

    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let Some(end) = rest.find(']') else {
            return Err(err(AddressError::MissingBracket));
        };
        let host = &rest[..end];
        let port = match rest[end + 1..].strip_prefix(':') {
            Some(port) => port,
            None if rest[end + 1..].starts_with(']') => {
                return Err(err(AddressError::MissingBracket));
            }
            None => return Err(err(AddressError::MissingPort)),
        };
        if host.contains('[') {
            return Err(err(AddressError::UnexpectedBracket));
        }
        (host, port)
    } else {
        let Some((host, port)) = address.rsplit_once(':') else {
            return Err(err(AddressError::MissingPort));
        };
        if host.contains(':') {
            return Err(err(AddressError::TooManyColons));
        }
        if host.contains(['[', ']']) {
            return Err(err(AddressError::UnexpectedBracket));
        }
        (host, port)
    };

    if port.contains(['[', ']']) {
        return Err(err(AddressError::UnexpectedBracket));
    }
    Ok((host, port))
}

fn resolve_port(port: &str) -> Result<u16, AddressError> {
    if port.bytes().all(|b| b.is_ascii_digit()) {
        return port
            .parse()
            .map_err(|_| AddressError::InvalidPort(port.to_string()));
    }
    SERVICE_PORTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(port))
        .map(|&(_, number)| number)
        .ok_or_else(|| AddressError::UnknownService(port.to_string()))
}
