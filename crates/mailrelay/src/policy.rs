//! Relay trust policy.

use serde::{Deserialize, Serialize};

use crate::address::ServerAddress;

/// Conventional port for local, trusted relaying.
pub const SMTP_RELAY_PORT: u16 = 25;

/// How a relay connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayPolicy {
    /// Local relay: plaintext, no authentication.
    TrustedRelay,
    /// Remote relay: STARTTLS, then AUTH PLAIN.
    SecuredRelay,
}

impl RelayPolicy {
    /// Picks the policy for a port.
    ///
    /// Only `trusted_relay_port` selects [`RelayPolicy::TrustedRelay`]; with
    /// `None`, every port is secured.
    #[must_use]
    pub const fn for_port(port: u16, trusted_relay_port: Option<u16>) -> Self {
        match trusted_relay_port {
            Some(trusted) if trusted == port => Self::TrustedRelay,
            _ => Self::SecuredRelay,
        }
    }

    /// Picks the policy for a parsed address.
    ///
    /// The trusted path is taken only when the port was written exactly as
    /// the trusted port's decimal form. Service names and zero-padded ports
    /// that resolve to the same number are secured.
    #[must_use]
    pub const fn for_address(address: &ServerAddress, trusted_relay_port: Option<u16>) -> Self {
        if address.has_decimal_port() {
            Self::for_port(address.port(), trusted_relay_port)
        } else {
            Self::SecuredRelay
        }
    }

    /// Returns true if the connection must be upgraded with STARTTLS.
    #[must_use]
    pub const fn requires_encryption(self) -> bool {
        matches!(self, Self::SecuredRelay)
    }

    /// Returns true if the client must authenticate.
    #[must_use]
    pub const fn requires_authentication(self) -> bool {
        matches!(self, Self::SecuredRelay)
    }

    /// Returns the policy name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrustedRelay => "trusted_relay",
            Self::SecuredRelay => "secured_relay",
        }
    }
}

impl std::fmt::Display for RelayPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
