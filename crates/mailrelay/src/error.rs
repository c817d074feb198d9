//! Error types for opening relay sessions.

use thiserror::Error;

use crate::address::AddressError;

/// Stage of session setup an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Splitting the address into host and port.
    Parse,
    /// Connecting, reading the greeting and sending EHLO.
    Dial,
    /// STARTTLS and the TLS handshake.
    EncryptionUpgrade,
    /// AUTH PLAIN.
    Authentication,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse",
            Self::Dial => "dial",
            Self::EncryptionUpgrade => "encryption upgrade",
            Self::Authentication => "authentication",
        })
    }
}

/// Errors that can occur while establishing a session.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The address is not a valid `host:port`.
    #[error("failed to parse SMTP server info: {0}")]
    Parse(#[from] AddressError),

    /// The connection could not be opened.
    #[error("failed to dial {address}: {source}")]
    Dial {
        /// Address that was dialed.
        address: String,
        /// Underlying failure.
        #[source]
        source: mailrelay_smtp::Error,
    },

    /// STARTTLS was refused or the handshake failed.
    #[error("failed to StartTLS with {host}: {source}")]
    EncryptionUpgrade {
        /// Host used as the TLS server name.
        host: String,
        /// Underlying failure.
        #[source]
        source: mailrelay_smtp::Error,
    },

    /// Credentials were rejected or could not be sent.
    #[error("failed to authenticate client as {username}: {source}")]
    Authentication {
        /// Username that was presented.
        username: String,
        /// Underlying failure.
        #[source]
        source: mailrelay_smtp::Error,
    },
}

impl ConnectError {
    /// Returns the phase that failed.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Parse(_) => Phase::Parse,
            Self::Dial { .. } => Phase::Dial,
            Self::EncryptionUpgrade { .. } => Phase::EncryptionUpgrade,
            Self::Authentication { .. } => Phase::Authentication,
        }
    }

    /// Returns the transport-level cause, if the failure happened on the wire.
    #[must_use]
    pub const fn transport_error(&self) -> Option<&mailrelay_smtp::Error> {
        match self {
            Self::Parse(_) => None,
            Self::Dial { source, .. }
            | Self::EncryptionUpgrade { source, .. }
            | Self::Authentication { source, .. } => Some(source),
        }
    }
}
