//! Session handles returned to callers.

use mailrelay_smtp::{Authenticated, Client, Connected, Result, ServerInfo, SmtpConnection};

use crate::policy::RelayPolicy;

/// A ready-to-use relay session.
///
/// The caller owns the underlying connection and is responsible for closing it.
#[derive(Debug)]
pub enum Session<D, A> {
    /// Plaintext, unauthenticated session on the trusted relay port.
    Relay(D),
    /// Encrypted, authenticated session.
    Authenticated(A),
}

/// Session over the `mailrelay-smtp` client.
pub type SmtpSession = Session<Client<Connected>, Client<Authenticated>>;

impl<D, A> Session<D, A> {
    /// Returns the policy the session was opened under.
    #[must_use]
    pub const fn policy(&self) -> RelayPolicy {
        match self {
            Self::Relay(_) => RelayPolicy::TrustedRelay,
            Self::Authenticated(_) => RelayPolicy::SecuredRelay,
        }
    }

    /// Returns true if the session completed authentication.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the trusted-relay connection, if that is what this is.
    #[must_use]
    pub fn into_relay(self) -> Option<D> {
        match self {
            Self::Relay(connection) => Some(connection),
            Self::Authenticated(_) => None,
        }
    }

    /// Returns the authenticated connection, if that is what this is.
    #[must_use]
    pub fn into_authenticated(self) -> Option<A> {
        match self {
            Self::Relay(_) => None,
            Self::Authenticated(connection) => Some(connection),
        }
    }
}

impl SmtpSession {
    /// Returns the capabilities advertised by the server.
    #[must_use]
    pub fn server_info(&self) -> &ServerInfo {
        match self {
            Self::Relay(client) => client.server_info(),
            Self::Authenticated(client) => client.server_info(),
        }
    }

    /// Returns true if the connection is TLS-encrypted.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        match self {
            Self::Relay(client) => client.is_tls(),
            Self::Authenticated(client) => client.is_tls(),
        }
    }

    /// Sends NOOP to check that the session is still alive.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not acknowledge.
    pub async fn noop(&mut self) -> Result<()> {
        match self {
            Self::Relay(client) => client.noop().await,
            Self::Authenticated(client) => client.noop().await,
        }
    }

    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects QUIT.
    pub async fn quit(self) -> Result<()> {
        match self {
            Self::Relay(client) => client.quit().await,
            Self::Authenticated(client) => client.quit().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    type Fake = Session<&'static str, u32>;

    #[test]
    fn relay_session() {
        let session: Fake = Session::Relay("plain");
        assert_eq!(session.policy(), RelayPolicy::TrustedRelay);
        assert!(!session.is_authenticated());
        assert_eq!(session.into_relay(), Some("plain"));
    }

    #[test]
    fn authenticated_session() {
        let session: Fake = Session::Authenticated(7);
        assert_eq!(session.policy(), RelayPolicy::SecuredRelay);
        assert!(session.is_authenticated());
        assert_eq!(session.into_authenticated(), Some(7));

        let session: Fake = Session::Authenticated(7);
        assert_eq!(session.into_relay(), None);
    }
}
