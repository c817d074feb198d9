//! PLAIN credentials (RFC 4616).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Username and password bound to the host they may be presented to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    host: String,
}

impl Credentials {
    /// Creates credentials for `host`.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the host these credentials are bound to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Checks that the credentials may be sent over a connection to `host`.
    ///
    /// Credentials only travel to the host they were created for, and only
    /// over TLS unless that host is the loopback interface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if either condition does not hold.
    pub fn check_channel(&self, host: &str, encrypted: bool) -> Result<()> {
        if !encrypted && !is_localhost(host) {
            return Err(Error::Auth("unencrypted connection".into()));
        }
        if host != self.host {
            return Err(Error::Auth(format!(
                "wrong host name: credentials are for {}, connection is to {host}",
                self.host
            )));
        }
        Ok(())
    }

    /// Encodes the PLAIN initial response: `\0<username>\0<password>` in base64.
    ///
    /// The authorization identity is left empty so the server derives it from
    /// the username.
    #[must_use]
    pub fn plain_response(&self) -> String {
        let auth_string = format!("\0{}\0{}", self.username, self.password);
        STANDARD.encode(auth_string.as_bytes())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

fn is_localhost(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}
