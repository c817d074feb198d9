//! Connection configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policy::SMTP_RELAY_PORT;

/// Settings for opening relay sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port treated as a trusted local relay (plaintext, no auth).
    /// `None` secures every port.
    pub trusted_relay_port: Option<u16>,
    /// Name announced in EHLO.
    pub client_hostname: String,
    /// Verify the server certificate during STARTTLS.
    pub verify_certificate: bool,
    /// Upper bound on opening the TCP connection. `None` waits for the OS.
    pub connect_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trusted_relay_port: Some(SMTP_RELAY_PORT),
            client_hostname: "localhost".to_string(),
            verify_certificate: true,
            connect_timeout: None,
        }
    }
}

impl Config {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the trusted relay port, or disables the trusted path with `None`.
    #[must_use]
    pub const fn trusted_relay_port(mut self, port: Option<u16>) -> Self {
        self.config.trusted_relay_port = port;
        self
    }

    /// Sets the name announced in EHLO.
    #[must_use]
    pub fn client_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.client_hostname = hostname.into();
        self
    }

    /// Turns server certificate verification on or off.
    ///
    /// Turning it off accepts self-signed and otherwise untrusted
    /// certificates; only do so for relays reached over a network you control.
    #[must_use]
    pub const fn verify_certificate(mut self, verify: bool) -> Self {
        self.config.verify_certificate = verify;
        self
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
