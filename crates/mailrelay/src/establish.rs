//! Opening ready-to-use relay sessions.

use mailrelay_smtp::Credentials;
use tracing::{Instrument, debug, info_span, warn};

use crate::address::ServerAddress;
use crate::config::Config;
use crate::error::ConnectError;
use crate::policy::RelayPolicy;
use crate::session::{Session, SmtpSession};
use crate::transport::{SmtpTransport, Transport};

/// Opens sessions through a [`Transport`] according to a [`Config`].
///
/// Holds no per-connection state; one establisher can open any number of
/// independent sessions.
#[derive(Debug, Clone)]
pub struct Establisher<T> {
    transport: T,
    config: Config,
}

impl Establisher<SmtpTransport> {
    /// Creates an establisher over TCP with the given settings.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            transport: SmtpTransport::new(&config),
            config,
        }
    }
}

impl<T: Transport> Establisher<T> {
    /// Creates an establisher over a custom transport.
    #[must_use]
    pub const fn with_transport(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Connects to `address` and returns a ready session.
    ///
    /// On the trusted relay port the plaintext connection is returned as soon
    /// as the greeting completes, and `username`/`password` are ignored. Any
    /// other port is upgraded with STARTTLS, using the address host as the
    /// TLS server name, and then authenticated with AUTH PLAIN.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] naming the first phase that failed. Nothing
    /// is retried and no partially set up connection is returned.
    pub async fn establish(
        &self,
        address: &str,
        username: &str,
        password: &str,
    ) -> Result<Session<T::Dialed, T::Authenticated>, ConnectError> {
        let address = ServerAddress::parse(address)?;
        let policy = RelayPolicy::for_address(&address, self.config.trusted_relay_port);

        let span = info_span!(
            "establish",
            host = address.host(),
            port = address.port(),
            %policy
        );
        let result = self
            .open(&address, policy, username, password)
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.in_scope(|| {
                warn!(error = %e, phase = %e.phase(), "Failed to establish relay session");
            });
        }
        result
    }

    async fn open(
        &self,
        address: &ServerAddress,
        policy: RelayPolicy,
        username: &str,
        password: &str,
    ) -> Result<Session<T::Dialed, T::Authenticated>, ConnectError> {
        let connection = self
            .transport
            .dial(address)
            .await
            .map_err(|source| ConnectError::Dial {
                address: address.to_string(),
                source,
            })?;
        debug!("Dialed");

        if !policy.requires_encryption() {
            return Ok(Session::Relay(connection));
        }

        let connection = self
            .transport
            .starttls(connection, address.host())
            .await
            .map_err(|source| ConnectError::EncryptionUpgrade {
                host: address.host().to_string(),
                source,
            })?;
        debug!(verify_certificate = self.config.verify_certificate, "Encrypted");

        let credentials = Credentials::new(username, password, address.host());
        let connection = self
            .transport
            .authenticate(connection, &credentials)
            .await
            .map_err(|source| ConnectError::Authentication {
                username: username.to_string(),
                source,
            })?;
        debug!(username, "Authenticated");

        Ok(Session::Authenticated(connection))
    }
}

/// Connects to `address` with [`Config::default`].
///
/// See [`Establisher::establish`].
///
/// # Errors
///
/// Returns a [`ConnectError`] naming the first phase that failed.
pub async fn establish(
    address: &str,
    username: &str,
    password: &str,
) -> Result<SmtpSession, ConnectError> {
    establish_with(Config::default(), address, username, password).await
}

/// Connects to `address` with the given settings.
///
/// # Errors
///
/// Returns a [`ConnectError`] naming the first phase that failed.
pub async fn establish_with(
    config: Config,
    address: &str,
    username: &str,
    password: &str,
) -> Result<SmtpSession, ConnectError> {
    Establisher::new(config)
        .establish(address, username, password)
        .await
}
