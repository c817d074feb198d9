//! The mail-transport collaborator used to open sessions.

use std::future::Future;
use std::time::Duration;

use mailrelay_smtp::connection::connect;
use mailrelay_smtp::{Authenticated, Client, Connected, Credentials, Error, Result, tls};

use crate::address::ServerAddress;
use crate::config::Config;

/// Dials relays, upgrades connections to TLS and authenticates them.
///
/// Each step consumes the connection produced by the previous one, so a
/// failed step leaves nothing half-open behind.
pub trait Transport {
    /// A connection that has been greeted but not authenticated.
    type Dialed: Send;
    /// A connection that has completed authentication.
    type Authenticated: Send;

    /// Opens a connection and completes the greeting.
    fn dial(&self, address: &ServerAddress) -> impl Future<Output = Result<Self::Dialed>> + Send;

    /// Negotiates STARTTLS, presenting `server_name` to the server.
    fn starttls(
        &self,
        connection: Self::Dialed,
        server_name: &str,
    ) -> impl Future<Output = Result<Self::Dialed>> + Send;

    /// Authenticates with AUTH PLAIN.
    fn authenticate(
        &self,
        connection: Self::Dialed,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Authenticated>> + Send;
}

/// [`Transport`] backed by the `mailrelay-smtp` client over TCP.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    client_hostname: String,
    verify_certificate: bool,
    connect_timeout: Option<Duration>,
}

impl SmtpTransport {
    /// Creates a transport from the connection settings in `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            client_hostname: config.client_hostname.clone(),
            verify_certificate: config.verify_certificate,
            connect_timeout: config.connect_timeout,
        }
    }
}

impl Transport for SmtpTransport {
    type Dialed = Client<Connected>;
    type Authenticated = Client<Authenticated>;

    async fn dial(&self, address: &ServerAddress) -> Result<Self::Dialed> {
        let connecting = connect(address.host(), address.port());
        let stream = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connecting)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => connecting.await?,
        };
        let client = Client::from_stream(stream, address.host()).await?;
        client.ehlo(&self.client_hostname).await
    }

    async fn starttls(&self, connection: Self::Dialed, server_name: &str) -> Result<Self::Dialed> {
        let config = tls::client_config(self.verify_certificate)?;
        connection.starttls(server_name, config).await
    }

    async fn authenticate(
        &self,
        connection: Self::Dialed,
        credentials: &Credentials,
    ) -> Result<Self::Authenticated> {
        connection.auth_plain(credentials).await
    }
}
