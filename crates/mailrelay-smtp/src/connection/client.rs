//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::auth::Credentials;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{AuthMechanism, Extension, Reply, ReplyCode};
use rustls::ClientConfig;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

/// Name sent in EHLO when the caller has not introduced itself yet.
const DEFAULT_CLIENT_NAME: &str = "localhost";

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    host: String,
    client_name: Option<String>,
    _state: PhantomData<State>,
}

/// Connection trait for all states.
pub trait SmtpConnection {
    /// Returns the server information.
    fn server_info(&self) -> &ServerInfo;

    /// Returns the host the connection was opened to.
    fn host(&self) -> &str;

    /// Returns true if the connection is TLS-encrypted.
    fn is_tls(&self) -> bool;
}

impl<S> SmtpConnection for Client<S> {
    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn is_tls(&self) -> bool {
        self.stream.is_tls()
    }
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// `host` is the name the stream was opened to; credentials are only
    /// ever sent to this host.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(mut stream: SmtpStream, host: impl Into<String>) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?.into_result()?;

        // First word after the code names the server
        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: HashSet::new(),
            },
            host: host.into(),
            client_name: None,
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// Servers that reject EHLO with a permanent error are greeted again with
    /// HELO; such servers advertise no extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if neither greeting is accepted.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let cmd = Command::Ehlo {
            hostname: client_hostname.to_string(),
        };
        let reply = self.send_command(cmd).await?;

        if reply.code.is_permanent() {
            tracing::debug!(code = %reply.code, "EHLO rejected, falling back to HELO");
            let cmd = Command::Helo {
                hostname: client_hostname.to_string(),
            };
            self.send_command(cmd).await?.into_result()?;
            self.server_info.extensions.clear();
        } else {
            let reply = reply.into_result()?;
            self.server_info.extensions = parse_extensions(&reply);
        }

        self.client_name = Some(client_hostname.to_string());
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS.
    ///
    /// `server_name` is presented as SNI; `config` decides whether the
    /// certificate chain is verified. EHLO is repeated on the encrypted
    /// channel since capabilities may change after the upgrade.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, server_name: &str, config: Arc<ClientConfig>) -> Result<Self> {
        if self.stream.is_tls() {
            return Err(Error::InvalidState("Already using TLS".into()));
        }
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.send_command(Command::StartTls).await?.into_result()?;

        self.stream = self.stream.upgrade_to_tls(server_name, config).await?;

        let client_name = self
            .client_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());
        let cmd = Command::Ehlo {
            hostname: client_name,
        };
        let reply = self.send_command(cmd).await?.into_result()?;
        self.server_info.extensions = parse_extensions(&reply);

        Ok(self)
    }

    /// Authenticates using PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not offer AUTH, the credentials may
    /// not be sent over this connection, or the server rejects them.
    pub async fn auth_plain(mut self, credentials: &Credentials) -> Result<Client<Authenticated>> {
        if !self.server_info.supports_auth() {
            return Err(Error::NotSupported("AUTH".into()));
        }
        credentials.check_channel(&self.host, self.stream.is_tls())?;

        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(credentials.plain_response()),
        };
        let reply = self.send_command(cmd).await?;

        if reply.code == ReplyCode::AUTH_CONTINUE {
            // Server ignored the initial response; abort the exchange
            self.stream.write_all(b"*\r\n").await?;
            if let Err(e) = read_reply(&mut self.stream).await {
                tracing::debug!(error = %e, "No reply to AUTH abort");
            }
            return Err(Error::Protocol(
                "Server requested a PLAIN challenge after the initial response".into(),
            ));
        }
        reply.into_result()?;

        Ok(Client {
            stream: self.stream,
            server_info: self.server_info,
            host: self.host,
            client_name: self.client_name,
            _state: PhantomData,
        })
    }
}

// Common implementation for all states
impl<S> Client<S> {
    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::trace!(verb = cmd.verb(), "C:");
        self.stream.write_all(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::trace!(code = %reply.code, "S:");
        Ok(reply)
    }

    /// Sends NOOP to check that the session is still alive.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not answer with a success reply.
    pub async fn noop(&mut self) -> Result<()> {
        self.send_command(Command::Noop).await?.into_result()?;
        Ok(())
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;

        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }

        Ok(())
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);

        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}

fn parse_extensions(reply: &Reply) -> HashSet<Extension> {
    // First line echoes the server name
    reply
        .message
        .iter()
        .skip(1)
        .map(|line| Extension::parse(line))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::connection::connect;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// Serves `script` as (command prefix, reply) pairs and returns what the client sent.
    async fn fake_server(
        script: &'static [(&'static str, &'static str)],
    ) -> (u16, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            socket.get_mut().write_all(b"220 fake.test ESMTP\r\n").await.unwrap();
            let mut received = Vec::new();
            loop {
                let mut line = String::new();
                match socket.read_line(&mut line).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                let line = line.trim_end().to_string();
                let reply = script
                    .iter()
                    .find(|(prefix, _)| line.starts_with(prefix))
                    .map_or("500 unrecognized\r\n", |(_, reply)| *reply);
                received.push(line);
                socket.get_mut().write_all(reply.as_bytes()).await.unwrap();
            }
            received
        });
        (port, handle)
    }

    async fn client(port: u16) -> Client<Connected> {
        let stream = connect("127.0.0.1", port).await.unwrap();
        Client::from_stream(stream, "127.0.0.1").await.unwrap()
    }

    #[tokio::test]
    async fn greeting_and_ehlo_record_capabilities() {
        let (port, server) = fake_server(&[
            ("EHLO", "250-fake.test\r\n250-STARTTLS\r\n250-SIZE 1000\r\n250 AUTH PLAIN LOGIN\r\n"),
            ("QUIT", "221 bye\r\n"),
        ])
        .await;

        let client = client(port).await.ehlo("me.test").await.unwrap();
        assert_eq!(client.server_info().hostname, "fake.test");
        assert!(client.server_info().supports_starttls());
        assert_eq!(
            client.server_info().auth_mechanisms(),
            vec![AuthMechanism::Plain, AuthMechanism::Login]
        );
        assert!(!client.is_tls());
        client.quit().await.unwrap();

        assert_eq!(server.await.unwrap(), vec!["EHLO me.test", "QUIT"]);
    }

    #[tokio::test]
    async fn ehlo_falls_back_to_helo() {
        let (port, server) = fake_server(&[
            ("EHLO", "502 command not implemented\r\n"),
            ("HELO", "250 fake.test\r\n"),
        ])
        .await;

        let client = client(port).await.ehlo("me.test").await.unwrap();
        assert!(client.server_info().extensions.is_empty());
        drop(client);

        assert_eq!(server.await.unwrap(), vec!["EHLO me.test", "HELO me.test"]);
    }

    #[tokio::test]
    async fn starttls_requires_advertisement() {
        let (port, server) = fake_server(&[("EHLO", "250 fake.test\r\n")]).await;

        let client = client(port).await.ehlo("me.test").await.unwrap();
        let config = crate::tls::client_config(false).unwrap();
        let err = client.starttls("127.0.0.1", config).await.unwrap_err();
        assert!(matches!(err, Error::NotSupported(ref what) if what == "STARTTLS"));

        assert_eq!(server.await.unwrap(), vec!["EHLO me.test"]);
    }

    #[tokio::test]
    async fn starttls_rejection_is_reported() {
        let (port, _server) = fake_server(&[
            ("EHLO", "250-fake.test\r\n250 STARTTLS\r\n"),
            ("STARTTLS", "454 TLS not available due to temporary reason\r\n"),
        ])
        .await;

        let client = client(port).await.ehlo("me.test").await.unwrap();
        let config = crate::tls::client_config(true).unwrap();
        let err = client.starttls("127.0.0.1", config).await.unwrap_err();
        assert_eq!(err.reply_code(), Some(454));
    }

    #[tokio::test]
    async fn auth_plain_over_loopback() {
        let (port, server) = fake_server(&[
            ("EHLO", "250-fake.test\r\n250 AUTH PLAIN\r\n"),
            ("AUTH PLAIN", "235 2.7.0 Authentication successful\r\n"),
            ("NOOP", "250 OK\r\n"),
        ])
        .await;

        let credentials = Credentials::new("user", "pass", "127.0.0.1");
        let client = client(port).await.ehlo("me.test").await.unwrap();
        let mut client = client.auth_plain(&credentials).await.unwrap();
        client.noop().await.unwrap();
        drop(client);

        assert_eq!(
            server.await.unwrap(),
            vec!["EHLO me.test", "AUTH PLAIN AHVzZXIAcGFzcw==", "NOOP"]
        );
    }

    #[tokio::test]
    async fn auth_rejection_is_reported() {
        let (port, _server) = fake_server(&[
            ("EHLO", "250-fake.test\r\n250 AUTH PLAIN\r\n"),
            ("AUTH", "535 5.7.8 Authentication credentials invalid\r\n"),
        ])
        .await;

        let credentials = Credentials::new("user", "wrong", "127.0.0.1");
        let client = client(port).await.ehlo("me.test").await.unwrap();
        let err = client.auth_plain(&credentials).await.unwrap_err();
        assert_eq!(err.reply_code(), Some(535));
    }

    #[tokio::test]
    async fn plain_challenge_is_aborted() {
        let (port, server) = fake_server(&[
            ("EHLO", "250-fake.test\r\n250 AUTH PLAIN\r\n"),
            ("AUTH", "334 \r\n"),
            ("*", "501 5.0.0 Authentication aborted\r\n"),
        ])
        .await;

        let credentials = Credentials::new("user", "pass", "127.0.0.1");
        let client = client(port).await.ehlo("me.test").await.unwrap();
        let err = client.auth_plain(&credentials).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));

        assert_eq!(
            server.await.unwrap(),
            vec!["EHLO me.test", "AUTH PLAIN AHVzZXIAcGFzcw==", "*"]
        );
    }

    #[tokio::test]
    async fn auth_requires_advertisement() {
        let (port, server) = fake_server(&[("EHLO", "250 fake.test\r\n")]).await;

        let credentials = Credentials::new("user", "pass", "127.0.0.1");
        let client = client(port).await.ehlo("me.test").await.unwrap();
        let err = client.auth_plain(&credentials).await.unwrap_err();
        assert!(matches!(err, Error::NotSupported(ref what) if what == "AUTH"));

        assert_eq!(server.await.unwrap(), vec!["EHLO me.test"]);
    }

    #[tokio::test]
    async fn rejected_greeting_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"554 no service\r\n").await.unwrap();
        });

        let stream = connect("127.0.0.1", port).await.unwrap();
        let err = Client::from_stream(stream, "127.0.0.1").await.unwrap_err();
        assert_eq!(err.reply_code(), Some(554));
    }
}
