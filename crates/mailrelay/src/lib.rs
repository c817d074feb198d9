//! # mailrelay
//!
//! Opens ready-to-use sessions with SMTP relay servers.
//!
//! Given a `host:port` address and credentials, [`establish`] parses the
//! address, picks a [`RelayPolicy`] from the port, and either returns a
//! plaintext session (trusted relay port, 25 by default) or upgrades the
//! connection with STARTTLS and authenticates with AUTH PLAIN.
//!
//! ## Example
//!
//! ```ignore
//! use mailrelay::{Config, establish_with};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailrelay::ConnectError> {
//!     // Internal relay with a self-signed certificate
//!     let config = Config::builder().verify_certificate(false).build();
//!     let session = establish_with(config, "relay.internal:587", "mailer", "secret").await?;
//!     assert!(session.is_authenticated());
//!     session.quit().await.ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Phases
//!
//! ```text
//! Unconnected ── dial ──→ Dialed ──┬── trusted relay ───────────────────→ Ready
//!                                  └── starttls ──→ Encrypted ── auth ──→ Ready
//! ```
//!
//! Each failure is reported as a [`ConnectError`] naming its [`Phase`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod config;
mod error;
mod establish;
mod policy;
mod session;
mod transport;

pub use address::{AddressError, ServerAddress};
pub use config::{Config, ConfigBuilder};
pub use error::{ConnectError, Phase};
pub use establish::{Establisher, establish, establish_with};
pub use policy::{RelayPolicy, SMTP_RELAY_PORT};
pub use session::{Session, SmtpSession};
pub use transport::{SmtpTransport, Transport};

pub use mailrelay_smtp::Credentials;
