//! # mailrelay-smtp
//!
//! Async SMTP client primitives for opening relay sessions.
//!
//! ## Features
//!
//! - **Type-state connection management**: a session is either
//!   [`Connected`] or [`Authenticated`], checked at compile time
//! - **Session setup**: greeting, EHLO (with HELO fallback), STARTTLS, AUTH PLAIN
//! - **TLS**: rustls, with certificate verification on or off per upgrade
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailrelay_smtp::connection::connect;
//! use mailrelay_smtp::{Client, Credentials, tls};
//!
//! #[tokio::main]
//! async fn main() -> mailrelay_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream, "smtp.example.com").await?;
//!     let client = client.ehlo("client.example.com").await?;
//!
//!     let client = client
//!         .starttls("smtp.example.com", tls::client_config(true)?)
//!         .await?;
//!
//!     let credentials = Credentials::new("user@example.com", "password", "smtp.example.com");
//!     let client = client.auth_plain(&credentials).await?;
//!
//!     client.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── ehlo() / starttls() ───→ Connected
//! └──────────────┘
//!        │
//!        └─── auth_plain() ───→ Authenticated
//! ```
//!
//! ## Modules
//!
//! - [`auth`]: PLAIN credentials
//! - [`command`]: SMTP command builders
//! - [`connection`]: Connection management and type-state client
//! - [`parser`]: Response parser
//! - [`tls`]: rustls client configuration
//! - [`types`]: Core SMTP types (extensions, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod tls;
pub mod types;

pub use auth::Credentials;
pub use connection::{Authenticated, Client, Connected, ServerInfo, SmtpConnection};
pub use error::{Error, Result};
pub use types::{AuthMechanism, Extension, Reply, ReplyCode};
