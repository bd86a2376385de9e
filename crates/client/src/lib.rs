//! Authenticated HTTP engine for Force.com-style REST stores.
//!
//! This crate owns the transport concerns: OAuth authentication in its
//! three modes (password grant, externally supplied token, delegated
//! provider bundle), the verb surface with automatic `Authorization`
//! injection, uniform translation of non-success responses into
//! [`ErrorKind::Remote`] errors, and transparent token renewal with a
//! single retry on 401.
//!
//! Higher-level concerns (schema catalogs, record materialization,
//! collections) live in `forcedata-rest`, which drives everything through
//! [`Connection`].
//!
//! # Example
//!
//! ```no_run
//! use forcedata_client::{AuthMode, ClientConfig, Connection};
//!
//! # async fn run() -> forcedata_client::Result<()> {
//! let config = ClientConfig::new("consumer_key", "consumer_secret");
//! let conn = Connection::new(config)?;
//! conn.authenticate(AuthMode::Password {
//!     username: "user@example.com".into(),
//!     password: "password".into(),
//! })
//! .await?;
//!
//! let response = conn.get("/services/data/v23.0/sobjects", &[], &[]).await?;
//! println!("{}", response.body());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod repair;
pub mod session;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use connection::{ApiResponse, Connection, FormPart, FormPartBody, Verb};
pub use error::{remote_error, Error, ErrorKind, Result};
pub use repair::parse_lenient;
pub use session::{AuthMode, Session, TokenResponse};

/// Default remote API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "23.0";

/// Default host for token grants.
pub const DEFAULT_LOGIN_HOST: &str = "login.salesforce.com";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("forcedata/", env!("CARGO_PKG_VERSION"));
