//! forcedata: a schema-driven client for Force.com-style record stores.
//!
//! This crate re-exports the workspace members:
//!
//! - [`client`] (`forcedata-client`): OAuth session lifecycle, the
//!   authenticated verb surface, transparent token renewal on 401, and
//!   uniform remote-error translation.
//! - [`rest`] (`forcedata-rest`): describe-backed schema catalogs, type
//!   coercion, record materialization, and paginated collections.
//!
//! Most applications only need [`Client`]:
//!
//! ```no_run
//! use forcedata::{AuthMode, Client, ClientConfig};
//!
//! # async fn run() -> forcedata::rest::Result<()> {
//! let client = Client::new(ClientConfig::new("consumer_key", "consumer_secret"))?;
//! client
//!     .authenticate(AuthMode::Password {
//!         username: "user@example.com".into(),
//!         password: "password".into(),
//!     })
//!     .await?;
//!
//! let account = client.find("Account", "001D000000IqhSL").await?;
//! println!("{:?}", account.get("Name")?);
//! # Ok(())
//! # }
//! ```

pub use forcedata_client as client;
pub use forcedata_rest as rest;

pub use forcedata_client::{AuthMode, ClientConfig, ClientConfigBuilder, Connection, Session};
pub use forcedata_rest::{Client, Collection, FieldType, FieldValue, Record};
