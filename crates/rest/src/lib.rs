//! Schema-driven record access for Force.com-style stores.
//!
//! Built on top of `forcedata-client`, this crate adds the data model: a
//! describe-backed schema catalog with a per-client registry, total type
//! coercion between wire JSON and typed field values, strict schema-bound
//! records, and paginated collections whose cursors replay through the
//! engine that produced them.
//!
//! # Example
//!
//! ```no_run
//! use forcedata_rest::Client;
//! use forcedata_client::{AuthMode, ClientConfig};
//!
//! # async fn run() -> forcedata_rest::Result<()> {
//! let client = Client::new(ClientConfig::new("consumer_key", "consumer_secret"))?;
//! client
//!     .authenticate(AuthMode::Password {
//!         username: "user@example.com".into(),
//!         password: "password".into(),
//!     })
//!     .await?;
//!
//! let mut page = client.query("SELECT Id, Name FROM Account").await?;
//! while !page.is_empty() {
//!     for record in page.records() {
//!         println!("{:?}", record.get("Name")?);
//!     }
//!     page = page.next().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collection;
pub mod error;
pub mod materialize;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;

pub use client::Client;
pub use collection::Collection;
pub use error::{Error, ErrorKind, Result};
pub use record::Record;
pub use registry::SchemaRegistry;
pub use schema::{EntitySchema, FieldDescriptor, FieldType, PicklistEntry};
pub use value::{coerce_from_wire, coerce_to_wire, FieldValue};
