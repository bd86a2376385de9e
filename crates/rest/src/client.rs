//! High-level record-store client.
//!
//! The facade composes the pieces: it resolves entity schemas through its
//! registry, routes every HTTP call through the engine's verb surface, and
//! converts bodies with the materializer. It owns no coercion or transport
//! logic of its own.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::instrument;

use forcedata_client::{ApiResponse, AuthMode, ClientConfig, Connection};

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::materialize;
use crate::record::Record;
use crate::registry::SchemaRegistry;
use crate::schema::EntitySchema;

/// Client for a Force.com-style record store.
///
/// Cloning is cheap: clones share the session and the schema registry, so
/// a token renewed through one clone and a schema fetched through another
/// are visible everywhere.
#[derive(Debug, Clone)]
pub struct Client {
    connection: Connection,
    registry: Arc<SchemaRegistry>,
}

impl Client {
    /// Create a client with the given configuration and an empty session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_connection(Connection::new(config)?))
    }

    /// Wrap an existing connection.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection,
            registry: Arc::new(SchemaRegistry::new()),
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Authenticate the shared session. See [`AuthMode`] for the modes.
    pub async fn authenticate(&self, mode: AuthMode) -> Result<String> {
        Ok(self.connection.authenticate(mode).await?)
    }

    fn data_path(&self, suffix: &str) -> String {
        format!(
            "/services/data/v{}/{}",
            self.connection.config().api_version,
            suffix
        )
    }

    // =========================================================================
    // Schema catalog
    // =========================================================================

    /// The schema for an entity, fetching and caching its describe payload
    /// on first use.
    #[instrument(skip(self))]
    pub async fn register_or_get(&self, entity_type: &str) -> Result<Arc<EntitySchema>> {
        if let Some(schema) = self.registry.get(entity_type) {
            return Ok(schema);
        }

        let describe = self.describe_entity(entity_type).await?;
        let schema = Arc::new(EntitySchema::from_describe(&describe)?);
        self.registry.insert(Arc::clone(&schema));
        Ok(schema)
    }

    /// The raw describe payload for an entity, uncached.
    pub async fn describe_entity(&self, entity_type: &str) -> Result<Value> {
        let response = self
            .connection
            .get(
                &self.data_path(&format!("sobjects/{}/describe", entity_type)),
                &[],
                &[],
            )
            .await?;
        Ok(response.json_value()?)
    }

    /// Summaries of every entity the store exposes, from the global
    /// describe.
    pub async fn describe_all(&self) -> Result<Vec<Value>> {
        let body = self.global_describe().await?;
        Ok(body
            .get("sobjects")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Names of every entity the store exposes.
    pub async fn list_entity_types(&self) -> Result<Vec<String>> {
        let sobjects = self.describe_all().await?;
        Ok(sobjects
            .iter()
            .filter_map(|s| s.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn global_describe(&self) -> Result<Value> {
        let response = self
            .connection
            .get(&self.data_path("sobjects"), &[], &[])
            .await?;
        Ok(response.json_value()?)
    }

    // =========================================================================
    // Record operations
    // =========================================================================

    /// Retrieve one record by id.
    #[instrument(skip(self))]
    pub async fn find(&self, entity_type: &str, id: &str) -> Result<Record> {
        let schema = self.register_or_get(entity_type).await?;
        let response = self
            .connection
            .get(
                &self.data_path(&format!(
                    "sobjects/{}/{}",
                    entity_type,
                    urlencoding::encode(id)
                )),
                &[],
                &[],
            )
            .await?;
        let raw = response.json_value()?;
        Ok(materialize::from_wire(&schema, &raw))
    }

    /// Run a SOQL query.
    #[instrument(skip(self))]
    pub async fn query(&self, soql: &str) -> Result<Collection> {
        let response = self
            .connection
            .get(&self.data_path("query"), &[("q", soql)], &[])
            .await?;
        self.collection_from(&response, None).await
    }

    /// Run a SOSL search.
    #[instrument(skip(self))]
    pub async fn search(&self, sosl: &str) -> Result<Collection> {
        let response = self
            .connection
            .get(&self.data_path("search"), &[("q", sosl)], &[])
            .await?;
        self.collection_from(&response, None).await
    }

    /// Records the authenticated user viewed most recently.
    pub async fn recent(&self) -> Result<Collection> {
        let response = self
            .connection
            .get(&self.data_path("recent"), &[], &[])
            .await?;
        self.collection_from(&response, None).await
    }

    /// Create a record from an attribute map. The returned record echoes
    /// the coerced attributes plus the id the store assigned.
    #[instrument(skip(self, attrs))]
    pub async fn create(
        &self,
        entity_type: &str,
        attrs: &Map<String, Value>,
    ) -> Result<Record> {
        let schema = self.register_or_get(entity_type).await?;
        let mut body = materialize::to_wire(&schema, attrs);

        let response = self
            .connection
            .post(
                &self.data_path(&format!("sobjects/{}", entity_type)),
                Some(&body),
                &[],
                &[],
            )
            .await?;

        let created = response.json_value()?;
        if let (Some(id), Some(object)) = (
            created.get("id").and_then(Value::as_str),
            body.as_object_mut(),
        ) {
            object.insert("Id".to_string(), Value::String(id.to_string()));
        }

        Ok(materialize::from_wire(&schema, &body))
    }

    /// Update a record's attributes in place.
    #[instrument(skip(self, attrs))]
    pub async fn update(
        &self,
        entity_type: &str,
        id: &str,
        attrs: &Map<String, Value>,
    ) -> Result<()> {
        let schema = self.register_or_get(entity_type).await?;
        let body = materialize::to_wire(&schema, attrs);
        self.connection
            .patch(
                &self.data_path(&format!(
                    "sobjects/{}/{}",
                    entity_type,
                    urlencoding::encode(id)
                )),
                Some(&body),
                &[],
                &[],
            )
            .await?;
        Ok(())
    }

    /// Create or update a record addressed by an external id field.
    /// Returns the assigned id when the store created a new record.
    #[instrument(skip(self, attrs))]
    pub async fn upsert(
        &self,
        entity_type: &str,
        external_field: &str,
        external_value: &str,
        attrs: &Map<String, Value>,
    ) -> Result<Option<String>> {
        let schema = self.register_or_get(entity_type).await?;
        let body = materialize::to_wire(&schema, attrs);
        let response = self
            .connection
            .patch(
                &self.data_path(&format!(
                    "sobjects/{}/{}/{}",
                    entity_type,
                    external_field,
                    urlencoding::encode(external_value)
                )),
                Some(&body),
                &[],
                &[],
            )
            .await?;

        if response.body().trim().is_empty() {
            return Ok(None);
        }
        let created = response.json_value()?;
        Ok(created
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Delete a record by id.
    #[instrument(skip(self))]
    pub async fn delete(&self, entity_type: &str, id: &str) -> Result<()> {
        self.connection
            .delete(
                &self.data_path(&format!(
                    "sobjects/{}/{}",
                    entity_type,
                    urlencoding::encode(id)
                )),
                &[],
                &[],
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Fetch the page behind an opaque next-page cursor.
    pub async fn next_page(&self, url: &str) -> Result<Collection> {
        self.fetch_page(url).await
    }

    /// Fetch the page behind an opaque previous-page cursor.
    pub async fn previous_page(&self, url: &str) -> Result<Collection> {
        self.fetch_page(url).await
    }

    async fn fetch_page(&self, url: &str) -> Result<Collection> {
        let response = self.connection.get(url, &[], &[]).await?;
        self.collection_from(&response, Some(url.to_string())).await
    }

    // =========================================================================
    // Result assembly
    // =========================================================================

    /// Build a collection from either result body shape: a cursor object
    /// with `records`/`totalSize`, or a bare array of rows as returned by
    /// search and recent. Rows may be heterogeneous; each is materialized
    /// against the entity named in its `attributes.type`.
    async fn collection_from(
        &self,
        response: &ApiResponse,
        current_url: Option<String>,
    ) -> Result<Collection> {
        let body = response.json_value()?;
        match &body {
            Value::Array(rows) => {
                let records = self.materialize_rows(rows).await?;
                let total = records.len() as u64;
                Ok(Collection::new(
                    self.clone(),
                    total,
                    records,
                    None,
                    None,
                    current_url,
                ))
            }
            Value::Object(object) => {
                let rows = object
                    .get("records")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let records = self.materialize_rows(&rows).await?;
                let total = object
                    .get("totalSize")
                    .and_then(Value::as_u64)
                    .unwrap_or(records.len() as u64);
                let next_url = object
                    .get("nextRecordsUrl")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let previous_url = object
                    .get("previousRecordsUrl")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Ok(Collection::new(
                    self.clone(),
                    total,
                    records,
                    next_url,
                    previous_url,
                    current_url,
                ))
            }
            _ => Err(Error::argument(
                "result body is neither an object nor an array",
            )),
        }
    }

    async fn materialize_rows(&self, rows: &[Value]) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let entity_type = row
                .pointer("/attributes/type")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::argument("result row carries no attributes.type"))?
                .to_string();
            let schema = self.register_or_get(&entity_type).await?;
            records.push(materialize::from_wire(&schema, row));
        }
        Ok(records)
    }
}
