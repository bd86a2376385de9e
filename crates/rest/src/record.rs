//! Schema-bound records.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::schema::EntitySchema;
use crate::value::FieldValue;

/// One materialized record of an entity, bound to its schema.
///
/// Field access is strict: reading or writing a field the schema does not
/// know is an `Argument` error, while a known field that was never set
/// reads as `Null`. Keys may be wire names or label-derived keys; values
/// are stored under the wire name.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<EntitySchema>,
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// An empty record of the given entity.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            fields: HashMap::new(),
        }
    }

    /// The record's entity type.
    pub fn entity_type(&self) -> &str {
        self.schema.entity_type()
    }

    /// The schema this record is bound to.
    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Read a field by wire name or label key. Known-but-unset fields read
    /// as `Null`; unknown fields are errors.
    pub fn get(&self, key: &str) -> Result<FieldValue> {
        match self.schema.resolve(key) {
            Some(descriptor) => Ok(self
                .fields
                .get(&descriptor.name)
                .cloned()
                .unwrap_or(FieldValue::Null)),
            None => Err(crate::error::Error::argument(format!(
                "no field named '{}' on entity '{}'",
                key,
                self.entity_type()
            ))),
        }
    }

    /// Write a field by wire name or label key. Unknown fields are errors.
    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<()> {
        match self.schema.resolve(key) {
            Some(descriptor) => {
                self.fields.insert(descriptor.name.clone(), value);
                Ok(())
            }
            None => Err(crate::error::Error::argument(format!(
                "no field named '{}' on entity '{}'",
                key,
                self.entity_type()
            ))),
        }
    }

    /// The record identifier, when an `Id` field is set.
    pub fn id(&self) -> Option<String> {
        self.fields.get("Id").and_then(|v| match v {
            FieldValue::Text(s) => Some(s.clone()),
            _ => None,
        })
    }

    /// Iterate over the set fields as `(wire_name, value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of set fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // Internal write path for the materializer; the name is already a
    // validated wire name.
    pub(crate) fn insert_wire(&mut self, wire_name: String, value: FieldValue) {
        self.fields.insert(wire_name, value);
    }
}
