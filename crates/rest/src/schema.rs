//! Entity schemas parsed from describe metadata.
//!
//! A describe payload enumerates an entity's fields with their wire types
//! and permissions. [`EntitySchema`] keeps the field descriptors in wire
//! order and indexes them twice: by wire name, and by a label-derived
//! alternate key (spaces replaced with underscores) so callers can address
//! a field by its display label as well.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Closed set of wire field types the coercer distinguishes. Types outside
/// the set are carried as `Other` and their values pass through uncoerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Boolean,
    Date,
    DateTime,
    Currency,
    Percent,
    Multipicklist,
    Picklist,
    Reference,
    Id,
    Other(String),
}

impl From<String> for FieldType {
    fn from(wire: String) -> Self {
        match wire.as_str() {
            "string" => FieldType::Text,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "currency" => FieldType::Currency,
            "percent" => FieldType::Percent,
            "multipicklist" => FieldType::Multipicklist,
            "picklist" => FieldType::Picklist,
            "reference" => FieldType::Reference,
            "id" => FieldType::Id,
            _ => FieldType::Other(wire),
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(String::deserialize(deserializer)?.into())
    }
}

/// One admissible value of a picklist or multipicklist field.
#[derive(Debug, Clone, Deserialize)]
pub struct PicklistEntry {
    pub value: String,
    #[serde(rename = "defaultValue", default)]
    pub default: bool,
}

/// Description of one field: wire name, display label, type, and the
/// create/update permissions the remote grants on it.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(rename = "picklistValues", default)]
    pub picklist_values: Vec<PicklistEntry>,
}

impl FieldDescriptor {
    /// The label-derived alternate key: spaces become underscores.
    pub fn label_key(&self) -> String {
        self.label.replace(' ', "_")
    }
}

/// Wire shape of a describe payload, reduced to what the catalog needs.
#[derive(Debug, Deserialize)]
struct DescribePayload {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
}

/// One catalog entry: an entity's field descriptors in wire order with
/// name and label-key indexes.
///
/// Wire names are assumed unique within an entity, which the remote
/// guarantees. Label keys may collide with each other or with wire names;
/// wire names always win on lookup.
#[derive(Debug)]
pub struct EntitySchema {
    entity_type: String,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    by_label_key: HashMap<String, usize>,
}

impl EntitySchema {
    /// Build a schema from an entity name and its field descriptors.
    pub fn new(entity_type: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let mut by_name = HashMap::with_capacity(fields.len());
        let mut by_label_key = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            by_name.insert(field.name.clone(), idx);
            let label_key = field.label_key();
            if !label_key.is_empty() {
                by_label_key.entry(label_key).or_insert(idx);
            }
        }

        Self {
            entity_type: entity_type.into(),
            fields,
            by_name,
            by_label_key,
        }
    }

    /// Build a schema from a raw describe payload.
    pub fn from_describe(describe: &serde_json::Value) -> Result<Self> {
        let payload: DescribePayload = serde_json::from_value(describe.clone())?;
        Ok(Self::new(payload.name, payload.fields))
    }

    /// The entity's wire name.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The field descriptors in wire order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Strict lookup by wire name. Unknown names are caller errors.
    pub fn field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.by_name
            .get(name)
            .map(|&idx| &self.fields[idx])
            .ok_or_else(|| {
                Error::argument(format!(
                    "no field named '{}' on entity '{}'",
                    name, self.entity_type
                ))
            })
    }

    /// Lookup by wire name, falling back to the label-derived key.
    pub fn resolve(&self, key: &str) -> Option<&FieldDescriptor> {
        self.by_name
            .get(key)
            .or_else(|| self.by_label_key.get(key))
            .map(|&idx| &self.fields[idx])
    }

    /// Wire names of all fields the remote accepts on create.
    pub fn createable_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.createable)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Wire names of all fields the remote accepts on update.
    pub fn updateable_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.updateable)
            .map(|f| f.name.clone())
            .collect()
    }
}
