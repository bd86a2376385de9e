//! Conversion between raw JSON objects and schema-bound records.
//!
//! Three one-way functions cover the data paths: `from_wire` for payloads
//! the remote returned, `from_attrs` for caller-supplied attribute maps,
//! and `to_wire` for request bodies. The asymmetry in key handling is
//! deliberate: inbound extra keys are ignored (wire payloads carry
//! `attributes` metadata and may grow), caller attribute maps are strict,
//! and outbound unknown keys pass through so callers can address fields
//! a stale schema has not seen.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::EntitySchema;
use crate::value::{coerce_from_wire, coerce_to_wire};

/// Materialize a wire object into a record.
///
/// Every schema field is looked up in the raw object by wire name, then by
/// label-derived key; fields absent both ways stay unset. Raw keys with no
/// matching descriptor are ignored.
pub fn from_wire(schema: &Arc<EntitySchema>, raw: &Value) -> Record {
    let mut record = Record::new(Arc::clone(schema));
    let Some(object) = raw.as_object() else {
        return record;
    };

    for descriptor in schema.fields() {
        let value = object
            .get(&descriptor.name)
            .or_else(|| object.get(&descriptor.label_key()));
        if let Some(value) = value {
            record.insert_wire(
                descriptor.name.clone(),
                coerce_from_wire(&descriptor.field_type, value),
            );
        }
    }

    record
}

/// Build a record from a caller-supplied attribute map, applying the same
/// coercion as `from_wire`. Unknown keys are errors.
pub fn from_attrs(schema: &Arc<EntitySchema>, attrs: &Map<String, Value>) -> Result<Record> {
    let mut record = Record::new(Arc::clone(schema));
    for (key, value) in attrs {
        let descriptor = schema.resolve(key).ok_or_else(|| {
            Error::argument(format!(
                "no field named '{}' on entity '{}'",
                key,
                schema.entity_type()
            ))
        })?;
        record.insert_wire(
            descriptor.name.clone(),
            coerce_from_wire(&descriptor.field_type, value),
        );
    }
    Ok(record)
}

/// Render a caller-supplied attribute map as a wire object. Keys with a
/// descriptor are coerced per their field type and emitted under the wire
/// name; unknown keys pass through unchanged.
pub fn to_wire(schema: &EntitySchema, attrs: &Map<String, Value>) -> Value {
    let mut object = Map::with_capacity(attrs.len());
    for (key, value) in attrs {
        match schema.resolve(key) {
            Some(descriptor) => {
                object.insert(
                    descriptor.name.clone(),
                    coerce_to_wire(&descriptor.field_type, value),
                );
            }
            None => {
                object.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldType};
    use crate::value::FieldValue;
    use chrono::NaiveDate;
    use serde_json::json;

    fn schema() -> Arc<EntitySchema> {
        Arc::new(EntitySchema::new(
            "Car",
            vec![
                FieldDescriptor {
                    name: "Id".into(),
                    label: "Record Id".into(),
                    field_type: FieldType::Id,
                    createable: false,
                    updateable: false,
                    picklist_values: vec![],
                },
                FieldDescriptor {
                    name: "Name".into(),
                    label: "Name".into(),
                    field_type: FieldType::Text,
                    createable: true,
                    updateable: true,
                    picklist_values: vec![],
                },
                FieldDescriptor {
                    name: "SoldOn__c".into(),
                    label: "Sold On".into(),
                    field_type: FieldType::Date,
                    createable: true,
                    updateable: true,
                    picklist_values: vec![],
                },
                FieldDescriptor {
                    name: "Options__c".into(),
                    label: "Options".into(),
                    field_type: FieldType::Multipicklist,
                    createable: true,
                    updateable: true,
                    picklist_values: vec![],
                },
            ],
        ))
    }

    #[test]
    fn test_from_wire_coerces_and_ignores_extras() {
        let raw = json!({
            "attributes": {"type": "Car", "url": "/services/data/v23.0/sobjects/Car/001abc"},
            "Id": "001abc",
            "Name": "Speedster",
            "SoldOn__c": "2011-07-26",
            "Options__c": "sunroof;alloy wheels"
        });

        let record = from_wire(&schema(), &raw);
        assert_eq!(record.id(), Some("001abc".to_string()));
        assert_eq!(
            record.get("SoldOn__c").unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2011, 7, 26).unwrap())
        );
        assert_eq!(
            record.get("Options__c").unwrap(),
            FieldValue::Picklist(vec!["sunroof".into(), "alloy wheels".into()])
        );
    }

    #[test]
    fn test_from_wire_malformed_date_is_null_not_panic() {
        let record = from_wire(&schema(), &json!({"SoldOn__c": "not-a-date"}));
        assert!(record.get("SoldOn__c").unwrap().is_null());
    }

    #[test]
    fn test_from_wire_label_key_lookup() {
        let record = from_wire(&schema(), &json!({"Sold_On": "2011-07-26"}));
        assert_eq!(
            record.get("SoldOn__c").unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2011, 7, 26).unwrap())
        );
    }

    #[test]
    fn test_from_wire_absent_fields_stay_unset() {
        let record = from_wire(&schema(), &json!({"Name": "Speedster"}));
        assert_eq!(record.len(), 1);
        assert!(record.get("SoldOn__c").unwrap().is_null());
    }

    #[test]
    fn test_from_attrs_rejects_unknown_keys() {
        let attrs = json!({"Name": "Speedster", "Bogus__c": 1});
        let err = from_attrs(&schema(), attrs.as_object().unwrap()).unwrap_err();
        assert!(err.is_argument());
        assert!(err.to_string().contains("Bogus__c"));
    }

    #[test]
    fn test_from_attrs_coerces() {
        let attrs = json!({"Sold_On": "2011-07-26"});
        let record = from_attrs(&schema(), attrs.as_object().unwrap()).unwrap();
        assert_eq!(
            record.get("SoldOn__c").unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2011, 7, 26).unwrap())
        );
    }

    #[test]
    fn test_to_wire_multipicklist_array() {
        let attrs = json!({"Options__c": ["a", "b"]});
        let wire = to_wire(&schema(), attrs.as_object().unwrap());
        assert_eq!(wire, json!({"Options__c": "a;b"}));
    }

    #[test]
    fn test_to_wire_unknown_keys_pass_through() {
        let attrs = json!({"Name": "Speedster", "Future__c": 7});
        let wire = to_wire(&schema(), attrs.as_object().unwrap());
        assert_eq!(wire, json!({"Name": "Speedster", "Future__c": 7}));
    }

    #[test]
    fn test_to_wire_label_key_emits_wire_name() {
        let attrs = json!({"Sold_On": "2011-07-26"});
        let wire = to_wire(&schema(), attrs.as_object().unwrap());
        assert_eq!(wire, json!({"SoldOn__c": "2011-07-26"}));
    }
}
