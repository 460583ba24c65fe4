//! Stream schema model and the type mapper
//!
//! Streams are self-describing: each carries a JSON-Schema document whose
//! `properties` mapping drives column provisioning. `map_property` is the pure
//! mapping from a property's type descriptor to a warehouse column type; it is
//! total over any syntactically valid property schema and never fails, falling
//! back to a bounded text column for shapes it does not recognize.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::ColumnType;

/// Default maximum length for variable-length text columns.
///
/// The dialect rejects unbounded VARCHAR, so string properties without an
/// explicit length hint get this bound instead.
pub const DEFAULT_VARCHAR_LENGTH: u32 = 65_535;

/// A stream's JSON-Schema document, reduced to the parts provisioning needs.
///
/// Property order follows the source document; it determines column order in
/// the created table.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSchema {
    /// Property name to type descriptor, in document order
    #[serde(default)]
    pub properties: Option<IndexMap<String, PropertySchema>>,
}

impl StreamSchema {
    /// Parse a schema document from its JSON representation.
    ///
    /// Unknown JSON-Schema keywords are tolerated and ignored; a missing
    /// `properties` mapping is preserved as `None` so the provisioner can
    /// reject it with the offending table identity attached.
    pub fn from_value(document: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(document.clone())
            .map_err(|e| Error::schema(format!("unparseable stream schema: {}", e)))
    }

    /// The property mapping, or `None` when absent or empty.
    ///
    /// An empty mapping is treated the same as a missing one: there is no
    /// column list to provision from, and an empty table must never be
    /// created silently.
    pub fn usable_properties(&self) -> Option<&IndexMap<String, PropertySchema>> {
        self.properties.as_ref().filter(|p| !p.is_empty())
    }
}

/// A single property's type descriptor
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertySchema {
    /// JSON-Schema `type`: a single name or a union (commonly with "null")
    #[serde(rename = "type", default)]
    pub kind: Option<TypeSet>,

    /// Format hint (e.g. "date-time")
    #[serde(default)]
    pub format: Option<String>,

    /// Maximum length hint for strings
    #[serde(rename = "maxLength", default)]
    pub max_length: Option<u32>,
}

impl PropertySchema {
    /// The primary (non-null) type name, if any
    pub fn primary_type(&self) -> Option<&str> {
        self.kind.as_ref().and_then(TypeSet::primary)
    }
}

/// JSON-Schema `type` keyword: a single type name or a union of names
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    /// A single type name
    One(String),
    /// A union of type names, e.g. `["null", "string"]`
    Many(Vec<String>),
}

impl TypeSet {
    /// The first non-null member of the union
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::One(t) if t != "null" => Some(t.as_str()),
            Self::One(_) => None,
            Self::Many(ts) => ts.iter().map(String::as_str).find(|t| *t != "null"),
        }
    }
}

/// Map a property schema to a warehouse column type.
///
/// Deterministic and total: identical inputs always produce identical column
/// types, and unrecognized shapes fall back to bounded text rather than
/// erroring. The one dialect-specific rule lives here: text columns without an
/// explicit length hint get [`DEFAULT_VARCHAR_LENGTH`].
pub fn map_property(property: &PropertySchema) -> ColumnType {
    match property.primary_type() {
        Some("string") => match property.format.as_deref() {
            Some("date-time") => ColumnType::DateTime,
            Some("date") => ColumnType::Date,
            _ => ColumnType::Varchar(
                property.max_length.unwrap_or(DEFAULT_VARCHAR_LENGTH),
            ),
        },
        Some("integer") => ColumnType::BigInt,
        Some("number") => ColumnType::Double,
        Some("boolean") => ColumnType::Boolean,
        // Objects and arrays land as serialized JSON text
        Some("object") | Some("array") => ColumnType::Varchar(DEFAULT_VARCHAR_LENGTH),
        _ => ColumnType::Varchar(DEFAULT_VARCHAR_LENGTH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn property(value: serde_json::Value) -> PropertySchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_string_without_length_gets_default() {
        let col = map_property(&property(json!({"type": "string"})));
        assert_eq!(col, ColumnType::Varchar(65_535));
    }

    #[test]
    fn test_string_with_length_is_preserved() {
        let col = map_property(&property(json!({"type": "string", "maxLength": 120})));
        assert_eq!(col, ColumnType::Varchar(120));

        let col = map_property(&property(json!({"type": "string", "maxLength": 1})));
        assert_eq!(col, ColumnType::Varchar(1));
    }

    #[test]
    fn test_primitive_mappings() {
        assert_eq!(
            map_property(&property(json!({"type": "integer"}))),
            ColumnType::BigInt
        );
        assert_eq!(
            map_property(&property(json!({"type": "number"}))),
            ColumnType::Double
        );
        assert_eq!(
            map_property(&property(json!({"type": "boolean"}))),
            ColumnType::Boolean
        );
    }

    #[test]
    fn test_temporal_formats() {
        assert_eq!(
            map_property(&property(
                json!({"type": "string", "format": "date-time"})
            )),
            ColumnType::DateTime
        );
        assert_eq!(
            map_property(&property(json!({"type": "string", "format": "date"}))),
            ColumnType::Date
        );
        // No TIME type in this warehouse; the format hint degrades to text
        assert_eq!(
            map_property(&property(json!({"type": "string", "format": "time"}))),
            ColumnType::Varchar(65_535)
        );
    }

    #[test]
    fn test_composite_types_serialize_to_text() {
        assert_eq!(
            map_property(&property(json!({"type": "object"}))),
            ColumnType::Varchar(65_535)
        );
        assert_eq!(
            map_property(&property(json!({"type": "array"}))),
            ColumnType::Varchar(65_535)
        );
    }

    #[test]
    fn test_unknown_shapes_fall_back_to_text() {
        assert_eq!(map_property(&property(json!({}))), ColumnType::Varchar(65_535));
        assert_eq!(
            map_property(&property(json!({"type": "frobnicator"}))),
            ColumnType::Varchar(65_535)
        );
        assert_eq!(
            map_property(&property(json!({"type": "null"}))),
            ColumnType::Varchar(65_535)
        );
    }

    #[test]
    fn test_null_union_is_stripped() {
        let col = map_property(&property(json!({"type": ["null", "integer"]})));
        assert_eq!(col, ColumnType::BigInt);

        let col = map_property(&property(
            json!({"type": ["null", "string"], "maxLength": 36}),
        ));
        assert_eq!(col, ColumnType::Varchar(36));
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let prop = property(json!({"type": ["null", "string"], "maxLength": 64}));
        assert_eq!(map_property(&prop), map_property(&prop.clone()));
    }

    #[test]
    fn test_schema_parse_preserves_property_order() {
        let doc = json!({
            "type": "object",
            "properties": {
                "zebra": {"type": "string"},
                "alpha": {"type": "integer"},
                "middle": {"type": "boolean"}
            }
        });
        let schema = StreamSchema::from_value(&doc).unwrap();
        let names: Vec<&str> = schema
            .usable_properties()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["zebra", "alpha", "middle"]);
    }

    #[test]
    fn test_schema_without_properties() {
        let schema = StreamSchema::from_value(&json!({"type": "object"})).unwrap();
        assert!(schema.usable_properties().is_none());

        let schema = StreamSchema::from_value(&json!({"properties": {}})).unwrap();
        assert!(schema.usable_properties().is_none());
    }

    #[test]
    fn test_schema_tolerates_unknown_keywords() {
        let doc = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "required": ["id"],
            "additionalProperties": false,
            "properties": {"id": {"type": "integer", "minimum": 0}}
        });
        let schema = StreamSchema::from_value(&doc).unwrap();
        assert_eq!(schema.usable_properties().unwrap().len(), 1);
    }
}
