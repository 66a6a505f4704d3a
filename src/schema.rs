//! Output model: the schema document and its descriptors.
//!
//! Everything here serializes straight to the JSON shape consumers expect;
//! byte encoding is left to the caller (`serde_json::to_string_pretty`, ...).
use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const SCHEMA_DIALECT: &str = "http://json-schema.org/schema#";
pub const DEFAULT_ID_PREFIX: &str = "http://fabric8.io/fabric8/v2/";
pub const DEFINITIONS_PATH: &str = "#/definitions/";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Integer,
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Unsupported field shape; renders as `{}`.
    Empty,
    Primitive(Primitive),
    Array(Box<PropertyDescriptor>),
    /// String-keyed map; holds the value schema.
    Map(Box<PropertyDescriptor>),
    /// `$ref` path into `definitions`.
    Reference(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub kind: PropertyKind,
    pub java_type: Option<String>,
}

/// Property set of one record type.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct ObjectDescriptor {
    pub properties: IndexMap<String, PropertyDescriptor>,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Definition {
    #[serde(rename = "type")]
    pub type_: &'static str,
    #[serde(flatten)]
    pub object: ObjectDescriptor,
    #[serde(rename = "javaType")]
    pub java_type: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SchemaDocument {
    pub id: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(rename = "type")]
    pub type_: &'static str,
    #[serde(flatten)]
    pub object: ObjectDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<BTreeMap<String, Definition>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::String => "string",
        }
    }
}

impl PropertyDescriptor {
    pub fn empty() -> Self {
        Self { kind: PropertyKind::Empty, java_type: None }
    }

    pub fn primitive(p: Primitive) -> Self {
        Self { kind: PropertyKind::Primitive(p), java_type: None }
    }

    pub fn array(items: PropertyDescriptor) -> Self {
        Self { kind: PropertyKind::Array(Box::new(items)), java_type: None }
    }

    pub fn map(values: PropertyDescriptor, java_type: String) -> Self {
        Self { kind: PropertyKind::Map(Box::new(values)), java_type: Some(java_type) }
    }

    pub fn reference(path: String, java_type: String) -> Self {
        Self { kind: PropertyKind::Reference(path), java_type: Some(java_type) }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, PropertyKind::Reference(_))
    }
}

impl Serialize for PropertyDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.kind {
            PropertyKind::Empty => {}
            PropertyKind::Primitive(p) => {
                map.serialize_entry("type", p.as_str())?;
            }
            PropertyKind::Array(items) => {
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
            }
            PropertyKind::Map(values) => {
                map.serialize_entry("type", "object")?;
                map.serialize_entry("additionalProperties", values)?;
            }
            PropertyKind::Reference(path) => {
                map.serialize_entry("$ref", path)?;
            }
        }
        if let Some(java_type) = &self.java_type {
            map.serialize_entry("javaType", java_type)?;
        }
        map.end()
    }
}

impl ObjectDescriptor {
    pub fn new(properties: IndexMap<String, PropertyDescriptor>) -> Self {
        Self { properties, additional_properties: true }
    }

    /// In-flight stand-in for a record whose fields are still being built.
    pub fn placeholder() -> Self {
        Self::new(IndexMap::new())
    }
}

impl Definition {
    pub fn new(object: ObjectDescriptor, java_type: String) -> Self {
        Self { type_: "object", object, java_type }
    }
}

impl SchemaDocument {
    /// Cross-reference table: schema name → foreign type name.
    pub fn java_types(&self) -> BTreeMap<&str, &str> {
        self.definitions
            .iter()
            .flatten()
            .map(|(name, def)| (name.as_str(), def.java_type.as_str()))
            .collect()
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
