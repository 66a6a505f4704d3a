//! Record type graphs → JSON Schema documents annotated with Java type names.
//!
//! ```
//! use std::collections::HashMap;
//! use schemagen::catalog::Catalog;
//! use schemagen::introspect::Field;
//!
//! let mut types = Catalog::new();
//! let pet = types.record("example.com/pets", "Pet");
//! let name = types.string();
//! types.set_fields(pet, vec![Field::new("Name", name)]);
//!
//! let doc = schemagen::generate_schema(&types, pet, &[], &HashMap::new()).unwrap();
//! assert_eq!(doc.id, "http://fabric8.io/fabric8/v2/Pet#");
//! assert!(doc.definitions.is_none());
//! ```
//!
//! - [`introspect`]: the capability trait the generator walks
//! - [`catalog`]: bundled, JSON-loadable implementation of that trait
//! - [`generate`]: the traversal and schema synthesis
//! - [`schema`]: the produced document
//! - [`config`]: namespace table and type substitutions
pub mod catalog;
pub mod config;
pub mod error;
pub mod generate;
pub mod introspect;
pub mod ir;
pub mod path_de;
pub mod schema;

pub use config::{GeneratorConfig, PackageDescriptor};
pub use error::{CatalogError, SchemaError};
pub use generate::{SchemaGenerator, generate_schema};
pub use schema::SchemaDocument;
