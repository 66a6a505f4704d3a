use std::path::PathBuf;

use thiserror::Error;

use crate::introspect::TypeKind;

/// The one way generation itself can fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("only record types can be converted (`{name}` is {kind})")]
    UnsupportedRootKind { name: String, kind: TypeKind },
}

/// Failures while building a catalog or resolving configuration against it.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),
    #[error("underlying type of `{0}` refers back to itself")]
    CyclicUnderlying(String),
    #[error("substitute for `{0}` contains the type it replaces")]
    CyclicSubstitution(String),
    #[error("JSON pointer `{pointer}` selects nothing in {origin}")]
    PointerMiss { origin: String, pointer: String },
}
