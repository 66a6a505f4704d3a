//! Generator configuration: namespace table, type substitutions, id prefix.
use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, TypeExpr};
use crate::error::CatalogError;
use crate::ir::TypeId;
use crate::schema::DEFAULT_ID_PREFIX;

/// One namespace the caller knows how to name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageDescriptor {
    /// Host namespace identifier, e.g. `example.com/pets/v1`.
    pub namespace: String,
    /// Prepended to local names to build schema names.
    pub prefix: String,
    /// Foreign (Java) package for types of this namespace.
    pub java_package: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,
    /// Catalog key → replacement type.
    #[serde(default)]
    pub substitutions: IndexMap<String, TypeExpr>,
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            substitutions: IndexMap::new(),
            id_prefix: default_id_prefix(),
        }
    }
}

impl PackageDescriptor {
    pub fn new(
        namespace: impl Into<String>,
        prefix: impl Into<String>,
        java_package: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            prefix: prefix.into(),
            java_package: java_package.into(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let src = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        crate::path_de::from_str_with_path(&src, &path.to_string_lossy())
    }

    /// No config file means defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve `substitutions` against a catalog.
    ///
    /// A substitute that leads back to the replaced type without passing a
    /// record (`T` → `[T]`) is rejected.
    pub fn substitution_table(
        &self,
        catalog: &mut Catalog,
    ) -> Result<HashMap<TypeId, TypeId>, CatalogError> {
        let mut table = HashMap::with_capacity(self.substitutions.len());
        let mut resolved = Vec::with_capacity(self.substitutions.len());
        for (key, to) in &self.substitutions {
            let from = catalog.require(key)?;
            let to = catalog.resolve_expr(to)?;
            table.insert(from, to);
            resolved.push((key, from, to));
        }
        for (key, from, to) in resolved {
            if catalog.wraps(to, from, &table) {
                return Err(CatalogError::CyclicSubstitution(key.clone()));
            }
        }
        Ok(table)
    }
}
