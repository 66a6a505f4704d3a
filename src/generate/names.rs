use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PackageDescriptor;
use crate::introspect::{TypeKind, TypeUniverse};
use crate::schema::DEFINITIONS_PATH;

static PATH_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/.\-]").unwrap());

const JAVA_LIST: &str = "java.util.ArrayList";
const JAVA_MAP: &str = "java.util.Map";

/// Schema names, `$ref` paths and Java type names for host types.
pub(crate) struct NameResolver<'u, U: TypeUniverse> {
    universe: &'u U,
    packages: HashMap<String, PackageDescriptor>,
}

impl<'u, U: TypeUniverse> NameResolver<'u, U> {
    /// Later descriptors for the same namespace replace earlier ones.
    pub fn new(universe: &'u U, packages: &[PackageDescriptor]) -> Self {
        let packages = packages
            .iter()
            .map(|p| (p.namespace.clone(), p.clone()))
            .collect();
        Self { universe, packages }
    }

    pub fn schema_name(&self, ty: U::Id) -> String {
        let namespace = self.universe.namespace(ty);
        let name = self.universe.local_name(ty);
        match self.packages.get(namespace) {
            Some(package) => format!("{}{name}", package.prefix),
            None => format!("{}_{name}", sanitize(namespace)),
        }
    }

    pub fn reference_path(&self, ty: U::Id) -> String {
        format!("{DEFINITIONS_PATH}{}", self.schema_name(ty))
    }

    pub fn java_type(&self, ty: U::Id) -> String {
        let u = self.universe;
        let ty = u.dereference(ty).unwrap_or(ty);
        if let Some(package) = self.packages.get(u.namespace(ty)) {
            return format!("{}.{}", package.java_package, u.local_name(ty));
        }
        match u.kind(ty) {
            TypeKind::Bool => "bool".to_string(),
            TypeKind::Int | TypeKind::Uint => "int".to_string(),
            TypeKind::Float | TypeKind::Complex => "double".to_string(),
            TypeKind::String => "String".to_string(),
            TypeKind::Slice | TypeKind::Array => format!("{JAVA_LIST}<{}>", self.element_java_type(ty)),
            TypeKind::Map => self.map_java_type(ty),
            _ => {
                let name = u.local_name(ty);
                if name.is_empty() && u.fields(ty).is_empty() {
                    "Object".to_string()
                } else {
                    name.to_string()
                }
            }
        }
    }

    /// `java.util.Map<String,V>` for a map type.
    pub fn map_java_type(&self, map: U::Id) -> String {
        format!("{JAVA_MAP}<String,{}>", self.element_java_type(map))
    }

    fn element_java_type(&self, ty: U::Id) -> String {
        match self.universe.element_type(ty) {
            Some(elem) => self.java_type(elem),
            None => "Object".to_string(),
        }
    }
}

/// Turn a namespace identifier into a name-safe prefix.
pub(crate) fn sanitize(namespace: &str) -> String {
    PATH_SEPARATORS.replace_all(namespace, "_").into_owned()
}
