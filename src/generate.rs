//! Record type graph → JSON Schema document.
//!
//! One run walks every record type reachable from the root exactly once:
//! - the root is assembled inline, everything else lands in `definitions`;
//! - record-typed fields become `$ref`s, so cycles terminate on the registry's
//!   in-flight placeholder;
//! - embedded records promote their properties into the owner;
//! - every definition carries the Java type name it maps to.
//!
//! A [`SchemaGenerator`] is consumed by [`SchemaGenerator::generate`]; each run
//! owns its registry, so runs over shared type graphs may go in parallel.
mod names;
mod object;
mod property;
mod registry;

use std::collections::{BTreeMap, HashMap};

use crate::config::PackageDescriptor;
use crate::error::SchemaError;
use crate::introspect::{TypeKind, TypeUniverse};
use crate::schema::{
    DEFAULT_ID_PREFIX, Definition, ObjectDescriptor, SCHEMA_DIALECT, SchemaDocument,
};

use names::NameResolver;
use registry::TypeRegistry;

pub struct SchemaGenerator<'u, U: TypeUniverse> {
    universe: &'u U,
    names: NameResolver<'u, U>,
    substitutions: &'u HashMap<U::Id, U::Id>,
    registry: TypeRegistry<U::Id>,
    id_prefix: String,
}

impl<'u, U: TypeUniverse> SchemaGenerator<'u, U> {
    pub fn new(
        universe: &'u U,
        packages: &[PackageDescriptor],
        substitutions: &'u HashMap<U::Id, U::Id>,
    ) -> Self {
        Self {
            universe,
            names: NameResolver::new(universe, packages),
            substitutions,
            registry: TypeRegistry::new(),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Build the document for `root`, which must be a record type.
    pub fn generate(mut self, root: U::Id) -> Result<SchemaDocument, SchemaError> {
        let u = self.universe;
        let root_name = u.local_name(root).to_string();
        let kind = u.kind(root);
        if kind != TypeKind::Record {
            return Err(SchemaError::UnsupportedRootKind { name: root_name, kind });
        }
        let _span = tracing::debug_span!("generate", root = %root_name).entered();

        let object = self.assemble(root);

        let Self { names, registry, id_prefix, .. } = self;
        let definitions = if registry.is_empty() {
            None
        } else {
            let mut definitions = BTreeMap::new();
            for (ty, descriptor) in registry.into_entries() {
                let name = names.schema_name(ty);
                let definition = Definition::new(descriptor, names.java_type(ty));
                if definitions.insert(name.clone(), definition).is_some() {
                    tracing::warn!(%name, "schema name shared by distinct types; keeping the last one");
                }
            }
            Some(definitions)
        };
        tracing::info!(
            definitions = definitions.as_ref().map_or(0, BTreeMap::len),
            "schema generated"
        );

        Ok(SchemaDocument {
            id: format!("{id_prefix}{root_name}#"),
            schema: SCHEMA_DIALECT.to_string(),
            type_: "object",
            object,
            definitions,
        })
    }

    /// Descriptor for a record type, walking its fields on first sight only.
    ///
    /// While the type is still being walked this is its empty placeholder.
    fn discover(&mut self, ty: U::Id) -> &ObjectDescriptor {
        if self.registry.reserve(ty) {
            tracing::debug!(
                schema_name = %self.names.schema_name(ty),
                known = self.registry.len(),
                "discovered record type"
            );
            let descriptor = self.assemble(ty);
            self.registry.complete(ty, descriptor);
        }
        &self.registry[ty]
    }
}

/// One-shot generation with a fresh generator.
pub fn generate_schema<U: TypeUniverse>(
    universe: &U,
    root: U::Id,
    packages: &[PackageDescriptor],
    substitutions: &HashMap<U::Id, U::Id>,
) -> Result<SchemaDocument, SchemaError> {
    SchemaGenerator::new(universe, packages, substitutions).generate(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::introspect::Field;
    use crate::ir::TypeId;
    use serde_json::json;

    fn run(c: &Catalog, root: TypeId) -> SchemaDocument {
        generate_schema(c, root, &[], &HashMap::new()).unwrap()
    }

    /// `Pet{Name string; Age int}` in namespace `pets`.
    fn pet(c: &mut Catalog) -> TypeId {
        let pet = c.record("pets", "Pet");
        let name = c.string();
        let age = c.int(0);
        c.set_fields(pet, vec![Field::new("Name", name), Field::new("Age", age)]);
        pet
    }

    #[test]
    fn flat_record_has_no_definitions() {
        let mut c = Catalog::new();
        let root = pet(&mut c);
        let doc = run(&c, root);
        assert_eq!(
            doc.to_value().unwrap(),
            json!({
                "id": "http://fabric8.io/fabric8/v2/Pet#",
                "$schema": "http://json-schema.org/schema#",
                "type": "object",
                "properties": {"Name": {"type": "string"}, "Age": {"type": "integer"}},
                "additionalProperties": true
            })
        );
    }

    #[test]
    fn nested_record_becomes_a_definition() {
        let mut c = Catalog::new();
        let pet = pet(&mut c);
        let owner = c.record("pets", "Owner");
        c.set_fields(owner, vec![Field::new("Pet", pet)]);

        let v = run(&c, owner).to_value().unwrap();
        assert_eq!(
            v["properties"],
            json!({"Pet": {"$ref": "#/definitions/pets_Pet", "javaType": "Pet"}})
        );
        assert_eq!(
            v["definitions"],
            json!({
                "pets_Pet": {
                    "type": "object",
                    "properties": {"Name": {"type": "string"}, "Age": {"type": "integer"}},
                    "additionalProperties": true,
                    "javaType": "Pet"
                }
            })
        );
    }

    #[test]
    fn every_reachable_record_appears_once() {
        let mut c = Catalog::new();
        let pet = pet(&mut c);
        let toy = c.record("pets", "Toy");
        let s = c.string();
        c.set_fields(toy, vec![Field::new("Label", s)]);
        let pets = c.slice(pet);
        let pet_ptr = c.pointer(pet);
        let toys = {
            let k = c.string();
            c.map(k, toy)
        };
        let owner = c.record("pets", "Owner");
        c.set_fields(
            owner,
            vec![
                Field::new("Pets", pets),
                Field::new("Favourite", pet_ptr),
                Field::new("Toys", toys),
            ],
        );

        let doc = run(&c, owner);
        let defs = doc.definitions.as_ref().unwrap();
        let keys: Vec<&str> = defs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["pets_Pet", "pets_Toy"]);
        assert!(!defs.contains_key("pets_Owner"));

        let v = doc.to_value().unwrap();
        assert_eq!(
            v["properties"]["Pets"],
            json!({"type": "array", "items": {"$ref": "#/definitions/pets_Pet", "javaType": "Pet"}})
        );
        assert_eq!(v["properties"]["Favourite"]["$ref"], json!("#/definitions/pets_Pet"));
        assert_eq!(
            v["properties"]["Toys"],
            json!({
                "type": "object",
                "additionalProperties": {"$ref": "#/definitions/pets_Toy", "javaType": "Toy"},
                "javaType": "java.util.Map<String,Toy>"
            })
        );
    }

    #[test]
    fn self_reference_terminates() {
        let mut c = Catalog::new();
        let node = c.record("tree", "Node");
        let children = c.slice(node);
        let parent = c.pointer(node);
        let v = c.int(64);
        c.set_fields(
            node,
            vec![Field::new("Value", v), Field::new("Parent", parent), Field::new("Children", children)],
        );

        let doc = run(&c, node);
        let defs = doc.definitions.as_ref().unwrap();
        assert_eq!(defs.len(), 1);
        let def = &defs["tree_Node"];
        assert_eq!(def.object.properties.len(), 3);

        let v = doc.to_value().unwrap();
        assert_eq!(v["properties"]["Parent"]["$ref"], json!("#/definitions/tree_Node"));
        assert_eq!(v["definitions"]["tree_Node"]["properties"]["Parent"]["$ref"], json!("#/definitions/tree_Node"));
        assert_eq!(
            v["definitions"]["tree_Node"]["properties"]["Children"]["items"]["$ref"],
            json!("#/definitions/tree_Node")
        );
    }

    #[test]
    fn mutual_references_resolve_both_ways() {
        let mut c = Catalog::new();
        let a = c.record("m", "A");
        let b = c.record("m", "B");
        let pb = c.pointer(b);
        let pa = c.pointer(a);
        c.set_fields(a, vec![Field::new("B", pb)]);
        c.set_fields(b, vec![Field::new("A", pa)]);
        let root = c.record("m", "Root");
        c.set_fields(root, vec![Field::new("A", a)]);

        let v = run(&c, root).to_value().unwrap();
        assert_eq!(v["definitions"]["m_A"]["properties"]["B"]["$ref"], json!("#/definitions/m_B"));
        assert_eq!(v["definitions"]["m_B"]["properties"]["A"]["$ref"], json!("#/definitions/m_A"));
        assert_eq!(v["definitions"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn same_local_name_in_different_namespaces_stays_distinct() {
        let mut c = Catalog::new();
        let s = c.string();
        let a = c.record("github.com/acme/v1", "Item");
        let b = c.record("github.com/acme/v2", "Item");
        c.set_fields(a, vec![Field::new("Old", s)]);
        c.set_fields(b, vec![Field::new("New", s)]);
        let root = c.record("github.com/acme", "Root");
        c.set_fields(root, vec![Field::new("A", a), Field::new("B", b)]);

        let doc = run(&c, root);
        let defs = doc.definitions.unwrap();
        assert!(defs.contains_key("github_com_acme_v1_Item"));
        assert!(defs.contains_key("github_com_acme_v2_Item"));
    }

    #[test]
    fn embedded_fields_are_promoted_in_declaration_order() {
        let mut c = Catalog::new();
        let s = c.string();
        let i = c.int(32);
        let meta = c.record("api", "ObjectMeta");
        c.set_fields(meta, vec![Field::new("Name", s), Field::new("Labels", s)]);
        let root = c.record("api", "Pod");
        c.set_fields(
            root,
            vec![
                Field::new("Labels", i),
                Field::new("ObjectMeta", meta).embedded(),
                Field::new("Name", i).tagged("Name,omitempty"),
            ],
        );

        let doc = run(&c, root);
        let props = &doc.object.properties;
        assert!(!props.contains_key("ObjectMeta"));
        // promoted Labels overwrote the earlier declared one
        assert_eq!(
            serde_json::to_value(&props["Labels"]).unwrap(),
            json!({"type": "string"})
        );
        // declared Name after the embedding wins
        assert_eq!(
            serde_json::to_value(&props["Name"]).unwrap(),
            json!({"type": "integer"})
        );
        // the embedded type is still a definition of its own
        assert!(doc.definitions.unwrap().contains_key("api_ObjectMeta"));
    }

    #[test]
    fn embedded_pointer_is_promoted_too() {
        let mut c = Catalog::new();
        let s = c.string();
        let base = c.record("api", "Base");
        c.set_fields(base, vec![Field::new("ID", s).tagged("id")]);
        let pbase = c.pointer(base);
        let root = c.record("api", "Thing");
        c.set_fields(root, vec![Field::new("Base", pbase).embedded()]);

        let v = run(&c, root).to_value().unwrap();
        assert_eq!(v["properties"], json!({"id": {"type": "string"}}));
    }

    #[test]
    fn hidden_fields_are_skipped_and_not_discovered() {
        let mut c = Catalog::new();
        let secret = c.record("api", "Secret");
        let s = c.string();
        let root = c.record("api", "Root");
        c.set_fields(root, vec![Field::new("name", s).hidden(), Field::new("secret", secret).hidden()]);

        let doc = run(&c, root);
        assert!(doc.object.properties.is_empty());
        assert!(doc.definitions.is_none());
    }

    #[test]
    fn unsupported_field_shapes_pass_through_empty() {
        let mut c = Catalog::new();
        let b = c.uint(8);
        let digest = c.array(b, 32);
        let any = c.opaque();
        let pp = {
            let s = c.string();
            let p = c.pointer(s);
            c.pointer(p)
        };
        let f = c.complex(64);
        let root = c.record("api", "Blob");
        c.set_fields(
            root,
            vec![
                Field::new("Digest", digest),
                Field::new("Any", any),
                Field::new("Twice", pp),
                Field::new("Phase", f),
            ],
        );

        let v = run(&c, root).to_value().unwrap();
        assert_eq!(
            v["properties"],
            json!({"Digest": {}, "Any": {}, "Twice": {}, "Phase": {"type": "number"}})
        );
    }

    #[test]
    fn substitution_replaces_field_type() {
        let mut c = Catalog::new();
        let time = c.record("time", "Time");
        let s = c.string();
        let wall = c.uint(64);
        c.set_fields(time, vec![Field::new("wall", wall).hidden()]);
        let stamp = c.record("api", "Stamp");
        c.set_fields(stamp, vec![Field::new("At", s)]);
        let ptime = c.pointer(time);
        let root = c.record("api", "Event");
        c.set_fields(root, vec![Field::new("When", ptime), Field::new("Stamp", time).embedded()]);

        let subs = HashMap::from([(time, stamp)]);
        let doc = generate_schema(&c, root, &[], &subs).unwrap();
        let v = doc.to_value().unwrap();
        assert_eq!(v["properties"]["When"]["$ref"], json!("#/definitions/api_Stamp"));
        // embedded field promotes the substitute's properties
        assert_eq!(v["properties"]["At"], json!({"type": "string"}));
        let defs = doc.definitions.unwrap();
        assert!(!defs.contains_key("time_Time"));

        let to_string = HashMap::from([(time, s)]);
        let v = generate_schema(&c, root, &[], &to_string).unwrap().to_value().unwrap();
        assert_eq!(v["properties"], json!({"When": {"type": "string"}}));
    }

    #[test]
    fn packages_drive_names_and_java_types() {
        let mut c = Catalog::new();
        let pet = pet(&mut c);
        let owner = c.record("people", "Owner");
        c.set_fields(owner, vec![Field::new("Pet", pet)]);
        let packages = [PackageDescriptor::new("pets", "kennel_", "io.kennel")];

        let doc = SchemaGenerator::new(&c, &packages, &HashMap::new())
            .with_id_prefix("urn:test/")
            .generate(owner)
            .unwrap();
        assert_eq!(doc.id, "urn:test/Owner#");
        let v = doc.to_value().unwrap();
        assert_eq!(
            v["properties"]["Pet"],
            json!({"$ref": "#/definitions/kennel_Pet", "javaType": "io.kennel.Pet"})
        );
        assert_eq!(v["definitions"]["kennel_Pet"]["javaType"], json!("io.kennel.Pet"));
        assert_eq!(
            doc.java_types().into_iter().collect::<Vec<_>>(),
            vec![("kennel_Pet", "io.kennel.Pet")]
        );
    }

    #[test]
    fn non_record_root_is_rejected() {
        let mut c = Catalog::new();
        let s = c.string();
        let list = c.slice(s);
        let pet = pet(&mut c);
        let ptr = c.pointer(pet);
        for root in [s, list, ptr] {
            let err = generate_schema(&c, root, &[], &HashMap::new()).unwrap_err();
            assert!(matches!(err, SchemaError::UnsupportedRootKind { .. }));
        }
        let err = generate_schema(&c, list, &[], &HashMap::new()).unwrap_err();
        assert_eq!(err, SchemaError::UnsupportedRootKind { name: String::new(), kind: TypeKind::Slice });
    }

    #[test]
    fn runs_do_not_share_state() {
        let mut c = Catalog::new();
        let pet = pet(&mut c);
        let owner = c.record("pets", "Owner");
        c.set_fields(owner, vec![Field::new("Pet", pet)]);

        let subs = HashMap::new();
        let first = generate_schema(&c, owner, &[], &subs).unwrap();
        let second = generate_schema(&c, owner, &[], &subs).unwrap();
        assert_eq!(first, second);
        let flat = generate_schema(&c, pet, &[], &subs).unwrap();
        assert!(flat.definitions.is_none());
    }

    #[test]
    fn discover_returns_finished_descriptor() {
        let mut c = Catalog::new();
        let pet = pet(&mut c);
        let subs = HashMap::new();
        let mut generator = SchemaGenerator::new(&c, &[], &subs);
        let names: Vec<String> = generator.discover(pet).properties.keys().cloned().collect();
        assert_eq!(names, vec!["Name", "Age"]);
        assert_eq!(generator.registry.len(), 1);
        generator.discover(pet);
        assert_eq!(generator.registry.len(), 1);
    }
}
