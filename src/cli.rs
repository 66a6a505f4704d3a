//! CLI: catalog + config → (schema | xref)
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use schemagen::catalog::{Catalog, CatalogFile};
use schemagen::config::GeneratorConfig;
use schemagen::error::CatalogError;
use schemagen::introspect::TypeUniverse;
use schemagen::ir::TypeId;
use schemagen::schema::SchemaDocument;
use schemagen::SchemaGenerator;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate JSON Schema documents (with Java type hints) from a record type catalog
#[derive(Parser, Debug)]
#[command(name = "schemagen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate one schema document per root type
    Schema(SchemaOut),
    /// print the schema name → Java type table of each root's definitions
    Xref(XrefOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the catalog inside each document (e.g. /payload/catalog)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is read as a catalog
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more catalog files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// generator config: namespace table, substitutions, id prefix
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// catalog key of a root record type (repeatable)
    #[arg(long, num_args = 1.., required = true)]
    root: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file, or directory when several roots are given (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// single-line JSON instead of pretty printing
    #[arg(long)]
    compact: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct XrefOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// Everything a generation run needs, loaded once and shared by all roots.
struct Prepared {
    catalog: Catalog,
    config: GeneratorConfig,
    substitutions: HashMap<TypeId, TypeId>,
    roots: Vec<(String, TypeId)>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_catalog_files(&self) -> Result<Vec<CatalogFile>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut files = Vec::new();
        for source_path in source_paths {
            let origin = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path).map_err(|source| CatalogError::Io {
                path: source_path.clone(),
                source,
            })?;
            let mut json_value = serde_json::from_str::<serde_json::Value>(&source)
                .with_context(|| format!("failed to parse JSON source file ({origin})"))?;

            if let Some(pointer) = self.json_pointer.as_deref() {
                json_value = json_value
                    .pointer(pointer)
                    .cloned()
                    .ok_or_else(|| CatalogError::PointerMiss {
                        origin: origin.clone(),
                        pointer: pointer.to_string(),
                    })?;
            }

            match self.jq_expr.as_deref() {
                None => files.push(CatalogFile::from_value(json_value, &origin)?),
                Some(jq_expr) => {
                    let outputs = crate::jq_exec::apply_jq(jq_expr, &json_value).with_context(|| {
                        format!("failed to apply jq expression to source file ({origin})")
                    })?;
                    for json_value in outputs {
                        files.push(CatalogFile::from_value(json_value, &origin)?);
                    }
                }
            }
        }
        Ok(files)
    }

    fn prepare(&self) -> Result<Prepared> {
        let mut catalog = Catalog::from_files(self.load_catalog_files()?)?;
        let config = GeneratorConfig::load_or_default(self.config.as_deref())?;
        let substitutions = config.substitution_table(&mut catalog)?;
        let roots = self
            .root
            .iter()
            .map(|key| Ok((key.clone(), catalog.require(key)?)))
            .collect::<Result<Vec<_>, CatalogError>>()?;
        tracing::debug!(types = catalog.len(), roots = roots.len(), "catalog loaded");
        Ok(Prepared { catalog, config, substitutions, roots })
    }
}

impl Prepared {
    /// One fresh generator per root, in parallel.
    fn generate_all(&self) -> Result<Vec<(&str, TypeId, SchemaDocument)>> {
        self.roots
            .par_iter()
            .map(|(key, root)| {
                let doc = SchemaGenerator::new(&self.catalog, &self.config.packages, &self.substitutions)
                    .with_id_prefix(self.config.id_prefix.as_str())
                    .generate(*root)
                    .with_context(|| format!("root `{key}`"))?;
                Ok((key.as_str(), *root, doc))
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let prepared = target.input_settings.prepare()?;
                let docs = prepared.generate_all()?;

                match (target.out.as_ref(), docs.as_slice()) {
                    (None, docs) => {
                        for (_, _, doc) in docs {
                            println!("{}", render(doc, target.compact)?);
                        }
                    }
                    (Some(out), [(_, _, doc)]) => write_output(out, &render(doc, target.compact)?)?,
                    (Some(dir), docs) => {
                        let paths = directory_outputs(dir, &prepared.catalog, docs)?;
                        std::fs::create_dir_all(dir)
                            .with_context(|| format!("failed to create {}", dir.display()))?;
                        for (path, (_, _, doc)) in paths.iter().zip(docs) {
                            write_output(path, &render(doc, target.compact)?)?;
                        }
                    }
                }
            }
            Command::Xref(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let prepared = target.input_settings.prepare()?;
                for (key, _, doc) in prepared.generate_all()? {
                    println!("{}", format!("# {key}").as_str().bold());
                    for (schema_name, java_type) in doc.java_types() {
                        println!("{schema_name}\t{java_type}");
                    }
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn render(doc: &SchemaDocument, compact: bool) -> Result<String> {
    let src = if compact {
        serde_json::to_string(doc)?
    } else {
        serde_json::to_string_pretty(doc)?
    };
    Ok(src)
}

/// `<dir>/<RootLocalName>.json` per document; two roots may not share a file.
fn directory_outputs<T>(
    dir: &Path,
    catalog: &Catalog,
    docs: &[(&str, TypeId, T)],
) -> Result<Vec<PathBuf>> {
    let mut claimed = HashMap::<PathBuf, &str>::new();
    let mut paths = Vec::with_capacity(docs.len());
    for (key, root, _) in docs {
        let path = dir.join(format!("{}.json", catalog.local_name(*root)));
        if let Some(previous) = claimed.insert(path.clone(), *key) {
            bail!(
                "roots `{previous}` and `{key}` would both be written to {}",
                path.display()
            );
        }
        paths.push(path);
    }
    Ok(paths)
}

fn write_output(out: &Path, src: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
    eprintln!("{} {}", "wrote".green().bold(), out.display());
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
