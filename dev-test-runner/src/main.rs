//! Runs every `fixtures/*.json` case through the generator and diffs the
//! result against the case's `expected` document.
//!
//! usage: dev-test-runner [NAME-REGEX]
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use regex::Regex;
use schemagen::catalog::{Catalog, CatalogFile};
use schemagen::{GeneratorConfig, SchemaGenerator};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    root: String,
    catalog: CatalogFile,
    #[serde(default)]
    config: GeneratorConfig,
    expected: serde_json::Value,
}

fn main() -> ExitCode {
    let filter = match std::env::args().nth(1).map(|p| Regex::new(&p)).transpose() {
        Ok(filter) => filter,
        Err(error) => {
            eprintln!("invalid filter: {error}");
            return ExitCode::FAILURE;
        }
    };
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures");
    let cases = match fixture_paths(&fixtures_dir) {
        Ok(cases) => cases,
        Err(error) => {
            eprintln!("failed to list {}: {error}", fixtures_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let (mut passed, mut failed) = (0usize, 0usize);
    for path in cases {
        let name = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        if filter.as_ref().is_some_and(|rx| !rx.is_match(&name)) {
            continue;
        }
        match run_case(&path) {
            Ok(()) => {
                passed += 1;
                eprintln!("{} {name}", "PASS".green().bold());
            }
            Err(message) => {
                failed += 1;
                eprintln!("{} {name}\n{message}", "FAIL".red().bold());
            }
        }
    }

    eprintln!("{passed} passed, {failed} failed");
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn fixture_paths(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

fn run_case(path: &Path) -> Result<(), String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    let de = &mut serde_json::Deserializer::from_str(&source);
    let fixture: Fixture = serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        format!("bad fixture at JSON path {path} → {}", err.into_inner())
    })?;

    let mut catalog = Catalog::from_files([fixture.catalog]).map_err(|e| e.to_string())?;
    let substitutions = fixture
        .config
        .substitution_table(&mut catalog)
        .map_err(|e| e.to_string())?;
    let root = catalog.require(&fixture.root).map_err(|e| e.to_string())?;

    let doc = SchemaGenerator::new(&catalog, &fixture.config.packages, &substitutions)
        .with_id_prefix(fixture.config.id_prefix.as_str())
        .generate(root)
        .map_err(|e| e.to_string())?;
    let actual = doc.to_value().map_err(|e| e.to_string())?;

    if actual == fixture.expected {
        Ok(())
    } else {
        Err(format!(
            "  expected: {}\n  actual:   {}",
            fixture.expected, actual
        ))
    }
}
