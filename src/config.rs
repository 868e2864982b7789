use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::cli::Cli;
use crate::manifest;
use crate::scan::scan_jars;
use crate::universe::Classes;

pub const UNIVERSE_ENV: &str = "CLASS_PACKAGES_UNIVERSE";
const DEFAULT_MANIFEST: &str = "universe.json";

/// Where the class universe comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseSource {
    Manifest(PathBuf),
    Jars(Vec<PathBuf>),
    Directory(PathBuf),
}

/// Explicit flags first, then the environment, then the data directory default.
pub fn resolve_sources(cli: &Cli) -> Result<Vec<UniverseSource>> {
    let mut sources = Vec::new();
    if let Some(p) = cli.universe.clone() {
        sources.push(UniverseSource::Manifest(p));
    }
    if !cli.jars.is_empty() {
        sources.push(UniverseSource::Jars(cli.jars.clone()));
    }
    if let Some(p) = cli.dir.clone() {
        sources.push(UniverseSource::Directory(p));
    }
    if !sources.is_empty() {
        return Ok(sources);
    }

    if let Ok(p) = env::var(UNIVERSE_ENV)
        && !p.trim().is_empty()
    {
        return Ok(vec![UniverseSource::Manifest(PathBuf::from(p))]);
    }

    let default_path = default_manifest_path()?;
    if default_path.exists() {
        return Ok(vec![UniverseSource::Manifest(default_path)]);
    }

    anyhow::bail!(
        "No class universe given. Use --universe, --jar or --dir, set {UNIVERSE_ENV}, or create {}",
        default_path.display()
    )
}

/// Loads and merges all sources into one universe.
pub fn load_universe(sources: &[UniverseSource]) -> Result<Classes> {
    let mut descriptions = Vec::new();
    let mut classes = Vec::new();

    for source in sources {
        match source {
            UniverseSource::Manifest(path) => {
                let (description, loaded) = manifest::load_manifest(path)?;
                descriptions.push(description);
                classes.extend(loaded);
            }
            UniverseSource::Jars(jars) => {
                classes.extend(catalog::catalog_all(jars)?);
                descriptions.extend(jars.iter().map(|j| j.display().to_string()));
            }
            UniverseSource::Directory(dir) => {
                let jars = scan_jars(dir)
                    .with_context(|| format!("Failed to scan for jars: {}", dir.display()))?;
                classes.extend(catalog::catalog_lenient(&jars));
                descriptions.push(dir.display().to_string());
            }
        }
    }

    let universe = Classes::new(descriptions.join(", "), classes);
    tracing::info!(classes = universe.len(), sources = sources.len(), "class universe loaded");
    Ok(universe)
}

pub fn default_manifest_path() -> Result<PathBuf> {
    Ok(class_packages_home()?.join(DEFAULT_MANIFEST))
}

fn class_packages_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("class-packages"))
}

/// Human readable name of a source, for diagnostics.
pub fn describe(source: &UniverseSource) -> String {
    fn show(path: &Path) -> String {
        path.display().to_string()
    }

    match source {
        UniverseSource::Manifest(p) => format!("manifest {}", show(p)),
        UniverseSource::Jars(jars) => format!(
            "jars {}",
            jars.iter().map(|p| show(p)).collect::<Vec<_>>().join(", ")
        ),
        UniverseSource::Directory(p) => format!("directory {}", show(p)),
    }
}
