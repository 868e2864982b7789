//! Class descriptors from the entry list of jar archives.
//!
//! Archives only reveal names: descriptors built here carry no modifiers and no
//! annotations. `package-info` entries are kept as package markers.

use anyhow::{Context, Result};
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::universe::JavaClass;

const CLASS_SUFFIX: &str = ".class";
const MODULE_INFO: &str = "module-info";

pub fn catalog(artifact_path: &Path) -> Result<Vec<JavaClass>> {
    let file = File::open(artifact_path)
        .with_context(|| format!("Failed to open jar: {}", artifact_path.display()))?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap jar: {}", artifact_path.display()))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", artifact_path.display()))?;

    let mut classes = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let Some(class_name) = class_name_of_entry(entry.name()) else {
            continue;
        };
        match JavaClass::new(class_name.as_str()) {
            Ok(class) => classes.push(class),
            Err(err) => {
                tracing::debug!(
                    entry = entry.name(),
                    jar = %artifact_path.display(),
                    error = %err,
                    "skipping malformed class entry"
                );
            }
        }
    }

    tracing::debug!(jar = %artifact_path.display(), classes = classes.len(), "cataloged jar");
    Ok(classes)
}

/// Catalogs all jars in parallel. Any failing jar fails the whole call.
pub fn catalog_all(jars: &[PathBuf]) -> Result<Vec<JavaClass>> {
    let per_jar: Vec<Vec<JavaClass>> = jars
        .par_iter()
        .map(|jar| catalog(jar))
        .collect::<Result<_>>()?;
    Ok(per_jar.into_iter().flatten().collect())
}

/// Catalogs all jars in parallel, logging and skipping the ones that cannot be read.
pub fn catalog_lenient(jars: &[PathBuf]) -> Vec<JavaClass> {
    jars.par_iter()
        .filter_map(|jar| match catalog(jar) {
            Ok(classes) => Some(classes),
            Err(err) => {
                tracing::warn!(jar = %jar.display(), error = %format!("{err:#}"), "skipping unreadable jar");
                None
            }
        })
        .flatten()
        .collect()
}

fn class_name_of_entry(entry: &str) -> Option<String> {
    let stem = entry.strip_suffix(CLASS_SUFFIX)?;
    if stem.contains('$') || stem.ends_with(MODULE_INFO) || stem.starts_with("META-INF/") {
        return None;
    }
    Some(stem.replace(['/', '\\'], "."))
}
