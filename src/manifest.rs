//! JSON manifests describing a class universe.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::annotation::JavaAnnotation;
use crate::universe::{JavaClass, Modifier};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<JavaAnnotation>,
}

impl ClassEntry {
    pub fn into_class(self) -> Result<JavaClass> {
        let class = match self.package {
            Some(package) => JavaClass::in_package(self.name, package)?,
            None => JavaClass::new(self.name)?,
        };
        let class = self
            .modifiers
            .into_iter()
            .fold(class, JavaClass::with_modifier);
        Ok(self
            .annotations
            .into_iter()
            .fold(class, JavaClass::with_annotation))
    }
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse class manifest")
    }

    pub fn into_classes(self) -> Result<Vec<JavaClass>> {
        self.classes
            .into_iter()
            .map(|entry| {
                let name = entry.name.clone();
                entry
                    .into_class()
                    .with_context(|| format!("Invalid class entry: {name}"))
            })
            .collect()
    }
}

/// Reads a manifest file, returning its description (or the path) and its classes.
pub fn load_manifest(path: &Path) -> Result<(String, Vec<JavaClass>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read class manifest: {}", path.display()))?;
    let manifest = Manifest::parse(&content)
        .with_context(|| format!("Invalid class manifest: {}", path.display()))?;

    let description = manifest
        .description
        .clone()
        .unwrap_or_else(|| path.display().to_string());
    let classes = manifest.into_classes()?;
    tracing::debug!(path = %path.display(), classes = classes.len(), "loaded class manifest");
    Ok((description, classes))
}
