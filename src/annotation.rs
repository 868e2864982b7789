//! Annotation kinds, declared annotations and meta-annotation merging.
//!
//! Merging walks the annotation graph breadth first: annotations declared on a
//! type come before the annotations found on their own declarations, so the
//! nearest declaration of a kind wins. Attributes of a composing annotation
//! override same-named attributes of the meta-annotation below it, `value`
//! excepted.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::error::{PackageError, PackageResult, require_text};
use crate::namespace;

pub type Attributes = BTreeMap<String, serde_json::Value>;

const VALUE_ATTRIBUTE: &str = "value";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnnotationKind(String);

impl AnnotationKind {
    pub fn new(name: impl Into<String>) -> PackageResult<Self> {
        let name = name.into();
        require_text(&name, "Annotation type")?;
        Ok(Self(name.trim().to_string()))
    }

    pub(crate) fn from_static(name: &'static str) -> Self {
        Self(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn simple_name(&self) -> &str {
        namespace::local_name(&self.0)
    }

    pub fn abbreviated_name(&self) -> String {
        namespace::abbreviate(&self.0)
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AnnotationKind {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AnnotationKind {
    type Error = PackageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnnotationKind> for String {
    fn from(kind: AnnotationKind) -> Self {
        kind.0
    }
}

/// An annotation as declared on a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaAnnotation {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl JavaAnnotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// The effective value of an annotation kind on a type, after meta-annotation merging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub attributes: Attributes,
    /// Fully-qualified name of the type the annotation was resolved for.
    pub declared_on: String,
}

impl Annotation {
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// The `value` attribute as a string, if it is one.
    pub fn value(&self) -> Option<&str> {
        self.attribute(VALUE_ATTRIBUTE).and_then(|v| v.as_str())
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.kind)?;
        for (idx, (key, value)) in self.attributes.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str(")")
    }
}

/// Resolves every annotation kind reachable from `declared`, keyed by kind.
///
/// `lookup` returns the annotations declared on an annotation type, if that type
/// is known. Unknown types end the walk on that branch.
pub(crate) fn resolve_effective<'a, F>(
    owner: &str,
    declared: &'a [JavaAnnotation],
    lookup: F,
) -> BTreeMap<AnnotationKind, Annotation>
where
    F: Fn(&str) -> Option<&'a [JavaAnnotation]>,
{
    let mut resolved = BTreeMap::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&JavaAnnotation, Attributes)> = declared
        .iter()
        .map(|a| (a, Attributes::new()))
        .collect();

    while let Some((annotation, overrides)) = queue.pop_front() {
        let type_name = annotation.type_name.trim();
        if !visited.insert(type_name) {
            continue;
        }
        let Ok(kind) = AnnotationKind::new(type_name) else {
            continue;
        };

        let mut attributes = annotation.attributes.clone();
        for (key, value) in overrides {
            if key != VALUE_ATTRIBUTE && attributes.contains_key(&key) {
                attributes.insert(key, value);
            }
        }

        if let Some(meta) = lookup(type_name) {
            for next in meta {
                queue.push_back((next, attributes.clone()));
            }
        }

        resolved.insert(
            kind.clone(),
            Annotation {
                kind,
                attributes,
                declared_on: owner.to_string(),
            },
        );
    }

    resolved
}
