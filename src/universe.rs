//! The class universe: immutable descriptors and filtered views over them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::annotation::{self, Annotation, AnnotationKind, JavaAnnotation};
use crate::error::{PackageError, PackageResult, require_text};
use crate::namespace;
use crate::predicate::DescribedPredicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JavaClass {
    name: String,
    #[serde(rename = "package")]
    package_name: String,
    #[serde(skip)]
    simple_name: String,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    modifiers: BTreeSet<Modifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<JavaAnnotation>,
    #[serde(skip)]
    effective: BTreeMap<AnnotationKind, Annotation>,
}

impl JavaClass {
    /// Descriptor whose package is everything before the last `.` of `name`.
    pub fn new(name: impl Into<String>) -> PackageResult<Self> {
        let name = name.into();
        let package = namespace::parent_name(&name).to_string();
        Self::in_package(name, package)
    }

    pub fn in_package(name: impl Into<String>, package: impl Into<String>) -> PackageResult<Self> {
        let name = name.into();
        let package_name = package.into();
        require_text(&name, "Type name")?;

        let simple_name = if package_name.is_empty() {
            name.clone()
        } else {
            name.strip_prefix(package_name.as_str())
                .and_then(|rest| rest.strip_prefix(namespace::SEPARATOR))
                .filter(|rest| !rest.is_empty())
                .ok_or_else(|| {
                    PackageError::InvalidArgument(format!(
                        "Type {name} does not reside in package {package_name}!"
                    ))
                })?
                .to_string()
        };

        Ok(Self {
            name,
            package_name,
            simple_name,
            modifiers: BTreeSet::new(),
            annotations: Vec::new(),
            effective: BTreeMap::new(),
        })
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_annotation(mut self, annotation: JavaAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn modifiers(&self) -> &BTreeSet<Modifier> {
        &self.modifiers
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_public(&self) -> bool {
        self.has_modifier(Modifier::Public)
    }

    pub fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }

    /// Only meaningful once the class is part of a [`Classes`] universe.
    pub fn is_meta_annotated_with(&self, kind: &AnnotationKind) -> bool {
        self.effective.contains_key(kind)
    }

    /// The merged annotation of the given kind, if the type carries it directly or via meta-annotations.
    pub fn merged_annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.effective.get(kind)
    }
}

impl fmt::Display for JavaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug)]
struct Universe {
    classes: Vec<JavaClass>,
    index: HashMap<String, usize>,
}

/// An immutable, shared set of classes ordered by fully-qualified name.
///
/// Views produced by [`Classes::that`] share the underlying descriptors.
#[derive(Debug, Clone)]
pub struct Classes {
    universe: Arc<Universe>,
    members: Arc<[usize]>,
    description: Arc<str>,
}

impl Classes {
    /// Materializes a universe. Duplicated names keep their first descriptor.
    pub fn new(description: impl Into<String>, classes: impl IntoIterator<Item = JavaClass>) -> Self {
        let mut classes: Vec<JavaClass> = classes.into_iter().collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        classes.dedup_by(|later, earlier| later.name == earlier.name);

        let declared: HashMap<String, Vec<JavaAnnotation>> = classes
            .iter()
            .filter(|c| !c.annotations.is_empty())
            .map(|c| (c.name.clone(), c.annotations.clone()))
            .collect();

        for class in classes.iter_mut() {
            class.effective = annotation::resolve_effective(&class.name, &class.annotations, |name| {
                declared.get(name).map(Vec::as_slice)
            });
        }

        let index = classes
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.name.clone(), idx))
            .collect();
        let members: Arc<[usize]> = (0..classes.len()).collect();

        Self {
            universe: Arc::new(Universe { classes, index }),
            members,
            description: Arc::from(description.into()),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JavaClass> + '_ {
        self.members.iter().map(|&idx| &self.universe.classes[idx])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(JavaClass::name)
    }

    pub fn that(&self, predicate: &DescribedPredicate<JavaClass>) -> Classes {
        let members: Arc<[usize]> = self
            .members
            .iter()
            .copied()
            .filter(|&idx| predicate.test(&self.universe.classes[idx]))
            .collect();

        Self {
            universe: Arc::clone(&self.universe),
            members,
            description: Arc::from(format!("{} that {}", self.description, predicate.description())),
        }
    }

    /// Looks up a member by fully-qualified name.
    pub fn get(&self, name: &str) -> Option<&JavaClass> {
        let idx = *self.universe.index.get(name)?;
        self.members
            .binary_search(&idx)
            .ok()
            .map(|_| &self.universe.classes[idx])
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn contains(&self, class: &JavaClass) -> bool {
        self.get(&class.name).is_some_and(|member| member == class)
    }

    /// Whether both views were carved out of the same materialized universe.
    pub fn shares_universe_with(&self, other: &Classes) -> bool {
        Arc::ptr_eq(&self.universe, &other.universe)
    }

    /// `None` for no members, the single member, or an error for more than one.
    pub fn to_optional(&self) -> PackageResult<Option<&JavaClass>> {
        match self.members.len() {
            0 => Ok(None),
            1 => Ok(self.iter().next()),
            count => Err(PackageError::NotUnique {
                description: self.description.to_string(),
                count,
            }),
        }
    }

    /// One line per class, names abbreviated relative to `base_package`.
    pub fn format(&self, base_package: &str) -> String {
        self.iter()
            .map(|class| {
                let marker = if class.is_public() { '+' } else { 'o' };
                let relative = class
                    .name
                    .strip_prefix(base_package)
                    .filter(|rest| rest.starts_with(namespace::SEPARATOR))
                    .map(|rest| format!("…{rest}"))
                    .unwrap_or_else(|| class.name.clone());
                format!("  {marker} {relative}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PartialEq for Classes {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.members, &other.members) {
            return true;
        }
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Classes {}

impl<'a> IntoIterator for &'a Classes {
    type Item = &'a JavaClass;
    type IntoIter = Box<dyn Iterator<Item = &'a JavaClass> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{reside_in_package, simple_name};

    fn universe() -> Classes {
        Classes::new(
            "test classes",
            vec![
                JavaClass::new("a.b.Foo").unwrap().with_modifier(Modifier::Public),
                JavaClass::new("a.b.c.Bar").unwrap(),
                JavaClass::new("a.Other").unwrap(),
                JavaClass::new("a.b.Foo").unwrap(),
            ],
        )
    }

    #[test]
    fn new_sorts_and_keeps_first_duplicate() {
        let classes = universe();
        assert_eq!(classes.names().collect::<Vec<_>>(), vec!["a.Other", "a.b.Foo", "a.b.c.Bar"]);
        assert!(classes.get("a.b.Foo").unwrap().is_public());
    }

    #[test]
    fn descriptor_derives_package_and_simple_name() {
        let class = JavaClass::new("com.acme.Order").unwrap();
        assert_eq!(class.package_name(), "com.acme");
        assert_eq!(class.simple_name(), "Order");

        let default_package = JavaClass::new("Order").unwrap();
        assert_eq!(default_package.package_name(), "");
        assert_eq!(default_package.simple_name(), "Order");
    }

    #[test]
    fn descriptor_outside_declared_package_is_rejected() {
        assert!(JavaClass::in_package("com.acme.Order", "org.other").is_err());
        assert!(JavaClass::in_package("com.acme", "com.acme").is_err());
        assert!(JavaClass::new("").is_err());
    }

    #[test]
    fn that_filters_and_describes() {
        let classes = universe();
        let filtered = classes.that(&reside_in_package("a.b"));
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_name("a.b.Foo"));
        assert!(!filtered.contains_name("a.b.c.Bar"));
        assert!(filtered.shares_universe_with(&classes));
        assert!(filtered.description().starts_with("test classes that "));
    }

    #[test]
    fn contains_compares_descriptor_identity() {
        let classes = universe();
        let foreign = JavaClass::new("a.b.Foo").unwrap();
        let member = classes.get("a.b.Foo").unwrap().clone();
        assert!(classes.contains(&member));
        assert!(!classes.contains(&foreign));
    }

    #[test]
    fn to_optional_detects_multiple_members() {
        let classes = universe();
        assert!(classes.that(&simple_name("Missing")).to_optional().unwrap().is_none());
        assert_eq!(
            classes.that(&simple_name("Bar")).to_optional().unwrap().map(JavaClass::name),
            Some("a.b.c.Bar")
        );
        assert!(matches!(
            classes.to_optional(),
            Err(PackageError::NotUnique { count: 3, .. })
        ));
    }

    #[test]
    fn meta_annotations_are_resolved_through_the_universe() {
        let owner = AnnotationKind::new("x.Owner").unwrap();
        let classes = Classes::new(
            "annotated",
            vec![
                JavaClass::new("x.Module")
                    .unwrap()
                    .with_annotation(JavaAnnotation::new("x.Owner")),
                JavaClass::new("a.Foo")
                    .unwrap()
                    .with_annotation(JavaAnnotation::new("x.Module")),
                JavaClass::new("a.Bar").unwrap(),
            ],
        );

        assert!(classes.get("a.Foo").unwrap().is_meta_annotated_with(&owner));
        assert!(!classes.get("a.Bar").unwrap().is_meta_annotated_with(&owner));
    }

    #[test]
    fn format_abbreviates_relative_to_base() {
        let classes = universe();
        let formatted = classes.format("a.b");
        assert_eq!(formatted, "  o a.Other\n  + ….Foo\n  o ….c.Bar");
    }

    #[test]
    fn equality_compares_member_descriptors() {
        let left = universe().that(&reside_in_package("a.b"));
        let right = universe().that(&reside_in_package("a.b"));
        assert_eq!(left, right);
        assert_ne!(left, universe());

        let private = Classes::new("private", vec![JavaClass::new("a.b.Foo").unwrap()]);
        assert_ne!(left, private.that(&reside_in_package("a.b")));
    }
}
