//! Packages as first-class views over a class universe.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::annotation::{Annotation, AnnotationKind};
use crate::error::{PackageError, PackageResult, require_text};
use crate::namespace;
use crate::predicate::{
    self, DescribedPredicate, PACKAGE_INFO_NAME, has_modifier, is_package_info,
    meta_annotated_with, reside_in_package, reside_in_package_tree, simple_name,
};
use crate::universe::{Classes, JavaClass, Modifier};

/// Outcome of looking up the annotation governing a package.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationLookup {
    Found(Annotation),
    Absent,
    Ambiguous(Vec<Annotation>),
}

impl AnnotationLookup {
    fn from_candidates(mut candidates: Vec<Annotation>) -> Self {
        match candidates.len() {
            0 => AnnotationLookup::Absent,
            1 => AnnotationLookup::Found(candidates.remove(0)),
            _ => AnnotationLookup::Ambiguous(candidates),
        }
    }

    /// Maps the lookup onto the package's error type, failing on ambiguity.
    pub fn into_result(
        self,
        package: &str,
        kind: &AnnotationKind,
    ) -> PackageResult<Option<Annotation>> {
        match self {
            AnnotationLookup::Found(annotation) => Ok(Some(annotation)),
            AnnotationLookup::Absent => Ok(None),
            AnnotationLookup::Ambiguous(candidates) => Err(PackageError::AmbiguousAnnotation {
                package: package.to_string(),
                annotation: kind.abbreviated_name(),
                candidates,
            }),
        }
    }
}

/// A Java package: its classes (optionally including sub-packages) and its direct sub-packages.
///
/// Equality compares the universe, the name and whether sub-packages are included.
/// The universe is immutable, so this is equivalent to comparing the derived classes
/// and sub-packages.
#[derive(Clone)]
pub struct JavaPackage {
    name: String,
    classes: Classes,
    package_classes: Classes,
    include_sub_packages: bool,
    direct_sub_packages: OnceLock<Vec<JavaPackage>>,
}

impl JavaPackage {
    /// Creates the package `name` including all of its sub-packages.
    pub fn of(classes: &Classes, name: &str) -> PackageResult<Self> {
        require_text(name, "Name")?;
        Ok(Self::new(classes.clone(), name.to_string(), true))
    }

    fn new(classes: Classes, name: String, include_sub_packages: bool) -> Self {
        let scope = if include_sub_packages {
            reside_in_package_tree(&name)
        } else {
            reside_in_package(&name)
        };
        let package_classes = classes.that(&scope);

        Self {
            name,
            classes,
            package_classes,
            include_sub_packages,
            direct_sub_packages: OnceLock::new(),
        }
    }

    /// Whether the given type is a `package-info` or a package description carrier.
    pub fn is_package_info_type(class: &JavaClass) -> bool {
        is_package_info().test(class)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        namespace::local_name(&self.name)
    }

    pub fn includes_sub_packages(&self) -> bool {
        self.include_sub_packages
    }

    /// The same package, reduced to the classes residing directly in it.
    pub fn to_single(&self) -> JavaPackage {
        Self::new(self.classes.clone(), self.name.clone(), false)
    }

    /// Direct sub-packages, ordered by name. Computed on first access.
    pub fn direct_sub_packages(&self) -> &[JavaPackage] {
        if let Some(cached) = self.direct_sub_packages.get() {
            return cached;
        }

        // Racing callers may compute concurrently; the first stored value wins.
        let computed = self.compute_direct_sub_packages();
        self.direct_sub_packages.get_or_init(move || computed)
    }

    fn compute_direct_sub_packages(&self) -> Vec<JavaPackage> {
        let names: BTreeSet<&str> = self
            .package_classes
            .iter()
            .map(JavaClass::package_name)
            .filter(|package| *package != self.name)
            .map(|package| namespace::direct_sub_package(&self.name, package))
            .collect();

        names
            .into_iter()
            .map(|name| Self::new(self.classes.clone(), name.to_string(), true))
            .collect()
    }

    /// All classes of the package, including sub-packages if the package was created to include them.
    pub fn classes(&self) -> &Classes {
        &self.package_classes
    }

    /// Public classes of the package, `package-info` excluded.
    pub fn exposed_classes(&self) -> Classes {
        let exposed = simple_name(PACKAGE_INFO_NAME)
            .negate()
            .and(&has_modifier(Modifier::Public));
        self.package_classes.that(&exposed)
    }

    /// Packages within this one whose package info type carries the given annotation.
    pub fn sub_packages_annotated_with(&self, kind: &AnnotationKind) -> Vec<JavaPackage> {
        let carriers = self
            .package_classes
            .that(&is_package_info().and(&meta_annotated_with(kind)));

        carriers
            .iter()
            .map(JavaClass::package_name)
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|name| Self::new(self.classes.clone(), name.to_string(), true))
            .collect()
    }

    pub fn that(&self, predicate: &DescribedPredicate<JavaClass>) -> Classes {
        self.package_classes.that(predicate)
    }

    pub fn contains(&self, class: &JavaClass) -> bool {
        self.package_classes.contains(class)
    }

    pub fn contains_type(&self, type_name: &str) -> PackageResult<bool> {
        require_text(type_name, "Type name")?;
        Ok(self.package_classes.contains_name(type_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &JavaClass> + '_ {
        self.package_classes.iter()
    }

    pub fn description(&self) -> &str {
        self.classes.description()
    }

    /// Annotation declared on the package's `package-info` type.
    pub fn get_annotation(&self, kind: &AnnotationKind) -> PackageResult<Option<Annotation>> {
        self.lookup_package_info(kind).into_result(&self.name, kind)
    }

    /// Annotation declared on the package itself or, failing that, on the single
    /// package description carrier among the package's direct types.
    pub fn find_annotation(&self, kind: &AnnotationKind) -> PackageResult<Option<Annotation>> {
        self.resolve_annotation(kind).into_result(&self.name, kind)
    }

    pub fn resolve_annotation(&self, kind: &AnnotationKind) -> AnnotationLookup {
        match self.lookup_package_info(kind) {
            AnnotationLookup::Absent => self.lookup_carriers(kind),
            other => other,
        }
    }

    fn lookup_package_info(&self, kind: &AnnotationKind) -> AnnotationLookup {
        let markers = reside_in_package(&self.name)
            .and(&simple_name(PACKAGE_INFO_NAME))
            .and(&meta_annotated_with(kind));
        Self::merged(&self.package_classes.that(&markers), kind)
    }

    fn lookup_carriers(&self, kind: &AnnotationKind) -> AnnotationLookup {
        let carriers = meta_annotated_with(&predicate::package_info_annotation())
            .and(&meta_annotated_with(kind));
        Self::merged(&self.to_single().package_classes.that(&carriers), kind)
    }

    fn merged(candidates: &Classes, kind: &AnnotationKind) -> AnnotationLookup {
        AnnotationLookup::from_candidates(
            candidates
                .iter()
                .filter_map(|class| class.merged_annotation(kind).cloned())
                .collect(),
        )
    }
}

impl PartialEq for JavaPackage {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.include_sub_packages == other.include_sub_packages
            && self.classes.shares_universe_with(&other.classes)
            && self.package_classes == other.package_classes
    }
}

impl Eq for JavaPackage {}

impl Hash for JavaPackage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.include_sub_packages.hash(state);
    }
}

impl fmt::Debug for JavaPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JavaPackage")
            .field("name", &self.name)
            .field("include_sub_packages", &self.include_sub_packages)
            .field("classes", &self.package_classes.len())
            .finish()
    }
}

impl fmt::Display for JavaPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", self.package_classes.format(&self.name))
    }
}

impl<'a> IntoIterator for &'a JavaPackage {
    type Item = &'a JavaClass;
    type IntoIter = Box<dyn Iterator<Item = &'a JavaClass> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
