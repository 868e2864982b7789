//! Described predicates over class descriptors.

use std::fmt;
use std::sync::Arc;

use crate::annotation::AnnotationKind;
use crate::namespace;
use crate::universe::{JavaClass, Modifier};

pub const PACKAGE_INFO_NAME: &str = "package-info";
pub const PACKAGE_INFO_ANNOTATION: &str = "org.springframework.modulith.PackageInfo";

/// A predicate carrying a human readable description of what it tests.
pub struct DescribedPredicate<T: ?Sized> {
    description: String,
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized + 'static> DescribedPredicate<T> {
    pub fn new<F>(description: impl Into<String>, test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn test(&self, value: &T) -> bool {
        (self.test)(value)
    }

    pub fn and(&self, other: &DescribedPredicate<T>) -> Self {
        let (left, right) = (Arc::clone(&self.test), Arc::clone(&other.test));
        Self {
            description: format!("{} and {}", self.description, other.description),
            test: Arc::new(move |value: &T| left(value) && right(value)),
        }
    }

    pub fn or(&self, other: &DescribedPredicate<T>) -> Self {
        let (left, right) = (Arc::clone(&self.test), Arc::clone(&other.test));
        Self {
            description: format!("{} or {}", self.description, other.description),
            test: Arc::new(move |value: &T| left(value) || right(value)),
        }
    }

    pub fn negate(&self) -> Self {
        let inner = Arc::clone(&self.test);
        Self {
            description: format!("not {}", self.description),
            test: Arc::new(move |value: &T| !inner(value)),
        }
    }

    pub(crate) fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: ?Sized> Clone for DescribedPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: ?Sized> fmt::Debug for DescribedPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescribedPredicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> fmt::Display for DescribedPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Classes declared exactly in `package`.
pub fn reside_in_package(package: &str) -> DescribedPredicate<JavaClass> {
    let package = package.to_string();
    DescribedPredicate::new(format!("reside in package '{package}'"), move |c: &JavaClass| {
        c.package_name() == package
    })
}

/// Classes declared in `package` or any package below it.
pub fn reside_in_package_tree(package: &str) -> DescribedPredicate<JavaClass> {
    let package = package.to_string();
    DescribedPredicate::new(format!("reside in package '{package}..'"), move |c: &JavaClass| {
        namespace::is_same_or_nested(&package, c.package_name())
    })
}

pub fn simple_name(name: &str) -> DescribedPredicate<JavaClass> {
    let name = name.to_string();
    DescribedPredicate::new(format!("simple name '{name}'"), move |c: &JavaClass| {
        c.simple_name() == name
    })
}

pub fn meta_annotated_with(kind: &AnnotationKind) -> DescribedPredicate<JavaClass> {
    let kind = kind.clone();
    DescribedPredicate::new(format!("meta-annotated with @{}", kind.simple_name()), move |c: &JavaClass| {
        c.is_meta_annotated_with(&kind)
    })
}

pub fn has_modifier(modifier: Modifier) -> DescribedPredicate<JavaClass> {
    DescribedPredicate::new(format!("modifier {modifier}"), move |c: &JavaClass| {
        c.has_modifier(modifier)
    })
}

pub fn package_info_annotation() -> AnnotationKind {
    AnnotationKind::from_static(PACKAGE_INFO_ANNOTATION)
}

/// `package-info` types and types meta-annotated as package description carriers.
pub fn is_package_info() -> DescribedPredicate<JavaClass> {
    simple_name(PACKAGE_INFO_NAME)
        .or(&meta_annotated_with(&package_info_annotation()))
        .with_description("are package infos")
}
