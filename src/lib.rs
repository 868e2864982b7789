//! # class-packages
//!
//! Hierarchical package views over a flat universe of Java class descriptors.
//!
//! ## Architecture
//!
//! - **namespace**: Dotted-name helpers, including direct sub-package extraction
//! - **annotation**: Annotation kinds and meta-annotation merging
//! - **universe**: Class descriptors and immutable, shareable class sets
//! - **predicate**: Described predicates used to filter class sets
//! - **package**: Packages, their sub-packages and package-level annotations
//! - **error**: Library error type
//! - **manifest**: JSON manifests describing a class universe
//! - **catalog**: Class descriptors from jar entry lists
//! - **scan**: Jar discovery below a directory
//! - **config**: Universe source resolution for the CLI
//! - **cli**: Command-line definition

pub mod annotation;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod namespace;
pub mod package;
pub mod predicate;
pub mod scan;
pub mod universe;

pub use error::{PackageError, PackageResult};
pub use package::{AnnotationLookup, JavaPackage};
pub use universe::{Classes, JavaClass};
