use thiserror::Error;

use crate::annotation::Annotation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PackageError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error(
        "Expected maximum of one type in package {package} to be annotated with {annotation}, but got [{}]!",
        join_candidates(.candidates)
    )]
    AmbiguousAnnotation {
        package: String,
        annotation: String,
        candidates: Vec<Annotation>,
    },

    #[error("Expected at most one element in {description}, but got {count}")]
    NotUnique { description: String, count: usize },
}

pub type PackageResult<T> = Result<T, PackageError>;

pub(crate) fn require_text(value: &str, what: &str) -> PackageResult<()> {
    if value.trim().is_empty() {
        return Err(PackageError::InvalidArgument(format!(
            "{what} must not be null or empty!"
        )));
    }
    Ok(())
}

fn join_candidates(candidates: &[Annotation]) -> String {
    candidates
        .iter()
        .map(|c| format!("{c} on {}", c.declared_on))
        .collect::<Vec<_>>()
        .join(", ")
}
