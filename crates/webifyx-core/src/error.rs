//! Errors raised by document editing operations.

use crate::element::ElementId;
use thiserror::Error;

/// Errors from [`BuilderStore`](crate::store::BuilderStore) mutations.
///
/// A failed mutation leaves the document, the dirty flag and the history
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),
    #[error("Element {0} cannot contain children")]
    NotAContainer(ElementId),
    #[error("Unknown element type: {0}")]
    UnknownKind(String),
}

/// Result type for editing operations.
pub type BuilderResult<T> = Result<T, BuilderError>;
