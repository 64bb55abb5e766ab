use thiserror::Error;

use tabsplit_domain::{ItemId, PersonId, ValidationError};

/// An action named a person or item the bill does not have.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("No person with id '{person}' in the bill")]
    UnknownPerson { person: PersonId },
    #[error("No item with id '{item}' in the bill")]
    UnknownItem { item: ItemId },
}

/// Why a dispatched action was rejected. The bill and both history stacks
/// are untouched whenever this is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Failure at the JSON document boundary.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Malformed bill document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid bill document: {0}")]
    Invalid(#[from] ValidationError),
}
