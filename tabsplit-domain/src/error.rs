use thiserror::Error;

use crate::model::{ChargeKind, ItemId, Money, PersonId};

/// Longest accepted person name, in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Rejected input. Recoverable: the offending edit is refused and the bill
/// is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Person '{person}' has an empty name")]
    EmptyPersonName { person: PersonId },
    #[error("Person '{person}' name is {length} characters, limit is {MAX_NAME_CHARS}")]
    PersonNameTooLong { person: PersonId, length: usize },
    #[error("Item '{item}' has an empty name")]
    EmptyItemName { item: ItemId },
    #[error("Item '{item}' has a negative price")]
    NegativePrice { item: ItemId },
    #[error("Item '{item}' has zero quantity")]
    ZeroQuantity { item: ItemId },
    #[error("Duplicate person id '{person}'")]
    DuplicatePerson { person: PersonId },
    #[error("Duplicate item id '{item}'")]
    DuplicateItem { item: ItemId },
    #[error("Item '{item}' lists person '{person}' more than once")]
    DuplicateParticipant { item: ItemId, person: PersonId },
    #[error("Item '{item}' uses the {method} method but assigns nobody")]
    MissingParticipants { item: ItemId, method: &'static str },
    #[error("Item '{item}' gives person '{person}' a negative weight")]
    NegativeWeight { item: ItemId, person: PersonId },
    #[error("Item '{item}' percentage weights sum to zero")]
    ZeroWeightSum { item: ItemId },
    #[error("Item '{item}' gives person '{person}' zero shares")]
    ZeroShareCount { item: ItemId, person: PersonId },
    #[error("Item '{item}' gives person '{person}' a negative amount")]
    NegativeCustomAmount { item: ItemId, person: PersonId },
    #[error("Item '{item}' custom amounts sum to {actual}, item total is {expected}")]
    CustomSumMismatch {
        item: ItemId,
        expected: Money,
        actual: Money,
    },
    #[error("Item '{item}' assigns unknown person '{person}'")]
    UnknownParticipant { item: ItemId, person: PersonId },
    #[error("The {charge} amount is negative")]
    NegativeCharge { charge: ChargeKind },
    #[error("Person '{person}' has a custom amount on item '{item}'")]
    PersonInCustomSplit { person: PersonId, item: ItemId },
    #[error("Amount does not fit integer cent arithmetic")]
    AmountOutOfRange,
}

/// Allocated shares failed to add back up to their source amount. Checked
/// defensively after every allocation; reaching this is a computation bug,
/// never a caller mistake.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{context}: shares sum to {allocated}, expected {expected}")]
pub struct ReconciliationError {
    pub context: &'static str,
    pub expected: Money,
    pub allocated: Money,
}

/// Either failure mode of the allocation services.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),
}
