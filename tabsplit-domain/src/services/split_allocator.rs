//! Per-item share allocation.
//!
//! One item's total (price × quantity, rounded to cents once) is split over
//! its assigned people according to its method. Every method reconciles
//! exactly: the returned shares sum to the item total cent for cent.

use rust_decimal::Decimal;

use crate::error::{AllocationError, ValidationError};
use crate::model::{Item, Money, PersonShares, SplitSpec};
use crate::services::apportion::{apportion_cents, reconcile, split_even_cents};

/// Allocates one item's total across its assignment.
///
/// Key order of the result is assignment order, which is also where leftover
/// cents land first. An item with an empty assignment yields an empty map:
/// its total is unassigned and the summary reports it separately.
pub fn allocate(item: &Item) -> Result<PersonShares, AllocationError> {
    item.validate_split()?;
    if item.price.is_negative() {
        return Err(ValidationError::NegativePrice {
            item: item.id.clone(),
        }
        .into());
    }
    if item.split.is_empty() {
        return Ok(PersonShares::new());
    }

    let total = item.total()?;
    let total_cents = total.to_cents().ok_or(ValidationError::AmountOutOfRange)?;

    let shares: PersonShares = match &item.split {
        SplitSpec::Even(people) => people
            .iter()
            .cloned()
            .zip(split_even_cents(total_cents, people.len()))
            .map(|(person, cents)| (person, Money::from_cents(cents)))
            .collect(),
        SplitSpec::Percentage(entries) => {
            let weights: Vec<Decimal> = entries.iter().map(|entry| entry.weight).collect();
            let cents =
                apportion_cents(total_cents, &weights).ok_or(ValidationError::AmountOutOfRange)?;
            entries
                .iter()
                .zip(cents)
                .map(|(entry, cents)| (entry.person.clone(), Money::from_cents(cents)))
                .collect()
        }
        SplitSpec::Shares(entries) => {
            let weights: Vec<Decimal> =
                entries.iter().map(|entry| Decimal::from(entry.count)).collect();
            let cents =
                apportion_cents(total_cents, &weights).ok_or(ValidationError::AmountOutOfRange)?;
            entries
                .iter()
                .zip(cents)
                .map(|(entry, cents)| (entry.person.clone(), Money::from_cents(cents)))
                .collect()
        }
        SplitSpec::Custom(entries) => entries
            .iter()
            .map(|entry| (entry.person.clone(), entry.amount.round_to_cents()))
            .collect(),
    };

    reconcile("item allocation", total, &shares)?;
    Ok(shares)
}
