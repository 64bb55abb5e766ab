//! Bill-level charge distribution.
//!
//! Tax, tip, and discount are allocated over the people of the bill, either
//! evenly or in proportion to each person's item subtotal. The distributor is
//! sign-agnostic: it splits the charge's magnitude and the caller applies the
//! sign (the summary subtracts discount shares).

use rust_decimal::Decimal;

use crate::error::{AllocationError, ValidationError};
use crate::model::{ChargeAllocation, Money, PersonShares};
use crate::services::apportion::{apportion_cents, reconcile, split_even_cents};

/// Distributes one charge over the people of `subtotals`.
///
/// `subtotals` carries every person in the bill (zero entries included), in
/// bill people order; the result keeps that key order. An even charge splits
/// over every person regardless of item participation. A proportional charge
/// weights by subtotal and degrades to even when no item is assigned to
/// anyone. An empty subtotal map returns an empty map: the charge cannot
/// reach anybody and stays unassigned.
pub fn distribute(
    charge: Money,
    allocation: ChargeAllocation,
    subtotals: &PersonShares,
) -> Result<PersonShares, AllocationError> {
    if subtotals.is_empty() {
        return Ok(PersonShares::new());
    }

    let magnitude = charge.abs().round_to_cents();
    let cents = magnitude
        .to_cents()
        .ok_or(ValidationError::AmountOutOfRange)?;

    let total_subtotal: Money = subtotals.values().sum();
    let share_cents = match allocation {
        ChargeAllocation::Even => split_even_cents(cents, subtotals.len()),
        ChargeAllocation::Proportional if total_subtotal.is_zero() => {
            split_even_cents(cents, subtotals.len())
        }
        ChargeAllocation::Proportional => {
            let weights: Vec<Decimal> = subtotals
                .values()
                .map(|subtotal| subtotal.as_decimal())
                .collect();
            apportion_cents(cents, &weights).ok_or(ValidationError::AmountOutOfRange)?
        }
    };

    let shares: PersonShares = subtotals
        .keys()
        .cloned()
        .zip(share_cents.into_iter().map(Money::from_cents))
        .collect();
    reconcile("charge distribution", magnitude, &shares)?;
    Ok(shares)
}
