//! Integer-cent remainder distribution shared by the split allocator and the
//! charge distributor.
//!
//! Both engines take a non-negative cent total and hand every cent to exactly
//! one entry, so the shares always add back up to the total. Where leftover
//! cents land is deterministic: entry order for even splits, largest
//! truncated fractional remainder (ties by entry order) for weighted splits.

use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::error::ReconciliationError;
use crate::model::{Money, PersonShares};

/// Even split of `total` cents over `count` entries: base = total / count
/// truncated, and the leftover cents go one each to the first entries.
pub fn split_even_cents(total: i64, count: usize) -> Vec<i64> {
    debug_assert!(total >= 0);
    if count == 0 {
        return Vec::new();
    }
    let base = total / count as i64;
    let remainder = (total % count as i64) as usize;
    (0..count)
        .map(|idx| if idx < remainder { base + 1 } else { base })
        .collect()
}

/// Proportional split of `total` cents by `weights` with largest-remainder
/// reconciliation: floor each raw share `total * weight / sum(weights)`, then
/// hand the leftover cents out in descending order of truncated fractional
/// remainder, ties broken by entry order.
///
/// Returns `None` when a share leaves the `i64` cent range or the weight sum
/// is zero (callers validate weights before reaching here).
pub fn apportion_cents(total: i64, weights: &[Decimal]) -> Option<Vec<i64>> {
    debug_assert!(total >= 0);
    if weights.is_empty() {
        return Some(Vec::new());
    }
    let weight_sum: Decimal = weights.iter().sum();
    if weight_sum.is_zero() {
        return None;
    }

    let total_dec = Decimal::from(total);
    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    let mut floored_sum = 0i64;
    for weight in weights {
        let raw = total_dec.checked_mul(*weight)?.checked_div(weight_sum)?;
        let floor = raw.floor();
        let cents = floor.to_i64()?;
        remainders.push(raw - floor);
        shares.push(cents);
        floored_sum = floored_sum.checked_add(cents)?;
    }

    // Exact arithmetic leaves 0..len leftover cents. Decimal division is
    // truncated at 28 significant digits, so the delta is walked in both
    // directions rather than assumed positive.
    let mut delta = total.checked_sub(floored_sum)?;
    if delta > 0 {
        let mut order: Vec<usize> = (0..weights.len()).collect();
        order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));
        for idx in order.into_iter().cycle() {
            if delta == 0 {
                break;
            }
            shares[idx] += 1;
            delta -= 1;
        }
    } else if delta < 0 {
        let mut order: Vec<usize> = (0..weights.len()).collect();
        order.sort_by(|&a, &b| remainders[a].cmp(&remainders[b]).then(a.cmp(&b)));
        for idx in order.into_iter().cycle() {
            if delta == 0 {
                break;
            }
            shares[idx] -= 1;
            delta += 1;
        }
    }

    Some(shares)
}

/// Post-allocation guard: the shares must add back up to the source amount.
/// A failure here is a computation bug, logged loudly before surfacing.
pub(crate) fn reconcile(
    context: &'static str,
    expected: Money,
    shares: &PersonShares,
) -> Result<(), ReconciliationError> {
    let allocated: Money = shares.values().sum();
    if allocated != expected {
        tracing::error!(
            context,
            expected = %expected,
            allocated = %allocated,
            share_count = shares.len(),
            "Allocated shares do not sum back to their source amount"
        );
        return Err(ReconciliationError {
            context,
            expected,
            allocated,
        });
    }
    Ok(())
}
