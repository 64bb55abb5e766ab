//! Whole-bill aggregation.
//!
//! Runs the split allocator over every item, folds the shares into per-person
//! subtotals, distributes tax, tip, and discount, and produces the totals the
//! export and display collaborators consume. Pure: the same bill snapshot
//! always produces the same summary, so callers may re-run it on every edit.

use crate::error::{AllocationError, ReconciliationError, ValidationError};
use crate::model::{Bill, BillSummary, ItemBreakdown, Money, PersonShares, PersonTotal};
use crate::services::charge_distributor::distribute;
use crate::services::split_allocator::allocate;

/// Summarizes a bill snapshot into per-person totals, per-item breakdowns,
/// and the grand total.
///
/// The grand total is computed independently of the per-person sums and the
/// two are asserted equal (extended by the unassigned residue of items nobody
/// participates in, and of charges on a bill with no people). A mismatch is a
/// computation bug and surfaces as a [`ReconciliationError`].
pub fn summarize(bill: &Bill) -> Result<BillSummary, AllocationError> {
    let mut subtotals: PersonShares = bill
        .people
        .iter()
        .map(|person| (person.id.clone(), Money::ZERO))
        .collect();

    let mut item_breakdowns = Vec::with_capacity(bill.items.len());
    let mut subtotal = Money::ZERO;
    let mut unassigned = Money::ZERO;
    for item in &bill.items {
        let splits = allocate(item)?;
        let item_total = item.total()?;
        subtotal += item_total;
        if splits.is_empty() {
            unassigned += item_total;
        }
        for (person, share) in &splits {
            let entry = subtotals
                .get_mut(person)
                .ok_or_else(|| ValidationError::UnknownParticipant {
                    item: item.id.clone(),
                    person: person.clone(),
                })?;
            *entry += *share;
        }
        item_breakdowns.push(ItemBreakdown {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            splits,
        });
    }

    let charge_amount = |amount: Option<Money>| amount.unwrap_or(Money::ZERO).round_to_cents();
    let tax = charge_amount(bill.tax);
    let tip = charge_amount(bill.tip);
    let discount = charge_amount(bill.discount);

    let tax_shares = distribute(tax, bill.tax_allocation, &subtotals)?;
    let tip_shares = distribute(tip, bill.tip_allocation, &subtotals)?;
    let discount_shares = distribute(discount, bill.discount_allocation, &subtotals)?;
    if bill.people.is_empty() {
        // No one to carry the charges; they stay on the bill as residue.
        unassigned += tax + tip - discount;
    }

    let person_totals: Vec<PersonTotal> = subtotals
        .iter()
        .map(|(person, item_subtotal)| {
            let tax = tax_shares[person];
            let tip = tip_shares[person];
            let discount = discount_shares[person];
            PersonTotal {
                person: person.clone(),
                subtotal: *item_subtotal,
                tax,
                tip,
                discount,
                total: *item_subtotal + tax + tip - discount,
            }
        })
        .collect();

    let grand_total = subtotal + tax + tip - discount;
    let people_sum: Money = person_totals.iter().map(|totals| totals.total).sum();
    if people_sum + unassigned != grand_total {
        tracing::error!(
            bill = %bill.id,
            grand_total = %grand_total,
            people_sum = %people_sum,
            unassigned = %unassigned,
            "Bill summary failed to reconcile with its grand total"
        );
        return Err(ReconciliationError {
            context: "bill summary",
            expected: grand_total,
            allocated: people_sum + unassigned,
        }
        .into());
    }

    Ok(BillSummary {
        person_totals,
        item_breakdowns,
        subtotal,
        grand_total,
        unassigned,
    })
}
