use proptest::prelude::*;
use rust_decimal::Decimal;
use tabsplit_domain::{
    allocate, distribute, summarize,
    services::apportion::split_even_cents,
    Bill, BillId, ChargeAllocation, CountedShare, FixedShare, Item, ItemId, Money, Person,
    PersonId, SplitSpec, Timestamp, WeightedShare,
};

fn person_id(idx: usize) -> PersonId {
    PersonId::new(format!("p{idx}"))
}

fn item_with_split(price_cents: i64, quantity: u32, split: SplitSpec) -> Item {
    Item {
        id: ItemId::new("i1"),
        name: "item".to_owned(),
        price: Money::from_cents(price_cents),
        quantity,
        split,
    }
}

/// Builds a split of the requested method over `people` participants, using
/// the generator-provided weights, and custom amounts that reconcile by
/// construction.
fn split_for(method: usize, people: usize, weights: &[u32], total_cents: i64) -> SplitSpec {
    match method % 4 {
        0 => SplitSpec::Even((0..people).map(person_id).collect()),
        1 => SplitSpec::Percentage(
            (0..people)
                .map(|idx| WeightedShare {
                    person: person_id(idx),
                    weight: Decimal::from(weights.get(idx).copied().unwrap_or(1).max(1)),
                })
                .collect(),
        ),
        2 => SplitSpec::Shares(
            (0..people)
                .map(|idx| CountedShare {
                    person: person_id(idx),
                    count: weights.get(idx).copied().unwrap_or(1).max(1),
                })
                .collect(),
        ),
        _ => SplitSpec::Custom(
            split_even_cents(total_cents, people)
                .into_iter()
                .enumerate()
                .map(|(idx, cents)| FixedShare {
                    person: person_id(idx),
                    amount: Money::from_cents(cents),
                })
                .collect(),
        ),
    }
}

proptest! {
    #[test]
    fn every_method_reconciles_to_the_item_total(
        price_cents in 0i64..=100_000,
        quantity in 1u32..=5,
        people in 1usize..=6,
        method in 0usize..4,
        weights in prop::collection::vec(1u32..=500, 6),
    ) {
        let total_cents = price_cents * i64::from(quantity);
        let item = item_with_split(
            price_cents,
            quantity,
            split_for(method, people, &weights, total_cents),
        );

        let shares = allocate(&item).expect("allocation failed");
        prop_assert_eq!(shares.len(), people);

        let allocated: Money = shares.values().sum();
        prop_assert_eq!(allocated, Money::from_cents(total_cents));
    }

    #[test]
    fn shares_never_differ_by_more_than_one_cent_under_even(
        price_cents in 0i64..=100_000,
        people in 1usize..=8,
    ) {
        let item = item_with_split(
            price_cents,
            1,
            SplitSpec::Even((0..people).map(person_id).collect()),
        );
        let shares = allocate(&item).expect("allocation failed");
        let min = shares.values().min().copied().unwrap_or(Money::ZERO);
        let max = shares.values().max().copied().unwrap_or(Money::ZERO);
        prop_assert!(max - min <= Money::from_cents(1));
    }

    #[test]
    fn charge_distribution_reconciles(
        charge_cents in 0i64..=50_000,
        subtotal_cents in prop::collection::vec(0i64..=20_000, 1..=6),
        even in proptest::bool::ANY,
    ) {
        let subtotals = subtotal_cents
            .iter()
            .enumerate()
            .map(|(idx, cents)| (person_id(idx), Money::from_cents(*cents)))
            .collect();
        let allocation = if even {
            ChargeAllocation::Even
        } else {
            ChargeAllocation::Proportional
        };

        let shares = distribute(Money::from_cents(charge_cents), allocation, &subtotals)
            .expect("distribution failed");
        prop_assert_eq!(shares.len(), subtotal_cents.len());

        let distributed: Money = shares.values().sum();
        prop_assert_eq!(distributed, Money::from_cents(charge_cents));
    }

    #[test]
    fn summary_grand_total_matches_person_totals_plus_residue(
        people in 1usize..=5,
        item_prices in prop::collection::vec(0i64..=20_000, 0..=6),
        assignment_masks in prop::collection::vec(0usize..32, 0..=6),
        tax in 0i64..=5_000,
        tip in 0i64..=5_000,
        discount in 0i64..=5_000,
        proportional_mask in 0usize..8,
    ) {
        let mut bill = Bill::new(BillId::new("b1"), "property bill", Timestamp(1));
        bill.people = (0..people)
            .map(|idx| Person {
                id: person_id(idx),
                name: format!("person {idx}"),
                color: String::new(),
            })
            .collect();
        for (idx, price) in item_prices.iter().enumerate() {
            let mask = assignment_masks.get(idx).copied().unwrap_or(0);
            let assigned: Vec<PersonId> = (0..people)
                .filter(|person| mask & (1 << person) != 0)
                .map(person_id)
                .collect();
            bill.items.push(Item {
                id: ItemId::new(format!("i{idx}")),
                name: format!("item {idx}"),
                price: Money::from_cents(*price),
                quantity: 1,
                split: SplitSpec::Even(assigned),
            });
        }
        bill.tax = Some(Money::from_cents(tax));
        bill.tip = Some(Money::from_cents(tip));
        bill.discount = Some(Money::from_cents(discount));
        let mode = |bit: usize| {
            if proportional_mask & (1 << bit) != 0 {
                ChargeAllocation::Proportional
            } else {
                ChargeAllocation::Even
            }
        };
        bill.tax_allocation = mode(0);
        bill.tip_allocation = mode(1);
        bill.discount_allocation = mode(2);

        let summary = summarize(&bill).expect("summary failed");

        let people_sum: Money = summary.person_totals.iter().map(|t| t.total).sum();
        prop_assert_eq!(people_sum + summary.unassigned, summary.grand_total);

        for (breakdown, item) in summary.item_breakdowns.iter().zip(&bill.items) {
            let item_sum: Money = breakdown.splits.values().sum();
            if breakdown.splits.is_empty() {
                prop_assert_eq!(item_sum, Money::ZERO);
            } else {
                prop_assert_eq!(item_sum, item.total().expect("total"));
            }
        }
    }
}
