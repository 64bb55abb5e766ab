use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use fxhash::FxHashSet;
use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::error::{ValidationError, MAX_NAME_CHARS};

/// Decimal places of the minor currency unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// An exact decimal amount of money in major currency units.
///
/// Arithmetic on `Money` is exact; rounding to the minor unit happens only
/// where a value leaves the computation (cent conversion, charge totals).
/// Rounding is banker-unbiased (half to even), so repeated summaries do not
/// drift in one direction.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: i64, scale: u32) -> Self {
        Self(Decimal::new(amount, scale))
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MINOR_UNIT_SCALE))
    }

    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Rounds to the minor unit, half to even.
    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Integer minor units after half-even rounding, or `None` when the
    /// amount does not fit an `i64` cent count.
    pub fn to_cents(self) -> Option<i64> {
        self.round_to_cents()
            .0
            .checked_mul(Decimal::ONE_HUNDRED)?
            .trunc()
            .to_i64()
    }

    /// Overflow-checked `price × quantity` multiplication.
    pub fn checked_mul(self, rhs: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(rhs)).map(Money)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid money amount '{input}': {source}")]
pub struct ParseMoneyError {
    input: String,
    source: rust_decimal::Error,
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(input.trim())
            .map(Money)
            .map_err(|source| ParseMoneyError {
                input: input.to_owned(),
                source,
            })
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, amount| acc + *amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(pub String);

impl BillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch, the timestamp form of the persisted
/// schema.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

/// Which bill-level charge a value refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeKind {
    Tax,
    Tip,
    Discount,
}

impl ChargeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeKind::Tax => "tax",
            ChargeKind::Tip => "tip",
            ChargeKind::Discount => "discount",
        }
    }
}

impl fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Display color; never touches computation.
    #[serde(default)]
    pub color: String,
}

impl Person {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyPersonName {
                person: self.id.clone(),
            });
        }
        let length = self.name.chars().count();
        if length > MAX_NAME_CHARS {
            return Err(ValidationError::PersonNameTooLong {
                person: self.id.clone(),
                length,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedShare {
    pub person: PersonId,
    pub weight: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountedShare {
    pub person: PersonId,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedShare {
    pub person: PersonId,
    pub amount: Money,
}

/// Split method together with its assignment. Entry order is the assignment
/// order, which decides where leftover cents land, so it is semantically
/// meaningful and preserved everywhere.
///
/// Serializes as the two schema fields `method` and `assignment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "assignment", rename_all = "camelCase")]
pub enum SplitSpec {
    /// Equal shares for every assigned person.
    Even(Vec<PersonId>),
    /// Shares proportional to percentage weights. Weights that do not sum
    /// to 100 are treated as proportions of their own sum.
    Percentage(Vec<WeightedShare>),
    /// Shares proportional to integer share counts.
    Shares(Vec<CountedShare>),
    /// Explicit per-person amounts; must sum to the item total exactly.
    Custom(Vec<FixedShare>),
}

impl SplitSpec {
    pub fn method_name(&self) -> &'static str {
        match self {
            SplitSpec::Even(_) => "even",
            SplitSpec::Percentage(_) => "percentage",
            SplitSpec::Shares(_) => "shares",
            SplitSpec::Custom(_) => "custom",
        }
    }

    /// Assigned people in assignment order.
    pub fn participants(&self) -> Vec<&PersonId> {
        match self {
            SplitSpec::Even(people) => people.iter().collect(),
            SplitSpec::Percentage(shares) => shares.iter().map(|share| &share.person).collect(),
            SplitSpec::Shares(shares) => shares.iter().map(|share| &share.person).collect(),
            SplitSpec::Custom(shares) => shares.iter().map(|share| &share.person).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SplitSpec::Even(people) => people.is_empty(),
            SplitSpec::Percentage(shares) => shares.is_empty(),
            SplitSpec::Shares(shares) => shares.is_empty(),
            SplitSpec::Custom(shares) => shares.is_empty(),
        }
    }

    pub fn references(&self, person: &PersonId) -> bool {
        self.participants().into_iter().any(|p| p == person)
    }

    /// Drops the person from the assignment. Returns whether they were
    /// present.
    pub fn remove_participant(&mut self, person: &PersonId) -> bool {
        let before = self.participants().len();
        match self {
            SplitSpec::Even(people) => people.retain(|p| p != person),
            SplitSpec::Percentage(shares) => shares.retain(|share| &share.person != person),
            SplitSpec::Shares(shares) => shares.retain(|share| &share.person != person),
            SplitSpec::Custom(shares) => shares.retain(|share| &share.person != person),
        }
        self.participants().len() != before
    }
}

fn default_quantity() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Money,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(flatten)]
    pub split: SplitSpec,
}

impl Item {
    /// The item total: price × quantity, rounded to the minor unit half to
    /// even. This is the amount the allocator reconciles shares against.
    /// A product past the representable range is an error, never a panic.
    pub fn total(&self) -> Result<Money, ValidationError> {
        self.price
            .checked_mul(self.quantity)
            .map(Money::round_to_cents)
            .ok_or(ValidationError::AmountOutOfRange)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyItemName {
                item: self.id.clone(),
            });
        }
        if self.price.is_negative() {
            return Err(ValidationError::NegativePrice {
                item: self.id.clone(),
            });
        }
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity {
                item: self.id.clone(),
            });
        }
        self.validate_split()
    }

    /// Split-level rules only: duplicate participants, weight signs, share
    /// counts, custom sums. The allocator re-checks these on every call.
    pub fn validate_split(&self) -> Result<(), ValidationError> {
        let mut seen: FxHashSet<&PersonId> = FxHashSet::default();
        for person in self.split.participants() {
            if !seen.insert(person) {
                return Err(ValidationError::DuplicateParticipant {
                    item: self.id.clone(),
                    person: person.clone(),
                });
            }
        }
        match &self.split {
            SplitSpec::Even(_) => Ok(()),
            SplitSpec::Percentage(shares) => {
                for share in shares {
                    if share.weight.is_sign_negative() && !share.weight.is_zero() {
                        return Err(ValidationError::NegativeWeight {
                            item: self.id.clone(),
                            person: share.person.clone(),
                        });
                    }
                }
                let total: Decimal = shares.iter().map(|share| share.weight).sum();
                if !shares.is_empty() && total.is_zero() {
                    return Err(ValidationError::ZeroWeightSum {
                        item: self.id.clone(),
                    });
                }
                Ok(())
            }
            SplitSpec::Shares(shares) => {
                for share in shares {
                    if share.count == 0 {
                        return Err(ValidationError::ZeroShareCount {
                            item: self.id.clone(),
                            person: share.person.clone(),
                        });
                    }
                }
                Ok(())
            }
            SplitSpec::Custom(shares) => {
                for share in shares {
                    if share.amount.is_negative() {
                        return Err(ValidationError::NegativeCustomAmount {
                            item: self.id.clone(),
                            person: share.person.clone(),
                        });
                    }
                }
                if !shares.is_empty() {
                    // Amounts are compared after cent rounding, matching
                    // the rounding applied during allocation.
                    let total: Money = shares
                        .iter()
                        .map(|share| share.amount.round_to_cents())
                        .sum();
                    let expected = self.total()?;
                    if total != expected {
                        return Err(ValidationError::CustomSumMismatch {
                            item: self.id.clone(),
                            expected,
                            actual: total,
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BillStatus {
    #[default]
    Draft,
    Active,
    Closed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChargeAllocation {
    /// Weighted by each person's item subtotal.
    #[default]
    Proportional,
    /// Equal over every person in the bill, item participation aside.
    Even,
}

/// The bill document. Fields mirror the persisted JSON schema; `status`,
/// `accessCount`, and allocation modes absent in older documents are filled
/// by the serde defaults, which is the forward-migration step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: BillId,
    pub title: String,
    #[serde(default)]
    pub status: BillStatus,
    /// Insertion order is meaningful: it breaks remainder ties and orders
    /// every derived output.
    pub people: Vec<Person>,
    pub items: Vec<Item>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "money_or_blank"
    )]
    pub tax: Option<Money>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "money_or_blank"
    )]
    pub tip: Option<Money>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "money_or_blank"
    )]
    pub discount: Option<Money>,
    #[serde(default)]
    pub tax_allocation: ChargeAllocation,
    #[serde(default)]
    pub tip_allocation: ChargeAllocation,
    #[serde(default)]
    pub discount_allocation: ChargeAllocation,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
    /// Maintained by the external store, carried verbatim here.
    #[serde(default)]
    pub access_count: u64,
}

impl Bill {
    /// A fresh draft bill with no people or items.
    pub fn new(id: BillId, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id,
            title: title.into(),
            status: BillStatus::Draft,
            people: Vec::new(),
            items: Vec::new(),
            tax: None,
            tip: None,
            discount: None,
            tax_allocation: ChargeAllocation::default(),
            tip_allocation: ChargeAllocation::default(),
            discount_allocation: ChargeAllocation::default(),
            created_at,
            last_modified: created_at,
            access_count: 0,
        }
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.people.iter().find(|person| &person.id == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn charge(&self, kind: ChargeKind) -> (Option<Money>, ChargeAllocation) {
        match kind {
            ChargeKind::Tax => (self.tax, self.tax_allocation),
            ChargeKind::Tip => (self.tip, self.tip_allocation),
            ChargeKind::Discount => (self.discount, self.discount_allocation),
        }
    }

    /// Structural validation of the whole document: entity field rules, id
    /// uniqueness, assignment references, charge signs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut person_ids: FxHashSet<&PersonId> = FxHashSet::default();
        for person in &self.people {
            person.validate()?;
            if !person_ids.insert(&person.id) {
                return Err(ValidationError::DuplicatePerson {
                    person: person.id.clone(),
                });
            }
        }
        let mut item_ids: FxHashSet<&ItemId> = FxHashSet::default();
        for item in &self.items {
            item.validate()?;
            if !item_ids.insert(&item.id) {
                return Err(ValidationError::DuplicateItem {
                    item: item.id.clone(),
                });
            }
            for person in item.split.participants() {
                if !person_ids.contains(person) {
                    return Err(ValidationError::UnknownParticipant {
                        item: item.id.clone(),
                        person: person.clone(),
                    });
                }
            }
        }
        for kind in [ChargeKind::Tax, ChargeKind::Tip, ChargeKind::Discount] {
            let (amount, _) = self.charge(kind);
            if amount.is_some_and(|amount| amount.is_negative()) {
                return Err(ValidationError::NegativeCharge { charge: kind });
            }
        }
        Ok(())
    }
}

/// Per-person money map in a fixed order (assignment order for item splits,
/// bill people order for subtotal and charge maps). The ordered map keeps
/// remainder tie-breaks and display order deterministic.
pub type PersonShares = IndexMap<PersonId, Money>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTotal {
    pub person: PersonId,
    pub subtotal: Money,
    pub tax: Money,
    pub tip: Money,
    pub discount: Money,
    /// `subtotal + tax + tip − discount`.
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBreakdown {
    pub item_id: ItemId,
    pub item_name: String,
    /// Keys are exactly the assigned people; empty for unassigned items.
    pub splits: PersonShares,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSummary {
    pub person_totals: Vec<PersonTotal>,
    pub item_breakdowns: Vec<ItemBreakdown>,
    /// Nominal bill subtotal: every item total, assigned or not.
    pub subtotal: Money,
    pub grand_total: Money,
    /// Item totals nobody is assigned to, plus charges when the bill has no
    /// people. `grand_total == sum of person totals + unassigned` always.
    pub unassigned: Money,
}

// Older documents persist unset charges as "". Accept that, null, absence,
// and a plain decimal value.
fn money_or_blank<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Amount(Money),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Amount(amount)) => Ok(Some(amount)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
