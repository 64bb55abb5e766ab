#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{AllocationError, ReconciliationError, ValidationError, MAX_NAME_CHARS};
pub use model::{
    Bill, BillId, BillStatus, BillSummary, ChargeAllocation, ChargeKind, CountedShare, FixedShare,
    Item, ItemBreakdown, ItemId, Money, ParseMoneyError, Person, PersonId, PersonShares,
    PersonTotal, SplitSpec, Timestamp, WeightedShare,
};
pub use services::{allocate, distribute, summarize};
