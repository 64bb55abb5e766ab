//! The undo/redo history reducer.
//!
//! `BillHistory` owns the current bill snapshot plus bounded undo and redo
//! stacks of whole snapshots. Every dispatched action either fully applies or
//! leaves all three untouched; the failure channel reports which field or id
//! was at fault. `canUndo`/`canRedo` are derived from the stack lengths,
//! never stored.

use std::collections::VecDeque;

use fxhash::FxHashSet;
use tabsplit_domain::{Bill, ChargeKind, Item, Money, PersonId, SplitSpec, ValidationError};

use crate::action::Action;
use crate::error::{ActionError, ReferenceError};
use crate::ports::Clock;

/// Undo snapshots kept before the oldest is evicted.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// What a successful dispatch did. Empty-stack `UNDO`/`REDO` are no-ops by
/// contract, not errors, so they get their own outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    NothingToUndo,
    NothingToRedo,
}

pub struct BillHistory {
    current: Bill,
    undo_stack: VecDeque<Bill>,
    redo_stack: Vec<Bill>,
    depth_limit: usize,
}

impl BillHistory {
    pub fn new(bill: Bill) -> Self {
        Self::with_depth_limit(bill, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_depth_limit(bill: Bill, depth_limit: usize) -> Self {
        Self {
            current: bill,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            depth_limit: depth_limit.max(1),
        }
    }

    /// The latest snapshot. Read-only: all mutation goes through `dispatch`.
    pub fn current(&self) -> &Bill {
        &self.current
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Applies one action. Mutating edits push the previous snapshot onto the
    /// undo stack (oldest evicted past the depth limit), clear the redo
    /// stack, and stamp `lastModified` from the clock. `UNDO`/`REDO` move
    /// snapshots between the stacks verbatim; `LOAD_BILL` replaces the
    /// current bill and resets both stacks.
    pub fn dispatch(
        &mut self,
        action: Action,
        clock: &dyn Clock,
    ) -> Result<DispatchOutcome, ActionError> {
        let kind = action.kind();
        match action {
            Action::Undo => {
                let Some(previous) = self.undo_stack.pop_back() else {
                    tracing::debug!(action = kind, "Nothing to undo");
                    return Ok(DispatchOutcome::NothingToUndo);
                };
                let replaced = std::mem::replace(&mut self.current, previous);
                self.redo_stack.push(replaced);
                tracing::debug!(
                    action = kind,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "Snapshot restored"
                );
                Ok(DispatchOutcome::Applied)
            }
            Action::Redo => {
                let Some(next) = self.redo_stack.pop() else {
                    tracing::debug!(action = kind, "Nothing to redo");
                    return Ok(DispatchOutcome::NothingToRedo);
                };
                let replaced = std::mem::replace(&mut self.current, next);
                self.undo_stack.push_back(replaced);
                tracing::debug!(
                    action = kind,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "Snapshot restored"
                );
                Ok(DispatchOutcome::Applied)
            }
            Action::LoadBill { bill } => {
                bill.validate()?;
                tracing::info!(action = kind, bill = %bill.id, "Bill loaded, history reset");
                self.current = bill;
                self.undo_stack.clear();
                self.redo_stack.clear();
                Ok(DispatchOutcome::Applied)
            }
            action => {
                let mut next = apply_edit(&self.current, action)?;
                next.last_modified = clock.now();
                if self.undo_stack.len() == self.depth_limit {
                    self.undo_stack.pop_front();
                }
                let previous = std::mem::replace(&mut self.current, next);
                self.undo_stack.push_back(previous);
                self.redo_stack.clear();
                tracing::debug!(
                    action = kind,
                    undo_depth = self.undo_stack.len(),
                    "Edit applied"
                );
                Ok(DispatchOutcome::Applied)
            }
        }
    }
}

/// Applies a mutating edit to a copy of `current`. Validation failures leave
/// the caller's state untouched because only the copy was edited.
fn apply_edit(current: &Bill, action: Action) -> Result<Bill, ActionError> {
    let mut bill = current.clone();
    match action {
        Action::AddPerson { person } => {
            person.validate()?;
            if bill.person(&person.id).is_some() {
                return Err(ValidationError::DuplicatePerson { person: person.id }.into());
            }
            bill.people.push(person);
        }
        Action::RemovePerson { person } => {
            if bill.person(&person).is_none() {
                return Err(ReferenceError::UnknownPerson { person }.into());
            }
            // Cascading out of a custom split would break its exact-sum
            // invariant; the caller edits that item first.
            for item in &bill.items {
                if matches!(item.split, SplitSpec::Custom(_)) && item.split.references(&person) {
                    return Err(ValidationError::PersonInCustomSplit {
                        person,
                        item: item.id.clone(),
                    }
                    .into());
                }
            }
            for item in &mut bill.items {
                item.split.remove_participant(&person);
            }
            bill.people.retain(|p| p.id != person);
            // A cascade can leave a percentage assignment whose remaining
            // weights sum to zero; reject rather than strand the item.
            bill.validate()?;
        }
        Action::AddItem { item } => {
            validate_item_edit(&bill, &item, None)?;
            bill.items.push(item);
        }
        Action::UpdateItem { item } => {
            let Some(position) = bill.items.iter().position(|existing| existing.id == item.id)
            else {
                return Err(ReferenceError::UnknownItem { item: item.id }.into());
            };
            validate_item_edit(&bill, &item, Some(position))?;
            bill.items[position] = item;
        }
        Action::RemoveItem { item } => {
            let Some(position) = bill.items.iter().position(|existing| existing.id == item) else {
                return Err(ReferenceError::UnknownItem { item }.into());
            };
            bill.items.remove(position);
        }
        Action::SetTax { amount, allocation } => {
            validate_charge(ChargeKind::Tax, amount)?;
            bill.tax = amount;
            bill.tax_allocation = allocation;
        }
        Action::SetTip { amount, allocation } => {
            validate_charge(ChargeKind::Tip, amount)?;
            bill.tip = amount;
            bill.tip_allocation = allocation;
        }
        Action::SetDiscount { amount, allocation } => {
            validate_charge(ChargeKind::Discount, amount)?;
            bill.discount = amount;
            bill.discount_allocation = allocation;
        }
        Action::SetBillStatus { status } => {
            bill.status = status;
        }
        Action::Undo | Action::Redo | Action::LoadBill { .. } => {
            unreachable!("handled by dispatch before apply_edit")
        }
    }
    Ok(bill)
}

fn validate_item_edit(
    bill: &Bill,
    item: &Item,
    replacing: Option<usize>,
) -> Result<(), ActionError> {
    item.validate()?;
    let duplicate = bill
        .items
        .iter()
        .enumerate()
        .any(|(idx, existing)| existing.id == item.id && Some(idx) != replacing);
    if duplicate {
        return Err(ValidationError::DuplicateItem {
            item: item.id.clone(),
        }
        .into());
    }
    if item.split.is_empty() && !matches!(item.split, SplitSpec::Even(_)) {
        return Err(ValidationError::MissingParticipants {
            item: item.id.clone(),
            method: item.split.method_name(),
        }
        .into());
    }
    let known: FxHashSet<&PersonId> = bill.people.iter().map(|person| &person.id).collect();
    for person in item.split.participants() {
        if !known.contains(person) {
            return Err(ReferenceError::UnknownPerson {
                person: person.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn validate_charge(kind: ChargeKind, amount: Option<Money>) -> Result<(), ActionError> {
    if amount.is_some_and(|amount| amount.is_negative()) {
        return Err(ValidationError::NegativeCharge { charge: kind }.into());
    }
    Ok(())
}
