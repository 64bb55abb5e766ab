//! The edit action stream: the entire mutation surface of a bill.
//!
//! Each variant carries a complete typed payload; ids are minted by the
//! caller, never here, so applying an action is deterministic. The serde form
//! is internally tagged with the screaming-snake action names
//! (`{"type": "ADD_PERSON", ...}`), which is the wire shape of the stream.

use serde::{Deserialize, Serialize};
use tabsplit_domain::{
    Bill, BillStatus, ChargeAllocation, Item, ItemId, Money, Person, PersonId,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    AddPerson {
        person: Person,
    },
    RemovePerson {
        person: PersonId,
    },
    AddItem {
        item: Item,
    },
    /// Full replacement of the item with the matching id.
    UpdateItem {
        item: Item,
    },
    RemoveItem {
        item: ItemId,
    },
    /// `amount: None` clears the charge; the allocation mode is always set.
    SetTax {
        amount: Option<Money>,
        allocation: ChargeAllocation,
    },
    SetTip {
        amount: Option<Money>,
        allocation: ChargeAllocation,
    },
    SetDiscount {
        amount: Option<Money>,
        allocation: ChargeAllocation,
    },
    SetBillStatus {
        status: BillStatus,
    },
    /// Wholesale replacement; the document is migrated and validated at the
    /// boundary before it gets here. Resets the undo/redo history.
    LoadBill {
        bill: Bill,
    },
    Undo,
    Redo,
}

impl Action {
    /// Wire-form action name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddPerson { .. } => "ADD_PERSON",
            Action::RemovePerson { .. } => "REMOVE_PERSON",
            Action::AddItem { .. } => "ADD_ITEM",
            Action::UpdateItem { .. } => "UPDATE_ITEM",
            Action::RemoveItem { .. } => "REMOVE_ITEM",
            Action::SetTax { .. } => "SET_TAX",
            Action::SetTip { .. } => "SET_TIP",
            Action::SetDiscount { .. } => "SET_DISCOUNT",
            Action::SetBillStatus { .. } => "SET_BILL_STATUS",
            Action::LoadBill { .. } => "LOAD_BILL",
            Action::Undo => "UNDO",
            Action::Redo => "REDO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_uses_screaming_snake_type_tags() {
        let action = Action::RemovePerson {
            person: PersonId::new("p1"),
        };
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(json["type"], "REMOVE_PERSON");
        assert_eq!(json["person"], "p1");

        let undo: Action = serde_json::from_str(r#"{"type": "UNDO"}"#).expect("deserialize");
        assert_eq!(undo, Action::Undo);
        assert_eq!(undo.kind(), "UNDO");
    }

    #[test]
    fn charge_actions_round_trip_cleared_amounts() {
        let action = Action::SetTax {
            amount: None,
            allocation: ChargeAllocation::Even,
        };
        let json = serde_json::to_string(&action).expect("serialize");
        let back: Action = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, action);
    }
}
