//! The JSON document boundary.
//!
//! Bills persist and travel as JSON. Parsing runs deserialization plus full
//! structural validation, so only valid documents ever reach `LOAD_BILL`.
//! Forward migration of older documents happens in the schema itself: missing
//! `status`, `accessCount`, and allocation modes take their defaults, and
//! legacy empty-string charges read as unset. Required fields hard-fail.

use tabsplit_domain::Bill;

use crate::action::Action;
use crate::error::DocumentError;

pub fn parse_bill(json: &str) -> Result<Bill, DocumentError> {
    let bill: Bill = serde_json::from_str(json)?;
    bill.validate()?;
    Ok(bill)
}

pub fn serialize_bill(bill: &Bill) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(bill)?)
}

pub fn parse_action(json: &str) -> Result<Action, DocumentError> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_action(action: &Action) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(action)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsplit_domain::{
        BillStatus, ChargeAllocation, ItemId, Money, PersonId, SplitSpec, Timestamp,
    };

    const CURRENT_DOCUMENT: &str = r##"{
        "id": "bill-1",
        "title": "team dinner",
        "status": "active",
        "people": [
            {"id": "p1", "name": "Ana", "color": "#ff0000"},
            {"id": "p2", "name": "Ben", "color": "#00ff00"}
        ],
        "items": [
            {
                "id": "i1",
                "name": "pizza",
                "price": "18.50",
                "quantity": 2,
                "method": "even",
                "assignment": ["p1", "p2"]
            },
            {
                "id": "i2",
                "name": "wine",
                "price": "24.00",
                "method": "percentage",
                "assignment": [
                    {"person": "p1", "weight": 70},
                    {"person": "p2", "weight": "30"}
                ]
            }
        ],
        "tax": "3.40",
        "tip": "5.00",
        "discount": "",
        "taxAllocation": "proportional",
        "tipAllocation": "even",
        "createdAt": 1700000000000,
        "lastModified": 1700000001000,
        "accessCount": 7
    }"##;

    // Pre-status schema: no status, no accessCount, no allocation modes.
    const LEGACY_DOCUMENT: &str = r#"{
        "id": "bill-2",
        "title": "old bill",
        "people": [],
        "items": [],
        "createdAt": 1600000000000,
        "lastModified": 1600000000000
    }"#;

    #[test]
    fn parses_a_current_document() {
        let bill = parse_bill(CURRENT_DOCUMENT).expect("parse");
        assert_eq!(bill.status, BillStatus::Active);
        assert_eq!(bill.people.len(), 2);
        assert_eq!(bill.tax, Some("3.40".parse().expect("tax")));
        assert_eq!(bill.discount, None, "blank charge reads as unset");
        assert_eq!(bill.tip_allocation, ChargeAllocation::Even);
        assert_eq!(bill.access_count, 7);

        let pizza = bill.item(&ItemId::new("i1")).expect("item");
        assert_eq!(pizza.quantity, 2);
        assert_eq!(pizza.total().expect("total"), Money::from_cents(3700));

        // Weights arrive as numbers or strings.
        let wine = bill.item(&ItemId::new("i2")).expect("item");
        assert!(matches!(&wine.split, SplitSpec::Percentage(shares) if shares.len() == 2));
        assert_eq!(wine.quantity, 1, "quantity defaults to 1");
    }

    #[test]
    fn migrates_a_legacy_document_forward() {
        let bill = parse_bill(LEGACY_DOCUMENT).expect("parse");
        assert_eq!(bill.status, BillStatus::Draft);
        assert_eq!(bill.access_count, 0);
        assert_eq!(bill.tax_allocation, ChargeAllocation::Proportional);
        assert_eq!(bill.tax, None);
        assert_eq!(bill.created_at, Timestamp(1600000000000));
    }

    #[test]
    fn required_fields_have_no_defaults() {
        let missing_title = r#"{
            "id": "bill-3",
            "people": [],
            "items": [],
            "createdAt": 1,
            "lastModified": 1
        }"#;
        assert!(matches!(
            parse_bill(missing_title),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn structurally_invalid_documents_are_rejected() {
        let ghost_assignment = r#"{
            "id": "bill-4",
            "title": "bad",
            "people": [],
            "items": [
                {
                    "id": "i1",
                    "name": "pizza",
                    "price": "10.00",
                    "method": "even",
                    "assignment": ["ghost"]
                }
            ],
            "createdAt": 1,
            "lastModified": 1
        }"#;
        assert!(matches!(
            parse_bill(ghost_assignment),
            Err(DocumentError::Invalid(_))
        ));
    }

    #[test]
    fn documents_round_trip() {
        let bill = parse_bill(CURRENT_DOCUMENT).expect("parse");
        let json = serialize_bill(&bill).expect("serialize");
        let back = parse_bill(&json).expect("reparse");
        assert_eq!(back, bill);
    }

    #[test]
    fn actions_cross_the_boundary_in_wire_form() {
        let json = r#"{
            "type": "ADD_PERSON",
            "person": {"id": "p9", "name": "Cho", "color": ""}
        }"#;
        let action = parse_action(json).expect("parse");
        assert!(
            matches!(&action, Action::AddPerson { person } if person.id == PersonId::new("p9"))
        );

        let round_tripped =
            parse_action(&serialize_action(&action).expect("serialize")).expect("reparse");
        assert_eq!(round_tripped, action);
    }
}
