//! Classification rules for statement lines: derived status and dependent-field clearing.
//! Shared by the client (optimistic update) and the API server (authoritative update).

use crate::edit::{is_passthrough_name, FieldEdit};
use crate::models::{Transaction, TransactionKind, TransactionStatus};

/// Reference a kind must carry before the line counts as reconciled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredReference {
    Customer,
    CurrencyPair,
}

pub fn required_reference(kind: TransactionKind) -> Option<RequiredReference> {
    match kind {
        TransactionKind::Collection => Some(RequiredReference::Customer),
        TransactionKind::FxBuy | TransactionKind::FxSell => Some(RequiredReference::CurrencyPair),
        TransactionKind::Payment | TransactionKind::Refund | TransactionKind::Unset => None,
    }
}

/// Kinds for which category and sub-category are kept.
pub fn requires_category(kind: TransactionKind) -> bool {
    matches!(
        kind,
        TransactionKind::Payment | TransactionKind::Refund | TransactionKind::Unset
    )
}

pub fn calculate_status(t: &Transaction) -> TransactionStatus {
    if !t.kind.is_set() {
        return TransactionStatus::Pending;
    }
    let satisfied = match required_reference(t.kind) {
        Some(RequiredReference::Customer) => t.customer_id.is_some(),
        Some(RequiredReference::CurrencyPair) => t.currency_pair.is_some(),
        None => true,
    };
    if satisfied {
        TransactionStatus::Completed
    } else {
        TransactionStatus::Pending
    }
}

/// Assign the edit, clear fields that no longer apply, recompute status.
///
/// Clearing is keyed on which field was edited, not on whether its value changed:
/// re-selecting the same category still drops the sub-category.
pub fn apply_edit(current: &Transaction, edit: &FieldEdit) -> Transaction {
    let mut t = current.clone();
    match edit {
        FieldEdit::Kind(kind) => {
            t.kind = *kind;
            if *kind != TransactionKind::Collection {
                t.customer_id = None;
            }
            if !kind.is_fx() {
                t.currency_pair = None;
            }
            if !requires_category(*kind) {
                t.category_id = None;
                t.sub_category_id = None;
            }
        }
        FieldEdit::Customer(c) => t.customer_id = c.clone(),
        FieldEdit::CurrencyPair(p) => t.currency_pair = p.clone(),
        FieldEdit::Category(c) => {
            t.category_id = c.clone();
            t.sub_category_id = None;
        }
        FieldEdit::SubCategory(c) => t.sub_category_id = c.clone(),
        FieldEdit::Passthrough(p) => {
            debug_assert!(is_passthrough_name(p.field()), "passthrough edit of {}", p.field());
            if is_passthrough_name(p.field()) {
                t.extra.insert(p.field().to_string(), p.value().clone());
            }
        }
    }
    t.status = calculate_status(&t);
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CategoryId, CustomerId, TransactionId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn line() -> Transaction {
        Transaction::new(TransactionId::parse("t1").unwrap())
    }

    fn cat(s: &str) -> Option<CategoryId> {
        Some(CategoryId::parse(s).unwrap())
    }

    #[test]
    fn status_table_for_every_kind_with_and_without_reference() {
        use TransactionKind::*;
        use TransactionStatus::*;
        // (kind, expected without reference, expected with reference)
        let table = [
            (Collection, Pending, Completed),
            (Payment, Completed, Completed),
            (Refund, Completed, Completed),
            (FxBuy, Pending, Completed),
            (FxSell, Pending, Completed),
            (Unset, Pending, Pending),
        ];
        for (kind, without, with) in table {
            let mut t = line();
            t.kind = kind;
            assert_eq!(calculate_status(&t), without, "{:?} without reference", kind);

            match required_reference(kind) {
                Some(RequiredReference::Customer) => t.customer_id = Some(CustomerId::parse("c1").unwrap()),
                Some(RequiredReference::CurrencyPair) => t.currency_pair = Some("EUR/TRY".into()),
                None => {
                    t.customer_id = Some(CustomerId::parse("c1").unwrap());
                    t.currency_pair = Some("EUR/TRY".into());
                }
            }
            assert_eq!(calculate_status(&t), with, "{:?} with reference", kind);
        }
    }

    #[test]
    fn fx_kind_does_not_accept_customer_as_reference() {
        let mut t = line();
        t.kind = TransactionKind::FxSell;
        t.customer_id = Some(CustomerId::parse("c1").unwrap());
        assert_eq!(calculate_status(&t), TransactionStatus::Pending);
    }

    #[test]
    fn kind_change_clears_customer_and_recomputes_status() {
        let mut t = line();
        t.kind = TransactionKind::Collection;
        t.customer_id = Some(CustomerId::parse("C1").unwrap());
        t.status = TransactionStatus::Completed;

        let out = apply_edit(&t, &FieldEdit::Kind(TransactionKind::Payment));
        assert_eq!(out.customer_id, None);
        assert_eq!(out.kind, TransactionKind::Payment);
        assert_eq!(out.status, TransactionStatus::Completed);
    }

    #[test]
    fn kind_change_clears_currency_pair_unless_fx() {
        let mut t = line();
        t.kind = TransactionKind::FxBuy;
        t.currency_pair = Some("USD/TRY".into());

        let still_fx = apply_edit(&t, &FieldEdit::Kind(TransactionKind::FxSell));
        assert_eq!(still_fx.currency_pair.as_deref(), Some("USD/TRY"));
        assert_eq!(still_fx.status, TransactionStatus::Completed);

        let refund = apply_edit(&t, &FieldEdit::Kind(TransactionKind::Refund));
        assert_eq!(refund.currency_pair, None);
    }

    #[test]
    fn kind_outside_category_set_clears_both_categories() {
        let mut t = line();
        t.kind = TransactionKind::Payment;
        t.category_id = cat("X");
        t.sub_category_id = cat("Y");

        let refund = apply_edit(&t, &FieldEdit::Kind(TransactionKind::Refund));
        assert_eq!(refund.category_id, cat("X"));
        assert_eq!(refund.sub_category_id, cat("Y"));

        let unset = apply_edit(&t, &FieldEdit::Kind(TransactionKind::Unset));
        assert_eq!(unset.category_id, cat("X"));
        assert_eq!(unset.status, TransactionStatus::Pending);

        let collection = apply_edit(&t, &FieldEdit::Kind(TransactionKind::Collection));
        assert_eq!(collection.category_id, None);
        assert_eq!(collection.sub_category_id, None);
        assert_eq!(collection.status, TransactionStatus::Pending);
    }

    #[test]
    fn category_edit_always_drops_sub_category() {
        let mut t = line();
        t.kind = TransactionKind::Payment;
        t.category_id = cat("X");
        t.sub_category_id = cat("Y");

        let changed = apply_edit(&t, &FieldEdit::Category(cat("Z")));
        assert_eq!(changed.category_id, cat("Z"));
        assert_eq!(changed.sub_category_id, None);

        let same = apply_edit(&t, &FieldEdit::Category(cat("X")));
        assert_eq!(same.sub_category_id, None);
    }

    #[test]
    fn passthrough_edit_only_touches_its_field() {
        let mut t = line();
        t.kind = TransactionKind::Collection;
        t.customer_id = Some(CustomerId::parse("C1").unwrap());
        let edit = FieldEdit::passthrough("description", json!("Fuar standi avans")).unwrap();

        let out = apply_edit(&t, &edit);
        assert_eq!(out.extra.get("description"), Some(&json!("Fuar standi avans")));
        assert_eq!(out.customer_id, t.customer_id);
        assert_eq!(out.status, TransactionStatus::Completed);
    }

    #[test]
    fn status_is_recomputed_even_if_stored_value_was_wrong() {
        let mut t = line();
        t.status = TransactionStatus::Completed;
        let out = apply_edit(&t, &FieldEdit::SubCategory(None));
        assert_eq!(out.status, TransactionStatus::Pending);
    }

    #[test]
    fn status_cannot_be_written_through_a_passthrough_edit() {
        assert!(FieldEdit::from_wire("status", json!("completed")).is_err());

        let edit = FieldEdit::from_wire("note", json!("completed")).unwrap();
        let out = apply_edit(&line(), &edit);
        let wire = serde_json::to_value(&out).unwrap();
        assert_eq!(wire["status"], json!("pending"));
        assert_eq!(wire["note"], json!("completed"));
        assert!(!out.extra.contains_key("status"));
    }
}
