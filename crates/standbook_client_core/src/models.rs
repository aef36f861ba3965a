//! Data models for statement transactions, statements and save state.
//! Wire format is the backend's camelCase JSON. Fields the client does not interpret are
//! carried in `extra` so records round-trip unchanged.

use crate::ids::{BankId, CategoryId, CustomerId, StatementId, TransactionId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// What a statement line turned out to be. `Unset` is the wire value `""`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Collection,
    Payment,
    Refund,
    FxBuy,
    FxSell,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 6] = [
        TransactionKind::Collection,
        TransactionKind::Payment,
        TransactionKind::Refund,
        TransactionKind::FxBuy,
        TransactionKind::FxSell,
        TransactionKind::Unset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Collection => "collection",
            TransactionKind::Payment => "payment",
            TransactionKind::Refund => "refund",
            TransactionKind::FxBuy => "fx_buy",
            TransactionKind::FxSell => "fx_sell",
            TransactionKind::Unset => "",
        }
    }

    pub fn is_set(&self) -> bool {
        *self != TransactionKind::Unset
    }

    pub fn is_fx(&self) -> bool {
        matches!(self, TransactionKind::FxBuy | TransactionKind::FxSell)
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown transaction type: {:?}", s))
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived from kind and references; never edited directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
}

/// Bank statement line under reconciliation (wire format).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: TransactionKind,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub currency_pair: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sub_category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TransactionStatus,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Transaction {
    /// Fresh, unclassified line.
    pub fn new(id: TransactionId) -> Self {
        Self {
            id,
            kind: TransactionKind::Unset,
            customer_id: None,
            currency_pair: None,
            category_id: None,
            sub_category_id: None,
            status: TransactionStatus::Pending,
            extra: serde_json::Map::new(),
        }
    }
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

// Older statement imports send "" instead of null for unset references.
fn blank_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<String>::deserialize(de)? {
        Some(s) if !s.trim().is_empty() => T::from_str(&s).map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// The loaded parent statement. Remote saves are scoped by it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementRef {
    pub bank_id: BankId,
    pub statement_id: StatementId,
}

impl StatementRef {
    pub fn new(bank_id: BankId, statement_id: StatementId) -> Self {
        Self { bank_id, statement_id }
    }
}

/// Outcome of the most recent remote save in this editing session.
/// `Unsaved` doubles as the idle state before anything was saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Unsaved,
    Saving,
    Saved,
}

/// PUT success body. `updatedTransaction` is the server's authoritative record, when sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    #[serde(default)]
    pub updated_transaction: Option<Transaction>,
}

/// GET list body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn kind_wire_values() {
        assert_eq!(serde_json::to_value(TransactionKind::FxBuy).unwrap(), json!("fx_buy"));
        assert_eq!(serde_json::to_value(TransactionKind::Unset).unwrap(), json!(""));
        let k: TransactionKind = serde_json::from_value(json!("collection")).unwrap();
        assert_eq!(k, TransactionKind::Collection);
        assert_eq!("fx_sell".parse::<TransactionKind>(), Ok(TransactionKind::FxSell));
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn transaction_reads_backend_record_and_keeps_unknown_fields() {
        let raw = json!({
            "id": "t1",
            "type": null,
            "customerId": "",
            "currencyPair": null,
            "categoryId": "cat_rent",
            "amount": "-1250.00",
            "description": "KIRA ODEMESI"
        });
        let t: Transaction = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(t.kind, TransactionKind::Unset);
        assert_eq!(t.customer_id, None);
        assert_eq!(t.category_id.as_ref().map(|c| c.as_str()), Some("cat_rent"));
        assert_eq!(t.sub_category_id, None);
        assert_eq!(t.status, TransactionStatus::Pending);
        assert_eq!(t.extra.get("amount"), Some(&json!("-1250.00")));

        let back = serde_json::to_value(&t).expect("serialize");
        assert_eq!(back["type"], json!(""));
        assert_eq!(back["customerId"], json!(null));
        assert_eq!(back["status"], json!("pending"));
        assert_eq!(back["description"], json!("KIRA ODEMESI"));
    }

    #[test]
    fn update_response_without_record_is_empty() {
        let r: UpdateResponse = serde_json::from_value(json!({"message": "ok"})).unwrap();
        assert_eq!(r.updated_transaction, None);
    }
}
