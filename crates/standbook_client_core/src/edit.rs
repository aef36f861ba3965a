//! Typed single-field edits. One `FieldEdit` is one PUT body with exactly one key.

use crate::error::ReconcileError;
use crate::ids::{CategoryId, CustomerId};
use crate::models::TransactionKind;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;

pub const FIELD_TYPE: &str = "type";
pub const FIELD_CUSTOMER: &str = "customerId";
pub const FIELD_CURRENCY_PAIR: &str = "currencyPair";
pub const FIELD_CATEGORY: &str = "categoryId";
pub const FIELD_SUB_CATEGORY: &str = "subCategoryId";

const TYPED_FIELDS: [&str; 5] = [
    FIELD_TYPE,
    FIELD_CUSTOMER,
    FIELD_CURRENCY_PAIR,
    FIELD_CATEGORY,
    FIELD_SUB_CATEGORY,
];
// `id` is backend-assigned and `status` is derived.
const READ_ONLY_FIELDS: [&str; 2] = ["id", "status"];

/// Name and value of a field the client does not interpret. Only built by
/// [`FieldEdit::passthrough`], so the name is never a typed or read-only field.
#[derive(Clone, Debug, PartialEq)]
pub struct PassthroughField {
    field: String,
    value: Value,
}

impl PassthroughField {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// True for names that `apply_edit` may write into the passthrough map.
pub(crate) fn is_passthrough_name(field: &str) -> bool {
    !field.trim().is_empty() && !READ_ONLY_FIELDS.contains(&field) && !TYPED_FIELDS.contains(&field)
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldEdit {
    Kind(TransactionKind),
    Customer(Option<CustomerId>),
    CurrencyPair(Option<String>),
    Category(Option<CategoryId>),
    SubCategory(Option<CategoryId>),
    /// Any other field the backend accepts (amount, description, ...). Assigned verbatim.
    Passthrough(PassthroughField),
}

impl FieldEdit {
    /// Edit of a field the client does not interpret. Typed and read-only fields are refused.
    pub fn passthrough(field: impl Into<String>, value: Value) -> Result<Self, ReconcileError> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(ReconcileError::invalid_field(field, "field name must not be empty"));
        }
        if READ_ONLY_FIELDS.contains(&field.as_str()) {
            return Err(ReconcileError::invalid_field(field, "field is read-only"));
        }
        if TYPED_FIELDS.contains(&field.as_str()) {
            return Err(ReconcileError::invalid_field(field, "use the typed edit for this field"));
        }
        Ok(FieldEdit::Passthrough(PassthroughField { field, value }))
    }

    pub fn field_name(&self) -> &str {
        match self {
            FieldEdit::Kind(_) => FIELD_TYPE,
            FieldEdit::Customer(_) => FIELD_CUSTOMER,
            FieldEdit::CurrencyPair(_) => FIELD_CURRENCY_PAIR,
            FieldEdit::Category(_) => FIELD_CATEGORY,
            FieldEdit::SubCategory(_) => FIELD_SUB_CATEGORY,
            FieldEdit::Passthrough(p) => p.field(),
        }
    }

    /// New value as it goes on the wire.
    pub fn value(&self) -> Value {
        fn opt(s: Option<&str>) -> Value {
            s.map(|s| Value::String(s.to_string())).unwrap_or(Value::Null)
        }
        match self {
            FieldEdit::Kind(k) => Value::String(k.as_str().to_string()),
            FieldEdit::Customer(c) => opt(c.as_ref().map(|c| c.as_str())),
            FieldEdit::CurrencyPair(p) => opt(p.as_deref()),
            FieldEdit::Category(c) | FieldEdit::SubCategory(c) => opt(c.as_ref().map(|c| c.as_str())),
            FieldEdit::Passthrough(p) => p.value.clone(),
        }
    }

    /// Request body: `{ <field>: <value> }`.
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        patch.insert(self.field_name().to_string(), self.value());
        patch
    }

    /// Parse a dynamic `(field, value)` pair as sent by a form or received by the API.
    pub fn from_wire(field: &str, value: Value) -> Result<Self, ReconcileError> {
        match field {
            FIELD_TYPE => {
                let kind = match &value {
                    Value::Null => TransactionKind::Unset,
                    Value::String(s) => s
                        .parse::<TransactionKind>()
                        .map_err(|e| ReconcileError::invalid_field(field, e))?,
                    _ => return Err(ReconcileError::invalid_field(field, "expected a string")),
                };
                Ok(FieldEdit::Kind(kind))
            }
            FIELD_CUSTOMER => Ok(FieldEdit::Customer(optional_ref(field, &value)?)),
            FIELD_CURRENCY_PAIR => Ok(FieldEdit::CurrencyPair(optional_ref(field, &value)?)),
            FIELD_CATEGORY => Ok(FieldEdit::Category(optional_ref(field, &value)?)),
            FIELD_SUB_CATEGORY => Ok(FieldEdit::SubCategory(optional_ref(field, &value)?)),
            _ => FieldEdit::passthrough(field, value),
        }
    }

    /// Parse a PUT body. It must carry exactly one key.
    pub fn from_patch(patch: &Map<String, Value>) -> Result<Self, ReconcileError> {
        let mut entries = patch.iter();
        match (entries.next(), entries.next()) {
            (Some((field, value)), None) => FieldEdit::from_wire(field, value.clone()),
            (None, _) => Err(ReconcileError::invalid_field("", "patch is empty")),
            (Some(_), Some(_)) => Err(ReconcileError::invalid_field(
                patch.keys().cloned().collect::<Vec<_>>().join(","),
                "patch must change exactly one field",
            )),
        }
    }
}

fn optional_ref<T>(field: &str, value: &Value) -> Result<Option<T>, ReconcileError>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|e| ReconcileError::invalid_field(field, e.to_string())),
        _ => Err(ReconcileError::invalid_field(field, "expected a string or null")),
    }
}
