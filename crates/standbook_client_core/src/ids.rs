//! Strongly-typed IDs for backend-assigned references. Use these instead of raw strings.
//!
//! IDs are opaque to the client; the only check is that they are not blank.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

fn validate_id(kind: &str, s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err(format!("Invalid {}: must not be empty", kind));
    }
    Ok(s.to_string())
}

/// Bank account the statement was imported for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BankId(String);

/// Imported bank statement (parent of the transaction lines).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementId(String);

/// Single statement line under reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(String);

/// Customer (current account) a collection is booked against.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomerId(String);

/// Expense/income category or sub-category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(String);

macro_rules! id_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
                ser.serialize_str(&self.0)
            }
        }
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
                let s = String::deserialize(de)?;
                Self::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
id_serde!(BankId);
id_serde!(StatementId);
id_serde!(TransactionId);
id_serde!(CustomerId);
id_serde!(CategoryId);

macro_rules! id_type {
    ($name:ident, $kind:literal) => {
        impl $name {
            pub fn parse(s: impl AsRef<str>) -> Result<Self, String> {
                Self::from_str(s.as_ref())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
        impl FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(validate_id($kind, s)?))
            }
        }
        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
id_type!(BankId, "bank id");
id_type!(StatementId, "statement id");
id_type!(TransactionId, "transaction id");
id_type!(CustomerId, "customer id");
id_type!(CategoryId, "category id");
