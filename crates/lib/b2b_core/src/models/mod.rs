//! Domain models.
//!
//! Field names follow the GraphQL schema (camelCase on the wire).

pub mod records;
pub mod user;

pub use records::{
    Cart, Channel, Customer, CustomerGroup, CustomerSummary, LineItem, ListPage, ListRecord,
    Location, PaginationInfo, Product, Quote, Wishlist, format_timestamp,
};
pub use user::{ActiveCustomer, AuthGrant, Session, UserRecord, UserType};

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

/// Accept an id that the backend may send as either a JSON string or number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Decode `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional variant of [`string_or_number`]; `null` and missing become `None`.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
