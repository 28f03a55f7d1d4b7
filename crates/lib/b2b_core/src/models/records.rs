//! List records returned by the `get*` queries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, opt_string_or_number};
use crate::query::Entity;

/// Pagination block echoed back by every list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationInfo {
    pub total_items: i64,
    pub total_item_on_page: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub customer_group_id: Option<i64>,
}

impl CustomerSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sku: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub index_price: Option<f64>,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    #[serde(default)]
    pub variation_info: Option<String>,
}

/// Cart, quote and wishlist line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub product: Product,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qty: f64,
    #[serde(default)]
    pub custom_price: Option<f64>,
    #[serde(default)]
    pub sidemark: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerGroup {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub tax_class_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub net_terms: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub customer_group: Option<CustomerGroup>,
    #[serde(default)]
    pub channels: Option<Vec<Channel>>,
}

impl Customer {
    /// The active-customer pointer for this row, if it has an id.
    pub fn to_active(&self) -> Option<super::ActiveCustomer> {
        self.id.map(|id| super::ActiveCustomer {
            id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub customer: Option<CustomerSummary>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub customer: Option<CustomerSummary>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub sales_rep_id: Option<i64>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerSummary>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

/// A row type that one of the list views renders.
pub trait ListRecord: DeserializeOwned + Clone + Send + Sync + 'static {
    const ENTITY: Entity;
}

impl ListRecord for Customer {
    const ENTITY: Entity = Entity::Customers;
}

impl ListRecord for Cart {
    const ENTITY: Entity = Entity::Carts;
}

impl ListRecord for Quote {
    const ENTITY: Entity = Entity::Quotes;
}

impl ListRecord for Wishlist {
    const ENTITY: Entity = Entity::Wishlists;
}

/// One page of rows plus the pagination block, if the backend sent one.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub rows: Vec<T>,
    pub pagination: Option<PaginationInfo>,
}

impl<T: ListRecord> ListPage<T> {
    /// Decode the object returned under `data.get<Entity>`.
    ///
    /// A `null` or missing root, row list or pagination block decodes as empty.
    pub fn from_root(root: Value) -> Result<Self, serde_json::Error> {
        let mut root = match root {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected an object for {}, got {other}",
                    T::ENTITY.query_root()
                )));
            }
        };
        let rows = match root.remove(T::ENTITY.rows_key()) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value)?,
        };
        let pagination = match root.remove("pagination") {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value)?),
        };
        Ok(Self { rows, pagination })
    }
}

/// Render a backend timestamp as `Mar 4, 2024 1:05 PM` (UTC).
///
/// Accepts ISO dates and datetimes as well as epoch milliseconds sent as a
/// string. Anything else renders as `-`.
pub fn format_timestamp(raw: Option<&str>) -> String {
    const DISPLAY: &str = "%b %-d, %Y %-I:%M %p";

    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };

    let parsed: Option<DateTime<Utc>> = if starts_with_iso_date(raw) {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .map(|naive| naive.and_utc())
            })
            .or_else(|| {
                NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            })
    } else {
        raw.parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    };

    match parsed {
        Some(dt) => dt.format(DISPLAY).to_string(),
        None => "-".to_string(),
    }
}

fn starts_with_iso_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn customer_page_decodes_rows_and_pagination() {
        let root = json!({
            "customers": [
                {"id": 3, "firstName": "Ann", "lastName": "Lee", "email": "ann@example.com",
                 "createdAt": "1700000000000", "customerGroup": {"id": 1, "name": "Retail"}}
            ],
            "pagination": {"totalItems": 1, "totalItemOnPage": 1, "totalPages": 1,
                           "currentPage": 1, "pageSize": 10}
        });
        let page = ListPage::<Customer>::from_root(root).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].id, Some(3));
        assert_eq!(page.rows[0].created_at.as_deref(), Some("1700000000000"));
        assert_eq!(page.pagination.unwrap().total_pages, 1);
    }

    #[test]
    fn null_root_is_an_empty_page() {
        let page = ListPage::<Cart>::from_root(Value::Null).unwrap();
        assert!(page.rows.is_empty());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(ListPage::<Quote>::from_root(json!([1, 2])).is_err());
    }

    #[test]
    fn cart_items_decode_product_type() {
        let root = json!({
            "carts": [{
                "id": 9, "name": "Spring order",
                "customer": {"id": 3, "email": "ann@example.com", "firstName": "Ann", "lastName": "Lee"},
                "location": {"id": 2, "name": "Main", "code": "MAIN"},
                "items": [{"id": 1, "cartId": 9, "qty": 2,
                           "product": {"id": 5, "sku": "SKU-5", "name": "Lamp", "type": "simple",
                                       "indexPrice": 12.5, "thumbnailImage": "x.png"}}]
            }],
            "pagination": null
        });
        let page = ListPage::<Cart>::from_root(root).unwrap();
        let cart = &page.rows[0];
        let items = cart.items.as_ref().unwrap();
        assert_eq!(items[0].product.kind.as_deref(), Some("simple"));
        assert_eq!(items[0].qty, 2.0);
        assert_eq!(cart.location.as_ref().unwrap().code, "MAIN");
    }

    #[test]
    fn null_text_fields_decode_as_empty() {
        let root = json!({
            "carts": [{
                "id": 9, "name": null,
                "customer": {"id": 3, "email": null, "firstName": "Ann", "lastName": null},
                "items": [{"qty": null, "product": {"id": 5, "sku": null, "name": "Lamp"}}]
            }]
        });
        let page = ListPage::<Cart>::from_root(root).unwrap();
        let cart = &page.rows[0];
        assert_eq!(cart.name, "");
        let customer = cart.customer.as_ref().unwrap();
        assert_eq!(customer.email, "");
        assert_eq!(customer.full_name(), "Ann ");
        let item = &cart.items.as_ref().unwrap()[0];
        assert_eq!(item.qty, 0.0);
        assert_eq!(item.product.sku, "");

        let customers = ListPage::<Customer>::from_root(json!({
            "customers": [{"id": 1, "firstName": null, "lastName": null, "email": null}]
        }))
        .unwrap();
        assert_eq!(customers.rows[0].email, "");
    }

    #[test]
    fn customer_to_active_copies_identity() {
        let customer = Customer {
            id: Some(42),
            first_name: "Ann".into(),
            middle_name: None,
            last_name: "Lee".into(),
            email: "ann@example.com".into(),
            created_at: None,
            updated_at: None,
            customer_number: None,
            net_terms: None,
            company_name: None,
            customer_group: None,
            channels: None,
        };
        let active = customer.to_active().unwrap();
        assert_eq!(active.id, 42);
        assert_eq!(active.display_name(), "Ann Lee (ann@example.com)");
    }

    #[test]
    fn format_timestamp_handles_iso_and_epoch_millis() {
        assert_eq!(
            format_timestamp(Some("2024-03-04T13:05:00Z")),
            "Mar 4, 2024 1:05 PM"
        );
        assert_eq!(
            format_timestamp(Some("2024-03-04 13:05:00")),
            "Mar 4, 2024 1:05 PM"
        );
        assert_eq!(format_timestamp(Some("2024-03-04")), "Mar 4, 2024 12:00 AM");
        // 2023-11-14T22:13:20Z
        assert_eq!(
            format_timestamp(Some("1700000000000")),
            "Nov 14, 2023 10:13 PM"
        );
    }

    #[test]
    fn format_timestamp_falls_back_to_dash() {
        assert_eq!(format_timestamp(None), "-");
        assert_eq!(format_timestamp(Some("")), "-");
        assert_eq!(format_timestamp(Some("yesterday")), "-");
    }
}
