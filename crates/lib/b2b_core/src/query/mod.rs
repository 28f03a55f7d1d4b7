//! List query state and the GraphQL variable builder.
//!
//! The URL is the source of truth for what a list page shows:
//! [`ListQueryState`] is parsed from it and written back to it, and
//! [`build`] maps that state to the variables sent to the remote API.

pub mod entity;
pub mod params;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use entity::{Entity, EntityFilterMap, FilterKind, FilterSpec};
pub use params::QueryParams;

/// Rows requested per page.
pub const PAGE_SIZE: u32 = 10;

/// URL parameter names.
pub mod param {
    pub const PAGE: &str = "page";
    pub const SORT_FIELD: &str = "sortField";
    pub const SORT_DIRECTION: &str = "sortDirection";
    pub const FILTER_FIELD: &str = "filterField";
    pub const FILTER_VALUE: &str = "filterValue";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Lenient parse: anything other than `DESC` (any case) is ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page, sort and filter state of one list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQueryState {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub filter_field: Option<String>,
    pub filter_value: Option<String>,
}

impl Default for ListQueryState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
            sort_field: None,
            sort_direction: None,
            filter_field: None,
            filter_value: None,
        }
    }
}

impl ListQueryState {
    pub fn from_params(params: &QueryParams) -> Self {
        let non_empty = |key: &str| {
            params
                .get(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let page = params
            .get(param::PAGE)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);

        Self {
            page,
            page_size: PAGE_SIZE,
            sort_field: non_empty(param::SORT_FIELD),
            sort_direction: params
                .get(param::SORT_DIRECTION)
                .filter(|v| !v.is_empty())
                .map(SortDirection::parse),
            filter_field: non_empty(param::FILTER_FIELD),
            filter_value: non_empty(param::FILTER_VALUE),
        }
    }

    pub fn parse(query: &str) -> Self {
        Self::from_params(&QueryParams::parse(query))
    }

    /// Write this state into `params`, leaving foreign keys alone.
    pub fn write_to(&self, params: &mut QueryParams) {
        params.set(param::PAGE, self.page.to_string());
        params.set_or_remove(param::SORT_FIELD, self.sort_field.as_deref());
        params.set_or_remove(
            param::SORT_DIRECTION,
            self.sort_direction.map(SortDirection::as_str),
        );
        params.set_or_remove(param::FILTER_FIELD, self.filter_field.as_deref());
        params.set_or_remove(param::FILTER_VALUE, self.filter_value.as_deref());
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        self.write_to(&mut params);
        params
    }

    pub fn to_query_string(&self) -> String {
        self.to_params().to_query_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInput {
    pub current_page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Ints(Vec<i64>),
    Pattern(String),
    Patterns(Vec<String>),
}

/// Variables for one `get<Entity>` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariables {
    pub pagination: PaginationInput,
    #[serde(flatten)]
    pub filters: BTreeMap<&'static str, FilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl QueryVariables {
    pub fn filter(&self, variable: &str) -> Option<&FilterValue> {
        self.filters.get(variable)
    }
}

/// Map list state to query variables.
///
/// `active_customer_id` only has an effect for entities with a customer
/// scope, and is applied whether or not a user filter is set. Filter fields
/// the entity does not know, and numeric filters whose value is not an
/// integer, add nothing.
pub fn build(
    state: &ListQueryState,
    filters: &EntityFilterMap,
    active_customer_id: Option<i64>,
) -> QueryVariables {
    let mut variables = QueryVariables {
        pagination: PaginationInput {
            current_page: state.page,
            page_size: state.page_size,
        },
        filters: BTreeMap::new(),
        sort_order: None,
    };

    if let (Some(scope), Some(id)) = (filters.customer_scope, active_customer_id) {
        variables.filters.insert(scope, FilterValue::Ints(vec![id]));
    }

    if let (Some(field), Some(value)) = (&state.filter_field, &state.filter_value)
        && let Some(spec) = filters.filter(field)
        && let Some(filter) = filter_value(spec.kind, value)
    {
        variables.filters.insert(spec.variable, filter);
    }

    if let (Some(field), Some(direction)) = (&state.sort_field, state.sort_direction) {
        variables.sort_order = Some(SortOrder {
            field: field.clone(),
            direction,
        });
    }

    variables
}

fn filter_value(kind: FilterKind, raw: &str) -> Option<FilterValue> {
    match kind {
        FilterKind::IntList => leading_int(raw).map(|n| FilterValue::Ints(vec![n])),
        FilterKind::Pattern => Some(FilterValue::Pattern(format!("%{raw}%"))),
        FilterKind::PatternList => Some(FilterValue::Patterns(vec![format!("%{raw}%")])),
    }
}

/// Integer at the start of `raw` after trimming: an optional sign and the
/// digits that follow it. `"42abc"` and `"42.7"` both read as 42.
fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let unsigned = raw.trim_start_matches(['+', '-']);
    let sign_len = raw.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    raw[..sign_len + digits].parse().ok()
}
