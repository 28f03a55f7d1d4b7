//! Per-entity filter maps for the list queries.

use std::fmt;

/// The four administrable list entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Customers,
    Carts,
    Quotes,
    Wishlists,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Customers,
        Entity::Carts,
        Entity::Quotes,
        Entity::Wishlists,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Entity::Customers => "customers",
            Entity::Carts => "carts",
            Entity::Quotes => "quotes",
            Entity::Wishlists => "wishlists",
        }
    }

    /// GraphQL query field (`getCustomers`, ...).
    pub fn query_root(self) -> &'static str {
        match self {
            Entity::Customers => "getCustomers",
            Entity::Carts => "getCarts",
            Entity::Quotes => "getQuotes",
            Entity::Wishlists => "getWishlists",
        }
    }

    /// Key of the row list inside the query result object.
    pub fn rows_key(self) -> &'static str {
        self.name()
    }

    /// Dashboard route for deep links.
    pub fn path(self) -> &'static str {
        match self {
            Entity::Customers => "/dashboard/customers",
            Entity::Carts => "/dashboard/carts",
            Entity::Quotes => "/dashboard/quotes",
            Entity::Wishlists => "/dashboard/wishlists",
        }
    }

    pub fn filter_map(self) -> &'static EntityFilterMap {
        match self {
            Entity::Customers => &CUSTOMERS,
            Entity::Carts => &CARTS,
            Entity::Quotes => &QUOTES,
            Entity::Wishlists => &WISHLISTS,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a filter value is turned into a query variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Exact match on a parsed integer, sent as `[n]`.
    IntList,
    /// Contains match, sent as `"%value%"`.
    Pattern,
    /// Contains match, sent as `["%value%"]`.
    PatternList,
}

/// One filterable URL field and the variable it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    /// Value of the `filterField` URL parameter.
    pub field: &'static str,
    /// GraphQL variable name.
    pub variable: &'static str,
    pub kind: FilterKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFilterMap {
    pub entity: Entity,
    pub filters: &'static [FilterSpec],
    pub sort_fields: &'static [&'static str],
    /// Variable that scopes the list to the active customer, when supported.
    pub customer_scope: Option<&'static str>,
    /// The list is not queried at all without an active customer.
    pub requires_active_customer: bool,
    pub default_sort_field: &'static str,
    pub default_filter_field: &'static str,
}

impl EntityFilterMap {
    pub fn filter(&self, field: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|spec| spec.field == field)
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sort_fields.contains(&field)
    }
}

const fn spec(field: &'static str, variable: &'static str, kind: FilterKind) -> FilterSpec {
    FilterSpec {
        field,
        variable,
        kind,
    }
}

static CUSTOMERS: EntityFilterMap = EntityFilterMap {
    entity: Entity::Customers,
    filters: &[
        spec("id", "id", FilterKind::IntList),
        spec("firstName", "firstName", FilterKind::Pattern),
        spec("lastName", "lastName", FilterKind::Pattern),
        spec("email", "email", FilterKind::Pattern),
        spec("customerNumber", "customerNumber", FilterKind::Pattern),
    ],
    sort_fields: &["id", "firstName", "email", "createdAt", "updatedAt"],
    customer_scope: None,
    requires_active_customer: false,
    default_sort_field: "id",
    default_filter_field: "id",
};

static CARTS: EntityFilterMap = EntityFilterMap {
    entity: Entity::Carts,
    filters: &[
        spec("id", "getCartsId", FilterKind::IntList),
        spec("name", "name", FilterKind::PatternList),
        spec("location", "location", FilterKind::PatternList),
    ],
    sort_fields: &["id", "name", "createdAt", "updatedAt"],
    customer_scope: Some("customerId"),
    requires_active_customer: true,
    default_sort_field: "id",
    default_filter_field: "name",
};

static QUOTES: EntityFilterMap = EntityFilterMap {
    entity: Entity::Quotes,
    filters: &[
        spec("id", "id", FilterKind::IntList),
        spec("customerId", "customerId", FilterKind::IntList),
        spec("salesRepId", "salesRepId", FilterKind::IntList),
        spec("location", "location", FilterKind::PatternList),
    ],
    sort_fields: &["id", "createdAt", "updatedAt"],
    customer_scope: None,
    requires_active_customer: false,
    default_sort_field: "id",
    default_filter_field: "id",
};

static WISHLISTS: EntityFilterMap = EntityFilterMap {
    entity: Entity::Wishlists,
    filters: &[
        spec("id", "id", FilterKind::IntList),
        spec("customerId", "customerId", FilterKind::IntList),
    ],
    sort_fields: &["id", "name", "createdAt", "updatedAt"],
    customer_scope: None,
    requires_active_customer: false,
    default_sort_field: "id",
    default_filter_field: "id",
};
