//! List view controller shared by the customers, carts, quotes and
//! wishlists pages.
//!
//! The view keeps the page URL's query string as its source of truth. User
//! actions rewrite that query string and report whether it changed; the
//! caller reloads when it did. Loads are split into [`ListView::begin_load`]
//! and [`ListView::complete`] so overlapping requests can be issued, and only
//! the response to the most recent one is applied.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ActiveCustomer, ListPage, ListRecord, PaginationInfo};
use crate::query::{
    self, Entity, EntityFilterMap, ListQueryState, QueryParams, QueryVariables, SortDirection,
    param,
};
use crate::transport::{ListTransport, TransportError};

/// A failed list query. Rendered inline; there is no retry.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    /// Customer-scoped list opened without an active customer.
    NeedsActiveCustomer,
    Success(ListPage<T>),
    Error(String),
}

/// What the page should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading,
    NeedsActiveCustomer,
    Empty,
    Populated(usize),
    Error(String),
}

/// A query the caller should send, tagged with its generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub generation: u64,
    pub variables: QueryVariables,
}

pub struct ListView<T: ListRecord> {
    params: QueryParams,
    query: ListQueryState,
    filter_field: String,
    filter_input: String,
    state: ViewState<T>,
    generation: u64,
}

impl<T: ListRecord> ListView<T> {
    /// Open the view from the page's query string.
    ///
    /// Missing sort parameters and page are written back with the entity's
    /// defaults, so the URL always names the order being shown.
    pub fn open(query_string: &str) -> Self {
        let filters = T::ENTITY.filter_map();
        let mut params = QueryParams::parse(query_string);
        let mut query = read_query::<T>(&params);
        query.sort_field.get_or_insert_with(|| filters.default_sort_field.to_string());
        query.sort_direction.get_or_insert(SortDirection::Asc);

        params.set(param::PAGE, query.page.to_string());
        params.set_or_remove(param::SORT_FIELD, query.sort_field.as_deref());
        params.set_or_remove(
            param::SORT_DIRECTION,
            query.sort_direction.map(SortDirection::as_str),
        );

        let filter_field = query
            .filter_field
            .clone()
            .unwrap_or_else(|| filters.default_filter_field.to_string());
        let filter_input = query.filter_value.clone().unwrap_or_default();

        Self {
            params,
            query,
            filter_field,
            filter_input,
            state: ViewState::Idle,
            generation: 0,
        }
    }

    pub fn entity(&self) -> Entity {
        T::ENTITY
    }

    pub fn filters(&self) -> &'static EntityFilterMap {
        T::ENTITY.filter_map()
    }

    pub fn query(&self) -> &ListQueryState {
        &self.query
    }

    /// Current query string, for deep links.
    pub fn query_string(&self) -> String {
        self.params.to_query_string()
    }

    /// Page path with its query string.
    pub fn location(&self) -> String {
        format!("{}?{}", T::ENTITY.path(), self.query_string())
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn status(&self) -> ViewStatus {
        match &self.state {
            ViewState::Idle => ViewStatus::Idle,
            ViewState::Loading => ViewStatus::Loading,
            ViewState::NeedsActiveCustomer => ViewStatus::NeedsActiveCustomer,
            ViewState::Success(page) if page.rows.is_empty() => ViewStatus::Empty,
            ViewState::Success(page) => ViewStatus::Populated(page.rows.len()),
            ViewState::Error(message) => ViewStatus::Error(message.clone()),
        }
    }

    pub fn rows(&self) -> &[T] {
        match &self.state {
            ViewState::Success(page) => &page.rows,
            _ => &[],
        }
    }

    pub fn pagination(&self) -> Option<&PaginationInfo> {
        match &self.state {
            ViewState::Success(page) => page.pagination.as_ref(),
            _ => None,
        }
    }

    /// Filter field selected in the search form, not yet submitted.
    pub fn filter_field(&self) -> &str {
        &self.filter_field
    }

    /// Text in the search box, not yet submitted.
    pub fn filter_input(&self) -> &str {
        &self.filter_input
    }

    /// Start a load for the current query.
    ///
    /// Returns `None` when the entity needs an active customer and there is
    /// none. Any load still in flight is made stale.
    pub fn begin_load(&mut self, active_customer: Option<&ActiveCustomer>) -> Option<LoadRequest> {
        let filters = self.filters();
        if filters.requires_active_customer && active_customer.is_none() {
            debug!(entity = %T::ENTITY, "no active customer; skipping query");
            self.generation += 1;
            self.state = ViewState::NeedsActiveCustomer;
            return None;
        }

        self.generation += 1;
        let variables = query::build(&self.query, filters, active_customer.map(|c| c.id));
        self.state = ViewState::Loading;
        debug!(entity = %T::ENTITY, generation = self.generation, page = self.query.page, "loading list");
        Some(LoadRequest {
            generation: self.generation,
            variables,
        })
    }

    /// Apply the response to the load tagged `generation`.
    ///
    /// Returns `false` and leaves the view untouched when a newer load has
    /// been started since.
    pub fn complete(&mut self, generation: u64, result: Result<Value, TransportError>) -> bool {
        if generation != self.generation {
            debug!(
                entity = %T::ENTITY,
                generation,
                latest = self.generation,
                "dropping stale list response"
            );
            return false;
        }

        let page = result
            .map_err(QueryError::from)
            .and_then(|root| ListPage::<T>::from_root(root).map_err(QueryError::from));
        self.state = match page {
            Ok(page) => ViewState::Success(page),
            Err(e) => {
                warn!(entity = %T::ENTITY, error = %e, "list query failed");
                ViewState::Error(e.to_string())
            }
        };
        true
    }

    /// Begin, fetch and complete in one step.
    pub async fn load(
        &mut self,
        transport: &dyn ListTransport,
        token: Option<&str>,
        active_customer: Option<&ActiveCustomer>,
    ) -> ViewStatus {
        if let Some(request) = self.begin_load(active_customer) {
            let result = transport
                .fetch_list(T::ENTITY, &request.variables, token)
                .await;
            self.complete(request.generation, result);
        }
        self.status()
    }

    fn update_params(&mut self, update: impl FnOnce(&mut QueryParams)) -> bool {
        let before = self.params.to_query_string();
        update(&mut self.params);
        if self.params.to_query_string() == before {
            return false;
        }
        self.query = read_query::<T>(&self.params);
        true
    }

    pub fn set_sort_field(&mut self, field: &str) -> bool {
        if !self.filters().is_sortable(field) {
            debug!(entity = %T::ENTITY, field, "sorting on a field the list does not offer");
        }
        self.update_params(|params| params.set(param::SORT_FIELD, field))
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) -> bool {
        self.update_params(|params| params.set(param::SORT_DIRECTION, direction.as_str()))
    }

    pub fn set_filter_field(&mut self, field: &str) {
        self.filter_field = field.to_string();
    }

    pub fn set_filter_input(&mut self, value: &str) {
        self.filter_input = value.to_string();
    }

    /// Write the search form into the URL and go back to the first page.
    pub fn submit_search(&mut self) -> bool {
        let field = self.filter_field.clone();
        let value = self.filter_input.clone();
        self.update_params(|params| {
            params.set_or_remove(param::FILTER_VALUE, Some(&value));
            params.set_or_remove(param::FILTER_FIELD, Some(&field));
            params.set(param::PAGE, "1");
        })
    }

    pub fn can_previous(&self) -> bool {
        self.query.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.pagination()
            .is_some_and(|p| i64::from(self.query.page) < p.total_pages)
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        let page = self.query.page - 1;
        self.update_params(|params| params.set(param::PAGE, page.to_string()))
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        let page = self.query.page + 1;
        self.update_params(|params| params.set(param::PAGE, page.to_string()))
    }

    /// Jump to `page` directly, as a deep link or page picker would.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        self.update_params(|params| params.set(param::PAGE, page.to_string()))
    }
}

/// Query state for `params`. A filter value without a field searches the
/// entity's default filter field.
fn read_query<T: ListRecord>(params: &QueryParams) -> ListQueryState {
    let mut query = ListQueryState::from_params(params);
    if query.filter_value.is_some() && query.filter_field.is_none() {
        query.filter_field = Some(T::ENTITY.filter_map().default_filter_field.to_string());
    }
    query
}
