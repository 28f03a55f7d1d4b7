//! # b2b_core
//!
//! Client core for the B2B dashboard.
//!
//! Holds everything between persisted browser-style storage and the remote
//! GraphQL service: session restore and login, the active-customer pointer,
//! URL-driven list queries and the per-entity list view state machine.
//! Network access lives behind the traits in [`transport`].

pub mod auth;
pub mod config;
pub mod context;
pub mod customer_context;
pub mod guard;
pub mod models;
pub mod query;
pub mod storage;
pub mod transport;
pub mod view;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
