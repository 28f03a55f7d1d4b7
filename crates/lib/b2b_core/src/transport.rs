//! Seams to the remote GraphQL service.
//!
//! `b2b_api_client` provides the HTTP implementation; tests provide fakes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{AuthGrant, UserType};
use crate::query::{Entity, QueryVariables};

/// Errors raised while talking to the remote API.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Credential exchange.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Run the `authenticate*` mutation for `role`.
    ///
    /// Returns the backend's result list as-is; callers take the first
    /// element.
    async fn authenticate(
        &self,
        role: UserType,
        email: &str,
        password: &str,
    ) -> Result<Vec<AuthGrant>, TransportError>;
}

/// List queries.
#[async_trait]
pub trait ListTransport: Send + Sync {
    /// Run `get<Entity>` and return the object under `data.get<Entity>`.
    ///
    /// `token` is sent as a bearer credential when present.
    async fn fetch_list(
        &self,
        entity: Entity,
        variables: &QueryVariables,
        token: Option<&str>,
    ) -> Result<Value, TransportError>;
}
