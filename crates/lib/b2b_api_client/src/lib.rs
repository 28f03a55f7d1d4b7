//! # b2b_api_client
//!
//! HTTP implementation of the `b2b_core` transports against the backend's
//! GraphQL endpoint.

pub mod queries;

use async_trait::async_trait;
use b2b_core::models::{AuthGrant, UserRecord, UserType};
use b2b_core::query::{Entity, QueryVariables};
use b2b_core::transport::{AuthTransport, ListTransport, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

#[derive(Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorBody>>,
}

#[derive(Deserialize)]
struct GraphqlErrorBody {
    #[serde(default)]
    message: String,
}

/// GraphQL client over one shared connection pool.
#[derive(Clone, Debug)]
pub struct GraphqlClient {
    endpoint: String,
    http: reqwest::Client,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `query` and return `data.<root>`.
    ///
    /// A `null` root is returned as [`Value::Null`]; a missing one is a
    /// decode error.
    pub async fn execute(
        &self,
        query: &str,
        variables: impl Serialize,
        root: &str,
        token: Option<&str>,
    ) -> Result<Value, TransportError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables });
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        debug!(root, authorized = token.is_some(), "graphql request");
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            warn!(root, status = status.as_u16(), "graphql request rejected");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response: GraphqlResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?;

        if let Some(error) = response.errors.unwrap_or_default().into_iter().next() {
            return Err(TransportError::GraphQl(error.message));
        }

        response
            .data
            .and_then(|mut data| data.get_mut(root).map(Value::take))
            .ok_or_else(|| TransportError::Decode(format!("response has no data.{root}")))
    }
}

/// Read one `authenticate*` result element.
fn grant_from(element: &Value, user_key: &str) -> Result<AuthGrant, TransportError> {
    let token = element
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string);
    let user = match element.get(user_key) {
        None | Some(Value::Null) => None,
        Some(user) => Some(
            UserRecord::deserialize(user).map_err(|e| TransportError::Decode(e.to_string()))?,
        ),
    };
    Ok(AuthGrant { token, user })
}

#[async_trait]
impl AuthTransport for GraphqlClient {
    async fn authenticate(
        &self,
        role: UserType,
        email: &str,
        password: &str,
    ) -> Result<Vec<AuthGrant>, TransportError> {
        let (query, root, user_key) = queries::authentication(role).ok_or_else(|| {
            TransportError::Unsupported(format!("{} authentication", role.label()))
        })?;
        let variables = json!({ "email": email, "password": password });

        match self.execute(query, variables, root, None).await? {
            Value::Null => Ok(Vec::new()),
            Value::Array(elements) => elements
                .iter()
                .map(|element| grant_from(element, user_key))
                .collect(),
            other => Err(TransportError::Decode(format!(
                "expected a list from {root}, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl ListTransport for GraphqlClient {
    async fn fetch_list(
        &self,
        entity: Entity,
        variables: &QueryVariables,
        token: Option<&str>,
    ) -> Result<Value, TransportError> {
        let query = queries::list_query(entity);
        self.execute(&query, variables, entity.query_root(), token)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_reads_role_specific_user_key() {
        let element = json!({
            "token": "t",
            "adminUser": {"id": "5", "email": "a@example.com", "firstName": "Ad", "lastName": "Min", "username": "admin"}
        });
        let grant = grant_from(&element, "adminUser").unwrap();
        assert_eq!(grant.token.as_deref(), Some("t"));
        assert_eq!(grant.user.unwrap().username.as_deref(), Some("admin"));

        let grant = grant_from(&element, "salesRep").unwrap();
        assert!(grant.user.is_none());
    }

    #[test]
    fn null_token_is_none() {
        let grant = grant_from(&json!({"token": null, "salesRep": null}), "salesRep").unwrap();
        assert_eq!(grant, AuthGrant::default());
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GraphqlRequest {
            query: "query { x }",
            variables: json!({"a": 1}),
        })
        .unwrap();
        assert_eq!(body, json!({"query": "query { x }", "variables": {"a": 1}}));
    }
}
