//! Authentication and active-customer models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::string_or_number;

/// User-type discriminator governing route access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserType {
    SalesRep,
    Customer,
    Admin,
}

impl UserType {
    /// Persisted / wire form (`salesRep`, `customer`, `admin`).
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::SalesRep => "salesRep",
            UserType::Customer => "customer",
            UserType::Admin => "admin",
        }
    }

    /// Human label used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            UserType::SalesRep => "Sales rep",
            UserType::Customer => "Customer",
            UserType::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "salesRep" => Ok(UserType::SalesRep),
            "customer" => Ok(UserType::Customer),
            "admin" => Ok(UserType::Admin),
            other => Err(format!("unknown user type: {other}")),
        }
    }
}

/// Signed-in user as persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One element of an `authenticate*` mutation result.
///
/// Both fields are optional because the backend may answer with an element
/// that carries neither; the session manager treats that as a failed login.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthGrant {
    pub token: Option<String>,
    pub user: Option<UserRecord>,
}

/// An authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
    pub user_type: UserType,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .field("user_type", &self.user_type)
            .finish()
    }
}

/// The customer a sales rep is currently administering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCustomer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ActiveCustomer {
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.first_name, self.last_name, self.email)
    }
}
