//! Route access rules for the dashboard pages.

use crate::models::{Session, UserType};

pub const SALES_REP_LOGIN: &str = "/login/sales-rep";
pub const CUSTOMER_LOGIN: &str = "/login/customer";
pub const SALES_REP_HOME: &str = "/dashboard";
pub const CUSTOMER_HOME: &str = "/account";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restore or login still running; render nothing yet.
    Wait,
    Allow,
    Redirect(String),
}

/// Where a signed-in user of `user_type` lands.
pub fn home_path(user_type: UserType) -> &'static str {
    match user_type {
        UserType::SalesRep => SALES_REP_HOME,
        UserType::Customer => CUSTOMER_HOME,
        UserType::Admin => SALES_REP_LOGIN,
    }
}

/// Decide whether a page requiring `required` may render.
///
/// `session` must be an authenticated session; pass `None` when signed out
/// or expired. `fallback` overrides the login page used for signed-out
/// visitors.
pub fn authorize(
    loading: bool,
    session: Option<&Session>,
    required: Option<UserType>,
    fallback: Option<&str>,
) -> GuardDecision {
    if loading {
        return GuardDecision::Wait;
    }

    let Some(session) = session else {
        let login = fallback.unwrap_or(match required {
            Some(UserType::Customer) => CUSTOMER_LOGIN,
            _ => SALES_REP_LOGIN,
        });
        return GuardDecision::Redirect(login.to_string());
    };

    match required {
        Some(required) if required != session.user_type => {
            GuardDecision::Redirect(home_path(session.user_type).to_string())
        }
        _ => GuardDecision::Allow,
    }
}
