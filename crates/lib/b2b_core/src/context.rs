//! Top-level client state shared by every page.

use std::sync::Arc;

use tracing::warn;

use crate::auth::{AuthError, SessionManager};
use crate::customer_context::ActiveCustomerContext;
use crate::guard::GuardDecision;
use crate::models::{Session, UserType};
use crate::storage::KeyValueStore;
use crate::transport::AuthTransport;

/// Owns the store, the session and the active customer.
pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    session: SessionManager,
    active_customer: ActiveCustomerContext,
}

impl AppContext {
    /// Build the context and restore both persisted states.
    pub fn new(store: Arc<dyn KeyValueStore>, auth: Arc<dyn AuthTransport>) -> Self {
        let mut session = SessionManager::new(store.clone(), auth);
        session.initialize();
        let active_customer = ActiveCustomerContext::load(store.clone());
        Self {
            store,
            session,
            active_customer,
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionManager {
        &mut self.session
    }

    pub fn active_customer(&self) -> &ActiveCustomerContext {
        &self.active_customer
    }

    pub fn active_customer_mut(&mut self) -> &mut ActiveCustomerContext {
        &mut self.active_customer
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        role: UserType,
    ) -> Result<Session, AuthError> {
        self.session.login(email, password, role).await
    }

    /// Sign out and forget the active customer.
    pub fn logout(&mut self) {
        self.session.logout();
        self.clear_active_customer();
    }

    /// Returns `true` when the expired session was signed out.
    pub fn check_expiry(&mut self) -> bool {
        let expired = self.session.check_expiry();
        if expired {
            self.clear_active_customer();
        }
        expired
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn authorize(&self, required: Option<UserType>, fallback: Option<&str>) -> GuardDecision {
        self.session.authorize(required, fallback)
    }

    fn clear_active_customer(&mut self) {
        if let Err(e) = self.active_customer.clear() {
            warn!(error = %e, "could not clear active customer");
        }
    }
}
