//! Session manager: restore, login, logout and expiry enforcement.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::AuthError;
use super::token::is_token_valid;
use crate::guard::{self, GuardDecision};
use crate::models::{Session, UserRecord, UserType};
use crate::storage::{self, KeyValueStore, StorageError, keys};
use crate::transport::AuthTransport;

/// Owns the in-memory session and keeps it in step with the store.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn AuthTransport>,
    session: Option<Session>,
    error: Option<String>,
    initialized: bool,
    login_in_flight: bool,
}

impl SessionManager {
    /// Create a signed-out manager. Call [`SessionManager::initialize`] to
    /// restore a persisted session.
    pub fn new(store: Arc<dyn KeyValueStore>, transport: Arc<dyn AuthTransport>) -> Self {
        Self {
            store,
            transport,
            session: None,
            error: None,
            initialized: false,
            login_in_flight: false,
        }
    }

    /// Restore the session from the store.
    ///
    /// Never fails: an expired or unreadable session is removed from the
    /// store and the manager starts signed out.
    pub fn initialize(&mut self) {
        self.session = match self.restore() {
            Ok(Some(session)) => {
                info!(user_id = %session.user.id, user_type = %session.user_type, "restored session");
                Some(session)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read persisted session; starting signed out");
                self.discard_persisted();
                None
            }
        };
        self.initialized = true;
    }

    fn restore(&self) -> Result<Option<Session>, StorageError> {
        let token = match self.store.get(keys::TOKEN)? {
            Some(token) => Some(token),
            None => self.migrate_legacy_token()?,
        };

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            // User data without a token cannot be used.
            storage::remove_all(self.store.as_ref(), keys::SESSION)?;
            return Ok(None);
        };

        if !is_token_valid(&token) {
            debug!("persisted token is expired or malformed");
            self.discard_persisted();
            return Ok(None);
        }

        let user = match self.store.get(keys::USER)? {
            Some(raw) => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    warn!(error = %e, "persisted user record is corrupt");
                    self.discard_persisted();
                    return Ok(None);
                }
            },
            None => {
                debug!("token persisted without a user record");
                self.discard_persisted();
                return Ok(None);
            }
        };

        let user_type = self
            .store
            .get(keys::USER_TYPE)?
            .and_then(|raw| raw.parse::<UserType>().ok())
            .or(user.user_type);
        let Some(user_type) = user_type else {
            warn!("persisted session has no user type");
            self.discard_persisted();
            return Ok(None);
        };

        Ok(Some(Session {
            token,
            user,
            user_type,
        }))
    }

    /// Move a token written by the older login flow to the current key.
    fn migrate_legacy_token(&self) -> Result<Option<String>, StorageError> {
        let Some(legacy) = self.store.get(keys::LEGACY_AUTH_TOKEN)? else {
            return Ok(None);
        };
        info!("migrating legacy auth token");
        self.store.set(keys::TOKEN, &legacy)?;
        self.store.remove(keys::LEGACY_AUTH_TOKEN)?;
        Ok(Some(legacy))
    }

    fn discard_persisted(&self) {
        if let Err(e) = storage::remove_all(self.store.as_ref(), keys::SESSION) {
            warn!(error = %e, "could not clear persisted session");
        }
    }

    /// Write the session keys. If any write fails the keys are put back to
    /// what they held before.
    fn persist(&self, session: &Session) -> Result<(), AuthError> {
        let user = serde_json::to_string(&session.user).map_err(StorageError::from)?;
        let entries = [
            (keys::TOKEN, session.token.as_str()),
            (keys::USER, user.as_str()),
            (keys::USER_TYPE, session.user_type.as_str()),
        ];
        let previous = entries
            .iter()
            .map(|(key, _)| self.store.get(key))
            .collect::<Result<Vec<_>, _>>()?;

        for (key, value) in entries {
            if let Err(e) = self.store.set(key, value) {
                warn!(error = %e, key, "could not persist session; restoring previous values");
                self.restore_entries(&entries, &previous);
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn restore_entries(&self, entries: &[(&str, &str)], previous: &[Option<String>]) {
        for ((key, _), value) in entries.iter().zip(previous) {
            let result = match value {
                Some(value) => self.store.set(key, value),
                None => self.store.remove(key),
            };
            if let Err(e) = result {
                warn!(error = %e, key, "could not restore persisted value");
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On success the session is persisted and becomes current. On failure
    /// the error message is recorded for display and any previous session is
    /// left as it was.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        role: UserType,
    ) -> Result<Session, AuthError> {
        self.error = None;
        let result = self.authenticate(email, password, role).await;
        match &result {
            Ok(session) => {
                info!(user_id = %session.user.id, user_type = %role, "signed in");
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
        result
    }

    async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
        role: UserType,
    ) -> Result<Session, AuthError> {
        if role == UserType::Customer {
            return Err(AuthError::NotSupported(role));
        }
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let transport = self.transport.clone();
        let response = {
            let _in_flight = InFlight::start(&mut self.login_in_flight);
            transport.authenticate(role, email, password).await
        };

        let grants = response.map_err(|e| {
            warn!(error = %e, user_type = %role, "login request failed");
            AuthError::Failed(e.to_string())
        })?;
        let grant = grants
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Failed("empty authentication result".into()))?;
        let token = grant
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Failed("authentication result has no token".into()))?;
        let mut user = grant
            .user
            .ok_or_else(|| AuthError::Failed("authentication result has no user".into()))?;
        user.user_type = Some(role);

        let session = Session {
            token,
            user,
            user_type: role,
        };
        self.persist(&session)?;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Drop the session and its persisted keys. Safe to call when signed out.
    pub fn logout(&mut self) {
        if self.session.take().is_some() {
            info!("signed out");
        }
        self.error = None;
        self.discard_persisted();
    }

    /// Force a logout if the persisted or in-memory token has expired.
    ///
    /// Returns `true` when a logout happened.
    pub fn check_expiry(&mut self) -> bool {
        let persisted = match self.store.get(keys::TOKEN) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read persisted token");
                None
            }
        };
        let persisted_expired = persisted.as_deref().is_some_and(|t| !is_token_valid(t));
        let current_expired = self
            .session
            .as_ref()
            .is_some_and(|s| !is_token_valid(&s.token));

        if persisted_expired || current_expired {
            info!("session token expired");
            self.logout();
            true
        } else {
            false
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// True only for a session whose token is still valid right now.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| is_token_valid(&s.token))
    }

    /// True before [`SessionManager::initialize`] and while a login is
    /// outstanding.
    pub fn is_loading(&self) -> bool {
        !self.initialized || self.login_in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Route-guard decision for a page that requires `required`.
    pub fn authorize(&self, required: Option<UserType>, fallback: Option<&str>) -> GuardDecision {
        let session = self.session.as_ref().filter(|_| self.is_authenticated());
        guard::authorize(self.is_loading(), session, required, fallback)
    }
}

/// Holds the in-flight flag for the duration of a login request, including
/// when the login future is dropped before it finishes.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::auth::AUTH_FAILED_MESSAGE;
    use crate::models::AuthGrant;
    use crate::storage::MemoryStore;
    use crate::transport::TransportError;

    fn token_expiring_in(secs: i64) -> String {
        let body = URL_SAFE_NO_PAD.encode(json!({"exp": Utc::now().timestamp() + secs}).to_string());
        format!("h.{body}.s")
    }

    fn rep() -> UserRecord {
        UserRecord {
            id: "12".into(),
            email: "rep@example.com".into(),
            first_name: "Rita".into(),
            last_name: "Rep".into(),
            user_type: None,
            code: Some("R12".into()),
            phone: None,
            username: None,
        }
    }

    /// Replays a fixed answer and counts calls.
    struct FakeAuth {
        answer: Mutex<Option<Result<Vec<AuthGrant>, TransportError>>>,
        calls: AtomicUsize,
    }

    impl FakeAuth {
        fn answering(answer: Result<Vec<AuthGrant>, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                answer: Mutex::new(Some(answer)),
                calls: AtomicUsize::new(0),
            })
        }

        fn granting(token: String) -> Arc<Self> {
            Self::answering(Ok(vec![AuthGrant {
                token: Some(token),
                user: Some(rep()),
            }]))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthTransport for FakeAuth {
        async fn authenticate(
            &self,
            _role: UserType,
            _email: &str,
            _password: &str,
        ) -> Result<Vec<AuthGrant>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(TransportError::Request("no answer".into())))
        }
    }

    fn manager(store: Arc<MemoryStore>, auth: Arc<FakeAuth>) -> SessionManager {
        let mut manager = SessionManager::new(store, auth);
        manager.initialize();
        manager
    }

    fn persisted(store: &MemoryStore, token: &str, user: &str, user_type: &str) {
        store.set(keys::TOKEN, token).unwrap();
        store.set(keys::USER, user).unwrap();
        store.set(keys::USER_TYPE, user_type).unwrap();
    }

    #[test]
    fn empty_store_starts_signed_out() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(store, FakeAuth::granting(String::new()));
        assert!(!manager.is_authenticated());
        assert!(!manager.is_loading());
        assert!(manager.session().is_none());
    }

    #[test]
    fn loading_until_initialized() {
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(store, FakeAuth::granting(String::new()));
        assert!(manager.is_loading());
    }

    #[test]
    fn valid_persisted_session_is_restored() {
        let store = Arc::new(MemoryStore::new());
        let token = token_expiring_in(3600);
        persisted(&store, &token, &serde_json::to_string(&rep()).unwrap(), "salesRep");

        let manager = manager(store, FakeAuth::granting(String::new()));
        assert!(manager.is_authenticated());
        assert_eq!(manager.token(), Some(token.as_str()));
        assert_eq!(manager.session().unwrap().user_type, UserType::SalesRep);
        assert_eq!(manager.user().unwrap().email, "rep@example.com");
    }

    #[test]
    fn expired_persisted_session_is_cleared() {
        let store = Arc::new(MemoryStore::new());
        persisted(
            &store,
            &token_expiring_in(-10),
            &serde_json::to_string(&rep()).unwrap(),
            "salesRep",
        );

        let manager = manager(store.clone(), FakeAuth::granting(String::new()));
        assert!(!manager.is_authenticated());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_user_record_is_cleared_without_error() {
        let store = Arc::new(MemoryStore::new());
        persisted(&store, &token_expiring_in(3600), "{not json", "salesRep");

        let manager = manager(store.clone(), FakeAuth::granting(String::new()));
        assert!(!manager.is_authenticated());
        assert!(manager.error().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn user_type_falls_back_to_user_record() {
        let store = Arc::new(MemoryStore::new());
        let mut user = rep();
        user.user_type = Some(UserType::Admin);
        store.set(keys::TOKEN, &token_expiring_in(3600)).unwrap();
        store
            .set(keys::USER, &serde_json::to_string(&user).unwrap())
            .unwrap();

        let manager = manager(store, FakeAuth::granting(String::new()));
        assert_eq!(manager.session().unwrap().user_type, UserType::Admin);
    }

    #[test]
    fn legacy_token_is_migrated() {
        let store = Arc::new(MemoryStore::new());
        let token = token_expiring_in(3600);
        store.set(keys::LEGACY_AUTH_TOKEN, &token).unwrap();
        store
            .set(keys::USER, &serde_json::to_string(&rep()).unwrap())
            .unwrap();
        store.set(keys::USER_TYPE, "salesRep").unwrap();

        let manager = manager(store.clone(), FakeAuth::granting(String::new()));
        assert!(manager.is_authenticated());
        assert_eq!(store.get(keys::TOKEN).unwrap(), Some(token));
        assert_eq!(store.get(keys::LEGACY_AUTH_TOKEN).unwrap(), None);
    }

    #[test]
    fn stray_user_without_token_is_removed() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::USER, "{}").unwrap();
        store.set(keys::USER_TYPE, "salesRep").unwrap();

        let manager = manager(store.clone(), FakeAuth::granting(String::new()));
        assert!(!manager.is_authenticated());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn sales_rep_login_persists_session() {
        let store = Arc::new(MemoryStore::new());
        let token = token_expiring_in(3600);
        let auth = FakeAuth::granting(token.clone());
        let mut manager = manager(store.clone(), auth.clone());

        let session = manager
            .login("rep@example.com", "hunter2", UserType::SalesRep)
            .await
            .unwrap();

        assert_eq!(session.token, token);
        assert!(manager.is_authenticated());
        assert!(manager.error().is_none());
        assert!(!manager.is_loading());
        assert_eq!(auth.calls(), 1);
        assert_eq!(store.get(keys::TOKEN).unwrap(), Some(token));
        assert_eq!(
            store.get(keys::USER_TYPE).unwrap().as_deref(),
            Some("salesRep")
        );
        let saved: UserRecord =
            serde_json::from_str(&store.get(keys::USER).unwrap().unwrap()).unwrap();
        assert_eq!(saved.user_type, Some(UserType::SalesRep));
    }

    /// Never answers, like a request that hangs.
    struct HangingAuth;

    #[async_trait]
    impl AuthTransport for HangingAuth {
        async fn authenticate(
            &self,
            _role: UserType,
            _email: &str,
            _password: &str,
        ) -> Result<Vec<AuthGrant>, TransportError> {
            std::future::pending::<Result<Vec<AuthGrant>, TransportError>>().await
        }
    }

    /// Memory store that refuses writes to one key.
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.failing_key {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn abandoned_login_stops_loading() {
        let mut manager = SessionManager::new(Arc::new(MemoryStore::new()), Arc::new(HangingAuth));
        manager.initialize();

        let login = manager.login("rep@example.com", "pw", UserType::SalesRep);
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), login).await;

        assert!(timed_out.is_err());
        assert!(!manager.is_loading());
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn failed_write_restores_previous_persisted_session() {
        let old_token = token_expiring_in(3600);
        let mut user = rep();
        user.user_type = Some(UserType::SalesRep);
        let old_user = serde_json::to_string(&user).unwrap();
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_key: keys::USER_TYPE,
        });
        store.inner.set(keys::TOKEN, &old_token).unwrap();
        store.inner.set(keys::USER, &old_user).unwrap();

        let auth = FakeAuth::granting(token_expiring_in(7200));
        let mut manager = SessionManager::new(store.clone(), auth);
        manager.initialize();
        assert!(manager.is_authenticated());

        let err = manager
            .login("rep@example.com", "pw", UserType::SalesRep)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Storage(_)));
        assert_eq!(manager.token(), Some(old_token.as_str()));
        assert_eq!(store.get(keys::TOKEN).unwrap(), Some(old_token));
        assert_eq!(store.get(keys::USER).unwrap(), Some(old_user));
        assert_eq!(store.get(keys::USER_TYPE).unwrap(), None);
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_session() {
        let store = Arc::new(MemoryStore::new());
        let token = token_expiring_in(3600);
        persisted(&store, &token, &serde_json::to_string(&rep()).unwrap(), "salesRep");
        let auth = FakeAuth::answering(Err(TransportError::GraphQl("Invalid credentials".into())));
        let mut manager = manager(store.clone(), auth);

        let err = manager
            .login("rep@example.com", "wrong", UserType::SalesRep)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Failed(_)));
        assert_eq!(manager.error(), Some(AUTH_FAILED_MESSAGE));
        assert!(manager.is_authenticated());
        assert_eq!(manager.token(), Some(token.as_str()));
        assert_eq!(store.get(keys::TOKEN).unwrap(), Some(token));
    }

    #[tokio::test]
    async fn empty_result_or_missing_token_fails() {
        for answer in [
            Ok(vec![]),
            Ok(vec![AuthGrant {
                token: None,
                user: Some(rep()),
            }]),
            Ok(vec![AuthGrant {
                token: Some(String::new()),
                user: Some(rep()),
            }]),
        ] {
            let store = Arc::new(MemoryStore::new());
            let mut manager = manager(store.clone(), FakeAuth::answering(answer));
            let result = manager.login("rep@example.com", "pw", UserType::SalesRep).await;
            assert!(matches!(result, Err(AuthError::Failed(_))));
            assert_eq!(manager.error(), Some(AUTH_FAILED_MESSAGE));
            assert!(!manager.is_authenticated());
            assert!(store.is_empty());
        }
    }

    #[tokio::test]
    async fn customer_login_is_not_attempted() {
        let store = Arc::new(MemoryStore::new());
        let auth = FakeAuth::granting(token_expiring_in(3600));
        let mut manager = manager(store, auth.clone());

        let err = manager
            .login("c@example.com", "pw", UserType::Customer)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::NotSupported(UserType::Customer)));
        assert_eq!(
            manager.error(),
            Some("Customer authentication is coming soon.")
        );
        assert_eq!(auth.calls(), 0);
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected_locally() {
        let store = Arc::new(MemoryStore::new());
        let auth = FakeAuth::granting(token_expiring_in(3600));
        let mut manager = manager(store, auth.clone());

        let result = manager.login("  ", "pw", UserType::SalesRep).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
        assert_eq!(auth.calls(), 0);
    }

    #[tokio::test]
    async fn next_login_clears_previous_error() {
        let store = Arc::new(MemoryStore::new());
        let mut manager = manager(store, FakeAuth::granting(token_expiring_in(3600)));

        let _ = manager.login("c@example.com", "pw", UserType::Customer).await;
        assert!(manager.error().is_some());
        manager
            .login("rep@example.com", "pw", UserType::SalesRep)
            .await
            .unwrap();
        assert!(manager.error().is_none());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let mut manager = manager(store.clone(), FakeAuth::granting(token_expiring_in(3600)));
        manager
            .login("rep@example.com", "pw", UserType::SalesRep)
            .await
            .unwrap();

        manager.logout();
        assert!(!manager.is_authenticated());
        assert!(store.is_empty());

        manager.logout();
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn clear_error_resets_message() {
        let store = Arc::new(MemoryStore::new());
        let mut manager = manager(store, FakeAuth::granting(String::new()));
        manager.error = Some("boom".into());
        manager.clear_error();
        assert!(manager.error().is_none());
    }

    #[test]
    fn check_expiry_logs_out_when_persisted_token_expires() {
        let store = Arc::new(MemoryStore::new());
        persisted(
            &store,
            &token_expiring_in(3600),
            &serde_json::to_string(&rep()).unwrap(),
            "salesRep",
        );
        let mut manager = manager(store.clone(), FakeAuth::granting(String::new()));
        assert!(!manager.check_expiry());
        assert!(manager.is_authenticated());

        // Another writer replaced the token with an expired one.
        store.set(keys::TOKEN, &token_expiring_in(-1)).unwrap();
        assert!(manager.check_expiry());
        assert!(!manager.is_authenticated());
        assert!(store.is_empty());
    }

    #[test]
    fn check_expiry_is_quiet_when_signed_out() {
        let store = Arc::new(MemoryStore::new());
        let mut manager = manager(store, FakeAuth::granting(String::new()));
        assert!(!manager.check_expiry());
    }
}
