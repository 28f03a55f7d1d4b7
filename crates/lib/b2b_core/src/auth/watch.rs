//! Periodic session expiry check.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::AppContext;

/// How often the session token is re-checked.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Background task that signs the user out once the token expires.
///
/// The task stops on [`ExpiryWatch::shutdown`] or when the watch is dropped.
pub struct ExpiryWatch {
    cancel: CancellationToken,
    authenticated: watch::Receiver<bool>,
    handle: Option<JoinHandle<()>>,
}

impl ExpiryWatch {
    /// Start checking `ctx` every `period`. The first check runs one period
    /// after the call. A zero period falls back to [`DEFAULT_CHECK_INTERVAL`].
    pub async fn spawn(ctx: Arc<Mutex<AppContext>>, period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_CHECK_INTERVAL
        } else {
            period
        };
        let initial = ctx.lock().await.is_authenticated();
        let (tx, authenticated) = watch::channel(initial);
        let cancel = CancellationToken::new();

        let stop = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticks.tick() => {
                        let mut ctx = ctx.lock().await;
                        if ctx.check_expiry() {
                            info!("session expired; signed out");
                        }
                        tx.send_replace(ctx.is_authenticated());
                    }
                }
            }
            debug!("expiry watch stopped");
        });
        debug!(period_secs = period.as_secs(), "expiry watch started");

        Self {
            cancel,
            authenticated,
            handle: Some(handle),
        }
    }

    /// Receiver for the authenticated flag, updated after every check.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Resolves once a check finds the user signed out, or the task ends.
    pub async fn signed_out(&self) {
        let mut rx = self.authenticated.clone();
        let _ = rx.wait_for(|authenticated| !*authenticated).await;
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "expiry watch task failed");
        }
    }
}

impl Drop for ExpiryWatch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::models::{AuthGrant, UserType};
    use crate::storage::{KeyValueStore, MemoryStore, keys};
    use crate::transport::{AuthTransport, TransportError};

    struct NoAuth;

    #[async_trait]
    impl AuthTransport for NoAuth {
        async fn authenticate(
            &self,
            _role: UserType,
            _email: &str,
            _password: &str,
        ) -> Result<Vec<AuthGrant>, TransportError> {
            Err(TransportError::Unsupported("login".into()))
        }
    }

    fn token(exp: i64) -> String {
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(json!({ "exp": exp }).to_string()))
    }

    fn signed_in_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_entries([
            (keys::TOKEN, token(Utc::now().timestamp() + 3600)),
            (
                keys::USER,
                r#"{"id":"1","email":"r@example.com","firstName":"R","lastName":"S"}"#.to_string(),
            ),
            (keys::USER_TYPE, "salesRep".to_string()),
        ]))
    }

    #[tokio::test(start_paused = true)]
    async fn signs_out_after_token_expires() {
        let store = signed_in_store();
        let ctx = Arc::new(Mutex::new(AppContext::new(store.clone(), Arc::new(NoAuth))));
        let watch = ExpiryWatch::spawn(ctx.clone(), DEFAULT_CHECK_INTERVAL).await;
        assert!(watch.is_authenticated());

        store.set(keys::TOKEN, &token(1)).unwrap();
        watch.signed_out().await;

        assert!(!watch.is_authenticated());
        assert!(!ctx.lock().await.is_authenticated());
        assert!(store.is_empty());
        watch.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_check_waits_one_period() {
        let store = signed_in_store();
        let ctx = Arc::new(Mutex::new(AppContext::new(store.clone(), Arc::new(NoAuth))));
        let watch = ExpiryWatch::spawn(ctx.clone(), Duration::from_secs(60)).await;

        store.set(keys::TOKEN, &token(1)).unwrap();
        time::sleep(Duration::from_secs(59)).await;
        assert!(ctx.lock().await.is_authenticated());

        time::sleep(Duration::from_secs(2)).await;
        assert!(!ctx.lock().await.is_authenticated());
        watch.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_checks() {
        let store = signed_in_store();
        let ctx = Arc::new(Mutex::new(AppContext::new(store.clone(), Arc::new(NoAuth))));
        let watch = ExpiryWatch::spawn(ctx.clone(), Duration::from_secs(60)).await;
        watch.shutdown().await;

        store.set(keys::TOKEN, &token(1)).unwrap();
        time::sleep(Duration::from_secs(600)).await;

        assert!(ctx.lock().await.is_authenticated());
    }
}
