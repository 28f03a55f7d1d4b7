//! Client configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::auth::watch::DEFAULT_CHECK_INTERVAL;

/// Production GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://b2bapp-api.imdigital.com/graphql";

/// Directory name under the platform data directory.
pub const STATE_DIR_NAME: &str = "b2b-dashboard";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// GraphQL endpoint.
    pub api_url: String,
    /// Directory holding the persisted store.
    pub state_dir: PathBuf,
    pub session_check_interval: Duration,
}

impl ClientConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                                  |
    /// |--------------------------|------------------------------------------|
    /// | `B2B_API_URL`            | `https://b2bapp-api.imdigital.com/graphql` |
    /// | `B2B_STATE_DIR`          | `<data dir>/b2b-dashboard`               |
    /// | `B2B_SESSION_CHECK_SECS` | `60`                                     |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_check_interval = match var("B2B_SESSION_CHECK_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "invalid B2B_SESSION_CHECK_SECS; using default");
                    DEFAULT_CHECK_INTERVAL
                }
            },
            None => DEFAULT_CHECK_INTERVAL,
        };

        Self {
            api_url: var("B2B_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            state_dir: var("B2B_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_state_dir),
            session_check_interval,
        }
    }
}

/// `<data dir>/b2b-dashboard`, or a relative directory when the platform
/// has no data directory.
pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{STATE_DIR_NAME}")))
}
