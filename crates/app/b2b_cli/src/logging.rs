use tracing_subscriber::EnvFilter;

use crate::Error;

const DEFAULT_FILTER: &str = "info,b2b_core=debug,b2b_api_client=debug";

/// Log to stderr; stdout carries command output.
pub fn init() -> Result<(), Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
