// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use b2b_core::config::ClientConfig;
use clap::Parser;
use cli::Cli;
use commands::Client;

mod cli;
mod commands;
mod logging;
mod render;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if let Some(state_dir) = args.state_dir {
        config.state_dir = state_dir;
    }

    let client = Client::open(config)?;
    commands::dispatch(args.command, client).await
}
