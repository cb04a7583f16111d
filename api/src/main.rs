//! Loglink API Server Binary
//!
//! Entry point for the Loglink API server.

#![deny(unsafe_code)]

use anyhow::Result;
use api::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let _fanout = shared::logging::init_logging(&config.logging)?;

    api::run_server_with_config(config).await
}
