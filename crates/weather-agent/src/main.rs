//! Asks the weather agent three questions and prints its answers.

#[macro_use]
extern crate tracing;

use tracing_subscriber::EnvFilter;
use weather_agent::{Config, app};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        // A missing .env file is fine, the environment may be set directly.
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
        }
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(err) = run().await {
        debug!("run failed: {err:?}");
        println!("An error occucred: {err:#}");
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    debug!("loaded config: {config:?}");
    app::run(config).await?;
    Ok(())
}
