//! Initialization entry point: opens the store, creates the schema and
//! seeds the default parameters, logging a lock diagnostic if the store
//! cannot be reached. The form and export layers link against the
//! library; this binary only prepares a working data store.

use caisse_ledger::errors::Result;
use caisse_ledger::store::{Store, diagnostic, schema};
use caisse_ledger::{config, repo};
use dotenvy::dotenv;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()?;

    // 4. Pre-open diagnostic, useful when a previous run died holding locks
    debug!("{}", diagnostic::inspect(&app_config.database_url));

    // 5. Open the store (retries with backoff internally)
    let store = Store::open(&app_config)
        .await
        .inspect(|_| info!("Store opened successfully."))
        .inspect_err(|e| error!("Failed to open store: {}", e))?;

    // 6. Ensure schema and default parameters
    schema::create_tables(store.connection())
        .await
        .inspect(|_| info!("Ledger tables ensured."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;
    schema::seed_default_parameters(store.connection())
        .await
        .inspect_err(|e| error!("Failed to seed parameters: {}", e))?;

    let rate_bp = repo::params::interest_rate_bp(store.connection()).await?;
    info!(
        "Ledger ready (interest rate {}.{:02}%)",
        rate_bp / 100,
        rate_bp % 100
    );
    Ok(())
}
