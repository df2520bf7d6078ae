//! Persistence gateway - Owns the connection to the SQLite store.
//!
//! `Store` is an explicit handle passed to every repository and engine
//! call; its lifecycle belongs to the process entry point. Opening
//! configures the store for durable-but-concurrent access (WAL, enforced
//! foreign keys, a bounded lock wait) and retries transient failures with
//! exponential backoff before surfacing [`Error::StoreUnavailable`]
//! together with a lock diagnostic for the operator.

pub mod diagnostic;
pub mod schema;

use crate::config::AppConfig;
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use tracing::{debug, info, warn};

/// Pragmas applied on every open, matching the durability profile the
/// ledger was designed around.
const OPEN_PRAGMAS: [&str; 4] = [
    "PRAGMA journal_mode=WAL;",
    "PRAGMA synchronous=NORMAL;",
    "PRAGMA busy_timeout=30000;",
    "PRAGMA foreign_keys=ON;",
];

/// Handle to the durable store.
#[derive(Debug, Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    /// Opens the store, retrying transiently-failing opens.
    ///
    /// Attempts are spaced by exponential backoff: the delay starts at
    /// `backoff_base`, doubles after each failure and never exceeds
    /// `backoff_cap` (1s, 2s, 4s, 8s, 10s with the defaults). After the
    /// last attempt the error carries a diagnostic report of the lock
    /// state for operator-facing messages.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        // A file-backed store needs its directory to exist before SQLite
        // can create the database. Best effort: if this fails the connect
        // attempts below surface the real error with the diagnostic.
        if let Some(path) = diagnostic::inspect(&config.database_url).path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && std::fs::create_dir_all(parent).is_err() {
                    debug!("Could not create store directory {}", parent.display());
                }
            }
        }

        let mut delay = config.backoff_base;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match Self::try_open(&config.database_url).await {
                Ok(db) => {
                    info!(
                        "Store opened at {} (attempt {}/{})",
                        config.database_url, attempt, config.connect_attempts
                    );
                    return Ok(Self { db });
                }
                Err(err) if attempt < config.connect_attempts => {
                    warn!(
                        "Store open attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, config.connect_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(config.backoff_cap);
                }
                Err(err) => {
                    let report = diagnostic::inspect(&config.database_url);
                    warn!(
                        "Store open failed after {} attempt(s): {}\n{}",
                        attempt, err, report
                    );
                    return Err(Error::StoreUnavailable {
                        attempts: attempt,
                        diagnostic: report.to_string(),
                    });
                }
            }
        }
    }

    async fn try_open(database_url: &str) -> Result<DatabaseConnection> {
        let db = Database::connect(database_url).await?;
        for pragma in OPEN_PRAGMAS {
            db.execute_unprepared(pragma).await?;
        }
        // Probe the connection before handing it out.
        db.ping().await?;
        debug!("Store connection configured (WAL, foreign keys on)");
        Ok(db)
    }

    /// Wraps an already-open connection. Used by tests running against
    /// `sqlite::memory:` and by callers that manage the connection
    /// themselves.
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection, for read paths that need no transaction.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Opens a transaction. Every rule-engine operation runs inside
    /// exactly one of these; the store never commits implicitly.
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        self.db.begin().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn memory_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            connect_attempts: 1,
            backoff_base: Duration::from_millis(1),
            backoff_cap: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn open_succeeds_against_memory_store() -> Result<()> {
        let store = Store::open(&memory_config()).await?;
        store.connection().ping().await?;
        Ok(())
    }

    #[tokio::test]
    async fn open_reports_store_unavailable_with_diagnostic() {
        let config = AppConfig {
            // A directory path is never a valid SQLite database file.
            database_url: "sqlite:///proc/nonexistent/ledger.sqlite".to_string(),
            connect_attempts: 2,
            backoff_base: Duration::from_millis(1),
            backoff_cap: Duration::from_millis(2),
        };
        let result = Store::open(&config).await;
        match result {
            Err(Error::StoreUnavailable {
                attempts,
                diagnostic,
            }) => {
                assert_eq!(attempts, 2);
                assert!(diagnostic.contains("database file"));
            }
            other => panic!("expected StoreUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn begin_yields_a_usable_transaction() -> Result<()> {
        let store = Store::open(&memory_config()).await?;
        let txn = store.begin().await?;
        txn.commit().await.map_err(Error::from)?;
        Ok(())
    }
}
