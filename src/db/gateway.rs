//! Connection/Transaction Gateway
//!
//! The injected handle through which every statement reaches the store.
//! Opened once at process start and closed at shutdown.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::db::{MemoryStore, PgStore, Store, StoreError, Tables};
use crate::error::Result;

/// Cloneable handle over the configured store.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn Store>,
}

impl Gateway {
    /// Wraps an already constructed store.
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Gateway over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Opens the store described by `config`.
    ///
    /// Connects to Postgres when a database URL is configured, otherwise
    /// falls back to the in-memory store.
    pub async fn open(config: &DatabaseConfig) -> std::result::Result<Self, StoreError> {
        match config.url.as_deref() {
            Some(url) => {
                let store = PgStore::connect(url, config).await?;
                if config.run_migrations {
                    store.migrate().await?;
                    info!("Database migrations applied");
                }
                Ok(Self::new(store))
            }
            None => {
                warn!("DATABASE_URL not set, using the in-memory store");
                Ok(Self::in_memory())
            }
        }
    }

    /// Acquires a connection for single statements.
    ///
    /// The connection goes back to the pool when the returned executor is
    /// dropped, on every exit path.
    pub async fn connection(&self) -> Result<Box<dyn Tables>> {
        Ok(self.store.connection().await?)
    }

    /// Runs `body` inside a transaction.
    ///
    /// Commits when `body` succeeds. On any failure the transaction is rolled
    /// back and the body's error is returned unchanged, so classified errors
    /// raised inside the body keep their kind.
    pub async fn transaction<T, F>(&self, body: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut dyn Tables) -> BoxFuture<'t, Result<T>> + Send,
    {
        let mut tx = self.store.begin().await?;
        let outcome = body(tx.tables()).await;

        match outcome {
            Ok(value) => {
                tx.commit().await?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Transaction rollback failed");
                }
                debug!(error = %err, "Transaction rolled back");
                Err(err)
            }
        }
    }

    /// Closes the underlying store.
    pub async fn close(&self) {
        self.store.close().await;
        info!("Gateway closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_transaction_commits_on_success() {
        let gateway = Gateway::in_memory();

        let id = gateway
            .transaction(|db| {
                Box::pin(async move {
                    let area_id = db.insert_area("Sports hall").await?;
                    Ok(db.insert_template("Sweep court", area_id).await?)
                })
            })
            .await
            .unwrap();

        let mut db = gateway.connection().await.unwrap();
        let template = db.find_template(id).await.unwrap().unwrap();
        assert_eq!(template.description, "Sweep court");
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_store_failure() {
        let gateway = Gateway::in_memory();

        let result: Result<i32> = gateway
            .transaction(|db| {
                Box::pin(async move {
                    db.insert_area("Sports hall").await?;
                    Ok(db.insert_template("Sweep court", 999).await?)
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::Store(StoreError::MissingReference))
        ));
        let mut db = gateway.connection().await.unwrap();
        assert!(db.list_areas().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transaction_keeps_classified_error() {
        let gateway = Gateway::in_memory();

        let result: Result<()> = gateway
            .transaction(|db| {
                Box::pin(async move {
                    db.insert_area("Pool side").await?;
                    Err(AppError::not_found("Cleaning task template list not found"))
                })
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let mut db = gateway.connection().await.unwrap();
        assert!(db.list_areas().await.unwrap().is_empty());
    }
}
