//! Document Store Accessor — the engine's only read path into persisted CVs.
//!
//! The engine never filters in the database: it fetches a user's documents in
//! bulk and evaluates every predicate in memory.
//!
//! `AppState` holds an `Arc<dyn DocumentStore>`; Postgres in production, an
//! in-memory map in tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::document::AnalyzedDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document owned by `owner_id`, analyzed or not.
    async fn fetch_documents(&self, owner_id: &str) -> Result<Vec<AnalyzedDocument>, StoreError>;

    /// Up to `limit` of the owner's documents, newest upload first.
    async fn fetch_recent_documents(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<AnalyzedDocument>, StoreError> {
        let mut documents = self.fetch_documents(owner_id).await?;
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        documents.truncate(limit);
        Ok(documents)
    }
}
