use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::models::document::{AnalyzedDocument, CvDocumentRow};
use crate::store::{DocumentStore, StoreError};

/// Reads `cv_documents` rows owned by a single user.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch_documents(&self, owner_id: &str) -> Result<Vec<AnalyzedDocument>, StoreError> {
        let rows = sqlx::query_as::<_, CvDocumentRow>(
            r#"
            SELECT id, owner_id, file_name, uploaded_at, analysis
            FROM cv_documents
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} documents for owner {owner_id}", rows.len());
        Ok(rows.into_iter().map(AnalyzedDocument::from).collect())
    }

    async fn fetch_recent_documents(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<AnalyzedDocument>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, CvDocumentRow>(
            r#"
            SELECT id, owner_id, file_name, uploaded_at, analysis
            FROM cv_documents
            WHERE owner_id = $1
            ORDER BY uploaded_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AnalyzedDocument::from).collect())
    }
}
