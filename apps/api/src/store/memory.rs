use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::document::AnalyzedDocument;
use crate::store::{DocumentStore, StoreError};

/// Owner-keyed in-memory store for engine and router tests.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, Vec<AnalyzedDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn with_documents(documents: impl IntoIterator<Item = AnalyzedDocument>) -> Self {
        let store = Self::default();
        for document in documents {
            store.insert(document);
        }
        store
    }

    pub fn insert(&self, document: AnalyzedDocument) {
        let mut guard = self.documents.write().unwrap_or_else(|e| e.into_inner());
        guard
            .entry(document.owner_id.clone())
            .or_default()
            .push(document);
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn fetch_documents(&self, owner_id: &str) -> Result<Vec<AnalyzedDocument>, StoreError> {
        let guard = self
            .documents
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(guard.get(owner_id).cloned().unwrap_or_default())
    }
}

/// A store that is always down.
pub struct FailingDocumentStore;

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn fetch_documents(&self, _owner_id: &str) -> Result<Vec<AnalyzedDocument>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::document;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_fetch_is_owner_scoped() {
        let store = InMemoryDocumentStore::with_documents([
            document("alice", None),
            document("alice", None),
            document("bob", None),
        ]);

        assert_eq!(store.fetch_documents("alice").await.unwrap().len(), 2);
        assert_eq!(store.fetch_documents("bob").await.unwrap().len(), 1);
        assert!(store.fetch_documents("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_documents_newest_first_and_limited() {
        let mut old = document("alice", None);
        old.uploaded_at = Utc::now() - Duration::days(10);
        let new = document("alice", None);
        let new_id = new.id;
        let store = InMemoryDocumentStore::with_documents([old, new]);

        let recent = store.fetch_recent_documents("alice", 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, new_id);
    }
}
