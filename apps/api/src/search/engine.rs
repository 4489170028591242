//! Search engine — fetches one user's CVs, filters them in memory, scores the survivors.
//!
//! Pipeline: normalize criteria → bulk owner-scoped fetch → per-document
//! predicates (keyword gate first, then experience/education/location) →
//! semantic blend for keyword-matched documents with embeddings.
//!
//! Ordering of the returned collection is unspecified; callers sort and page.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::document::AnalyzedDocument;
use crate::search::blend::{blend_score, query_description, semantic_similarity};
use crate::search::criteria::{normalize_criteria, RawSearchCriteria, SearchCriteria};
use crate::search::education::matches_education;
use crate::search::experience::matches_experience;
use crate::search::keywords::{match_keywords, KeywordMatch};
use crate::search::location::matches_location;
use crate::search::similarity::SimilarityScorer;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Document fetch failed: {0}")]
    Store(#[from] StoreError),

    #[error("Search timed out after {0:?}")]
    TimedOut(Duration),
}

/// A document that passed every active predicate, with its match score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    #[serde(flatten)]
    pub document: AnalyzedDocument,
    /// 0 – 100. Stays 0 when no keywords were requested.
    pub match_score: f64,
    pub is_match: bool,
}

/// Per-document predicate outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_match: bool,
    /// Present only when keywords were requested and the gate passed.
    pub keywords: Option<KeywordMatch>,
}

impl Verdict {
    const EXCLUDED: Verdict = Verdict {
        is_match: false,
        keywords: None,
    };

    fn raw_score(&self) -> f64 {
        self.keywords.map(|k| k.raw_score).unwrap_or(0.0)
    }
}

/// Applies every active predicate (logical AND). Pure apart from `as_of`,
/// which stands in for "Present" in experience dates.
pub fn evaluate_document(
    document: &AnalyzedDocument,
    criteria: &SearchCriteria,
    as_of: NaiveDate,
) -> Verdict {
    if criteria.is_empty() {
        return Verdict {
            is_match: true,
            keywords: None,
        };
    }

    let Some(analysis) = document.analysis.as_ref() else {
        return Verdict::EXCLUDED;
    };

    let keywords = if criteria.keywords.is_empty() {
        None
    } else {
        match match_keywords(analysis.skills.as_deref(), &criteria.keywords) {
            Some(m) if m.passed() => Some(m),
            _ => return Verdict::EXCLUDED,
        }
    };

    if let Some(bucket) = &criteria.experience_years {
        if !matches_experience(analysis.experience.as_deref(), bucket, as_of) {
            return Verdict::EXCLUDED;
        }
    }

    if let Some(level) = &criteria.education_level {
        if !matches_education(analysis.education.as_deref(), level) {
            return Verdict::EXCLUDED;
        }
    }

    if let Some(location) = &criteria.location {
        if !matches_location(analysis, location) {
            return Verdict::EXCLUDED;
        }
    }

    Verdict {
        is_match: true,
        keywords,
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Max in-flight similarity calls per search.
    pub similarity_concurrency: usize,
    /// Upper bound on one whole search, fetch included.
    pub timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            similarity_concurrency: 4,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for SearchSettings {
    fn from(config: &Config) -> Self {
        Self {
            similarity_concurrency: config.similarity_concurrency.max(1),
            timeout: config.search_timeout,
        }
    }
}

/// Carried in `AppState` behind an `Arc`.
pub struct SearchEngine {
    store: Arc<dyn DocumentStore>,
    /// `None` disables semantic blending entirely.
    similarity: Option<Arc<dyn SimilarityScorer>>,
    settings: SearchSettings,
}

impl SearchEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        similarity: Option<Arc<dyn SimilarityScorer>>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            store,
            similarity,
            settings,
        }
    }

    /// Returns every document of `owner_id` satisfying `raw`, scored.
    /// An empty filter returns the whole collection with score 0.
    pub async fn search(
        &self,
        owner_id: &str,
        raw: &RawSearchCriteria,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        let limit = self.settings.timeout;
        tokio::time::timeout(limit, self.run_search(owner_id, raw))
            .await
            .unwrap_or(Err(SearchError::TimedOut(limit)))
    }

    async fn run_search(
        &self,
        owner_id: &str,
        raw: &RawSearchCriteria,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        let started = Instant::now();
        let criteria = normalize_criteria(raw);
        let documents = self.store.fetch_documents(owner_id).await?;
        let fetched = documents.len();
        let as_of = Utc::now().date_naive();

        let mut results: Vec<ScoredDocument> = documents
            .into_iter()
            .filter_map(|document| {
                let verdict = evaluate_document(&document, &criteria, as_of);
                verdict.is_match.then(|| ScoredDocument {
                    match_score: blend_score(verdict.raw_score(), None),
                    is_match: true,
                    document,
                })
            })
            .collect();

        if let Some(query) = query_description(&criteria.keywords) {
            self.blend_semantic(query, &mut results).await;
        }

        info!(
            "Search for owner {owner_id}: {} of {fetched} documents matched in {}ms",
            results.len(),
            started.elapsed().as_millis()
        );
        Ok(results)
    }

    /// Blends semantic similarity into each result that carries embeddings.
    /// Calls run concurrently, bounded by `similarity_concurrency`; a failed
    /// call leaves that document's keyword score untouched.
    async fn blend_semantic(&self, query: String, results: &mut [ScoredDocument]) {
        let Some(scorer) = self.similarity.clone() else {
            return;
        };

        let permits = Arc::new(Semaphore::new(self.settings.similarity_concurrency.max(1)));
        let query: Arc<str> = Arc::from(query);
        let mut tasks = JoinSet::new();

        for (index, scored) in results.iter().enumerate() {
            let Some(embeddings) = scored
                .document
                .analysis
                .as_ref()
                .and_then(|a| a.embeddings.clone())
                .filter(|e| !e.is_empty())
            else {
                continue;
            };

            let scorer = Arc::clone(&scorer);
            let permits = Arc::clone(&permits);
            let query = Arc::clone(&query);
            let document_id = scored.document.id;

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let similarity =
                    semantic_similarity(scorer.as_ref(), &query, &embeddings, document_id).await;
                (index, similarity)
            });
        }

        let mut blended = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(similarity))) => {
                    let scored = &mut results[index];
                    scored.match_score = blend_score(scored.match_score, Some(similarity));
                    blended += 1;
                }
                Ok((_, None)) => {}
                Err(e) => warn!("Similarity task aborted: {e}"),
            }
        }
        debug!("Blended semantic similarity into {blended} results");
    }

    /// Union of skills across up to `sample_limit` of the owner's most
    /// recent documents, for autocomplete.
    pub async fn list_distinct_skills(
        &self,
        owner_id: &str,
        sample_limit: usize,
    ) -> Result<BTreeSet<String>, SearchError> {
        if sample_limit == 0 {
            return Ok(BTreeSet::new());
        }

        let limit = self.settings.timeout;
        let documents = tokio::time::timeout(
            limit,
            self.store.fetch_recent_documents(owner_id, sample_limit),
        )
        .await
        .map_err(|_| SearchError::TimedOut(limit))??;

        Ok(documents
            .iter()
            .take(sample_limit)
            .filter_map(|d| d.analysis.as_ref())
            .flat_map(|a| a.skills.iter().flatten())
            .map(|skill| skill.trim())
            .filter(|skill| !skill.is_empty())
            .map(str::to_string)
            .collect())
    }
}
