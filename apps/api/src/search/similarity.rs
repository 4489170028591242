//! Semantic similarity capability.
//!
//! The engine only sees `SimilarityScorer`. In production the query text is
//! embedded through an OpenAI-compatible `/embeddings` endpoint and compared
//! to the document's stored vector by cosine similarity.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
const QUERY_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding API returned no vectors")]
    EmptyResponse,

    #[error("Embedding dimension mismatch: query {query}, document {document}")]
    DimensionMismatch { query: usize, document: usize },

    #[error("Similarity undefined for a zero vector")]
    ZeroVector,
}

/// Scores how well a document's embedding matches a query description.
/// Implementations return a value in `[0, 1]`.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    async fn similarity(&self, query_text: &str, embeddings: &[f32])
        -> Result<f64, SimilarityError>;
}

/// Cosine similarity of two equal-length vectors, clamped to `[0, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            query: a.len(),
            document: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroVector);
    }

    Ok((dot / (norm_a * norm_b)).clamp(0.0, 1.0))
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeds the query remotely, then compares locally.
///
/// Every matching document in one search shares the same query description,
/// so query embeddings are cached in-process.
pub struct EmbeddingSimilarityScorer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl EmbeddingSimilarityScorer {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            api_url,
            api_key,
            model,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn cached(&self, text: &str) -> Option<Vec<f32>> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(text).cloned())
    }

    fn remember(&self, text: &str, embedding: &[f32]) {
        if let Ok(mut cache) = self.cache.lock() {
            if cache.len() >= QUERY_CACHE_CAPACITY {
                cache.clear();
            }
            cache.insert(text.to_string(), embedding.to_vec());
        }
    }

    /// Retries on 429 and 5xx with exponential backoff.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SimilarityError> {
        if let Some(embedding) = self.cached(text) {
            return Ok(embedding);
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        let mut last_error: Option<SimilarityError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.api_url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SimilarityError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                last_error = Some(SimilarityError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(SimilarityError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: EmbeddingResponse = response.json().await?;
            let embedding = parsed
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .ok_or(SimilarityError::EmptyResponse)?;

            debug!("Embedded query ({} dims)", embedding.len());
            self.remember(text, &embedding);
            return Ok(embedding);
        }

        Err(last_error.unwrap_or(SimilarityError::EmptyResponse))
    }
}

#[async_trait]
impl SimilarityScorer for EmbeddingSimilarityScorer {
    async fn similarity(
        &self,
        query_text: &str,
        embeddings: &[f32],
    ) -> Result<f64, SimilarityError> {
        let query = self.embed(query_text).await?;
        cosine_similarity(&query, embeddings)
    }
}
