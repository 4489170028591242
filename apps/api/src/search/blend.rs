//! Score Blender — folds an optional semantic signal into the keyword score.

use tracing::warn;
use uuid::Uuid;

use crate::search::similarity::SimilarityScorer;

const KEYWORD_WEIGHT: f64 = 0.7;
const SEMANTIC_WEIGHT: f64 = 0.3;

/// Synthesizes the sentence compared against document embeddings.
/// `None` when there are no keywords.
pub fn query_description(keywords: &[String]) -> Option<String> {
    if keywords.is_empty() {
        return None;
    }
    Some(format!(
        "Looking for a candidate with the following skills: {}.",
        keywords.join(", ")
    ))
}

/// `0.7 * raw + 0.3 * similarity * 100`, or `raw` unchanged without a
/// semantic signal. Always within `[0, 100]`.
pub fn blend_score(raw_keyword_score: f64, semantic_similarity: Option<f64>) -> f64 {
    let score = match semantic_similarity {
        Some(similarity) => {
            KEYWORD_WEIGHT * raw_keyword_score + SEMANTIC_WEIGHT * (similarity * 100.0)
        }
        None => raw_keyword_score,
    };
    score.clamp(0.0, 100.0)
}

/// Calls the scorer and absorbs any failure: the document falls back to
/// keyword-only scoring and the search carries on.
pub async fn semantic_similarity(
    scorer: &dyn SimilarityScorer,
    query: &str,
    embeddings: &[f32],
    document_id: Uuid,
) -> Option<f64> {
    if embeddings.is_empty() {
        return None;
    }
    match scorer.similarity(query, embeddings).await {
        Ok(value) if value.is_finite() => Some(value.clamp(0.0, 1.0)),
        Ok(value) => {
            warn!("Similarity for document {document_id} was not finite ({value}); using keyword score");
            None
        }
        Err(e) => {
            warn!("Similarity lookup failed for document {document_id}: {e}; using keyword score");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::StubScorer;

    #[test]
    fn test_blend_formula() {
        // 0.7*80 + 0.3*50
        assert!((blend_score(80.0, Some(0.5)) - 71.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_semantic_keeps_raw() {
        assert_eq!(blend_score(62.5, None), 62.5);
    }

    #[test]
    fn test_blend_stays_in_range() {
        let top = blend_score(100.0, Some(1.0));
        assert!(top <= 100.0 && (top - 100.0).abs() < 1e-9);
        assert_eq!(blend_score(0.0, Some(0.0)), 0.0);
        assert_eq!(blend_score(150.0, None), 100.0);
    }

    #[test]
    fn test_query_description() {
        let keywords = vec!["rust".to_string(), "kafka".to_string()];
        assert_eq!(
            query_description(&keywords).as_deref(),
            Some("Looking for a candidate with the following skills: rust, kafka.")
        );
        assert!(query_description(&[]).is_none());
    }

    #[tokio::test]
    async fn test_scorer_failure_is_absorbed() {
        let scorer = StubScorer::failing();
        let value = semantic_similarity(&scorer, "q", &[1.0], Uuid::new_v4()).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_non_finite_similarity_is_absorbed() {
        let scorer = StubScorer::fixed(f64::NAN);
        assert!(semantic_similarity(&scorer, "q", &[1.0], Uuid::new_v4())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_embeddings_skip_scorer() {
        let scorer = StubScorer::fixed(0.9);
        assert!(semantic_similarity(&scorer, "q", &[], Uuid::new_v4())
            .await
            .is_none());
        assert_eq!(scorer.calls(), 0);
    }

    #[tokio::test]
    async fn test_similarity_passed_through() {
        let scorer = StubScorer::fixed(0.25);
        let value = semantic_similarity(&scorer, "q", &[1.0], Uuid::new_v4()).await;
        assert_eq!(value, Some(0.25));
        assert_eq!(scorer.calls(), 1);
    }
}
