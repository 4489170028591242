//! Fixtures shared by the search, store and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::document::{AnalyzedDocument, CvAnalysis, EducationEntry, ExperienceEntry};
use crate::search::similarity::{SimilarityError, SimilarityScorer};

pub fn document(owner_id: &str, analysis: Option<CvAnalysis>) -> AnalyzedDocument {
    AnalyzedDocument {
        id: Uuid::new_v4(),
        owner_id: owner_id.to_string(),
        file_name: "cv.pdf".to_string(),
        uploaded_at: Utc::now(),
        analysis,
    }
}

pub fn analysis_with_skills(skills: &[&str]) -> CvAnalysis {
    CvAnalysis {
        skills: Some(skills.iter().map(|s| s.to_string()).collect()),
        experience: Some(vec![]),
        education: Some(vec![]),
        ..Default::default()
    }
}

pub fn job(company: &str, start: &str, end: &str, description: &str) -> ExperienceEntry {
    ExperienceEntry {
        company: company.to_string(),
        position: "Engineer".to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        description: description.to_string(),
    }
}

pub fn degree(institution: &str, degree: &str) -> EducationEntry {
    EducationEntry {
        institution: institution.to_string(),
        degree: degree.to_string(),
        ..Default::default()
    }
}

enum Outcome {
    Fixed(f64),
    Failing,
    /// Fails for the given vector, returns the value otherwise.
    FailingFor(Vec<f32>, f64),
}

/// Deterministic `SimilarityScorer` that counts its calls.
pub struct StubScorer {
    outcome: Outcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubScorer {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixed(value: f64) -> Self {
        Self::new(Outcome::Fixed(value))
    }

    pub fn failing() -> Self {
        Self::new(Outcome::Failing)
    }

    pub fn failing_for(embeddings: Vec<f32>, otherwise: f64) -> Self {
        Self::new(Outcome::FailingFor(embeddings, otherwise))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SimilarityScorer for StubScorer {
    async fn similarity(
        &self,
        _query_text: &str,
        embeddings: &[f32],
    ) -> Result<f64, SimilarityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            Outcome::Fixed(value) => Ok(*value),
            Outcome::Failing => Err(SimilarityError::EmptyResponse),
            Outcome::FailingFor(bad, _) if bad.as_slice() == embeddings => {
                Err(SimilarityError::ZeroVector)
            }
            Outcome::FailingFor(_, value) => Ok(*value),
        }
    }
}
