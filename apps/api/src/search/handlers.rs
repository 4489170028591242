//! Axum route handlers for the document search API.

use std::cmp::Ordering;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::search::criteria::{EducationLevel, ExperienceBucket, RawSearchCriteria};
use crate::search::engine::ScoredDocument;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Highest score first, newest upload breaks ties.
    Score,
    Newest,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub owner_id: String,
    #[serde(default)]
    pub criteria: RawSearchCriteria,
    pub sort: Option<SortOrder>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Matches before paging.
    pub total: usize,
    pub results: Vec<ScoredDocument>,
}

#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    pub owner_id: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/search
///
/// Filters and scores the owner's analyzed CVs, then sorts and pages them.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    validate_search_request(&request)?;

    let mut results = state
        .engine
        .search(request.owner_id.trim(), &request.criteria)
        .await?;

    let has_keywords = request.criteria.keywords.iter().any(|k| !k.trim().is_empty());
    let sort = request.sort.unwrap_or(if has_keywords {
        SortOrder::Score
    } else {
        SortOrder::Newest
    });
    sort_results(&mut results, sort);

    let total = results.len();
    let limit = request.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let results = results
        .into_iter()
        .skip(request.offset.unwrap_or(0))
        .take(limit)
        .collect();

    Ok(Json(SearchResponse { total, results }))
}

/// GET /api/v1/documents/skills
///
/// Distinct skills across the owner's most recent documents, for autocomplete.
pub async fn handle_list_skills(
    State(state): State<AppState>,
    Query(params): Query<SkillsQuery>,
) -> Result<Json<SkillsResponse>, AppError> {
    let owner_id = params.owner_id.trim();
    if owner_id.is_empty() {
        return Err(AppError::Validation("owner_id cannot be empty".to_string()));
    }

    let cap = state.config.skills_sample_limit;
    let limit = params.limit.unwrap_or(cap).min(cap);

    let skills = state.engine.list_distinct_skills(owner_id, limit).await?;
    Ok(Json(SkillsResponse {
        skills: skills.into_iter().collect(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Rejects unknown bucket ids here; the engine would otherwise fail closed
/// and silently return nothing.
fn validate_search_request(request: &SearchRequest) -> Result<(), AppError> {
    if request.owner_id.trim().is_empty() {
        return Err(AppError::Validation("owner_id cannot be empty".to_string()));
    }

    if let Some(id) = non_blank(request.criteria.experience_years.as_deref()) {
        if let ExperienceBucket::Unrecognized(id) = ExperienceBucket::from_id(id) {
            return Err(AppError::Validation(format!(
                "experience_years '{id}' must be one of: {}",
                ExperienceBucket::IDS.join(", ")
            )));
        }
    }

    if let Some(id) = non_blank(request.criteria.education_level.as_deref()) {
        if let EducationLevel::Unrecognized(id) = EducationLevel::from_id(id) {
            return Err(AppError::Validation(format!(
                "education_level '{id}' must be one of: {}",
                EducationLevel::IDS.join(", ")
            )));
        }
    }

    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn sort_results(results: &mut [ScoredDocument], sort: SortOrder) {
    let newest_first =
        |a: &ScoredDocument, b: &ScoredDocument| b.document.uploaded_at.cmp(&a.document.uploaded_at);

    match sort {
        SortOrder::Score => results.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| newest_first(a, b))
        }),
        SortOrder::Newest => results.sort_by(newest_first),
    }
}
