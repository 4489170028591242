//! Criteria Normalizer — turns a raw filter request into canonical `SearchCriteria`.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Filter request as received from the caller. Casing and whitespace arbitrary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSearchCriteria {
    pub keywords: Vec<String>,
    pub experience_years: Option<String>,
    pub education_level: Option<String>,
    pub location: Option<String>,
}

/// Experience-years bucket ids: `0-1`, `1-3`, `3-5`, `5-10`, `10+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceBucket {
    UnderOne,
    OneToThree,
    ThreeToFive,
    FiveToTen,
    OverTen,
    /// Unknown id; matches no document.
    Unrecognized(String),
}

impl ExperienceBucket {
    pub const IDS: [&'static str; 5] = ["0-1", "1-3", "3-5", "5-10", "10+"];

    pub fn from_id(id: &str) -> Self {
        match id {
            "0-1" => ExperienceBucket::UnderOne,
            "1-3" => ExperienceBucket::OneToThree,
            "3-5" => ExperienceBucket::ThreeToFive,
            "5-10" => ExperienceBucket::FiveToTen,
            "10+" => ExperienceBucket::OverTen,
            other => ExperienceBucket::Unrecognized(other.to_string()),
        }
    }
}

/// Education-level ids, ordered by rank: `high-school` (1) .. `phd` (5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Phd,
    /// Unknown id; matches no document.
    Unrecognized(String),
}

impl EducationLevel {
    pub const IDS: [&'static str; 5] = ["high-school", "associate", "bachelor", "master", "phd"];

    pub fn from_id(id: &str) -> Self {
        match id {
            "high-school" => EducationLevel::HighSchool,
            "associate" => EducationLevel::Associate,
            "bachelor" => EducationLevel::Bachelor,
            "master" => EducationLevel::Master,
            "phd" => EducationLevel::Phd,
            other => EducationLevel::Unrecognized(other.to_string()),
        }
    }

    /// Minimum degree rank required, `None` for unrecognized ids.
    pub fn required_rank(&self) -> Option<u8> {
        match self {
            EducationLevel::HighSchool => Some(1),
            EducationLevel::Associate => Some(2),
            EducationLevel::Bachelor => Some(3),
            EducationLevel::Master => Some(4),
            EducationLevel::Phd => Some(5),
            EducationLevel::Unrecognized(_) => None,
        }
    }
}

/// Canonical, per-request search constraints. `None`/empty means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    /// Lower-cased, trimmed, de-duplicated; request order preserved.
    pub keywords: Vec<String>,
    pub experience_years: Option<ExperienceBucket>,
    pub education_level: Option<EducationLevel>,
    pub location: Option<String>,
}

impl SearchCriteria {
    /// True when no axis constrains the result set.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.experience_years.is_none()
            && self.education_level.is_none()
            && self.location.is_none()
    }
}

pub fn normalize_criteria(raw: &RawSearchCriteria) -> SearchCriteria {
    let mut keywords: Vec<String> = Vec::with_capacity(raw.keywords.len());
    for keyword in &raw.keywords {
        let keyword = keyword.trim().to_lowercase();
        // An empty keyword would substring-match every skill.
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }

    let experience_years = non_blank(raw.experience_years.as_deref()).map(|id| {
        let bucket = ExperienceBucket::from_id(id);
        if let ExperienceBucket::Unrecognized(id) = &bucket {
            warn!("Unrecognized experience bucket id '{id}'; no document will match it");
        }
        bucket
    });

    let education_level = non_blank(raw.education_level.as_deref()).map(|id| {
        let level = EducationLevel::from_id(id);
        if let EducationLevel::Unrecognized(id) = &level {
            warn!("Unrecognized education level id '{id}'; no document will match it");
        }
        level
    });

    let location = non_blank(raw.location.as_deref()).map(str::to_lowercase);

    SearchCriteria {
        keywords,
        experience_years,
        education_level,
        location,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(keywords: &[&str]) -> RawSearchCriteria {
        RawSearchCriteria {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_keywords_are_lowercased_and_trimmed() {
        let criteria = normalize_criteria(&raw(&["  Python ", "Machine Learning"]));
        assert_eq!(criteria.keywords, vec!["python", "machine learning"]);
    }

    #[test]
    fn test_blank_and_duplicate_keywords_dropped() {
        let criteria = normalize_criteria(&raw(&["Rust", "   ", "rust", ""]));
        assert_eq!(criteria.keywords, vec!["rust"]);
    }

    #[test]
    fn test_location_lowercased() {
        let criteria = normalize_criteria(&RawSearchCriteria {
            location: Some(" New York ".to_string()),
            ..Default::default()
        });
        assert_eq!(criteria.location.as_deref(), Some("new york"));
    }

    #[test]
    fn test_empty_request_is_empty_criteria() {
        let criteria = normalize_criteria(&RawSearchCriteria {
            keywords: vec![],
            experience_years: Some(String::new()),
            education_level: Some("  ".to_string()),
            location: Some(String::new()),
        });
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_known_bucket_ids_parse() {
        let criteria = normalize_criteria(&RawSearchCriteria {
            experience_years: Some("10+".to_string()),
            education_level: Some("high-school".to_string()),
            ..Default::default()
        });
        assert_eq!(criteria.experience_years, Some(ExperienceBucket::OverTen));
        assert_eq!(criteria.education_level, Some(EducationLevel::HighSchool));
    }

    #[test]
    fn test_unknown_ids_kept_as_unrecognized() {
        let criteria = normalize_criteria(&RawSearchCriteria {
            experience_years: Some("2-4".to_string()),
            education_level: Some("postdoc".to_string()),
            ..Default::default()
        });
        assert_eq!(
            criteria.experience_years,
            Some(ExperienceBucket::Unrecognized("2-4".to_string()))
        );
        assert_eq!(
            criteria.education_level,
            Some(EducationLevel::Unrecognized("postdoc".to_string()))
        );
        assert!(!criteria.is_empty());
    }

    #[test]
    fn test_required_ranks_ascend() {
        let ranks: Vec<_> = EducationLevel::IDS
            .iter()
            .map(|id| EducationLevel::from_id(id).required_rank())
            .collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
    }
}
