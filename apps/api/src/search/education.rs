//! Education-Level Ranker.

use crate::models::document::EducationEntry;
use crate::search::criteria::EducationLevel;

/// Marker tokens checked in priority order; first hit wins.
const DEGREE_MARKERS: &[(&str, u8)] = &[
    ("phd", 5),
    ("doctorate", 5),
    ("master", 4),
    ("mba", 4),
    ("bachelor", 3),
    ("associate", 2),
    ("high school", 1),
    ("diploma", 1),
];

/// Maps a free-text degree to an ordinal rank (0 when no marker is found).
pub fn degree_rank(degree: &str) -> u8 {
    let degree = degree.to_lowercase();
    DEGREE_MARKERS
        .iter()
        .find(|(marker, _)| degree.contains(marker))
        .map(|(_, rank)| *rank)
        .unwrap_or(0)
}

/// Rank of the document's highest degree.
pub fn highest_rank(entries: &[EducationEntry]) -> u8 {
    entries
        .iter()
        .map(|entry| degree_rank(&entry.degree))
        .max()
        .unwrap_or(0)
}

/// A higher degree satisfies a lower requirement. Missing or empty education fails.
pub fn matches_education(education: Option<&[EducationEntry]>, level: &EducationLevel) -> bool {
    let Some(required) = level.required_rank() else {
        return false;
    };
    match education {
        Some(entries) if !entries.is_empty() => highest_rank(entries) >= required,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees(values: &[&str]) -> Vec<EducationEntry> {
        values
            .iter()
            .map(|d| EducationEntry {
                degree: d.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_degree_ranks() {
        assert_eq!(degree_rank("PhD in Physics"), 5);
        assert_eq!(degree_rank("Doctorate of Education"), 5);
        assert_eq!(degree_rank("Master of Science"), 4);
        assert_eq!(degree_rank("Executive MBA"), 4);
        assert_eq!(degree_rank("Bachelor of Arts"), 3);
        assert_eq!(degree_rank("Associate Degree"), 2);
        assert_eq!(degree_rank("High School"), 1);
        assert_eq!(degree_rank("Technical Diploma"), 1);
        assert_eq!(degree_rank("Bootcamp certificate"), 0);
    }

    #[test]
    fn test_priority_order_prefers_higher_marker() {
        // Contains both "master" and "bachelor"
        assert_eq!(degree_rank("Integrated Bachelor and Master programme"), 4);
    }

    #[test]
    fn test_highest_entry_represents_document() {
        let entries = degrees(&["High School", "Bachelor of Science", "Associate Degree"]);
        assert_eq!(highest_rank(&entries), 3);
    }

    #[test]
    fn test_phd_satisfies_bachelor_requirement() {
        let entries = degrees(&["PhD in Physics"]);
        assert!(matches_education(Some(entries.as_slice()), &EducationLevel::Bachelor));
        assert!(matches_education(Some(entries.as_slice()), &EducationLevel::Phd));
    }

    #[test]
    fn test_associate_does_not_satisfy_master() {
        let entries = degrees(&["Associate Degree"]);
        assert!(!matches_education(Some(entries.as_slice()), &EducationLevel::Master));
    }

    #[test]
    fn test_missing_or_empty_education_fails() {
        assert!(!matches_education(None, &EducationLevel::HighSchool));
        let none: &[EducationEntry] = &[];
        assert!(!matches_education(Some(none), &EducationLevel::HighSchool));
    }

    #[test]
    fn test_unrecognized_level_matches_nothing() {
        let entries = degrees(&["PhD"]);
        let level = EducationLevel::Unrecognized("postdoc".to_string());
        assert!(!matches_education(Some(entries.as_slice()), &level));
    }
}
