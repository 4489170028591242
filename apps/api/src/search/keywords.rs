//! Skill/Keyword Matcher.
//!
//! A keyword hits a skill when the lower-cased skill *contains* it, so short
//! keywords are permissive ("go" also hits "good communication"). The gate is
//! any-match: one hit is enough to pass, the rest only lower the score.

/// Outcome of matching requested keywords against a document's skills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordMatch {
    pub matching_count: usize,
    /// `matching_count / total * 100`
    pub raw_score: f64,
}

impl KeywordMatch {
    pub fn passed(&self) -> bool {
        self.matching_count > 0
    }
}

/// `keywords` must already be normalized (lower-cased, non-empty, distinct).
/// Returns `None` when the document has no skills list at all.
pub fn match_keywords(skills: Option<&[String]>, keywords: &[String]) -> Option<KeywordMatch> {
    let skills: Vec<String> = skills?.iter().map(|s| s.to_lowercase()).collect();

    let matching_count = keywords
        .iter()
        .filter(|keyword| skills.iter().any(|skill| skill.contains(keyword.as_str())))
        .count();

    let total = keywords.len();
    let raw_score = if total == 0 {
        0.0
    } else {
        matching_count as f64 / total as f64 * 100.0
    };

    Some(KeywordMatch {
        matching_count,
        raw_score,
    })
}
