//! Location Text Matcher — pass/fail only, no score contribution.

use crate::models::document::CvAnalysis;

/// `location` must already be lower-cased. Searches the summary, each
/// experience entry's company and description, and each education entry's
/// institution; the first hit wins.
pub fn matches_location(analysis: &CvAnalysis, location: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(location);

    if hit(&analysis.summary) {
        return true;
    }

    let in_experience = analysis
        .experience
        .iter()
        .flatten()
        .any(|entry| hit(&entry.description) || hit(&entry.company));
    if in_experience {
        return true;
    }

    analysis
        .education
        .iter()
        .flatten()
        .any(|entry| hit(&entry.institution))
}
