// CV search: criteria normalization, predicate evaluation, score blending.
// The engine only reads documents; the analysis pipeline that writes them lives elsewhere.

pub mod blend;
pub mod criteria;
pub mod education;
pub mod engine;
pub mod experience;
pub mod handlers;
pub mod keywords;
pub mod location;
pub mod similarity;

#[cfg(test)]
pub mod test_support;
