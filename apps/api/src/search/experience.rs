//! Experience-Years Bucketer.

use chrono::{Datelike, NaiveDate};

use crate::models::document::{ExperienceEntry, PRESENT};
use crate::search::criteria::ExperienceBucket;

const DEFAULT_START_MONTH: i32 = 1;
const DEFAULT_END_MONTH: i32 = 12;
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2999;

/// Sums the duration of every entry in fractional years.
///
/// `end_date == "Present"` resolves to `as_of`. Entries with an unparseable
/// year contribute nothing; reversed ranges are clamped to zero.
pub fn total_years(entries: &[ExperienceEntry], as_of: NaiveDate) -> f64 {
    entries
        .iter()
        .map(|entry| entry_years(entry, as_of))
        .sum()
}

fn entry_years(entry: &ExperienceEntry, as_of: NaiveDate) -> f64 {
    let Some((start_year, start_month)) = parse_year_month(&entry.start_date, DEFAULT_START_MONTH)
    else {
        return 0.0;
    };

    let end = if entry.end_date.trim().eq_ignore_ascii_case(PRESENT) {
        Some((as_of.year(), as_of.month() as i32))
    } else {
        parse_year_month(&entry.end_date, DEFAULT_END_MONTH)
    };
    let Some((end_year, end_month)) = end else {
        return 0.0;
    };

    let years = (end_year as f64 - start_year as f64)
        + (end_month as f64 - start_month as f64) / 12.0;
    years.max(0.0)
}

/// Parses "YYYY-MM" (or bare "YYYY"). A missing, non-numeric or out-of-range
/// month falls back to `default_month`; a year outside `YEAR_RANGE` yields `None`.
fn parse_year_month(value: &str, default_month: i32) -> Option<(i32, i32)> {
    let mut parts = value.trim().splitn(2, '-');
    let year = parts
        .next()?
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|y| YEAR_RANGE.contains(y))?;
    let month = parts
        .next()
        .and_then(|m| m.trim().parse::<i32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(default_month);
    Some((year, month))
}

/// Bucket edges are inclusive on both sides, so exactly 1, 3, 5 and 10 years
/// fall into two adjacent buckets.
pub fn in_bucket(total: f64, bucket: &ExperienceBucket) -> bool {
    match bucket {
        ExperienceBucket::UnderOne => total < 1.0,
        ExperienceBucket::OneToThree => (1.0..=3.0).contains(&total),
        ExperienceBucket::ThreeToFive => (3.0..=5.0).contains(&total),
        ExperienceBucket::FiveToTen => (5.0..=10.0).contains(&total),
        ExperienceBucket::OverTen => total > 10.0,
        ExperienceBucket::Unrecognized(_) => false,
    }
}

/// Passes when the document's total experience falls in `bucket`.
/// A document without an experience section fails.
pub fn matches_experience(
    experience: Option<&[ExperienceEntry]>,
    bucket: &ExperienceBucket,
    as_of: NaiveDate,
) -> bool {
    match experience {
        Some(entries) => in_bucket(total_years(entries, as_of), bucket),
        None => false,
    }
}
