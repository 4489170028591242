use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// Sentinel used by the analysis pipeline for an ongoing position.
pub const PRESENT: &str = "Present";

/// A single work-history entry extracted from a CV.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub position: String,
    /// "YYYY-MM"
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    /// "YYYY-MM" or [`PRESENT`]
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    /// Free text; may embed level keywords ("MSc", "Bachelor of Arts", ...).
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub field: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
}

/// Structured payload written once by the analysis pipeline.
///
/// `skills`, `experience` and `education` are optional because the pipeline
/// may omit a section entirely; an omitted section is not the same as an
/// empty one for the predicates that read it.
///
/// Decoding is field-by-field lenient: a wrongly typed field degrades to its
/// empty value instead of rejecting the whole payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CvAnalysis {
    #[serde(
        default,
        deserialize_with = "lenient_skills",
        skip_serializing_if = "Option::is_none"
    )]
    pub skills: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_entries",
        skip_serializing_if = "Option::is_none"
    )]
    pub experience: Option<Vec<ExperienceEntry>>,
    #[serde(
        default,
        deserialize_with = "lenient_entries",
        skip_serializing_if = "Option::is_none"
    )]
    pub education: Option<Vec<EducationEntry>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(
        default,
        deserialize_with = "lenient_embeddings",
        skip_serializing_if = "Option::is_none"
    )]
    pub embeddings: Option<Vec<f32>>,
}

/// Strings pass through, numbers and booleans are stringified, anything else
/// (null, arrays, objects) becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Non-string skills are dropped (numbers are kept as text). A section that
/// is not a list counts as missing.
fn lenient_skills<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let skills = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();
    Ok(Some(skills))
}

/// Entries that are not objects are skipped. A section that is not a list
/// counts as missing.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let entries = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    Ok(Some(entries))
}

/// All-or-nothing: one non-numeric element drops the vector.
fn lenient_embeddings<'de, D>(deserializer: D) -> Result<Option<Vec<f32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(items
        .iter()
        .map(|item| item.as_f64().map(|v| v as f32))
        .collect())
}

/// One uploaded CV plus its analysis, if the analysis has completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzedDocument {
    pub id: Uuid,
    pub owner_id: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub analysis: Option<CvAnalysis>,
}

/// Raw `cv_documents` row. `analysis` is stored as JSONB and decoded lazily.
#[derive(Debug, Clone, FromRow)]
pub struct CvDocumentRow {
    pub id: Uuid,
    pub owner_id: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub analysis: Option<Value>,
}

impl From<CvDocumentRow> for AnalyzedDocument {
    fn from(row: CvDocumentRow) -> Self {
        let analysis = match row.analysis {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<CvAnalysis>(value) {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    warn!("Document {} has an undecodable analysis payload: {e}", row.id);
                    None
                }
            },
        };

        AnalyzedDocument {
            id: row.id,
            owner_id: row.owner_id,
            file_name: row.file_name,
            uploaded_at: row.uploaded_at,
            analysis,
        }
    }
}
