//! Wire types exchanged with the jobs REST API.

use std::path::PathBuf;

use serde::{Deserialize, Serialize, Serializer};

use crate::form::{BudgetType, ExperienceLevel, Visibility};

/// A job category as listed by `GET /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// A skill as returned by `GET /skills/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Body of `POST /jobs` and `PATCH /jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPayload {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub budget_type: BudgetType,
    #[serde(serialize_with = "serialize_amount")]
    pub budget_min: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub budget_max: f64,
    pub currency: String,
    pub experience_level: ExperienceLevel,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skill_ids: Vec<String>,
}

/// Whole amounts go out as integers (`500`, not `500.0`).
fn serialize_amount<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// `data` object of a successful `POST /jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedJob {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
}

/// Ids may arrive as strings or numbers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A job as returned by `GET /jobs/{id}`.
///
/// Numeric columns are kept as raw JSON since the server may render decimals as
/// strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub budget_type: Option<String>,
    #[serde(default)]
    pub budget_min: Option<serde_json::Value>,
    #[serde(default)]
    pub budget_max: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub estimated_duration: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub attachments: Vec<ExistingAttachment>,
}

/// An attachment already stored server-side for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingAttachment {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: String,
}

/// One file of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
}

/// `POST /attachments/upload`: every file tagged with the owning entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub entity_type: String,
    pub entity_id: String,
    pub files: Vec<UploadFile>,
}

impl AttachmentUpload {
    pub fn for_job(job_id: &str, files: Vec<UploadFile>) -> Self {
        Self {
            entity_type: "job".to_string(),
            entity_id: job_id.to_string(),
            files,
        }
    }
}

/// `{ "data": ... }` envelope used by every endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub data: Option<T>,
}

/// Error body: `{ "error": "...", "message": "...", "details": { field: msg } }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorBody {
    pub fn summary(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }

    /// Field messages in the order the server listed them.
    pub fn field_details(&self) -> Vec<(String, String)> {
        let Some(details) = &self.details else {
            return Vec::new();
        };
        details
            .iter()
            .map(|(field, value)| (field.clone(), detail_message(value)))
            .collect()
    }
}

fn detail_message(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items.first().map(detail_message).unwrap_or_default(),
        other => other.to_string(),
    }
}
