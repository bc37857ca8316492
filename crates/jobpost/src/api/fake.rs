//! Scripted in-memory [`JobsApi`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::{ApiError, Result};
use super::types::{AttachmentUpload, Category, CreatedJob, JobPayload, JobRecord, Skill};
use super::JobsApi;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListCategories,
    SearchSkills { query: String, category_id: String },
    CreateJob(JobPayload),
    Upload { entity_id: String, files: Vec<String> },
    Publish(String),
    GetJob(String),
    UpdateJob(String, JobPayload),
    DeleteAttachment(String),
}

#[derive(Debug, Clone)]
pub(crate) enum Failure {
    Network,
    /// The call panics instead of returning.
    Panic,
    Rejected {
        status: u16,
        message: String,
        details: Vec<(String, String)>,
    },
}

impl Failure {
    pub fn validation(details: &[(&str, &str)]) -> Self {
        Failure::Rejected {
            status: 422,
            message: "Validation failed".to_string(),
            details: details
                .iter()
                .map(|(f, m)| (f.to_string(), m.to_string()))
                .collect(),
        }
    }

    fn to_error(&self) -> ApiError {
        match self {
            Failure::Network => ApiError::Network("connection refused".to_string()),
            Failure::Panic => panic!("scripted panic"),
            Failure::Rejected {
                status,
                message,
                details,
            } => ApiError::Rejected {
                status: *status,
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

pub(crate) struct FakeApi {
    pub categories: Vec<Category>,
    pub skills: Vec<Skill>,
    pub created_id: Option<String>,
    pub job: Option<JobRecord>,
    failures: Mutex<HashMap<&'static str, Failure>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            categories: vec![Category {
                id: "cat-1".to_string(),
                name: "Web Development".to_string(),
                slug: "web-development".to_string(),
                parent_id: None,
            }],
            skills: ["React", "Redux", "Rust", "Ruby", "TypeScript"]
                .iter()
                .enumerate()
                .map(|(i, name)| Skill {
                    id: format!("s{}", i + 1),
                    name: name.to_string(),
                    slug: name.to_lowercase(),
                    icon: None,
                    category_name: Some("Web Development".to_string()),
                })
                .collect(),
            created_id: Some("job-42".to_string()),
            job: None,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(&self, endpoint: &'static str, failure: Failure) {
        self.failures
            .lock()
            .unwrap()
            .insert(endpoint, failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SearchSkills { query, .. } => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, endpoint: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        let failure = self.failures.lock().unwrap().get(endpoint).cloned();
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl JobsApi for FakeApi {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.record("categories", Call::ListCategories)?;
        Ok(self.categories.clone())
    }

    async fn search_skills(&self, query: &str, category_id: &str) -> Result<Vec<Skill>> {
        self.record(
            "search",
            Call::SearchSkills {
                query: query.to_string(),
                category_id: category_id.to_string(),
            },
        )?;
        let needle = query.to_lowercase();
        Ok(self
            .skills
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create_job(&self, payload: &JobPayload) -> Result<CreatedJob> {
        self.record("create", Call::CreateJob(payload.clone()))?;
        Ok(CreatedJob {
            id: self.created_id.clone(),
        })
    }

    async fn upload_attachments(&self, upload: &AttachmentUpload) -> Result<()> {
        self.record(
            "upload",
            Call::Upload {
                entity_id: upload.entity_id.clone(),
                files: upload.files.iter().map(|f| f.name.clone()).collect(),
            },
        )
    }

    async fn publish_job(&self, job_id: &str) -> Result<()> {
        self.record("publish", Call::Publish(job_id.to_string()))
    }

    async fn get_job(&self, job_id: &str) -> Result<JobRecord> {
        self.record("get", Call::GetJob(job_id.to_string()))?;
        self.job
            .clone()
            .ok_or_else(|| ApiError::Decode("no job scripted".to_string()))
    }

    async fn update_job(&self, job_id: &str, payload: &JobPayload) -> Result<()> {
        self.record("update", Call::UpdateJob(job_id.to_string(), payload.clone()))
    }

    async fn delete_attachment(&self, attachment_id: &str) -> Result<()> {
        self.record("delete", Call::DeleteAttachment(attachment_id.to_string()))
    }
}
