//! Scripted collaborators for driving the wizard without a server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use jobpost::api::{AttachmentUpload, Category, CreatedJob, JobPayload, JobRecord, Skill};
use jobpost::attachments::{AttachmentError, CandidateFile, PreviewProvider};
use jobpost::{ApiError, JobEditor, JobWizard, JobsApi, WizardConfig};

/// One recorded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Categories,
    Search { query: String, category_id: String },
    Create(JobPayload),
    Upload { entity_id: String, names: Vec<String> },
    Publish(String),
    Get(String),
    Update(String, JobPayload),
    DeleteAttachment(String),
}

/// Endpoints that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Categories,
    Search,
    Create,
    Upload,
    Publish,
    Get,
    Update,
    DeleteAttachment,
}

pub fn unreachable() -> ApiError {
    ApiError::Network("connection refused".to_string())
}

pub fn rejected(status: u16, message: &str, details: &[(&str, &str)]) -> ApiError {
    ApiError::Rejected {
        status,
        message: message.to_string(),
        details: details
            .iter()
            .map(|(f, m)| (f.to_string(), m.to_string()))
            .collect(),
    }
}

fn clone_error(err: &ApiError) -> ApiError {
    match err {
        ApiError::Network(m) => ApiError::Network(m.clone()),
        ApiError::Rejected {
            status,
            message,
            details,
        } => ApiError::Rejected {
            status: *status,
            message: message.clone(),
            details: details.clone(),
        },
        other => ApiError::Decode(other.to_string()),
    }
}

pub struct ScriptedApi {
    pub created_id: Mutex<Option<String>>,
    pub job: Mutex<Option<JobRecord>>,
    skills: Vec<Skill>,
    failures: Mutex<HashMap<Endpoint, ApiError>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created_id: Mutex::new(Some("job-42".to_string())),
            job: Mutex::new(None),
            skills: ["React", "Redux", "Rust", "Ruby", "Svelte"]
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
            failures: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn fail(&self, endpoint: Endpoint, error: ApiError) {
        self.failures.lock().unwrap().insert(endpoint, error);
    }

    pub fn with_job(self: Arc<Self>, job: JobRecord) -> Arc<Self> {
        *self.job.lock().unwrap() = Some(job);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Request) -> bool) -> usize {
        self.requests().iter().filter(|r| pred(r)).count()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Search { query, .. } => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, endpoint: Endpoint, request: Request) -> Result<(), ApiError> {
        self.requests.lock().unwrap().push(request);
        match self.failures.lock().unwrap().get(&endpoint) {
            Some(err) => Err(clone_error(err)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl JobsApi for ScriptedApi {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.record(Endpoint::Categories, Request::Categories)?;
        Ok(vec![
            Category {
                id: "cat-1".to_string(),
                name: "Web Development".to_string(),
                slug: "web-development".to_string(),
                parent_id: None,
            },
            Category {
                id: "cat-2".to_string(),
                name: "Design".to_string(),
                slug: "design".to_string(),
                parent_id: None,
            },
        ])
    }

    async fn search_skills(&self, query: &str, category_id: &str) -> Result<Vec<Skill>, ApiError> {
        self.record(
            Endpoint::Search,
            Request::Search {
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

    async fn create_job(&self, payload: &JobPayload) -> Result<CreatedJob, ApiError> {
        self.record(Endpoint::Create, Request::Create(payload.clone()))?;
        Ok(CreatedJob {
            id: self.created_id.lock().unwrap().clone(),
        })
    }

    async fn upload_attachments(&self, upload: &AttachmentUpload) -> Result<(), ApiError> {
        self.record(
            Endpoint::Upload,
            Request::Upload {
                entity_id: upload.entity_id.clone(),
                names: upload.files.iter().map(|f| f.name.clone()).collect(),
            },
        )
    }

    async fn publish_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.record(Endpoint::Publish, Request::Publish(job_id.to_string()))
    }

    async fn get_job(&self, job_id: &str) -> Result<JobRecord, ApiError> {
        self.record(Endpoint::Get, Request::Get(job_id.to_string()))?;
        self.job
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| rejected(404, "", &[]))
    }

    async fn update_job(&self, job_id: &str, payload: &JobPayload) -> Result<(), ApiError> {
        self.record(
            Endpoint::Update,
            Request::Update(job_id.to_string(), payload.clone()),
        )
    }

    async fn delete_attachment(&self, attachment_id: &str) -> Result<(), ApiError> {
        self.record(
            Endpoint::DeleteAttachment,
            Request::DeleteAttachment(attachment_id.to_string()),
        )
    }
}

/// Counts previews without touching the filesystem.
#[derive(Default)]
pub struct RecordingPreviews {
    created: Mutex<Vec<String>>,
    released: Mutex<Vec<String>>,
}

impl RecordingPreviews {
    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    /// Previews created but not yet released.
    pub fn live(&self) -> usize {
        self.created() - self.released.lock().unwrap().len()
    }
}

impl PreviewProvider for RecordingPreviews {
    fn create(&self, id: &str, _file: &CandidateFile) -> Result<String, AttachmentError> {
        let reference = format!("preview://{id}");
        self.created.lock().unwrap().push(reference.clone());
        Ok(reference)
    }

    fn release(&self, reference: &str) {
        self.released.lock().unwrap().push(reference.to_string());
    }
}

pub fn wizard(api: &Arc<ScriptedApi>) -> (JobWizard, Arc<RecordingPreviews>) {
    let previews = Arc::new(RecordingPreviews::default());
    let wizard = JobWizard::with_previews(
        api.clone(),
        &WizardConfig::default(),
        previews.clone(),
    );
    (wizard, previews)
}

pub async fn editor(api: &Arc<ScriptedApi>, job_id: &str) -> (JobEditor, Arc<RecordingPreviews>) {
    let previews = Arc::new(RecordingPreviews::default());
    let editor = JobEditor::load(
        api.clone(),
        job_id,
        &WizardConfig::default(),
        previews.clone(),
    )
    .await;
    (editor, previews)
}
