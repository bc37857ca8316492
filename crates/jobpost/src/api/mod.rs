//! The seam between the workflow and the jobs REST server.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

use async_trait::async_trait;

pub use client::HttpJobsApi;
pub use error::{ApiError, Result};
pub use types::{
    AttachmentUpload, Category, CreatedJob, ExistingAttachment, JobPayload, JobRecord, Skill,
    UploadFile,
};

/// Shortest skill query that is ever sent to the server.
pub const MIN_SKILL_QUERY_CHARS: usize = 2;

/// Remote operations the workflow depends on.
///
/// [`HttpJobsApi`] is the production implementation; tests substitute scripted
/// fakes.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// `GET /categories`
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// `GET /skills/search?q=&category_id=`
    async fn search_skills(&self, query: &str, category_id: &str) -> Result<Vec<Skill>>;

    /// `POST /jobs`, creating a draft.
    async fn create_job(&self, payload: &JobPayload) -> Result<CreatedJob>;

    /// `POST /attachments/upload` (multipart).
    async fn upload_attachments(&self, upload: &AttachmentUpload) -> Result<()>;

    /// `POST /jobs/{id}/publish`
    async fn publish_job(&self, job_id: &str) -> Result<()>;

    /// `GET /jobs/{id}`
    async fn get_job(&self, job_id: &str) -> Result<JobRecord>;

    /// `PATCH /jobs/{id}`
    async fn update_job(&self, job_id: &str, payload: &JobPayload) -> Result<()>;

    /// `DELETE /attachments/{id}`
    async fn delete_attachment(&self, attachment_id: &str) -> Result<()>;
}
