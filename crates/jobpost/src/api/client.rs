//! reqwest implementation of [`JobsApi`].

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use super::error::{ApiError, Result};
use super::types::{
    AttachmentUpload, Category, CreatedJob, Envelope, ErrorBody, JobPayload, JobRecord, Skill,
};
use super::{JobsApi, MIN_SKILL_QUERY_CHARS};
use crate::config::WizardConfig;
use crate::sanitize;

/// HTTP client for the jobs REST API.
///
/// The bearer token is optional: without one, requests go out unauthenticated
/// (enough for the public catalogue endpoints).
pub struct HttpJobsApi {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl std::fmt::Debug for HttpJobsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpJobsApi")
            .field("base_url", &self.base_url)
            .field("token", &self.token_hint())
            .finish()
    }
}

impl HttpJobsApi {
    pub fn new(config: &WizardConfig, token: Option<SecretString>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        let api = Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
        };
        debug!("Jobs API at {} (token: {})", api.base_url, api.token_hint());
        Ok(api)
    }

    fn token_hint(&self) -> String {
        match &self.token {
            Some(token) => sanitize::mask_token(token.expose_secret()),
            None => "none".to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(rejection(response).await)
        }
    }

    async fn data<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

async fn rejection(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    debug!(
        "Request rejected ({}): {}",
        status,
        sanitize::truncate_for_log(&text)
    );
    ApiError::Rejected {
        status,
        message: body.summary(),
        details: body.field_details(),
    }
}

async fn multipart_form(upload: &AttachmentUpload) -> Result<Form> {
    let mut form = Form::new()
        .text("entity_type", upload.entity_type.clone())
        .text("entity_id", upload.entity_id.clone());

    for file in &upload.files {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| ApiError::ReadAttachment {
                path: file.path.clone(),
                source: e,
            })?;
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|e| ApiError::Client(format!("Invalid MIME type '{}': {}", file.mime, e)))?;
        form = form.part("files[]", part);
    }

    Ok(form)
}

#[async_trait]
impl JobsApi for HttpJobsApi {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let response = self.send(self.client.get(self.url("categories"))).await?;
        Ok(Self::data(response).await?.unwrap_or_default())
    }

    async fn search_skills(&self, query: &str, category_id: &str) -> Result<Vec<Skill>> {
        if query.trim().chars().count() < MIN_SKILL_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let mut params = vec![("q", query)];
        if !category_id.is_empty() {
            params.push(("category_id", category_id));
        }

        let request = self.client.get(self.url("skills/search")).query(&params);
        let response = self.send(request).await?;
        Ok(Self::data(response).await?.unwrap_or_default())
    }

    async fn create_job(&self, payload: &JobPayload) -> Result<CreatedJob> {
        let request = self.client.post(self.url("jobs")).json(payload);
        let response = self.send(request).await?;
        let created: Option<CreatedJob> = Self::data(response).await?;
        Ok(created.unwrap_or_default())
    }

    async fn upload_attachments(&self, upload: &AttachmentUpload) -> Result<()> {
        let form = multipart_form(upload).await?;
        let request = self
            .client
            .post(self.url("attachments/upload"))
            .multipart(form);
        self.send(request).await?;
        info!(
            "Uploaded {} attachment(s) for {} {}",
            upload.files.len(),
            upload.entity_type,
            upload.entity_id
        );
        Ok(())
    }

    async fn publish_job(&self, job_id: &str) -> Result<()> {
        let request = self.client.post(self.url(&format!("jobs/{}/publish", job_id)));
        self.send(request).await?;
        Ok(())
    }

    async fn get_job(&self, job_id: &str) -> Result<JobRecord> {
        let response = self
            .send(self.client.get(self.url(&format!("jobs/{}", job_id))))
            .await?;
        Self::data(response)
            .await?
            .ok_or_else(|| ApiError::Decode(format!("Job {} response has no data", job_id)))
    }

    async fn update_job(&self, job_id: &str, payload: &JobPayload) -> Result<()> {
        // The update endpoint names the duration column directly.
        let mut body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        if let Some(object) = body.as_object_mut() {
            if let Some(weeks) = object.remove("duration_weeks") {
                object.insert("estimated_duration".to_string(), weeks);
            }
        }

        let request = self
            .client
            .patch(self.url(&format!("jobs/{}", job_id)))
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_attachment(&self, attachment_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("attachments/{}", attachment_id)));
        self.send(request).await?;
        Ok(())
    }
}
