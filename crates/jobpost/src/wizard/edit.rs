//! Editing an existing draft.
//!
//! Same store, validator and collectors as the wizard, without the stepper:
//! the whole form is validated on save.

use std::sync::Arc;

use log::{info, warn};
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::submit::{build_payload, classify, spawn_upload, Classified};
use crate::api::{ApiError, ExistingAttachment, JobRecord, JobsApi, Skill};
use crate::attachments::{
    AttachmentLimits, AttachmentStager, CandidateFile, PreviewProvider, StageReport,
};
use crate::config::WizardConfig;
use crate::form::{BudgetType, ExperienceLevel, Field, FieldErrors, FormState, FormStore, Visibility};
use crate::skills::{SelectedSkill, SkillPicker, SkillSearch};
use crate::validate::validate_all;

pub const LOAD_FAILED_BANNER: &str = "Failed to load job";
pub const NOT_FOUND_BANNER: &str = "Job not found";
pub const UPDATE_FAILED_BANNER: &str = "Failed to update job.";
pub const DELETE_FAILED_BANNER: &str = "Failed to delete attachment";
pub const SAVED_MESSAGE: &str = "Job updated successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { message: String },
    Invalid { errors: FieldErrors },
    Rejected { errors: FieldErrors },
    Failed { banner: String },
}

pub struct JobEditor {
    api: Arc<dyn JobsApi>,
    job_id: String,
    default_currency: String,
    store: FormStore,
    skills: SkillSearch,
    existing: Vec<ExistingAttachment>,
    new_files: AttachmentStager,
    status: Option<String>,
    loaded: bool,
    upload: Option<JoinHandle<bool>>,
}

impl JobEditor {
    pub fn new(
        api: Arc<dyn JobsApi>,
        job_id: impl Into<String>,
        config: &WizardConfig,
        previews: Arc<dyn PreviewProvider>,
    ) -> Self {
        Self {
            skills: SkillSearch::from_config(Arc::clone(&api), &config.skill_search),
            api,
            job_id: job_id.into(),
            default_currency: config.default_currency.clone(),
            store: FormStore::new(FormState::with_currency(&config.default_currency)),
            existing: Vec::new(),
            new_files: AttachmentStager::new(AttachmentLimits::from(&config.attachments), previews),
            status: None,
            loaded: false,
            upload: None,
        }
    }

    /// Creates an editor and fetches the job. Check [`is_loaded`](Self::is_loaded)
    /// and [`banner`](Self::banner) for the result.
    pub async fn load(
        api: Arc<dyn JobsApi>,
        job_id: impl Into<String>,
        config: &WizardConfig,
        previews: Arc<dyn PreviewProvider>,
    ) -> Self {
        let mut editor = Self::new(api, job_id, config, previews);
        editor.reload().await;
        editor
    }

    pub async fn reload(&mut self) -> bool {
        let api = Arc::clone(&self.api);
        match api.get_job(&self.job_id).await {
            Ok(record) => {
                self.apply_record(record);
                self.loaded = true;
                true
            }
            Err(e) => {
                warn!("Failed to load job {}: {}", self.job_id, e);
                let banner = match &e {
                    ApiError::Rejected { message, .. } if !message.trim().is_empty() => {
                        message.clone()
                    }
                    ApiError::Rejected { .. } => NOT_FOUND_BANNER.to_string(),
                    _ => LOAD_FAILED_BANNER.to_string(),
                };
                self.store.set_banner(banner);
                false
            }
        }
    }

    fn apply_record(&mut self, record: JobRecord) {
        let state = form_from_record(&record, &self.default_currency);
        self.skills.set_category(&state.category_id);
        self.skills
            .preselect(record.skills.iter().map(SelectedSkill::from));
        self.store.replace_state(state);
        self.existing = record.attachments;
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn form(&self) -> &FormState {
        self.store.state()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.store.errors()
    }

    pub fn banner(&self) -> Option<&str> {
        self.store.banner()
    }

    pub fn dismiss_banner(&mut self) {
        self.store.dismiss_banner();
    }

    /// Transient confirmation after a successful save.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn skills(&self) -> &SkillPicker {
        self.skills.picker()
    }

    pub fn existing_attachments(&self) -> &[ExistingAttachment] {
        &self.existing
    }

    pub fn new_attachments(&self) -> &AttachmentStager {
        &self.new_files
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if field == Field::CategoryId {
            self.skills.set_category(&value);
        }
        self.store.set(field, value);
        self.status = None;
    }

    pub fn set_skill_query(&mut self, query: impl Into<String>) {
        self.skills.set_query(query);
    }

    pub async fn await_skill_results(&mut self) -> bool {
        self.skills.await_results().await
    }

    pub fn add_skill(&mut self, skill: &Skill) -> bool {
        self.skills.add(skill)
    }

    pub fn remove_skill(&mut self, skill_id: &str) -> bool {
        self.skills.remove(skill_id)
    }

    /// The count cap applies to newly staged files only.
    pub fn stage_files(&mut self, files: impl IntoIterator<Item = CandidateFile>) -> StageReport {
        self.new_files.stage(files)
    }

    pub fn remove_new_file(&mut self, id: &str) -> bool {
        self.new_files.remove(id)
    }

    pub async fn save(&mut self) -> SaveOutcome {
        if !self.loaded {
            self.store.set_banner(LOAD_FAILED_BANNER);
            return SaveOutcome::Failed {
                banner: LOAD_FAILED_BANNER.to_string(),
            };
        }

        self.status = None;
        self.store.dismiss_banner();

        let errors = validate_all(self.store.state());
        if !errors.is_empty() {
            self.store.replace_errors(errors.clone());
            return SaveOutcome::Invalid { errors };
        }
        self.store.replace_errors(FieldErrors::new());

        let payload = build_payload(self.store.state(), self.skills.picker().skill_ids());
        let span = tracing::info_span!("update_job", job_id = %self.job_id);
        let api = Arc::clone(&self.api);

        match api.update_job(&self.job_id, &payload).instrument(span).await {
            Ok(()) => {
                info!("Updated job {}", self.job_id);
                if !self.new_files.is_empty() {
                    let staged = self.new_files.take_all();
                    self.upload = Some(spawn_upload(Arc::clone(&self.api), &self.job_id, staged));
                }
                self.status = Some(SAVED_MESSAGE.to_string());
                SaveOutcome::Saved {
                    message: SAVED_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                warn!("Failed to update job {}: {}", self.job_id, e);
                match classify(&e, UPDATE_FAILED_BANNER) {
                    Classified::Fields { errors, .. } => {
                        self.store.replace_errors(errors.clone());
                        SaveOutcome::Rejected { errors }
                    }
                    Classified::Banner(banner) => {
                        self.store.set_banner(banner.clone());
                        SaveOutcome::Failed { banner }
                    }
                }
            }
        }
    }

    pub async fn settle_upload(&mut self) -> Option<bool> {
        let handle = self.upload.take()?;
        Some(handle.await.unwrap_or(false))
    }

    /// Deletes a stored attachment. Ids not attached to this job are ignored.
    pub async fn delete_attachment(&mut self, attachment_id: &str) -> bool {
        if !self.existing.iter().any(|a| a.id == attachment_id) {
            return false;
        }
        let api = Arc::clone(&self.api);
        match api.delete_attachment(attachment_id).await {
            Ok(()) => {
                self.existing.retain(|a| a.id != attachment_id);
                true
            }
            Err(e) => {
                warn!("Failed to delete attachment {}: {}", attachment_id, e);
                self.store.set_banner(DELETE_FAILED_BANNER);
                false
            }
        }
    }
}

/// Renders a stored job back into raw form values.
pub fn form_from_record(record: &JobRecord, default_currency: &str) -> FormState {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let or_default = |value: &Option<String>, default: &str| {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default)
            .to_string()
    };

    FormState {
        title: text(&record.title),
        description: text(&record.description),
        category_id: text(&record.category_id),
        budget_type: or_default(&record.budget_type, BudgetType::default().as_str()),
        budget_min: json_to_input(record.budget_min.as_ref()),
        budget_max: json_to_input(record.budget_max.as_ref()),
        currency: or_default(&record.currency, default_currency),
        experience_level: or_default(
            &record.experience_level,
            ExperienceLevel::default().as_str(),
        ),
        duration_weeks: match json_to_input(record.estimated_duration.as_ref()).as_str() {
            "" | "0" => String::new(),
            other => other.to_string(),
        },
        visibility: or_default(&record.visibility, Visibility::default().as_str()),
    }
}

fn json_to_input(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
