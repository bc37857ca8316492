//! Create → upload → publish.

use std::sync::Arc;

use log::{debug, info, warn};
use tracing::{info_span, Instrument};

use super::{JobWizard, Navigation, Phase, Step};
use crate::api::{ApiError, AttachmentUpload, CreatedJob, JobPayload};
use crate::attachments::StagedAttachment;
use crate::form::{FieldErrors, FormState};
use crate::validate::validate_all;
use crate::wizard::step::step_for_field;

pub const UNREACHABLE_BANNER: &str = "Unable to reach the server. Please check your connection.";
pub const CREATE_FAILED_BANNER: &str = "Failed to create job.";
pub const PUBLISH_FAILED_BANNER: &str = "Failed to publish. You can publish later from My Jobs.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft exists; attachments (if any) are uploading in the background.
    Created { job_id: String },
    /// Local validation failed; nothing was sent.
    Invalid { step: Step, errors: FieldErrors },
    /// The server rejected individual fields. `step` is the step owning the
    /// first of them, when known.
    Rejected {
        step: Option<Step>,
        errors: FieldErrors,
    },
    /// Anything else; the banner is set.
    Failed { banner: String },
    /// Already submitted.
    Ignored,
}

/// How a failed API call is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classified {
    Fields { errors: FieldErrors, first: String },
    Banner(String),
}

pub(crate) fn classify(err: &ApiError, fallback: &str) -> Classified {
    match err {
        ApiError::Rejected { details, .. } if err.is_field_rejection() => Classified::Fields {
            errors: details.iter().cloned().collect(),
            first: details[0].0.clone(),
        },
        ApiError::Rejected { message, .. } if !message.trim().is_empty() => {
            Classified::Banner(message.clone())
        }
        ApiError::Rejected { .. } | ApiError::ReadAttachment { .. } => {
            Classified::Banner(fallback.to_string())
        }
        ApiError::Network(_) | ApiError::Decode(_) | ApiError::Client(_) => {
            Classified::Banner(UNREACHABLE_BANNER.to_string())
        }
    }
}

/// Earliest step owning any of `errors`.
pub(crate) fn first_error_step(errors: &FieldErrors) -> Option<Step> {
    errors
        .iter()
        .filter_map(|(field, _)| step_for_field(field))
        .min()
}

/// Builds the request body from a form that passed validation.
pub fn build_payload(form: &FormState, skill_ids: Vec<String>) -> JobPayload {
    let duration_weeks = form
        .duration_weeks()
        .filter(|w| *w >= 1.0 && w.fract() == 0.0 && *w <= u32::MAX as f64)
        .map(|w| w as u32);

    JobPayload {
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        category_id: form.category_id.trim().to_string(),
        budget_type: form.budget_type().unwrap_or_default(),
        budget_min: form.budget_min().unwrap_or(0.0),
        budget_max: form.budget_max().unwrap_or(0.0),
        currency: form.currency.trim().to_string(),
        experience_level: form.experience_level().unwrap_or_default(),
        visibility: form.visibility().unwrap_or_default(),
        duration_weeks,
        skill_ids,
    }
}

/// Uploads `staged` for `job_id`. Failures are logged and reported as `false`.
/// Previews are released once the request has finished.
pub(crate) fn spawn_upload(
    api: Arc<dyn crate::api::JobsApi>,
    job_id: &str,
    staged: Vec<StagedAttachment>,
) -> tokio::task::JoinHandle<bool> {
    let upload = AttachmentUpload::for_job(
        job_id,
        staged.iter().map(StagedAttachment::to_upload).collect(),
    );
    let span = info_span!("upload_attachments", job_id = %job_id, files = upload.files.len());

    tokio::spawn(
        async move {
            let result = api.upload_attachments(&upload).await;
            drop(staged);
            match result {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "Attachment upload failed for job {}: {}",
                        upload.entity_id, e
                    );
                    false
                }
            }
        }
        .instrument(span),
    )
}

impl JobWizard {
    /// Validates everything, creates the draft and starts the attachment
    /// upload. API failures never surface as `Err`; they end up in the field
    /// errors or the banner.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.is_editing() {
            debug!("Submit ignored in phase {:?}", self.phase);
            return SubmitOutcome::Ignored;
        }

        let errors = validate_all(self.store.state());
        if !errors.is_empty() {
            let step = first_error_step(&errors).unwrap_or(self.controller.current());
            self.controller.jump_to(step);
            self.store.replace_errors(errors.clone());
            self.notify();
            return SubmitOutcome::Invalid { step, errors };
        }

        let payload = build_payload(self.store.state(), self.skills.picker().skill_ids());
        let span = info_span!(
            "submit_job",
            skills = payload.skill_ids.len(),
            attachments = self.attachments.len()
        );

        self.store.dismiss_banner();
        self.set_phase(Phase::Submitting);

        let api = Arc::clone(&self.api);
        let result = api.create_job(&payload).instrument(span).await;

        match result {
            Ok(CreatedJob { id: Some(job_id) }) => {
                info!("Created job draft {}", job_id);
                self.store.replace_errors(FieldErrors::new());
                if !self.attachments.is_empty() {
                    let staged = self.attachments.take_all();
                    self.upload = Some(spawn_upload(Arc::clone(&self.api), &job_id, staged));
                }
                self.set_phase(Phase::Created {
                    job_id: job_id.clone(),
                });
                SubmitOutcome::Created { job_id }
            }
            Ok(CreatedJob { id: None }) => {
                warn!("Create response carried no job id");
                self.fail_submit(CREATE_FAILED_BANNER)
            }
            Err(e) => {
                warn!("Failed to create job: {}", e);
                match classify(&e, CREATE_FAILED_BANNER) {
                    Classified::Fields { errors, first } => {
                        let step = self.controller.jump_to_field(&first);
                        self.store.replace_errors(errors.clone());
                        self.set_phase(Phase::Editing);
                        SubmitOutcome::Rejected { step, errors }
                    }
                    Classified::Banner(banner) => self.fail_submit(&banner),
                }
            }
        }
    }

    fn fail_submit(&mut self, banner: &str) -> SubmitOutcome {
        self.store.set_banner(banner);
        self.set_phase(Phase::Editing);
        SubmitOutcome::Failed {
            banner: banner.to_string(),
        }
    }

    pub fn created_job_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Created { job_id } | Phase::Publishing { job_id } => Some(job_id.as_str()),
            _ => None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.upload.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the background upload. `None` when there was nothing to
    /// upload, otherwise whether it succeeded.
    pub async fn settle_upload(&mut self) -> Option<bool> {
        let handle = self.upload.take()?;
        match handle.await {
            Ok(ok) => Some(ok),
            Err(e) => {
                warn!("Attachment upload task ended abnormally: {}", e);
                Some(false)
            }
        }
    }

    /// Publishes the created draft, then finishes towards the job list
    /// whatever the outcome. Calling it again returns the same target.
    pub async fn publish(&mut self) -> Option<Navigation> {
        let job_id = match &self.phase {
            Phase::Created { job_id } => job_id.clone(),
            Phase::Finished { target } => return Some(target.clone()),
            _ => return None,
        };

        self.set_phase(Phase::Publishing {
            job_id: job_id.clone(),
        });

        let span = info_span!("publish_job", job_id = %job_id);
        let api = Arc::clone(&self.api);
        match api.publish_job(&job_id).instrument(span).await {
            Ok(()) => info!("Published job {}", job_id),
            Err(e) => {
                warn!("Failed to publish job {}: {}", job_id, e);
                self.store.set_banner(PUBLISH_FAILED_BANNER);
            }
        }

        let target = Navigation::MyJobs;
        self.set_phase(Phase::Finished {
            target: target.clone(),
        });
        Some(target)
    }

    /// Leaves the draft unpublished and finishes towards its management page.
    pub fn review_later(&mut self) -> Option<Navigation> {
        let job_id = match &self.phase {
            Phase::Created { job_id } => job_id.clone(),
            Phase::Finished { target } => return Some(target.clone()),
            _ => return None,
        };
        let target = Navigation::Job { id: job_id };
        self.set_phase(Phase::Finished {
            target: target.clone(),
        });
        Some(target)
    }
}
