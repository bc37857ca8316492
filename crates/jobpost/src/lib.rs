pub mod api;
pub mod attachments;
pub mod config;
pub mod error;
pub mod form;
pub mod sanitize;
pub mod secrets;
pub mod skills;
pub mod telemetry;
pub mod validate;
pub mod wizard;

pub use api::{ApiError, HttpJobsApi, JobsApi};
pub use attachments::{AttachmentStager, CandidateFile, PreviewProvider, StagedAttachment};
pub use config::{load_config, WizardConfig};
pub use error::{ConfigError, JobpostError, Result};
pub use form::{Field, FieldErrors, FormState, FormStore};
pub use secrets::{resolve_token, SecretError};
pub use skills::{SelectedSkill, SkillPicker, SkillSearch};
pub use wizard::{
    JobEditor, JobWizard, Navigation, Phase, Step, StepController, SubmitOutcome, WizardSnapshot,
};
