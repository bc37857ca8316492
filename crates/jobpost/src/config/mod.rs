pub mod loader;
pub mod schema;

pub use loader::{
    default_config_path, load_config, load_config_from_str, load_config_from_yaml,
    API_URL_ENV_VAR, LOG_ENV_VAR,
};
pub use schema::{
    AttachmentConfig, LogFormat, SkillSearchConfig, WizardConfig, DEFAULT_ALLOWED_MIME,
    DEFAULT_API_BASE_URL,
};
