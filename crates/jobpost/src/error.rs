use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;
use crate::attachments::AttachmentError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum JobpostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Telemetry setup failed: {0}")]
    Telemetry(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(String),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

pub type Result<T> = std::result::Result<T, JobpostError>;
