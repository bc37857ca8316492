use std::path::{Path, PathBuf};

use log::debug;

use crate::config::schema::WizardConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/wizard-config-v1.json");

pub const API_URL_ENV_VAR: &str = "JOBPOST_API_URL";
pub const LOG_ENV_VAR: &str = "JOBPOST_LOG";

/// Loads and validates a config file. `.yaml`/`.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WizardConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    debug!(
        "Loading config from {}",
        crate::sanitize::redact_path(path)
    );

    if is_yaml {
        load_config_from_yaml(&content)
    } else {
        load_config_from_str(&content)
    }
}

pub fn load_config_from_str(content: &str) -> Result<WizardConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;
    load_config_from_value(json_value)
}

pub fn load_config_from_yaml(content: &str) -> Result<WizardConfig, ConfigError> {
    let json_value: serde_json::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml(e.to_string()))?;
    load_config_from_value(json_value)
}

fn load_config_from_value(json_value: serde_json::Value) -> Result<WizardConfig, ConfigError> {
    validate_schema(&json_value)?;

    let config: WizardConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// `<platform config dir>/jobpost/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jobpost").join("config.json"))
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

pub(crate) fn validate_config(config: &WizardConfig) -> Result<(), ConfigError> {
    let url = config.api_base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            message: format!("apiBaseUrl must be an http(s) URL, got '{}'", url),
        });
    }

    if config.request_timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "Timeouts must be at least one second".to_string(),
        });
    }

    let search = &config.skill_search;
    if search.max_skills == 0 || search.max_results == 0 || search.min_query_len == 0 {
        return Err(ConfigError::Validation {
            message: "skillSearch limits must be positive".to_string(),
        });
    }

    let attachments = &config.attachments;
    if attachments.max_files == 0 || attachments.max_file_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "attachments limits must be positive".to_string(),
        });
    }
    if attachments.allowed_mime.iter().all(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "attachments.allowedMime must list at least one type".to_string(),
        });
    }

    Ok(())
}

impl WizardConfig {
    /// Applies `JOBPOST_API_URL` and `JOBPOST_LOG` overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(level) = std::env::var(LOG_ENV_VAR) {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_string();
            }
        }
    }

    /// Loads the file at `path` (or the default location when it exists),
    /// falling back to defaults, then applies environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<WizardConfig, ConfigError> {
        let mut config = match path {
            Some(path) => load_config(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default) => load_config(default)?,
                None => WizardConfig::default(),
            },
        };
        config.apply_env();
        validate_config(&config)?;
        Ok(config)
    }
}
