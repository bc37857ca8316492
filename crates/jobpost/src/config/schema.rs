use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8086/api/v1";

/// MIME types a job may carry as attachments.
pub const DEFAULT_ALLOWED_MIME: [&str; 13] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.oasis.opendocument.text",
    "application/rtf",
    "text/plain",
    "text/csv",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub skill_search: SkillSearchConfig,
    #[serde(default)]
    pub attachments: AttachmentConfig,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            skill_search: SkillSearchConfig::default(),
            attachments: AttachmentConfig::default(),
            default_currency: default_currency(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_skills")]
    pub max_skills: usize,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

fn default_max_results() -> usize {
    20
}

fn default_max_skills() -> usize {
    15
}

impl Default for SkillSearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            max_results: default_max_results(),
            max_skills: default_max_skills(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_allowed_mime")]
    pub allowed_mime: Vec<String>,
    /// Where image thumbnails are written. `None` means the platform cache dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_dir: Option<PathBuf>,
    #[serde(default = "default_preview_max_edge")]
    pub preview_max_edge: u32,
}

fn default_max_files() -> usize {
    10
}

fn default_max_file_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_allowed_mime() -> Vec<String> {
    DEFAULT_ALLOWED_MIME.iter().map(|m| m.to_string()).collect()
}

fn default_preview_max_edge() -> u32 {
    256
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_bytes: default_max_file_bytes(),
            allowed_mime: default_allowed_mime(),
            preview_dir: None,
            preview_max_edge: default_preview_max_edge(),
        }
    }
}

impl AttachmentConfig {
    pub fn resolved_preview_dir(&self) -> PathBuf {
        self.preview_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("jobpost")
                .join("previews")
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
