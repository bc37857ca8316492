//! Helpers for keeping tokens and local paths out of log output and span fields.

use std::path::Path;

const LOG_BODY_LIMIT: usize = 512;

/// Returns only the filename component of a path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Cuts a response body down to something fit for a debug line.
pub fn truncate_for_log(body: &str) -> String {
    let single_line = body.replace(['\n', '\r'], " ");
    let trimmed = single_line.trim();
    match trimmed.char_indices().nth(LOG_BODY_LIMIT) {
        Some((cut, _)) => format!("{}… ({} bytes)", &trimmed[..cut], trimmed.len()),
        None => trimmed.to_string(),
    }
}

/// `abcd1234wxyz` → `abcd****`. Short tokens are fully masked.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
