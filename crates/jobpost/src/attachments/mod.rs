//! Attachment staging.
//!
//! Files are checked against the MIME allow-list, the per-file size cap and
//! the staged-count cap, in that order. Whatever fails is left out without an
//! individual error; the [`StageReport`] says what happened for callers that
//! want to show a notice.

pub mod preview;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::api::UploadFile;
use crate::config::AttachmentConfig;

pub use preview::{PreviewHandle, PreviewProvider, ThumbnailPreviews};

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Failed to inspect '{path}': {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    #[error("Failed to create preview for '{name}': {message}")]
    Preview { name: String, message: String },

    #[error("Failed to create preview directory '{path}': {source}")]
    PreviewDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file offered for attachment, before any checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl CandidateFile {
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        size: u64,
        mime: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }

    /// Inspects a local file: size from metadata, MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| AttachmentError::Inspect {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !metadata.is_file() {
            return Err(AttachmentError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            name: crate::sanitize::redact_path(path),
            size: metadata.len(),
            mime,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLimits {
    pub max_files: usize,
    pub max_file_bytes: u64,
    pub allowed_mime: Vec<String>,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self::from(&AttachmentConfig::default())
    }
}

impl From<&AttachmentConfig> for AttachmentLimits {
    fn from(config: &AttachmentConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_file_bytes: config.max_file_bytes,
            allowed_mime: config.allowed_mime.clone(),
        }
    }
}

impl AttachmentLimits {
    pub fn allows_mime(&self, mime: &str) -> bool {
        self.allowed_mime.iter().any(|m| m.eq_ignore_ascii_case(mime))
    }
}

#[derive(Debug)]
pub struct StagedAttachment {
    pub id: String,
    pub file: CandidateFile,
    pub staged_at: DateTime<Utc>,
    preview: Option<PreviewHandle>,
}

impl StagedAttachment {
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::reference)
    }

    pub fn to_upload(&self) -> UploadFile {
        UploadFile {
            path: self.file.path.clone(),
            name: self.file.name.clone(),
            mime: self.file.mime.clone(),
        }
    }
}

/// What happened to one batch passed to [`AttachmentStager::stage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub accepted: Vec<String>,
    pub rejected_type: Vec<String>,
    pub rejected_size: Vec<String>,
    pub over_limit: Vec<String>,
}

impl StageReport {
    pub fn skipped(&self) -> usize {
        self.rejected_type.len() + self.rejected_size.len() + self.over_limit.len()
    }

    /// Non-blocking summary of skipped files, if any were skipped.
    pub fn notice(&self) -> Option<String> {
        match self.skipped() {
            0 => None,
            1 => Some("1 file was not added".to_string()),
            n => Some(format!("{} files were not added", n)),
        }
    }
}

pub struct AttachmentStager {
    limits: AttachmentLimits,
    previews: Arc<dyn PreviewProvider>,
    staged: Vec<StagedAttachment>,
}

impl AttachmentStager {
    pub fn new(limits: AttachmentLimits, previews: Arc<dyn PreviewProvider>) -> Self {
        Self {
            limits,
            previews,
            staged: Vec::new(),
        }
    }

    pub fn limits(&self) -> &AttachmentLimits {
        &self.limits
    }

    /// Stages a batch from a picker or a drop. Files beyond the count cap are
    /// not examined; those before them still go in.
    pub fn stage(&mut self, files: impl IntoIterator<Item = CandidateFile>) -> StageReport {
        let mut report = StageReport::default();
        let mut files = files.into_iter();

        while let Some(file) = files.next() {
            if !self.limits.allows_mime(&file.mime) {
                debug!("Skipping {}: type {} not allowed", file.name, file.mime);
                report.rejected_type.push(file.name);
                continue;
            }
            if file.size > self.limits.max_file_bytes {
                debug!("Skipping {}: {} bytes over limit", file.name, file.size);
                report.rejected_size.push(file.name);
                continue;
            }
            if self.staged.len() >= self.limits.max_files {
                report.over_limit.push(file.name);
                report.over_limit.extend(files.by_ref().map(|f| f.name));
                break;
            }

            let id = uuid::Uuid::new_v4().to_string();
            let preview = if file.is_image() {
                match PreviewHandle::acquire(Arc::clone(&self.previews), &id, &file) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                }
            } else {
                None
            };

            report.accepted.push(id.clone());
            self.staged.push(StagedAttachment {
                id,
                file,
                staged_at: Utc::now(),
                preview,
            });
        }

        report
    }

    /// Removes one attachment and releases its preview. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.staged.iter().position(|a| a.id == id) {
            Some(index) => {
                self.staged.remove(index);
                true
            }
            None => false,
        }
    }

    /// Hands over every staged attachment, leaving the stager empty.
    pub fn take_all(&mut self) -> Vec<StagedAttachment> {
        std::mem::take(&mut self.staged)
    }

    pub fn clear(&mut self) {
        self.staged.clear();
    }

    pub fn as_slice(&self) -> &[StagedAttachment] {
        &self.staged
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagedAttachment> {
        self.staged.iter()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.staged.iter().map(|a| a.file.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::preview::testing::CountingPreviews;
    use super::*;

    fn stager(max_files: usize) -> (AttachmentStager, Arc<CountingPreviews>) {
        let previews = Arc::new(CountingPreviews::default());
        let limits = AttachmentLimits {
            max_files,
            ..AttachmentLimits::default()
        };
        (AttachmentStager::new(limits, previews.clone()), previews)
    }

    fn pdf(name: &str) -> CandidateFile {
        CandidateFile::new(format!("/tmp/{name}"), name, 1024, "application/pdf")
    }

    fn png(name: &str) -> CandidateFile {
        CandidateFile::new(format!("/tmp/{name}"), name, 2048, "image/png")
    }

    #[test]
    fn test_disallowed_type_and_oversize_skipped() {
        let (mut stager, _) = stager(10);
        let report = stager.stage([
            CandidateFile::new("/tmp/a.exe", "a.exe", 10, "application/x-msdownload"),
            CandidateFile::new("/tmp/big.pdf", "big.pdf", 20 * 1024 * 1024 + 1, "application/pdf"),
            CandidateFile::new("/tmp/edge.pdf", "edge.pdf", 20 * 1024 * 1024, "application/pdf"),
        ]);
        assert_eq!(report.rejected_type, vec!["a.exe"]);
        assert_eq!(report.rejected_size, vec!["big.pdf"]);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(stager.len(), 1);
        assert_eq!(report.notice().as_deref(), Some("2 files were not added"));
    }

    #[test]
    fn test_batch_truncated_at_cap() {
        let (mut stager, _) = stager(3);
        stager.stage([pdf("1.pdf")]);
        let report = stager.stage([pdf("2.pdf"), pdf("3.pdf"), pdf("4.pdf"), pdf("5.pdf")]);

        assert_eq!(stager.len(), 3);
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.over_limit, vec!["4.pdf", "5.pdf"]);
    }

    #[test]
    fn test_previews_only_for_images() {
        let (mut stager, previews) = stager(10);
        stager.stage([png("shot.png"), pdf("brief.pdf")]);

        let staged: Vec<_> = stager.iter().collect();
        assert!(staged[0].preview().is_some());
        assert!(staged[1].preview().is_none());
        assert_eq!(previews.created().len(), 1);
    }

    #[test]
    fn test_remove_releases_preview_once() {
        let (mut stager, previews) = stager(10);
        let report = stager.stage([png("shot.png")]);
        let id = report.accepted[0].clone();
        let reference = format!("preview://{id}");

        assert!(stager.remove(&id));
        assert!(!stager.remove(&id));
        assert!(!stager.remove("unknown"));
        assert_eq!(previews.releases_of(&reference), 1);
        assert!(stager.is_empty());
    }

    #[test]
    fn test_drop_releases_all_previews() {
        let (mut stager, previews) = stager(10);
        stager.stage([png("a.png"), png("b.png"), pdf("c.pdf")]);
        drop(stager);
        assert_eq!(previews.total_releases(), 2);
    }

    #[test]
    fn test_take_all_moves_ownership() {
        let (mut stager, previews) = stager(10);
        stager.stage([png("a.png"), pdf("b.pdf")]);

        let taken = stager.take_all();
        assert!(stager.is_empty());
        assert_eq!(previews.total_releases(), 0);

        let uploads: Vec<UploadFile> = taken.iter().map(StagedAttachment::to_upload).collect();
        assert_eq!(uploads[1].name, "b.pdf");
        drop(taken);
        assert_eq!(previews.total_releases(), 1);
    }

    #[test]
    fn test_candidate_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let file = CandidateFile::from_path(&path).unwrap();
        assert_eq!(file.name, "notes.txt");
        assert_eq!(file.size, 5);
        assert_eq!(file.mime, "text/plain");
        assert!(!file.is_image());

        assert!(matches!(
            CandidateFile::from_path(dir.path()),
            Err(AttachmentError::NotAFile { .. })
        ));
        assert!(matches!(
            CandidateFile::from_path(dir.path().join("missing.pdf")),
            Err(AttachmentError::Inspect { .. })
        ));
    }

    #[test]
    fn test_staged_time_reaches_view() {
        use crate::wizard::AttachmentView;

        let (mut stager, _) = stager(10);
        let before = Utc::now();
        stager.stage([pdf("first.pdf")]);
        stager.stage([pdf("second.pdf")]);
        let after = Utc::now();

        let views: Vec<AttachmentView> = stager.iter().map(AttachmentView::from).collect();
        assert!(views[0].staged_at >= before);
        assert!(views[0].staged_at <= views[1].staged_at);
        assert!(views[1].staged_at <= after);

        let json = serde_json::to_value(&views[0]).unwrap();
        let stamp = json["stagedAt"].as_str().unwrap();
        assert_eq!(stamp.parse::<DateTime<Utc>>().unwrap(), views[0].staged_at);
    }

    #[test]
    fn test_mime_check_case_insensitive() {
        let limits = AttachmentLimits::default();
        assert!(limits.allows_mime("IMAGE/PNG"));
        assert!(!limits.allows_mime("image/svg+xml"));
    }
}
