//! Local previews for staged image attachments.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::ImageFormat;
use log::{debug, warn};

use super::{AttachmentError, CandidateFile};

/// Creates and releases preview resources.
///
/// `create` returns an opaque reference (a file path for
/// [`ThumbnailPreviews`]) that is later handed back to `release`.
pub trait PreviewProvider: Send + Sync {
    fn create(&self, id: &str, file: &CandidateFile) -> Result<String, AttachmentError>;

    fn release(&self, reference: &str);
}

/// Owns one preview. Dropping it releases the preview exactly once.
pub struct PreviewHandle {
    reference: String,
    provider: Arc<dyn PreviewProvider>,
}

impl PreviewHandle {
    pub fn acquire(
        provider: Arc<dyn PreviewProvider>,
        id: &str,
        file: &CandidateFile,
    ) -> Result<Self, AttachmentError> {
        let reference = provider.create(id, file)?;
        Ok(Self {
            reference,
            provider,
        })
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("reference", &self.reference)
            .finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.provider.release(&self.reference);
    }
}

/// Writes PNG thumbnails into a directory.
pub struct ThumbnailPreviews {
    dir: PathBuf,
    max_edge: u32,
}

impl ThumbnailPreviews {
    pub fn new(dir: impl Into<PathBuf>, max_edge: u32) -> Self {
        Self {
            dir: dir.into(),
            max_edge: max_edge.max(1),
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl PreviewProvider for ThumbnailPreviews {
    fn create(&self, id: &str, file: &CandidateFile) -> Result<String, AttachmentError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| AttachmentError::PreviewDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let preview_err = |message: String| AttachmentError::Preview {
            name: file.name.clone(),
            message,
        };

        let img = image::open(&file.path).map_err(|e| preview_err(e.to_string()))?;
        let thumb = img.thumbnail(self.max_edge, self.max_edge);

        let target = self.dir.join(format!("{}.png", id));
        thumb
            .save_with_format(&target, ImageFormat::Png)
            .map_err(|e| preview_err(e.to_string()))?;

        debug!(
            "Created {}x{} preview for {}",
            thumb.width(),
            thumb.height(),
            file.name
        );
        Ok(target.to_string_lossy().into_owned())
    }

    fn release(&self, reference: &str) {
        match std::fs::remove_file(reference) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove preview {}: {}",
                crate::sanitize::redact_path(std::path::Path::new(reference)),
                e
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Counts create/release calls per reference.
    #[derive(Default)]
    pub(crate) struct CountingPreviews {
        releases: Mutex<HashMap<String, usize>>,
        created: Mutex<Vec<String>>,
    }

    impl CountingPreviews {
        pub fn created(&self) -> Vec<String> {
            self.created.lock().unwrap().clone()
        }

        pub fn releases_of(&self, reference: &str) -> usize {
            self.releases
                .lock()
                .unwrap()
                .get(reference)
                .copied()
                .unwrap_or(0)
        }

        pub fn total_releases(&self) -> usize {
            self.releases.lock().unwrap().values().sum()
        }
    }

    impl PreviewProvider for CountingPreviews {
        fn create(&self, id: &str, _file: &CandidateFile) -> Result<String, AttachmentError> {
            let reference = format!("preview://{}", id);
            self.created.lock().unwrap().push(reference.clone());
            Ok(reference)
        }

        fn release(&self, reference: &str) {
            *self
                .releases
                .lock()
                .unwrap()
                .entry(reference.to_string())
                .or_insert(0) += 1;
        }
    }
}
