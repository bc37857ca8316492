//! Read-only view of the wizard for the presentation layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::review::format_bytes;
use super::{Phase, Step};
use crate::api::{Category, Skill};
use crate::attachments::StagedAttachment;
use crate::form::{FieldErrors, FormState};
use crate::skills::SelectedSkill;

/// Everything a renderer needs, taken in one read after a transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub step: Step,
    pub step_index: usize,
    pub step_count: usize,
    pub step_labels: Vec<&'static str>,
    pub form: FormState,
    pub errors: FieldErrors,
    pub banner: Option<String>,
    pub notice: Option<String>,
    pub phase: Phase,
    pub skills: SkillsView,
    pub attachments: Vec<AttachmentView>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsView {
    pub query: String,
    pub results: Vec<Skill>,
    pub dropdown_open: bool,
    pub loading: bool,
    pub placeholder: &'static str,
    pub input_enabled: bool,
    pub selected: Vec<SelectedSkill>,
    pub max_skills: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub mime: String,
    pub preview: Option<String>,
    pub staged_at: DateTime<Utc>,
}

impl From<&StagedAttachment> for AttachmentView {
    fn from(a: &StagedAttachment) -> Self {
        Self {
            id: a.id.clone(),
            name: a.file.name.clone(),
            size: a.file.size,
            size_label: format_bytes(a.file.size),
            mime: a.file.mime.clone(),
            preview: a.preview().map(str::to_string),
            staged_at: a.staged_at,
        }
    }
}

pub trait WizardReporter: Send + Sync {
    fn report(&self, snapshot: &WizardSnapshot);
}

/// Reporter that ignores every snapshot.
pub struct NoopReporter;

impl WizardReporter for NoopReporter {
    fn report(&self, _snapshot: &WizardSnapshot) {}
}

/// Fans snapshots out over a tokio broadcast channel.
pub struct BroadcastReporter {
    sender: Arc<broadcast::Sender<WizardSnapshot>>,
}

impl BroadcastReporter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardSnapshot> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl WizardReporter for BroadcastReporter {
    fn report(&self, snapshot: &WizardSnapshot) {
        // No receivers is fine
        let _ = self.sender.send(snapshot.clone());
    }
}
