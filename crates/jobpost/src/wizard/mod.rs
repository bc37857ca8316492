//! The job-posting wizard.
//!
//! [`JobWizard`] is the single owner of one posting attempt: the form store,
//! the step controller, the skill picker and the attachment stager. Every
//! mutation goes through it and is followed by a [`WizardSnapshot`] handed to
//! the configured [`WizardReporter`].

pub mod edit;
pub mod review;
pub mod snapshot;
pub mod step;
pub mod submit;

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::api::{Category, JobsApi, Skill};
use crate::attachments::{
    AttachmentLimits, AttachmentStager, CandidateFile, PreviewProvider, StageReport,
    ThumbnailPreviews,
};
use crate::config::WizardConfig;
use crate::form::{Field, FieldErrors, FormState, FormStore};
use crate::skills::{SkillPicker, SkillSearch};

pub use edit::{JobEditor, SaveOutcome};
pub use review::{format_bytes, format_money, format_money_range, ReviewRow, ReviewSummary};
pub use snapshot::{
    AttachmentView, BroadcastReporter, NoopReporter, SkillsView, WizardReporter, WizardSnapshot,
};
pub use step::{step_for_field, Step, StepController, Transition, FIELD_STEPS};
pub use submit::SubmitOutcome;

/// Where the host should go once the wizard is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum Navigation {
    /// The job list.
    MyJobs,
    /// The management page of one job.
    Job { id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Editing,
    Submitting,
    /// The draft exists server-side; waiting for publish or review-later.
    Created { job_id: String },
    Publishing { job_id: String },
    Finished { target: Navigation },
}

pub struct JobWizard {
    api: Arc<dyn JobsApi>,
    store: FormStore,
    controller: StepController,
    skills: SkillSearch,
    attachments: AttachmentStager,
    categories: Vec<Category>,
    phase: Phase,
    notice: Option<String>,
    upload: Option<JoinHandle<bool>>,
    reporter: Arc<dyn WizardReporter>,
}

impl JobWizard {
    /// Wizard with thumbnail previews under the configured preview directory.
    pub fn new(api: Arc<dyn JobsApi>, config: &WizardConfig) -> Self {
        let previews = ThumbnailPreviews::new(
            config.attachments.resolved_preview_dir(),
            config.attachments.preview_max_edge,
        );
        Self::with_previews(api, config, Arc::new(previews))
    }

    pub fn with_previews(
        api: Arc<dyn JobsApi>,
        config: &WizardConfig,
        previews: Arc<dyn PreviewProvider>,
    ) -> Self {
        Self {
            skills: SkillSearch::from_config(Arc::clone(&api), &config.skill_search),
            attachments: AttachmentStager::new(
                AttachmentLimits::from(&config.attachments),
                previews,
            ),
            api,
            store: FormStore::new(FormState::with_currency(&config.default_currency)),
            controller: StepController::new(),
            categories: Vec::new(),
            phase: Phase::Editing,
            notice: None,
            upload: None,
            reporter: Arc::new(NoopReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn WizardReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn form(&self) -> &FormState {
        self.store.state()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.store.errors()
    }

    pub fn banner(&self) -> Option<&str> {
        self.store.banner()
    }

    pub fn step(&self) -> Step {
        self.controller.current()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn skills(&self) -> &SkillPicker {
        self.skills.picker()
    }

    pub fn attachments(&self) -> &AttachmentStager {
        &self.attachments
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_editing(&self) -> bool {
        self.phase == Phase::Editing
    }

    // ---- form ------------------------------------------------------------

    /// Sets one field. Ignored once the draft has been submitted.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        if !self.is_editing() {
            return false;
        }
        let value = value.into();
        if field == Field::CategoryId {
            self.skills.set_category(&value);
        }
        self.store.set(field, value);
        self.notify();
        true
    }

    /// Validates the current step and moves forward when it passes. Once the
    /// draft has been submitted the stepper is closed and nothing moves.
    pub fn next(&mut self) -> Transition {
        if !self.is_editing() {
            return Transition::Closed;
        }
        let transition = self.controller.next(self.store.state());
        match &transition {
            Transition::Held(errors) => self.store.replace_errors(errors.clone()),
            Transition::Advanced(_) | Transition::Closed => {
                self.store.replace_errors(FieldErrors::new())
            }
        }
        self.notify();
        transition
    }

    pub fn prev(&mut self) -> Step {
        if !self.is_editing() {
            return self.controller.current();
        }
        let step = self.controller.prev();
        self.notify();
        step
    }

    /// Goes back to an earlier step, e.g. from a Review row. Forward targets
    /// are refused; moving forward always goes through [`next`](Self::next).
    pub fn go_back_to(&mut self, step: Step) -> bool {
        if !self.is_editing() || step > self.controller.current() {
            return false;
        }
        self.controller.jump_to(step);
        self.notify();
        true
    }

    pub fn dismiss_banner(&mut self) {
        self.store.dismiss_banner();
        self.notice = None;
        self.notify();
    }

    // ---- categories ------------------------------------------------------

    /// Fetches the category list. A failure leaves the list empty.
    pub async fn load_categories(&mut self) -> usize {
        match self.api.list_categories().await {
            Ok(categories) => {
                debug!("Loaded {} categories", categories.len());
                self.categories = categories;
            }
            Err(e) => {
                warn!("Failed to load categories: {}", e);
                self.categories.clear();
            }
        }
        self.notify();
        self.categories.len()
    }

    // ---- skills ----------------------------------------------------------

    pub fn set_skill_query(&mut self, query: impl Into<String>) {
        if !self.is_editing() {
            return;
        }
        self.skills.set_query(query);
        self.notify();
    }

    /// Waits for the pending skill search, if any, and applies its results.
    pub async fn await_skill_results(&mut self) -> bool {
        let applied = self.skills.await_results().await;
        if applied {
            self.notify();
        }
        applied
    }

    pub fn poll_skill_results(&mut self) -> bool {
        let applied = self.skills.poll();
        if applied {
            self.notify();
        }
        applied
    }

    pub fn add_skill(&mut self, skill: &Skill) -> bool {
        if !self.is_editing() {
            return false;
        }
        let added = self.skills.add(skill);
        if added {
            self.notify();
        }
        added
    }

    pub fn remove_skill(&mut self, skill_id: &str) -> bool {
        if !self.is_editing() {
            return false;
        }
        let removed = self.skills.remove(skill_id);
        if removed {
            self.notify();
        }
        removed
    }

    pub fn open_skill_dropdown(&mut self) {
        self.skills.open_dropdown();
        self.notify();
    }

    pub fn close_skill_dropdown(&mut self) {
        self.skills.close_dropdown();
        self.notify();
    }

    /// `true` once after a skill was added: the host should focus the input.
    pub fn take_skill_focus_request(&mut self) -> bool {
        self.skills.take_focus_request()
    }

    // ---- attachments -----------------------------------------------------

    pub fn stage_files(&mut self, files: impl IntoIterator<Item = CandidateFile>) -> StageReport {
        if !self.is_editing() {
            return StageReport::default();
        }
        let report = self.attachments.stage(files);
        self.notice = report.notice();
        self.notify();
        report
    }

    /// Inspects local paths and stages them. Paths that cannot be inspected
    /// are skipped like any other rejected file.
    pub fn stage_paths(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> StageReport {
        let mut unreadable = Vec::new();
        let candidates: Vec<CandidateFile> = paths
            .into_iter()
            .filter_map(|path| match CandidateFile::from_path(&path) {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!("{}", e);
                    unreadable.push(crate::sanitize::redact_path(&path));
                    None
                }
            })
            .collect();

        let mut report = self.stage_files(candidates);
        if !unreadable.is_empty() {
            report.rejected_type.extend(unreadable);
            self.notice = report.notice();
            self.notify();
        }
        report
    }

    pub fn remove_attachment(&mut self, id: &str) -> bool {
        let removed = self.attachments.remove(id);
        if removed {
            self.notify();
        }
        removed
    }

    // ---- lifecycle -------------------------------------------------------

    /// Stops the pending skill search and releases every staged preview.
    /// Call when the host navigates away without finishing.
    pub fn teardown(&mut self) {
        self.skills.cancel();
        self.attachments.clear();
    }

    pub fn review_summary(&self) -> ReviewSummary {
        ReviewSummary::build(
            self.store.state(),
            &self.categories,
            self.skills.picker().selected(),
            self.attachments.as_slice(),
        )
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let picker = self.skills.picker();
        WizardSnapshot {
            step: self.controller.current(),
            step_index: self.controller.index(),
            step_count: Step::COUNT,
            step_labels: Step::ALL.iter().map(|s| s.label()).collect(),
            form: self.store.state().clone(),
            errors: self.store.errors().clone(),
            banner: self.store.banner().map(str::to_string),
            notice: self.notice.clone(),
            phase: self.phase.clone(),
            skills: SkillsView {
                query: picker.query().to_string(),
                results: picker.results().to_vec(),
                dropdown_open: picker.is_dropdown_open(),
                loading: picker.is_loading(),
                placeholder: picker.placeholder(),
                input_enabled: picker.input_enabled(),
                selected: picker.selected().to_vec(),
                max_skills: picker.limits().max_skills,
            },
            attachments: self
                .attachments
                .iter()
                .map(AttachmentView::from)
                .collect(),
            categories: self.categories.clone(),
        }
    }

    fn notify(&self) {
        self.reporter.report(&self.snapshot());
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!("Wizard phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeApi, Failure};
    use crate::attachments::preview::testing::CountingPreviews;

    fn wizard(api: Arc<FakeApi>) -> (JobWizard, Arc<CountingPreviews>) {
        let previews = Arc::new(CountingPreviews::default());
        let wizard = JobWizard::with_previews(api, &WizardConfig::default(), previews.clone());
        (wizard, previews)
    }

    fn fill_details(wizard: &mut JobWizard) {
        wizard.set(Field::Title, "Build a landing page");
        wizard.set(
            Field::Description,
            "<p>A responsive landing page with a signup form</p>",
        );
        wizard.set(Field::CategoryId, "cat-1");
    }

    #[tokio::test]
    async fn test_next_stores_errors_and_holds() {
        let (mut wizard, _) = wizard(Arc::new(FakeApi::new()));
        wizard.set(
            Field::Description,
            "some text long enough to pass twenty chars",
        );
        wizard.set(Field::CategoryId, "cat-1");

        let transition = wizard.next();
        assert!(matches!(transition, Transition::Held(_)));
        assert_eq!(wizard.step(), Step::Details);
        assert_eq!(wizard.errors().get("title"), Some("Title is required"));
        assert_eq!(wizard.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_clears_field_error_only() {
        let (mut wizard, _) = wizard(Arc::new(FakeApi::new()));
        wizard.next();
        assert!(wizard.errors().contains("title"));
        assert!(wizard.errors().contains("category_id"));

        wizard.set(Field::Title, "x");
        assert!(!wizard.errors().contains("title"));
        assert!(wizard.errors().contains("category_id"));
    }

    #[tokio::test]
    async fn test_continue_stops_at_first_invalid_step() {
        let (mut wizard, _) = wizard(Arc::new(FakeApi::new()));
        fill_details(&mut wizard);

        assert_eq!(wizard.next(), Transition::Advanced(Step::Budget));
        assert!(wizard.errors().is_empty());
        assert!(matches!(wizard.next(), Transition::Held(_)));
        assert_eq!(wizard.step(), Step::Budget);
        assert!(wizard.errors().contains("budget_min"));
    }

    #[tokio::test]
    async fn test_prefilled_form_advances_each_press() {
        let (mut wizard, _) = wizard(Arc::new(FakeApi::new()));
        fill_details(&mut wizard);
        wizard.set(Field::BudgetMin, "500");
        wizard.set(Field::BudgetMax, "2000");

        assert_eq!(wizard.next(), Transition::Advanced(Step::Budget));
        assert_eq!(wizard.next(), Transition::Advanced(Step::Review));
        assert_eq!(wizard.prev(), Step::Budget);
        assert_eq!(wizard.prev(), Step::Details);
        assert_eq!(wizard.next(), Transition::Advanced(Step::Budget));
        assert_eq!(wizard.next(), Transition::Advanced(Step::Review));
        assert_eq!(wizard.next(), Transition::Advanced(Step::Review));
    }

    #[tokio::test]
    async fn test_stepper_closed_after_creation() {
        let (mut wizard, _) = wizard(Arc::new(FakeApi::new()));
        fill_details(&mut wizard);
        wizard.set(Field::BudgetMin, "500");
        wizard.set(Field::BudgetMax, "2000");
        wizard.next();
        wizard.next();
        assert!(matches!(wizard.submit().await, SubmitOutcome::Created { .. }));

        assert_eq!(wizard.prev(), Step::Review);
        assert!(!wizard.go_back_to(Step::Details));
        assert_eq!(wizard.next(), Transition::Closed);
        assert_eq!(wizard.step(), Step::Review);
    }

    #[tokio::test]
    async fn test_go_back_refuses_forward() {
        let (mut wizard, _) = wizard(Arc::new(FakeApi::new()));
        assert!(!wizard.go_back_to(Step::Review));
        fill_details(&mut wizard);
        wizard.next();
        assert!(wizard.go_back_to(Step::Details));
        assert_eq!(wizard.step(), Step::Details);
    }

    #[tokio::test]
    async fn test_category_failure_leaves_list_empty() {
        let api = Arc::new(FakeApi::new());
        api.fail("categories", Failure::Network);
        let (mut wizard, _) = wizard(api);
        assert_eq!(wizard.load_categories().await, 0);
        assert!(wizard.banner().is_none());
    }

    #[tokio::test]
    async fn test_load_categories() {
        let api = Arc::new(FakeApi::new());
        let (mut wizard, _) = wizard(api.clone());
        assert_eq!(wizard.load_categories().await, 1);
        assert_eq!(wizard.categories()[0].name, "Web Development");
        assert_eq!(api.calls(), vec![Call::ListCategories]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skill_search_scoped_to_category() {
        let api = Arc::new(FakeApi::new());
        let (mut wizard, _) = wizard(api.clone());

        wizard.set_skill_query("re");
        assert!(!wizard.await_skill_results().await);

        wizard.set(Field::CategoryId, "cat-1");
        wizard.set_skill_query("re");
        assert!(wizard.await_skill_results().await);

        let names: Vec<&str> = wizard.skills().results().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["React", "Redux"]);
        assert!(wizard.skills().is_dropdown_open());
        assert_eq!(
            api.calls(),
            vec![Call::SearchSkills {
                query: "re".to_string(),
                category_id: "cat-1".to_string()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_change_discards_pending_search() {
        let api = Arc::new(FakeApi::new());
        let (mut wizard, _) = wizard(api.clone());
        wizard.set(Field::CategoryId, "cat-1");
        wizard.set_skill_query("re");
        wizard.set(Field::CategoryId, "cat-2");

        assert!(!wizard.await_skill_results().await);
        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        assert!(!wizard.poll_skill_results());
        assert!(api.search_queries().is_empty());
    }

    #[tokio::test]
    async fn test_stage_notice_and_teardown_release() {
        let (mut wizard, previews) = wizard(Arc::new(FakeApi::new()));
        let report = wizard.stage_files([
            CandidateFile::new("/tmp/a.png", "a.png", 100, "image/png"),
            CandidateFile::new("/tmp/b.svg", "b.svg", 100, "image/svg+xml"),
        ]);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(wizard.snapshot().notice.as_deref(), Some("1 file was not added"));

        wizard.teardown();
        assert_eq!(previews.total_releases(), 1);
        assert!(wizard.attachments().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_reporter_receives_snapshots() {
        let reporter = Arc::new(BroadcastReporter::new(16));
        let mut rx = reporter.subscribe();
        let (wizard, _) = wizard(Arc::new(FakeApi::new()));
        let mut wizard = wizard.with_reporter(reporter.clone());

        wizard.set(Field::Title, "Hello world");
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.form.title, "Hello world");
        assert_eq!(snapshot.step_count, 3);
        assert_eq!(snapshot.step_labels, vec!["Details", "Budget", "Review"]);
        assert_eq!(snapshot.skills.placeholder, crate::skills::PLACEHOLDER_NO_CATEGORY);
    }

    #[tokio::test]
    async fn test_snapshot_serializes_phase_tag() {
        let (wizard, _) = wizard(Arc::new(FakeApi::new()));
        let json = serde_json::to_value(wizard.snapshot()).unwrap();
        assert_eq!(json["phase"]["state"], "editing");
        assert_eq!(json["stepIndex"], 0);
    }
}
