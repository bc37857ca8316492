//! Skill search-and-select.
//!
//! [`SkillPicker`] is plain state: the selection, the current query, the last
//! result list and a generation counter that tags every search it asks for.
//! [`SkillSearch`] pairs it with the [`SearchDebouncer`] that actually talks
//! to the server.

pub mod debounce;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::api::{JobsApi, Skill, MIN_SKILL_QUERY_CHARS};
use crate::config::SkillSearchConfig;

pub use debounce::{SearchDebouncer, SkillSearchOutcome};

pub const PLACEHOLDER_AT_CAP: &str = "Maximum skills reached";
pub const PLACEHOLDER_WITH_CATEGORY: &str = "Search skills for this category…";
pub const PLACEHOLDER_NO_CATEGORY: &str = "Select a category first to search skills…";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSkill {
    pub id: String,
    pub name: String,
}

impl From<&Skill> for SelectedSkill {
    fn from(skill: &Skill) -> Self {
        Self {
            id: skill.id.clone(),
            name: skill.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillLimits {
    pub min_query_chars: usize,
    pub max_results: usize,
    pub max_skills: usize,
}

impl Default for SkillLimits {
    fn default() -> Self {
        Self::from(&SkillSearchConfig::default())
    }
}

impl From<&SkillSearchConfig> for SkillLimits {
    fn from(config: &SkillSearchConfig) -> Self {
        Self {
            min_query_chars: config.min_query_len.max(MIN_SKILL_QUERY_CHARS),
            max_results: config.max_results,
            max_skills: config.max_skills,
        }
    }
}

/// A search the picker wants run, tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
    pub category_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct SkillPicker {
    limits: SkillLimits,
    category_id: String,
    query: String,
    generation: u64,
    results: Vec<Skill>,
    dropdown_open: bool,
    loading: bool,
    selected: Vec<SelectedSkill>,
    focus_requested: bool,
}

impl SkillPicker {
    pub fn new(limits: SkillLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> SkillLimits {
        self.limits
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Skill] {
        &self.results
    }

    pub fn selected(&self) -> &[SelectedSkill] {
        &self.selected
    }

    pub fn skill_ids(&self) -> Vec<String> {
        self.selected.iter().map(|s| s.id.clone()).collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= self.limits.max_skills
    }

    /// The search input is disabled once the selection is full.
    pub fn input_enabled(&self) -> bool {
        !self.is_full()
    }

    pub fn placeholder(&self) -> &'static str {
        if self.is_full() {
            PLACEHOLDER_AT_CAP
        } else if self.category_id.is_empty() {
            PLACEHOLDER_NO_CATEGORY
        } else {
            PLACEHOLDER_WITH_CATEGORY
        }
    }

    /// Records a new query value and returns the search to schedule, if any.
    ///
    /// Every call invalidates earlier searches. Short queries, a missing
    /// category or a full selection clear the results instead.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<SearchTicket> {
        self.query = query.into();
        self.generation += 1;

        let searchable = self.input_enabled()
            && !self.category_id.is_empty()
            && self.query.trim().chars().count() >= self.limits.min_query_chars;

        if !searchable {
            self.results.clear();
            self.dropdown_open = false;
            self.loading = false;
            return None;
        }

        self.loading = true;
        Some(SearchTicket {
            generation: self.generation,
            query: self.query.clone(),
            category_id: self.category_id.clone(),
        })
    }

    /// Applies a search response. Returns `false` for a stale generation.
    pub fn apply_results(&mut self, generation: u64, results: Vec<Skill>) -> bool {
        if generation != self.generation {
            debug!(
                "Discarding stale skill results (generation {} != {})",
                generation, self.generation
            );
            return false;
        }

        let mut filtered: Vec<Skill> = results
            .into_iter()
            .filter(|s| !self.selected.iter().any(|sel| sel.id == s.id))
            .collect();
        filtered.truncate(self.limits.max_results);

        self.dropdown_open = !filtered.is_empty();
        self.results = filtered;
        self.loading = false;
        true
    }

    /// A failed search keeps whatever was displayed before.
    pub fn search_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }

    /// Adds a skill. Duplicates and additions beyond the cap are no-ops.
    pub fn add(&mut self, skill: &Skill) -> bool {
        if self.selected.iter().any(|s| s.id == skill.id) || self.is_full() {
            return false;
        }
        self.selected.push(SelectedSkill::from(skill));
        self.query.clear();
        self.results.clear();
        self.dropdown_open = false;
        self.loading = false;
        self.generation += 1;
        self.focus_requested = true;
        true
    }

    pub fn remove(&mut self, skill_id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s.id != skill_id);
        before != self.selected.len()
    }

    /// Replaces the selection, e.g. with the skills of a loaded job.
    pub fn preselect(&mut self, skills: impl IntoIterator<Item = SelectedSkill>) {
        self.selected.clear();
        for skill in skills {
            if self.is_full() {
                break;
            }
            if !self.selected.iter().any(|s| s.id == skill.id) {
                self.selected.push(skill);
            }
        }
    }

    /// Returns and clears a pending request to focus the search input.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    /// Scopes later searches to `category_id`. Results from the old category
    /// are dropped; the selection is kept.
    pub fn on_category_changed(&mut self, category_id: &str) -> bool {
        let category_id = category_id.trim();
        if category_id == self.category_id {
            return false;
        }
        self.category_id = category_id.to_string();
        self.generation += 1;
        self.results.clear();
        self.dropdown_open = false;
        self.loading = false;
        true
    }

    pub fn open_dropdown(&mut self) {
        if !self.results.is_empty() {
            self.dropdown_open = true;
        }
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }
}

/// Picker state plus the debounced search driving it.
pub struct SkillSearch {
    picker: SkillPicker,
    debouncer: SearchDebouncer,
    awaiting: bool,
}

impl SkillSearch {
    pub fn new(api: Arc<dyn JobsApi>, limits: SkillLimits, window: Duration) -> Self {
        Self {
            picker: SkillPicker::new(limits),
            debouncer: SearchDebouncer::new(api, window),
            awaiting: false,
        }
    }

    pub fn from_config(api: Arc<dyn JobsApi>, config: &SkillSearchConfig) -> Self {
        Self::new(
            api,
            SkillLimits::from(config),
            Duration::from_millis(config.debounce_ms),
        )
    }

    pub fn picker(&self) -> &SkillPicker {
        &self.picker
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        match self.picker.set_query(query) {
            Some(ticket) => {
                self.debouncer.schedule(ticket);
                self.awaiting = true;
            }
            None => self.cancel(),
        }
    }

    pub fn set_category(&mut self, category_id: &str) {
        if self.picker.on_category_changed(category_id) {
            self.cancel();
        }
    }

    pub fn add(&mut self, skill: &Skill) -> bool {
        let added = self.picker.add(skill);
        if added {
            self.cancel();
        }
        added
    }

    pub fn remove(&mut self, skill_id: &str) -> bool {
        self.picker.remove(skill_id)
    }

    pub fn preselect(&mut self, skills: impl IntoIterator<Item = SelectedSkill>) {
        self.picker.preselect(skills);
    }

    pub fn take_focus_request(&mut self) -> bool {
        self.picker.take_focus_request()
    }

    pub fn open_dropdown(&mut self) {
        self.picker.open_dropdown();
    }

    pub fn close_dropdown(&mut self) {
        self.picker.close_dropdown();
    }

    /// Whether a search is scheduled or in flight.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    /// Waits for the current search to finish and applies it.
    ///
    /// Returns `false` immediately when nothing is scheduled.
    pub async fn await_results(&mut self) -> bool {
        while self.awaiting {
            let Some(outcome) = self.debouncer.next().await else {
                self.abandon();
                return false;
            };
            if self.apply(outcome) {
                return true;
            }
        }
        false
    }

    /// Applies every finished search without waiting. Returns `true` when the
    /// current generation was among them.
    pub fn poll(&mut self) -> bool {
        let finished = !self.debouncer.is_pending();
        let mut applied = false;
        while let Some(outcome) = self.debouncer.try_next() {
            applied |= self.apply(outcome);
        }
        if finished && self.awaiting {
            self.abandon();
        }
        applied
    }

    /// The search task is gone without reporting; stop showing it as loading.
    fn abandon(&mut self) {
        warn!("Skill search ended without results");
        self.picker.search_failed(self.picker.generation());
        self.awaiting = false;
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
        self.awaiting = false;
    }

    fn apply(&mut self, outcome: SkillSearchOutcome) -> bool {
        let generation = outcome.ticket.generation;
        let current = match outcome.result {
            Ok(skills) => self.picker.apply_results(generation, skills),
            Err(e) => {
                warn!("Skill search for '{}' failed: {}", outcome.ticket.query, e);
                self.picker.search_failed(generation)
            }
        };
        if current {
            self.awaiting = false;
        }
        current
    }
}
