//! Ordered steps of the job wizard and the controller that moves between them.

use serde::{Deserialize, Serialize};

use crate::form::{FieldErrors, FormState};
use crate::validate::validate_step;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Details,
    Budget,
    Review,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Details, Step::Budget, Step::Review];

    pub const COUNT: usize = Step::ALL.len();

    pub fn index(self) -> usize {
        match self {
            Step::Details => 0,
            Step::Budget => 1,
            Step::Review => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Step::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Details => "Details",
            Step::Budget => "Budget",
            Step::Review => "Review",
        }
    }

    /// Whether any input is collected on this step.
    pub fn is_data_bearing(self) -> bool {
        !matches!(self, Step::Review)
    }

    pub fn is_last(self) -> bool {
        self.index() == Step::COUNT - 1
    }
}

/// Which step renders (and therefore owns) each wire field.
///
/// Used to send the user back to the right screen when the server rejects a
/// field. Includes the non-scalar inputs the server may name.
pub const FIELD_STEPS: &[(&str, Step)] = &[
    ("title", Step::Details),
    ("description", Step::Details),
    ("category_id", Step::Details),
    ("skill_ids", Step::Details),
    ("budget_type", Step::Budget),
    ("budget_min", Step::Budget),
    ("budget_max", Step::Budget),
    ("currency", Step::Budget),
    ("experience_level", Step::Budget),
    ("duration_weeks", Step::Budget),
    ("estimated_duration", Step::Budget),
    ("visibility", Step::Budget),
    ("files", Step::Budget),
];

pub fn step_for_field(name: &str) -> Option<Step> {
    FIELD_STEPS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, step)| *step)
}

/// Result of asking to leave the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The current step validated; carries the step now shown (unchanged on
    /// the last step).
    Advanced(Step),
    Held(FieldErrors),
    /// The draft was submitted; the stepper no longer moves.
    Closed,
}

/// Owns the current step.
///
/// Moves saturate at both ends. A forward move is allowed only when the current
/// step validates.
#[derive(Debug, Clone, Default)]
pub struct StepController {
    current: Step,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    pub fn index(&self) -> usize {
        self.current.index()
    }

    pub fn next(&mut self, form: &FormState) -> Transition {
        let errors = validate_step(self.current, form);
        if !errors.is_empty() {
            return Transition::Held(errors);
        }
        if let Some(next) = Step::from_index(self.current.index() + 1) {
            self.current = next;
        }
        Transition::Advanced(self.current)
    }

    pub fn prev(&mut self) -> Step {
        self.current = Step::from_index(self.current.index().saturating_sub(1)).unwrap_or_default();
        self.current
    }

    pub fn jump_to(&mut self, step: Step) {
        self.current = step;
    }

    /// Jumps to the step owning `field`. Unknown fields leave the step unchanged.
    pub fn jump_to_field(&mut self, field: &str) -> Option<Step> {
        let step = step_for_field(field)?;
        self.jump_to(step);
        Some(step)
    }
}
