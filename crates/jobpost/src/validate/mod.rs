//! Step-scoped validation of the job form.
//!
//! Every function here is pure: it reads a [`FormState`] and returns the
//! [`FieldErrors`] for the fields the step owns. Nothing is mutated and nothing
//! fails; an empty map means the step may be left.
//!
//! Blank and whitespace-only input count as missing. Numeric fields are compared
//! by value. Messages are fixed per rule.

use crate::form::{strip_html, Field, FieldErrors, FormState};
use crate::wizard::Step;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 20;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters";
pub const TITLE_TOO_LONG: &str = "Title must be under 200 characters";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const DESCRIPTION_TOO_SHORT: &str = "Description must be at least 20 characters";
pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const BUDGET_MIN_REQUIRED: &str = "Minimum budget is required";
pub const BUDGET_MAX_REQUIRED: &str = "Maximum budget is required";
pub const NOT_POSITIVE: &str = "Must be a positive number";
pub const BUDGET_MAX_BELOW_MIN: &str = "Must be ≥ minimum budget";
pub const BUDGET_TYPE_INVALID: &str = "Budget type must be fixed or hourly";
pub const EXPERIENCE_INVALID: &str = "Invalid experience level";
pub const VISIBILITY_INVALID: &str = "Invalid visibility";
pub const DURATION_INVALID: &str = "Must be a positive whole number";

/// Validates the fields owned by `step`. The review step owns none.
pub fn validate_step(step: Step, form: &FormState) -> FieldErrors {
    match step {
        Step::Details => validate_details(form),
        Step::Budget => validate_budget(form),
        Step::Review => FieldErrors::new(),
    }
}

/// Validates every data-bearing step, in step order.
pub fn validate_all(form: &FormState) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for step in Step::ALL {
        for (field, message) in validate_step(step, form).iter() {
            errors.insert(field, message);
        }
    }
    errors
}

pub fn validate_details(form: &FormState) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let title = form.title.trim();
    let title_len = title.chars().count();
    if title.is_empty() {
        errors.insert(Field::Title, TITLE_REQUIRED);
    } else if title_len < TITLE_MIN_CHARS {
        errors.insert(Field::Title, TITLE_TOO_SHORT);
    } else if title_len > TITLE_MAX_CHARS {
        errors.insert(Field::Title, TITLE_TOO_LONG);
    }

    let description = strip_html(&form.description);
    let description = description.trim();
    if description.is_empty() {
        errors.insert(Field::Description, DESCRIPTION_REQUIRED);
    } else if description.chars().count() < DESCRIPTION_MIN_CHARS {
        errors.insert(Field::Description, DESCRIPTION_TOO_SHORT);
    }

    if !form.has_category() {
        errors.insert(Field::CategoryId, CATEGORY_REQUIRED);
    }

    errors
}

pub fn validate_budget(form: &FormState) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.budget_type().is_none() {
        errors.insert(Field::BudgetType, BUDGET_TYPE_INVALID);
    }

    let min = form.budget_min();
    if form.budget_min.trim().is_empty() {
        errors.insert(Field::BudgetMin, BUDGET_MIN_REQUIRED);
    } else if !min.is_some_and(|v| v > 0.0) {
        errors.insert(Field::BudgetMin, NOT_POSITIVE);
    }

    if form.budget_max.trim().is_empty() {
        errors.insert(Field::BudgetMax, BUDGET_MAX_REQUIRED);
    } else {
        match form.budget_max() {
            Some(max) if max > 0.0 => {
                if min.is_some_and(|min| max < min) {
                    errors.insert(Field::BudgetMax, BUDGET_MAX_BELOW_MIN);
                }
            }
            _ => errors.insert(Field::BudgetMax, NOT_POSITIVE),
        }
    }

    if form.experience_level().is_none() {
        errors.insert(Field::ExperienceLevel, EXPERIENCE_INVALID);
    }

    if form.visibility().is_none() {
        errors.insert(Field::Visibility, VISIBILITY_INVALID);
    }

    if !form.duration_weeks.trim().is_empty() {
        let whole_positive = form
            .duration_weeks()
            .is_some_and(|w| w >= 1.0 && w.fract() == 0.0);
        if !whole_positive {
            errors.insert(Field::DurationWeeks, DURATION_INVALID);
        }
    }

    errors
}
