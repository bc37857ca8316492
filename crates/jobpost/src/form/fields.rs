//! Scalar job fields and the record that holds their raw input values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every scalar input of the job form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
    CategoryId,
    BudgetType,
    BudgetMin,
    BudgetMax,
    Currency,
    ExperienceLevel,
    DurationWeeks,
    Visibility,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Title,
        Field::Description,
        Field::CategoryId,
        Field::BudgetType,
        Field::BudgetMin,
        Field::BudgetMax,
        Field::Currency,
        Field::ExperienceLevel,
        Field::DurationWeeks,
        Field::Visibility,
    ];

    /// Wire name, as used in request payloads and server error details.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::CategoryId => "category_id",
            Field::BudgetType => "budget_type",
            Field::BudgetMin => "budget_min",
            Field::BudgetMax => "budget_max",
            Field::Currency => "currency",
            Field::ExperienceLevel => "experience_level",
            Field::DurationWeeks => "duration_weeks",
            Field::Visibility => "visibility",
        }
    }

    pub fn parse(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Field {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        field.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    #[default]
    Fixed,
    Hourly,
}

impl BudgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetType::Fixed => "fixed",
            BudgetType::Hourly => "hourly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(BudgetType::Fixed),
            "hourly" => Some(BudgetType::Hourly),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetType::Fixed => "Fixed Price",
            BudgetType::Hourly => "Hourly Rate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(ExperienceLevel::Entry),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "expert" => Some(ExperienceLevel::Expert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    InviteOnly,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::InviteOnly => "invite_only",
            Visibility::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "invite_only" => Some(Visibility::InviteOnly),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

/// Parses a numeric text input. Blank input and non-finite values yield `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Raw values of every scalar field, exactly as typed.
///
/// Enumerated and numeric fields stay textual here; typed accessors parse on
/// demand so that half-typed input never has to be rejected while editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub budget_type: String,
    pub budget_min: String,
    pub budget_max: String,
    pub currency: String,
    pub experience_level: String,
    pub duration_weeks: String,
    pub visibility: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self::with_currency("USD")
    }
}

impl FormState {
    pub fn with_currency(currency: &str) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category_id: String::new(),
            budget_type: BudgetType::default().as_str().to_string(),
            budget_min: String::new(),
            budget_max: String::new(),
            currency: currency.to_string(),
            experience_level: ExperienceLevel::default().as_str().to_string(),
            duration_weeks: String::new(),
            visibility: Visibility::default().as_str().to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::CategoryId => &self.category_id,
            Field::BudgetType => &self.budget_type,
            Field::BudgetMin => &self.budget_min,
            Field::BudgetMax => &self.budget_max,
            Field::Currency => &self.currency,
            Field::ExperienceLevel => &self.experience_level,
            Field::DurationWeeks => &self.duration_weeks,
            Field::Visibility => &self.visibility,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::CategoryId => &mut self.category_id,
            Field::BudgetType => &mut self.budget_type,
            Field::BudgetMin => &mut self.budget_min,
            Field::BudgetMax => &mut self.budget_max,
            Field::Currency => &mut self.currency,
            Field::ExperienceLevel => &mut self.experience_level,
            Field::DurationWeeks => &mut self.duration_weeks,
            Field::Visibility => &mut self.visibility,
        }
    }

    pub fn budget_type(&self) -> Option<BudgetType> {
        BudgetType::parse(self.budget_type.trim())
    }

    pub fn experience_level(&self) -> Option<ExperienceLevel> {
        ExperienceLevel::parse(self.experience_level.trim())
    }

    pub fn visibility(&self) -> Option<Visibility> {
        Visibility::parse(self.visibility.trim())
    }

    pub fn budget_min(&self) -> Option<f64> {
        parse_number(&self.budget_min)
    }

    pub fn budget_max(&self) -> Option<f64> {
        parse_number(&self.budget_max)
    }

    pub fn duration_weeks(&self) -> Option<f64> {
        parse_number(&self.duration_weeks)
    }

    pub fn has_category(&self) -> bool {
        !self.category_id.trim().is_empty()
    }
}
