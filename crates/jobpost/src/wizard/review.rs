//! Rows shown on the Review step.

use serde::Serialize;

use super::snapshot::AttachmentView;
use crate::api::Category;
use crate::attachments::StagedAttachment;
use crate::form::{parse_number, strip_html, FormState};
use crate::skills::SelectedSkill;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub label: &'static str,
    pub value: String,
}

impl ReviewRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub rows: Vec<ReviewRow>,
    pub description_html: String,
    pub description_text: String,
    pub skills: Vec<String>,
    pub attachments: Vec<AttachmentView>,
}

impl ReviewSummary {
    pub fn build(
        form: &FormState,
        categories: &[Category],
        skills: &[SelectedSkill],
        attachments: &[StagedAttachment],
    ) -> Self {
        let category = categories
            .iter()
            .find(|c| c.id == form.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "—".to_string());

        let budget_type = form.budget_type().unwrap_or_default().label();

        let mut rows = vec![
            ReviewRow::new("Title", form.title.trim()),
            ReviewRow::new("Category", category),
            ReviewRow::new("Experience", capitalize(&form.experience_level)),
            ReviewRow::new("Budget Type", budget_type),
            ReviewRow::new(
                "Budget Range",
                format_money_range(&form.budget_min, &form.budget_max),
            ),
        ];

        let duration = form.duration_weeks.trim();
        if !duration.is_empty() {
            let unit = if parse_number(duration) == Some(1.0) {
                "week"
            } else {
                "weeks"
            };
            rows.push(ReviewRow::new("Duration", format!("{} {}", duration, unit)));
        }

        rows.push(ReviewRow::new(
            "Visibility",
            capitalize(&form.visibility).replacen('_', " ", 1),
        ));

        Self {
            rows,
            description_html: form.description.clone(),
            description_text: strip_html(&form.description).trim().to_string(),
            skills: skills.iter().map(|s| s.name.clone()).collect(),
            attachments: attachments
                .iter()
                .map(AttachmentView::from)
                .collect(),
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `512 B`, `1.5 KB`, `20.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Thousands-grouped amount with up to three decimals: `2,000`, `1,250.5`.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

pub fn format_money(value: f64) -> String {
    format!("${}", format_amount(value))
}

/// `$500 – $2,000`. Unparseable input renders as zero.
pub fn format_money_range(min: &str, max: &str) -> String {
    format!(
        "{} – {}",
        format_money(parse_number(min).unwrap_or(0.0)),
        format_money(parse_number(max).unwrap_or(0.0))
    )
}
