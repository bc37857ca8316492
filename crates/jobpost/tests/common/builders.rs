//! Builders for form input and server records.

#![allow(dead_code)]

use jobpost::api::JobRecord;
use jobpost::attachments::CandidateFile;
use jobpost::{Field, JobWizard};
use serde_json::json;

/// Raw values typed into the wizard, applied field by field.
pub struct FormBuilder {
    values: Vec<(Field, String)>,
}

impl FormBuilder {
    /// A form that passes every step.
    pub fn valid() -> Self {
        Self::empty()
            .set(Field::Title, "Build a landing page")
            .set(
                Field::Description,
                "<p>A responsive landing page with a signup form</p>",
            )
            .set(Field::CategoryId, "cat-1")
            .set(Field::BudgetMin, "500")
            .set(Field::BudgetMax, "2000")
    }

    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    pub fn set(mut self, field: Field, value: &str) -> Self {
        self.values.retain(|(f, _)| *f != field);
        self.values.push((field, value.to_string()));
        self
    }

    pub fn apply(&self, wizard: &mut JobWizard) {
        for (field, value) in &self.values {
            wizard.set(*field, value.as_str());
        }
    }
}

pub fn pdf(name: &str, size: u64) -> CandidateFile {
    CandidateFile::new(format!("/tmp/{name}"), name, size, "application/pdf")
}

pub fn png(name: &str, size: u64) -> CandidateFile {
    CandidateFile::new(format!("/tmp/{name}"), name, size, "image/png")
}

pub fn stored_job(id: &str) -> JobRecord {
    serde_json::from_value(json!({
        "id": id,
        "title": "Logo design",
        "description": "<p>Need a logo for a neighbourhood bakery</p>",
        "category_id": "cat-1",
        "budget_type": "hourly",
        "budget_min": "25.00",
        "budget_max": "60.00",
        "currency": "USD",
        "experience_level": "entry",
        "visibility": "public",
        "estimated_duration": null,
        "skills": [{"id": "s3", "name": "Rust", "slug": "rust"}],
        "attachments": [
            {"id": "att-1", "file_name": "brief.pdf", "file_url": "/f/1", "file_size": 1200, "mime_type": "application/pdf"},
            {"id": "att-2", "file_name": "moodboard.png", "file_url": "/f/2", "file_size": 5400, "mime_type": "image/png"}
        ]
    }))
    .expect("valid job record")
}
