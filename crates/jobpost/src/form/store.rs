//! Single source of truth for scalar field values and their error state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fields::{Field, FormState};

/// Field name → human-readable message.
///
/// A present key means the field currently fails validation; absence means it is
/// valid or has not been validated yet. Keys are wire names so that errors coming
/// back from the server (which may name fields this crate does not model) fit the
/// same map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: impl AsRef<str>) -> Option<&str> {
        self.0.get(field.as_ref()).map(String::as_str)
    }

    pub fn contains(&self, field: impl AsRef<str>) -> bool {
        self.0.contains_key(field.as_ref())
    }

    pub fn remove(&mut self, field: impl AsRef<str>) -> Option<String> {
        self.0.remove(field.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Holds the form record, the per-field errors and the generic banner.
///
/// Setting a value never validates; it only invalidates the error for that field
/// and dismisses the banner.
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    state: FormState,
    errors: FieldErrors,
    banner: Option<String>,
}

impl FormStore {
    pub fn new(state: FormState) -> Self {
        Self {
            state,
            errors: FieldErrors::new(),
            banner: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.state.slot_mut(field) = value.into();
        self.errors.remove(field);
        self.banner = None;
    }

    /// Replaces the whole record, e.g. after loading an existing job.
    pub fn replace_state(&mut self, state: FormState) {
        self.state = state;
        self.errors.clear();
        self.banner = None;
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn replace_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    pub fn clear_error(&mut self, field: impl AsRef<str>) {
        self.errors.remove(field);
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn set_banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }
}
