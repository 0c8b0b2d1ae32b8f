//! Form state and the inline error map.
//!
//! A [`Form`] pairs the current field values with an [`ErrorMap`]. Edits clear
//! the edited field's error straight away; re-validation waits for the next
//! submission attempt. Validators are run through [`ErrorMap::check`], which
//! records failures without short-circuiting so every invalid field is
//! reported at once.

use std::collections::BTreeMap;

use crate::error::SiteError;

/// Field name to current string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<String, String>,
}

impl FormState {
    /// A state with every named field present and empty.
    #[must_use]
    pub fn with_fields(fields: &[&str]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|f| ((*f).to_owned(), String::new()))
                .collect(),
        }
    }

    /// The current value of `field`, or `""` if it was never set.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    /// Reset every field to empty, keeping the field set.
    pub fn clear(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Field name to error message.
///
/// A field with a non-empty message is invalid; absence or an empty message
/// means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    errors: BTreeMap<String, String>,
}

impl ErrorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one validator against `field`.
    ///
    /// A failure is stored under `field` unless an earlier check already
    /// flagged it; the first message per field wins. Returns whether the
    /// check passed.
    pub fn check<T>(&mut self, field: &str, outcome: Result<T, SiteError>) -> bool {
        match outcome {
            Ok(_) => true,
            Err(err) => {
                self.insert_if_absent(field, err.message());
                false
            }
        }
    }

    /// Flag `field` with `message` unless it is already flagged.
    pub fn insert_if_absent(&mut self, field: &str, message: impl Into<String>) {
        if !self.is_invalid(field) {
            self.errors.insert(field.to_owned(), message.into());
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn remove(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// The message for `field`, if it is invalid.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }

    #[must_use]
    pub fn is_invalid(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// True when no field is invalid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.values().all(String::is_empty)
    }

    /// Number of invalid fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.values().filter(|m| !m.is_empty()).count()
    }

    /// Invalid fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(k, _)| k.as_str())
    }

    /// Absorb another map; existing entries win.
    pub fn merge(&mut self, other: ErrorMap) {
        for (field, message) in other.errors {
            self.insert_if_absent(&field, message);
        }
    }
}

/// Values and errors for one mounted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub values: FormState,
    pub errors: ErrorMap,
}

impl Form {
    #[must_use]
    pub fn new(fields: &[&str]) -> Self {
        Self {
            values: FormState::with_fields(fields),
            errors: ErrorMap::new(),
        }
    }

    /// Apply a single-field edit and drop that field's error.
    pub fn edit(&mut self, field: &str, value: impl Into<String>) {
        self.values.set(field, value);
        self.errors.remove(field);
    }

    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field)
    }

    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    /// Replace the error map with the outcome of a submission attempt.
    ///
    /// Returns `true` when the form may proceed to its side effect.
    pub fn accept(&mut self, errors: ErrorMap) -> bool {
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Clear values and errors after a successful submission.
    pub fn reset(&mut self) {
        self.values.clear();
        self.errors.clear();
    }
}
