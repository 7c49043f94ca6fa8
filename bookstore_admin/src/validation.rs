use itertools::Itertools;
use serde::Serialize;

#[derive(thiserror::Error, Debug, Clone, Serialize, Eq, PartialEq)]
#[error("{path}: {message}")]
/// Message attached to a single form field, `path` uses form notation (`variants.0.price`)
pub struct FieldError {
    pub path: String,
    pub message: String,
}

#[derive(thiserror::Error, Debug, Clone, Default, Serialize, Eq, PartialEq)]
#[error("Invalid form: {}", .errors.iter().join("; "))]
/// Every failed rule of a form, in the order the rules were evaluated
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Records `message` at `path` when `valid` is false
    pub fn check(&mut self, valid: bool, path: impl Into<String>, message: &str) {
        if !valid {
            self.add(path, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages reported for one field
    pub fn messages_for(&self, path: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|error| error.path == path)
            .map(|error| error.message.as_str())
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
