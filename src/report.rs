//! Per-operation error and warning collection.
//!
//! A [`Report`] has two severities, each with a free-text message list and a
//! per-field reason list. A [`Model`](crate::model::Model) resets its report at
//! the start of every public operation, so a single operation can surface
//! several invalid columns at once.

use serde::Serialize;
use std::collections::BTreeMap;

/// Messages of one severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entries {
    messages: Vec<String>,
    fields: BTreeMap<String, Vec<String>>,
}

impl Entries {
    /// Free-text messages, oldest first
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Reasons grouped by field name
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Reasons recorded for one field
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.fields.is_empty()
    }

    fn push_message(&mut self, message: String) {
        self.messages.push(message);
    }

    fn push_field(&mut self, field: String, reason: String) {
        self.fields.entry(field).or_default().push(reason);
    }

    fn clear(&mut self) {
        self.messages.clear();
        self.fields.clear();
    }
}

/// Errors and warnings gathered during one operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    errors: Entries,
    warnings: Entries,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push_message(message.into());
    }

    pub fn add_field_error(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.errors.push_field(field.into(), reason.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push_message(message.into());
    }

    pub fn add_field_warning(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.warnings.push_field(field.into(), reason.into());
    }

    #[must_use]
    pub fn errors(&self) -> &Entries {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &Entries {
        &self.warnings
    }

    /// Field-level errors
    #[must_use]
    pub fn field_errors(&self) -> &BTreeMap<String, Vec<String>> {
        self.errors.fields()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn has_field_errors(&self) -> bool {
        !self.errors.fields.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Drop everything recorded so far
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_are_independent() {
        let mut report = Report::new();
        report.add_error("Error select all");
        report.add_field_error("title", "Invalid min length");
        report.add_field_error("title", "Invalid email value");
        report.add_warning("slow query");
        report.add_field_warning("date_start", "rounded");

        assert_eq!(report.errors().messages(), ["Error select all"]);
        assert_eq!(
            report.errors().field("title"),
            ["Invalid min length", "Invalid email value"]
        );
        assert!(report.errors().field("date_start").is_empty());
        assert_eq!(report.warnings().field("date_start"), ["rounded"]);
        assert!(report.has_errors());
        assert!(report.has_field_errors());
        assert!(report.has_warnings());
    }

    #[test]
    fn test_message_errors_are_not_field_errors() {
        let mut report = Report::new();
        report.add_error("Error creating");
        assert!(report.has_errors());
        assert!(!report.has_field_errors());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut report = Report::new();
        report.add_error("a");
        report.add_field_error("f", "b");
        report.add_warning("c");
        report.reset();
        assert_eq!(report, Report::new());
    }

    #[test]
    fn test_serializes_for_responses() {
        let mut report = Report::new();
        report.add_field_error("title", "field is required");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"]["fields"]["title"][0], "field is required");
        assert_eq!(json["warnings"]["messages"].as_array().unwrap().len(), 0);
    }
}
