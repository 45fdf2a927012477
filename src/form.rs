//! Metadata form model
//!
//! One row per known field, each holding the text of its input control and
//! a visibility flag. Presentation layers bind to these rows; nothing here
//! knows about the page.
//!
//! List fields (`people`, `references`) arrive as JSON arrays and are edited
//! as newline-separated text. They go back out as that text unchanged; the
//! server splits it.

use genweb_types::{fields, MetadataRecord};
use serde_json::Value;

use crate::visibility::VisibilityRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single text value (numbers travel as text too)
    Scalar,
    /// Array of strings on load, newline-separated text on save
    List,
}

/// Static description of one form row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Emptied by [`Form::clear`]; the id row is owned by the caller
    pub cleared_on_reset: bool,
}

impl FieldDescriptor {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
            cleared_on_reset: true,
        }
    }

    pub const fn list(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::List,
            cleared_on_reset: true,
        }
    }

    pub const fn kept_on_reset(self) -> Self {
        Self {
            cleared_on_reset: false,
            ..self
        }
    }
}

pub const STANDARD_FIELDS: [FieldDescriptor; 13] = [
    FieldDescriptor::scalar(fields::ID).kept_on_reset(),
    FieldDescriptor::scalar(fields::TITLE),
    FieldDescriptor::scalar(fields::PATH),
    FieldDescriptor::scalar(fields::FILE),
    FieldDescriptor::scalar(fields::MOD_DATE),
    FieldDescriptor::list(fields::PEOPLE),
    FieldDescriptor::scalar(fields::CAPTION),
    FieldDescriptor::scalar(fields::FOLDER),
    FieldDescriptor::scalar(fields::HEIGHT),
    FieldDescriptor::scalar(fields::WIDTH),
    FieldDescriptor::scalar(fields::CONTENTS),
    FieldDescriptor::list(fields::REFERENCES),
    FieldDescriptor::scalar(fields::ORIGINAL),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    descriptor: FieldDescriptor,
    value: String,
    visible: bool,
}

impl FormRow {
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Result of [`Form::populate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Fields written into rows (the type selector included)
    pub applied: Vec<String>,
    /// Server fields with no matching row; ignored for forward compatibility
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Value of the record-type selector
    record_type: String,
    rows: Vec<FormRow>,
}

impl Form {
    pub fn new(descriptors: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            record_type: String::new(),
            rows: descriptors
                .into_iter()
                .map(|descriptor| FormRow {
                    descriptor,
                    value: String::new(),
                    visible: true,
                })
                .collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_FIELDS)
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Selector change; callers re-run the visibility rules afterwards
    pub fn set_record_type(&mut self, record_type: impl Into<String>) {
        self.record_type = record_type.into();
    }

    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }

    pub fn row(&self, field: &str) -> Option<&FormRow> {
        self.rows.iter().find(|row| row.name() == field)
    }

    fn row_mut(&mut self, field: &str) -> Option<&mut FormRow> {
        self.rows.iter_mut().find(|row| row.name() == field)
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.row(field).map(FormRow::value)
    }

    /// Returns false when the form has no such row
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.row_mut(field) {
            Some(row) => {
                row.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, field: &str) -> Option<bool> {
        self.row(field).map(FormRow::is_visible)
    }

    pub fn set_visible(&mut self, field: &str, visible: bool) -> bool {
        match self.row_mut(field) {
            Some(row) => {
                row.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Empty every resettable row. The id row and the type selector are
    /// left to the caller.
    pub fn clear(&mut self) {
        for row in self.rows.iter_mut().filter(|r| r.descriptor.cleared_on_reset) {
            row.value.clear();
        }
    }

    /// Copy a server record into the rows.
    ///
    /// `id` is skipped, `type` drives the selector, list fields are joined
    /// with newlines. Fields without a row are logged and ignored.
    pub fn populate(&mut self, record: &MetadataRecord) -> PopulateReport {
        let mut report = PopulateReport::default();

        for (field, value) in record.iter() {
            if field == fields::ID {
                continue;
            }
            if field == fields::TYPE {
                self.record_type = scalar_text(value);
                report.applied.push(field.clone());
                continue;
            }

            let Some(row) = self.row_mut(field) else {
                tracing::warn!(field = %field, value = %value, "unknown metadata field ignored");
                report.ignored.push(field.clone());
                continue;
            };

            row.value = match (row.descriptor.kind, value) {
                (FieldKind::List, Value::Array(items)) => {
                    items.iter().map(scalar_text).collect::<Vec<_>>().join("\n")
                }
                _ => scalar_text(value),
            };
            report.applied.push(field.clone());
        }

        report
    }

    /// Wire shape of the current form: `type` plus every field the
    /// visibility table governs, hidden rows included.
    pub fn serialize(&self, rules: &VisibilityRules) -> MetadataRecord {
        let mut record = MetadataRecord::new();
        record.insert(fields::TYPE, self.record_type.clone());

        for field in rules.fields() {
            let Some(row) = self.row(field) else {
                continue;
            };
            record.insert(field, Value::String(row.value.clone()));
        }

        record
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::standard()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
