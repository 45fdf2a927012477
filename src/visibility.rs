//! Field visibility rules
//!
//! A static table from field name to the record types it is relevant for.
//! Applying the table only toggles row visibility; values in hidden rows are
//! left alone.

use genweb_types::RecordType::{Href, Inline, Picture};
use genweb_types::{fields, RecordType};

use crate::form::Form;

const ALL_TYPES: &[RecordType] = &[Inline, Href, Picture];

/// Relevance table used by the metadata editor
const STANDARD_RULES: &[(&str, &[RecordType])] = &[
    (fields::ID, ALL_TYPES),
    (fields::TITLE, ALL_TYPES),
    (fields::PATH, ALL_TYPES),
    (fields::FILE, ALL_TYPES),
    (fields::PEOPLE, ALL_TYPES),
    (fields::MOD_DATE, ALL_TYPES),
    (fields::FOLDER, &[Href]),
    (fields::ORIGINAL, &[Picture]),
    (fields::HEIGHT, &[Picture]),
    (fields::CAPTION, &[Picture]),
    (fields::WIDTH, &[Picture]),
    (fields::CONTENTS, &[Inline]),
    (fields::REFERENCES, &[Inline]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRules {
    rules: Vec<(&'static str, Vec<RecordType>)>,
}

impl VisibilityRules {
    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.iter().map(|(field, types)| (*field, types.to_vec())))
    }

    pub fn new(rules: impl IntoIterator<Item = (&'static str, Vec<RecordType>)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Fields governed by the table, in table order
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(field, _)| *field)
    }

    pub fn relevant_types(&self, field: &str) -> Option<&[RecordType]> {
        self.rules
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, types)| types.as_slice())
    }

    /// Whether `field` is shown for the selector value `selected_type`.
    /// A selector value that is not a known record type shows nothing.
    pub fn is_shown(&self, field: &str, selected_type: &str) -> bool {
        let Ok(record_type) = selected_type.parse::<RecordType>() else {
            return false;
        };
        self.relevant_types(field)
            .is_some_and(|types| types.contains(&record_type))
    }

    pub fn shown_fields(&self, selected_type: &str) -> Vec<&'static str> {
        self.fields()
            .filter(|field| self.is_shown(field, selected_type))
            .collect()
    }

    /// Show or hide every governed row for the form's current type
    pub fn apply(&self, form: &mut Form) {
        let selected_type = form.record_type().to_string();
        for field in self.fields() {
            let shown = self.is_shown(field, &selected_type);
            if !form.set_visible(field, shown) {
                tracing::warn!(field, "visibility rule names a field with no form row");
            }
        }
    }
}

impl Default for VisibilityRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn picture_rows() {
        let rules = VisibilityRules::standard();
        assert_eq!(
            rules.shown_fields("picture"),
            vec!["id", "title", "path", "file", "people", "mod_date", "original", "height", "caption", "width"]
        );
    }

    #[test]
    fn unknown_type_hides_everything() {
        let rules = VisibilityRules::standard();
        assert!(rules.shown_fields("video").is_empty());
        assert!(rules.shown_fields("").is_empty());
    }

    #[test]
    fn apply_derives_visibility_from_the_type_alone() {
        let rules = VisibilityRules::standard();
        let mut form = Form::standard();

        form.set_record_type("picture");
        rules.apply(&mut form);
        assert_eq!(form.is_visible("caption"), Some(true));
        assert_eq!(form.is_visible("contents"), Some(false));

        form.set_value("caption", "hello");
        form.set_record_type("inline");
        rules.apply(&mut form);
        assert_eq!(form.is_visible("caption"), Some(false));
        assert_eq!(form.is_visible("contents"), Some(true));
        assert_eq!(form.value("caption"), Some("hello"));
    }

    proptest! {
        #[test]
        fn visibility_law(type_idx in 0usize..4, field_idx in 0usize..13) {
            let rules = VisibilityRules::standard();
            let types = ["inline", "href", "picture", "bogus"];
            let selected = types[type_idx];
            let field = STANDARD_RULES[field_idx].0;

            let expected = STANDARD_RULES[field_idx]
                .1
                .iter()
                .any(|t| t.as_str() == selected);
            prop_assert_eq!(rules.is_shown(field, selected), expected);

            let mut form = Form::standard();
            form.set_record_type(selected);
            rules.apply(&mut form);
            prop_assert_eq!(form.is_visible(field), Some(expected));
        }
    }
}
