//! Metadata editor controller
//!
//! Page-level state for the metadata editor: the directory cache, the form,
//! the type-ahead inputs, the submit control, the error log and the person
//! lookup. The host event loop forwards user events here.
//!
//! ## Lifecycle
//!
//! ```text
//! page load ──► load_directory()
//! type select ─► select_type()          (re-derives row visibility)
//! id blur ─────► identifier_blurred()   (label Add/Update, maybe fetch)
//! submit ──────► save()                 (= begin_save + POST + finish_save)
//! ```
//!
//! Network completions are applied by the `finish_*`/`apply_*` methods, so a
//! host that dispatches requests itself can interleave other events between
//! dispatch and completion. The submit control stays disabled in between.

use std::sync::Arc;
use std::time::Instant;

use genweb_types::{fields, Identifier, MetadataRecord, Pool};

use crate::api::{ApiResult, GenwebApi};
use crate::cache::{Directory, DirectoryCache};
use crate::config::EditorConfig;
use crate::error_log::ErrorLog;
use crate::form::{Form, PopulateReport};
use crate::people::{self, Expansion, PersonView};
use crate::typeahead::TypeAhead;
use crate::visibility::VisibilityRules;

/// Type-ahead input bound to the record identifier
pub const IDENTIFIER_INPUT: &str = "id";
/// Type-ahead input of the person lookup
pub const PERSON_INPUT: &str = "person";

// =============================================================================
// SUBMIT CONTROL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitLabel {
    #[default]
    Add,
    Update,
}

impl SubmitLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitLabel::Add => "Add",
            SubmitLabel::Update => "Update",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: SubmitLabel,
    pub enabled: bool,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            label: SubmitLabel::Add,
            enabled: true,
        }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// What an identifier blur decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlurOutcome {
    /// Metadata pool not loaded yet; nothing changed
    CacheNotLoaded,
    /// Unknown identifier; label is "Add", form untouched
    NewRecord,
    /// Known identifier; label is "Update" and the record must be fetched
    Existing(Identifier),
}

/// An in-flight save. Obtained from [`MetadataEditor::begin_save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub id: Identifier,
    pub record: MetadataRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
    /// A save from this control is already in flight
    Busy,
}

// =============================================================================
// EDITOR
// =============================================================================

pub struct MetadataEditor<A, D = DirectoryCache> {
    api: Arc<A>,
    directory: D,
    rules: VisibilityRules,
    form: Form,
    typeahead: TypeAhead,
    submit: SubmitControl,
    errors: ErrorLog,
    person_view: PersonView,
}

impl<A: GenwebApi> MetadataEditor<A, DirectoryCache> {
    pub fn new(api: Arc<A>, config: &EditorConfig) -> Self {
        Self::with_directory(api, config, DirectoryCache::new())
    }
}

impl<A: GenwebApi, D: Directory> MetadataEditor<A, D> {
    pub fn with_directory(api: Arc<A>, config: &EditorConfig, directory: D) -> Self {
        let mut typeahead = TypeAhead::from_config(config);
        typeahead.register(IDENTIFIER_INPUT, Pool::Metadata, false);
        typeahead.register(PERSON_INPUT, Pool::People, true);

        Self {
            api,
            directory,
            rules: VisibilityRules::standard(),
            form: Form::standard(),
            typeahead,
            submit: SubmitControl::default(),
            errors: ErrorLog::new(),
            person_view: PersonView::default(),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn rules(&self) -> &VisibilityRules {
        &self.rules
    }

    pub fn typeahead(&self) -> &TypeAhead {
        &self.typeahead
    }

    pub fn submit(&self) -> SubmitControl {
        self.submit
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn person_view(&self) -> &PersonView {
        &self.person_view
    }

    // -------------------------------------------------------------------------
    // Page load
    // -------------------------------------------------------------------------

    /// Populate both identifier pools; failures go to the error log
    pub async fn load_directory(&mut self) {
        for pool in Pool::ALL {
            self.load_pool(pool).await;
        }
    }

    pub async fn load_pool(&mut self, pool: Pool) {
        let result = self.directory.load(self.api.as_ref(), pool).await;
        if let Err(err) = result {
            self.errors.report(&err);
        }
    }

    // -------------------------------------------------------------------------
    // Form editing
    // -------------------------------------------------------------------------

    /// Type selector change
    pub fn select_type(&mut self, record_type: &str) {
        self.form.set_record_type(record_type);
        self.rules.apply(&mut self.form);
    }

    /// Edit of a plain form row; returns false for unknown fields
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        if field == fields::ID {
            self.type_identifier(value);
            return true;
        }
        self.form.set_value(field, value)
    }

    // -------------------------------------------------------------------------
    // Identifier input
    // -------------------------------------------------------------------------

    /// Keystroke in the identifier input; refreshes its suggestions
    pub fn type_identifier(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.form.set_value(fields::ID, text.clone());
        self.typeahead.set_text(IDENTIFIER_INPUT, text);
        self.typeahead.show(IDENTIFIER_INPUT, true, &self.directory);
    }

    pub fn focus_identifier(&mut self) {
        self.typeahead.focus(IDENTIFIER_INPUT);
        self.typeahead.show(IDENTIFIER_INPUT, true, &self.directory);
    }

    /// Copy the highlighted identifier suggestion into the form
    pub fn select_identifier_suggestion(&mut self) {
        if let Some(text) = self.typeahead.select(IDENTIFIER_INPUT) {
            let text = text.to_string();
            self.form.set_value(fields::ID, text);
        }
    }

    /// Decide between "Add" and "Update" for the current identifier.
    ///
    /// Does not fetch; see [`Self::identifier_blurred`].
    pub fn on_identifier_blur(&mut self) -> BlurOutcome {
        if !self.directory.is_loaded(Pool::Metadata) {
            return BlurOutcome::CacheNotLoaded;
        }

        let id = self.current_identifier();
        if self.directory.contains(Pool::Metadata, id.as_str()) {
            self.submit.label = SubmitLabel::Update;
            BlurOutcome::Existing(id)
        } else {
            self.submit.label = SubmitLabel::Add;
            BlurOutcome::NewRecord
        }
    }

    /// Blur handler: label switch plus fetch-and-populate for known records
    pub async fn identifier_blurred(&mut self) -> BlurOutcome {
        let outcome = self.on_identifier_blur();
        if let BlurOutcome::Existing(id) = &outcome {
            let result = self.api.fetch_metadata(id).await;
            self.apply_loaded_record(result);
        }
        outcome
    }

    /// Apply a fetched record: clear, populate, re-derive visibility.
    /// Returns `None` when the fetch failed (the error is logged).
    pub fn apply_loaded_record(
        &mut self,
        result: ApiResult<MetadataRecord>,
    ) -> Option<PopulateReport> {
        match result {
            Ok(record) => {
                self.form.clear();
                let report = self.form.populate(&record);
                self.rules.apply(&mut self.form);
                Some(report)
            }
            Err(err) => {
                self.errors.report(&err);
                None
            }
        }
    }

    fn current_identifier(&self) -> Identifier {
        Identifier::from(self.form.value(fields::ID).unwrap_or_default())
    }

    // -------------------------------------------------------------------------
    // Save
    // -------------------------------------------------------------------------

    /// Disable the submit control and snapshot the form for sending.
    /// `None` while another save from this control is in flight.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        if !self.submit.enabled {
            return None;
        }
        self.submit.enabled = false;

        let record = self.form.serialize(&self.rules);
        let id = Identifier::from(record.id().unwrap_or_default());
        Some(SaveTicket { id, record })
    }

    /// Apply the server's answer to a save started by [`Self::begin_save`]
    pub fn finish_save(&mut self, ticket: SaveTicket, result: ApiResult<()>) -> SaveOutcome {
        self.submit.enabled = true;

        match result {
            Ok(()) => {
                tracing::info!(id = %ticket.id, "metadata saved");
                if self.directory.record_created(&ticket.id) {
                    tracing::debug!(id = %ticket.id, "new identifier cached");
                }
                SaveOutcome::Saved
            }
            Err(err) => {
                self.errors.report(&err);
                SaveOutcome::Failed
            }
        }
    }

    pub async fn save(&mut self) -> SaveOutcome {
        let Some(ticket) = self.begin_save() else {
            return SaveOutcome::Busy;
        };
        let result = self.api.save_metadata(&ticket.id, &ticket.record).await;
        self.finish_save(ticket, result)
    }

    // -------------------------------------------------------------------------
    // Person lookup
    // -------------------------------------------------------------------------

    pub fn type_person(&mut self, text: impl Into<String>) {
        self.typeahead.set_text(PERSON_INPUT, text);
        self.typeahead.show(PERSON_INPUT, true, &self.directory);
    }

    pub fn focus_person(&mut self) {
        self.typeahead.focus(PERSON_INPUT);
        self.typeahead.show(PERSON_INPUT, true, &self.directory);
    }

    pub fn select_person_suggestion(&mut self) -> Option<String> {
        self.typeahead.select(PERSON_INPUT).map(str::to_string)
    }

    /// Strict blur: a non-member name is cleared after the configured delay
    pub fn person_blurred(&mut self, now: Instant) -> bool {
        self.typeahead.dismiss_on_blur(PERSON_INPUT, &self.directory, now)
    }

    /// Render the person currently in the lookup input
    pub async fn load_person(&mut self, expansion: Expansion) -> usize {
        self.person_view.clear();
        let root = Identifier::from(self.typeahead.text(PERSON_INPUT).unwrap_or_default());

        people::render(
            self.api.as_ref(),
            &self.directory,
            &root,
            expansion,
            &mut self.person_view,
            &mut self.errors,
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Timers
    // -------------------------------------------------------------------------

    /// Run due deferred actions; returns the ids of inputs that were cleared
    pub fn poll(&mut self, now: Instant) -> Vec<String> {
        let cleared = self.typeahead.poll(now, &self.directory);
        if cleared.iter().any(|id| id == IDENTIFIER_INPUT) {
            self.form.set_value(fields::ID, "");
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryApi;
    use serde_json::json;

    fn record(value: serde_json::Value) -> MetadataRecord {
        serde_json::from_value(value).unwrap()
    }

    async fn editor(api: InMemoryApi) -> MetadataEditor<InMemoryApi> {
        let mut editor = MetadataEditor::new(Arc::new(api), &EditorConfig::default());
        editor.load_directory().await;
        editor
    }

    #[tokio::test]
    async fn blur_before_load_is_a_no_op() {
        let mut editor = MetadataEditor::new(Arc::new(InMemoryApi::new()), &EditorConfig::default());
        editor.type_identifier("m1");

        assert_eq!(editor.identifier_blurred().await, BlurOutcome::CacheNotLoaded);
        assert!(editor.api().requests().is_empty());
        assert_eq!(editor.submit().label, SubmitLabel::Add);
    }

    #[tokio::test]
    async fn identifier_suggestions_come_from_the_metadata_pool() {
        let api = InMemoryApi::new()
            .with_metadata(record(json!({"id": "wedding-1950"})))
            .with_metadata(record(json!({"id": "funeral-1980"})));
        let mut editor = editor(api).await;

        editor.type_identifier("wed");
        let panel = editor.typeahead().panel(IDENTIFIER_INPUT).unwrap();
        assert_eq!(panel.suggestions(), ["wedding-1950".to_string()]);

        editor.typeahead.highlight_next(IDENTIFIER_INPUT);
        editor.select_identifier_suggestion();
        assert_eq!(editor.form().value("id"), Some("wedding-1950"));
    }

    #[tokio::test]
    async fn double_submit_is_refused_while_in_flight() {
        let mut editor = editor(InMemoryApi::new()).await;
        editor.type_identifier("m1");

        let ticket = editor.begin_save().unwrap();
        assert!(!editor.submit().enabled);
        assert!(editor.begin_save().is_none());
        assert_eq!(editor.save().await, SaveOutcome::Busy);

        assert_eq!(editor.finish_save(ticket, Ok(())), SaveOutcome::Saved);
        assert!(editor.submit().enabled);
        assert!(editor.directory().contains(Pool::Metadata, "m1"));
    }

    #[tokio::test]
    async fn loading_a_record_clears_stale_values() {
        let api = InMemoryApi::new().with_metadata(record(json!({
            "id": "m1",
            "type": "href",
            "folder": "/docs"
        })));
        let mut editor = editor(api).await;
        editor.select_type("picture");
        editor.set_field("caption", "left over");
        editor.type_identifier("m1");

        editor.identifier_blurred().await;

        assert_eq!(editor.form().value("caption"), Some(""));
        assert_eq!(editor.form().value("folder"), Some("/docs"));
        assert_eq!(editor.form().is_visible("folder"), Some(true));
        assert_eq!(editor.form().is_visible("caption"), Some(false));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_form_and_logs() {
        let api = InMemoryApi::new().with_metadata(record(json!({"id": "m1", "title": "T"})));
        let mut editor = editor(api).await;
        editor.set_field("title", "mine");
        editor.type_identifier("m1");
        editor.api().fail_next(500, "database locked");

        let outcome = editor.identifier_blurred().await;

        assert_eq!(outcome, BlurOutcome::Existing("m1".into()));
        assert_eq!(editor.submit().label, SubmitLabel::Update);
        assert_eq!(editor.form().value("title"), Some("mine"));
        assert_eq!(editor.errors().latest().unwrap().message, "database locked");
    }

    #[tokio::test]
    async fn person_lookup_renders_known_people_only() {
        let api = InMemoryApi::new().with_person(genweb_types::PersonRecord {
            id: "p1".into(),
            surname: "Doe".into(),
            ..Default::default()
        });
        let mut editor = editor(api).await;

        editor.type_person("nobody");
        assert_eq!(editor.load_person(Expansion::ALL).await, 0);

        editor.type_person("p1");
        assert_eq!(editor.load_person(Expansion::NONE).await, 1);
        assert_eq!(editor.person_view().person[0].surname, "Doe");
    }

    #[tokio::test]
    async fn strict_person_input_clears_after_blur() {
        let api = InMemoryApi::new().with_person(genweb_types::PersonRecord {
            id: "p1".into(),
            ..Default::default()
        });
        let mut editor = editor(api).await;
        editor.type_person("p");

        let t0 = Instant::now();
        assert!(editor.person_blurred(t0));
        let cleared = editor.poll(t0 + std::time::Duration::from_millis(400));

        assert_eq!(cleared, vec![PERSON_INPUT.to_string()]);
        assert_eq!(editor.typeahead().text(PERSON_INPUT), Some(""));
    }
}
