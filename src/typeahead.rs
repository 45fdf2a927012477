//! Type-ahead engine
//!
//! Suggestions are plain substring matches: every whitespace-separated,
//! lowercased query word must occur somewhere in the lowercased candidate.
//! Results keep the pool's order and are capped.
//!
//! Each registered input owns one [`SuggestionPanel`]. Strict inputs clear a
//! value that is not a pool member some time after losing focus; the delay
//! lets a click on a suggestion land first. The host event loop drives
//! these deferred clears through [`TypeAhead::poll`].

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use genweb_types::{Identifier, Pool};

use crate::cache::Directory;
use crate::config::EditorConfig;

// =============================================================================
// MATCHING
// =============================================================================

/// Lowercased query words, computed once per keystroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    words: Vec<String>,
}

impl Query {
    pub fn new(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// True iff every word is a substring of `candidate` (case-insensitive).
    /// An empty query matches everything.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.to_lowercase();
        self.words.iter().all(|word| candidate.contains(word.as_str()))
    }
}

pub fn words_match(query: &str, candidate: &str) -> bool {
    Query::new(query).matches(candidate)
}

/// Order-preserving filter of `candidates`, truncated to `max_results`
pub fn suggest<'a>(candidates: &'a [Identifier], query: &str, max_results: usize) -> Vec<&'a Identifier> {
    let query = Query::new(query);
    candidates
        .iter()
        .filter(|candidate| query.matches(candidate.as_str()))
        .take(max_results)
        .collect()
}

// =============================================================================
// SUGGESTION PANEL
// =============================================================================

/// Suggestion list attached to one input.
///
/// The rendered list starts with a blank entry, so its size is
/// `suggestions.len() + 1`; no highlight means the blank entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionPanel {
    suggestions: Vec<String>,
    visible: bool,
    highlighted: Option<usize>,
}

impl SuggestionPanel {
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Rows the panel renders, blank entry included
    pub fn size(&self) -> usize {
        self.suggestions.len() + 1
    }

    /// Value a selection would copy into the input
    pub fn selected_value(&self) -> &str {
        self.highlighted
            .and_then(|idx| self.suggestions.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn reset(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
        self.highlighted = None;
    }
}

// =============================================================================
// INPUT STATE
// =============================================================================

/// A text input bound to an identifier pool
#[derive(Debug, Clone)]
pub struct TypeAheadInput {
    pool: Pool,
    /// Clear values that are not pool members after blur
    strict: bool,
    text: String,
    panel: SuggestionPanel,
    pending_clear: Option<Instant>,
}

impl TypeAheadInput {
    pub fn pool(&self) -> Pool {
        self.pool
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn panel(&self) -> &SuggestionPanel {
        &self.panel
    }

    /// Deadline of a scheduled blur-clear, if any
    pub fn pending_clear(&self) -> Option<Instant> {
        self.pending_clear
    }
}

/// All type-ahead inputs of a page
#[derive(Debug, Clone)]
pub struct TypeAhead {
    max_results: usize,
    clear_delay: Duration,
    inputs: BTreeMap<String, TypeAheadInput>,
}

impl TypeAhead {
    pub fn new(max_results: usize, clear_delay: Duration) -> Self {
        Self {
            max_results,
            clear_delay,
            inputs: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.max_type_ahead, config.blur_clear_delay())
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn register(&mut self, input_id: impl Into<String>, pool: Pool, strict: bool) {
        self.inputs.insert(
            input_id.into(),
            TypeAheadInput {
                pool,
                strict,
                text: String::new(),
                panel: SuggestionPanel::default(),
                pending_clear: None,
            },
        );
    }

    pub fn input(&self, input_id: &str) -> Option<&TypeAheadInput> {
        self.inputs.get(input_id)
    }

    pub fn text(&self, input_id: &str) -> Option<&str> {
        self.inputs.get(input_id).map(TypeAheadInput::text)
    }

    pub fn panel(&self, input_id: &str) -> Option<&SuggestionPanel> {
        self.inputs.get(input_id).map(TypeAheadInput::panel)
    }

    /// Keystroke or programmatic assignment
    pub fn set_text(&mut self, input_id: &str, text: impl Into<String>) {
        if let Some(input) = self.inputs.get_mut(input_id) {
            input.text = text.into();
        }
    }

    /// Recompute the suggestions for the input's current text.
    ///
    /// With `autoshow` the panel becomes visible even when nothing matched.
    /// Does nothing while the input's pool is not loaded.
    pub fn show(&mut self, input_id: &str, autoshow: bool, directory: &dyn Directory) -> bool {
        let max_results = self.max_results;
        let Some(input) = self.inputs.get_mut(input_id) else {
            return false;
        };
        let Some(candidates) = directory.candidates(input.pool) else {
            return false;
        };

        let matches: Vec<String> = suggest(candidates, &input.text, max_results)
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect();
        tracing::debug!(input_id, query = %input.text, count = matches.len(), "suggestions");

        input.panel.reset(matches);
        if autoshow {
            input.panel.visible = true;
        }
        true
    }

    pub fn highlight_next(&mut self, input_id: &str) {
        if let Some(input) = self.inputs.get_mut(input_id) {
            let panel = &mut input.panel;
            panel.highlighted = match panel.highlighted {
                _ if panel.suggestions.is_empty() => None,
                None => Some(0),
                Some(idx) => Some((idx + 1).min(panel.suggestions.len() - 1)),
            };
        }
    }

    pub fn highlight_previous(&mut self, input_id: &str) {
        if let Some(input) = self.inputs.get_mut(input_id) {
            input.panel.highlighted = match input.panel.highlighted {
                Some(0) | None => None,
                Some(idx) => Some(idx - 1),
            };
        }
    }

    /// Copy the highlighted suggestion into the input and hide the panel
    pub fn select(&mut self, input_id: &str) -> Option<&str> {
        let input = self.inputs.get_mut(input_id)?;
        input.text = input.panel.selected_value().to_string();
        input.panel.visible = false;
        Some(input.text.as_str())
    }

    pub fn hide(&mut self, input_id: &str) {
        if let Some(input) = self.inputs.get_mut(input_id) {
            input.panel.visible = false;
        }
    }

    /// Focus cancels any blur-clear still waiting for this input
    pub fn focus(&mut self, input_id: &str) {
        if let Some(input) = self.inputs.get_mut(input_id) {
            if input.pending_clear.take().is_some() {
                tracing::debug!(input_id, "pending blur-clear cancelled by focus");
            }
        }
    }

    /// Schedule a clear when a strict input loses focus holding a value
    /// that is not in its pool. Returns true if a clear was scheduled.
    pub fn dismiss_on_blur(&mut self, input_id: &str, directory: &dyn Directory, now: Instant) -> bool {
        let clear_delay = self.clear_delay;
        let Some(input) = self.inputs.get_mut(input_id) else {
            return false;
        };
        if !input.strict || !directory.is_loaded(input.pool) {
            return false;
        }
        if directory.contains(input.pool, &input.text) {
            return false;
        }

        input.pending_clear = Some(now + clear_delay);
        true
    }

    /// Run every blur-clear whose deadline has passed.
    ///
    /// A value that became a pool member during the window (a suggestion
    /// click landed) is kept. Returns the ids of the inputs that were cleared.
    pub fn poll(&mut self, now: Instant, directory: &dyn Directory) -> Vec<String> {
        let mut cleared = Vec::new();

        for (input_id, input) in self.inputs.iter_mut() {
            match input.pending_clear {
                Some(deadline) if deadline <= now => {}
                _ => continue,
            }
            input.pending_clear = None;

            if directory.contains(input.pool, &input.text) {
                continue;
            }
            input.text.clear();
            input.panel.visible = false;
            cleared.push(input_id.clone());
        }

        cleared
    }

    /// Earliest pending deadline, for hosts that schedule a wake-up timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inputs.values().filter_map(|i| i.pending_clear).min()
    }
}

impl Default for TypeAhead {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}
