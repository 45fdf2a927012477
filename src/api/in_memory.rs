//! In-process stand-in for the genweb server.
//!
//! Answers like the real `/api/v1` handlers (404 with a plain-text reason for
//! unknown identifiers, `people` text split into a list on save) and records
//! every request it sees. Failures can be
//! queued with [`InMemoryApi::fail_next`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use genweb_types::{fields, Identifier, MetadataRecord, PersonRecord, Pool};

use super::{ApiResult, GenwebApi, API_PREFIX};
use crate::error::ApiError;

/// A request as seen by the in-memory server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
}

#[derive(Default)]
struct State {
    people: Vec<PersonRecord>,
    metadata: Vec<(Identifier, MetadataRecord)>,
    failures: VecDeque<ApiError>,
    requests: Vec<RecordedRequest>,
}

#[derive(Default)]
pub struct InMemoryApi {
    state: Mutex<State>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_person(self, person: PersonRecord) -> Self {
        self.state().people.push(person);
        self
    }

    pub fn with_metadata(self, record: MetadataRecord) -> Self {
        let id = Identifier::from(record.id().unwrap_or_default());
        self.put_metadata(id, record);
        self
    }

    /// The next request answers with `status` and `body` instead of its
    /// normal response. Queued failures are consumed in order.
    pub fn fail_next(&self, status: u16, body: impl Into<String>) {
        self.state().failures.push_back(ApiError::Status {
            status,
            body: body.into(),
        });
    }

    /// The next request fails before reaching the server
    pub fn disconnect_next(&self, reason: impl Into<String>) {
        self.state()
            .failures
            .push_back(ApiError::Transport(reason.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn stored_metadata(&self, id: &str) -> Option<MetadataRecord> {
        self.state()
            .metadata
            .iter()
            .find(|(stored, _)| stored == id)
            .map(|(_, record)| record.clone())
    }

    fn put_metadata(&self, id: Identifier, record: MetadataRecord) {
        let mut state = self.state();
        match state.metadata.iter_mut().find(|(stored, _)| *stored == id) {
            Some(slot) => slot.1 = record,
            None => state.metadata.push((id, record)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Log the request and pop a queued failure, if any
    fn begin(&self, method: &'static str, path: String) -> ApiResult<()> {
        let mut state = self.state();
        state.requests.push(RecordedRequest { method, path });
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn path(pool: Pool, id: Option<&Identifier>) -> String {
    match id {
        Some(id) => format!("{API_PREFIX}/{pool}/{id}"),
        None => format!("{API_PREFIX}/{pool}"),
    }
}

fn not_found(what: &str, id: &Identifier) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("{what} not found: {id}"),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl GenwebApi for InMemoryApi {
    async fn list_identifiers(&self, pool: Pool) -> ApiResult<Vec<Identifier>> {
        self.begin("GET", path(pool, None))?;
        let state = self.state();
        Ok(match pool {
            Pool::People => state.people.iter().map(|p| p.id.clone()).collect(),
            Pool::Metadata => state.metadata.iter().map(|(id, _)| id.clone()).collect(),
        })
    }

    async fn fetch_person(&self, id: &Identifier) -> ApiResult<PersonRecord> {
        self.begin("GET", path(Pool::People, Some(id)))?;
        self.state()
            .people
            .iter()
            .find(|p| p.id == *id)
            .cloned()
            .ok_or_else(|| not_found("Person", id))
    }

    async fn fetch_metadata(&self, id: &Identifier) -> ApiResult<MetadataRecord> {
        self.begin("GET", path(Pool::Metadata, Some(id)))?;
        self.state()
            .metadata
            .iter()
            .find(|(stored, _)| stored == id)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| not_found("Metadata", id))
    }

    async fn save_metadata(&self, id: &Identifier, record: &MetadataRecord) -> ApiResult<()> {
        self.begin("POST", path(Pool::Metadata, Some(id)))?;
        if id.is_empty() {
            // `/api/v1/metadata/` is not an API route
            return Err(ApiError::Status {
                status: 404,
                body: "Not found".to_string(),
            });
        }
        let mut record = record.clone();
        if let Some(people) = record.get_str(fields::PEOPLE).map(split_people) {
            record.insert(fields::PEOPLE, people);
        }
        self.put_metadata(id.clone(), record);
        Ok(())
    }
}

/// Split on runs of whitespace, `:`, `;` and `,`. Leading or trailing
/// separators yield empty items, as the server's regex split does.
fn split_people(text: &str) -> Vec<String> {
    let is_separator = |c: char| c.is_whitespace() || matches!(c, ':' | ';' | ',');
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_separator = false;

    for c in text.chars() {
        if is_separator(c) {
            if !in_separator {
                items.push(std::mem::take(&mut current));
                in_separator = true;
            }
        } else {
            current.push(c);
            in_separator = false;
        }
    }
    items.push(current);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> MetadataRecord {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn unknown_identifiers_are_404_with_a_reason() {
        let api = InMemoryApi::new();
        let err = api.fetch_metadata(&"m9".into()).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 404,
                body: "Metadata not found: m9".into()
            }
        );
    }

    #[tokio::test]
    async fn queued_failures_apply_to_the_next_request_only() {
        let api = InMemoryApi::new().with_metadata(record(json!({"id": "m1"})));
        api.fail_next(500, "boom");

        assert!(api.list_identifiers(Pool::Metadata).await.is_err());
        let ids = api.list_identifiers(Pool::Metadata).await.unwrap();
        assert_eq!(ids, vec![Identifier::from("m1")]);
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn saves_replace_or_append() {
        let api = InMemoryApi::new().with_metadata(record(json!({"id": "m1", "title": "a"})));
        api.save_metadata(&"m1".into(), &record(json!({"id": "m1", "title": "b"})))
            .await
            .unwrap();
        api.save_metadata(&"m2".into(), &record(json!({"id": "m2"})))
            .await
            .unwrap();

        assert_eq!(
            api.stored_metadata("m1").unwrap().get_str("title"),
            Some("b")
        );
        let ids = api.list_identifiers(Pool::Metadata).await.unwrap();
        assert_eq!(ids, vec![Identifier::from("m1"), Identifier::from("m2")]);
        let posts: Vec<_> = api
            .requests()
            .into_iter()
            .filter(|request| request.method == "POST")
            .map(|request| request.path)
            .collect();
        assert_eq!(posts, ["/api/v1/metadata/m1", "/api/v1/metadata/m2"]);
    }

    #[tokio::test]
    async fn saved_people_text_is_split_into_a_list() {
        let api = InMemoryApi::new();
        api.save_metadata(&"m1".into(), &record(json!({"people": "a\nb, c;d"})))
            .await
            .unwrap();

        let stored = api.stored_metadata("m1").unwrap();
        assert_eq!(stored.get_list("people"), ["a", "b", "c", "d"]);
    }

    #[test]
    fn people_split_keeps_edge_items() {
        assert_eq!(split_people("a\nb"), ["a", "b"]);
        assert_eq!(split_people(" a\n\nb "), ["", "a", "b", ""]);
        assert_eq!(split_people(""), [""]);
    }

    #[tokio::test]
    async fn disconnects_surface_as_transport_errors() {
        let api = InMemoryApi::new();
        api.disconnect_next("connection refused");

        let err = api.list_identifiers(Pool::People).await.unwrap_err();
        assert_eq!(err, ApiError::Transport("connection refused".into()));
        assert!(api.list_identifiers(Pool::People).await.is_ok());
    }
}
