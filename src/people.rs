//! Person graph viewer
//!
//! Renders a person and, on request, their parents, spouses and children.
//! Related persons are rendered without expanding their own relations, so a
//! view never reaches further than one hop from the root.

use std::collections::VecDeque;
use std::fmt;

use genweb_types::{Identifier, PersonRecord, Pool};

use crate::api::GenwebApi;
use crate::cache::Directory;
use crate::error_log::ErrorLog;

/// Which relation categories of the root to render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expansion {
    pub parents: bool,
    pub spouses: bool,
    pub children: bool,
}

impl Expansion {
    pub const NONE: Expansion = Expansion {
        parents: false,
        spouses: false,
        children: false,
    };

    pub const ALL: Expansion = Expansion {
        parents: true,
        spouses: true,
        children: true,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// Container a summary line is appended to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Person,
    Parents,
    Spouses,
    Children,
}

/// One rendered line of the person view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSummary {
    pub id: Identifier,
    pub gender: String,
    pub surname: String,
    pub given: String,
    pub birthdate: Option<String>,
    pub deathdate: Option<String>,
}

impl From<&PersonRecord> for PersonSummary {
    fn from(person: &PersonRecord) -> Self {
        Self {
            id: person.id.clone(),
            gender: person.gender.clone(),
            surname: person.surname.clone(),
            given: person.given.clone(),
            birthdate: person.birthdate.clone(),
            deathdate: person.deathdate.clone(),
        }
    }
}

impl fmt::Display for PersonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        writeln!(f, "({}) {},{}", self.gender, self.surname, self.given)?;
        write!(
            f,
            "{} - {}",
            self.birthdate.as_deref().unwrap_or_default(),
            self.deathdate.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonView {
    pub person: Vec<PersonSummary>,
    pub parents: Vec<PersonSummary>,
    pub spouses: Vec<PersonSummary>,
    pub children: Vec<PersonSummary>,
}

impl PersonView {
    pub fn clear(&mut self) {
        self.person.clear();
        self.parents.clear();
        self.spouses.clear();
        self.children.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.person.is_empty()
            && self.parents.is_empty()
            && self.spouses.is_empty()
            && self.children.is_empty()
    }

    pub fn container(&self, target: Target) -> &[PersonSummary] {
        match target {
            Target::Person => &self.person,
            Target::Parents => &self.parents,
            Target::Spouses => &self.spouses,
            Target::Children => &self.children,
        }
    }

    fn container_mut(&mut self, target: Target) -> &mut Vec<PersonSummary> {
        match target {
            Target::Person => &mut self.person,
            Target::Parents => &mut self.parents,
            Target::Spouses => &mut self.spouses,
            Target::Children => &mut self.children,
        }
    }
}

/// Render `root` into `view`.
///
/// Does nothing (and sends no request) unless `root` is a known person.
/// Each failed fetch is logged and skipped; the rest of the view still
/// renders. Returns the number of persons rendered.
pub async fn render(
    api: &dyn GenwebApi,
    directory: &dyn Directory,
    root: &Identifier,
    expansion: Expansion,
    view: &mut PersonView,
    errors: &mut ErrorLog,
) -> usize {
    if !directory.contains(Pool::People, root.as_str()) {
        tracing::debug!(%root, "person not in directory; nothing rendered");
        return 0;
    }

    let mut rendered = 0;
    let mut queue = VecDeque::from([(root.clone(), Target::Person, expansion)]);

    while let Some((id, target, expansion)) = queue.pop_front() {
        let person = match api.fetch_person(&id).await {
            Ok(person) => person,
            Err(err) => {
                errors.report(&err);
                continue;
            }
        };

        view.container_mut(target).push(PersonSummary::from(&person));
        rendered += 1;

        let relations = [
            (expansion.parents, &person.parents, Target::Parents),
            (expansion.spouses, &person.spouses, Target::Spouses),
            (expansion.children, &person.children, Target::Children),
        ];
        for (wanted, related, target) in relations {
            if wanted {
                queue.extend(related.iter().map(|id| (id.clone(), target, Expansion::NONE)));
            }
        }
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryApi;
    use crate::cache::DirectoryCache;

    fn person(id: &str, parents: &[&str], spouses: &[&str], children: &[&str]) -> PersonRecord {
        let ids = |v: &[&str]| -> Vec<Identifier> { v.iter().map(|s| Identifier::from(*s)).collect() };
        PersonRecord {
            id: id.into(),
            gender: "F".into(),
            surname: "Doe".into(),
            given: id.to_uppercase(),
            birthdate: Some("1900".into()),
            deathdate: None,
            parents: ids(parents),
            spouses: ids(spouses),
            children: ids(children),
            metadata: Vec::new(),
        }
    }

    fn family() -> InMemoryApi {
        InMemoryApi::new()
            .with_person(person("root", &["mom"], &["wife"], &["kid"]))
            .with_person(person("mom", &["grandma"], &[], &["root"]))
            .with_person(person("grandma", &[], &[], &["mom"]))
            .with_person(person("wife", &[], &["root"], &["kid"]))
            .with_person(person("kid", &["root", "wife"], &[], &[]))
    }

    async fn loaded(api: &InMemoryApi) -> DirectoryCache {
        let mut cache = DirectoryCache::new();
        cache.load(api, Pool::People).await.unwrap();
        cache
    }

    #[test]
    fn summary_line_format() {
        let summary = PersonSummary::from(&person("p1", &[], &[], &[]));
        assert_eq!(summary.to_string(), "p1\n(F) Doe,P1\n1900 - ");
    }

    #[tokio::test]
    async fn expands_exactly_one_level() {
        let api = family();
        let cache = loaded(&api).await;
        let mut view = PersonView::default();
        let mut errors = ErrorLog::new();

        let count = render(&api, &cache, &"root".into(), Expansion::ALL, &mut view, &mut errors).await;

        assert_eq!(count, 4);
        assert_eq!(view.person[0].id, "root");
        assert_eq!(view.parents.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["mom"]);
        assert_eq!(view.spouses[0].id, "wife");
        assert_eq!(view.children[0].id, "kid");
        assert!(api.requests().iter().all(|r| r.path != "/api/v1/people/grandma"));
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn only_requested_relations_are_fetched() {
        let api = family();
        let cache = loaded(&api).await;
        let mut view = PersonView::default();
        let mut errors = ErrorLog::new();
        let expansion = Expansion {
            children: true,
            ..Expansion::NONE
        };

        render(&api, &cache, &"root".into(), expansion, &mut view, &mut errors).await;

        assert!(view.parents.is_empty());
        assert!(view.spouses.is_empty());
        assert_eq!(view.children.len(), 1);
    }

    #[tokio::test]
    async fn unknown_root_sends_no_request() {
        let api = family();
        let cache = loaded(&api).await;
        let before = api.requests().len();
        let mut view = PersonView::default();
        let mut errors = ErrorLog::new();

        let count = render(&api, &cache, &"stranger".into(), Expansion::ALL, &mut view, &mut errors).await;

        assert_eq!(count, 0);
        assert_eq!(api.requests().len(), before);
        assert!(view.is_empty());
    }

    #[tokio::test]
    async fn a_failed_relation_is_logged_and_skipped() {
        let api = InMemoryApi::new()
            .with_person(person("root", &["ghost", "mom"], &[], &[]))
            .with_person(person("mom", &[], &[], &["root"]));
        let mut cache = loaded(&api).await;
        cache.replace(Pool::People, vec!["root".into(), "mom".into(), "ghost".into()]);
        let mut view = PersonView::default();
        let mut errors = ErrorLog::new();

        render(&api, &cache, &"root".into(), Expansion::ALL, &mut view, &mut errors).await;

        assert_eq!(view.parents.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.latest().unwrap().message, "Person not found: ghost");
    }
}
