//! genweb editor engine
//!
//! Client-side state synchronisation and dynamic form engine for the genweb
//! metadata editor and people directory:
//!
//! - [`cache`] - identifier directory mirrored from the server
//! - [`typeahead`] - substring suggestions and per-input suggestion panels
//! - [`visibility`] - record-type driven row visibility
//! - [`form`] - form rows and their JSON wire shape
//! - [`editor`] - load / edit / save controller
//! - [`people`] - one-hop person graph view
//!
//! The server is reached only through [`api::GenwebApi`].

pub mod api;
pub mod cache;
pub mod config;
pub mod editor;
pub mod error;
pub mod error_log;
pub mod form;
pub mod people;
pub mod typeahead;
pub mod visibility;

pub use api::{GenwebApi, HttpApiClient, InMemoryApi};
pub use cache::{Directory, DirectoryCache, PoolState};
pub use config::EditorConfig;
pub use editor::{BlurOutcome, MetadataEditor, SaveOutcome, SubmitLabel};
pub use error::{ApiError, EditorError, Result};
pub use error_log::ErrorLog;
pub use form::Form;
pub use people::{Expansion, PersonView};
pub use typeahead::TypeAhead;
pub use visibility::VisibilityRules;

pub use genweb_types::{Identifier, MetadataRecord, PersonRecord, Pool, RecordType};
