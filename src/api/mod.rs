//! GenwebApi trait: the sole boundary between the editor engine and the
//! genweb server. `HttpApiClient` talks to a live server, `InMemoryApi`
//! stands in for it in tests and demos.

pub mod http;
pub mod in_memory;

use async_trait::async_trait;
use genweb_types::{Identifier, MetadataRecord, PersonRecord, Pool};

use crate::error::ApiError;

pub use http::HttpApiClient;
pub use in_memory::InMemoryApi;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Root of every API path
pub const API_PREFIX: &str = "/api/v1";

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait GenwebApi: Send + Sync {
    /// `GET /api/v1/{pool}`: every identifier in the pool
    async fn list_identifiers(&self, pool: Pool) -> ApiResult<Vec<Identifier>>;

    /// `GET /api/v1/people/{id}`
    async fn fetch_person(&self, id: &Identifier) -> ApiResult<PersonRecord>;

    /// `GET /api/v1/metadata/{id}`
    async fn fetch_metadata(&self, id: &Identifier) -> ApiResult<MetadataRecord>;

    /// `POST /api/v1/metadata/{id}`; any status but 200 is an error
    async fn save_metadata(&self, id: &Identifier, record: &MetadataRecord) -> ApiResult<()>;
}
