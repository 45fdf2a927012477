//! HTTP client for the genweb `/api/v1` endpoints

use async_trait::async_trait;
use genweb_types::{Identifier, MetadataRecord, PersonRecord, Pool};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::{ApiResult, GenwebApi};
use crate::error::{ApiError, EditorError};

#[derive(Clone)]
pub struct HttpApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Result<Self, EditorError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| EditorError::Config(format!("invalid API base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(EditorError::Config(format!(
                "API base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/v1/{pool}[/{id}]`, with the identifier encoded as one segment
    pub fn endpoint(&self, pool: Pool, id: Option<&Identifier>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "v1", pool.as_str()]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Only 200 counts as success, matching the server contract
async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl GenwebApi for HttpApiClient {
    async fn list_identifiers(&self, pool: Pool) -> ApiResult<Vec<Identifier>> {
        self.get(self.endpoint(pool, None)).await
    }

    async fn fetch_person(&self, id: &Identifier) -> ApiResult<PersonRecord> {
        self.get(self.endpoint(Pool::People, Some(id))).await
    }

    async fn fetch_metadata(&self, id: &Identifier) -> ApiResult<MetadataRecord> {
        self.get(self.endpoint(Pool::Metadata, Some(id))).await
    }

    async fn save_metadata(&self, id: &Identifier, record: &MetadataRecord) -> ApiResult<()> {
        let url = self.endpoint(Pool::Metadata, Some(id));
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(record)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        check_status(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_the_v1_layout() {
        let client = HttpApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.endpoint(Pool::People, None).as_str(),
            "http://localhost:8000/api/v1/people"
        );
        assert_eq!(
            client
                .endpoint(Pool::Metadata, Some(&Identifier::from("m1")))
                .as_str(),
            "http://localhost:8000/api/v1/metadata/m1"
        );
    }

    #[test]
    fn identifiers_are_encoded_as_a_single_segment() {
        let client = HttpApiClient::new("http://genweb.local/root/").unwrap();
        let url = client.endpoint(Pool::Metadata, Some(&Identifier::from("a b/c")));
        assert_eq!(url.as_str(), "http://genweb.local/root/api/v1/metadata/a%20b%2Fc");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(HttpApiClient::new("not a url").is_err());
        assert!(HttpApiClient::new("mailto:someone@example.com").is_err());
    }
}
