//! HTTP-backed status store talking to `rollcall-daemon`.
//!
//! Transport failures, non-2xx replies and undecodable bodies all surface as
//! [`StoreError::Unavailable`]. Only a 400 is treated as bad input.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use rollcall_core::{StatusMap, StatusRecord, StatusStore, StoreError};
use rollcall_protocol::{ErrorBody, MutationResponse, UpsertRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RemoteStatusStore {
    client: Client,
    base_url: String,
}

impl RemoteStatusStore {
    pub fn new(server_url: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| StoreError::unavailable("Failed to build HTTP client", err))?;

        Ok(Self {
            client,
            base_url: server_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Member names can hold spaces and slashes, so they go in as an encoded
    /// path segment.
    fn member_url(&self, member: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.url("/api/status"))
            .map_err(|err| StoreError::unavailable("Invalid server URL", err))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("Server URL cannot take a path".to_string()))?
            .push(member);
        Ok(url)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .map_err(|err| StoreError::unavailable("Undecodable server response", err));
        }

        let message = response
            .json::<ErrorBody>()
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());
        if status == StatusCode::BAD_REQUEST {
            Err(StoreError::InvalidInput(message))
        } else {
            Err(StoreError::Unavailable(format!("HTTP {}: {}", status.as_u16(), message)))
        }
    }
}

impl StatusStore for RemoteStatusStore {
    fn get_all(&self) -> Result<StatusMap, StoreError> {
        let response = self
            .client
            .get(self.url("/api/statuses"))
            .send()
            .map_err(|err| StoreError::unavailable("GET /api/statuses failed", err))?;
        Self::decode(response)
    }

    fn upsert(&self, member: &str, record: StatusRecord) -> Result<StatusMap, StoreError> {
        let body = UpsertRequest {
            name: member.to_string(),
            status: record,
        };
        let response = self
            .client
            .post(self.url("/api/status"))
            .json(&body)
            .send()
            .map_err(|err| StoreError::unavailable("POST /api/status failed", err))?;
        Self::decode::<MutationResponse>(response).map(|body| body.statuses)
    }

    fn remove(&self, member: &str) -> Result<StatusMap, StoreError> {
        let response = self
            .client
            .delete(self.member_url(member)?)
            .send()
            .map_err(|err| StoreError::unavailable("DELETE /api/status failed", err))?;
        Self::decode::<MutationResponse>(response).map(|body| body.statuses)
    }
}
