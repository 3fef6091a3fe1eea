use std::time::Duration;

use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, info};
use url::Url;

use crate::{
    error::LookupError,
    models::{LookupOutcome, LookupResponse},
};

pub const PRODUCTION_URL: &str = "https://fybrosindia.unomok.com";
const SEARCH_PATH: [&str; 3] = ["api", "mobile", "searchCode"];

#[derive(Debug, Clone)]
pub struct NetworkClient {
    client: Client,
    base_url: Url,
}

impl NetworkClient {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, LookupError> {
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidBaseUrl(base_url.to_string()));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/mobile/searchCode/{code}`, the code as a single encoded segment.
    pub fn search_url(&self, code: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(SEARCH_PATH)
            .push(code);
        Ok(url)
    }

    pub async fn search_code(&self, code: &str) -> Result<LookupOutcome, LookupError> {
        let url = self.search_url(code)?;
        debug!(%url, "searching code");

        let resp = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        // Non-2xx bodies still count when they carry the usual envelope.
        let parsed: LookupResponse = serde_json::from_slice(&body)
            .map_err(|source| LookupError::Malformed { status, source })?;
        info!(code, %status, success = parsed.success, "lookup answered");

        LookupOutcome::try_from(parsed)
    }
}

#[cfg(test)]
#[path = "tests/network_tests.rs"]
mod tests;
