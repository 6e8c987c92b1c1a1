use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{LookupError, truncate_body},
    model::{Coordinate, LookupOutcome, LookupResult, PostalCode},
};

use super::GeocodeProvider;

pub const DEFAULT_ENDPOINT: &str = "https://www.onemap.gov.sg/api/common/elastic/search";

#[derive(Debug, Clone)]
pub struct OneMapProvider {
    endpoint: String,
    http: Client,
}

impl OneMapProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), http: Client::new() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for OneMapProvider {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[derive(Debug, Deserialize)]
struct OmResult {
    #[serde(rename = "ADDRESS")]
    address: String,
    #[serde(rename = "LONGITUDE")]
    longitude: Coordinate,
    #[serde(rename = "LATITUDE")]
    latitude: Coordinate,
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    found: u64,
    // Only read when `found > 0`; a no-match response may omit it.
    #[serde(default)]
    results: Vec<OmResult>,
}

/// Decode a search response body. Only the first result counts.
fn parse_search(postal: PostalCode, body: &str) -> Result<LookupOutcome, LookupError> {
    let parsed: OmSearchResponse =
        serde_json::from_str(body).map_err(|source| LookupError::Decode { postal, source })?;

    if parsed.found == 0 {
        return Ok(LookupOutcome::NotFound);
    }

    let first = parsed
        .results
        .into_iter()
        .next()
        .ok_or(LookupError::MissingResult { postal, found: parsed.found })?;

    Ok(LookupOutcome::Found(LookupResult {
        address: first.address,
        longitude: first.longitude,
        latitude: first.latitude,
    }))
}

#[async_trait]
impl GeocodeProvider for OneMapProvider {
    async fn search(&self, postal: PostalCode) -> Result<LookupOutcome, LookupError> {
        let search_val = postal.to_string();

        tracing::debug!(%postal, endpoint = %self.endpoint, "searching OneMap");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("searchVal", search_val.as_str()),
                ("returnGeom", "Y"),
                ("getAddrDetails", "Y"),
                ("pageNum", "1"),
            ])
            .send()
            .await
            .map_err(|source| LookupError::Request { postal, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| LookupError::Request { postal, source })?;

        if !status.is_success() {
            return Err(LookupError::Status { postal, status, body: truncate_body(&body) });
        }

        parse_search(postal, &body)
    }
}
