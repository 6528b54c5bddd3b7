// HTTP client for the third-party flight-search API. One outstanding request
// per search action; retry policy belongs to the caller, not here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::model::{Airport, SearchCriteria};
use crate::normalize::{self, Batch};

const ONE_WAY_ENDPOINT: &str = "/flights/search-one-way";
const ROUND_TRIP_ENDPOINT: &str = "/flights/search-roundtrip";
const AUTOCOMPLETE_ENDPOINT: &str = "/flights/auto-complete";

const AUTOCOMPLETE_LIMIT: u32 = 10;
// Queries shorter than this never hit the network.
const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://flights-sky.p.rapidapi.com".to_string(),
            api_key: String::new(),
            timeout_ms: 20_000,
        }
    }
}

/// The seam between the search flow and the wire. Implemented by the real
/// client below and by in-memory fakes in tests.
#[async_trait]
pub trait FlightApi: Send + Sync + 'static {
    /// Run one flight search and return the normalized batch.
    async fn search_flights(&self, criteria: &SearchCriteria) -> Result<Batch, ApiError>;

    /// Airport auto-complete for a free-text query.
    async fn autocomplete_airports(&self, query: &str) -> Result<Vec<Airport>, ApiError>;
}

/// Client for the flights-sky RapidAPI service.
#[derive(Debug)]
pub struct FlightsSkyClient {
    http: reqwest::Client,
    config: ClientConfig,
    host: String,
}

impl FlightsSkyClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        if config.api_key.is_empty() {
            return Err(ApiError::Config("API key is required".to_string()));
        }
        let url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base url: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| ApiError::Config("base url has no host".to_string()))?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config, host })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.config.timeout_ms)
        } else {
            ApiError::Network(err.to_string())
        }
    }

    async fn get_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        debug!(%endpoint, "making API request");

        let response = self
            .http
            .get(&url)
            .header("X-RapidAPI-Key", &self.config.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%endpoint, status = status.as_u16(), "API request failed");
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Endpoint selection: round trip only when the criteria really carry a
/// return date.
pub(crate) fn search_endpoint(criteria: &SearchCriteria) -> &'static str {
    if criteria.is_round_trip() {
        ROUND_TRIP_ENDPOINT
    } else {
        ONE_WAY_ENDPOINT
    }
}

pub(crate) fn search_params(criteria: &SearchCriteria) -> Vec<(String, String)> {
    let mut params = vec![
        ("fromEntityId".to_string(), criteria.origin.entity_id.clone()),
        ("toEntityId".to_string(), criteria.destination.entity_id.clone()),
        ("departDate".to_string(), criteria.depart_date.clone()),
        ("adults".to_string(), criteria.passengers.adults.max(1).to_string()),
        ("children".to_string(), criteria.passengers.children.to_string()),
        ("infants".to_string(), criteria.passengers.infants.to_string()),
        (
            "cabinClass".to_string(),
            criteria.cabin_class.as_query_value().to_string(),
        ),
    ];
    if criteria.is_round_trip() {
        if let Some(return_date) = &criteria.return_date {
            params.push(("returnDate".to_string(), return_date.clone()));
        }
    }
    params
}

/// Drop parenthesised qualifiers from an auto-complete query, e.g.
/// `"Mumbai (BOM)"` becomes `"Mumbai"`.
pub(crate) fn clean_query(query: &str) -> String {
    let mut cleaned = String::with_capacity(query.len());
    let mut depth = 0usize;
    for ch in query.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => cleaned.push(ch),
            _ => {}
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl FlightApi for FlightsSkyClient {
    async fn search_flights(&self, criteria: &SearchCriteria) -> Result<Batch, ApiError> {
        let endpoint = search_endpoint(criteria);
        let body = self.get_json(endpoint, &search_params(criteria)).await?;
        let batch = normalize::normalize_response(&body);
        debug!(
            offers = batch.offers.len(),
            skipped = batch.skipped,
            "search response normalized"
        );
        Ok(batch)
    }

    async fn autocomplete_airports(&self, query: &str) -> Result<Vec<Airport>, ApiError> {
        let cleaned = clean_query(query);
        if cleaned.len() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let params = vec![
            ("query".to_string(), cleaned),
            ("limit".to_string(), AUTOCOMPLETE_LIMIT.to_string()),
        ];
        let body = self.get_json(AUTOCOMPLETE_ENDPOINT, &params).await?;
        Ok(normalize::normalize_airports(&body))
    }
}
