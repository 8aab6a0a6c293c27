// Catalog API client: fetches circuits, homestays and itineraries from the
// travel REST API and hands back normalized records.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Circuit, Homestay, Itinerary, LocalGuide};
use crate::record_cache::{CacheConfig, CacheStatsReport, RecordCache};
use crate::records::{RawCircuit, RawHomestay, RawItinerary, RawLocalGuide};
use crate::wizard::{normalize_category, MatchQuery};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError {
        status_code: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError(_) | ApiError::Timeout(_) => true,
            ApiError::ApiResponseError { is_retryable, .. } => *is_retryable,
            ApiError::DecodeError(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::ApiResponseError {
                status_code: 404,
                ..
            }
        )
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid catalog client configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub retry_config: RetryConfig,
    pub cache_config: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 10_000,
            user_agent: concat!("trip-estimator/", env!("CARGO_PKG_VERSION")).to_string(),
            retry_config: RetryConfig::default(),
            cache_config: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TRIP_API_BASE_URL`, `TRIP_API_TIMEOUT_MS` and
    /// `TRIP_API_CACHE_TTL_SECONDS`, read after loading any `.env` file.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("TRIP_API_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("TRIP_API_TIMEOUT_MS") {
            config.timeout_ms = timeout.parse().map_err(|_| {
                ClientError::InvalidConfig(format!(
                    "TRIP_API_TIMEOUT_MS is not a number: {}",
                    timeout
                ))
            })?;
        }
        if let Ok(ttl) = std::env::var("TRIP_API_CACHE_TTL_SECONDS") {
            let seconds: u64 = ttl.parse().map_err(|_| {
                ClientError::InvalidConfig(format!(
                    "TRIP_API_CACHE_TTL_SECONDS is not a number: {}",
                    ttl
                ))
            })?;
            config.cache_config.ttl = Duration::from_secs(seconds);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        self.parsed_base_url()?;
        if self.timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn parsed_base_url(&self) -> Result<Url, ClientError> {
        let invalid = || {
            ClientError::InvalidConfig(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            ))
        };
        let url = Url::parse(self.base_url.trim()).map_err(|_| invalid())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(invalid()),
        }
    }
}

// Only GETs are retried; catalog reads are cheap, so give up quickly
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
            backoff_multiplier: 3.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryConfig {
    /// Delay before retry `attempt` (0-based): exponential, capped at
    /// `max_backoff_ms`, spread by `jitter_factor` around the nominal value.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let growth = self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let nominal = (self.initial_backoff_ms as f64 * growth).min(self.max_backoff_ms as f64);
        let spread = nominal * self.jitter_factor.clamp(0.0, 1.0);
        let offset = if spread > 0.0 {
            rand::thread_rng().gen_range(-spread / 2.0..=spread / 2.0)
        } else {
            0.0
        };
        Duration::from_millis((nominal + offset).max(0.0) as u64)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub requests_retried: usize,
    pub cache: CacheStatsReport,
}

// Landing page data, fetched together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeCatalog {
    pub circuits: Vec<Circuit>,
    pub homestays: Vec<Homestay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MatchedItineraries {
    matched_itineraries: Vec<RawItinerary>,
}

// /api/circuits/match answers with either a bare list or {data: [...]}
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CircuitList {
    Bare(Vec<RawCircuit>),
    Wrapped {
        #[serde(default)]
        data: Vec<RawCircuit>,
    },
}

impl From<CircuitList> for Vec<Circuit> {
    fn from(list: CircuitList) -> Self {
        let raw = match list {
            CircuitList::Bare(raw) | CircuitList::Wrapped { data: raw } => raw,
        };
        raw.into_iter().map(Into::into).collect()
    }
}

#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    async fn list_circuits(&self) -> Result<Vec<Circuit>, ApiError>;

    async fn get_circuit(&self, id: &str) -> Result<Circuit, ApiError>;

    async fn list_homestays(&self) -> Result<Vec<Homestay>, ApiError>;

    async fn get_homestay(&self, id: &str) -> Result<Homestay, ApiError>;

    async fn list_itineraries(&self) -> Result<Vec<Itinerary>, ApiError>;

    async fn get_itinerary(&self, id: &str) -> Result<Itinerary, ApiError>;

    async fn get_local_guide(&self, id: &str) -> Result<LocalGuide, ApiError>;

    // Preset itineraries matching the wizard's selections
    async fn match_itineraries(&self, query: &MatchQuery) -> Result<Vec<Itinerary>, ApiError>;

    // Circuits tagged with any of the given categories
    async fn match_circuits(&self, categories: &[String]) -> Result<Vec<Circuit>, ApiError>;

    async fn home_catalog(&self) -> Result<HomeCatalog, ApiError> {
        let (circuits, homestays) =
            futures::try_join!(self.list_circuits(), self.list_homestays())?;
        Ok(HomeCatalog {
            circuits,
            homestays,
        })
    }

    fn stats(&self) -> ClientStats;
}

pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
    stats: Mutex<ClientStats>,
    itineraries: RecordCache<Itinerary>,
}

impl CatalogClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url,
            itineraries: RecordCache::new(config.cache_config.clone()),
            config,
            stats: Mutex::new(ClientStats::default()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Forget a cached itinerary (or all of them) so the next read refetches.
    pub fn invalidate_itinerary(&self, id: Option<&str>) -> usize {
        self.itineraries.invalidate(id)
    }

    // Each segment is percent-encoded, so ids cannot escape their path slot
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path to extend
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.stats.lock().requests_sent += 1;

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::ApiResponseError {
                status_code: status.as_u16(),
                message,
                is_retryable: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DecodeError(e.to_string()))
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.config.timeout_ms)
        } else {
            ApiError::NetworkError(error.to_string())
        }
    }

    // GETs are safe to repeat, so retryable failures back off and try again
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let retry = &self.config.retry_config;
        let url = self.endpoint(segments);
        let path = url.path();
        let mut attempt = 0;
        loop {
            match self.execute(self.http.get(url.clone())).await {
                Ok(value) => {
                    self.stats.lock().requests_succeeded += 1;
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    let backoff = retry.backoff(attempt);
                    warn!(path, attempt, ?backoff, error = %e, "retrying catalog request");
                    self.stats.lock().requests_retried += 1;
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(path, error = %e, "catalog request failed");
                    self.stats.lock().requests_failed += 1;
                    return Err(e);
                }
            }
        }
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let path = url.path();
        let result = self.execute(self.http.post(url.clone()).json(body)).await;
        let mut stats = self.stats.lock();
        match &result {
            Ok(_) => stats.requests_succeeded += 1,
            Err(e) => {
                warn!(path, error = %e, "catalog request failed");
                stats.requests_failed += 1;
            }
        }
        result
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_circuits(&self) -> Result<Vec<Circuit>, ApiError> {
        let raw: Vec<RawCircuit> = self.get_json(&["api", "circuits"]).await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn get_circuit(&self, id: &str) -> Result<Circuit, ApiError> {
        let raw: RawCircuit = self.get_json(&["api", "circuits", id]).await?;
        Ok(raw.into())
    }

    async fn list_homestays(&self) -> Result<Vec<Homestay>, ApiError> {
        let raw: Vec<RawHomestay> = self.get_json(&["api", "homestays"]).await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn get_homestay(&self, id: &str) -> Result<Homestay, ApiError> {
        let raw: RawHomestay = self.get_json(&["api", "homestays", id]).await?;
        Ok(raw.into())
    }

    async fn list_itineraries(&self) -> Result<Vec<Itinerary>, ApiError> {
        let raw: Vec<RawItinerary> = self.get_json(&["api", "itineraries"]).await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn get_itinerary(&self, id: &str) -> Result<Itinerary, ApiError> {
        if let Some(itinerary) = self.itineraries.get(id) {
            return Ok(itinerary);
        }

        let raw: RawItinerary = self.get_json(&["api", "itineraries", id]).await?;
        let itinerary: Itinerary = raw.into();
        self.itineraries.insert(id, itinerary.clone());
        debug!(id, days = itinerary.day_wise_plan.len(), "fetched itinerary");
        Ok(itinerary)
    }

    async fn get_local_guide(&self, id: &str) -> Result<LocalGuide, ApiError> {
        let raw: RawLocalGuide = self.get_json(&["api", "guides", id]).await?;
        Ok(raw.into())
    }

    async fn match_itineraries(&self, query: &MatchQuery) -> Result<Vec<Itinerary>, ApiError> {
        let matched: MatchedItineraries = self.post_json(&["api", "itineraries", "match"], query).await?;
        debug!(
            count = matched.matched_itineraries.len(),
            circuit = %query.circuit_name,
            "matched itineraries"
        );
        Ok(matched
            .matched_itineraries
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn match_circuits(&self, categories: &[String]) -> Result<Vec<Circuit>, ApiError> {
        let categories: Vec<String> = categories.iter().map(|c| normalize_category(c)).collect();
        let body = serde_json::json!({ "categories": categories });
        let list: CircuitList = self.post_json(&["api", "circuits", "match"], &body).await?;
        Ok(list.into())
    }

    fn stats(&self) -> ClientStats {
        let mut stats = self.stats.lock().clone();
        stats.cache = self.itineraries.stats();
        stats
    }
}
