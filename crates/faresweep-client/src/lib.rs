//! HTTP transport and response decoding for the award fare-search API.
//!
//! The network sits behind [`ByteSource`] so a static file can stand in
//! for the live endpoints in dev mode; the decoding contract is the
//! same regardless of where the bytes came from.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use faresweep_core::{BoardingTax, DayResult, SearchResponse};

pub use reqwest::Url;

const SEARCH_ENDPOINT: &str = "https://api-air-flightsearch-prd.smiles.com.br/v1/airlines/search";
const BOARDING_TAX_ENDPOINT: &str =
    "https://api-airlines-boarding-tax-prd.smiles.com.br/v1/airlines/flight/boardingtax";

/// Trip parameters the search endpoint expects on every request.
const FIXED_SEARCH_PARAMS: &[(&str, &str)] = &[
    ("adults", "1"),
    ("cabinType", "all"),
    ("children", "0"),
    ("currencyCode", "ARS"),
    ("infants", "0"),
    ("isFlexibleDateChecked", "false"),
    ("tripType", "2"),
    ("forceCongener", "true"),
    ("r", "ar"),
];

/// Static headers the API requires on every request.
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("x-api-key", "aJqPU7xNHl9qN3NVZnPaJ208aPo2Bh2p2ZV844tw"),
    ("region", "ARGENTINA"),
    ("origin", "https://www.smiles.com.ar"),
    ("referer", "https://www.smiles.com.ar"),
    ("channel", "web"),
    ("authority", "api-air-flightsearch-prd.smiles.com.br"),
];

pub fn search_url(query_date: NaiveDate, origin: &str, destination: &str) -> Url {
    let mut url = Url::parse(SEARCH_ENDPOINT).expect("static endpoint url parses");
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in FIXED_SEARCH_PARAMS {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("departureDate", &query_date.format("%Y-%m-%d").to_string());
        pairs.append_pair("originAirportCode", origin);
        pairs.append_pair("destinationAirportCode", destination);
    }
    url
}

pub fn boarding_tax_url(offer_uid: &str, fare_uid: &str) -> Url {
    let mut url = Url::parse(BOARDING_TAX_ENDPOINT).expect("static endpoint url parses");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("adults", "1");
        pairs.append_pair("children", "0");
        pairs.append_pair("infants", "0");
        pairs.append_pair("type", "SEGMENT_1");
        pairs.append_pair("uid", offer_uid);
        pairs.append_pair("fareuid", fare_uid);
    }
    url
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("empty response body from {url}")]
    EmptyBody { url: String },
    #[error("undecodable response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no flight segment in response from {url}")]
    MissingSegment { url: String },
    #[error("reading mock response {path}: {source}")]
    MockFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where response bytes come from: the live API, or a file in dev mode.
#[async_trait]
pub trait ByteSource: Send + Sync {
    async fn fetch(&self, run_id: Uuid, url: &Url) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: None,
        }
    }
}

/// Live transport. One reqwest client, static headers applied to every
/// request.
#[derive(Debug)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in STATIC_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let mut builder = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .default_headers(headers)
            .timeout(config.timeout);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder.build().context("building reqwest client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ByteSource for HttpSource {
    async fn fetch(&self, run_id: Uuid, url: &Url) -> Result<Vec<u8>, FetchError> {
        let span = info_span!("http_fetch", %run_id, %url);
        async {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    url: response.url().to_string(),
                });
            }
            Ok(response.bytes().await?.to_vec())
        }
        .instrument(span)
        .await
    }
}

/// Dev-only transport that answers every request with the same static
/// payload from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ByteSource for FileSource {
    async fn fetch(&self, _run_id: Uuid, _url: &Url) -> Result<Vec<u8>, FetchError> {
        fs::read(&self.path).await.map_err(|source| FetchError::MockFile {
            path: self.path.clone(),
            source,
        })
    }
}

/// Decoding front over a [`ByteSource`]: one fare search per (date,
/// origin, destination) triple, plus the boarding-tax quote for a
/// winning (offer, fare) pair.
#[derive(Clone)]
pub struct FareClient {
    source: Arc<dyn ByteSource>,
}

impl FareClient {
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self { source }
    }

    pub async fn search(
        &self,
        run_id: Uuid,
        query_date: NaiveDate,
        origin: &str,
        destination: &str,
    ) -> Result<DayResult, FetchError> {
        let url = search_url(query_date, origin, destination);
        let span = info_span!("fare_search", %run_id, origin, destination, date = %query_date);
        async {
            let body = self.source.fetch(run_id, &url).await?;
            let response: SearchResponse = decode(&url, &body)?;
            let segment = response
                .into_day_segment()
                .ok_or_else(|| FetchError::MissingSegment {
                    url: url.to_string(),
                })?;
            Ok(DayResult {
                query_date,
                segment,
            })
        }
        .instrument(span)
        .await
    }

    pub async fn boarding_tax(
        &self,
        run_id: Uuid,
        offer_uid: &str,
        fare_uid: &str,
    ) -> Result<BoardingTax, FetchError> {
        let url = boarding_tax_url(offer_uid, fare_uid);
        let span = info_span!("boarding_tax", %run_id, offer_uid, fare_uid);
        async {
            let body = self.source.fetch(run_id, &url).await?;
            decode(&url, &body)
        }
        .instrument(span)
        .await
    }
}

fn decode<T: DeserializeOwned>(url: &Url, body: &[u8]) -> Result<T, FetchError> {
    if body.is_empty() {
        return Err(FetchError::EmptyBody {
            url: url.to_string(),
        });
    }
    serde_json::from_slice(body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}
