//! Airport Gap HTTP client
//!
//! A thin request context in front of `reqwest`: it pins the base URL, the
//! timeout and the default headers, and hands back status, URL and body so
//! scenarios can assert on them. Typed helpers cover the two endpoints the
//! suite uses.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storefront_common::logging::{self, Logger};
use storefront_common::ApiSettings;

use crate::error::{E2eError, E2eResult};

pub const AIRPORTS_PATH: &str = "/api/airports";
pub const DISTANCE_PATH: &str = "/api/airports/distance";

/// `User-Agent` sent with every request
pub fn user_agent() -> String {
    format!("storefront-e2e/{}", env!("CARGO_PKG_VERSION"))
}

/// A response with its body already read
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx status into an error
    pub fn ensure_ok(self) -> E2eResult<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(E2eError::HttpStatus {
                status: self.status,
                url: self.url,
                body: self.body,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        serde_json::from_str(&self.body).map_err(|e| E2eError::MalformedResponse {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirportList {
    pub data: Vec<AirportResource>,
}

impl AirportList {
    pub fn names(&self) -> Vec<&str> {
        self.data.iter().map(|a| a.attributes.name.as_str()).collect()
    }

    /// Expected names absent from this page, in the order given
    pub fn missing<'a>(&self, expected: &'a [String]) -> Vec<&'a str> {
        let present: HashSet<&str> = self.names().into_iter().collect();
        expected
            .iter()
            .map(String::as_str)
            .filter(|name| !present.contains(name))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirportResource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub attributes: AirportAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirportAttributes {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceRequest<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Distance {
    pub data: DistanceData,
}

impl Distance {
    pub fn kilometers(&self) -> f64 {
        self.data.attributes.kilometers
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistanceData {
    #[serde(default)]
    pub id: String,
    pub attributes: DistanceAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistanceAttributes {
    pub kilometers: f64,
    #[serde(default)]
    pub miles: Option<f64>,
    #[serde(default)]
    pub nautical_miles: Option<f64>,
}

/// Shared request context for the Airport Gap API
pub struct AirportGapClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    log: Logger,
}

impl AirportGapClient {
    pub fn new(settings: &ApiSettings) -> E2eResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(settings.timeout())
            .default_headers(headers)
            .user_agent(user_agent())
            .build()?;

        let client = Self {
            http,
            base_url: settings.base_url.clone(),
            timeout: settings.timeout(),
            log: logging::logger("Fixtures"),
        };
        info!(
            logger = %client.log,
            "Created API request context with base_url={}",
            client.base_url
        );
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `path` against the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get(&self, path: &str) -> E2eResult<ApiResponse> {
        let url = self.url(path);
        debug!(logger = %self.log, "GET {}", url);
        let response = self.http.get(&url).send().await?;
        Self::read(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> E2eResult<ApiResponse> {
        let url = self.url(path);
        debug!(logger = %self.log, "POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> E2eResult<ApiResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await?;
        debug!("{} <- {} ({} bytes)", status, url, body.len());
        Ok(ApiResponse { status, url, body })
    }

    /// `GET /api/airports`, first page
    pub async fn list_airports(&self) -> E2eResult<AirportList> {
        self.get(AIRPORTS_PATH).await?.ensure_ok()?.json()
    }

    /// `POST /api/airports/distance` for a pair of IATA codes
    pub async fn distance(&self, from: &str, to: &str) -> E2eResult<Distance> {
        self.post_json(DISTANCE_PATH, &DistanceRequest { from, to })
            .await?
            .ensure_ok()?
            .json()
    }

    pub fn dispose(&self) {
        info!(logger = %self.log, "Disposed API request context");
    }
}
