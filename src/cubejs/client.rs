//! CubeJS Indicator Hub Client
//!
//! HTTP client for the analytical-cube service
//! (`api.indicateurs.ecologie.gouv.fr`). Every call carries a bearer token;
//! the API layer resolves the credential before anything here runs, so this
//! client never issues an unauthenticated request.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::query::CubeQuery;

/// Timeout for the metadata endpoint.
const META_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the load endpoint.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream error bodies are truncated to this many characters before being
/// attached to the caller-facing error.
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Client for the CubeJS indicator hub.
#[derive(Debug, Clone)]
pub struct CubeClient {
    client: Client,
    base_url: String,
    meta_timeout: Duration,
    load_timeout: Duration,
}

/// Simplified description of one upstream cube.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CubeDescriptor {
    pub name: String,
    pub title: String,
    pub measures: Vec<String>,
    pub dimensions: Vec<String>,
}

impl CubeClient {
    /// Create a client for the given hub base URL
    /// (e.g. "https://api.indicateurs.ecologie.gouv.fr").
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            meta_timeout: META_TIMEOUT,
            load_timeout: LOAD_TIMEOUT,
        }
    }

    /// Override the per-route timeouts.
    pub fn with_timeouts(mut self, meta: Duration, load: Duration) -> Self {
        self.meta_timeout = meta;
        self.load_timeout = load;
        self
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/cubejs-api/v1/{}", self.base_url, endpoint)
    }

    /// List the cubes the hub exposes, with their measure and dimension
    /// names. Titles fall back to the cube name when absent.
    pub async fn fetch_meta(&self, token: &str) -> Result<Vec<CubeDescriptor>, CubeError> {
        let response = self
            .client
            .get(self.api_url("meta"))
            .bearer_auth(token)
            .timeout(self.meta_timeout)
            .send()
            .await
            .map_err(CubeError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(CubeError::upstream(response).await);
        }

        let meta: MetaResponse = response.json().await.map_err(CubeError::from_reqwest)?;
        Ok(meta
            .cubes
            .into_iter()
            .map(|cube| CubeDescriptor {
                title: cube.title.unwrap_or_else(|| cube.name.clone()),
                name: cube.name,
                measures: cube.measures.into_iter().map(|m| m.name).collect(),
                dimensions: cube.dimensions.into_iter().map(|d| d.name).collect(),
            })
            .collect())
    }

    /// Run a query and return the full upstream payload unmodified.
    pub async fn load(&self, token: &str, query: &CubeQuery) -> Result<Value, CubeError> {
        let encoded = serde_json::to_string(query)?;

        let response = self
            .client
            .get(self.api_url("load"))
            .bearer_auth(token)
            .query(&[("query", encoded.as_str())])
            .timeout(self.load_timeout)
            .send()
            .await
            .map_err(CubeError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(CubeError::upstream(response).await);
        }

        response.json().await.map_err(CubeError::from_reqwest)
    }

    /// Run a query and return the payload's `data` rows, `[]` when the
    /// upstream omits the field.
    pub async fn run_query(
        &self,
        token: &str,
        query: &CubeQuery,
    ) -> Result<Vec<Value>, CubeError> {
        let mut payload = self.load(token, query).await?;
        match payload.get_mut("data").map(Value::take) {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }
}

/// Truncate an upstream body to the documented diagnostic cap.
fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[derive(Deserialize)]
struct MetaResponse {
    #[serde(default)]
    cubes: Vec<MetaCube>,
}

#[derive(Deserialize)]
struct MetaCube {
    name: String,
    title: Option<String>,
    #[serde(default)]
    measures: Vec<MetaMember>,
    #[serde(default)]
    dimensions: Vec<MetaMember>,
}

#[derive(Deserialize)]
struct MetaMember {
    name: String,
}

/// Errors from the indicator hub.
#[derive(Error, Debug)]
pub enum CubeError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("query serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CubeError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e)
        }
    }

    async fn upstream(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Upstream {
            status,
            body: excerpt(&body),
        }
    }
}
