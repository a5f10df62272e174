//! Tabular API Client
//!
//! HTTP client for the data.gouv.fr tabular service. All routes are open
//! access; responses are forwarded unmodified. Upstream failures carry the
//! upstream status and a fixed per-route message.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the tabular-resource service.
#[derive(Debug, Clone)]
pub struct TabularClient {
    client: Client,
    base_url: String,
}

impl TabularClient {
    /// Create a client for the given base URL
    /// (e.g. "https://tabular-api.data.gouv.fr/api").
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the descriptor of a tabular resource.
    pub async fn resource(&self, resource_id: &str) -> Result<Value, TabularError> {
        let url = format!("{}/resources/{}/", self.base_url, resource_id);
        self.get(&url, &[], "Ressource non trouvée").await
    }

    /// Fetch one page of a resource's rows.
    pub async fn data(
        &self,
        resource_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Value, TabularError> {
        let url = format!("{}/resources/{}/data/", self.base_url, resource_id);
        self.get(
            &url,
            &[("page", page), ("page_size", page_size)],
            "Erreur lors de la récupération des données",
        )
        .await
    }

    /// Fetch a resource's column metadata.
    pub async fn profile(&self, resource_id: &str) -> Result<Value, TabularError> {
        let url = format!("{}/resources/{}/profile/", self.base_url, resource_id);
        self.get(&url, &[], "Profil non disponible").await
    }

    async fn get(
        &self,
        url: &str,
        params: &[(&str, u32)],
        miss_message: &str,
    ) -> Result<Value, TabularError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(TabularError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(TabularError::Upstream {
                status: response.status().as_u16(),
                message: miss_message.to_string(),
            });
        }

        response.json().await.map_err(TabularError::from_reqwest)
    }
}

/// Errors from the tabular service.
#[derive(Error, Debug)]
pub enum TabularError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("request failed: {0}")]
    Request(reqwest::Error),
}

impl TabularError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resource_forwards_payload() {
        let server = MockServer::start().await;
        let body = json!({"id": "abc", "title": "Qualité de l'air"});
        Mock::given(method("GET"))
            .and(path("/resources/abc/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let client = TabularClient::new(server.uri());
        let payload = client.resource("abc").await.unwrap();
        assert_eq!(payload, body);
    }

    #[tokio::test]
    async fn test_data_sends_pagination_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resources/abc/data/"))
            .and(query_param("page", "3"))
            .and(query_param("page_size", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = TabularClient::new(server.uri());
        client.data("abc", 3, 50).await.unwrap();
    }

    #[tokio::test]
    async fn test_miss_maps_to_fixed_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resources/missing/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = TabularClient::new(server.uri());
        let err = client.resource("missing").await.unwrap_err();
        match err {
            TabularError::Upstream { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Ressource non trouvée");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_profile_miss_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resources/abc/profile/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = TabularClient::new(server.uri());
        let err = client.profile("abc").await.unwrap_err();
        match err {
            TabularError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Profil non disponible");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
