//! Ecologie REST API
//!
//! HTTP proxy layer built with Axum. Every route forwards to one of two
//! upstream services and reshapes nothing beyond what the route documents.
//!
//! # Endpoints
//!
//! ## Tabular (data.gouv.fr, open access)
//! - `GET /tabular/resources/:resource_id` - Resource descriptor
//! - `GET /tabular/resources/:resource_id/data` - Paginated rows
//! - `GET /tabular/resources/:resource_id/profile` - Column metadata
//!
//! ## Indicator hub (CubeJS, token required)
//! - `GET /indicateurs?commune=...` - Fixed-indicator aggregate
//! - `GET /indicateurs/cubes` - Cube catalog
//! - `GET /indicateurs/query` - Open cube query
//!
//! ## Service
//! - `GET /` - Service descriptor
//! - `GET /health/live` - Liveness probe

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root::service_descriptor))
        .route("/health/live", get(routes::health::liveness))
        // Indicator hub routes
        .route("/indicateurs", get(routes::indicators::commune_indicators))
        .route("/indicateurs/cubes", get(routes::cubes::list_cubes))
        .route("/indicateurs/query", get(routes::cubes::run_cube_query))
        // Tabular routes
        .route(
            "/tabular/resources/:resource_id",
            get(routes::tabular::resource_info),
        )
        .route(
            "/tabular/resources/:resource_id/data",
            get(routes::tabular::resource_data),
        )
        .route(
            "/tabular/resources/:resource_id/profile",
            get(routes::tabular::resource_profile),
        )
        .layer(TraceLayer::new_for_http())
        // The original service allowed all origins.
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Ecologie API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Ecologie API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use wiremock::matchers::{method, path, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app(cube_url: &str, tabular_url: &str, token: Option<&str>) -> Router {
        let mut config = Config::default();
        config.upstream.indicateurs_base_url = cube_url.to_string();
        config.upstream.tabular_base_url = tabular_url.to_string();
        config.upstream.token = token.map(str::to_string);
        build_router(AppState::from_config(&config))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_descriptor() {
        let app = test_app("http://unused", "http://unused", None);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "API Écologie France");
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = test_app("http://unused", "http://unused", None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cubes_without_token_is_401_before_any_call() {
        let server = MockServer::start().await;
        // No outbound call may be attempted without a credential.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), "http://unused", None);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs/cubes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MISSING_TOKEN");
    }

    #[tokio::test]
    async fn test_indicateurs_without_token_is_401_before_any_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), "http://unused", None);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs?commune=Paris")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cubes_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cubejs-api/v1/meta"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cubes": [{
                    "name": "tri_biodechets_dpt",
                    "measures": [{"name": "tri_biodechets_dpt.id_897"}],
                    "dimensions": []
                }]
            })))
            .mount(&server)
            .await;

        // Token supplied per request, none configured.
        let app = test_app(&server.uri(), "http://unused", None);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs/cubes?token=jwt-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["cubes"][0]["name"], "tri_biodechets_dpt");
        assert_eq!(body["cubes"][0]["title"], "tri_biodechets_dpt");
    }

    #[tokio::test]
    async fn test_query_rejects_zero_limit_before_any_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), "http://unused", Some("jwt"));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs/query?cube=c&measures=c.id_1&limit=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_query_rejects_empty_measures() {
        let app = test_app("http://unused", "http://unused", Some("jwt"));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs/query?cube=c&measures=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_forwards_raw_upstream_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cubejs-api/v1/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"x": 1}],
                "annotation": {"measures": {}}
            })))
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), "http://unused", Some("jwt"));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs/query?cube=c&measures=c.id_1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        // Raw passthrough: annotation survives alongside data.
        assert_eq!(body["data"], json!([{"x": 1}]));
        assert!(body.get("annotation").is_some());
    }

    #[tokio::test]
    async fn test_query_upstream_error_passthrough() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cubejs-api/v1/load"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid member: c.nope"))
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), "http://unused", Some("jwt"));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs/query?cube=c&measures=c.nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(body["error"]["message"], "Invalid member: c.nope");
    }

    #[tokio::test]
    async fn test_indicateurs_partial_failure_keeps_all_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cubejs-api/v1/load"))
            .and(query_param_contains("query", "sequestr_nette_co2_com"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cubejs-api/v1/load"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"annee": "2023"}]})),
            )
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), "http://unused", Some("jwt"));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/indicateurs?commune=Paris")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        for key in ["mobilite", "energie", "ges", "biodiversite", "eau"] {
            assert!(body.get(key).is_some(), "missing category {key}");
        }
        assert_eq!(body["biodiversite"], json!([]));
        assert_eq!(body["mobilite"], json!([{"annee": "2023"}]));
    }

    #[tokio::test]
    async fn test_tabular_page_size_validation_before_any_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test_app("http://unused", &server.uri(), None);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tabular/resources/abc/data?page_size=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tabular_page_validation_before_any_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test_app("http://unused", &server.uri(), None);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tabular/resources/abc/data?page=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_tabular_miss_is_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resources/missing/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let app = test_app("http://unused", &server.uri(), None);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tabular/resources/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Ressource non trouvée");
    }

    #[tokio::test]
    async fn test_tabular_data_passthrough() {
        let server = MockServer::start().await;
        let payload = json!({"data": [{"col": "v"}], "meta": {"page": 1}});
        Mock::given(method("GET"))
            .and(path("/resources/abc/data/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .mount(&server)
            .await;

        let app = test_app("http://unused", &server.uri(), None);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tabular/resources/abc/data?page=1&page_size=20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, payload);
    }
}
