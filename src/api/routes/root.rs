//! Root Route
//!
//! - GET / - Service descriptor with the route catalog

use axum::Json;
use serde_json::{json, Value};

/// GET /
///
/// Entry point with the route catalog, mirroring what the service exposes.
pub async fn service_descriptor() -> Json<Value> {
    Json(json!({
        "message": "API Écologie France",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tabular": {
                "description": "API Tabulaire data.gouv.fr (accès libre)",
                "base": "/tabular",
                "routes": [
                    "GET /tabular/resources/{resource_id}",
                    "GET /tabular/resources/{resource_id}/data",
                    "GET /tabular/resources/{resource_id}/profile"
                ]
            },
            "indicateurs": {
                "description": "Hub Indicateurs Transition Écologique (token JWT requis)",
                "base": "/indicateurs",
                "routes": [
                    "GET /indicateurs?commune=...",
                    "GET /indicateurs/cubes",
                    "GET /indicateurs/query?cube=...&measures=..."
                ]
            }
        },
        "example_resource_id": "1c5075ec-7ce1-49cb-ab89-94f507812daf"
    }))
}
