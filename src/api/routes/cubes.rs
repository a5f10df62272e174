//! Cube Routes
//!
//! Endpoints for the indicator hub (token required):
//!
//! - GET /indicateurs/cubes - List available cubes
//! - GET /indicateurs/query - Run an open query against a cube

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{CubeQueryParams, CubesParams, CubesResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::cubejs::{open_query, MAX_LIMIT};

/// GET /indicateurs/cubes
///
/// Simplified cube catalog: name, title, measure and dimension names.
pub async fn list_cubes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CubesParams>,
) -> ApiResult<Json<CubesResponse>> {
    let token = state.resolve_token(params.token)?;

    let cubes = state.cube.fetch_meta(&token).await?;
    let total = cubes.len();

    Ok(Json(CubesResponse { cubes, total }))
}

/// GET /indicateurs/query
///
/// Build an open query from flat parameters and forward the raw upstream
/// result. Malformed filter expressions are dropped, not rejected.
pub async fn run_cube_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CubeQueryParams>,
) -> ApiResult<Json<Value>> {
    let token = state.resolve_token(params.token)?;

    if params.cube.trim().is_empty() {
        return Err(ApiError::Validation("cube must not be empty".to_string()));
    }
    if params.limit < 1 {
        return Err(ApiError::Validation(format!(
            "limit must be within [1, {MAX_LIMIT}]"
        )));
    }

    let query = open_query(
        &params.measures,
        &params.dimensions,
        &params.filters,
        params.limit,
    );
    if query.measures.is_empty() {
        return Err(ApiError::Validation(
            "measures must not be empty".to_string(),
        ));
    }

    let payload = state.cube.load(&token, &query).await?;
    Ok(Json(payload))
}
