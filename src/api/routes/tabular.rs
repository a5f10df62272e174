//! Tabular Routes
//!
//! Pass-through endpoints for the data.gouv.fr tabular API (open access):
//!
//! - GET /tabular/resources/:resource_id - Resource descriptor
//! - GET /tabular/resources/:resource_id/data - Paginated rows
//! - GET /tabular/resources/:resource_id/profile - Column metadata

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::PageParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /tabular/resources/:resource_id
pub async fn resource_info(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let payload = state.tabular.resource(&resource_id).await?;
    Ok(Json(payload))
}

/// GET /tabular/resources/:resource_id/data
///
/// Pagination bounds are enforced here, before any outbound call.
pub async fn resource_data(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Value>> {
    if params.page < 1 {
        return Err(ApiError::Validation("page must be >= 1".to_string()));
    }
    if params.page_size < 1 || params.page_size > 100 {
        return Err(ApiError::Validation(
            "page_size must be within [1, 100]".to_string(),
        ));
    }

    let payload = state
        .tabular
        .data(&resource_id, params.page, params.page_size)
        .await?;
    Ok(Json(payload))
}

/// GET /tabular/resources/:resource_id/profile
pub async fn resource_profile(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let payload = state.tabular.profile(&resource_id).await?;
    Ok(Json(payload))
}
