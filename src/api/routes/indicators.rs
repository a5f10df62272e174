//! Fixed-Indicator Aggregate Route
//!
//! - GET /indicateurs?commune=... - Ecological indicators for one commune

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::CommuneParams;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::indicators;

/// GET /indicateurs
///
/// One key per configured indicator category, each carrying the upstream
/// `data` rows for the commune. A category whose upstream call fails comes
/// back as `[]`; the other categories still populate.
pub async fn commune_indicators(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommuneParams>,
) -> ApiResult<Json<Value>> {
    let token = state.resolve_token(params.token)?;

    let categories = indicators::collect(
        &state.cube,
        &token,
        &params.commune,
        state.match_policy,
        state.indicator_set,
    )
    .await;

    Ok(Json(Value::Object(categories)))
}
