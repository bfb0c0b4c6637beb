use axum::{Json, extract::State};
use quotegate_core::RateWindowSnapshot;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub cache_entries: u64,
    pub rate_limit: RateWindowSnapshot,
}

/// Reports liveness plus the current cache size and rate window.
///
/// Does not consume rate-limit budget.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let gateway = state.gateway();

    Json(HealthResponse {
        status: "UP".to_string(),
        cache_entries: gateway.cache().entry_count(),
        rate_limit: gateway.limiter().snapshot(),
    })
}
