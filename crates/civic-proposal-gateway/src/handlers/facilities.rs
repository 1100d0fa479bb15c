use axum::extract::State;
use axum::Json;
use civic_proposal_core::facility::FacilityTable;
use serde_json::{json, Value};

use super::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let api_mode = if state.pipeline.is_live() { "live" } else { "demo" };
    Json(json!({
        "status": "healthy",
        "version": civic_proposal_core::version(),
        "api_mode": api_mode,
        "facility_count": state.pipeline.facilities().len(),
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}

/// GET /facilities
pub async fn list_facilities(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.pipeline.facilities().snapshot();
    let table: &FacilityTable = &snapshot;
    Json(json!({
        "facilities": table,
        "count": table.len(),
    }))
}

/// POST /facilities/refresh
pub async fn refresh_facilities(State(state): State<AppState>) -> Json<Value> {
    let count = state.pipeline.facilities().refresh();
    Json(json!({
        "message": "시설 정보를 새로 불러왔습니다.",
        "count": count,
    }))
}
