//! Drafting endpoints. A draft is always returned once the request validates.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use civic_proposal_core::{Drafted, FreeTextRequest, StructuredRequest};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;

/// POST /generate-proposal
pub async fn generate_proposal(
    State(state): State<AppState>,
    body: Result<Json<FreeTextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let drafted = state.pipeline.draft_free_text(&req).await?;
    Ok(Json(proposal_body("free_text", drafted)))
}

/// POST /generate-structured-proposal
pub async fn generate_structured_proposal(
    State(state): State<AppState>,
    body: Result<Json<StructuredRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let drafted = state.pipeline.draft_structured(&req).await?;
    Ok(Json(proposal_body("structured", drafted)))
}

fn proposal_body(mode: &'static str, drafted: Drafted) -> Value {
    tracing::info!(mode, source = ?drafted.source, title = %drafted.draft.title, "proposal drafted");
    json!({
        "success": true,
        "proposal": drafted.draft,
        "source": drafted.source,
    })
}
