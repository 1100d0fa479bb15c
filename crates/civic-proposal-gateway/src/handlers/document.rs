//! POST /download-pdf: render a reviewed draft as a signed proposal form.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use civic_proposal_core::{attachment_filename, render_proposal_pdf, DocumentRequest};

use super::AppState;
use crate::error::ApiError;

pub async fn download_pdf(
    State(state): State<AppState>,
    body: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    req.validate()?;

    let issued_at = chrono::Local::now();
    let filename = attachment_filename(&req.proposer_name, &issued_at);
    let organization = state.pipeline.organization().to_string();
    let font = state.font.clone();

    let bytes = tokio::task::spawn_blocking(move || {
        render_proposal_pdf(&req, &organization, &font, &issued_at)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!(filename = %filename, size = bytes.len(), "proposal document rendered");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        bytes,
    )
        .into_response())
}

/// RFC 5987 form so non-ASCII names survive every client.
fn content_disposition(filename: &str) -> String {
    format!("attachment; filename*=UTF-8''{}", urlencoding::encode(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_is_percent_encoded() {
        let value = content_disposition("시민제안서_홍길동_20250314_093000.pdf");
        assert!(value.starts_with("attachment; filename*=UTF-8''"));
        assert!(value.is_ascii());
        assert!(value.ends_with("_20250314_093000.pdf"));
    }
}
