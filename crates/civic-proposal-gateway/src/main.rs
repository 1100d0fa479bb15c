//! Civic proposal gateway: turns citizens' complaints into formal proposal drafts and renders
//! reviewed drafts as PDF forms. Runs in demo mode when no model key is configured.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use civic_proposal_core::{DocumentFont, FacilityRegistry, ProposalPipeline, ServiceConfig};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handlers::{document, facilities, proposal, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::load()?;
    let registry = Arc::new(FacilityRegistry::new(config.facilities_path.clone()));
    let pipeline = Arc::new(ProposalPipeline::from_config(&config, registry));
    let state = AppState {
        pipeline,
        font: DocumentFont::load(config.font_path.as_deref()),
    };

    if state.pipeline.is_live() {
        tracing::info!(model = %config.llm_model, "model client configured, running live");
    } else {
        tracing::warn!("no API key configured, running in demo mode");
    }

    let app = build_app(state, config.cors_permissive).layer(axum::middleware::from_fn(log_request));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, organization = %config.organization, "gateway listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn build_app(state: AppState, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/generate-proposal", post(proposal::generate_proposal))
        .route(
            "/generate-structured-proposal",
            post(proposal::generate_structured_proposal),
        )
        .route("/download-pdf", post(document::download_pdf))
        .route("/health", get(facilities::health))
        .route("/facilities", get(facilities::list_facilities))
        .route("/facilities/refresh", post(facilities::refresh_facilities))
        .with_state(state)
        .layer(cors)
}

async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    tracing::info!(peer = %addr, method = %request.method(), path = %request.uri().path(), "request");
    next.run(request).await
}
