//! Civic proposal drafting core.
//!
//! Turns a citizen's complaint into a four-section proposal: entity extraction, facility context,
//! prompt construction, one model call, section parsing, with deterministic templates behind
//! every step. Also renders the proposal and consent form as a PDF.

pub mod config;
pub mod document;
pub mod entities;
pub mod error;
pub mod facility;
pub mod fallback;
pub mod model_client;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod proposal;
pub mod refine;
pub mod title;

pub use config::ServiceConfig;
pub use document::{attachment_filename, render_proposal_pdf, DocumentFont, DocumentRequest};
pub use entities::{extract, ExtractedEntities};
pub use error::{DocumentError, ModelError, ProposalError};
pub use facility::{FacilityInfo, FacilityRegistry, GENERIC_CONTEXT};
pub use model_client::{ChatCompletionsClient, TextGenerator};
pub use pipeline::{DraftSource, Drafted, PipelineState, ProposalPipeline};
pub use proposal::{FreeTextRequest, ProposalDraft, StructuredRequest};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
