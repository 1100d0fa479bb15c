pub mod document;
pub mod facilities;
pub mod proposal;

use std::sync::Arc;

use civic_proposal_core::{DocumentFont, ProposalPipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProposalPipeline>,
    pub font: DocumentFont,
}
