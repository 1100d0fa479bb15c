//! Proposal pipeline: Extracting → ContextLookup → Prompting → Generating → Parsing → Done.
//!
//! `Fallback` is reachable from every stage. A failed model call, a missing model and a panic
//! anywhere in the chain all end in a complete draft: templates built from the request's
//! entities when they were computed, the fixed demonstration draft otherwise. Only validation
//! errors reach the caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

use futures_util::FutureExt;
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::entities::{extract, ExtractedEntities};
use crate::error::{ModelError, ProposalError};
use crate::facility::FacilityRegistry;
use crate::fallback::{demo_proposal, or_template, DraftTemplates};
use crate::model_client::TextGenerator;
use crate::parser::{parse, ParsedDraft, Section};
use crate::prompts::{self, PromptMode, StructuredDetails};
use crate::proposal::{FreeTextRequest, ProposalDraft, StructuredRequest};
use crate::refine::refine;

const FREE_TEXT: &str = "free_text";
const STRUCTURED: &str = "structured";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Extracting,
    ContextLookup,
    Prompting,
    Generating,
    Parsing,
    Done,
    Fallback,
}

fn enter(mode: &'static str, state: PipelineState) {
    tracing::debug!(mode, state = ?state, "pipeline");
}

/// Where the returned draft came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "sections")]
pub enum DraftSource {
    /// Every section parsed from the model reply.
    Model,
    /// Model reply with the listed sections replaced by templates.
    Partial(Vec<Section>),
    /// Entity-aware templates only.
    Template,
    /// The fixed demonstration draft.
    Demo,
}

#[derive(Debug, Clone)]
pub struct Drafted {
    pub draft: ProposalDraft,
    pub source: DraftSource,
}

impl Drafted {
    fn from_parsed(parsed: ParsedDraft) -> Self {
        let source = if parsed.is_degraded() {
            DraftSource::Partial(parsed.substituted)
        } else {
            DraftSource::Model
        };
        Self {
            draft: parsed.draft,
            source,
        }
    }

    fn templated(templates: &DraftTemplates<'_>) -> Self {
        Self {
            draft: templates.draft(),
            source: DraftSource::Template,
        }
    }
}

/// Entities recorded as soon as they exist, so a panic later in the run can still produce a
/// request-specific draft.
struct Facts {
    entities: ExtractedEntities,
    free_text: bool,
}

pub struct ProposalPipeline {
    generator: Option<Arc<dyn TextGenerator>>,
    facilities: Arc<FacilityRegistry>,
    organization: String,
}

impl ProposalPipeline {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        facilities: Arc<FacilityRegistry>,
        organization: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            facilities,
            organization: organization.into(),
        }
    }

    /// Live when the config carries a usable key, demo otherwise.
    pub fn from_config(config: &ServiceConfig, facilities: Arc<FacilityRegistry>) -> Self {
        let generator = config
            .model_client()
            .map(|c| Arc::new(c) as Arc<dyn TextGenerator>);
        Self::new(generator, facilities, config.organization.clone())
    }

    pub fn is_live(&self) -> bool {
        self.generator.is_some()
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn facilities(&self) -> &Arc<FacilityRegistry> {
        &self.facilities
    }

    pub async fn draft_free_text(&self, req: &FreeTextRequest) -> Result<Drafted, ProposalError> {
        req.validate()?;
        let facts = OnceLock::new();
        let run = self.run_free_text(req, &facts);
        Ok(self.guarded(FREE_TEXT, run, &facts).await)
    }

    pub async fn draft_structured(&self, req: &StructuredRequest) -> Result<Drafted, ProposalError> {
        req.validate()?;
        let facts = OnceLock::new();
        let run = self.run_structured(req, &facts);
        Ok(self.guarded(STRUCTURED, run, &facts).await)
    }

    async fn guarded<F>(&self, mode: &'static str, run: F, facts: &OnceLock<Facts>) -> Drafted
    where
        F: std::future::Future<Output = Drafted>,
    {
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(drafted) => drafted,
            Err(payload) => {
                tracing::error!(mode, panic = panic_message(&*payload), "pipeline panicked");
                enter(mode, PipelineState::Fallback);
                match facts.get() {
                    Some(f) if f.free_text => {
                        Drafted::templated(&DraftTemplates::for_free_text(&f.entities, &self.organization, ""))
                    }
                    Some(f) => Drafted::templated(&DraftTemplates::new(&f.entities, &self.organization)),
                    None => Drafted {
                        draft: demo_proposal(),
                        source: DraftSource::Demo,
                    },
                }
            }
        }
    }

    async fn run_free_text(&self, req: &FreeTextRequest, facts: &OnceLock<Facts>) -> Drafted {
        let Some(generator) = self.generator.as_deref() else {
            enter(FREE_TEXT, PipelineState::Fallback);
            tracing::info!("no model configured, returning demonstration draft");
            return Drafted {
                draft: demo_proposal(),
                source: DraftSource::Demo,
            };
        };

        enter(FREE_TEXT, PipelineState::Extracting);
        let entities = &facts
            .get_or_init(|| Facts {
                entities: extract(&req.problem, &req.solution),
                free_text: true,
            })
            .entities;
        tracing::info!(location = %entities.location, target = %entities.problem_target, "entities extracted");

        enter(FREE_TEXT, PipelineState::ContextLookup);
        let context = self
            .facilities
            .context_for(&entities.location, Some(generator))
            .await;

        enter(FREE_TEXT, PipelineState::Prompting);
        let prompt = prompts::build(entities, &context, &self.organization, PromptMode::FreeText);
        let templates = DraftTemplates::for_free_text(entities, &self.organization, &context);

        generate_and_parse(FREE_TEXT, generator, &prompt, &templates).await
    }

    async fn run_structured(&self, req: &StructuredRequest, facts: &OnceLock<Facts>) -> Drafted {
        let generator = self.generator.as_deref();

        enter(STRUCTURED, PipelineState::Extracting);
        let refined = refine(req, generator).await;
        let entities = &facts
            .get_or_init(|| Facts {
                entities: ExtractedEntities::from_structured(
                    &refined.location,
                    &refined.target,
                    req.problem_type(),
                    &refined.solution,
                ),
                free_text: false,
            })
            .entities;
        let templates = DraftTemplates::new(entities, &self.organization);

        let Some(generator) = generator else {
            enter(STRUCTURED, PipelineState::Fallback);
            return Drafted::templated(&templates);
        };

        enter(STRUCTURED, PipelineState::ContextLookup);
        let context = self
            .facilities
            .context_for(&entities.location, Some(generator))
            .await;

        enter(STRUCTURED, PipelineState::Prompting);
        let prompt = prompts::build(
            entities,
            &context,
            &self.organization,
            PromptMode::Structured(StructuredDetails {
                problem_description: &refined.problem_description,
                problem_type: req.problem_type(),
                affected_people: req.affected_people(),
            }),
        );

        generate_and_parse(STRUCTURED, generator, &prompt, &templates).await
    }
}

async fn generate_and_parse(
    mode: &'static str,
    generator: &dyn TextGenerator,
    prompt: &str,
    templates: &DraftTemplates<'_>,
) -> Drafted {
    enter(mode, PipelineState::Generating);
    or_template(
        "generate",
        async {
            let raw = generator.generate(prompt).await?;
            enter(mode, PipelineState::Parsing);
            let parsed = parse(&raw, templates);
            if parsed.is_degraded() {
                tracing::debug!(mode, substituted = ?parsed.substituted, "sections filled from templates");
            }
            enter(mode, PipelineState::Done);
            Ok::<_, ModelError>(Drafted::from_parsed(parsed))
        },
        || {
            enter(mode, PipelineState::Fallback);
            Drafted::templated(templates)
        },
    )
    .await
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
