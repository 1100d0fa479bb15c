//! Deterministic drafts used whenever the model path is unavailable or too thin.
//!
//! [`or_template`] is the single place where a model-backed step degrades to its template;
//! every stage of the pipeline goes through it.

use std::future::Future;

use crate::entities::ExtractedEntities;
use crate::error::ModelError;
use crate::proposal::ProposalDraft;
use crate::title;

/// Run `primary`; on any model error log it and return `template()` instead.
pub async fn or_template<T, Fut, F>(stage: &'static str, primary: Fut, template: F) -> T
where
    Fut: Future<Output = Result<T, ModelError>>,
    F: FnOnce() -> T,
{
    match primary.await {
        Ok(value) => value,
        Err(ModelError::Unavailable) => {
            tracing::debug!(stage, "no model configured, using template");
            template()
        }
        Err(e) => {
            tracing::warn!(stage, error = %e, "model step failed, using template");
            template()
        }
    }
}

/// Location flavour used to pick template wording for free-text drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    FamilyPark,
    Memorial,
    General,
}

impl LocationKind {
    pub fn classify(location: &str, context: &str) -> Self {
        if context.contains("가족 공원") || context.contains("가족공원") || location.contains("파크") {
            LocationKind::FamilyPark
        } else if context.contains("봉안당") || context.contains("추모") {
            LocationKind::Memorial
        } else {
            LocationKind::General
        }
    }
}

/// Per-section template sentences for one request.
#[derive(Debug, Clone)]
pub struct DraftTemplates<'a> {
    entities: &'a ExtractedEntities,
    organization: &'a str,
    /// Text the title synthesizer inspects for category keywords.
    title_subject: String,
    kind: LocationKind,
}

impl<'a> DraftTemplates<'a> {
    /// General wording; the title subject is the problem target.
    pub fn new(entities: &'a ExtractedEntities, organization: &'a str) -> Self {
        Self {
            entities,
            organization,
            title_subject: entities.problem_target.clone(),
            kind: LocationKind::General,
        }
    }

    /// Free-text wording: the discomfort keyword joins the title subject so that, e.g., a worn
    /// bench is titled as an improvement rather than an installation.
    pub fn for_free_text(
        entities: &'a ExtractedEntities,
        organization: &'a str,
        context: &str,
    ) -> Self {
        Self {
            entities,
            organization,
            title_subject: format!("{} {}", entities.problem_target, entities.core_problem),
            kind: LocationKind::classify(&entities.location, context),
        }
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    pub fn title(&self) -> String {
        title::synthesize(
            &self.entities.location,
            &self.title_subject,
            &self.entities.requested_solution,
        )
    }

    pub fn problem(&self) -> String {
        let loc = &self.entities.location;
        let target = &self.entities.problem_target;
        let issue = &self.entities.core_problem;
        match self.kind {
            LocationKind::General => {
                format!("{loc}의 {target}에 대한 문제가 지속적으로 제기되고 있습니다.")
            }
            LocationKind::FamilyPark => format!(
                "김포시 {loc}의 {target}에서 '{issue}' 문제가 발생하여 가족 방문객들의 안전과 편의가 저해되고 있습니다. \
                 특히 어린이들의 안전사고 위험과 가족 단위 휴식의 어려움이 있어 개선이 필요한 상황입니다."
            ),
            LocationKind::Memorial => format!(
                "김포시 {loc}의 {target}에서 '{issue}' 문제가 발생하여 유가족들의 추모 환경이 저해되고 있습니다. \
                 경건한 분위기 조성과 편안한 휴식 공간 제공에 어려움이 있어 개선이 필요한 상황입니다."
            ),
        }
    }

    pub fn solution(&self) -> String {
        let org = self.organization;
        let loc = &self.entities.location;
        let target = &self.entities.problem_target;
        match self.kind {
            LocationKind::General => {
                let wanted = requested_or_default(&self.entities.requested_solution);
                format!(
                    "{org}에서 {wanted}{} 추진해 주실 것을 제안합니다.",
                    object_particle(wanted)
                )
            }
            LocationKind::FamilyPark => format!(
                "{org}에서 {loc} {target} 개선을 추진해 주실 것을 제안합니다. \
                 현장 실사를 통해 적절한 위치를 결정하고, 아이들의 안전을 고려한 내구성 있는 재질의 {target}{} 설치해 주시기 바랍니다.",
                object_particle(target)
            ),
            LocationKind::Memorial => format!(
                "{org}에서 {loc} {target} 개선을 추진해 주실 것을 제안합니다. \
                 현장 실사를 통해 적절한 위치를 결정하고, 경건한 분위기에 어울리는 차분한 디자인의 {target}{} 설치해 주시기 바랍니다.",
                object_particle(target)
            ),
        }
    }

    pub fn effect(&self) -> String {
        let loc = &self.entities.location;
        let target = &self.entities.problem_target;
        match self.kind {
            LocationKind::General => format!(
                "{loc}의 {target} 개선을 통해 시민 편의 증진과 시설 이용률 향상을 기대할 수 있습니다."
            ),
            LocationKind::FamilyPark => format!(
                "이 제안이 실현될 경우 {loc}{} 방문하는 가족들의 안전과 편의가 향상될 것으로 예상됩니다. \
                 어린이들의 안전사고 위험이 줄고 가족 단위 휴식 공간이 확보되어 시설 이용 만족도가 높아질 것입니다.",
                object_particle(loc)
            ),
            LocationKind::Memorial => format!(
                "이 제안이 실현될 경우 {loc}{} 이용하는 유가족들의 추모 환경이 개선될 것으로 예상됩니다. \
                 경건하고 편안한 분위기 조성을 통해 유가족의 심리적 안정에 기여할 것입니다.",
                object_particle(loc)
            ),
        }
    }

    /// Every section from templates.
    pub fn draft(&self) -> ProposalDraft {
        ProposalDraft {
            title: self.title(),
            problem: self.problem(),
            solution: self.solution(),
            effect: self.effect(),
        }
    }
}

fn requested_or_default(requested: &str) -> &str {
    let r = requested.trim();
    if r.is_empty() {
        "시설 개선"
    } else {
        r
    }
}

/// `을` after a final consonant, `를` after an open syllable. Non-Hangul endings get `을`.
pub fn object_particle(word: &str) -> &'static str {
    match word.trim_end().chars().last() {
        Some(c @ '가'..='힣') => {
            if (c as u32 - '가' as u32) % 28 == 0 {
                "를"
            } else {
                "을"
            }
        }
        _ => "을",
    }
}

/// Fixed demonstration proposal returned when no request-specific facts were computed.
pub fn demo_proposal() -> ProposalDraft {
    ProposalDraft {
        title: "시민회관 주차공간 확충을 위한 사우광장 임시주차장 조성 제안".to_string(),
        problem: "현재 시민회관 이용 시 주차공간이 부족하여 시민들의 불편이 지속되고 있습니다. \
                  특히 행사가 있는 날에는 주차 문제로 인해 시민회관 이용을 포기하는 경우가 빈번하게 발생하고 있습니다."
            .to_string(),
        solution: "이러한 문제를 해결하기 위해 시민회관 바로 옆인 사우광장을 임시주차장으로 조성하는 것을 제안합니다. \
                   사우광장은 시민회관과 인접하여 접근성이 우수하며, 기존 공원 기능을 유지하면서도 주차 공간으로 활용할 수 있는 최적의 장소입니다."
            .to_string(),
        effect: "사우광장 임시주차장 조성으로 시민회관 이용객의 주차 편의성이 크게 향상될 것으로 예상됩니다. \
                 이를 통해 시민회관 이용률이 증가하고, 지역 주민들의 문화생활 참여도가 높아질 것입니다. \
                 또한 주변 상권 활성화에도 긍정적인 영향을 미칠 것으로 기대됩니다."
            .to_string(),
    }
}
