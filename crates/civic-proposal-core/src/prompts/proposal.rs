//! Proposal-drafting prompts. Both variants ask for the same four `##` sections so a single
//! parser handles either reply.

use super::render;
use crate::entities::ExtractedEntities;

const NOT_GIVEN: &str = "사용자가 명시하지 않음";

/// Free-text mode: entities were extracted from the citizen's prose.
pub const FREE_TEXT_TEMPLATE: &str = r#"당신은 **김포시 정책기획실장**이자 **시민제안서 검토 전문가**입니다.

[최우선 원칙]
- 사용자가 제공한 핵심 정보를 절대 변경하거나 일반화하지 마세요
- 사용자의 의견을 최대한 보존하고 다듬기만 하세요
- 새로운 내용을 추가하거나 추측하지 마세요

[사용자 핵심 의견 분석]
- 핵심 제안 장소: {location}
- 핵심 문제 대상: {target}
- 핵심 문제: {core_problem}
- 요청 해결책: {solution}

[맥락 정보]
- 제안 대상 장소: {location}
- 장소 유형 및 특징: {context}
- 수신 기관: {organization}

[작성 지시]
위의 [핵심 제안 장소]와 [핵심 문제 대상]을 중심으로 {organization}에 제출하는 시민제안서 초안을 작성해주세요.

## 1. 제안명
- [핵심 제안 장소]의 [핵심 문제 대상]과 관련된 구체적이고 명확한 제목
- "~ 개선 제안", "~ 설치 요청" 등의 형태로 15-25자 내외로 작성

## 2. 현황 및 문제점
- [핵심 제안 장소]의 [핵심 문제 대상]에 대한 구체적인 문제 상황
- 장소 유형에 맞는 불편함이나 위험성을 논리적으로 추론하여 서술
- 2-3문장으로 간결하게 작성

## 3. 개선 방안
- 사용자가 제안한 해결책: "{solution}"
- "{organization}에서 ~을 추진해 주실 것을 제안합니다" 형태로 작성
- {organization}의 업무 범위와 역할을 고려한 현실적이고 실행 가능한 방안 제시
- 구체적인 수치나 예산은 제시하지 말고 "현장 실사 후 결정", "관련 부서 검토 필요" 등으로 표현
- 2-3문장으로 작성

## 4. 기대 효과
- [핵심 제안 장소]의 [핵심 문제 대상] 개선을 통한 구체적인 기대 효과
- 직접적 편익, 시설 활성화 측면, 사회적/공익적 가치로 구분하여 2-3문장으로 서술

[금지사항 - 절대 준수]
- [핵심 제안 장소]와 [핵심 문제 대상]을 일반화하거나 생략하는 것 금지
- 과장되고 추상적인 내용 작성 금지
- 장소의 특성과 무관한 일반적인 내용 작성 금지
- 구체적인 수치, 예산, 일정 등을 임의로 작성하는 것 금지
- "~하겠습니다" 형태의 1인칭 표현 사용 금지

위 지침에 따라 제안서를 작성해주세요."#;

/// Structured mode: the form (optionally refined) supplied every fact.
pub const STRUCTURED_TEMPLATE: &str = r#"당신은 **김포시 정책기획실장**이자 **시민제안서 검토 전문가**입니다.

[최우선 원칙]
- 사용자 의견의 핵심 정보를 절대 변경하거나 일반화하지 마세요
- 구체적이고 현실적인 내용으로 작성하되, 과장하지 마세요
- 각 섹션을 자연스럽고 읽기 쉬운 전문 문장으로 작성하세요

[사용자 핵심 의견]
- 핵심 제안 장소: {location}
- 핵심 문제 대상: {target}
- 문제 상황 설명: {problem_description}
- 요청 해결책: {solution}
- 문제 유형: {problem_type}
- 주요 불편 대상: {affected_people}

[맥락 정보]
- 제안 대상 장소: {location}
- 장소 유형 및 특징: {context}
- 수신 기관: {organization}

[작성 지시]
위의 [사용자 핵심 의견]을 바탕으로 {organization}에 제출하는 시민제안서 초안을 작성해주세요.

## 1. 제안명
- {location}의 {target}과 관련된 구체적이고 명확한 제목
- "~ 개선 제안", "~ 교체 제안", "~ 설치 요청", "~ 확충 제안", "~ 보강 제안" 등의 형태
- 15-25자 내외로 간결하고 핵심을 담은 제목

## 2. 현행상의 문제점
다음 내용을 바탕으로 구체적이고 자연스러운 문장으로 작성:
- 문제 상황: {problem_description}
{problem_type_line}{affected_people_line}- 2-3문장으로 작성하고 문제의 원인과 결과를 논리적으로 연결
- "문제가 지속적으로 제기되고 있습니다" 같은 일반적 표현은 사용하지 마세요

## 3. 개선 안
- 해결책: {solution}
- "{organization}에서 [구체적 개선 방안]을 추진해 주실 것을 제안합니다." 형식
- 해결책의 핵심을 유지하되 그대로 복사하지 말고 자연스럽게 재구성
- {organization}의 업무 범위를 고려한 현실적 방안

## 4. 기대 효과
{location}의 {target} 개선을 통한 기대 효과를 다음 관점에서 2-3문장으로 서술:
1. 직접적 편익: 이용객의 안전과 편의 증진
2. {beneficiary_line}
3. 시설 활성화: 개선을 통한 이용률 향상
4. 사회적 가치: 공공시설의 품질 향상

[금지사항 - 절대 준수]
- "{location}"와 "{target}"을 일반화하거나 생략하는 것 금지
- 입력 내용을 그대로 복사-붙여넣기하는 것 금지
- 과장되고 추상적인 내용 작성 금지
- 구체적인 수치, 예산, 일정 등을 임의로 작성하는 것 금지
- "~하겠습니다" 형태의 1인칭 표현 사용 금지

위 지침을 철저히 준수하여 전문적이고 자연스러운 제안서를 작성해주세요."#;

/// Extra facts that only structured requests carry.
#[derive(Debug, Clone, Copy)]
pub struct StructuredDetails<'a> {
    pub problem_description: &'a str,
    pub problem_type: Option<&'a str>,
    pub affected_people: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub enum PromptMode<'a> {
    FreeText,
    Structured(StructuredDetails<'a>),
}

/// Assemble the drafting prompt. Entity values are inserted verbatim.
pub fn build(
    entities: &ExtractedEntities,
    context: &str,
    organization: &str,
    mode: PromptMode<'_>,
) -> String {
    match mode {
        PromptMode::FreeText => render(
            FREE_TEXT_TEMPLATE,
            &[
                ("location", entities.location.as_str()),
                ("target", entities.problem_target.as_str()),
                ("core_problem", entities.core_problem.as_str()),
                ("solution", entities.requested_solution.as_str()),
                ("context", context),
                ("organization", organization),
            ],
        ),
        PromptMode::Structured(details) => {
            let problem_type_line = details
                .problem_type
                .map(|t| format!("- 문제 유형 '{t}' 관점에서 구체적으로 서술\n"))
                .unwrap_or_default();
            let affected_people_line = details
                .affected_people
                .map(|p| format!("- 불편 대상 '{p}'의 관점에서 구체적으로 서술\n"))
                .unwrap_or_default();
            let beneficiary_line = match details.affected_people {
                Some(p) => format!("불편 대상 '{p}'에 대한 구체적 편익"),
                None => "시설 이용객에 대한 구체적 편익".to_string(),
            };
            render(
                STRUCTURED_TEMPLATE,
                &[
                    ("location", entities.location.as_str()),
                    ("target", entities.problem_target.as_str()),
                    ("problem_description", details.problem_description),
                    ("solution", entities.requested_solution.as_str()),
                    ("problem_type", details.problem_type.unwrap_or(NOT_GIVEN)),
                    ("affected_people", details.affected_people.unwrap_or(NOT_GIVEN)),
                    ("problem_type_line", problem_type_line.as_str()),
                    ("affected_people_line", affected_people_line.as_str()),
                    ("beneficiary_line", beneficiary_line.as_str()),
                    ("context", context),
                    ("organization", organization),
                ],
            )
        }
    }
}
