//! Rewrites colloquial structured-form input into formal prose, answered as JSON.

use super::render;

const NOT_GIVEN: &str = "명시되지 않음";

pub const REFINE_TEMPLATE: &str = r#"당신은 시민제안서 작성을 돕는 전문 어시스턴트입니다.

[임무]
사용자가 입력한 구어체나 단편적인 내용을 공공기관 제안서에 적합한 자연스럽고 전문적인 문장으로 변환하세요.

[사용자 원본 입력]
- 장소: {location}
- 문제 대상: {target}
- 문제 유형: {problem_type}
- 불편 대상: {affected_people}
- 해결책: {solution}

[변환 원칙]
1. 구어체 제거: "벤치가 낡았어요" → "벤치가 노후화되어", "위험해 보임" → "안전상 위험할 수 있어"
2. 단편적 표현 확장: "새로 바꿔주세요" → "기존 시설을 새로운 것으로 교체해 주실 것을 제안합니다"
3. 핵심 정보 보존: "{location}"는 그대로 유지하고, 문제 대상의 핵심은 유지하되 표현만 정제
4. 공공기관 어조: "~해 주세요" → "~해 주실 것을 제안합니다"
5. "매우", "정말", "너무" 등의 강조 표현과 감정적 표현 최소화

[출력 형식]
다음 JSON 형식으로만 출력하세요:
{
    "refined_location": "정제된 장소명",
    "refined_target": "정제된 문제 대상",
    "refined_problem_description": "문제 상황을 설명하는 2-3문장",
    "refined_solution": "해결책을 설명하는 1-2문장"
}

중요: JSON만 출력하고 마크다운이나 설명은 붙이지 마세요."#;

pub fn refine_prompt(
    location: &str,
    target: &str,
    problem_type: Option<&str>,
    affected_people: Option<&str>,
    solution: &str,
) -> String {
    render(
        REFINE_TEMPLATE,
        &[
            ("location", location),
            ("target", target),
            ("problem_type", problem_type.unwrap_or(NOT_GIVEN)),
            ("affected_people", affected_people.unwrap_or(NOT_GIVEN)),
            ("solution", solution),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refine_prompt_keeps_json_skeleton() {
        let p = refine_prompt("태산패밀리파크", "벤치가 낡았어요", None, Some("어린이"), "새로 바꿔주세요");
        assert!(p.contains("- 장소: 태산패밀리파크"));
        assert!(p.contains("- 문제 유형: 명시되지 않음"));
        assert!(p.contains("- 불편 대상: 어린이"));
        assert!(p.contains("\"refined_problem_description\""));
        assert!(p.contains("{\n    \"refined_location\""));
    }
}
