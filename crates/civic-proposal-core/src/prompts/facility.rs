//! Few-shot prompt asking for a one-sentence description of an unknown facility.

use super::render;

pub const FACILITY_CONTEXT_TEMPLATE: &str = r#"다음 장소에 대한 정보를 간단히 분석해주세요: {location_name}

이 장소가 어떤 성격의 장소인지, 어떤 목적으로 사용되는지, 어떤 특징이 있는지
한 문장으로 요약해주세요.

예시:
- "태산패밀리파크" → "물놀이장, 조각공원, 야외공연장 등을 갖춘 김포시의 대표적인 가족 공원"
- "무지개 뜨는 언덕" → "김포시의 공설봉안당으로 추모와 사색을 위한 실내 시설"
- "시민회관" → "김포시의 문화행사와 시민활동을 위한 공공시설"

요약 문장만 출력하세요."#;

pub fn facility_context_prompt(location_name: &str) -> String {
    render(FACILITY_CONTEXT_TEMPLATE, &[("location_name", location_name)])
}
