//! Deterministic proposal titles from target keywords.
//!
//! Categories are evaluated top to bottom and the first hit wins, so a target mentioning both
//! a fire door and parking is titled as a safety proposal.

struct TitleRule {
    keywords: &'static [&'static str],
    /// Sub-keywords that switch the phrase to `refined` when present.
    refine_on: &'static [&'static str],
    phrase: &'static str,
    refined: &'static str,
}

const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        keywords: &["방화문", "안전문", "문이 열려", "문이 열린", "문 열림"],
        refine_on: &[],
        phrase: "안전시설 점검 및 보강 제안",
        refined: "",
    },
    TitleRule {
        keywords: &["안전", "위험", "사고", "부상"],
        refine_on: &[],
        phrase: "안전시설 보강 제안",
        refined: "",
    },
    TitleRule {
        keywords: &["주차", "주차공간", "주차장"],
        refine_on: &["부족", "없음", "많이"],
        phrase: "주차시설 개선 제안",
        refined: "주차공간 확충 제안",
    },
    TitleRule {
        keywords: &["벤치", "의자", "앉을 곳", "휴게"],
        refine_on: &["낡", "부족", "없음", "많이"],
        phrase: "휴게시설 설치 제안",
        refined: "휴게시설 개선 제안",
    },
    TitleRule {
        keywords: &["편의", "화장실", "음수대", "매점"],
        refine_on: &[],
        phrase: "편의시설 설치 제안",
        refined: "",
    },
    TitleRule {
        keywords: &["조명", "밝기", "어둡", "불빛"],
        refine_on: &[],
        phrase: "조명시설 개선 제안",
        refined: "",
    },
    TitleRule {
        keywords: &["접근", "이동", "길", "보도"],
        refine_on: &[],
        phrase: "접근성 개선 제안",
        refined: "",
    },
    TitleRule {
        keywords: &["청결", "깨끗", "쓰레기", "환경"],
        refine_on: &[],
        phrase: "환경정리 및 청결관리 개선 제안",
        refined: "",
    },
];

const GENERIC_PHRASE: &str = "시설 개선 제안";

/// `"{location} {category phrase}"` for the first category whose keywords appear in `target`.
///
/// `_solution` is accepted for parity with the other template builders; current rules only
/// look at the target.
pub fn synthesize(location: &str, target: &str, _solution: &str) -> String {
    let phrase = TITLE_RULES
        .iter()
        .find(|rule| contains_any(target, rule.keywords))
        .map(|rule| {
            if contains_any(target, rule.refine_on) {
                rule.refined
            } else {
                rule.phrase
            }
        })
        .unwrap_or(GENERIC_PHRASE);
    format!("{} {}", location.trim(), phrase)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parking_shortage_is_expansion() {
        assert_eq!(synthesize("시민회관", "주차공간 부족", ""), "시민회관 주차공간 확충 제안");
        assert_eq!(synthesize("시민회관", "주차장 정비", ""), "시민회관 주차시설 개선 제안");
    }

    #[test]
    fn seating_condition_selects_improvement_or_installation() {
        assert_eq!(
            synthesize("태산패밀리파크", "벤치가 낡았어요", ""),
            "태산패밀리파크 휴게시설 개선 제안"
        );
        assert_eq!(
            synthesize("태산패밀리파크", "벤치", ""),
            "태산패밀리파크 휴게시설 설치 제안"
        );
    }

    #[test]
    fn safety_door_outranks_general_safety_and_parking() {
        assert_eq!(
            synthesize("무지개 뜨는 언덕", "방화문이 위험하게 열려 있고 주차도 부족", ""),
            "무지개 뜨는 언덕 안전시설 점검 및 보강 제안"
        );
        assert_eq!(
            synthesize("사우광장", "주차 차량 때문에 사고 위험", ""),
            "사우광장 안전시설 보강 제안"
        );
    }

    #[test]
    fn remaining_categories() {
        assert_eq!(synthesize("도서관", "화장실", ""), "도서관 편의시설 설치 제안");
        assert_eq!(synthesize("도서관", "밤에 어둡다", ""), "도서관 조명시설 개선 제안");
        assert_eq!(synthesize("도서관", "보도 턱", ""), "도서관 접근성 개선 제안");
        assert_eq!(
            synthesize("도서관", "쓰레기", ""),
            "도서관 환경정리 및 청결관리 개선 제안"
        );
        assert_eq!(synthesize("도서관", "냉방", ""), "도서관 시설 개선 제안");
    }

    #[test]
    fn synthesis_is_idempotent() {
        let a = synthesize("시민회관", "의자 부족", "의자를 늘려주세요");
        let b = synthesize("시민회관", "의자 부족", "의자를 늘려주세요");
        assert_eq!(a, b);
    }
}
