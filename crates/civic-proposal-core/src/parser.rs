//! Splits raw model text into the four proposal sections.
//!
//! A cursor walks the lines. Header lines move the cursor and are never content; other headings,
//! rules, fences and bracketed instruction lines are dropped without moving it. Whatever ends up empty or too short
//! is replaced by the matching template, so [`parse`] always yields a complete draft.

use serde::Serialize;

use crate::fallback::DraftTemplates;
use crate::proposal::ProposalDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Title,
    Problem,
    Solution,
    Effect,
}

impl Section {
    const ALL: [Section; 4] = [
        Section::Title,
        Section::Problem,
        Section::Solution,
        Section::Effect,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Minimum trimmed length, in characters, for a parsed section to be kept.
    pub fn min_chars(self) -> usize {
        match self {
            Section::Title => 10,
            _ => 20,
        }
    }
}

/// Header keywords, checked in this order; the first section with a hit wins.
const SECTION_HEADERS: &[(Section, &[&str])] = &[
    (Section::Title, &["제안명", "제목"]),
    (Section::Problem, &["문제점", "현황"]),
    (Section::Solution, &["개선 방안", "개선방안", "개선 안", "개선안"]),
    (Section::Effect, &["기대 효과", "기대효과", "효과", "기대"]),
];

/// Unmarked labels longer than this are treated as prose that happens to contain a keyword.
const MAX_HEADER_CHARS: usize = 24;

/// Parse result. `substituted` lists the sections that came from templates.
#[derive(Debug, Clone)]
pub struct ParsedDraft {
    pub draft: ProposalDraft,
    pub substituted: Vec<Section>,
}

impl ParsedDraft {
    pub fn is_degraded(&self) -> bool {
        !self.substituted.is_empty()
    }
}

enum Line<'a> {
    Skip,
    Header(Section, &'a str),
    Content(&'a str),
}

pub fn parse(raw: &str, templates: &DraftTemplates<'_>) -> ParsedDraft {
    let mut buffers: [Vec<String>; 4] = Default::default();
    let mut cursor: Option<Section> = None;

    for line in raw.lines() {
        match classify(line.trim()) {
            Line::Skip => {}
            Line::Header(section, inline) => {
                cursor = Some(section);
                push_content(&mut buffers[section.index()], inline);
            }
            Line::Content(text) => {
                if let Some(section) = cursor {
                    push_content(&mut buffers[section.index()], text);
                }
            }
        }
    }

    let mut substituted = Vec::new();
    let mut fields = Section::ALL.map(|section| {
        let joined = buffers[section.index()].join(" ");
        if joined.chars().count() >= section.min_chars() {
            joined
        } else {
            substituted.push(section);
            String::new()
        }
    });
    for section in &substituted {
        fields[section.index()] = match section {
            Section::Title => templates.title(),
            Section::Problem => templates.problem(),
            Section::Solution => templates.solution(),
            Section::Effect => templates.effect(),
        };
    }
    let [title, problem, solution, effect] = fields;

    ParsedDraft {
        draft: ProposalDraft {
            title,
            problem,
            solution,
            effect,
        },
        substituted,
    }
}

fn classify(line: &str) -> Line<'_> {
    if line.is_empty() || is_structural(line) {
        return Line::Skip;
    }

    let heading = line.starts_with('#');
    let stripped = strip_leading_markup(line);
    let had_markup = stripped.len() != line.len();
    let (label, inline, has_colon) = match stripped.find([':', '：']) {
        Some(pos) => {
            let colon_len = stripped[pos..].chars().next().map_or(1, char::len_utf8);
            (&stripped[..pos], &stripped[pos + colon_len..], true)
        }
        None => (stripped, "", false),
    };
    let label = label.trim_matches(|c: char| c == '*' || c == '[' || c == ']' || c.is_whitespace());

    if let Some(section) = header_section(label) {
        // `#` headings are headers whatever their length; unmarked lines must look like labels.
        let label_like = label.chars().count() <= MAX_HEADER_CHARS
            && (has_colon || !looks_like_sentence(label));
        if heading || label_like {
            return Line::Header(section, inline);
        }
    }
    // Sub-headings inside a section are dropped and the cursor stays put.
    if heading || (had_markup && stripped.is_empty()) {
        return Line::Skip;
    }
    Line::Content(line)
}

fn header_section(label: &str) -> Option<Section> {
    if label.is_empty() {
        return None;
    }
    SECTION_HEADERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| label.contains(k)))
        .map(|(section, _)| *section)
}

/// Fences, horizontal rules and `[...]` instruction labels.
fn is_structural(line: &str) -> bool {
    line.starts_with("```")
        || (line.chars().count() >= 3 && line.chars().all(|c| matches!(c, '-' | '=' | '*' | '_')))
        || (line.starts_with('[') && line.ends_with(']'))
}

fn looks_like_sentence(label: &str) -> bool {
    label.ends_with(['.', '!', '?', '다', '요'])
}

/// Drops heading hashes, emphasis stars, brackets and `1.` / `2)` numbering from the front.
fn strip_leading_markup(line: &str) -> &str {
    let mut s = line;
    loop {
        let before = s.len();
        s = s.trim_start_matches(|c: char| matches!(c, '#' | '*' | '[' | '>') || c.is_whitespace());
        let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 {
            let rest = &s[digits..];
            if let Some(r) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
                s = r;
            }
        }
        if s.len() == before {
            return s;
        }
    }
}

fn push_content(buffer: &mut Vec<String>, text: &str) {
    let cleaned = clean_content(text);
    if !cleaned.is_empty() {
        buffer.push(cleaned);
    }
}

/// Removes bullets, bold markers and wrapping quotes, keeping the text itself.
fn clean_content(text: &str) -> String {
    let text = text
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '·' | '>' | '#') || c.is_whitespace());
    strip_list_number(text)
        .replace("**", "")
        .trim()
        .trim_matches(|c: char| c == '"' || c == '“' || c == '”')
        .trim()
        .to_string()
}

/// `1. text` / `2) text` → `text`. Decimals such as `1.5배` are left alone.
fn strip_list_number(text: &str) -> &str {
    let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == text.len() {
        return text;
    }
    match rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
        Some(after) if after.starts_with(char::is_whitespace) => after.trim_start(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{extract, ExtractedEntities};

    const ORG: &str = "김포도시관리공사";

    fn entities() -> ExtractedEntities {
        extract("태산패밀리파크 벤치가 낡았어요", "새로 바꿔주세요")
    }

    const WELL_FORMED: &str = "\
## 1. 제안명
태산패밀리파크 놀이터 주변 벤치 교체 제안

## 2. 현황 및 문제점
태산패밀리파크 놀이터 주변 벤치가 노후화되어 불안정한 상태입니다.
이용객의 안전을 위협할 수 있어 개선이 필요합니다.

## 3. 개선 방안
- 김포도시관리공사에서 노후 벤치를 내구성이 우수한 새 벤치로 교체해 주실 것을 제안합니다.

## 4. 기대 효과
**직접적 편익**: 가족 방문객의 안전과 편의가 증진될 것으로 기대됩니다.
";

    #[test]
    fn four_ordered_sections_round_trip() {
        let e = entities();
        let parsed = parse(WELL_FORMED, &DraftTemplates::new(&e, ORG));
        assert!(!parsed.is_degraded());
        let d = parsed.draft;
        assert_eq!(d.title, "태산패밀리파크 놀이터 주변 벤치 교체 제안");
        assert_eq!(
            d.problem,
            "태산패밀리파크 놀이터 주변 벤치가 노후화되어 불안정한 상태입니다. 이용객의 안전을 위협할 수 있어 개선이 필요합니다."
        );
        assert_eq!(
            d.solution,
            "김포도시관리공사에서 노후 벤치를 내구성이 우수한 새 벤치로 교체해 주실 것을 제안합니다."
        );
        assert_eq!(
            d.effect,
            "직접적 편익: 가족 방문객의 안전과 편의가 증진될 것으로 기대됩니다."
        );
    }

    #[test]
    fn empty_text_is_all_templates() {
        let e = entities();
        let t = DraftTemplates::new(&e, ORG);
        let parsed = parse("", &t);
        assert_eq!(parsed.substituted, Section::ALL.to_vec());
        assert_eq!(parsed.draft, t.draft());
        assert!(parsed.draft.is_complete());
    }

    #[test]
    fn headerless_text_is_all_templates() {
        let e = entities();
        let t = DraftTemplates::new(&e, ORG);
        let parsed = parse("벤치가 오래되어 교체가 필요한 상황이라고 생각됩니다.\n감사합니다.", &t);
        assert_eq!(parsed.draft, t.draft());
    }

    #[test]
    fn one_empty_section_is_filled() {
        let raw = WELL_FORMED.replace(
            "- 김포도시관리공사에서 노후 벤치를 내구성이 우수한 새 벤치로 교체해 주실 것을 제안합니다.\n",
            "",
        );
        let e = entities();
        let t = DraftTemplates::new(&e, ORG);
        let parsed = parse(&raw, &t);
        assert_eq!(parsed.substituted, vec![Section::Solution]);
        assert_eq!(parsed.draft.solution, t.solution());
        assert_eq!(parsed.draft.title, "태산패밀리파크 놀이터 주변 벤치 교체 제안");
    }

    #[test]
    fn short_sections_fall_back() {
        let raw = "제안명: 벤치 교체\n문제점: 낡음\n개선 방안: 교체\n기대 효과: 좋아짐";
        let e = entities();
        let t = DraftTemplates::new(&e, ORG);
        let parsed = parse(raw, &t);
        assert_eq!(parsed.substituted.len(), 4);
        assert_eq!(parsed.draft.title, t.title());
    }

    #[test]
    fn inline_header_content_is_kept() {
        let raw = "**제안명**: \"시민회관 주차공간 확충을 위한 제안\"\n\
                   **현황**: 행사일마다 시민회관 주차장이 가득 차서 인근 도로에 불법 주차가 늘고 있습니다.\n\
                   **개선 방안**: 인접한 사우광장 일부를 임시주차장으로 활용하는 방안을 검토해 주실 것을 제안합니다.\n\
                   **기대 효과**: 시민회관 이용객의 주차 편의가 향상되고 주변 교통 혼잡이 줄어들 것입니다.";
        let e = entities();
        let parsed = parse(raw, &DraftTemplates::new(&e, ORG));
        assert!(!parsed.is_degraded());
        assert_eq!(parsed.draft.title, "시민회관 주차공간 확충을 위한 제안");
        assert!(parsed.draft.problem.starts_with("행사일마다"));
    }

    #[test]
    fn markup_never_reaches_fields() {
        let raw = "# 시민제안서\n---\n## 제안명\n**태산패밀리파크 벤치 교체 제안**\n\
                   [작성 지시]\n## 현행상의 문제점\n* 벤치가 흔들리고 표면이 갈라져 어린이가 다칠 수 있습니다.\n\
                   ```\n## 개선 안\n• 노후 벤치를 새 벤치로 교체해 주실 것을 제안합니다. 현장 실사 후 결정이 필요합니다.\n\
                   ## 기대 효과\n1. 이용객의 안전사고 위험이 줄고 공원 이용 만족도가 높아질 것입니다.";
        let e = entities();
        let parsed = parse(raw, &DraftTemplates::new(&e, ORG));
        assert!(!parsed.is_degraded());
        let d = parsed.draft;
        for field in [&d.title, &d.problem, &d.solution, &d.effect] {
            assert!(!field.contains("**"));
            assert!(!field.starts_with('#'));
            assert!(!field.starts_with('-'));
            assert!(!field.starts_with('•'));
            assert!(!field.contains("작성 지시"));
        }
        assert_eq!(d.title, "태산패밀리파크 벤치 교체 제안");
        assert!(d.effect.starts_with("이용객의"));
    }

    #[test]
    fn keyword_precedence_decides_mixed_headers() {
        // Both a solution and an effect keyword: the solution entry is checked first.
        let raw = "## 개선 방안 및 기대 효과\n노후 벤치를 새 벤치로 교체하고 주변 조명도 함께 정비해 주시기 바랍니다.";
        let e = entities();
        let parsed = parse(raw, &DraftTemplates::new(&e, ORG));
        assert!(parsed.draft.solution.starts_with("노후 벤치를"));
        assert!(parsed.substituted.contains(&Section::Effect));
    }

    #[test]
    fn short_sentence_with_keyword_is_content() {
        let raw = "## 기대 효과\n공원 이용 만족도가 높아지고 안전사고가 줄어들 것입니다.\n만족도 향상이 기대됩니다.";
        let e = entities();
        let parsed = parse(raw, &DraftTemplates::new(&e, ORG));
        assert_eq!(
            parsed.draft.effect,
            "공원 이용 만족도가 높아지고 안전사고가 줄어들 것입니다. 만족도 향상이 기대됩니다."
        );
    }

    #[test]
    fn sub_headings_keep_section_content() {
        let raw = "## 4. 기대 효과\n\
                   ### 1) 직접적 편익\n\
                   가족 방문객의 안전과 편의가 크게 증진될 것으로 예상됩니다.\n\
                   ### 2) 시설 활성화\n\
                   쾌적한 휴식 공간이 마련되어 공원 이용률이 높아질 것입니다.\n\
                   ### 3) 사회적/공익적 가치\n\
                   공공시설의 품질 향상으로 시민 만족도가 높아집니다.";
        let e = entities();
        let parsed = parse(raw, &DraftTemplates::new(&e, ORG));
        assert!(!parsed.substituted.contains(&Section::Effect));
        assert_eq!(
            parsed.draft.effect,
            "가족 방문객의 안전과 편의가 크게 증진될 것으로 예상됩니다. \
             쾌적한 휴식 공간이 마련되어 공원 이용률이 높아질 것입니다. \
             공공시설의 품질 향상으로 시민 만족도가 높아집니다."
        );
        assert!(!parsed.draft.effect.contains("직접적 편익"));
    }

    #[test]
    fn long_marked_heading_is_still_a_header() {
        let raw = "## 2. 현황 및 문제점 (장소 특성과 이용객 관점에서 본 상세 분석)\n\
                   태산패밀리파크 놀이터 주변 벤치가 노후화되어 불안정한 상태입니다.\n\
                   ## 3. 개선 방안을 아래와 같이 제안합니다\n\
                   김포도시관리공사에서 노후 벤치를 새 벤치로 교체해 주실 것을 제안합니다.";
        let e = entities();
        let parsed = parse(raw, &DraftTemplates::new(&e, ORG));
        assert_eq!(
            parsed.draft.problem,
            "태산패밀리파크 놀이터 주변 벤치가 노후화되어 불안정한 상태입니다."
        );
        assert!(parsed.draft.solution.starts_with("김포도시관리공사에서 노후 벤치를"));
        assert_eq!(parsed.substituted, vec![Section::Title, Section::Effect]);
    }

    #[test]
    fn long_unmarked_line_with_keyword_stays_content() {
        let raw = "## 2. 현황 및 문제점\n\
                   벤치가 흔들려 어린이가 다칠 수 있고 현황 점검이 시급한 상황이라고 판단됩니다";
        let e = entities();
        let parsed = parse(raw, &DraftTemplates::new(&e, ORG));
        assert!(parsed.draft.problem.starts_with("벤치가 흔들려"));
    }
}
