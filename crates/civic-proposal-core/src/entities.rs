//! Entity extraction: pulls the location, the problem target and the discomfort keyword out of
//! a citizen's free text with ordered pattern rules.
//!
//! Rule order is part of the contract. The first location rule that matches anywhere wins and
//! its leftmost match is captured; keyword lists are scanned front to back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Location used when no pattern matches.
pub const DEFAULT_LOCATION: &str = "김포시 시설";
/// Problem target used when no candidate noun is found.
pub const DEFAULT_TARGET: &str = "시설";
/// Core problem used when no discomfort keyword is found.
pub const DEFAULT_CORE_PROBLEM: &str = "불편";

/// Facility suffixes, then basement/floor suffixes, then neighbourhood suffixes.
const LOCATION_PATTERNS: &[&str] = &[
    r"([가-힣]+(?:파크|공원|회관|관|센터|센타|광장|언덕|봉안당|도서관|체육관))",
    r"([가-힣]+(?:지하|층))",
    r"([가-힣]+(?:동|리|마을))",
];

const PROBLEM_TARGETS: &[&str] = &[
    "벤치", "의자", "주차장", "조명", "공간", "시설", "공원", "길", "도로",
];

const DISCOMFORT_KEYWORDS: &[&str] = &[
    "부족", "낡았", "어두워", "불편", "위험", "어려워", "좁아", "더러워",
];

static LOCATION_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    LOCATION_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Salient facts of one request. Built once, read by the prompt builder and the templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedEntities {
    pub location: String,
    pub problem_target: String,
    pub core_problem: String,
    pub requested_solution: String,
}

impl ExtractedEntities {
    /// Entities for structured mode, where the form already separated the facts.
    pub fn from_structured(
        location: &str,
        target: &str,
        problem_type: Option<&str>,
        solution: &str,
    ) -> Self {
        Self {
            location: or_default(location, DEFAULT_LOCATION),
            problem_target: or_default(target, DEFAULT_TARGET),
            core_problem: or_default(problem_type.unwrap_or(target), DEFAULT_CORE_PROBLEM),
            requested_solution: solution.trim().to_string(),
        }
    }
}

/// Extract entities from free-text problem and solution. Never fails; defaults fill the gaps.
pub fn extract(problem: &str, solution: &str) -> ExtractedEntities {
    let combined = format!("{} {}", problem, solution);

    let location = LOCATION_RULES
        .iter()
        .find_map(|rule| rule.captures(&combined))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    let problem_target = PROBLEM_TARGETS
        .iter()
        .find(|t| problem.contains(**t) || solution.contains(**t))
        .copied()
        .unwrap_or(DEFAULT_TARGET)
        .to_string();

    let core_problem = DISCOMFORT_KEYWORDS
        .iter()
        .find(|k| problem.contains(**k))
        .copied()
        .unwrap_or(DEFAULT_CORE_PROBLEM)
        .to_string();

    let requested_solution = solution.trim().to_string();

    ExtractedEntities {
        location,
        problem_target,
        core_problem,
        requested_solution,
    }
}

fn or_default(value: &str, default: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        default.to_string()
    } else {
        v.to_string()
    }
}
