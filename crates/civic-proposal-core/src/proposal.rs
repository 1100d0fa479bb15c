//! Request and response shapes shared by the pipeline and the gateway.

use serde::{Deserialize, Serialize};

use crate::error::ProposalError;

/// The four-section proposal. Every value handed to a caller has all four fields non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub title: String,
    pub problem: String,
    pub solution: String,
    pub effect: String,
}

impl ProposalDraft {
    /// True when no section is blank.
    pub fn is_complete(&self) -> bool {
        [&self.title, &self.problem, &self.solution, &self.effect]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}

/// Free-text mode: the citizen describes the problem and the remedy in prose.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FreeTextRequest {
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
}

impl FreeTextRequest {
    pub fn new(problem: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            solution: solution.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ProposalError> {
        require("problem", &self.problem)?;
        require("solution", &self.solution)
    }
}

/// Structured mode: location, target and remedy already separated by the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredRequest {
    #[serde(default)]
    pub core_location: String,
    #[serde(default)]
    pub core_target: String,
    #[serde(default)]
    pub problem_type: Option<String>,
    #[serde(default)]
    pub affected_people: Option<String>,
    #[serde(default)]
    pub solution_idea: String,
}

impl StructuredRequest {
    pub fn validate(&self) -> Result<(), ProposalError> {
        require("core_location", &self.core_location)?;
        require("core_target", &self.core_target)?;
        require("solution_idea", &self.solution_idea)
    }

    pub fn problem_type(&self) -> Option<&str> {
        non_blank(self.problem_type.as_deref())
    }

    pub fn affected_people(&self) -> Option<&str> {
        non_blank(self.affected_people.as_deref())
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ProposalError> {
    if value.trim().is_empty() {
        Err(ProposalError::MissingField { field })
    } else {
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_requires_both_fields() {
        let err = FreeTextRequest::new("  ", "새로 바꿔주세요").validate().unwrap_err();
        assert_eq!(err.field(), "problem");
        let err = FreeTextRequest::new("벤치가 낡았어요", "").validate().unwrap_err();
        assert_eq!(err.field(), "solution");
        assert!(FreeTextRequest::new("벤치가 낡았어요", "교체").validate().is_ok());
    }

    #[test]
    fn structured_reports_first_missing_field() {
        let req = StructuredRequest {
            core_location: "시민회관".into(),
            core_target: String::new(),
            solution_idea: String::new(),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err().field(), "core_target");
    }

    #[test]
    fn blank_optional_metadata_is_none() {
        let req = StructuredRequest {
            problem_type: Some("   ".into()),
            affected_people: Some(" 어르신 ".into()),
            ..Default::default()
        };
        assert_eq!(req.problem_type(), None);
        assert_eq!(req.affected_people(), Some("어르신"));
    }

    #[test]
    fn missing_fields_deserialize_as_blank() {
        let req: FreeTextRequest = serde_json::from_str(r#"{"problem":"어두워요"}"#).unwrap();
        assert_eq!(req.solution, "");
        assert!(req.validate().is_err());
    }
}
