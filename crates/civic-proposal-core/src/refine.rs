//! Structured-form refinement: one model call rewrites the citizen's wording into formal prose
//! before drafting. Any failure keeps the original inputs.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::fallback::or_template;
use crate::model_client::TextGenerator;
use crate::prompts::refine_prompt;
use crate::proposal::StructuredRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefinedInput {
    pub location: String,
    pub target: String,
    pub problem_description: String,
    pub solution: String,
}

impl RefinedInput {
    /// The request as typed, with a plain problem sentence.
    pub fn unrefined(req: &StructuredRequest) -> Self {
        let location = req.core_location.trim();
        let target = req.core_target.trim();
        let solution = req.solution_idea.trim();
        Self {
            location: location.to_string(),
            target: target.to_string(),
            problem_description: format!("{location}의 {target}에 대한 문제가 있습니다."),
            solution: if solution.is_empty() {
                "개선이 필요합니다.".to_string()
            } else {
                solution.to_string()
            },
        }
    }
}

#[derive(Deserialize)]
struct RefineReply {
    #[serde(default)]
    refined_location: String,
    #[serde(default)]
    refined_target: String,
    #[serde(default)]
    refined_problem_description: String,
    #[serde(default)]
    refined_solution: String,
}

pub async fn refine(req: &StructuredRequest, generator: Option<&dyn TextGenerator>) -> RefinedInput {
    or_template(
        "refine",
        async {
            let generator = generator.ok_or(ModelError::Unavailable)?;
            let prompt = refine_prompt(
                req.core_location.trim(),
                req.core_target.trim(),
                req.problem_type(),
                req.affected_people(),
                req.solution_idea.trim(),
            );
            let reply = generator.generate(&prompt).await?;
            parse_refine_reply(&reply)
        },
        || RefinedInput::unrefined(req),
    )
    .await
}

/// JSON reply, optionally fenced. Every field must be present and non-blank.
fn parse_refine_reply(text: &str) -> Result<RefinedInput, ModelError> {
    let reply: RefineReply = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ModelError::Decode(format!("refinement JSON: {e}")))?;
    let fields = [
        ("refined_location", reply.refined_location),
        ("refined_target", reply.refined_target),
        ("refined_problem_description", reply.refined_problem_description),
        ("refined_solution", reply.refined_solution),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(ModelError::Decode(format!("refinement field {name} is blank")));
    }
    let [location, target, problem_description, solution] = fields.map(|(_, v)| v.trim().to_string());
    Ok(RefinedInput {
        location,
        target,
        problem_description,
        solution,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(start) = text.find("```") else {
        return text;
    };
    let body = &text[start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn request() -> StructuredRequest {
        StructuredRequest {
            core_location: "태산패밀리파크".into(),
            core_target: "벤치가 낡았어요".into(),
            problem_type: Some("안전".into()),
            affected_people: None,
            solution_idea: "새로 바꿔주세요".into(),
        }
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            Ok(self.0.to_string())
        }
    }

    const GOOD: &str = r#"```json
{
  "refined_location": "태산패밀리파크",
  "refined_target": "노후 벤치",
  "refined_problem_description": "태산패밀리파크의 벤치가 노후화되어 불안정한 상태입니다.",
  "refined_solution": "기존 노후 벤치를 새로운 벤치로 교체해 주실 것을 제안합니다."
}
```"#;

    #[test]
    fn fenced_json_is_accepted() {
        let r = parse_refine_reply(GOOD).unwrap();
        assert_eq!(r.target, "노후 벤치");
        assert!(r.solution.starts_with("기존 노후 벤치"));
    }

    #[test]
    fn blank_field_is_rejected() {
        let raw = r#"{"refined_location":"a","refined_target":" ","refined_problem_description":"b","refined_solution":"c"}"#;
        assert!(matches!(parse_refine_reply(raw), Err(ModelError::Decode(_))));
    }

    #[test]
    fn unrefined_uses_plain_sentence() {
        let r = RefinedInput::unrefined(&request());
        assert_eq!(r.problem_description, "태산패밀리파크의 벤치가 낡았어요에 대한 문제가 있습니다.");
        assert_eq!(r.solution, "새로 바꿔주세요");
    }

    #[tokio::test]
    async fn refine_uses_model_reply() {
        let r = refine(&request(), Some(&Fixed(GOOD))).await;
        assert_eq!(r.target, "노후 벤치");
    }

    #[tokio::test]
    async fn refine_keeps_original_on_bad_reply_or_no_model() {
        let expected = RefinedInput::unrefined(&request());
        assert_eq!(refine(&request(), Some(&Fixed("제안서를 작성했습니다"))).await, expected);
        assert_eq!(refine(&request(), None).await, expected);
    }
}
