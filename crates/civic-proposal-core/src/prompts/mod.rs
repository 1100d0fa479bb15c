//! Prompt templates for proposal drafting, facility context and structured-input refinement.

pub mod facility;
pub mod proposal;
pub mod refine;

pub use facility::facility_context_prompt;
pub use proposal::{build, PromptMode, StructuredDetails};
pub use refine::refine_prompt;

/// Fill `{key}` placeholders in one pass; values are never re-scanned, unknown braces stay as-is.
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = tail[1..].find('}').and_then(|end| {
            let key = &tail[1..1 + end];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, end + 2))
        });
        match hit {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::render;

    #[test]
    fn render_is_single_pass() {
        let out = render("{a} / {b} / {c}", &[("a", "{b}"), ("b", "2")]);
        assert_eq!(out, "{b} / 2 / {c}");
    }

    #[test]
    fn render_leaves_json_braces() {
        let out = render("{\n  \"k\": \"{v}\"\n}", &[("v", "값")]);
        assert_eq!(out, "{\n  \"k\": \"값\"\n}");
    }
}
