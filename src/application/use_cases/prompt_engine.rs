use crate::domain::substitution::SubstitutionSet;

pub struct PromptEngine;

impl PromptEngine {
    /// Replaces every literal occurrence of each placeholder with its value,
    /// one pass per placeholder in the set's order. Unknown placeholders are
    /// left as they are and nothing is escaped.
    pub fn render(template: &str, substitutions: &SubstitutionSet) -> String {
        substitutions
            .entries()
            .into_iter()
            .fold(template.to_string(), |rendered, (token, value)| {
                rendered.replace(token, value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_all_occurrences() {
        let subs = SubstitutionSet::new("tracing rocks", "What is tracing?");
        let rendered = PromptEngine::render(
            "Q: QUESTION\nA: THEIR_ANSWER\nAgain: THEIR_ANSWER",
            &subs,
        );
        assert_eq!(
            rendered,
            "Q: What is tracing?\nA: tracing rocks\nAgain: tracing rocks"
        );
    }

    #[test]
    fn test_category_left_verbatim_until_known() {
        let subs = SubstitutionSet::new("a", "q");
        assert_eq!(
            PromptEngine::render("Respond as CATEGORY to THEIR_ANSWER", &subs),
            "Respond as CATEGORY to a"
        );

        let subs = subs.with_category("sarcastic");
        assert_eq!(
            PromptEngine::render("Respond as CATEGORY to THEIR_ANSWER", &subs),
            "Respond as sarcastic to a"
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let subs = SubstitutionSet::new("a", "q");
        assert_eq!(
            PromptEngine::render("question Question QUESTION", &subs),
            "question Question q"
        );
    }

    #[test]
    fn test_template_without_placeholders_is_unchanged() {
        let subs = SubstitutionSet::new("a", "q").with_category("c");
        assert_eq!(PromptEngine::render("plain text", &subs), "plain text");
        assert_eq!(PromptEngine::render("", &subs), "");
    }

    #[test]
    fn test_rendering_again_with_inert_values_changes_nothing() {
        let subs = SubstitutionSet::new("observability helps", "Why observe?")
            .with_category("thoughtful");
        let template = "QUESTION / THEIR_ANSWER / CATEGORY / UNKNOWN_TOKEN";
        let once = PromptEngine::render(template, &subs);

        let inert = SubstitutionSet::new("", "");
        assert_eq!(PromptEngine::render(&once, &inert), once);
        assert!(once.contains("UNKNOWN_TOKEN"));
    }

    #[test]
    fn test_values_are_inserted_raw() {
        let subs = SubstitutionSet::new("\"quoted\" {json} \\n", "q");
        assert_eq!(
            PromptEngine::render("<THEIR_ANSWER>", &subs),
            "<\"quoted\" {json} \\n>"
        );
    }
}
