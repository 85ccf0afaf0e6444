//! Prompt and canned-message templates for the assistant turn pipeline

use crate::guard::{GuardKind, GuardVerdict, Topic, reasons};
use crate::tool::entities::ToolSpec;
use crate::validation::{MISSING_ROUTE, ValidationVerdict, VerdictKind};

/// Templates for prompts sent to models and texts shown to users
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the assistant, listing the tools it may request
    pub fn assistant_system(tool_spec: &ToolSpec) -> String {
        let tool_descriptions = tool_spec
            .sorted()
            .into_iter()
            .map(|t| {
                let params = t
                    .parameters
                    .iter()
                    .map(|p| {
                        let required = if p.required { " (required)" } else { "" };
                        format!("    - {}: {}{}", p.name, p.description, required)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("- **{}**: {}\n  Parameters:\n{}", t.name, t.description, params)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are a disaster-preparedness assistant for people in the United States.

You answer questions about emergency preparedness, current weather and hazard
alerts, and evacuation. Use tools for anything that depends on live data:
never guess a temperature, an alert, or a route.

## Available Tools

{tool_descriptions}

## Guidelines

1. Resolve place names with `geocode` before looking up weather.
2. Quote temperatures exactly as `weather_lookup` reports them.
3. If an active hazard is in effect, include the evacuation route and name
   its safe destination.
4. Keep sentences short and plain. Avoid technical jargon.
5. Stay on topic: preparedness, weather, hazards and evacuation only."#
        )
    }

    /// Guidance appended to the conversation after a draft fails validation
    pub fn corrective_guidance(verdict: &ValidationVerdict, safe_destination: Option<&str>) -> String {
        let instruction = match verdict.kind {
            VerdictKind::FailIrrelevant => {
                "Your answer drifted off topic. Answer only the user's preparedness, weather or evacuation question.".to_string()
            }
            VerdictKind::FailUnclear => {
                "Your answer was hard to read. Use short sentences and plain words.".to_string()
            }
            VerdictKind::FailInconsistentWithTools if verdict.reason == MISSING_ROUTE => {
                match safe_destination {
                    Some(dest) => format!(
                        "An active hazard alert is in effect. Include the evacuation route from the route_suggestion result and name the safe destination \"{}\".",
                        dest
                    ),
                    None => "An active hazard alert is in effect. Include the evacuation route from the route_suggestion result.".to_string(),
                }
            }
            VerdictKind::FailInconsistentWithTools => {
                "Your answer contradicts the tool results. Quote the figures and alert levels exactly as the tools reported them.".to_string()
            }
            _ => "Revise your answer.".to_string(),
        };
        format!(
            "Your previous draft was rejected ({}: {}). {}",
            verdict.kind, verdict.reason, instruction
        )
    }

    /// User-facing text for a refused turn
    pub fn refusal(verdict: &GuardVerdict) -> &'static str {
        match (verdict.kind, verdict.topic) {
            (GuardKind::RefusedOutOfScope, Some(Topic::Abusive)) => "Be nice.",
            (GuardKind::RefusedOutOfScope, Some(Topic::OutsideCoverage)) => {
                "Message contains non-US addresses, please only query for US addresses."
            }
            (GuardKind::RefusedOutOfScope, _) => {
                "I can only help with disaster preparedness, weather, hazard alerts and evacuation routes."
            }
            (_, _) if verdict.reason == reasons::INPUT_TOO_LONG => {
                "That message is too long. Please shorten your question."
            }
            (_, _) if verdict.reason == reasons::GUARD_UNAVAILABLE => {
                "I can't process requests right now. Please try again shortly."
            }
            _ => "Please type a question about preparedness, weather or evacuation.",
        }
    }

    /// Safe message released when no validated draft is available
    pub fn fallback(kind: VerdictKind) -> &'static str {
        match kind {
            VerdictKind::ProviderUnavailable => {
                "I can't reach the assistant service right now. If you are in danger, follow local emergency instructions and call 911."
            }
            VerdictKind::Cancelled => "The request was cancelled.",
            _ => {
                "I couldn't put together a reliable answer. Please check weather.gov for current alerts and follow local emergency instructions."
            }
        }
    }

    /// Note appended when some live data could not be retrieved
    pub fn partial_data_note() -> &'static str {
        "Note: some live data was unavailable, so this answer may be incomplete."
    }

    /// Single-label classification prompt for model-backed topic screening
    pub fn topic_classification(user_text: &str) -> String {
        let labels = Topic::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"Classify the user query into exactly one label: {labels}.

- preparedness-question: emergency kits, plans, shelters, safety advice
- weather-query: current weather, forecasts, hazard alerts
- location-query: where a place is, routes, evacuation directions
- abusive: malicious or mean queries
- outside-coverage: any address or place outside the United States
- unrelated: anything else

Answer with only the label. User Query: "{user_text}""#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::catalog;

    #[test]
    fn test_system_prompt_lists_tools() {
        let spec = ToolSpec::new()
            .register(catalog::geocode_definition())
            .register(catalog::weather_lookup_definition());
        let prompt = PromptTemplate::assistant_system(&spec);
        assert!(prompt.contains("**geocode**"));
        assert!(prompt.contains("placeName"));
        assert!(prompt.contains("**weather_lookup**"));
    }

    #[test]
    fn test_corrective_guidance_names_destination() {
        let verdict = ValidationVerdict::fail(
            VerdictKind::FailInconsistentWithTools,
            MISSING_ROUTE,
            "Stay inside.",
        );
        let guidance = PromptTemplate::corrective_guidance(&verdict, Some("Orlando"));
        assert!(guidance.contains("Orlando"));
        assert!(guidance.contains(MISSING_ROUTE));
    }

    #[test]
    fn test_refusal_texts() {
        assert_eq!(
            PromptTemplate::refusal(&GuardVerdict::out_of_scope(Topic::Abusive)),
            "Be nice."
        );
        assert!(
            PromptTemplate::refusal(&GuardVerdict::out_of_scope(Topic::OutsideCoverage))
                .contains("US addresses")
        );
        assert!(
            PromptTemplate::refusal(&GuardVerdict::malformed(reasons::INPUT_TOO_LONG))
                .contains("too long")
        );
    }

    #[test]
    fn test_classification_prompt_lists_labels() {
        let prompt = PromptTemplate::topic_classification("tell me a joke");
        for topic in Topic::ALL {
            assert!(prompt.contains(topic.as_str()));
        }
        assert!(prompt.contains("tell me a joke"));
    }
}
