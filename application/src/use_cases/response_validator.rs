//! Response validator use case.
//!
//! Checks a draft in a fixed order and stops at the first failure:
//!
//! 1. relevance: at least one on-topic term and no off-topic drift term
//! 2. consistency: temperatures and alert wording agree with tool records
//! 3. route: under an active hazard the draft names the safe destination
//! 4. clarity: sentence length and jargon limits

use haven_domain::core::string::{contains_term, sentences, word_count};
use haven_domain::tool::catalog;
use haven_domain::validation::MISSING_ROUTE;
use haven_domain::{AlertLevel, RoutePlan, ToolCallRecord, ValidationVerdict, VerdictKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(-?\d+(?:\.\d+)?)\s*(?:°\s*(?:([FC])\b)?|degrees?\b(?:\s+(fahrenheit|celsius)\b)?)",
    )
    .expect("TEMPERATURE is a compile-time constant")
});

/// Unit assumed when a weather record does not name one (NWS reports °F).
const DEFAULT_UNIT: char = 'F';

/// Tunable validator lexicons and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorPolicy {
    /// Stems; a draft must contain at least one (case-insensitive substring)
    pub on_topic_terms: Vec<String>,
    /// Whole words that mark drift into unrelated subjects
    pub drift_terms: Vec<String>,
    /// Whole words counted against clarity
    pub jargon_terms: Vec<String>,
    /// Phrases that assert an active hazard
    pub hazard_claims: Vec<String>,
    /// Phrases that assert there is no hazard
    pub all_clear_claims: Vec<String>,
    pub max_avg_sentence_words: f64,
    pub max_sentence_words: usize,
    pub max_jargon: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ValidatorPolicy {
    fn default() -> Self {
        Self {
            on_topic_terms: strings(&[
                "weather", "forecast", "temperature", "degree", "°", "storm", "hurricane",
                "tornado", "flood", "fire", "heat", "cold", "snow", "rain", "wind", "alert",
                "warning", "advisory", "hazard", "emergency", "disaster", "evacuat", "shelter",
                "route", "safe", "prepar", "kit", "supplies", "water", "power", "outage",
                "plan", "family", "pets", "medication",
            ]),
            drift_terms: strings(&[
                "joke", "recipe", "poem", "lyrics", "horoscope", "stock market", "stocks",
                "stock price", "bitcoin", "crypto", "celebrity", "movie", "sports", "dating",
            ]),
            jargon_terms: strings(&[
                "isobar", "isobars", "barometric", "mesoscale", "baroclinic", "vorticity",
                "geopotential", "advection", "cape", "qpf", "dewpoint", "millibars",
                "convective", "synoptic",
            ]),
            hazard_claims: strings(&[
                "active hazard",
                "hurricane warning is in effect",
                "tornado warning is in effect",
                "evacuate immediately",
                "evacuation order",
            ]),
            all_clear_claims: strings(&[
                "no active alerts",
                "no alerts",
                "no warnings",
                "all clear",
                "no hazard",
                "nothing to worry about",
            ]),
            max_avg_sentence_words: 28.0,
            max_sentence_words: 50,
            max_jargon: 2,
        }
    }
}

/// What a draft is checked against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub records: &'a [ToolCallRecord],
    /// Alert level of the turn's location snapshot (None when unknown)
    pub alert_level: Option<AlertLevel>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseValidator {
    policy: ValidatorPolicy,
}

impl ResponseValidator {
    pub fn new(policy: ValidatorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidatorPolicy {
        &self.policy
    }

    pub fn validate(&self, draft: &str, ctx: &ValidationContext<'_>) -> ValidationVerdict {
        self.check_relevance(draft)
            .or_else(|| self.check_consistency(draft, ctx))
            .or_else(|| self.check_route(draft, ctx))
            .or_else(|| self.check_clarity(draft))
            .unwrap_or_else(ValidationVerdict::pass)
    }

    fn check_relevance(&self, draft: &str) -> Option<ValidationVerdict> {
        let lower = draft.to_lowercase();
        if let Some(term) = self
            .policy
            .drift_terms
            .iter()
            .find(|t| contains_term(draft, t))
        {
            return Some(ValidationVerdict::fail(
                VerdictKind::FailIrrelevant,
                format!("off-topic content: {}", term),
                draft,
            ));
        }
        let on_topic = self
            .policy
            .on_topic_terms
            .iter()
            .any(|t| lower.contains(&t.to_lowercase()));
        if !on_topic {
            return Some(ValidationVerdict::fail(
                VerdictKind::FailIrrelevant,
                "no preparedness, weather or evacuation content",
                draft,
            ));
        }
        None
    }

    fn check_consistency(&self, draft: &str, ctx: &ValidationContext<'_>) -> Option<ValidationVerdict> {
        let reported: Vec<(f64, char)> = ctx
            .records
            .iter()
            .filter(|r| r.tool_name == catalog::WEATHER_LOOKUP)
            .filter_map(|r| {
                let output = r.output()?;
                let value = output.get("temperature")?.as_f64()?;
                let unit = output
                    .get("temperatureUnit")
                    .and_then(|u| u.as_str())
                    .and_then(unit_letter)
                    .unwrap_or(DEFAULT_UNIT);
                Some((value, unit))
            })
            .collect();

        for capture in TEMPERATURE.captures_iter(draft) {
            let Some(claimed) = capture.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
                continue;
            };
            let unit = capture
                .get(2)
                .or_else(|| capture.get(3))
                .and_then(|m| unit_letter(m.as_str()));
            let matches = reported.iter().any(|&(value, reported_unit)| {
                unit.is_none_or(|u| u == reported_unit) && same_reading(claimed, value)
            });
            if !matches {
                let shown = capture.get(0).map_or("", |m| m.as_str());
                return Some(ValidationVerdict::fail(
                    VerdictKind::FailInconsistentWithTools,
                    format!("temperature {} not reported by weather lookup", shown.trim()),
                    draft,
                ));
            }
        }

        match ctx.alert_level {
            Some(AlertLevel::ActiveHazard) => {
                if let Some(claim) = self
                    .policy
                    .all_clear_claims
                    .iter()
                    .find(|c| contains_term(draft, c))
                {
                    return Some(ValidationVerdict::fail(
                        VerdictKind::FailInconsistentWithTools,
                        format!("claims '{}' during an active hazard", claim),
                        draft,
                    ));
                }
            }
            Some(AlertLevel::None) => {
                if let Some(claim) = self
                    .policy
                    .hazard_claims
                    .iter()
                    .find(|c| contains_term(draft, c))
                {
                    return Some(ValidationVerdict::fail(
                        VerdictKind::FailInconsistentWithTools,
                        format!("claims '{}' but no alert is in effect", claim),
                        draft,
                    ));
                }
            }
            _ => {}
        }
        None
    }

    fn check_route(&self, draft: &str, ctx: &ValidationContext<'_>) -> Option<ValidationVerdict> {
        if !ctx.alert_level.is_some_and(|l| l.requires_route()) {
            return None;
        }
        let destination = safe_destination(ctx.records);
        match destination {
            Some(dest) if draft.to_lowercase().contains(&dest.to_lowercase()) => None,
            _ => Some(ValidationVerdict::fail(
                VerdictKind::FailInconsistentWithTools,
                MISSING_ROUTE,
                draft,
            )),
        }
    }

    fn check_clarity(&self, draft: &str) -> Option<ValidationVerdict> {
        let parts = sentences(draft);
        if parts.is_empty() {
            return Some(ValidationVerdict::fail(VerdictKind::FailUnclear, "empty response", draft));
        }
        let lengths: Vec<usize> = parts.iter().map(|s| word_count(s)).collect();
        let longest = lengths.iter().copied().max().unwrap_or(0);
        let average = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;

        if longest > self.policy.max_sentence_words {
            return Some(ValidationVerdict::fail(
                VerdictKind::FailUnclear,
                format!("sentence of {} words exceeds {}", longest, self.policy.max_sentence_words),
                draft,
            ));
        }
        if average > self.policy.max_avg_sentence_words {
            return Some(ValidationVerdict::fail(
                VerdictKind::FailUnclear,
                format!(
                    "average sentence length {:.1} exceeds {}",
                    average, self.policy.max_avg_sentence_words
                ),
                draft,
            ));
        }

        let jargon = self
            .policy
            .jargon_terms
            .iter()
            .filter(|t| contains_term(draft, t))
            .count();
        if jargon > self.policy.max_jargon {
            return Some(ValidationVerdict::fail(
                VerdictKind::FailUnclear,
                format!("{} jargon terms exceed {}", jargon, self.policy.max_jargon),
                draft,
            ));
        }
        None
    }
}

fn unit_letter(unit: &str) -> Option<char> {
    match unit.trim().chars().next()?.to_ascii_uppercase() {
        c @ ('F' | 'C') => Some(c),
        _ => None,
    }
}

/// A quoted reading matches the reported one exactly, or is the reported
/// value rounded to a whole degree.
fn same_reading(claimed: f64, reported: f64) -> bool {
    claimed == reported || (claimed.fract() == 0.0 && claimed == reported.round())
}

/// Destination named by the latest successful route suggestion.
pub fn safe_destination(records: &[ToolCallRecord]) -> Option<String> {
    records
        .iter()
        .rev()
        .filter(|r| r.tool_name == catalog::ROUTE_SUGGESTION)
        .find_map(|r| RoutePlan::from_value(r.output()?).ok())
        .map(|plan| plan.estimated_safe_destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{weather_call, weather_json};
    use chrono::Utc;
    use haven_domain::ToolCall;
    use serde_json::json;

    fn weather(temp: f64, severity: &str) -> ToolCallRecord {
        ToolCallRecord::success(
            &weather_call("w1", 25.76, -80.19),
            weather_json(temp, "Hurricane Warning", severity),
            10,
            0,
            Utc::now(),
        )
    }

    fn route(dest: &str) -> ToolCallRecord {
        ToolCallRecord::success(
            &ToolCall::new("r1", catalog::ROUTE_SUGGESTION),
            json!({"orderedWaypoints": ["I-95 North"], "estimatedSafeDestination": dest}),
            10,
            0,
            Utc::now(),
        )
    }

    fn check(draft: &str, records: &[ToolCallRecord], level: Option<AlertLevel>) -> ValidationVerdict {
        ResponseValidator::default().validate(
            draft,
            &ValidationContext {
                records,
                alert_level: level,
            },
        )
    }

    #[test]
    fn test_clear_on_topic_draft_passes() {
        let v = check(
            "Pack water, medication and a flashlight. Keep your phone charged.",
            &[],
            None,
        );
        assert!(v.is_pass(), "{:?}", v);
    }

    #[test]
    fn test_drift_is_irrelevant() {
        let v = check("Here is a joke about the weather.", &[], None);
        assert_eq!(v.kind, VerdictKind::FailIrrelevant);
        assert_eq!(v.offending_text.as_deref(), Some("Here is a joke about the weather."));

        let v = check("The capital of France is Paris.", &[], None);
        assert_eq!(v.kind, VerdictKind::FailIrrelevant);
    }

    #[test]
    fn test_temperature_must_match_record() {
        let records = [weather(84.0, "none")];
        assert!(check("It is 84°F in Miami right now.", &records, Some(AlertLevel::None)).is_pass());
        assert!(check("It is 84 degrees in Miami.", &records, Some(AlertLevel::None)).is_pass());

        let v = check("It is 91°F in Miami right now.", &records, Some(AlertLevel::None));
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);
        assert!(v.reason.contains("91"));
    }

    #[test]
    fn test_temperature_must_match_exactly() {
        let records = [weather(84.0, "none")];
        let v = check("It is 84.5°F in Miami right now.", &records, Some(AlertLevel::None));
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);
        assert!(v.reason.contains("84.5"), "{}", v.reason);

        let v = check("It is 83 degrees in Miami.", &records, Some(AlertLevel::None));
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);

        // A fractional reading may be quoted as the nearest whole degree
        let fractional = [weather(84.4, "none")];
        assert!(check("It is 84°F in Miami.", &fractional, Some(AlertLevel::None)).is_pass());
        assert!(check("It is 84.4°F in Miami.", &fractional, Some(AlertLevel::None)).is_pass());
    }

    #[test]
    fn test_temperature_unit_must_match_record() {
        let records = [weather(84.0, "none")];
        let v = check("It is 84°C in Miami right now.", &records, Some(AlertLevel::None));
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);
        let v = check("It is 84 degrees Celsius in Miami.", &records, Some(AlertLevel::None));
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);

        let v = check("It is 84 degrees Fahrenheit in Miami.", &records, Some(AlertLevel::None));
        assert!(v.is_pass(), "{:?}", v);
        assert!(check("It is 84° and cloudy in Miami.", &records, Some(AlertLevel::None)).is_pass());

        let mut output = weather_json(29.0, "Showers", "none");
        output["temperatureUnit"] = json!("C");
        let metric = [ToolCallRecord::success(
            &weather_call("w1", 25.76, -80.19),
            output,
            10,
            0,
            Utc::now(),
        )];
        assert!(check("It is 29°C in Miami.", &metric, Some(AlertLevel::None)).is_pass());
        let v = check("It is 29°F in Miami.", &metric, Some(AlertLevel::None));
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);
    }

    #[test]
    fn test_stock_up_advice_is_relevant() {
        let v = check(
            "Stock up on water, food and medication before the hurricane arrives.",
            &[],
            None,
        );
        assert!(v.is_pass(), "{:?}", v);

        let v = check("The stock market fell during the storm.", &[], None);
        assert_eq!(v.kind, VerdictKind::FailIrrelevant);
    }

    #[test]
    fn test_temperature_without_any_lookup_is_inconsistent() {
        let v = check("Expect about 70 degrees today.", &[], None);
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);
    }

    #[test]
    fn test_alert_wording_must_match_severity() {
        let records = [weather(84.0, "active-hazard"), route("Orlando")];
        let v = check(
            "There are no alerts for Miami. Head to Orlando if you like.",
            &records,
            Some(AlertLevel::ActiveHazard),
        );
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);

        let calm = [weather(75.0, "none")];
        let v = check(
            "An evacuation order is in place for your area.",
            &calm,
            Some(AlertLevel::None),
        );
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);
    }

    #[test]
    fn test_active_hazard_requires_destination() {
        let records = [weather(84.0, "active-hazard"), route("Orlando")];
        let v = check(
            "A hurricane warning is in effect. Stay safe.",
            &records,
            Some(AlertLevel::ActiveHazard),
        );
        assert_eq!(v.kind, VerdictKind::FailInconsistentWithTools);
        assert_eq!(v.reason, MISSING_ROUTE);

        let v = check(
            "A hurricane warning is in effect. Take I-95 North to Orlando now.",
            &records,
            Some(AlertLevel::ActiveHazard),
        );
        assert!(v.is_pass(), "{:?}", v);
    }

    #[test]
    fn test_active_hazard_without_route_record_fails() {
        let records = [weather(84.0, "active-hazard")];
        let v = check(
            "A hurricane warning is in effect. Leave now.",
            &records,
            Some(AlertLevel::ActiveHazard),
        );
        assert_eq!(v.reason, MISSING_ROUTE);
    }

    #[test]
    fn test_long_sentence_is_unclear() {
        let long = format!("Storm prep {}.", "matters a lot ".repeat(20));
        let v = check(&long, &[], None);
        assert_eq!(v.kind, VerdictKind::FailUnclear);
    }

    #[test]
    fn test_jargon_is_unclear() {
        let v = check(
            "Storm update. Barometric readings fall. Vorticity rises. Advection continues.",
            &[],
            None,
        );
        assert_eq!(v.kind, VerdictKind::FailUnclear);
        assert!(v.reason.contains("jargon"));
    }

    #[test]
    fn test_relevance_checked_before_clarity() {
        let v = check("Bitcoin isobar vorticity advection convective.", &[], None);
        assert_eq!(v.kind, VerdictKind::FailIrrelevant);
    }

    #[test]
    fn test_safe_destination_uses_latest_success() {
        let records = [route("Tampa"), route("Orlando")];
        assert_eq!(safe_destination(&records).as_deref(), Some("Orlando"));
        assert_eq!(safe_destination(&[]), None);
    }
}
