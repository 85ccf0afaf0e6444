//! Input guard domain: topics and the verdict attached to every turn.
//!
//! Every turn carries exactly one [`GuardVerdict`]. Only preparedness,
//! weather and location topics are accepted; everything else is refused
//! before any model or tool work happens.

use serde::{Deserialize, Serialize};

/// Refusal reasons that are not topic categories.
pub mod reasons {
    pub const EMPTY_INPUT: &str = "empty-input";
    pub const INPUT_TOO_LONG: &str = "input-too-long";
    pub const GUARD_UNAVAILABLE: &str = "guard-unavailable";
    /// The turn was cancelled while the input was being classified
    pub const CANCELLED: &str = "cancelled";
}

/// Topical category of a user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    PreparednessQuestion,
    WeatherQuery,
    LocationQuery,
    Unrelated,
    /// Malicious or mean queries
    Abusive,
    /// Locations the weather service does not cover (outside the US)
    OutsideCoverage,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::PreparednessQuestion,
        Topic::WeatherQuery,
        Topic::LocationQuery,
        Topic::Unrelated,
        Topic::Abusive,
        Topic::OutsideCoverage,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Topic::PreparednessQuestion => "preparedness-question",
            Topic::WeatherQuery => "weather-query",
            Topic::LocationQuery => "location-query",
            Topic::Unrelated => "unrelated",
            Topic::Abusive => "abusive",
            Topic::OutsideCoverage => "outside-coverage",
        }
    }

    pub fn is_in_scope(&self) -> bool {
        matches!(
            self,
            Topic::PreparednessQuestion | Topic::WeatherQuery | Topic::LocationQuery
        )
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Topic {
    type Err = String;

    /// Lenient parse: accepts `-`, `_` or space separators and any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown topic: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardKind {
    Accepted,
    RefusedOutOfScope,
    RefusedMalformed,
}

impl GuardKind {
    pub fn as_str(&self) -> &str {
        match self {
            GuardKind::Accepted => "accepted",
            GuardKind::RefusedOutOfScope => "refused-out-of-scope",
            GuardKind::RefusedMalformed => "refused-malformed",
        }
    }
}

/// Outcome of screening one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardVerdict {
    pub kind: GuardKind,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
}

impl GuardVerdict {
    pub fn accepted(topic: Topic) -> Self {
        Self {
            kind: GuardKind::Accepted,
            reason: topic.as_str().to_string(),
            topic: Some(topic),
        }
    }

    /// Refusal for a classified topic; the reason is the topic category.
    pub fn out_of_scope(topic: Topic) -> Self {
        Self {
            kind: GuardKind::RefusedOutOfScope,
            reason: topic.as_str().to_string(),
            topic: Some(topic),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            kind: GuardKind::RefusedMalformed,
            reason: reason.into(),
            topic: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.kind == GuardKind::Accepted
    }
}
