//! Regex rule classifier.
//!
//! Rules are checked in a fixed order and the first match decides:
//!
//! 1. abusive language
//! 2. obviously unrelated requests (built-in and configured patterns)
//! 3. places outside the United States, unless a US state is named too
//! 4. evacuation and directions (`location-query`)
//! 5. preparedness vocabulary (`preparedness-question`)
//! 6. weather vocabulary (`weather-query`)
//!
//! Anything left over is `unrelated`.

use async_trait::async_trait;
use haven_application::{ClassifierError, TopicClassifier};
use haven_domain::Topic;
use regex::Regex;
use std::sync::LazyLock;

fn rule(pattern: &str) -> Regex {
    Regex::new(pattern).expect("classifier rules are compile-time constants")
}

static ABUSIVE: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r"(?i)\b(stupid|idiot\w*|dumb|moron\w*|shut up|useless|loser|hate you|kill (you|yourself)|screw you|f+u+c+k\w*|shit\w*|bitch\w*)\b",
    )
});

static UNRELATED: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r"(?i)\b(jokes?|poems?|songs?|lyrics|recipes?|movies?|netflix|football|basketball|baseball|soccer|homework|essay|stock market|crypto\w*|bitcoin|horoscope|dating|write (me )?(a|some) code|python|javascript)\b",
    )
});

static FOREIGN_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r"(?i)\b(canada|mexico|cuba|bahamas|jamaica|haiti|england|britain|united kingdom|uk|ireland|france|germany|spain|italy|japan|china|india|philippines|australia|brazil|london|paris|berlin|madrid|rome|tokyo|beijing|shanghai|manila|sydney|toronto|vancouver|montreal|cancun|havana|nassau)\b",
    )
});

static US_STATE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r"(?i)\b(alabama|alaska|arizona|arkansas|california|colorado|connecticut|delaware|florida|georgia|hawaii|idaho|illinois|indiana|iowa|kansas|kentucky|louisiana|maine|maryland|massachusetts|michigan|minnesota|mississippi|missouri|montana|nebraska|nevada|new hampshire|new jersey|new mexico|new york|north carolina|north dakota|ohio|oklahoma|oregon|pennsylvania|rhode island|south carolina|south dakota|tennessee|texas|utah|vermont|virginia|washington|west virginia|wisconsin|wyoming|puerto rico)\b",
    )
});

static US_STATE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r",\s*(AL|AK|AZ|AR|CA|CO|CT|DE|FL|GA|HI|ID|IL|IN|IA|KS|KY|LA|ME|MD|MA|MI|MN|MS|MO|MT|NE|NV|NH|NJ|NM|NY|NC|ND|OH|OK|OR|PA|RI|SC|SD|TN|TX|UT|VT|VA|WA|WV|WI|WY|PR|DC)\b",
    )
});

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r"(?i)\b(evacuat\w*|routes?|directions?|where (is|are)|how (do|can|should) (i|we) get|drive to|drive out|get out of|roads?|highways?|closest|nearest)\b",
    )
});

static PREPAREDNESS: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r"(?i)\b(prepar\w*|kits?|emergency|supplies|stock up|shelters?|plan|first aid|generators?|batter(y|ies)|flashlights?|water|canned|medications?|medicine|safe|safety|insurance|sandbags?|board up|power outage|pets?)\b",
    )
});

static WEATHER: LazyLock<Regex> = LazyLock::new(|| {
    rule(
        r"(?i)\b(weather|forecast|temperature|rain\w*|storms?|hurricanes?|tornado(es)?|floods?|flooding|snow\w*|blizzard|winds?|windy|heat ?waves?|alerts?|warnings?|watch(es)?|hot|cold|humid\w*|sunny|cloudy|freez\w*)\b",
    )
});

pub struct KeywordClassifier {
    extra_unrelated: Vec<Regex>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            extra_unrelated: Vec::new(),
        }
    }

    /// Add patterns that mark input as unrelated; matched case-insensitively.
    pub fn with_unrelated_patterns(patterns: &[String]) -> Result<Self, regex::Error> {
        let extra_unrelated = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { extra_unrelated })
    }

    pub fn topic_of(&self, text: &str) -> Topic {
        if ABUSIVE.is_match(text) {
            return Topic::Abusive;
        }
        if UNRELATED.is_match(text) || self.extra_unrelated.iter().any(|r| r.is_match(text)) {
            return Topic::Unrelated;
        }
        if FOREIGN_PLACE.is_match(text)
            && !US_STATE_NAME.is_match(text)
            && !US_STATE_CODE.is_match(text)
        {
            return Topic::OutsideCoverage;
        }
        if LOCATION.is_match(text) {
            Topic::LocationQuery
        } else if PREPAREDNESS.is_match(text) {
            Topic::PreparednessQuestion
        } else if WEATHER.is_match(text) {
            Topic::WeatherQuery
        } else {
            Topic::Unrelated
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Topic, ClassifierError> {
        Ok(self.topic_of(text))
    }
}
