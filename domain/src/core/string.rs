//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Split prose into sentences on `.`, `!`, `?` and line breaks.
///
/// A period between two digits (`82.5`) does not end a sentence.
pub fn sentences(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        let ends = match ch {
            '!' | '?' | '\n' => true,
            '.' => {
                let prev_digit = i > 0 && bytes[i - 1].is_ascii_digit();
                let next_digit = bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit());
                !(prev_digit && next_digit)
            }
            _ => false,
        };
        if ends {
            let piece = text[start..i].trim();
            if !piece.is_empty() {
                out.push(piece);
            }
            start = i + ch.len_utf8();
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// Count whitespace-separated words that contain at least one alphanumeric.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Case-insensitive whole-word (or whole-phrase) containment.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let term = term.to_lowercase();
    if term.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(&term) {
        let begin = from + pos;
        let end = begin + term.len();
        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        from = begin + term.chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'の' is 3 bytes; target 4 backs up to the boundary at 3
        assert_eq!(truncate("あのねあのね", 7), "あ...");
    }

    #[test]
    fn test_sentences_split() {
        let s = sentences("It is 82.5 degrees. Stay inside! Need a route?\nYes");
        assert_eq!(
            s,
            vec!["It is 82.5 degrees", "Stay inside", "Need a route", "Yes"]
        );
    }

    #[test]
    fn test_sentences_empty() {
        assert!(sentences("   ").is_empty());
        assert!(sentences("...").is_empty());
    }

    #[test]
    fn test_word_count_ignores_punctuation() {
        assert_eq!(word_count("Go north - now ,"), 3);
    }

    #[test]
    fn test_contains_term_word_boundaries() {
        assert!(contains_term("Evacuate to Orlando now", "evacuate"));
        assert!(contains_term("a Hurricane Warning is in effect", "hurricane warning"));
        assert!(!contains_term("stormy", "storm"));
        assert!(!contains_term("anything", ""));
    }
}
