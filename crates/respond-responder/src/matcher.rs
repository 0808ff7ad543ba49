//! Whole-token trigger matching.
//!
//! A trigger matches when it occurs in a message case-insensitively and is
//! delimited on both sides by the start/end of the text or by a character
//! that is neither a unicode letter nor a unicode number.

use regex::{Regex, RegexBuilder};

const BOUNDARY_BEFORE: &str = r"(?:^|[^\p{L}\p{N}])";
const BOUNDARY_AFTER: &str = r"(?:$|[^\p{L}\p{N}])";

/// Compiled matcher over a set of triggers.
#[derive(Debug, Clone, Default)]
pub struct TriggerMatcher {
    /// Triggers in alternation order: longest first.
    triggers: Vec<String>,
    pattern: Option<Regex>,
}

impl TriggerMatcher {
    pub fn new<I, S>(triggers: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut triggers: Vec<String> = triggers
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.is_empty())
            .collect();
        triggers.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        triggers.dedup();

        if triggers.is_empty() {
            return Ok(Self::default());
        }

        // One capture group per trigger, so the matching trigger is the
        // index of the group that participated.
        let alternatives = triggers
            .iter()
            .map(|t| format!("({})", regex::escape(t)))
            .collect::<Vec<_>>()
            .join("|");
        let source = format!("{BOUNDARY_BEFORE}(?:{alternatives}){BOUNDARY_AFTER}");
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .size_limit(64 * (1 << 20))
            .build()?;

        Ok(Self {
            triggers,
            pattern: Some(pattern),
        })
    }

    /// The trigger occurring leftmost in `text`, if any.
    pub fn find(&self, text: &str) -> Option<&str> {
        let caps = self.pattern.as_ref()?.captures(text)?;
        caps.iter()
            .skip(1)
            .position(|group| group.is_some())
            .map(|idx| self.triggers[idx].as_str())
    }
}

/// Pattern matching exactly the texts equal to `trigger` under the same
/// case folding [`TriggerMatcher`] applies.
pub fn equivalent(trigger: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\A(?:{})\z", regex::escape(trigger)))
        .case_insensitive(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(triggers: &[&str]) -> TriggerMatcher {
        TriggerMatcher::new(triggers.iter().copied()).unwrap()
    }

    #[test]
    fn test_empty_never_matches() {
        let m = matcher(&[]);
        assert_eq!(m.find("anything at all"), None);
        assert_eq!(m.find(""), None);
    }

    #[test]
    fn test_exact_message() {
        assert_eq!(matcher(&["foo"]).find("foo"), Some("foo"));
    }

    #[test]
    fn test_embedded_in_longer_message() {
        let m = matcher(&["foo"]);
        assert_eq!(
            m.find("This is a message, where the foo text is embedded somewhere"),
            Some("foo")
        );
        assert_eq!(m.find("foo."), Some("foo"));
        assert_eq!(m.find("(foo)"), Some("foo"));
    }

    #[test]
    fn test_requires_whole_token() {
        let m = matcher(&["foo"]);
        assert_eq!(
            m.find("This is a message, where the fooish text is embedded somewhere"),
            None
        );
        assert_eq!(m.find("barfoo"), None);
        assert_eq!(m.find("foo2"), None);
        assert_eq!(m.find("éfoo"), None);
    }

    #[test]
    fn test_case_insensitive() {
        let m = matcher(&["lorem"]);
        assert_eq!(m.find("LoReM"), Some("lorem"));
        assert_eq!(m.find("say LOREM now"), Some("lorem"));
    }

    #[test]
    fn test_unicode_symbols() {
        let m = matcher(&["❇"]);
        assert_eq!(m.find("❇"), Some("❇"));
        assert_eq!(m.find("-❇\""), Some("❇"));
    }

    #[test]
    fn test_unicode_letters_are_token_characters() {
        let m = matcher(&["café"]);
        assert_eq!(m.find("un café noir"), Some("café"));
        assert_eq!(m.find("CAFÉ"), Some("café"));
        assert_eq!(m.find("cafés"), None);
    }

    #[test]
    fn test_trigger_text_is_kept_as_given() {
        let m = matcher(&["İstanbul", "lOrEm"]);
        assert_eq!(m.find("İstanbul"), Some("İstanbul"));
        assert_eq!(m.find("to İstanbul!"), Some("İstanbul"));
        assert_eq!(m.find("LoReM"), Some("lOrEm"));
    }

    #[test]
    fn test_equivalent_follows_matcher_folding() {
        let same = equivalent("lOrEm").unwrap();
        assert!(same.is_match("lorem"));
        assert!(same.is_match("LOREM"));
        assert!(!same.is_match("lorem ipsum"));
        assert!(!same.is_match("xlorem"));

        assert!(equivalent("İstanbul").unwrap().is_match("İstanbul"));
        assert!(equivalent("c++").unwrap().is_match("C++"));
        assert!(!equivalent("a.b").unwrap().is_match("axb"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let m = matcher(&["c++", "a.b"]);
        assert_eq!(m.find("I write c++ daily"), Some("c++"));
        assert_eq!(m.find("axb"), None);
        assert_eq!(m.find("a.b"), Some("a.b"));
    }

    #[test]
    fn test_leftmost_trigger_wins() {
        let m = matcher(&["foo", "lorem"]);
        assert_eq!(m.find("lorem then foo"), Some("lorem"));
        assert_eq!(m.find("foo then lorem"), Some("foo"));
    }

    #[test]
    fn test_longer_trigger_wins_at_same_position() {
        let m = matcher(&["good", "good morning"]);
        assert_eq!(m.find("good morning all"), Some("good morning"));
        assert_eq!(m.find("good evening"), Some("good"));
    }
}
