//! Time-request detection for English and French chat messages.
//!
//! Text is normalized, routed to a language by a keyword heuristic, analyzed
//! into tokens (surface, lemma, part of speech) and then checked against a
//! fixed table of token-sequence patterns. First match wins.

pub mod analyzer;
pub mod patterns;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

pub use analyzer::{Analyzer, Pos, RuleAnalyzer, Token};
pub use patterns::Pattern;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// French word that routes a message to the French pattern set.
const FRENCH_MARKER: &str = "heure";

/// Phrase that silences the relay when the bot is mentioned.
const SHUTDOWN_PHRASE: &str = "ta gueule";

/// Lower-case the text and collapse every run of whitespace into one space.
///
/// Leading and trailing runs are collapsed too, not trimmed. Characters with no
/// lowercase mapping (mathematical capitals like `\u{1D400}`) are kept as is.
pub fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(&text.to_lowercase(), " ").into_owned()
}

/// Language whose analysis and pattern set are used for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    French,
}

impl Language {
    /// Pick the language for already-normalized text.
    ///
    /// This is a substring test, not language identification: "heure" inside
    /// any word ("heureux") routes the whole message to French.
    pub fn route(normalized: &str) -> Self {
        if normalized.contains(FRENCH_MARKER) {
            Language::French
        } else {
            Language::English
        }
    }
}

/// True if the normalized text contains the shutdown phrase.
pub fn contains_shutdown_phrase(text: &str) -> bool {
    normalize(text).contains(SHUTDOWN_PHRASE)
}

/// Decides whether a message asks for the current time.
pub struct TimeRequestMatcher<A = RuleAnalyzer> {
    analyzer: A,
}

impl TimeRequestMatcher<RuleAnalyzer> {
    pub fn new() -> Self {
        Self { analyzer: RuleAnalyzer }
    }
}

impl Default for TimeRequestMatcher<RuleAnalyzer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Analyzer> TimeRequestMatcher<A> {
    pub fn with_analyzer(analyzer: A) -> Self {
        Self { analyzer }
    }

    pub fn is_time_request(&self, text: &str) -> bool {
        self.matching_pattern(text).is_some()
    }

    /// Name of the first pattern matching the text, if any.
    pub fn matching_pattern(&self, text: &str) -> Option<&'static str> {
        let text = normalize(text);
        let language = Language::route(&text);
        let tokens = self.analyzer.analyze(&text, language);

        for token in &tokens {
            debug!("{:?} token: {:12} | lemma: {:12} | pos: {}", language, token.surface, token.lemma, token.pos);
        }

        patterns::for_language(language)
            .iter()
            .find(|pattern| pattern.matches(&tokens))
            .map(|pattern| pattern.name)
    }
}

/// Check a message with the built-in analyzer.
pub fn is_time_request(text: &str) -> bool {
    TimeRequestMatcher::new().is_time_request(text)
}
