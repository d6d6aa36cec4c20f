//! Declarative token-sequence patterns and the scanner that applies them.

use std::sync::LazyLock;

use regex::Regex;

use super::{Language, Token};

/// Which token field a regex constraint is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Text,
    Lower,
}

#[derive(Debug)]
pub enum Constraint {
    /// Lowercase form is one of the listed forms.
    Lower(&'static [&'static str]),
    /// Lemma is one of the listed lemmas.
    Lemma(&'static [&'static str]),
    /// Regex found anywhere in the chosen field (unanchored search).
    Regex(Field, Regex),
}

impl Constraint {
    fn accepts(&self, token: &Token) -> bool {
        match self {
            Constraint::Lower(forms) => forms.contains(&token.lower.as_str()),
            Constraint::Lemma(lemmas) => lemmas.contains(&token.lemma.as_str()),
            Constraint::Regex(Field::Text, regex) => regex.is_match(&token.surface),
            Constraint::Regex(Field::Lower, regex) => regex.is_match(&token.lower),
        }
    }
}

/// One position of a pattern. Optional elements match zero or one token.
#[derive(Debug)]
pub struct Element {
    constraint: Constraint,
    optional: bool,
}

impl Element {
    fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

fn lower(forms: &'static [&'static str]) -> Element {
    Element { constraint: Constraint::Lower(forms), optional: false }
}

fn lemma(lemmas: &'static [&'static str]) -> Element {
    Element { constraint: Constraint::Lemma(lemmas), optional: false }
}

fn search(field: Field, pattern: &str) -> Element {
    let regex = Regex::new(pattern).unwrap();
    Element { constraint: Constraint::Regex(field, regex), optional: false }
}

#[derive(Debug)]
pub struct Pattern {
    pub name: &'static str,
    elements: Vec<Element>,
}

impl Pattern {
    fn new(name: &'static str, elements: Vec<Element>) -> Self {
        Self { name, elements }
    }

    /// True if the pattern matches a contiguous run starting at any token.
    pub fn matches(&self, tokens: &[Token]) -> bool {
        (0..tokens.len()).any(|start| match_from(&self.elements, &tokens[start..]))
    }
}

fn match_from(elements: &[Element], tokens: &[Token]) -> bool {
    let Some((first, rest)) = elements.split_first() else {
        return true;
    };
    let consumed = tokens
        .first()
        .is_some_and(|token| first.constraint.accepts(token))
        && match_from(rest, &tokens[1..]);
    consumed || (first.optional && match_from(rest, tokens))
}

const MODALS: &[&str] = &["can", "could", "may", "might"];
const QUEL: &[&str] = &["quel", "quell"];
const HEURE: &[&str] = &["heure"];
const HYPHEN: &[&str] = &["-"];

static ENGLISH: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![
        Pattern::new("what_time_is_it", vec![
            lower(&["what"]), lower(&["time"]), lower(&["is"]), lower(&["it"]),
        ]),
        Pattern::new("what_is_the_time", vec![
            lower(&["what"]), lower(&["is", "'s"]), lower(&["the"]), lower(&["time"]),
        ]),
        Pattern::new("do_you_have_the_time", vec![
            lower(&["do"]), lower(&["you"]), lower(&["have"]), lower(&["the"]), lower(&["time"]),
        ]),
        Pattern::new("tell_me_the_time", vec![
            lower(&["tell", "give"]), lower(&["me"]), lower(&["the"]), lower(&["time"]),
        ]),
        Pattern::new("can_you_tell_me_the_time", vec![
            lower(MODALS), lower(&["you"]), lower(&["tell"]), lower(&["me"]), lower(&["the"]), lower(&["time"]),
        ]),
        Pattern::new("whats_time", vec![
            search(Field::Lower, r"what('?s)?"), lower(&["'s", "s"]).optional(), lower(&["time"]),
        ]),
        Pattern::new("whats_current_time", vec![
            search(Field::Lower, r"what('?s)?"),
            lower(&["'s", "s"]).optional(),
            lower(&["current"]).optional(),
            lower(&["time"]),
        ]),
        Pattern::new("can_i_get_the_time", vec![
            lower(MODALS), lower(&["i"]), lower(&["get"]), lower(&["the"]), lower(&["time"]),
        ]),
    ]
});

static FRENCH: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![
        Pattern::new("quel_heure_est_il", vec![
            lemma(QUEL), lemma(HEURE), lower(&["est"]), lower(HYPHEN).optional(), lemma(&["il", "ce", "-ce"]),
        ]),
        Pattern::new("quel_heure_il_est", vec![
            lemma(QUEL), lemma(HEURE), lemma(&["il"]), lower(&["est"]),
        ]),
        Pattern::new("il_est_quel_heure", vec![
            lemma(&["il"]), lower(&["est"]), lemma(QUEL), lemma(HEURE),
        ]),
        Pattern::new("donne_moi_l_heure", vec![
            lemma(&["donner", "dire"]),
            lower(HYPHEN).optional(),
            lemma(&["moi"]).optional(),
            lemma(&["le"]),
            lemma(HEURE),
        ]),
        Pattern::new("est_ce_que_tu_as_l_heure", vec![
            lower(&["est"]),
            lower(HYPHEN).optional(),
            lower(&["ce"]),
            lower(&["que"]),
            lower(&["tu"]),
            lower(&["as"]),
            lemma(&["le"]),
            lemma(HEURE),
        ]),
        Pattern::new("tu_as_l_heure", vec![
            lower(&["tu", "t'"]), lower(HYPHEN).optional(), lower(&["as"]), lemma(&["le"]).optional(), lemma(HEURE),
        ]),
        Pattern::new("as_tu_l_heure", vec![
            lower(&["as"]), lower(HYPHEN).optional(), lower(&["tu"]), lemma(&["le"]).optional(), lemma(HEURE),
        ]),
    ]
});

/// Pattern set evaluated for a language.
pub fn for_language(language: Language) -> &'static [Pattern] {
    match language {
        Language::English => &ENGLISH,
        Language::French => &FRENCH,
    }
}
