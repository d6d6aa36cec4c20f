//! Tokenization, lemmatization and part-of-speech tagging.
//!
//! The matcher only needs a sequence of tagged tokens, so analysis sits
//! behind the [`Analyzer`] trait. [`RuleAnalyzer`] is a small rule-based
//! implementation that covers the vocabulary the time-request patterns use.

use std::fmt;

use super::Language;

/// Coarse universal part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Noun,
    Verb,
    Aux,
    Pron,
    Det,
    Adj,
    Adv,
    Adp,
    Sconj,
    Punct,
    Num,
    X,
}

impl Pos {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pos::Noun => "NOUN",
            Pos::Verb => "VERB",
            Pos::Aux => "AUX",
            Pos::Pron => "PRON",
            Pos::Det => "DET",
            Pos::Adj => "ADJ",
            Pos::Adv => "ADV",
            Pos::Adp => "ADP",
            Pos::Sconj => "SCONJ",
            Pos::Punct => "PUNCT",
            Pos::Num => "NUM",
            Pos::X => "X",
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analyzed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub lower: String,
    pub lemma: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(surface: &str, lemma: &str, pos: Pos) -> Self {
        Self {
            surface: surface.to_string(),
            lower: surface.to_lowercase(),
            lemma: lemma.to_string(),
            pos,
        }
    }
}

/// Turns text into tagged tokens for a given language.
pub trait Analyzer {
    fn analyze(&self, text: &str, language: Language) -> Vec<Token>;
}

/// Rule-based analyzer backed by a closed lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleAnalyzer;

impl Analyzer for RuleAnalyzer {
    fn analyze(&self, text: &str, language: Language) -> Vec<Token> {
        let mut pieces = Vec::new();
        for chunk in text.split_whitespace() {
            let chunk = chunk.replace(['\u{2019}', '\u{2018}'], "'");
            split_chunk(&chunk, language, &mut pieces);
        }

        pieces
            .into_iter()
            .map(|piece| {
                let lower = piece.to_lowercase();
                let (lemma, pos) = tag(&lower, language);
                Token {
                    surface: piece,
                    lemma: lemma.map_or_else(|| lower.clone(), str::to_string),
                    lower,
                    pos,
                }
            })
            .collect()
    }
}

const ENGLISH_CLITICS: &[&str] = &["n't", "'s", "'re", "'m", "'ll", "'ve", "'d"];

const FRENCH_ELISIONS: &[&str] = &[
    "jusqu'", "lorsqu'", "puisqu'", "qu'", "l'", "d'", "j'", "t'", "m'", "s'", "n'", "c'",
];

/// Pronouns that may follow a verb in hyphenated inversion ("est-il", "dis-moi").
const FRENCH_INVERTED: &[&str] = &[
    "il", "ils", "elle", "elles", "on", "ce", "tu", "je", "vous", "nous", "moi", "toi", "le",
    "la", "les", "lui", "leur", "t",
];

fn is_peeled(c: char) -> bool {
    (c.is_ascii_punctuation() && c != '\'' && c != '-')
        || matches!(c, '«' | '»' | '…' | '¿' | '¡' | '“' | '”')
}

/// Split one whitespace-delimited chunk into word and punctuation pieces.
fn split_chunk(chunk: &str, language: Language, out: &mut Vec<String>) {
    let chars: Vec<char> = chunk.chars().collect();
    let start = chars.iter().position(|c| !is_peeled(*c)).unwrap_or(chars.len());
    let end = chars.iter().rposition(|c| !is_peeled(*c)).map_or(start, |i| i + 1);

    out.extend(chars[..start].iter().map(char::to_string));
    if start < end {
        let word: String = chars[start..end].iter().collect();
        match language {
            Language::English => split_english(&word, out),
            Language::French => split_french(&word, out),
        }
    }
    out.extend(chars[end.max(start)..].iter().map(char::to_string));
}

fn split_english(word: &str, out: &mut Vec<String>) {
    for clitic in ENGLISH_CLITICS {
        if word.len() > clitic.len() && word.ends_with(clitic) {
            out.push(word[..word.len() - clitic.len()].to_string());
            out.push(clitic.to_string());
            return;
        }
    }
    out.push(word.to_string());
}

fn split_french(word: &str, out: &mut Vec<String>) {
    let mut rest = word;
    for prefix in FRENCH_ELISIONS {
        if rest.len() > prefix.len() && rest.starts_with(prefix) {
            out.push(prefix.to_string());
            rest = &rest[prefix.len()..];
            break;
        }
    }

    let mut parts = rest.split('-');
    let head = parts.next().unwrap_or_default();
    let tail: Vec<&str> = parts.collect();
    let is_pronoun = |part: &&str| FRENCH_INVERTED.contains(&part.to_lowercase().as_str());
    let euphonic = |part: &&str| part.eq_ignore_ascii_case("t");
    let inverted = !tail.is_empty()
        && tail.iter().all(is_pronoun)
        && (!head.is_empty() || !tail.iter().all(euphonic));
    if !inverted {
        out.push(rest.to_string());
        return;
    }

    // A detached "-il" has no head.
    if !head.is_empty() {
        out.push(head.to_string());
    }
    for part in tail {
        // Euphonic "t" in "a-t-il" carries no meaning.
        if euphonic(&part) {
            continue;
        }
        out.push("-".to_string());
        out.push(part.to_string());
    }
}

/// Lemma and tag for a lowercase token. `None` lemma means the form is its own lemma.
fn tag(lower: &str, language: Language) -> (Option<&'static str>, Pos) {
    if !lower.is_empty() && lower.chars().all(|c| is_peeled(c) || c == '-' || c == '\'') {
        return (None, Pos::Punct);
    }
    if lower.chars().all(|c| c.is_ascii_digit() || c == ':' || c == 'h') && lower.chars().any(|c| c.is_ascii_digit()) {
        return (None, Pos::Num);
    }
    let entry = match language {
        Language::English => english_lexicon(lower),
        Language::French => french_lexicon(lower),
    };
    match entry {
        Some((lemma, pos)) => (Some(lemma), pos),
        None => (None, Pos::X),
    }
}

fn english_lexicon(lower: &str) -> Option<(&'static str, Pos)> {
    let entry = match lower {
        "is" | "are" | "am" | "was" | "were" | "be" | "been" | "'s" | "'re" | "'m" => ("be", Pos::Aux),
        "do" | "does" | "did" => ("do", Pos::Aux),
        "can" => ("can", Pos::Aux),
        "could" => ("could", Pos::Aux),
        "may" => ("may", Pos::Aux),
        "might" => ("might", Pos::Aux),
        "will" | "'ll" => ("will", Pos::Aux),
        "would" | "'d" => ("would", Pos::Aux),
        "n't" | "not" => ("not", Pos::Adv),
        "have" | "has" | "had" | "'ve" => ("have", Pos::Verb),
        "tell" | "tells" | "told" => ("tell", Pos::Verb),
        "give" | "gives" | "gave" | "given" => ("give", Pos::Verb),
        "get" | "gets" | "got" => ("get", Pos::Verb),
        "what" => ("what", Pos::Pron),
        "it" => ("it", Pos::Pron),
        "you" => ("you", Pos::Pron),
        "i" | "me" => ("i", Pos::Pron),
        "the" => ("the", Pos::Det),
        "a" | "an" => ("a", Pos::Det),
        "time" | "times" => ("time", Pos::Noun),
        "current" => ("current", Pos::Adj),
        "please" => ("please", Pos::Adv),
        _ => return None,
    };
    Some(entry)
}

fn french_lexicon(lower: &str) -> Option<(&'static str, Pos)> {
    let entry = match lower {
        "quel" | "quelle" | "quels" | "quelles" => ("quel", Pos::Det),
        "heure" | "heures" => ("heure", Pos::Noun),
        "le" | "la" | "les" | "l'" => ("le", Pos::Det),
        "il" | "ils" => ("il", Pos::Pron),
        "elle" | "elles" => ("elle", Pos::Pron),
        "ce" | "c'" => ("ce", Pos::Pron),
        "tu" | "t'" => ("tu", Pos::Pron),
        "toi" => ("toi", Pos::Pron),
        "je" | "j'" => ("je", Pos::Pron),
        "moi" => ("moi", Pos::Pron),
        "me" | "m'" => ("me", Pos::Pron),
        "on" => ("on", Pos::Pron),
        "nous" => ("nous", Pos::Pron),
        "vous" => ("vous", Pos::Pron),
        "se" | "s'" => ("se", Pos::Pron),
        "lui" | "leur" => ("lui", Pos::Pron),
        "est" | "es" | "suis" | "sommes" | "êtes" | "sont" | "être" | "été" | "était" => {
            ("être", Pos::Aux)
        }
        "as" | "ai" | "a" | "avons" | "avez" | "ont" | "avoir" | "eu" | "avais" | "aurais" => {
            ("avoir", Pos::Verb)
        }
        "donne" | "donnes" | "donnez" | "donnons" | "donner" | "donné" | "donnerais"
        | "donnerait" | "donneriez" => ("donner", Pos::Verb),
        "dis" | "dit" | "dites" | "disons" | "disent" | "dire" | "dirais" | "dirait"
        | "diriez" => ("dire", Pos::Verb),
        "peux" | "peut" | "pouvez" | "pourrais" | "pourriez" | "pourrait" => ("pouvoir", Pos::Verb),
        "que" | "qu'" => ("que", Pos::Sconj),
        "de" | "d'" => ("de", Pos::Adp),
        "ne" | "n'" => ("ne", Pos::Adv),
        "pas" => ("pas", Pos::Adv),
        "stp" | "svp" => ("stp", Pos::Adv),
        _ => return None,
    };
    Some(entry)
}
