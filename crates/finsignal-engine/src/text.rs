//! Sentence segmentation
//!
//! Splits a block of prose into ordered, 1-indexed sentences. Both pipelines
//! consume the same segmentation, so the boundary rules live here once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// Abbreviations whose trailing period never ends a sentence
const ABBREVIATIONS: &[&str] = &[
    // titles
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "rev", "gen", "sen", "rep",
    // corporate
    "inc", "corp", "co", "ltd", "llc", "plc", "bros", "dept", "assn",
    // latin and editorial
    "vs", "e.g", "i.e", "cf", "al", "approx", "fig", "vol",
    // months
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Dotted initialisms such as `J.P`, `S.E.C` or `U.S` (final period stripped)
static INITIALISM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\p{L}\.)+\p{L}$").expect("initialism pattern"));

/// A terminator followed by a word that starts lowercase but is not plain
/// lowercase (`eBay`, `iPhone`); UAX#29 never breaks before it
static MIXED_CASE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?]["')\]\x{201D}\x{2019}]*(\s+)\p{Ll}+\p{Lu}"#)
        .expect("mixed case start pattern")
});

/// A single sentence of input text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Position in the document, starting at 1
    pub index: usize,
    /// Trimmed sentence text
    pub text: String,
}

/// Sentence boundary detection
///
/// Any implementation must return sentences in document order with indices
/// starting at 1, and an empty vector for blank input.
pub trait Segmenter: Send + Sync {
    /// Split text into sentences
    fn segment(&self, text: &str) -> Vec<Sentence>;
}

/// Segmenter built on Unicode (UAX#29) sentence boundaries
///
/// UAX#29 alone breaks after every `Mr.` or `J.P.` followed by a capital, and
/// after every line break. This segmenter merges those pieces back:
///
/// - a period after a known abbreviation, a single-letter initial or a dotted
///   initialism never ends a sentence;
/// - a line break only ends a sentence after a terminator or on a blank line.
///
/// UAX#29 also never breaks when the next word starts in lowercase
/// (`approx. three`, `5 p.m. today`). The one exception made here is a
/// mixed-case word such as `eBay`, which does start a new sentence.
#[derive(Debug, Clone)]
pub struct PunctuationSegmenter {
    abbreviations: HashSet<String>,
}

impl Default for PunctuationSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl PunctuationSegmenter {
    /// Create a segmenter with the default English abbreviation list
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Add custom abbreviations (case-insensitive, without the final period)
    pub fn with_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        for abbr in abbreviations {
            self.abbreviations
                .insert(abbr.trim_end_matches('.').to_lowercase());
        }
        self
    }

    /// Whether a piece ending here may stand as a sentence on its own
    fn ends_sentence(&self, piece: &str) -> bool {
        let stripped = piece.trim_end().trim_end_matches(is_closer);

        match stripped.chars().next_back() {
            // Whitespace only: the blank line after a paragraph
            None => true,
            Some('!' | '?') => true,
            Some('.') => !self.keeps_period(stripped),
            // Broken at a single line break
            Some(_) => false,
        }
    }

    /// Whether the period closing `text` belongs to an abbreviation
    fn keeps_period(&self, text: &str) -> bool {
        let word = text
            .trim_end_matches('.')
            .split_whitespace()
            .next_back()
            .unwrap_or("")
            .trim_start_matches(|c: char| !c.is_alphanumeric());

        if word.chars().count() == 1 && word.chars().all(char::is_alphabetic) {
            return true;
        }
        INITIALISM.is_match(word) || self.abbreviations.contains(&word.to_lowercase())
    }

    /// Split a merged piece before mixed-case sentence starts
    fn split_mixed_case<'a>(&self, piece: &'a str) -> Vec<&'a str> {
        let mut parts = Vec::new();
        let mut start = 0;

        for caps in MIXED_CASE_START.captures_iter(piece) {
            let Some(gap) = caps.get(1) else { continue };
            let head = &piece[start..gap.start()];
            let closed = head.trim_end_matches(is_closer);
            if closed.ends_with('.') && self.keeps_period(closed) {
                continue;
            }
            parts.push(head);
            start = gap.end();
        }

        parts.push(&piece[start..]);
        parts
    }
}

impl Segmenter for PunctuationSegmenter {
    fn segment(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for (offset, piece) in text.split_sentence_bound_indices() {
            let end = offset + piece.len();
            if end < text.len() && !self.ends_sentence(piece) {
                continue;
            }
            for part in self.split_mixed_case(&text[start..end]) {
                push_sentence(&mut sentences, part);
            }
            start = end;
        }

        sentences
    }
}

/// Segment text with the default segmenter
pub fn segment(text: &str) -> Vec<Sentence> {
    PunctuationSegmenter::new().segment(text)
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
}

fn push_sentence(sentences: &mut Vec<Sentence>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    sentences.push(Sentence {
        index: sentences.len() + 1,
        text: trimmed.to_string(),
    });
}
