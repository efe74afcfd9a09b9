//! Keyword scan for names that match no grammar.

use regex::Regex;

use crate::patterns::ExtractedFields;
use crate::registry::CodeRegistry;
use crate::vocab::{Vocabularies, FEB_MARCH, JANUARY, MAY_JUNE, OCT_NOV};

/// Session keywords, checked in this order
const SESSION_KEYWORDS: &[(&[&str], &str)] = &[
    (&["jan"], JANUARY),
    (&["feb", "mar"], FEB_MARCH),
    (&["may", "jun"], MAY_JUNE),
    (&["oct", "nov"], OCT_NOV),
];

/// Edexcel modular unit codes, longest first so `c12` is not read as `c1`
const UNIT_CODES: &[&str] = &[
    "c12", "c34", "fp1", "fp2", "fp3", "c1", "c2", "c3", "c4", "m1", "m2", "m3", "m4", "m5", "s1",
    "s2", "s3", "s4", "s5", "p1", "p2", "p3", "p4",
];

const EARLIEST_YEAR: i32 = 2000;

#[derive(Debug, Clone)]
pub struct FallbackExtractor {
    unit_regex: Regex,
    trailing_unit_regex: Regex,
    type_keywords: Vec<(&'static str, &'static str)>,
    current_year: i32,
}

impl FallbackExtractor {
    pub fn new(vocab: &Vocabularies, current_year: i32) -> Self {
        let units = UNIT_CODES.join("|");
        let unit_regex = Regex::new(&format!(r"(?:^|[^a-z0-9])({})(?:[^0-9]|$)", units))
            .expect("Invalid unit code regex");
        let trailing_unit_regex = Regex::new(&format!(r"^({})(0|r)?$", units))
            .expect("Invalid trailing unit regex");

        // Longer keywords first; the sort is stable so ties keep table order
        let mut type_keywords: Vec<_> = vocab.types.abbreviations().collect();
        type_keywords.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            unit_regex,
            trailing_unit_regex,
            type_keywords,
            current_year,
        }
    }

    /// Fill whatever fields the name gives up. The caller decides what is
    /// still missing afterwards.
    pub fn extract(&self, name: &str, vocab: &Vocabularies, registry: &CodeRegistry) -> ExtractedFields {
        let name = name.to_lowercase();
        let mut fields = ExtractedFields::default();

        fields.month = self.session(&name).map(str::to_string);
        fields.year = self.year(&name).map(|y| y.to_string());
        fields.paper = self.paper(&name);
        fields.type_str = self.document_type(&name).map(str::to_string);

        let tokens: Vec<&str> = name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let board = tokens.iter().find_map(|t| vocab.boards.to_canonical(t));
        match self.code(&tokens, board, vocab, registry) {
            Some((board, code)) => {
                fields.board = Some(board.to_string());
                fields.code = Some(code);
            }
            None => fields.board = board.map(str::to_string),
        }

        fields
    }

    pub fn session(&self, name: &str) -> Option<&'static str> {
        SESSION_KEYWORDS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
            .map(|(_, session)| *session)
    }

    /// First four-digit run inside `[2000, current year]`
    pub fn year(&self, name: &str) -> Option<i32> {
        name.as_bytes()
            .windows(4)
            .filter(|w| w.iter().all(u8::is_ascii_digit))
            .filter_map(|w| std::str::from_utf8(w).ok()?.parse::<i32>().ok())
            .find(|y| (EARLIEST_YEAR..=self.current_year).contains(y))
    }

    pub fn paper(&self, name: &str) -> Option<String> {
        let captures = self.unit_regex.captures(name)?;
        let mut paper = captures.get(1)?.as_str().to_uppercase();
        if name.contains("(r)") {
            paper.push('R');
        }
        Some(paper)
    }

    /// Unit code written as the last token of a normalized name, such as
    /// `c10` or `fp1r`. A `0` variant is implied by the unit alone.
    pub fn trailing_unit(&self, name: &str) -> Option<String> {
        let name = name.to_lowercase();
        let stem = name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem);
        let token = stem.rsplit(|c: char| matches!(c, '_' | '-' | ' ')).next()?;

        let captures = self.trailing_unit_regex.captures(token)?;
        let mut paper = captures.get(1)?.as_str().to_uppercase();
        if captures.get(2).map(|v| v.as_str()) == Some("r") {
            paper.push('R');
        }
        Some(paper)
    }

    pub fn document_type(&self, name: &str) -> Option<&'static str> {
        self.type_keywords
            .iter()
            .find(|(keyword, _)| name.contains(keyword))
            .map(|(keyword, _)| *keyword)
    }

    /// First token registered under the known board, or under any board
    /// when the board is unknown
    fn code(
        &self,
        tokens: &[&str],
        board: Option<&'static str>,
        vocab: &Vocabularies,
        registry: &CodeRegistry,
    ) -> Option<(&'static str, String)> {
        let boards: Vec<&'static str> = match board {
            Some(board) => vec![board],
            None => vocab.boards.canonical_names().collect(),
        };

        tokens.iter().find_map(|token| {
            boards
                .iter()
                .find(|board| registry.contains(board, token))
                .map(|board| (*board, token.to_uppercase()))
        })
    }
}
