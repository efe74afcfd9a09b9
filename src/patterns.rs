//! Ordered bank of structured naming grammars.
//!
//! Names are matched lower-cased against each grammar in priority order and
//! the first match wins. Later grammars are never tried once one matches.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocab::{Vocabulary, CAMBRIDGE, EDEXCEL};

/// Session letters accepted directly before a two-digit year
const SESSION_LETTERS: &[&str] = &["j", "m", "s", "w", "y"];

/// Type tokens for the generic grammar
const GENERIC_TYPES: &[&str] = &[
    "qp", "sp", "ms", "sm", "in", "pm", "gt", "er", "ab", "ci", "sc", "ir", "ss", "sf", "sy", "su",
    "gd", "fq",
];

/// Type tokens for the Edexcel short form
const EDEXCEL_TYPES: &[&str] = &["que", "msc", "mcs", "rms", "pef"];

/// Which rule produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternId {
    /// `[board_]code_{session}{yy}_type[_paper]`
    Generic,
    /// `code_paper_type_yyyymmdd`
    EdexcelShort,
    /// `mark-scheme-unit1-(6663)-june2014`
    EdexcelLong,
    /// Keyword scan used when no grammar matched
    Heuristic,
}

impl PatternId {
    pub fn number(&self) -> u8 {
        match self {
            Self::Generic => 1,
            Self::EdexcelShort => 2,
            Self::EdexcelLong => 3,
            Self::Heuristic => 0,
        }
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heuristic => f.write_str("heuristic"),
            _ => write!(f, "pattern {}", self.number()),
        }
    }
}

/// Semantic meaning of a capture group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Board,
    Code,
    Month,
    Year,
    Type,
    Paper,
    Date,
}

/// Raw strings captured for one name. Absent groups stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub board: Option<String>,
    pub code: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub type_str: Option<String>,
    pub paper: Option<String>,
    pub date: Option<String>,
}

impl ExtractedFields {
    fn set(&mut self, slot: Slot, value: &str) {
        let value = value.to_string();
        match slot {
            Slot::Board => self.board = Some(value),
            // Codes and papers are compared upper-case everywhere downstream
            Slot::Code => self.code = Some(value.to_uppercase()),
            Slot::Paper => self.paper = Some(value.to_uppercase()),
            Slot::Month => self.month = Some(value),
            Slot::Year => self.year = Some(value),
            Slot::Type => self.type_str = Some(value),
            Slot::Date => self.date = Some(value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub id: PatternId,
    /// Board used when the grammar has no board group or it did not capture
    pub board: &'static str,
    pub regex: Regex,
    pub slots: &'static [Slot],
}

impl PatternRule {
    fn new(id: PatternId, board: &'static str, pattern: &str, slots: &'static [Slot]) -> Self {
        let regex = Regex::new(pattern).expect("Invalid naming grammar");
        Self { id, board, regex, slots }
    }

    /// Capture the rule's fields from an already lower-cased name
    pub fn extract(&self, name: &str) -> Option<ExtractedFields> {
        let captures = self.regex.captures(name)?;
        let mut fields = ExtractedFields::default();

        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(group) = captures.get(index + 1) {
                if !group.as_str().is_empty() {
                    fields.set(*slot, group.as_str());
                }
            }
        }

        Some(fields)
    }
}

/// A successful grammar match
#[derive(Debug, Clone)]
pub struct PatternMatch<'a> {
    pub rule: &'a PatternRule,
    pub fields: ExtractedFields,
}

#[derive(Debug, Clone)]
pub struct PatternBank {
    rules: Vec<PatternRule>,
}

impl PatternBank {
    pub fn new() -> Self {
        let sessions = Vocabulary::alternation(SESSION_LETTERS);
        let generic_types = Vocabulary::alternation(GENERIC_TYPES);
        let edexcel_types = Vocabulary::alternation(EDEXCEL_TYPES);

        let rules = vec![
            PatternRule::new(
                PatternId::Generic,
                CAMBRIDGE,
                &format!(
                    r"^([a-z0-9]+)?(?:[-_]+)?([0-9]{{4}})[-_]+({sessions}|0[1-9]|1[0-2])([0-9]{{2}})[-_]+(?:[0-9]{{2}}[-_]+)?({generic_types})(?:[-_]+)?([0-9]+)?(?:.*)?$"
                ),
                &[Slot::Board, Slot::Code, Slot::Month, Slot::Year, Slot::Type, Slot::Paper],
            ),
            PatternRule::new(
                PatternId::EdexcelShort,
                EDEXCEL,
                &format!(r"^([a-z0-9]+)[-_]+([a-z0-9]+)[-_]+({edexcel_types})[-_]+([0-9]+)(?:.*)?$"),
                &[Slot::Code, Slot::Paper, Slot::Type, Slot::Date],
            ),
            PatternRule::new(
                PatternId::EdexcelLong,
                EDEXCEL,
                r"^(mark.*|question.*|examiner.*)[-_]+(?:paper|unit)([a-z0-9]+)[-_(]+?([a-z0-9]+)[-_)]+?(?:[-_(]+?legacy[-_)]+?|[-_]?paper[a-z0-9]+)?[-_]+([a-z]+)([0-9]{4})(?:.*)?$",
                &[Slot::Type, Slot::Paper, Slot::Code, Slot::Month, Slot::Year],
            ),
        ];

        Self { rules }
    }

    /// First rule matching the name, with its captured fields
    pub fn find(&self, name: &str) -> Option<PatternMatch<'_>> {
        let name = name.to_lowercase();
        self.rules.iter().find_map(|rule| {
            rule.extract(&name).map(|fields| PatternMatch { rule, fields })
        })
    }

    pub fn rule(&self, id: PatternId) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }
}

impl Default for PatternBank {
    fn default() -> Self {
        Self::new()
    }
}
