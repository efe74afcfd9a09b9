//! Board, document-type and session vocabularies.
//!
//! Each table maps a canonical name to its accepted abbreviations. The first
//! abbreviation listed is the preferred short form written into output
//! filenames, so the order inside each list matters.

use std::collections::HashMap;

pub const CAMBRIDGE: &str = "Cambridge";
pub const EDEXCEL: &str = "Edexcel";

pub const JANUARY: &str = "January";
pub const FEB_MARCH: &str = "Feb-March";
pub const MAY_JUNE: &str = "May-June";
pub const OCT_NOV: &str = "Oct-Nov";
pub const SPECIMEN: &str = "Specimen";

pub const QUESTION_PAPER: &str = "Question Paper";
pub const MARK_SCHEME: &str = "Mark Scheme";
pub const EXAMINER_REPORT: &str = "Examiner Report";
pub const SYLLABUS: &str = "Syllabus";
pub const NOTES: &str = "Notes";

type Table = &'static [(&'static str, &'static [&'static str])];

const BOARD_TABLE: Table = &[
    (CAMBRIDGE, &["cie", "caie"]),
    (EDEXCEL, &["edx", "edex"]),
];

const TYPE_TABLE: Table = &[
    (QUESTION_PAPER, &[
        "qp", "que", "questionpaper", "question paper", "examiner-paper", "examination-paper",
        "sp", "specimen", "specimen question paper", "specimen paper", "question-paper",
    ]),
    (MARK_SCHEME, &[
        "ms", "msc", "mcs", "rms", "markscheme", "mark scheme", "mark-scheme", "sm",
        "specimen mark scheme",
    ]),
    ("Inserts", &["in", "insert", "inserts"]),
    ("Pre-release Materials", &["pm", "pre-release", "prerelease"]),
    ("Grade Thresholds", &["gt", "grade threshold", "grade thresholds"]),
    (EXAMINER_REPORT, &[
        "er", "pef", "examinerreport", "examinerreports", "examiner report", "examiner reports",
        "examiner-report", "examiners-report",
    ]),
    ("Answer Booklet", &["ab", "answer", "answers", "booklet", "formula", "formula sheet", "sheet"]),
    ("Confidential Instructions", &[
        "ci", "sc", "ir", "confidential instructions", "specimen confidential instructions",
    ]),
    ("Support Files", &["sf", "ss"]),
    (SYLLABUS, &["sy", "su", "tu"]),
    ("Grade Descriptions", &["gd"]),
    ("Frequently Asked Questions", &["fq"]),
    (NOTES, &["nt", "notes"]),
];

// Calendar months collapse into the five publication sessions.
const MONTH_TABLE: Table = &[
    (JANUARY, &["j", "01", "jan", "january"]),
    (FEB_MARCH, &["m", "02", "03", "feb", "february", "mar", "march"]),
    (MAY_JUNE, &[
        "s", "04", "05", "06", "07", "08", "apr", "april", "may", "jun", "june", "aug", "august",
        "summer",
    ]),
    (OCT_NOV, &[
        "w", "09", "10", "11", "12", "sept", "september", "oct", "october", "nov", "dec",
        "december", "winter",
    ]),
    (SPECIMEN, &["y", "sp", "spec", "specimen"]),
];

/// One bidirectional abbreviation table
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: Table,
    reverse: HashMap<&'static str, &'static str>,
    pad_numeric: bool,
}

impl Vocabulary {
    fn from_table(entries: Table, pad_numeric: bool) -> Self {
        let mut reverse = HashMap::new();
        for (canonical, abbreviations) in entries {
            for abbreviation in *abbreviations {
                reverse.insert(*abbreviation, *canonical);
            }
        }

        Self {
            entries,
            reverse,
            pad_numeric,
        }
    }

    pub fn boards() -> Self {
        Self::from_table(BOARD_TABLE, false)
    }

    pub fn types() -> Self {
        Self::from_table(TYPE_TABLE, false)
    }

    /// Session table; purely numeric tokens are zero-padded to two digits
    pub fn months() -> Self {
        Self::from_table(MONTH_TABLE, true)
    }

    fn normalize_token(&self, token: &str) -> String {
        let token = token.trim().to_lowercase();
        if self.pad_numeric && !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            format!("{:0>2}", token)
        } else {
            token
        }
    }

    /// Abbreviation or canonical name (any case) to canonical name
    pub fn to_canonical(&self, token: &str) -> Option<&'static str> {
        let token = self.normalize_token(token);

        if let Some(canonical) = self.reverse.get(token.as_str()) {
            return Some(*canonical);
        }

        self.entries
            .iter()
            .map(|(canonical, _)| *canonical)
            .find(|canonical| canonical.to_lowercase() == token)
    }

    /// Canonical name or any abbreviation to the preferred abbreviation
    pub fn to_abbreviation(&self, token: &str) -> Option<&'static str> {
        let token = self.normalize_token(token);

        self.entries
            .iter()
            .find(|(canonical, abbreviations)| {
                canonical.to_lowercase() == token || abbreviations.contains(&token.as_str())
            })
            .and_then(|(_, abbreviations)| abbreviations.first().copied())
    }

    /// Direction-selecting lookup; `None` means the token is unknown
    pub fn resolve(&self, token: &str, to_canonical: bool) -> Option<&'static str> {
        if to_canonical {
            self.to_canonical(token)
        } else {
            self.to_abbreviation(token)
        }
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(canonical, _)| *canonical)
    }

    /// Every abbreviation with its canonical name, in table order
    pub fn abbreviations(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().flat_map(|(canonical, abbreviations)| {
            abbreviations.iter().map(move |abbreviation| (*abbreviation, *canonical))
        })
    }

    /// Alternation of all abbreviations, for embedding in a grammar
    pub fn alternation(abbreviations: &[&str]) -> String {
        abbreviations
            .iter()
            .map(|a| regex::escape(a))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// The three tables the classifier consults, built once
#[derive(Debug, Clone)]
pub struct Vocabularies {
    pub boards: Vocabulary,
    pub types: Vocabulary,
    pub months: Vocabulary,
}

impl Vocabularies {
    pub fn new() -> Self {
        Self {
            boards: Vocabulary::boards(),
            types: Vocabulary::types(),
            months: Vocabulary::months(),
        }
    }
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self::new()
    }
}
