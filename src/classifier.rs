//! Filename classification.
//!
//! A name is tried against the pattern bank; on the first match its raw
//! fields are normalized against the vocabularies and the code registry. A
//! generic match with no paper group still picks up a trailing unit code, so
//! names written for keyword-scanned papers read back the same. If nothing
//! matches and the fallback is enabled, a keyword scan recovers what it can,
//! and a [`FieldResolver`] may fill the gaps for direct file inputs.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ClassifyError, Field};
use crate::fallback::FallbackExtractor;
use crate::normalize::{parse_date, split_paper};
use crate::patterns::{ExtractedFields, PatternBank, PatternId};
use crate::registry::CodeRegistry;
use crate::vocab::{Vocabularies, NOTES, SYLLABUS};

/// The classification result for one name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub general_subject: String,
    pub detailed_subject: Option<String>,
    pub board: String,
    pub level: String,
    pub master_code: Option<String>,
    pub code: String,
    pub type_str: Option<String>,
    pub number: Option<String>,
    pub variant: Option<String>,
    pub year: i32,
    pub month: String,
    pub pattern_id: PatternId,
}

/// Supplies a value for a field the name did not give up, typically by
/// asking the operator. Returning `None` leaves the field missing.
pub trait FieldResolver: Send + Sync {
    fn resolve(&self, field: Field, name: &str) -> Option<String>;
}

impl<F> FieldResolver for F
where
    F: Fn(Field, &str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, field: Field, name: &str) -> Option<String> {
        self(field, name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierOptions {
    /// Run the keyword scan when no grammar matches
    pub fuzzy: bool,
    /// Upper bound for years found by the keyword scan
    pub current_year: i32,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            current_year: chrono::Local::now().year(),
        }
    }
}

pub struct Classifier {
    registry: CodeRegistry,
    vocab: Vocabularies,
    patterns: PatternBank,
    fallback: FallbackExtractor,
    fuzzy: bool,
    resolver: Option<Box<dyn FieldResolver>>,
}

impl Classifier {
    pub fn new(registry: CodeRegistry, options: ClassifierOptions) -> Self {
        let vocab = Vocabularies::new();
        let fallback = FallbackExtractor::new(&vocab, options.current_year);

        Self {
            registry,
            vocab,
            patterns: PatternBank::new(),
            fallback,
            fuzzy: options.fuzzy,
            resolver: None,
        }
    }

    /// Enable manual backfill of missing fields for direct file inputs
    pub fn with_resolver(mut self, resolver: Box<dyn FieldResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    pub fn vocab(&self) -> &Vocabularies {
        &self.vocab
    }

    pub fn patterns(&self) -> &PatternBank {
        &self.patterns
    }

    /// Classify a bare file or directory name
    pub fn classify(&self, name: &str, is_direct_file: bool) -> Result<NormalizedRecord, ClassifyError> {
        match self.classify_structured(name) {
            Err(ClassifyError::NoPatternMatch) if self.fuzzy => {}
            structured => return structured,
        }

        let mut fields = self.fallback.extract(name, &self.vocab, &self.registry);

        if is_direct_file {
            self.backfill(&mut fields, name);
        }

        if fields.type_str.is_none() {
            return Err(ClassifyError::NoPatternMatch);
        }

        let board = fields.board.clone().unwrap_or_default();
        self.normalize_with_board(fields, PatternId::Heuristic, &board)
    }

    /// Classify a name using the grammars alone, never the keyword scan or
    /// the resolver
    pub fn classify_structured(&self, name: &str) -> Result<NormalizedRecord, ClassifyError> {
        let found = self.patterns.find(name).ok_or(ClassifyError::NoPatternMatch)?;
        tracing::trace!(name, pattern = %found.rule.id, "grammar matched");

        let mut fields = found.fields;
        if found.rule.id == PatternId::Generic && fields.paper.is_none() {
            fields.paper = self.fallback.trailing_unit(name);
        }

        self.normalize(fields, found.rule.id, found.rule.board)
    }

    /// Classify a file on disk. The parent path supplies a document type
    /// when the name itself has none.
    pub fn classify_path(&self, path: &Path, is_direct_file: bool) -> Result<NormalizedRecord, ClassifyError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut record = self.classify(&name, is_direct_file)?;

        if is_direct_file && record.type_str.is_none() {
            if let Some(parent) = path.parent() {
                let parent = parent.to_string_lossy().to_lowercase();
                if parent.contains("syllabus") {
                    record.type_str = Some(SYLLABUS.to_string());
                } else if parent.contains("notes") || parent.contains("resources") {
                    record.type_str = Some(NOTES.to_string());
                }
            }
        }

        Ok(record)
    }

    fn backfill(&self, fields: &mut ExtractedFields, name: &str) {
        let resolver = match &self.resolver {
            Some(resolver) => resolver,
            None => return,
        };

        let slots = [
            (Field::Board, &mut fields.board),
            (Field::Code, &mut fields.code),
            (Field::Session, &mut fields.month),
            (Field::Year, &mut fields.year),
            (Field::Type, &mut fields.type_str),
        ];

        for (field, slot) in slots {
            if slot.is_none() {
                *slot = resolver
                    .resolve(field, name)
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty());
            }
        }

        if let Some(code) = fields.code.as_mut() {
            *code = code.to_uppercase();
        }
    }

    fn normalize(
        &self,
        fields: ExtractedFields,
        pattern: PatternId,
        default_board: &str,
    ) -> Result<NormalizedRecord, ClassifyError> {
        let board = fields.board.clone().unwrap_or_else(|| default_board.to_string());
        self.normalize_with_board(fields, pattern, &board)
    }

    fn normalize_with_board(
        &self,
        fields: ExtractedFields,
        pattern: PatternId,
        board: &str,
    ) -> Result<NormalizedRecord, ClassifyError> {
        let board = self
            .vocab
            .boards
            .to_canonical(board)
            .ok_or(ClassifyError::MissingRequiredField(Field::Board))?;

        let (number, variant) = split_paper(fields.paper.as_deref());

        let (year, month) = match fields.date.as_deref() {
            Some(date) if date.len() >= 8 => (Some(&date[..4]), Some(&date[4..6])),
            _ => (fields.year.as_deref(), fields.month.as_deref()),
        };

        let type_str = fields.type_str.as_deref().and_then(|t| self.vocab.types.to_canonical(t));
        let (month, year) = parse_date(&self.vocab.months, month, year, type_str, board, pattern)?;

        let code = fields
            .code
            .ok_or(ClassifyError::MissingRequiredField(Field::Code))?;

        let entry = self
            .registry
            .lookup(board, &code)
            .ok_or_else(|| ClassifyError::UnknownCode {
                board: board.to_string(),
                code: code.clone(),
            })?;

        if entry.level.is_empty() {
            return Err(ClassifyError::MissingRequiredField(Field::Level));
        }
        if entry.general_subject.is_empty() {
            return Err(ClassifyError::MissingRequiredField(Field::Subject));
        }
        let month = month.ok_or(ClassifyError::MissingRequiredField(Field::Session))?;

        Ok(NormalizedRecord {
            general_subject: entry.general_subject.clone(),
            detailed_subject: Some(entry.detailed_subject.clone()).filter(|s| !s.is_empty()),
            board: board.to_string(),
            level: entry.level.clone(),
            master_code: entry.master_code.clone(),
            code,
            type_str: type_str.map(str::to_string),
            number,
            variant,
            year,
            month: month.to_string(),
            pattern_id: pattern,
        })
    }
}
