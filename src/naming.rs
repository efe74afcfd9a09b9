//! Canonical destination paths for classified records.

use path_slash::PathBufExt;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::classifier::NormalizedRecord;
use crate::error::{ClassifyError, Field};
use crate::normalize::short_year;
use crate::vocab::{Vocabularies, NOTES, SYLLABUS};

/// Extension dropped from normalized names; the archive is expanded instead
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Destination of one file, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalPath {
    pub directories: Vec<String>,
    pub file_name: String,
    pub is_archive: bool,
}

impl CanonicalPath {
    pub fn relative_dir(&self) -> PathBuf {
        self.directories.iter().collect()
    }

    /// The file itself, or the extraction folder for archives
    pub fn relative_path(&self) -> PathBuf {
        self.relative_dir().join(&self.file_name)
    }

    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }

    /// Forward-slash form used in reports
    pub fn to_slash_string(&self) -> String {
        self.relative_path().to_slash_lossy().into_owned()
    }
}

/// Build the canonical path for a record.
///
/// `file_name` is the original name; only its extension is carried over,
/// unchanged.
pub fn build_path(
    record: &NormalizedRecord,
    vocab: &Vocabularies,
    file_name: &str,
) -> Result<CanonicalPath, ClassifyError> {
    if record.board.is_empty() {
        return Err(ClassifyError::MissingRequiredField(Field::Board));
    }
    if record.code.is_empty() {
        return Err(ClassifyError::MissingRequiredField(Field::Code));
    }

    let mut directories = vec![
        record.board.clone(),
        record.level.clone(),
        record.general_subject.clone(),
    ];

    if let Some(detailed) = &record.detailed_subject {
        match &record.master_code {
            Some(master) => directories.push(format!("{} ({})", detailed, master)),
            None => directories.push(detailed.clone()),
        }
    }

    match record.type_str.as_deref() {
        Some(SYLLABUS) => directories.push(SYLLABUS.to_string()),
        Some(NOTES) => directories.push(NOTES.to_string()),
        _ => {
            directories.push(record.year.to_string());
            directories.push(format!("{} {}", record.month, record.year));
        }
    }

    let board = vocab
        .boards
        .to_abbreviation(&record.board)
        .ok_or(ClassifyError::MissingRequiredField(Field::Board))?;
    let month = vocab
        .months
        .to_abbreviation(&record.month)
        .ok_or(ClassifyError::MissingRequiredField(Field::Session))?;
    let year = short_year(record.year);
    let doc_type = record.type_str.as_deref().and_then(|t| vocab.types.to_abbreviation(t));

    let stem = match (doc_type, record.number.as_deref(), record.variant.as_deref()) {
        (Some(t), Some(n), Some(v)) => format!("{}_{}_{}{}_{}_{}{}", board, record.code, month, year, t, n, v),
        (Some(t), Some(n), None) => format!("{}_{}_{}{}_{}_{}", board, record.code, month, year, t, n),
        (Some(t), None, _) => format!("{}_{}_{}{}_{}", board, record.code, month, year, t),
        (None, _, _) => format!("{}_{}_{}", board, record.code, year),
    };

    let (extension, is_archive) = match Path::new(file_name).extension() {
        Some(ext) if ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION) => (String::new(), true),
        Some(ext) => (format!(".{}", ext.to_string_lossy()), false),
        None => (String::new(), false),
    };

    Ok(CanonicalPath {
        directories,
        file_name: format!("{}{}", stem.to_lowercase(), extension),
        is_archive,
    })
}
