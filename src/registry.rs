//! Syllabus code registry.
//!
//! Maps `(board, code)` to the level and subject a code belongs to. Built
//! once from operator-supplied CSV rows and read-only afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub board: String,
    pub level: String,
    pub general_subject: String,
    pub detailed_subject: String,
    pub master_code: Option<String>,
    pub codes: BTreeSet<String>,
}

/// One reference-data row before it is folded into the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    pub board: String,
    pub level: String,
    pub subject: String,
    pub detailed_subject: String,
    pub master_code: String,
    pub codes: Vec<String>,
}

impl RegistryRecord {
    /// Build a record from a CSV row:
    /// `board, level, subject, detailed subject, master code, code...`
    pub fn from_fields<'a, I>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let fields: Vec<&str> = fields.into_iter().collect();
        if fields.len() < 4 {
            return None;
        }

        Some(Self {
            board: fields[0].to_string(),
            level: fields[1].to_string(),
            subject: fields[2].to_string(),
            detailed_subject: fields[3].to_string(),
            master_code: fields.get(4).map(|s| s.to_string()).unwrap_or_default(),
            codes: fields.iter().skip(5).map(|s| s.to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    entries: HashMap<String, CodeEntry>,
}

fn registry_key(board: &str, code: &str) -> String {
    format!("{}_{}", board.trim().to_lowercase(), code.trim().to_uppercase())
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold records into a registry. Malformed records are logged and
    /// skipped; they never abort the load.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RegistryRecord>,
    {
        let mut registry = Self::new();
        for record in records {
            registry.insert(record);
        }
        registry
    }

    /// Load every CSV file in order into one registry
    pub fn from_csv_paths(paths: &[PathBuf]) -> Result<Self> {
        let mut registry = Self::new();
        for path in paths {
            registry.load_csv(path)?;
        }
        tracing::debug!(entries = registry.len(), "code registry loaded");
        Ok(registry)
    }

    fn load_csv(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open codes file: {}", path.display()))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        for (line, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping unreadable line {} in {}: {}", line + 1, path.display(), e);
                    continue;
                }
            };

            // Blank lines come through as a single empty field
            if row.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            match RegistryRecord::from_fields(row.iter()) {
                Some(record) => self.insert(record),
                None => tracing::warn!("Skipping incorrect line: {:?}", row.iter().collect::<Vec<_>>()),
            }
        }

        Ok(())
    }

    /// Add one record. The first record to claim a `(board, code)` key fixes
    /// its subject fields; later claims only extend the code set.
    pub fn insert(&mut self, record: RegistryRecord) {
        let board = record.board.trim();
        if board.is_empty() {
            tracing::warn!("Skipping record without a board: {:?}", record);
            return;
        }

        let master_code = record.master_code.trim().to_uppercase();
        let mut codes: Vec<String> = record.codes.iter().map(|c| c.trim().to_uppercase()).collect();
        if !master_code.is_empty() {
            codes.push(master_code.clone());
        }

        for code in codes.into_iter().filter(|c| !c.is_empty()) {
            let key = registry_key(board, &code);
            match self.entries.get_mut(&key) {
                Some(entry) => {
                    entry.codes.insert(code);
                }
                None => {
                    self.entries.insert(key, CodeEntry {
                        board: board.to_string(),
                        level: record.level.trim().to_string(),
                        general_subject: record.subject.trim().to_string(),
                        detailed_subject: record.detailed_subject.trim().to_string(),
                        master_code: if master_code.is_empty() { None } else { Some(master_code.clone()) },
                        codes: BTreeSet::from([code]),
                    });
                }
            }
        }
    }

    /// Look up a code under a canonical board name (case-insensitive)
    pub fn lookup(&self, board: &str, code: &str) -> Option<&CodeEntry> {
        self.entries.get(&registry_key(board, code))
    }

    pub fn contains(&self, board: &str, code: &str) -> bool {
        self.lookup(board, code).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn maths_record() -> RegistryRecord {
        RegistryRecord {
            board: "Cambridge".to_string(),
            level: "A-Level".to_string(),
            subject: "Mathematics".to_string(),
            detailed_subject: String::new(),
            master_code: String::new(),
            codes: vec!["9709".to_string()],
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = CodeRegistry::from_records([maths_record()]);
        let entry = registry.lookup("cambridge", "9709").unwrap();
        assert_eq!(entry.level, "A-Level");
        assert_eq!(entry.general_subject, "Mathematics");
        assert!(registry.contains("Cambridge", "9709"));
        assert!(!registry.contains("Edexcel", "9709"));
    }

    #[test]
    fn test_repeated_code_extends_but_keeps_first_fields() {
        let mut second = maths_record();
        second.level = "IGCSE".to_string();
        second.subject = "Further Maths".to_string();

        let registry = CodeRegistry::from_records([maths_record(), second]);
        let entry = registry.lookup("Cambridge", "9709").unwrap();
        assert_eq!(entry.level, "A-Level");
        assert_eq!(entry.general_subject, "Mathematics");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_master_code_is_registered_as_code() {
        let record = RegistryRecord {
            board: "Edexcel".to_string(),
            level: "IAL".to_string(),
            subject: "Mathematics".to_string(),
            detailed_subject: "Pure Mathematics".to_string(),
            master_code: "xma01".to_string(),
            codes: vec!["wma11".to_string(), " wma12 ".to_string()],
        };
        let registry = CodeRegistry::from_records([record]);

        assert_eq!(registry.len(), 3);
        let entry = registry.lookup("Edexcel", "WMA12").unwrap();
        assert_eq!(entry.master_code.as_deref(), Some("XMA01"));
        assert_eq!(entry.detailed_subject, "Pure Mathematics");
        assert!(registry.contains("Edexcel", "XMA01"));
    }

    #[test]
    fn test_record_without_board_is_skipped() {
        let mut record = maths_record();
        record.board = "  ".to_string();
        let registry = CodeRegistry::from_records([record]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_record_from_short_row() {
        assert!(RegistryRecord::from_fields(["Cambridge", "A-Level", "Maths"]).is_none());

        let record = RegistryRecord::from_fields(["Cambridge", "A-Level", "Maths", ""]).unwrap();
        assert!(record.master_code.is_empty());
        assert!(record.codes.is_empty());
    }

    #[test]
    fn test_load_csv_skips_malformed_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Cambridge,A-Level,Mathematics,,,9709").unwrap();
        writeln!(file, "broken,line").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Cambridge,IGCSE,Physics,,,0625,0972").unwrap();
        file.flush().unwrap();

        let registry = CodeRegistry::from_csv_paths(&[file.path().to_path_buf()]).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lookup("Cambridge", "0972").unwrap().general_subject, "Physics");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = CodeRegistry::from_csv_paths(&[PathBuf::from("/nonexistent/codes.csv")]);
        assert!(result.is_err());
    }
}
