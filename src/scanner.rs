//! Input expansion. Files left inside folders that already carry a
//! normalized name, as archive extraction leaves them, are held back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::classifier::Classifier;

/// Files gathered from the command-line paths
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    /// Files under a directory whose own name classifies
    pub excluded: Vec<PathBuf>,
    /// Inputs that were neither a file nor a directory
    pub missing: Vec<PathBuf>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub struct Scanner<'a> {
    classifier: &'a Classifier,
    recursive: bool,
    probed: HashMap<PathBuf, bool>,
}

impl<'a> Scanner<'a> {
    pub fn new(classifier: &'a Classifier, recursive: bool) -> Self {
        Self {
            classifier,
            recursive,
            probed: HashMap::new(),
        }
    }

    /// Expand files and directories into the list of files to sort
    pub fn scan(&mut self, paths: &[PathBuf]) -> ScanResult {
        let mut result = ScanResult::default();

        for path in paths {
            if path.is_file() {
                self.admit(path.clone(), &mut result);
            } else if path.is_dir() {
                for file in self.list(path) {
                    self.admit(file, &mut result);
                }
            } else {
                tracing::warn!("Skipping {}: no such file or directory", path.display());
                result.missing.push(path.clone());
            }
        }

        tracing::debug!(
            files = result.files.len(),
            excluded = result.excluded.len(),
            "scan finished"
        );
        result
    }

    fn list(&self, dir: &Path) -> Vec<PathBuf> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect()
    }

    fn admit(&mut self, file: PathBuf, result: &mut ScanResult) {
        if self.inside_classified_dir(&file) {
            tracing::debug!("Skipping {}: inside an already sorted folder", file.display());
            result.excluded.push(file);
        } else {
            result.files.push(file);
        }
    }

    /// Whether any ancestor directory's name matches a naming grammar
    pub fn inside_classified_dir(&mut self, file: &Path) -> bool {
        file.ancestors()
            .skip(1)
            .any(|dir| self.classifies(dir))
    }

    fn classifies(&mut self, dir: &Path) -> bool {
        if let Some(known) = self.probed.get(dir) {
            return *known;
        }

        let matched = dir
            .file_name()
            .map(|name| self.classifier.classify_structured(&name.to_string_lossy()).is_ok())
            .unwrap_or(false);

        self.probed.insert(dir.to_path_buf(), matched);
        matched
    }
}
