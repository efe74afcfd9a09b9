//! Batch pipeline: classify, name, then place each file.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::classifier::Classifier;
use crate::colors;
use crate::error::{ClassifyError, FileOpError};
use crate::mover::{is_document, Action, FileMover, MoveOutcome, SkipReason};
use crate::naming::build_path;
use crate::patterns::PatternId;

/// What happened to one input file
#[derive(Debug)]
pub enum FileResult {
    Placed(MoveOutcome),
    Unclassified(ClassifyError),
    Failed(FileOpError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortReport {
    pub moved: usize,
    pub copied: usize,
    pub extracted: usize,
    pub planned: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub unclassified: BTreeMap<&'static str, usize>,
    pub failed: Vec<(PathBuf, String)>,
    pub aborted: bool,
}

impl SortReport {
    pub fn record(&mut self, source: &Path, result: &FileResult) {
        match result {
            FileResult::Placed(MoveOutcome::Moved { .. }) => self.moved += 1,
            FileResult::Placed(MoveOutcome::Copied { .. }) => self.copied += 1,
            FileResult::Placed(MoveOutcome::Extracted { .. }) => self.extracted += 1,
            FileResult::Placed(MoveOutcome::Planned { .. }) => self.planned += 1,
            FileResult::Placed(MoveOutcome::Skipped { reason, .. }) => {
                *self.skipped.entry(*reason).or_default() += 1
            }
            FileResult::Unclassified(e) => *self.unclassified.entry(e.kind()).or_default() += 1,
            FileResult::Failed(e) => self.failed.push((source.to_path_buf(), e.to_string())),
        }
    }

    pub fn placed(&self) -> usize {
        self.moved + self.copied + self.extracted
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn total_unclassified(&self) -> usize {
        self.unclassified.values().sum()
    }

    pub fn print_summary(&self, dry_run: bool) {
        println!();
        println!("{}", "📚 SORT COMPLETE".bold().color(colors::HEADER));
        println!("{}", "─".repeat(50).color(colors::PATH));

        if dry_run {
            println!("🌵 Would place: {}", self.planned.to_string().color(colors::SUCCESS));
        } else {
            println!("📦 Moved: {}", self.moved.to_string().color(colors::SUCCESS));
            println!("📋 Copied: {}", self.copied.to_string().color(colors::SUCCESS));
            println!("🗜️  Extracted: {}", self.extracted.to_string().color(colors::SUCCESS));
        }

        if !self.skipped.is_empty() {
            println!("⏭️  Skipped: {}", self.total_skipped().to_string().color(colors::WARNING));
            for (reason, count) in &self.skipped {
                println!("   - {}: {}", reason.label(), count);
            }
        }

        if !self.unclassified.is_empty() {
            println!("❔ Not recognised: {}", self.total_unclassified().to_string().color(colors::WARNING));
            for (kind, count) in &self.unclassified {
                println!("   - {}: {}", kind, count);
            }
        }

        if !self.failed.is_empty() {
            println!("{} Failed: {}", "❌".red(), self.failed.len().to_string().red());
            for (path, error) in &self.failed {
                println!("   - {}: {}", path.display().to_string().color(colors::PATH), error);
            }
        }

        if self.aborted {
            println!("{} Stopped at the first error", "⚠️".yellow());
        }
    }
}

pub struct Sorter<'a> {
    classifier: &'a Classifier,
    mover: FileMover,
    claimed: HashSet<PathBuf>,
    report: SortReport,
    show_pattern: bool,
    quiet: bool,
    progress: bool,
}

impl<'a> Sorter<'a> {
    pub fn new(classifier: &'a Classifier, mover: FileMover) -> Self {
        Self {
            classifier,
            mover,
            claimed: HashSet::new(),
            report: SortReport::default(),
            show_pattern: false,
            quiet: false,
            progress: false,
        }
    }

    /// Print the grammar that matched each file
    pub fn show_pattern(mut self, show: bool) -> Self {
        self.show_pattern = show;
        self
    }

    /// Only report errors
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn report(&self) -> &SortReport {
        &self.report
    }

    pub fn into_report(self) -> SortReport {
        self.report
    }

    /// Sort every file. With quit-on-error the first file operation failure
    /// ends the batch and is returned.
    pub fn run(&mut self, files: &[PathBuf]) -> Result<&SortReport, FileOpError> {
        let bar = if self.progress && !self.quiet && !files.is_empty() {
            let pb = ProgressBar::new(files.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        for file in files {
            let result = self.sort_file(file, bar.as_ref());
            if let Some(pb) = &bar {
                pb.inc(1);
            }

            if let FileResult::Failed(e) = result {
                if self.mover.options().quit_on_error {
                    self.report.aborted = true;
                    if let Some(pb) = &bar {
                        pb.abandon();
                    }
                    return Err(e);
                }
            }
        }

        if let Some(pb) = bar {
            pb.finish_and_clear();
        }

        Ok(&self.report)
    }

    /// Classify and place one file, recording the result
    pub fn sort_file(&mut self, path: &Path, bar: Option<&ProgressBar>) -> FileResult {
        let result = self.process(path, bar);
        self.report.record(path, &result);

        match &result {
            FileResult::Placed(outcome) => self.announce(path, outcome, bar),
            FileResult::Unclassified(e) => {
                tracing::debug!("Skipping {}: {}", path.display(), e);
            }
            FileResult::Failed(e) => {
                tracing::error!("Error processing {}: {}", path.display(), e);
            }
        }

        result
    }

    fn process(&mut self, path: &Path, bar: Option<&ProgressBar>) -> FileResult {
        let record = match self.classifier.classify_path(path, true) {
            Ok(record) => record,
            Err(e) => return FileResult::Unclassified(e),
        };
        tracing::debug!(file = %path.display(), ?record, "classified");

        if self.show_pattern {
            let source = match record.pattern_id {
                PatternId::Heuristic => "keyword scan".to_string(),
                id => self
                    .classifier
                    .patterns()
                    .rule(id)
                    .map(|rule| rule.regex.as_str().to_string())
                    .unwrap_or_default(),
            };
            self.emit(bar, format!("🔎 {}: {} {}", path.display(), record.pattern_id, source.dimmed()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let canonical = match build_path(&record, self.classifier.vocab(), &file_name) {
            Ok(canonical) => canonical,
            Err(e) => return FileResult::Unclassified(e),
        };

        let destination = self.mover.destination(&canonical);
        if !self.claimed.insert(destination.clone()) {
            return FileResult::Placed(MoveOutcome::Skipped {
                reason: SkipReason::Duplicate,
                to: destination,
            });
        }

        if !is_document(path) {
            tracing::warn!("Error handling file {}: file is not valid", path.display());
            return FileResult::Placed(MoveOutcome::Skipped {
                reason: SkipReason::InvalidType,
                to: destination,
            });
        }

        match self.mover.place(path, &canonical) {
            Ok(outcome) => FileResult::Placed(outcome),
            Err(e) => FileResult::Failed(e),
        }
    }

    fn announce(&self, source: &Path, outcome: &MoveOutcome, bar: Option<&ProgressBar>) {
        let from = source.display().to_string();
        let line = match outcome {
            MoveOutcome::Moved { to } => format!("📦 Moved {} → {}", from, to.display().to_string().color(colors::PATH)),
            MoveOutcome::Copied { to } => format!("📋 Copied {} → {}", from, to.display().to_string().color(colors::PATH)),
            MoveOutcome::Extracted { to, extracted, existing, removed_source } => {
                let mut line = format!(
                    "🗜️  Extracted {} → {} ({} new, {} already there)",
                    from,
                    to.display().to_string().color(colors::PATH),
                    extracted,
                    existing
                );
                if *removed_source {
                    line.push_str(", archive removed");
                }
                line
            }
            MoveOutcome::Planned { action, to } => {
                let verb = match action {
                    Action::Extract => "unzip",
                    other => other.verb(),
                };
                format!("🌵 Would {} {} → {}", verb, from, to.display().to_string().color(colors::PATH))
            }
            MoveOutcome::Skipped { reason, to } => format!(
                "⏭️  Skipping {}: {} ({})",
                from,
                reason.label().color(colors::WARNING),
                to.display()
            ),
        };
        self.emit(bar, line);
    }

    fn emit(&self, bar: Option<&ProgressBar>, line: String) {
        if self.quiet {
            return;
        }
        match bar {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }
}
