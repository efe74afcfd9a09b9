//! Placing classified files under the output root.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FileOpError;
use crate::naming::CanonicalPath;

/// Extensions of files that may be relocated. Anything else is left in place.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "rtf", "odt", "txt", "md", "html", "htm",
    "ppt", "pptx", "odp", "xls", "xlsx", "ods", "csv",
    "png", "jpg", "jpeg", "gif", "svg",
    "mp3", "wav", "m4a", "mp4",
    "zip",
];

pub fn is_document(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub dry_run: bool,
    pub copy: bool,
    pub force: bool,
    pub quit_on_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move,
    Copy,
    Extract,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Extract => "extract",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// Destination holds the same bytes
    Identical,
    /// Destination holds different content
    Conflict,
    /// Another source in this batch claimed the destination first
    Duplicate,
    /// Extension is not a known document type
    InvalidType,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Identical => "already sorted",
            Self::Conflict => "destination exists",
            Self::Duplicate => "already processed",
            Self::InvalidType => "not a document",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { to: PathBuf },
    Copied { to: PathBuf },
    Extracted {
        to: PathBuf,
        extracted: usize,
        existing: usize,
        removed_source: bool,
    },
    /// Dry run: what would have happened
    Planned { action: Action, to: PathBuf },
    Skipped { reason: SkipReason, to: PathBuf },
}

/// Places classified files under an output root
#[derive(Debug, Clone)]
pub struct FileMover {
    output: PathBuf,
    options: SortOptions,
}

impl FileMover {
    pub fn new(output: impl Into<PathBuf>, options: SortOptions) -> Self {
        Self {
            output: output.into(),
            options,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn options(&self) -> SortOptions {
        self.options
    }

    pub fn destination(&self, canonical: &CanonicalPath) -> PathBuf {
        canonical.under(&self.output)
    }

    pub fn place(&self, source: &Path, canonical: &CanonicalPath) -> Result<MoveOutcome, FileOpError> {
        let destination = self.destination(canonical);

        if canonical.is_archive {
            return self.extract(source, destination);
        }

        if destination.exists() && !self.options.force {
            let reason = if same_contents(source, &destination)? {
                SkipReason::Identical
            } else {
                SkipReason::Conflict
            };
            return Ok(MoveOutcome::Skipped { reason, to: destination });
        }

        let action = if self.options.copy { Action::Copy } else { Action::Move };
        if self.options.dry_run {
            return Ok(MoveOutcome::Planned { action, to: destination });
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| FileOpError::io("create directory", parent, e))?;
        }

        match action {
            Action::Copy => {
                fs::copy(source, &destination).map_err(|e| FileOpError::io("copy", source, e))?;
                Ok(MoveOutcome::Copied { to: destination })
            }
            _ => {
                let options = fs_extra::file::CopyOptions {
                    overwrite: self.options.force,
                    ..fs_extra::file::CopyOptions::new()
                };
                fs_extra::file::move_file(source, &destination, &options).map_err(|e| FileOpError::Move {
                    from: source.to_path_buf(),
                    to: destination.clone(),
                    source: e,
                })?;
                Ok(MoveOutcome::Moved { to: destination })
            }
        }
    }

    /// Unpack an archive into `folder`. Entries already on disk are kept
    /// unless forced; the archive is removed afterwards unless copying.
    fn extract(&self, source: &Path, folder: PathBuf) -> Result<MoveOutcome, FileOpError> {
        if self.options.dry_run {
            return Ok(MoveOutcome::Planned { action: Action::Extract, to: folder });
        }

        let file = File::open(source).map_err(|e| FileOpError::io("open", source, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| FileOpError::Archive {
            path: source.to_path_buf(),
            source: e,
        })?;

        fs::create_dir_all(&folder).map_err(|e| FileOpError::io("create directory", &folder, e))?;

        let mut extracted = 0;
        let mut existing = 0;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| FileOpError::Archive {
                path: source.to_path_buf(),
                source: e,
            })?;

            let relative = match entry.enclosed_name() {
                Some(name) => name.to_path_buf(),
                None => {
                    tracing::warn!("Ignoring unsafe entry {:?} in {}", entry.name(), source.display());
                    continue;
                }
            };
            let target = folder.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| FileOpError::io("create directory", &target, e))?;
                continue;
            }

            if target.exists() && !self.options.force {
                tracing::info!("{} already exists, skipping extraction", target.display());
                existing += 1;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| FileOpError::io("create directory", parent, e))?;
            }

            let mut out = File::create(&target).map_err(|e| FileOpError::io("create", &target, e))?;
            io::copy(&mut entry, &mut out).map_err(|e| FileOpError::io("extract", &target, e))?;
            tracing::debug!("Extracted {} to {}", entry.name(), folder.display());
            extracted += 1;
        }

        // Release the handle before deleting the archive
        drop(archive);

        let removed_source = !self.options.copy;
        if removed_source {
            fs::remove_file(source).map_err(|e| FileOpError::io("remove", source, e))?;
            tracing::debug!("Deleted original zip file: {}", source.display());
        }

        Ok(MoveOutcome::Extracted {
            to: folder,
            extracted,
            existing,
            removed_source,
        })
    }
}

/// Streaming blake3 digest of a file
pub fn hash_file(path: &Path) -> Result<blake3::Hash, FileOpError> {
    let mut hasher = blake3::Hasher::new();
    let mut file = File::open(path).map_err(|e| FileOpError::io("open", path, e))?;

    let mut buffer = [0u8; 8192];
    loop {
        let n = io::Read::read(&mut file, &mut buffer).map_err(|e| FileOpError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

pub fn same_contents(a: &Path, b: &Path) -> Result<bool, FileOpError> {
    let size_a = fs::metadata(a).map_err(|e| FileOpError::io("read metadata of", a, e))?.len();
    let size_b = fs::metadata(b).map_err(|e| FileOpError::io("read metadata of", b, e))?.len();
    if size_a != size_b {
        return Ok(false);
    }
    Ok(hash_file(a)? == hash_file(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn canonical(file_name: &str, is_archive: bool) -> CanonicalPath {
        CanonicalPath {
            directories: vec!["Cambridge".to_string(), "IGCSE".to_string()],
            file_name: file_name.to_string(),
            is_archive,
        }
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_is_document() {
        assert!(is_document(Path::new("a/b/paper.PDF")));
        assert!(is_document(Path::new("bundle.zip")));
        assert!(!is_document(Path::new("setup.exe")));
        assert!(!is_document(Path::new("README")));
    }

    #[test]
    fn test_move_creates_directories() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("in.pdf");
        fs::write(&source, "paper").unwrap();

        let mover = FileMover::new(temp.path().join("out"), SortOptions::default());
        let outcome = mover.place(&source, &canonical("cie_0625_s22_qp_11.pdf", false)).unwrap();

        let expected = temp.path().join("out/Cambridge/IGCSE/cie_0625_s22_qp_11.pdf");
        assert_eq!(outcome, MoveOutcome::Moved { to: expected.clone() });
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(expected).unwrap(), "paper");
    }

    #[test]
    fn test_copy_keeps_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("in.pdf");
        fs::write(&source, "paper").unwrap();

        let options = SortOptions { copy: true, ..Default::default() };
        let mover = FileMover::new(temp.path().join("out"), options);
        let outcome = mover.place(&source, &canonical("a.pdf", false)).unwrap();

        assert!(matches!(outcome, MoveOutcome::Copied { .. }));
        assert!(source.exists());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("in.pdf");
        fs::write(&source, "paper").unwrap();

        let options = SortOptions { dry_run: true, ..Default::default() };
        let mover = FileMover::new(temp.path().join("out"), options);
        let outcome = mover.place(&source, &canonical("a.pdf", false)).unwrap();

        assert!(matches!(outcome, MoveOutcome::Planned { action: Action::Move, .. }));
        assert!(source.exists());
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_existing_destination_is_skipped() {
        let temp = TempDir::new().unwrap();
        let mover = FileMover::new(temp.path().join("out"), SortOptions::default());
        let target = mover.destination(&canonical("a.pdf", false));
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "paper").unwrap();

        let same = temp.path().join("same.pdf");
        fs::write(&same, "paper").unwrap();
        let outcome = mover.place(&same, &canonical("a.pdf", false)).unwrap();
        assert_eq!(outcome, MoveOutcome::Skipped { reason: SkipReason::Identical, to: target.clone() });

        let other = temp.path().join("other.pdf");
        fs::write(&other, "different").unwrap();
        let outcome = mover.place(&other, &canonical("a.pdf", false)).unwrap();
        assert_eq!(outcome, MoveOutcome::Skipped { reason: SkipReason::Conflict, to: target.clone() });
        assert!(other.exists());
    }

    #[test]
    fn test_force_overwrites() {
        let temp = TempDir::new().unwrap();
        let options = SortOptions { force: true, ..Default::default() };
        let mover = FileMover::new(temp.path().join("out"), options);
        let target = mover.destination(&canonical("a.pdf", false));
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "old").unwrap();

        let source = temp.path().join("new.pdf");
        fs::write(&source, "new").unwrap();
        mover.place(&source, &canonical("a.pdf", false)).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!source.exists());
    }

    #[test]
    fn test_extract_removes_archive() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("bundle.zip");
        write_zip(&source, &[("qp.pdf", "q"), ("inner/ms.pdf", "m")]);

        let mover = FileMover::new(temp.path().join("out"), SortOptions::default());
        let outcome = mover.place(&source, &canonical("cie_0625_s22_qp_11", true)).unwrap();

        let folder = temp.path().join("out/Cambridge/IGCSE/cie_0625_s22_qp_11");
        assert_eq!(
            outcome,
            MoveOutcome::Extracted { to: folder.clone(), extracted: 2, existing: 0, removed_source: true }
        );
        assert_eq!(fs::read_to_string(folder.join("inner/ms.pdf")).unwrap(), "m");
        assert!(!source.exists());
    }

    #[test]
    fn test_extract_ignores_escaping_entries() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("bundle.zip");
        write_zip(&source, &[("../escape.pdf", "x"), ("ok.pdf", "y")]);

        let options = SortOptions { copy: true, ..Default::default() };
        let mover = FileMover::new(temp.path().join("out"), options);
        let outcome = mover.place(&source, &canonical("bundle", true)).unwrap();

        assert!(matches!(outcome, MoveOutcome::Extracted { extracted: 1, removed_source: false, .. }));
        assert!(!temp.path().join("out/Cambridge/IGCSE/escape.pdf").exists());
        assert!(source.exists());
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("broken.zip");
        fs::write(&source, "not a zip").unwrap();

        let mover = FileMover::new(temp.path().join("out"), SortOptions::default());
        let err = mover.place(&source, &canonical("broken", true)).unwrap_err();
        assert!(matches!(err, FileOpError::Archive { .. }));
        assert!(source.exists());
    }

    #[test]
    fn test_same_contents() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::write(&a, "abc").unwrap();
        fs::write(&b, "abd").unwrap();
        assert!(!same_contents(&a, &b).unwrap());
        fs::write(&b, "abc").unwrap();
        assert!(same_contents(&a, &b).unwrap());
    }
}
