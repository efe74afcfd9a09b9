use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use paperctl::{
    Classifier, ClassifierOptions, CodeRegistry, FileMover, Scanner, SkipReason, SortOptions, Sorter,
};
use tempfile::TempDir;
use zip::write::FileOptions;

const CODES: &str = "\
Cambridge,A-Level,Mathematics,,,9709
Cambridge,IGCSE,Physics,,,0625
Edexcel,IAL,Mathematics,Pure Mathematics,XMA01,WMA11,WMA12
not,enough
";

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("downloads")).unwrap();
        fs::write(temp.path().join("codes.csv"), CODES).unwrap();
        Self { temp }
    }

    fn downloads(&self) -> PathBuf {
        self.temp.path().join("downloads")
    }

    fn output(&self) -> PathBuf {
        self.temp.path().join("sorted")
    }

    fn add(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.downloads().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn add_zip(&self, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.downloads().join(name);
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        for (entry, contents) in entries {
            writer.start_file(*entry, FileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    fn classifier(&self) -> Classifier {
        let registry = CodeRegistry::from_csv_paths(&[self.temp.path().join("codes.csv")]).unwrap();
        Classifier::new(registry, ClassifierOptions { fuzzy: true, current_year: 2024 })
    }

    fn sorted(&self, relative: &str) -> PathBuf {
        self.output().join(relative)
    }
}

fn sort(workspace: &Workspace, options: SortOptions, recursive: bool) -> paperctl::SortReport {
    let classifier = workspace.classifier();
    let scan = Scanner::new(&classifier, recursive).scan(&[workspace.downloads()]);
    let mut sorter = Sorter::new(&classifier, FileMover::new(workspace.output(), options)).quiet(true);
    sorter.run(&scan.files).unwrap();
    sorter.into_report()
}

fn exists(path: &Path) -> bool {
    path.exists()
}

#[test]
fn test_moves_papers_into_canonical_tree() {
    let workspace = Workspace::new();
    let qp = workspace.add("9709_w21_qp_12.pdf", "question paper");
    let ms = workspace.add("CIE_0625-s19-ms-42.PDF", "mark scheme");
    let edexcel = workspace.add("wma11_01_msc_20230112.pdf", "edexcel");

    let report = sort(&workspace, SortOptions::default(), false);

    assert_eq!(report.moved, 3);
    assert!(!exists(&qp) && !exists(&ms) && !exists(&edexcel));
    assert_eq!(
        fs::read_to_string(workspace.sorted("Cambridge/A-Level/Mathematics/2021/Oct-Nov 2021/cie_9709_w21_qp_12.pdf")).unwrap(),
        "question paper"
    );
    assert!(exists(&workspace.sorted("Cambridge/IGCSE/Physics/2019/May-June 2019/cie_0625_s19_ms_42.PDF")));
    assert!(exists(&workspace.sorted(
        "Edexcel/IAL/Mathematics/Pure Mathematics (XMA01)/2022/Oct-Nov 2022/edx_wma11_w22_ms_10.pdf"
    )));
}

#[test]
fn test_copy_mode_keeps_sources() {
    let workspace = Workspace::new();
    let qp = workspace.add("9709_w21_qp_12.pdf", "question paper");

    let report = sort(&workspace, SortOptions { copy: true, ..Default::default() }, false);

    assert_eq!(report.copied, 1);
    assert!(exists(&qp));
    assert!(exists(&workspace.sorted("Cambridge/A-Level/Mathematics/2021/Oct-Nov 2021/cie_9709_w21_qp_12.pdf")));
}

#[test]
fn test_dry_run_changes_nothing() {
    let workspace = Workspace::new();
    let qp = workspace.add("9709_w21_qp_12.pdf", "question paper");
    let archive = workspace.add_zip("9709_s22_ms_32.zip", &[("ms.pdf", "m")]);

    let report = sort(&workspace, SortOptions { dry_run: true, ..Default::default() }, false);

    assert_eq!(report.planned, 2);
    assert!(exists(&qp));
    assert!(exists(&archive));
    assert!(!exists(&workspace.output()));
}

#[test]
fn test_existing_destination_is_left_alone() {
    let workspace = Workspace::new();
    let target = workspace.sorted("Cambridge/A-Level/Mathematics/2021/Oct-Nov 2021/cie_9709_w21_qp_12.pdf");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, "already sorted").unwrap();
    let qp = workspace.add("9709_w21_qp_12.pdf", "a newer download");

    let report = sort(&workspace, SortOptions::default(), false);

    assert_eq!(report.skipped.get(&SkipReason::Conflict), Some(&1));
    assert!(exists(&qp));
    assert_eq!(fs::read_to_string(&target).unwrap(), "already sorted");
}

#[test]
fn test_archive_with_existing_contents_skips_entries_and_removes_zip() {
    let workspace = Workspace::new();
    let folder = workspace.sorted("Cambridge/A-Level/Mathematics/2022/May-June 2022/cie_9709_s22_ms_32");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("ms.pdf"), "kept").unwrap();

    let archive = workspace.add_zip("9709_s22_ms_32.zip", &[("ms.pdf", "from zip"), ("er.pdf", "report")]);

    let report = sort(&workspace, SortOptions::default(), false);

    assert_eq!(report.extracted, 1);
    assert_eq!(fs::read_to_string(folder.join("ms.pdf")).unwrap(), "kept");
    assert_eq!(fs::read_to_string(folder.join("er.pdf")).unwrap(), "report");
    assert!(!exists(&archive));
}

#[test]
fn test_archive_in_copy_mode_is_kept() {
    let workspace = Workspace::new();
    let archive = workspace.add_zip("9709_s22_ms_32.zip", &[("ms.pdf", "from zip")]);

    sort(&workspace, SortOptions { copy: true, ..Default::default() }, false);

    assert!(exists(&archive));
    assert!(exists(&workspace.sorted(
        "Cambridge/A-Level/Mathematics/2022/May-June 2022/cie_9709_s22_ms_32/ms.pdf"
    )));
}

#[test]
fn test_rerun_over_sorted_tree_is_a_no_op() {
    let workspace = Workspace::new();
    workspace.add("9709_w21_qp_12.pdf", "question paper");
    sort(&workspace, SortOptions::default(), false);

    // Feed the output back in as input
    let classifier = workspace.classifier();
    let scan = Scanner::new(&classifier, true).scan(&[workspace.output()]);
    let mut sorter = Sorter::new(&classifier, FileMover::new(workspace.output(), SortOptions::default())).quiet(true);
    let report = sorter.run(&scan.files).unwrap();

    assert_eq!(report.skipped.get(&SkipReason::Identical), Some(&1));
    assert_eq!(report.placed(), 0);
}

#[test]
fn test_extracted_folders_are_not_resorted() {
    let workspace = Workspace::new();
    workspace.add("cie_9709_s22_ms_32/ms.pdf", "inside");
    let loose = workspace.add("0625_s22_qp_11.pdf", "loose");

    let report = sort(&workspace, SortOptions::default(), true);

    assert_eq!(report.moved, 1);
    assert!(!exists(&loose));
    assert!(exists(&workspace.downloads().join("cie_9709_s22_ms_32/ms.pdf")));
}

#[test]
fn test_unstructured_names_use_keyword_scan() {
    let workspace = Workspace::new();
    workspace.add("Cambridge 0625 Physics November 2020 Question Paper.pdf", "qp");
    workspace.add("holiday photo.jpg", "img");

    let report = sort(&workspace, SortOptions::default(), false);

    assert_eq!(report.moved, 1);
    assert_eq!(report.total_unclassified(), 1);
    assert!(exists(&workspace.sorted("Cambridge/IGCSE/Physics/2020/Oct-Nov 2020/cie_0625_w20_qp.pdf")));
}
