// tests/collect.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use kaiba_batch::collect::{
    copy_input, destination_dir, ensure_dir, move_artifacts, nifti_stem, stem_artifacts,
    Snapshot,
};
use kaiba_batch::errors::KaibaError;
use kaiba_batch::fs::mock::MockFileSystem;
use kaiba_batch::fs::{FileSystem, RealFileSystem};
use kaiba_batch::types::CollisionPolicy;

type TestResult = Result<(), Box<dyn Error>>;

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn stem_strips_nifti_extensions_only_as_a_whole() {
    assert_eq!(nifti_stem(Path::new("/d/sub01.nii")), "sub01");
    assert_eq!(nifti_stem(Path::new("/d/sub01.nii.gz")), "sub01");
    assert_eq!(nifti_stem(Path::new("/d/nii.nii")), "nii");
    assert_eq!(nifti_stem(Path::new("/d/scan.dat")), "scan");
    assert_eq!(nifti_stem(Path::new("/d/infinite")), "infinite");
}

#[test]
fn destination_mirrors_relative_directory() -> TestResult {
    let dest = destination_dir(
        Path::new("/data/s1/anat/subA.nii"),
        Path::new("/data"),
        Path::new("/out"),
        "_kaiba",
    )?;
    assert_eq!(dest, PathBuf::from("/out/s1/anat/subA_kaiba"));

    let top = destination_dir(
        Path::new("/data/subB.nii"),
        Path::new("/data"),
        Path::new("/out"),
        "_kaiba",
    )?;
    assert_eq!(top, PathBuf::from("/out/subB_kaiba"));
    Ok(())
}

#[test]
fn destination_ignores_repeated_root_text_in_path() -> TestResult {
    // The root's text shows up again deeper in the path and in the file name.
    let dest = destination_dir(
        Path::new("/data/data/data.nii"),
        Path::new("/data"),
        Path::new("/out"),
        "_kaiba",
    )?;
    assert_eq!(dest, PathBuf::from("/out/data/data_kaiba"));
    Ok(())
}

#[test]
fn destination_rejects_candidates_outside_root() {
    // "/data2" starts with the text "/data" but is not inside it.
    let result = destination_dir(
        Path::new("/data2/subA.nii"),
        Path::new("/data"),
        Path::new("/out"),
        "_kaiba",
    );

    match result {
        Err(KaibaError::OutsideInputRoot { path, root }) => {
            assert_eq!(path, PathBuf::from("/data2/subA.nii"));
            assert_eq!(root, PathBuf::from("/data"));
        }
        other => panic!("Expected OutsideInputRoot, got: {:?}", other),
    }
}

#[test]
fn ensure_dir_is_idempotent() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let fs = RealFileSystem;
    let dest = tmp.path().join("out/s1/subA_kaiba");

    ensure_dir(&fs, &dest)?;
    ensure_dir(&fs, &dest)?;

    assert!(dest.is_dir());
    assert_eq!(names_in(&tmp.path().join("out/s1")), vec!["subA_kaiba"]);
    Ok(())
}

#[test]
fn ensure_dir_fails_when_a_file_is_in_the_way() -> TestResult {
    let mock = MockFileSystem::new();
    mock.add_file("/out/subA_kaiba", "not a directory");

    assert!(ensure_dir(&mock, Path::new("/out/subA_kaiba")).is_err());
    Ok(())
}

#[test]
fn copy_keeps_original_byte_identical() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let fs = RealFileSystem;
    let input = tmp.path().join("subA.nii");
    let dest = tmp.path().join("out");
    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    fs::write(&input, &payload)?;
    fs::create_dir_all(&dest)?;

    let copy = copy_input(&fs, &input, &dest)?;

    assert_eq!(copy, dest.join("subA.nii"));
    assert_eq!(fs::read(&input)?, payload);
    assert_eq!(fs::read(&copy)?, payload);
    assert_eq!(
        fs::metadata(&copy)?.modified()?,
        fs::metadata(&input)?.modified()?
    );
    Ok(())
}

#[test]
fn stem_selection_moves_exactly_matching_files() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let fs = RealFileSystem;
    let work = tmp.path().join("work");
    let dest = tmp.path().join("dest");
    fs::create_dir_all(&work)?;
    fs::create_dir_all(&dest)?;
    fs::write(work.join("sub01.csv"), b"csv")?;
    fs::write(work.join("sub01.log"), b"log")?;
    fs::write(work.join("unrelated.csv"), b"other")?;

    let artifacts = stem_artifacts(&fs, &work, "sub01", &[], "sub01.nii")?;
    assert_eq!(artifacts, vec![work.join("sub01.csv"), work.join("sub01.log")]);

    let report = move_artifacts(&fs, &artifacts, &dest, CollisionPolicy::Replace);

    assert_eq!(report.moved, vec![dest.join("sub01.csv"), dest.join("sub01.log")]);
    assert!(report.collisions.is_empty());
    assert_eq!(names_in(&dest), vec!["sub01.csv", "sub01.log"]);
    assert_eq!(names_in(&work), vec!["unrelated.csv"]);
    Ok(())
}

#[test]
fn stem_selection_adds_existing_extra_names() -> TestResult {
    let mock = MockFileSystem::new();
    mock.add_file("/work/sub01.csv", "");
    mock.add_file("/work/foo.csv", "");
    mock.add_file("/work/bar.csv", "");

    let extra = vec!["foo.csv".to_string(), "missing.csv".to_string()];
    let artifacts = stem_artifacts(&mock, Path::new("/work"), "sub01", &extra, "sub01.nii")?;

    assert_eq!(
        artifacts,
        vec![PathBuf::from("/work/foo.csv"), PathBuf::from("/work/sub01.csv")]
    );
    Ok(())
}

#[test]
fn stem_selection_never_takes_the_input_or_directories() -> TestResult {
    let mock = MockFileSystem::new();
    mock.add_file("/work/sub01.nii", "input living in the work dir");
    mock.add_file("/work/sub01.csv", "");
    mock.add_dir("/work/sub01_cache");

    let artifacts = stem_artifacts(&mock, Path::new("/work"), "sub01", &[], "sub01.nii")?;

    assert_eq!(artifacts, vec![PathBuf::from("/work/sub01.csv")]);
    Ok(())
}

#[test]
fn stem_with_glob_metacharacters_matches_literally() -> TestResult {
    let mock = MockFileSystem::new();
    mock.add_file("/work/sub[1].csv", "");
    mock.add_file("/work/sub1.csv", "");

    let artifacts = stem_artifacts(&mock, Path::new("/work"), "sub[1]", &[], "sub[1].nii")?;

    assert_eq!(artifacts, vec![PathBuf::from("/work/sub[1].csv")]);
    Ok(())
}

#[test]
fn no_replace_leaves_both_files_intact() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let fs = RealFileSystem;
    let work = tmp.path().join("work");
    let dest = tmp.path().join("dest");
    fs::create_dir_all(&work)?;
    fs::create_dir_all(&dest)?;
    fs::write(work.join("sub01.csv"), b"new")?;
    fs::write(work.join("sub01.log"), b"log")?;
    fs::write(dest.join("sub01.csv"), b"old")?;

    let artifacts = vec![work.join("sub01.csv"), work.join("sub01.log")];
    let report = move_artifacts(&fs, &artifacts, &dest, CollisionPolicy::NoReplace);

    assert_eq!(report.collisions, vec![work.join("sub01.csv")]);
    assert_eq!(report.moved, vec![dest.join("sub01.log")]);
    assert_eq!(fs::read(dest.join("sub01.csv"))?, b"old");
    assert_eq!(fs::read(work.join("sub01.csv"))?, b"new");
    Ok(())
}

#[test]
fn replace_overwrites_existing_destination_file() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let fs = RealFileSystem;
    let work = tmp.path().join("work");
    let dest = tmp.path().join("dest");
    fs::create_dir_all(&work)?;
    fs::create_dir_all(&dest)?;
    fs::write(work.join("sub01.csv"), b"new")?;
    fs::write(dest.join("sub01.csv"), b"old")?;

    let report = move_artifacts(
        &fs,
        &[work.join("sub01.csv")],
        &dest,
        CollisionPolicy::Replace,
    );

    assert_eq!(report.moved, vec![dest.join("sub01.csv")]);
    assert_eq!(fs::read(dest.join("sub01.csv"))?, b"new");
    assert!(!work.join("sub01.csv").exists());
    Ok(())
}

#[test]
fn snapshot_reports_only_new_files() -> TestResult {
    let mock = MockFileSystem::new();
    mock.add_file("/work/sub01.csv", "stale from an earlier run");
    mock.add_file("/work/notes.txt", "");

    let before = Snapshot::take(&mock, Path::new("/work"))?;
    assert!(before.contains(Path::new("/work/sub01.csv")));

    // Simulate the tool: overwrite the stale file and add new ones.
    mock.write(Path::new("/work/sub01.csv"), b"fresh")?;
    mock.write(Path::new("/work/result.txt"), b"r")?;
    mock.write(Path::new("/work/sub01.nii"), b"input copy")?;

    let new = before.new_files(&mock, Path::new("/work"), "sub01.nii")?;

    assert_eq!(new, vec![PathBuf::from("/work/result.txt")]);
    Ok(())
}

#[test]
fn failed_move_is_recorded_and_the_rest_still_move() {
    let mock = MockFileSystem::new();
    mock.add_file("/work/foo.csv", "summary");
    mock.add_file("/work/sub01.csv", "csv");
    mock.add_file("/work/sub01.log", "log");
    mock.add_dir("/dest/sub01.csv");

    let artifacts = vec![
        PathBuf::from("/work/foo.csv"),
        PathBuf::from("/work/sub01.csv"),
        PathBuf::from("/work/sub01.log"),
    ];
    let report = move_artifacts(&mock, &artifacts, Path::new("/dest"), CollisionPolicy::Replace);

    assert!(!report.is_complete());
    assert_eq!(
        report.moved,
        vec![PathBuf::from("/dest/foo.csv"), PathBuf::from("/dest/sub01.log")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, PathBuf::from("/work/sub01.csv"));
    assert!(mock.is_file(Path::new("/work/sub01.csv")));
    assert!(!mock.exists(Path::new("/work/sub01.log")));
}
