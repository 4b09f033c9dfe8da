// tests/real_process.rs

#![cfg(unix)]

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::fake_converter::NoConverter;
use crate::common::init_tracing;

use std::error::Error;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use kaiba_batch::engine::Runner;
use kaiba_batch::exec::{
    run_process, CommandConverter, InvocationOutcome, KaibaBackend, RealKaibaBackend,
    SeriesConverter,
};
use kaiba_batch::fs::RealFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

/// Stand-in for kaiba: `-i <input> [-v] -o <name>`, writes
/// `<stem>.csv`, `<stem>.log` and `<name>.csv` into the current directory.
const FAKE_KAIBA: &str = r#"#!/bin/sh
input="$2"
if [ "$3" = "-v" ]; then name="$5"; else name="$4"; fi
stem=$(basename "$input" .nii)
echo "processing $input"
echo "stats for $stem" > "$stem.csv"
echo "log for $stem" > "$stem.log"
echo "summary" > "$name.csv"
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

#[tokio::test]
async fn exit_codes_become_outcomes() {
    init_tracing();
    let cwd = Path::new(".");

    let ok = run_process("ok", "sh", &os_args(&["-c", "exit 0"]), cwd, None).await;
    assert_eq!(ok, InvocationOutcome::Success);

    let failed = run_process("fail", "sh", &os_args(&["-c", "exit 3"]), cwd, None).await;
    assert_eq!(failed, InvocationOutcome::Failed(3));
}

#[tokio::test]
async fn missing_binary_is_spawn_failure() {
    init_tracing();
    let outcome = run_process(
        "missing",
        "kaiba-batch-definitely-missing-binary",
        &[],
        Path::new("."),
        None,
    )
    .await;

    assert!(
        matches!(outcome, InvocationOutcome::SpawnFailed(_)),
        "got {:?}",
        outcome
    );
}

#[tokio::test]
async fn slow_process_times_out() {
    init_tracing();
    let outcome = run_process(
        "slow",
        "sleep",
        &os_args(&["5"]),
        Path::new("."),
        Some(Duration::from_millis(200)),
    )
    .await;

    assert_eq!(outcome, InvocationOutcome::TimedOut);
}

#[tokio::test]
async fn timeout_is_not_held_up_by_child_processes() {
    init_tracing();
    // The shell's `sleep` child inherits the output pipes.
    let started = Instant::now();
    let outcome = run_process(
        "wrapped",
        "sh",
        &os_args(&["-c", "sleep 6; echo done"]),
        Path::new("."),
        Some(Duration::from_millis(300)),
    )
    .await;

    assert_eq!(outcome, InvocationOutcome::TimedOut);
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn noisy_output_is_drained() {
    init_tracing();
    // Far more than a pipe buffer on both streams.
    let script = "i=0; while [ $i -lt 5000 ]; do echo line $i; echo err $i >&2; i=$((i+1)); done";
    let outcome = run_process("noisy", "sh", &os_args(&["-c", script]), Path::new("."), None).await;

    assert_eq!(outcome, InvocationOutcome::Success);
}

#[tokio::test]
async fn full_run_with_real_process_and_disk() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path();
    let bin = root.join("bin");
    let data = root.join("data");
    let work = root.join("work");
    let out = root.join("out");
    fs::create_dir_all(&bin)?;
    fs::create_dir_all(data.join("s1"))?;
    fs::create_dir_all(&work)?;
    fs::write(data.join("s1/sub01.nii"), b"volume 1")?;
    fs::write(data.join("other.nii"), b"ignored")?;
    fs::write(work.join("unrelated.csv"), b"keep me")?;
    let kaiba = write_script(&bin, "kaiba", FAKE_KAIBA);

    let cfg = ConfigFileBuilder::new()
        .with_paths(&data, &out, &work)
        .prefix("sub")
        .program(kaiba.to_str().unwrap())
        .verbose(true)
        .build();

    let mut runner = Runner::new(cfg, Arc::new(RealFileSystem), RealKaibaBackend::new(), NoConverter);
    let summary = runner.run().await?;

    assert_eq!(summary.total(), 1);
    assert!(summary.is_success(), "summary: {:?}", summary);

    let dest = out.join("s1/sub01_kaiba");
    assert_eq!(fs::read(dest.join("sub01.nii"))?, b"volume 1");
    assert_eq!(fs::read_to_string(dest.join("sub01.csv"))?, "stats for sub01\n");
    assert_eq!(fs::read_to_string(dest.join("sub01.log"))?, "log for sub01\n");
    assert_eq!(fs::read_to_string(dest.join("foo.csv"))?, "summary\n");

    assert_eq!(fs::read(data.join("s1/sub01.nii"))?, b"volume 1");
    assert_eq!(fs::read(work.join("unrelated.csv"))?, b"keep me");
    assert!(!work.join("sub01.csv").exists());
    assert!(!out.join("other_kaiba").exists());
    Ok(())
}

#[tokio::test]
async fn failing_tool_is_reported_not_collected() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path();
    let data = root.join("data");
    let work = root.join("work");
    let out = root.join("out");
    fs::create_dir_all(&data)?;
    fs::create_dir_all(&work)?;
    fs::write(data.join("sub01.nii"), b"volume 1")?;
    let kaiba = write_script(root, "kaiba", "#!/bin/sh\necho boom >&2\nexit 2\n");

    let cfg = ConfigFileBuilder::new()
        .with_paths(&data, &out, &work)
        .prefix("sub")
        .program(kaiba.to_str().unwrap())
        .build();

    let mut runner = Runner::new(cfg, Arc::new(RealFileSystem), RealKaibaBackend::new(), NoConverter);
    let summary = runner.run().await?;

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.candidates[0].outcome, InvocationOutcome::Failed(2));
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn backend_passes_arguments_in_order() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let work = tmp.path().join("work");
    fs::create_dir_all(&work)?;
    let recorder = write_script(
        tmp.path(),
        "record",
        "#!/bin/sh\nfor a in \"$@\"; do echo \"$a\"; done > args.txt\n",
    );

    let cfg = ConfigFileBuilder::new()
        .with_paths(tmp.path(), tmp.path().join("out"), &work)
        .program(recorder.to_str().unwrap())
        .verbose(true)
        .output_name("bar")
        .build();
    let command = kaiba_batch::exec::KaibaCommand::from_config(&cfg);
    let input = tmp.path().join("with space.nii");
    let invocation = kaiba_batch::exec::Invocation::new(&command, &input, &work);

    let outcome = RealKaibaBackend::new().invoke(invocation).await?;
    assert_eq!(outcome, InvocationOutcome::Success);

    let recorded = fs::read_to_string(work.join("args.txt"))?;
    let expected = format!("-i\n{}\n-v\n-o\nbar\n", input.display());
    assert_eq!(recorded, expected);
    Ok(())
}

#[tokio::test]
async fn command_converter_fills_placeholders_and_checks_output() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let series = tmp.path().join("subE.dat");
    let output = tmp.path().join("subE_transformed.nii");
    fs::write(&series, b"dicom bytes")?;

    let template = vec![
        "-c".to_string(),
        "cp \"$0\" \"$1\"".to_string(),
        "{input}".to_string(),
        "{output}".to_string(),
    ];
    let mut converter = CommandConverter::new("sh", template);
    assert_eq!(
        converter.args_for(&series, &output),
        vec![
            OsString::from("-c"),
            OsString::from("cp \"$0\" \"$1\""),
            series.clone().into_os_string(),
            output.clone().into_os_string(),
        ]
    );

    assert!(converter.convert(&series, &output).await?);
    assert_eq!(fs::read(&output)?, b"dicom bytes");

    // Exit 0 without writing the output still counts as a failed conversion.
    let other = tmp.path().join("never_written.nii");
    let mut lazy = CommandConverter::new("sh", vec!["-c".to_string(), "exit 0".to_string()]);
    assert!(!lazy.convert(&series, &other).await?);

    let mut broken = CommandConverter::new("sh", vec!["-c".to_string(), "exit 1".to_string()]);
    assert!(!broken.convert(&series, &output).await?);
    Ok(())
}
