// tests/orchestrator_lifecycle.rs

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use provrun::attest::{AttestationWriter, StatementWriter};
use provrun::engine::{Orchestrator, RunOptions};
use provrun::errors::{AttestationError, ErrorKind, ExecutionError, Phase, RunError};
use provrun::run::{CommandStep, ExecutionOutcome, Run, RunState};
use provrun::types::OutputMode;
use provrun::watch::WatcherSet;
use provrun_test_utils::builders::{RunOptionsBuilder, artifact};
use provrun_test_utils::fake_runner::FakeRunner;
use provrun_test_utils::init_tracing;
use provrun_test_utils::recording_watcher::{RecordingWatcher, new_log};

type TestResult = Result<(), Box<dyn Error>>;

fn ambient_dir_unavailable() -> io::Result<PathBuf> {
    Err(io::Error::other("ambient directory was consulted"))
}

fn fixed_ambient_dir() -> io::Result<PathBuf> {
    Ok(PathBuf::from("/ambient"))
}

fn step() -> CommandStep {
    CommandStep::new("make", vec!["dist".to_string(), "-j2".to_string()])
}

fn orchestrator(runner: FakeRunner) -> Orchestrator<FakeRunner, StatementWriter> {
    Orchestrator::new(runner, StatementWriter::default()).with_current_dir(fixed_ambient_dir)
}

fn is_provenance_temp(path: &Path) -> bool {
    let name = path.file_name().unwrap().to_string_lossy();
    name.starts_with("provenance-") && name.ends_with(".json")
}

#[test]
fn create_run_copies_step_and_starts_clean() -> TestResult {
    init_tracing();
    let orch = orchestrator(FakeRunner::succeeding(""));

    let run = orch.create_run(&RunOptions::default(), &step())?;

    assert_eq!(run.command_spec().name(), "make");
    assert_eq!(run.command_spec().arguments(), ["dist", "-j2"]);
    assert_eq!(run.environment().working_directory(), Path::new("/ambient"));
    assert!(run.environment().variables().is_empty());
    assert_eq!(run.exit_status(), 0);
    assert!(run.artifacts().is_empty());
    assert!(run.start_time().is_none() && run.end_time().is_none());
    assert_eq!(run.state(), RunState::Created);
    assert!(orch.runner().calls().is_empty());
    Ok(())
}

#[test]
fn explicit_cwd_never_consults_ambient_directory() -> TestResult {
    let orch = Orchestrator::new(FakeRunner::succeeding(""), StatementWriter::default())
        .with_current_dir(ambient_dir_unavailable);
    let options = RunOptionsBuilder::new().cwd("/some/dir").build();

    let run = orch.create_run(&options, &step())?;

    assert_eq!(run.environment().working_directory(), Path::new("/some/dir"));
    Ok(())
}

#[test]
fn unresolvable_ambient_directory_is_configuration_error() {
    let orch = Orchestrator::new(FakeRunner::succeeding(""), StatementWriter::default())
        .with_current_dir(ambient_dir_unavailable);

    let err = orch.create_run(&RunOptions::default(), &step()).unwrap_err();

    assert!(matches!(err, RunError::WorkingDirectory(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn empty_command_is_rejected() {
    let orch = orchestrator(FakeRunner::succeeding(""));
    let err = orch
        .create_run(&RunOptions::default(), &CommandStep::new("", vec![]))
        .unwrap_err();
    assert!(matches!(err, RunError::InvalidCommand(_)));
}

#[test]
fn options_env_is_recorded() -> TestResult {
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptionsBuilder::new().env("CI", "1").build();

    let run = orch.create_run(&options, &step())?;

    assert_eq!(run.environment().variables().get("CI").map(String::as_str), Some("1"));
    Ok(())
}

#[tokio::test]
async fn successful_execute_records_timing_output_and_mode() -> TestResult {
    init_tracing();
    let orch = orchestrator(FakeRunner::succeeding("built\n").with_delay(Duration::from_millis(20)));
    let options = RunOptionsBuilder::new().cwd("/src").verbose(true).build();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    orch.execute(&options, &mut run).await?;

    let start = run.start_time().expect("start time set");
    let end = run.end_time().expect("end time set");
    assert!(end >= start);
    assert_eq!(run.output().map(|o| o.stdout.as_str()), Some("built\n"));
    assert_eq!(run.exit_status(), 0);
    assert_eq!(run.state(), RunState::Executed(ExecutionOutcome::Succeeded));

    let calls = orch.runner().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].command, "make");
    assert_eq!(calls[0].working_directory, PathBuf::from("/src"));
    assert_eq!(calls[0].mode, OutputMode::Verbose);
    Ok(())
}

#[tokio::test]
async fn failed_execute_keeps_timing_but_not_output() -> TestResult {
    let orch = orchestrator(FakeRunner::failing(2));
    let options = RunOptions::default();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    let err = orch.execute(&options, &mut run).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Execution);
    assert!(matches!(
        err,
        RunError::Execution(ExecutionError::Failed { code: Some(2), .. })
    ));
    assert!(run.output().is_none());
    assert!(run.start_time().is_some());
    assert!(run.end_time() >= run.start_time());
    assert_eq!(run.exit_status(), 2);
    assert_eq!(orch.runner().calls()[0].mode, OutputMode::Silent);

    // A failed run is terminal.
    let again = orch.execute(&options, &mut run).await.unwrap_err();
    assert!(matches!(again, RunError::OutOfOrder { phase: Phase::Execute, .. }));
    let attest = orch.write_attestation(&options, &mut run).unwrap_err();
    assert_eq!(attest.kind(), ErrorKind::Configuration);
    assert_eq!(orch.runner().calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn execute_before_snapshot_is_rejected() -> TestResult {
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptions::default();
    let mut run = orch.create_run(&options, &step())?;

    let err = orch.execute(&options, &mut run).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(orch.runner().calls().is_empty());
    assert!(run.start_time().is_none());
    assert_eq!(run.state(), RunState::Created);
    Ok(())
}

#[tokio::test]
async fn snapshot_after_execute_is_rejected() -> TestResult {
    let log = new_log();
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptions::default();
    let mut watchers = WatcherSet::new();
    watchers.push(RecordingWatcher::new("dist", &log));

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut watchers)?;
    orch.execute(&options, &mut run).await?;

    let err = orch.snapshot(&mut run, &mut watchers).unwrap_err();
    assert!(matches!(err, RunError::OutOfOrder { phase: Phase::Snapshot, .. }));
    assert_eq!(*log.lock().unwrap(), vec!["snap:dist"]);
    Ok(())
}

#[tokio::test]
async fn attestation_requires_collected_artifacts_when_watched() -> TestResult {
    let dir = TempDir::new()?;
    let log = new_log();
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptionsBuilder::new()
        .attestation_path(dir.path().join("p.json"))
        .build();
    let mut watchers = WatcherSet::new();
    watchers.push(RecordingWatcher::new("a", &log).with_artifacts(vec![artifact("app", "aa")]));
    watchers.push(RecordingWatcher::new("b", &log).with_artifacts(vec![artifact("lib.so", "bb")]));

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut watchers)?;
    orch.execute(&options, &mut run).await?;

    let early = orch.write_attestation(&options, &mut run).unwrap_err();
    assert!(matches!(early, RunError::OutOfOrder { phase: Phase::WriteAttestation, .. }));
    assert!(!dir.path().join("p.json").exists());

    orch.collect_artifacts(&mut run, &mut watchers)?;
    let names: Vec<&str> = run.artifacts().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["app", "lib.so"]);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["snap:a", "snap:b", "artifacts:a", "artifacts:b"]
    );

    let path = orch.write_attestation(&options, &mut run)?;
    assert_eq!(path, dir.path().join("p.json"));
    assert_eq!(run.state(), RunState::Attested);

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(doc["subject"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn failed_collection_adds_no_artifacts() -> TestResult {
    let log = new_log();
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptions::default();
    let mut watchers = WatcherSet::new();
    watchers.push(RecordingWatcher::new("a", &log).with_artifacts(vec![artifact("app", "aa")]));
    watchers.push(RecordingWatcher::new("b", &log).failing_artifacts());

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut watchers)?;
    orch.execute(&options, &mut run).await?;

    let err = orch.collect_artifacts(&mut run, &mut watchers).unwrap_err();
    match &err {
        RunError::Observation { phase, watcher, .. } => {
            assert_eq!(*phase, Phase::CollectArtifacts);
            assert_eq!(watcher, "b");
        }
        other => panic!("expected Observation error, got {other:?}"),
    }
    assert!(run.artifacts().is_empty());
    assert_eq!(run.state(), RunState::Executed(ExecutionOutcome::Succeeded));
    Ok(())
}

#[tokio::test]
async fn collecting_with_a_different_watcher_set_is_rejected() -> TestResult {
    let log = new_log();
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptions::default();
    let mut snapped = WatcherSet::new();
    snapped.push(RecordingWatcher::new("a", &log));

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut snapped)?;
    orch.execute(&options, &mut run).await?;

    let err = orch
        .collect_artifacts(&mut run, &mut WatcherSet::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    Ok(())
}

#[tokio::test]
async fn explicit_attestation_path_is_overwritten() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("provenance.json");
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptionsBuilder::new().attestation_path(&path).build();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    orch.execute(&options, &mut run).await?;

    let first = orch.write_attestation(&options, &mut run)?;
    let first_content = fs::read_to_string(&first)?;
    let second = orch.write_attestation(&options, &mut run)?;

    assert_eq!(first, second);
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    assert_eq!(fs::read_to_string(&second)?, first_content);
    Ok(())
}

#[tokio::test]
async fn temp_attestations_are_distinct_files() -> TestResult {
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptions::default();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    orch.execute(&options, &mut run).await?;

    let first = orch.write_attestation(&options, &mut run)?;
    let second = orch.write_attestation(&options, &mut run)?;

    assert_ne!(first, second);
    for path in [&first, &second] {
        assert!(path.is_file());
        assert!(is_provenance_temp(path), "unexpected name {path:?}");
        assert_eq!(path.parent(), Some(std::env::temp_dir().as_path()));
    }

    fs::remove_file(first)?;
    fs::remove_file(second)?;
    Ok(())
}

#[tokio::test]
async fn unwritable_attestation_path_is_attestation_error() -> TestResult {
    let dir = TempDir::new()?;
    // A regular file where a directory is expected.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x")?;
    let orch = orchestrator(FakeRunner::succeeding(""));
    let options = RunOptionsBuilder::new()
        .attestation_path(blocker.join("p.json"))
        .build();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    orch.execute(&options, &mut run).await?;

    let err = orch.write_attestation(&options, &mut run).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Attestation);
    assert_eq!(run.state(), RunState::Executed(ExecutionOutcome::Succeeded));
    Ok(())
}

#[tokio::test]
async fn missing_temp_dir_is_attestation_error() -> TestResult {
    let dir = TempDir::new()?;
    let orch =
        orchestrator(FakeRunner::succeeding("")).with_temp_dir(dir.path().join("missing"));
    let options = RunOptions::default();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    orch.execute(&options, &mut run).await?;

    let err = orch.write_attestation(&options, &mut run).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Attestation);
    assert!(matches!(
        err,
        RunError::Attestation(AttestationError::TempFile(_))
    ));
    assert_eq!(run.state(), RunState::Executed(ExecutionOutcome::Succeeded));
    Ok(())
}

#[tokio::test]
async fn temp_attestations_use_configured_dir() -> TestResult {
    let dir = TempDir::new()?;
    let orch = orchestrator(FakeRunner::succeeding("")).with_temp_dir(dir.path());
    let options = RunOptions::default();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    orch.execute(&options, &mut run).await?;

    let path = orch.write_attestation(&options, &mut run)?;
    assert_eq!(path.parent(), Some(dir.path()));
    assert!(is_provenance_temp(&path));
    Ok(())
}

struct RejectingWriter;

impl AttestationWriter for RejectingWriter {
    fn write(&self, _run: &Run, _path: &Path) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

#[tokio::test]
async fn failed_write_leaves_no_temp_file_behind() -> TestResult {
    let dir = TempDir::new()?;
    let orch = Orchestrator::new(FakeRunner::succeeding(""), RejectingWriter)
        .with_current_dir(fixed_ambient_dir)
        .with_temp_dir(dir.path());
    let options = RunOptions::default();

    let mut run = orch.create_run(&options, &step())?;
    orch.snapshot(&mut run, &mut WatcherSet::new())?;
    orch.execute(&options, &mut run).await?;

    let err = orch.write_attestation(&options, &mut run).unwrap_err();
    assert!(matches!(
        err,
        RunError::Attestation(AttestationError::Write { .. })
    ));
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    assert_eq!(run.state(), RunState::Executed(ExecutionOutcome::Succeeded));
    Ok(())
}
