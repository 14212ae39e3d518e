// src/lib.rs

pub mod attest;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod run;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::attest::StatementWriter;
use crate::cli::CliArgs;
use crate::config::{ConfigFile, RawConfigFile, WatchConfig, load_from_path, resolve_config_path};
use crate::engine::{Orchestrator, RunOptions};
use crate::errors::ProvrunError;
use crate::exec::ProcessRunner;
use crate::run::{CommandStep, Step};
use crate::types::DEFAULT_BUILDER_ID;
use crate::watch::{DirectoryWatcher, PathFilter, WatcherSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - the watcher set
/// - the orchestrator with the process runner and statement writer
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;

    let step = CommandStep::from_argv(args.command.iter().cloned())
        .context("no command given")?;
    let options = run_options(&args, &cfg)?;

    let base_dir = match &options.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("getting current directory")?,
    };
    let mut watchers = build_watchers(&cfg, &base_dir)?;

    let builder_id = args
        .builder_id
        .clone()
        .or_else(|| cfg.run_section().builder_id.clone())
        .unwrap_or_else(|| DEFAULT_BUILDER_ID.to_string());

    if args.dry_run {
        print_dry_run(&step, &options, &watchers, &builder_id);
        return Ok(());
    }

    let orchestrator = Orchestrator::new(ProcessRunner::new(), StatementWriter::new(builder_id));
    let recorded = orchestrator.record(&options, &step, &mut watchers).await?;

    info!(
        artifacts = recorded.run.artifacts().len(),
        exit_status = recorded.run.exit_status(),
        path = %recorded.attestation_path.display(),
        "run recorded"
    );
    Ok(())
}

/// Load the config file (if any) and merge CLI watchers into it before
/// validating.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match resolve_config_path(args.config.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_from_path(&path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => RawConfigFile::default(),
    };

    raw.watch
        .extend(args.watch.iter().map(|dir| WatchConfig::new(dir.clone())));

    Ok(ConfigFile::try_from(raw)?)
}

/// CLI flags win over `[run]` values.
fn run_options(args: &CliArgs, cfg: &ConfigFile) -> Result<RunOptions> {
    let section = cfg.run_section();

    let cwd = match args.cwd.clone().or_else(|| section.cwd.clone()) {
        Some(dir) => Some(
            std::path::absolute(&dir)
                .with_context(|| format!("resolving working directory {}", dir.display()))?,
        ),
        None => None,
    };

    Ok(RunOptions {
        cwd,
        verbose: args.verbose || section.verbose.unwrap_or(false),
        attestation_path: args
            .attestation
            .clone()
            .or_else(|| section.attestation_path.clone()),
        env: cfg.env().clone(),
    })
}

/// One `DirectoryWatcher` per configured entry, in config order. Relative
/// paths are taken from `base_dir`.
pub fn build_watchers(cfg: &ConfigFile, base_dir: &Path) -> crate::errors::Result<WatcherSet> {
    let mut watchers = WatcherSet::new();
    for watch in cfg.watchers() {
        let name = watch.effective_name();
        let root: PathBuf = if watch.path.is_absolute() {
            watch.path.clone()
        } else {
            base_dir.join(&watch.path)
        };
        let filter = PathFilter::new(&watch.include, &watch.exclude)
            .map_err(|e| ProvrunError::ConfigError(format!("watcher '{name}': {e}")))?;
        watchers.push(DirectoryWatcher::new(name, root, filter));
    }
    Ok(watchers)
}

fn print_dry_run(step: &CommandStep, options: &RunOptions, watchers: &WatcherSet, builder_id: &str) {
    println!("provrun dry-run");
    println!("  command: {} {}", step.command(), step.params().join(" "));
    match &options.cwd {
        Some(dir) => println!("  cwd: {}", dir.display()),
        None => println!("  cwd: (current directory)"),
    }
    println!("  verbose: {}", options.verbose);
    match &options.attestation_path {
        Some(path) => println!("  attestation: {}", path.display()),
        None => println!("  attestation: (temp provenance-*.json)"),
    }
    println!("  builder_id: {builder_id}");
    if !options.env.is_empty() {
        println!("  env:");
        for (key, value) in options.env.iter() {
            println!("    {key}={value}");
        }
    }
    println!();

    println!("watchers ({}):", watchers.len());
    for name in watchers.names() {
        println!("  - {name}");
    }

    debug!("dry-run complete (no execution)");
}
