use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use provrun::errors::ExecutionError;
use provrun::exec::{CommandOutput, CommandRunner, RunFuture};
use provrun::run::{CommandSpec, ExecutionEnvironment};
use provrun::types::OutputMode;

/// One invocation seen by a [`FakeRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCall {
    pub command: String,
    pub arguments: Vec<String>,
    pub working_directory: PathBuf,
    pub mode: OutputMode,
}

#[derive(Debug, Clone)]
enum Response {
    Succeed(String),
    Fail(i32),
}

/// A fake command runner that:
/// - records every invocation
/// - returns canned output (or a canned failure) after an optional delay.
#[derive(Debug, Clone)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<FakeCall>>>,
    response: Response,
    delay: Duration,
}

impl FakeRunner {
    pub fn succeeding(stdout: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response: Response::Succeed(stdout.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(code: i32) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response: Response::Fail(code),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        env: &'a ExecutionEnvironment,
        mode: OutputMode,
    ) -> RunFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(FakeCall {
                command: spec.name().to_string(),
                arguments: spec.arguments().to_vec(),
                working_directory: env.working_directory().to_path_buf(),
                mode,
            });

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match &self.response {
                Response::Succeed(stdout) => Ok(CommandOutput {
                    stdout: stdout.clone(),
                    stderr: String::new(),
                    exit_code: 0,
                }),
                Response::Fail(code) => Err(ExecutionError::Failed {
                    command: spec.display_line(),
                    code: Some(*code),
                    stderr: "fake failure".to_string(),
                }),
            }
        })
    }
}
