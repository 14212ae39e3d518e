use std::sync::{Arc, Mutex};

use provrun::errors::ObservationError;
use provrun::watch::{Artifact, Watcher};

/// Shared, ordered log of watcher calls: `"snap:<name>"`, `"artifacts:<name>"`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A watcher that records calls into a shared log and returns canned
/// artifacts. Can be told to fail on `snap` or on `artifacts`.
#[derive(Debug)]
pub struct RecordingWatcher {
    name: String,
    log: CallLog,
    artifacts: Vec<Artifact>,
    fail_snap: bool,
    fail_artifacts: bool,
}

impl RecordingWatcher {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            artifacts: Vec::new(),
            fail_snap: false,
            fail_artifacts: false,
        }
    }

    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn failing_snap(mut self) -> Self {
        self.fail_snap = true;
        self
    }

    pub fn failing_artifacts(mut self) -> Self {
        self.fail_artifacts = true;
        self
    }
}

impl Watcher for RecordingWatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn snap(&mut self) -> Result<(), ObservationError> {
        self.log.lock().unwrap().push(format!("snap:{}", self.name));
        if self.fail_snap {
            return Err(ObservationError::Other(anyhow::anyhow!(
                "{} refused to snapshot",
                self.name
            )));
        }
        Ok(())
    }

    fn artifacts(&mut self) -> Result<Vec<Artifact>, ObservationError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("artifacts:{}", self.name));
        if self.fail_artifacts {
            return Err(ObservationError::NoBaseline);
        }
        Ok(self.artifacts.clone())
    }
}
