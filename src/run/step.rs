// src/run/step.rs

//! Step definitions a run is created from.

/// Source of the command a run executes.
///
/// Read once by the orchestrator when the run is created; the run keeps its
/// own copy of the command and parameters.
pub trait Step {
    fn command(&self) -> String;
    fn params(&self) -> Vec<String>;
}

/// A step given directly as a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    command: String,
    params: Vec<String>,
}

impl CommandStep {
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }

    /// Split an argv-style list into command and parameters.
    ///
    /// Returns `None` for an empty list.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = argv.into_iter().map(Into::into);
        let command = iter.next()?;
        Some(Self::new(command, iter.collect()))
    }
}

impl Step for CommandStep {
    fn command(&self) -> String {
        self.command.clone()
    }

    fn params(&self) -> Vec<String> {
        self.params.clone()
    }
}
