// src/attest/writer.rs

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::run::Run;
use crate::types::DEFAULT_BUILDER_ID;

use super::statement::Statement;

/// Turns a finished run into a persisted document at `path`.
///
/// Writing to an existing path replaces its content.
pub trait AttestationWriter: Send + Sync {
    fn write(&self, run: &Run, path: &Path) -> io::Result<()>;
}

/// Writes an unsigned in-toto statement as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct StatementWriter {
    builder_id: String,
}

impl StatementWriter {
    pub fn new(builder_id: impl Into<String>) -> Self {
        Self {
            builder_id: builder_id.into(),
        }
    }
}

impl Default for StatementWriter {
    fn default() -> Self {
        Self::new(DEFAULT_BUILDER_ID)
    }
}

impl AttestationWriter for StatementWriter {
    fn write(&self, run: &Run, path: &Path) -> io::Result<()> {
        let statement = Statement::from_run(run, &self.builder_id);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &statement).map_err(io::Error::other)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!(
            path = ?path,
            subjects = statement.subject.len(),
            "serialized provenance statement"
        );
        Ok(())
    }
}
