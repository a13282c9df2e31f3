use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::migrate::types::{MigrationOutcome, Status};

/// Summary of one run, written once at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub successful_uploads: Vec<MigrationOutcome>,
    pub failed_uploads: Vec<MigrationOutcome>,
}

impl Report {
    pub fn push(&mut self, outcome: MigrationOutcome) {
        match outcome.status {
            Status::Success => self.successful_uploads.push(outcome),
            Status::Failed => self.failed_uploads.push(outcome),
        }
    }

    pub fn total(&self) -> usize {
        self.successful_uploads.len() + self.failed_uploads.len()
    }
}

/// Pretty-print the report to `path`, replacing any previous report.
pub fn write(path: &Path, report: &Report) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, report).context("encode report")?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}
