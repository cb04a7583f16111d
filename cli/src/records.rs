//! Reading structured log files back.
//!
//! Active files are plain NDJSON; rotated files may be gzip-compressed.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use shared::logging::{rotated_siblings, Severity, StructuredRecord};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Records read from one or more files.
#[derive(Debug, Default)]
pub struct Scan {
    /// Parsed records in file order.
    pub records: Vec<StructuredRecord>,
    /// Non-empty lines that did not parse.
    pub malformed: usize,
}

/// Lists the files to read for `active`, oldest first.
///
/// Rotated siblings come before the active file. A missing active file is
/// only an error when there is nothing else to read.
pub fn log_files(active: &Path, include_rotated: bool) -> Result<Vec<PathBuf>> {
    let mut files = if include_rotated {
        rotated_siblings(active)
            .with_context(|| format!("Failed to list rotated files of {}", active.display()))?
    } else {
        Vec::new()
    };

    if active.exists() {
        files.push(active.to_path_buf());
    }

    if files.is_empty() {
        bail!("No structured log found at {}", active.display());
    }
    Ok(files)
}

fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parses every line of `files`.
pub fn scan(files: &[PathBuf]) -> Result<Scan> {
    let mut scan = Scan::default();

    for path in files {
        for (index, line) in open(path)?.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<StructuredRecord>(&line) {
                Ok(record) => scan.records.push(record),
                Err(e) => {
                    tracing::debug!(file = %path.display(), line = index + 1, error = %e, "Skipping malformed line");
                    scan.malformed += 1;
                }
            }
        }
    }

    Ok(scan)
}

/// Records carrying `correlation_id`, in file order.
pub fn trace<'a>(scan: &'a Scan, correlation_id: &'a str) -> impl Iterator<Item = &'a StructuredRecord> {
    scan.records
        .iter()
        .filter(move |record| record.correlation_id == correlation_id)
}

/// One record in the text file layout.
pub fn format_record(record: &StructuredRecord) -> String {
    let mut line = format!(
        "{} | {:<8} | {}:{}:{} - {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level.as_str(),
        record.logger,
        record.function,
        record.line,
        record.message,
    );

    for (key, value) in &record.extra {
        match value {
            serde_json::Value::String(s) => line.push_str(&format!(" {key}={s}")),
            other => line.push_str(&format!(" {key}={other}")),
        }
    }
    line
}

/// Level and correlation counts.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records per level.
    pub per_level: BTreeMap<Severity, usize>,
    /// Distinct correlation ids, not counting `N/A`.
    pub correlation_ids: usize,
    /// Records written outside any request.
    pub uncorrelated: usize,
    /// Lines that did not parse.
    pub malformed: usize,
}

impl Summary {
    /// Summarizes a scan.
    pub fn from_scan(scan: &Scan) -> Self {
        let mut per_level = BTreeMap::new();
        let mut ids = HashSet::new();
        let mut uncorrelated = 0;

        for record in &scan.records {
            *per_level.entry(record.level).or_insert(0) += 1;
            if record.correlation_id == shared::correlation::ABSENT_CORRELATION_ID {
                uncorrelated += 1;
            } else {
                ids.insert(record.correlation_id.as_str());
            }
        }

        Self {
            per_level,
            correlation_ids: ids.len(),
            uncorrelated,
            malformed: scan.malformed,
        }
    }

    /// Total parsed records.
    pub fn total(&self) -> usize {
        self.per_level.values().sum()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "records: {}", self.total())?;
        for (level, count) in &self.per_level {
            writeln!(f, "  {:<8} {count}", level.as_str())?;
        }
        writeln!(f, "correlation ids: {}", self.correlation_ids)?;
        writeln!(f, "uncorrelated: {}", self.uncorrelated)?;
        write!(f, "malformed lines: {}", self.malformed)
    }
}
