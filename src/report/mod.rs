//! Grouping of outcome records by suite and report persistence.

use indexmap::IndexMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::capture::CapturedOutput;
use crate::error::ReportError;
use crate::outcome::OutcomeRecord;

mod xml;


pub use xml::write_suite_document;

/// Where generated reports end up.
pub enum ReportDestination {
    /// One `TEST-<suite>.xml` file per suite inside this directory, created
    /// if absent. Existing files of the same name are overwritten. Suite
    /// names are not sanitized for filesystem safety; that is the caller's
    /// responsibility.
    Directory(PathBuf),

    /// Every suite document serialized to this stream in sequence. The
    /// caller is responsible for understanding that multiple documents are
    /// concatenated.
    Stream(Box<dyn Write>),
}

impl ReportDestination {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        ReportDestination::Directory(path.into())
    }

    pub fn stream(writer: impl Write + 'static) -> Self {
        ReportDestination::Stream(Box::new(writer))
    }
}

/// Partitions every recorded outcome by suite key.
///
/// Insertion order within a suite is execution order. Suites iterate in
/// first-occurrence order; consumers must not depend on it.
pub fn group_by_suite(records: &[OutcomeRecord]) -> IndexMap<&str, Vec<&OutcomeRecord>> {
    let mut groups: IndexMap<&str, Vec<&OutcomeRecord>> = IndexMap::new();
    for record in records {
        groups.entry(record.id.suite.as_str()).or_default().push(record);
    }
    groups
}

/// Renders one suite document to a string.
pub fn suite_document_string(
    suite: &str,
    records: &[&OutcomeRecord],
    captured: &CapturedOutput,
) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    write_suite_document(suite, records, captured, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Generates one XML document per suite and persists it to the destination.
///
/// Zero recorded outcomes produce zero documents. An I/O fault is fatal and
/// propagated; documents already persisted for earlier suites are left as-is.
pub fn generate(
    records: &[OutcomeRecord],
    captured: &CapturedOutput,
    destination: &mut ReportDestination,
) -> Result<(), ReportError> {
    let groups = group_by_suite(records);

    match destination {
        ReportDestination::Directory(dir) => {
            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|source| ReportError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
            }

            for (suite, suite_records) in &groups {
                let path = dir.join(format!("TEST-{suite}.xml"));
                let file = File::create(&path).map_err(|source| ReportError::WriteFile {
                    path: path.clone(),
                    source,
                })?;
                let mut writer = BufWriter::new(file);
                write_suite_document(suite, suite_records, captured, &mut writer)?;
                writer.flush()?;
            }
        }
        ReportDestination::Stream(writer) => {
            for (suite, suite_records) in &groups {
                write_suite_document(suite, suite_records, captured, writer)?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}
