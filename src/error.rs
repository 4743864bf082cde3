use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Faults raised while generating or persisting XML reports.
///
/// Test failures and errors are never surfaced here; they are recorded as
/// data on the collector. Only the reporter's own I/O and serialization can
/// fail, and those faults are fatal to report generation (files already
/// written for other suites are not rolled back).
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report directory '{path}'")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report file '{path}'")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize XML report")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
