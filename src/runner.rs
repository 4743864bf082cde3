//! One complete pass over a test collection: capture, collect, summarize,
//! generate reports, restore.

use colored::Colorize;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::capture::OutputCapture;
use crate::collector::ResultCollector;
use crate::error::ReportError;
use crate::format::pluralize;
use crate::outcome::OutcomeRecord;
use crate::report::{self, ReportDestination};
use crate::suite::TestCollection;

const SEPARATOR_HEAVY: &str =
    "======================================================================";
const SEPARATOR_LIGHT: &str =
    "----------------------------------------------------------------------";

/// The completed state of one run, handed back for callers to inspect
/// (e.g. to decide a process exit code). The runner itself never terminates
/// the process.
#[derive(Debug)]
pub struct RunResults {
    pub records: Vec<OutcomeRecord>,
    pub tests_run: usize,
    pub duration: Duration,
}

impl RunResults {
    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_failure()).count()
    }

    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_error()).count()
    }

    pub fn was_successful(&self) -> bool {
        self.records.iter().all(|r| r.status.is_success())
    }
}

/// Drives a test collection to completion and writes one JUnit-style XML
/// document per suite to the configured destination.
///
/// The console stream defaults to the process stderr and is deliberately not
/// routed through output capture, so the runner's own progress output stays
/// visible while test output is being captured.
pub struct XmlTestRunner<W: Write> {
    output: ReportDestination,
    stream: W,
    verbose: bool,
    descriptions: bool,
    elapsed_times: bool,
}

impl XmlTestRunner<io::Stderr> {
    pub fn new(output: ReportDestination) -> Self {
        XmlTestRunner {
            output,
            stream: io::stderr(),
            verbose: false,
            descriptions: true,
            elapsed_times: true,
        }
    }
}

impl<W: Write> XmlTestRunner<W> {
    /// Replaces the console stream the runner and collector write to.
    pub fn with_stream<W2: Write>(self, stream: W2) -> XmlTestRunner<W2> {
        XmlTestRunner {
            output: self.output,
            stream,
            verbose: self.verbose,
            descriptions: self.descriptions,
            elapsed_times: self.elapsed_times,
        }
    }

    /// One console line per test instead of a dot per test.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Use pretty descriptions rather than dotted full names in verbose lines.
    pub fn descriptions(mut self, descriptions: bool) -> Self {
        self.descriptions = descriptions;
        self
    }

    /// When disabled, every timing attribute in generated reports is forced
    /// to `0.000`, making report bytes reproducible across runs.
    pub fn elapsed_times(mut self, elapsed_times: bool) -> Self {
        self.elapsed_times = elapsed_times;
        self
    }

    /// Runs the collection once.
    ///
    /// The standard channels are captured for the whole pass and restored on
    /// every exit path, including a fault during report generation.
    pub fn run(&mut self, collection: &dyn TestCollection) -> Result<RunResults, ReportError> {
        let capture = OutputCapture::begin();

        writeln!(self.stream)?;
        writeln!(self.stream, "Running tests...")?;
        writeln!(self.stream, "{SEPARATOR_LIGHT}")?;

        let started = Instant::now();
        let mut collector = ResultCollector::new(
            &mut self.stream,
            self.verbose,
            self.descriptions,
            self.elapsed_times,
        );
        collection.run(&mut collector);
        let duration = started.elapsed();

        let tests_run = collector.tests_run();
        let results = RunResults {
            records: collector.into_records(),
            tests_run,
            duration,
        };

        self.print_error_list(&results)?;
        self.print_summary(&results)?;

        writeln!(self.stream, "Generating XML reports...")?;
        let captured = capture.contents();
        report::generate(&results.records, &captured, &mut self.output)?;

        drop(capture);
        Ok(results)
    }

    /// Tracebacks for every failure and error, in execution order.
    fn print_error_list(&mut self, results: &RunResults) -> Result<(), ReportError> {
        if !self.verbose {
            writeln!(self.stream)?;
        }

        for record in &results.records {
            let Some(detail) = record.status.detail() else {
                continue;
            };

            writeln!(self.stream, "{SEPARATOR_HEAVY}")?;
            writeln!(
                self.stream,
                "{} [{:.3}s]: {}",
                record.status.label().bold().red(),
                record.elapsed.as_secs_f64(),
                record.id.description()
            )?;
            writeln!(self.stream, "{SEPARATOR_LIGHT}")?;
            writeln!(self.stream, "{}", detail.trace)?;
        }

        Ok(())
    }

    fn print_summary(&mut self, results: &RunResults) -> Result<(), ReportError> {
        writeln!(self.stream, "{SEPARATOR_LIGHT}")?;
        writeln!(
            self.stream,
            "Ran {} {} in {:.3}s",
            results.tests_run,
            pluralize!("test", results.tests_run),
            results.duration.as_secs_f64()
        )?;
        writeln!(self.stream)?;

        if results.was_successful() {
            writeln!(self.stream, "{}", "OK".bold().green())?;
        } else {
            let mut counts = Vec::new();
            if results.failure_count() > 0 {
                counts.push(format!("failures={}", results.failure_count()));
            }
            if results.error_count() > 0 {
                counts.push(format!("errors={}", results.error_count()));
            }
            writeln!(
                self.stream,
                "{} ({})",
                "FAILED".bold().red(),
                counts.join(", ")
            )?;
        }

        writeln!(self.stream)?;
        Ok(())
    }
}
