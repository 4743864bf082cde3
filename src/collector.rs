//! The event sink driven by the test-execution loop.

use colored::Colorize;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::outcome::{FailureDetail, OutcomeRecord, Status, TestId};

/// Sequential callback protocol consumed from the test-execution collaborator.
///
/// For every test, `test_started` fires first, then exactly one of
/// `test_succeeded`, `test_failed` or `test_errored`, then `test_finished`,
/// all before the next test's `test_started`. Assertion-style failures arrive
/// via `test_failed`; any other uncaught fault via `test_errored`.
pub trait TestObserver {
    fn test_started(&mut self, test: &TestId);

    fn test_succeeded(&mut self, test: &TestId);

    fn test_failed(&mut self, test: &TestId, detail: FailureDetail);

    fn test_errored(&mut self, test: &TestId, detail: FailureDetail);

    fn test_finished(&mut self, test: &TestId);
}

/// Outcome staged by a success/failure/error callback, finalized into an
/// [`OutcomeRecord`] when the matching `test_finished` fires.
struct Pending {
    id: TestId,
    status: Status,
}

/// Accumulates outcome records over one sequential pass of the test
/// collection, echoing progress to a console stream as it goes.
///
/// With `verbose` set, each test gets its own line (`  test_ok (pkg.MyTests)
/// ... OK (0.004s)`); otherwise a compact dot per test. With `elapsed_times`
/// unset, every record reports zero elapsed time regardless of wall-clock
/// measurements, so generated reports are reproducible across runs.
pub struct ResultCollector<W: Write> {
    stream: W,
    verbose: bool,
    descriptions: bool,
    elapsed_times: bool,
    started_at: Option<Instant>,
    pending: Option<Pending>,
    records: Vec<OutcomeRecord>,
    tests_run: usize,
}

impl<W: Write> ResultCollector<W> {
    pub fn new(stream: W, verbose: bool, descriptions: bool, elapsed_times: bool) -> Self {
        ResultCollector {
            stream,
            verbose,
            descriptions,
            elapsed_times,
            started_at: None,
            pending: None,
            records: Vec::new(),
            tests_run: 0,
        }
    }

    /// Every record accumulated so far, in execution order.
    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<OutcomeRecord> {
        self.records
    }

    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_failure()).count()
    }

    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_error()).count()
    }

    pub fn was_successful(&self) -> bool {
        self.records.iter().all(|r| r.status.is_success())
    }

    fn stage(&mut self, test: &TestId, status: Status) {
        self.pending = Some(Pending {
            id: test.clone(),
            status,
        });
    }

    fn console_name(&self, test: &TestId) -> String {
        if self.descriptions {
            test.description()
        } else {
            test.full_name()
        }
    }
}

impl<W: Write> TestObserver for ResultCollector<W> {
    fn test_started(&mut self, test: &TestId) {
        self.started_at = Some(Instant::now());
        self.tests_run += 1;

        if self.verbose {
            let name = self.console_name(test);
            write!(self.stream, "  {name} ... ").unwrap();
            self.stream.flush().unwrap();
        }
    }

    fn test_succeeded(&mut self, test: &TestId) {
        self.stage(test, Status::Success);
    }

    fn test_failed(&mut self, test: &TestId, detail: FailureDetail) {
        self.stage(test, Status::Failure(detail));
    }

    fn test_errored(&mut self, test: &TestId, detail: FailureDetail) {
        self.stage(test, Status::Error(detail));
    }

    fn test_finished(&mut self, _test: &TestId) {
        // A finish with nothing staged is a no-op, never an error.
        let Some(pending) = self.pending.take() else {
            return;
        };

        let elapsed = if self.elapsed_times {
            self.started_at
                .map(|started| started.elapsed())
                .unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        };

        if self.verbose {
            let label = match &pending.status {
                Status::Success => pending.status.label().bold().green(),
                _ => pending.status.label().bold().red(),
            };
            writeln!(self.stream, "{} ({:.3}s)", label, elapsed.as_secs_f64()).unwrap();
        } else {
            write!(self.stream, "{}", pending.status.dot()).unwrap();
            self.stream.flush().unwrap();
        }

        self.records
            .push(OutcomeRecord::new(pending.id, pending.status, elapsed));
    }
}
