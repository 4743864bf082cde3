//! A sequential test runner that collects per-test outcomes, captures run
//! output, and writes one JUnit-style XML report per test suite — the format
//! CI systems such as Jenkins, GitHub Actions and GitLab CI consume.
//!
//! Test discovery and CLI concerns stay with the caller: register tests on a
//! [`TestSuite`] (or implement [`TestCollection`] yourself), hand the
//! collection to an [`XmlTestRunner`], and map the returned [`RunResults`]
//! to an exit code.
//!
//! ```no_run
//! use junit_runner::{ReportDestination, TestSuite, XmlTestRunner};
//!
//! let mut suite = TestSuite::new("pkg.MyTests");
//! suite.add_test("test_ok", || Ok(()));
//! suite.add_test("test_bad", || {
//!     assert_eq!(1 + 1, 3, "1 != 2");
//!     Ok(())
//! });
//!
//! let mut runner = XmlTestRunner::new(ReportDestination::directory("test-reports"));
//! let results = runner.run(&suite)?;
//! std::process::exit(if results.was_successful() { 0 } else { 1 });
//! # Ok::<(), junit_runner::ReportError>(())
//! ```

pub mod capture;
pub mod collector;
pub mod error;
mod format;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod suite;

pub use capture::{CapturedOutput, OutputCapture};
pub use collector::{ResultCollector, TestObserver};
pub use error::ReportError;
pub use outcome::{FailureDetail, OutcomeRecord, Status, TestId};
pub use report::ReportDestination;
pub use runner::{RunResults, XmlTestRunner};
pub use suite::{TestCollection, TestSuite};
