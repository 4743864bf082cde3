//! Test registration and the execution driver.
//!
//! Discovery is the caller's concern; this module only provides the thin
//! registration surface that attaches a stable suite name to each test and
//! delivers the sequential start/outcome/finish callbacks to an observer.

use std::error::Error;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::collector::TestObserver;
use crate::outcome::{FailureDetail, TestId};

type TestFn = Box<dyn Fn() -> Result<(), Box<dyn Error>>>;

/// Anything able to drive a sequence of tests against an observer.
///
/// Implementations must deliver, per test, `test_started`, exactly one
/// outcome callback, then `test_finished`, before the next test starts.
pub trait TestCollection {
    fn run(&self, observer: &mut dyn TestObserver);
}

struct RegisteredTest {
    id: TestId,
    body: TestFn,
}

/// An ordered group of registered tests sharing one suite name.
///
/// A panicking body counts as an assertion-style failure; a body returning
/// `Err` counts as an error. Either way the run continues with the next test.
pub struct TestSuite {
    name: String,
    tests: Vec<RegisteredTest>,
}

impl TestSuite {
    /// Creates an empty suite. Use an empty name for top-level tests.
    pub fn new(name: impl Into<String>) -> Self {
        TestSuite {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(
        &mut self,
        name: impl Into<String>,
        body: impl Fn() -> Result<(), Box<dyn Error>> + 'static,
    ) -> &mut Self {
        self.tests.push(RegisteredTest {
            id: TestId::new(self.name.clone(), name),
            body: Box::new(body),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl TestCollection for TestSuite {
    fn run(&self, observer: &mut dyn TestObserver) {
        for test in &self.tests {
            observer.test_started(&test.id);

            match catch_unwind(AssertUnwindSafe(|| (test.body)())) {
                Ok(Ok(())) => observer.test_succeeded(&test.id),
                Ok(Err(err)) => observer.test_errored(&test.id, detail_from_error(err.as_ref())),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    observer.test_failed(
                        &test.id,
                        FailureDetail::new("AssertionError", message.clone(), message),
                    );
                }
            }

            observer.test_finished(&test.id);
        }
    }
}

impl TestCollection for [TestSuite] {
    fn run(&self, observer: &mut dyn TestObserver) {
        for suite in self {
            suite.run(observer);
        }
    }
}

impl TestCollection for Vec<TestSuite> {
    fn run(&self, observer: &mut dyn TestObserver) {
        self.as_slice().run(observer);
    }
}

fn detail_from_error(err: &dyn Error) -> FailureDetail {
    let mut trace = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str(&format!("\ncaused by: {cause}"));
        source = cause.source();
    }
    FailureDetail::new("Error", err.to_string(), trace)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
