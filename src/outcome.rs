use std::time::Duration;

/// Stable identity of a registered test: the suite it belongs to plus its
/// unqualified name.
///
/// The suite key is supplied explicitly at registration time. The conventional
/// top-level/no-module case is represented by an empty suite string.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TestId {
    pub suite: String,
    pub name: String,
}

impl TestId {
    pub fn new(suite: impl Into<String>, name: impl Into<String>) -> Self {
        TestId {
            suite: suite.into(),
            name: name.into(),
        }
    }

    /// A test declared outside any named suite.
    pub fn top_level(name: impl Into<String>) -> Self {
        TestId::new("", name)
    }

    /// The suite-qualified name, e.g. `pkg.MyTests.test_ok`.
    pub fn full_name(&self) -> String {
        if self.suite.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.suite, self.name)
        }
    }

    /// Human-readable form used for console output, e.g. `test_ok (pkg.MyTests)`.
    pub fn description(&self) -> String {
        if self.suite.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.suite)
        }
    }
}

/// What went wrong in a non-successful test: an error type name, a short
/// message, and a full formatted trace as opaque text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FailureDetail {
    pub type_name: String,
    pub message: String,
    pub trace: String,
}

impl FailureDetail {
    pub fn new(
        type_name: impl Into<String>,
        message: impl Into<String>,
        trace: impl Into<String>,
    ) -> Self {
        FailureDetail {
            type_name: type_name.into(),
            message: message.into(),
            trace: trace.into(),
        }
    }
}

/// Classification of a finished test.
///
/// Assertion-style failures are `Failure`; any other uncaught fault is
/// `Error`. Carrying the detail inside the non-success variants guarantees a
/// detail is present exactly when the test did not succeed.
#[derive(Debug, Clone)]
pub enum Status {
    Success,
    Failure(FailureDetail),
    Error(FailureDetail),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failure(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    pub fn detail(&self) -> Option<&FailureDetail> {
        match self {
            Status::Success => None,
            Status::Failure(detail) | Status::Error(detail) => Some(detail),
        }
    }

    /// Element name used for the nested XML child, if any.
    pub(crate) fn element_tag(&self) -> Option<&'static str> {
        match self {
            Status::Success => None,
            Status::Failure(_) => Some("failure"),
            Status::Error(_) => Some("error"),
        }
    }

    /// Console label printed in verbose mode and in the error list.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Status::Success => "OK",
            Status::Failure(_) => "FAIL",
            Status::Error(_) => "ERROR",
        }
    }

    /// Single-character progress marker printed in dot mode.
    pub(crate) fn dot(&self) -> &'static str {
        match self {
            Status::Success => ".",
            Status::Failure(_) => "F",
            Status::Error(_) => "E",
        }
    }
}

/// The immutable result of one finished test.
///
/// Created the instant the test finishes and never mutated afterwards. The
/// elapsed time is forced to zero when the collector runs with elapsed-time
/// suppression enabled, so generated reports are byte-reproducible.
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub id: TestId,
    pub status: Status,
    pub elapsed: Duration,
}

impl OutcomeRecord {
    pub fn new(id: TestId, status: Status, elapsed: Duration) -> Self {
        OutcomeRecord {
            id,
            status,
            elapsed,
        }
    }
}
