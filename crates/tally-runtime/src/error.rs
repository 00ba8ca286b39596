//! Failure types raised by test bodies

use crate::value::Value;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Structured failure produced by an assertion that did not hold.
///
/// Constructed only by the assertion library; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    message: String,
    actual: Value,
    expected: Value,
    operator: &'static str,
    code: String,
}

impl AssertionFailure {
    pub(crate) fn new(
        operator: &'static str,
        message: String,
        actual: Value,
        expected: Value,
        code: String,
    ) -> Self {
        debug_assert!(!operator.is_empty());
        Self {
            message,
            actual,
            expected,
            operator,
            code,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn actual(&self) -> &Value {
        &self.actual
    }

    pub fn expected(&self) -> &Value {
        &self.expected
    }

    /// Name of the assertion that raised this failure, e.g. `"Equal"`.
    pub fn operator(&self) -> &str {
        self.operator
    }

    /// Site identifier attached with [`Assertions::at`](crate::assert::Assertions::at); may be empty.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "[{}] {}", self.operator, self.message)
        } else {
            write!(f, "[{}#{}] {}", self.operator, self.code, self.message)
        }
    }
}

impl std::error::Error for AssertionFailure {}

/// Everything a test body can raise.
///
/// The engine classifies `Assertion` as a failed test and `Unexpected` as an
/// errored one.
#[derive(Debug, Clone, Error)]
pub enum TestError {
    /// An assertion did not hold
    #[error("{0}")]
    Assertion(AssertionFailure),

    /// Any other fault in the test body or its collaborators
    #[error("{message}")]
    Unexpected {
        message: String,
        trace: Option<String>,
    },
}

impl TestError {
    /// Unexpected error with a plain message.
    pub fn unexpected(message: impl Into<String>) -> Self {
        TestError::Unexpected {
            message: message.into(),
            trace: None,
        }
    }

    /// Unexpected error built from a foreign error; its source chain becomes the trace.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        TestError::Unexpected {
            message: err.to_string(),
            trace: if chain.is_empty() {
                None
            } else {
                Some(chain.join("\n"))
            },
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, TestError::Assertion(_))
    }

    pub fn as_assertion(&self) -> Option<&AssertionFailure> {
        match self {
            TestError::Assertion(f) => Some(f),
            TestError::Unexpected { .. } => None,
        }
    }

    pub fn trace(&self) -> Option<&str> {
        match self {
            TestError::Unexpected { trace, .. } => trace.as_deref(),
            TestError::Assertion(_) => None,
        }
    }
}

impl From<AssertionFailure> for TestError {
    fn from(failure: AssertionFailure) -> Self {
        TestError::Assertion(failure)
    }
}

/// Text carried by a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Result of a test body or callable value.
pub type TestResult<T = ()> = Result<T, TestError>;
