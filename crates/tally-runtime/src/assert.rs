//! Assertion primitives
//!
//! Each assertion evaluates one check. A check that holds returns `Ok`; one
//! that does not returns an [`AssertionFailure`] naming the operator, the
//! offending values and a message. Test bodies propagate failures with `?`.
//!
//! # API
//!
//! ## Truth and presence
//! - `assert_true`, `assert_false`: truthiness
//! - `assert_null`, `assert_not_null`, `assert_undefined`, `assert_not_undefined`
//! - `assert_nan`, `assert_not_nan`
//!
//! ## Equality
//! - `assert_equal`, `assert_not_equal`: coercive equality
//! - `assert_type_equal`: strict equality (value and type)
//! - `assert_same_type`: type tags only
//! - `assert_roughly_equal`: numeric tolerance
//!
//! ## Collections and text
//! - `assert_array_equal`, `assert_hash_equal`, `assert_array_contains`
//! - `assert_str_contains`, `assert_str_not_contains`
//!
//! ## Control
//! - `assert_throw`: succeeds when the callable raises, returning what it raised
//! - `fail`: unconditional failure
//!
//! Every call bumps [`Assertions::count`] exactly once, before the check is
//! evaluated, whether it passes or fails.

use crate::error::{panic_message, AssertionFailure, TestError};
use crate::value::Value;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Result of a single assertion.
pub type AssertResult<T = ()> = Result<T, AssertionFailure>;

/// The assertion library instance handed to every test body.
#[derive(Debug, Clone)]
pub struct Assertions {
    name: String,
    debug_enabled: bool,
    show_default_message: bool,
    count: usize,
    pending_code: Option<String>,
}

impl Default for Assertions {
    fn default() -> Self {
        Self::new("tally")
    }
}

impl Assertions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            debug_enabled: false,
            show_default_message: true,
            count: 0,
            pending_code: None,
        }
    }

    /// Log every assertion at debug level.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    /// Prefix caller messages with the built-in explanation.
    pub fn with_default_message(mut self, show: bool) -> Self {
        self.show_default_message = show;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn show_default_message(&self) -> bool {
        self.show_default_message
    }

    /// Number of assertions evaluated since the owning run started.
    pub fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn reset_count(&mut self) {
        self.count = 0;
        self.clear_pending_code();
    }

    /// Drop a site code set by `at` that no assertion consumed.
    pub(crate) fn clear_pending_code(&mut self) {
        self.pending_code = None;
    }

    /// Tag the next assertion call with a site code, reported on failure.
    pub fn at(&mut self, code: impl Into<String>) -> &mut Self {
        self.pending_code = Some(code.into());
        self
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Count the call and claim the pending site code.
    fn begin(&mut self, operator: &'static str) -> String {
        self.count += 1;
        if self.debug_enabled {
            debug!(suite = %self.name, operator, count = self.count, "evaluating assertion");
        }
        self.pending_code.take().unwrap_or_default()
    }

    /// Merge the caller's message with the built-in one.
    fn compose(&self, default: &str, msg: &str) -> String {
        if msg.is_empty() {
            default.to_string()
        } else if !default.is_empty() && self.show_default_message {
            format!("{}: {}", default, msg)
        } else {
            msg.to_string()
        }
    }

    fn failure(
        &self,
        operator: &'static str,
        code: String,
        default: &str,
        msg: &str,
        actual: Value,
        expected: Value,
    ) -> AssertionFailure {
        let message = self.compose(default, msg);
        if self.debug_enabled {
            debug!(suite = %self.name, operator, %message, "assertion failed");
        }
        AssertionFailure::new(operator, message, actual, expected, code)
    }

    /// Finish a check whose only failure mode is `holds == false`.
    #[allow(clippy::too_many_arguments)]
    fn conclude(
        &self,
        operator: &'static str,
        code: String,
        holds: bool,
        msg: &str,
        default: impl FnOnce() -> String,
        actual: Value,
        expected: Value,
    ) -> AssertResult {
        if holds {
            Ok(())
        } else {
            Err(self.failure(operator, code, &default(), msg, actual, expected))
        }
    }

    // ========================================================================
    // Truth and presence
    // ========================================================================

    /// Fails when `actual` is falsy.
    pub fn assert_true(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("True");
        let actual = actual.into();
        let holds = actual.is_truthy();
        self.conclude(
            "True",
            code,
            holds,
            msg,
            || format!("Expected a truthy value but was {}", actual),
            actual.clone(),
            Value::Bool(true),
        )
    }

    /// Fails when `actual` is truthy.
    pub fn assert_false(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("False");
        let actual = actual.into();
        let holds = !actual.is_truthy();
        self.conclude(
            "False",
            code,
            holds,
            msg,
            || format!("Expected a falsy value but was {}", actual),
            actual.clone(),
            Value::Bool(false),
        )
    }

    pub fn assert_null(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("Null");
        let actual = actual.into();
        let holds = actual.is_null();
        self.conclude(
            "Null",
            code,
            holds,
            msg,
            || format!("Expected null but was {}", actual),
            actual.clone(),
            Value::Null,
        )
    }

    pub fn assert_not_null(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("NotNull");
        let actual = actual.into();
        let holds = !actual.is_null();
        self.conclude(
            "NotNull",
            code,
            holds,
            msg,
            || "Expected a non-null value".to_string(),
            actual,
            Value::Null,
        )
    }

    pub fn assert_undefined(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("Undefined");
        let actual = actual.into();
        let holds = actual.is_undefined();
        self.conclude(
            "Undefined",
            code,
            holds,
            msg,
            || format!("Expected undefined but was {}", actual),
            actual.clone(),
            Value::Undefined,
        )
    }

    pub fn assert_not_undefined(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("NotUndefined");
        let actual = actual.into();
        let holds = !actual.is_undefined();
        self.conclude(
            "NotUndefined",
            code,
            holds,
            msg,
            || "Expected a defined value".to_string(),
            actual,
            Value::Undefined,
        )
    }

    /// Fails unless `actual` is the number NaN.
    pub fn assert_nan(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("NaN");
        let actual = actual.into();
        let holds = actual.is_nan();
        self.conclude(
            "NaN",
            code,
            holds,
            msg,
            || format!("Expected NaN but was {}", actual),
            actual.clone(),
            Value::Number(f64::NAN),
        )
    }

    pub fn assert_not_nan(&mut self, msg: &str, actual: impl Into<Value>) -> AssertResult {
        let code = self.begin("NotNaN");
        let actual = actual.into();
        let holds = !actual.is_nan();
        self.conclude(
            "NotNaN",
            code,
            holds,
            msg,
            || "Expected a value other than NaN".to_string(),
            actual,
            Value::Number(f64::NAN),
        )
    }

    // ========================================================================
    // Equality
    // ========================================================================

    /// Coercive equality: `5` equals `"5"`, `1` equals `true`.
    pub fn assert_equal(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        let code = self.begin("Equal");
        let (actual, expected) = (actual.into(), expected.into());
        let holds = actual.loose_eq(&expected);
        self.conclude(
            "Equal",
            code,
            holds,
            msg,
            || format!("Expected {} but was {}", expected, actual),
            actual.clone(),
            expected.clone(),
        )
    }

    pub fn assert_not_equal(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        let code = self.begin("NotEqual");
        let (actual, expected) = (actual.into(), expected.into());
        let holds = !actual.loose_eq(&expected);
        self.conclude(
            "NotEqual",
            code,
            holds,
            msg,
            || format!("Expected a value other than {}", expected),
            actual.clone(),
            expected.clone(),
        )
    }

    /// Strict equality: same type and same value.
    pub fn assert_type_equal(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        let code = self.begin("TypeEqual");
        let (actual, expected) = (actual.into(), expected.into());
        let holds = actual.strict_eq(&expected);
        self.conclude(
            "TypeEqual",
            code,
            holds,
            msg,
            || {
                format!(
                    "Expected {} ({}) but was {} ({})",
                    expected,
                    expected.type_name(),
                    actual,
                    actual.type_name()
                )
            },
            actual.clone(),
            expected.clone(),
        )
    }

    pub fn assert_same_type(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        let code = self.begin("SameType");
        let (actual, expected) = (actual.into(), expected.into());
        let holds = actual.type_tag() == expected.type_tag();
        self.conclude(
            "SameType",
            code,
            holds,
            msg,
            || {
                format!(
                    "Expected type {} but was {}",
                    expected.type_tag(),
                    actual.type_tag()
                )
            },
            actual.clone(),
            expected.clone(),
        )
    }

    /// Numeric closeness after coercion. NaN in any operand fails.
    pub fn assert_roughly_equal(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
        tolerance: impl Into<Value>,
    ) -> AssertResult {
        let code = self.begin("RoughlyEqual");
        let (actual, expected, tolerance) = (actual.into(), expected.into(), tolerance.into());
        let (a, e, t) = (actual.to_number(), expected.to_number(), tolerance.to_number());

        if a.is_nan() || e.is_nan() || t.is_nan() {
            let default = format!(
                "Operands must be numeric: actual {}, expected {}, tolerance {}",
                actual, expected, tolerance
            );
            return Err(self.failure("RoughlyEqual", code, &default, msg, actual, expected));
        }

        let holds = (a - e).abs() <= t;
        self.conclude(
            "RoughlyEqual",
            code,
            holds,
            msg,
            || format!("Expected {} ± {} but was {}", expected, tolerance, actual),
            actual.clone(),
            expected.clone(),
        )
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Order-sensitive element comparison using strict equality. Reports the
    /// first index that differs.
    pub fn assert_array_equal(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        let code = self.begin("ArrayEqual");
        let (actual, expected) = (actual.into(), expected.into());

        let (xs, ys) = match (actual.as_array(), expected.as_array()) {
            (Some(xs), Some(ys)) => (xs, ys),
            _ => {
                let default = format!(
                    "Expected two arrays but got {} and {}",
                    actual.type_name(),
                    expected.type_name()
                );
                return Err(self.failure("ArrayEqual", code, &default, msg, actual.clone(), expected.clone()));
            }
        };

        if xs.len() != ys.len() {
            let default = format!(
                "Expected array of length {} but was length {}",
                ys.len(),
                xs.len()
            );
            return Err(self.failure("ArrayEqual", code, &default, msg, actual.clone(), expected.clone()));
        }

        let mismatch = xs
            .iter()
            .zip(ys.iter())
            .enumerate()
            .find(|(_, (x, y))| !x.strict_eq(y));

        match mismatch {
            None => Ok(()),
            Some((index, (x, y))) => {
                let default = format!(
                    "Arrays differ at index {}: expected {} but was {}",
                    index, y, x
                );
                Err(self.failure("ArrayEqual", code, &default, msg, actual.clone(), expected.clone()))
            }
        }
    }

    /// Two-way key coverage: every key of `actual` must exist in `expected`
    /// with a strictly equal value, and every key of `expected` must exist in
    /// `actual`. Key order is irrelevant.
    pub fn assert_hash_equal(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        let code = self.begin("HashEqual");
        let (actual, expected) = (actual.into(), expected.into());

        let (xs, ys) = match (&actual, &expected) {
            (Value::Object(xs), Value::Object(ys)) => (xs, ys),
            _ => {
                let default = format!(
                    "Expected two objects but got {} and {}",
                    actual.type_name(),
                    expected.type_name()
                );
                return Err(self.failure("HashEqual", code, &default, msg, actual.clone(), expected.clone()));
            }
        };

        let mut problem = None;
        for (key, value) in xs.iter() {
            match ys.get(key) {
                None => {
                    problem = Some(format!("Unexpected key {:?} in actual", key));
                    break;
                }
                Some(other) if !value.strict_eq(other) => {
                    problem = Some(format!(
                        "Values differ at key {:?}: expected {} but was {}",
                        key, other, value
                    ));
                    break;
                }
                Some(_) => {}
            }
        }
        if problem.is_none() {
            problem = ys
                .keys()
                .find(|key| !xs.contains_key(key))
                .map(|key| format!("Missing key {:?} in actual", key));
        }

        match problem {
            None => Ok(()),
            Some(default) => Err(self.failure(
                "HashEqual",
                code,
                &default,
                msg,
                actual.clone(),
                expected.clone(),
            )),
        }
    }

    /// Membership by coercive equality. Returns `true` when found.
    pub fn assert_array_contains(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        value: impl Into<Value>,
    ) -> AssertResult<bool> {
        let code = self.begin("ArrayContains");
        let (actual, value) = (actual.into(), value.into());

        let Some(items) = actual.as_array() else {
            let default = format!("Expected an array but got {}", actual.type_name());
            return Err(self.failure("ArrayContains", code, &default, msg, actual.clone(), value));
        };

        if items.iter().any(|item| item.loose_eq(&value)) {
            Ok(true)
        } else {
            let default = format!("Array {} does not contain {}", actual, value);
            Err(self.failure("ArrayContains", code, &default, msg, actual.clone(), value))
        }
    }

    // ========================================================================
    // Text
    // ========================================================================

    pub fn assert_str_contains(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        self.substring_check("StrContains", true, msg, actual.into(), expected.into())
    }

    pub fn assert_str_not_contains(
        &mut self,
        msg: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> AssertResult {
        self.substring_check("StrNotContains", false, msg, actual.into(), expected.into())
    }

    fn substring_check(
        &mut self,
        operator: &'static str,
        want_contained: bool,
        msg: &str,
        actual: Value,
        expected: Value,
    ) -> AssertResult {
        let code = self.begin(operator);

        let (Some(haystack), Some(needle)) = (actual.as_str(), expected.as_str()) else {
            let default = format!(
                "Expected two strings but got {} and {}",
                actual.type_name(),
                expected.type_name()
            );
            return Err(self.failure(operator, code, &default, msg, actual.clone(), expected.clone()));
        };

        let contained = haystack.contains(needle);
        if contained == want_contained {
            return Ok(());
        }
        let default = if want_contained {
            format!("Expected {:?} to contain {:?}", haystack, needle)
        } else {
            format!("Expected {:?} not to contain {:?}", haystack, needle)
        };
        Err(self.failure(operator, code, &default, msg, actual.clone(), expected.clone()))
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Invoke `callable` and expect it to raise.
    ///
    /// Returns what the callable raised. A panic and a non-callable value
    /// (a type error when invoked) both count as raising. Fails only when the
    /// callable returns normally.
    pub fn assert_throw(&mut self, msg: &str, callable: &Value) -> AssertResult<TestError> {
        let code = self.begin("Throw");

        let outcome = match callable {
            Value::Function(func) => panic::catch_unwind(AssertUnwindSafe(|| func.call(self)))
                .unwrap_or_else(|payload| {
                    Err(TestError::unexpected(format!(
                        "panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                }),
            other => Err(TestError::unexpected(format!(
                "{} is not a function",
                other.type_name()
            ))),
        };

        match outcome {
            Err(raised) => Ok(raised),
            Ok(returned) => {
                let default = format!("Expected function to throw but it returned {}", returned);
                Err(self.failure(
                    "Throw",
                    code,
                    &default,
                    msg,
                    returned,
                    Value::string("<thrown error>"),
                ))
            }
        }
    }

    /// Unconditional failure.
    pub fn fail(&mut self, msg: &str) -> AssertResult {
        let code = self.begin("Fail");
        Err(self.failure(
            "Fail",
            code,
            "Explicit failure",
            msg,
            Value::Undefined,
            Value::Undefined,
        ))
    }
}

// ============================================================================
// Unit tests
// ============================================================================
