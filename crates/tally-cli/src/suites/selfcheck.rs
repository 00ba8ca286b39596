//! The assertion library checking itself
//!
//! Every test here is expected to pass. A failure means a primitive is broken.

use super::Registrar;
use tally_runtime::{TestError, Value};

pub fn register(suite: &mut Registrar<'_>) {
    suite
        .add("truthiness", |t| {
            t.assert_true("non-zero number", 1)?;
            t.assert_true("non-empty string", "x")?;
            t.assert_true("empty array", Value::array(vec![]))?;
            t.assert_false("zero", 0)?;
            t.assert_false("empty string", "")?;
            t.assert_false("NaN", f64::NAN)?;
            t.assert_false("undefined", Value::Undefined)?;
            Ok(())
        })
        .add("null and undefined", |t| {
            t.assert_null("null", Value::Null)?;
            t.assert_not_null("undefined is not null", Value::Undefined)?;
            t.assert_null("missing option", None::<i32>)?;
            t.assert_undefined("undefined", Value::Undefined)?;
            t.assert_not_undefined("null is defined", Value::Null)?;
            Ok(())
        })
        .add("nan", |t| {
            t.assert_nan("NaN literal", f64::NAN)?;
            t.assert_nan("coerced text", Value::from("abc").to_number())?;
            t.assert_not_nan("numeric string is a value", "42")?;
            t.assert_not_nan("infinity", f64::INFINITY)?;
            Ok(())
        })
        .add("coercive equality", |t| {
            t.assert_equal("number and string", 1, "1")?;
            t.assert_equal("bool and number", true, 1)?;
            t.assert_equal("null and undefined", Value::Null, Value::Undefined)?;
            t.assert_not_equal("null is not zero", Value::Null, 0)?;
            t.assert_not_equal("NaN is never equal", f64::NAN, f64::NAN)?;
            Ok(())
        })
        .add("strict equality", |t| {
            t.assert_type_equal("same number", 3, 3.0)?;
            t.assert_type_equal("same string", "abc", String::from("abc"))?;
            t.assert_same_type("numbers", 3, 4.5)?;
            t.assert_same_type("null is an object", Value::Null, Value::array(vec![]))?;
            Ok(())
        })
        .add("rough equality", |t| {
            t.assert_roughly_equal("one third", 1.0 / 3.0, 0.333, 0.001)?;
            t.assert_roughly_equal("exact bound", 10, 12, 2)?;
            t.assert_roughly_equal("coerced strings", "1.5", "1.25", "0.5")?;
            Ok(())
        })
        .add("arrays", |t| {
            let primes = Value::array(vec![2.into(), 3.into(), 5.into()]);
            t.assert_array_equal(
                "element-wise",
                primes.clone(),
                Value::array(vec![2.into(), 3.into(), 5.into()]),
            )?;
            t.assert_array_contains("loose membership", primes, "3")?;
            Ok(())
        })
        .add("objects", |t| {
            let config = Value::object([("name", Value::from("tally")), ("runs", Value::from(3))]);
            t.assert_hash_equal(
                "key order is irrelevant",
                config,
                Value::object([("runs", Value::from(3)), ("name", Value::from("tally"))]),
            )?;
            Ok(())
        })
        .add("strings", |t| {
            t.assert_str_contains("substring", "assertion library", "library")?;
            t.assert_str_not_contains("absent", "assertion library", "engine")?;
            Ok(())
        })
        .add("throw", |t| {
            let boom = Value::function("boom", |_| Err(TestError::unexpected("boom")));
            let raised = t.assert_throw("raising callable", &boom)?;
            t.assert_equal("raised message", raised.to_string().as_str(), "boom")?;

            let raised = t.assert_throw("non-callable", &Value::from(7))?;
            t.assert_str_contains("type error", raised.to_string(), "not a function")?;
            Ok(())
        })
        .add("failures propagate", |t| {
            let failing = Value::function("failing", |inner| {
                inner.at("SC1").fail("expected failure")?;
                Ok(Value::Undefined)
            });
            let raised = t.assert_throw("nested failure", &failing)?;
            let Some(failure) = raised.as_assertion() else {
                return Err(TestError::unexpected("nested failure was not an assertion failure"));
            };
            t.assert_equal("operator", failure.operator(), "Fail")?;
            t.assert_equal("site code", failure.code(), "SC1")?;
            Ok(())
        });
}
