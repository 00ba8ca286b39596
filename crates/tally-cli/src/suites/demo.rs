//! A mixed suite showing how outcomes are classified
//!
//! Some tests pass, some fail an assertion and some raise something else.
//! One registration is deliberately not callable.

use super::Registrar;
use std::f64::consts::PI;
use tally_runtime::{EngineError, TestError, Value};
use tracing::{debug, warn};

pub fn register(suite: &mut Registrar<'_>) {
    suite
        .add("addition", |t| {
            t.assert_equal("sum", 2 + 2, 4)?;
            t.assert_type_equal("integer sum", 10 + 5, 15)?;
            Ok(())
        })
        .add("greeting", |t| {
            t.assert_str_contains("greeting text", "hello world", "goodbye")?;
            Ok(())
        })
        .add("lookup table", |_| Err(TestError::unexpected("lookup table not loaded")))
        .add("fixture file", |t| {
            let raw = std::fs::read_to_string("/nonexistent/tally/fixture.json")
                .map_err(|e| TestError::from_error(&e))?;
            t.assert_not_equal("fixture content", raw.as_str(), "")?;
            Ok(())
        })
        .add("pi estimate", |t| {
            let estimate = 22.0 / 7.0;
            t.at("EST1").assert_roughly_equal("close enough", estimate, PI, 0.01)?;
            t.at("EST2").assert_roughly_equal("very close", estimate, PI, 0.0001)?;
            Ok(())
        })
        .add("inventory", |t| {
            let stock = Value::object([("apples", Value::from(3)), ("pears", Value::from(0))]);
            t.assert_hash_equal(
                "stock levels",
                stock,
                Value::object([("apples", Value::from(3)), ("pears", Value::from(2))]),
            )?;
            Ok(())
        });

    match suite.register(Value::from("not a test")) {
        Err(EngineError::NotCallable { type_name }) => {
            debug!(type_name, "demo registration rejected as intended")
        }
        Ok(()) => {}
    }

    let anonymous = Value::function("", |t| {
        t.assert_array_contains("anonymous check", vec![Value::from(1), Value::from(2)], 2)?;
        Ok(Value::Undefined)
    });
    if let Err(err) = suite.register(anonymous) {
        warn!(error = %err, "anonymous demo test was rejected");
    }
}
