// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.2 Testing and Comparison Operations](https://tc39.es/ecma262/#sec-testing-and-comparison-operations)

use crate::{
    ecmascript::{
        builtins::Function,
        execution::{Agent, ExceptionType, JsResult},
        types::{BigInt, Value},
    },
    engine::context::{Bindable, NoGcScope},
};

/// ### [7.2.1 RequireObjectCoercible ( argument )](https://tc39.es/ecma262/#sec-requireobjectcoercible)
pub(crate) fn require_object_coercible<'gc>(
    agent: &mut Agent,
    argument: Value,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    if argument.is_nullish() {
        Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Argument cannot be null or undefined",
            gc,
        ))
    } else {
        Ok(argument.unbind().bind(gc))
    }
}

/// ### [7.2.2 IsArray ( argument )](https://tc39.es/ecma262/#sec-isarray)
pub fn is_array(argument: Value) -> bool {
    matches!(argument, Value::Array(_))
}

/// ### [7.2.3 IsCallable ( argument )](https://tc39.es/ecma262/#sec-iscallable)
pub fn is_callable<'a>(argument: Value<'a>) -> Option<Function<'a>> {
    match argument {
        Value::Function(f) => Some(f),
        _ => None,
    }
}

/// IsCallable(argument), throwing a TypeError with `message` when the
/// argument is not callable.
pub(crate) fn require_callable<'gc>(
    agent: &mut Agent,
    argument: Value,
    message: &'static str,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, Function<'gc>> {
    match is_callable(argument) {
        Some(function) => Ok(function.unbind().bind(gc)),
        None => Err(agent.throw_exception_with_static_message(ExceptionType::TypeError, message, gc)),
    }
}

/// ### [7.2.4 IsConstructor ( argument )](https://tc39.es/ecma262/#sec-isconstructor)
pub fn is_constructor<'a>(agent: &Agent, argument: Value<'a>) -> Option<Function<'a>> {
    is_callable(argument).filter(|f| f.is_constructor(agent))
}

/// ### [7.2.6 IsIntegralNumber ( argument )](https://tc39.es/ecma262/#sec-isintegralnumber)
pub fn is_integral_number(argument: Value) -> bool {
    matches!(argument, Value::Number(n) if n.is_finite() && n.trunc() == n)
}

/// ### [7.2.9 SameValue ( x, y )](https://tc39.es/ecma262/#sec-samevalue)
pub fn same_value(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        // 1. If Type(x) is not Type(y), return false.
        // 2. If x is a Number, then
        //   a. Return Number::sameValue(x, y).
        (Value::Number(x), Value::Number(y)) => {
            (x.is_nan() && y.is_nan()) || x.to_bits() == y.to_bits()
        }
        // 3. Return SameValueNonNumber(x, y).
        _ => same_value_non_number(agent, x, y),
    }
}

/// ### [7.2.10 SameValueZero ( x, y )](https://tc39.es/ecma262/#sec-samevaluezero)
pub fn same_value_zero(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        // a. Return Number::sameValueZero(x, y).
        (Value::Number(x), Value::Number(y)) => (x.is_nan() && y.is_nan()) || x == y,
        _ => same_value_non_number(agent, x, y),
    }
}

/// ### [7.2.11 SameValueNonNumber ( x, y )](https://tc39.es/ecma262/#sec-samevaluenonnumber)
///
/// Strings are interned, so handle equality is content equality.
pub(crate) fn same_value_non_number(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        // 2. If x is a BigInt, then
        //   a. Return BigInt::equal(x, y).
        (Value::BigInt(x), Value::BigInt(y)) => BigInt::equals(agent, x, y),
        (Value::Number(_), _) | (_, Value::Number(_)) => false,
        // 3. If x is either undefined or null, return true.
        // 4. If x is a String, then
        // 5. If x is a Boolean, then
        // 7. If x is y, return true; otherwise, return false.
        _ => x == y,
    }
}

/// ### [7.2.15 IsStrictlyEqual ( x, y )](https://tc39.es/ecma262/#sec-isstrictlyequal)
pub fn is_strictly_equal(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        // a. Return Number::equal(x, y).
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => same_value_non_number(agent, x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_nan_equalities() {
        let agent = Agent::new(crate::ecmascript::execution::Options::default());
        let nan = Value::Number(f64::NAN);
        let zero = Value::Number(0.0);
        let negative_zero = Value::Number(-0.0);
        assert!(same_value(&agent, nan, nan));
        assert!(!same_value(&agent, zero, negative_zero));
        assert!(same_value_zero(&agent, zero, negative_zero));
        assert!(same_value_zero(&agent, nan, nan));
        assert!(!is_strictly_equal(&agent, nan, nan));
        assert!(is_strictly_equal(&agent, zero, negative_zero));
        assert!(!is_strictly_equal(&agent, Value::Undefined, Value::Null));
    }
}
