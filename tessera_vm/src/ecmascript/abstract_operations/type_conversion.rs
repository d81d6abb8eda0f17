// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.1 Type Conversion](https://tc39.es/ecma262/#sec-type-conversion)
//!
//! The ECMAScript language implicitly performs automatic type conversion as
//! needed. To clarify the semantics of certain constructs it is useful to
//! define a set of conversion abstract operations. The conversion abstract
//! operations are polymorphic; they can accept a value of any ECMAScript
//! language type. But no other specification types are used with these
//! operations.

use num_bigint::Sign;

use super::{
    operations_on_objects::{call_function, get},
    testing_and_comparison::is_callable,
};
use crate::{
    ecmascript::{
        builtins::Array,
        execution::{Agent, ExceptionType, JsResult, ProtoIntrinsics},
        types::{
            BUILTIN_STRING_MEMORY, BigInt, Object, OrdinaryObject, PropertyKey, String, Value,
        },
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope, NoGcScope},
    },
};

/// 2<sup>53</sup> - 1 as a Number.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    String,
    Number,
}

/// ### [7.1.1 ToPrimitive ( input \[ , preferredType \] )](https://tc39.es/ecma262/#sec-toprimitive)
///
/// Objects are converted with OrdinaryToPrimitive; no object kind in the
/// engine defines @@toPrimitive.
pub fn to_primitive<'gc>(
    agent: &mut Agent,
    input: Value,
    preferred_type: Option<PreferredType>,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    // 1. If input is an Object, then
    if let Ok(input) = Object::try_from(input) {
        // d. If preferredType is not present, let preferredType be NUMBER.
        // e. Return ? OrdinaryToPrimitive(input, preferredType).
        ordinary_to_primitive(
            agent,
            input.unbind(),
            preferred_type.unwrap_or(PreferredType::Number),
            gc,
        )
    } else {
        // 2. Return input.
        Ok(input.unbind())
    }
}

/// ### [7.1.1.1 OrdinaryToPrimitive ( O, hint )](https://tc39.es/ecma262/#sec-ordinarytoprimitive)
pub(crate) fn ordinary_to_primitive<'gc>(
    agent: &mut Agent,
    o: Object,
    hint: PreferredType,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    let o = o.scope(agent, gc.nogc());
    // 1. If hint is STRING, then
    //   a. Let methodNames be « "toString", "valueOf" ».
    // 2. Else,
    //   a. Let methodNames be « "valueOf", "toString" ».
    let method_names = match hint {
        PreferredType::String => [BUILTIN_STRING_MEMORY.toString, BUILTIN_STRING_MEMORY.valueOf],
        PreferredType::Number => [BUILTIN_STRING_MEMORY.valueOf, BUILTIN_STRING_MEMORY.toString],
    };
    // 3. For each element name of methodNames, do
    for name in method_names {
        // a. Let method be ? Get(O, name).
        let method = get(agent, o.get(agent), name.into(), gc.reborrow()).unbind()?;
        // b. If IsCallable(method) is true, then
        if let Some(method) = is_callable(method) {
            // i. Let result be ? Call(method, O).
            let result = call_function(
                agent,
                method,
                o.get(agent).into(),
                &[],
                gc.reborrow(),
            )
            .unbind()?;
            // ii. If result is not an Object, return result.
            if result.is_primitive() {
                return Ok(result);
            }
        }
    }
    // 4. Throw a TypeError exception.
    Err(agent.throw_exception_with_static_message(
        ExceptionType::TypeError,
        "Cannot convert object to primitive value",
        gc.into_nogc(),
    ))
}

/// ### [7.1.2 ToBoolean ( argument )](https://tc39.es/ecma262/#sec-toboolean)
pub fn to_boolean(agent: &Agent, argument: Value) -> bool {
    match argument {
        Value::Undefined | Value::Null => false,
        Value::Boolean(value) => value,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => !(n == 0.0 || n.is_nan()),
        Value::BigInt(n) => !n.is_zero(agent),
        _ => true,
    }
}

/// ### [7.1.3 ToNumeric ( value )](https://tc39.es/ecma262/#sec-tonumeric)
///
/// Returns either a Number or a BigInt value.
pub fn to_numeric<'gc>(
    agent: &mut Agent,
    value: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    // 1. Let primValue be ? ToPrimitive(value, NUMBER).
    let prim_value = to_primitive(agent, value, Some(PreferredType::Number), gc.reborrow())
        .unbind()?
        .bind(gc.nogc());
    // 2. If primValue is a BigInt, return primValue.
    if prim_value.is_bigint() {
        return Ok(prim_value.unbind());
    }
    // 3. Return ? ToNumber(primValue).
    to_number_primitive(agent, prim_value.unbind(), gc.into_nogc()).map(Value::Number)
}

/// ### [7.1.4 ToNumber ( argument )](https://tc39.es/ecma262/#sec-tonumber)
pub fn to_number<'gc>(
    agent: &mut Agent,
    argument: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, f64> {
    if let Value::Number(n) = argument {
        return Ok(n);
    }
    if argument.is_primitive() {
        return to_number_primitive(agent, argument, gc.into_nogc());
    }
    // 7. Assert: argument is an Object.
    // 8. Let primValue be ? ToPrimitive(argument, NUMBER).
    let prim_value =
        to_primitive(agent, argument, Some(PreferredType::Number), gc.reborrow()).unbind()?;
    // 9. Assert: primValue is not an Object.
    // 10. Return ? ToNumber(primValue).
    to_number_primitive(agent, prim_value, gc.into_nogc())
}

/// ToNumber of a primitive value. Never calls into user code.
pub(crate) fn to_number_primitive<'gc>(
    agent: &mut Agent,
    argument: Value,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, f64> {
    match argument {
        // 1. If argument is a Number, return argument.
        Value::Number(n) => Ok(n),
        // 3. If argument is undefined, return NaN.
        Value::Undefined => Ok(f64::NAN),
        // 4. If argument is either null or false, return +0𝔽.
        Value::Null | Value::Boolean(false) => Ok(0.0),
        // 5. If argument is true, return 1𝔽.
        Value::Boolean(true) => Ok(1.0),
        // 6. If argument is a String, return StringToNumber(argument).
        Value::String(s) => Ok(string_to_number(s.as_str(agent))),
        // 2. If argument is either a Symbol or a BigInt, throw a TypeError
        //    exception.
        Value::BigInt(_) => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert a BigInt value to a number",
            gc,
        )),
        _ => unreachable!("ToNumber of an object must go through ToPrimitive"),
    }
}

/// ### [7.1.4.1.1 StringToNumber ( str )](https://tc39.es/ecma262/#sec-stringtonumber)
pub fn string_to_number(text: &str) -> f64 {
    let text = text.trim_matches(is_js_whitespace);
    if text.is_empty() {
        return 0.0;
    }
    let radix = match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => Some(16),
        [b'0', b'o' | b'O', ..] => Some(8),
        [b'0', b'b' | b'B', ..] => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut value = 0.0f64;
        for c in digits.chars() {
            let Some(digit) = c.to_digit(radix) else {
                return f64::NAN;
            };
            value = value * radix as f64 + digit as f64;
        }
        return value;
    }
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    // StrDecimalLiteral only; fast-float alone would also accept "inf" and
    // "nan".
    if !unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        || !unsigned.bytes().next().is_some_and(|b| b.is_ascii_digit() || b == b'.')
    {
        return f64::NAN;
    }
    fast_float::parse::<f64, _>(text).unwrap_or(f64::NAN)
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// ### [7.1.5 ToIntegerOrInfinity ( argument )](https://tc39.es/ecma262/#sec-tointegerorinfinity)
pub fn to_integer_or_infinity<'gc>(
    agent: &mut Agent,
    argument: Value,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, f64> {
    // 1. Let number be ? ToNumber(argument).
    let number = to_number(agent, argument, gc)?;
    Ok(integer_or_infinity(number))
}

/// Steps 2 to 5 of ToIntegerOrInfinity.
pub fn integer_or_infinity(number: f64) -> f64 {
    // 2. If number is one of NaN, +0𝔽, or -0𝔽, return 0.
    if number.is_nan() || number == 0.0 {
        return 0.0;
    }
    // 3. If number is +∞𝔽, return +∞.
    // 4. If number is -∞𝔽, return -∞.
    // 5. Return truncate(ℝ(number)).
    number.trunc()
}

/// ### [7.1.7 ToUint32 ( argument )](https://tc39.es/ecma262/#sec-touint32)
pub fn to_uint32<'gc>(agent: &mut Agent, argument: Value, gc: GcScope<'gc, '_>) -> JsResult<'gc, u32> {
    let number = to_number(agent, argument, gc)?;
    Ok(number_to_uint32(number))
}

pub(crate) fn number_to_uint32(number: f64) -> u32 {
    if !number.is_finite() {
        return 0;
    }
    let int = number.trunc();
    if int >= 0.0 && int <= u32::MAX as f64 {
        return int as u32;
    }
    int.rem_euclid(4_294_967_296.0) as u32
}

/// ### [7.1.13 ToBigInt ( argument )](https://tc39.es/ecma262/#sec-tobigint)
pub fn to_big_int<'gc>(
    agent: &mut Agent,
    argument: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, BigInt<'gc>> {
    // 1. Let prim be ? ToPrimitive(argument, NUMBER).
    let prim = to_primitive(agent, argument, Some(PreferredType::Number), gc.reborrow()).unbind()?;
    let gc = gc.into_nogc();
    // 2. Return the value that prim corresponds to in Table 12.
    match prim {
        Value::Undefined | Value::Null => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert undefined or null to a BigInt",
            gc,
        )),
        Value::Boolean(value) => Ok(BigInt::from_i64(agent, value as i64, gc)),
        Value::BigInt(value) => Ok(value.bind(gc)),
        Value::Number(_) => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert a Number to a BigInt",
            gc,
        )),
        Value::String(s) => {
            let parsed = string_to_big_int(s.as_str(agent));
            match parsed {
                Some(value) => Ok(BigInt::from_num_bigint(agent, value, gc)),
                None => {
                    let message = format!("Cannot convert {} to a BigInt", s.as_str(agent));
                    Err(agent.throw_exception(ExceptionType::SyntaxError, message, gc))
                }
            }
        }
        _ => unreachable!(),
    }
}

/// ### [7.1.14 StringToBigInt ( str )](https://tc39.es/ecma262/#sec-stringtobigint)
pub fn string_to_big_int(text: &str) -> Option<num_bigint::BigInt> {
    let text = text.trim_matches(is_js_whitespace);
    if text.is_empty() {
        return Some(num_bigint::BigInt::ZERO);
    }
    let (radix, digits, sign) = match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => (16, &text[2..], Sign::Plus),
        [b'0', b'o' | b'O', ..] => (8, &text[2..], Sign::Plus),
        [b'0', b'b' | b'B', ..] => (2, &text[2..], Sign::Plus),
        [b'-', ..] => (10, &text[1..], Sign::Minus),
        [b'+', ..] => (10, &text[1..], Sign::Plus),
        _ => (10, text, Sign::Plus),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = num_bigint::BigUint::parse_bytes(digits.as_bytes(), radix)?;
    Some(num_bigint::BigInt::from_biguint(sign, magnitude))
}

/// ### [7.1.17 ToString ( argument )](https://tc39.es/ecma262/#sec-tostring)
pub fn to_string<'gc>(
    agent: &mut Agent,
    argument: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, String<'gc>> {
    if let Value::String(s) = argument {
        return Ok(s.unbind());
    }
    if argument.is_primitive() {
        return Ok(to_string_primitive(agent, argument, gc.into_nogc()));
    }
    // 9. Assert: argument is an Object.
    // 10. Let primValue be ? ToPrimitive(argument, STRING).
    let prim_value =
        to_primitive(agent, argument, Some(PreferredType::String), gc.reborrow()).unbind()?;
    // 11. Assert: primValue is not an Object.
    // 12. Return ? ToString(primValue).
    Ok(to_string_primitive(agent, prim_value, gc.into_nogc()))
}

/// ToString of a primitive value. Never calls into user code.
pub(crate) fn to_string_primitive<'gc>(
    agent: &mut Agent,
    argument: Value,
    gc: NoGcScope<'gc, '_>,
) -> String<'gc> {
    match argument {
        Value::String(s) => s.bind(gc),
        Value::Undefined => BUILTIN_STRING_MEMORY.undefined,
        Value::Null => BUILTIN_STRING_MEMORY.null,
        Value::Boolean(true) => BUILTIN_STRING_MEMORY.r#true,
        Value::Boolean(false) => BUILTIN_STRING_MEMORY.r#false,
        Value::Number(n) => number_to_string(agent, n, gc),
        Value::BigInt(n) => n.to_string_radix_10(agent, gc),
        _ => unreachable!("ToString of an object must go through ToPrimitive"),
    }
}

/// ### [6.1.6.1.20 Number::toString ( x, radix )](https://tc39.es/ecma262/#sec-numeric-types-number-tostring)
pub fn number_to_string<'gc>(agent: &mut Agent, x: f64, gc: NoGcScope<'gc, '_>) -> String<'gc> {
    if x.is_nan() {
        return BUILTIN_STRING_MEMORY.NaN;
    }
    if x == 0.0 {
        return BUILTIN_STRING_MEMORY.zero;
    }
    if x.is_infinite() {
        return if x > 0.0 {
            BUILTIN_STRING_MEMORY.Infinity
        } else {
            BUILTIN_STRING_MEMORY.NegativeInfinity
        };
    }
    String::from_string(agent, format_finite_number(x), gc)
}

/// Radix 10 formatting of a finite, non-zero Number.
fn format_finite_number(x: f64) -> std::string::String {
    if x.fract() == 0.0 && x.abs() <= MAX_SAFE_INTEGER {
        return (x as i64).to_string();
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format_finite(x).to_owned()
}

/// ### [7.1.18 ToObject ( argument )](https://tc39.es/ecma262/#sec-toobject)
///
/// Primitive wrapper objects are not modelled. A String converts to an
/// ordinary array-like object holding its code points; other primitives
/// convert to an empty ordinary object.
pub fn to_object<'gc>(
    agent: &mut Agent,
    argument: Value,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, Object<'gc>> {
    if let Ok(object) = Object::try_from(argument) {
        return Ok(object.unbind().bind(gc));
    }
    match argument {
        Value::Undefined | Value::Null => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert undefined or null to object",
            gc,
        )),
        Value::String(s) => {
            let object = OrdinaryObject::create_with_intrinsic_prototype(
                agent,
                ProtoIntrinsics::Object,
                gc,
            );
            let text = s.as_str(agent).to_owned();
            let mut length = 0u32;
            for (index, c) in text.chars().enumerate() {
                let mut buffer = [0u8; 4];
                let element = String::from_str(agent, c.encode_utf8(&mut buffer), gc);
                object.set_data_property(agent, PropertyKey::from(index as u32), element.into());
                length += 1;
            }
            object.set_data_property(agent, BUILTIN_STRING_MEMORY.length.into(), length.into());
            Ok(object.into())
        }
        Value::Boolean(_) | Value::Number(_) | Value::BigInt(_) => Ok(
            OrdinaryObject::create_with_intrinsic_prototype(agent, ProtoIntrinsics::Object, gc)
                .into(),
        ),
        _ => unreachable!(),
    }
}

/// ### [7.1.19 ToPropertyKey ( argument )](https://tc39.es/ecma262/#sec-topropertykey)
pub fn to_property_key<'gc>(
    agent: &mut Agent,
    argument: Value,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, PropertyKey<'gc>> {
    match argument {
        Value::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= MAX_SAFE_INTEGER => {
            Ok(PropertyKey::Integer(n as u64))
        }
        Value::String(s) => Ok(PropertyKey::from_string(agent, s.unbind())),
        _ => {
            let key = to_string(agent, argument, gc)?;
            Ok(PropertyKey::from_string(agent, key))
        }
    }
}

/// ### [7.1.20 ToLength ( argument )](https://tc39.es/ecma262/#sec-tolength)
pub fn to_length<'gc>(agent: &mut Agent, argument: Value, gc: GcScope<'gc, '_>) -> JsResult<'gc, u64> {
    // 1. Let len be ? ToIntegerOrInfinity(argument).
    let len = to_integer_or_infinity(agent, argument, gc)?;
    // 2. If len ≤ 0, return +0𝔽.
    if len <= 0.0 {
        return Ok(0);
    }
    // 3. Return 𝔽(min(len, 2**53 - 1)).
    Ok(len.min(MAX_SAFE_INTEGER) as u64)
}

/// ### [7.1.21 CanonicalNumericIndexString ( argument )](https://tc39.es/ecma262/#sec-canonicalnumericindexstring)
///
/// Integer keys are already normalised by [`PropertyKey`]; this classifies
/// the remaining string keys, such as `"-1"`, `"1.5"` or `"-0"`. Returns
/// `None` for keys that are not numeric.
pub(crate) fn canonical_numeric_index_string(text: &str) -> Option<f64> {
    // 1. If argument is "-0", return -0𝔽.
    if text == "-0" {
        return Some(-0.0);
    }
    // 2. Let n be ! ToNumber(argument).
    let n = string_to_number(text);
    // 3. If ! ToString(n) is argument, return n.
    let canonical = if n.is_nan() {
        text == "NaN"
    } else if n == 0.0 {
        text == "0"
    } else if n.is_infinite() {
        text == if n > 0.0 { "Infinity" } else { "-Infinity" }
    } else {
        format_finite_number(n) == text
    };
    // 4. Return undefined.
    canonical.then_some(n)
}

/// ### [7.1.22 ToIndex ( value )](https://tc39.es/ecma262/#sec-toindex)
pub fn to_index<'gc>(agent: &mut Agent, argument: Value, mut gc: GcScope<'gc, '_>) -> JsResult<'gc, u64> {
    if let Value::Number(n) = argument
        && n >= 0.0
        && n.fract() == 0.0
        && n <= MAX_SAFE_INTEGER
    {
        return Ok(n as u64);
    }
    // 1. Let integer be ? ToIntegerOrInfinity(value).
    let integer = to_integer_or_infinity(agent, argument, gc.reborrow()).unbind()?;
    // 2. If integer is not in the inclusive interval from 0 to 2**53 - 1,
    //    throw a RangeError exception.
    if !(0.0..=MAX_SAFE_INTEGER).contains(&integer) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Index is out of range",
            gc.into_nogc(),
        ));
    }
    // 3. Return integer.
    Ok(integer as u64)
}

/// Index argument normalisation shared by the relative-index algorithms:
/// negative values count back from `len`, and the result is clamped to
/// `0..=len`. Absent arguments take `default`.
pub(crate) fn to_relative_index<'gc>(
    agent: &mut Agent,
    argument: Option<Value>,
    len: u64,
    default: u64,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, u64> {
    let Some(argument) = argument.filter(|argument| !argument.is_undefined()) else {
        return Ok(default);
    };
    let relative = to_integer_or_infinity(agent, argument, gc)?;
    Ok(clamp_relative_index(relative, len))
}

pub(crate) fn clamp_relative_index(relative: f64, len: u64) -> u64 {
    if relative == f64::NEG_INFINITY {
        0
    } else if relative < 0.0 {
        (len as f64 + relative).max(0.0) as u64
    } else {
        relative.min(len as f64) as u64
    }
}

/// Create an Array holding `values`. Never calls into user code.
pub(crate) fn create_array_from_list<'gc>(
    agent: &mut Agent,
    values: &[Value],
    gc: NoGcScope<'gc, '_>,
) -> Array<'gc> {
    Array::from_slice(agent, values, gc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_number_follows_str_numeric_literal() {
        assert_eq!(string_to_number("  42  "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(string_to_number(".5"), 0.5);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("nan").is_nan());
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("-0x10").is_nan());
    }

    #[test]
    fn string_to_big_int_accepts_prefixes() {
        assert_eq!(string_to_big_int("0x10"), Some(16.into()));
        assert_eq!(string_to_big_int(" -12 "), Some((-12).into()));
        assert_eq!(string_to_big_int(""), Some(0.into()));
        assert_eq!(string_to_big_int("1.5"), None);
        assert_eq!(string_to_big_int("-0x1"), None);
    }

    #[test]
    fn canonical_numeric_strings() {
        assert_eq!(canonical_numeric_index_string("-1"), Some(-1.0));
        assert_eq!(canonical_numeric_index_string("1.5"), Some(1.5));
        assert!(canonical_numeric_index_string("-0").is_some_and(|n| n.is_sign_negative()));
        assert!(canonical_numeric_index_string("NaN").is_some_and(f64::is_nan));
        assert_eq!(canonical_numeric_index_string("Infinity"), Some(f64::INFINITY));
        assert_eq!(canonical_numeric_index_string("01"), None);
        assert_eq!(canonical_numeric_index_string("1e3"), None);
        assert_eq!(canonical_numeric_index_string("length"), None);
    }

    #[test]
    fn relative_indexes_clamp() {
        assert_eq!(clamp_relative_index(-2.0, 5), 3);
        assert_eq!(clamp_relative_index(-10.0, 5), 0);
        assert_eq!(clamp_relative_index(f64::NEG_INFINITY, 5), 0);
        assert_eq!(clamp_relative_index(f64::INFINITY, 5), 5);
        assert_eq!(clamp_relative_index(2.0, 5), 2);
    }

    #[test]
    fn uint32_wraps() {
        assert_eq!(number_to_uint32(-1.0), u32::MAX);
        assert_eq!(number_to_uint32(4_294_967_296.0), 0);
        assert_eq!(number_to_uint32(f64::NAN), 0);
        assert_eq!(number_to_uint32(3.9), 3);
    }

    #[test]
    fn numbers_format_like_number_to_string() {
        let mut agent = Agent::new(crate::ecmascript::execution::Options::default());
        agent.run(|agent, gc| {
            let cases = [
                (1.0, "1"),
                (-0.0, "0"),
                (-12.0, "-12"),
                (0.5, "0.5"),
                (1e21, "1e+21"),
                (f64::NAN, "NaN"),
                (f64::NEG_INFINITY, "-Infinity"),
            ];
            for (number, expected) in cases {
                let s = number_to_string(agent, number, gc.nogc());
                assert_eq!(s.as_str(agent), expected);
            }
        });
    }
}
