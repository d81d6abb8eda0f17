// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{BigInt, Object, OrdinaryObject, String};
use crate::{
    ecmascript::builtins::{
        Array, ArrayBuffer, Function, error::Error,
        indexed_collections::array_objects::array_iterator_objects::ArrayIterator,
        typed_array::TypedArray,
    },
    engine::context::bindable_handle,
    heap::indexes::TypedArrayIndex,
};

/// ### [6.1 ECMAScript Language Types](https://tc39.es/ecma262/#sec-ecmascript-language-types)
///
/// Numbers are stored inline. Strings, BigInts and objects are handles into
/// the heap, branded with the lifetime of the scope they were bound to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value<'a> {
    /// ### [6.1.1 The Undefined Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-undefined-type)
    #[default]
    Undefined,
    /// ### [6.1.2 The Null Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-null-type)
    Null,
    /// ### [6.1.3 The Boolean Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-boolean-type)
    Boolean(bool),
    /// ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
    String(String<'a>),
    /// ### [6.1.6.1 The Number Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-number-type)
    Number(f64),
    /// ### [6.1.6.2 The BigInt Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-bigint-type)
    BigInt(BigInt<'a>),

    // Object variants
    Object(OrdinaryObject<'a>),
    Array(Array<'a>),
    ArrayBuffer(ArrayBuffer<'a>),
    ArrayIterator(ArrayIterator<'a>),
    Error(Error<'a>),
    Function(Function<'a>),
    Int8Array(TypedArrayIndex<'a>),
    Uint8Array(TypedArrayIndex<'a>),
    Uint8ClampedArray(TypedArrayIndex<'a>),
    Int16Array(TypedArrayIndex<'a>),
    Uint16Array(TypedArrayIndex<'a>),
    Int32Array(TypedArrayIndex<'a>),
    Uint32Array(TypedArrayIndex<'a>),
    BigInt64Array(TypedArrayIndex<'a>),
    BigUint64Array(TypedArrayIndex<'a>),
    Float32Array(TypedArrayIndex<'a>),
    Float64Array(TypedArrayIndex<'a>),
}
bindable_handle!(Value);

impl<'a> Value<'a> {
    pub const fn from_f64(value: f64) -> Self {
        Value::Number(value)
    }

    pub const fn is_undefined(self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub const fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    pub const fn is_nullish(self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub const fn is_number(self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub const fn is_string(self) -> bool {
        matches!(self, Value::String(_))
    }

    pub const fn is_bigint(self) -> bool {
        matches!(self, Value::BigInt(_))
    }

    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Value::Undefined
                | Value::Null
                | Value::Boolean(_)
                | Value::String(_)
                | Value::Number(_)
                | Value::BigInt(_)
        )
    }

    pub const fn is_object(self) -> bool {
        !self.is_primitive()
    }

    pub fn as_number(self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value<'_> {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value<'_> {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl<'a> From<String<'a>> for Value<'a> {
    fn from(value: String<'a>) -> Self {
        Value::String(value)
    }
}

impl<'a> From<BigInt<'a>> for Value<'a> {
    fn from(value: BigInt<'a>) -> Self {
        Value::BigInt(value)
    }
}

impl<'a> From<Object<'a>> for Value<'a> {
    fn from(value: Object<'a>) -> Self {
        match value {
            Object::Object(d) => Value::Object(d),
            Object::Array(d) => Value::Array(d),
            Object::ArrayBuffer(d) => Value::ArrayBuffer(d),
            Object::ArrayIterator(d) => Value::ArrayIterator(d),
            Object::Error(d) => Value::Error(d),
            Object::Function(d) => Value::Function(d),
            Object::Int8Array(d) => Value::Int8Array(d),
            Object::Uint8Array(d) => Value::Uint8Array(d),
            Object::Uint8ClampedArray(d) => Value::Uint8ClampedArray(d),
            Object::Int16Array(d) => Value::Int16Array(d),
            Object::Uint16Array(d) => Value::Uint16Array(d),
            Object::Int32Array(d) => Value::Int32Array(d),
            Object::Uint32Array(d) => Value::Uint32Array(d),
            Object::BigInt64Array(d) => Value::BigInt64Array(d),
            Object::BigUint64Array(d) => Value::BigUint64Array(d),
            Object::Float32Array(d) => Value::Float32Array(d),
            Object::Float64Array(d) => Value::Float64Array(d),
        }
    }
}

macro_rules! value_from_object_handle {
    ($($name: ident),*) => {
        $(
            impl<'a> From<$name<'a>> for Value<'a> {
                fn from(value: $name<'a>) -> Self {
                    Object::from(value).into()
                }
            }
        )*
    };
}

value_from_object_handle!(
    OrdinaryObject,
    Array,
    ArrayBuffer,
    ArrayIterator,
    Error,
    Function,
    TypedArray
);

impl<'a> TryFrom<Value<'a>> for String<'a> {
    type Error = ();

    fn try_from(value: Value<'a>) -> Result<Self, ()> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(()),
        }
    }
}

/// Conversion into a [`Value`] handle keeping the same lifetime.
pub trait IntoValue<'a> {
    fn into_value(self) -> Value<'a>;
}

impl<'a, T: Into<Value<'a>>> IntoValue<'a> for T {
    #[inline]
    fn into_value(self) -> Value<'a> {
        self.into()
    }
}
