// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod internal_methods;
mod internal_slots;
mod property_key;

use std::ops::{Index, IndexMut};

use ahash::RandomState;
use hashbrown::HashMap;

pub use internal_methods::InternalMethods;
pub(crate) use internal_methods::{ordinary_get, ordinary_has_property, ordinary_set};
pub use internal_slots::InternalSlots;
pub use property_key::{PropertyKey, PropertyValue, WellKnownSymbol};

use super::Value;
use crate::{
    ecmascript::{
        builtins::{
            Array, ArrayBuffer, Function, error::Error,
            indexed_collections::array_objects::array_iterator_objects::ArrayIterator,
            typed_array::TypedArray,
        },
        execution::{Agent, ProtoIntrinsics},
    },
    engine::context::{Bindable, NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::{ObjectIndex, TypedArrayIndex}},
};

/// ### [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
///
/// A closed set of object kinds; every internal method dispatches over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Object<'a> {
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
bindable_handle!(Object);

/// An object with no exotic behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrdinaryObject<'a>(pub(crate) ObjectIndex<'a>);
bindable_handle!(OrdinaryObject);

pub type PropertyStorage = HashMap<PropertyKey<'static>, PropertyValue<'static>, RandomState>;

#[derive(Debug, Default)]
pub struct ObjectHeapData {
    pub(crate) prototype: Option<Object<'static>>,
    pub(crate) properties: PropertyStorage,
}

impl ObjectHeapData {
    pub(crate) fn new(prototype: Option<Object<'static>>) -> Self {
        Self {
            prototype,
            properties: PropertyStorage::default(),
        }
    }
}

impl CreateHeapData<ObjectHeapData, OrdinaryObject<'static>> for Heap {
    fn create(&mut self, data: ObjectHeapData) -> OrdinaryObject<'static> {
        self.objects.push(data);
        OrdinaryObject(ObjectIndex::last(&self.objects))
    }
}

impl Index<OrdinaryObject<'_>> for Agent {
    type Output = ObjectHeapData;

    fn index(&self, index: OrdinaryObject<'_>) -> &Self::Output {
        &self.heap.objects[index.0.into_index()]
    }
}

impl IndexMut<OrdinaryObject<'_>> for Agent {
    fn index_mut(&mut self, index: OrdinaryObject<'_>) -> &mut Self::Output {
        &mut self.heap.objects[index.0.into_index()]
    }
}

impl<'a> OrdinaryObject<'a> {
    /// ### [10.1.12 OrdinaryObjectCreate ( proto )](https://tc39.es/ecma262/#sec-ordinaryobjectcreate)
    pub fn create(agent: &mut Agent, prototype: Option<Object>, _: NoGcScope<'a, '_>) -> Self {
        agent.heap.create(ObjectHeapData::new(prototype.map(|p| p.unbind())))
    }

    /// Create an ordinary object whose prototype is the given intrinsic.
    pub fn create_with_intrinsic_prototype(
        agent: &mut Agent,
        prototype: ProtoIntrinsics,
        gc: NoGcScope<'a, '_>,
    ) -> Self {
        let prototype = agent.intrinsics().get_intrinsic_default_proto(prototype);
        Self::create(agent, Some(prototype.into()), gc)
    }

    /// Store a data property without running any user code.
    pub(crate) fn set_data_property(self, agent: &mut Agent, key: PropertyKey, value: Value) {
        agent[self]
            .properties
            .insert(key.unbind(), PropertyValue::Data(value.unbind()));
    }
}

/// Conversion into an [`Object`] handle keeping the same lifetime.
pub trait IntoObject<'a> {
    fn into_object(self) -> Object<'a>;
}

impl<'a, T: Into<Object<'a>>> IntoObject<'a> for T {
    #[inline]
    fn into_object(self) -> Object<'a> {
        self.into()
    }
}

impl<'a> From<OrdinaryObject<'a>> for Object<'a> {
    fn from(value: OrdinaryObject<'a>) -> Self {
        Object::Object(value)
    }
}

impl<'a> From<Array<'a>> for Object<'a> {
    fn from(value: Array<'a>) -> Self {
        Object::Array(value)
    }
}

impl<'a> From<ArrayBuffer<'a>> for Object<'a> {
    fn from(value: ArrayBuffer<'a>) -> Self {
        Object::ArrayBuffer(value)
    }
}

impl<'a> From<ArrayIterator<'a>> for Object<'a> {
    fn from(value: ArrayIterator<'a>) -> Self {
        Object::ArrayIterator(value)
    }
}

impl<'a> From<Error<'a>> for Object<'a> {
    fn from(value: Error<'a>) -> Self {
        Object::Error(value)
    }
}

impl<'a> From<Function<'a>> for Object<'a> {
    fn from(value: Function<'a>) -> Self {
        Object::Function(value)
    }
}

impl<'a> From<TypedArray<'a>> for Object<'a> {
    fn from(value: TypedArray<'a>) -> Self {
        match value {
            TypedArray::Int8Array(t) => Object::Int8Array(t),
            TypedArray::Uint8Array(t) => Object::Uint8Array(t),
            TypedArray::Uint8ClampedArray(t) => Object::Uint8ClampedArray(t),
            TypedArray::Int16Array(t) => Object::Int16Array(t),
            TypedArray::Uint16Array(t) => Object::Uint16Array(t),
            TypedArray::Int32Array(t) => Object::Int32Array(t),
            TypedArray::Uint32Array(t) => Object::Uint32Array(t),
            TypedArray::BigInt64Array(t) => Object::BigInt64Array(t),
            TypedArray::BigUint64Array(t) => Object::BigUint64Array(t),
            TypedArray::Float32Array(t) => Object::Float32Array(t),
            TypedArray::Float64Array(t) => Object::Float64Array(t),
        }
    }
}

impl<'a> TryFrom<Value<'a>> for Object<'a> {
    type Error = ();

    fn try_from(value: Value<'a>) -> Result<Self, ()> {
        Ok(match value {
            Value::Undefined
            | Value::Null
            | Value::Boolean(_)
            | Value::String(_)
            | Value::Number(_)
            | Value::BigInt(_) => return Err(()),
            Value::Object(d) => Object::Object(d),
            Value::Array(d) => Object::Array(d),
            Value::ArrayBuffer(d) => Object::ArrayBuffer(d),
            Value::ArrayIterator(d) => Object::ArrayIterator(d),
            Value::Error(d) => Object::Error(d),
            Value::Function(d) => Object::Function(d),
            Value::Int8Array(d) => Object::Int8Array(d),
            Value::Uint8Array(d) => Object::Uint8Array(d),
            Value::Uint8ClampedArray(d) => Object::Uint8ClampedArray(d),
            Value::Int16Array(d) => Object::Int16Array(d),
            Value::Uint16Array(d) => Object::Uint16Array(d),
            Value::Int32Array(d) => Object::Int32Array(d),
            Value::Uint32Array(d) => Object::Uint32Array(d),
            Value::BigInt64Array(d) => Object::BigInt64Array(d),
            Value::BigUint64Array(d) => Object::BigUint64Array(d),
            Value::Float32Array(d) => Object::Float32Array(d),
            Value::Float64Array(d) => Object::Float64Array(d),
        })
    }
}

macro_rules! object_handle_try_from {
    ($($name: ident),*) => {
        $(
            impl<'a> TryFrom<Value<'a>> for $name<'a> {
                type Error = ();

                fn try_from(value: Value<'a>) -> Result<Self, ()> {
                    match value {
                        Value::$name(d) => Ok(d),
                        _ => Err(()),
                    }
                }
            }

            impl<'a> TryFrom<Object<'a>> for $name<'a> {
                type Error = ();

                fn try_from(value: Object<'a>) -> Result<Self, ()> {
                    match value {
                        Object::$name(d) => Ok(d),
                        _ => Err(()),
                    }
                }
            }
        )*
    };
}

object_handle_try_from!(Array, ArrayBuffer, ArrayIterator, Error, Function);

impl<'a> TryFrom<Value<'a>> for OrdinaryObject<'a> {
    type Error = ();

    fn try_from(value: Value<'a>) -> Result<Self, ()> {
        match value {
            Value::Object(d) => Ok(d),
            _ => Err(()),
        }
    }
}

/// Dispatch an internal method call to the concrete object kind.
macro_rules! object_delegate {
    ($object: expr, $method: ident, $($arg: expr),*) => {{
        use $crate::ecmascript::{builtins::typed_array::TypedArray, types::Object};
        match $object {
            Object::Object(d) => d.$method($($arg),*),
            Object::Array(d) => d.$method($($arg),*),
            Object::ArrayBuffer(d) => d.$method($($arg),*),
            Object::ArrayIterator(d) => d.$method($($arg),*),
            Object::Error(d) => d.$method($($arg),*),
            Object::Function(d) => d.$method($($arg),*),
            Object::Int8Array(d) => TypedArray::Int8Array(d).$method($($arg),*),
            Object::Uint8Array(d) => TypedArray::Uint8Array(d).$method($($arg),*),
            Object::Uint8ClampedArray(d) => TypedArray::Uint8ClampedArray(d).$method($($arg),*),
            Object::Int16Array(d) => TypedArray::Int16Array(d).$method($($arg),*),
            Object::Uint16Array(d) => TypedArray::Uint16Array(d).$method($($arg),*),
            Object::Int32Array(d) => TypedArray::Int32Array(d).$method($($arg),*),
            Object::Uint32Array(d) => TypedArray::Uint32Array(d).$method($($arg),*),
            Object::BigInt64Array(d) => TypedArray::BigInt64Array(d).$method($($arg),*),
            Object::BigUint64Array(d) => TypedArray::BigUint64Array(d).$method($($arg),*),
            Object::Float32Array(d) => TypedArray::Float32Array(d).$method($($arg),*),
            Object::Float64Array(d) => TypedArray::Float64Array(d).$method($($arg),*),
        }
    }};
}
pub(crate) use object_delegate;

impl<'a> Object<'a> {
    pub fn is_typed_array(self) -> bool {
        TypedArray::try_from(self).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::{Agent, Options};

    #[test]
    fn value_object_conversions_are_inverse() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let object =
                OrdinaryObject::create_with_intrinsic_prototype(agent, ProtoIntrinsics::Object, gc.nogc());
            let value = Value::from(object);
            assert!(value.is_object());
            assert_eq!(Object::try_from(value), Ok(Object::Object(object)));
            assert!(Object::try_from(Value::Number(1.0)).is_err());
        });
    }
}
