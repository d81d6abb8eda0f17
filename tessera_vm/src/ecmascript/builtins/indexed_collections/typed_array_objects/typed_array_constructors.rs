// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.2.5 The TypedArray Constructors](https://tc39.es/ecma262/#sec-typedarray-constructors)

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_iterator_objects::{get_iterator_from_method, iterator_to_list},
            operations_on_objects::{get_method, get_prototype_from_constructor},
            type_conversion::to_index,
        },
        builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder},
        builtins::{
            ArgumentsList, Behaviour, Builtin, Function, TypedArray,
            builtin_function::allocate_builtin_function,
            structured_data::array_buffer_objects::array_buffer_constructor::require_new_target,
        },
        execution::{Agent, JsResult, ProtoIntrinsics},
        types::{BUILTIN_STRING_MEMORY, ElementType, Object, PropertyKey, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope},
    },
    heap::Heap,
};

use super::abstract_operations::{
    allocate_typed_array, initialize_typed_array_from_array_buffer,
    initialize_typed_array_from_array_like, initialize_typed_array_from_list,
    initialize_typed_array_from_typed_array,
};

pub(crate) struct TypedArrayConstructors;

macro_rules! typed_array_constructors {
    ($($constructor: ident: $name: literal => $element_type: ident),* $(,)?) => {
        $(
            struct $constructor;
            impl Builtin for $constructor {
                const NAME: &'static str = $name;
                const LENGTH: u8 = 3;
                const BEHAVIOUR: Behaviour = Behaviour::Constructor(Self::constructor);
            }

            impl $constructor {
                fn constructor<'gc>(
                    agent: &mut Agent,
                    _this_value: Value,
                    arguments: ArgumentsList,
                    new_target: Option<Object>,
                    gc: GcScope<'gc, '_>,
                ) -> JsResult<'gc, Value<'gc>> {
                    typed_array_constructor(
                        agent,
                        arguments,
                        new_target,
                        ElementType::$element_type,
                        Self::NAME,
                        gc,
                    )
                }
            }
        )*

        /// Preallocates the eleven constructors in [`ElementType::ALL`]
        /// order.
        pub(crate) fn allocate_typed_array_constructors(heap: &mut Heap) -> [Function<'static>; 11] {
            [$(allocate_builtin_function::<$constructor>(heap)),*]
        }

        impl TypedArrayConstructors {
            pub(crate) fn create_intrinsic(agent: &mut Agent) {
                $(create_typed_array_constructor::<$constructor>(agent, ElementType::$element_type);)*
            }
        }
    };
}

typed_array_constructors! {
    Int8ArrayConstructor: "Int8Array" => Int8,
    Uint8ArrayConstructor: "Uint8Array" => Uint8,
    Uint8ClampedArrayConstructor: "Uint8ClampedArray" => Uint8Clamped,
    Int16ArrayConstructor: "Int16Array" => Int16,
    Uint16ArrayConstructor: "Uint16Array" => Uint16,
    Int32ArrayConstructor: "Int32Array" => Int32,
    Uint32ArrayConstructor: "Uint32Array" => Uint32,
    BigInt64ArrayConstructor: "BigInt64Array" => BigInt64,
    BigUint64ArrayConstructor: "BigUint64Array" => BigUint64,
    Float32ArrayConstructor: "Float32Array" => Float32,
    Float64ArrayConstructor: "Float64Array" => Float64,
}

/// ### [23.2.5.1 TypedArray ( ...args )](https://tc39.es/ecma262/#sec-typedarray)
fn typed_array_constructor<'gc>(
    agent: &mut Agent,
    arguments: ArgumentsList,
    new_target: Option<Object>,
    element_type: ElementType,
    name: &'static str,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    // 1. If NewTarget is undefined, throw a TypeError exception.
    let new_target = require_new_target(agent, new_target, name, gc.reborrow())
        .unbind()?
        .scope(agent, gc.nogc());
    let byte_offset = arguments.get(1).scope(agent, gc.nogc());
    let length = arguments.get(2).scope(agent, gc.nogc());
    // 5. If numberOfArgs = 0, then
    //   a. Return ? AllocateTypedArray(constructorName, NewTarget, proto, 0).
    // 6. Else,
    //   a. Let firstArgument be args[0].
    let first_argument = arguments.get(0);
    //   b. If firstArgument is an Object, then
    let Ok(first_argument) = Object::try_from(first_argument) else {
        //   c. Else,
        //     i. Assert: firstArgument is not an Object.
        //     ii. Let elementLength be ? ToIndex(firstArgument).
        let element_length = to_index(agent, first_argument, gc.reborrow()).unbind()?;
        //     iii. Return ? AllocateTypedArray(constructorName, NewTarget, proto, elementLength).
        return allocate_typed_array(
            agent,
            element_type,
            new_target.get(agent),
            element_length,
            gc,
        )
        .map(Value::from);
    };
    let first_argument = first_argument.scope(agent, gc.nogc());
    // i. Let O be ? AllocateTypedArray(constructorName, NewTarget, proto).
    let proto = get_prototype_from_constructor(
        agent,
        new_target.get(agent),
        ProtoIntrinsics::TypedArray(element_type),
        gc.reborrow(),
    )
    .unbind()?;
    let first = first_argument.get(agent);
    // ii. If firstArgument has a [[TypedArrayName]] internal slot, then
    if let Ok(src_array) = TypedArray::try_from(first) {
        // 1. Perform ? InitializeTypedArrayFromTypedArray(O, firstArgument).
        return initialize_typed_array_from_typed_array(
            agent,
            element_type,
            proto,
            src_array,
            gc.into_nogc(),
        )
        .map(Value::from);
    }
    // iii. Else if firstArgument has an [[ArrayBufferData]] internal slot, then
    if let Object::ArrayBuffer(buffer) = first {
        // 1. If numberOfArgs > 1, let byteOffset be args[1]; else let
        //    byteOffset be undefined.
        // 2. If numberOfArgs > 2, let length be args[2]; else let length be
        //    undefined.
        // 3. Perform ? InitializeTypedArrayFromArrayBuffer(O, firstArgument,
        //    byteOffset, length).
        let byte_offset = byte_offset.get(agent);
        let length = length.get(agent);
        return initialize_typed_array_from_array_buffer(
            agent,
            element_type,
            proto,
            buffer,
            byte_offset,
            length,
            gc,
        )
        .map(Value::from);
    }
    // iv. Else,
    let proto = proto.scope(agent, gc.nogc());
    //   2. Let usingIterator be ? GetMethod(firstArgument, %Symbol.iterator%).
    let using_iterator = get_method(
        agent,
        first.into(),
        PropertyKey::Symbol(WellKnownSymbol::Iterator),
        gc.reborrow(),
    )
    .unbind()?;
    //   3. If usingIterator is not undefined, then
    if let Some(using_iterator) = using_iterator {
        //   a. Let values be ? IteratorToList(? GetIteratorFromMethod(firstArgument, usingIterator)).
        let iterator_record = get_iterator_from_method(
            agent,
            first_argument.get(agent).into(),
            using_iterator,
            gc.reborrow(),
        )
        .unbind()?;
        let values = iterator_to_list(agent, iterator_record, gc.reborrow()).unbind()?;
        //   b. Perform ? InitializeTypedArrayFromList(O, values).
        let proto = proto.get(agent);
        return initialize_typed_array_from_list(agent, element_type, proto, &values, gc)
            .map(Value::from);
    }
    //   4. Else,
    //     b. Perform ? InitializeTypedArrayFromArrayLike(O, firstArgument).
    let proto = proto.get(agent);
    let array_like = first_argument.get(agent);
    initialize_typed_array_from_array_like(agent, element_type, proto, array_like, gc)
        .map(Value::from)
}

/// Fill in one concrete constructor and its prototype object.
fn create_typed_array_constructor<T: Builtin>(agent: &mut Agent, element_type: ElementType) {
    let intrinsics = agent.intrinsics();
    let this = intrinsics.typed_array_constructor(element_type);
    let prototype = intrinsics.typed_array_prototype_of(element_type);
    let typed_array: Object = intrinsics.typed_array().into();
    let typed_array_prototype = intrinsics.typed_array_prototype();
    let bytes_per_element = Value::from_f64(element_type.element_size() as f64);

    // ### [23.2.6 Properties of the TypedArray Constructors](https://tc39.es/ecma262/#sec-properties-of-the-typedarray-constructors)
    BuiltinFunctionBuilder::new_intrinsic_constructor::<T>(agent, this, Some(typed_array))
        .with_property_capacity(2)
        .with_data_property(BUILTIN_STRING_MEMORY.BYTES_PER_ELEMENT.into(), bytes_per_element)
        .with_prototype_property(prototype)
        .build();

    // ### [23.2.7 Properties of the TypedArray Prototype Objects](https://tc39.es/ecma262/#sec-properties-of-typedarray-prototype-objects)
    OrdinaryObjectBuilder::new_intrinsic_object(agent, prototype)
        .with_prototype(typed_array_prototype)
        .with_property_capacity(2)
        .with_data_property(BUILTIN_STRING_MEMORY.BYTES_PER_ELEMENT.into(), bytes_per_element)
        .with_constructor_property(this)
        .build();
}
