// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        abstract_operations::type_conversion::to_index,
        builders::BuiltinFunctionBuilder,
        builtins::{
            ArgumentsList, Behaviour, Builtin, BuiltinGetter, Function,
            array_buffer::abstract_operations::{
                allocate_array_buffer, get_array_buffer_max_byte_length_option,
            },
        },
        execution::{Agent, ExceptionType, JsResult},
        types::{Object, PropertyKey, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope},
    },
};

pub(crate) struct ArrayBufferConstructor;
impl Builtin for ArrayBufferConstructor {
    const NAME: &'static str = "ArrayBuffer";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(Self::constructor);
}

struct ArrayBufferIsView;
impl Builtin for ArrayBufferIsView {
    const NAME: &'static str = "isView";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferConstructor::is_view);
}

struct ArrayBufferGetSpecies;
impl Builtin for ArrayBufferGetSpecies {
    const NAME: &'static str = "get [Symbol.species]";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::Symbol(WellKnownSymbol::Species));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferConstructor::get_species);
}
impl BuiltinGetter for ArrayBufferGetSpecies {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::Symbol(WellKnownSymbol::Species);
}

/// Resolve NewTarget of a constructor call, throwing if the constructor was
/// called without `new`.
pub(crate) fn require_new_target<'gc>(
    agent: &mut Agent,
    new_target: Option<Object>,
    name: &'static str,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Function<'gc>> {
    match new_target.map(Function::try_from) {
        Some(Ok(new_target)) => Ok(new_target.bind(gc.into_nogc())),
        Some(Err(())) => unreachable!("NewTarget is always a constructor"),
        None => Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Constructor {name} requires 'new'"),
            gc.into_nogc(),
        )),
    }
}

impl ArrayBufferConstructor {
    /// ### [25.1.4.1 ArrayBuffer ( length \[ , options \] )](https://tc39.es/ecma262/#sec-arraybuffer-constructor)
    fn constructor<'gc>(
        agent: &mut Agent,
        _this_value: Value,
        arguments: ArgumentsList,
        new_target: Option<Object>,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        let new_target = require_new_target(agent, new_target, Self::NAME, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        let length = arguments.get(0);
        let options = arguments.get_if_present(1).map(|options| options.scope(agent, gc.nogc()));
        // 2. Let byteLength be ? ToIndex(length).
        let byte_length = to_index(agent, length, gc.reborrow()).unbind()?;
        // 3. Let requestedMaxByteLength be ? GetArrayBufferMaxByteLengthOption(options).
        let requested_max_byte_length = match options {
            Some(options) => {
                get_array_buffer_max_byte_length_option(agent, options.get(agent), gc.reborrow())
                    .unbind()?
            }
            None => None,
        };
        // 4. Return ? AllocateArrayBuffer(NewTarget, byteLength, requestedMaxByteLength).
        allocate_array_buffer(
            agent,
            new_target.get(agent),
            byte_length,
            requested_max_byte_length,
            gc,
        )
        .map(Value::from)
    }

    /// ### [25.1.5.1 ArrayBuffer.isView ( arg )](https://tc39.es/ecma262/#sec-arraybuffer.isview)
    fn is_view<'gc>(
        _agent: &mut Agent,
        _this_value: Value,
        arguments: ArgumentsList,
        _gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. If arg is not an Object, return false.
        // 2. If arg has a [[ViewedArrayBuffer]] internal slot, return true.
        // 3. Return false.
        Ok(matches!(
            arguments.get(0),
            Value::Int8Array(_)
                | Value::Uint8Array(_)
                | Value::Uint8ClampedArray(_)
                | Value::Int16Array(_)
                | Value::Uint16Array(_)
                | Value::Int32Array(_)
                | Value::Uint32Array(_)
                | Value::BigInt64Array(_)
                | Value::BigUint64Array(_)
                | Value::Float32Array(_)
                | Value::Float64Array(_)
        )
        .into())
    }

    /// ### [25.1.5.3 get ArrayBuffer \[ %Symbol.species% \]](https://tc39.es/ecma262/#sec-get-arraybuffer-%symbol.species%)
    ///
    /// Also installed as the species getter of SharedArrayBuffer, Array and
    /// %TypedArray%.
    pub(crate) fn get_species<'gc>(
        _agent: &mut Agent,
        this_value: Value,
        _arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Return the this value.
        Ok(this_value.bind(gc.into_nogc()))
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let this = intrinsics.array_buffer();
        let array_buffer_prototype = intrinsics.array_buffer_prototype();
        BuiltinFunctionBuilder::new_intrinsic_constructor::<ArrayBufferConstructor>(agent, this, None)
            .with_property_capacity(3)
            .with_builtin_function_property::<ArrayBufferIsView>()
            .with_prototype_property(array_buffer_prototype)
            .with_builtin_function_getter_property::<ArrayBufferGetSpecies>()
            .build();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::{call_function, construct},
        builtins::ArrayBuffer,
        execution::Options,
        types::OrdinaryObject,
    };

    #[test]
    fn constructs_fixed_and_resizable_buffers() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let constructor = agent.intrinsics().array_buffer();
            let fixed = construct(agent, constructor, &[Value::Number(8.0)], None, gc.reborrow())
                .unwrap()
                .unbind();
            let fixed = ArrayBuffer::try_from(fixed).unwrap();
            assert_eq!(fixed.byte_length(agent), 8);
            assert!(fixed.is_fixed_length(agent));

            let options = OrdinaryObject::create(agent, None, gc.nogc()).unbind();
            let max_byte_length = crate::ecmascript::types::BUILTIN_STRING_MEMORY.maxByteLength;
            options.set_data_property(agent, max_byte_length.into(), Value::Number(16.0));
            let resizable = construct(
                agent,
                constructor,
                &[Value::Number(4.0), options.into()],
                None,
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            let resizable = ArrayBuffer::try_from(resizable).unwrap();
            assert_eq!(resizable.byte_length(agent), 4);
            assert_eq!(resizable.max_byte_length(agent), 16);

            let error = construct(
                agent,
                constructor,
                &[Value::Number(32.0), options.into()],
                None,
                gc.reborrow(),
            )
            .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        });
    }

    #[test]
    fn calling_without_new_throws() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let constructor = agent.intrinsics().array_buffer();
            let error = call_function(agent, constructor, Value::Undefined, &[], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
            let error = construct(agent, constructor, &[Value::Number(-1.0)], None, gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        });
    }
}
