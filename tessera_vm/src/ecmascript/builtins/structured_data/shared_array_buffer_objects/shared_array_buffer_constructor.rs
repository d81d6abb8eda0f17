// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        abstract_operations::type_conversion::to_index,
        builders::BuiltinFunctionBuilder,
        builtins::{
            ArgumentsList, Behaviour, Builtin, BuiltinGetter,
            array_buffer::abstract_operations::{
                allocate_shared_array_buffer, get_array_buffer_max_byte_length_option,
            },
            structured_data::array_buffer_objects::array_buffer_constructor::{
                ArrayBufferConstructor, require_new_target,
            },
        },
        execution::{Agent, JsResult},
        types::{Object, PropertyKey, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope},
    },
};

pub(crate) struct SharedArrayBufferConstructor;
impl Builtin for SharedArrayBufferConstructor {
    const NAME: &'static str = "SharedArrayBuffer";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(Self::constructor);
}

struct SharedArrayBufferGetSpecies;
impl Builtin for SharedArrayBufferGetSpecies {
    const NAME: &'static str = "get [Symbol.species]";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::Symbol(WellKnownSymbol::Species));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferConstructor::get_species);
}
impl BuiltinGetter for SharedArrayBufferGetSpecies {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::Symbol(WellKnownSymbol::Species);
}

impl SharedArrayBufferConstructor {
    /// ### [25.2.3.1 SharedArrayBuffer ( length \[ , options \] )](https://tc39.es/ecma262/#sec-sharedarraybuffer-length)
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
        let options = arguments
            .get_if_present(1)
            .map(|options| options.scope(agent, gc.nogc()));
        // 2. Let byteLength be ? ToIndex(length).
        let byte_length = to_index(agent, arguments.get(0), gc.reborrow()).unbind()?;
        // 3. Let requestedMaxByteLength be ? GetArrayBufferMaxByteLengthOption(options).
        let requested_max_byte_length = match options {
            Some(options) => {
                get_array_buffer_max_byte_length_option(agent, options.get(agent), gc.reborrow())
                    .unbind()?
            }
            None => None,
        };
        // 4. Return ? AllocateSharedArrayBuffer(NewTarget, byteLength, requestedMaxByteLength).
        allocate_shared_array_buffer(
            agent,
            new_target.get(agent),
            byte_length,
            requested_max_byte_length,
            gc,
        )
        .map(Value::from)
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let this = intrinsics.shared_array_buffer();
        let shared_array_buffer_prototype = intrinsics.shared_array_buffer_prototype();
        BuiltinFunctionBuilder::new_intrinsic_constructor::<SharedArrayBufferConstructor>(
            agent, this, None,
        )
        .with_property_capacity(2)
        .with_prototype_property(shared_array_buffer_prototype)
        .with_builtin_function_getter_property::<SharedArrayBufferGetSpecies>()
        .build();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::{construct, get},
        builtins::ArrayBuffer,
        execution::{ExceptionType, Options},
        types::InternalMethods,
    };

    #[test]
    fn constructs_shared_buffers_with_their_own_prototype() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let constructor = agent.intrinsics().shared_array_buffer();
            let prototype = agent.intrinsics().shared_array_buffer_prototype();
            let buffer = construct(agent, constructor, &[Value::Number(12.0)], None, gc.reborrow())
                .unwrap()
                .unbind();
            assert_eq!(buffer.internal_get_prototype_of(agent), Some(prototype.into()));
            let buffer = ArrayBuffer::try_from(buffer).unwrap();
            assert!(buffer.is_shared(agent));
            assert_eq!(buffer.byte_length(agent), 12);

            let species = get(
                agent,
                constructor.into(),
                WellKnownSymbol::Species.into(),
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(species, Value::from(constructor));
        });
    }

    #[test]
    fn requires_new() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let constructor = agent.intrinsics().shared_array_buffer();
            let error = crate::ecmascript::abstract_operations::operations_on_objects::call_function(
                agent,
                constructor,
                Value::Undefined,
                &[Value::Number(1.0)],
                gc.reborrow(),
            )
            .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }
}
