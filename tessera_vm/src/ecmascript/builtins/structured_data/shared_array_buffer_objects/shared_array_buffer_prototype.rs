// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::{construct, species_constructor},
            type_conversion::{to_index, to_relative_index},
        },
        builders::OrdinaryObjectBuilder,
        builtins::{ArgumentsList, ArrayBuffer, Behaviour, Builtin, BuiltinGetter},
        execution::{Agent, ExceptionType, JsResult},
        types::{BUILTIN_STRING_MEMORY, PropertyKey, String, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope, NoGcScope},
    },
};

pub(crate) struct SharedArrayBufferPrototype;

struct SharedArrayBufferPrototypeGetByteLength;
impl Builtin for SharedArrayBufferPrototypeGetByteLength {
    const NAME: &'static str = "get byteLength";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(SharedArrayBufferPrototype::get_byte_length);
}
impl BuiltinGetter for SharedArrayBufferPrototypeGetByteLength {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.byteLength);
}

struct SharedArrayBufferPrototypeGetGrowable;
impl Builtin for SharedArrayBufferPrototypeGetGrowable {
    const NAME: &'static str = "get growable";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(SharedArrayBufferPrototype::get_growable);
}
impl BuiltinGetter for SharedArrayBufferPrototypeGetGrowable {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.growable);
}

struct SharedArrayBufferPrototypeGetMaxByteLength;
impl Builtin for SharedArrayBufferPrototypeGetMaxByteLength {
    const NAME: &'static str = "get maxByteLength";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour =
        Behaviour::Regular(SharedArrayBufferPrototype::get_max_byte_length);
}
impl BuiltinGetter for SharedArrayBufferPrototypeGetMaxByteLength {
    const GETTER_KEY: PropertyKey<'static> =
        PropertyKey::String(BUILTIN_STRING_MEMORY.maxByteLength);
}

struct SharedArrayBufferPrototypeGrow;
impl Builtin for SharedArrayBufferPrototypeGrow {
    const NAME: &'static str = "grow";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(SharedArrayBufferPrototype::grow);
}

struct SharedArrayBufferPrototypeSlice;
impl Builtin for SharedArrayBufferPrototypeSlice {
    const NAME: &'static str = "slice";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(SharedArrayBufferPrototype::slice);
}

impl SharedArrayBufferPrototype {
    /// ### [25.2.5.1 get SharedArrayBuffer.prototype.byteLength](https://tc39.es/ecma262/#sec-get-sharedarraybuffer.prototype.bytelength)
    fn get_byte_length<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be the this value.
        // 2. Perform ? RequireInternalSlot(O, [[ArrayBufferData]]).
        // 3. If IsSharedArrayBuffer(O) is false, throw a TypeError exception.
        let o = require_internal_slot_shared_array_buffer(agent, this_value, gc.into_nogc())?;
        // 4. Let length be ArrayBufferByteLength(O, SEQ-CST).
        // 5. Return 𝔽(length).
        Ok(Value::from_f64(o.byte_length(agent) as f64))
    }

    /// ### [25.2.5.4 get SharedArrayBuffer.prototype.growable](https://tc39.es/ecma262/#sec-get-sharedarraybuffer.prototype.growable)
    fn get_growable<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_internal_slot_shared_array_buffer(agent, this_value, gc.into_nogc())?;
        // 4. If IsFixedLengthArrayBuffer(O) is false, return true; otherwise return false.
        Ok((!o.is_fixed_length(agent)).into())
    }

    /// ### [25.2.5.5 get SharedArrayBuffer.prototype.maxByteLength](https://tc39.es/ecma262/#sec-get-sharedarraybuffer.prototype.maxbytelength)
    fn get_max_byte_length<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_internal_slot_shared_array_buffer(agent, this_value, gc.into_nogc())?;
        Ok(Value::from_f64(o.max_byte_length(agent) as f64))
    }

    /// ### [25.2.5.3 SharedArrayBuffer.prototype.grow ( newLength )](https://tc39.es/ecma262/#sec-sharedarraybuffer.prototype.grow)
    fn grow<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be the this value.
        // 2. Perform ? RequireInternalSlot(O, [[ArrayBufferMaxByteLength]]).
        // 3. If IsSharedArrayBuffer(O) is false, throw a TypeError exception.
        let o = require_internal_slot_shared_array_buffer(agent, this_value, gc.nogc())
            .unbind()?;
        if o.is_fixed_length(agent) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Attempted to grow fixed length SharedArrayBuffer",
                gc.into_nogc(),
            ));
        }
        let o = o.scope(agent, gc.nogc());
        // 4. Let newByteLength be ? ToIndex(newLength).
        let new_byte_length = to_index(agent, arguments.get(0), gc.reborrow()).unbind()?;
        let gc = gc.into_nogc();
        let o = o.get(agent).bind(gc);
        // 6. If newByteLength > O.[[ArrayBufferMaxByteLength]], throw a
        //    RangeError exception.
        if new_byte_length > o.max_byte_length(agent) as u64 {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Attempted to grow beyond SharedArrayBuffer maxByteLength",
                gc,
            ));
        }
        let Some(block) = o.as_shared_data_block(agent) else {
            unreachable!("shared buffers are never detached")
        };
        // 11. Repeat,
        //   c. If newByteLength < currentByteLength, throw a RangeError exception.
        //   f. If byteLengthDelta is 0 or the compare-exchange succeeded,
        //      return undefined.
        if !block.grow(new_byte_length as usize) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "SharedArrayBuffer cannot shrink",
                gc,
            ));
        }
        Ok(Value::Undefined)
    }

    /// ### [25.2.5.6 SharedArrayBuffer.prototype.slice ( start, end )](https://tc39.es/ecma262/#sec-sharedarraybuffer.prototype.slice)
    fn slice<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let start = arguments.get(0);
        let end = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Perform ? RequireInternalSlot(O, [[ArrayBufferData]]).
        // 3. If IsSharedArrayBuffer(O) is false, throw a TypeError exception.
        let o = require_internal_slot_shared_array_buffer(agent, this_value, gc.nogc())
            .unbind()?;
        // 4. Let len be ArrayBufferByteLength(O, SEQ-CST).
        let len = o.byte_length(agent) as u64;
        let scoped_o = o.scope(agent, gc.nogc());
        // 5-12. Resolve first and final as for ArrayBuffer.prototype.slice.
        let first = to_relative_index(agent, Some(start), len, 0, gc.reborrow()).unbind()?;
        let final_end =
            to_relative_index(agent, Some(end.get(agent)), len, len, gc.reborrow()).unbind()?;
        // 13. Let newLen be max(final - first, 0).
        let new_len = final_end.saturating_sub(first);
        // 14. Let ctor be ? SpeciesConstructor(O, %SharedArrayBuffer%).
        let default_constructor = agent.intrinsics().shared_array_buffer();
        let ctor = species_constructor(
            agent,
            scoped_o.get(agent).into(),
            default_constructor,
            gc.reborrow(),
        )
        .unbind()?;
        // 15. Let new be ? Construct(ctor, « 𝔽(newLen) »).
        let new = construct(
            agent,
            ctor,
            &[Value::from_f64(new_len as f64)],
            None,
            gc.reborrow(),
        )
        .unbind()?;
        let gc = gc.into_nogc();
        // 16. Perform ? RequireInternalSlot(new, [[ArrayBufferData]]).
        // 17. If IsSharedArrayBuffer(new) is false, throw a TypeError exception.
        let new = require_internal_slot_shared_array_buffer(agent, new.into(), gc)?;
        let o = scoped_o.get(agent).bind(gc);
        // 18. If new.[[ArrayBufferData]] is O.[[ArrayBufferData]], throw a
        //     TypeError exception.
        if new.is_same_buffer(agent, o) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Construction returned the original SharedArrayBuffer",
                gc,
            ));
        }
        // 19. If ArrayBufferByteLength(new, SEQ-CST) < newLen, throw a
        //     TypeError exception.
        if (new.byte_length(agent) as u64) < new_len {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Construction returned a smaller SharedArrayBuffer than requested",
                gc,
            ));
        }
        // 20. Let fromBuf be O.[[ArrayBufferData]].
        // 21. Let toBuf be new.[[ArrayBufferData]].
        // 22. Perform CopyDataBlockBytes(toBuf, 0, fromBuf, first, newLen).
        let (Some(from_block), Some(to_block)) =
            (o.as_shared_data_block(agent), new.as_shared_data_block(agent))
        else {
            unreachable!("shared buffers are never detached")
        };
        let first = first as usize;
        for offset in 0..new_len as usize {
            to_block.store::<u8>(offset, from_block.load::<u8>(first + offset));
        }
        // 23. Return new.
        Ok(new.into())
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let object_prototype = intrinsics.object_prototype();
        let this = intrinsics.shared_array_buffer_prototype();
        let shared_array_buffer_constructor = intrinsics.shared_array_buffer();
        let to_string_tag =
            String::from_str(agent, "SharedArrayBuffer", NoGcScope::intrinsic()).unbind();
        OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
            .with_property_capacity(7)
            .with_prototype(object_prototype)
            .with_builtin_function_getter_property::<SharedArrayBufferPrototypeGetByteLength>()
            .with_constructor_property(shared_array_buffer_constructor)
            .with_builtin_function_property::<SharedArrayBufferPrototypeGrow>()
            .with_builtin_function_getter_property::<SharedArrayBufferPrototypeGetGrowable>()
            .with_builtin_function_getter_property::<SharedArrayBufferPrototypeGetMaxByteLength>()
            .with_builtin_function_property::<SharedArrayBufferPrototypeSlice>()
            .with_data_property(WellKnownSymbol::ToStringTag.into(), to_string_tag.into())
            .build();
    }
}

#[inline]
fn require_internal_slot_shared_array_buffer<'a>(
    agent: &mut Agent,
    o: Value,
    gc: NoGcScope<'a, '_>,
) -> JsResult<'a, ArrayBuffer<'a>> {
    match o {
        Value::ArrayBuffer(array_buffer) if array_buffer.is_shared(agent) => {
            Ok(array_buffer.bind(gc))
        }
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Expected this to be SharedArrayBuffer",
            gc,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::invoke,
        builtins::array_buffer::abstract_operations::allocate_shared_array_buffer,
        execution::Options,
    };

    fn shared_buffer(
        agent: &mut Agent,
        byte_length: u64,
        max_byte_length: Option<u64>,
        gc: GcScope,
    ) -> ArrayBuffer<'static> {
        let constructor = agent.intrinsics().shared_array_buffer();
        allocate_shared_array_buffer(agent, constructor, byte_length, max_byte_length, gc)
            .unwrap()
            .unbind()
    }

    #[test]
    fn grow_only_moves_forward() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = shared_buffer(agent, 4, Some(16), gc.reborrow());
            let grow = PropertyKey::from_str(agent, "grow", gc.nogc()).unbind();
            invoke(agent, buffer.into(), grow, &[Value::Number(10.0)], gc.reborrow()).unwrap();
            assert_eq!(buffer.byte_length(agent), 10);
            let error = invoke(agent, buffer.into(), grow, &[Value::Number(8.0)], gc.reborrow())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
            let error = invoke(agent, buffer.into(), grow, &[Value::Number(17.0)], gc.reborrow())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));

            let fixed = shared_buffer(agent, 4, None, gc.reborrow());
            let error = invoke(agent, fixed.into(), grow, &[Value::Number(4.0)], gc.reborrow())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn slice_copies_into_a_new_shared_buffer() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = shared_buffer(agent, 4, None, gc.reborrow());
            for index in 0..4 {
                buffer.set_value::<u8>(agent, index, index as u8 + 1);
            }
            let slice = PropertyKey::from_str(agent, "slice", gc.nogc()).unbind();
            let result = invoke(agent, buffer.into(), slice, &[Value::Number(2.0)], gc.reborrow())
                .unwrap()
                .unbind();
            let result = ArrayBuffer::try_from(result).unwrap();
            assert!(result.is_shared(agent));
            assert!(!result.is_same_buffer(agent, buffer));
            assert_eq!(result.byte_length(agent), 2);
            assert_eq!(result.get_value::<u8>(agent, 0), Some(3));
            assert_eq!(result.get_value::<u8>(agent, 1), Some(4));
        });
    }
}
