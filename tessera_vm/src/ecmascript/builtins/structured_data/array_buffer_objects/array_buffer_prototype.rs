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
        builtins::{
            ArgumentsList, ArrayBuffer, Behaviour, Builtin, BuiltinGetter,
            array_buffer::{
                abstract_operations::{array_buffer_copy_and_detach, resize_array_buffer},
                two_data_blocks_mut,
            },
        },
        execution::{Agent, ExceptionType, JsResult},
        types::{BUILTIN_STRING_MEMORY, PropertyKey, String, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope, NoGcScope},
    },
};

pub(crate) struct ArrayBufferPrototype;

struct ArrayBufferPrototypeGetByteLength;
impl Builtin for ArrayBufferPrototypeGetByteLength {
    const NAME: &'static str = "get byteLength";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::get_byte_length);
}
impl BuiltinGetter for ArrayBufferPrototypeGetByteLength {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.byteLength);
}

struct ArrayBufferPrototypeGetDetached;
impl Builtin for ArrayBufferPrototypeGetDetached {
    const NAME: &'static str = "get detached";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::get_detached);
}
impl BuiltinGetter for ArrayBufferPrototypeGetDetached {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.detached);
}

struct ArrayBufferPrototypeGetMaxByteLength;
impl Builtin for ArrayBufferPrototypeGetMaxByteLength {
    const NAME: &'static str = "get maxByteLength";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::get_max_byte_length);
}
impl BuiltinGetter for ArrayBufferPrototypeGetMaxByteLength {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.maxByteLength);
}

struct ArrayBufferPrototypeGetResizable;
impl Builtin for ArrayBufferPrototypeGetResizable {
    const NAME: &'static str = "get resizable";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::get_resizable);
}
impl BuiltinGetter for ArrayBufferPrototypeGetResizable {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.resizable);
}

struct ArrayBufferPrototypeResize;
impl Builtin for ArrayBufferPrototypeResize {
    const NAME: &'static str = "resize";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::resize);
}

struct ArrayBufferPrototypeSlice;
impl Builtin for ArrayBufferPrototypeSlice {
    const NAME: &'static str = "slice";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::slice);
}

struct ArrayBufferPrototypeTransfer;
impl Builtin for ArrayBufferPrototypeTransfer {
    const NAME: &'static str = "transfer";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::transfer);
}

struct ArrayBufferPrototypeTransferToFixedLength;
impl Builtin for ArrayBufferPrototypeTransferToFixedLength {
    const NAME: &'static str = "transferToFixedLength";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferPrototype::transfer_to_fixed_length);
}

impl ArrayBufferPrototype {
    /// ### [25.1.6.1 get ArrayBuffer.prototype.byteLength](https://tc39.es/ecma262/#sec-get-arraybuffer.prototype.bytelength)
    ///
    /// ArrayBuffer.prototype.byteLength is an accessor property whose set
    /// accessor function is undefined.
    fn get_byte_length<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be the this value.
        // 2. Perform ? RequireInternalSlot(O, [[ArrayBufferData]]).
        // 3. If IsSharedArrayBuffer(O) is true, throw a TypeError exception.
        let o = require_internal_slot_array_buffer(agent, this_value, gc.into_nogc())?;
        // 4. If IsDetachedBuffer(O) is true, return +0𝔽.
        // 5. Let length be O.[[ArrayBufferByteLength]].
        // 6. Return 𝔽(length).
        Ok(Value::from_f64(o.byte_length(agent) as f64))
    }

    /// ### [25.1.6.3 get ArrayBuffer.prototype.detached](https://tc39.es/ecma262/#sec-get-arraybuffer.prototype.detached)
    fn get_detached<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_internal_slot_array_buffer(agent, this_value, gc.into_nogc())?;
        // 4. Return IsDetachedBuffer(O).
        Ok(o.is_detached(agent).into())
    }

    /// ### [25.1.6.4 get ArrayBuffer.prototype.maxByteLength](https://tc39.es/ecma262/#sec-get-arraybuffer.prototype.maxbytelength)
    fn get_max_byte_length<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_internal_slot_array_buffer(agent, this_value, gc.into_nogc())?;
        // 4. If IsDetachedBuffer(O) is true, return +0𝔽.
        // 5. If IsFixedLengthArrayBuffer(O) is true, then
        //   a. Let length be O.[[ArrayBufferByteLength]].
        // 6. Else,
        //   a. Let length be O.[[ArrayBufferMaxByteLength]].
        // 7. Return 𝔽(length).
        Ok(Value::from_f64(o.max_byte_length(agent) as f64))
    }

    /// ### [25.1.6.5 get ArrayBuffer.prototype.resizable](https://tc39.es/ecma262/#sec-get-arraybuffer.prototype.resizable)
    fn get_resizable<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_internal_slot_array_buffer(agent, this_value, gc.into_nogc())?;
        // 4. If IsFixedLengthArrayBuffer(O) is false, return true; otherwise return false.
        Ok(o.is_resizable(agent).into())
    }

    /// ### [25.1.6.6 ArrayBuffer.prototype.resize ( newLength )](https://tc39.es/ecma262/#sec-arraybuffer.prototype.resize)
    fn resize<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be the this value.
        // 2. Perform ? RequireInternalSlot(O, [[ArrayBufferMaxByteLength]]).
        // 3. If IsSharedArrayBuffer(O) is true, throw a TypeError exception.
        let o = require_internal_slot_array_buffer(agent, this_value, gc.nogc())
            .unbind()?;
        if !o.is_resizable(agent) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Attempted to resize fixed length ArrayBuffer",
                gc.into_nogc(),
            ));
        }
        let scoped_o = o.scope(agent, gc.nogc());
        // 4. Let newByteLength be ? ToIndex(newLength).
        let new_byte_length = to_index(agent, arguments.get(0), gc.reborrow()).unbind()?;
        let gc = gc.into_nogc();
        let o = scoped_o.get(agent).bind(gc);
        // 5. If IsDetachedBuffer(O) is true, throw a TypeError exception.
        if o.is_detached(agent) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Cannot resize a detached ArrayBuffer",
                gc,
            ));
        }
        // 6. If newByteLength > O.[[ArrayBufferMaxByteLength]], throw a
        //    RangeError exception.
        if new_byte_length > o.max_byte_length(agent) as u64 {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Attempted to resize beyond ArrayBuffer maxByteLength",
                gc,
            ));
        }
        // 7. Let hostHandled be ? HostResizeArrayBuffer(O, newByteLength).
        // 9. Let oldBlock be O.[[ArrayBufferData]].
        // 10. Let newBlock be ? CreateByteDataBlock(newByteLength).
        // 11. Let copyLength be min(newByteLength, O.[[ArrayBufferByteLength]]).
        // 12. Perform CopyDataBlockBytes(newBlock, 0, oldBlock, 0, copyLength).
        // 14. Set O.[[ArrayBufferData]] to newBlock.
        // 15. Set O.[[ArrayBufferByteLength]] to newByteLength.
        resize_array_buffer(agent, o, new_byte_length as usize);
        // 16. Return undefined.
        Ok(Value::Undefined)
    }

    /// ### [25.1.6.7 ArrayBuffer.prototype.slice ( start, end )](https://tc39.es/ecma262/#sec-arraybuffer.prototype.slice)
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
        // 3. If IsSharedArrayBuffer(O) is true, throw a TypeError exception.
        let o = require_internal_slot_array_buffer(agent, this_value, gc.nogc())
            .unbind()?;
        // 4. If IsDetachedBuffer(O) is true, throw a TypeError exception.
        if o.is_detached(agent) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Cannot slice a detached ArrayBuffer",
                gc.into_nogc(),
            ));
        }
        // 5. Let len be O.[[ArrayBufferByteLength]].
        let len = o.byte_length(agent) as u64;
        let scoped_o = o.scope(agent, gc.nogc());
        // 6. Let relativeStart be ? ToIntegerOrInfinity(start).
        // 7. If relativeStart = -∞, let first be 0.
        // 8. Else if relativeStart < 0, let first be max(len + relativeStart, 0).
        // 9. Else, let first be min(relativeStart, len).
        let first = to_relative_index(agent, Some(start), len, 0, gc.reborrow()).unbind()?;
        // 10. If end is undefined, let relativeEnd be len; else let
        //     relativeEnd be ? ToIntegerOrInfinity(end).
        // 11. If relativeEnd = -∞, let final be 0.
        // 12. Else if relativeEnd < 0, let final be max(len + relativeEnd, 0).
        // 13. Else, let final be min(relativeEnd, len).
        let final_end =
            to_relative_index(agent, Some(end.get(agent)), len, len, gc.reborrow()).unbind()?;
        // 14. Let newLen be max(final - first, 0).
        let new_len = final_end.saturating_sub(first);
        // 15. Let ctor be ? SpeciesConstructor(O, %ArrayBuffer%).
        let default_constructor = agent.intrinsics().array_buffer();
        let ctor = species_constructor(
            agent,
            scoped_o.get(agent).into(),
            default_constructor,
            gc.reborrow(),
        )
        .unbind()?;
        // 16. Let new be ? Construct(ctor, « 𝔽(newLen) »).
        let new = construct(
            agent,
            ctor,
            &[Value::from_f64(new_len as f64)],
            None,
            gc.reborrow(),
        )
        .unbind()?;
        let gc = gc.into_nogc();
        let o = scoped_o.get(agent).bind(gc);
        // 17-23. The species result must be a distinct, attached, large
        // enough ArrayBuffer, and O must have survived its construction.
        let new = checked_slice_target(agent, new.into(), o, new_len, gc)?;
        // 24. Let fromBuf be O.[[ArrayBufferData]].
        // 25. Let toBuf be new.[[ArrayBufferData]].
        // 26. Let currentLen be O.[[ArrayBufferByteLength]].
        let current_len = o.byte_length(agent);
        let first = first as usize;
        // 27. If first < currentLen, then
        if first < current_len {
            // a. Let count be min(newLen, currentLen - first).
            let count = (new_len as usize).min(current_len - first);
            // b. Perform CopyDataBlockBytes(toBuf, 0, fromBuf, first, count).
            if let Some((to_block, from_block)) = two_data_blocks_mut(agent, new, o) {
                to_block.copy_data_block_bytes(0, from_block, first, count);
            }
        }
        // 28. Return new.
        Ok(new.into())
    }

    /// ### [25.1.6.8 ArrayBuffer.prototype.transfer ( \[ newLength \] )](https://tc39.es/ecma262/#sec-arraybuffer.prototype.transfer)
    fn transfer<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be the this value.
        // 2. Return ? ArrayBufferCopyAndDetach(O, newLength, PRESERVE-RESIZABILITY).
        array_buffer_copy_and_detach(agent, this_value, arguments.get(0), true, gc).map(Value::from)
    }

    /// ### [25.1.6.9 ArrayBuffer.prototype.transferToFixedLength ( \[ newLength \] )](https://tc39.es/ecma262/#sec-arraybuffer.prototype.transfertofixedlength)
    fn transfer_to_fixed_length<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be the this value.
        // 2. Return ? ArrayBufferCopyAndDetach(O, newLength, FIXED-LENGTH).
        array_buffer_copy_and_detach(agent, this_value, arguments.get(0), false, gc).map(Value::from)
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let object_prototype = intrinsics.object_prototype();
        let this = intrinsics.array_buffer_prototype();
        let array_buffer_constructor = intrinsics.array_buffer();
        let to_string_tag = String::from_str(agent, "ArrayBuffer", NoGcScope::intrinsic()).unbind();
        OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
            .with_property_capacity(10)
            .with_prototype(object_prototype)
            .with_builtin_function_getter_property::<ArrayBufferPrototypeGetByteLength>()
            .with_constructor_property(array_buffer_constructor)
            .with_builtin_function_getter_property::<ArrayBufferPrototypeGetDetached>()
            .with_builtin_function_getter_property::<ArrayBufferPrototypeGetMaxByteLength>()
            .with_builtin_function_getter_property::<ArrayBufferPrototypeGetResizable>()
            .with_builtin_function_property::<ArrayBufferPrototypeResize>()
            .with_builtin_function_property::<ArrayBufferPrototypeSlice>()
            .with_builtin_function_property::<ArrayBufferPrototypeTransfer>()
            .with_builtin_function_property::<ArrayBufferPrototypeTransferToFixedLength>()
            .with_data_property(WellKnownSymbol::ToStringTag.into(), to_string_tag.into())
            .build();
    }
}

fn checked_slice_target<'a>(
    agent: &mut Agent,
    new: Value,
    o: ArrayBuffer,
    new_len: u64,
    gc: NoGcScope<'a, '_>,
) -> JsResult<'a, ArrayBuffer<'a>> {
    let new = require_internal_slot_array_buffer(agent, new, gc)?;
    let problem = if new.is_detached(agent) {
        Some("Species constructor returned a detached ArrayBuffer")
    } else if new == o {
        Some("Species constructor returned the ArrayBuffer being sliced")
    } else if (new.byte_length(agent) as u64) < new_len {
        Some("Species constructor returned a too small ArrayBuffer")
    } else if o.is_detached(agent) {
        Some("ArrayBuffer was detached while slicing")
    } else {
        None
    };
    match problem {
        Some(message) => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            message,
            gc,
        )),
        None => Ok(new),
    }
}

#[inline]
pub(crate) fn require_internal_slot_array_buffer<'a>(
    agent: &mut Agent,
    o: Value,
    gc: NoGcScope<'a, '_>,
) -> JsResult<'a, ArrayBuffer<'a>> {
    match o {
        // 1. Perform ? RequireInternalSlot(O, [[ArrayBufferData]]).
        // 2. If IsSharedArrayBuffer(O) is true, throw a TypeError exception.
        Value::ArrayBuffer(array_buffer) if !array_buffer.is_shared(agent) => {
            Ok(array_buffer.bind(gc))
        }
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Expected this to be ArrayBuffer",
            gc,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::{get, invoke},
        builtins::{create_derived_constructor, create_native_function},
        execution::Options,
        builtins::array_buffer::abstract_operations::allocate_array_buffer,
        types::{InternalMethods, Object, PropertyValue},
    };

    fn key(agent: &mut Agent, name: &str) -> PropertyKey<'static> {
        PropertyKey::from_str(agent, name, NoGcScope::intrinsic())
    }

    #[test]
    fn slice_copies_the_selected_range() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[1, 2, 3, 4, 5], gc.nogc()).unwrap().unbind();
            let slice = key(agent, "slice");
            let result = invoke(
                agent,
                buffer.into(),
                slice,
                &[Value::Number(1.0), Value::Number(-1.0)],
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            let result = ArrayBuffer::try_from(result).unwrap();
            assert_eq!(result.as_data_block(agent).unwrap().as_slice(), &[2, 3, 4]);
            assert!(!buffer.is_detached(agent));
        });
    }

    #[test]
    fn slice_follows_the_species_constructor() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[1, 2], gc.nogc()).unwrap().unbind();
            let parent = agent.intrinsics().array_buffer();
            let derived = create_derived_constructor(agent, parent, "Derived", gc.nogc()).unbind();
            let constructor = PropertyKey::from(BUILTIN_STRING_MEMORY.constructor);
            Object::from(buffer)
                .internal_define_own_property(
                    agent,
                    constructor,
                    PropertyValue::Data(derived.into()),
                    gc.reborrow(),
                )
                .unwrap();
            let slice = key(agent, "slice");
            let fresh = invoke(agent, buffer.into(), slice, &[], gc.reborrow()).unwrap().unbind();
            assert_ne!(fresh, Value::from(buffer));
            let fresh = ArrayBuffer::try_from(fresh).unwrap();
            assert_eq!(fresh.as_data_block(agent).unwrap().as_slice(), &[1, 2]);

            // A species that is not a constructor is rejected.
            let species =
                create_native_function(agent, |_, _, _, _| Ok(Value::Undefined), "species", 0, gc.nogc())
                    .unbind();
            Object::from(derived)
                .internal_define_own_property(
                    agent,
                    WellKnownSymbol::Species.into(),
                    PropertyValue::Data(species.into()),
                    gc.reborrow(),
                )
                .unwrap();
            let error = invoke(agent, buffer.into(), slice, &[], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn resize_stays_within_the_maximum() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let constructor = agent.intrinsics().array_buffer();
            let buffer = allocate_array_buffer(
                agent,
                constructor,
                2,
                Some(8),
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            let resize = key(agent, "resize");
            invoke(agent, buffer.into(), resize, &[Value::Number(6.0)], gc.reborrow()).unwrap();
            assert_eq!(buffer.byte_length(agent), 6);
            let error = invoke(agent, buffer.into(), resize, &[Value::Number(9.0)], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));

            let byte_length = BUILTIN_STRING_MEMORY.byteLength.into();
            let resizable = BUILTIN_STRING_MEMORY.resizable.into();
            let detached = BUILTIN_STRING_MEMORY.detached.into();
            let transfer = key(agent, "transferToFixedLength");
            let fixed = invoke(agent, buffer.into(), transfer, &[], gc.reborrow()).unwrap().unbind();
            let fixed = Object::try_from(fixed).unwrap();
            assert_eq!(get(agent, fixed, byte_length, gc.reborrow()).unwrap(), Value::Number(6.0));
            assert_eq!(get(agent, fixed, resizable, gc.reborrow()).unwrap(), Value::Boolean(false));
            assert_eq!(get(agent, buffer.into(), detached, gc.reborrow()).unwrap(), Value::Boolean(true));
            assert_eq!(get(agent, buffer.into(), byte_length, gc.reborrow()).unwrap(), Value::Number(0.0));
        });
    }
}
