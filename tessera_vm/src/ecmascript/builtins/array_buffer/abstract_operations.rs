// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ArrayBuffer, ArrayBufferHeapData, BufferStorage};
use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::{get, get_prototype_from_constructor},
            type_conversion::to_index,
        },
        builtins::Function,
        execution::{Agent, ExceptionType, JsResult, ProtoIntrinsics},
        types::{BUILTIN_STRING_MEMORY, DataBlock, InternalSlots, Object, SharedDataBlock, Value},
    },
    engine::context::{Bindable, GcScope, NoGcScope},
    heap::CreateHeapData,
};

/// ### [25.1.3.1 AllocateArrayBuffer ( constructor, byteLength \[ , maxByteLength \] )](https://tc39.es/ecma262/#sec-allocatearraybuffer)
///
/// The abstract operation AllocateArrayBuffer takes arguments constructor (a
/// constructor) and byteLength (a non-negative integer) and optional
/// argument maxByteLength (a non-negative integer or EMPTY) and returns
/// either a normal completion containing an ArrayBuffer or a throw
/// completion. It is used to create an ArrayBuffer.
pub(crate) fn allocate_array_buffer<'gc>(
    agent: &mut Agent,
    constructor: Function,
    byte_length: u64,
    max_byte_length: Option<u64>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ArrayBuffer<'gc>> {
    // 2. If allocatingResizableBuffer is true, then
    //   a. If byteLength > maxByteLength, throw a RangeError exception.
    if max_byte_length.is_some_and(|max_byte_length| byte_length > max_byte_length) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Byte length exceeds the maximum byte length",
            gc.into_nogc(),
        ));
    }
    // 3. Let obj be ? OrdinaryCreateFromConstructor(constructor,
    //    "%ArrayBuffer.prototype%", slots).
    let prototype = get_prototype_from_constructor(
        agent,
        constructor,
        ProtoIntrinsics::ArrayBuffer,
        gc.reborrow(),
    )
    .unbind()?;
    let gc = gc.into_nogc();
    // 4. Let block be ? CreateByteDataBlock(byteLength).
    let block = DataBlock::create_byte_data_block(agent, byte_length, max_byte_length, gc)?;
    // 5. Set obj.[[ArrayBufferData]] to block.
    // 6. Set obj.[[ArrayBufferByteLength]] to byteLength.
    // 7. If allocatingResizableBuffer is true, then
    //   b. Set obj.[[ArrayBufferMaxByteLength]] to maxByteLength.
    let buffer: ArrayBuffer = agent.heap.create(ArrayBufferHeapData::new_owned(
        block,
        max_byte_length.map(|max_byte_length| max_byte_length as usize),
    ));
    let default_prototype: Object = agent.intrinsics().array_buffer_prototype().into();
    if prototype != default_prototype {
        buffer.internal_set_prototype(agent, Some(prototype));
    }
    log::trace!("allocated ArrayBuffer of {byte_length} bytes");
    // 8. Return obj.
    Ok(buffer.bind(gc))
}

/// ### [25.2.2.1 AllocateSharedArrayBuffer ( constructor, byteLength \[ , maxByteLength \] )](https://tc39.es/ecma262/#sec-allocatesharedarraybuffer)
pub(crate) fn allocate_shared_array_buffer<'gc>(
    agent: &mut Agent,
    constructor: Function,
    byte_length: u64,
    max_byte_length: Option<u64>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ArrayBuffer<'gc>> {
    // 2. If allocatingGrowableBuffer is true, then
    //   a. If byteLength > maxByteLength, throw a RangeError exception.
    if max_byte_length.is_some_and(|max_byte_length| byte_length > max_byte_length) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Byte length exceeds the maximum byte length",
            gc.into_nogc(),
        ));
    }
    // 3. Let obj be ? OrdinaryCreateFromConstructor(constructor,
    //    "%SharedArrayBuffer.prototype%", slots).
    let prototype = get_prototype_from_constructor(
        agent,
        constructor,
        ProtoIntrinsics::SharedArrayBuffer,
        gc.reborrow(),
    )
    .unbind()?;
    let gc = gc.into_nogc();
    // 4. If allocatingGrowableBuffer is true, let allocLength be
    //    maxByteLength; otherwise let allocLength be byteLength.
    let alloc_length = max_byte_length.unwrap_or(byte_length);
    // 5. Let block be ? CreateSharedByteDataBlock(allocLength).
    if alloc_length > agent.options.max_array_buffer_byte_length as u64 {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Array buffer allocation failed",
            gc,
        ));
    }
    let block = SharedDataBlock::new_with_capacity(byte_length as usize, alloc_length as usize);
    let buffer: ArrayBuffer = agent.heap.create(ArrayBufferHeapData::new_shared(
        block,
        max_byte_length.map(|max_byte_length| max_byte_length as usize),
    ));
    buffer.internal_set_prototype(agent, Some(prototype));
    // 8. Return obj.
    Ok(buffer.bind(gc))
}

/// ### [25.1.3.5 DetachArrayBuffer ( arrayBuffer \[ , key \] )](https://tc39.es/ecma262/#sec-detacharraybuffer)
pub(crate) fn detach_array_buffer(agent: &mut Agent, array_buffer: ArrayBuffer) {
    // 1. Assert: IsSharedArrayBuffer(arrayBuffer) is false.
    debug_assert!(!array_buffer.is_shared(agent));
    // 4. Set arrayBuffer.[[ArrayBufferData]] to null.
    // 5. Set arrayBuffer.[[ArrayBufferByteLength]] to 0.
    let data = &mut agent[array_buffer];
    let byte_length = data.byte_length();
    data.storage = BufferStorage::Detached;
    log::debug!("detached ArrayBuffer of {byte_length} bytes");
    // 6. Return UNUSED.
}

/// ### [25.1.3.6 CloneArrayBuffer ( srcBuffer, srcByteOffset, srcLength )](https://tc39.es/ecma262/#sec-clonearraybuffer)
///
/// The result is a fixed-length ArrayBuffer.
pub(crate) fn clone_array_buffer<'gc>(
    agent: &mut Agent,
    src_buffer: ArrayBuffer,
    src_byte_offset: usize,
    src_length: usize,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, ArrayBuffer<'gc>> {
    // 1. Assert: IsDetachedBuffer(srcBuffer) is false.
    debug_assert!(!src_buffer.is_detached(agent));
    // 2. Let targetBuffer be ? AllocateArrayBuffer(%ArrayBuffer%, srcLength).
    let mut block = DataBlock::create_byte_data_block(agent, src_length as u64, None, gc)?;
    // 3. Let srcBlock be srcBuffer.[[ArrayBufferData]].
    // 4. Let targetBlock be targetBuffer.[[ArrayBufferData]].
    // 5. Perform CopyDataBlockBytes(targetBlock, 0, srcBlock, srcByteOffset, srcLength).
    copy_buffer_bytes_into(agent, &mut block, src_buffer, src_byte_offset, src_length);
    let target_buffer: ArrayBuffer = agent.heap.create(ArrayBufferHeapData::new_owned(block, None));
    // 6. Return targetBuffer.
    Ok(target_buffer.bind(gc))
}

/// Copy bytes of any buffer into a fresh block. Shared storage is read lane
/// by lane.
fn copy_buffer_bytes_into(
    agent: &Agent,
    block: &mut DataBlock,
    src_buffer: ArrayBuffer,
    src_byte_offset: usize,
    count: usize,
) {
    match &agent[src_buffer].storage {
        BufferStorage::Owned(source) => block.copy_data_block_bytes(0, source, src_byte_offset, count),
        BufferStorage::Shared(source) => {
            let target = block.as_mut_slice();
            for (index, byte) in target.iter_mut().take(count).enumerate() {
                *byte = source.load::<u8>(src_byte_offset + index);
            }
        }
        BufferStorage::Detached => unreachable!("cloning a detached buffer"),
    }
}

/// ### [25.1.3.3 ArrayBufferCopyAndDetach ( arrayBuffer, newLength, preserveResizability )](https://tc39.es/ecma262/#sec-arraybuffercopyanddetach)
pub(crate) fn array_buffer_copy_and_detach<'gc>(
    agent: &mut Agent,
    array_buffer: Value,
    new_length: Value,
    preserve_resizability: bool,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ArrayBuffer<'gc>> {
    // 1. Perform ? RequireInternalSlot(arrayBuffer, [[ArrayBufferData]]).
    // 2. If IsSharedArrayBuffer(arrayBuffer) is true, throw a TypeError exception.
    let array_buffer = match ArrayBuffer::try_from(array_buffer) {
        Ok(array_buffer) if !array_buffer.is_shared(agent) => array_buffer.unbind(),
        _ => {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Receiver is not an ArrayBuffer",
                gc.into_nogc(),
            ));
        }
    };
    // 3. If newLength is undefined, then
    let new_byte_length = if new_length.is_undefined() {
        // a. Let newByteLength be arrayBuffer.[[ArrayBufferByteLength]].
        array_buffer.byte_length(agent) as u64
    } else {
        // 4. Else,
        //   a. Let newByteLength be ? ToIndex(newLength).
        to_index(agent, new_length, gc.reborrow()).unbind()?
    };
    let gc = gc.into_nogc();
    // 5. If IsDetachedBuffer(arrayBuffer) is true, throw a TypeError exception.
    if array_buffer.is_detached(agent) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "ArrayBuffer is detached",
            gc,
        ));
    }
    // 6. If preserveResizability is PRESERVE-RESIZABILITY and
    //    IsFixedLengthArrayBuffer(arrayBuffer) is false, then
    //   a. Let newMaxByteLength be arrayBuffer.[[ArrayBufferMaxByteLength]].
    // 7. Else,
    //   a. Let newMaxByteLength be EMPTY.
    let new_max_byte_length = if preserve_resizability {
        agent[array_buffer].max_byte_length
    } else {
        None
    };
    if new_max_byte_length.is_some_and(|max| new_byte_length > max as u64)
        || new_byte_length > agent.options.max_array_buffer_byte_length as u64
    {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Invalid array buffer length",
            gc,
        ));
    }
    let new_byte_length = new_byte_length as usize;
    let BufferStorage::Owned(mut block) =
        std::mem::replace(&mut agent[array_buffer].storage, BufferStorage::Detached)
    else {
        unreachable!()
    };
    let capacity = new_max_byte_length.unwrap_or(new_byte_length);
    // 11. Let copyLength be min(newByteLength, arrayBuffer.[[ArrayBufferByteLength]]).
    // 14. Perform CopyDataBlockBytes(toBlock, 0, fromBlock, 0, copyLength).
    // When the allocation already has the right size, the block moves to the
    // new buffer instead of being copied.
    let block = if block.capacity() == capacity {
        block.resize(new_byte_length);
        block
    } else {
        let copy_length = new_byte_length.min(block.len());
        let mut new_block = DataBlock::new_with_capacity(new_byte_length, capacity);
        new_block.copy_data_block_bytes(0, &block, 0, copy_length);
        new_block
    };
    // 15. Perform ! DetachArrayBuffer(arrayBuffer).
    log::debug!("transferred ArrayBuffer into {new_byte_length} bytes");
    let new_buffer: ArrayBuffer = agent
        .heap
        .create(ArrayBufferHeapData::new_owned(block, new_max_byte_length));
    // 16. Return newBuffer.
    Ok(new_buffer.bind(gc))
}

/// ### [25.1.3.7 GetArrayBufferMaxByteLengthOption ( options )](https://tc39.es/ecma262/#sec-getarraybuffermaxbytelengthoption)
pub(crate) fn get_array_buffer_max_byte_length_option<'gc>(
    agent: &mut Agent,
    options: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Option<u64>> {
    // 1. If options is not an Object, return EMPTY.
    let Ok(options) = Object::try_from(options) else {
        return Ok(None);
    };
    // 2. Let maxByteLength be ? Get(options, "maxByteLength").
    let max_byte_length = get(
        agent,
        options,
        BUILTIN_STRING_MEMORY.maxByteLength.into(),
        gc.reborrow(),
    )
    .unbind()?;
    // 3. If maxByteLength is undefined, return EMPTY.
    if max_byte_length.is_undefined() {
        return Ok(None);
    }
    // 4. Return ? ToIndex(maxByteLength).
    to_index(agent, max_byte_length, gc).map(Some)
}

/// ### [25.1.3.8 HostResizeArrayBuffer ( buffer, newByteLength )](https://tc39.es/ecma262/#sec-hostresizearraybuffer)
///
/// Resizes in place; the capacity was reserved when the buffer was created.
pub(crate) fn resize_array_buffer(agent: &mut Agent, array_buffer: ArrayBuffer, new_byte_length: usize) {
    if let BufferStorage::Owned(block) = &mut agent[array_buffer].storage {
        log::debug!("resizing ArrayBuffer from {} to {new_byte_length} bytes", block.len());
        block.resize(new_byte_length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::Options;

    #[test]
    fn transfer_moves_the_block_when_sizes_match() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[1, 2, 3], gc.nogc()).unwrap().unbind();
            let moved = array_buffer_copy_and_detach(
                agent,
                buffer.into(),
                Value::Undefined,
                false,
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            assert!(buffer.is_detached(agent));
            assert_eq!(moved.as_data_block(agent).unwrap().as_slice(), &[1, 2, 3]);
            let truncated =
                array_buffer_copy_and_detach(agent, moved.into(), Value::Number(2.0), false, gc.reborrow())
                    .unwrap()
                    .unbind();
            assert_eq!(truncated.as_data_block(agent).unwrap().as_slice(), &[1, 2]);
            let error =
                array_buffer_copy_and_detach(agent, moved.into(), Value::Undefined, false, gc.reborrow())
                    .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn clone_copies_a_range() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[1, 2, 3, 4], gc.nogc()).unwrap();
            let clone = clone_array_buffer(agent, buffer, 1, 2, gc.nogc()).unwrap();
            assert_eq!(clone.as_data_block(agent).unwrap().as_slice(), &[2, 3]);
            assert!(clone.is_fixed_length(agent));
        });
    }
}
