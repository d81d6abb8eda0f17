// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [25.1 ArrayBuffer Objects](https://tc39.es/ecma262/#sec-arraybuffer-objects)
//!
//! SharedArrayBuffers are ArrayBuffers whose storage is a
//! [`SharedDataBlock`]; they share the handle type and differ in storage and
//! prototype.

pub(crate) mod abstract_operations;

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        execution::{Agent, ExceptionType, JsResult, ProtoIntrinsics},
        types::{
            DataBlock, InternalMethods, InternalSlots, OrdinaryObject, SharedDataBlock, Viewable,
        },
    },
    engine::context::{NoGcScope, bindable_handle},
    heap::{CreateHeapData, Heap, indexes::ArrayBufferIndex},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayBuffer<'a>(pub(crate) ArrayBufferIndex<'a>);
bindable_handle!(ArrayBuffer);

/// The \[\[ArrayBufferData\]\] of a buffer.
#[derive(Debug)]
pub enum BufferStorage {
    Owned(DataBlock),
    Shared(SharedDataBlock),
    /// Detachment is terminal: a detached buffer never gets storage again.
    Detached,
}

#[derive(Debug)]
pub struct ArrayBufferHeapData {
    pub(crate) storage: BufferStorage,
    /// \[\[ArrayBufferMaxByteLength\]\]; present for resizable and growable
    /// buffers.
    pub(crate) max_byte_length: Option<usize>,
    pub(crate) backing_object: Option<OrdinaryObject<'static>>,
}

impl ArrayBufferHeapData {
    pub(crate) fn new_owned(block: DataBlock, max_byte_length: Option<usize>) -> Self {
        Self {
            storage: BufferStorage::Owned(block),
            max_byte_length,
            backing_object: None,
        }
    }

    pub(crate) fn new_shared(block: SharedDataBlock, max_byte_length: Option<usize>) -> Self {
        Self {
            storage: BufferStorage::Shared(block),
            max_byte_length,
            backing_object: None,
        }
    }

    pub(crate) fn byte_length(&self) -> usize {
        match &self.storage {
            BufferStorage::Owned(block) => block.len(),
            BufferStorage::Shared(block) => block.len(),
            BufferStorage::Detached => 0,
        }
    }
}

impl CreateHeapData<ArrayBufferHeapData, ArrayBuffer<'static>> for Heap {
    fn create(&mut self, data: ArrayBufferHeapData) -> ArrayBuffer<'static> {
        self.array_buffers.push(data);
        ArrayBuffer(ArrayBufferIndex::last(&self.array_buffers))
    }
}

impl Index<ArrayBuffer<'_>> for Agent {
    type Output = ArrayBufferHeapData;

    fn index(&self, index: ArrayBuffer<'_>) -> &Self::Output {
        &self.heap.array_buffers[index.0.into_index()]
    }
}

impl IndexMut<ArrayBuffer<'_>> for Agent {
    fn index_mut(&mut self, index: ArrayBuffer<'_>) -> &mut Self::Output {
        &mut self.heap.array_buffers[index.0.into_index()]
    }
}

impl<'a> ArrayBuffer<'a> {
    /// Create a fixed-length buffer holding a copy of host-provided bytes.
    pub fn from_bytes(agent: &mut Agent, bytes: &[u8], gc: NoGcScope<'a, '_>) -> JsResult<'a, Self> {
        if bytes.len() > agent.options.max_array_buffer_byte_length {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Array buffer allocation failed",
                gc,
            ));
        }
        Ok(agent
            .heap
            .create(ArrayBufferHeapData::new_owned(DataBlock::from_bytes(bytes), None)))
    }

    /// \[\[ArrayBufferByteLength\]\]. Zero for a detached buffer.
    pub fn byte_length(self, agent: &Agent) -> usize {
        agent[self].byte_length()
    }

    /// \[\[ArrayBufferMaxByteLength\]\], or the byte length for fixed-length
    /// buffers.
    pub fn max_byte_length(self, agent: &Agent) -> usize {
        if self.is_detached(agent) {
            return 0;
        }
        agent[self]
            .max_byte_length
            .unwrap_or_else(|| self.byte_length(agent))
    }

    /// ### [25.1.3.4 IsDetachedBuffer ( arrayBuffer )](https://tc39.es/ecma262/#sec-isdetachedbuffer)
    pub fn is_detached(self, agent: &Agent) -> bool {
        matches!(agent[self].storage, BufferStorage::Detached)
    }

    /// ### [25.1.3.9 IsFixedLengthArrayBuffer ( arrayBuffer )](https://tc39.es/ecma262/#sec-isfixedlengtharraybuffer)
    pub fn is_fixed_length(self, agent: &Agent) -> bool {
        agent[self].max_byte_length.is_none()
    }

    pub fn is_resizable(self, agent: &Agent) -> bool {
        !self.is_fixed_length(agent)
    }

    /// ### [25.2.2.2 IsSharedArrayBuffer ( obj )](https://tc39.es/ecma262/#sec-issharedarraybuffer)
    pub fn is_shared(self, agent: &Agent) -> bool {
        matches!(agent[self].storage, BufferStorage::Shared(_))
    }

    /// Detach the buffer from its storage, as a host would when transferring
    /// it elsewhere. Shared buffers cannot be detached.
    pub fn detach(self, agent: &mut Agent, gc: NoGcScope<'a, '_>) -> JsResult<'a, ()> {
        if self.is_shared(agent) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Cannot detach a SharedArrayBuffer",
                gc,
            ));
        }
        abstract_operations::detach_array_buffer(agent, self);
        Ok(())
    }

    /// Whether two buffers are the same buffer for the purposes of copying:
    /// the same object, or views of one shared block.
    pub(crate) fn is_same_buffer(self, agent: &Agent, other: ArrayBuffer) -> bool {
        if self.0.into_index() == other.0.into_index() {
            return true;
        }
        match (&agent[self].storage, &agent[other].storage) {
            (BufferStorage::Shared(a), BufferStorage::Shared(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// ### [25.1.3.15 GetValueFromBuffer ( arrayBuffer, byteIndex, type, isTypedArray, order \[ , isLittleEndian \] )](https://tc39.es/ecma262/#sec-getvaluefrombuffer)
    ///
    /// Reads in host byte order. `None` if the element is not within the
    /// buffer.
    pub(crate) fn get_value<T: Viewable>(self, agent: &Agent, byte_index: usize) -> Option<T> {
        match &agent[self].storage {
            BufferStorage::Owned(block) => block.get::<T>(byte_index),
            BufferStorage::Shared(block) => {
                let end = byte_index.checked_add(size_of::<T>())?;
                (end <= block.len()).then(|| block.load::<T>(byte_index))
            }
            BufferStorage::Detached => None,
        }
    }

    /// ### [25.1.3.17 SetValueInBuffer ( arrayBuffer, byteIndex, type, value, isTypedArray, order \[ , isLittleEndian \] )](https://tc39.es/ecma262/#sec-setvalueinbuffer)
    ///
    /// Writes outside of the buffer are ignored.
    pub(crate) fn set_value<T: Viewable>(self, agent: &mut Agent, byte_index: usize, value: T) {
        match &mut agent[self].storage {
            BufferStorage::Owned(block) => block.set::<T>(byte_index, value),
            BufferStorage::Shared(block) => {
                if byte_index
                    .checked_add(size_of::<T>())
                    .is_some_and(|end| end <= block.len())
                {
                    block.store::<T>(byte_index, value);
                }
            }
            BufferStorage::Detached => {}
        }
    }

    /// The owned data block, if the buffer is neither shared nor detached.
    pub(crate) fn as_data_block(self, agent: &Agent) -> Option<&DataBlock> {
        match &agent[self].storage {
            BufferStorage::Owned(block) => Some(block),
            _ => None,
        }
    }

    pub(crate) fn as_data_block_mut(self, agent: &mut Agent) -> Option<&mut DataBlock> {
        match &mut agent[self].storage {
            BufferStorage::Owned(block) => Some(block),
            _ => None,
        }
    }

    pub(crate) fn as_shared_data_block(self, agent: &Agent) -> Option<&SharedDataBlock> {
        match &agent[self].storage {
            BufferStorage::Shared(block) => Some(block),
            _ => None,
        }
    }
}

/// Mutable access to the data blocks of two distinct owned buffers at once.
pub(crate) fn two_data_blocks_mut<'agent>(
    agent: &'agent mut Agent,
    target: ArrayBuffer,
    source: ArrayBuffer,
) -> Option<(&'agent mut DataBlock, &'agent DataBlock)> {
    let target_index = target.0.into_index();
    let source_index = source.0.into_index();
    if target_index == source_index {
        return None;
    }
    let buffers = &mut agent.heap.array_buffers;
    let (target, source) = if target_index < source_index {
        let (low, high) = buffers.split_at_mut(source_index);
        (&mut low[target_index], &high[0])
    } else {
        let (low, high) = buffers.split_at_mut(target_index);
        (&mut high[0], &low[source_index])
    };
    match (&mut target.storage, &source.storage) {
        (BufferStorage::Owned(target), BufferStorage::Owned(source)) => Some((target, source)),
        _ => None,
    }
}

impl<'a> InternalSlots<'a> for ArrayBuffer<'a> {
    /// Shared buffers are always created with a backing object holding
    /// %SharedArrayBuffer.prototype%.
    fn default_prototype(self) -> ProtoIntrinsics {
        ProtoIntrinsics::ArrayBuffer
    }

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject<'static>> {
        agent[self].backing_object
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject<'static>) {
        assert!(agent[self].backing_object.replace(backing_object).is_none());
    }
}

impl<'a> InternalMethods<'a> for ArrayBuffer<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::Options;

    #[test]
    fn detached_buffers_report_zero_lengths() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let buffer = ArrayBuffer::from_bytes(agent, &[1, 2, 3, 4], gc.nogc()).unwrap();
            assert_eq!(buffer.byte_length(agent), 4);
            assert_eq!(buffer.get_value::<u16>(agent, 2), Some(u16::from_ne_bytes([3, 4])));
            buffer.detach(agent, gc.nogc()).unwrap();
            assert!(buffer.is_detached(agent));
            assert_eq!(buffer.byte_length(agent), 0);
            assert_eq!(buffer.max_byte_length(agent), 0);
            assert_eq!(buffer.get_value::<u8>(agent, 0), None);
        });
    }

    #[test]
    fn allocation_limit_is_configurable() {
        let mut agent = Agent::new(Options {
            max_array_buffer_byte_length: 2,
            ..Options::default()
        });
        agent.run(|agent, gc| {
            let error = ArrayBuffer::from_bytes(agent, &[0; 3], gc.nogc()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        });
    }

    #[test]
    fn two_blocks_can_be_borrowed_together() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let a = ArrayBuffer::from_bytes(agent, &[1, 2], gc.nogc()).unwrap();
            let b = ArrayBuffer::from_bytes(agent, &[3, 4], gc.nogc()).unwrap();
            assert!(two_data_blocks_mut(agent, a, a).is_none());
            let (target, source) = two_data_blocks_mut(agent, b, a).unwrap();
            target.copy_data_block_bytes(0, source, 0, 2);
            assert_eq!(b.as_data_block(agent).unwrap().as_slice(), &[1, 2]);
        });
    }
}
