// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element and byte movement between typed views.
//!
//! Callers validate both ranges after their last suspension point; nothing
//! here calls into user code, so the ranges stay valid for the whole copy.
//! Whether a copy must tolerate overlap is decided by buffer identity, not
//! by comparing byte ranges.

use log::trace;

use crate::ecmascript::{
    builtins::{
        ArrayBuffer,
        array_buffer::two_data_blocks_mut,
        typed_array::{TypedArray, checked_byte_end, get_value_from_buffer, set_value_in_buffer},
    },
    execution::Agent,
    types::{ElementType, ElementValue},
};

/// How a copy between two element ranges is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CopyStrategy {
    /// Element types differ: each element is converted on its own.
    ElementWise,
    /// Same element type over distinct owned buffers.
    ByteCopy,
    /// Same element type within one owned buffer: memmove.
    OverlapSafe,
    /// Either side is shared storage: byte lanes with atomic access.
    SharedLanes,
}

impl CopyStrategy {
    pub(crate) fn select(agent: &Agent, target: BufferRange, source: BufferRange) -> Self {
        let strategy = if target.element_type != source.element_type {
            CopyStrategy::ElementWise
        } else if target.buffer.is_shared(agent) || source.buffer.is_shared(agent) {
            CopyStrategy::SharedLanes
        } else if target.buffer.is_same_buffer(agent, source.buffer) {
            CopyStrategy::OverlapSafe
        } else {
            CopyStrategy::ByteCopy
        };
        trace!(
            "bulk copy {:?} -> {:?}: {strategy:?}",
            source.element_type, target.element_type
        );
        strategy
    }
}

/// The start of a run of elements inside a buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BufferRange<'a> {
    pub(crate) buffer: ArrayBuffer<'a>,
    pub(crate) byte_offset: usize,
    pub(crate) element_type: ElementType,
}

impl<'a> BufferRange<'a> {
    /// The range starting at element `index` of a typed array.
    pub(crate) fn of_typed_array(agent: &Agent, typed_array: TypedArray<'a>, index: usize) -> Self {
        Self {
            buffer: typed_array.viewed_array_buffer(agent),
            byte_offset: typed_array.element_byte_index(agent, index),
            element_type: typed_array.element_type(),
        }
    }

    fn element_byte_index(&self, index: usize) -> usize {
        checked_byte_end(self.byte_offset, index, self.element_type.element_size())
    }
}

/// Copy `count` elements from `source` into `target`.
///
/// Element types of the same content type are converted as by a get and
/// set of each element. When both ranges are in the same buffer the result
/// is as if the source had been read in full before writing.
pub(crate) fn copy_elements(agent: &mut Agent, target: BufferRange, source: BufferRange, count: usize) {
    if count == 0 {
        return;
    }
    let element_size = source.element_type.element_size();
    match CopyStrategy::select(agent, target, source) {
        CopyStrategy::ElementWise => copy_element_wise(agent, target, source, count),
        CopyStrategy::ByteCopy => {
            let byte_count = checked_byte_end(0, count, element_size);
            if let Some((to_block, from_block)) = two_data_blocks_mut(agent, target.buffer, source.buffer) {
                to_block.copy_data_block_bytes(target.byte_offset, from_block, source.byte_offset, byte_count);
            }
        }
        CopyStrategy::OverlapSafe => {
            let byte_count = checked_byte_end(0, count, element_size);
            if let Some(block) = target.buffer.as_data_block_mut(agent) {
                block.copy_within(target.byte_offset, source.byte_offset, byte_count);
            }
        }
        CopyStrategy::SharedLanes => {
            let byte_count = checked_byte_end(0, count, element_size);
            copy_lanes(
                agent,
                target.buffer,
                target.byte_offset,
                source.buffer,
                source.byte_offset,
                byte_count,
            );
        }
    }
}

/// Overlap-safe move of `byte_count` bytes inside one buffer.
pub(crate) fn move_within(
    agent: &mut Agent,
    buffer: ArrayBuffer,
    to_byte_index: usize,
    from_byte_index: usize,
    byte_count: usize,
) {
    if byte_count == 0 || to_byte_index == from_byte_index {
        return;
    }
    if let Some(block) = buffer.as_data_block_mut(agent) {
        trace!("move within buffer: {byte_count} bytes");
        block.copy_within(to_byte_index, from_byte_index, byte_count);
    } else if buffer.is_shared(agent) {
        trace!("move within shared buffer: {byte_count} byte lanes");
        copy_lanes(agent, buffer, to_byte_index, buffer, from_byte_index, byte_count);
    }
}

fn copy_element_wise(agent: &mut Agent, target: BufferRange, source: BufferRange, count: usize) {
    let read = |agent: &Agent, k: usize| {
        get_value_from_buffer(agent, source.buffer, source.element_byte_index(k), source.element_type)
    };
    let write = |agent: &mut Agent, k: usize, value: ElementValue| {
        set_value_in_buffer(agent, target.buffer, target.element_byte_index(k), target.element_type, value)
    };
    if target.buffer.is_same_buffer(agent, source.buffer) {
        // Converting in place could overwrite source elements before they
        // are read.
        let snapshot = (0..count).map(|k| read(agent, k)).collect::<Vec<_>>();
        for (k, value) in snapshot.into_iter().enumerate() {
            if let Some(value) = value {
                write(agent, k, value);
            }
        }
    } else {
        for k in 0..count {
            if let Some(value) = read(agent, k) {
                write(agent, k, value);
            }
        }
    }
}

fn copy_lanes(
    agent: &mut Agent,
    target: ArrayBuffer,
    target_byte_index: usize,
    source: ArrayBuffer,
    source_byte_index: usize,
    byte_count: usize,
) {
    let copy_lane = |agent: &mut Agent, i: usize| {
        if let Some(byte) = source.get_value::<u8>(agent, source_byte_index + i) {
            target.set_value::<u8>(agent, target_byte_index + i, byte);
        }
    };
    if target.is_same_buffer(agent, source) && target_byte_index > source_byte_index {
        for i in (0..byte_count).rev() {
            copy_lane(agent, i);
        }
    } else {
        for i in 0..byte_count {
            copy_lane(agent, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ecmascript::{
            builtins::ArrayBufferHeapData,
            execution::Options,
            types::{DataBlock, SharedDataBlock},
        },
        engine::Bindable,
        heap::CreateHeapData,
    };

    fn range(buffer: ArrayBuffer, byte_offset: usize, element_type: ElementType) -> BufferRange {
        BufferRange {
            buffer,
            byte_offset,
            element_type,
        }
    }

    fn bytes(agent: &Agent, buffer: ArrayBuffer) -> Vec<u8> {
        (0..buffer.byte_length(agent))
            .map(|i| buffer.get_value::<u8>(agent, i).unwrap())
            .collect()
    }

    #[test]
    fn strategies_follow_buffer_identity_and_element_type() {
        let mut agent = Agent::new(Options::default());
        let a = agent.heap.create(ArrayBufferHeapData::new_owned(DataBlock::from_bytes(&[0; 8]), None));
        let b = agent.heap.create(ArrayBufferHeapData::new_owned(DataBlock::from_bytes(&[0; 8]), None));
        let shared = agent.heap.create(ArrayBufferHeapData::new_shared(
            SharedDataBlock::new_with_capacity(8, 8),
            None,
        ));
        let cases = [
            (range(a, 0, ElementType::Int8), range(a, 1, ElementType::Uint8), CopyStrategy::ElementWise),
            (range(a, 0, ElementType::Int8), range(b, 0, ElementType::Int8), CopyStrategy::ByteCopy),
            (range(a, 0, ElementType::Int8), range(a, 4, ElementType::Int8), CopyStrategy::OverlapSafe),
            (range(shared, 0, ElementType::Int8), range(b, 0, ElementType::Int8), CopyStrategy::SharedLanes),
        ];
        for (target, source, expected) in cases {
            assert_eq!(CopyStrategy::select(&agent, target, source), expected);
        }
    }

    #[test]
    fn overlapping_moves_behave_like_memmove() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let initial = [1, 2, 3, 4, 5, 6, 7, 8];
            let buffer = ArrayBuffer::from_bytes(agent, &initial, gc.nogc()).unwrap().unbind();
            move_within(agent, buffer, 2, 0, 5);
            let mut expected = initial;
            expected.copy_within(0..5, 2);
            assert_eq!(bytes(agent, buffer), expected);

            move_within(agent, buffer, 0, 3, 5);
            expected.copy_within(3..8, 0);
            assert_eq!(bytes(agent, buffer), expected);
        });
    }

    #[test]
    fn shared_lanes_respect_copy_direction() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, _| {
            let buffer = agent.heap.create(ArrayBufferHeapData::new_shared(
                SharedDataBlock::new_with_capacity(6, 6),
                None,
            ));
            for i in 0..6 {
                buffer.set_value::<u8>(agent, i, i as u8 + 1);
            }
            move_within(agent, buffer, 1, 0, 5);
            assert_eq!(bytes(agent, buffer), [1, 1, 2, 3, 4, 5]);
            move_within(agent, buffer, 0, 1, 5);
            assert_eq!(bytes(agent, buffer), [1, 2, 3, 4, 5, 5]);
        });
    }

    #[test]
    fn element_wise_conversion_between_buffers() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let source = ArrayBuffer::from_bytes(agent, &[0; 16], gc.nogc()).unwrap().unbind();
            source.set_value::<f64>(agent, 0, 300.5);
            source.set_value::<f64>(agent, 8, -1.0);
            let target = ArrayBuffer::from_bytes(agent, &[0; 2], gc.nogc()).unwrap().unbind();
            copy_elements(
                agent,
                range(target, 0, ElementType::Uint8),
                range(source, 0, ElementType::Float64),
                2,
            );
            // ToUint8 keeps the value modulo 2^8.
            assert_eq!(bytes(agent, target), [44, 255]);
        });
    }

    #[test]
    fn element_wise_conversion_within_one_buffer_reads_a_snapshot() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let initial = (1..=16).collect::<Vec<u8>>();
            let buffer = ArrayBuffer::from_bytes(agent, &initial, gc.nogc()).unwrap().unbind();
            // Four Uint8 elements at bytes 0..4 widened into Int16 elements
            // at bytes 2..10.
            copy_elements(
                agent,
                range(buffer, 2, ElementType::Int16),
                range(buffer, 0, ElementType::Uint8),
                4,
            );
            let written = (0..4)
                .map(|k| buffer.get_value::<i16>(agent, 2 + 2 * k).unwrap())
                .collect::<Vec<_>>();
            assert_eq!(written, [1, 2, 3, 4]);
            assert_eq!(buffer.get_value::<u8>(agent, 0), Some(1));
            assert_eq!(buffer.get_value::<u8>(agent, 10), Some(11));
        });
    }

    #[test]
    fn same_type_copies_between_buffers_are_bit_exact() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let source = ArrayBuffer::from_bytes(agent, &[0; 8], gc.nogc()).unwrap().unbind();
            let nan_bits = 0x7ff8_dead_beef_0001_u64;
            source.set_value::<f64>(agent, 0, f64::from_bits(nan_bits));
            let target = ArrayBuffer::from_bytes(agent, &[0; 8], gc.nogc()).unwrap().unbind();
            copy_elements(
                agent,
                range(target, 0, ElementType::Float64),
                range(source, 0, ElementType::Float64),
                1,
            );
            assert_eq!(target.get_value::<f64>(agent, 0).unwrap().to_bits(), nan_bits);
        });
    }
}
