// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::{
                construct, get, get_prototype_from_constructor, length_of_array_like,
                species_constructor,
            },
            type_conversion::to_index,
        },
        builtins::{
            ArrayBuffer, ArrayBufferHeapData, ElementsKind, Function,
            array_buffer::abstract_operations::clone_array_buffer,
            indexed_collections::bulk_copy::{BufferRange, copy_elements},
            typed_array::{TypedArray, TypedArrayHeapData, byte_end},
        },
        execution::{Agent, ExceptionType, JsResult, ProtoIntrinsics},
        types::{DataBlock, ElementType, ElementValue, InternalSlots, Object, PropertyKey, Value},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope, NoGcScope},
    },
    heap::CreateHeapData,
};

/// ### [23.2.4.4 ValidateTypedArray ( O, order )](https://tc39.es/ecma262/#sec-validatetypedarray)
///
/// Returns the typed array together with its current length.
pub(crate) fn validate_typed_array<'gc>(
    agent: &mut Agent,
    o: Value,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, (TypedArray<'gc>, usize)> {
    // 1. Perform ? RequireInternalSlot(O, [[TypedArrayName]]).
    let o = require_typed_array(agent, o, gc)?;
    // 3. Let taRecord be MakeTypedArrayWithBufferWitnessRecord(O, order).
    // 4. If IsTypedArrayOutOfBounds(taRecord) is true, throw a TypeError exception.
    if o.is_out_of_bounds(agent) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "TypedArray is detached or out of bounds",
            gc,
        ));
    }
    // 5. Return taRecord.
    Ok((o, o.length(agent)))
}

/// RequireInternalSlot(O, [[TypedArrayName]]).
pub(crate) fn require_typed_array<'gc>(
    agent: &mut Agent,
    o: Value,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    match TypedArray::try_from(o) {
        Ok(o) => Ok(o.unbind().bind(gc)),
        Err(()) => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "TypedArray expected",
            gc,
        )),
    }
}

/// ### [10.4.5.10 TypedArrayCreate ( prototype )](https://tc39.es/ecma262/#sec-typedarraycreate)
///
/// Creates the view with all of its slots filled in at once.
fn typed_array_create<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    prototype: Option<Object>,
    viewed_array_buffer: ArrayBuffer,
    byte_offset: usize,
    array_length: Option<usize>,
    gc: NoGcScope<'gc, '_>,
) -> TypedArray<'gc> {
    let typed_array: TypedArray = agent.heap.create(TypedArrayHeapData {
        viewed_array_buffer: viewed_array_buffer.unbind(),
        byte_offset,
        array_length,
        element_type,
        backing_object: None,
    });
    if let Some(prototype) = prototype {
        let default_prototype: Object = agent.intrinsics().typed_array_prototype_of(element_type).into();
        if prototype.unbind() != default_prototype {
            typed_array.internal_set_prototype(agent, Some(prototype));
        }
    }
    typed_array.bind(gc)
}

/// ### [23.2.5.1.6 AllocateTypedArrayBuffer ( O, length )](https://tc39.es/ecma262/#sec-allocatetypedarraybuffer)
///
/// Allocates the fixed-length %ArrayBuffer% backing a new view of `length`
/// elements. Never calls into user code.
pub(crate) fn allocate_typed_array_buffer<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    length: u64,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, ArrayBuffer<'gc>> {
    // 2. Let elementSize be TypedArrayElementSize(O).
    // 3. Let byteLength be elementSize × length.
    let Some(byte_length) = length.checked_mul(element_type.element_size() as u64) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Invalid typed array length",
            gc,
        ));
    };
    // 4. Let data be ? AllocateArrayBuffer(%ArrayBuffer%, byteLength).
    let block = DataBlock::create_byte_data_block(agent, byte_length, None, gc)?;
    let data: ArrayBuffer = agent.heap.create(ArrayBufferHeapData::new_owned(block, None));
    Ok(data.bind(gc))
}

/// ### [23.2.5.1.1 AllocateTypedArray ( constructorName, newTarget, defaultProto, length )](https://tc39.es/ecma262/#sec-allocatetypedarray)
pub(crate) fn allocate_typed_array<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    new_target: Function,
    length: u64,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    // 1. Let proto be ? GetPrototypeFromConstructor(newTarget, defaultProto).
    let proto = get_prototype_from_constructor(
        agent,
        new_target,
        ProtoIntrinsics::TypedArray(element_type),
        gc.reborrow(),
    )
    .unbind()?;
    let gc = gc.into_nogc();
    // 8. Perform ? AllocateTypedArrayBuffer(obj, length).
    let data = allocate_typed_array_buffer(agent, element_type, length, gc)?;
    // 2. Let obj be TypedArrayCreate(proto).
    Ok(typed_array_create(
        agent,
        element_type,
        Some(proto),
        data,
        0,
        Some(length as usize),
        gc,
    ))
}

/// A new view of `length` zeroed elements with the intrinsic prototype of
/// its element type.
pub(crate) fn create_typed_array_with_length<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    length: usize,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    let data = allocate_typed_array_buffer(agent, element_type, length as u64, gc)?;
    Ok(typed_array_create(agent, element_type, None, data, 0, Some(length), gc))
}

/// ### [23.2.5.1.2 InitializeTypedArrayFromTypedArray ( O, srcArray )](https://tc39.es/ecma262/#sec-initializetypedarrayfromtypedarray)
pub(crate) fn initialize_typed_array_from_typed_array<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    proto: Object,
    src_array: TypedArray,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    // 7. Let srcRecord be MakeTypedArrayWithBufferWitnessRecord(srcArray, seq-cst).
    // 8. If IsTypedArrayOutOfBounds(srcRecord) is true, throw a TypeError exception.
    if src_array.is_out_of_bounds(agent) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "TypedArray is detached or out of bounds",
            gc,
        ));
    }
    // 1. Let srcData be srcArray.[[ViewedArrayBuffer]].
    let src_data = src_array.viewed_array_buffer(agent);
    // 6. Let srcByteOffset be srcArray.[[ByteOffset]].
    let src_byte_offset = src_array.raw_byte_offset(agent);
    // 9. Let elementLength be TypedArrayLength(srcRecord).
    let element_length = src_array.length(agent);
    // 10. Let byteLength be elementSize × elementLength.
    let Some(byte_length) = byte_end(0, element_length, element_type.element_size()) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Invalid typed array length",
            gc,
        ));
    };
    // 11. If elementType is srcType, then
    let data = if element_type == src_array.element_type() {
        // a. Let data be ? CloneArrayBuffer(srcData, srcByteOffset, byteLength).
        clone_array_buffer(agent, src_data, src_byte_offset, byte_length, gc)?
    } else {
        // 12. Else,
        //   b. If srcArray.[[ContentType]] is not O.[[ContentType]], throw a
        //      TypeError exception.
        if element_type.is_bigint() != src_array.is_bigint() {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Cannot mix BigInt and Number typed arrays",
                gc,
            ));
        }
        //   a. Let data be ? AllocateArrayBuffer(%ArrayBuffer%, byteLength).
        let data = allocate_typed_array_buffer(agent, element_type, element_length as u64, gc)?;
        //   c.-f. Copy every element, converting it to elementType.
        let target = BufferRange {
            buffer: data,
            byte_offset: 0,
            element_type,
        };
        let source = BufferRange::of_typed_array(agent, src_array, 0);
        copy_elements(agent, target, source, element_length);
        data
    };
    // 13. Set O.[[ViewedArrayBuffer]] to data.
    // 15. Set O.[[ByteOffset]] to 0.
    // 16. Set O.[[ArrayLength]] to elementLength.
    Ok(typed_array_create(
        agent,
        element_type,
        Some(proto),
        data,
        0,
        Some(element_length),
        gc,
    ))
}

/// ### [23.2.5.1.3 InitializeTypedArrayFromArrayBuffer ( O, buffer, byteOffset, length )](https://tc39.es/ecma262/#sec-initializetypedarrayfromarraybuffer)
pub(crate) fn initialize_typed_array_from_array_buffer<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    proto: Object,
    buffer: ArrayBuffer,
    byte_offset: Value,
    length: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    let proto = proto.scope(agent, gc.nogc());
    let buffer = buffer.scope(agent, gc.nogc());
    let length = length.scope(agent, gc.nogc());
    // 1. Let elementSize be TypedArrayElementSize(O).
    let element_size = element_type.element_size();
    // 2. Let offset be ? ToIndex(byteOffset).
    let offset = to_index(agent, byte_offset, gc.reborrow()).unbind()? as usize;
    // 3. If offset modulo elementSize ≠ 0, throw a RangeError exception.
    if offset % element_size != 0 {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Start offset must be a multiple of the element size",
            gc.into_nogc(),
        ));
    }
    // 4. Let bufferIsFixedLength be IsFixedLengthArrayBuffer(buffer).
    let buffer_is_fixed_length = buffer.get(agent).is_fixed_length(agent);
    // 5. If length is not undefined, then
    //   a. Let newLength be ? ToIndex(length).
    let length = length.get(agent);
    let new_length = if length.is_undefined() {
        None
    } else {
        Some(to_index(agent, length, gc.reborrow()).unbind()?)
    };
    let gc = gc.into_nogc();
    let buffer = buffer.get(agent);
    // 6. If IsDetachedBuffer(buffer) is true, throw a TypeError exception.
    if buffer.is_detached(agent) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "ArrayBuffer is detached",
            gc,
        ));
    }
    // 7. Let bufferByteLength be ArrayBufferByteLength(buffer, seq-cst).
    let buffer_byte_length = buffer.byte_length(agent);
    let array_length = match new_length {
        // 8. If length is undefined and bufferIsFixedLength is false, then
        None if !buffer_is_fixed_length => {
            // a. If offset > bufferByteLength, throw a RangeError exception.
            if offset > buffer_byte_length {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::RangeError,
                    "Start offset is outside the bounds of the buffer",
                    gc,
                ));
            }
            // c. Set O.[[ArrayLength]] to AUTO.
            None
        }
        // 9. Else,
        //   a. If length is undefined, then
        None => {
            // i. If bufferByteLength modulo elementSize ≠ 0, throw a RangeError exception.
            if buffer_byte_length % element_size != 0 {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::RangeError,
                    "Byte length of the buffer must be a multiple of the element size",
                    gc,
                ));
            }
            // ii. Let newByteLength be bufferByteLength - offset.
            // iii. If newByteLength < 0, throw a RangeError exception.
            let Some(new_byte_length) = buffer_byte_length.checked_sub(offset) else {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::RangeError,
                    "Start offset is outside the bounds of the buffer",
                    gc,
                ));
            };
            Some(new_byte_length / element_size)
        }
        //   b. Else,
        Some(new_length) => {
            // i. Let newByteLength be newLength × elementSize.
            // ii. If offset + newByteLength > bufferByteLength, throw a RangeError exception.
            let end = (new_length as u128) * (element_size as u128) + offset as u128;
            if end > buffer_byte_length as u128 {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::RangeError,
                    "Invalid typed array length",
                    gc,
                ));
            }
            Some(new_length as usize)
        }
    };
    // 10. Set O.[[ViewedArrayBuffer]] to buffer.
    // 11. Set O.[[ByteOffset]] to offset.
    let proto = proto.get(agent);
    Ok(typed_array_create(
        agent,
        element_type,
        Some(proto),
        buffer,
        offset,
        array_length,
        gc,
    ))
}

/// ### [23.2.5.1.4 InitializeTypedArrayFromList ( O, values )](https://tc39.es/ecma262/#sec-initializetypedarrayfromlist)
pub(crate) fn initialize_typed_array_from_list<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    proto: Object,
    values: &[Value<'static>],
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    // 1. Let len be the number of elements in values.
    // 2. Perform ? AllocateTypedArrayBuffer(O, len).
    let data = allocate_typed_array_buffer(agent, element_type, values.len() as u64, gc.nogc()).unbind()?;
    let o = typed_array_create(
        agent,
        element_type,
        Some(proto),
        data,
        0,
        Some(values.len()),
        gc.nogc(),
    )
    .scope(agent, gc.nogc());
    // 4. Repeat, while k < len,
    for (k, &k_value) in values.iter().enumerate() {
        // d. Perform ? Set(O, Pk, kValue, true).
        o.get(agent)
            .set_element(agent, k as i64, k_value, gc.reborrow())
            .unbind()?;
    }
    // 6. Return UNUSED.
    Ok(o.get(agent).bind(gc.into_nogc()))
}

/// ### [23.2.5.1.5 InitializeTypedArrayFromArrayLike ( O, arrayLike )](https://tc39.es/ecma262/#sec-initializetypedarrayfromarraylike)
pub(crate) fn initialize_typed_array_from_array_like<'gc>(
    agent: &mut Agent,
    element_type: ElementType,
    proto: Object,
    array_like: Object,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    let proto = proto.scope(agent, gc.nogc());
    let array_like = array_like.scope(agent, gc.nogc());
    // 1. Let len be ? LengthOfArrayLike(arrayLike).
    let len = length_of_array_like(agent, array_like.get(agent), gc.reborrow()).unbind()?;
    // 2. Perform ? AllocateTypedArrayBuffer(O, len).
    let data = allocate_typed_array_buffer(agent, element_type, len, gc.nogc()).unbind()?;
    let proto = proto.get(agent);
    let o = typed_array_create(
        agent,
        element_type,
        Some(proto),
        data,
        0,
        Some(len as usize),
        gc.nogc(),
    )
    .unbind();
    if !element_type.is_bigint()
        && let Some(numbers) = packed_number_elements(agent, array_like.get(agent), len)
    {
        log::trace!("InitializeTypedArrayFromArrayLike: packed number fast path");
        for (k, n) in numbers.into_iter().enumerate() {
            o.set_element_value(agent, k as i64, ElementValue::Number(n));
        }
        return Ok(o.bind(gc.into_nogc()));
    }
    let o = o.scope(agent, gc.nogc());
    // 3. Let k be 0.
    // 4. Repeat, while k < len,
    for k in 0..len {
        // a. Let Pk be ! ToString(𝔽(k)).
        // b. Let kValue be ? Get(arrayLike, Pk).
        let k_value = get(agent, array_like.get(agent), PropertyKey::from(k), gc.reborrow()).unbind()?;
        // c. Perform ? Set(O, Pk, kValue, true).
        o.get(agent)
            .set_element(agent, k as i64, k_value, gc.reborrow())
            .unbind()?;
    }
    // 5. Return UNUSED.
    Ok(o.get(agent).bind(gc.into_nogc()))
}

/// The elements of an Array whose storage holds only Numbers and whose
/// length is `len`. Reading such an Array through Get cannot call into user
/// code, so the Numbers can be taken as they are.
pub(crate) fn packed_number_elements(agent: &Agent, object: Object, len: u64) -> Option<Vec<f64>> {
    let Object::Array(array) = object else {
        return None;
    };
    if !array.is_fast_path_eligible(agent)
        || !matches!(
            array.elements_kind(agent),
            Some(ElementsKind::PackedInt | ElementsKind::PackedDouble)
        )
    {
        return None;
    }
    let elements = array.as_slice(agent)?;
    if elements.len() as u64 != len {
        return None;
    }
    elements
        .iter()
        .map(|element| match element {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        })
        .collect()
}

/// ### [23.2.4.2 TypedArrayCreateFromConstructor ( constructor, argumentList )](https://tc39.es/ecma262/#sec-typedarraycreatefromconstructor)
///
/// `min_length` is the single Number argument, when there is one.
pub(crate) fn typed_array_create_from_constructor<'gc>(
    agent: &mut Agent,
    constructor: Function,
    argument_list: &[Value],
    min_length: Option<usize>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    // 1. Let newTypedArray be ? Construct(constructor, argumentList).
    let new_typed_array = construct(agent, constructor, argument_list, None, gc.reborrow()).unbind()?;
    let gc = gc.into_nogc();
    // 2. Let taRecord be ? ValidateTypedArray(newTypedArray, seq-cst).
    let (new_typed_array, length) = validate_typed_array(agent, new_typed_array.into(), gc)?;
    // 3. If the number of elements in argumentList is 1 and argumentList[0]
    //    is a Number, then
    //   b. Let length be TypedArrayLength(taRecord).
    //   c. If length < ℝ(argumentList[0]), throw a TypeError exception.
    if min_length.is_some_and(|min_length| length < min_length) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Derived TypedArray constructor created an array which was too small",
            gc,
        ));
    }
    // 4. Return newTypedArray.
    Ok(new_typed_array)
}

/// ### [23.2.4.1 TypedArraySpeciesCreate ( exemplar, argumentList )](https://tc39.es/ecma262/#sec-typedarrayspeciescreate)
///
/// The form taking a single length argument.
pub(crate) fn typed_array_species_create_with_length<'gc>(
    agent: &mut Agent,
    exemplar: TypedArray,
    length: usize,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    typed_array_species_create(
        agent,
        exemplar,
        &[Value::from_f64(length as f64)],
        Some(length),
        gc,
    )
}

/// TypedArraySpeciesCreate(exemplar, « buffer, 𝔽(byteOffset), 𝔽(length) »),
/// with the length left out for length-tracking results.
pub(crate) fn typed_array_species_create_with_buffer<'gc>(
    agent: &mut Agent,
    exemplar: TypedArray,
    buffer: ArrayBuffer,
    byte_offset: usize,
    length: Option<usize>,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    let buffer = Value::from(buffer.unbind());
    let byte_offset = Value::from_f64(byte_offset as f64);
    match length {
        Some(length) => typed_array_species_create(
            agent,
            exemplar,
            &[buffer, byte_offset, Value::from_f64(length as f64)],
            None,
            gc,
        ),
        None => typed_array_species_create(agent, exemplar, &[buffer, byte_offset], None, gc),
    }
}

fn typed_array_species_create<'gc>(
    agent: &mut Agent,
    exemplar: TypedArray,
    argument_list: &[Value],
    min_length: Option<usize>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    let exemplar = exemplar.unbind();
    let is_bigint = exemplar.is_bigint();
    let argument_list = argument_list.iter().map(|value| value.unbind()).collect::<Vec<_>>();
    // 1. Let defaultConstructor be the intrinsic object associated with the
    //    constructor name exemplar.[[TypedArrayName]] in Table 71.
    let default_constructor = agent.intrinsics().typed_array_constructor(exemplar.element_type());
    // 2. Let constructor be ? SpeciesConstructor(exemplar, defaultConstructor).
    let constructor =
        species_constructor(agent, exemplar.into(), default_constructor, gc.reborrow()).unbind()?;
    if constructor == default_constructor {
        log::trace!("TypedArraySpeciesCreate: default constructor");
    }
    // 3. Let result be ? TypedArrayCreateFromConstructor(constructor, argumentList).
    let result =
        typed_array_create_from_constructor(agent, constructor, &argument_list, min_length, gc.reborrow())
            .unbind()?;
    // 4. If result.[[ContentType]] is not exemplar.[[ContentType]], throw a
    //    TypeError exception.
    if result.is_bigint() != is_bigint {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "TypedArray species constructor created an array of the wrong content type",
            gc.into_nogc(),
        ));
    }
    // 5. Return result.
    Ok(result.bind(gc.into_nogc()))
}

/// ### [23.2.4.3 TypedArrayCreateSameType ( exemplar, length )](https://tc39.es/ecma262/#sec-typedarray-create-same-type)
///
/// Species is ignored: the result always has the intrinsic constructor and
/// prototype of the exemplar's element type.
pub(crate) fn typed_array_create_same_type<'gc>(
    agent: &mut Agent,
    exemplar: TypedArray,
    length: usize,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, TypedArray<'gc>> {
    create_typed_array_with_length(agent, exemplar.element_type(), length, gc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{builtins::Array, execution::Options};

    #[test]
    fn views_over_buffers_validate_offset_and_length() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let proto: Object = agent.intrinsics().typed_array_prototype_of(ElementType::Int32).into();
            let buffer = ArrayBuffer::from_bytes(agent, &[0; 16], gc.nogc()).unwrap().unbind();
            let view = initialize_typed_array_from_array_buffer(
                agent,
                ElementType::Int32,
                proto,
                buffer,
                Value::from_f64(4.0),
                Value::Undefined,
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            assert_eq!(view.length(agent), 3);
            assert_eq!(view.byte_offset(agent), 4);

            let misaligned = initialize_typed_array_from_array_buffer(
                agent,
                ElementType::Int32,
                proto,
                buffer,
                Value::from_f64(2.0),
                Value::Undefined,
                gc.reborrow(),
            )
            .unbind()
            .unwrap_err();
            assert_eq!(agent.exception_type(misaligned), Some(ExceptionType::RangeError));

            let too_long = initialize_typed_array_from_array_buffer(
                agent,
                ElementType::Int32,
                proto,
                buffer,
                Value::from_f64(8.0),
                Value::from_f64(3.0),
                gc.reborrow(),
            )
            .unbind()
            .unwrap_err();
            assert_eq!(agent.exception_type(too_long), Some(ExceptionType::RangeError));
        });
    }

    #[test]
    fn initializing_from_another_type_converts_each_element() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let source = create_typed_array_with_length(agent, ElementType::Float64, 2, gc.nogc())
                .unwrap()
                .unbind();
            source.set_element_value(agent, 0, ElementValue::Number(300.5));
            source.set_element_value(agent, 1, ElementValue::Number(-1.0));
            let proto: Object = agent.intrinsics().typed_array_prototype_of(ElementType::Uint8).into();
            let bytes = initialize_typed_array_from_typed_array(agent, ElementType::Uint8, proto, source, gc.nogc())
                .unwrap()
                .unbind();
            assert_eq!(bytes.get_element_value(agent, 0), Some(ElementValue::Number(44.0)));
            assert_eq!(bytes.get_element_value(agent, 1), Some(ElementValue::Number(255.0)));

            let proto: Object = agent.intrinsics().typed_array_prototype_of(ElementType::BigInt64).into();
            let error = initialize_typed_array_from_typed_array(agent, ElementType::BigInt64, proto, source, gc.nogc())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn packed_arrays_initialize_without_the_property_protocol() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let values = [Value::from_f64(1.5), Value::from_f64(2.0), Value::from_f64(-3.0)];
            let array = Array::from_slice(agent, &values, gc.nogc()).unbind();
            let proto: Object = agent.intrinsics().typed_array_prototype_of(ElementType::Int8).into();
            let view = initialize_typed_array_from_array_like(
                agent,
                ElementType::Int8,
                proto,
                array.into(),
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            assert_eq!(view.length(agent), 3);
            assert_eq!(view.get_element_value(agent, 0), Some(ElementValue::Number(1.0)));
            assert_eq!(view.get_element_value(agent, 2), Some(ElementValue::Number(-3.0)));
        });
    }

    #[test]
    fn widening_copies_respect_the_allocation_limit() {
        let mut agent = Agent::new(Options {
            max_array_buffer_byte_length: 64,
            ..Options::default()
        });
        agent.run(|agent, gc| {
            let source = create_typed_array_with_length(agent, ElementType::Int8, 16, gc.nogc())
                .unwrap()
                .unbind();
            let proto: Object = agent.intrinsics().typed_array_prototype_of(ElementType::Float64).into();
            let error = initialize_typed_array_from_typed_array(agent, ElementType::Float64, proto, source, gc.nogc())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));

            let proto: Object = agent.intrinsics().typed_array_prototype_of(ElementType::Int16).into();
            let words = initialize_typed_array_from_typed_array(agent, ElementType::Int16, proto, source, gc.nogc())
                .unwrap();
            assert_eq!(words.length(agent), 16);
        });
    }

    #[test]
    fn packed_number_elements_only_reads_number_storage() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let numbers = [Value::from_f64(1.0), Value::from_f64(2.5)];
            let array = Array::from_slice(agent, &numbers, gc.nogc()).unbind();
            assert_eq!(packed_number_elements(agent, array.into(), 2), Some(vec![1.0, 2.5]));
            assert_eq!(packed_number_elements(agent, array.into(), 3), None);

            let mixed = [Value::from_f64(1.0), Value::Undefined];
            let array = Array::from_slice(agent, &mixed, gc.nogc()).unbind();
            assert_eq!(packed_number_elements(agent, array.into(), 2), None);
        });
    }

    #[test]
    fn oversized_lengths_are_range_errors() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let error = allocate_typed_array_buffer(agent, ElementType::Float64, u64::MAX / 2, gc.nogc()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        });
    }
}
