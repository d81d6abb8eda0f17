// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{Array, ArrayElements, ArrayHeapData};
use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::{construct, get},
            testing_and_comparison::{is_array, is_constructor},
            type_conversion::{to_number, to_uint32},
        },
        execution::{Agent, ExceptionType, JsResult},
        types::{BUILTIN_STRING_MEMORY, InternalSlots, Object, Value, WellKnownSymbol},
    },
    engine::context::{Bindable, GcScope, NoGcScope},
    heap::CreateHeapData,
};

/// ### [10.4.2.2 ArrayCreate ( length \[ , proto \] )](https://tc39.es/ecma262/#sec-arraycreate)
///
/// The abstract operation ArrayCreate takes argument length (a non-negative
/// integer) and optional argument proto (an Object) and returns either a
/// normal completion containing an Array exotic object or a throw completion.
/// It is used to specify the creation of new Arrays.
///
/// The array starts out as `length` holes; lengths over the sparse threshold
/// start out with dictionary elements.
pub fn array_create<'gc>(
    agent: &mut Agent,
    length: u64,
    proto: Option<Object>,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, Array<'gc>> {
    // 1. If length > 2**32 - 1, throw a RangeError exception.
    let Ok(length) = u32::try_from(length) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Invalid array length",
            gc,
        ));
    };
    // 3. Let A be MakeBasicObject(« [[Prototype]], [[Extensible]] »).
    // 5. Set A.[[DefineOwnProperty]] as specified in 10.4.2.1.
    let threshold = agent.options.sparse_array_threshold;
    let array: Array = agent.heap.create(ArrayHeapData {
        elements: ArrayElements::with_holes(length, threshold),
        backing_object: None,
    });
    // 2. If proto is not present, set proto to %Array.prototype%.
    // 4. Set A.[[Prototype]] to proto.
    if let Some(proto) = proto {
        let array_prototype: Object = agent.intrinsics().array_prototype().into();
        if proto.unbind() != array_prototype {
            array.internal_set_prototype(agent, Some(proto));
        }
    }
    // 6. Perform ! OrdinaryDefineOwnProperty(A, "length", PropertyDescriptor
    //    { [[Value]]: 𝔽(length), [[Writable]]: true, [[Enumerable]]: false,
    //    [[Configurable]]: false }).
    // 7. Return A.
    Ok(array.bind(gc))
}

/// ### [10.4.2.3 ArraySpeciesCreate ( originalArray, length )](https://tc39.es/ecma262/#sec-arrayspeciescreate)
///
/// The abstract operation ArraySpeciesCreate takes arguments originalArray
/// (an Object) and length (a non-negative integer) and returns either a
/// normal completion containing an Object or a throw completion. It is used
/// to specify the creation of a new Array or similar object using a
/// constructor function that is derived from originalArray. It does not
/// enforce that the constructor function returns an Array.
pub(crate) fn array_species_create<'gc>(
    agent: &mut Agent,
    original_array: Object,
    length: u64,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Object<'gc>> {
    // 1. Let isArray be ? IsArray(originalArray).
    // 2. If isArray is false, return ? ArrayCreate(length).
    if !is_array(original_array.into()) {
        return Ok(array_create(agent, length, None, gc.into_nogc())?.into());
    }
    // 3. Let C be ? Get(originalArray, "constructor").
    let c = get(
        agent,
        original_array,
        BUILTIN_STRING_MEMORY.constructor.into(),
        gc.reborrow(),
    )
    .unbind()?;
    // 5. If C is an Object, then
    let c = if let Ok(c_object) = Object::try_from(c) {
        // a. Set C to ? Get(C, %Symbol.species%).
        let species = get(agent, c_object, WellKnownSymbol::Species.into(), gc.reborrow()).unbind()?;
        // b. If C is null, set C to undefined.
        if species.is_null() {
            Value::Undefined
        } else {
            species
        }
    } else {
        c
    };
    // 6. If C is undefined, return ? ArrayCreate(length).
    if c.is_undefined() {
        log::trace!("ArraySpeciesCreate: default constructor");
        return Ok(array_create(agent, length, None, gc.into_nogc())?.into());
    }
    // 7. If IsConstructor(C) is false, throw a TypeError exception.
    let Some(c) = is_constructor(agent, c) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Array species is not a constructor",
            gc.into_nogc(),
        ));
    };
    // 8. Return ? Construct(C, « 𝔽(length) »).
    log::trace!("ArraySpeciesCreate: constructing through species");
    construct(agent, c, &[Value::Number(length as f64)], None, gc)
}

/// ### [10.4.2.4 ArraySetLength ( A, Desc )](https://tc39.es/ecma262/#sec-arraysetlength)
///
/// The abstract operation ArraySetLength takes arguments A (an Array) and
/// a new length value and returns either a normal completion containing a
/// Boolean or a throw completion. Elements at or past the new length are
/// removed.
pub(crate) fn array_set_length<'gc>(
    agent: &mut Agent,
    a: Array,
    value: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, bool> {
    let a = a.unbind();
    let value = value.unbind();
    // 3. Let newLen be ? ToUint32(Desc.[[Value]]).
    let new_len = to_uint32(agent, value, gc.reborrow()).unbind()?;
    // 4. Let numberLen be ? ToNumber(Desc.[[Value]]).
    let number_len = to_number(agent, value, gc.reborrow()).unbind()?;
    // 5. If SameValueZero(newLen, numberLen) is false, throw a RangeError exception.
    if number_len != new_len as f64 {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Invalid array length",
            gc.into_nogc(),
        ));
    }
    // 11. If newLen ≥ oldLen, then
    //   a. Return ! OrdinaryDefineOwnProperty(A, "length", newLenDesc).
    // 17. For each own property key P of A such that P is an array index and
    //     ! ToUint32(P) ≥ newLen, in descending numeric index order, do
    //   a. Let deleteSucceeded be ! A.[[Delete]](P).
    // Elements are always configurable, so every deletion succeeds.
    a.set_len(agent, new_len);
    // 19. Return true.
    Ok(true)
}
