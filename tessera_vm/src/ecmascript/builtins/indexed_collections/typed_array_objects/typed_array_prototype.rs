// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.2.3 Properties of the %TypedArray% Prototype Object](https://tc39.es/ecma262/#sec-properties-of-the-%typedarrayprototype%-object)
//!
//! Element reads made on behalf of a callback go through TypedArrayGetElement,
//! so a view that was detached or shrunk by user code reads as `undefined`.
//! Methods that write into or copy out of the receiver after calling user
//! code validate it again and throw a TypeError if it went out of bounds.

use core::cmp::Ordering;

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::{call_function, get, length_of_array_like},
            testing_and_comparison::require_callable,
            type_conversion::{
                clamp_relative_index, to_boolean, to_integer_or_infinity, to_object, to_relative_index,
                to_string, to_string_primitive,
            },
        },
        builders::OrdinaryObjectBuilder,
        builtins::{
            ArgumentsList, Behaviour, Builtin, BuiltinGetter, Function,
            indexed_collections::{
                array_objects::array_iterator_objects::{
                    CollectionIteratorKind, array_iterator_prototype::create_array_iterator,
                },
                bulk_copy::{BufferRange, copy_elements, move_within},
                join::JoinParts,
                search::{SearchMode, TypedSearchRange, search_typed_array},
                sorting::{call_comparator, insertion_sort_by, optional_comparator},
            },
            typed_array::{
                TypedArray, checked_byte_end, primitive_to_element_value, to_element_value,
                with_typed_array_viewable,
            },
        },
        execution::{Agent, ExceptionType, JsResult},
        types::{
            BUILTIN_STRING_MEMORY, ElementValue, PropertyKey, String, Value, Viewable,
            WellKnownSymbol,
        },
    },
    engine::{
        Scopable, Scoped,
        context::{Bindable, GcScope, NoGcScope},
    },
};

use super::abstract_operations::{
    packed_number_elements, require_typed_array, typed_array_create_same_type,
    typed_array_species_create_with_buffer, typed_array_species_create_with_length,
    validate_typed_array,
};

pub(crate) struct TypedArrayPrototype;

macro_rules! typed_array_prototype_methods {
    ($($name: ident: $js_name: literal, $length: literal => $method: ident;)*) => {
        $(
            struct $name;
            impl Builtin for $name {
                const NAME: &'static str = $js_name;
                const LENGTH: u8 = $length;
                const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayPrototype::$method);
            }
        )*
    };
}

typed_array_prototype_methods! {
    TypedArrayPrototypeAt: "at", 1 => at;
    TypedArrayPrototypeCopyWithin: "copyWithin", 2 => copy_within;
    TypedArrayPrototypeEntries: "entries", 0 => entries;
    TypedArrayPrototypeEvery: "every", 1 => every;
    TypedArrayPrototypeFill: "fill", 1 => fill;
    TypedArrayPrototypeFilter: "filter", 1 => filter;
    TypedArrayPrototypeFind: "find", 1 => find;
    TypedArrayPrototypeFindIndex: "findIndex", 1 => find_index;
    TypedArrayPrototypeFindLast: "findLast", 1 => find_last;
    TypedArrayPrototypeFindLastIndex: "findLastIndex", 1 => find_last_index;
    TypedArrayPrototypeForEach: "forEach", 1 => for_each;
    TypedArrayPrototypeIncludes: "includes", 1 => includes;
    TypedArrayPrototypeIndexOf: "indexOf", 1 => index_of;
    TypedArrayPrototypeJoin: "join", 1 => join;
    TypedArrayPrototypeKeys: "keys", 0 => keys;
    TypedArrayPrototypeLastIndexOf: "lastIndexOf", 1 => last_index_of;
    TypedArrayPrototypeMap: "map", 1 => map;
    TypedArrayPrototypeReduce: "reduce", 1 => reduce;
    TypedArrayPrototypeReduceRight: "reduceRight", 1 => reduce_right;
    TypedArrayPrototypeReverse: "reverse", 0 => reverse;
    TypedArrayPrototypeSet: "set", 1 => set;
    TypedArrayPrototypeSlice: "slice", 2 => slice;
    TypedArrayPrototypeSome: "some", 1 => some;
    TypedArrayPrototypeSort: "sort", 1 => sort;
    TypedArrayPrototypeSubarray: "subarray", 2 => subarray;
    TypedArrayPrototypeToReversed: "toReversed", 0 => to_reversed;
    TypedArrayPrototypeToSorted: "toSorted", 1 => to_sorted;
    TypedArrayPrototypeToSpliced: "toSpliced", 2 => to_spliced;
    TypedArrayPrototypeWith: "with", 2 => with;
}

pub(crate) struct TypedArrayPrototypeValues;
impl Builtin for TypedArrayPrototypeValues {
    const NAME: &'static str = "values";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayPrototype::values);
}

struct TypedArrayPrototypeGetBuffer;
impl Builtin for TypedArrayPrototypeGetBuffer {
    const NAME: &'static str = "get buffer";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::String(BUILTIN_STRING_MEMORY.buffer));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayPrototype::get_buffer);
}
impl BuiltinGetter for TypedArrayPrototypeGetBuffer {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.buffer);
}

struct TypedArrayPrototypeGetByteLength;
impl Builtin for TypedArrayPrototypeGetByteLength {
    const NAME: &'static str = "get byteLength";
    const KEY: Option<PropertyKey<'static>> =
        Some(PropertyKey::String(BUILTIN_STRING_MEMORY.byteLength));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayPrototype::get_byte_length);
}
impl BuiltinGetter for TypedArrayPrototypeGetByteLength {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.byteLength);
}

struct TypedArrayPrototypeGetByteOffset;
impl Builtin for TypedArrayPrototypeGetByteOffset {
    const NAME: &'static str = "get byteOffset";
    const KEY: Option<PropertyKey<'static>> =
        Some(PropertyKey::String(BUILTIN_STRING_MEMORY.byteOffset));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayPrototype::get_byte_offset);
}
impl BuiltinGetter for TypedArrayPrototypeGetByteOffset {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.byteOffset);
}

struct TypedArrayPrototypeGetLength;
impl Builtin for TypedArrayPrototypeGetLength {
    const NAME: &'static str = "get length";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::String(BUILTIN_STRING_MEMORY.length));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayPrototype::get_length);
}
impl BuiltinGetter for TypedArrayPrototypeGetLength {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::String(BUILTIN_STRING_MEMORY.length);
}

struct TypedArrayPrototypeGetToStringTag;
impl Builtin for TypedArrayPrototypeGetToStringTag {
    const NAME: &'static str = "get [Symbol.toStringTag]";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::Symbol(WellKnownSymbol::ToStringTag));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayPrototype::get_to_string_tag);
}
impl BuiltinGetter for TypedArrayPrototypeGetToStringTag {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::Symbol(WellKnownSymbol::ToStringTag);
}

const CALLBACK_NOT_CALLABLE: &str = "Callback is not a function";
const OUT_OF_BOUNDS: &str = "TypedArray is detached or out of bounds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ascending,
    Descending,
}

impl TypedArrayPrototype {
    /// ### [23.2.3.1 %TypedArray%.prototype.at ( index )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.at)
    fn at<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let index = arguments.get(0).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let o = o.scope(agent, gc.nogc());
        // 4. Let relativeIndex be ? ToIntegerOrInfinity(index).
        let relative_index = to_integer_or_infinity(agent, index.get(agent), gc.reborrow()).unbind()?;
        // 5. If relativeIndex ≥ 0, then
        //   a. Let k be relativeIndex.
        // 6. Else,
        //   a. Let k be len + relativeIndex.
        let k = if relative_index >= 0.0 {
            relative_index
        } else {
            len as f64 + relative_index
        };
        // 7. If k < 0 or k ≥ len, return undefined.
        if k < 0.0 || k >= len as f64 {
            return Ok(Value::Undefined);
        }
        // 8. Return ! Get(O, ! ToString(𝔽(k))).
        let gc = gc.into_nogc();
        Ok(element_or_undefined(agent, o.get(agent), k as usize, gc))
    }

    /// ### [23.2.3.2 get %TypedArray%.prototype.buffer](https://tc39.es/ecma262/#sec-get-%typedarray%.prototype.buffer)
    fn get_buffer<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        // 1. Let O be the this value.
        // 2. Perform ? RequireInternalSlot(O, [[TypedArrayName]]).
        let o = require_typed_array(agent, this_value, gc)?;
        // 4. Let buffer be O.[[ViewedArrayBuffer]].
        // 5. Return buffer.
        Ok(o.viewed_array_buffer(agent).into())
    }

    /// ### [23.2.3.3 get %TypedArray%.prototype.byteLength](https://tc39.es/ecma262/#sec-get-%typedarray%.prototype.bytelength)
    fn get_byte_length<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_typed_array(agent, this_value, gc.into_nogc())?;
        // 5. Let size be TypedArrayByteLength(taRecord).
        Ok(Value::from_f64(o.byte_length(agent) as f64))
    }

    /// ### [23.2.3.4 get %TypedArray%.prototype.byteOffset](https://tc39.es/ecma262/#sec-get-%typedarray%.prototype.byteoffset)
    fn get_byte_offset<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_typed_array(agent, this_value, gc.into_nogc())?;
        // 5. If IsTypedArrayOutOfBounds(taRecord) is true, return +0𝔽.
        Ok(Value::from_f64(o.byte_offset(agent) as f64))
    }

    /// ### [23.2.3.6 %TypedArray%.prototype.copyWithin ( target, start \[ , end \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.copywithin)
    fn copy_within<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let target = arguments.get(0).scope(agent, gc.nogc());
        let start = arguments.get(1).scope(agent, gc.nogc());
        let end = arguments.get(2).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let o = o.scope(agent, gc.nogc());
        let len = len as u64;
        // 4-6. Let targetIndex be the clamped relative target.
        let target_index = to_relative_index(agent, Some(target.get(agent)), len, 0, gc.reborrow()).unbind()?;
        // 7-9. Let startIndex be the clamped relative start.
        let start_index = to_relative_index(agent, Some(start.get(agent)), len, 0, gc.reborrow()).unbind()?;
        // 10-12. Let endIndex be the clamped relative end.
        let end_index = to_relative_index(agent, Some(end.get(agent)), len, len, gc.reborrow()).unbind()?;
        // 13. Let count be min(endIndex - startIndex, len - targetIndex).
        let count = end_index.saturating_sub(start_index).min(len - target_index);
        let gc = gc.into_nogc();
        let o = o.get(agent).bind(gc);
        // 14. If count > 0, then
        if count > 0 {
            // a. NOTE: The copying must be performed in a manner that
            //    preserves the bit-level encoding of the source data.
            // b. Let buffer be O.[[ViewedArrayBuffer]].
            // c. Set taRecord to MakeTypedArrayWithBufferWitnessRecord(O, seq-cst).
            // d. If IsTypedArrayOutOfBounds(taRecord) is true, throw a TypeError exception.
            if o.is_out_of_bounds(agent) {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    OUT_OF_BOUNDS,
                    gc,
                ));
            }
            // e. Set len to TypedArrayLength(taRecord).
            let len = o.length(agent);
            // f. Let elementSize be TypedArrayElementSize(O).
            let element_size = o.element_size();
            // g. Let byteOffset be O.[[ByteOffset]].
            let byte_offset = o.raw_byte_offset(agent);
            // h. Let bufferByteLimit be (len × elementSize) + byteOffset.
            let buffer_byte_limit = checked_byte_end(byte_offset, len, element_size);
            // i. Let toByteIndex be (targetIndex × elementSize) + byteOffset.
            let to_byte_index = checked_byte_end(byte_offset, target_index as usize, element_size);
            // j. Let fromByteIndex be (startIndex × elementSize) + byteOffset.
            let from_byte_index = checked_byte_end(byte_offset, start_index as usize, element_size);
            // k. Let countBytes be count × elementSize.
            // l-n. Clamp countBytes so neither range runs past the limit.
            let count_bytes = checked_byte_end(0, count as usize, element_size)
                .min(buffer_byte_limit.saturating_sub(from_byte_index))
                .min(buffer_byte_limit.saturating_sub(to_byte_index));
            let buffer = o.viewed_array_buffer(agent);
            move_within(agent, buffer, to_byte_index, from_byte_index, count_bytes);
        }
        // 15. Return O.
        Ok(o.into())
    }

    /// ### [23.2.3.7 %TypedArray%.prototype.entries ( )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.entries)
    fn entries<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        // 2. Perform ? ValidateTypedArray(O, seq-cst).
        let (o, _) = validate_typed_array(agent, this_value, gc)?;
        // 3. Return CreateArrayIterator(O, key+value).
        Ok(create_array_iterator(agent, o.into(), CollectionIteratorKind::KeyAndValue, gc))
    }

    /// ### [23.2.3.8 %TypedArray%.prototype.every ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.every)
    fn every<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let IterationSetup {
            o,
            len,
            callback,
            this_arg,
        } = iteration_setup(agent, this_value, arguments, gc.nogc()).unbind()?;
        // 6. Repeat, while k < len,
        for k in 0..len {
            // c. Let testResult be ToBoolean(? Call(callback, thisArg, « kValue, 𝔽(k), O »)).
            let (_, test_result) =
                call_with_element(agent, callback, this_arg, o, k, gc.reborrow()).unbind()?;
            // d. If testResult is false, return false.
            if !to_boolean(agent, test_result) {
                return Ok(false.into());
            }
        }
        // 7. Return true.
        Ok(true.into())
    }

    /// ### [23.2.3.9 %TypedArray%.prototype.fill ( value \[ , start \[ , end \] \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.fill)
    fn fill<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let value = arguments.get(0).scope(agent, gc.nogc());
        let start = arguments.get(1).scope(agent, gc.nogc());
        let end = arguments.get(2).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let is_bigint = o.is_bigint();
        let o = o.scope(agent, gc.nogc());
        let len = len as u64;
        // 4. If O.[[ContentType]] is BIGINT, set value to ? ToBigInt(value).
        // 5. Otherwise, set value to ? ToNumber(value).
        let value = to_element_value(agent, value.get(agent), is_bigint, gc.reborrow()).unbind()?;
        // 6-8. Let startIndex be the clamped relative start.
        let start_index = to_relative_index(agent, Some(start.get(agent)), len, 0, gc.reborrow()).unbind()?;
        // 9-11. Let endIndex be the clamped relative end.
        let end_index = to_relative_index(agent, Some(end.get(agent)), len, len, gc.reborrow()).unbind()?;
        let gc = gc.into_nogc();
        let o = o.get(agent).bind(gc);
        // 12. Set taRecord to MakeTypedArrayWithBufferWitnessRecord(O, seq-cst).
        // 13. If IsTypedArrayOutOfBounds(taRecord) is true, throw a TypeError exception.
        if o.is_out_of_bounds(agent) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                OUT_OF_BOUNDS,
                gc,
            ));
        }
        // 14. Set len to TypedArrayLength(taRecord).
        // 15. Set endIndex to min(endIndex, len).
        let end_index = (end_index as usize).min(o.length(agent));
        let start_index = start_index as usize;
        // 16. Let k be startIndex.
        // 17. Repeat, while k < endIndex,
        if start_index < end_index {
            with_typed_array_viewable!(
                o.element_type(),
                fill_elements::<T>(agent, o, start_index, end_index, T::from_element(value)),
                T
            );
        }
        // 18. Return O.
        Ok(o.into())
    }

    /// ### [23.2.3.10 %TypedArray%.prototype.filter ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.filter)
    fn filter<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let IterationSetup {
            o,
            len,
            callback,
            this_arg,
        } = iteration_setup(agent, this_value, arguments, gc.nogc()).unbind()?;
        // 5. Let kept be a new empty List.
        let mut kept = Vec::new();
        // 7. Let k be 0.
        // 8. Repeat, while k < len,
        for k in 0..len {
            // c. Let selected be ToBoolean(? Call(callback, thisArg, « kValue, 𝔽(k), O »)).
            let (k_value, selected) =
                call_with_element(agent, callback, this_arg, o, k, gc.reborrow()).unbind()?;
            // d. If selected is true, then
            if to_boolean(agent, selected) {
                // i. Append kValue to kept.
                kept.push(k_value);
            }
        }
        // 9. Let A be ? TypedArraySpeciesCreate(O, « 𝔽(captured) »).
        let a = typed_array_species_create_with_length(agent, o.get(agent), kept.len(), gc.reborrow())
            .unbind()?;
        let gc = gc.into_nogc();
        // 10. Let n be 0.
        // 11. For each element e of kept, do
        for (n, e) in kept.into_iter().enumerate() {
            // a. Perform ! Set(A, ! ToString(𝔽(n)), e, true).
            store_element(agent, a, n, e);
        }
        // 12. Return A.
        Ok(a.bind(gc).into())
    }

    /// ### [23.2.3.11 %TypedArray%.prototype.find ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.find)
    fn find<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (_, value) = find_via_predicate(agent, this_value, arguments, Direction::Ascending, gc)?;
        Ok(value)
    }

    /// ### [23.2.3.12 %TypedArray%.prototype.findIndex ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.findindex)
    fn find_index<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (index, _) = find_via_predicate(agent, this_value, arguments, Direction::Ascending, gc)?;
        Ok(index_to_value(index))
    }

    /// ### [23.2.3.13 %TypedArray%.prototype.findLast ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.findlast)
    fn find_last<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (_, value) = find_via_predicate(agent, this_value, arguments, Direction::Descending, gc)?;
        Ok(value)
    }

    /// ### [23.2.3.14 %TypedArray%.prototype.findLastIndex ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.findlastindex)
    fn find_last_index<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (index, _) = find_via_predicate(agent, this_value, arguments, Direction::Descending, gc)?;
        Ok(index_to_value(index))
    }

    /// ### [23.2.3.15 %TypedArray%.prototype.forEach ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.foreach)
    fn for_each<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let IterationSetup {
            o,
            len,
            callback,
            this_arg,
        } = iteration_setup(agent, this_value, arguments, gc.nogc()).unbind()?;
        // 6. Repeat, while k < len,
        for k in 0..len {
            // c. Perform ? Call(callback, thisArg, « kValue, 𝔽(k), O »).
            call_with_element(agent, callback, this_arg, o, k, gc.reborrow()).unbind()?;
        }
        // 7. Return undefined.
        Ok(Value::Undefined)
    }

    /// ### [23.2.3.16 %TypedArray%.prototype.includes ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.includes)
    fn includes<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let search_element = arguments.get(0).scope(agent, gc.nogc());
        let from_index = arguments.get(1);
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        // 4. If len = 0, return false.
        if len == 0 {
            return Ok(false.into());
        }
        let o = o.scope(agent, gc.nogc());
        // 5. Let n be ? ToIntegerOrInfinity(fromIndex).
        let n = to_integer_or_infinity(agent, from_index, gc.reborrow()).unbind()?;
        // 7. If n = +∞, return false.
        if n == f64::INFINITY {
            return Ok(false.into());
        }
        // 8-10. Let k be the clamped relative start.
        let k = clamp_relative_index(n, len as u64) as usize;
        let o = o.get(agent);
        let search_element = search_element.get(agent);
        // 11. Repeat, while k < len,
        //   a. Let elementK be ! Get(O, ! ToString(𝔽(k))).
        //   b. If SameValueZero(searchElement, elementK) is true, return true.
        let found = search_typed_array(
            agent,
            o,
            search_element,
            SearchMode::Includes,
            TypedSearchRange::Forward { from: k, to: len },
        )
        .is_some();
        // Indexes past a shrunk end read as undefined.
        let found = found || (search_element.is_undefined() && k < len && o.length(agent) < len);
        // 12. Return false.
        Ok(found.into())
    }

    /// ### [23.2.3.17 %TypedArray%.prototype.indexOf ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.indexof)
    fn index_of<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let search_element = arguments.get(0).scope(agent, gc.nogc());
        let from_index = arguments.get(1);
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        // 4. If len = 0, return -1𝔽.
        if len == 0 {
            return Ok(Value::from_f64(-1.0));
        }
        let o = o.scope(agent, gc.nogc());
        // 5. Let n be ? ToIntegerOrInfinity(fromIndex).
        let n = to_integer_or_infinity(agent, from_index, gc.reborrow()).unbind()?;
        // 7. If n = +∞, return -1𝔽.
        if n == f64::INFINITY {
            return Ok(Value::from_f64(-1.0));
        }
        // 8-10. Let k be the clamped relative start.
        let k = clamp_relative_index(n, len as u64) as usize;
        // 11. Repeat, while k < len,
        //   a. Let kPresent be ! HasProperty(O, ! ToString(𝔽(k))).
        //   b. If kPresent is true, then
        //     ii. If IsStrictlyEqual(searchElement, elementK) is true, return 𝔽(k).
        let index = search_typed_array(
            agent,
            o.get(agent),
            search_element.get(agent),
            SearchMode::IndexOf,
            TypedSearchRange::Forward { from: k, to: len },
        );
        // 12. Return -1𝔽.
        Ok(index_to_value(index))
    }

    /// ### [23.2.3.18 %TypedArray%.prototype.join ( separator )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.join)
    fn join<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let separator = arguments.get(0).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let o = o.scope(agent, gc.nogc());
        let separator = separator.get(agent);
        // 4. If separator is undefined, let sep be ",".
        // 5. Else, let sep be ? ToString(separator).
        let sep = if separator.is_undefined() {
            BUILTIN_STRING_MEMORY.comma
        } else {
            to_string(agent, separator, gc.reborrow()).unbind()?
        };
        let gc = gc.into_nogc();
        let o = o.get(agent).bind(gc);
        // 6. Let R be the empty String.
        let mut parts = JoinParts::new(agent, sep, len);
        // 7. Let k be 0.
        // 8. Repeat, while k < len,
        for k in 0..len {
            // a. If k > 0, set R to the string-concatenation of R and sep.
            // b. Let element be ! Get(O, ! ToString(𝔽(k))).
            // c. If element is undefined, let next be the empty String;
            //    otherwise, let next be ! ToString(element).
            match o.get_element(agent, k as i64, gc) {
                Some(element) => {
                    let next = to_string_primitive(agent, element, gc);
                    parts.push(agent, next, gc)?;
                }
                None => parts.push_empty(agent, gc)?,
            }
        }
        // 9. Return R.
        Ok(parts.finish(agent, gc).into())
    }

    /// ### [23.2.3.19 %TypedArray%.prototype.keys ( )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.keys)
    fn keys<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        let (o, _) = validate_typed_array(agent, this_value, gc)?;
        Ok(create_array_iterator(agent, o.into(), CollectionIteratorKind::Key, gc))
    }

    /// ### [23.2.3.20 %TypedArray%.prototype.lastIndexOf ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.lastindexof)
    fn last_index_of<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let search_element = arguments.get(0).scope(agent, gc.nogc());
        let from_index = arguments.get_if_present(1);
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        // 4. If len = 0, return -1𝔽.
        if len == 0 {
            return Ok(Value::from_f64(-1.0));
        }
        let o = o.scope(agent, gc.nogc());
        // 5. If fromIndex is present, let n be ? ToIntegerOrInfinity(fromIndex);
        //    else let n be len - 1.
        let n = match from_index {
            Some(from_index) => to_integer_or_infinity(agent, from_index, gc.reborrow()).unbind()?,
            None => len as f64 - 1.0,
        };
        // 6. If n = -∞, return -1𝔽.
        if n == f64::NEG_INFINITY {
            return Ok(Value::from_f64(-1.0));
        }
        // 7. If n ≥ 0, then
        //   a. Let k be min(n, len - 1).
        // 8. Else,
        //   a. Let k be len + n.
        let k = if n >= 0.0 {
            n.min(len as f64 - 1.0)
        } else {
            len as f64 + n
        };
        if k < 0.0 {
            return Ok(Value::from_f64(-1.0));
        }
        // 9. Repeat, while k ≥ 0,
        let index = search_typed_array(
            agent,
            o.get(agent),
            search_element.get(agent),
            SearchMode::IndexOf,
            TypedSearchRange::Backward { from: k as usize },
        );
        // 10. Return -1𝔽.
        Ok(index_to_value(index))
    }

    /// ### [23.2.3.21 get %TypedArray%.prototype.length](https://tc39.es/ecma262/#sec-get-%typedarray%.prototype.length)
    fn get_length<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let o = require_typed_array(agent, this_value, gc.into_nogc())?;
        // 5. If IsTypedArrayOutOfBounds(taRecord) is true, return +0𝔽.
        // 6. Let length be TypedArrayLength(taRecord).
        Ok(Value::from_f64(o.length(agent) as f64))
    }

    /// ### [23.2.3.22 %TypedArray%.prototype.map ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.map)
    fn map<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let IterationSetup {
            o,
            len,
            callback,
            this_arg,
        } = iteration_setup(agent, this_value, arguments, gc.nogc()).unbind()?;
        // 5. Let A be ? TypedArraySpeciesCreate(O, « 𝔽(len) »).
        let a = typed_array_species_create_with_length(agent, o.get(agent), len, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 6. Let k be 0.
        // 7. Repeat, while k < len,
        for k in 0..len {
            // c. Let mappedValue be ? Call(callback, thisArg, « kValue, 𝔽(k), O »).
            let (_, mapped_value) =
                call_with_element(agent, callback, this_arg, o, k, gc.reborrow()).unbind()?;
            // d. Perform ? Set(A, Pk, mappedValue, true).
            a.get(agent)
                .set_element(agent, k as i64, mapped_value, gc.reborrow())
                .unbind()?;
        }
        // 8. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.2.3.23 %TypedArray%.prototype.reduce ( callback \[ , initialValue \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.reduce)
    fn reduce<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        reduce_in_direction(agent, this_value, arguments, Direction::Ascending, gc)
    }

    /// ### [23.2.3.24 %TypedArray%.prototype.reduceRight ( callback \[ , initialValue \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.reduceright)
    fn reduce_right<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        reduce_in_direction(agent, this_value, arguments, Direction::Descending, gc)
    }

    /// ### [23.2.3.25 %TypedArray%.prototype.reverse ( )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.reverse)
    fn reverse<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc)?;
        // 4-6. Swap the elements at lower and upper until they meet.
        with_typed_array_viewable!(o.element_type(), reverse_elements::<T>(agent, o, len), T);
        // 7. Return O.
        Ok(o.into())
    }

    /// ### [23.2.3.26 %TypedArray%.prototype.set ( source \[ , offset \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.set)
    fn set<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let source = arguments.get(0).scope(agent, gc.nogc());
        let offset = arguments.get(1);
        // 1. Let target be the this value.
        // 2. Perform ? RequireInternalSlot(target, [[TypedArrayName]]).
        let target = require_typed_array(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 4. Let targetOffset be ? ToIntegerOrInfinity(offset).
        let target_offset = to_integer_or_infinity(agent, offset, gc.reborrow()).unbind()?;
        // 5. If targetOffset < 0, throw a RangeError exception.
        if target_offset < 0.0 {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Offset out of bounds",
                gc.into_nogc(),
            ));
        }
        let source = source.get(agent);
        // 6. If source is an Object that has a [[TypedArrayName]] internal slot, then
        if let Ok(source) = TypedArray::try_from(source) {
            // a. Perform ? SetTypedArrayFromTypedArray(target, targetOffset, source).
            set_typed_array_from_typed_array(agent, target.get(agent), target_offset, source, gc.into_nogc())?;
        } else {
            // 7. Else,
            //   a. Perform ? SetTypedArrayFromArrayLike(target, targetOffset, source).
            set_typed_array_from_array_like(agent, target, target_offset, source, gc)?;
        }
        // 8. Return undefined.
        Ok(Value::Undefined)
    }

    /// ### [23.2.3.27 %TypedArray%.prototype.slice ( start, end )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.slice)
    fn slice<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let start = arguments.get(0).scope(agent, gc.nogc());
        let end = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let srcArrayLength be TypedArrayLength(taRecord).
        let (o, src_array_length) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let o = o.scope(agent, gc.nogc());
        let src_array_length = src_array_length as u64;
        // 4-6. Let startIndex be the clamped relative start.
        let start_index =
            to_relative_index(agent, Some(start.get(agent)), src_array_length, 0, gc.reborrow()).unbind()?;
        // 7-9. Let endIndex be the clamped relative end.
        let end_index = to_relative_index(
            agent,
            Some(end.get(agent)),
            src_array_length,
            src_array_length,
            gc.reborrow(),
        )
        .unbind()?;
        // 10. Let countBytes be max(endIndex - startIndex, 0).
        let count = end_index.saturating_sub(start_index) as usize;
        // 11. Let A be ? TypedArraySpeciesCreate(O, « 𝔽(countBytes) »).
        let a = typed_array_species_create_with_length(agent, o.get(agent), count, gc.reborrow()).unbind()?;
        let gc = gc.into_nogc();
        let a = a.bind(gc);
        // 12. If countBytes > 0, then
        if count > 0 {
            let o = o.get(agent).bind(gc);
            // a. Set taRecord to MakeTypedArrayWithBufferWitnessRecord(O, seq-cst).
            // b. If IsTypedArrayOutOfBounds(taRecord) is true, throw a TypeError exception.
            if o.is_out_of_bounds(agent) {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    OUT_OF_BOUNDS,
                    gc,
                ));
            }
            // c. Set endIndex to min(endIndex, TypedArrayLength(taRecord)).
            let end_index = (end_index as usize).min(o.length(agent));
            // d. Set countBytes to max(endIndex - startIndex, 0).
            let count = end_index.saturating_sub(start_index as usize);
            // e-g. Copy the elements, converting if the element types differ.
            let target = BufferRange::of_typed_array(agent, a, 0);
            let source = BufferRange::of_typed_array(agent, o, start_index as usize);
            copy_elements(agent, target, source, count);
        }
        // 13. Return A.
        Ok(a.into())
    }

    /// ### [23.2.3.28 %TypedArray%.prototype.some ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.some)
    fn some<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let IterationSetup {
            o,
            len,
            callback,
            this_arg,
        } = iteration_setup(agent, this_value, arguments, gc.nogc()).unbind()?;
        for k in 0..len {
            // c. Let testResult be ToBoolean(? Call(callback, thisArg, « kValue, 𝔽(k), O »)).
            let (_, test_result) =
                call_with_element(agent, callback, this_arg, o, k, gc.reborrow()).unbind()?;
            // d. If testResult is true, return true.
            if to_boolean(agent, test_result) {
                return Ok(true.into());
            }
        }
        Ok(false.into())
    }

    /// ### [23.2.3.29 %TypedArray%.prototype.sort ( comparator )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.sort)
    fn sort<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. If comparator is not undefined and IsCallable(comparator) is
        //    false, throw a TypeError exception.
        let comparator = optional_comparator(agent, arguments.get(0), gc.nogc()).unbind()?;
        // 2. Let obj be the this value.
        // 3. Let taRecord be ? ValidateTypedArray(obj, seq-cst).
        // 4. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let o = o.scope(agent, gc.nogc());
        // 5-9. Sort the elements and write them back into obj.
        sort_elements(agent, o, o, len, comparator, gc)?;
        // 10. Return obj.
        Ok(o.get(agent).into())
    }

    /// ### [23.2.3.30 %TypedArray%.prototype.subarray ( start, end )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.subarray)
    ///
    /// The new view shares the receiver's buffer.
    fn subarray<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let start = arguments.get(0).scope(agent, gc.nogc());
        let end = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Perform ? RequireInternalSlot(O, [[TypedArrayName]]).
        let o = require_typed_array(agent, this_value, gc.nogc()).unbind()?;
        // 5. Let srcRecord be MakeTypedArrayWithBufferWitnessRecord(O, seq-cst).
        // 6. If IsTypedArrayOutOfBounds(srcRecord) is true, then
        //   a. Let srcLength be 0.
        // 7. Else,
        //   a. Let srcLength be TypedArrayLength(srcRecord).
        let src_length = o.length(agent) as u64;
        let o = o.scope(agent, gc.nogc());
        // 8-10. Let startIndex be the clamped relative start.
        let start_index = to_relative_index(agent, Some(start.get(agent)), src_length, 0, gc.reborrow()).unbind()?;
        let end = end.get(agent);
        // 14. If O.[[ArrayLength]] is AUTO and end is undefined, then
        //   a. Let argumentsList be « buffer, 𝔽(beginByteOffset) ».
        // 15. Else,
        //   a-c. Let endIndex be the clamped relative end.
        //   d. Let newLength be max(endIndex - startIndex, 0).
        //   e. Let argumentsList be « buffer, 𝔽(beginByteOffset), 𝔽(newLength) ».
        let new_length = if o.get(agent).array_length(agent).is_none() && end.is_undefined() {
            None
        } else {
            let end_index = to_relative_index(agent, Some(end), src_length, src_length, gc.reborrow()).unbind()?;
            Some(end_index.saturating_sub(start_index) as usize)
        };
        let o = o.get(agent);
        // 11. Let elementSize be TypedArrayElementSize(O).
        // 12. Let srcByteOffset be O.[[ByteOffset]].
        // 13. Let beginByteOffset be srcByteOffset + (startIndex × elementSize).
        let begin_byte_offset =
            checked_byte_end(o.raw_byte_offset(agent), start_index as usize, o.element_size());
        // 3. Let buffer be O.[[ViewedArrayBuffer]].
        let buffer = o.viewed_array_buffer(agent);
        // 16. Return ? TypedArraySpeciesCreate(O, argumentsList).
        typed_array_species_create_with_buffer(agent, o, buffer, begin_byte_offset, new_length, gc)
            .map(Value::from)
    }

    /// ### [23.2.3.33 %TypedArray%.prototype.toReversed ( )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.toreversed)
    fn to_reversed<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let length be TypedArrayLength(taRecord).
        let (o, length) = validate_typed_array(agent, this_value, gc)?;
        // 4. Let A be ? TypedArrayCreateSameType(O, length).
        let a = typed_array_create_same_type(agent, o, length, gc)?;
        // 5. Let k be 0.
        // 6. Repeat, while k < length,
        for k in 0..length {
            // a. Let from be ! ToString(𝔽(length - k - 1)).
            // c. Let fromValue be ! Get(O, from).
            // d. Perform ! Set(A, Pk, fromValue, true).
            let from_value = o.get_element_value(agent, (length - k - 1) as i64);
            store_copied_element(agent, a, k, from_value);
        }
        // 7. Return A.
        Ok(a.into())
    }

    /// ### [23.2.3.34 %TypedArray%.prototype.toSorted ( comparator )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.tosorted)
    fn to_sorted<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. If comparator is not undefined and IsCallable(comparator) is
        //    false, throw a TypeError exception.
        let comparator = optional_comparator(agent, arguments.get(0), gc.nogc()).unbind()?;
        // 2. Let O be the this value.
        // 3. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 4. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        // 5. Let A be ? TypedArrayCreateSameType(O, len).
        let a = typed_array_create_same_type(agent, o, len, gc.nogc()).unbind()?;
        let o = o.scope(agent, gc.nogc());
        let a = a.scope(agent, gc.nogc());
        // 6-10. Sort the elements of O into A.
        sort_elements(agent, o, a, len, comparator, gc)?;
        // 11. Return A.
        Ok(a.get(agent).into())
    }

    /// ### [%TypedArray%.prototype.toSpliced ( start, skipCount, ...items )](https://tc39.es/proposal-change-array-by-copy/#sec-%typedarray%.prototype.toSpliced)
    ///
    /// Inserted items are coerced to the receiver's content type before the
    /// copy is allocated.
    fn to_spliced<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let start = arguments.get(0).scope(agent, gc.nogc());
        let skip_count = arguments.get_if_present(1).map(|value| value.scope(agent, gc.nogc()));
        let items = arguments
            .slice_from(2)
            .iter()
            .map(|item| item.unbind())
            .collect::<Vec<_>>();
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let is_bigint = o.is_bigint();
        let o = o.scope(agent, gc.nogc());
        // 4. Let relativeStart be ? ToIntegerOrInfinity(start).
        // 5-7. Let actualStart be the clamped relative start.
        let actual_start =
            to_relative_index(agent, Some(start.get(agent)), len as u64, 0, gc.reborrow()).unbind()? as usize;
        // 8. Let insertCount be the number of elements in items.
        let insert_count = items.len();
        // 9. If start is not present, then
        //   a. Let actualSkipCount be 0.
        // 10. Else if skipCount is not present, then
        //   a. Let actualSkipCount be len - actualStart.
        // 11. Else,
        //   a. Let sc be ? ToIntegerOrInfinity(skipCount).
        //   b. Let actualSkipCount be the result of clamping sc between 0 and
        //      len - actualStart.
        let actual_skip_count = if arguments.is_empty() {
            0
        } else if let Some(skip_count) = skip_count {
            let sc = to_integer_or_infinity(agent, skip_count.get(agent), gc.reborrow()).unbind()?;
            sc.clamp(0.0, (len - actual_start) as f64) as usize
        } else {
            len - actual_start
        };
        // 12. Let convertedItems be a new empty List.
        // 13. For each element E of items, do
        //   a. If O.[[ContentType]] is BIGINT, let convertedValue be ? ToBigInt(E).
        //   b. Else, let convertedValue be ? ToNumber(E).
        //   c. Append convertedValue as the last element of convertedItems.
        let mut converted_items = Vec::with_capacity(insert_count);
        for item in items {
            converted_items.push(to_element_value(agent, item, is_bigint, gc.reborrow()).unbind()?);
        }
        let gc = gc.into_nogc();
        let o = o.get(agent).bind(gc);
        // Revalidate after the coercions above.
        if o.is_out_of_bounds(agent) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                OUT_OF_BOUNDS,
                gc,
            ));
        }
        // 14. Let newLen be len + insertCount - actualSkipCount.
        let new_len = len + insert_count - actual_skip_count;
        // 15. Let A be ? TypedArrayCreateSameType(O, « 𝔽(newLen) »).
        let a = typed_array_create_same_type(agent, o, new_len, gc)?;
        // 16. Let i be 0.
        // 17. Let r be actualStart + actualSkipCount.
        // 18. Repeat, while i < actualStart,
        for i in 0..actual_start {
            let from_value = o.get_element_value(agent, i as i64);
            store_copied_element(agent, a, i, from_value);
        }
        // 19. For each element E of convertedItems, do
        for (j, e) in converted_items.into_iter().enumerate() {
            a.set_element_value(agent, (actual_start + j) as i64, e);
        }
        // 20. Repeat, while i < newLen,
        for r in (actual_start + actual_skip_count)..len {
            let from_value = o.get_element_value(agent, r as i64);
            store_copied_element(agent, a, r - actual_skip_count + insert_count, from_value);
        }
        // 21. Return A.
        Ok(a.into())
    }

    /// ### [23.2.3.37 %TypedArray%.prototype.values ( )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.values)
    fn values<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        let (o, _) = validate_typed_array(agent, this_value, gc)?;
        Ok(create_array_iterator(agent, o.into(), CollectionIteratorKind::Value, gc))
    }

    /// ### [23.2.3.38 %TypedArray%.prototype.with ( index, value )](https://tc39.es/ecma262/#sec-%typedarray%.prototype.with)
    fn with<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let index = arguments.get(0).scope(agent, gc.nogc());
        let value = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be the this value.
        // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
        // 3. Let len be TypedArrayLength(taRecord).
        let (o, len) = validate_typed_array(agent, this_value, gc.nogc()).unbind()?;
        let is_bigint = o.is_bigint();
        let o = o.scope(agent, gc.nogc());
        // 4. Let relativeIndex be ? ToIntegerOrInfinity(index).
        let relative_index = to_integer_or_infinity(agent, index.get(agent), gc.reborrow()).unbind()?;
        // 5. If relativeIndex ≥ 0, let actualIndex be relativeIndex.
        // 6. Else, let actualIndex be len + relativeIndex.
        let actual_index = if relative_index >= 0.0 {
            relative_index
        } else {
            len as f64 + relative_index
        };
        // 7. If O.[[ContentType]] is BIGINT, let numericValue be ? ToBigInt(value).
        // 8. Else, let numericValue be ? ToNumber(value).
        let numeric_value = to_element_value(agent, value.get(agent), is_bigint, gc.reborrow()).unbind()?;
        let gc = gc.into_nogc();
        let o = o.get(agent).bind(gc);
        // 9. If IsValidIntegerIndex(O, 𝔽(actualIndex)) is false, throw a RangeError exception.
        let actual_index = (actual_index >= 0.0 && actual_index.is_finite())
            .then(|| o.is_valid_integer_index(agent, actual_index as i64))
            .flatten();
        let Some(actual_index) = actual_index else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Invalid typed array index",
                gc,
            ));
        };
        // 10. Let A be ? TypedArrayCreateSameType(O, len).
        let a = typed_array_create_same_type(agent, o, len, gc)?;
        // 11. Let k be 0.
        // 12. Repeat, while k < len,
        for k in 0..len {
            // b. If k = actualIndex, let fromValue be numericValue.
            // c. Else, let fromValue be ! Get(O, Pk).
            // d. Perform ! Set(A, Pk, fromValue, true).
            if k == actual_index {
                a.set_element_value(agent, k as i64, numeric_value);
            } else {
                let from_value = o.get_element_value(agent, k as i64);
                store_copied_element(agent, a, k, from_value);
            }
        }
        // 13. Return A.
        Ok(a.into())
    }

    /// ### [23.2.3.40 get %TypedArray%.prototype \[ %Symbol.toStringTag% \]](https://tc39.es/ecma262/#sec-get-%typedarray%.prototype-%symbol.tostringtag%)
    fn get_to_string_tag<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be the this value.
        // 2. If O is not an Object, return undefined.
        // 3. If O does not have a [[TypedArrayName]] internal slot, return undefined.
        let Ok(o) = TypedArray::try_from(this_value) else {
            return Ok(Value::Undefined);
        };
        // 4. Let name be O.[[TypedArrayName]].
        // 6. Return name.
        let name = o.element_type().name();
        Ok(String::from_str(agent, name, gc.into_nogc()).into())
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let object_prototype = intrinsics.object_prototype();
        let this = intrinsics.typed_array_prototype();
        let typed_array_constructor = intrinsics.typed_array();
        let to_string = intrinsics.array_prototype_to_string();
        let values = intrinsics.typed_array_prototype_values();
        OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
            .with_property_capacity(38)
            .with_prototype(object_prototype)
            .with_builtin_function_property::<TypedArrayPrototypeAt>()
            .with_builtin_function_getter_property::<TypedArrayPrototypeGetBuffer>()
            .with_builtin_function_getter_property::<TypedArrayPrototypeGetByteLength>()
            .with_builtin_function_getter_property::<TypedArrayPrototypeGetByteOffset>()
            .with_constructor_property(typed_array_constructor)
            .with_builtin_function_property::<TypedArrayPrototypeCopyWithin>()
            .with_builtin_function_property::<TypedArrayPrototypeEntries>()
            .with_builtin_function_property::<TypedArrayPrototypeEvery>()
            .with_builtin_function_property::<TypedArrayPrototypeFill>()
            .with_builtin_function_property::<TypedArrayPrototypeFilter>()
            .with_builtin_function_property::<TypedArrayPrototypeFind>()
            .with_builtin_function_property::<TypedArrayPrototypeFindIndex>()
            .with_builtin_function_property::<TypedArrayPrototypeFindLast>()
            .with_builtin_function_property::<TypedArrayPrototypeFindLastIndex>()
            .with_builtin_function_property::<TypedArrayPrototypeForEach>()
            .with_builtin_function_property::<TypedArrayPrototypeIncludes>()
            .with_builtin_function_property::<TypedArrayPrototypeIndexOf>()
            .with_builtin_function_property::<TypedArrayPrototypeJoin>()
            .with_builtin_function_property::<TypedArrayPrototypeKeys>()
            .with_builtin_function_property::<TypedArrayPrototypeLastIndexOf>()
            .with_builtin_function_getter_property::<TypedArrayPrototypeGetLength>()
            .with_builtin_function_property::<TypedArrayPrototypeMap>()
            .with_builtin_function_property::<TypedArrayPrototypeReduce>()
            .with_builtin_function_property::<TypedArrayPrototypeReduceRight>()
            .with_builtin_function_property::<TypedArrayPrototypeReverse>()
            .with_builtin_function_property::<TypedArrayPrototypeSet>()
            .with_builtin_function_property::<TypedArrayPrototypeSlice>()
            .with_builtin_function_property::<TypedArrayPrototypeSome>()
            .with_builtin_function_property::<TypedArrayPrototypeSort>()
            .with_builtin_function_property::<TypedArrayPrototypeSubarray>()
            .with_builtin_function_property::<TypedArrayPrototypeToReversed>()
            .with_builtin_function_property::<TypedArrayPrototypeToSorted>()
            .with_builtin_function_property::<TypedArrayPrototypeToSpliced>()
            .with_function_alias(BUILTIN_STRING_MEMORY.toString.into(), to_string)
            .with_intrinsic_function_property::<TypedArrayPrototypeValues>(values)
            .with_builtin_function_property::<TypedArrayPrototypeWith>()
            .with_function_alias(PropertyKey::Symbol(WellKnownSymbol::Iterator), values)
            .with_builtin_function_getter_property::<TypedArrayPrototypeGetToStringTag>()
            .build();
    }
}

/// The receiver, its length and the callback of a callback-taking method.
struct IterationSetup<'scope> {
    o: Scoped<'scope, TypedArray<'static>>,
    len: usize,
    callback: Scoped<'scope, Function<'static>>,
    this_arg: Scoped<'scope, Value<'static>>,
}

// SAFETY: Only holds scoped roots.
unsafe impl<'scope> Bindable for IterationSetup<'scope> {
    type Of<'a> = IterationSetup<'scope>;

    #[inline(always)]
    fn unbind(self) -> Self::Of<'static> {
        self
    }

    #[inline(always)]
    fn bind<'a>(self, _gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        self
    }
}

/// Steps 1 to 4 shared by the callback-taking methods: validate the receiver,
/// read its length and check that the callback is callable.
fn iteration_setup<'gc, 'scope>(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
    gc: NoGcScope<'gc, 'scope>,
) -> JsResult<'gc, IterationSetup<'scope>> {
    let callback = arguments.get(0);
    let this_arg = arguments.get(1).scope(agent, gc);
    // 1. Let O be the this value.
    // 2. Let taRecord be ? ValidateTypedArray(O, seq-cst).
    // 3. Let len be TypedArrayLength(taRecord).
    let (o, len) = validate_typed_array(agent, this_value, gc)?;
    // 4. If IsCallable(callback) is false, throw a TypeError exception.
    let callback = require_callable(agent, callback, CALLBACK_NOT_CALLABLE, gc)?;
    Ok(IterationSetup {
        o: o.scope(agent, gc),
        len,
        callback: callback.scope(agent, gc),
        this_arg,
    })
}

/// Read element `k` of `o` and call `callback` with « kValue, 𝔽(k), O ».
/// Returns the element together with the callback's result.
fn call_with_element<'gc>(
    agent: &mut Agent,
    callback: Scoped<Function<'static>>,
    this_arg: Scoped<Value<'static>>,
    o: Scoped<TypedArray<'static>>,
    k: usize,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, (Value<'gc>, Value<'gc>)> {
    // a. Let Pk be ! ToString(𝔽(k)).
    // b. Let kValue be ! Get(O, Pk).
    let k_value = element_or_undefined(agent, o.get(agent), k, gc.nogc()).unbind();
    let result = call_function(
        agent,
        callback.get(agent),
        this_arg.get(agent),
        &[k_value, Value::from_f64(k as f64), o.get(agent).into()],
        gc.reborrow(),
    )
    .unbind()?;
    let gc = gc.into_nogc();
    ensure_in_bounds_after_call(agent, o.get(agent), gc)?;
    Ok((k_value.bind(gc), result.bind(gc)))
}

/// A callback may have detached or shrunk the viewed buffer. Continuing
/// would read or write through a stale view, so that is a TypeError.
fn ensure_in_bounds_after_call<'gc>(agent: &mut Agent, o: TypedArray, gc: NoGcScope<'gc, '_>) -> JsResult<'gc, ()> {
    if o.is_out_of_bounds(agent) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            OUT_OF_BOUNDS,
            gc,
        ));
    }
    Ok(())
}

fn element_or_undefined<'gc>(agent: &mut Agent, o: TypedArray, k: usize, gc: NoGcScope<'gc, '_>) -> Value<'gc> {
    o.get_element(agent, k as i64, gc).unwrap_or(Value::Undefined)
}

fn index_to_value(index: Option<usize>) -> Value<'static> {
    Value::from_f64(index.map_or(-1.0, |index| index as f64))
}

/// ### [23.2.4.3 FindViaPredicate ( O, len, direction, predicate, thisArg )](https://tc39.es/ecma262/#sec-findviapredicate)
fn find_via_predicate<'gc>(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
    direction: Direction,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, (Option<usize>, Value<'gc>)> {
    let IterationSetup {
        o,
        len,
        callback: predicate,
        this_arg,
    } = iteration_setup(agent, this_value, arguments, gc.nogc()).unbind()?;
    // 1. If IsCallable(predicate) is false, throw a TypeError exception.
    // 2. If direction is ascending, let indices be a List of the integers
    //    in the interval from 0 (inclusive) to len (exclusive), in
    //    ascending order.
    // 3. Else, let indices be a List of the integers in the interval from 0
    //    (inclusive) to len (exclusive), in descending order.
    let mut ascending = 0..len;
    let mut descending = (0..len).rev();
    let indices: &mut dyn Iterator<Item = usize> = match direction {
        Direction::Ascending => &mut ascending,
        Direction::Descending => &mut descending,
    };
    // 4. For each integer k of indices, do
    for k in indices {
        // c. Let testResult be ? Call(predicate, thisArg, « kValue, 𝔽(k), O »).
        let (k_value, test_result) =
            call_with_element(agent, predicate, this_arg, o, k, gc.reborrow()).unbind()?;
        // d. If ToBoolean(testResult) is true, return the Record { [[Index]]: 𝔽(k), [[Value]]: kValue }.
        if to_boolean(agent, test_result) {
            return Ok((Some(k), k_value.bind(gc.into_nogc())));
        }
    }
    // 5. Return the Record { [[Index]]: -1𝔽, [[Value]]: undefined }.
    Ok((None, Value::Undefined))
}

/// Shared body of reduce and reduceRight.
fn reduce_in_direction<'gc>(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
    direction: Direction,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    let initial_value = arguments.get_if_present(1);
    let IterationSetup { o, len, callback, .. } = iteration_setup(agent, this_value, arguments, gc.nogc()).unbind()?;
    // 5. If len = 0 and initialValue is not present, throw a TypeError exception.
    if len == 0 && initial_value.is_none() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Reduce of empty array with no initial value",
            gc.into_nogc(),
        ));
    }
    let mut indices: Vec<usize> = (0..len).collect();
    if direction == Direction::Descending {
        indices.reverse();
    }
    let mut indices = indices.into_iter();
    // 7. If initialValue is present, then
    //   a. Set accumulator to initialValue.
    // 8. Else,
    //   b. Set accumulator to ! Get(O, Pk).
    let accumulator = match initial_value {
        Some(initial_value) => initial_value,
        None => {
            let first = indices.next().unwrap_or_default();
            element_or_undefined(agent, o.get(agent), first, gc.nogc())
        }
    };
    let mut accumulator = accumulator.scope(agent, gc.nogc());
    // 9. Repeat, while k < len,
    for k in indices {
        // b. Let kValue be ! Get(O, Pk).
        let k_value = element_or_undefined(agent, o.get(agent), k, gc.nogc()).unbind();
        // c. Set accumulator to ? Call(callback, undefined, « accumulator, kValue, 𝔽(k), O »).
        let result = call_function(
            agent,
            callback.get(agent),
            Value::Undefined,
            &[
                accumulator.get(agent),
                k_value,
                Value::from_f64(k as f64),
                o.get(agent).into(),
            ],
            gc.reborrow(),
        )
        .unbind()?;
        ensure_in_bounds_after_call(agent, o.get(agent), gc.nogc()).unbind()?;
        accumulator.replace(agent, result);
    }
    // 10. Return accumulator.
    Ok(accumulator.get(agent).bind(gc.into_nogc()))
}

/// ### [23.2.3.26.1 SetTypedArrayFromTypedArray ( target, targetOffset, source )](https://tc39.es/ecma262/#sec-settypedarrayfromtypedarray)
fn set_typed_array_from_typed_array<'gc>(
    agent: &mut Agent,
    target: TypedArray,
    target_offset: f64,
    source: TypedArray,
    gc: NoGcScope<'gc, '_>,
) -> JsResult<'gc, ()> {
    // 3. Let targetRecord be MakeTypedArrayWithBufferWitnessRecord(target, seq-cst).
    // 4. If IsTypedArrayOutOfBounds(targetRecord) is true, throw a TypeError exception.
    // 8. Let srcRecord be MakeTypedArrayWithBufferWitnessRecord(source, seq-cst).
    // 9. If IsTypedArrayOutOfBounds(srcRecord) is true, throw a TypeError exception.
    if target.is_out_of_bounds(agent) || source.is_out_of_bounds(agent) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            OUT_OF_BOUNDS,
            gc,
        ));
    }
    // 5. Let targetLength be TypedArrayLength(targetRecord).
    let target_length = target.length(agent);
    // 10. Let srcLength be TypedArrayLength(srcRecord).
    let src_length = source.length(agent);
    // 22. If targetOffset = +∞, throw a RangeError exception.
    // 23. If srcLength + targetOffset > targetLength, throw a RangeError exception.
    if target_offset == f64::INFINITY || src_length as f64 + target_offset > target_length as f64 {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Source is too large",
            gc,
        ));
    }
    // 24. If target.[[ContentType]] is not source.[[ContentType]], throw a TypeError exception.
    if target.is_bigint() != source.is_bigint() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot mix BigInt and Number typed arrays",
            gc,
        ));
    }
    // 25-29. Copy the elements; a copy within one buffer reads the source as
    //        it was before the first write.
    let target_range = BufferRange::of_typed_array(agent, target, target_offset as usize);
    let source_range = BufferRange::of_typed_array(agent, source, 0);
    copy_elements(agent, target_range, source_range, src_length);
    // 30. Return UNUSED.
    Ok(())
}

/// ### [23.2.3.26.2 SetTypedArrayFromArrayLike ( target, targetOffset, source )](https://tc39.es/ecma262/#sec-settypedarrayfromarraylike)
fn set_typed_array_from_array_like<'gc>(
    agent: &mut Agent,
    target: Scoped<TypedArray<'static>>,
    target_offset: f64,
    source: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ()> {
    // 1. Let targetRecord be MakeTypedArrayWithBufferWitnessRecord(target, seq-cst).
    // 2. If IsTypedArrayOutOfBounds(targetRecord) is true, throw a TypeError exception.
    if target.get(agent).is_out_of_bounds(agent) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            OUT_OF_BOUNDS,
            gc.into_nogc(),
        ));
    }
    // 3. Let targetLength be TypedArrayLength(targetRecord).
    let target_length = target.get(agent).length(agent);
    // 4. Let src be ? ToObject(source).
    let src = to_object(agent, source, gc.nogc()).unbind()?.scope(agent, gc.nogc());
    // 5. Let srcLength be ? LengthOfArrayLike(src).
    let src_length = length_of_array_like(agent, src.get(agent), gc.reborrow()).unbind()?;
    // 6. If targetOffset = +∞, throw a RangeError exception.
    // 7. If srcLength + targetOffset > targetLength, throw a RangeError exception.
    if target_offset == f64::INFINITY || src_length as f64 + target_offset > target_length as f64 {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Source is too large",
            gc.into_nogc(),
        ));
    }
    let target_offset = target_offset as usize;
    if !target.get(agent).is_bigint()
        && let Some(numbers) = packed_number_elements(agent, src.get(agent), src_length)
    {
        log::trace!("SetTypedArrayFromArrayLike: packed number fast path");
        let target = target.get(agent);
        for (k, n) in numbers.into_iter().enumerate() {
            target.set_element_value(agent, (target_offset + k) as i64, ElementValue::Number(n));
        }
        return Ok(());
    }
    // 8. Let k be 0.
    // 9. Repeat, while k < srcLength,
    for k in 0..src_length {
        // a. Let Pk be ! ToString(𝔽(k)).
        // b. Let value be ? Get(src, Pk).
        let value = get(agent, src.get(agent), PropertyKey::from(k), gc.reborrow()).unbind()?;
        // c. Let targetIndex be 𝔽(targetOffset + k).
        // d. Perform ? TypedArraySetElement(target, targetIndex, value).
        target
            .get(agent)
            .set_element(agent, (target_offset as u64 + k) as i64, value, gc.reborrow())
            .unbind()?;
    }
    // 10. Return UNUSED.
    Ok(())
}

/// Sort the first `len` elements of `source` and write them into `target`,
/// which has the same element type. Without a comparator the elements are
/// sorted as raw numbers.
fn sort_elements<'gc>(
    agent: &mut Agent,
    source: Scoped<TypedArray<'static>>,
    target: Scoped<TypedArray<'static>>,
    len: usize,
    comparator: Option<Scoped<Function<'static>>>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ()> {
    let Some(comparator) = comparator else {
        let source = source.get(agent);
        let target = target.get(agent);
        with_typed_array_viewable!(
            source.element_type(),
            {
                let values = read_sorted::<T>(agent, source, len);
                write_elements::<T>(agent, target, &values);
            },
            T
        );
        return Ok(());
    };
    // 6. Let SortCompare be a new Abstract Closure that calls the comparator.
    let mut values = Vec::with_capacity(len);
    for k in 0..len {
        values.push(element_or_undefined(agent, source.get(agent), k, gc.nogc()).unbind());
    }
    // 7. Let sortedList be ? SortIndexedProperties(obj, len, SortCompare, read-through-holes).
    insertion_sort_by(&mut values, |x, y| -> JsResult<'static, Ordering> {
        let ordering = call_comparator(agent, comparator.get(agent), *x, *y, gc.reborrow()).unbind()?;
        ensure_in_bounds_after_call(agent, source.get(agent), gc.nogc()).unbind()?;
        Ok(ordering)
    })?;
    let target = target.get(agent);
    // 8. Let j be 0.
    // 9. Repeat, while j < len,
    //   a. Perform ! Set(obj, ! ToString(𝔽(j)), sortedList[j], true).
    for (j, value) in values.into_iter().enumerate() {
        store_element(agent, target, j, value);
    }
    Ok(())
}

fn read_sorted<T: Viewable>(agent: &Agent, o: TypedArray, len: usize) -> Vec<T> {
    let len = len.min(o.length(agent));
    let buffer = o.viewed_array_buffer(agent);
    let mut values = (0..len)
        .filter_map(|k| buffer.get_value::<T>(agent, o.element_byte_index(agent, k)))
        .collect::<Vec<T>>();
    let Ok(()) = insertion_sort_by(&mut values, |a, b| Ok::<Ordering, core::convert::Infallible>(a.ecmascript_cmp(b)));
    values
}

fn write_elements<T: Viewable>(agent: &mut Agent, o: TypedArray, values: &[T]) {
    let len = values.len().min(o.length(agent));
    let buffer = o.viewed_array_buffer(agent);
    for (k, value) in values[..len].iter().enumerate() {
        let byte_index = o.element_byte_index(agent, k);
        buffer.set_value::<T>(agent, byte_index, *value);
    }
}

fn fill_elements<T: Viewable>(agent: &mut Agent, o: TypedArray, start: usize, end: usize, value: T) {
    let buffer = o.viewed_array_buffer(agent);
    let byte_offset = o.element_byte_index(agent, start);
    if let Some(elements) = buffer
        .as_data_block_mut(agent)
        .and_then(|block| block.view_mut::<T>(byte_offset, end - start))
    {
        elements.fill(value);
        return;
    }
    for k in start..end {
        let byte_index = o.element_byte_index(agent, k);
        buffer.set_value::<T>(agent, byte_index, value);
    }
}

fn reverse_elements<T: Viewable>(agent: &mut Agent, o: TypedArray, len: usize) {
    let buffer = o.viewed_array_buffer(agent);
    let byte_offset = o.element_byte_index(agent, 0);
    if let Some(elements) = buffer
        .as_data_block_mut(agent)
        .and_then(|block| block.view_mut::<T>(byte_offset, len))
    {
        elements.reverse();
        return;
    }
    let (mut lower, mut upper) = (0, len.saturating_sub(1));
    while lower < upper {
        let lower_index = o.element_byte_index(agent, lower);
        let upper_index = o.element_byte_index(agent, upper);
        if let (Some(lower_value), Some(upper_value)) = (
            buffer.get_value::<T>(agent, lower_index),
            buffer.get_value::<T>(agent, upper_index),
        ) {
            buffer.set_value::<T>(agent, lower_index, upper_value);
            buffer.set_value::<T>(agent, upper_index, lower_value);
        }
        lower += 1;
        upper -= 1;
    }
}

/// Store a value previously read from a typed array of the same content
/// type into `a`.
fn store_element(agent: &mut Agent, a: TypedArray, k: usize, value: Value) {
    let value = primitive_to_element_value(agent, value, a.is_bigint());
    store_copied_element(agent, a, k, value);
}

/// Store an element read from the source of a copying method. An element
/// that could not be read because the source shrank is stored as
/// ToNumber(undefined); BigInt views keep their zero.
fn store_copied_element(agent: &mut Agent, a: TypedArray, k: usize, value: Option<ElementValue>) {
    match value {
        Some(value) => a.set_element_value(agent, k as i64, value),
        None if !a.is_bigint() => a.set_element_value(agent, k as i64, ElementValue::Number(f64::NAN)),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::{get, invoke},
        builtins::{
            Array, create_native_function,
            indexed_collections::typed_array_objects::abstract_operations::create_typed_array_with_length,
        },
        execution::Options,
        types::{ElementType, OrdinaryObject},
    };

    fn typed_array_of(
        agent: &mut Agent,
        element_type: ElementType,
        values: &[f64],
        gc: NoGcScope,
    ) -> TypedArray<'static> {
        let o = create_typed_array_with_length(agent, element_type, values.len(), gc)
            .unwrap()
            .unbind();
        for (k, value) in values.iter().enumerate() {
            o.set_element_value(agent, k as i64, ElementValue::Number(*value));
        }
        o
    }

    fn numbers(agent: &Agent, o: TypedArray) -> Vec<f64> {
        (0..o.length(agent))
            .map(|k| match o.get_element_value(agent, k as i64) {
                Some(ElementValue::Number(n)) => n,
                other => panic!("unexpected element {other:?}"),
            })
            .collect()
    }

    fn call_method(
        agent: &mut Agent,
        receiver: impl Into<Value<'static>>,
        name: &str,
        arguments: &[Value<'static>],
        mut gc: GcScope,
    ) -> JsResult<'static, Value<'static>> {
        let key = String::from_str(agent, name, gc.nogc()).unbind();
        invoke(agent, receiver.into(), key.into(), arguments, gc.reborrow()).unbind()
    }

    #[test]
    fn stored_values_outside_the_content_type_become_nan() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, gc| {
            let a = typed_array_of(agent, ElementType::Float64, &[1.0, 2.0], gc.nogc());
            store_element(agent, a, 0, Value::from_f64(5.0));
            store_element(agent, a, 1, Value::Undefined);
            assert_eq!(a.get_element_value(agent, 0), Some(ElementValue::Number(5.0)));
            let Some(ElementValue::Number(n)) = a.get_element_value(agent, 1) else {
                panic!("Float64 element expected");
            };
            assert!(n.is_nan());
        });
    }

    #[test]
    fn copy_within_moves_overlapping_ranges() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Float64, &[1.0, 2.0, 3.0], gc.nogc());
            let result = call_method(
                agent,
                o,
                "copyWithin",
                &[Value::from_f64(0.0), Value::from_f64(1.0)],
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(result, Value::from(o));
            assert_eq!(numbers(agent, o), [2.0, 3.0, 3.0]);

            let o = typed_array_of(agent, ElementType::Int16, &[1.0, 2.0, 3.0, 4.0, 5.0], gc.nogc());
            call_method(
                agent,
                o,
                "copyWithin",
                &[Value::from_f64(2.0), Value::from_f64(0.0), Value::from_f64(-1.0)],
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(numbers(agent, o), [1.0, 2.0, 1.0, 2.0, 3.0]);
        });
    }

    #[test]
    fn set_from_typed_array_and_array_like() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let target = typed_array_of(agent, ElementType::Int8, &[1.0, 2.0, 3.0], gc.nogc());
            let source = typed_array_of(agent, ElementType::Float32, &[10.0, 20.0], gc.nogc());
            call_method(agent, target, "set", &[source.into(), Value::from_f64(1.0)], gc.reborrow()).unwrap();
            assert_eq!(numbers(agent, target), [1.0, 10.0, 20.0]);

            let array = Array::from_slice(agent, &[Value::from_f64(-1.0)], gc.nogc()).unbind();
            call_method(agent, target, "set", &[array.into()], gc.reborrow()).unwrap();
            assert_eq!(numbers(agent, target), [-1.0, 10.0, 20.0]);

            let error = call_method(agent, target, "set", &[source.into(), Value::from_f64(2.0)], gc.reborrow())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
            let error = call_method(agent, target, "set", &[array.into(), Value::from_f64(-1.0)], gc.reborrow())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        });
    }

    #[test]
    fn set_within_one_buffer_reads_source_first() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Uint8, &[1.0, 2.0, 3.0, 4.0], gc.nogc());
            let head = call_method(
                agent,
                o,
                "subarray",
                &[Value::from_f64(0.0), Value::from_f64(3.0)],
                gc.reborrow(),
            )
            .unwrap();
            call_method(agent, o, "set", &[head, Value::from_f64(1.0)], gc.reborrow()).unwrap();
            assert_eq!(numbers(agent, o), [1.0, 1.0, 2.0, 3.0]);
        });
    }

    #[test]
    fn fill_throws_when_value_of_detaches() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Uint8, &[0.0; 4], gc.nogc());
            let buffer = o.viewed_array_buffer(agent);
            let value_of = create_native_function(
                agent,
                move |agent, _, _, gc| {
                    buffer.detach(agent, gc.into_nogc())?;
                    Ok(Value::from_f64(7.0))
                },
                "valueOf",
                0,
                gc.nogc(),
            )
            .unbind();
            let value = OrdinaryObject::create(agent, None, gc.nogc()).unbind();
            value.set_data_property(agent, BUILTIN_STRING_MEMORY.valueOf.into(), value_of.into());
            let error = call_method(agent, o, "fill", &[value.into()], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn fill_clamps_relative_bounds() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Int32, &[0.0; 5], gc.nogc());
            call_method(
                agent,
                o,
                "fill",
                &[Value::from_f64(9.0), Value::from_f64(1.0), Value::from_f64(-1.0)],
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(numbers(agent, o), [0.0, 9.0, 9.0, 9.0, 0.0]);
        });
    }

    #[test]
    fn default_sort_orders_nan_last_and_negative_zero_first() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Float64, &[3.0, f64::NAN, 0.0, -0.0, -1.0], gc.nogc());
            call_method(agent, o, "sort", &[], gc.reborrow()).unwrap();
            let sorted = numbers(agent, o);
            assert_eq!(sorted[0], -1.0);
            assert!(sorted[1] == 0.0 && sorted[1].is_sign_negative());
            assert!(sorted[2] == 0.0 && sorted[2].is_sign_positive());
            assert_eq!(sorted[3], 3.0);
            assert!(sorted[4].is_nan());
        });
    }

    #[test]
    fn sort_with_comparator_and_to_sorted() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let descending = create_native_function(
                agent,
                |_, _, arguments, _| {
                    let x = arguments.get(0).as_number().unwrap_or(0.0);
                    let y = arguments.get(1).as_number().unwrap_or(0.0);
                    Ok(Value::from_f64(y - x))
                },
                "descending",
                2,
                gc.nogc(),
            )
            .unbind();
            let o = typed_array_of(agent, ElementType::Uint16, &[2.0, 10.0, 1.0], gc.nogc());
            let copy = call_method(agent, o, "toSorted", &[descending.into()], gc.reborrow()).unwrap();
            let copy = TypedArray::try_from(copy).unwrap();
            assert_eq!(numbers(agent, copy), [10.0, 2.0, 1.0]);
            assert_eq!(numbers(agent, o), [2.0, 10.0, 1.0]);
            assert_eq!(copy.element_type(), ElementType::Uint16);

            let error = call_method(agent, o, "sort", &[Value::from_f64(1.0)], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn searches_use_typed_equality() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Float32, &[1.0, f64::NAN, 2.5, 1.0], gc.nogc());
            let nan = Value::from_f64(f64::NAN);
            let one = Value::from_f64(1.0);
            assert_eq!(call_method(agent, o, "includes", &[nan], gc.reborrow()).unwrap(), Value::from(true));
            assert_eq!(call_method(agent, o, "indexOf", &[nan], gc.reborrow()).unwrap(), Value::from_f64(-1.0));
            assert_eq!(call_method(agent, o, "indexOf", &[one], gc.reborrow()).unwrap(), Value::from_f64(0.0));
            assert_eq!(call_method(agent, o, "lastIndexOf", &[one], gc.reborrow()).unwrap(), Value::from_f64(3.0));
            assert_eq!(
                call_method(agent, o, "lastIndexOf", &[one, Value::from_f64(-2.0)], gc.reborrow()).unwrap(),
                Value::from_f64(0.0)
            );
            assert_eq!(
                call_method(agent, o, "includes", &[Value::Undefined], gc.reborrow()).unwrap(),
                Value::from(false)
            );
        });
    }

    #[test]
    fn join_and_to_string() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Float64, &[1.0, 2.5, -0.0], gc.nogc());
            let joined = call_method(agent, o, "join", &[], gc.reborrow()).unwrap();
            let joined = String::try_from(joined).unwrap();
            assert_eq!(joined.as_str(agent), "1,2.5,0");
            let dash = String::from_str(agent, "-", gc.nogc()).unbind();
            let joined = call_method(agent, o, "join", &[dash.into()], gc.reborrow()).unwrap();
            assert_eq!(String::try_from(joined).unwrap().as_str(agent), "1-2.5-0");
            let to_string = call_method(agent, o, "toString", &[], gc.reborrow()).unwrap();
            assert_eq!(String::try_from(to_string).unwrap().as_str(agent), "1,2.5,0");
        });
    }

    #[test]
    fn subarray_shares_and_slice_copies() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Int32, &[1.0, 2.0, 3.0, 4.0], gc.nogc());
            let sub = call_method(agent, o, "subarray", &[Value::from_f64(1.0), Value::from_f64(3.0)], gc.reborrow())
                .unwrap();
            let sub = TypedArray::try_from(sub).unwrap();
            let slice = call_method(agent, o, "slice", &[Value::from_f64(1.0), Value::from_f64(3.0)], gc.reborrow())
                .unwrap();
            let slice = TypedArray::try_from(slice).unwrap();
            assert_eq!(sub.byte_offset(agent), 4);
            o.set_element_value(agent, 1, ElementValue::Number(20.0));
            assert_eq!(numbers(agent, sub), [20.0, 3.0]);
            assert_eq!(numbers(agent, slice), [2.0, 3.0]);
        });
    }

    #[test]
    fn callbacks_receive_element_index_and_receiver() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Uint8, &[1.0, 2.0, 3.0], gc.nogc());
            let index_plus_value = create_native_function(
                agent,
                |_, _, arguments, _| {
                    let value = arguments.get(0).as_number().unwrap_or(0.0);
                    let index = arguments.get(1).as_number().unwrap_or(0.0);
                    assert!(TypedArray::try_from(arguments.get(2)).is_ok());
                    Ok(Value::from_f64(value + index))
                },
                "indexPlusValue",
                3,
                gc.nogc(),
            )
            .unbind();
            let mapped = call_method(agent, o, "map", &[index_plus_value.into()], gc.reborrow()).unwrap();
            let mapped = TypedArray::try_from(mapped).unwrap();
            assert_eq!(numbers(agent, mapped), [1.0, 3.0, 5.0]);

            let is_odd = create_native_function(
                agent,
                |_, _, arguments, _| Ok((arguments.get(0).as_number().unwrap_or(0.0) % 2.0 == 1.0).into()),
                "isOdd",
                1,
                gc.nogc(),
            )
            .unbind();
            let filtered = call_method(agent, o, "filter", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(numbers(agent, TypedArray::try_from(filtered).unwrap()), [1.0, 3.0]);
            let found = call_method(agent, o, "findLastIndex", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(found, Value::from_f64(2.0));
            let found = call_method(agent, o, "find", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(found, Value::from_f64(1.0));
            let every = call_method(agent, o, "every", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(every, Value::from(false));

            let error = call_method(agent, o, "forEach", &[Value::Undefined], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn reduce_requires_initial_value_for_empty_views() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let sum = create_native_function(
                agent,
                |_, _, arguments, _| {
                    let accumulator = arguments.get(0).as_number().unwrap_or(0.0);
                    let value = arguments.get(1).as_number().unwrap_or(0.0);
                    Ok(Value::from_f64(accumulator * 10.0 + value))
                },
                "sum",
                2,
                gc.nogc(),
            )
            .unbind();
            let o = typed_array_of(agent, ElementType::Int8, &[1.0, 2.0, 3.0], gc.nogc());
            let reduced = call_method(agent, o, "reduce", &[sum.into()], gc.reborrow()).unwrap();
            assert_eq!(reduced, Value::from_f64(123.0));
            let reduced = call_method(agent, o, "reduceRight", &[sum.into()], gc.reborrow()).unwrap();
            assert_eq!(reduced, Value::from_f64(321.0));

            let empty = typed_array_of(agent, ElementType::Int8, &[], gc.nogc());
            let error = call_method(agent, empty, "reduce", &[sum.into()], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
            let reduced =
                call_method(agent, empty, "reduce", &[sum.into(), Value::from_f64(4.0)], gc.reborrow()).unwrap();
            assert_eq!(reduced, Value::from_f64(4.0));
        });
    }

    #[test]
    fn copying_methods_leave_the_receiver_alone() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Uint8, &[1.0, 2.0, 3.0, 4.0], gc.nogc());
            let reversed = call_method(agent, o, "toReversed", &[], gc.reborrow()).unwrap();
            assert_eq!(numbers(agent, TypedArray::try_from(reversed).unwrap()), [4.0, 3.0, 2.0, 1.0]);
            let with = call_method(agent, o, "with", &[Value::from_f64(-1.0), Value::from_f64(9.0)], gc.reborrow())
                .unwrap();
            assert_eq!(numbers(agent, TypedArray::try_from(with).unwrap()), [1.0, 2.0, 3.0, 9.0]);
            let error = call_method(agent, o, "with", &[Value::from_f64(4.0), Value::from_f64(9.0)], gc.reborrow())
                .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
            let spliced = call_method(
                agent,
                o,
                "toSpliced",
                &[Value::from_f64(1.0), Value::from_f64(2.0), Value::from_f64(7.0)],
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(numbers(agent, TypedArray::try_from(spliced).unwrap()), [1.0, 7.0, 4.0]);
            assert_eq!(numbers(agent, o), [1.0, 2.0, 3.0, 4.0]);

            call_method(agent, o, "reverse", &[], gc.reborrow()).unwrap();
            assert_eq!(numbers(agent, o), [4.0, 3.0, 2.0, 1.0]);
        });
    }

    #[test]
    fn accessors_and_to_string_tag() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let o = typed_array_of(agent, ElementType::Float32, &[0.0; 3], gc.nogc());
            let byte_length = String::from_str(agent, "byteLength", gc.nogc()).unbind();
            let value = get(agent, o.into(), byte_length.into(), gc.reborrow()).unwrap();
            assert_eq!(value, Value::from_f64(12.0));
            let tag = get(agent, o.into(), WellKnownSymbol::ToStringTag.into(), gc.reborrow()).unwrap();
            assert_eq!(String::try_from(tag).unwrap().as_str(agent), "Float32Array");
            let tag = TypedArrayPrototype::get_to_string_tag(
                agent,
                Value::from_f64(1.0),
                ArgumentsList::from_slice(&[]),
                gc.reborrow(),
            )
            .unwrap();
            assert!(tag.is_undefined());
            let error = TypedArrayPrototype::get_length(
                agent,
                Value::Undefined,
                ArgumentsList::from_slice(&[]),
                gc.reborrow(),
            )
            .unbind()
            .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }
}
