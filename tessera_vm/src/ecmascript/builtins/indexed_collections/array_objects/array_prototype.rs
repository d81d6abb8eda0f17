// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.1.3 Properties of the Array Prototype Object](https://tc39.es/ecma262/#sec-properties-of-the-array-prototype-object)
//!
//! Every method here is generic over array-like receivers and follows the
//! property protocol. Arrays that are fast path eligible are read straight
//! out of their packed storage, one element at a time, so eligibility is
//! re-checked after every call into user code. Methods that rewrite a whole
//! range (push, pop, shift, unshift, reverse, fill, copyWithin, splice,
//! slice and sort) take a bulk path instead once every coercion is done and
//! the receiver still has the length it was read with.

use core::{cmp::Ordering, convert::Infallible};

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_objects::{
                call_function, create_data_property_or_throw, delete_property_or_throw, get,
                has_property, length_of_array_like, set,
            },
            testing_and_comparison::{is_array, is_callable, require_callable},
            type_conversion::{
                to_boolean, to_integer_or_infinity, to_object, to_relative_index, to_string,
                to_string_primitive,
            },
        },
        builders::OrdinaryObjectBuilder,
        builtins::{
            ArgumentsList, Array, Behaviour, Builtin, Function,
            array::abstract_operations::array_species_create,
            fundamental_objects::ObjectPrototype,
            indexed_collections::{
                array_objects::array_iterator_objects::{
                    CollectionIteratorKind, array_iterator_prototype::create_array_iterator,
                },
                join::{JoinParts, with_join_stack},
                search::{IndexOfDispatch, SearchMode},
                sorting::{call_comparator, insertion_sort_by, optional_comparator},
            },
        },
        execution::{Agent, ExceptionType, JsResult},
        types::{BUILTIN_STRING_MEMORY, Object, PropertyKey, Value, WellKnownSymbol},
    },
    engine::{
        Scopable, Scoped,
        context::{Bindable, GcScope, NoGcScope},
    },
};

pub(crate) struct ArrayPrototype;

macro_rules! array_prototype_methods {
    ($($name: ident: $js_name: literal, $length: literal => $method: ident;)*) => {
        $(
            struct $name;
            impl Builtin for $name {
                const NAME: &'static str = $js_name;
                const LENGTH: u8 = $length;
                const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::$method);
            }
        )*
    };
}

array_prototype_methods! {
    ArrayPrototypeAt: "at", 1 => at;
    ArrayPrototypeConcat: "concat", 1 => concat;
    ArrayPrototypeCopyWithin: "copyWithin", 2 => copy_within;
    ArrayPrototypeEntries: "entries", 0 => entries;
    ArrayPrototypeEvery: "every", 1 => every;
    ArrayPrototypeFill: "fill", 1 => fill;
    ArrayPrototypeFilter: "filter", 1 => filter;
    ArrayPrototypeFind: "find", 1 => find;
    ArrayPrototypeFindIndex: "findIndex", 1 => find_index;
    ArrayPrototypeFindLast: "findLast", 1 => find_last;
    ArrayPrototypeFindLastIndex: "findLastIndex", 1 => find_last_index;
    ArrayPrototypeFlat: "flat", 0 => flat;
    ArrayPrototypeFlatMap: "flatMap", 1 => flat_map;
    ArrayPrototypeForEach: "forEach", 1 => for_each;
    ArrayPrototypeIncludes: "includes", 1 => includes;
    ArrayPrototypeIndexOf: "indexOf", 1 => index_of;
    ArrayPrototypeJoin: "join", 1 => join;
    ArrayPrototypeKeys: "keys", 0 => keys;
    ArrayPrototypeLastIndexOf: "lastIndexOf", 1 => last_index_of;
    ArrayPrototypeMap: "map", 1 => map;
    ArrayPrototypePop: "pop", 0 => pop;
    ArrayPrototypePush: "push", 1 => push;
    ArrayPrototypeReduce: "reduce", 1 => reduce;
    ArrayPrototypeReduceRight: "reduceRight", 1 => reduce_right;
    ArrayPrototypeReverse: "reverse", 0 => reverse;
    ArrayPrototypeShift: "shift", 0 => shift;
    ArrayPrototypeSlice: "slice", 2 => slice;
    ArrayPrototypeSome: "some", 1 => some;
    ArrayPrototypeSort: "sort", 1 => sort;
    ArrayPrototypeSplice: "splice", 2 => splice;
    ArrayPrototypeToReversed: "toReversed", 0 => to_reversed;
    ArrayPrototypeToSorted: "toSorted", 1 => to_sorted;
    ArrayPrototypeToSpliced: "toSpliced", 2 => to_spliced;
    ArrayPrototypeUnshift: "unshift", 1 => unshift;
    ArrayPrototypeWith: "with", 2 => with;
}

pub(crate) struct ArrayPrototypeToString;
impl Builtin for ArrayPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::to_string);
}

pub(crate) struct ArrayPrototypeValues;
impl Builtin for ArrayPrototypeValues {
    const NAME: &'static str = "values";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::values);
}

const CALLBACK_NOT_CALLABLE: &str = "Callback is not a function";
const LENGTH_OVERFLOW: &str = "Array length exceeds the maximum safe integer";

/// 2<sup>53</sup> - 1, the largest length of an array-like object.
const MAX_SAFE_LENGTH: u64 = PropertyKey::MAX_INTEGER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ascending,
    Descending,
}

impl ArrayPrototype {
    /// ### [23.1.3.1 Array.prototype.at ( index )](https://tc39.es/ecma262/#sec-array.prototype.at)
    fn at<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let index = arguments.get(0).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. Let relativeIndex be ? ToIntegerOrInfinity(index).
        let relative_index = to_integer_or_infinity(agent, index.get(agent), gc.reborrow()).unbind()?;
        // 4. If relativeIndex ≥ 0, then
        //   a. Let k be relativeIndex.
        // 5. Else,
        //   a. Let k be len + relativeIndex.
        let k = if relative_index >= 0.0 {
            relative_index
        } else {
            len as f64 + relative_index
        };
        // 6. If k < 0 or k ≥ len, return undefined.
        if k < 0.0 || k >= len as f64 {
            return Ok(Value::Undefined);
        }
        // 7. Return ? Get(O, ! ToString(𝔽(k))).
        get_element(agent, o.get(agent), k as u64, gc)
    }

    /// ### [23.1.3.2 Array.prototype.concat ( ...items )](https://tc39.es/ecma262/#sec-array.prototype.concat)
    ///
    /// This method returns an array containing the array elements of the
    /// object followed by the array elements of each argument.
    ///
    /// > Note: The explicit setting of the "length" property in step 6 is
    /// > intended to ensure the length is correct when the final non-empty
    /// > element of items has trailing holes or when A is not a built-in
    /// > Array.
    fn concat<'gc>(
        agent: &mut Agent,
        this_value: Value,
        items: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let items = items.iter().map(|item| item.unbind()).collect::<Vec<_>>();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc()).unbind()?;
        let scoped_o = o.scope(agent, gc.nogc());
        // 2. Let A be ? ArraySpeciesCreate(O, 0).
        let a = array_species_create(agent, o, 0, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 3. Let n be 0.
        let mut n: u64 = 0;
        // 4. Prepend O to items.
        let elements = core::iter::once(Value::from(scoped_o.get(agent))).chain(items);
        // 5. For each element E of items, do
        for e in elements {
            // a. Let spreadable be ? IsConcatSpreadable(E).
            let spreadable = is_concat_spreadable(agent, e, gc.reborrow()).unbind()?;
            // b. If spreadable is true, then
            if let Some(e) = spreadable {
                // i. Let len be ? LengthOfArrayLike(E).
                let len = length_of_array_like(agent, e, gc.reborrow()).unbind()?;
                // ii. If n + len > 2**53 - 1, throw a TypeError exception.
                if n + len > MAX_SAFE_LENGTH {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        LENGTH_OVERFLOW,
                        gc.into_nogc(),
                    ));
                }
                if let Some(copied) = concat_packed(agent, a.get(agent), e, n, len) {
                    n += copied;
                    continue;
                }
                let e = e.scope(agent, gc.nogc());
                // iii. Let k be 0.
                // iv. Repeat, while k < len,
                for k in 0..len {
                    // 1. Let Pk be ! ToString(𝔽(k)).
                    // 2. Let exists be ? HasProperty(E, Pk).
                    // 3. If exists is true, then
                    //   a. Let subElement be ? Get(E, Pk).
                    let sub_element =
                        get_present_element(agent, e.get(agent), k, gc.reborrow()).unbind()?;
                    if let Some(sub_element) = sub_element {
                        // b. Perform ? CreateDataPropertyOrThrow(A, ! ToString(𝔽(n)), subElement).
                        create_data_property_or_throw(
                            agent,
                            a.get(agent),
                            PropertyKey::Integer(n + k),
                            sub_element,
                            gc.reborrow(),
                        )
                        .unbind()?;
                    }
                }
                // 4. Set n to n + 1.
                n += len;
            } else {
                // c. Else,
                //   i. NOTE: E is added as a single item rather than spread.
                //   ii. If n ≥ 2**53 - 1, throw a TypeError exception.
                if n >= MAX_SAFE_LENGTH {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        LENGTH_OVERFLOW,
                        gc.into_nogc(),
                    ));
                }
                // iii. Perform ? CreateDataPropertyOrThrow(A, ! ToString(𝔽(n)), E).
                create_data_property_or_throw(
                    agent,
                    a.get(agent),
                    PropertyKey::Integer(n),
                    e,
                    gc.reborrow(),
                )
                .unbind()?;
                // iv. Set n to n + 1.
                n += 1;
            }
        }
        // 6. Perform ? Set(A, "length", 𝔽(n), true).
        set_length(agent, a.get(agent), n, gc.reborrow()).unbind()?;
        // 7. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.4 Array.prototype.copyWithin ( target, start \[ , end \] )](https://tc39.es/ecma262/#sec-array.prototype.copywithin)
    ///
    /// > Note: If target is negative, it is treated as length + target where
    /// > length is the length of the array. If start is negative, it is
    /// > treated as length + start. If end is negative, it is treated as
    /// > length + end.
    fn copy_within<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let target = arguments.get(0).scope(agent, gc.nogc());
        let start = arguments.get(1).scope(agent, gc.nogc());
        let end = arguments.get(2).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3-6. Let to be the clamped relative target.
        let to = to_relative_index(agent, Some(target.get(agent)), len, 0, gc.reborrow()).unbind()?;
        // 7-10. Let from be the clamped relative start.
        let from = to_relative_index(agent, Some(start.get(agent)), len, 0, gc.reborrow()).unbind()?;
        // 11-14. Let final be the clamped relative end.
        let final_end = to_relative_index(agent, Some(end.get(agent)), len, len, gc.reborrow()).unbind()?;
        // 15. Let count be min(final - from, len - to).
        let count = final_end.saturating_sub(from).min(len - to);
        if count == 0 {
            return Ok(o.get(agent).bind(gc.into_nogc()).into());
        }
        if let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.copyWithin")
            && let Some(storage) = array.as_mut_vec(agent)
        {
            let (from, to, count) = (from as usize, to as usize, count as usize);
            log::trace!("Array.prototype.copyWithin: moving {count} slots in packed storage");
            storage.copy_within(from..from + count, to);
            array.reclassify(agent);
            return Ok(array.bind(gc.into_nogc()).into());
        }
        // 16. If from < to and to < from + count, then
        //   a. Let direction be -1.
        //   b. Set from to from + count - 1.
        //   c. Set to to to + count - 1.
        // 17. Else,
        //   a. Let direction be 1.
        let pairs: Box<dyn Iterator<Item = (u64, u64)>> = if from < to && to < from + count {
            Box::new((0..count).rev().map(|i| (from + i, to + i)))
        } else {
            Box::new((0..count).map(|i| (from + i, to + i)))
        };
        // 18. Repeat, while count > 0,
        for (from, to) in pairs {
            // a. Let fromKey be ! ToString(𝔽(from)).
            // b. Let toKey be ! ToString(𝔽(to)).
            // c. Let fromPresent be ? HasProperty(O, fromKey).
            // d. If fromPresent is true, then
            //   i. Let fromValue be ? Get(O, fromKey).
            //   ii. Perform ? Set(O, toKey, fromValue, true).
            // e. Else,
            //   i. Assert: fromPresent is false.
            //   ii. Perform ? DeletePropertyOrThrow(O, toKey).
            move_element(agent, o.get(agent), from, to, gc.reborrow()).unbind()?;
        }
        // 19. Return O.
        Ok(o.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.5 Array.prototype.entries ( )](https://tc39.es/ecma262/#sec-array.prototype.entries)
    fn entries<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc)?;
        // 2. Return CreateArrayIterator(O, key+value).
        Ok(create_array_iterator(agent, o, CollectionIteratorKind::KeyAndValue, gc))
    }

    /// ### [23.1.3.6 Array.prototype.every ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.every)
    fn every<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let setup = callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
        // 4. Let k be 0.
        // 5. Repeat, while k < len,
        for k in 0..setup.len {
            // b. Let kPresent be ? HasProperty(O, Pk).
            // c. If kPresent is true, then
            //   i. Let kValue be ? Get(O, Pk).
            let Some(k_value) = get_present_element(agent, setup.o.get(agent), k, gc.reborrow()).unbind()? else {
                continue;
            };
            // ii. Let testResult be ToBoolean(? Call(callback, thisArg, « kValue, 𝔽(k), O »)).
            let test_result = setup.call(agent, k_value, k, gc.reborrow()).unbind()?;
            // iii. If testResult is false, return false.
            if !to_boolean(agent, test_result) {
                return Ok(false.into());
            }
        }
        // 6. Return true.
        Ok(true.into())
    }

    /// ### [23.1.3.7 Array.prototype.fill ( value \[ , start \[ , end \] \] )](https://tc39.es/ecma262/#sec-array.prototype.fill)
    fn fill<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let value = arguments.get(0).scope(agent, gc.nogc());
        let start = arguments.get(1).scope(agent, gc.nogc());
        let end = arguments.get(2).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3-6. Let k be the clamped relative start.
        let k = to_relative_index(agent, Some(start.get(agent)), len, 0, gc.reborrow()).unbind()?;
        // 7-10. Let final be the clamped relative end.
        let final_end = to_relative_index(agent, Some(end.get(agent)), len, len, gc.reborrow()).unbind()?;
        let value = value.get(agent);
        if k < final_end
            && let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.fill")
            && let Some(storage) = array.as_mut_vec(agent)
        {
            storage[k as usize..final_end as usize].fill(Some(value));
            array.reclassify(agent);
            return Ok(array.bind(gc.into_nogc()).into());
        }
        // 11. Repeat, while k < final,
        for k in k..final_end {
            // a. Let Pk be ! ToString(𝔽(k)).
            // b. Perform ? Set(O, Pk, value, true).
            set(agent, o.get(agent), PropertyKey::Integer(k), value, true, gc.reborrow()).unbind()?;
        }
        // 12. Return O.
        Ok(o.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.8 Array.prototype.filter ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.filter)
    fn filter<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let setup = callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
        // 4. Let A be ? ArraySpeciesCreate(O, 0).
        let a = array_species_create(agent, setup.o.get(agent), 0, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 5. Let k be 0.
        // 6. Let to be 0.
        let mut to = 0;
        // 7. Repeat, while k < len,
        for k in 0..setup.len {
            // c. If kPresent is true, then
            //   i. Let kValue be ? Get(O, Pk).
            let Some(k_value) = get_present_element(agent, setup.o.get(agent), k, gc.reborrow()).unbind()? else {
                continue;
            };
            // ii. Let selected be ToBoolean(? Call(callback, thisArg, « kValue, 𝔽(k), O »)).
            let selected = setup.call(agent, k_value, k, gc.reborrow()).unbind()?;
            // iii. If selected is true, then
            if to_boolean(agent, selected) {
                // 1. Perform ? CreateDataPropertyOrThrow(A, ! ToString(𝔽(to)), kValue).
                create_data_property_or_throw(
                    agent,
                    a.get(agent),
                    PropertyKey::Integer(to),
                    k_value,
                    gc.reborrow(),
                )
                .unbind()?;
                // 2. Set to to to + 1.
                to += 1;
            }
        }
        // 8. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.9 Array.prototype.find ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.find)
    fn find<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (_, value) = find_via_predicate(agent, this_value, arguments, Direction::Ascending, gc)?;
        Ok(value)
    }

    /// ### [23.1.3.10 Array.prototype.findIndex ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.findindex)
    fn find_index<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (index, _) = find_via_predicate(agent, this_value, arguments, Direction::Ascending, gc)?;
        Ok(index_to_value(index))
    }

    /// ### [23.1.3.11 Array.prototype.findLast ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.findlast)
    fn find_last<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (_, value) = find_via_predicate(agent, this_value, arguments, Direction::Descending, gc)?;
        Ok(value)
    }

    /// ### [23.1.3.12 Array.prototype.findLastIndex ( predicate \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.findlastindex)
    fn find_last_index<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let (index, _) = find_via_predicate(agent, this_value, arguments, Direction::Descending, gc)?;
        Ok(index_to_value(index))
    }

    /// ### [23.1.3.13 Array.prototype.flat ( \[ depth \] )](https://tc39.es/ecma262/#sec-array.prototype.flat)
    fn flat<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let depth = arguments.get(0).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let sourceLen be ? LengthOfArrayLike(O).
        let source_len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. Let depthNum be 1.
        // 4. If depth is not undefined, then
        //   a. Set depthNum to ? ToIntegerOrInfinity(depth).
        //   b. If depthNum < 0, set depthNum to 0.
        let depth = depth.get(agent);
        let depth_num = if depth.is_undefined() {
            1.0
        } else {
            to_integer_or_infinity(agent, depth, gc.reborrow())
                .unbind()?
                .max(0.0)
        };
        // 5. Let A be ? ArraySpeciesCreate(O, 0).
        let a = array_species_create(agent, o.get(agent), 0, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 6. Perform ? FlattenIntoArray(A, O, sourceLen, 0, depthNum).
        flatten_into_array(agent, a, o, source_len, 0, depth_num, None, gc.reborrow()).unbind()?;
        // 7. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.14 Array.prototype.flatMap ( mapper \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.flatmap)
    fn flat_map<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let CallbackSetup {
            o,
            len: source_len,
            callback: mapper,
            this_arg,
        } = callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
        // 4. Let A be ? ArraySpeciesCreate(O, 0).
        let a = array_species_create(agent, o.get(agent), 0, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 5. Perform ? FlattenIntoArray(A, O, sourceLen, 0, 1, mapper, thisArg).
        flatten_into_array(
            agent,
            a,
            o,
            source_len,
            0,
            1.0,
            Some((mapper, this_arg)),
            gc.reborrow(),
        )
        .unbind()?;
        // 6. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.15 Array.prototype.forEach ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.foreach)
    fn for_each<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let setup = callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
        // 5. Repeat, while k < len,
        for k in 0..setup.len {
            // c. If kPresent is true, then
            //   i. Let kValue be ? Get(O, Pk).
            let Some(k_value) = get_present_element(agent, setup.o.get(agent), k, gc.reborrow()).unbind()? else {
                continue;
            };
            // ii. Perform ? Call(callback, thisArg, « kValue, 𝔽(k), O »).
            setup.call(agent, k_value, k, gc.reborrow()).unbind()?;
        }
        // 6. Return undefined.
        Ok(Value::Undefined)
    }

    /// ### [23.1.3.16 Array.prototype.includes ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-array.prototype.includes)
    fn includes<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let search_element = arguments.get(0).scope(agent, gc.nogc());
        let from_index = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. If len = 0, return false.
        if len == 0 {
            return Ok(false.into());
        }
        // 4-10. Let k be the clamped relative fromIndex.
        let k = to_relative_index(agent, Some(from_index.get(agent)), len, 0, gc.reborrow()).unbind()?;
        let index = search_elements(
            agent,
            o,
            search_element.get(agent),
            SearchMode::Includes,
            k..len,
            gc.reborrow(),
        )
        .unbind()?;
        // 11. Return false.
        Ok(index.is_some().into())
    }

    /// ### [23.1.3.17 Array.prototype.indexOf ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-array.prototype.indexof)
    fn index_of<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let search_element = arguments.get(0).scope(agent, gc.nogc());
        let from_index = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. If len = 0, return -1𝔽.
        if len == 0 {
            return Ok(index_to_value(None));
        }
        // 4-10. Let k be the clamped relative fromIndex.
        let k = to_relative_index(agent, Some(from_index.get(agent)), len, 0, gc.reborrow()).unbind()?;
        let index = search_elements(
            agent,
            o,
            search_element.get(agent),
            SearchMode::IndexOf,
            k..len,
            gc.reborrow(),
        )
        .unbind()?;
        // 12. Return -1𝔽.
        Ok(index_to_value(index))
    }

    /// ### [23.1.3.18 Array.prototype.join ( separator )](https://tc39.es/ecma262/#sec-array.prototype.join)
    ///
    /// A receiver that is already being joined further up the stack joins
    /// to the empty string.
    fn join<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let separator = arguments.get(0).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. If separator is undefined, let sep be ",".
        // 4. Else, let sep be ? ToString(separator).
        let separator = separator.get(agent);
        let sep = if separator.is_undefined() {
            BUILTIN_STRING_MEMORY.comma
        } else {
            to_string(agent, separator, gc.reborrow()).unbind()?
        };
        let sep = sep.scope(agent, gc.nogc());
        let receiver = o.get(agent);
        let joined = with_join_stack(agent, receiver, gc, |agent, mut gc| {
            // 5. Let R be the empty String.
            let mut parts = JoinParts::new(agent, sep.get(agent), len as usize);
            // 6. Let k be 0.
            // 7. Repeat, while k < len,
            for k in 0..len {
                // a. If k > 0, set R to the string-concatenation of R and sep.
                // b. Let element be ? Get(O, ! ToString(𝔽(k))).
                let element = get_element(agent, o.get(agent), k, gc.reborrow()).unbind()?;
                // c. If element is either undefined or null, let next be the empty String;
                //    otherwise, let next be ? ToString(element).
                if element.is_nullish() {
                    parts.push_empty(agent, gc.nogc()).unbind()?;
                    continue;
                }
                let next = if element.is_primitive() {
                    to_string_primitive(agent, element, gc.nogc()).unbind()
                } else {
                    to_string(agent, element, gc.reborrow()).unbind()?
                };
                // d. Set R to the string-concatenation of R and next.
                parts.push(agent, next, gc.nogc()).unbind()?;
            }
            // 8. Return R.
            Ok(parts.finish(agent, gc.into_nogc()))
        })?;
        Ok(joined.into())
    }

    /// ### [23.1.3.19 Array.prototype.keys ( )](https://tc39.es/ecma262/#sec-array.prototype.keys)
    fn keys<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc)?;
        // 2. Return CreateArrayIterator(O, key).
        Ok(create_array_iterator(agent, o, CollectionIteratorKind::Key, gc))
    }

    /// ### [23.1.3.20 Array.prototype.lastIndexOf ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-array.prototype.lastindexof)
    fn last_index_of<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let search_element = arguments.get(0).scope(agent, gc.nogc());
        let from_index = arguments
            .get_if_present(1)
            .map(|from_index| from_index.scope(agent, gc.nogc()));
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. If len = 0, return -1𝔽.
        if len == 0 {
            return Ok(index_to_value(None));
        }
        // 4. If fromIndex is present, let fromIndex be ? ToIntegerOrInfinity(fromIndex);
        //    else let fromIndex be len - 1.
        let from_index = match from_index.map(|from_index| from_index.get(agent)) {
            Some(from_index) => to_integer_or_infinity(agent, from_index, gc.reborrow()).unbind()?,
            None => len as f64 - 1.0,
        };
        // 5. If fromIndex = -∞, return -1𝔽.
        // 6. If fromIndex ≥ 0, then
        //   a. Let k be min(fromIndex, len - 1).
        // 7. Else,
        //   a. Let k be len + fromIndex.
        let k = if from_index >= 0.0 {
            from_index.min(len as f64 - 1.0)
        } else {
            len as f64 + from_index
        };
        if k < 0.0 {
            return Ok(index_to_value(None));
        }
        let index = search_elements_backward(
            agent,
            o,
            search_element.get(agent),
            k as u64,
            gc.reborrow(),
        )
        .unbind()?;
        // 9. Return -1𝔽.
        Ok(index_to_value(index))
    }

    /// ### [23.1.3.21 Array.prototype.map ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.map)
    fn map<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let setup = callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
        // 4. Let A be ? ArraySpeciesCreate(O, len).
        let a = array_species_create(agent, setup.o.get(agent), setup.len, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 6. Repeat, while k < len,
        for k in 0..setup.len {
            // c. If kPresent is true, then
            //   i. Let kValue be ? Get(O, Pk).
            let Some(k_value) = get_present_element(agent, setup.o.get(agent), k, gc.reborrow()).unbind()? else {
                continue;
            };
            // ii. Let mappedValue be ? Call(callback, thisArg, « kValue, 𝔽(k), O »).
            let mapped_value = setup.call(agent, k_value, k, gc.reborrow()).unbind()?;
            // iii. Perform ? CreateDataPropertyOrThrow(A, Pk, mappedValue).
            create_data_property_or_throw(
                agent,
                a.get(agent),
                PropertyKey::Integer(k),
                mapped_value,
                gc.reborrow(),
            )
            .unbind()?;
        }
        // 7. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.22 Array.prototype.pop ( )](https://tc39.es/ecma262/#sec-array.prototype.pop)
    fn pop<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        if len > 0
            && let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.pop")
            && let Some(storage) = array.as_mut_vec(agent)
        {
            let element = storage.pop().flatten().unwrap_or(Value::Undefined);
            return Ok(element.bind(gc.into_nogc()));
        }
        // 3. If len = 0, then
        if len == 0 {
            // a. Perform ? Set(O, "length", +0𝔽, true).
            set_length(agent, o.get(agent), 0, gc.reborrow()).unbind()?;
            // b. Return undefined.
            return Ok(Value::Undefined);
        }
        // 4. Else,
        //   a. Assert: len > 0.
        //   b. Let newLen be 𝔽(len - 1).
        let new_len = len - 1;
        // c. Let index be ! ToString(newLen).
        // d. Let element be ? Get(O, index).
        let element = get_element(agent, o.get(agent), new_len, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // e. Perform ? DeletePropertyOrThrow(O, index).
        delete_property_or_throw(agent, o.get(agent), PropertyKey::Integer(new_len), gc.nogc()).unbind()?;
        // f. Perform ? Set(O, "length", newLen, true).
        set_length(agent, o.get(agent), new_len, gc.reborrow()).unbind()?;
        // g. Return element.
        Ok(element.get(agent).bind(gc.into_nogc()))
    }

    /// ### [23.1.3.23 Array.prototype.push ( ...items )](https://tc39.es/ecma262/#sec-array.prototype.push)
    fn push<'gc>(
        agent: &mut Agent,
        this_value: Value,
        items: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let items = items.iter().map(|item| item.unbind()).collect::<Vec<_>>();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. Let argCount be the number of elements in items.
        let arg_count = items.len() as u64;
        // 4. If len + argCount > 2**53 - 1, throw a TypeError exception.
        if len + arg_count > MAX_SAFE_LENGTH {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                LENGTH_OVERFLOW,
                gc.into_nogc(),
            ));
        }
        let new_len = len + arg_count;
        if new_len < u32::MAX as u64
            && let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.push")
        {
            for (index, item) in (len as u32..).zip(items) {
                array.set_element(agent, index, item);
            }
            return Ok(Value::from_f64(new_len as f64));
        }
        // 5. For each element E of items, do
        for (index, item) in (len..).zip(items) {
            // a. Perform ? Set(O, ! ToString(𝔽(len)), E, true).
            // b. Set len to len + 1.
            set(agent, o.get(agent), PropertyKey::Integer(index), item, true, gc.reborrow()).unbind()?;
        }
        // 6. Perform ? Set(O, "length", 𝔽(len), true).
        set_length(agent, o.get(agent), new_len, gc.reborrow()).unbind()?;
        // 7. Return 𝔽(len).
        Ok(Value::from_f64(new_len as f64))
    }

    /// ### [23.1.3.24 Array.prototype.reduce ( callback \[ , initialValue \] )](https://tc39.es/ecma262/#sec-array.prototype.reduce)
    fn reduce<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        reduce_in_direction(agent, this_value, arguments, Direction::Ascending, gc)
    }

    /// ### [23.1.3.25 Array.prototype.reduceRight ( callback \[ , initialValue \] )](https://tc39.es/ecma262/#sec-array.prototype.reduceright)
    fn reduce_right<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        reduce_in_direction(agent, this_value, arguments, Direction::Descending, gc)
    }

    /// ### [23.1.3.26 Array.prototype.reverse ( )](https://tc39.es/ecma262/#sec-array.prototype.reverse)
    fn reverse<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        if let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.reverse")
            && let Some(storage) = array.as_mut_vec(agent)
        {
            storage.reverse();
            return Ok(array.bind(gc.into_nogc()).into());
        }
        // 3. Let middle be floor(len / 2).
        let middle = len / 2;
        // 4. Let lower be 0.
        // 5. Repeat, while lower ≠ middle,
        for lower in 0..middle {
            // a. Let upper be len - lower - 1.
            let upper = len - lower - 1;
            // b. Let upperP be ! ToString(𝔽(upper)).
            // c. Let lowerP be ! ToString(𝔽(lower)).
            let upper_p = PropertyKey::Integer(upper);
            let lower_p = PropertyKey::Integer(lower);
            // d. Let lowerExists be ? HasProperty(O, lowerP).
            // e. If lowerExists is true, then
            //   i. Let lowerValue be ? Get(O, lowerP).
            let lower_value = get_present_element(agent, o.get(agent), lower, gc.reborrow())
                .unbind()?
                .map(|lower_value| lower_value.scope(agent, gc.nogc()));
            // f. Let upperExists be ? HasProperty(O, upperP).
            // g. If upperExists is true, then
            //   i. Let upperValue be ? Get(O, upperP).
            let upper_value = get_present_element(agent, o.get(agent), upper, gc.reborrow()).unbind()?;
            match (lower_value.map(|lower_value| lower_value.get(agent)), upper_value) {
                // h. If lowerExists is true and upperExists is true, then
                (Some(lower_value), Some(upper_value)) => {
                    // i. Perform ? Set(O, lowerP, upperValue, true).
                    set(agent, o.get(agent), lower_p, upper_value, true, gc.reborrow()).unbind()?;
                    // ii. Perform ? Set(O, upperP, lowerValue, true).
                    set(agent, o.get(agent), upper_p, lower_value, true, gc.reborrow()).unbind()?;
                }
                // i. Else if lowerExists is false and upperExists is true, then
                (None, Some(upper_value)) => {
                    // i. Perform ? Set(O, lowerP, upperValue, true).
                    set(agent, o.get(agent), lower_p, upper_value, true, gc.reborrow()).unbind()?;
                    // ii. Perform ? DeletePropertyOrThrow(O, upperP).
                    delete_property_or_throw(agent, o.get(agent), upper_p, gc.nogc()).unbind()?;
                }
                // j. Else if lowerExists is true and upperExists is false, then
                (Some(lower_value), None) => {
                    // i. Perform ? DeletePropertyOrThrow(O, lowerP).
                    delete_property_or_throw(agent, o.get(agent), lower_p, gc.nogc()).unbind()?;
                    // ii. Perform ? Set(O, upperP, lowerValue, true).
                    set(agent, o.get(agent), upper_p, lower_value, true, gc.reborrow()).unbind()?;
                }
                // k. Else,
                //   i. Assert: lowerExists and upperExists are both false.
                //   ii. NOTE: No action is required.
                (None, None) => {}
            }
        }
        // 6. Return O.
        Ok(o.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.27 Array.prototype.shift ( )](https://tc39.es/ecma262/#sec-array.prototype.shift)
    fn shift<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. If len = 0, then
        if len == 0 {
            // a. Perform ? Set(O, "length", +0𝔽, true).
            set_length(agent, o.get(agent), 0, gc.reborrow()).unbind()?;
            // b. Return undefined.
            return Ok(Value::Undefined);
        }
        if let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.shift")
            && let Some(storage) = array.as_mut_vec(agent)
        {
            let first = storage.remove(0).unwrap_or(Value::Undefined);
            return Ok(first.bind(gc.into_nogc()));
        }
        // 4. Let first be ? Get(O, "0").
        let first = get_element(agent, o.get(agent), 0, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 5. Let k be 1.
        // 6. Repeat, while k < len,
        for k in 1..len {
            // a. Let from be ! ToString(𝔽(k)).
            // b. Let to be ! ToString(𝔽(k - 1)).
            // c-e. Move the element from `from` to `to`, deleting `to` if
            //      `from` is absent.
            move_element(agent, o.get(agent), k, k - 1, gc.reborrow()).unbind()?;
        }
        // 7. Perform ? DeletePropertyOrThrow(O, ! ToString(𝔽(len - 1))).
        delete_property_or_throw(agent, o.get(agent), PropertyKey::Integer(len - 1), gc.nogc()).unbind()?;
        // 8. Perform ? Set(O, "length", 𝔽(len - 1), true).
        set_length(agent, o.get(agent), len - 1, gc.reborrow()).unbind()?;
        // 9. Return first.
        Ok(first.get(agent).bind(gc.into_nogc()))
    }

    /// ### [23.1.3.28 Array.prototype.slice ( start, end )](https://tc39.es/ecma262/#sec-array.prototype.slice)
    fn slice<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let start = arguments.get(0).scope(agent, gc.nogc());
        let end = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3-5. Let k be the clamped relative start.
        let k = to_relative_index(agent, Some(start.get(agent)), len, 0, gc.reborrow()).unbind()?;
        // 6-8. Let final be the clamped relative end.
        let final_end = to_relative_index(agent, Some(end.get(agent)), len, len, gc.reborrow()).unbind()?;
        // 9. Let count be max(final - k, 0).
        let count = final_end.saturating_sub(k);
        // 10. Let A be ? ArraySpeciesCreate(O, count).
        let a = array_species_create(agent, o.get(agent), count, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        if let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.slice")
            && let Some(result) = fresh_array(agent, a.get(agent), count)
        {
            log::trace!("Array.prototype.slice: copying {count} slots of packed storage");
            let storage = array
                .as_slice(agent)
                .map(|storage| storage[k as usize..final_end as usize].to_vec())
                .unwrap_or_default();
            result.replace_elements(agent, storage);
            return Ok(result.bind(gc.into_nogc()).into());
        }
        // 11. Let n be 0.
        // 12. Repeat, while k < final,
        for (n, k) in (k..final_end).enumerate() {
            // a. Let Pk be ! ToString(𝔽(k)).
            // b. Let kPresent be ? HasProperty(O, Pk).
            // c. If kPresent is true, then
            //   i. Let kValue be ? Get(O, Pk).
            let k_value = get_present_element(agent, o.get(agent), k, gc.reborrow()).unbind()?;
            if let Some(k_value) = k_value {
                // ii. Perform ? CreateDataPropertyOrThrow(A, ! ToString(𝔽(n)), kValue).
                create_data_property_or_throw(
                    agent,
                    a.get(agent),
                    PropertyKey::Integer(n as u64),
                    k_value,
                    gc.reborrow(),
                )
                .unbind()?;
            }
        }
        // 13. Perform ? Set(A, "length", 𝔽(n), true).
        set_length(agent, a.get(agent), count, gc.reborrow()).unbind()?;
        // 14. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.29 Array.prototype.some ( callback \[ , thisArg \] )](https://tc39.es/ecma262/#sec-array.prototype.some)
    fn some<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let setup = callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
        // 5. Repeat, while k < len,
        for k in 0..setup.len {
            let Some(k_value) = get_present_element(agent, setup.o.get(agent), k, gc.reborrow()).unbind()? else {
                continue;
            };
            // ii. Let testResult be ToBoolean(? Call(callback, thisArg, « kValue, 𝔽(k), O »)).
            let test_result = setup.call(agent, k_value, k, gc.reborrow()).unbind()?;
            // iii. If testResult is true, return true.
            if to_boolean(agent, test_result) {
                return Ok(true.into());
            }
        }
        // 6. Return false.
        Ok(false.into())
    }

    /// ### [23.1.3.30 Array.prototype.sort ( comparator )](https://tc39.es/ecma262/#sec-array.prototype.sort)
    ///
    /// The sort is stable. Undefined elements sort after every other value
    /// and holes are moved to the end, after the undefined elements.
    fn sort<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. If comparator is not undefined and IsCallable(comparator) is
        //    false, throw a TypeError exception.
        let comparator = optional_comparator(agent, arguments.get(0), gc.nogc()).unbind()?;
        // 2. Let obj be ? ToObject(this value).
        let obj = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 3. Let len be ? LengthOfArrayLike(obj).
        let len = length_of_array_like(agent, obj.get(agent), gc.reborrow()).unbind()?;
        // 4. Let SortCompare be a new Abstract Closure with parameters (x, y)
        //    that captures comparator and performs the following steps when
        //    called:
        //   a. Return ? CompareArrayElements(x, y, comparator).
        // 5. Let sortedList be ? SortIndexedProperties(obj, len, SortCompare, skip-holes).
        let items = collect_present_elements(agent, obj, len, gc.reborrow()).unbind()?;
        let sorted_list = sort_values(agent, items, comparator, gc.reborrow()).unbind()?;
        // 6. Let itemCount be the number of elements in sortedList.
        let item_count = sorted_list.len() as u64;
        if let Some(array) = bulk_path_array(agent, obj.get(agent), len, "Array.prototype.sort")
            && let Some(storage) = array.as_mut_vec(agent)
        {
            let (sorted_slots, holes) = storage.split_at_mut(item_count as usize);
            for (slot, value) in sorted_slots.iter_mut().zip(sorted_list) {
                *slot = Some(value);
            }
            holes.fill(None);
            array.reclassify(agent);
            return Ok(array.bind(gc.into_nogc()).into());
        }
        // 7. Let j be 0.
        // 8. Repeat, while j < itemCount,
        for (j, value) in (0..).zip(sorted_list) {
            // a. Perform ? Set(obj, ! ToString(𝔽(j)), sortedList[j], true).
            set(agent, obj.get(agent), PropertyKey::Integer(j), value, true, gc.reborrow()).unbind()?;
        }
        // 9. NOTE: The call to SortIndexedProperties in step 5 uses
        //    skip-holes. The remaining indices are deleted to preserve the
        //    number of holes that were detected and excluded from the sort.
        // 10. Repeat, while j < len,
        for j in item_count..len {
            // a. Perform ? DeletePropertyOrThrow(obj, ! ToString(𝔽(j))).
            delete_property_or_throw(agent, obj.get(agent), PropertyKey::Integer(j), gc.nogc()).unbind()?;
        }
        // 11. Return obj.
        Ok(obj.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.31 Array.prototype.splice ( start, deleteCount, ...items )](https://tc39.es/ecma262/#sec-array.prototype.splice)
    fn splice<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let start = arguments
            .get_if_present(0)
            .map(|start| start.scope(agent, gc.nogc()));
        let delete_count = arguments
            .get_if_present(1)
            .map(|delete_count| delete_count.scope(agent, gc.nogc()));
        let items = arguments
            .slice_from(2)
            .iter()
            .map(|item| item.unbind())
            .collect::<Vec<_>>();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3-6. Let actualStart be the clamped relative start.
        let start_value = start.map(|start| start.get(agent));
        let actual_start = to_relative_index(agent, start_value, len, 0, gc.reborrow()).unbind()?;
        // 7. Let itemCount be the number of elements in items.
        let item_count = items.len() as u64;
        // 8-10. Let actualDeleteCount be the clamped delete count.
        let delete_count_value = delete_count.map(|delete_count| delete_count.get(agent));
        let actual_delete_count = actual_delete_count(
            agent,
            start.is_some(),
            delete_count_value,
            len - actual_start,
            gc.reborrow(),
        )
        .unbind()?;
        // 11. If len + itemCount - actualDeleteCount > 2**53 - 1, throw a TypeError exception.
        let new_len = len + item_count - actual_delete_count;
        if new_len > MAX_SAFE_LENGTH {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                LENGTH_OVERFLOW,
                gc.into_nogc(),
            ));
        }
        // 12. Let A be ? ArraySpeciesCreate(O, actualDeleteCount).
        let a = array_species_create(agent, o.get(agent), actual_delete_count, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        if new_len < u32::MAX as u64
            && let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.splice")
            && let Some(result) = fresh_array(agent, a.get(agent), actual_delete_count)
            && let Some(storage) = array.as_mut_vec(agent)
        {
            let range = actual_start as usize..(actual_start + actual_delete_count) as usize;
            let removed = storage
                .splice(range, items.into_iter().map(Some))
                .collect::<Vec<_>>();
            array.reclassify(agent);
            result.replace_elements(agent, removed);
            return Ok(result.bind(gc.into_nogc()).into());
        }
        // 13. Let k be 0.
        // 14. Repeat, while k < actualDeleteCount,
        for k in 0..actual_delete_count {
            // a. Let from be ! ToString(𝔽(actualStart + k)).
            // b. If ? HasProperty(O, from) is true, then
            //   i. Let fromValue be ? Get(O, from).
            let from_value =
                get_present_element(agent, o.get(agent), actual_start + k, gc.reborrow()).unbind()?;
            if let Some(from_value) = from_value {
                // ii. Perform ? CreateDataPropertyOrThrow(A, ! ToString(𝔽(k)), fromValue).
                create_data_property_or_throw(
                    agent,
                    a.get(agent),
                    PropertyKey::Integer(k),
                    from_value,
                    gc.reborrow(),
                )
                .unbind()?;
            }
        }
        // 15. Perform ? Set(A, "length", 𝔽(actualDeleteCount), true).
        set_length(agent, a.get(agent), actual_delete_count, gc.reborrow()).unbind()?;
        // 16. Let itemCount be the number of elements in items.
        // 17. If itemCount < actualDeleteCount, then
        if item_count < actual_delete_count {
            // a. Set k to actualStart.
            // b. Repeat, while k < (len - actualDeleteCount),
            for k in actual_start..len - actual_delete_count {
                // i. Let from be ! ToString(𝔽(k + actualDeleteCount)).
                // ii. Let to be ! ToString(𝔽(k + itemCount)).
                move_element(
                    agent,
                    o.get(agent),
                    k + actual_delete_count,
                    k + item_count,
                    gc.reborrow(),
                )
                .unbind()?;
            }
            // c. Set k to len.
            // d. Repeat, while k > (len - actualDeleteCount + itemCount),
            for k in (new_len..len).rev() {
                // i. Perform ? DeletePropertyOrThrow(O, ! ToString(𝔽(k - 1))).
                delete_property_or_throw(agent, o.get(agent), PropertyKey::Integer(k), gc.nogc()).unbind()?;
            }
        } else if item_count > actual_delete_count {
            // 18. Else if itemCount > actualDeleteCount, then
            //   a. Set k to (len - actualDeleteCount).
            //   b. Repeat, while k > actualStart,
            for k in (actual_start..len - actual_delete_count).rev() {
                // i. Let from be ! ToString(𝔽(k + actualDeleteCount - 1)).
                // ii. Let to be ! ToString(𝔽(k + itemCount - 1)).
                move_element(
                    agent,
                    o.get(agent),
                    k + actual_delete_count,
                    k + item_count,
                    gc.reborrow(),
                )
                .unbind()?;
            }
        }
        // 19. Set k to actualStart.
        // 20. For each element E of items, do
        for (k, item) in (actual_start..).zip(items) {
            // a. Perform ? Set(O, ! ToString(𝔽(k)), E, true).
            set(agent, o.get(agent), PropertyKey::Integer(k), item, true, gc.reborrow()).unbind()?;
        }
        // 21. Perform ? Set(O, "length", 𝔽(len - actualDeleteCount + itemCount), true).
        set_length(agent, o.get(agent), new_len, gc.reborrow()).unbind()?;
        // 22. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.3.32 Array.prototype.toReversed ( )](https://tc39.es/ecma262/#sec-array.prototype.toreversed)
    fn to_reversed<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. Let A be ? ArrayCreate(len).
        let len = validate_array_length(agent, len, gc.nogc()).unbind()?;
        let mut values = Vec::with_capacity(len as usize);
        // 4. Let k be 0.
        // 5. Repeat, while k < len,
        for k in 0..len {
            // a. Let from be ! ToString(𝔽(len - k - 1)).
            // c. Let fromValue be ? Get(O, from).
            let from_value = get_element(agent, o.get(agent), len - k - 1, gc.reborrow()).unbind()?;
            // d. Perform ! CreateDataPropertyOrThrow(A, Pk, fromValue).
            values.push(Some(from_value));
        }
        // 6. Return A.
        Ok(Array::from_storage(agent, values, gc.into_nogc()).into())
    }

    /// ### [23.1.3.33 Array.prototype.toSorted ( comparator )](https://tc39.es/ecma262/#sec-array.prototype.tosorted)
    fn to_sorted<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. If comparator is not undefined and IsCallable(comparator) is
        //    false, throw a TypeError exception.
        let comparator = optional_comparator(agent, arguments.get(0), gc.nogc()).unbind()?;
        // 2. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 3. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 4. Let A be ? ArrayCreate(len).
        let len = validate_array_length(agent, len, gc.nogc()).unbind()?;
        // 6. Let sortedList be ? SortIndexedProperties(O, len, SortCompare, read-through-holes).
        let mut items = Vec::with_capacity(len as usize);
        for k in 0..len {
            items.push(get_element(agent, o.get(agent), k, gc.reborrow()).unbind()?);
        }
        let sorted_list = sort_values(agent, items, comparator, gc.reborrow()).unbind()?;
        // 7. Let j be 0.
        // 8. Repeat, while j < len,
        //   a. Perform ! CreateDataPropertyOrThrow(A, ! ToString(𝔽(j)), sortedList[j]).
        let storage = sorted_list.into_iter().map(Some).collect();
        // 9. Return A.
        Ok(Array::from_storage(agent, storage, gc.into_nogc()).into())
    }

    /// ### [23.1.3.34 Array.prototype.toSpliced ( start, skipCount, ...items )](https://tc39.es/ecma262/#sec-array.prototype.tospliced)
    fn to_spliced<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let start = arguments
            .get_if_present(0)
            .map(|start| start.scope(agent, gc.nogc()));
        let skip_count = arguments
            .get_if_present(1)
            .map(|skip_count| skip_count.scope(agent, gc.nogc()));
        let items = arguments
            .slice_from(2)
            .iter()
            .map(|item| item.unbind())
            .collect::<Vec<_>>();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3-6. Let actualStart be the clamped relative start.
        let start_value = start.map(|start| start.get(agent));
        let actual_start = to_relative_index(agent, start_value, len, 0, gc.reborrow()).unbind()?;
        // 7. Let insertCount be the number of elements in items.
        let insert_count = items.len() as u64;
        // 8-10. Let actualSkipCount be the clamped skip count.
        let skip_count_value = skip_count.map(|skip_count| skip_count.get(agent));
        let actual_skip_count = actual_delete_count(
            agent,
            start.is_some(),
            skip_count_value,
            len - actual_start,
            gc.reborrow(),
        )
        .unbind()?;
        // 11. Let newLen be len + insertCount - actualSkipCount.
        let new_len = len + insert_count - actual_skip_count;
        // 12. If newLen > 2**53 - 1, throw a TypeError exception.
        if new_len > MAX_SAFE_LENGTH {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                LENGTH_OVERFLOW,
                gc.into_nogc(),
            ));
        }
        // 13. Let A be ? ArrayCreate(newLen).
        let new_len = validate_array_length(agent, new_len, gc.nogc()).unbind()?;
        let mut values = Vec::with_capacity(new_len as usize);
        // 14. Let i be 0.
        // 15. Let r be actualStart + actualSkipCount.
        // 16. Repeat, while i < actualStart,
        for i in 0..actual_start {
            // a. Let Pi be ! ToString(𝔽(i)).
            // b. Let iValue be ? Get(O, Pi).
            // c. Perform ! CreateDataPropertyOrThrow(A, Pi, iValue).
            values.push(Some(get_element(agent, o.get(agent), i, gc.reborrow()).unbind()?));
        }
        // 17. For each element E of items, do
        values.extend(items.into_iter().map(Some));
        // 18. Repeat, while i < newLen,
        for r in actual_start + actual_skip_count..len {
            // a. Let Pi be ! ToString(𝔽(i)).
            // b. Let from be ! ToString(𝔽(r)).
            // c. Let fromValue be ? Get(O, from).
            // d. Perform ! CreateDataPropertyOrThrow(A, Pi, fromValue).
            values.push(Some(get_element(agent, o.get(agent), r, gc.reborrow()).unbind()?));
        }
        // 19. Return A.
        Ok(Array::from_storage(agent, values, gc.into_nogc()).into())
    }

    /// ### [23.1.3.36 Array.prototype.toString ( )](https://tc39.es/ecma262/#sec-array.prototype.tostring)
    ///
    /// Also installed as %TypedArray%.prototype.toString.
    fn to_string<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let array be ? ToObject(this value).
        let array = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let func be ? Get(array, "join").
        let func = get(
            agent,
            array.get(agent),
            BUILTIN_STRING_MEMORY.join.into(),
            gc.reborrow(),
        )
        .unbind()?;
        // 3. If IsCallable(func) is false, set func to the intrinsic function %Object.prototype.toString%.
        let Some(func) = is_callable(func) else {
            return ObjectPrototype::to_string(agent, array.get(agent).into(), ArgumentsList::default(), gc);
        };
        // 4. Return ? Call(func, array).
        call_function(agent, func, array.get(agent).into(), &[], gc)
    }

    /// ### [23.1.3.37 Array.prototype.unshift ( ...items )](https://tc39.es/ecma262/#sec-array.prototype.unshift)
    fn unshift<'gc>(
        agent: &mut Agent,
        this_value: Value,
        items: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let items = items.iter().map(|item| item.unbind()).collect::<Vec<_>>();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. Let argCount be the number of elements in items.
        let arg_count = items.len() as u64;
        let new_len = len + arg_count;
        // 4. If argCount > 0, then
        if arg_count > 0 {
            // a. If len + argCount > 2**53 - 1, throw a TypeError exception.
            if new_len > MAX_SAFE_LENGTH {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    LENGTH_OVERFLOW,
                    gc.into_nogc(),
                ));
            }
            if new_len < u32::MAX as u64
                && let Some(array) = bulk_path_array(agent, o.get(agent), len, "Array.prototype.unshift")
                && let Some(storage) = array.as_mut_vec(agent)
            {
                storage.splice(0..0, items.into_iter().map(Some));
                array.reclassify(agent);
                return Ok(Value::from_f64(new_len as f64));
            }
            // b. Let k be len.
            // c. Repeat, while k > 0,
            for k in (0..len).rev() {
                // i. Let from be ! ToString(𝔽(k - 1)).
                // ii. Let to be ! ToString(𝔽(k + argCount - 1)).
                move_element(agent, o.get(agent), k, k + arg_count, gc.reborrow()).unbind()?;
            }
            // d. Let j be +0𝔽.
            // e. For each element E of items, do
            for (j, item) in (0..).zip(items) {
                // i. Let toKey be ! ToString(j).
                // ii. Perform ? Set(O, toKey, E, true).
                set(agent, o.get(agent), PropertyKey::Integer(j), item, true, gc.reborrow()).unbind()?;
            }
        }
        // 5. Perform ? Set(O, "length", 𝔽(len + argCount), true).
        set_length(agent, o.get(agent), new_len, gc.reborrow()).unbind()?;
        // 6. Return 𝔽(len + argCount).
        Ok(Value::from_f64(new_len as f64))
    }

    /// ### [23.1.3.38 Array.prototype.values ( )](https://tc39.es/ecma262/#sec-array.prototype.values)
    fn values<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let gc = gc.into_nogc();
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc)?;
        // 2. Return CreateArrayIterator(O, value).
        Ok(create_array_iterator(agent, o, CollectionIteratorKind::Value, gc))
    }

    /// ### [23.1.3.39 Array.prototype.with ( index, value )](https://tc39.es/ecma262/#sec-array.prototype.with)
    fn with<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let index = arguments.get(0).scope(agent, gc.nogc());
        let value = arguments.get(1).scope(agent, gc.nogc());
        // 1. Let O be ? ToObject(this value).
        let o = to_object(agent, this_value, gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 2. Let len be ? LengthOfArrayLike(O).
        let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
        // 3. Let relativeIndex be ? ToIntegerOrInfinity(index).
        let relative_index = to_integer_or_infinity(agent, index.get(agent), gc.reborrow()).unbind()?;
        // 4. If relativeIndex ≥ 0, let actualIndex be relativeIndex.
        // 5. Else, let actualIndex be len + relativeIndex.
        let actual_index = if relative_index >= 0.0 {
            relative_index
        } else {
            len as f64 + relative_index
        };
        // 6. If actualIndex ≥ len or actualIndex < 0, throw a RangeError exception.
        if actual_index >= len as f64 || actual_index < 0.0 {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Index out of bounds",
                gc.into_nogc(),
            ));
        }
        let actual_index = actual_index as u64;
        // 7. Let A be ? ArrayCreate(len).
        let len = validate_array_length(agent, len, gc.nogc()).unbind()?;
        let mut values = Vec::with_capacity(len as usize);
        // 8. Let k be 0.
        // 9. Repeat, while k < len,
        for k in 0..len {
            // b. If k = actualIndex, let fromValue be value.
            // c. Else, let fromValue be ? Get(O, Pk).
            let from_value = if k == actual_index {
                value.get(agent)
            } else {
                get_element(agent, o.get(agent), k, gc.reborrow()).unbind()?
            };
            // d. Perform ! CreateDataPropertyOrThrow(A, Pk, fromValue).
            values.push(Some(from_value));
        }
        // 10. Return A.
        Ok(Array::from_storage(agent, values, gc.into_nogc()).into())
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let object_prototype = intrinsics.object_prototype();
        let this = intrinsics.array_prototype();
        let array_constructor = intrinsics.array();
        let to_string = intrinsics.array_prototype_to_string();
        let values = intrinsics.array_prototype_values();
        OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
            .with_property_capacity(39)
            .with_prototype(object_prototype)
            .with_builtin_function_property::<ArrayPrototypeAt>()
            .with_builtin_function_property::<ArrayPrototypeConcat>()
            .with_constructor_property(array_constructor)
            .with_builtin_function_property::<ArrayPrototypeCopyWithin>()
            .with_builtin_function_property::<ArrayPrototypeEntries>()
            .with_builtin_function_property::<ArrayPrototypeEvery>()
            .with_builtin_function_property::<ArrayPrototypeFill>()
            .with_builtin_function_property::<ArrayPrototypeFilter>()
            .with_builtin_function_property::<ArrayPrototypeFind>()
            .with_builtin_function_property::<ArrayPrototypeFindIndex>()
            .with_builtin_function_property::<ArrayPrototypeFindLast>()
            .with_builtin_function_property::<ArrayPrototypeFindLastIndex>()
            .with_builtin_function_property::<ArrayPrototypeFlat>()
            .with_builtin_function_property::<ArrayPrototypeFlatMap>()
            .with_builtin_function_property::<ArrayPrototypeForEach>()
            .with_builtin_function_property::<ArrayPrototypeIncludes>()
            .with_builtin_function_property::<ArrayPrototypeIndexOf>()
            .with_builtin_function_property::<ArrayPrototypeJoin>()
            .with_builtin_function_property::<ArrayPrototypeKeys>()
            .with_builtin_function_property::<ArrayPrototypeLastIndexOf>()
            .with_builtin_function_property::<ArrayPrototypeMap>()
            .with_builtin_function_property::<ArrayPrototypePop>()
            .with_builtin_function_property::<ArrayPrototypePush>()
            .with_builtin_function_property::<ArrayPrototypeReduce>()
            .with_builtin_function_property::<ArrayPrototypeReduceRight>()
            .with_builtin_function_property::<ArrayPrototypeReverse>()
            .with_builtin_function_property::<ArrayPrototypeShift>()
            .with_builtin_function_property::<ArrayPrototypeSlice>()
            .with_builtin_function_property::<ArrayPrototypeSome>()
            .with_builtin_function_property::<ArrayPrototypeSort>()
            .with_builtin_function_property::<ArrayPrototypeSplice>()
            .with_builtin_function_property::<ArrayPrototypeToReversed>()
            .with_builtin_function_property::<ArrayPrototypeToSorted>()
            .with_builtin_function_property::<ArrayPrototypeToSpliced>()
            .with_intrinsic_function_property::<ArrayPrototypeToString>(to_string)
            .with_builtin_function_property::<ArrayPrototypeUnshift>()
            .with_intrinsic_function_property::<ArrayPrototypeValues>(values)
            .with_builtin_function_property::<ArrayPrototypeWith>()
            .with_function_alias(PropertyKey::Symbol(WellKnownSymbol::Iterator), values)
            .build();
    }
}

/// The receiver, its length and the callback of a callback-taking method.
#[derive(Debug, Clone, Copy)]
struct CallbackSetup<'scope> {
    o: Scoped<'scope, Object<'static>>,
    len: u64,
    callback: Scoped<'scope, Function<'static>>,
    this_arg: Scoped<'scope, Value<'static>>,
}

// SAFETY: Only holds scoped roots.
unsafe impl<'scope> Bindable for CallbackSetup<'scope> {
    type Of<'a> = CallbackSetup<'scope>;

    #[inline(always)]
    fn unbind(self) -> Self::Of<'static> {
        self
    }

    #[inline(always)]
    fn bind<'a>(self, _gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        self
    }
}

impl CallbackSetup<'_> {
    /// Call(callback, thisArg, « kValue, 𝔽(k), O »)
    fn call<'gc>(
        &self,
        agent: &mut Agent,
        k_value: Value,
        k: u64,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        call_function(
            agent,
            self.callback.get(agent),
            self.this_arg.get(agent),
            &[k_value.unbind(), Value::from_f64(k as f64), self.o.get(agent).into()],
            gc,
        )
    }
}

/// Steps 1 to 3 shared by the callback-taking methods: convert the receiver,
/// read its length and check that the callback is callable.
fn callback_setup<'gc, 'scope>(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
    mut gc: GcScope<'gc, 'scope>,
) -> JsResult<'gc, CallbackSetup<'scope>> {
    let callback = arguments.get(0).scope(agent, gc.nogc());
    let this_arg = arguments.get(1).scope(agent, gc.nogc());
    // 1. Let O be ? ToObject(this value).
    let o = to_object(agent, this_value, gc.nogc())
        .unbind()?
        .scope(agent, gc.nogc());
    // 2. Let len be ? LengthOfArrayLike(O).
    let len = length_of_array_like(agent, o.get(agent), gc.reborrow()).unbind()?;
    // 3. If IsCallable(callback) is false, throw a TypeError exception.
    let gc = gc.into_nogc();
    let callback = require_callable(agent, callback.get(agent), CALLBACK_NOT_CALLABLE, gc)?;
    Ok(CallbackSetup {
        o,
        len,
        callback: callback.scope(agent, gc),
        this_arg,
    })
}

/// An element of fast path eligible packed storage. `Some(None)` is a hole
/// that nothing on the prototype chain can fill. `None` means the element
/// must be read through the property protocol.
fn read_packed(agent: &Agent, o: Object, k: u64) -> Option<Option<Value<'static>>> {
    let Object::Array(array) = o else {
        return None;
    };
    if !array.is_fast_path_eligible(agent) {
        return None;
    }
    let k = usize::try_from(k).ok()?;
    array.as_slice(agent)?.get(k).copied()
}

/// Get(O, ! ToString(𝔽(k)))
fn get_element<'gc>(
    agent: &mut Agent,
    o: Object,
    k: u64,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Value<'gc>> {
    if let Some(element) = read_packed(agent, o, k) {
        return Ok(element.unwrap_or(Value::Undefined).bind(gc.into_nogc()));
    }
    get(agent, o, PropertyKey::Integer(k), gc)
}

/// HasProperty(O, Pk) followed by Get(O, Pk) when the property exists.
fn get_present_element<'gc>(
    agent: &mut Agent,
    o: Object,
    k: u64,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Option<Value<'gc>>> {
    if let Some(element) = read_packed(agent, o, k) {
        return Ok(element.bind(gc.into_nogc()));
    }
    let pk = PropertyKey::Integer(k);
    if !has_property(agent, o, pk) {
        return Ok(None);
    }
    get(agent, o, pk, gc).map(Some)
}

/// Move the element at `from` to `to`, deleting `to` when `from` is absent.
fn move_element<'gc>(
    agent: &mut Agent,
    o: Object,
    from: u64,
    to: u64,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, ()> {
    let o = o.scope(agent, gc.nogc());
    // c. Let fromPresent be ? HasProperty(O, from).
    // d. If fromPresent is true, then
    //   i. Let fromValue be ? Get(O, from).
    let from_value = get_present_element(agent, o.get(agent), from, gc.reborrow()).unbind()?;
    match from_value {
        // ii. Perform ? Set(O, to, fromValue, true).
        Some(from_value) => set(agent, o.get(agent), PropertyKey::Integer(to), from_value, true, gc),
        // e. Else,
        //   i. Perform ? DeletePropertyOrThrow(O, to).
        None => delete_property_or_throw(agent, o.get(agent), PropertyKey::Integer(to), gc.into_nogc()),
    }
}

/// The receiver as an Array whose packed storage may be rewritten in bulk:
/// it must be fast path eligible and still have the length the algorithm
/// read before running any user code.
fn bulk_path_array(agent: &Agent, o: Object, len: u64, algorithm: &'static str) -> Option<Array<'static>> {
    let Object::Array(array) = o else {
        return None;
    };
    if !array.is_fast_path_eligible(agent) {
        agent.log_bailout(algorithm, "receiver is not fast path eligible");
        return None;
    }
    if array.len(agent) as u64 != len {
        agent.log_bailout(algorithm, "length changed during argument coercion");
        return None;
    }
    log::trace!("{algorithm}: rewriting packed storage directly");
    Some(array.unbind())
}

/// A result object that is a newly created Array of `len` holes, as made by
/// ArraySpeciesCreate without a user species, so that its elements may be
/// installed wholesale.
fn fresh_array(agent: &Agent, a: Object, len: u64) -> Option<Array<'static>> {
    let Object::Array(a) = a else {
        return None;
    };
    (a.len(agent) as u64 == len && a.has_no_elements(agent)).then(|| a.unbind())
}

/// Copy the present elements of a fast path eligible `e` into `a` at
/// `n..n + len`. Returns the number of slots consumed.
fn concat_packed(agent: &mut Agent, a: Object, e: Object, n: u64, len: u64) -> Option<u64> {
    let (Object::Array(a), Object::Array(e)) = (a, e) else {
        return None;
    };
    if !a.is_fast_path_eligible(agent) || !e.is_fast_path_eligible(agent) {
        return None;
    }
    if n + len >= u32::MAX as u64 {
        return None;
    }
    let elements = e.as_slice(agent)?.to_vec();
    log::trace!("Array.prototype.concat: copying {} packed elements", elements.len());
    for (index, element) in (n as u32..).zip(elements) {
        if let Some(element) = element {
            a.set_element(agent, index, element);
        }
    }
    Some(len)
}

fn set_length<'gc>(agent: &mut Agent, o: Object, len: u64, gc: GcScope<'gc, '_>) -> JsResult<'gc, ()> {
    set(
        agent,
        o,
        BUILTIN_STRING_MEMORY.length.into(),
        Value::from_f64(len as f64),
        true,
        gc,
    )
}

/// The length check of ArrayCreate, for methods that build their result
/// from a list of values.
fn validate_array_length<'gc>(agent: &mut Agent, len: u64, gc: NoGcScope<'gc, '_>) -> JsResult<'gc, u64> {
    if len > u32::MAX as u64 {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Invalid array length",
            gc,
        ));
    }
    Ok(len)
}

fn index_to_value(index: Option<u64>) -> Value<'static> {
    Value::from_f64(index.map_or(-1.0, |index| index as f64))
}

/// Steps 8 to 10 of splice and toSpliced: the number of elements to
/// remove, clamped to the elements after `actualStart`.
fn actual_delete_count<'gc>(
    agent: &mut Agent,
    start_present: bool,
    delete_count: Option<Value>,
    remaining: u64,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, u64> {
    // 8. If start is not present, then
    //   a. Let actualDeleteCount be 0.
    // 9. Else if deleteCount is not present, then
    //   a. Let actualDeleteCount be len - actualStart.
    // 10. Else,
    //   a. Let dc be ? ToIntegerOrInfinity(deleteCount).
    //   b. Let actualDeleteCount be the result of clamping dc between 0 and len - actualStart.
    match (start_present, delete_count) {
        (false, _) => Ok(0),
        (true, None) => Ok(remaining),
        (true, Some(delete_count)) => {
            let dc = to_integer_or_infinity(agent, delete_count, gc)?;
            Ok(dc.clamp(0.0, remaining as f64) as u64)
        }
    }
}

/// ### [23.1.3.2.1 IsConcatSpreadable ( O )](https://tc39.es/ecma262/#sec-isconcatspreadable)
///
/// Returns the object to spread, or `None` if `o` is added as a single item.
fn is_concat_spreadable<'gc>(
    agent: &mut Agent,
    o: Value,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Option<Object<'gc>>> {
    // 1. If O is not an Object, return false.
    let Ok(o) = Object::try_from(o) else {
        return Ok(None);
    };
    let scoped_o = o.scope(agent, gc.nogc());
    // 2. Let spreadable be ? Get(O, %Symbol.isConcatSpreadable%).
    let spreadable = get(
        agent,
        o,
        WellKnownSymbol::IsConcatSpreadable.into(),
        gc.reborrow(),
    )
    .unbind()?;
    let o = scoped_o.get(agent).bind(gc.into_nogc());
    // 3. If spreadable is not undefined, return ToBoolean(spreadable).
    // 4. Return ? IsArray(O).
    let is_spreadable = if spreadable.is_undefined() {
        is_array(o.into())
    } else {
        to_boolean(agent, spreadable)
    };
    Ok(is_spreadable.then_some(o))
}

/// ### [23.1.3.13.1 FlattenIntoArray ( target, source, sourceLen, start, depth \[ , mapperFunction \[ , thisArg \] \] )](https://tc39.es/ecma262/#sec-flattenintoarray)
///
/// Returns the next free index of `target`.
#[allow(clippy::too_many_arguments)]
fn flatten_into_array<'gc>(
    agent: &mut Agent,
    target: Scoped<Object<'static>>,
    source: Scoped<Object<'static>>,
    source_len: u64,
    start: u64,
    depth: f64,
    mapper: Option<(Scoped<Function<'static>>, Scoped<Value<'static>>)>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, u64> {
    // 2. Let targetIndex be start.
    let mut target_index = start;
    // 3. Let sourceIndex be +0𝔽.
    // 4. Repeat, while ℝ(sourceIndex) < sourceLen,
    for source_index in 0..source_len {
        // a. Let P be ! ToString(sourceIndex).
        // b. Let exists be ? HasProperty(source, P).
        // c. If exists is true, then
        //   i. Let element be ? Get(source, P).
        let Some(element) = get_present_element(agent, source.get(agent), source_index, gc.reborrow()).unbind()? else {
            continue;
        };
        // ii. If mapperFunction is present, then
        //   1. Set element to ? Call(mapperFunction, thisArg, « element, sourceIndex, source »).
        let element = match mapper {
            Some((mapper, this_arg)) => call_function(
                agent,
                mapper.get(agent),
                this_arg.get(agent),
                &[element, Value::from_f64(source_index as f64), source.get(agent).into()],
                gc.reborrow(),
            )
            .unbind()?,
            None => element,
        };
        // iii. Let shouldFlatten be false.
        // iv. If depth > 0, then
        //   1. Set shouldFlatten to ? IsArray(element).
        if depth > 0.0 && is_array(element) {
            let Ok(element) = Object::try_from(element) else {
                unreachable!("arrays are objects")
            };
            let element = element.scope(agent, gc.nogc());
            // 1. If depth = +∞, let newDepth be +∞.
            // 2. Else, let newDepth be depth - 1.
            let new_depth = depth - 1.0;
            // 3. Let elementLen be ? LengthOfArrayLike(element).
            let element_len = length_of_array_like(agent, element.get(agent), gc.reborrow()).unbind()?;
            // 4. Set targetIndex to ? FlattenIntoArray(target, element, elementLen, targetIndex, newDepth).
            target_index = flatten_into_array(
                agent,
                target,
                element,
                element_len,
                target_index,
                new_depth,
                None,
                gc.reborrow(),
            )
            .unbind()?;
            continue;
        }
        // vi. Else,
        //   1. If targetIndex ≥ 2**53 - 1, throw a TypeError exception.
        if target_index >= MAX_SAFE_LENGTH {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                LENGTH_OVERFLOW,
                gc.into_nogc(),
            ));
        }
        // 2. Perform ? CreateDataPropertyOrThrow(target, ! ToString(𝔽(targetIndex)), element).
        create_data_property_or_throw(
            agent,
            target.get(agent),
            PropertyKey::Integer(target_index),
            element,
            gc.reborrow(),
        )
        .unbind()?;
        // 3. Set targetIndex to targetIndex + 1.
        target_index += 1;
    }
    // 5. Return targetIndex.
    Ok(target_index)
}

/// ### [23.1.3.12.1 FindViaPredicate ( O, len, direction, predicate, thisArg )](https://tc39.es/ecma262/#sec-findviapredicate)
fn find_via_predicate<'gc>(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
    direction: Direction,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, (Option<u64>, Value<'gc>)> {
    let setup = callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
    // 2. If direction is ascending, let indices be a List of the integers
    //    in the interval from 0 (inclusive) to len (exclusive), in
    //    ascending order.
    // 3. Else, let indices be a List of the integers in the interval from 0
    //    (inclusive) to len (exclusive), in descending order.
    let mut ascending = 0..setup.len;
    let mut descending = (0..setup.len).rev();
    let indices: &mut dyn Iterator<Item = u64> = match direction {
        Direction::Ascending => &mut ascending,
        Direction::Descending => &mut descending,
    };
    // 4. For each integer k of indices, do
    for k in indices {
        // a. Let Pk be ! ToString(𝔽(k)).
        // b. NOTE: If O is a TypedArray, the following invocation of Get will return a normal completion.
        // c. Let kValue be ? Get(O, Pk).
        let k_value = get_element(agent, setup.o.get(agent), k, gc.reborrow()).unbind()?;
        // d. Let testResult be ? Call(predicate, thisArg, « kValue, 𝔽(k), O »).
        let test_result = setup.call(agent, k_value, k, gc.reborrow()).unbind()?;
        // e. If ToBoolean(testResult) is true, return the Record { [[Index]]: 𝔽(k), [[Value]]: kValue }.
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
    let initial_value = arguments
        .get_if_present(1)
        .map(|initial_value| initial_value.scope(agent, gc.nogc()));
    let CallbackSetup { o, len, callback, .. } =
        callback_setup(agent, this_value, arguments, gc.reborrow()).unbind()?;
    // 4. If len = 0 and initialValue is not present, throw a TypeError exception.
    let initial_value = initial_value.map(|initial_value| initial_value.get(agent));
    if len == 0 && initial_value.is_none() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Reduce of empty array with no initial value",
            gc.into_nogc(),
        ));
    }
    let mut ascending = 0..len;
    let mut descending = (0..len).rev();
    let indices: &mut dyn Iterator<Item = u64> = match direction {
        Direction::Ascending => &mut ascending,
        Direction::Descending => &mut descending,
    };
    // 6. Let accumulator be undefined.
    // 7. If initialValue is present, then
    //   a. Set accumulator to initialValue.
    // 8. Else,
    //   a. Let kPresent be false.
    //   b. Repeat, while kPresent is false and k < len,
    //     ii. Set kPresent to ? HasProperty(O, Pk).
    //     iii. If kPresent is true, then
    //       1. Set accumulator to ? Get(O, Pk).
    //   c. If kPresent is false, throw a TypeError exception.
    let accumulator = match initial_value {
        Some(initial_value) => Some(initial_value),
        None => {
            let mut first = None;
            for k in &mut *indices {
                first = get_present_element(agent, o.get(agent), k, gc.reborrow()).unbind()?;
                if first.is_some() {
                    break;
                }
            }
            first
        }
    };
    let Some(accumulator) = accumulator else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Reduce of empty array with no initial value",
            gc.into_nogc(),
        ));
    };
    let mut accumulator = accumulator.scope(agent, gc.nogc());
    // 9. Repeat, while k < len,
    for k in indices {
        // c. If kPresent is true, then
        //   i. Let kValue be ? Get(O, Pk).
        let Some(k_value) = get_present_element(agent, o.get(agent), k, gc.reborrow()).unbind()? else {
            continue;
        };
        // ii. Set accumulator to ? Call(callback, undefined, « accumulator, kValue, 𝔽(k), O »).
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
        accumulator.replace(agent, result);
    }
    // 10. Return accumulator.
    Ok(accumulator.get(agent).bind(gc.into_nogc()))
}

/// Shared scan of includes and indexOf over `range`.
///
/// `includes` reads every index with Get, so absent elements compare as
/// undefined; `indexOf` skips them.
fn search_elements<'gc>(
    agent: &mut Agent,
    o: Scoped<Object<'static>>,
    search_element: Value<'static>,
    mode: SearchMode,
    range: core::ops::Range<u64>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Option<u64>> {
    let dispatch = IndexOfDispatch::new(search_element, mode);
    let algorithm = match mode {
        SearchMode::Includes => "Array.prototype.includes",
        SearchMode::IndexOf => "Array.prototype.indexOf",
    };
    if let Some(array) = bulk_path_array(agent, o.get(agent), range.end, algorithm)
        && let Some(elements) = array.as_slice(agent)
    {
        if let Some(kind) = array.elements_kind(agent)
            && !dispatch.can_match_kind(kind)
        {
            return Ok(None);
        }
        let from = range.start as usize;
        return Ok(dispatch
            .find_forward(agent, elements, from, mode)
            .map(|index| index as u64));
    }
    for k in range {
        let element = match mode {
            // a. Let elementK be ? Get(O, ! ToString(𝔽(k))).
            SearchMode::Includes => {
                Some(get_element(agent, o.get(agent), k, gc.reborrow()).unbind()?)
            }
            // a. Let kPresent be ? HasProperty(O, Pk).
            // b. If kPresent is true, then
            //   i. Let elementK be ? Get(O, Pk).
            SearchMode::IndexOf => {
                let element = get_present_element(agent, o.get(agent), k, gc.reborrow()).unbind()?;
                if element.is_none() {
                    continue;
                }
                element
            }
        };
        // b. If SameValueZero(searchElement, elementK) is true, return true.
        // ii. If IsStrictlyEqual(searchElement, elementK) is true, return 𝔽(k).
        if dispatch.matches(agent, element, mode) {
            return Ok(Some(k));
        }
    }
    Ok(None)
}

/// The descending scan of lastIndexOf, from `from` down to 0.
fn search_elements_backward<'gc>(
    agent: &mut Agent,
    o: Scoped<Object<'static>>,
    search_element: Value<'static>,
    from: u64,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Option<u64>> {
    let dispatch = IndexOfDispatch::new(search_element, SearchMode::IndexOf);
    let len = from + 1;
    if let Some(array) = fast_path_array_with_min_len(agent, o.get(agent), len)
        && let Some(elements) = array.as_slice(agent)
    {
        if let Some(kind) = array.elements_kind(agent)
            && !dispatch.can_match_kind(kind)
        {
            return Ok(None);
        }
        return Ok(dispatch
            .find_backward(agent, elements, from as usize, SearchMode::IndexOf)
            .map(|index| index as u64));
    }
    // 8. Repeat, while k ≥ 0,
    for k in (0..len).rev() {
        // a. Let kPresent be ? HasProperty(O, ! ToString(𝔽(k))).
        // b. If kPresent is true, then
        //   i. Let elementK be ? Get(O, ! ToString(𝔽(k))).
        let element = get_present_element(agent, o.get(agent), k, gc.reborrow()).unbind()?;
        // ii. If IsStrictlyEqual(searchElement, elementK) is true, return 𝔽(k).
        if element.is_some() && dispatch.matches(agent, element, SearchMode::IndexOf) {
            return Ok(Some(k));
        }
    }
    Ok(None)
}

/// A fast path eligible Array holding at least `len` elements.
fn fast_path_array_with_min_len(agent: &Agent, o: Object, len: u64) -> Option<Array<'static>> {
    let Object::Array(array) = o else {
        return None;
    };
    if !array.is_fast_path_eligible(agent) {
        agent.log_bailout("Array.prototype.lastIndexOf", "receiver is not fast path eligible");
        return None;
    }
    (array.len(agent) as u64 >= len).then(|| array.unbind())
}

/// The elements SortIndexedProperties collects with skip-holes.
fn collect_present_elements<'gc>(
    agent: &mut Agent,
    obj: Scoped<Object<'static>>,
    len: u64,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Vec<Value<'static>>> {
    if let Some(array) = bulk_path_array(agent, obj.get(agent), len, "Array.prototype.sort")
        && let Some(elements) = array.as_slice(agent)
    {
        return Ok(elements.iter().flatten().copied().collect());
    }
    // 1. Let items be a new empty List.
    let mut items = Vec::new();
    // 2. Let k be 0.
    // 3. Repeat, while k < len,
    for k in 0..len {
        // b. If holes is skip-holes, then
        //   i. Let kRead be ? HasProperty(obj, Pk).
        // d. If kRead is true, then
        //   i. Let kValue be ? Get(obj, Pk).
        //   iii. Append kValue to items.
        if let Some(k_value) = get_present_element(agent, obj.get(agent), k, gc.reborrow()).unbind()? {
            items.push(k_value);
        }
    }
    Ok(items)
}

/// Steps 4 and 5 of SortIndexedProperties: sort `items` with
/// CompareArrayElements.
///
/// Undefined values sort after every other value without consulting the
/// comparator. Without a comparator, values are ordered by the code units
/// of their string forms, each of which is computed once.
fn sort_values<'gc>(
    agent: &mut Agent,
    items: Vec<Value<'static>>,
    comparator: Option<Scoped<Function<'static>>>,
    mut gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Vec<Value<'static>>> {
    let (mut defined, undefined): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|value| !value.is_undefined());
    match comparator {
        Some(comparator) => {
            // 4. If comparator is not undefined, then
            //   a. Let v be ? ToNumber(? Call(comparator, undefined, « x, y »)).
            insertion_sort_by(&mut defined, |x, y| {
                call_comparator(agent, comparator.get(agent), *x, *y, gc.reborrow()).unbind()
            })?;
        }
        None => {
            // 5. Let xString be ? ToString(x).
            // 6. Let yString be ? ToString(y).
            let mut keyed = Vec::with_capacity(defined.len());
            for value in defined {
                let key = if value.is_primitive() {
                    to_string_primitive(agent, value, gc.nogc()).unbind()
                } else {
                    to_string(agent, value, gc.reborrow()).unbind()?
                };
                keyed.push((key, value));
            }
            // 7. Let xSmaller be ! IsLessThan(xString, yString, true).
            // 9. Let ySmaller be ! IsLessThan(yString, xString, true).
            let Ok(()) = insertion_sort_by(&mut keyed, |(x, _), (y, _)| {
                Ok::<Ordering, Infallible>(x.code_unit_cmp(*y, agent))
            });
            defined = keyed.into_iter().map(|(_, value)| value).collect();
        }
    }
    defined.extend(undefined);
    Ok(defined)
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::invoke,
        builtins::create_native_function,
        execution::Options,
        types::{OrdinaryObject, PropertyValue, String},
    };

    fn numbers(values: &[f64]) -> Vec<Value<'static>> {
        values.iter().map(|value| Value::from_f64(*value)).collect()
    }

    fn array_of(agent: &mut Agent, values: &[f64], gc: NoGcScope) -> Array<'static> {
        Array::from_slice(agent, &numbers(values), gc).unbind()
    }

    /// Elements of an array, with holes as `None`.
    fn elements(agent: &Agent, value: Value) -> Vec<Option<Value<'static>>> {
        let Value::Array(array) = value else {
            panic!("expected an array, got {value:?}");
        };
        (0..array.len(agent))
            .map(|k| match array.get_element(agent, k) {
                Some(PropertyValue::Data(value)) => Some(value.unbind()),
                Some(PropertyValue::Accessor { .. }) => panic!("unexpected accessor"),
                None => None,
            })
            .collect()
    }

    fn number_elements(agent: &Agent, value: Value) -> Vec<f64> {
        elements(agent, value)
            .into_iter()
            .map(|element| match element {
                Some(Value::Number(n)) => n,
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

    fn string(agent: &mut Agent, text: &str, gc: NoGcScope) -> Value<'static> {
        String::from_str(agent, text, gc).unbind().into()
    }

    fn subtract(agent: &mut Agent, gc: NoGcScope) -> Value<'static> {
        create_native_function(
            agent,
            |_, _, arguments, _| {
                let x = arguments.get(0).as_number().unwrap_or(f64::NAN);
                let y = arguments.get(1).as_number().unwrap_or(f64::NAN);
                Ok(Value::from_f64(x - y))
            },
            "subtract",
            2,
            gc,
        )
        .unbind()
        .into()
    }

    #[test]
    fn join_skips_holes_and_nullish_elements() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[1.0, 0.0, 3.0], gc.nogc());
            agent[array].elements.delete(1);
            let dash = string(agent, "-", gc.nogc());
            let joined = call_method(agent, array, "join", &[dash], gc.reborrow()).unwrap();
            assert_eq!(String::try_from(joined).unwrap().as_str(agent), "1--3");

            let mixed = Array::from_slice(
                agent,
                &[Value::Null, Value::from_f64(2.5), Value::Undefined, true.into()],
                gc.nogc(),
            )
            .unbind();
            let joined = call_method(agent, mixed, "join", &[], gc.reborrow()).unwrap();
            assert_eq!(String::try_from(joined).unwrap().as_str(agent), ",2.5,,true");
            let joined = call_method(agent, mixed, "toString", &[], gc.reborrow()).unwrap();
            assert_eq!(String::try_from(joined).unwrap().as_str(agent), ",2.5,,true");
        });
    }

    #[test]
    fn join_of_a_cyclic_array_is_empty_at_the_cycle() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[1.0], gc.nogc());
            array.set_element(agent, 1, array.into());
            let joined = call_method(agent, array, "join", &[], gc.reborrow()).unwrap();
            assert_eq!(String::try_from(joined).unwrap().as_str(agent), "1,");
            assert!(agent.join_stack.is_empty());
        });
    }

    #[test]
    fn to_string_falls_back_when_join_is_not_callable() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let object_prototype = agent.intrinsics().object_prototype();
            let object = OrdinaryObject::create(agent, Some(object_prototype.into()), gc.nogc()).unbind();
            object.set_data_property(agent, BUILTIN_STRING_MEMORY.join.into(), Value::from_f64(1.0));
            let to_string = agent.intrinsics().array_prototype_to_string();
            let result = call_function(agent, to_string, object.into(), &[], gc.reborrow()).unwrap();
            assert_eq!(
                String::try_from(result).unwrap().as_str(agent),
                "[object Object]"
            );
        });
    }

    #[test]
    fn sort_with_comparator_and_default_order() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[5.0, 3.0, 4.0, 1.0, 2.0], gc.nogc());
            let subtract = subtract(agent, gc.nogc());
            let sorted = call_method(agent, array, "sort", &[subtract], gc.reborrow()).unwrap();
            assert_eq!(sorted, Value::from(array));
            assert_eq!(number_elements(agent, sorted), [1.0, 2.0, 3.0, 4.0, 5.0]);

            // Default order compares string forms.
            let array = array_of(agent, &[10.0, 9.0, 1.0, 100.0], gc.nogc());
            let sorted = call_method(agent, array, "sort", &[], gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, sorted), [1.0, 10.0, 100.0, 9.0]);

            let error = call_method(agent, array, "sort", &[true.into()], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn sort_moves_undefined_and_holes_to_the_end() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = Array::from_slice(
                agent,
                &[Value::from_f64(3.0), Value::Undefined, Value::from_f64(0.0), Value::from_f64(1.0)],
                gc.nogc(),
            )
            .unbind();
            agent[array].elements.delete(2);
            let sorted = call_method(agent, array, "sort", &[], gc.reborrow()).unwrap();
            assert_eq!(
                elements(agent, sorted),
                [Some(Value::from_f64(1.0)), Some(Value::from_f64(3.0)), Some(Value::Undefined), None]
            );
        });
    }

    #[test]
    fn to_sorted_reads_holes_as_undefined() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[2.0, 0.0, 1.0], gc.nogc());
            agent[array].elements.delete(1);
            let sorted = call_method(agent, array, "toSorted", &[], gc.reborrow()).unwrap();
            assert_eq!(
                elements(agent, sorted),
                [Some(Value::from_f64(1.0)), Some(Value::from_f64(2.0)), Some(Value::Undefined)]
            );
            assert_eq!(elements(agent, array.into())[1], None);
        });
    }

    #[test]
    fn stack_and_queue_methods_on_both_paths() {
        for disable_fast_paths in [false, true] {
            let mut agent = Agent::new(Options {
                disable_fast_paths,
                ..Options::default()
            });
            agent.run(|agent, mut gc| {
                let array = array_of(agent, &[1.0, 2.0], gc.nogc());
                let len = call_method(
                    agent,
                    array,
                    "push",
                    &numbers(&[3.0, 4.0]),
                    gc.reborrow(),
                )
                .unwrap();
                assert_eq!(len, Value::from_f64(4.0));
                let popped = call_method(agent, array, "pop", &[], gc.reborrow()).unwrap();
                assert_eq!(popped, Value::from_f64(4.0));
                let shifted = call_method(agent, array, "shift", &[], gc.reborrow()).unwrap();
                assert_eq!(shifted, Value::from_f64(1.0));
                let len = call_method(agent, array, "unshift", &numbers(&[7.0, 8.0]), gc.reborrow()).unwrap();
                assert_eq!(len, Value::from_f64(4.0));
                assert_eq!(number_elements(agent, array.into()), [7.0, 8.0, 2.0, 3.0]);

                let empty = array_of(agent, &[], gc.nogc());
                let popped = call_method(agent, empty, "pop", &[], gc.reborrow()).unwrap();
                assert_eq!(popped, Value::Undefined);
                let shifted = call_method(agent, empty, "shift", &[], gc.reborrow()).unwrap();
                assert_eq!(shifted, Value::Undefined);
            });
        }
    }

    #[test]
    fn splice_removes_and_inserts() {
        for disable_fast_paths in [false, true] {
            let mut agent = Agent::new(Options {
                disable_fast_paths,
                ..Options::default()
            });
            agent.run(|agent, mut gc| {
                let array = array_of(agent, &[1.0, 2.0, 3.0, 4.0, 5.0], gc.nogc());
                let removed = call_method(
                    agent,
                    array,
                    "splice",
                    &numbers(&[1.0, 2.0, 9.0]),
                    gc.reborrow(),
                )
                .unwrap();
                assert_eq!(number_elements(agent, removed), [2.0, 3.0]);
                assert_eq!(number_elements(agent, array.into()), [1.0, 9.0, 4.0, 5.0]);

                let removed = call_method(
                    agent,
                    array,
                    "splice",
                    &numbers(&[-1.0, 0.0, 6.0, 7.0]),
                    gc.reborrow(),
                )
                .unwrap();
                assert!(number_elements(agent, removed).is_empty());
                assert_eq!(number_elements(agent, array.into()), [1.0, 9.0, 4.0, 6.0, 7.0, 5.0]);

                // Without a delete count everything from start is removed.
                let removed = call_method(agent, array, "splice", &numbers(&[4.0]), gc.reborrow()).unwrap();
                assert_eq!(number_elements(agent, removed), [7.0, 5.0]);
                assert_eq!(number_elements(agent, array.into()), [1.0, 9.0, 4.0, 6.0]);
            });
        }
    }

    #[test]
    fn slice_concat_and_flat() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[1.0, 2.0, 3.0, 4.0], gc.nogc());
            let sliced = call_method(agent, array, "slice", &numbers(&[1.0, -1.0]), gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, sliced), [2.0, 3.0]);
            let sliced = call_method(agent, array, "slice", &numbers(&[5.0]), gc.reborrow()).unwrap();
            assert!(number_elements(agent, sliced).is_empty());

            let other = array_of(agent, &[5.0], gc.nogc());
            let concatenated = call_method(
                agent,
                array,
                "concat",
                &[other.into(), Value::from_f64(6.0)],
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(number_elements(agent, concatenated), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

            let inner = array_of(agent, &[3.0, 4.0], gc.nogc());
            let middle = Array::from_slice(agent, &[Value::from_f64(2.0), inner.into()], gc.nogc()).unbind();
            let nested = Array::from_slice(agent, &[Value::from_f64(1.0), middle.into()], gc.nogc()).unbind();
            let flat = call_method(agent, nested, "flat", &[], gc.reborrow()).unwrap();
            assert_eq!(elements(agent, flat).len(), 3);
            let flat = call_method(agent, nested, "flat", &[Value::from_f64(f64::INFINITY)], gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, flat), [1.0, 2.0, 3.0, 4.0]);
        });
    }

    #[test]
    fn concat_respects_is_concat_spreadable() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[1.0], gc.nogc());
            let object_prototype = agent.intrinsics().object_prototype();
            let array_like = OrdinaryObject::create(agent, Some(object_prototype.into()), gc.nogc()).unbind();
            array_like.set_data_property(agent, BUILTIN_STRING_MEMORY.length.into(), Value::from_f64(2.0));
            array_like.set_data_property(agent, PropertyKey::from(1u32), Value::from_f64(7.0));
            let not_spread = call_method(agent, array, "concat", &[array_like.into()], gc.reborrow()).unwrap();
            assert_eq!(elements(agent, not_spread), [Some(Value::from_f64(1.0)), Some(array_like.into())]);

            array_like.set_data_property(agent, WellKnownSymbol::IsConcatSpreadable.into(), true.into());
            let spread = call_method(agent, array, "concat", &[array_like.into()], gc.reborrow()).unwrap();
            assert_eq!(
                elements(agent, spread),
                [Some(Value::from_f64(1.0)), None, Some(Value::from_f64(7.0))]
            );
        });
    }

    #[test]
    fn searches_distinguish_includes_from_index_of() {
        for disable_fast_paths in [false, true] {
            let mut agent = Agent::new(Options {
                disable_fast_paths,
                ..Options::default()
            });
            agent.run(|agent, mut gc| {
                let array = array_of(agent, &[1.0, f64::NAN, 0.0, 1.0], gc.nogc());
                agent[array].elements.delete(2);
                let nan = Value::from_f64(f64::NAN);
                let found = call_method(agent, array, "includes", &[nan], gc.reborrow()).unwrap();
                assert_eq!(found, true.into());
                let found = call_method(agent, array, "indexOf", &[nan], gc.reborrow()).unwrap();
                assert_eq!(found, Value::from_f64(-1.0));
                let found = call_method(agent, array, "includes", &[Value::Undefined], gc.reborrow()).unwrap();
                assert_eq!(found, true.into());
                let found = call_method(agent, array, "indexOf", &[Value::Undefined], gc.reborrow()).unwrap();
                assert_eq!(found, Value::from_f64(-1.0));
                let found = call_method(agent, array, "lastIndexOf", &numbers(&[1.0]), gc.reborrow()).unwrap();
                assert_eq!(found, Value::from_f64(3.0));
                let found =
                    call_method(agent, array, "lastIndexOf", &numbers(&[1.0, -2.0]), gc.reborrow()).unwrap();
                assert_eq!(found, Value::from_f64(0.0));
                let found = call_method(agent, array, "indexOf", &numbers(&[1.0, 1.0]), gc.reborrow()).unwrap();
                assert_eq!(found, Value::from_f64(3.0));
            });
        }
    }

    #[test]
    fn copying_methods_leave_the_receiver_alone() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[3.0, 1.0, 2.0], gc.nogc());
            let reversed = call_method(agent, array, "toReversed", &[], gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, reversed), [2.0, 1.0, 3.0]);
            let spliced = call_method(agent, array, "toSpliced", &numbers(&[1.0, 1.0, 8.0, 9.0]), gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, spliced), [3.0, 8.0, 9.0, 2.0]);
            let with = call_method(agent, array, "with", &numbers(&[-1.0, 5.0]), gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, with), [3.0, 1.0, 5.0]);
            assert_eq!(number_elements(agent, array.into()), [3.0, 1.0, 2.0]);

            let error = call_method(agent, array, "with", &numbers(&[3.0, 0.0]), gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        });
    }

    #[test]
    fn fill_copy_within_and_reverse() {
        for disable_fast_paths in [false, true] {
            let mut agent = Agent::new(Options {
                disable_fast_paths,
                ..Options::default()
            });
            agent.run(|agent, mut gc| {
                let array = array_of(agent, &[1.0, 2.0, 3.0, 4.0, 5.0], gc.nogc());
                call_method(agent, array, "copyWithin", &numbers(&[0.0, 3.0]), gc.reborrow()).unwrap();
                assert_eq!(number_elements(agent, array.into()), [4.0, 5.0, 3.0, 4.0, 5.0]);
                call_method(agent, array, "copyWithin", &numbers(&[2.0, 0.0, 3.0]), gc.reborrow()).unwrap();
                assert_eq!(number_elements(agent, array.into()), [4.0, 5.0, 4.0, 5.0, 3.0]);
                call_method(agent, array, "fill", &numbers(&[0.0, 1.0, -1.0]), gc.reborrow()).unwrap();
                assert_eq!(number_elements(agent, array.into()), [4.0, 0.0, 0.0, 0.0, 3.0]);
                call_method(agent, array, "reverse", &[], gc.reborrow()).unwrap();
                assert_eq!(number_elements(agent, array.into()), [3.0, 0.0, 0.0, 0.0, 4.0]);
            });
        }
    }

    #[test]
    fn callbacks_only_visit_the_original_length() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let calls = Rc::new(Cell::new(0));
            let counter = calls.clone();
            let grow = create_native_function(
                agent,
                move |agent, _, arguments, _| {
                    counter.set(counter.get() + 1);
                    let Value::Array(array) = arguments.get(2) else {
                        unreachable!()
                    };
                    let len = array.len(agent);
                    array.set_element(agent, len, Value::from_f64(0.0));
                    Ok(Value::Undefined)
                },
                "grow",
                3,
                gc.nogc(),
            )
            .unbind();
            let array = array_of(agent, &[1.0, 2.0, 3.0], gc.nogc());
            call_method(agent, array, "forEach", &[grow.into()], gc.reborrow()).unwrap();
            assert_eq!(calls.get(), 3);
            assert_eq!(array.len(agent), 6);
        });
    }

    #[test]
    fn map_filter_and_find() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let index_plus_value = create_native_function(
                agent,
                |_, _, arguments, _| {
                    let value = arguments.get(0).as_number().unwrap_or(0.0);
                    let index = arguments.get(1).as_number().unwrap_or(0.0);
                    Ok(Value::from_f64(value + index))
                },
                "indexPlusValue",
                2,
                gc.nogc(),
            )
            .unbind();
            let is_odd = create_native_function(
                agent,
                |_, _, arguments, _| Ok((arguments.get(0).as_number().unwrap_or(0.0) % 2.0 == 1.0).into()),
                "isOdd",
                1,
                gc.nogc(),
            )
            .unbind();
            let array = array_of(agent, &[1.0, 2.0, 3.0, 4.0], gc.nogc());
            agent[array].elements.delete(1);
            let mapped = call_method(agent, array, "map", &[index_plus_value.into()], gc.reborrow()).unwrap();
            assert_eq!(
                elements(agent, mapped),
                [Some(Value::from_f64(1.0)), None, Some(Value::from_f64(5.0)), Some(Value::from_f64(7.0))]
            );
            let filtered = call_method(agent, array, "filter", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, filtered), [1.0, 3.0]);
            let found = call_method(agent, array, "findLast", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(found, Value::from_f64(3.0));
            let found = call_method(agent, array, "findIndex", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(found, Value::from_f64(0.0));
            let some = call_method(agent, array, "some", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(some, true.into());
            let every = call_method(agent, array, "every", &[is_odd.into()], gc.reborrow()).unwrap();
            assert_eq!(every, false.into());
            let flat_mapped =
                call_method(agent, array, "flatMap", &[index_plus_value.into()], gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, flat_mapped), [1.0, 5.0, 7.0]);

            let error = call_method(agent, array, "map", &[Value::Undefined], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn reduce_skips_holes_and_requires_a_value() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let digits = create_native_function(
                agent,
                |_, _, arguments, _| {
                    let accumulator = arguments.get(0).as_number().unwrap_or(0.0);
                    let value = arguments.get(1).as_number().unwrap_or(0.0);
                    Ok(Value::from_f64(accumulator * 10.0 + value))
                },
                "digits",
                2,
                gc.nogc(),
            )
            .unbind();
            let array = array_of(agent, &[1.0, 0.0, 2.0, 3.0], gc.nogc());
            agent[array].elements.delete(1);
            let reduced = call_method(agent, array, "reduce", &[digits.into()], gc.reborrow()).unwrap();
            assert_eq!(reduced, Value::from_f64(123.0));
            let reduced = call_method(agent, array, "reduceRight", &[digits.into()], gc.reborrow()).unwrap();
            assert_eq!(reduced, Value::from_f64(321.0));

            let holes = array_of(agent, &[], gc.nogc());
            holes.set_len(agent, 3);
            let error = call_method(agent, holes, "reduce", &[digits.into()], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
            let reduced = call_method(
                agent,
                holes,
                "reduce",
                &[digits.into(), Value::from_f64(9.0)],
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(reduced, Value::from_f64(9.0));
        });
    }

    #[test]
    fn at_and_iterators() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = array_of(agent, &[1.0, 2.0, 3.0], gc.nogc());
            let last = call_method(agent, array, "at", &numbers(&[-1.0]), gc.reborrow()).unwrap();
            assert_eq!(last, Value::from_f64(3.0));
            let outside = call_method(agent, array, "at", &numbers(&[3.0]), gc.reborrow()).unwrap();
            assert_eq!(outside, Value::Undefined);
            let entries = call_method(agent, array, "entries", &[], gc.reborrow()).unwrap();
            assert!(matches!(entries, Value::ArrayIterator(_)));
            let values = agent.intrinsics().array_prototype_values();
            let array_prototype = agent.intrinsics().array_prototype();
            let iterator = get(
                agent,
                array_prototype.into(),
                WellKnownSymbol::Iterator.into(),
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(iterator, Value::from(values));
        });
    }
}
