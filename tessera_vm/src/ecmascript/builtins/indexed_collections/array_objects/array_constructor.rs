// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.1.1 The Array Constructor](https://tc39.es/ecma262/#sec-array-constructor)

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_iterator_objects::{
                get_iterator_from_method, iterator_close_with_error, iterator_step_value,
            },
            operations_on_objects::{
                call_function, construct, create_data_property_or_throw, get,
                get_method, get_prototype_from_constructor, length_of_array_like, set,
            },
            testing_and_comparison::{is_array, is_callable, is_constructor},
            type_conversion::{number_to_uint32, to_object},
        },
        builders::BuiltinFunctionBuilder,
        builtins::{
            ArgumentsList, Behaviour, Builtin, BuiltinGetter, Function,
            array::abstract_operations::array_create,
            structured_data::array_buffer_objects::array_buffer_constructor::ArrayBufferConstructor,
        },
        execution::{Agent, ExceptionType, JsResult, ProtoIntrinsics},
        types::{BUILTIN_STRING_MEMORY, Object, PropertyKey, Value, WellKnownSymbol},
    },
    engine::{
        Scopable, Scoped,
        context::{Bindable, GcScope},
    },
};

pub(crate) struct ArrayConstructor;
impl Builtin for ArrayConstructor {
    const NAME: &'static str = "Array";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(Self::constructor);
}

struct ArrayFrom;
impl Builtin for ArrayFrom {
    const NAME: &'static str = "from";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayConstructor::from);
}

struct ArrayIsArray;
impl Builtin for ArrayIsArray {
    const NAME: &'static str = "isArray";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayConstructor::is_array);
}

struct ArrayOf;
impl Builtin for ArrayOf {
    const NAME: &'static str = "of";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayConstructor::of);
}

struct ArrayGetSpecies;
impl Builtin for ArrayGetSpecies {
    const NAME: &'static str = "get [Symbol.species]";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::Symbol(WellKnownSymbol::Species));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferConstructor::get_species);
}
impl BuiltinGetter for ArrayGetSpecies {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::Symbol(WellKnownSymbol::Species);
}

impl ArrayConstructor {
    /// ### [23.1.1.1 Array ( ...values )](https://tc39.es/ecma262/#sec-array)
    ///
    /// Also callable without `new`, in which case it behaves as if called
    /// with `new Array`.
    fn constructor<'gc>(
        agent: &mut Agent,
        _this_value: Value,
        arguments: ArgumentsList,
        new_target: Option<Object>,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let values = arguments.iter().map(|value| value.unbind()).collect::<Vec<_>>();
        // 1. If NewTarget is undefined, let newTarget be the active function
        //    object; else let newTarget be NewTarget.
        let new_target = match new_target.map(Function::try_from) {
            Some(Ok(new_target)) => new_target.unbind(),
            Some(Err(())) => unreachable!("NewTarget is always a constructor"),
            None => agent.intrinsics().array(),
        };
        // 2. Let proto be ? GetPrototypeFromConstructor(newTarget, "%Array.prototype%").
        let proto = get_prototype_from_constructor(agent, new_target, ProtoIntrinsics::Array, gc.reborrow())
            .unbind()?;
        let gc = gc.into_nogc();
        // 3. Let numberOfArgs be the number of elements in values.
        match values.as_slice() {
            // 4. If numberOfArgs = 0, then
            //   a. Return ! ArrayCreate(0, proto).
            [] => Ok(array_create(agent, 0, Some(proto), gc)?.into()),
            // 5. Else if numberOfArgs = 1, then
            [len] => {
                // a. Let len be values[0].
                // b. Let array be ! ArrayCreate(0, proto).
                // c. If len is not a Number, then
                let Value::Number(number) = *len else {
                    // i. Perform ! CreateDataPropertyOrThrow(array, "0", len).
                    // ii. Let intLen be 1𝔽.
                    let array = array_create(agent, 0, Some(proto), gc)?;
                    array.set_element(agent, 0, *len);
                    // e. Perform ! Set(array, "length", intLen, true).
                    return Ok(array.into());
                };
                // d. Else,
                //   i. Let intLen be ! ToUint32(len).
                let int_len = number_to_uint32(number);
                //   ii. If SameValueZero(intLen, len) is false, throw a RangeError exception.
                if int_len as f64 != number {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::RangeError,
                        "Invalid array length",
                        gc,
                    ));
                }
                // e. Perform ! Set(array, "length", intLen, true).
                // f. Return array.
                Ok(array_create(agent, int_len as u64, Some(proto), gc)?.into())
            }
            // 6. Else,
            values => {
                // a. Assert: numberOfArgs ≥ 2.
                debug_assert!(values.len() >= 2);
                // b. Let array be ? ArrayCreate(numberOfArgs, proto).
                let array = array_create(agent, values.len() as u64, Some(proto), gc)?;
                // c. Let k be 0.
                // d. Repeat, while k < numberOfArgs,
                for (k, value) in (0..).zip(values) {
                    // i. Let Pk be ! ToString(𝔽(k)).
                    // ii. Let itemK be values[k].
                    // iii. Perform ! CreateDataPropertyOrThrow(array, Pk, itemK).
                    array.set_element(agent, k, *value);
                }
                // f. Return array.
                Ok(array.into())
            }
        }
    }

    /// ### [23.1.2.1 Array.from ( items \[ , mapper \[ , thisArg \] \] )](https://tc39.es/ecma262/#sec-array.from)
    fn from<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let items = arguments.get(0).scope(agent, gc.nogc());
        let mapper = arguments.get(1);
        let this_arg = arguments.get(2).scope(agent, gc.nogc());
        // 1. Let C be the this value.
        let c = is_constructor(agent, this_value).map(|c| c.scope(agent, gc.nogc()));
        // 2. If mapper is undefined, then
        //   a. Let mapping be false.
        // 3. Else,
        //   a. If IsCallable(mapper) is false, throw a TypeError exception.
        //   b. Let mapping be true.
        let mapper = if mapper.is_undefined() {
            None
        } else if let Some(mapper) = is_callable(mapper) {
            Some(mapper.scope(agent, gc.nogc()))
        } else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Array.from mapper is not callable",
                gc.into_nogc(),
            ));
        };
        let mapping = Mapping { mapper, this_arg };
        // 4. Let usingIterator be ? GetMethod(items, %Symbol.iterator%).
        let using_iterator = get_method(
            agent,
            items.get(agent),
            PropertyKey::Symbol(WellKnownSymbol::Iterator),
            gc.reborrow(),
        )
        .unbind()?;
        // 5. If usingIterator is not undefined, then
        if let Some(using_iterator) = using_iterator {
            // a. If IsConstructor(C) is true, then
            //   i. Let A be ? Construct(C).
            // b. Else,
            //   i. Let A be ! ArrayCreate(0).
            let a = create_target(agent, c, &[], 0, gc.reborrow())
                .unbind()?
                .scope(agent, gc.nogc());
            // c. Let iteratorRecord be ? GetIteratorFromMethod(items, usingIterator).
            let iterator_record =
                get_iterator_from_method(agent, items.get(agent), using_iterator, gc.reborrow())
                    .unbind()?;
            // d. Let k be 0.
            let mut k: u64 = 0;
            // e. Repeat,
            loop {
                // i. If k ≥ 2**53 - 1, then
                if k >= PropertyKey::MAX_INTEGER {
                    // 1. Let error be ThrowCompletion(a newly created TypeError object).
                    let error = agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "Array.from iterable is too long",
                        gc.nogc(),
                    );
                    // 2. Return ? IteratorClose(iteratorRecord, error).
                    return Err(iterator_close_with_error(agent, iterator_record, error.unbind(), gc));
                }
                // ii. Let Pk be ! ToString(𝔽(k)).
                // iii. Let next be ? IteratorStepValue(iteratorRecord).
                let next = iterator_step_value(agent, iterator_record, gc.reborrow()).unbind()?;
                // iv. If next is done, then
                let Some(next) = next else {
                    // 1. Perform ? Set(A, "length", 𝔽(k), true).
                    set(
                        agent,
                        a.get(agent),
                        BUILTIN_STRING_MEMORY.length.into(),
                        Value::from_f64(k as f64),
                        true,
                        gc.reborrow(),
                    )
                    .unbind()?;
                    // 2. Return A.
                    return Ok(a.get(agent).bind(gc.into_nogc()).into());
                };
                // v. If mapping is true, then
                //   1. Let mappedValue be Completion(Call(mapper, thisArg, « next, 𝔽(k) »)).
                //   2. IfAbruptCloseIterator(mappedValue, iteratorRecord).
                // vi. Else,
                //   1. Let mappedValue be next.
                // vii. Let defineStatus be Completion(CreateDataPropertyOrThrow(A, Pk, mappedValue)).
                // viii. IfAbruptCloseIterator(defineStatus, iteratorRecord).
                let result = mapping.apply(agent, next, k, gc.reborrow()).unbind().and_then(|mapped_value| {
                    create_data_property_or_throw(
                        agent,
                        a.get(agent),
                        PropertyKey::Integer(k),
                        mapped_value,
                        gc.reborrow(),
                    )
                    .unbind()
                });
                if let Err(error) = result {
                    return Err(iterator_close_with_error(agent, iterator_record, error, gc));
                }
                // ix. Set k to k + 1.
                k += 1;
            }
        }
        // 6. NOTE: items is not an Iterable so assume it is an array-like object.
        // 7. Let arrayLike be ! ToObject(items).
        let array_like = to_object(agent, items.get(agent), gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 8. Let len be ? LengthOfArrayLike(arrayLike).
        let len = length_of_array_like(agent, array_like.get(agent), gc.reborrow()).unbind()?;
        // 9. If IsConstructor(C) is true, then
        //   a. Let A be ? Construct(C, « 𝔽(len) »).
        // 10. Else,
        //   a. Let A be ? ArrayCreate(len).
        let a = create_target(agent, c, &[Value::from_f64(len as f64)], len, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 11. Let k be 0.
        // 12. Repeat, while k < len,
        for k in 0..len {
            // a. Let Pk be ! ToString(𝔽(k)).
            // b. Let kValue be ? Get(arrayLike, Pk).
            let k_value = get(agent, array_like.get(agent), PropertyKey::Integer(k), gc.reborrow()).unbind()?;
            // c. If mapping is true, then
            //   i. Let mappedValue be ? Call(mapper, thisArg, « kValue, 𝔽(k) »).
            // d. Else,
            //   i. Let mappedValue be kValue.
            let mapped_value = mapping.apply(agent, k_value, k, gc.reborrow()).unbind()?;
            // e. Perform ? CreateDataPropertyOrThrow(A, Pk, mappedValue).
            create_data_property_or_throw(
                agent,
                a.get(agent),
                PropertyKey::Integer(k),
                mapped_value,
                gc.reborrow(),
            )
            .unbind()?;
        }
        // 13. Perform ? Set(A, "length", 𝔽(len), true).
        set(
            agent,
            a.get(agent),
            BUILTIN_STRING_MEMORY.length.into(),
            Value::from_f64(len as f64),
            true,
            gc.reborrow(),
        )
        .unbind()?;
        // 14. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.1.2.2 Array.isArray ( arg )](https://tc39.es/ecma262/#sec-array.isarray)
    fn is_array<'gc>(
        _agent: &mut Agent,
        _this_value: Value,
        arguments: ArgumentsList,
        _gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Return ? IsArray(arg).
        Ok(is_array(arguments.get(0)).into())
    }

    /// ### [23.1.2.3 Array.of ( ...items )](https://tc39.es/ecma262/#sec-array.of)
    fn of<'gc>(
        agent: &mut Agent,
        this_value: Value,
        items: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let items = items.iter().map(|item| item.unbind()).collect::<Vec<_>>();
        // 1. Let len be the number of elements in items.
        let len = items.len() as u64;
        // 2. Let lenNumber be 𝔽(len).
        let len_number = Value::from_f64(len as f64);
        // 3. Let C be the this value.
        let c = is_constructor(agent, this_value).map(|c| c.scope(agent, gc.nogc()));
        // 4. If IsConstructor(C) is true, then
        //   a. Let A be ? Construct(C, « lenNumber »).
        // 5. Else,
        //   a. Let A be ? ArrayCreate(len).
        let a = create_target(agent, c, &[len_number], len, gc.reborrow())
            .unbind()?
            .scope(agent, gc.nogc());
        // 6. Let k be 0.
        // 7. Repeat, while k < len,
        for (k, item) in (0..).zip(items) {
            // a. Let kValue be items[k].
            // b. Let Pk be ! ToString(𝔽(k)).
            // c. Perform ? CreateDataPropertyOrThrow(A, Pk, kValue).
            create_data_property_or_throw(agent, a.get(agent), PropertyKey::Integer(k), item, gc.reborrow())
                .unbind()?;
        }
        // 8. Perform ? Set(A, "length", lenNumber, true).
        set(
            agent,
            a.get(agent),
            BUILTIN_STRING_MEMORY.length.into(),
            len_number,
            true,
            gc.reborrow(),
        )
        .unbind()?;
        // 9. Return A.
        Ok(a.get(agent).bind(gc.into_nogc()).into())
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let this = intrinsics.array();
        let array_prototype = intrinsics.array_prototype();
        BuiltinFunctionBuilder::new_intrinsic_constructor::<ArrayConstructor>(agent, this, None)
            .with_property_capacity(5)
            .with_builtin_function_property::<ArrayFrom>()
            .with_builtin_function_property::<ArrayIsArray>()
            .with_builtin_function_property::<ArrayOf>()
            .with_prototype_property(array_prototype)
            .with_builtin_function_getter_property::<ArrayGetSpecies>()
            .build();
    }
}

/// The optional mapper of Array.from.
#[derive(Clone, Copy)]
struct Mapping<'scope> {
    mapper: Option<Scoped<'scope, Function<'static>>>,
    this_arg: Scoped<'scope, Value<'static>>,
}

impl Mapping<'_> {
    /// Call(mapper, thisArg, « value, 𝔽(k) »), or `value` itself without a
    /// mapper.
    fn apply<'gc>(
        &self,
        agent: &mut Agent,
        value: Value,
        k: u64,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let Some(mapper) = self.mapper else {
            return Ok(value.unbind().bind(gc.into_nogc()));
        };
        call_function(
            agent,
            mapper.get(agent),
            self.this_arg.get(agent),
            &[value.unbind(), Value::from_f64(k as f64)],
            gc,
        )
    }
}

/// Construct(C, arguments) when C is a constructor, and ArrayCreate(len)
/// otherwise.
fn create_target<'gc>(
    agent: &mut Agent,
    c: Option<Scoped<Function<'static>>>,
    arguments: &[Value],
    len: u64,
    gc: GcScope<'gc, '_>,
) -> JsResult<'gc, Object<'gc>> {
    match c {
        Some(c) => construct(agent, c.get(agent), arguments, None, gc),
        None => Ok(array_create(agent, len, None, gc.into_nogc())?.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        builtins::{Array, create_derived_constructor, create_native_function},
        execution::Options,
        types::{InternalMethods, OrdinaryObject, PropertyValue},
    };

    fn number_elements(agent: &Agent, value: Value) -> Vec<Option<f64>> {
        let Value::Array(array) = value else {
            panic!("expected an array, got {value:?}");
        };
        (0..array.len(agent))
            .map(|k| match array.get_element(agent, k) {
                Some(PropertyValue::Data(Value::Number(n))) => Some(n),
                None => None,
                other => panic!("unexpected element {other:?}"),
            })
            .collect()
    }

    fn call_static(
        agent: &mut Agent,
        name: &str,
        arguments: &[Value<'static>],
        mut gc: GcScope,
    ) -> JsResult<'static, Value<'static>> {
        let array = agent.intrinsics().array();
        let key = crate::ecmascript::types::String::from_str(agent, name, gc.nogc()).unbind();
        let method = get(agent, array.into(), key.into(), gc.reborrow()).unwrap();
        let method = is_callable(method).expect("static method");
        call_function(agent, method.unbind(), array.into(), arguments, gc.reborrow()).unbind()
    }

    #[test]
    fn constructor_handles_lengths_and_elements() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = agent.intrinsics().array();
            let holes = construct(agent, array, &[Value::from_f64(3.0)], None, gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, holes.unbind().into()), [None, None, None]);

            // Called as a function it behaves like `new Array`.
            let elements = call_function(
                agent,
                array,
                Value::Undefined,
                &[Value::from_f64(1.0), Value::from_f64(2.0)],
                gc.reborrow(),
            )
            .unwrap();
            assert_eq!(number_elements(agent, elements.unbind()), [Some(1.0), Some(2.0)]);

            let error = construct(agent, array, &[Value::from_f64(1.5)], None, gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
            let error = construct(agent, array, &[Value::from_f64(-1.0)], None, gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));

            let single = construct(agent, array, &[true.into()], None, gc.reborrow()).unwrap();
            let Object::Array(single) = single else {
                panic!("expected an array");
            };
            assert_eq!(single.unbind().len(agent), 1);
        });
    }

    #[test]
    fn from_iterables_and_array_likes() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let source = Array::from_slice(agent, &[Value::from_f64(1.0), Value::from_f64(2.0)], gc.nogc()).unbind();
            let copy = call_static(agent, "from", &[source.into()], gc.reborrow()).unwrap();
            assert_ne!(copy, Value::from(source));
            assert_eq!(number_elements(agent, copy), [Some(1.0), Some(2.0)]);

            let double = create_native_function(
                agent,
                |_, _, arguments, _| Ok(Value::from_f64(arguments.get(0).as_number().unwrap_or(0.0) * 2.0)),
                "double",
                1,
                gc.nogc(),
            )
            .unbind();
            let doubled = call_static(agent, "from", &[source.into(), double.into()], gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, doubled), [Some(2.0), Some(4.0)]);

            let object_prototype = agent.intrinsics().object_prototype();
            let array_like = OrdinaryObject::create(agent, Some(object_prototype.into()), gc.nogc()).unbind();
            array_like.set_data_property(agent, BUILTIN_STRING_MEMORY.length.into(), Value::from_f64(2.0));
            array_like.set_data_property(agent, PropertyKey::from(1u32), Value::from_f64(5.0));
            let from_array_like = call_static(agent, "from", &[array_like.into()], gc.reborrow()).unwrap();
            let Value::Array(from_array_like) = from_array_like else {
                panic!("expected an array");
            };
            assert_eq!(from_array_like.len(agent), 2);
            assert_eq!(
                from_array_like.get_element(agent, 0),
                Some(PropertyValue::Data(Value::Undefined))
            );

            let error = call_static(agent, "from", &[source.into(), Value::from_f64(1.0)], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn of_and_is_array() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let of = call_static(agent, "of", &[Value::from_f64(7.0)], gc.reborrow()).unwrap();
            assert_eq!(number_elements(agent, of), [Some(7.0)]);
            let is_array = call_static(agent, "isArray", &[of], gc.reborrow()).unwrap();
            assert_eq!(is_array, true.into());
            let prototype = agent.intrinsics().array_prototype();
            let is_array = call_static(agent, "isArray", &[prototype.into()], gc.reborrow()).unwrap();
            assert_eq!(is_array, false.into());
        });
    }

    #[test]
    fn species_follows_derived_constructors() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = agent.intrinsics().array();
            let sub = create_derived_constructor(agent, array, "SubArray", gc.nogc()).unbind();
            let instance = construct(agent, sub, &[Value::from_f64(1.0), Value::from_f64(2.0)], None, gc.reborrow())
                .unwrap()
                .unbind();
            let sub_prototype = get(agent, sub.into(), BUILTIN_STRING_MEMORY.prototype.into(), gc.reborrow())
                .unwrap()
                .unbind();
            assert_eq!(instance.internal_get_prototype_of(agent).map(Value::from), Some(sub_prototype));

            let slice = crate::ecmascript::types::String::from_str(agent, "slice", gc.nogc()).unbind();
            let sliced = crate::ecmascript::abstract_operations::operations_on_objects::invoke(
                agent,
                instance.into(),
                slice.into(),
                &[],
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            let Value::Array(sliced) = sliced else {
                panic!("expected an array");
            };
            let sliced_prototype = Object::from(sliced).internal_get_prototype_of(agent).map(Value::from);
            assert_eq!(sliced_prototype, Some(sub_prototype));
            assert_eq!(sliced.len(agent), 2);
        });
    }
}
