// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.2.1 The %TypedArray% Intrinsic Object](https://tc39.es/ecma262/#sec-%typedarray%-intrinsic-object)

use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_iterator_objects::{get_iterator_from_method, iterator_to_list},
            operations_on_objects::{call_function, get, get_method, length_of_array_like},
            testing_and_comparison::{is_callable, is_constructor},
            type_conversion::to_object,
        },
        builders::BuiltinFunctionBuilder,
        builtins::{
            ArgumentsList, Behaviour, Builtin, BuiltinGetter,
            structured_data::array_buffer_objects::array_buffer_constructor::ArrayBufferConstructor,
        },
        execution::{Agent, ExceptionType, JsResult},
        types::{Object, PropertyKey, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope},
    },
};

use super::abstract_operations::typed_array_create_from_constructor;

pub(crate) struct TypedArrayIntrinsicObject;
impl Builtin for TypedArrayIntrinsicObject {
    const NAME: &'static str = "TypedArray";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(Self::constructor);
}

struct TypedArrayFrom;
impl Builtin for TypedArrayFrom {
    const NAME: &'static str = "from";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayIntrinsicObject::from);
}

struct TypedArrayOf;
impl Builtin for TypedArrayOf {
    const NAME: &'static str = "of";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(TypedArrayIntrinsicObject::of);
}

struct TypedArrayGetSpecies;
impl Builtin for TypedArrayGetSpecies {
    const NAME: &'static str = "get [Symbol.species]";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::Symbol(WellKnownSymbol::Species));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayBufferConstructor::get_species);
}
impl BuiltinGetter for TypedArrayGetSpecies {
    const GETTER_KEY: PropertyKey<'static> = PropertyKey::Symbol(WellKnownSymbol::Species);
}

impl TypedArrayIntrinsicObject {
    /// ### [23.2.1.1 %TypedArray% ( )](https://tc39.es/ecma262/#sec-%typedarray%)
    fn constructor<'gc>(
        agent: &mut Agent,
        _this_value: Value,
        _arguments: ArgumentsList,
        _new_target: Option<Object>,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Throw a TypeError exception.
        Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Abstract class TypedArray not directly constructable",
            gc.into_nogc(),
        ))
    }

    /// ### [23.2.2.1 %TypedArray%.from ( source \[ , mapper \[ , thisArg \] \] )](https://tc39.es/ecma262/#sec-%typedarray%.from)
    fn from<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        let source = arguments.get(0).scope(agent, gc.nogc());
        let mapper = arguments.get(1);
        let this_arg = arguments.get(2).scope(agent, gc.nogc());
        // 1. Let C be the this value.
        // 2. If IsConstructor(C) is false, throw a TypeError exception.
        let Some(c) = is_constructor(agent, this_value) else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "TypedArray.from called on a non-constructor",
                gc.into_nogc(),
            ));
        };
        let c = c.scope(agent, gc.nogc());
        // 3. If mapper is undefined, let mapping be false.
        // 4. Else,
        //   a. If IsCallable(mapper) is false, throw a TypeError exception.
        //   b. Let mapping be true.
        let mapper = if mapper.is_undefined() {
            None
        } else if let Some(mapper) = is_callable(mapper) {
            Some(mapper.scope(agent, gc.nogc()))
        } else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "TypedArray.from mapper is not callable",
                gc.into_nogc(),
            ));
        };
        // 5. Let usingIterator be ? GetMethod(source, %Symbol.iterator%).
        let using_iterator = get_method(
            agent,
            source.get(agent),
            PropertyKey::Symbol(WellKnownSymbol::Iterator),
            gc.reborrow(),
        )
        .unbind()?;
        // 6. If usingIterator is not undefined, then
        if let Some(using_iterator) = using_iterator {
            // a. Let values be ? IteratorToList(? GetIteratorFromMethod(source, usingIterator)).
            let iterator_record =
                get_iterator_from_method(agent, source.get(agent), using_iterator, gc.reborrow())
                    .unbind()?;
            let values = iterator_to_list(agent, iterator_record, gc.reborrow()).unbind()?;
            // b. Let len be the number of elements in values.
            let len = values.len();
            // c. Let targetObj be ? TypedArrayCreateFromConstructor(C, « 𝔽(len) »).
            let target_obj = typed_array_create_from_constructor(
                agent,
                c.get(agent),
                &[Value::from_f64(len as f64)],
                Some(len),
                gc.reborrow(),
            )
            .unbind()?
            .scope(agent, gc.nogc());
            // d. Let k be 0.
            // e. Repeat, while k < len,
            for (k, k_value) in values.into_iter().enumerate() {
                // iii. If mapping is true, then
                //   1. Let mappedValue be ? Call(mapper, thisArg, « kValue, 𝔽(k) »).
                // iv. Else, let mappedValue be kValue.
                let mapped_value = match mapper {
                    Some(mapper) => call_function(
                        agent,
                        mapper.get(agent),
                        this_arg.get(agent),
                        &[k_value, Value::from_f64(k as f64)],
                        gc.reborrow(),
                    )
                    .unbind()?,
                    None => k_value,
                };
                // v. Perform ? Set(targetObj, Pk, mappedValue, true).
                target_obj
                    .get(agent)
                    .set_element(agent, k as i64, mapped_value, gc.reborrow())
                    .unbind()?;
            }
            // g. Return targetObj.
            return Ok(target_obj.get(agent).bind(gc.into_nogc()).into());
        }
        // 7. NOTE: source is not an iterable object, so assume it is already
        //    an array-like object.
        // 8. Let arrayLike be ! ToObject(source).
        let array_like = to_object(agent, source.get(agent), gc.nogc())
            .unbind()?
            .scope(agent, gc.nogc());
        // 9. Let len be ? LengthOfArrayLike(arrayLike).
        let len = length_of_array_like(agent, array_like.get(agent), gc.reborrow()).unbind()?;
        let Ok(len) = usize::try_from(len) else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Invalid typed array length",
                gc.into_nogc(),
            ));
        };
        // 10. Let targetObj be ? TypedArrayCreateFromConstructor(C, « 𝔽(len) »).
        let target_obj = typed_array_create_from_constructor(
            agent,
            c.get(agent),
            &[Value::from_f64(len as f64)],
            Some(len),
            gc.reborrow(),
        )
        .unbind()?
        .scope(agent, gc.nogc());
        // 11. Let k be 0.
        // 12. Repeat, while k < len,
        for k in 0..len {
            // b. Let kValue be ? Get(arrayLike, Pk).
            let k_value = get(
                agent,
                array_like.get(agent),
                PropertyKey::from(k as u64),
                gc.reborrow(),
            )
            .unbind()?;
            // c. If mapping is true, then
            //   i. Let mappedValue be ? Call(mapper, thisArg, « kValue, 𝔽(k) »).
            let mapped_value = match mapper {
                Some(mapper) => call_function(
                    agent,
                    mapper.get(agent),
                    this_arg.get(agent),
                    &[k_value, Value::from_f64(k as f64)],
                    gc.reborrow(),
                )
                .unbind()?,
                None => k_value,
            };
            // e. Perform ? Set(targetObj, Pk, mappedValue, true).
            target_obj
                .get(agent)
                .set_element(agent, k as i64, mapped_value, gc.reborrow())
                .unbind()?;
        }
        // 13. Return targetObj.
        Ok(target_obj.get(agent).bind(gc.into_nogc()).into())
    }

    /// ### [23.2.2.2 %TypedArray%.of ( ...items )](https://tc39.es/ecma262/#sec-%typedarray%.of)
    fn of<'gc>(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Let len be the number of elements in items.
        let items = arguments.iter().map(|item| item.unbind()).collect::<Vec<_>>();
        let len = items.len();
        // 2. Let C be the this value.
        // 3. If IsConstructor(C) is false, throw a TypeError exception.
        let Some(c) = is_constructor(agent, this_value) else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "TypedArray.of called on a non-constructor",
                gc.into_nogc(),
            ));
        };
        // 4. Let newObj be ? TypedArrayCreateFromConstructor(C, « 𝔽(len) »).
        let new_obj = typed_array_create_from_constructor(
            agent,
            c,
            &[Value::from_f64(len as f64)],
            Some(len),
            gc.reborrow(),
        )
        .unbind()?
        .scope(agent, gc.nogc());
        // 5. Let k be 0.
        // 6. Repeat, while k < len,
        for (k, k_value) in items.into_iter().enumerate() {
            // c. Perform ? Set(newObj, Pk, kValue, true).
            new_obj
                .get(agent)
                .set_element(agent, k as i64, k_value, gc.reborrow())
                .unbind()?;
        }
        // 7. Return newObj.
        Ok(new_obj.get(agent).bind(gc.into_nogc()).into())
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let this = intrinsics.typed_array();
        let typed_array_prototype = intrinsics.typed_array_prototype();
        BuiltinFunctionBuilder::new_intrinsic_constructor::<TypedArrayIntrinsicObject>(agent, this, None)
            .with_property_capacity(4)
            .with_builtin_function_property::<TypedArrayFrom>()
            .with_builtin_function_property::<TypedArrayOf>()
            .with_prototype_property(typed_array_prototype)
            .with_builtin_function_getter_property::<TypedArrayGetSpecies>()
            .build();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::{call_function, construct, invoke},
        builtins::{Array, TypedArray, create_native_function},
        execution::Options,
        types::{ElementType, ElementValue, String},
    };

    #[test]
    fn typed_array_is_abstract() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let typed_array = agent.intrinsics().typed_array();
            let error = construct(agent, typed_array, &[], None, gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }

    #[test]
    fn from_maps_iterables_and_array_likes() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let uint8 = agent.intrinsics().typed_array_constructor(ElementType::Uint8);
            let double = create_native_function(
                agent,
                |_, _, arguments, _| Ok(Value::from_f64(arguments.get(0).as_number().unwrap_or(0.0) * 2.0)),
                "double",
                1,
                gc.nogc(),
            )
            .unbind();
            let values = [Value::from_f64(1.0), Value::from_f64(2.0), Value::from_f64(200.0)];
            let array = Array::from_slice(agent, &values, gc.nogc()).unbind();
            let from = String::from_str(agent, "from", gc.nogc()).unbind();
            let result = invoke(
                agent,
                uint8.into(),
                from.into(),
                &[array.into(), double.into()],
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            let result = TypedArray::try_from(result).unwrap();
            assert_eq!(result.element_type(), ElementType::Uint8);
            assert_eq!(result.length(agent), 3);
            assert_eq!(result.get_element_value(agent, 0), Some(ElementValue::Number(2.0)));
            assert_eq!(result.get_element_value(agent, 2), Some(ElementValue::Number(144.0)));

            let of = String::from_str(agent, "of", gc.nogc()).unbind();
            let result = invoke(
                agent,
                uint8.into(),
                of.into(),
                &[Value::from_f64(7.0), Value::from_f64(8.0)],
                gc.reborrow(),
            )
            .unwrap()
            .unbind();
            let result = TypedArray::try_from(result).unwrap();
            assert_eq!(result.length(agent), 2);
            assert_eq!(result.get_element_value(agent, 1), Some(ElementValue::Number(8.0)));
        });
    }

    #[test]
    fn from_requires_a_constructor_receiver() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let error = TypedArrayIntrinsicObject::from(
                agent,
                Value::Undefined,
                ArgumentsList::from_slice(&[]),
                gc.reborrow(),
            )
            .unbind()
            .unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
            let typed_array = agent.intrinsics().typed_array();
            let error = call_function(agent, typed_array, Value::Undefined, &[], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }
}
