// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ArrayIterator, CollectionIteratorKind};
use crate::{
    ecmascript::{
        abstract_operations::{
            operations_on_iterator_objects::create_iter_result_object,
            operations_on_objects::{get, length_of_array_like},
            type_conversion::create_array_from_list,
        },
        builders::OrdinaryObjectBuilder,
        builtins::{ArgumentsList, Behaviour, Builtin, typed_array::TypedArray},
        execution::{Agent, ExceptionType, JsResult},
        types::{Object, PropertyKey, String, Value, WellKnownSymbol},
    },
    engine::{
        Scopable,
        context::{Bindable, GcScope, NoGcScope},
    },
};

pub(crate) struct ArrayIteratorPrototype;

struct ArrayIteratorPrototypeNext;
impl Builtin for ArrayIteratorPrototypeNext {
    const NAME: &'static str = "next";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayIteratorPrototype::next);
}

struct ArrayIteratorPrototypeIterator;
impl Builtin for ArrayIteratorPrototypeIterator {
    const NAME: &'static str = "[Symbol.iterator]";
    const KEY: Option<PropertyKey<'static>> = Some(PropertyKey::Symbol(WellKnownSymbol::Iterator));
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayIteratorPrototype::iterator);
}

impl ArrayIteratorPrototype {
    /// ### [23.1.5.2.1 %ArrayIteratorPrototype%.next ( )](https://tc39.es/ecma262/#sec-%arrayiteratorprototype%.next)
    fn next<'gc>(
        agent: &mut Agent,
        this_value: Value,
        _arguments: ArgumentsList,
        mut gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 27.5.3.2 GeneratorValidate ( generator, brand )
        // 3. If generator.[[GeneratorBrand]] is not brand, throw a TypeError exception.
        let Value::ArrayIterator(iterator) = this_value else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "ArrayIterator expected",
                gc.into_nogc(),
            ));
        };
        let mut iterator = iterator.unbind();
        // 23.1.5.1 CreateArrayIterator ( array, kind ), step 1. b
        // NOTE: We set `array` to None when the generator in the spec text
        //       has returned.
        let Some(array) = agent[iterator].array else {
            return Ok(create_iter_result_object(agent, Value::Undefined, true, gc.into_nogc()).into());
        };
        let index = agent[iterator].next_index;
        // i. If array has a [[TypedArrayName]] internal slot, then
        let len = if let Ok(typed_array) = TypedArray::try_from(array) {
            // 1. Let taRecord be MakeTypedArrayWithBufferWitnessRecord(array, seq-cst).
            // 2. If IsTypedArrayOutOfBounds(taRecord) is true, throw a TypeError exception.
            if typed_array.is_out_of_bounds(agent) {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "TypedArray out of bounds",
                    gc.into_nogc(),
                ));
            }
            // 3. Let len be TypedArrayLength(taRecord).
            typed_array.length(agent) as u64
        } else if let Object::Array(array) = array {
            array.len(agent) as u64
        } else {
            // ii. Else,
            //   1. Let len be ? LengthOfArrayLike(array).
            let scoped_iterator = iterator.scope(agent, gc.nogc());
            let len = length_of_array_like(agent, array, gc.reborrow()).unbind()?;
            iterator = scoped_iterator.get(agent);
            len
        };
        // iii. If index ≥ len, return NormalCompletion(undefined).
        if index >= len {
            agent[iterator].array = None;
            return Ok(create_iter_result_object(agent, Value::Undefined, true, gc.into_nogc()).into());
        }
        // iv. Let indexNumber be 𝔽(index).
        // viii. Set index to index + 1.
        agent[iterator].next_index = index + 1;
        let index_number = Value::from_f64(index as f64);
        let result = match agent[iterator].kind {
            // v. If kind is key, then
            //   1. Let result be indexNumber.
            CollectionIteratorKind::Key => index_number,
            // vi. Else,
            //   1. Let elementKey be ! ToString(indexNumber).
            //   2. Let elementValue be ? Get(array, elementKey).
            //   3. If kind is value, then
            //     a. Let result be elementValue.
            CollectionIteratorKind::Value => {
                get(agent, array, PropertyKey::from(index), gc.reborrow()).unbind()?
            }
            //   4. Else,
            //     a. Assert: kind is key+value.
            //     b. Let result be CreateArrayFromList(« indexNumber, elementValue »).
            CollectionIteratorKind::KeyAndValue => {
                let element_value =
                    get(agent, array, PropertyKey::from(index), gc.reborrow()).unbind()?;
                create_array_from_list(agent, &[index_number, element_value], gc.nogc())
                    .unbind()
                    .into()
            }
        };
        // vii. Perform ? GeneratorYield(CreateIteratorResultObject(result, false)).
        Ok(create_iter_result_object(agent, result, false, gc.into_nogc()).into())
    }

    /// ### [27.1.4.1 %IteratorPrototype% \[ %Symbol.iterator% \] ( )](https://tc39.es/ecma262/#sec-%iteratorprototype%-%symbol.iterator%)
    fn iterator<'gc>(
        _agent: &mut Agent,
        this_value: Value,
        _arguments: ArgumentsList,
        gc: GcScope<'gc, '_>,
    ) -> JsResult<'gc, Value<'gc>> {
        // 1. Return the this value.
        Ok(this_value.bind(gc.into_nogc()))
    }

    pub(crate) fn create_intrinsic(agent: &mut Agent) {
        let intrinsics = agent.intrinsics();
        let this = intrinsics.array_iterator_prototype();
        let object_prototype = intrinsics.object_prototype();
        let to_string_tag = String::from_str(agent, "Array Iterator", NoGcScope::intrinsic()).unbind();
        OrdinaryObjectBuilder::new_intrinsic_object(agent, this)
            .with_property_capacity(3)
            .with_prototype(object_prototype)
            .with_builtin_function_property::<ArrayIteratorPrototypeNext>()
            .with_builtin_function_property::<ArrayIteratorPrototypeIterator>()
            .with_data_property(WellKnownSymbol::ToStringTag.into(), to_string_tag.into())
            .build();
    }
}

/// Create a fresh iterator over `array` with the given kind.
pub(crate) fn create_array_iterator<'gc>(
    agent: &mut Agent,
    array: Object,
    kind: CollectionIteratorKind,
    gc: NoGcScope<'gc, '_>,
) -> Value<'gc> {
    ArrayIterator::from_object(agent, array, kind, gc).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::{
        abstract_operations::operations_on_objects::{call_function, invoke},
        builtins::Array,
        execution::Options,
        types::BUILTIN_STRING_MEMORY,
    };

    fn step(agent: &mut Agent, iterator: Value<'static>, gc: GcScope) -> (Value<'static>, bool) {
        let mut gc = gc;
        let next = BUILTIN_STRING_MEMORY.next.into();
        let result = invoke(agent, iterator, next, &[], gc.reborrow()).unwrap().unbind();
        let result = Object::try_from(result).unwrap();
        let value = get(agent, result, BUILTIN_STRING_MEMORY.value.into(), gc.reborrow())
            .unwrap()
            .unbind();
        let done = get(agent, result, BUILTIN_STRING_MEMORY.done.into(), gc.reborrow())
            .unwrap()
            .unbind();
        (value, done == Value::Boolean(true))
    }

    #[test]
    fn iterates_keys_values_and_entries() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = Array::from_slice(agent, &[Value::Number(7.0), Value::Number(8.0)], gc.nogc()).unbind();
            let keys = create_array_iterator(agent, array.into(), CollectionIteratorKind::Key, gc.nogc()).unbind();
            assert_eq!(step(agent, keys, gc.reborrow()), (Value::Number(0.0), false));
            assert_eq!(step(agent, keys, gc.reborrow()), (Value::Number(1.0), false));
            assert_eq!(step(agent, keys, gc.reborrow()), (Value::Undefined, true));

            let values = create_array_iterator(agent, array.into(), CollectionIteratorKind::Value, gc.nogc()).unbind();
            assert_eq!(step(agent, values, gc.reborrow()), (Value::Number(7.0), false));

            let entries =
                create_array_iterator(agent, array.into(), CollectionIteratorKind::KeyAndValue, gc.nogc()).unbind();
            let (entry, done) = step(agent, entries, gc.reborrow());
            assert!(!done);
            let entry = Array::try_from(entry).unwrap();
            assert_eq!(entry.as_slice(agent).unwrap(), &[Some(Value::Number(0.0)), Some(Value::Number(7.0))]);
        });
    }

    #[test]
    fn exhausted_iterators_stay_done() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let array = Array::from_slice(agent, &[Value::Number(1.0)], gc.nogc()).unbind();
            let values = create_array_iterator(agent, array.into(), CollectionIteratorKind::Value, gc.nogc()).unbind();
            assert_eq!(step(agent, values, gc.reborrow()), (Value::Number(1.0), false));
            assert_eq!(step(agent, values, gc.reborrow()), (Value::Undefined, true));
            // Growing the array after exhaustion does not revive the iterator.
            array.set_element(agent, 1, Value::Number(2.0));
            assert_eq!(step(agent, values, gc.reborrow()), (Value::Undefined, true));
        });
    }

    #[test]
    fn next_requires_an_array_iterator() {
        let mut agent = Agent::new(Options::default());
        agent.run(|agent, mut gc| {
            let prototype = agent.intrinsics().array_iterator_prototype();
            let next = get(agent, prototype.into(), BUILTIN_STRING_MEMORY.next.into(), gc.reborrow())
                .unwrap()
                .unbind();
            let next = crate::ecmascript::builtins::Function::try_from(next).unwrap();
            let error = call_function(agent, next, Value::Number(1.0), &[], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        });
    }
}
