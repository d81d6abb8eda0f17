// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{cell::Cell, rc::Rc};

use tessera_vm::{
    ecmascript::{
        abstract_operations::operations_on_objects::{
            construct, get, invoke, length_of_array_like, set,
        },
        builtins::{Array, TypedArray, create_derived_constructor, create_native_function},
        execution::{Agent, ExceptionType, JsResult, Options},
        types::{
            BUILTIN_STRING_MEMORY, ElementType, InternalMethods, Object, OrdinaryObject,
            PropertyKey, String, Value,
        },
    },
    engine::{Bindable, GcScope, NoGcScope},
};

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

fn typed_array_from(
    agent: &mut Agent,
    element_type: ElementType,
    values: &[f64],
    mut gc: GcScope,
) -> TypedArray<'static> {
    let elements = values.iter().map(|n| Value::from_f64(*n)).collect::<Vec<_>>();
    let source = Array::from_slice(agent, &elements, gc.nogc()).unbind();
    let constructor = agent.intrinsics().typed_array_constructor(element_type);
    let result = call_method(agent, constructor, "from", &[source.into()], gc.reborrow()).unwrap();
    TypedArray::try_from(result).unwrap()
}

fn numbers(agent: &mut Agent, o: TypedArray, gc: NoGcScope) -> Vec<f64> {
    let mut result = Vec::with_capacity(o.length(agent));
    for k in 0..o.length(agent) {
        let value = o.get_element(agent, k as i64, gc).unwrap();
        result.push(value.as_number().unwrap());
    }
    result
}

fn array_values(agent: &mut Agent, value: Value, mut gc: GcScope) -> Vec<Value<'static>> {
    let o = Object::try_from(value).unwrap().unbind();
    let len = length_of_array_like(agent, o, gc.reborrow()).unwrap();
    (0..len as u32)
        .map(|k| get(agent, o, PropertyKey::from(k), gc.reborrow()).unwrap().unbind())
        .collect()
}

fn prototype_of(agent: &Agent, value: Value) -> Option<Object<'static>> {
    Object::try_from(value).unwrap().internal_get_prototype_of(agent)
}

#[test]
fn set_writes_source_at_offset() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let target = typed_array_from(agent, ElementType::Int8, &[1.0, 2.0, 3.0], gc.reborrow());
        let source = typed_array_from(agent, ElementType::Int8, &[10.0, 20.0], gc.reborrow());
        let result = call_method(
            agent,
            target,
            "set",
            &[source.into(), Value::from_f64(1.0)],
            gc.reborrow(),
        )
        .unwrap();
        assert!(result.is_undefined());
        assert_eq!(numbers(agent, target, gc.nogc()), [1.0, 10.0, 20.0]);
    });
}

#[test]
fn copy_within_shifts_left() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let float64 = agent.intrinsics().typed_array_constructor(ElementType::Float64);
        let source = Array::from_slice(
            agent,
            &[Value::from_f64(1.0), Value::from_f64(2.0), Value::from_f64(3.0)],
            gc.nogc(),
        )
        .unbind();
        let o = construct(agent, float64, &[source.into()], None, gc.reborrow())
            .unwrap()
            .unbind();
        let o = TypedArray::try_from(o).unwrap();
        call_method(
            agent,
            o,
            "copyWithin",
            &[Value::from_f64(0.0), Value::from_f64(1.0)],
            gc.reborrow(),
        )
        .unwrap();
        assert_eq!(numbers(agent, o, gc.nogc()), [2.0, 3.0, 3.0]);
    });
}

#[test]
fn join_renders_holes_as_empty() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let array = agent.intrinsics().array();
        let o = construct(agent, array, &[Value::from_f64(3.0)], None, gc.reborrow())
            .unwrap()
            .unbind();
        set(agent, o, PropertyKey::from(0u32), Value::from_f64(1.0), true, gc.reborrow()).unwrap();
        set(agent, o, PropertyKey::from(2u32), Value::from_f64(3.0), true, gc.reborrow()).unwrap();
        let separator = String::from_str(agent, "-", gc.nogc()).unbind();
        let result = call_method(agent, o, "join", &[separator.into()], gc.reborrow()).unwrap();
        let result = String::try_from(result).unwrap();
        assert_eq!(result.as_str(agent), "1--3");
    });
}

#[test]
fn sort_with_comparator() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let compare = create_native_function(
            agent,
            |_, _, arguments, _| {
                let a = arguments.get(0).as_number().unwrap_or(f64::NAN);
                let b = arguments.get(1).as_number().unwrap_or(f64::NAN);
                Ok(Value::from_f64(a - b))
            },
            "compare",
            2,
            gc.nogc(),
        )
        .unbind();
        let elements = [5.0, 3.0, 4.0, 1.0, 2.0].map(Value::from_f64);
        let o = Array::from_slice(agent, &elements, gc.nogc()).unbind();
        let result = call_method(agent, o, "sort", &[compare.into()], gc.reborrow()).unwrap();
        assert_eq!(result, Value::from(o));
        let sorted = array_values(agent, result, gc.reborrow());
        assert_eq!(sorted, [1.0, 2.0, 3.0, 4.0, 5.0].map(Value::from_f64));
    });
}

/// A host function that detaches the buffer of `o` on its first call and
/// then returns `result`. `calls` counts how often it ran.
fn detaching_callback(
    agent: &mut Agent,
    o: TypedArray,
    result: Value<'static>,
    calls: Rc<Cell<u32>>,
    gc: NoGcScope,
) -> Value<'static> {
    let buffer = o.viewed_array_buffer(agent).unbind();
    let callback = create_native_function(
        agent,
        move |agent, _, _, gc| {
            calls.set(calls.get() + 1);
            if !buffer.is_detached(agent) {
                buffer.detach(agent, gc.into_nogc())?;
            }
            Ok(result)
        },
        "detach",
        2,
        gc,
    )
    .unbind();
    callback.into()
}

#[test]
fn sort_comparator_detaching_the_buffer_throws_type_error() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        for method in ["sort", "toSorted"] {
            let o = typed_array_from(agent, ElementType::Float64, &[3.0, 1.0, 2.0], gc.reborrow());
            let calls = Rc::new(Cell::new(0));
            let compare = detaching_callback(agent, o, Value::from_f64(-1.0), calls.clone(), gc.nogc());
            let error = call_method(agent, o, method, &[compare], gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError), "{method}");
            assert_eq!(calls.get(), 1, "{method}");
            assert!(o.is_out_of_bounds(agent));
            assert_eq!(o.length(agent), 0);
        }
    });
}

#[test]
fn iteration_callback_detaching_the_buffer_throws_type_error() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        for method in ["forEach", "map", "filter", "some", "every", "find", "findLastIndex", "reduce"] {
            let o = typed_array_from(agent, ElementType::Float64, &[5.0, 6.0, 7.0], gc.reborrow());
            let calls = Rc::new(Cell::new(0));
            let callback = detaching_callback(agent, o, Value::from(true), calls.clone(), gc.nogc());
            let arguments = if method == "reduce" {
                vec![callback, Value::from_f64(0.0)]
            } else {
                vec![callback]
            };
            let error = call_method(agent, o, method, &arguments, gc.reborrow()).unwrap_err();
            assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError), "{method}");
            assert_eq!(calls.get(), 1, "{method}");
        }
    });
}

#[test]
fn to_reversed_twice_is_identity() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let elements = [4.0, -1.0, 9.5, 0.0].map(Value::from_f64);
        let o = Array::from_slice(agent, &elements, gc.nogc()).unbind();
        let once = call_method(agent, o, "toReversed", &[], gc.reborrow()).unwrap();
        let twice = call_method(agent, once, "toReversed", &[], gc.reborrow()).unwrap();
        assert_ne!(once, Value::from(o));
        assert_eq!(array_values(agent, twice, gc.reborrow()), elements);

        let t = typed_array_from(agent, ElementType::Uint16, &[7.0, 8.0, 9.0], gc.reborrow());
        let once = call_method(agent, t, "toReversed", &[], gc.reborrow()).unwrap();
        let once = TypedArray::try_from(once).unwrap();
        assert_eq!(numbers(agent, once, gc.nogc()), [9.0, 8.0, 7.0]);
        let twice = call_method(agent, once, "toReversed", &[], gc.reborrow()).unwrap();
        let twice = TypedArray::try_from(twice).unwrap();
        assert_eq!(numbers(agent, twice, gc.nogc()), [7.0, 8.0, 9.0]);
    });
}

#[test]
fn subclass_species_for_map_but_not_to_sorted() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let int32 = agent.intrinsics().typed_array_constructor(ElementType::Int32);
        let sub = create_derived_constructor(agent, int32, "Sub", gc.nogc()).unbind();
        let source = Array::from_slice(
            agent,
            &[Value::from_f64(3.0), Value::from_f64(1.0), Value::from_f64(2.0)],
            gc.nogc(),
        )
        .unbind();
        let o = construct(agent, sub, &[source.into()], None, gc.reborrow())
            .unwrap()
            .unbind();
        let sub_prototype = get(
            agent,
            sub.into(),
            BUILTIN_STRING_MEMORY.prototype.into(),
            gc.reborrow(),
        )
        .unwrap()
        .unbind();
        let sub_prototype = Object::try_from(sub_prototype).unwrap();
        assert_eq!(prototype_of(agent, o.into()), Some(sub_prototype));

        let double = create_native_function(
            agent,
            |_, _, arguments, _| {
                let n = arguments.get(0).as_number().unwrap_or(f64::NAN);
                Ok(Value::from_f64(n * 2.0))
            },
            "double",
            1,
            gc.nogc(),
        )
        .unbind();
        let mapped = call_method(agent, o, "map", &[double.into()], gc.reborrow()).unwrap();
        assert_eq!(prototype_of(agent, mapped), Some(sub_prototype));
        let mapped = TypedArray::try_from(mapped).unwrap();
        assert_eq!(numbers(agent, mapped, gc.nogc()), [6.0, 2.0, 4.0]);

        let sorted = call_method(agent, o, "toSorted", &[], gc.reborrow()).unwrap();
        let int32_prototype = agent.intrinsics().typed_array_prototype_of(ElementType::Int32);
        assert_eq!(prototype_of(agent, sorted), Some(int32_prototype.into()));
        let sorted = TypedArray::try_from(sorted).unwrap();
        assert_eq!(numbers(agent, sorted, gc.nogc()), [1.0, 2.0, 3.0]);
    });
}

fn detaching_value_of(agent: &mut Agent, o: TypedArray, mut gc: GcScope) -> Value<'static> {
    let buffer = o.viewed_array_buffer(agent).unbind();
    let value_of = create_native_function(
        agent,
        move |agent, _, _, gc| {
            buffer.detach(agent, gc.into_nogc())?;
            Ok(Value::from_f64(1.0))
        },
        "valueOf",
        0,
        gc.nogc(),
    )
    .unbind();
    let object_prototype = agent.intrinsics().object_prototype();
    let value = OrdinaryObject::create(agent, Some(object_prototype.into()), gc.nogc()).unbind();
    set(
        agent,
        value.into(),
        BUILTIN_STRING_MEMORY.valueOf.into(),
        value_of.into(),
        true,
        gc.reborrow(),
    )
    .unwrap();
    value.into()
}

#[test]
fn detaching_during_coercion_throws_type_error() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let o = typed_array_from(agent, ElementType::Uint8, &[1.0, 2.0, 3.0, 4.0], gc.reborrow());
        let value = detaching_value_of(agent, o, gc.reborrow());
        let error = call_method(agent, o, "fill", &[value], gc.reborrow()).unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
        assert!(o.viewed_array_buffer(agent).is_detached(agent));

        let o = typed_array_from(agent, ElementType::Float32, &[1.0, 2.0, 3.0], gc.reborrow());
        let value = detaching_value_of(agent, o, gc.reborrow());
        let error = call_method(
            agent,
            o,
            "copyWithin",
            &[Value::from_f64(0.0), value],
            gc.reborrow(),
        )
        .unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));

        let o = typed_array_from(agent, ElementType::Int16, &[1.0, 2.0, 3.0], gc.reborrow());
        let value = detaching_value_of(agent, o, gc.reborrow());
        let error = call_method(agent, o, "slice", &[value], gc.reborrow()).unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
    });
}

#[test]
fn detached_views_report_out_of_bounds() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let o = typed_array_from(agent, ElementType::Int32, &[1.0, 2.0], gc.reborrow());
        assert!(!o.is_out_of_bounds(agent));
        o.viewed_array_buffer(agent).detach(agent, gc.nogc()).unwrap();
        assert!(o.is_out_of_bounds(agent));
        assert_eq!(o.length(agent), 0);
        assert!(o.get_element(agent, 0, gc.nogc()).is_none());
        let error = call_method(agent, o, "at", &[Value::from_f64(0.0)], gc.reborrow()).unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::TypeError));
    });
}

#[test]
fn array_length_limits_are_enforced() {
    let mut agent = Agent::new(Options::default());
    agent.run(|agent, mut gc| {
        let array = agent.intrinsics().array();
        let error = construct(agent, array, &[Value::from_f64(-1.0)], None, gc.reborrow())
            .unbind()
            .unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
        let error = construct(agent, array, &[Value::from_f64(1.5)], None, gc.reborrow())
            .unbind()
            .unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));

        let o = Array::from_slice(agent, &[Value::from_f64(1.0)], gc.nogc()).unbind();
        let error = call_method(agent, o, "with", &[Value::from_f64(5.0), Value::from_f64(0.0)], gc.reborrow())
            .unwrap_err();
        assert_eq!(agent.exception_type(error), Some(ExceptionType::RangeError));
    });
}

#[test]
fn sparse_arrays_become_dictionaries() {
    let mut agent = Agent::new(Options {
        sparse_array_threshold: 8,
        ..Options::default()
    });
    agent.run(|agent, mut gc| {
        let o = Array::from_slice(agent, &[Value::from_f64(1.0)], gc.nogc()).unbind();
        assert!(!o.is_dictionary(agent));
        set(
            agent,
            o.into(),
            PropertyKey::from(1000u32),
            Value::from_f64(2.0),
            true,
            gc.reborrow(),
        )
        .unwrap();
        assert!(o.is_dictionary(agent));
        assert_eq!(o.len(agent), 1001);
        let index = call_method(agent, o, "indexOf", &[Value::from_f64(2.0)], gc.reborrow()).unwrap();
        assert_eq!(index, Value::from_f64(1000.0));
    });
}
