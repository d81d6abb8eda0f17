// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{cell::RefCell, rc::Rc};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tessera_vm::{
    ecmascript::{
        abstract_operations::operations_on_objects::{
            delete_property_or_throw, get, has_property, invoke, length_of_array_like,
        },
        builtins::{Array, create_native_function},
        execution::{Agent, JsResult, Options},
        types::{Object, PropertyKey, String, Value},
    },
    engine::{Bindable, GcScope},
};

#[derive(Debug, Clone)]
enum Op {
    Reverse,
    Sort,
    ToSorted,
    Fill(f64, f64, f64),
    CopyWithin(f64, f64, f64),
    IndexOf(f64, f64),
    LastIndexOf(f64),
    Includes(f64),
    Slice(f64, f64),
    Splice(f64, f64, Vec<f64>),
    Push(f64),
    Pop,
    Shift,
    Unshift(f64),
    Join,
    At(f64),
    With(f64, f64),
}

impl Op {
    fn invocation(&self) -> (&'static str, Vec<Value<'static>>) {
        let n = Value::from_f64;
        match self {
            Op::Reverse => ("reverse", vec![]),
            Op::Sort => ("sort", vec![]),
            Op::ToSorted => ("toSorted", vec![]),
            Op::Fill(v, s, e) => ("fill", vec![n(*v), n(*s), n(*e)]),
            Op::CopyWithin(t, s, e) => ("copyWithin", vec![n(*t), n(*s), n(*e)]),
            Op::IndexOf(v, from) => ("indexOf", vec![n(*v), n(*from)]),
            Op::LastIndexOf(v) => ("lastIndexOf", vec![n(*v)]),
            Op::Includes(v) => ("includes", vec![n(*v)]),
            Op::Slice(s, e) => ("slice", vec![n(*s), n(*e)]),
            Op::Splice(s, d, items) => {
                let mut arguments = vec![n(*s), n(*d)];
                arguments.extend(items.iter().map(|item| n(*item)));
                ("splice", arguments)
            }
            Op::Push(v) => ("push", vec![n(*v)]),
            Op::Pop => ("pop", vec![]),
            Op::Shift => ("shift", vec![]),
            Op::Unshift(v) => ("unshift", vec![n(*v)]),
            Op::Join => ("join", vec![]),
            Op::At(i) => ("at", vec![n(*i)]),
            Op::With(i, v) => ("with", vec![n(*i), n(*v)]),
        }
    }
}

fn random_element(rng: &mut StdRng) -> f64 {
    match rng.random_range(0..10) {
        0 => f64::NAN,
        1 => -0.0,
        2 => 1.5,
        _ => rng.random_range(-5..=5) as f64,
    }
}

fn random_index(rng: &mut StdRng, len: usize) -> f64 {
    let bound = len as i64 + 2;
    rng.random_range(-bound..=bound) as f64
}

fn random_op(rng: &mut StdRng, len: usize) -> Op {
    match rng.random_range(0..17) {
        0 => Op::Reverse,
        1 => Op::Sort,
        2 => Op::ToSorted,
        3 => Op::Fill(
            random_element(rng),
            random_index(rng, len),
            random_index(rng, len),
        ),
        4 => Op::CopyWithin(
            random_index(rng, len),
            random_index(rng, len),
            random_index(rng, len),
        ),
        5 => Op::IndexOf(random_element(rng), random_index(rng, len)),
        6 => Op::LastIndexOf(random_element(rng)),
        7 => Op::Includes(random_element(rng)),
        8 => Op::Slice(random_index(rng, len), random_index(rng, len)),
        9 => {
            let items = (0..rng.random_range(0..3)).map(|_| random_element(rng)).collect();
            Op::Splice(random_index(rng, len), rng.random_range(0..4) as f64, items)
        }
        10 => Op::Push(random_element(rng)),
        11 => Op::Pop,
        12 => Op::Shift,
        13 => Op::Unshift(random_element(rng)),
        14 => Op::Join,
        15 => Op::At(random_index(rng, len)),
        _ => Op::With(random_index(rng, len), random_element(rng)),
    }
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

/// A heap independent rendering of a value, with arrays rendered element by
/// element and holes marked.
fn describe(agent: &mut Agent, value: Value, mut gc: GcScope) -> std::string::String {
    if let Ok(string) = String::try_from(value) {
        return format!("{:?}", string.as_str(agent));
    }
    let Ok(o) = Object::try_from(value) else {
        return format!("{value:?}");
    };
    let o = o.unbind();
    let len = length_of_array_like(agent, o, gc.reborrow()).unwrap();
    let mut elements = Vec::with_capacity(len as usize);
    for k in 0..len as u32 {
        if !has_property(agent, o, PropertyKey::from(k)) {
            elements.push("<hole>".to_string());
            continue;
        }
        let element = get(agent, o, PropertyKey::from(k), gc.reborrow()).unwrap().unbind();
        elements.push(describe(agent, element, gc.reborrow()));
    }
    format!("[{}]", elements.join(", "))
}

fn transcript(
    options: Options,
    elements: &[f64],
    holes: &[u32],
    ops: &[Op],
) -> Vec<std::string::String> {
    let mut agent = Agent::new(options);
    agent.run(|agent, mut gc| {
        let values = elements.iter().map(|n| Value::from_f64(*n)).collect::<Vec<_>>();
        let o = Array::from_slice(agent, &values, gc.nogc()).unbind();
        for hole in holes {
            delete_property_or_throw(agent, o.into(), PropertyKey::from(*hole), gc.nogc()).unwrap();
        }
        let mut log = vec![describe(agent, o.into(), gc.reborrow())];
        for op in ops {
            let (name, arguments) = op.invocation();
            let entry = match call_method(agent, o, name, &arguments, gc.reborrow()) {
                Ok(result) => describe(agent, result, gc.reborrow()),
                Err(error) => format!("throws {:?}", agent.exception_type(error)),
            };
            log.push(format!("{op:?} -> {entry}"));
            log.push(describe(agent, o.into(), gc.reborrow()));
        }
        log
    })
}

fn slow_path_options() -> Options {
    Options {
        disable_fast_paths: true,
        ..Options::default()
    }
}

#[test]
fn random_operation_sequences_agree() {
    let mut rng = StdRng::seed_from_u64(0x7e55_e7a0);
    for _ in 0..200 {
        let len = rng.random_range(0..12);
        let elements = (0..len).map(|_| random_element(&mut rng)).collect::<Vec<_>>();
        let holes = (0..len as u32).filter(|_| rng.random_bool(0.2)).collect::<Vec<_>>();
        let ops = (0..8).map(|_| random_op(&mut rng, len)).collect::<Vec<_>>();
        let fast = transcript(Options::default(), &elements, &holes, &ops);
        let slow = transcript(slow_path_options(), &elements, &holes, &ops);
        assert_eq!(fast, slow, "elements {elements:?} holes {holes:?}");
    }
}

/// Calls made to a recording callback, as `(value, index)` pairs.
type CallLog = Rc<RefCell<Vec<(std::string::String, f64)>>>;

fn callback_transcript(options: Options, elements: &[f64], holes: &[u32]) -> Vec<(std::string::String, f64)> {
    let calls: CallLog = Rc::default();
    let mut agent = Agent::new(options);
    agent.run(|agent, mut gc| {
        let recorded = calls.clone();
        let record = create_native_function(
            agent,
            move |_, _, arguments, _| {
                let index = arguments.get(1).as_number().unwrap_or(f64::NAN);
                recorded.borrow_mut().push((format!("{:?}", arguments.get(0)), index));
                Ok(Value::from(index > 2.0))
            },
            "record",
            3,
            gc.nogc(),
        )
        .unbind();
        let values = elements.iter().map(|n| Value::from_f64(*n)).collect::<Vec<_>>();
        let o = Array::from_slice(agent, &values, gc.nogc()).unbind();
        for hole in holes {
            delete_property_or_throw(agent, o.into(), PropertyKey::from(*hole), gc.nogc()).unwrap();
        }
        for name in ["forEach", "map", "filter", "some", "every", "find", "findLastIndex"] {
            call_method(agent, o, name, &[record.into()], gc.reborrow()).unwrap();
        }
    });
    calls.take()
}

#[test]
fn callbacks_observe_the_same_calls() {
    let mut rng = StdRng::seed_from_u64(0xca11_ba55);
    for _ in 0..50 {
        let len = rng.random_range(0..10);
        let elements = (0..len).map(|_| random_element(&mut rng)).collect::<Vec<_>>();
        let holes = (0..len as u32).filter(|_| rng.random_bool(0.3)).collect::<Vec<_>>();
        let fast = callback_transcript(Options::default(), &elements, &holes);
        let slow = callback_transcript(slow_path_options(), &elements, &holes);
        assert_eq!(fast, slow, "elements {elements:?} holes {holes:?}");
    }
}
